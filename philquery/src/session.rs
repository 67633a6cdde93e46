use std::io::{BufRead, Write};

use phq_ai::answer::{AskResponse, PromptMode};

use crate::pipeline::Pipeline;

const PROMPT: &str = "Ask your political philosophy question: ";
const EXIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

pub fn is_exit_word(line: &str) -> bool {
    let line = line.trim().to_ascii_lowercase();
    EXIT_WORDS.contains(&line.as_str())
}

/// Interactive question loop. Ends on an exit word or end of input; a failed question
/// is reported and the loop continues.
pub fn run<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    mut input: R,
    out: &mut W,
    mode: PromptMode,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_word(question) {
            break;
        }

        writeln!(out, "\nThinking...")?;
        match pipeline.ask(question, mode, top_k) {
            Ok(resp) => write_answer(out, &resp)?,
            Err(e) => {
                tracing::error!(error = %e, "question failed");
                writeln!(out, "Error: {e}\n")?;
            }
        }
    }
    Ok(())
}

pub fn write_answer<W: Write>(out: &mut W, resp: &AskResponse) -> std::io::Result<()> {
    writeln!(out, "\n{}\n", resp.answer)?;
    if resp.citations.is_empty() {
        return Ok(());
    }
    writeln!(out, "Sources:")?;
    for c in &resp.citations {
        writeln!(
            out,
            "  [{}] {}, {}: \"{}\" ({})",
            c.citation_id, c.source_title, c.author, c.excerpt, c.url
        )?;
    }
    writeln!(out)
}

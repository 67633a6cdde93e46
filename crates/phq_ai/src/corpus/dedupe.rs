use std::collections::HashSet;

use super::model::Chunk;

/// Keep the first chunk for each distinct trimmed text, preserving input order.
///
/// Chunks whose text is blank after trimming are dropped as well.
pub fn dedupe(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut seen: HashSet<String> = HashSet::new();
    chunks
        .into_iter()
        .filter(|c| {
            let key = c.text.trim();
            !key.is_empty() && seen.insert(key.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::model::ChunkMetadata;
    use pretty_assertions::assert_eq;

    fn chunk(text: &str, title: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source_title: title.to_string(),
                author: "Rousseau".to_string(),
                url: None,
                section_title: None,
            },
        }
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let input = vec![
            chunk("b", "first"),
            chunk("a", "first"),
            chunk(" b ", "second"),
            chunk("", "first"),
            chunk("c", "second"),
            chunk("a", "second"),
        ];
        let out = dedupe(input);
        let got: Vec<(&str, &str)> = out
            .iter()
            .map(|c| (c.text.as_str(), c.metadata.source_title.as_str()))
            .collect();
        assert_eq!(got, vec![("b", "first"), ("a", "first"), ("c", "second")]);
    }

    #[test]
    fn is_idempotent() {
        let input = vec![chunk("x", "1"), chunk("y", "1"), chunk("x", "2"), chunk("z", "2")];
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }
}

pub mod answer;
pub mod corpus;
pub mod embeddings;
mod http;
pub mod llm;
pub mod ollama;
pub mod openai;
pub mod providers;
pub mod retrieve;

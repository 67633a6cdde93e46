pub mod text;
pub mod timestamps;

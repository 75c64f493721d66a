pub mod text_extractor;

pub use text_extractor::{extract_text, IngestionError};

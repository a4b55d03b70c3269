//! IRC line tokenizing.

mod nom_parser;
mod types;

pub use self::types::{ParsedLine, Source};

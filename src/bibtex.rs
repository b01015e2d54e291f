//! # BibTeX format support (§4.B)
//! Parsing (with error recovery, `@string` macro resolution, and format-preservation
//! bookkeeping), streaming, and emission of the BibTeX interchange format.
pub mod emit;
pub mod parser;
pub mod stream;

pub use emit::{to_bibtex, to_bibtex_many, to_bibtex_preserving};
pub use parser::{
    parse_bytes, parse_bytes_preserving, parse_str, parse_str_preserving, MacroTable, ParseOutcome,
    RecordedComment,
};
pub use stream::StreamingParser;

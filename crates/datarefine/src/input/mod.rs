//! Input layer: CSV/JSON parsing and column type inference.

mod infer;
mod parser;
mod source;

pub use infer::{is_missing_token, DEFAULT_DATE_FORMATS};
pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;

pub(crate) use infer::{parse_date, strip_numeric_decoration};

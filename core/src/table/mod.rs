pub mod reader;
pub mod writer;

pub use reader::{read_points, CANONICAL_COLUMNS};
pub use writer::{render, write_json, write_points, Delimiter, Encoding, OutputFormat};

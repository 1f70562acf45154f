use crate::types::RawRow;

/// Decodes an uploaded file into rows keyed by header name.
pub trait RowSource {
    fn decode(content: &[u8]) -> Result<Vec<RawRow>, String>;

    fn is_supported(filename: Option<&str>, content: &[u8]) -> bool;
}

//! Decoders turning uploaded files into [`RawRow`](crate::RawRow)s.

pub mod csv;
pub mod traits;
#[cfg(feature = "xlsx")]
pub mod xlsx;

pub mod prelude {
    pub use super::csv::CsvSource;
    pub use super::traits::RowSource;
    #[cfg(feature = "xlsx")]
    pub use super::xlsx::XlsxSource;
}

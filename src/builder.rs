use std::fs;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    classifier::classify,
    errors::{CashbackError, CashbackResult},
    registry::CardRegistry,
    sources::prelude::*,
    types::{ClassificationSummary, RawRow},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    #[serde(rename = "csv")]
    Csv,
    #[cfg(feature = "xlsx")]
    #[serde(rename = "xlsx")]
    Xlsx,
}

impl SourceFormat {
    fn decode(&self, content: &[u8]) -> CashbackResult<Vec<RawRow>> {
        let rows = match self {
            SourceFormat::Csv => CsvSource::decode(content),
            #[cfg(feature = "xlsx")]
            SourceFormat::Xlsx => XlsxSource::decode(content),
        };
        rows.map_err(CashbackError::ParseFailed)
    }

    fn detect(filename: Option<&str>, content: Option<&[u8]>) -> CashbackResult<Self> {
        if let Some(content) = content {
            if let Some(format) = detect_workbook(filename, content) {
                return Ok(format);
            }
            if CsvSource::is_supported(filename, content) {
                return Ok(SourceFormat::Csv);
            }
        }

        if let Some(filename) = filename {
            if let Some(ext) = filename.rsplit('.').next() {
                match ext.to_lowercase().as_str() {
                    "csv" => return Ok(SourceFormat::Csv),
                    #[cfg(feature = "xlsx")]
                    "xlsx" | "xlsm" | "xls" | "ods" => return Ok(SourceFormat::Xlsx),
                    _ => {}
                }
            }
        }

        Err(CashbackError::UnsupportedFormat)
    }
}

#[cfg(feature = "xlsx")]
fn detect_workbook(filename: Option<&str>, content: &[u8]) -> Option<SourceFormat> {
    XlsxSource::is_supported(filename, content).then_some(SourceFormat::Xlsx)
}

#[cfg(not(feature = "xlsx"))]
fn detect_workbook(_filename: Option<&str>, _content: &[u8]) -> Option<SourceFormat> {
    None
}

/// Runs one card against one uploaded file.
///
/// ```rust,ignore
/// use cashback_tracker::CashbackBuilder;
///
/// let summary = CashbackBuilder::new()
///     .card("cardA")
///     .filename("transactions.xlsx")
///     .run()?;
/// ```
#[derive(Default)]
pub struct CashbackBuilder<'r> {
    card: Option<String>,
    content: Option<Vec<u8>>,
    filepath: Option<String>,
    format: Option<SourceFormat>,
    rows: Option<Vec<RawRow>>,
    registry: Option<&'r CardRegistry>,
}

impl<'r> CashbackBuilder<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card(mut self, key: &str) -> Self {
        self.card = Some(key.to_string());
        self
    }

    pub fn content(mut self, content: impl AsRef<[u8]>) -> Self {
        self.content = Some(content.as_ref().to_vec());
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filepath = Some(filename.to_string());
        self
    }

    pub fn format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Already decoded rows; content and file path are then ignored.
    pub fn rows(mut self, rows: Vec<RawRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Looks cards up in `registry` instead of the built-in one.
    pub fn registry(mut self, registry: &'r CardRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn run(self) -> CashbackResult<ClassificationSummary> {
        let registry = self.registry.unwrap_or_else(|| CardRegistry::builtin());
        let card = self.card.as_deref().unwrap_or_default();
        let profile = registry.get_profile(card)?;

        let rows = match self.rows {
            Some(rows) => rows,
            None => load_rows(self.content, self.filepath, self.format)?,
        };

        classify(&rows, profile)
    }
}

fn load_rows(
    content: Option<Vec<u8>>,
    filepath: Option<String>,
    format: Option<SourceFormat>,
) -> CashbackResult<Vec<RawRow>> {
    let content = content
        .map(Ok)
        .unwrap_or_else(|| {
            filepath
                .as_deref()
                .ok_or(CashbackError::MissingContentAndFilepath)
                .and_then(|path| fs::read(path).map_err(Into::into))
        })?;

    let format = format
        .map(Ok)
        .unwrap_or_else(|| SourceFormat::detect(filepath.as_deref(), Some(&content)))?;

    debug!(?format, bytes = content.len(), "decoding upload");
    format.decode(&content)
}

//! Source extraction.
//!
//! An [`Extractor`] resolves a logical source name (`customers`, `sales`,
//! ...) to a [`Table`] of trimmed string cells. [`CsvExtractor`] reads
//! `<data_dir>/<name>.csv`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// Header row plus data rows of string cells. Every row has one cell per
/// header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of `name`, appending an empty column first if it is absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }
}

/// Produces source tables by logical name.
pub trait Extractor {
    /// Read the whole of `source_name`.
    ///
    /// # Errors
    ///
    /// [`ExtractError::NotFound`] if the source does not exist,
    /// [`ExtractError::Format`] if it cannot be parsed.
    fn extract(&self, source_name: &str) -> Result<Table, ExtractError>;
}

/// Reads `<data_dir>/<source_name>.csv` with a mandatory header row.
#[derive(Debug, Clone)]
pub struct CsvExtractor {
    data_dir: PathBuf,
}

impl CsvExtractor {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn path_for(&self, source_name: &str) -> PathBuf {
        self.data_dir.join(format!("{source_name}.csv"))
    }
}

impl Extractor for CsvExtractor {
    fn extract(&self, source_name: &str) -> Result<Table, ExtractError> {
        let path = self.path_for(source_name);
        let format_err = |detail: String| ExtractError::Format {
            source_name: source_name.to_string(),
            detail,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(false)
            .from_path(&path)
            .map_err(|e| match e.kind() {
                csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    ExtractError::NotFound {
                        source_name: source_name.to_string(),
                        path: path.clone(),
                    }
                }
                _ => format_err(e.to_string()),
            })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| format_err(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() {
            return Err(format_err("missing header row".into()));
        }
        let mut seen = HashSet::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                return Err(format_err(format!("header {} is empty", idx + 1)));
            }
            if !seen.insert(header.as_str()) {
                return Err(format_err(format!("duplicate header '{header}'")));
            }
        }

        let rows = reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                    .map_err(|e| format_err(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            source = source_name,
            path = %path.display(),
            rows = rows.len(),
            columns = headers.len(),
            "Extracted source"
        );
        Ok(Table::new(headers, rows))
    }
}

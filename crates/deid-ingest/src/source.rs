use std::path::{Path, PathBuf};

use deid_model::{DataIoError, Table, TableSource};

use crate::error::{IngestError, Result};
use crate::format::InputFormat;

/// Read `path` as `format`, or as the format its extension names.
pub fn read_table(path: &Path, format: Option<InputFormat>) -> Result<Table> {
    let format = format
        .or_else(|| InputFormat::from_path(path))
        .ok_or_else(|| IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
    tracing::info!(path = %path.display(), %format, "Reading input");
    match format {
        InputFormat::Csv => crate::csv::read_csv_table(path),
        InputFormat::Json => crate::json::read_json_table(path),
        #[cfg(feature = "excel")]
        InputFormat::Excel => crate::excel::read_excel_table(path),
        #[cfg(not(feature = "excel"))]
        InputFormat::Excel => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// A file on disk used as a pipeline input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    format: Option<InputFormat>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
        }
    }

    /// Force a format instead of detecting it from the extension.
    pub fn with_format(mut self, format: Option<InputFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> std::result::Result<Table, DataIoError> {
        read_table(&self.path, self.format).map_err(|err| DataIoError::load(self.location(), err))
    }
}

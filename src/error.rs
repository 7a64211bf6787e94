use std::path::PathBuf;
use thiserror::Error;

pub type CambioResult<T> = Result<T, CambioError>;

#[derive(Error, Debug)]
pub enum CambioError {
    #[error("Could not open workbook {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Could not save workbook {}: {reason}", path.display())]
    Save { path: PathBuf, reason: String },

    #[error("Invalid rule configuration: {0}")]
    Config(String),

    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CambioError {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CambioError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn save(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CambioError::Save {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

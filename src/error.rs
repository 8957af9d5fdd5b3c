use thiserror::Error;

pub type ConsolidationResult<T> = Result<T, ConsolidationError>;

#[derive(Error, Debug)]
pub enum ConsolidationError {
    /// The workbook itself could not be opened or a sheet could not be decoded.
    #[error("Workbook format error: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
    CsvError(csv::Error),
    /// The backing store could not be reached in time. Recoverable; the
    /// caller may retry.
    Unavailable(String),
    InvalidInput(String),
}

impl StoreError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::IoError(_))
    }
}

impl std::error::Error for StoreError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
            StoreError::SerdeError(e) => write!(f, "Serialization error: {}", e),
            StoreError::CsvError(e) => write!(f, "CSV error: {}", e),
            StoreError::Unavailable(reason) => write!(f, "Store unavailable: {}", reason),
            StoreError::InvalidInput(reason) => write!(f, "Invalid input: {}", reason),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerdeError(err)
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::CsvError(err)
    }
}

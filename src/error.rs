//! Ошибки конвейера предобработки

use std::path::PathBuf;

use thiserror::Error;

/// Ошибки уровня ресурса и вырожденной статистики.
///
/// Ошибки разбора отдельных строк сюда не попадают: они гасятся на месте
/// (`None` или значение по умолчанию) и конвейер не прерывают.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Empty dataset: no rows left after '{stage}'")]
    EmptyDataset { stage: &'static str },

    #[error("Median of '{column}' is undefined: every value is missing")]
    UndefinedMedian { column: String },

    #[error("Normalizer not fitted")]
    NotFitted,

    #[error("Shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Npy {
        path: PathBuf,
        #[source]
        source: ndarray_npy::WriteNpyError,
    },
}

pub type Result<T> = std::result::Result<T, PrepError>;

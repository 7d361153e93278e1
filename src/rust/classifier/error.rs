use std::fmt;
use std::io;

use crate::generator::GeneratorError;
use crate::model_store::ModelStoreError;

/// Represents the different types of errors that can occur in the classifier.
#[derive(Debug)]
pub enum ClassifierError {
    /// Error occurred due to an empty or missing required argument
    ValidationError(String),
    /// A class label or model id was not known
    NotFound(String),
    /// The generative text service failed to produce a completion
    GenerationError(String),
    /// The generative output did not contain a decodable JSON payload
    ParseError(String),
    /// A save was attempted while some class has no descriptions
    NotTrained(String),
    /// Error occurred while reading or writing a file
    IoError(String),
    /// Error occurred during the build phase
    BuildError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::GenerationError(msg) => write!(f, "Generation error: {}", msg),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::NotTrained(msg) => write!(f, "Not trained: {}", msg),
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<GeneratorError> for ClassifierError {
    fn from(err: GeneratorError) -> Self {
        ClassifierError::GenerationError(err.to_string())
    }
}

impl From<ModelStoreError> for ClassifierError {
    fn from(err: ModelStoreError) -> Self {
        match err {
            ModelStoreError::Validation(msg) => ClassifierError::ValidationError(msg),
            ModelStoreError::NotTrained(msg) => ClassifierError::NotTrained(msg),
            ModelStoreError::NotFound(id) => ClassifierError::NotFound(format!("model '{}'", id)),
            ModelStoreError::Io(e) => ClassifierError::IoError(e.to_string()),
            ModelStoreError::Json(e) => ClassifierError::ParseError(e.to_string()),
        }
    }
}

impl From<io::Error> for ClassifierError {
    fn from(err: io::Error) -> Self {
        ClassifierError::IoError(err.to_string())
    }
}

impl From<csv::Error> for ClassifierError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ClassifierError::IoError(err.to_string())
        } else {
            ClassifierError::ParseError(err.to_string())
        }
    }
}

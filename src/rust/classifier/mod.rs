use std::collections::HashMap;

mod error;
mod model;
mod predictor;
mod profile;
mod prompts;
mod trainer;
mod utils;
pub mod builder;

pub use builder::{ClassDefinition, ClassifierBuilder, DEFAULT_PROMPT_SAMPLE_SIZE, DEFAULT_TEMPERATURE};
pub use error::ClassifierError;
pub use model::Classifier;
pub use predictor::{ClassificationResult, FailedPrediction, Predictor};
pub use profile::{ClassifierProfile, ProfileGenerator, DEFAULT_SEED, PROFILE_TEMPERATURE};
pub use prompts::PromptStore;
pub use trainer::{Trainer, TrainingReport};

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Id the classifier is saved under, empty until assigned
    pub model_id: String,
    /// Dataset column whose values are the classes
    pub target_column: String,
    /// Number of known classes
    pub num_classes: usize,
    /// Labels of the classes
    pub class_labels: Vec<String>,
    /// Number of descriptions held for each class
    pub descriptions_per_class: HashMap<String, usize>,
    /// Sampling temperature used for predictions
    pub temperature: f32,
    /// Cap on descriptions collected per class during training
    pub prompt_sample_size: usize,
    /// Number of rows in the training dataset
    pub dataset_size: usize,
}

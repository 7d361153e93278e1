use std::path::PathBuf;
use std::sync::Arc;

use log::info;

use super::error::ClassifierError;
use super::model::Classifier;
use super::profile::ProfileGenerator;
use super::prompts::PromptStore;
use crate::dataset::{read_csv, RowItem};
use crate::generator::TextGenerator;
use crate::model_store::ModelStore;
use crate::storage::{default_storage, StorageConfig};

pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_PROMPT_SAMPLE_SIZE: usize = 10;
const MAX_TEMPERATURE: f32 = 2.0;

/// A class with hand-written descriptions, for classifiers that are
/// prompted directly instead of (or before) being trained.
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    /// The unique identifier for the class
    pub label: String,
    /// Sentences describing members of the class, used verbatim as context
    pub descriptions: Vec<String>,
}

impl ClassDefinition {
    /// Creates a class definition with no descriptions yet
    ///
    /// # Example
    /// ```
    /// use tao_classifier::ClassDefinition;
    ///
    /// let class = ClassDefinition::new("cat")
    ///     .with_descriptions(vec!["Cats groom themselves and meow."]);
    /// ```
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            descriptions: Vec::new(),
        }
    }

    pub fn with_descriptions(mut self, descriptions: Vec<impl Into<String>>) -> Self {
        self.descriptions = descriptions.into_iter().map(Into::into).collect();
        self
    }
}

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Default)]
pub struct ClassifierBuilder {
    model_id: String,
    target_column: String,
    temperature: Option<f32>,
    prompt_sample_size: Option<usize>,
    dataset: Option<Vec<RowItem>>,
    dataset_path: Option<PathBuf>,
    generator: Option<Arc<dyn TextGenerator>>,
    storage: Option<StorageConfig>,
    training_seed: Option<u64>,
    prompts: PromptStore,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use tao_classifier::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Id under which the classifier is saved and loaded
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Dataset column whose values are the classes
    pub fn with_target_column(mut self, target_column: impl Into<String>) -> Self {
        self.target_column = target_column.into();
        self
    }

    /// Sampling temperature used for predictions
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Maximum number of descriptions training collects per class
    pub fn with_prompt_sample_size(mut self, size: usize) -> Self {
        self.prompt_sample_size = Some(size);
        self
    }

    /// Uses rows already in memory as the training dataset
    pub fn with_dataset(mut self, rows: Vec<RowItem>) -> Self {
        self.dataset = Some(rows);
        self
    }

    /// Loads the training dataset from a CSV file when the classifier is built
    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(path.into());
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Stores models under `storage` instead of the process-wide default root
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Makes the order in which training visits rows reproducible
    pub fn with_training_seed(mut self, seed: u64) -> Self {
        self.training_seed = Some(seed);
        self
    }

    /// Adds a class with hand-written descriptions
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The class label is empty
    ///   - The class was already added
    ///   - Any description is empty
    pub fn add_class(mut self, class: ClassDefinition) -> Result<Self, ClassifierError> {
        if class.label.is_empty() {
            return Err(ClassifierError::ValidationError("Class label cannot be empty".into()));
        }
        if self.prompts.get(&class.label).is_ok() {
            return Err(ClassifierError::ValidationError(format!(
                "Class '{}' was already added",
                class.label
            )));
        }
        if let Some(pos) = class.descriptions.iter().position(|d| d.is_empty()) {
            return Err(ClassifierError::ValidationError(format!(
                "Description {} of class '{}' cannot be empty",
                pos + 1,
                class.label
            )));
        }

        self.prompts.ensure_label(&class.label);
        for description in &class.descriptions {
            self.prompts.add(&class.label, description)?;
        }
        Ok(self)
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - No generator is set
    ///   - Both an in-memory dataset and a dataset path are set
    ///   - The temperature is outside `[0, 2]` or the sample size is zero
    ///   - The dataset file cannot be read
    ///   - The storage root cannot be created
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        let generator = self
            .generator
            .ok_or_else(|| ClassifierError::BuildError("A text generator must be set".into()))?;

        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(ClassifierError::ValidationError(format!(
                "Temperature {} is outside [0, {}]",
                temperature, MAX_TEMPERATURE
            )));
        }
        let prompt_sample_size = self.prompt_sample_size.unwrap_or(DEFAULT_PROMPT_SAMPLE_SIZE);
        if prompt_sample_size == 0 {
            return Err(ClassifierError::ValidationError("Prompt sample size must be at least 1".into()));
        }

        let dataset = match (self.dataset, self.dataset_path) {
            (Some(_), Some(_)) => {
                return Err(ClassifierError::BuildError(
                    "Set either a dataset or a dataset path, not both".into(),
                ))
            }
            (Some(rows), None) => rows,
            (None, Some(path)) => read_csv(path)?,
            (None, None) => Vec::new(),
        };

        let storage = match self.storage {
            Some(storage) => storage,
            None => default_storage()
                .map_err(|e| ClassifierError::BuildError(format!("Failed to prepare storage root: {}", e)))?,
        };
        let store = ModelStore::new(storage)
            .map_err(|e| ClassifierError::BuildError(format!("Failed to create model store: {}", e)))?;

        info!(
            "Built classifier '{}' (target '{}', {} rows, {} classes)",
            self.model_id,
            self.target_column,
            dataset.len(),
            self.prompts.len()
        );

        Ok(Classifier {
            model_id: self.model_id,
            target_column: self.target_column,
            temperature,
            prompt_sample_size,
            prompts: self.prompts,
            dataset,
            profiles: ProfileGenerator::new(Arc::clone(&generator)),
            generator,
            store,
            training_seed: self.training_seed,
        })
    }
}

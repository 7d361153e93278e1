use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::error::ClassifierError;
use super::predictor::{ClassificationResult, FailedPrediction, Predictor};
use super::profile::ProfileGenerator;
use super::prompts::PromptStore;
use super::trainer::{Trainer, TrainingReport};
use super::utils::canonical_text;
use crate::dataset::RowItem;
use crate::generator::TextGenerator;
use crate::model_store::{ModelStore, SaveOutcome, SavedModel};

/// A text classifier whose only learned state is a set of natural-language
/// descriptions per class, used as context for a generative model.
///
/// # Thread Safety
///
/// The classifier is `Send + Sync`: the generator is shared behind an `Arc`
/// and every other field is owned data. Mutating operations (`train`,
/// `add_prompt`, `load_model`, ...) take `&mut self`, so concurrent
/// mutation is ruled out by the borrow checker.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use tao_classifier::{Classifier, ClassDefinition, OpenAiGenerator};
///
/// let classifier = Classifier::builder()
///     .with_generator(Arc::new(OpenAiGenerator::from_env()?))
///     .with_target_column("animal")
///     .add_class(ClassDefinition::new("cat").with_descriptions(vec!["Cats meow."]))?
///     .add_class(ClassDefinition::new("dog").with_descriptions(vec!["Dogs bark."]))?
///     .build()?;
///
/// let result = classifier.predict_text("Meow")?;
/// println!("{} = {} ({:.2})", result.label, result.predicted_class, result.probability);
/// # Ok(())
/// # }
/// ```
pub struct Classifier {
    pub(crate) model_id: String,
    pub(crate) target_column: String,
    pub(crate) temperature: f32,
    pub(crate) prompt_sample_size: usize,
    pub(crate) prompts: PromptStore,
    pub(crate) dataset: Vec<RowItem>,
    pub(crate) profiles: ProfileGenerator,
    pub(crate) generator: Arc<dyn TextGenerator>,
    pub(crate) store: ModelStore,
    pub(crate) training_seed: Option<u64>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("model_id", &self.model_id)
            .field("target_column", &self.target_column)
            .field("temperature", &self.temperature)
            .field("prompt_sample_size", &self.prompt_sample_size)
            .field("prompts", &self.prompts)
            .field("dataset_rows", &self.dataset.len())
            .field("generator", &"<TextGenerator>")
            .field("store", &self.store)
            .finish()
    }
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_id: self.model_id.clone(),
            target_column: self.target_column.clone(),
            num_classes: self.prompts.len(),
            class_labels: self.prompts.labels(),
            descriptions_per_class: self
                .prompts
                .iter()
                .map(|(label, descriptions)| (label.clone(), descriptions.len()))
                .collect(),
            temperature: self.temperature,
            prompt_sample_size: self.prompt_sample_size,
            dataset_size: self.dataset.len(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn prompt_sample_size(&self) -> usize {
        self.prompt_sample_size
    }

    pub fn dataset(&self) -> &[RowItem] {
        &self.dataset
    }

    pub fn prompts(&self) -> &PromptStore {
        &self.prompts
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn add_prompt(&mut self, label: &str, description: &str) -> Result<(), ClassifierError> {
        self.prompts.add(label, description)
    }

    /// Appends hand-written descriptions for several classes at once.
    pub fn prompt_train<I, L, D>(&mut self, prompts: I) -> Result<(), ClassifierError>
    where
        I: IntoIterator<Item = (L, Vec<D>)>,
        L: Into<String>,
        D: Into<String>,
    {
        self.prompts.merge(prompts)
    }

    pub fn get_prompt(&self, label: &str) -> Result<&[String], ClassifierError> {
        self.prompts.get(label)
    }

    pub fn remove_prompt(&mut self, label: &str) -> Result<Vec<String>, ClassifierError> {
        self.prompts.remove(label)
    }

    pub fn clear_prompts(&mut self) {
        self.prompts.clear();
    }

    pub fn labels(&self) -> Vec<String> {
        self.prompts.labels()
    }

    /// Collects descriptions for every class in the dataset's target column.
    pub fn train(&mut self) -> Result<TrainingReport, ClassifierError> {
        if self.dataset.is_empty() {
            return Err(ClassifierError::ValidationError("No training dataset loaded".into()));
        }
        Trainer::new(&self.profiles, self.prompt_sample_size)
            .with_seed(self.training_seed)
            .train(&self.dataset, &self.target_column, &mut self.prompts)
    }

    fn predictor(&self) -> Predictor {
        Predictor::new(Arc::clone(&self.generator), self.temperature)
    }

    /// Classifies `text`. On failure the error carries a sentinel result
    /// with an empty label and a probability of `-1`.
    pub fn predict_text(&self, text: &str) -> Result<ClassificationResult, FailedPrediction> {
        self.predictor().predict_text(&self.prompts, &self.target_column, text)
    }

    /// Classifies every text in order. The first failure aborts the batch.
    pub fn predict_many<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<ClassificationResult>, ClassifierError> {
        if texts.is_empty() {
            return Err(ClassifierError::ValidationError("Texts cannot be empty".into()));
        }
        let predictor = self.predictor();
        texts
            .iter()
            .map(|text| {
                predictor
                    .predict_text(&self.prompts, &self.target_column, text.as_ref())
                    .map_err(ClassifierError::from)
            })
            .collect()
    }

    /// Classifies any serializable value through its canonical JSON text.
    pub fn predict_object<T: Serialize + ?Sized>(&self, object: &T) -> Result<ClassificationResult, FailedPrediction> {
        let text = canonical_text(object).map_err(|error| FailedPrediction {
            result: ClassificationResult::failed(),
            error,
        })?;
        self.predict_text(&text)
    }

    /// Classifies every value in order. The first failure aborts the batch.
    pub fn predict_many_objects<T: Serialize>(&self, objects: &[T]) -> Result<Vec<ClassificationResult>, ClassifierError> {
        if objects.is_empty() {
            return Err(ClassifierError::ValidationError("Objects cannot be empty".into()));
        }
        objects
            .iter()
            .map(|object| self.predict_object(object).map_err(ClassifierError::from))
            .collect()
    }

    /// Classifies a dataset row. The target column, if present, is left out
    /// of the input so the answer is not handed to the model.
    pub fn predict_row(&self, row: &RowItem) -> Result<ClassificationResult, FailedPrediction> {
        let mut features = row.clone();
        features.remove(&self.target_column);
        self.predict_object(&features)
    }

    /// Classifies every row in order. The first failure aborts the batch.
    pub fn predict_many_rows(&self, rows: &[RowItem]) -> Result<Vec<ClassificationResult>, ClassifierError> {
        if rows.is_empty() {
            return Err(ClassifierError::ValidationError("Rows cannot be empty".into()));
        }
        rows.iter()
            .map(|row| self.predict_row(row).map_err(ClassifierError::from))
            .collect()
    }

    fn snapshot(&self) -> SavedModel {
        SavedModel {
            model_id: self.model_id.clone(),
            prompts: self.prompts.clone(),
            temperature: self.temperature,
            prompt_sample_size: self.prompt_sample_size,
            target_column: self.target_column.clone(),
        }
    }

    /// Persists the descriptions and settings under the classifier's model id,
    /// generating an id first if it has none.
    ///
    /// With `overwrite` false an existing file is left untouched and
    /// `SaveOutcome::Skipped` is returned.
    pub fn save_model(&mut self, overwrite: bool) -> Result<SaveOutcome, ClassifierError> {
        let outcome = self.store.save(&self.snapshot(), overwrite)?;
        if self.model_id.is_empty() {
            self.model_id = outcome.model_id().to_string();
        }
        Ok(outcome)
    }

    /// Replaces the descriptions and settings with those saved under
    /// `model_id`. The classifier takes on the id stored in the file.
    pub fn load_model(&mut self, model_id: &str) -> Result<(), ClassifierError> {
        let saved = self.store.load(model_id)?;
        self.model_id = saved.model_id;
        self.prompts = saved.prompts;
        self.temperature = saved.temperature;
        self.prompt_sample_size = saved.prompt_sample_size;
        self.target_column = saved.target_column;
        Ok(())
    }
}

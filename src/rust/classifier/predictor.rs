use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::profile::DEFAULT_SEED;
use super::prompts::PromptStore;
use crate::generator::TextGenerator;
use crate::response::{parse_schema, ResponseSchema};

/// Outcome of classifying one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The question answered, i.e. the classifier's target column
    pub label: String,
    pub predicted_class: String,
    /// Confidence in `[0, 1]`, or `-1` for a failed prediction
    pub probability: f64,
}

impl ClassificationResult {
    pub const FAILED_PROBABILITY: f64 = -1.0;

    /// Sentinel returned alongside the error of a failed prediction
    pub fn failed() -> Self {
        Self {
            label: String::new(),
            predicted_class: String::new(),
            probability: Self::FAILED_PROBABILITY,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.probability < 0.0
    }
}

/// A prediction that could not be completed. Carries the sentinel result so
/// callers that want a placeholder row still have one.
#[derive(Debug)]
pub struct FailedPrediction {
    pub result: ClassificationResult,
    pub error: ClassifierError,
}

impl FailedPrediction {
    fn new(error: ClassifierError) -> Self {
        Self {
            result: ClassificationResult::failed(),
            error,
        }
    }
}

impl fmt::Display for FailedPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prediction failed: {}", self.error)
    }
}

impl std::error::Error for FailedPrediction {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<FailedPrediction> for ClassifierError {
    fn from(failure: FailedPrediction) -> Self {
        failure.error
    }
}

/// Decoded model answer, before it is tagged with the target column.
#[derive(Debug, Deserialize)]
struct PredictedClass {
    predicted_class: String,
    probability: f64,
}

impl ResponseSchema for PredictedClass {
    fn validate(&self) -> Result<(), String> {
        if self.predicted_class.trim().is_empty() {
            return Err("Predicted class is empty".into());
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(format!("Probability {} is outside [0, 1]", self.probability));
        }
        Ok(())
    }
}

/// Classifies text against the descriptions in a [`PromptStore`].
#[derive(Clone)]
pub struct Predictor {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    seed: i64,
}

impl Predictor {
    pub fn new(generator: Arc<dyn TextGenerator>, temperature: f32) -> Self {
        Self {
            generator,
            temperature,
            seed: DEFAULT_SEED,
        }
    }

    pub fn predict_text(
        &self,
        prompts: &PromptStore,
        target_column: &str,
        text: &str,
    ) -> Result<ClassificationResult, FailedPrediction> {
        if text.is_empty() {
            return Err(FailedPrediction::new(ClassifierError::ValidationError(
                "Input text cannot be empty".into(),
            )));
        }

        let system = Self::system_instruction(prompts);
        let user = format!("Classify the following data: \"{}\"", text);

        let raw = self
            .generator
            .generate(&system, &user, self.temperature, self.seed)
            .map_err(|e| FailedPrediction::new(e.into()))?;
        let answer: PredictedClass = parse_schema(&raw).map_err(FailedPrediction::new)?;

        if !prompts.is_empty() && prompts.get(&answer.predicted_class).is_err() {
            log::warn!("Predicted class '{}' is not a known label", answer.predicted_class);
        }

        Ok(ClassificationResult {
            label: target_column.to_string(),
            predicted_class: answer.predicted_class,
            probability: answer.probability,
        })
    }

    fn system_instruction(prompts: &PromptStore) -> String {
        let mut table = String::from("Label -> Description\n");
        for (label, descriptions) in prompts.iter() {
            for description in descriptions {
                table.push_str(&format!("{}: {}\n", label, description));
            }
        }

        format!(
            "You are an AI assistant that performs classification.\n\
             You will be given a table of labels and descriptions of each label.\n\
             Use this information to classify the given data point.\n\
             The predicted class must be one of the given labels.\n\
             Respond only in JSON with {{ \"predicted_class\": \"<label>\", \"probability\": <number between 0 and 1> }}.\n\
             Context:\n{}",
            table
        )
    }
}

//! A text classifier that needs no trained statistical model.
//!
//! Each class is represented by a growing list of natural-language
//! descriptions. Training samples a labeled dataset and asks a generative
//! model to describe what each row says about each class; prediction hands
//! the whole description table to the generative model as context and parses
//! its JSON answer.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use tao_classifier::{Classifier, OpenAiGenerator};
//!
//! let mut classifier = Classifier::builder()
//!     .with_generator(Arc::new(OpenAiGenerator::from_env()?))
//!     .with_model_id("mobile_price_classifier")
//!     .with_dataset_path("datasets/mobile_price_train.csv")
//!     .with_target_column("price_range")
//!     .with_prompt_sample_size(2)
//!     .build()?;
//!
//! if classifier.load_model("mobile_price_classifier").is_err() {
//!     classifier.train()?;
//!     classifier.save_model(true)?;
//! }
//!
//! let rows = tao_classifier::read_csv("datasets/mobile_price_test.csv")?;
//! for result in classifier.predict_many_rows(&rows)? {
//!     println!("{}: {} ({:.2})", result.label, result.predicted_class, result.probability);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Prompting without training
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use tao_classifier::{Classifier, OpenAiGenerator};
//!
//! let mut classifier = Classifier::builder()
//!     .with_generator(Arc::new(OpenAiGenerator::from_env()?))
//!     .with_target_column("sentiment")
//!     .build()?;
//!
//! classifier.prompt_train(vec![
//!     ("positive", vec!["Expresses joy, praise or satisfaction."]),
//!     ("negative", vec!["Expresses anger, complaint or disappointment."]),
//! ])?;
//!
//! let result = classifier.predict_text("What a fantastic day!")?;
//! println!("Predicted class: {}", result.predicted_class);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod dataset;
pub mod generator;
pub mod model_store;
pub mod response;
pub mod storage;

pub use classifier::{
    ClassDefinition, ClassificationResult, Classifier, ClassifierBuilder, ClassifierError,
    ClassifierInfo, ClassifierProfile, FailedPrediction, PromptStore, TrainingReport,
};
pub use dataset::{read_csv, RowItem};
pub use generator::{GeneratorError, OpenAiConfig, OpenAiGenerator, TextGenerator};
pub use model_store::{ModelStore, ModelStoreError, SaveOutcome, SavedModel};
pub use response::{generate_object, parse_response, parse_schema};
pub use storage::{default_storage, StorageConfig};

pub fn init_logger() {
    env_logger::init();
}

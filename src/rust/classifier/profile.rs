use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::format_row;
use crate::dataset::RowItem;
use crate::generator::TextGenerator;
use crate::response::{parse_schema, ResponseSchema};

/// Profile generation favours repeatable output over variety.
pub const PROFILE_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_SEED: i64 = 1;

/// Descriptions synthesized for one class from one data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierProfile {
    pub label: String,
    #[serde(rename = "description")]
    pub descriptions: Vec<String>,
}

impl ResponseSchema for ClassifierProfile {
    fn validate(&self) -> Result<(), String> {
        if self.descriptions.iter().all(|d| d.trim().is_empty()) {
            return Err("Profile contains no descriptions".into());
        }
        Ok(())
    }
}

/// Asks the generative service to describe what a data row says about a class.
#[derive(Clone)]
pub struct ProfileGenerator {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
    seed: i64,
}

impl ProfileGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            temperature: PROFILE_TEMPERATURE,
            seed: DEFAULT_SEED,
        }
    }

    pub fn generate_profile(
        &self,
        label: &str,
        row: &RowItem,
        known_labels: &[String],
    ) -> Result<ClassifierProfile, ClassifierError> {
        if row.is_empty() {
            return Err(ClassifierError::ValidationError("Data row cannot be empty".into()));
        }
        if label.is_empty() {
            return Err(ClassifierError::ValidationError("Label cannot be empty".into()));
        }

        let system = Self::system_instruction(known_labels);
        let user = Self::user_instruction(label, row);
        let raw = self.generator.generate(&system, &user, self.temperature, self.seed)?;
        parse_schema(&raw)
    }

    fn system_instruction(known_labels: &[String]) -> String {
        format!(
            "You are an AI assistant that builds descriptive profiles of classes for a text classifier.\n\
             You will be given one data point as field: value pairs and one target class.\n\
             Known classes: {}.\n\
             Describe the relationships between the fields that are relevant to the target class, \
             as general characteristics that would help recognise other members of that class.\n\
             Do not repeat the raw values from the data point.\n\
             Respond only in JSON with {{ \"label\": \"<target class>\", \"description\": [\"<sentence>\", ...] }}.",
            known_labels.join(", ")
        )
    }

    fn user_instruction(label: &str, row: &RowItem) -> String {
        format!("Data point:\n{}\n\nTarget class: {}", format_row(row), label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorError;
    use std::sync::Mutex;

    struct Recording {
        response: Result<String, String>,
        calls: Mutex<Vec<(String, String, f32, i64)>>,
    }

    impl TextGenerator for Recording {
        fn generate(&self, system: &str, user: &str, temperature: f32, seed: i64) -> Result<String, GeneratorError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string(), temperature, seed));
            self.response.clone().map_err(GeneratorError::Other)
        }
    }

    fn row() -> RowItem {
        [("battery_power", "1500"), ("ram", "2048")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_generate_profile() {
        let generator = Arc::new(Recording {
            response: Ok("```json\n{\"label\": \"high\", \"description\": [\"More RAM tends to mean higher price.\"]}\n```".into()),
            calls: Mutex::new(Vec::new()),
        });
        let profiles = ProfileGenerator::new(generator.clone());
        let labels = vec!["low".to_string(), "high".to_string()];

        let profile = profiles.generate_profile("high", &row(), &labels).unwrap();
        assert_eq!(profile.label, "high");
        assert_eq!(profile.descriptions, vec!["More RAM tends to mean higher price."]);

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, user, temperature, seed) = &calls[0];
        assert!(system.contains("low, high"));
        assert!(user.contains("ram: 2048"));
        assert!(user.contains("Target class: high"));
        assert_eq!(*temperature, PROFILE_TEMPERATURE);
        assert_eq!(*seed, DEFAULT_SEED);
    }

    #[test]
    fn test_empty_row() {
        let generator = Arc::new(Recording { response: Ok("{}".into()), calls: Mutex::new(Vec::new()) });
        let profiles = ProfileGenerator::new(generator.clone());
        let result = profiles.generate_profile("high", &RowItem::new(), &[]);
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_generation_failure() {
        let generator = Arc::new(Recording { response: Err("boom".into()), calls: Mutex::new(Vec::new()) });
        let result = ProfileGenerator::new(generator).generate_profile("high", &row(), &[]);
        assert!(matches!(result, Err(ClassifierError::GenerationError(_))));
    }

    #[test]
    fn test_malformed_profile() {
        let generator = Arc::new(Recording {
            response: Ok(r#"{"label": "high", "description": []}"#.into()),
            calls: Mutex::new(Vec::new()),
        });
        let result = ProfileGenerator::new(generator).generate_profile("high", &row(), &[]);
        assert!(matches!(result, Err(ClassifierError::ParseError(_))));
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Class label → ordered descriptions used as context when classifying.
///
/// Descriptions are kept in insertion order and never deduplicated. A label
/// may map to an empty list while it is known but not yet described.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptStore {
    prompts: BTreeMap<String, Vec<String>>,
}

impl PromptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a description to `label`, creating the label if needed.
    pub fn add(&mut self, label: &str, description: &str) -> Result<(), ClassifierError> {
        if label.is_empty() {
            return Err(ClassifierError::ValidationError("Label cannot be empty".into()));
        }
        if description.is_empty() {
            return Err(ClassifierError::ValidationError("Description cannot be empty".into()));
        }
        self.prompts
            .entry(label.to_string())
            .or_default()
            .push(description.to_string());
        Ok(())
    }

    /// Appends every description in `mapping` to the existing lists.
    /// Existing descriptions are never replaced. The mapping is checked as a
    /// whole before anything is added.
    pub fn merge<I, L, D>(&mut self, mapping: I) -> Result<(), ClassifierError>
    where
        I: IntoIterator<Item = (L, Vec<D>)>,
        L: Into<String>,
        D: Into<String>,
    {
        let mapping: Vec<(String, Vec<String>)> = mapping
            .into_iter()
            .map(|(label, descriptions)| {
                (label.into(), descriptions.into_iter().map(Into::into).collect())
            })
            .collect();

        if mapping.is_empty() {
            return Err(ClassifierError::ValidationError("Prompts cannot be empty".into()));
        }
        if mapping.iter().any(|(label, _)| label.is_empty()) {
            return Err(ClassifierError::ValidationError("Label cannot be empty".into()));
        }
        if mapping.iter().any(|(_, descriptions)| descriptions.iter().any(String::is_empty)) {
            return Err(ClassifierError::ValidationError("Description cannot be empty".into()));
        }

        for (label, descriptions) in mapping {
            self.prompts.entry(label).or_default().extend(descriptions);
        }
        Ok(())
    }

    /// Registers `label` with no descriptions if it is not already known.
    pub(crate) fn ensure_label(&mut self, label: &str) {
        if !label.is_empty() {
            self.prompts.entry(label.to_string()).or_default();
        }
    }

    /// Appends at most `limit` descriptions to an existing or new label and
    /// returns how many were added.
    pub(crate) fn extend_bounded(&mut self, label: &str, descriptions: Vec<String>, limit: usize) -> usize {
        let list = self.prompts.entry(label.to_string()).or_default();
        let before = list.len();
        list.extend(
            descriptions
                .into_iter()
                .filter(|d| !d.trim().is_empty())
                .take(limit),
        );
        list.len() - before
    }

    pub fn get(&self, label: &str) -> Result<&[String], ClassifierError> {
        if label.is_empty() {
            return Err(ClassifierError::ValidationError("Label cannot be empty".into()));
        }
        self.prompts
            .get(label)
            .map(Vec::as_slice)
            .ok_or_else(|| ClassifierError::NotFound(format!("label '{}'", label)))
    }

    pub fn remove(&mut self, label: &str) -> Result<Vec<String>, ClassifierError> {
        if label.is_empty() {
            return Err(ClassifierError::ValidationError("Label cannot be empty".into()));
        }
        self.prompts
            .remove(label)
            .ok_or_else(|| ClassifierError::NotFound(format!("label '{}'", label)))
    }

    pub fn clear(&mut self) {
        self.prompts.clear();
    }

    pub fn labels(&self) -> Vec<String> {
        self.prompts.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Number of descriptions stored for `label`, zero when unknown.
    pub fn count(&self, label: &str) -> usize {
        self.prompts.get(label).map_or(0, Vec::len)
    }

    /// Labels that have no descriptions yet.
    pub fn undescribed_labels(&self) -> Vec<String> {
        self.prompts
            .iter()
            .filter(|(_, descriptions)| descriptions.is_empty())
            .map(|(label, _)| label.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.prompts.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.prompts
    }
}

impl From<BTreeMap<String, Vec<String>>> for PromptStore {
    fn from(prompts: BTreeMap<String, Vec<String>>) -> Self {
        Self { prompts }
    }
}

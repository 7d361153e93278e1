use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::ClassifierError;
use super::profile::ProfileGenerator;
use super::prompts::PromptStore;
use super::utils::discover_labels;
use crate::dataset::RowItem;

/// Counters describing one training run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingReport {
    pub rows_visited: usize,
    pub profiles_generated: usize,
    pub profiles_failed: usize,
    pub descriptions_added: usize,
}

/// Fills a [`PromptStore`] with generated descriptions, up to
/// `max_descriptions` per class.
pub struct Trainer<'a> {
    profiles: &'a ProfileGenerator,
    max_descriptions: usize,
    seed: Option<u64>,
}

impl<'a> Trainer<'a> {
    pub fn new(profiles: &'a ProfileGenerator, max_descriptions: usize) -> Self {
        Self {
            profiles,
            max_descriptions,
            seed: None,
        }
    }

    /// Fixes the row visiting order
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Visits every row once, in shuffled order, asking for a profile of each
    /// class that is still below the cap. Stops early once every class is full.
    ///
    /// A failed profile is logged and skipped; it never aborts training.
    pub fn train(
        &self,
        dataset: &[RowItem],
        target_column: &str,
        prompts: &mut PromptStore,
    ) -> Result<TrainingReport, ClassifierError> {
        if dataset.is_empty() {
            return Err(ClassifierError::ValidationError("Dataset cannot be empty".into()));
        }
        if target_column.is_empty() {
            return Err(ClassifierError::ValidationError("Target column cannot be empty".into()));
        }
        if self.max_descriptions == 0 {
            return Err(ClassifierError::ValidationError("Prompt sample size must be at least 1".into()));
        }

        let labels = discover_labels(dataset, target_column)?;
        if labels.is_empty() {
            return Err(ClassifierError::ValidationError(format!(
                "Target column '{}' has no values",
                target_column
            )));
        }
        for label in &labels {
            prompts.ensure_label(label);
        }
        info!(
            "Training on {} rows with {} classes, up to {} descriptions per class",
            dataset.len(),
            labels.len(),
            self.max_descriptions
        );

        let mut order: Vec<usize> = (0..dataset.len()).collect();
        match self.seed {
            Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => order.shuffle(&mut rand::rng()),
        }

        let mut report = TrainingReport::default();
        for index in order {
            let pending: Vec<&String> = labels
                .iter()
                .filter(|label| prompts.count(label) < self.max_descriptions)
                .collect();
            if pending.is_empty() {
                debug!("Every class has {} descriptions, stopping early", self.max_descriptions);
                break;
            }

            let row = &dataset[index];
            for label in pending {
                match self.profiles.generate_profile(label, row, &labels) {
                    Ok(profile) => {
                        if profile.label != *label {
                            debug!("Profile for '{}' came back labelled '{}'", label, profile.label);
                        }
                        let room = self.max_descriptions.saturating_sub(prompts.count(label));
                        let added = prompts.extend_bounded(label, profile.descriptions, room);
                        report.profiles_generated += 1;
                        report.descriptions_added += added;
                    }
                    Err(e) => {
                        warn!("Failed to generate profile for '{}' from row {}: {}", label, index, e);
                        report.profiles_failed += 1;
                    }
                }
            }

            report.rows_visited += 1;
            info!("Visited {}/{} rows", report.rows_visited, dataset.len());
        }

        info!(
            "Training finished: {} descriptions added, {} profiles failed",
            report.descriptions_added, report.profiles_failed
        );
        Ok(report)
    }
}

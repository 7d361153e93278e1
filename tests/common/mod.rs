#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tao_classifier::{
    Classifier, ClassifierBuilder, GeneratorError, RowItem, StorageConfig, TextGenerator,
};

/// One recorded call to a [`ScriptedGenerator`].
#[derive(Debug, Clone)]
pub struct Call {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub seed: i64,
}

type Responder = Box<dyn Fn(&str, &str) -> Result<String, String> + Send + Sync>;

/// Test double for the generative service: answers from a queue first, then
/// from an optional responder function, and records every call.
pub struct ScriptedGenerator {
    queue: Mutex<VecDeque<Result<String, String>>>,
    responder: Option<Responder>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGenerator {
    pub fn queued(responses: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(String::from).map_err(String::from))
                    .collect(),
            ),
            responder: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn responding<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, &str) -> Result<String, String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            responder: Some(Box::new(responder)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, system: &str, user: &str, temperature: f32, seed: i64) -> Result<String, GeneratorError> {
        self.calls.lock().unwrap().push(Call {
            system: system.to_string(),
            user: user.to_string(),
            temperature,
            seed,
        });

        if let Some(response) = self.queue.lock().unwrap().pop_front() {
            return response.map_err(GeneratorError::Other);
        }
        match &self.responder {
            Some(responder) => responder(system, user).map_err(GeneratorError::Other),
            None => Err(GeneratorError::Other("no scripted response".into())),
        }
    }
}

/// Profile answer naming whichever class the user instruction asks about.
pub fn profile_for_requested_class(_system: &str, user: &str) -> Result<String, String> {
    let label = user
        .rsplit("Target class: ")
        .next()
        .unwrap_or_default()
        .trim();
    Ok(format!(
        "Here is the profile:\n```json\n{{\"label\": \"{0}\", \"description\": [\"Rows like this point to {0}.\"]}}\n```",
        label
    ))
}

pub fn row(pairs: &[(&str, &str)]) -> RowItem {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn builder(generator: Arc<ScriptedGenerator>, dir: &tempfile::TempDir) -> ClassifierBuilder {
    Classifier::builder()
        .with_generator(generator)
        .with_storage(StorageConfig::new(dir.path()))
}

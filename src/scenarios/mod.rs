//! Built-in example states.
//!
//! Scenarios are stored as overrides on a shared base state and validated
//! through the same rules as an imported state when the library is loaded.

use crate::domain::AppState;
use crate::schema::parse_app_state;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const LIBRARY_JSON: &str = include_str!("library.json");

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario library is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("scenario {id} is invalid: {}", .errors.join(", "))]
    Invalid { id: String, errors: Vec<String> },
    #[error("scenario ids must be unique: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Deserialize)]
struct RawLibrary {
    base: Map<String, Value>,
    scenarios: Vec<RawScenario>,
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    id: String,
    name: String,
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    overrides: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip)]
    pub state: AppState,
}

#[derive(Debug, Clone)]
pub struct ScenarioLibrary {
    scenarios: Vec<Scenario>,
}

fn infer_tags(id: &str) -> Vec<String> {
    let rules = [
        ("waterfall", "waterfall"),
        ("rounds", "rounds"),
        ("convertible", "convertibles"),
        ("options", "options"),
        ("vesting", "vesting"),
        ("dca", "dca"),
        ("purchase", "dca"),
    ];
    let mut tags: Vec<String> = Vec::new();
    for (needle, tag) in rules {
        if id.contains(needle) && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.is_empty() {
        tags.push("core".to_string());
    }
    tags
}

impl ScenarioLibrary {
    /// Parse and validate the embedded library.
    ///
    /// # Errors
    /// Any scenario that fails validation, or a duplicate id.
    pub fn load() -> Result<Self, ScenarioError> {
        Self::from_json(LIBRARY_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let raw: RawLibrary = serde_json::from_str(json)?;
        let mut scenarios: Vec<Scenario> = Vec::with_capacity(raw.scenarios.len());

        for entry in raw.scenarios {
            if scenarios.iter().any(|s| s.id == entry.id) {
                return Err(ScenarioError::DuplicateId(entry.id));
            }
            let mut state = raw.base.clone();
            state.extend(entry.overrides);
            let state = parse_app_state(&Value::Object(state)).map_err(|err| {
                ScenarioError::Invalid {
                    id: entry.id.clone(),
                    errors: err.messages(),
                }
            })?;
            let tags = if entry.tags.is_empty() {
                infer_tags(&entry.id)
            } else {
                entry.tags
            };
            scenarios.push(Scenario {
                id: entry.id,
                name: entry.name,
                description: entry.description,
                tags,
                state,
            });
        }

        tracing::debug!(count = scenarios.len(), "loaded scenario library");
        Ok(Self { scenarios })
    }

    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.id == id)
    }
}

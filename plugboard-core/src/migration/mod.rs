//! Model migrations
//!
//! Host models persisted by an older build may use a different shape than the
//! plugins expect. A [`MigrationSet`] upgrades such a model step by step,
//! tracking progress in the integer [`MODEL_VERSION_KEY`] field.

use plugboard_api::Model;
use serde_json::{Map, Value};
use thiserror::Error;

/// Model key holding the shape version
pub const MODEL_VERSION_KEY: &str = "ModelVersion";

/// Errors raised while migrating a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    /// `ModelVersion` is present but not a non-negative integer
    #[error("Invalid model version: {0}")]
    InvalidVersion(Value),

    /// The model was written by a newer build
    #[error("Model version {found} is newer than supported version {target}")]
    TooNew { found: u64, target: u64 },

    /// No step starts at the current version
    #[error("No migration from model version {from} (target {target})")]
    Gap { from: u64, target: u64 },

    /// A step failed
    #[error("Migration {name} failed: {message}")]
    Step { name: String, message: String },
}

type MigrateFn = Box<dyn Fn(&Model) -> Result<Model, MigrationError> + Send + Sync>;

/// One upgrade step from `from` to `to`
pub struct Migration {
    pub name: String,
    pub from: u64,
    pub to: u64,
    apply: MigrateFn,
}

impl Migration {
    pub fn new<F>(name: impl Into<String>, from: u64, to: u64, apply: F) -> Self
    where
        F: Fn(&Model) -> Result<Model, MigrationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            from,
            to,
            apply: Box::new(apply),
        }
    }
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Ordered set of model migrations
#[derive(Debug, Default)]
pub struct MigrationSet {
    steps: Vec<Migration>,
}

impl MigrationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Migrations for the reference plugins
    pub fn reference() -> Self {
        Self::new().step(Migration::new(
            "v001_counter_state",
            0,
            1,
            nest_counter_state,
        ))
    }

    /// Builder: add a step
    pub fn step(mut self, migration: Migration) -> Self {
        self.steps.push(migration);
        self
    }

    /// Highest version reachable with these steps
    pub fn target_version(&self) -> u64 {
        self.steps.iter().map(|m| m.to).max().unwrap_or(0)
    }

    /// Read the version of a model. A missing field means version 0.
    pub fn current_version(model: &Model) -> Result<u64, MigrationError> {
        match model.get(MODEL_VERSION_KEY) {
            None => Ok(0),
            Some(value) => value
                .as_u64()
                .ok_or_else(|| MigrationError::InvalidVersion(value.clone())),
        }
    }

    /// Run all pending migrations and return the upgraded model
    pub fn migrate(&self, model: &Model) -> Result<Model, MigrationError> {
        let target = self.target_version();
        let mut current = Self::current_version(model)?;

        if current > target {
            return Err(MigrationError::TooNew {
                found: current,
                target,
            });
        }

        let mut next = model.clone();
        while current < target {
            let step = self
                .steps
                .iter()
                .find(|m| m.from == current && m.to > current)
                .ok_or(MigrationError::Gap {
                    from: current,
                    target,
                })?;

            tracing::info!(
                migration = %step.name,
                from = step.from,
                to = step.to,
                "Running model migration"
            );
            next = (step.apply)(&next)?;
            current = step.to;
            next.insert(MODEL_VERSION_KEY, current);
        }

        Ok(next)
    }
}

/// Move a flat top-level `Counter` under `CounterState.Counter`
fn nest_counter_state(model: &Model) -> Result<Model, MigrationError> {
    let mut map = model.as_map().clone();
    let Some(counter) = map.remove("Counter") else {
        return Ok(model.clone());
    };

    if !counter.is_number() {
        return Err(MigrationError::Step {
            name: "v001_counter_state".to_string(),
            message: format!("Counter is not a number: {counter}"),
        });
    }

    let mut state = match map.remove("CounterState") {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };
    state.entry("Counter").or_insert(counter);
    map.insert("CounterState".to_string(), Value::Object(state));

    Ok(Model::from(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(value: Value) -> Model {
        Model::from_value(value).unwrap()
    }

    #[test]
    fn test_migrate_flat_counter() {
        let migrations = MigrationSet::reference();
        let old = model(json!({"Counter": 3, "CustomState": {"slider": {"value": 1}}}));

        let next = migrations.migrate(&old).unwrap();

        assert_eq!(
            next.into_value(),
            json!({
                "CounterState": {"Counter": 3},
                "CustomState": {"slider": {"value": 1}},
                "ModelVersion": 1
            })
        );
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let migrations = MigrationSet::reference();
        let once = migrations.migrate(&model(json!({"Counter": 3}))).unwrap();
        let twice = migrations.migrate(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_migrate_without_counter_only_stamps_version() {
        let migrations = MigrationSet::reference();
        let next = migrations.migrate(&Model::new()).unwrap();
        assert_eq!(next.into_value(), json!({"ModelVersion": 1}));
    }

    #[test]
    fn test_input_model_is_untouched() {
        let old = model(json!({"Counter": 3}));
        let _ = MigrationSet::reference().migrate(&old).unwrap();
        assert_eq!(old.get("Counter"), Some(&json!(3)));
    }

    #[test]
    fn test_newer_model_is_rejected() {
        let err = MigrationSet::reference()
            .migrate(&model(json!({"ModelVersion": 7})))
            .unwrap_err();
        assert_eq!(err, MigrationError::TooNew { found: 7, target: 1 });
    }

    #[test]
    fn test_invalid_version_is_rejected() {
        let err = MigrationSet::reference()
            .migrate(&model(json!({"ModelVersion": "one"})))
            .unwrap_err();
        assert!(matches!(err, MigrationError::InvalidVersion(_)));
    }

    #[test]
    fn test_gap_is_reported() {
        let migrations = MigrationSet::new().step(Migration::new("v002", 1, 2, |m| Ok(m.clone())));
        let err = migrations.migrate(&Model::new()).unwrap_err();
        assert_eq!(err, MigrationError::Gap { from: 0, target: 2 });
    }

    #[test]
    fn test_steps_run_in_version_order() {
        let migrations = MigrationSet::new()
            .step(Migration::new("second", 1, 2, |m| {
                let trail = m.get("trail").and_then(Value::as_str).unwrap_or("");
                Ok(m.with("trail", format!("{trail}b")))
            }))
            .step(Migration::new("first", 0, 1, |m| Ok(m.with("trail", "a"))));

        let next = migrations.migrate(&Model::new()).unwrap();
        assert_eq!(next.get("trail"), Some(&json!("ab")));
        assert_eq!(next.get(MODEL_VERSION_KEY), Some(&json!(2)));
    }

    #[test]
    fn test_non_numeric_counter_fails() {
        let err = MigrationSet::reference()
            .migrate(&model(json!({"Counter": "three"})))
            .unwrap_err();
        assert!(matches!(err, MigrationError::Step { .. }));
    }
}

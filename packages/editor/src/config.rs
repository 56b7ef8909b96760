use coursekit_common::IdStrategy;
use serde::{Deserialize, Serialize};

/// Editor tuning knobs, embedded in the CLI config file under `editor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum gap between the two presses of the MCQ collapse gesture
    pub double_backspace_window_ms: u64,

    /// Maximum number of undo levels kept by a session
    pub undo_levels: usize,

    /// How fresh block ids are generated
    pub id_strategy: IdStrategy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            double_backspace_window_ms: 500,
            undo_levels: 100,
            id_strategy: IdStrategy::Random,
        }
    }
}

impl EditorConfig {
    /// Deterministic config for fixtures and tests
    pub fn sequential(seed: impl Into<String>) -> Self {
        Self {
            id_strategy: IdStrategy::Sequential { seed: seed.into() },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.double_backspace_window_ms, 500);
        assert_eq!(config.undo_levels, 100);
        assert_eq!(config.id_strategy, IdStrategy::Random);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "doubleBackspaceWindowMs": 250 }"#).unwrap();
        assert_eq!(config.double_backspace_window_ms, 250);
        assert_eq!(config.undo_levels, 100);
    }

    #[test]
    fn test_sequential_strategy_from_json() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "idStrategy": { "sequential": { "seed": "doc" } } }"#)
                .unwrap();
        assert_eq!(
            config.id_strategy,
            IdStrategy::Sequential {
                seed: "doc".to_string()
            }
        );
    }
}

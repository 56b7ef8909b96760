use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How fresh identifiers are produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdStrategy {
    /// Random UUID v4 (production default)
    Random,

    /// `{seed}-{n}` with a per-generator counter (deterministic, for tests and fixtures)
    Sequential { seed: String },
}

impl Default for IdStrategy {
    fn default() -> Self {
        IdStrategy::Random
    }
}

impl FromStr for IdStrategy {
    type Err = CommonError;

    /// Parses `random` or `sequential:<seed>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None if s == "random" => Ok(IdStrategy::Random),
            Some(("sequential", seed)) if !seed.is_empty() => Ok(IdStrategy::Sequential {
                seed: seed.to_string(),
            }),
            _ => Err(CommonError::InvalidIdStrategy(s.to_string())),
        }
    }
}

/// Identifier generator owned by a document or TOC editor
#[derive(Debug, Clone)]
pub struct IdGenerator {
    strategy: IdStrategy,
    count: u64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy, count: 0 }
    }

    pub fn random() -> Self {
        Self::new(IdStrategy::Random)
    }

    pub fn sequential(seed: impl Into<String>) -> Self {
        Self::new(IdStrategy::Sequential { seed: seed.into() })
    }

    /// Generate the next identifier
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        match &self.strategy {
            IdStrategy::Random => uuid::Uuid::new_v4().to_string(),
            IdStrategy::Sequential { seed } => format!("{}-{}", seed, self.count),
        }
    }

    /// Mark an identifier that already exists elsewhere as taken.
    ///
    /// A sequential generator whose seed produced `id` skips past it; random
    /// ids need no bookkeeping.
    pub fn reserve(&mut self, id: &str) {
        if let IdStrategy::Sequential { seed } = &self.strategy {
            let issued = id
                .strip_prefix(seed.as_str())
                .and_then(|rest| rest.strip_prefix('-'))
                .and_then(|n| n.parse::<u64>().ok());
            if let Some(n) = issued {
                self.count = self.count.max(n);
            }
        }
    }

    /// Number of identifiers generated so far
    pub fn issued(&self) -> u64 {
        self.count
    }

    pub fn strategy(&self) -> &IdStrategy {
        &self.strategy
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::sequential("doc");

        assert_eq!(gen.new_id(), "doc-1");
        assert_eq!(gen.new_id(), "doc-2");
        assert_eq!(gen.new_id(), "doc-3");
        assert_eq!(gen.issued(), 3);
    }

    #[test]
    fn test_reserve_skips_existing_ids() {
        let mut gen = IdGenerator::sequential("doc");
        gen.reserve("doc-7");
        gen.reserve("doc-3");
        gen.reserve("other-40");
        gen.reserve("doc-x");

        assert_eq!(gen.new_id(), "doc-8");
    }

    #[test]
    fn test_random_ids_are_unique_uuids() {
        let mut gen = IdGenerator::random();
        let a = gen.new_id();
        let b = gen.new_id();

        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("random".parse::<IdStrategy>().unwrap(), IdStrategy::Random);
        assert_eq!(
            "sequential:toc".parse::<IdStrategy>().unwrap(),
            IdStrategy::Sequential {
                seed: "toc".to_string()
            }
        );
        assert!("sequential:".parse::<IdStrategy>().is_err());
        assert!("uuid".parse::<IdStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde_shape() {
        let json = serde_json::to_string(&IdStrategy::Sequential {
            seed: "s".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"sequential":{"seed":"s"}}"#);

        let parsed: IdStrategy = serde_json::from_str(r#""random""#).unwrap();
        assert_eq!(parsed, IdStrategy::Random);
    }
}

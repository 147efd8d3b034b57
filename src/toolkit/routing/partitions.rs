use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::core::config::{ConciergeConfig, PartitionDef};
use crate::core::error::{ConciergeError, Result};


/// Identifier of a configured partition. Only a [`PartitionRegistry`] hands these out,
/// so holding one means the id was validated against the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PartitionId(String);

impl PartitionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    pub id: PartitionId,
    pub description: String,
    pub top_k: usize,
}


#[derive(Debug, Clone)]
pub struct PartitionRegistry {
    partitions: Vec<Partition>,
    by_id: HashMap<String, usize>,
}

impl PartitionRegistry {
    pub fn new(defs: &[PartitionDef], default_top_k: usize) -> Result<Self> {
        let mut partitions = Vec::with_capacity(defs.len());
        let mut by_id = HashMap::with_capacity(defs.len());

        for def in defs {
            let id = def.id.trim();
            if id.is_empty() {
                return Err(ConciergeError::Config("partition id cannot be empty".into()));
            }
            if by_id.insert(id.to_string(), partitions.len()).is_some() {
                return Err(ConciergeError::Config(format!("duplicate partition id: {id}")));
            }
            partitions.push(Partition {
                id: PartitionId(id.to_string()),
                description: def.description.clone(),
                top_k: def.top_k.unwrap_or(default_top_k).max(1),
            });
        }

        if partitions.is_empty() {
            return Err(ConciergeError::Config("partition registry is empty".into()));
        }

        Ok(Self { partitions, by_id })
    }

    pub fn from_config(config: &ConciergeConfig) -> Result<Self> {
        Self::new(&config.partitions, config.default_top_k)
    }

    /// Exact, case-sensitive lookup of an untrusted id.
    pub fn resolve(&self, raw: &str) -> Option<&Partition> {
        self.by_id.get(raw).map(|&i| &self.partitions[i])
    }

    /// Registry position, used as the tie-break order during fusion.
    pub fn position(&self, id: &PartitionId) -> Option<usize> {
        self.by_id.get(id.as_str()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_partitions;

    #[test]
    fn test_default_registry_resolves_known_ids() {
        let registry = PartitionRegistry::new(&default_partitions(), 3).unwrap();
        assert_eq!(registry.len(), 5);

        let ai = registry
            .resolve("computer-science-with-artificial-intelligence-bsc-hons")
            .unwrap();
        assert_eq!(ai.top_k, 3);
        assert_eq!(registry.resolve("computer-science-mphil-phd").unwrap().top_k, 1);
    }

    #[test]
    fn test_resolve_is_exact() {
        let registry = PartitionRegistry::new(&default_partitions(), 3).unwrap();
        assert!(registry.resolve("Computer-Science-BSc-Hons").is_none());
        assert!(registry.resolve(" computer-science-bsc-hons").is_none());
        assert!(registry.resolve("law-llb-hons").is_none());
    }

    #[test]
    fn test_position_follows_definition_order() {
        let defs = vec![PartitionDef::new("b", "second"), PartitionDef::new("a", "first")];
        let registry = PartitionRegistry::new(&defs, 3).unwrap();
        let b = registry.resolve("b").unwrap().id.clone();
        let a = registry.resolve("a").unwrap().id.clone();
        assert_eq!(registry.position(&b), Some(0));
        assert_eq!(registry.position(&a), Some(1));
    }

    #[test]
    fn test_duplicates_and_empty_rejected() {
        let dup = vec![PartitionDef::new("a", "x"), PartitionDef::new("a", "y")];
        assert!(PartitionRegistry::new(&dup, 3).is_err());
        assert!(PartitionRegistry::new(&[], 3).is_err());
    }

    #[test]
    fn test_zero_top_k_is_clamped() {
        let defs = vec![PartitionDef::new("a", "x").with_top_k(0)];
        let registry = PartitionRegistry::new(&defs, 3).unwrap();
        assert_eq!(registry.resolve("a").unwrap().top_k, 1);
    }
}

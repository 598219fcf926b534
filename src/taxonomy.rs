//! Hierarchical domain taxonomy.
//!
//! A taxonomy is a forest of domains. Each domain carries the concept phrases a scorer matches
//! utterances against, the names of its child domains, and optionally a canned response.
//! Loaded from a JSON array:
//!
//! ```json
//! [
//!   { "domain": "travel", "concepts": ["travel", "trip"], "children": ["flight"] },
//!   { "domain": "flight", "concepts": ["flight", "plane ticket"], "response": "Where to?" }
//! ]
//! ```
//!
//! ## Invariants
//!
//! - Domain names are unique.
//! - Every child names a declared domain, and no domain has two parents.
//! - Parent links are acyclic, so every domain has a finite path from its root.

use crate::collab::{DomainPath, ResponseCatalog};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One taxonomy entry as written in the JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainSpec {
    pub domain: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Domain {
    pub name: String,
    pub concepts: Vec<String>,
    pub children: Vec<String>,
    pub response: Option<String>,
    pub parent: Option<String>,
    /// Path from the root through this domain; empty for root domains.
    pub path: DomainPath,
}

#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    domains: Vec<Domain>,
    index: HashMap<String, usize>,
}

impl Taxonomy {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let specs: Vec<DomainSpec> = serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;
        Self::from_specs(specs)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let specs: Vec<DomainSpec> = serde_json::from_str(text).map_err(|e| Error::json(PathBuf::from("<inline>"), e))?;
        Self::from_specs(specs)
    }

    pub fn from_specs(specs: Vec<DomainSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (idx, spec) in specs.iter().enumerate() {
            if index.insert(spec.domain.clone(), idx).is_some() {
                return Err(Error::DuplicateDomain(spec.domain.clone()));
            }
        }

        let mut parents: Vec<Option<usize>> = vec![None; specs.len()];
        for (idx, spec) in specs.iter().enumerate() {
            for child in &spec.children {
                let Some(&child_idx) = index.get(child) else {
                    return Err(Error::UnknownChild { parent: spec.domain.clone(), child: child.clone() });
                };
                if let Some(first) = parents[child_idx] {
                    if first != idx {
                        return Err(Error::MultipleParents {
                            child: child.clone(),
                            first: specs[first].domain.clone(),
                            second: spec.domain.clone(),
                        });
                    }
                }
                parents[child_idx] = Some(idx);
            }
        }

        let mut domains = Vec::with_capacity(specs.len());
        for (idx, spec) in specs.iter().enumerate() {
            let path = ancestry(idx, &parents, &specs)?;
            domains.push(Domain {
                name: spec.domain.clone(),
                concepts: spec.concepts.clone(),
                children: spec.children.clone(),
                response: spec.response.clone(),
                parent: parents[idx].map(|p| specs[p].domain.clone()),
                path,
            });
        }

        Ok(Taxonomy { domains, index })
    }

    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.index.get(name).map(|&idx| &self.domains[idx])
    }

    /// Domains in declaration order.
    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.iter()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Domain> {
        self.domains.iter().filter(|d| d.parent.is_none())
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl ResponseCatalog for Taxonomy {
    fn response_for(&self, domain: &str) -> Option<String> {
        self.get(domain).and_then(|d| d.response.clone())
    }
}

fn ancestry(idx: usize, parents: &[Option<usize>], specs: &[DomainSpec]) -> Result<DomainPath> {
    if parents[idx].is_none() {
        return Ok(DomainPath::default());
    }

    let mut chain = vec![specs[idx].domain.as_str()];
    let mut cursor = parents[idx];
    while let Some(parent) = cursor {
        if chain.len() > specs.len() {
            return Err(Error::Cycle(specs[idx].domain.clone()));
        }
        chain.push(specs[parent].domain.as_str());
        cursor = parents[parent];
    }
    chain.reverse();
    Ok(DomainPath::from_segments(chain))
}

//! Balance manager domain: the on-chain account object holding a trader's
//! funds, and the explicit label → object id mapping used to refer to it.

#[cfg(feature = "http")]
pub mod client;

use crate::shared::ObjectIdStr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label used for a lone `BALANCE_MANAGER_ID` when no key is configured.
pub const DEFAULT_MANAGER_LABEL: &str = "BM1";

/// A balance manager addressed by both its label and its object id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRef {
    pub label: String,
    pub id: ObjectIdStr,
}

/// Explicit label → object id mapping, supplied through configuration.
///
/// Resolution never mutates anything outside this table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerRegistry {
    entries: BTreeMap<String, ObjectIdStr>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `LABEL=0x…,LABEL2=0x…`. Blank entries are skipped.
    pub fn parse(list: &str) -> Result<Self, String> {
        let mut registry = Self::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (label, id) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected LABEL=0x…, got '{}'", entry))?;
            let label = label.trim();
            if label.is_empty() {
                return Err(format!("empty label in '{}'", entry));
            }
            let id = ObjectIdStr::parse(id).map_err(|e| format!("{}: {}", label, e))?;
            if let Some(existing) = registry.get(label).filter(|e| **e != id) {
                return Err(format!("{} is mapped to both {} and {}", label, existing, id));
            }
            registry.insert(label, id);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, label: &str, id: ObjectIdStr) {
        self.entries.insert(label.to_string(), id);
    }

    pub fn get(&self, label: &str) -> Option<&ObjectIdStr> {
        self.entries.get(label)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObjectIdStr)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn label_for(&self, id: &ObjectIdStr) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == id)
            .map(|(k, _)| k.as_str())
    }

    /// Resolve a label or a raw object id.
    ///
    /// A raw id that is not in the table resolves to itself, labelled with the
    /// id string.
    pub fn resolve(&self, label_or_id: &str) -> Option<ManagerRef> {
        let needle = label_or_id.trim();
        if ObjectIdStr::looks_like(needle) {
            let id = ObjectIdStr::parse(needle).ok()?;
            let label = self
                .label_for(&id)
                .map(str::to_string)
                .unwrap_or_else(|| id.to_string());
            return Some(ManagerRef { label, id });
        }
        self.entries.get(needle).map(|id| ManagerRef {
            label: needle.to_string(),
            id: id.clone(),
        })
    }

    /// The only entry, if exactly one is configured.
    pub fn single(&self) -> Option<ManagerRef> {
        if self.entries.len() != 1 {
            return None;
        }
        self.entries.iter().next().map(|(label, id)| ManagerRef {
            label: label.clone(),
            id: id.clone(),
        })
    }
}

//! @ai:module:intent Define the configured, closed vocabulary of entity labels
//! @ai:module:layer domain
//! @ai:module:public_api Label, LabelSet, DEFAULT_LABELS
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label names used when no configuration overrides them.
pub const DEFAULT_LABELS: [&str; 4] = ["ASSIGNMENT", "ASSESSMENT", "LECTURE", "SECTION"];

/// Directives reference labels by a single digit, so at most nine are addressable.
pub const MAX_LABELS: usize = 9;

/// @ai:intent A label resolved from a 1-based index into a LabelSet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub index: u32,
    pub name: String,
}

/// @ai:intent Ordered label vocabulary; directive indices are 1-based positions in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
    names: Vec<String>,
}

impl LabelSet {
    /// @ai:intent Build a label set, rejecting empty, oversized or duplicated vocabularies
    /// @ai:post result.len() in 1..=MAX_LABELS
    /// @ai:effects pure
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let set = Self { names };
        set.validate()?;
        Ok(set)
    }

    /// @ai:intent Check the structural constraints of the vocabulary
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(Error::Config("label set must not be empty".to_string()));
        }
        if self.names.len() > MAX_LABELS {
            return Err(Error::Config(format!(
                "label set has {} labels, at most {} can be addressed by a single digit",
                self.names.len(),
                MAX_LABELS
            )));
        }
        for (idx, name) in self.names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("label {} has an empty name", idx + 1)));
            }
            if self.names[..idx].contains(name) {
                return Err(Error::Config(format!("duplicate label `{}`", name)));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// @ai:intent Resolve a 1-based index to a label
    /// @ai:post None when index == 0 or index > len()
    /// @ai:effects pure
    pub fn get(&self, index: u32) -> Option<Label> {
        let position = (index as usize).checked_sub(1)?;
        self.names.get(position).map(|name| Label {
            index,
            name: name.clone(),
        })
    }

    /// @ai:intent Check whether a 1-based index addresses a label
    pub fn contains_index(&self, index: u32) -> bool {
        index >= 1 && (index as usize) <= self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listed: Vec<String> = self
            .names
            .iter()
            .enumerate()
            .map(|(idx, name)| format!("{}={}", idx + 1, name))
            .collect();
        write!(f, "[{}]", listed.join(", "))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_four_labels() {
        let labels = LabelSet::default();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels.get(1).unwrap().name, "ASSIGNMENT");
        assert_eq!(labels.get(4).unwrap().name, "SECTION");
    }

    #[test]
    fn test_get_is_one_based() {
        let labels = LabelSet::default();
        assert!(labels.get(0).is_none());
        assert!(labels.get(5).is_none());
        assert!(labels.contains_index(1));
        assert!(!labels.contains_index(0));
    }

    #[test]
    fn test_rejects_invalid_sets() {
        assert!(LabelSet::new(Vec::<String>::new()).is_err());
        assert!(LabelSet::new(["A", "B", "A"]).is_err());
        assert!(LabelSet::new((0..10).map(|i| format!("L{}", i))).is_err());
        assert!(LabelSet::new(["DATE", "TIME"]).is_ok());
    }

    #[test]
    fn test_display_lists_indices() {
        let labels = LabelSet::new(["DATE", "TIME"]).unwrap();
        assert_eq!(labels.to_string(), "[1=DATE, 2=TIME]");
    }
}

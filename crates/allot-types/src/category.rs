use serde::{Deserialize, Serialize};

/// Category grouping key shared by intentions, preference scores and targets.
///
/// Matching is exact. Normalization only happens when a name is registered
/// through [`Category::normalized`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Trimmed, first character upper-cased, the rest lower-cased.
    pub fn normalized(name: &str) -> Self {
        let trimmed = name.trim();
        let mut chars = trimmed.chars();
        let formatted: String = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        };
        Self(formatted)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for Category {
    fn default() -> Self {
        Self("Uncategorized".into())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

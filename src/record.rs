use serde::{Deserialize, Serialize};

/// A single technique record extracted from one detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jutsu {
    /// Technique name, taken from the page title
    pub name: String,

    /// Classification from the side panel, empty when the page has none
    pub category: String,

    /// Article body text, side panel stripped and trivia cut off
    pub description: String,
}

impl Jutsu {
    /// Create a new record
    pub fn new(name: String, category: String, description: String) -> Self {
        Self {
            name,
            category,
            description,
        }
    }
}

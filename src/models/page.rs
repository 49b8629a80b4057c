use serde::{Deserialize, Serialize};

/// Page body exchanged with the frontend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markdown: String,
}

impl Page {
    pub fn new(title: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
        }
    }

    /// Parse a request body; missing fields default to empty strings
    pub fn from_json(body: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

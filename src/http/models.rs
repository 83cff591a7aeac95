//! Request and response bodies of the HTTP API
//!
//! Shared by the server handlers and [`crate::client::RemoteClient`].

use crate::catalog::ProteinRecord;
use crate::graph::Neighbourhood;
use serde::{Deserialize, Serialize};

/// Maximum number of records returned by `/api/search`
pub const SEARCH_LIMIT: usize = 50;

/// Search mode of `/api/search`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Id,
    Name,
    Description,
    #[default]
    Combined,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Id => "id",
            SearchType::Name => "name",
            SearchType::Description => "description",
            SearchType::Combined => "combined",
        }
    }
}

/// Query string of `/api/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default, rename = "type")]
    pub search_type: SearchType,
}

/// Query string of `/api/protein/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct ProteinParams {
    #[serde(default = "default_depth")]
    pub depth: usize,
}

fn default_depth() -> usize {
    1
}

/// Body of `/api/protein/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinDetails {
    pub info: Option<ProteinRecord>,
    pub graph: Option<Neighbourhood>,
}

/// Body of a settled `POST /api/labeling`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelingResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_names() {
        let parsed: SearchType = serde_json::from_str("\"description\"").unwrap();
        assert_eq!(parsed, SearchType::Description);
        assert_eq!(SearchType::default().as_str(), "combined");
    }
}

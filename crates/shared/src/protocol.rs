use serde::{Deserialize, Serialize};

/// Query string accepted by every collection `GET`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    /// The trimmed search term, or `None` when absent or blank.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

pub fn collection_route(collection: &str) -> String {
    format!("/{collection}/")
}

pub fn member_route(collection: &str, id: impl std::fmt::Display) -> String {
    format!("/{collection}/{id}/")
}

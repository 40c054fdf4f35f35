use serde::{Deserialize, Serialize};

pub use club::{
    ClubContact, ClubItem, ClubLexiconEntry, ClubListResponse, SearchCandidate, VerifiedContact,
};
pub use event::{parse_timestamp, CreatedResponse, ExtractedEvent, ParseEventRequest};

mod club;
mod event;

/// Query string accepted by `GET /api/clubs`.
///
/// `tags` and `roles` may be repeated (`?tags=a&tags=b`) and each value may
/// itself be a comma-separated list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClubSearchParams {
    /// Free-text query; empty means plain listing
    pub q: String,
    /// Tag slugs
    pub tags: Vec<String>,
    /// Officer roles overriding the configured set
    pub roles: Vec<String>,
}

impl ClubSearchParams {
    /// Build from raw query pairs. Unknown keys are ignored and the last `q`
    /// wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => params.q = value,
                "tags" => params.tags.extend(split_list(&value)),
                "roles" => params.roles.extend(split_list(&value)),
                _ => {}
            }
        }
        params
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags.clone()
    }

    pub fn role_list(&self) -> Option<Vec<String>> {
        (!self.roles.is_empty()).then(|| self.roles.clone())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
}

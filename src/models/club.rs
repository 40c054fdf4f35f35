use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the club lexicon: a club name and the id it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClubLexiconEntry {
    pub name: String,
    pub id: Uuid,
}

impl ClubLexiconEntry {
    pub fn new(name: impl Into<String>, id: Uuid) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// A person listed as a point of contact for a club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubContact {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub verified: bool,
}

/// A club record as loaded for search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub contacts: Vec<ClubContact>,
}

impl SearchCandidate {
    pub fn verified_contacts(&self) -> impl Iterator<Item = &ClubContact> {
        self.contacts.iter().filter(|contact| contact.verified)
    }
}

/// Public contact shape; only verified contacts are ever serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedContact {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
}

/// Public club shape returned by the listing and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub verified_contacts: Vec<VerifiedContact>,
}

impl From<&SearchCandidate> for ClubItem {
    fn from(candidate: &SearchCandidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            tags: candidate.tags.clone(),
            updated_at: candidate.updated_at,
            verified_contacts: candidate
                .verified_contacts()
                .map(|contact| VerifiedContact {
                    id: contact.id,
                    name: contact.name.clone(),
                    role: contact.role.clone(),
                    email: contact.email.clone(),
                })
                .collect(),
        }
    }
}

/// Response envelope for club listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubListResponse {
    pub items: Vec<ClubItem>,
    pub total: usize,
}

impl From<Vec<ClubItem>> for ClubListResponse {
    fn from(items: Vec<ClubItem>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

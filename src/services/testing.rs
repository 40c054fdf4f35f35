//! In-memory collaborators for unit tests.

use crate::error::{ApiError, Result};
use crate::models::{ClubContact, ClubLexiconEntry, ExtractedEvent, SearchCandidate};
use crate::services::club_search::{has_any_tag, passes_prefilter, ClubStore};
use crate::services::database::EventStore;
use crate::services::extraction::{EventExtractor, ExtractionRequest, RawExtraction};
use crate::services::lexicon::LexiconStore;
use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Mutex;
use uuid::Uuid;

/// Club with no description, tags or contacts, updated `minutes_ago` before
/// a fixed reference time.
pub fn candidate(name: &str, minutes_ago: i64) -> SearchCandidate {
    SearchCandidate {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        tags: Vec::new(),
        updated_at: reference_time() - Duration::minutes(minutes_ago),
        contacts: Vec::new(),
    }
}

pub fn contact(name: &str, role: &str, verified: bool) -> ClubContact {
    ClubContact {
        id: Uuid::new_v4(),
        name: name.to_string(),
        role: role.to_string(),
        email: None,
        verified,
    }
}

fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
}

#[derive(Default)]
pub struct MemoryStore {
    clubs: Vec<SearchCandidate>,
    locations: Vec<String>,
    events: Mutex<Vec<(Uuid, ExtractedEvent)>>,
}

impl MemoryStore {
    pub fn with_club(self, name: &str) -> Self {
        let age = self.clubs.len() as i64;
        self.with_candidate(candidate(name, age))
    }

    pub fn with_candidate(mut self, club: SearchCandidate) -> Self {
        self.clubs.push(club);
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.locations.push(location.to_string());
        self
    }

    pub fn club_lexicon_entries(&self) -> Vec<ClubLexiconEntry> {
        self.clubs
            .iter()
            .map(|club| ClubLexiconEntry::new(club.name.clone(), club.id))
            .collect()
    }

    pub fn stored_events(&self) -> Vec<(Uuid, ExtractedEvent)> {
        self.events.lock().unwrap().clone()
    }

    fn newest_first(&self, keep: impl Fn(&SearchCandidate) -> bool) -> Vec<SearchCandidate> {
        let mut clubs: Vec<SearchCandidate> =
            self.clubs.iter().filter(|club| keep(*club)).cloned().collect();
        clubs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        clubs
    }
}

#[async_trait]
impl LexiconStore for MemoryStore {
    async fn club_lexicon(&self) -> Result<Vec<ClubLexiconEntry>> {
        Ok(self.club_lexicon_entries())
    }

    async fn event_locations(&self) -> Result<Vec<String>> {
        Ok(self.locations.clone())
    }
}

#[async_trait]
impl ClubStore for MemoryStore {
    async fn candidate_clubs(
        &self,
        tokens: &[String],
        tags: &[String],
    ) -> Result<Vec<SearchCandidate>> {
        Ok(self.newest_first(|club| passes_prefilter(club, tokens) && has_any_tag(club, tags)))
    }

    async fn list_clubs(&self, tags: &[String]) -> Result<Vec<SearchCandidate>> {
        Ok(self.newest_first(|club| has_any_tag(club, tags)))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, event: &ExtractedEvent) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.events.lock().unwrap().push((id, event.clone()));
        Ok(id)
    }
}

/// Every call fails as if the database were down.
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(ApiError::DatabaseError("connection refused".to_string()))
}

#[async_trait]
impl LexiconStore for FailingStore {
    async fn club_lexicon(&self) -> Result<Vec<ClubLexiconEntry>> {
        unavailable()
    }

    async fn event_locations(&self) -> Result<Vec<String>> {
        unavailable()
    }
}

#[async_trait]
impl ClubStore for FailingStore {
    async fn candidate_clubs(
        &self,
        _tokens: &[String],
        _tags: &[String],
    ) -> Result<Vec<SearchCandidate>> {
        unavailable()
    }

    async fn list_clubs(&self, _tags: &[String]) -> Result<Vec<SearchCandidate>> {
        unavailable()
    }
}

#[async_trait]
impl EventStore for FailingStore {
    async fn create_event(&self, _event: &ExtractedEvent) -> Result<Uuid> {
        unavailable()
    }
}

/// Configured extractor that always answers with the same JSON object.
pub struct StaticExtractor {
    body: serde_json::Value,
}

impl StaticExtractor {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }
}

#[async_trait]
impl EventExtractor for StaticExtractor {
    fn is_configured(&self) -> bool {
        true
    }

    async fn extract(&self, _request: &ExtractionRequest) -> anyhow::Result<RawExtraction> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Configured extractor whose every call times out.
pub struct FailingExtractor;

#[async_trait]
impl EventExtractor for FailingExtractor {
    fn is_configured(&self) -> bool {
        true
    }

    async fn extract(&self, _request: &ExtractionRequest) -> anyhow::Result<RawExtraction> {
        bail!("operation timed out")
    }
}

use crate::error::Result;
use crate::models::ClubLexiconEntry;
use async_trait::async_trait;
use lazy_static::lazy_static;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Read-only source of club names and known event locations.
#[async_trait]
pub trait LexiconStore: Send + Sync {
    async fn club_lexicon(&self) -> Result<Vec<ClubLexiconEntry>>;

    /// Distinct, non-null locations of stored events.
    async fn event_locations(&self) -> Result<Vec<String>>;
}

const SAMPLE_CLUBS: [(&str, u128); 10] = [
    ("Algory Capital", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0001),
    ("Emory Consulting Group", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0002),
    ("AI Society", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0003),
    ("Blockchain Club", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0004),
    ("Emory Data Science Club", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0005),
    ("Impact Investing Group", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0006),
    ("Goizueta Finance Club", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0007),
    ("Emory Entrepreneurship Club", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0008),
    ("Marketing Analytics Club", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_0009),
    ("Quantitative Economics Club", 0x8c1d_4a52_6e0f_4b7a_9a01_0000_0000_000a),
];

const SAMPLE_LOCATIONS: [&str; 10] = [
    "Goizueta Business School",
    "White Hall",
    "Math & Science Center",
    "Emory Student Center",
    "Cox Hall",
    "Library Quad",
    "Rich Building",
    "Callaway Center",
    "Woodruff PE Center",
    "Virtual / Zoom",
];

lazy_static! {
    /// Single words that identify a canonical location when the full name is
    /// not spelled out.
    pub static ref LOCATION_KEYWORDS: Vec<(&'static str, &'static str)> = vec![
        ("goizueta", "Goizueta Business School"),
        ("white", "White Hall"),
        ("msc", "Math & Science Center"),
        ("math", "Math & Science Center"),
        ("esc", "Emory Student Center"),
        ("cox", "Cox Hall"),
        ("library", "Library Quad"),
        ("rich", "Rich Building"),
        ("callaway", "Callaway Center"),
        ("woodruff", "Woodruff PE Center"),
        ("zoom", "Virtual / Zoom"),
        ("virtual", "Virtual / Zoom"),
        ("online", "Virtual / Zoom"),
    ];
}

/// Built-in clubs used when the store cannot be read.
pub fn sample_clubs() -> Vec<ClubLexiconEntry> {
    SAMPLE_CLUBS
        .iter()
        .map(|(name, id)| ClubLexiconEntry::new(*name, Uuid::from_u128(*id)))
        .collect()
}

/// Club that owns the placeholder event.
pub fn default_club() -> ClubLexiconEntry {
    let (name, id) = SAMPLE_CLUBS[0];
    ClubLexiconEntry::new(name, Uuid::from_u128(id))
}

/// Built-in locations used when the store cannot be read.
pub fn sample_locations() -> Vec<String> {
    SAMPLE_LOCATIONS.iter().map(|l| l.to_string()).collect()
}

/// Canonical location for a single lowercase word, if it is a known keyword.
pub fn location_for_keyword(word: &str) -> Option<&'static str> {
    LOCATION_KEYWORDS
        .iter()
        .find(|(keyword, _)| *keyword == word)
        .map(|(_, location)| *location)
}

/// Ordered club-name table. Names are unique case-insensitively; the first
/// occurrence wins. Lookups walk the table in order, so ties between several
/// matching names always resolve to the earliest entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClubLexicon {
    entries: Vec<ClubLexiconEntry>,
}

impl ClubLexicon {
    pub fn new(entries: Vec<ClubLexiconEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| !entry.name.trim().is_empty())
            .filter(|entry| seen.insert(entry.name.to_lowercase()))
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[ClubLexiconEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn first(&self) -> Option<&ClubLexiconEntry> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose name occurs in `text`, ignoring case.
    pub fn find_in(&self, text: &str) -> Option<&ClubLexiconEntry> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .find(|entry| haystack.contains(&entry.name.to_lowercase()))
    }
}

/// Supplies the club lexicon and location list, rebuilt on every call.
///
/// Store failures never escape: they are logged and the fallback tables given
/// at construction are returned instead.
#[derive(Clone)]
pub struct LexiconProvider {
    store: Arc<dyn LexiconStore>,
    fallback_clubs: Vec<ClubLexiconEntry>,
    fallback_locations: Vec<String>,
}

impl LexiconProvider {
    pub fn new(store: Arc<dyn LexiconStore>) -> Self {
        Self::with_fallback(store, sample_clubs(), sample_locations())
    }

    pub fn with_fallback(
        store: Arc<dyn LexiconStore>,
        fallback_clubs: Vec<ClubLexiconEntry>,
        fallback_locations: Vec<String>,
    ) -> Self {
        Self {
            store,
            fallback_clubs,
            fallback_locations,
        }
    }

    pub async fn load_club_lexicon(&self) -> ClubLexicon {
        match self.store.club_lexicon().await {
            Ok(entries) => {
                debug!("Loaded {} clubs into lexicon", entries.len());
                ClubLexicon::new(entries)
            }
            Err(e) => {
                warn!("Club lexicon unavailable, using built-in table: {}", e);
                ClubLexicon::new(self.fallback_clubs.clone())
            }
        }
    }

    pub async fn load_locations(&self) -> Vec<String> {
        match self.store.event_locations().await {
            Ok(locations) => {
                debug!("Loaded {} known locations", locations.len());
                locations
                    .into_iter()
                    .filter(|location| !location.trim().is_empty())
                    .collect()
            }
            Err(e) => {
                warn!("Event locations unavailable, using built-in table: {}", e);
                self.fallback_locations.clone()
            }
        }
    }
}

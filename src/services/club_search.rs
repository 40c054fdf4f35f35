use crate::config::SearchConfig;
use crate::error::Result;
use crate::models::{ClubItem, SearchCandidate};
use crate::services::fuzzy::{string_similarity, word_matches};
use crate::services::normalizer::{normalize, tokenize};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Club records for listing and search.
#[async_trait]
pub trait ClubStore: Send + Sync {
    /// Clubs where any token is contained in the club name, its description
    /// or a contact's name, newest `updated_at` first. A non-empty `tags`
    /// keeps only clubs carrying at least one of them.
    async fn candidate_clubs(&self, tokens: &[String], tags: &[String])
        -> Result<Vec<SearchCandidate>>;

    /// Every club, newest `updated_at` first, with the same tag rule.
    async fn list_clubs(&self, tags: &[String]) -> Result<Vec<SearchCandidate>>;
}

/// Matching thresholds and the officer roles searched by name.
#[derive(Debug, Clone)]
pub struct AdmissionRules {
    pub officer_roles: HashSet<String>,
    pub word_cutoff: f64,
    pub officer_cutoff: f64,
}

impl AdmissionRules {
    pub fn new<S: AsRef<str>>(roles: &[S], word_cutoff: f64, officer_cutoff: f64) -> Self {
        Self {
            officer_roles: roles
                .iter()
                .map(|role| role.as_ref().trim().to_lowercase())
                .collect(),
            word_cutoff,
            officer_cutoff,
        }
    }
}

/// Typo-tolerant club search over a cheap containment pre-filter.
#[derive(Clone)]
pub struct ClubSearchService {
    store: Arc<dyn ClubStore>,
    settings: SearchConfig,
}

impl ClubSearchService {
    pub fn new(store: Arc<dyn ClubStore>, settings: SearchConfig) -> Self {
        Self { store, settings }
    }

    pub fn default_roles(&self) -> &[String] {
        &self.settings.officer_roles
    }

    /// Plain listing, no fuzzy matching.
    pub async fn list_clubs(&self, tags: &[String]) -> Result<Vec<ClubItem>> {
        let clubs = self.store.list_clubs(tags).await?;
        Ok(clubs.iter().map(ClubItem::from).collect())
    }

    /// Search clubs by free text. A query without tokens is a plain listing.
    pub async fn search_clubs<S: AsRef<str>>(
        &self,
        query: &str,
        role_set: &[S],
        tags: &[String],
    ) -> Result<Vec<ClubItem>> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            debug!("Query '{}' has no tokens, using plain listing", query);
            return self.list_clubs(tags).await;
        }

        let candidates = match self.store.candidate_clubs(&tokens, tags).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Club search '{}' degraded to no results: {}", query, e);
                return Ok(Vec::new());
            }
        };
        let candidate_count = candidates.len();

        let rules = AdmissionRules::new(
            role_set,
            self.settings.word_cutoff,
            self.settings.officer_cutoff,
        );
        let admitted = rank_candidates(candidates, query, tags, &rules);

        info!(
            "Club search '{}': {} candidates, {} admitted",
            query,
            candidate_count,
            admitted.len()
        );

        Ok(admitted.iter().map(ClubItem::from).collect())
    }
}

/// True if any token occurs in the club name, description or a contact name.
pub fn passes_prefilter(candidate: &SearchCandidate, tokens: &[String]) -> bool {
    let name = candidate.name.to_lowercase();
    let description = candidate
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let contact_names: Vec<String> = candidate
        .contacts
        .iter()
        .map(|contact| contact.name.to_lowercase())
        .collect();

    tokens.iter().any(|token| {
        name.contains(token.as_str())
            || description.contains(token.as_str())
            || contact_names
                .iter()
                .any(|contact| contact.contains(token.as_str()))
    })
}

/// True if `tags` is empty or the club carries one of them.
pub fn has_any_tag(candidate: &SearchCandidate, tags: &[String]) -> bool {
    tags.is_empty() || candidate.tags.iter().any(|tag| tags.contains(tag))
}

/// Filter a recency-ordered candidate list down to admitted clubs.
///
/// Candidates are de-duplicated by id and keep their incoming order; the
/// result is never re-sorted by match quality.
pub fn rank_candidates(
    candidates: Vec<SearchCandidate>,
    query: &str,
    tags: &[String],
    rules: &AdmissionRules,
) -> Vec<SearchCandidate> {
    let tokens = tokenize(query);
    let normalized_query = normalize(query);
    let mut seen = HashSet::new();

    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.id))
        .filter(|candidate| passes_prefilter(candidate, &tokens) && has_any_tag(candidate, tags))
        .filter(|candidate| {
            let by_name = matches_name_words(candidate, &tokens, rules.word_cutoff);
            let by_officer = matches_officer(candidate, &normalized_query, rules);

            if by_officer && !by_name {
                debug!("'{}' admitted by officer name", candidate.name);
            }
            by_name || by_officer
        })
        .collect()
}

/// Any query token fuzzy-matches any name word, provided the query is not
/// longer than the name.
fn matches_name_words(candidate: &SearchCandidate, tokens: &[String], cutoff: f64) -> bool {
    let name_tokens = tokenize(&candidate.name);
    if tokens.len() > name_tokens.len() {
        return false;
    }

    tokens
        .iter()
        .any(|token| word_matches(token, &name_tokens, cutoff))
}

/// The whole query names a verified contact holding one of the officer roles.
fn matches_officer(
    candidate: &SearchCandidate,
    normalized_query: &str,
    rules: &AdmissionRules,
) -> bool {
    candidate
        .verified_contacts()
        .filter(|contact| {
            rules
                .officer_roles
                .contains(&contact.role.trim().to_lowercase())
        })
        .any(|contact| {
            let contact_name = normalize(&contact.name);
            contact_name == normalized_query
                || string_similarity(&contact_name, normalized_query) >= rules.officer_cutoff
        })
}

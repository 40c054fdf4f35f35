use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{ClubContact, ClubLexiconEntry, ExtractedEvent, SearchCandidate};
use crate::services::club_search::ClubStore;
use crate::services::lexicon::LexiconStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

const FOREIGN_KEY_VIOLATION: &str = "23503";

// Longest names first so a lookup prefers "Goizueta Finance Club" over
// "Finance Club" when both occur in a text.
const CLUB_LEXICON_QUERY: &str = r#"
    SELECT name, id
    FROM clubs
    WHERE btrim(name) <> ''
    ORDER BY length(name) DESC, name
"#;

const EVENT_LOCATIONS_QUERY: &str = r#"
    SELECT DISTINCT location
    FROM events
    WHERE location IS NOT NULL AND btrim(location) <> ''
    ORDER BY location
"#;

// $1: lowercase tokens (empty = no text filter), $2: tag slugs (empty = any)
const CLUBS_QUERY: &str = r#"
    SELECT c.id, c.name, c.description, c.updated_at,
           COALESCE(
               array_agg(t.slug::text ORDER BY t.slug) FILTER (WHERE t.slug IS NOT NULL),
               '{}'::text[]
           ) AS tags
    FROM clubs c
    LEFT JOIN club_tags ct ON ct.club_id = c.id
    LEFT JOIN tags t ON t.id = ct.tag_id
    WHERE (
        cardinality($1::text[]) = 0
        OR EXISTS (
            SELECT 1 FROM unnest($1::text[]) AS token
            WHERE lower(c.name) LIKE '%' || token || '%'
               OR lower(coalesce(c.description, '')) LIKE '%' || token || '%'
               OR EXISTS (
                   SELECT 1 FROM club_contacts cc
                   WHERE cc.club_id = c.id AND lower(cc.name) LIKE '%' || token || '%'
               )
        )
    )
    AND (
        cardinality($2::text[]) = 0
        OR EXISTS (
            SELECT 1 FROM club_tags ft
            JOIN tags fs ON fs.id = ft.tag_id
            WHERE ft.club_id = c.id AND fs.slug = ANY($2::text[])
        )
    )
    GROUP BY c.id
    ORDER BY c.updated_at DESC
"#;

const CONTACTS_QUERY: &str = r#"
    SELECT id, club_id, name, role, email, verified
    FROM club_contacts
    WHERE club_id = ANY($1)
    ORDER BY name
"#;

const INSERT_EVENT_QUERY: &str = r#"
    INSERT INTO events (id, club_id, title, description, location, start_time, end_time)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id
"#;

/// Persists validated events.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, event: &ExtractedEvent) -> Result<Uuid>;
}

#[derive(sqlx::FromRow)]
struct ClubRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    updated_at: DateTime<Utc>,
    tags: Vec<String>,
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    club_id: Uuid,
    name: String,
    role: String,
    email: Option<String>,
    verified: bool,
}

/// PostgreSQL-backed store for clubs, contacts and events.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Creates the pool without connecting; the first query opens a
    /// connection, so the service starts even while the database is down.
    pub fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
            .connect_lazy(&config.database_url)?;

        info!("Database pool created (lazy)");
        Ok(Self { pool })
    }

    async fn fetch_clubs(
        &self,
        tokens: &[String],
        tags: &[String],
    ) -> Result<Vec<SearchCandidate>> {
        let rows: Vec<ClubRow> = sqlx::query_as(CLUBS_QUERY)
            .bind(tokens)
            .bind(tags)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut contacts = self.fetch_contacts(&ids).await?;

        debug!("Fetched {} clubs", rows.len());

        Ok(rows
            .into_iter()
            .map(|row| SearchCandidate {
                contacts: contacts.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                tags: row.tags,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn fetch_contacts(&self, club_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ClubContact>>> {
        if club_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<ContactRow> = sqlx::query_as(CONTACTS_QUERY)
            .bind(club_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_club: HashMap<Uuid, Vec<ClubContact>> = HashMap::new();
        for row in rows {
            by_club.entry(row.club_id).or_default().push(ClubContact {
                id: row.id,
                name: row.name,
                role: row.role,
                email: row.email,
                verified: row.verified,
            });
        }

        Ok(by_club)
    }
}

#[async_trait]
impl LexiconStore for Database {
    async fn club_lexicon(&self) -> Result<Vec<ClubLexiconEntry>> {
        Ok(sqlx::query_as(CLUB_LEXICON_QUERY)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn event_locations(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(EVENT_LOCATIONS_QUERY)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl ClubStore for Database {
    async fn candidate_clubs(
        &self,
        tokens: &[String],
        tags: &[String],
    ) -> Result<Vec<SearchCandidate>> {
        self.fetch_clubs(tokens, tags).await
    }

    async fn list_clubs(&self, tags: &[String]) -> Result<Vec<SearchCandidate>> {
        self.fetch_clubs(&[], tags).await
    }
}

#[async_trait]
impl EventStore for Database {
    async fn create_event(&self, event: &ExtractedEvent) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(INSERT_EVENT_QUERY)
            .bind(Uuid::new_v4())
            .bind(event.club_id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.start_time)
            .bind(event.end_time)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let unknown_club = e
                    .as_database_error()
                    .and_then(|db| db.code())
                    .map_or(false, |code| code == FOREIGN_KEY_VIOLATION);

                if unknown_club {
                    ApiError::InvalidInput(format!("Unknown club: {}", event.club_id))
                } else {
                    ApiError::from(e)
                }
            })?;

        info!("Created event {} for club {}", id, event.club_id);
        Ok(id)
    }
}

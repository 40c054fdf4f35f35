use crate::models::{parse_timestamp, ExtractedEvent};
use crate::services::event_rules::{default_event, parse_with_rules};
use crate::services::extraction::{EventExtractor, ExtractionRequest, RawExtraction};
use crate::services::lexicon::{ClubLexicon, LexiconProvider};
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Turns free text into an [`ExtractedEvent`].
///
/// Stages run in order and the first valid result wins: the external
/// extraction service (when configured), the rule-based parser, then the
/// default event. Parsing never fails.
#[derive(Clone)]
pub struct EventParser {
    lexicon: Arc<LexiconProvider>,
    extractor: Arc<dyn EventExtractor>,
}

impl EventParser {
    pub fn new(lexicon: Arc<LexiconProvider>, extractor: Arc<dyn EventExtractor>) -> Self {
        Self { lexicon, extractor }
    }

    pub async fn parse_event(&self, text: &str) -> ExtractedEvent {
        self.parse_event_at(text, Local::now().naive_local()).await
    }

    /// Same as [`parse_event`](Self::parse_event) with an explicit "now".
    pub async fn parse_event_at(&self, text: &str, now: NaiveDateTime) -> ExtractedEvent {
        let lexicon = self.lexicon.load_club_lexicon().await;
        let locations = self.lexicon.load_locations().await;

        if self.extractor.is_configured() {
            let request = ExtractionRequest {
                text: text.to_string(),
                clubs: lexicon.names().into_iter().map(str::to_string).collect(),
                locations: locations.clone(),
                today: now.date(),
            };

            match self.extractor.extract(&request).await {
                Ok(raw) => match resolve_extraction(raw, text, &lexicon) {
                    Some(event) => {
                        debug!("Using externally extracted event '{}'", event.title);
                        return event;
                    }
                    None => warn!("Extracted event is incomplete, using rule parser"),
                },
                Err(e) => warn!("Event extraction failed, using rule parser: {:#}", e),
            }
        }

        match parse_with_rules(text, &lexicon, &locations, now) {
            Some(event) => event,
            None => {
                info!("No known club in event text, using default event");
                default_event(now)
            }
        }
    }
}

/// Validate an external result and resolve its club against the local
/// lexicon. `None` when a required field is missing or unusable.
///
/// The returned club id is only consulted when the lexicon is empty.
fn resolve_extraction(
    raw: RawExtraction,
    text: &str,
    lexicon: &ClubLexicon,
) -> Option<ExtractedEvent> {
    let title = raw.title.filter(|title| !title.trim().is_empty())?;
    let start_time = parse_timestamp(&raw.start_time?)?;
    let end_time = parse_timestamp(&raw.end_time?)?;

    let club_id = lexicon
        .find_in(text)
        .or_else(|| lexicon.find_in(&title))
        .or_else(|| lexicon.first())
        .map(|club| club.id)
        .or_else(|| {
            raw.club_id
                .as_deref()
                .and_then(|returned| Uuid::parse_str(returned.trim()).ok())
        })?;

    let event = ExtractedEvent {
        club_id,
        title,
        start_time,
        end_time,
        description: raw.description.filter(|d| !d.trim().is_empty()),
        location: raw.location.filter(|l| !l.trim().is_empty()),
    };

    event.validate().ok().map(|_| event)
}

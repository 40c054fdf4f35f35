//! Deterministic event extraction from free text.
//!
//! Used whenever the external extraction service is unavailable. Every step
//! has a default, so the only way to get no result is a text that names no
//! known club; callers then use [`default_event`].

use crate::models::ExtractedEvent;
use crate::services::lexicon::{
    default_club, location_for_keyword, ClubLexicon, LOCATION_KEYWORDS,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

const DEFAULT_HOUR: u32 = 18;
const DEFAULT_DURATION_HOURS: i64 = 2;
const TITLE_WORDS: usize = 3;
const STOP_WORDS: [&str; 7] = ["on", "at", "in", "the", "a", "an", "for"];

lazy_static! {
    static ref TIME_PATTERN: Regex =
        Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").unwrap();

    static ref DURATION_PATTERN: Regex =
        Regex::new(r"(?i)\b(\d+)\s*(?:minutes|mins|hours|hrs)\b").unwrap();

    static ref WEEKDAY_PHRASE: Regex = Regex::new(
        r"(?i)\b(?:next\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b|\b(?:tomorrow|today)\b"
    )
    .unwrap();

    /// "at"/"in" followed by a capitalized phrase, e.g. "at White Hall 206".
    static ref LOCATION_MENTION: Regex =
        Regex::new(r"\b(?:[Aa]t|[Ii]n)\s+[A-Z][\w&/]*(?:\s+(?:[A-Z][\w&/]*|\d+|&|/))*").unwrap();
}

/// The record returned when nothing in the text can be recognised.
pub fn default_event(now: NaiveDateTime) -> ExtractedEvent {
    let start = at_time(now.date() + Duration::days(1), default_time());

    ExtractedEvent {
        club_id: default_club().id,
        title: "General Meeting".to_string(),
        start_time: start,
        end_time: start + Duration::hours(DEFAULT_DURATION_HOURS),
        description: Some("Details to be announced.".to_string()),
        location: Some("Emory Student Center".to_string()),
    }
}

/// Extract an event from `text`, or `None` when no lexicon club is named.
pub fn parse_with_rules(
    text: &str,
    lexicon: &ClubLexicon,
    locations: &[String],
    now: NaiveDateTime,
) -> Option<ExtractedEvent> {
    let lower = text.to_lowercase();

    let club = lexicon.find_in(&lower)?;
    debug!("Rule parser matched club '{}'", club.name);

    let location = extract_location(&lower, locations);
    let date = extract_date(&lower, now.date());
    let time = extract_time(&lower).unwrap_or_else(default_time);
    let start_time = at_time(date, time);
    let end_time = extract_duration(&lower)
        .and_then(|duration| start_time.checked_add_signed(duration))
        .unwrap_or_else(|| start_time + Duration::hours(DEFAULT_DURATION_HOURS));

    let words = remaining_words(text, &club.name, locations);
    let (title, description) = if words.len() <= TITLE_WORDS {
        (join_title(&club.name, &words), None)
    } else {
        let (head, rest) = words.split_at(TITLE_WORDS);
        (join_title(&club.name, head), Some(rest.join(" ")))
    };

    debug!(
        "Rule parser: title='{}', start={}, end={}, location={:?}",
        title, start_time, end_time, location
    );

    Some(ExtractedEvent {
        club_id: club.id,
        title,
        start_time,
        end_time,
        description,
        location,
    })
}

/// A known location named in full, else a keyword mapped to its canonical
/// location. A number directly after the mention is kept as a room number.
pub fn extract_location(lower: &str, locations: &[String]) -> Option<String> {
    for location in locations {
        let needle = location.to_lowercase();
        if lower.contains(&needle) {
            return Some(with_room_number(location, &needle, lower));
        }
    }

    lower
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .find_map(|word| {
            location_for_keyword(&word).map(|canonical| with_room_number(canonical, &word, lower))
        })
}

fn with_room_number(location: &str, mention: &str, lower: &str) -> String {
    let room = Regex::new(&format!(r"\b{}\s+(\d+)", regex::escape(mention)))
        .ok()
        .and_then(|pattern| pattern.captures(lower))
        .and_then(|caps| caps.get(1))
        .map(|room| room.as_str().to_string());

    match room {
        Some(room) => format!("{} {}", location, room),
        None => location.to_string(),
    }
}

/// "next friday" is always the Friday of a following week (7 days out when
/// today is Friday); otherwise "tomorrow", "today", and tomorrow by default.
pub fn extract_date(lower: &str, today: NaiveDate) -> NaiveDate {
    let offset = if lower.contains("next friday") {
        let weekday = today.weekday().num_days_from_monday() as i64;
        (4 - weekday).rem_euclid(7) + 7
    } else if lower.contains("tomorrow") {
        1
    } else if lower.contains("today") {
        0
    } else {
        1
    };

    today + Duration::days(offset)
}

/// First `h[:mm] am|pm` in the text as a 24-hour time.
pub fn extract_time(lower: &str) -> Option<NaiveTime> {
    let caps = TIME_PATTERN.captures(lower)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(minute) => minute.as_str().parse().ok()?,
        None => 0,
    };

    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match (&caps[3].to_lowercase()[..], hour) {
        ("pm", 12) => 12,
        ("pm", h) => h + 12,
        ("am", 12) => 0,
        (_, h) => h,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// First `<N> minutes|mins|hours|hrs` in the text.
///
/// The unit is hours whenever "hour" or "hr" appears *anywhere* in the text,
/// not necessarily next to the number, so "45 minutes then happy hour" is
/// read as 45 hours.
pub fn extract_duration(lower: &str) -> Option<Duration> {
    let caps = DURATION_PATTERN.captures(lower)?;
    let amount: u32 = caps[1].parse().ok()?;
    if amount == 0 {
        return None;
    }

    if lower.contains("hour") || lower.contains("hr") {
        Some(Duration::hours(amount as i64))
    } else {
        Some(Duration::minutes(amount as i64))
    }
}

/// Words left after removing the club name, dates, times, location
/// mentions, the duration and stop words.
fn remaining_words(text: &str, club_name: &str, locations: &[String]) -> Vec<String> {
    let mut remaining = strip(text, &format!("(?i){}", regex::escape(club_name)));

    for location in locations {
        let pattern = format!(r"(?i)(?:\b(?:at|in)\s+)?{}(?:\s+\d+)?", regex::escape(location));
        remaining = strip(&remaining, &pattern);
    }
    for (keyword, _) in LOCATION_KEYWORDS.iter() {
        let pattern = format!(r"(?i)\b(?:at|in)\s+{}\b(?:\s+\d+)?", regex::escape(keyword));
        remaining = strip(&remaining, &pattern);
    }

    for pattern in [&*WEEKDAY_PHRASE, &*TIME_PATTERN, &*LOCATION_MENTION, &*DURATION_PATTERN] {
        remaining = pattern.replace_all(&remaining, " ").into_owned();
    }

    remaining
        .replace(',', " ")
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .map(str::to_string)
        .collect()
}

fn strip(text: &str, pattern: &str) -> String {
    match Regex::new(pattern) {
        Ok(pattern) => pattern.replace_all(text, " ").into_owned(),
        Err(_) => text.to_string(),
    }
}

fn join_title<S: AsRef<str>>(club_name: &str, words: &[S]) -> String {
    std::iter::once(club_name)
        .chain(words.iter().map(|word| word.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0).unwrap_or_default()
}

fn at_time(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::lexicon::{sample_clubs, sample_locations};

    // 2026-03-05 is a Thursday
    fn thursday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn parse(text: &str) -> Option<ExtractedEvent> {
        parse_with_rules(
            text,
            &ClubLexicon::new(sample_clubs()),
            &sample_locations(),
            thursday_noon(),
        )
    }

    fn club_id(name: &str) -> uuid::Uuid {
        sample_clubs()
            .into_iter()
            .find(|club| club.name == name)
            .unwrap()
            .id
    }

    #[test]
    fn test_meeting_tomorrow_afternoon() {
        let event = parse("Blockchain Club meeting tomorrow at 3:30pm").unwrap();

        assert_eq!(event.club_id, club_id("Blockchain Club"));
        assert_eq!(event.start_time, date(6).and_time(hm(15, 30)));
        assert_eq!(event.end_time, date(6).and_time(hm(17, 30)));
        assert_eq!(event.title, "Blockchain Club meeting");
        assert_eq!(event.description, None);
        assert_eq!(event.location, None);
    }

    #[test]
    fn test_workshop_with_keyword_location_and_minutes() {
        let event = parse(
            "AI Society workshop on neural networks next Friday at 5pm in Goizueta, 90 minutes",
        )
        .unwrap();

        assert_eq!(event.club_id, club_id("AI Society"));
        // Thursday -> Friday of the following week
        assert_eq!(event.start_time, date(13).and_time(hm(17, 0)));
        assert_eq!(event.end_time, date(13).and_time(hm(18, 30)));
        assert_eq!(event.location.as_deref(), Some("Goizueta Business School"));
        assert_eq!(event.title, "AI Society workshop neural networks");
        assert_eq!(event.description, None);
    }

    #[test]
    fn test_presentation_today_for_hours() {
        let event = parse("Algory Capital presentation today at 7pm for 2 hours").unwrap();

        assert_eq!(event.start_time, date(5).and_time(hm(19, 0)));
        assert_eq!(event.end_time, date(5).and_time(hm(21, 0)));
        assert_eq!(event.title, "Algory Capital presentation");
    }

    #[test]
    fn test_full_location_with_room_number() {
        let event = parse("Emory Data Science Club Python tutorial at White Hall 206").unwrap();

        assert_eq!(event.club_id, club_id("Emory Data Science Club"));
        assert_eq!(event.location.as_deref(), Some("White Hall 206"));
        assert_eq!(event.title, "Emory Data Science Club Python tutorial");
        // defaults: tomorrow, 18:00, two hours
        assert_eq!(event.start_time, date(6).and_time(hm(18, 0)));
        assert_eq!(event.end_time, date(6).and_time(hm(20, 0)));
    }

    #[test]
    fn test_lowercase_location_mentions_leave_the_title() {
        let event = parse("ai society workshop at goizueta tomorrow").unwrap();
        assert_eq!(event.location.as_deref(), Some("Goizueta Business School"));
        assert_eq!(event.title, "AI Society workshop");

        let event = parse("emory data science club python tutorial at white hall 206").unwrap();
        assert_eq!(event.location.as_deref(), Some("White Hall 206"));
        assert_eq!(event.title, "Emory Data Science Club python tutorial");
    }

    #[test]
    fn test_long_text_splits_title_and_description() {
        let event = parse(
            "AI Society workshop on neural networks and deep learning basics tomorrow at 6pm",
        )
        .unwrap();

        assert_eq!(event.title, "AI Society workshop neural networks");
        assert_eq!(event.description.as_deref(), Some("and deep learning basics"));
    }

    #[test]
    fn test_unknown_club_yields_none() {
        assert!(parse("Chess night tomorrow at 7pm").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_next_friday_on_a_friday_is_a_week_out() {
        let friday = date(6);
        assert_eq!(extract_date("next friday", friday), date(13));
        // Saturday and Monday land on the Friday after the coming one
        assert_eq!(extract_date("next friday", date(7)), date(20));
        assert_eq!(extract_date("next friday", date(9)), date(20));
    }

    #[test]
    fn test_date_keywords() {
        let today = date(5);
        assert_eq!(extract_date("see you tomorrow", today), date(6));
        assert_eq!(extract_date("today only", today), date(5));
        assert_eq!(extract_date("sometime soon", today), date(6));
    }

    #[test]
    fn test_time_conversion() {
        assert_eq!(extract_time("at 5pm"), Some(hm(17, 0)));
        assert_eq!(extract_time("at 12pm"), Some(hm(12, 0)));
        assert_eq!(extract_time("at 12am"), Some(hm(0, 0)));
        assert_eq!(extract_time("at 9:15 am"), Some(hm(9, 15)));
        assert_eq!(extract_time("at 13pm"), None);
        assert_eq!(extract_time("at 5:75pm"), None);
        assert_eq!(extract_time("at noon"), None);
    }

    #[test]
    fn test_duration_unit_comes_from_whole_text() {
        assert_eq!(extract_duration("90 minutes"), Some(Duration::minutes(90)));
        assert_eq!(extract_duration("for 2 hours"), Some(Duration::hours(2)));
        assert_eq!(extract_duration("3 hrs"), Some(Duration::hours(3)));
        // "hour" elsewhere in the text turns the minutes into hours
        assert_eq!(
            extract_duration("talk for 45 minutes then happy hour"),
            Some(Duration::hours(45))
        );
        assert_eq!(extract_duration("0 minutes"), None);
        assert_eq!(extract_duration("no length given"), None);
    }

    #[test]
    fn test_whole_text_unit_flows_into_end_time() {
        let event = parse("Blockchain Club talk tomorrow at 5pm, 45 minutes, then happy hour").unwrap();
        assert_eq!(event.end_time - event.start_time, Duration::hours(45));
    }

    #[test]
    fn test_keyword_location_with_room() {
        let locations: Vec<String> = Vec::new();
        assert_eq!(
            extract_location("meet in white 101 tonight", &locations).as_deref(),
            Some("White Hall 101")
        );
        assert_eq!(
            extract_location("join us on zoom!", &locations).as_deref(),
            Some("Virtual / Zoom")
        );
        assert_eq!(extract_location("somewhere else", &locations), None);
    }

    #[test]
    fn test_default_event_shape() {
        let event = default_event(thursday_noon());

        assert_eq!(event.club_id, club_id("Algory Capital"));
        assert_eq!(event.start_time, date(6).and_time(hm(18, 0)));
        assert_eq!(event.end_time, date(6).and_time(hm(20, 0)));
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_rule_output_passes_validation() {
        let inputs = [
            "Blockchain Club meeting tomorrow at 3:30pm",
            "AI Society workshop on neural networks next Friday at 5pm in Goizueta, 90 minutes",
            "Algory Capital presentation today at 7pm for 2 hours",
            "Emory Data Science Club Python tutorial at White Hall 206",
            "Blockchain Club",
        ];

        for input in inputs {
            let event = parse(input).unwrap();
            assert!(event.validate().is_ok(), "invalid event for {:?}", input);
        }
    }
}

//! Fixture data models
//!
//! This module contains the types representing sports fixtures as returned
//! by the remote endpoint, along with the HTTP client that fetches them.

pub mod client;

pub use client::{FetchError, FetchFixtures, HttpFixturesClient};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A single fixture as served by the remote endpoint.
///
/// Optional fields default to absent so the decoder tolerates feeds that
/// omit them; the list order is whatever the server returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Stable identifier assigned by the feed
    pub id: String,
    /// Home team display name
    pub home_team: String,
    /// Away team display name
    pub away_team: String,
    /// Scheduled kickoff time
    pub kickoff: DateTime<Utc>,
    /// Competition name, if the feed provides one
    #[serde(default)]
    pub competition: Option<String>,
    /// Venue name, if the feed provides one
    #[serde(default)]
    pub venue: Option<String>,
    /// Current match status
    #[serde(default)]
    pub status: FixtureStatus,
    /// Home side score, present once play has started
    #[serde(default)]
    pub home_score: Option<u32>,
    /// Away side score, present once play has started
    #[serde(default)]
    pub away_score: Option<u32>,
}

/// Lifecycle of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FixtureStatus {
    /// Not yet kicked off
    #[default]
    Scheduled,
    /// Currently being played
    Live,
    /// Final result available
    Finished,
    /// Called off
    Postponed,
}

impl Fixture {
    /// Score column text: "2-1" once a score exists, otherwise "vs".
    pub fn score_display(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => format!("{}-{}", home, away),
            _ => "vs".to_string(),
        }
    }

    /// Kickoff rendered in the viewer's local timezone.
    pub fn kickoff_display(&self) -> String {
        self.kickoff
            .with_timezone(&Local)
            .format("%a %d %b %H:%M")
            .to_string()
    }
}

impl FixtureStatus {
    /// Short label for list rendering.
    pub fn label(&self) -> &'static str {
        match self {
            FixtureStatus::Scheduled => "scheduled",
            FixtureStatus::Live => "LIVE",
            FixtureStatus::Finished => "FT",
            FixtureStatus::Postponed => "postponed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fixture() -> Fixture {
        Fixture {
            id: "f-001".to_string(),
            home_team: "Harbour City".to_string(),
            away_team: "Northgate United".to_string(),
            kickoff: "2026-08-08T19:30:00Z".parse().unwrap(),
            competition: Some("Premier League".to_string()),
            venue: Some("Harbour Stadium".to_string()),
            status: FixtureStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    #[test]
    fn test_fixture_serialization_roundtrip() {
        let fixture = sample_fixture();

        let json = serde_json::to_string(&fixture).expect("Failed to serialize Fixture");
        let deserialized: Fixture =
            serde_json::from_str(&json).expect("Failed to deserialize Fixture");

        assert_eq!(deserialized, fixture);
    }

    #[test]
    fn test_fixture_decodes_with_optional_fields_missing() {
        let json = r#"{
            "id": "f-002",
            "home_team": "Albion",
            "away_team": "Rovers",
            "kickoff": "2026-08-09T15:00:00Z"
        }"#;

        let fixture: Fixture = serde_json::from_str(json).expect("Failed to decode fixture");

        assert_eq!(fixture.id, "f-002");
        assert_eq!(fixture.status, FixtureStatus::Scheduled);
        assert!(fixture.competition.is_none());
        assert!(fixture.home_score.is_none());
    }

    #[test]
    fn test_status_decodes_lowercase() {
        let status: FixtureStatus = serde_json::from_str(r#""live""#).expect("decode");
        assert_eq!(status, FixtureStatus::Live);
    }

    #[test]
    fn test_score_display_without_scores() {
        let fixture = sample_fixture();
        assert_eq!(fixture.score_display(), "vs");
    }

    #[test]
    fn test_score_display_with_scores() {
        let mut fixture = sample_fixture();
        fixture.home_score = Some(2);
        fixture.away_score = Some(1);
        assert_eq!(fixture.score_display(), "2-1");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(FixtureStatus::Scheduled.label(), "scheduled");
        assert_eq!(FixtureStatus::Live.label(), "LIVE");
        assert_eq!(FixtureStatus::Finished.label(), "FT");
        assert_eq!(FixtureStatus::Postponed.label(), "postponed");
    }
}

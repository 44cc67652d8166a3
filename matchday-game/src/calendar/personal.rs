//! A club's own view of the season calendar.
use serde::{Deserialize, Serialize};

use super::Fixture;

/// One row of a personal calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub round: u32,
    pub opponent: String,
    pub is_home: bool,
}

/// Ordered list of a club's fixtures, persisted with the player profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalCalendar {
    entries: Vec<CalendarEntry>,
}

impl PersonalCalendar {
    /// Project the global fixture list onto `club`.
    #[must_use]
    pub fn derive(club: &str, fixtures: &[Fixture]) -> Self {
        let mut entries: Vec<CalendarEntry> = fixtures
            .iter()
            .filter_map(|fixture| {
                fixture
                    .opponent_of(club)
                    .map(|(opponent, is_home)| CalendarEntry {
                        round: fixture.round,
                        opponent: opponent.to_string(),
                        is_home,
                    })
            })
            .collect();
        entries.sort_by_key(|entry| entry.round);
        Self { entries }
    }

    /// Decode a calendar previously produced by [`PersonalCalendar::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a serialized calendar.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    #[must_use]
    pub fn entry(&self, round: u32) -> Option<&CalendarEntry> {
        self.entries.iter().find(|entry| entry.round == round)
    }

    #[must_use]
    pub fn entries(&self) -> &[CalendarEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from `round` onwards, for "upcoming fixtures" listings.
    pub fn upcoming(&self, round: u32) -> impl Iterator<Item = &CalendarEntry> {
        self.entries.iter().filter(move |entry| entry.round >= round)
    }

    /// A stored calendar is trusted only when its rounds are strictly
    /// increasing, fall inside the season and name an opponent.
    #[must_use]
    pub fn is_well_formed(&self, season_length: u32) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|entry| (1..=season_length).contains(&entry.round) && !entry.opponent.is_empty())
            && self.entries.windows(2).all(|pair| pair[0].round < pair[1].round)
    }
}

/// Where an opponent lookup found its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentSource {
    Stored,
    Regenerated,
    ScheduleSearch,
    RandomFallback,
}

/// Answer to "who do I play in round N".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentLookup {
    pub round: u32,
    pub opponent: String,
    pub is_home: bool,
    pub source: OpponentSource,
    /// Freshly derived calendar the caller should persist, when the stored
    /// one was missing or unusable.
    pub repaired: Option<PersonalCalendar>,
}

impl OpponentLookup {
    pub(crate) fn new(round: u32, entry: &CalendarEntry, source: OpponentSource) -> Self {
        Self {
            round,
            opponent: entry.opponent.clone(),
            is_home: entry.is_home,
            source,
            repaired: None,
        }
    }
}

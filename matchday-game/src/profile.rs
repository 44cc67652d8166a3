//! Persistent player profile and the update records applied to it.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::calendar::PersonalCalendar;
use crate::constants::APPLIED_MATCH_HISTORY;
use crate::transfer::TransferOffer;

/// Playing position chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Goalkeeper,
    Defender,
    Forward,
}

impl Position {
    pub const ALL: [Self; 3] = [Self::Goalkeeper, Self::Defender, Self::Forward];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Goalkeeper => "goalkeeper",
            Self::Defender => "defender",
            Self::Forward => "forward",
        }
    }

    /// Keepers and defenders wait for the opponent; forwards start with the ball.
    #[must_use]
    pub const fn defends_first(self) -> bool {
        !matches!(self, Self::Forward)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goalkeeper" | "gk" => Ok(Self::Goalkeeper),
            "defender" | "def" => Ok(Self::Defender),
            "forward" | "fw" => Ok(Self::Forward),
            other => Err(format!("unknown position: {other}")),
        }
    }
}

/// Final outcome of a match from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    #[must_use]
    pub fn from_score(team: u8, opponent: u8) -> Self {
        match team.cmp(&opponent) {
            std::cmp::Ordering::Greater => Self::Win,
            std::cmp::Ordering::Equal => Self::Draw,
            std::cmp::Ordering::Less => Self::Loss,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Draw => "draw",
            Self::Loss => "loss",
        }
    }
}

/// Counters gathered during one match session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub goals: u32,
    pub assists: u32,
    pub saves: u32,
    pub tackles: u32,
    pub clearances: u32,
    pub throws: u32,
}

/// Cumulative career counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerStats {
    #[serde(default)]
    pub matches: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub saves: u32,
    #[serde(default)]
    pub tackles: u32,
}

impl CareerStats {
    /// Delta contributed by one finished match.
    #[must_use]
    pub fn from_match(stats: &MatchStats, result: MatchResult) -> Self {
        Self {
            matches: 1,
            wins: u32::from(result == MatchResult::Win),
            draws: u32::from(result == MatchResult::Draw),
            losses: u32::from(result == MatchResult::Loss),
            goals: stats.goals,
            assists: stats.assists,
            saves: stats.saves,
            tackles: stats.tackles,
        }
    }

    pub fn accumulate(&mut self, delta: &Self) {
        self.matches = self.matches.saturating_add(delta.matches);
        self.wins = self.wins.saturating_add(delta.wins);
        self.draws = self.draws.saturating_add(delta.draws);
        self.losses = self.losses.saturating_add(delta.losses);
        self.goals = self.goals.saturating_add(delta.goals);
        self.assists = self.assists.saturating_add(delta.assists);
        self.saves = self.saves.saturating_add(delta.saves);
        self.tackles = self.tackles.saturating_add(delta.tackles);
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

const fn default_true() -> bool {
    true
}

const fn default_round() -> u32 {
    1
}

/// Everything persisted about one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: u64,
    pub name: String,
    pub position: Position,
    pub club: String,
    #[serde(flatten)]
    pub stats: CareerStats,
    #[serde(default = "default_round")]
    pub current_round: u32,
    /// Virtual date of the next match, as stored text.
    #[serde(alias = "last_match_date", alias = "current_date")]
    pub virtual_date: String,
    #[serde(default = "default_true")]
    pub is_in_squad: bool,
    /// Serialized [`PersonalCalendar`].
    #[serde(default)]
    pub personal_calendar: Option<String>,
    #[serde(default)]
    pub pending_offer: Option<TransferOffer>,
    #[serde(default)]
    applied_matches: VecDeque<String>,
}

impl PlayerProfile {
    #[must_use]
    pub fn new(
        user_id: u64,
        name: impl Into<String>,
        position: Position,
        club: impl Into<String>,
        virtual_date: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            position,
            club: club.into(),
            stats: CareerStats::default(),
            current_round: 1,
            virtual_date: virtual_date.into(),
            is_in_squad: true,
            personal_calendar: None,
            pending_offer: None,
            applied_matches: VecDeque::new(),
        }
    }

    /// Decode the stored personal calendar, if it is readable at all.
    #[must_use]
    pub fn decoded_calendar(&self) -> Option<PersonalCalendar> {
        self.personal_calendar
            .as_deref()
            .and_then(|raw| PersonalCalendar::from_json(raw).ok())
    }

    #[must_use]
    pub fn has_applied(&self, match_key: &str) -> bool {
        self.applied_matches.iter().any(|key| key == match_key)
    }

    /// Apply `update`. Counters add on top of the stored values, every other
    /// field is replaced. An update carrying an already-applied match key is
    /// ignored entirely. A stats reset also forgets applied match keys, since
    /// the restarted career replays the same rounds.
    pub fn apply(&mut self, update: &ProfileUpdate) -> UpdateOutcome {
        if let Some(key) = update.match_key.as_deref() {
            if self.has_applied(key) {
                log::debug!("player {} already folded match {key}", self.user_id);
                return UpdateOutcome::Duplicate;
            }
            self.applied_matches.push_back(key.to_string());
            while self.applied_matches.len() > APPLIED_MATCH_HISTORY {
                self.applied_matches.pop_front();
            }
        }

        self.stats.accumulate(&update.stats);
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(club) = &update.club {
            self.club.clone_from(club);
        }
        if let Some(round) = update.current_round {
            self.current_round = round;
        }
        if let Some(date) = &update.virtual_date {
            self.virtual_date.clone_from(date);
        }
        if let Some(in_squad) = update.is_in_squad {
            self.is_in_squad = in_squad;
        }
        if let Some(calendar) = &update.personal_calendar {
            self.personal_calendar.clone_from(calendar);
        }
        if let Some(offer) = &update.pending_offer {
            self.pending_offer.clone_from(offer);
        }
        if update.reset_stats {
            self.stats = CareerStats::default();
            self.applied_matches.clear();
        }
        UpdateOutcome::Applied
    }
}

/// Whether a [`ProfileUpdate`] changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    Duplicate,
}

/// Field changes for a stored profile.
///
/// `stats` is a delta; every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub match_key: Option<String>,
    pub stats: CareerStats,
    pub name: Option<String>,
    pub position: Option<Position>,
    pub club: Option<String>,
    pub current_round: Option<u32>,
    pub virtual_date: Option<String>,
    pub is_in_squad: Option<bool>,
    pub personal_calendar: Option<Option<String>>,
    pub pending_offer: Option<Option<TransferOffer>>,
    pub reset_stats: bool,
}

impl ProfileUpdate {
    #[must_use]
    pub fn for_match(match_key: impl Into<String>, stats: CareerStats) -> Self {
        Self {
            match_key: Some(match_key.into()),
            stats,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_round(mut self, round: u32) -> Self {
        self.current_round = Some(round);
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.virtual_date = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_club(mut self, club: impl Into<String>) -> Self {
        self.club = Some(club.into());
        self
    }

    #[must_use]
    pub fn with_calendar(mut self, calendar: Option<String>) -> Self {
        self.personal_calendar = Some(calendar);
        self
    }

    #[must_use]
    pub fn with_offer(mut self, offer: Option<TransferOffer>) -> Self {
        self.pending_offer = Some(offer);
        self
    }

    /// Capture every replaceable field of `profile` as an update, so an
    /// in-memory edit can be written back through a store.
    #[must_use]
    pub fn replace_from(profile: &PlayerProfile) -> Self {
        Self {
            match_key: None,
            stats: CareerStats::default(),
            name: Some(profile.name.clone()),
            position: Some(profile.position),
            club: Some(profile.club.clone()),
            current_round: Some(profile.current_round),
            virtual_date: Some(profile.virtual_date.clone()),
            is_in_squad: Some(profile.is_in_squad),
            personal_calendar: Some(profile.personal_calendar.clone()),
            pending_offer: Some(profile.pending_offer.clone()),
            reset_stats: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> PlayerProfile {
        PlayerProfile::new(7, "Anna", Position::Forward, "Sibir", "2024-09-01")
    }

    #[test]
    fn result_follows_score() {
        assert_eq!(MatchResult::from_score(2, 1), MatchResult::Win);
        assert_eq!(MatchResult::from_score(0, 0), MatchResult::Draw);
        assert_eq!(MatchResult::from_score(1, 3), MatchResult::Loss);
    }

    #[test]
    fn counters_add_and_fields_replace() {
        let mut profile = profile();
        profile.stats.goals = 4;
        let delta = CareerStats {
            goals: 2,
            matches: 1,
            wins: 1,
            ..CareerStats::default()
        };
        let update = ProfileUpdate::for_match("2024-09-01#1", delta)
            .with_round(2)
            .with_date("2024-09-08");
        assert_eq!(profile.apply(&update), UpdateOutcome::Applied);
        assert_eq!(profile.stats.goals, 6);
        assert_eq!(profile.stats.wins, 1);
        assert_eq!(profile.current_round, 2);
        assert_eq!(profile.virtual_date, "2024-09-08");
    }

    #[test]
    fn repeated_match_key_is_ignored() {
        let mut profile = profile();
        let delta = CareerStats::from_match(&MatchStats::default(), MatchResult::Loss);
        let update = ProfileUpdate::for_match("2024-09-01#3", delta).with_round(4);
        assert_eq!(profile.apply(&update), UpdateOutcome::Applied);
        assert_eq!(profile.apply(&update), UpdateOutcome::Duplicate);
        assert_eq!(profile.stats.matches, 1);
        assert_eq!(profile.stats.losses, 1);
    }

    #[test]
    fn stats_reset_forgets_applied_matches() {
        let mut profile = profile();
        let delta = CareerStats::from_match(&MatchStats::default(), MatchResult::Win);
        let update = ProfileUpdate::for_match("2024-09-01#1", delta).with_round(2);
        assert_eq!(profile.apply(&update), UpdateOutcome::Applied);

        let reset = ProfileUpdate {
            reset_stats: true,
            ..ProfileUpdate::default().with_round(1)
        };
        assert_eq!(profile.apply(&reset), UpdateOutcome::Applied);
        assert!(!profile.has_applied("2024-09-01#1"));
        assert_eq!(profile.stats, CareerStats::default());

        assert_eq!(profile.apply(&update), UpdateOutcome::Applied);
        assert_eq!(profile.stats.matches, 1);
        assert_eq!(profile.current_round, 2);
    }

    #[test]
    fn legacy_documents_deserialize() {
        let json = r#"{
            "user_id": 9, "name": "Pavel", "position": "defender", "club": "Forte",
            "matches": 3, "wins": 1, "draws": 1, "losses": 1, "tackles": 12,
            "last_match_date": "15.10.2024"
        }"#;
        let profile: PlayerProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.stats.tackles, 12);
        assert_eq!(profile.current_round, 1);
        assert!(profile.is_in_squad);
        assert_eq!(profile.virtual_date, "15.10.2024");
        assert!(profile.decoded_calendar().is_none());
    }

    #[test]
    fn position_parses_short_and_long_names() {
        assert_eq!("GK".parse::<Position>(), Ok(Position::Goalkeeper));
        assert_eq!("defender".parse::<Position>(), Ok(Position::Defender));
        assert!("striker".parse::<Position>().is_err());
        assert!(Position::Defender.defends_first());
        assert!(!Position::Forward.defends_first());
    }
}

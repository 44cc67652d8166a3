//! League tiers and the bundled club reference data.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

pub(crate) const DEFAULT_CLUB_DATA: &str = include_str!("../assets/clubs.json");

const FALLBACK_SILVER: [(&str, u8); 10] = [
    ("Tekstilshchik", 80),
    ("Sibir", 75),
    ("Avangard-Kursk", 70),
    ("Dinamo-Kirov", 65),
    ("Dinamo-Vladivostok", 60),
    ("Dinamo-2 Moscow", 55),
    ("Irtysh Omsk", 50),
    ("Kaluga", 45),
    ("Forte", 40),
    ("Murom", 35),
];

const FALLBACK_GOLD: [(&str, u8); 10] = [
    ("Spartak Kostroma", 90),
    ("Volga Ulyanovsk", 88),
    ("Leningradets", 86),
    ("Volgar", 84),
    ("Chelyabinsk", 82),
    ("Rodina-2", 80),
    ("Mashuk-KMV", 78),
    ("Veles", 76),
    ("Kuban", 74),
    ("Torpedo Miass", 72),
];

/// Competition level a club plays in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeagueTier {
    #[default]
    Silver,
    Gold,
}

impl LeagueTier {
    pub const ALL: [Self; 2] = [Self::Silver, Self::Gold];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for LeagueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable reference data for one club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub name: String,
    #[serde(default)]
    pub tier: LeagueTier,
    /// Final table position from the previous season (1 = champion).
    pub position: u8,
    /// Relative strength rating.
    pub strength: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub tier: LeagueTier,
    pub name: String,
    pub clubs: Vec<Club>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClubDataError {
    #[error("league {0} has no clubs")]
    EmptyLeague(LeagueTier),
    #[error("league {0} is defined more than once")]
    DuplicateLeague(LeagueTier),
    #[error("club name {0:?} is not unique")]
    DuplicateClub(String),
}

/// Every league and club known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubDirectory {
    pub leagues: Vec<League>,
}

impl Default for ClubDirectory {
    fn default() -> Self {
        Self::load_from_static()
    }
}

impl ClubDirectory {
    /// Parse a directory from JSON, stamping each club with its league tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid directory JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut directory: Self = serde_json::from_str(json)?;
        for league in &mut directory.leagues {
            for club in &mut league.clubs {
                club.tier = league.tier;
            }
        }
        Ok(directory)
    }

    /// Load the bundled club list, falling back to the compiled-in table.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_CLUB_DATA).unwrap_or_else(|err| {
            log::warn!("bundled club data unreadable ({err}); using built-in table");
            Self::fallback()
        })
    }

    fn fallback() -> Self {
        let build = |tier: LeagueTier, name: &str, table: &[(&str, u8)]| League {
            tier,
            name: name.to_string(),
            clubs: table
                .iter()
                .zip(1u8..)
                .map(|((club, strength), position)| Club {
                    name: (*club).to_string(),
                    tier,
                    position,
                    strength: *strength,
                })
                .collect(),
        };
        Self {
            leagues: vec![
                build(LeagueTier::Silver, "FNL Silver", &FALLBACK_SILVER),
                build(LeagueTier::Gold, "FNL Gold", &FALLBACK_GOLD),
            ],
        }
    }

    /// Check that club names are unique and no league is empty.
    ///
    /// # Errors
    ///
    /// Returns the first integrity violation found.
    pub fn validate(&self) -> Result<(), ClubDataError> {
        let mut tiers = HashSet::new();
        let mut names = HashSet::new();
        for league in &self.leagues {
            if !tiers.insert(league.tier) {
                return Err(ClubDataError::DuplicateLeague(league.tier));
            }
            if league.clubs.is_empty() {
                return Err(ClubDataError::EmptyLeague(league.tier));
            }
            for club in &league.clubs {
                if !names.insert(club.name.as_str()) {
                    return Err(ClubDataError::DuplicateClub(club.name.clone()));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn league(&self, tier: LeagueTier) -> Option<&League> {
        self.leagues.iter().find(|league| league.tier == tier)
    }

    #[must_use]
    pub fn clubs_in(&self, tier: LeagueTier) -> &[Club] {
        match self.league(tier) {
            Some(league) => &league.clubs,
            None => &[],
        }
    }

    #[must_use]
    pub fn club(&self, name: &str) -> Option<&Club> {
        self.leagues
            .iter()
            .flat_map(|league| league.clubs.iter())
            .find(|club| club.name == name)
    }

    #[must_use]
    pub fn tier_of(&self, name: &str) -> Option<LeagueTier> {
        self.club(name).map(|club| club.tier)
    }

    /// Clubs of a tier whose table position lies in `positions`.
    #[must_use]
    pub fn clubs_by_position(
        &self,
        tier: LeagueTier,
        positions: &RangeInclusive<u8>,
    ) -> Vec<&Club> {
        self.clubs_in(tier)
            .iter()
            .filter(|club| positions.contains(&club.position))
            .collect()
    }

    /// Club names of a tier in table order.
    #[must_use]
    pub fn names_in(&self, tier: LeagueTier) -> Vec<String> {
        let mut clubs: Vec<&Club> = self.clubs_in(tier).iter().collect();
        clubs.sort_by_key(|club| club.position);
        clubs.into_iter().map(|club| club.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_directory_matches_fallback() {
        let bundled = ClubDirectory::load_from_static();
        assert_eq!(bundled, ClubDirectory::fallback());
        assert!(bundled.validate().is_ok());
        assert_eq!(bundled.clubs_in(LeagueTier::Silver).len(), 10);
        assert_eq!(bundled.clubs_in(LeagueTier::Gold).len(), 10);
    }

    #[test]
    fn lookups_resolve_tier_and_positions() {
        let directory = ClubDirectory::default();
        assert_eq!(directory.tier_of("Sibir"), Some(LeagueTier::Silver));
        assert_eq!(directory.tier_of("Kuban"), Some(LeagueTier::Gold));
        assert_eq!(directory.tier_of("Nowhere United"), None);

        let top = directory.clubs_by_position(LeagueTier::Silver, &(1..=3));
        let names: Vec<&str> = top.iter().map(|club| club.name.as_str()).collect();
        assert_eq!(names, ["Tekstilshchik", "Sibir", "Avangard-Kursk"]);
    }

    #[test]
    fn validate_rejects_duplicates_and_empty_leagues() {
        let mut directory = ClubDirectory::default();
        directory.leagues[1].clubs[0].name = "Sibir".to_string();
        assert_eq!(
            directory.validate(),
            Err(ClubDataError::DuplicateClub("Sibir".to_string()))
        );

        let mut empty = ClubDirectory::default();
        empty.leagues[0].clubs.clear();
        assert_eq!(
            empty.validate(),
            Err(ClubDataError::EmptyLeague(LeagueTier::Silver))
        );
    }
}

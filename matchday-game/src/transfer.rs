//! Milestone-based transfer offers.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::club::{ClubDirectory, LeagueTier};
use crate::constants::{
    LATERAL_MIN_STAT, PROMOTION_MIN_ASSISTS, PROMOTION_MIN_GOALS, PROMOTION_MIN_SAVES,
    PROMOTION_MIN_TACKLES, TRANSFER_MIN_MATCHES, TRANSFER_OFFER_COUNT,
};
use crate::profile::{CareerStats, PlayerProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    Promotion,
    Lateral,
}

/// Clubs that want the player, all from one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOffer {
    pub tier: LeagueTier,
    pub kind: OfferKind,
    pub clubs: Vec<String>,
}

impl TransferOffer {
    #[must_use]
    pub fn includes(&self, club: &str) -> bool {
        self.clubs.iter().any(|name| name == club)
    }
}

/// Inclusive band of table positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBand {
    pub first: u8,
    pub last: u8,
}

impl PositionBand {
    #[must_use]
    pub const fn new(first: u8, last: u8) -> Self {
        Self { first, last }
    }

    #[must_use]
    pub const fn contains(&self, position: u8) -> bool {
        self.first <= position && position <= self.last
    }
}

/// A player is eligible when any one counter reaches its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatThresholds {
    pub goals: u32,
    pub assists: u32,
    pub saves: u32,
    pub tackles: u32,
}

impl StatThresholds {
    #[must_use]
    pub const fn uniform(value: u32) -> Self {
        Self {
            goals: value,
            assists: value,
            saves: value,
            tackles: value,
        }
    }

    #[must_use]
    pub const fn met_by(&self, stats: &CareerStats) -> bool {
        stats.goals >= self.goals
            || stats.assists >= self.assists
            || stats.saves >= self.saves
            || stats.tackles >= self.tackles
    }
}

/// Interest from `to_tier` clubs in players of `from_tier` clubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRule {
    pub kind: OfferKind,
    pub from_tier: LeagueTier,
    pub from_positions: PositionBand,
    pub thresholds: StatThresholds,
    pub to_tier: LeagueTier,
    pub to_positions: PositionBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRules {
    #[serde(default = "TransferRules::default_min_matches")]
    pub min_matches: u32,
    #[serde(default = "TransferRules::default_offer_count")]
    pub offer_count: usize,
    #[serde(default = "TransferRules::default_rules")]
    pub rules: Vec<TransferRule>,
}

impl TransferRules {
    const fn default_min_matches() -> u32 {
        TRANSFER_MIN_MATCHES
    }

    const fn default_offer_count() -> usize {
        TRANSFER_OFFER_COUNT
    }

    fn default_rules() -> Vec<TransferRule> {
        vec![
            TransferRule {
                kind: OfferKind::Promotion,
                from_tier: LeagueTier::Silver,
                from_positions: PositionBand::new(1, 3),
                thresholds: StatThresholds {
                    goals: PROMOTION_MIN_GOALS,
                    assists: PROMOTION_MIN_ASSISTS,
                    saves: PROMOTION_MIN_SAVES,
                    tackles: PROMOTION_MIN_TACKLES,
                },
                to_tier: LeagueTier::Gold,
                to_positions: PositionBand::new(4, 8),
            },
            TransferRule {
                kind: OfferKind::Lateral,
                from_tier: LeagueTier::Silver,
                from_positions: PositionBand::new(4, u8::MAX),
                thresholds: StatThresholds::uniform(LATERAL_MIN_STAT),
                to_tier: LeagueTier::Silver,
                to_positions: PositionBand::new(1, 3),
            },
        ]
    }

    /// # Errors
    ///
    /// Returns `TransferRulesError` for a zero offer count or an inverted
    /// position band.
    pub fn validate(&self) -> Result<(), TransferRulesError> {
        if self.offer_count == 0 {
            return Err(TransferRulesError::ZeroOffers);
        }
        for rule in &self.rules {
            for band in [rule.from_positions, rule.to_positions] {
                if band.first > band.last {
                    return Err(TransferRulesError::InvertedBand {
                        first: band.first,
                        last: band.last,
                    });
                }
            }
        }
        Ok(())
    }

    /// Decide whether `profile` has earned an offer and, if so, sample the
    /// interested clubs.
    ///
    /// The first rule covering the player's current club decides; when its
    /// thresholds are not met there is no offer.
    pub fn evaluate<R: Rng>(
        &self,
        profile: &PlayerProfile,
        directory: &ClubDirectory,
        rng: &mut R,
    ) -> Option<TransferOffer> {
        if profile.stats.matches < self.min_matches {
            return None;
        }
        let Some(current) = directory.club(&profile.club) else {
            log::warn!("player {} plays for unknown club {}", profile.user_id, profile.club);
            return None;
        };
        let rule = self.rules.iter().find(|rule| {
            rule.from_tier == current.tier && rule.from_positions.contains(current.position)
        })?;
        if !rule.thresholds.met_by(&profile.stats) {
            return None;
        }

        let pool: Vec<&str> = directory
            .clubs_in(rule.to_tier)
            .iter()
            .filter(|club| rule.to_positions.contains(club.position))
            .filter(|club| club.name != profile.club)
            .map(|club| club.name.as_str())
            .collect();
        let clubs: Vec<String> = pool
            .choose_multiple(rng, self.offer_count)
            .map(|name| (*name).to_string())
            .collect();
        if clubs.is_empty() {
            return None;
        }
        log::info!(
            "player {} earned a {:?} offer from {}",
            profile.user_id,
            rule.kind,
            clubs.join(", ")
        );
        Some(TransferOffer {
            tier: rule.to_tier,
            kind: rule.kind,
            clubs,
        })
    }
}

impl Default for TransferRules {
    fn default() -> Self {
        Self {
            min_matches: Self::default_min_matches(),
            offer_count: Self::default_offer_count(),
            rules: Self::default_rules(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferRulesError {
    #[error("offer count must be at least one")]
    ZeroOffers,
    #[error("position band {first}..={last} is inverted")]
    InvertedBand { first: u8, last: u8 },
}

//! Career orchestration: registration, match start, result folding and
//! transfers.
//!
//! `CareerEngine` is synchronous and owns no player data. It reads a profile,
//! decides, and hands back [`ProfileUpdate`]s for the caller's store to apply.
use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{CalendarError, CalendarService, OpponentSource, PersonalCalendar};
use crate::club::{Club, ClubDataError, ClubDirectory, LeagueTier};
use crate::constants::REGISTRATION_OFFER_COUNT;
use crate::matchday::{
    MatchConfig, MatchConfigError, MatchError, MatchOutcome, MatchSession, MatchSetup, Transition,
};
use crate::profile::{CareerStats, MatchResult, PlayerProfile, Position, ProfileUpdate};
use crate::season::{
    BlockReason, DateAdvance, PlayGate, SeasonClock, SeasonConfig, SeasonConfigError, format_date,
};
use crate::transfer::{TransferOffer, TransferRules, TransferRulesError};

/// Tunables for a whole career.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerConfig {
    #[serde(default)]
    pub season: SeasonConfig,
    #[serde(default)]
    pub matches: MatchConfig,
    #[serde(default)]
    pub transfers: TransferRules,
    #[serde(default = "CareerConfig::default_registration_offers")]
    pub registration_offers: usize,
}

impl CareerConfig {
    const fn default_registration_offers() -> usize {
        REGISTRATION_OFFER_COUNT
    }

    /// # Errors
    ///
    /// Returns the first invalid section.
    pub fn validate(&self) -> Result<(), CareerConfigError> {
        self.season.validate()?;
        self.matches.validate()?;
        self.transfers.validate()?;
        if self.registration_offers == 0 {
            return Err(CareerConfigError::ZeroRegistrationOffers);
        }
        Ok(())
    }
}

impl Default for CareerConfig {
    fn default() -> Self {
        Self {
            season: SeasonConfig::default(),
            matches: MatchConfig::default(),
            transfers: TransferRules::default(),
            registration_offers: Self::default_registration_offers(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CareerConfigError {
    #[error("season: {0}")]
    Season(#[from] SeasonConfigError),
    #[error("match: {0}")]
    Match(#[from] MatchConfigError),
    #[error("transfers: {0}")]
    Transfers(#[from] TransferRulesError),
    #[error("registration must offer at least one club")]
    ZeroRegistrationOffers,
}

#[derive(Debug, Error, PartialEq)]
pub enum CareerError {
    #[error(transparent)]
    Config(#[from] CareerConfigError),
    #[error(transparent)]
    Clubs(#[from] ClubDataError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("unknown club {0:?}")]
    UnknownClub(String),
    #[error("club {0:?} is not open to new registrations")]
    ClubNotOpen(String),
    #[error("no transfer offer is pending")]
    NoPendingOffer,
    #[error("{0:?} did not make an offer")]
    ClubNotOffered(String),
    #[error("{club} has no fixture for round {round}")]
    NoFixture { club: String, round: u32 },
}

/// Extra information to show the player before kick-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartNotice {
    NewSeason { start: NaiveDate, completed_rounds: u32 },
    CalendarRepaired,
}

/// Answer to a "play the next match" request.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchStart {
    Blocked(BlockReason),
    Ready {
        session: Box<MatchSession>,
        kickoff: Transition,
        notices: Vec<StartNotice>,
    },
}

/// How a finished match changes the career.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub result: MatchResult,
    pub update: ProfileUpdate,
    pub advance: DateAdvance,
    pub offer: Option<TransferOffer>,
    pub new_season: bool,
}

/// Stateless rules engine shared by every player.
#[derive(Debug, Clone)]
pub struct CareerEngine {
    directory: ClubDirectory,
    calendars: CalendarService,
    clock: SeasonClock,
    matches: MatchConfig,
    transfers: TransferRules,
    registration_offers: usize,
}

impl CareerEngine {
    /// Validate configuration and build every league calendar.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, inconsistent club data or a league
    /// that cannot be scheduled for the configured number of rounds.
    pub fn new(config: CareerConfig, directory: ClubDirectory) -> Result<Self, CareerError> {
        config.validate()?;
        directory.validate()?;
        let calendars = CalendarService::build(&directory, Some(config.season.rounds))?;
        Ok(Self {
            directory,
            calendars,
            clock: SeasonClock::new(config.season),
            matches: config.matches,
            transfers: config.transfers,
            registration_offers: config.registration_offers,
        })
    }

    /// Engine over the bundled clubs and default balance.
    ///
    /// # Errors
    ///
    /// See [`CareerEngine::new`].
    pub fn with_defaults() -> Result<Self, CareerError> {
        Self::new(CareerConfig::default(), ClubDirectory::default())
    }

    #[must_use]
    pub const fn directory(&self) -> &ClubDirectory {
        &self.directory
    }

    #[must_use]
    pub const fn calendars(&self) -> &CalendarService {
        &self.calendars
    }

    #[must_use]
    pub const fn clock(&self) -> &SeasonClock {
        &self.clock
    }

    #[must_use]
    pub const fn match_config(&self) -> &MatchConfig {
        &self.matches
    }

    /// Distinct entry-level clubs offered to a new player.
    pub fn registration_offers<R: Rng>(&self, rng: &mut R) -> Vec<&Club> {
        let pool: Vec<&Club> = self.directory.clubs_in(LeagueTier::Silver).iter().collect();
        pool.choose_multiple(rng, self.registration_offers)
            .copied()
            .collect()
    }

    /// Create a profile for a new player joining `club` on wall-clock `today`.
    ///
    /// # Errors
    ///
    /// Rejects clubs that do not exist or are outside the entry tier.
    pub fn register(
        &self,
        user_id: u64,
        name: &str,
        position: Position,
        club: &str,
        today: NaiveDate,
    ) -> Result<PlayerProfile, CareerError> {
        let entry = self
            .directory
            .club(club)
            .ok_or_else(|| CareerError::UnknownClub(club.to_string()))?;
        if entry.tier != LeagueTier::Silver {
            return Err(CareerError::ClubNotOpen(club.to_string()));
        }
        let start = self.clock.initial_date(today);
        let mut profile = PlayerProfile::new(user_id, name.trim(), position, club, format_date(start));
        profile.personal_calendar = self
            .calendars
            .personal_calendar(club)
            .map(|calendar| calendar.to_json());
        log::info!("registered player {user_id} ({position}) at {club}, first match {start}");
        Ok(profile)
    }

    /// Current personal calendar, regenerated if the stored one is unusable.
    #[must_use]
    pub fn fixtures(&self, profile: &PlayerProfile) -> PersonalCalendar {
        let season_length = self
            .calendars
            .season_length(&profile.club)
            .unwrap_or(self.clock.config().rounds);
        profile
            .decoded_calendar()
            .filter(|calendar| calendar.is_well_formed(season_length))
            .or_else(|| self.calendars.personal_calendar(&profile.club))
            .unwrap_or_default()
    }

    /// Gate, pick the opponent and kick off the next match.
    ///
    /// `profile` may be modified (season rollover, repaired calendar, date
    /// moved out of the winter break); the caller persists it whether or not
    /// a match starts.
    ///
    /// # Errors
    ///
    /// Returns [`CareerError::NoFixture`] when no opponent can be found at all.
    pub fn start_match<R: Rng>(
        &self,
        profile: &mut PlayerProfile,
        rng: &mut R,
    ) -> Result<MatchStart, CareerError> {
        let mut notices = Vec::new();
        let date = match self.clock.can_play_match(profile, &self.calendars) {
            PlayGate::Blocked(reason) => return Ok(MatchStart::Blocked(reason)),
            PlayGate::Ready { date } => date,
            PlayGate::NewSeason {
                date,
                completed_rounds,
            } => {
                notices.push(StartNotice::NewSeason {
                    start: date,
                    completed_rounds,
                });
                date
            }
        };

        let round = profile.current_round;
        let lookup = self
            .calendars
            .opponent_for_round(
                &profile.club,
                round,
                profile.personal_calendar.as_deref(),
                rng,
            )
            .ok_or_else(|| CareerError::NoFixture {
                club: profile.club.clone(),
                round,
            })?;
        if let Some(repaired) = &lookup.repaired {
            profile.personal_calendar = Some(repaired.to_json());
            notices.push(StartNotice::CalendarRepaired);
        }
        if lookup.source == OpponentSource::RandomFallback {
            log::warn!(
                "player {} plays a substitute opponent {} in round {round}",
                profile.user_id,
                lookup.opponent
            );
        }

        let tier = self
            .calendars
            .league_for_club(&profile.club)
            .map(|league| league.tier)
            .or_else(|| self.directory.tier_of(&profile.club))
            .unwrap_or_default();
        let setup = MatchSetup {
            user_id: profile.user_id,
            position: profile.position,
            club: profile.club.clone(),
            opponent: lookup.opponent,
            is_home: lookup.is_home,
            tier,
            round,
            date: format_date(date),
            match_key: self.clock.match_key(date, round),
        };
        let mut session = MatchSession::new(setup, self.matches);
        let kickoff = session.kick_off(rng)?;
        Ok(MatchStart::Ready {
            session: Box::new(session),
            kickoff,
            notices,
        })
    }

    /// Fold a finished match into the career: counters, next round, next
    /// date and, at milestones, a transfer offer.
    pub fn settle_match<R: Rng>(
        &self,
        profile: &PlayerProfile,
        outcome: &MatchOutcome,
        rng: &mut R,
    ) -> Settlement {
        let delta = CareerStats::from_match(&outcome.stats, outcome.result);
        let date = self.clock.read_date(&profile.virtual_date);
        let advance = self.clock.advance_date(date);

        let mut projected = profile.clone();
        projected.stats.accumulate(&delta);
        let offer = if profile.pending_offer.is_none() {
            self.transfers.evaluate(&projected, &self.directory, rng)
        } else {
            None
        };

        let mut update = ProfileUpdate::for_match(outcome.match_key.clone(), delta)
            .with_date(format_date(advance.date));
        if advance.season_ended {
            update = update.with_round(1).with_calendar(
                self.calendars
                    .personal_calendar(&profile.club)
                    .map(|calendar| calendar.to_json()),
            );
        } else {
            update = update.with_round(profile.current_round.saturating_add(1));
        }
        if offer.is_some() {
            update = update.with_offer(offer.clone());
        }
        log::info!(
            "player {} finished round {} {:?}; next match {}",
            profile.user_id,
            profile.current_round,
            outcome.result,
            advance.date
        );
        Settlement {
            result: outcome.result,
            update,
            advance,
            offer,
            new_season: advance.season_ended,
        }
    }

    /// Move the player to `club`, which must be part of the pending offer.
    ///
    /// # Errors
    ///
    /// Rejects the move when no offer is pending or `club` was not offered.
    pub fn accept_transfer(
        &self,
        profile: &PlayerProfile,
        club: &str,
    ) -> Result<ProfileUpdate, CareerError> {
        let offer = profile
            .pending_offer
            .as_ref()
            .ok_or(CareerError::NoPendingOffer)?;
        if !offer.includes(club) {
            return Err(CareerError::ClubNotOffered(club.to_string()));
        }
        let calendar = self
            .calendars
            .personal_calendar(club)
            .ok_or_else(|| CareerError::UnknownClub(club.to_string()))?;
        log::info!(
            "player {} transfers from {} to {club}",
            profile.user_id,
            profile.club
        );
        Ok(ProfileUpdate::default()
            .with_club(club)
            .with_calendar(Some(calendar.to_json()))
            .with_offer(None))
    }

    /// Turn down the pending offer so new ones can be made.
    #[must_use]
    pub fn decline_transfer(&self, profile: &PlayerProfile) -> ProfileUpdate {
        log::debug!("player {} declined transfer interest", profile.user_id);
        ProfileUpdate::default().with_offer(None)
    }

    /// Zero every counter and restart the player's first season at the
    /// current club. Name, position and club are kept.
    #[must_use]
    pub fn reset_career(&self, profile: &PlayerProfile, today: NaiveDate) -> ProfileUpdate {
        let start = self.clock.initial_date(today);
        log::info!("player {} reset their career; restarting {start}", profile.user_id);
        let mut update = ProfileUpdate::default()
            .with_round(1)
            .with_date(format_date(start))
            .with_calendar(
                self.calendars
                    .personal_calendar(&profile.club)
                    .map(|calendar| calendar.to_json()),
            )
            .with_offer(None);
        update.reset_stats = true;
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchday::{FinishReason, Score};
    use crate::profile::{MatchStats, UpdateOutcome};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn outcome(key: &str, team: u8, opponent: u8, stats: MatchStats) -> MatchOutcome {
        MatchOutcome {
            match_key: key.to_string(),
            score: Score { team, opponent },
            result: MatchResult::from_score(team, opponent),
            stats,
            reason: FinishReason::FullTime,
            minute: 92,
            actions_taken: 9,
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = CareerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.registration_offers, REGISTRATION_OFFER_COUNT);
        let parsed: CareerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn registration_offers_three_distinct_silver_clubs() {
        let engine = CareerEngine::with_defaults().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let offers = engine.registration_offers(&mut rng);
        assert_eq!(offers.len(), 3);
        assert!(offers.iter().all(|club| club.tier == LeagueTier::Silver));
        assert_ne!(offers[0].name, offers[1].name);
        assert_ne!(offers[1].name, offers[2].name);
        assert_ne!(offers[0].name, offers[2].name);
    }

    #[test]
    fn register_rejects_gold_and_unknown_clubs() {
        let engine = CareerEngine::with_defaults().unwrap();
        let today = day(2025, 10, 1);
        assert_eq!(
            engine
                .register(1, "Ivan", Position::Forward, "Kuban", today)
                .unwrap_err(),
            CareerError::ClubNotOpen("Kuban".to_string())
        );
        assert!(matches!(
            engine.register(1, "Ivan", Position::Forward, "Atlantis", today),
            Err(CareerError::UnknownClub(_))
        ));

        let profile = engine
            .register(1, " Ivan ", Position::Forward, "Forte", day(2025, 7, 14))
            .unwrap();
        assert_eq!(profile.name, "Ivan");
        assert_eq!(profile.virtual_date, "2025-09-01");
        assert_eq!(engine.fixtures(&profile).len(), 18);
    }

    #[test]
    fn settlement_is_applied_once() {
        let engine = CareerEngine::with_defaults().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mut profile = engine
            .register(5, "Olga", Position::Defender, "Irtysh Omsk", day(2024, 10, 1))
            .unwrap();
        let stats = MatchStats {
            tackles: 3,
            ..MatchStats::default()
        };
        let settlement =
            engine.settle_match(&profile, &outcome("2024-09-01#1", 0, 0, stats), &mut rng);
        assert_eq!(settlement.result, MatchResult::Draw);
        assert_eq!(profile.apply(&settlement.update), UpdateOutcome::Applied);
        assert_eq!(profile.apply(&settlement.update), UpdateOutcome::Duplicate);
        assert_eq!(profile.stats.draws, 1);
        assert_eq!(profile.stats.tackles, 3);
        assert_eq!(profile.current_round, 2);
    }

    #[test]
    fn milestone_produces_offer_and_transfer_moves_club() {
        let engine = CareerEngine::with_defaults().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut profile = engine
            .register(6, "Yuri", Position::Forward, "Murom", day(2024, 9, 1))
            .unwrap();
        profile.stats.matches = 9;
        profile.stats.goals = 4;
        profile.current_round = 10;

        let stats = MatchStats {
            goals: 1,
            ..MatchStats::default()
        };
        let settlement =
            engine.settle_match(&profile, &outcome("2024-09-01#10", 1, 0, stats), &mut rng);
        let offer = settlement.offer.clone().unwrap();
        profile.apply(&settlement.update);
        assert_eq!(profile.pending_offer.as_ref(), Some(&offer));

        assert!(matches!(
            engine.accept_transfer(&profile, "Murom"),
            Err(CareerError::ClubNotOffered(_))
        ));
        let target = offer.clubs[0].clone();
        let update = engine.accept_transfer(&profile, &target).unwrap();
        profile.apply(&update);
        assert_eq!(profile.club, target);
        assert_eq!(profile.current_round, 11);
        assert!(profile.pending_offer.is_none());
        let fixtures = engine.fixtures(&profile);
        assert!(fixtures.entries().iter().all(|entry| entry.opponent != target));
        assert_eq!(
            engine.accept_transfer(&profile, &target),
            Err(CareerError::NoPendingOffer)
        );
    }

    #[test]
    fn start_match_blocks_in_winter_and_kicks_off_otherwise() {
        let engine = CareerEngine::with_defaults().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut profile = engine
            .register(8, "Dima", Position::Goalkeeper, "Kaluga", day(2024, 10, 1))
            .unwrap();
        profile.virtual_date = "2024-12-10".to_string();
        assert!(matches!(
            engine.start_match(&mut profile, &mut rng).unwrap(),
            MatchStart::Blocked(BlockReason::WinterBreak { .. })
        ));

        let MatchStart::Ready {
            session, kickoff, ..
        } = engine.start_match(&mut profile, &mut rng).unwrap()
        else {
            panic!("expected a playable match");
        };
        assert_eq!(session.setup().date, "2025-02-01");
        assert_eq!(session.setup().match_key, "2024-09-01#1");
        assert!(kickoff.prompt.is_some());
    }

    #[test]
    fn reset_keeps_identity_and_clears_progress() {
        let engine = CareerEngine::with_defaults().unwrap();
        let mut profile = engine
            .register(9, "Nina", Position::Defender, "Sibir", day(2024, 10, 1))
            .unwrap();
        profile.stats.matches = 12;
        profile.stats.tackles = 30;
        profile.current_round = 13;
        profile.virtual_date = "2024-11-24".to_string();

        let update = engine.reset_career(&profile, day(2025, 6, 30));
        assert_eq!(profile.apply(&update), UpdateOutcome::Applied);
        assert!(profile.stats.is_zero());
        assert_eq!(profile.current_round, 1);
        assert_eq!(profile.virtual_date, "2025-09-01");
        assert_eq!(profile.club, "Sibir");
        assert_eq!(profile.position, Position::Defender);
        assert!(profile.pending_offer.is_none());
    }

    #[test]
    fn invalid_config_is_fatal() {
        let config = CareerConfig {
            registration_offers: 0,
            ..CareerConfig::default()
        };
        assert_eq!(
            CareerEngine::new(config, ClubDirectory::default()).unwrap_err(),
            CareerError::Config(CareerConfigError::ZeroRegistrationOffers)
        );

        let mut tiny = ClubDirectory::default();
        tiny.leagues[0].clubs.truncate(3);
        assert!(matches!(
            CareerEngine::new(CareerConfig::default(), tiny),
            Err(CareerError::Calendar(CalendarError::RoundsExceedSchedule { .. }))
        ));
    }
}

//! Matchday Career Engine
//!
//! Platform-agnostic core logic for the Matchday football career game.
//! This crate schedules leagues, runs interactive matches and folds results
//! into a player's career without any transport, storage or async
//! dependencies.

pub mod calendar;
pub mod career;
pub mod club;
pub mod constants;
pub mod matchday;
pub mod profile;
pub mod season;
pub mod transfer;

// Re-export commonly used types
pub use calendar::{
    CalendarEntry, CalendarError, CalendarService, Fixture, LeagueCalendar, OpponentLookup,
    OpponentSource, PersonalCalendar, full_schedule_rounds, generate_double_round_robin,
};
pub use career::{
    CareerConfig, CareerConfigError, CareerEngine, CareerError, MatchStart, Settlement,
    StartNotice,
};
pub use club::{Club, ClubDataError, ClubDirectory, League, LeagueTier};
pub use matchday::{
    Action, ActionInput, EventId, EventKind, FinishReason, MatchConfig, MatchConfigError,
    MatchError, MatchEvent, MatchOutcome, MatchSession, MatchSetup, MatchState, Phase, Prompt,
    Score, Side, Transition,
};
pub use profile::{
    CareerStats, MatchResult, MatchStats, PlayerProfile, Position, ProfileUpdate, UpdateOutcome,
};
pub use season::{
    BlockReason, DateAdvance, PlayGate, SeasonClock, SeasonConfig, SeasonConfigError,
    format_date, parse_date,
};
pub use transfer::{
    OfferKind, PositionBand, StatThresholds, TransferOffer, TransferRule, TransferRules,
    TransferRulesError,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_engine_builds_both_leagues() {
        let engine = CareerEngine::with_defaults().unwrap();
        for tier in LeagueTier::ALL {
            let league = engine.calendars().league(tier).unwrap();
            assert_eq!(league.clubs.len(), 10);
            assert_eq!(league.fixtures.len(), 90);
        }
        assert_eq!(engine.clock().config(), &SeasonConfig::default());
        assert_eq!(engine.directory(), &ClubDirectory::default());
    }

    #[test]
    fn config_overrides_reach_the_engine() {
        let config: CareerConfig = serde_json::from_str(r#"{"season": {"rounds": 6}}"#).unwrap();
        let engine = CareerEngine::new(config, ClubDirectory::default()).unwrap();
        assert_eq!(engine.clock().config().rounds, 6);
        assert_eq!(engine.calendars().season_length("Murom"), Some(6));

        let config: CareerConfig = serde_json::from_str(r#"{"season": {"rounds": 40}}"#).unwrap();
        let err = CareerEngine::new(config, ClubDirectory::default()).unwrap_err();
        assert!(matches!(
            err,
            CareerError::Calendar(CalendarError::RoundsExceedSchedule { .. })
        ));
    }
}

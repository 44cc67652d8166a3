//! Season fixture generation.
//!
//! The global calendar is a double round-robin built with the circle method:
//! one club stays fixed while the rest rotate, the first circle decides every
//! pairing once, and the second circle replays it with home and away swapped.
//! `CalendarService` is built once at startup and handed to consumers; it is
//! read-only afterwards.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::club::{ClubDirectory, LeagueTier};

pub mod personal;
pub use personal::{CalendarEntry, OpponentLookup, OpponentSource, PersonalCalendar};

/// One scheduled match between two clubs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixture {
    pub home: String,
    pub away: String,
    pub round: u32,
}

impl Fixture {
    #[must_use]
    pub fn involves(&self, club: &str) -> bool {
        self.home == club || self.away == club
    }

    /// The other side of the fixture from `club`'s point of view.
    #[must_use]
    pub fn opponent_of(&self, club: &str) -> Option<(&str, bool)> {
        if self.home == club {
            Some((self.away.as_str(), true))
        } else if self.away == club {
            Some((self.home.as_str(), false))
        } else {
            None
        }
    }
}

/// Configuration faults raised while building the season calendar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("cannot schedule an empty club set")]
    EmptyClubSet,
    #[error("a round-robin needs at least two clubs (got {0})")]
    TooFewClubs(usize),
    #[error("club {0:?} appears more than once")]
    DuplicateClub(String),
    #[error("season of {requested} rounds requested but the schedule only spans {available}")]
    RoundsExceedSchedule { requested: u32, available: u32 },
    #[error("season length must be at least one round")]
    ZeroRounds,
    #[error("no league configured for tier {0}")]
    MissingLeague(LeagueTier),
}

/// Number of rounds a full double round-robin spans for `club_count` clubs.
#[must_use]
pub fn full_schedule_rounds(club_count: usize) -> u32 {
    let slots = club_count + club_count % 2;
    u32::try_from(slots.saturating_sub(1) * 2).unwrap_or(u32::MAX)
}

/// Build a double round-robin for `clubs`, keeping only the first
/// `total_rounds` rounds when a shorter season is configured.
///
/// # Errors
///
/// Returns an error for an empty, single-club or duplicated club set, or when
/// more rounds are requested than the full schedule provides.
pub fn generate_double_round_robin(
    clubs: &[String],
    total_rounds: Option<u32>,
) -> Result<Vec<Fixture>, CalendarError> {
    if clubs.is_empty() {
        return Err(CalendarError::EmptyClubSet);
    }
    if clubs.len() < 2 {
        return Err(CalendarError::TooFewClubs(clubs.len()));
    }
    let mut seen = HashSet::new();
    for club in clubs {
        if !seen.insert(club.as_str()) {
            return Err(CalendarError::DuplicateClub(club.clone()));
        }
    }

    let available = full_schedule_rounds(clubs.len());
    let keep = match total_rounds {
        Some(0) => return Err(CalendarError::ZeroRounds),
        Some(requested) if requested > available => {
            return Err(CalendarError::RoundsExceedSchedule {
                requested,
                available,
            });
        }
        Some(requested) => requested,
        None => available,
    };

    // `None` is the synthetic bye slot for odd club counts.
    let mut slots: Vec<Option<usize>> = (0..clubs.len()).map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let slot_count = slots.len();
    let circle_rounds = u32::try_from(slot_count - 1).unwrap_or(u32::MAX);

    let mut first_circle = Vec::with_capacity(slot_count / 2 * (slot_count - 1));
    for round in 1..=circle_rounds {
        for i in 0..slot_count / 2 {
            let (left, right) = (slots[i], slots[slot_count - 1 - i]);
            let (Some(left), Some(right)) = (left, right) else {
                continue;
            };
            let (home, away) = if round % 2 == 1 {
                (left, right)
            } else {
                (right, left)
            };
            first_circle.push(Fixture {
                home: clubs[home].clone(),
                away: clubs[away].clone(),
                round,
            });
        }
        slots[1..].rotate_right(1);
    }

    let second_circle: Vec<Fixture> = first_circle
        .iter()
        .map(|fixture| Fixture {
            home: fixture.away.clone(),
            away: fixture.home.clone(),
            round: fixture.round + circle_rounds,
        })
        .collect();

    let mut fixtures = first_circle;
    fixtures.extend(second_circle);
    fixtures.retain(|fixture| fixture.round <= keep);
    fixtures.sort_by_key(|fixture| fixture.round);
    Ok(fixtures)
}

/// The fixture list of a single league tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueCalendar {
    pub tier: LeagueTier,
    pub clubs: Vec<String>,
    pub rounds: u32,
    pub fixtures: Vec<Fixture>,
}

impl LeagueCalendar {
    /// Fixtures scheduled for one round.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Fixture> {
        self.fixtures
            .iter()
            .filter(move |fixture| fixture.round == round)
    }

    /// Derive `club`'s ordered view of its own fixtures.
    #[must_use]
    pub fn personal(&self, club: &str) -> PersonalCalendar {
        PersonalCalendar::derive(club, &self.fixtures)
    }

    /// First fixture at or after `round` that involves `club`.
    #[must_use]
    pub fn next_fixture(&self, club: &str, round: u32) -> Option<&Fixture> {
        self.fixtures
            .iter()
            .filter(|fixture| fixture.round >= round)
            .find(|fixture| fixture.involves(club))
    }

    #[must_use]
    pub fn contains(&self, club: &str) -> bool {
        self.clubs.iter().any(|name| name == club)
    }
}

/// Read-only owner of every league's season calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarService {
    leagues: BTreeMap<LeagueTier, LeagueCalendar>,
}

impl CalendarService {
    /// Generate the calendar of every league in `directory`.
    ///
    /// `rounds` truncates each season to that many rounds; `None` keeps the
    /// full double round-robin.
    ///
    /// # Errors
    ///
    /// Returns an error if any league cannot be scheduled.
    pub fn build(directory: &ClubDirectory, rounds: Option<u32>) -> Result<Self, CalendarError> {
        let mut leagues = BTreeMap::new();
        for tier in LeagueTier::ALL {
            let clubs = directory.names_in(tier);
            if directory.league(tier).is_none() {
                return Err(CalendarError::MissingLeague(tier));
            }
            let fixtures = generate_double_round_robin(&clubs, rounds)?;
            let season_rounds = rounds.unwrap_or_else(|| full_schedule_rounds(clubs.len()));
            log::info!(
                "generated {} calendar: {} clubs, {} rounds, {} fixtures",
                tier,
                clubs.len(),
                season_rounds,
                fixtures.len()
            );
            leagues.insert(
                tier,
                LeagueCalendar {
                    tier,
                    clubs,
                    rounds: season_rounds,
                    fixtures,
                },
            );
        }
        Ok(Self { leagues })
    }

    #[must_use]
    pub fn league(&self, tier: LeagueTier) -> Option<&LeagueCalendar> {
        self.leagues.get(&tier)
    }

    #[must_use]
    pub fn league_for_club(&self, club: &str) -> Option<&LeagueCalendar> {
        self.leagues.values().find(|league| league.contains(club))
    }

    /// Season length in rounds for the league `club` plays in.
    #[must_use]
    pub fn season_length(&self, club: &str) -> Option<u32> {
        self.league_for_club(club).map(|league| league.rounds)
    }

    /// Fresh personal calendar for `club`, if it plays in a known league.
    #[must_use]
    pub fn personal_calendar(&self, club: &str) -> Option<PersonalCalendar> {
        self.league_for_club(club).map(|league| league.personal(club))
    }

    /// Answer "who does `club` play in `round`".
    ///
    /// `stored` is the player's persisted personal calendar as raw JSON. It
    /// is trusted when well formed; otherwise the calendar is regenerated and
    /// handed back in [`OpponentLookup::repaired`] so the caller can persist
    /// it. Returns `None` once `round` is past the end of the season.
    pub fn opponent_for_round<R: Rng>(
        &self,
        club: &str,
        round: u32,
        stored: Option<&str>,
        rng: &mut R,
    ) -> Option<OpponentLookup> {
        let league = self.league_for_club(club);
        let season_length = league.map_or_else(|| self.longest_season(), |league| league.rounds);
        if round == 0 || round > season_length {
            return None;
        }

        let decoded = stored.and_then(|raw| match PersonalCalendar::from_json(raw) {
            Ok(calendar) if calendar.is_well_formed(season_length) => Some(calendar),
            Ok(_) => {
                log::warn!("personal calendar for {club} is inconsistent; regenerating");
                None
            }
            Err(err) => {
                log::warn!("personal calendar for {club} is unreadable ({err}); regenerating");
                None
            }
        });
        if stored.is_none() {
            log::warn!("no personal calendar stored for {club}; regenerating");
        }

        if let Some(entry) = decoded.as_ref().and_then(|calendar| calendar.entry(round)) {
            return Some(OpponentLookup::new(round, entry, OpponentSource::Stored));
        }

        if decoded.is_some() {
            log::warn!("personal calendar for {club} has no round {round}; regenerating");
        }

        if let Some(league) = league {
            let regenerated = league.personal(club);
            if let Some(entry) = regenerated.entry(round) {
                let mut lookup = OpponentLookup::new(round, entry, OpponentSource::Regenerated);
                lookup.repaired = Some(regenerated.clone());
                return Some(lookup);
            }

            if let Some(fixture) = league.next_fixture(club, round)
                && let Some((opponent, is_home)) = fixture.opponent_of(club)
            {
                log::warn!(
                    "data integrity: {club} has no fixture in round {round}; using round {} against {opponent}",
                    fixture.round
                );
                return Some(OpponentLookup {
                    round,
                    opponent: opponent.to_string(),
                    is_home,
                    source: OpponentSource::ScheduleSearch,
                    repaired: (decoded.as_ref() != Some(&regenerated)).then_some(regenerated),
                });
            }
        }

        let candidates: Vec<&String> = match league {
            Some(league) => league.clubs.iter().collect(),
            None => self
                .leagues
                .values()
                .flat_map(|league| league.clubs.iter())
                .collect(),
        };
        let pool: Vec<&String> = candidates
            .into_iter()
            .filter(|name| name.as_str() != club)
            .collect();
        let opponent = pool.choose(rng)?;
        log::warn!(
            "data integrity: no scheduled opponent for {club} in round {round}; picked {opponent} at random"
        );
        Some(OpponentLookup {
            round,
            opponent: (*opponent).clone(),
            is_home: rng.gen_bool(0.5),
            source: OpponentSource::RandomFallback,
            repaired: None,
        })
    }

    fn longest_season(&self) -> u32 {
        self.leagues
            .values()
            .map(|league| league.rounds)
            .max()
            .unwrap_or(0)
    }
}

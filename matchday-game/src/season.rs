//! Virtual season calendar: active months, the winter break and rollover.
//!
//! Every player carries their own virtual date, advanced only by finished
//! matches. Wall-clock time is consulted once, when a career starts.
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::CalendarService;
use crate::constants::{
    DAYS_BETWEEN_MATCHES, FIRST_SEASON_YEAR, SEASON_END_MONTH, SEASON_ROUNDS, SEASON_START_MONTH,
    WINTER_BREAK_RESUME_MONTH, WINTER_BREAK_START_MONTH,
};
use crate::profile::PlayerProfile;

/// Encoding every date is written back in.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";
/// Older profiles stored dates day-first.
pub const LEGACY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Parse either stored date encoding.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, CANONICAL_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, LEGACY_DATE_FORMAT))
        .ok()
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

fn month_in_window(month: u32, first: u32, last: u32) -> bool {
    if first <= last {
        (first..=last).contains(&month)
    } else {
        month >= first || month <= last
    }
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Season window and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonConfig {
    #[serde(default = "SeasonConfig::default_start_month")]
    pub start_month: u32,
    #[serde(default = "SeasonConfig::default_end_month")]
    pub end_month: u32,
    #[serde(default = "SeasonConfig::default_break_start_month")]
    pub break_start_month: u32,
    #[serde(default = "SeasonConfig::default_break_resume_month")]
    pub break_resume_month: u32,
    #[serde(default = "SeasonConfig::default_days_between_matches")]
    pub days_between_matches: i64,
    #[serde(default = "SeasonConfig::default_first_season_year")]
    pub first_season_year: i32,
    #[serde(default = "SeasonConfig::default_rounds")]
    pub rounds: u32,
}

impl SeasonConfig {
    const fn default_start_month() -> u32 {
        SEASON_START_MONTH
    }

    const fn default_end_month() -> u32 {
        SEASON_END_MONTH
    }

    const fn default_break_start_month() -> u32 {
        WINTER_BREAK_START_MONTH
    }

    const fn default_break_resume_month() -> u32 {
        WINTER_BREAK_RESUME_MONTH
    }

    const fn default_days_between_matches() -> i64 {
        DAYS_BETWEEN_MATCHES
    }

    const fn default_first_season_year() -> i32 {
        FIRST_SEASON_YEAR
    }

    const fn default_rounds() -> u32 {
        SEASON_ROUNDS
    }

    /// # Errors
    ///
    /// Returns `SeasonConfigError` when a month is out of range, the match
    /// interval is not positive or the season has no rounds.
    pub fn validate(&self) -> Result<(), SeasonConfigError> {
        for (field, value) in [
            ("start_month", self.start_month),
            ("end_month", self.end_month),
            ("break_start_month", self.break_start_month),
            ("break_resume_month", self.break_resume_month),
        ] {
            if !(1..=12).contains(&value) {
                return Err(SeasonConfigError::MonthOutOfRange { field, value });
            }
        }
        if self.start_month == self.end_month {
            return Err(SeasonConfigError::EmptySeason);
        }
        if self.break_start_month == self.break_resume_month {
            return Err(SeasonConfigError::EmptyBreak);
        }
        if self.days_between_matches <= 0 {
            return Err(SeasonConfigError::NonPositiveInterval(
                self.days_between_matches,
            ));
        }
        if self.rounds == 0 {
            return Err(SeasonConfigError::ZeroRounds);
        }
        if first_of_month(self.first_season_year, self.start_month).is_none() {
            return Err(SeasonConfigError::InvalidFirstSeason(self.first_season_year));
        }
        Ok(())
    }
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            start_month: Self::default_start_month(),
            end_month: Self::default_end_month(),
            break_start_month: Self::default_break_start_month(),
            break_resume_month: Self::default_break_resume_month(),
            days_between_matches: Self::default_days_between_matches(),
            first_season_year: Self::default_first_season_year(),
            rounds: Self::default_rounds(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeasonConfigError {
    #[error("{field} must be a month between 1 and 12 (got {value})")]
    MonthOutOfRange { field: &'static str, value: u32 },
    #[error("season start and end month must differ")]
    EmptySeason,
    #[error("winter break start and resume month must differ")]
    EmptyBreak,
    #[error("days between matches must be positive (got {0})")]
    NonPositiveInterval(i64),
    #[error("a season needs at least one round")]
    ZeroRounds,
    #[error("first season year {0} is not representable")]
    InvalidFirstSeason(i32),
}

/// Why a match cannot be played right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    WinterBreak { resumes: NaiveDate },
    NotInSquad,
}

/// Outcome of asking whether a player may start a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayGate {
    Ready { date: NaiveDate },
    /// The previous season was exhausted and a new one has begun; play on.
    NewSeason { date: NaiveDate, completed_rounds: u32 },
    Blocked(BlockReason),
}

impl PlayGate {
    #[must_use]
    pub const fn is_playable(&self) -> bool {
        !matches!(self, Self::Blocked(_))
    }
}

/// Result of moving a virtual date past one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateAdvance {
    pub date: NaiveDate,
    pub skipped_break: bool,
    pub season_ended: bool,
}

/// Season rules over virtual dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonClock {
    config: SeasonConfig,
}

impl SeasonClock {
    #[must_use]
    pub const fn new(config: SeasonConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &SeasonConfig {
        &self.config
    }

    fn break_last_month(&self) -> u32 {
        if self.config.break_resume_month == 1 {
            12
        } else {
            self.config.break_resume_month - 1
        }
    }

    fn in_season_window(&self, date: NaiveDate) -> bool {
        month_in_window(date.month(), self.config.start_month, self.config.end_month)
    }

    #[must_use]
    pub fn is_winter_break(&self, date: NaiveDate) -> bool {
        month_in_window(
            date.month(),
            self.config.break_start_month,
            self.break_last_month(),
        )
    }

    #[must_use]
    pub fn is_season_active(&self, date: NaiveDate) -> bool {
        self.in_season_window(date) && !self.is_winter_break(date)
    }

    /// First day of the very first season; the fallback for bad stored dates.
    #[must_use]
    pub fn default_season_start(&self) -> NaiveDate {
        first_of_month(self.config.first_season_year, self.config.start_month)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Start date of the season `date` belongs to.
    #[must_use]
    pub fn season_start_for(&self, date: NaiveDate) -> NaiveDate {
        let year = if date.month() >= self.config.start_month {
            date.year()
        } else {
            date.year() - 1
        };
        first_of_month(year, self.config.start_month).unwrap_or(date)
    }

    /// The next season start strictly after the season `date` belongs to.
    #[must_use]
    pub fn next_season_start(&self, date: NaiveDate) -> NaiveDate {
        let year = if date.month() >= self.config.start_month {
            date.year() + 1
        } else {
            date.year()
        };
        first_of_month(year, self.config.start_month).unwrap_or(date)
    }

    /// Day play resumes after the break containing `date`.
    #[must_use]
    pub fn break_end(&self, date: NaiveDate) -> NaiveDate {
        let wraps = self.config.break_start_month > self.config.break_resume_month;
        let year = if wraps && date.month() >= self.config.break_start_month {
            date.year() + 1
        } else {
            date.year()
        };
        first_of_month(year, self.config.break_resume_month).unwrap_or(date)
    }

    /// Interpret a stored date, substituting the first season's start when
    /// the text cannot be read.
    #[must_use]
    pub fn read_date(&self, stored: &str) -> NaiveDate {
        parse_date(stored).unwrap_or_else(|| {
            let fallback = self.default_season_start();
            log::warn!("unreadable virtual date {stored:?}; using season start {fallback}");
            fallback
        })
    }

    /// Virtual date for a brand-new career registered on `today`.
    #[must_use]
    pub fn initial_date(&self, today: NaiveDate) -> NaiveDate {
        if self.is_season_active(today) {
            today
        } else if self.is_winter_break(today) && self.in_season_window(today) {
            self.break_end(today)
        } else {
            self.next_season_start(today)
        }
    }

    /// Key identifying one round of one season, used to make result folding
    /// idempotent.
    #[must_use]
    pub fn match_key(&self, date: NaiveDate, round: u32) -> String {
        format!("{}#{round}", format_date(self.season_start_for(date)))
    }

    /// Move `date` one match interval forward, skipping the winter break and
    /// jumping to the next season once the current one is over.
    #[must_use]
    pub fn advance_date(&self, date: NaiveDate) -> DateAdvance {
        let next = date + Duration::days(self.config.days_between_matches);
        if self.is_winter_break(next) && self.in_season_window(next) {
            let resumed = self.break_end(next);
            log::debug!("{next} falls in the winter break; resuming on {resumed}");
            return DateAdvance {
                date: resumed,
                skipped_break: true,
                season_ended: false,
            };
        }
        if !self.in_season_window(next) {
            let start = self.next_season_start(next);
            log::info!("season over at {next}; next season starts {start}");
            return DateAdvance {
                date: start,
                skipped_break: false,
                season_ended: true,
            };
        }
        DateAdvance {
            date: next,
            skipped_break: false,
            season_ended: false,
        }
    }

    /// Start a fresh season for `profile` on `start`: round one and a newly
    /// derived personal calendar.
    pub fn roll_over(
        &self,
        profile: &mut PlayerProfile,
        calendars: &CalendarService,
        start: NaiveDate,
    ) {
        profile.current_round = 1;
        profile.virtual_date = format_date(start);
        profile.personal_calendar = calendars
            .personal_calendar(&profile.club)
            .map(|calendar| calendar.to_json());
        log::info!(
            "player {} starts a new season with {} on {start}",
            profile.user_id,
            profile.club
        );
    }

    /// Decide whether `profile` may start a match now.
    ///
    /// A round pointer past the end of the season, or a virtual date left in
    /// the close season, rolls the player into the next season and reports
    /// [`PlayGate::NewSeason`]. A date inside the winter break blocks the
    /// match and moves the player's date to the day play resumes.
    pub fn can_play_match(
        &self,
        profile: &mut PlayerProfile,
        calendars: &CalendarService,
    ) -> PlayGate {
        if !profile.is_in_squad {
            return PlayGate::Blocked(BlockReason::NotInSquad);
        }

        if profile.current_round == 0 {
            log::warn!("player {} has round pointer 0; resetting to 1", profile.user_id);
            profile.current_round = 1;
        }
        let date = self.read_date(&profile.virtual_date);
        let season_length = calendars
            .season_length(&profile.club)
            .unwrap_or(self.config.rounds);

        if profile.current_round > season_length {
            log::warn!(
                "player {} round pointer {} is past the {season_length}-round season",
                profile.user_id,
                profile.current_round
            );
            let completed_rounds = season_length;
            let start = self.next_season_start(date);
            self.roll_over(profile, calendars, start);
            return PlayGate::NewSeason {
                date: start,
                completed_rounds,
            };
        }

        if self.is_winter_break(date) && self.in_season_window(date) {
            let resumes = self.break_end(date);
            profile.virtual_date = format_date(resumes);
            return PlayGate::Blocked(BlockReason::WinterBreak { resumes });
        }

        if !self.in_season_window(date) {
            let start = self.next_season_start(date);
            let completed_rounds = profile.current_round.saturating_sub(1);
            self.roll_over(profile, calendars, start);
            return PlayGate::NewSeason {
                date: start,
                completed_rounds,
            };
        }

        profile.virtual_date = format_date(date);
        PlayGate::Ready { date }
    }
}

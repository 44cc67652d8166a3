//! Localized text for everything the bot sends.
use chrono::NaiveDate;
use matchday_game::{
    BlockReason, Club, LeagueTier, MatchEvent, MatchOutcome, MatchResult, MatchSetup, OfferKind,
    PlayerProfile, Position, StartNotice, TransferOffer, parse_date,
};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::i18n::I18nBundle;
use crate::keyboard::league_name;

const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

fn render(i18n: &I18nBundle, key: &str, args: &[(&str, String)]) -> String {
    let map: BTreeMap<&str, &str> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();
    i18n.tr(key, Some(&map))
}

#[must_use]
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Stored dates in either encoding shown as `DD.MM.YYYY`; unreadable text
/// is shown as is.
#[must_use]
pub fn display_stored_date(stored: &str) -> String {
    parse_date(stored).map_or_else(|| stored.to_string(), display_date)
}

#[must_use]
pub fn position_name(i18n: &I18nBundle, position: Position) -> String {
    i18n.t(&format!("positions.{}", position.key()))
}

fn payload_value(i18n: &I18nBundle, value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let label = format!("labels.{text}");
            Some(if i18n.has(&label) { i18n.t(&label) } else { text.clone() })
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Text for one match event, filled from the session setup and the event
/// payload.
#[must_use]
pub fn match_event(i18n: &I18nBundle, setup: &MatchSetup, event: &MatchEvent) -> String {
    let mut args: Vec<(&str, String)> = vec![
        ("club", setup.club.clone()),
        ("rival", setup.opponent.clone()),
        ("league", league_name(i18n, setup.tier)),
        ("round", setup.round.to_string()),
        ("date", display_stored_date(&setup.date)),
        ("minute", event.minute.to_string()),
    ];
    if let Value::Object(payload) = &event.payload {
        for (key, value) in payload {
            if matches!(key.as_str(), "club" | "round" | "date" | "tier") {
                continue;
            }
            if let Some(text) = payload_value(i18n, value) {
                args.retain(|(existing, _)| *existing != key.as_str());
                args.push((key.as_str(), text));
            }
        }
    }
    render(i18n, &event.ui_key, &args)
}

#[must_use]
pub fn welcome_back(i18n: &I18nBundle, profile: &PlayerProfile, tier: LeagueTier) -> String {
    let squad = if profile.is_in_squad {
        i18n.t("squad.in")
    } else {
        i18n.t("squad.out")
    };
    render(
        i18n,
        "welcome.back",
        &[
            ("name", profile.name.clone()),
            ("club", profile.club.clone()),
            ("league", league_name(i18n, tier)),
            ("position", position_name(i18n, profile.position)),
            ("squad", squad),
        ],
    )
}

#[must_use]
pub fn registered(i18n: &I18nBundle, profile: &PlayerProfile) -> String {
    render(
        i18n,
        "welcome.registered",
        &[
            ("name", profile.name.clone()),
            ("club", profile.club.clone()),
            ("position", position_name(i18n, profile.position)),
            ("date", display_stored_date(&profile.virtual_date)),
        ],
    )
}

#[must_use]
pub fn registration_offers(
    i18n: &I18nBundle,
    name: &str,
    position: Position,
    clubs: &[&Club],
) -> String {
    let offers = clubs
        .iter()
        .map(|club| format!("🏆 {}", club.name))
        .collect::<Vec<_>>()
        .join("\n");
    render(
        i18n,
        "registration.offers",
        &[
            ("name", name.to_string()),
            ("position", position_name(i18n, position)),
            ("league", league_name(i18n, LeagueTier::Silver)),
            ("offers", offers),
        ],
    )
}

#[must_use]
pub fn stats_view(i18n: &I18nBundle, profile: &PlayerProfile, tier: LeagueTier) -> String {
    let stats = &profile.stats;
    let counters = [
        ("goals", stats.goals.to_string()),
        ("assists", stats.assists.to_string()),
        ("saves", stats.saves.to_string()),
        ("tackles", stats.tackles.to_string()),
    ];
    let details = render(
        i18n,
        &format!("stats.{}", profile.position.key()),
        &counters,
    );
    render(
        i18n,
        "stats.view",
        &[
            ("name", profile.name.clone()),
            ("position", position_name(i18n, profile.position)),
            ("club", profile.club.clone()),
            ("league", league_name(i18n, tier)),
            ("matches", stats.matches.to_string()),
            ("wins", stats.wins.to_string()),
            ("draws", stats.draws.to_string()),
            ("losses", stats.losses.to_string()),
            ("details", details),
        ],
    )
}

/// Full-time report with the match figures and the updated career totals.
#[must_use]
pub fn match_summary(
    i18n: &I18nBundle,
    setup: &MatchSetup,
    outcome: &MatchOutcome,
    career: &PlayerProfile,
) -> String {
    let emoji = match outcome.result {
        MatchResult::Win => "🏆",
        MatchResult::Draw => "🤝",
        MatchResult::Loss => "😔",
    };
    let totals = &career.stats;
    render(
        i18n,
        "match.summary",
        &[
            ("emoji", emoji.to_string()),
            ("result", i18n.t(&format!("result.{}", outcome.result.key()))),
            ("round", setup.round.to_string()),
            ("league", league_name(i18n, setup.tier)),
            ("team", outcome.score.team.to_string()),
            ("opponent", outcome.score.opponent.to_string()),
            ("goals", outcome.stats.goals.to_string()),
            ("assists", outcome.stats.assists.to_string()),
            ("saves", outcome.stats.saves.to_string()),
            ("tackles", outcome.stats.tackles.to_string()),
            ("matches", totals.matches.to_string()),
            ("wins", totals.wins.to_string()),
            ("draws", totals.draws.to_string()),
            ("losses", totals.losses.to_string()),
            ("next", display_stored_date(&career.virtual_date)),
        ],
    )
}

#[must_use]
pub fn block_reason(i18n: &I18nBundle, reason: &BlockReason) -> String {
    match reason {
        BlockReason::WinterBreak { resumes } => {
            render(i18n, "block.winter", &[("date", display_date(*resumes))])
        }
        BlockReason::NotInSquad => i18n.t("block.squad"),
    }
}

#[must_use]
pub fn new_season(i18n: &I18nBundle, start: NaiveDate, completed_rounds: u32) -> String {
    render(
        i18n,
        "season.new",
        &[
            ("count", completed_rounds.to_string()),
            ("date", display_date(start)),
        ],
    )
}

#[must_use]
pub fn start_notice(i18n: &I18nBundle, notice: &StartNotice) -> String {
    match notice {
        StartNotice::NewSeason {
            start,
            completed_rounds,
        } => new_season(i18n, *start, *completed_rounds),
        StartNotice::CalendarRepaired => i18n.t("season.calendar-repaired"),
    }
}

#[must_use]
pub fn transfer_offer(i18n: &I18nBundle, offer: &TransferOffer) -> String {
    let key = match offer.kind {
        OfferKind::Promotion => "transfer.promotion",
        OfferKind::Lateral => "transfer.lateral",
    };
    render(i18n, key, &[("league", league_name(i18n, offer.tier))])
}

#[must_use]
pub fn confirm_profile(i18n: &I18nBundle, key: &str, profile: &PlayerProfile) -> String {
    render(
        i18n,
        key,
        &[
            ("name", profile.name.clone()),
            ("position", position_name(i18n, profile.position)),
            ("club", profile.club.clone()),
        ],
    )
}

#[must_use]
pub fn with_args(i18n: &I18nBundle, key: &str, args: &[(&str, String)]) -> String {
    render(i18n, key, args)
}

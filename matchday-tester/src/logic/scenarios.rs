//! Scenario catalog. Each scenario drives the engine for one seed and
//! returns a one-line summary, or an error describing the first broken
//! expectation.
use anyhow::{Context, Result, bail, ensure};
use chrono::{Duration, NaiveDate};
use matchday_game::{
    Action, ActionInput, BlockReason, CareerEngine, Fixture, LeagueTier, MatchOutcome,
    MatchSession, MatchSetup, MatchStart, PlayGate, PlayerProfile, Position, StartNotice,
    Transition, UpdateOutcome, format_date, full_schedule_rounds, generate_double_round_robin,
    parse_date,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::policy::{MatchPolicy, Prefer, Strategy};

/// Upper bound on button presses in one automated match.
const MAX_PRESSES: u32 = 500;
/// Matches played for the tackle-rate measurement.
const TACKLE_MATCHES: u32 = 80;
const MIN_TACKLE_ATTEMPTS: u32 = 100;
const TACKLE_WON_KEY: &str = "match.defender.tackle";

/// Everything a scenario needs besides its seed.
pub struct ScenarioCtx {
    pub engine: Arc<CareerEngine>,
    pub strategy: Strategy,
    pub verbose: bool,
}

type ScenarioFn = fn(&ScenarioCtx, u64) -> Result<String>;

pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    run: ScenarioFn,
}

impl Scenario {
    /// Run once for `seed`.
    ///
    /// # Errors
    ///
    /// Returns the first expectation the engine failed.
    pub fn run(&self, ctx: &ScenarioCtx, seed: u64) -> Result<String> {
        (self.run)(ctx, seed)
    }
}

static CATALOG: [Scenario; 6] = [
    Scenario {
        key: "calendar-integrity",
        name: "Calendar Integrity",
        description: "Every league schedule is a valid double round-robin",
        run: calendar_integrity,
    },
    Scenario {
        key: "full-season",
        name: "Full Season",
        description: "Play a whole season through the engine and check the career",
        run: full_season,
    },
    Scenario {
        key: "tackle-rate",
        name: "Tackle Rate",
        description: "Observed tackle success converges on the configured chance",
        run: tackle_rate,
    },
    Scenario {
        key: "winter-break",
        name: "Winter Break",
        description: "Dates in the break block play and resume on the right day",
        run: winter_break,
    },
    Scenario {
        key: "season-rollover",
        name: "Season Rollover",
        description: "Exhausted seasons and close-season dates start a new season",
        run: season_rollover,
    },
    Scenario {
        key: "idempotent-finish",
        name: "Idempotent Finish",
        description: "A match result is folded into the career exactly once",
        run: idempotent_finish,
    },
];

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<&'static Scenario> {
    CATALOG.iter().find(|scenario| scenario.key == key)
}

#[must_use]
pub fn all_keys() -> Vec<&'static str> {
    CATALOG.iter().map(|scenario| scenario.key).collect()
}

fn registration_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 20).unwrap_or_default()
}

fn position_for(seed: u64) -> Position {
    let index = usize::try_from(seed % 3).unwrap_or_default();
    Position::ALL[index]
}

fn new_player(
    engine: &CareerEngine,
    rng: &mut ChaCha20Rng,
    position: Position,
) -> Result<PlayerProfile> {
    let offers = engine.registration_offers(rng);
    let club = offers
        .first()
        .context("no entry-level clubs to join")?
        .name
        .clone();
    Ok(engine.register(1, "Tester", position, &club, registration_day())?)
}

fn kick_off(
    engine: &CareerEngine,
    profile: &mut PlayerProfile,
    rng: &mut ChaCha20Rng,
) -> Result<(MatchSession, Transition, Vec<StartNotice>)> {
    match engine.start_match(profile, rng)? {
        MatchStart::Ready {
            session,
            kickoff,
            notices,
        } => Ok((*session, kickoff, notices)),
        MatchStart::Blocked(reason) => bail!("match blocked: {reason:?}"),
    }
}

/// Answer prompts with `policy` until the match is over. `observe` sees
/// every pressed action with the transition it produced.
fn play_out(
    session: &mut MatchSession,
    kickoff: Transition,
    policy: &mut dyn MatchPolicy,
    rng: &mut ChaCha20Rng,
    mut observe: impl FnMut(Action, &Transition),
) -> Result<MatchOutcome> {
    let position = session.setup().position;
    let mut transition = kickoff;
    let mut presses = 0;
    while let Some(prompt) = transition.prompt.take() {
        presses += 1;
        ensure!(
            presses <= MAX_PRESSES,
            "match never finished after {MAX_PRESSES} presses ({} policy)",
            policy.name()
        );
        let action = policy.pick(position, &prompt);
        transition = session.handle(
            ActionInput {
                prompt_id: prompt.id,
                action,
            },
            rng,
        )?;
        observe(action, &transition);
    }
    session
        .outcome()
        .context("match stopped prompting but never finished")
}

/// Check one schedule: round range, one match per club per round, no club
/// meeting itself and, for a full schedule, every ordered pairing once.
fn check_schedule(clubs: &[String], fixtures: &[Fixture], rounds: u32) -> Result<()> {
    let mut per_round: HashMap<u32, HashSet<&str>> = HashMap::new();
    let mut pairings: HashMap<(&str, &str), u32> = HashMap::new();
    for fixture in fixtures {
        ensure!(
            (1..=rounds).contains(&fixture.round),
            "fixture {} vs {} in round {} outside 1..={rounds}",
            fixture.home,
            fixture.away,
            fixture.round
        );
        ensure!(
            fixture.home != fixture.away,
            "{} is scheduled against itself",
            fixture.home
        );
        let seen = per_round.entry(fixture.round).or_default();
        for club in [fixture.home.as_str(), fixture.away.as_str()] {
            ensure!(
                seen.insert(club),
                "{club} plays twice in round {}",
                fixture.round
            );
        }
        *pairings
            .entry((fixture.home.as_str(), fixture.away.as_str()))
            .or_default() += 1;
    }

    let per_round_expected = clubs.len() / 2;
    for round in 1..=rounds {
        let count = per_round.get(&round).map_or(0, HashSet::len) / 2;
        ensure!(
            count == per_round_expected,
            "round {round} has {count} fixtures, expected {per_round_expected}"
        );
    }

    if rounds == full_schedule_rounds(clubs.len()) {
        for home in clubs {
            for away in clubs.iter().filter(|away| *away != home) {
                let meetings = pairings
                    .get(&(home.as_str(), away.as_str()))
                    .copied()
                    .unwrap_or(0);
                ensure!(
                    meetings == 1,
                    "{home} hosts {away} {meetings} times in a full schedule"
                );
            }
        }
    }
    Ok(())
}

fn calendar_integrity(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let engine = &ctx.engine;
    for tier in LeagueTier::ALL {
        let league = engine
            .calendars()
            .league(tier)
            .with_context(|| format!("no {tier:?} league calendar"))?;
        check_schedule(&league.clubs, &league.fixtures, league.rounds)
            .with_context(|| format!("{tier:?} league"))?;
        for club in &league.clubs {
            let personal = league.personal(club);
            ensure!(
                personal.is_well_formed(league.rounds),
                "personal calendar of {club} is malformed"
            );
            for entry in personal.entries() {
                let fixture = league
                    .next_fixture(club, entry.round)
                    .with_context(|| format!("{club} has no fixture in round {}", entry.round))?;
                ensure!(
                    fixture.round == entry.round
                        && fixture.opponent_of(club) == Some((entry.opponent.as_str(), entry.is_home)),
                    "{club} round {} disagrees with the league schedule",
                    entry.round
                );
            }
        }
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let size = rng.gen_range(2..=16_usize);
    let mut clubs: Vec<String> = (1..=size).map(|n| format!("Club {n}")).collect();
    clubs.shuffle(&mut rng);
    let fixtures = generate_double_round_robin(&clubs, None)?;
    check_schedule(&clubs, &fixtures, full_schedule_rounds(size))
        .with_context(|| format!("generated {size}-club schedule"))?;

    Ok(format!(
        "{} leagues and a {size}-club schedule verified",
        LeagueTier::ALL.len()
    ))
}

fn full_season(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let engine = &ctx.engine;
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let position = position_for(seed);
    let mut profile = new_player(engine, &mut rng, position)?;
    let mut policy = ctx.strategy.create_policy(seed);
    let season_length = engine
        .calendars()
        .season_length(&profile.club)
        .context("player's club has no league")?;

    let mut keys = HashSet::new();
    let mut played = 0;
    let mut offers = 0;
    loop {
        ensure!(
            played <= season_length,
            "played {played} matches in a {season_length}-round season"
        );
        let round = profile.current_round;
        let calendar = engine.fixtures(&profile);
        let (mut session, kickoff, notices) = match engine.start_match(&mut profile, &mut rng)? {
            MatchStart::Ready {
                session,
                kickoff,
                notices,
            } => (*session, kickoff, notices),
            MatchStart::Blocked(BlockReason::WinterBreak { resumes }) => {
                bail!("round {round} landed in the winter break (resumes {resumes})")
            }
            MatchStart::Blocked(reason) => bail!("round {round} blocked: {reason:?}"),
        };

        if let Some(StartNotice::NewSeason {
            completed_rounds, ..
        }) = notices
            .iter()
            .find(|notice| matches!(notice, StartNotice::NewSeason { .. }))
        {
            ensure!(
                *completed_rounds == season_length && played == season_length,
                "season closed after {played} matches ({completed_rounds} reported)"
            );
            ensure!(
                session.setup().round == 1,
                "new season kicked off in round {}",
                session.setup().round
            );
            break;
        }

        let setup = session.setup().clone();
        let entry = calendar
            .entry(round)
            .with_context(|| format!("no calendar entry for round {round}"))?;
        ensure!(
            entry.opponent == setup.opponent && entry.is_home == setup.is_home,
            "round {round}: scheduled {} but played {}",
            entry.opponent,
            setup.opponent
        );
        ensure!(
            keys.insert(setup.match_key.clone()),
            "match key {} used twice",
            setup.match_key
        );
        let date = parse_date(&setup.date)
            .with_context(|| format!("unreadable match date {}", setup.date))?;
        ensure!(
            engine.clock().is_season_active(date),
            "round {round} played on inactive date {date}"
        );

        let outcome = play_out(&mut session, kickoff, policy.as_mut(), &mut rng, |_, _| {})?;
        let settlement = engine.settle_match(&profile, &outcome, &mut rng);
        ensure!(
            profile.apply(&settlement.update) == UpdateOutcome::Applied,
            "round {round} result was not applied"
        );
        played += 1;
        if ctx.verbose {
            println!(
                "     round {round} {} vs {}: {}-{}",
                setup.club, setup.opponent, outcome.score.team, outcome.score.opponent
            );
        }
        if settlement.offer.is_some() {
            offers += 1;
            let decline = engine.decline_transfer(&profile);
            profile.apply(&decline);
        }
        if settlement.new_season {
            ensure!(
                profile.current_round == 1,
                "season ended by date but the round pointer is {}",
                profile.current_round
            );
            break;
        }
    }

    let stats = &profile.stats;
    ensure!(
        stats.matches == played && stats.wins + stats.draws + stats.losses == played,
        "career shows {} matches ({}W {}D {}L) after {played} played",
        stats.matches,
        stats.wins,
        stats.draws,
        stats.losses
    );
    Ok(format!(
        "{played} rounds as {} ({}W {}D {}L), {offers} transfer offers",
        position.key(),
        stats.wins,
        stats.draws,
        stats.losses
    ))
}

fn tackle_rate(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let config = *ctx.engine.match_config();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut policy = Prefer(Action::Tackle);
    let mut attempts = 0_u32;
    let mut won = 0_u32;

    for round in 1..=TACKLE_MATCHES {
        let setup = MatchSetup {
            user_id: 1,
            position: Position::Defender,
            club: "Home".to_string(),
            opponent: "Away".to_string(),
            is_home: true,
            tier: LeagueTier::Silver,
            round,
            date: "2024-09-01".to_string(),
            match_key: format!("tackle#{round}"),
        };
        let mut session = MatchSession::new(setup, config);
        let kickoff = session.kick_off(&mut rng)?;
        play_out(
            &mut session,
            kickoff,
            &mut policy,
            &mut rng,
            |action, transition| {
                if action != Action::Tackle {
                    return;
                }
                attempts += 1;
                if transition
                    .events
                    .iter()
                    .any(|event| event.ui_key == TACKLE_WON_KEY)
                {
                    won += 1;
                }
            },
        )?;
    }

    ensure!(
        attempts >= MIN_TACKLE_ATTEMPTS,
        "only {attempts} tackles attempted in {TACKLE_MATCHES} matches"
    );
    let expected = f64::from(config.tackle_success);
    let observed = f64::from(won) / f64::from(attempts);
    let tolerance = 4.0 * (expected * (1.0 - expected) / f64::from(attempts)).sqrt() + 0.01;
    ensure!(
        (observed - expected).abs() <= tolerance,
        "tackle rate {observed:.3} over {attempts} attempts is outside {expected:.2} ± {tolerance:.3}"
    );
    Ok(format!(
        "{won}/{attempts} tackles won ({observed:.3} vs {expected:.2})"
    ))
}

fn winter_break(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let engine = &ctx.engine;
    let clock = engine.clock();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let year = rng.gen_range(2024..=2030);
    let break_start = NaiveDate::from_ymd_opt(year, clock.config().break_start_month, 1)
        .context("configured break month is not a month")?;
    let resumes = clock.break_end(break_start);
    let span = (resumes - break_start).num_days();
    ensure!(span > 0, "winter break from {break_start} ends on {resumes}");
    let date = break_start + Duration::days(rng.gen_range(0..span));

    ensure!(
        clock.is_winter_break(date) && !clock.is_season_active(date),
        "{date} is not treated as the winter break"
    );
    ensure!(
        clock.is_season_active(resumes),
        "play resumes on {resumes}, which is not an active day"
    );

    let mut profile = new_player(engine, &mut rng, position_for(seed))?;
    let season_length = engine
        .calendars()
        .season_length(&profile.club)
        .context("player's club has no league")?;
    profile.current_round = season_length / 2 + 1;
    profile.virtual_date = format_date(date);

    let mut gated = profile.clone();
    let gate = clock.can_play_match(&mut gated, engine.calendars());
    ensure!(
        gate == PlayGate::Blocked(BlockReason::WinterBreak { resumes }),
        "{date} gave {gate:?}"
    );
    ensure!(
        gated.virtual_date == format_date(resumes),
        "blocked player left on {} instead of {resumes}",
        gated.virtual_date
    );

    match engine.start_match(&mut profile, &mut rng)? {
        MatchStart::Blocked(BlockReason::WinterBreak { resumes: reported }) => ensure!(
            reported == resumes,
            "engine reported resumption on {reported}, expected {resumes}"
        ),
        other => bail!("match on {date} was not blocked: {other:?}"),
    }
    let (session, _, _) = kick_off(engine, &mut profile, &mut rng)?;
    ensure!(
        session.setup().date == format_date(resumes),
        "first match after the break is dated {}",
        session.setup().date
    );

    let before = break_start - Duration::days(rng.gen_range(1..=6));
    let advance = clock.advance_date(before);
    ensure!(
        advance.skipped_break && advance.date == resumes,
        "advancing from {before} gave {advance:?}"
    );

    Ok(format!("{date} blocked until {resumes}; {before} skips ahead"))
}

fn season_rollover(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let engine = &ctx.engine;
    let clock = engine.clock();
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let mut exhausted = new_player(engine, &mut rng, position_for(seed))?;
    let season_length = engine
        .calendars()
        .season_length(&exhausted.club)
        .context("player's club has no league")?;
    exhausted.current_round = season_length + 1;
    let last_date = clock.read_date(&exhausted.virtual_date);
    let expected_start = clock.next_season_start(last_date);
    let (session, _, notices) = kick_off(engine, &mut exhausted, &mut rng)?;
    ensure!(
        notices.contains(&StartNotice::NewSeason {
            start: expected_start,
            completed_rounds: season_length,
        }),
        "exhausted season gave notices {notices:?}"
    );
    ensure!(
        session.setup().round == 1 && exhausted.current_round == 1,
        "new season did not restart at round 1"
    );
    ensure!(
        exhausted.virtual_date == format_date(expected_start),
        "new season dated {} instead of {expected_start}",
        exhausted.virtual_date
    );

    let start_month = clock.config().start_month;
    let close_month = if start_month == 1 { 12 } else { start_month - 1 };
    let year = rng.gen_range(2024..=2030);
    let summer = NaiveDate::from_ymd_opt(year, close_month, 15)
        .context("configured start month is not a month")?;
    ensure!(
        !clock.is_season_active(summer) && !clock.is_winter_break(summer),
        "{summer} is not a close-season date"
    );
    let mut idle = new_player(engine, &mut rng, position_for(seed.wrapping_add(1)))?;
    let stopped_at = rng.gen_range(2..=season_length);
    idle.current_round = stopped_at;
    idle.virtual_date = format_date(summer);
    let next_start = clock.next_season_start(summer);
    let (session, _, notices) = kick_off(engine, &mut idle, &mut rng)?;
    ensure!(
        notices.contains(&StartNotice::NewSeason {
            start: next_start,
            completed_rounds: stopped_at - 1,
        }),
        "close-season date gave notices {notices:?}"
    );
    ensure!(
        session.setup().date == format_date(next_start),
        "close-season player kicked off on {}",
        session.setup().date
    );

    Ok(format!(
        "round {} rolled to {expected_start}; {summer} rolled to {next_start}",
        season_length + 1
    ))
}

fn idempotent_finish(ctx: &ScenarioCtx, seed: u64) -> Result<String> {
    let engine = &ctx.engine;
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut profile = new_player(engine, &mut rng, position_for(seed))?;
    let mut policy = ctx.strategy.create_policy(seed);
    let (mut session, kickoff, _) = kick_off(engine, &mut profile, &mut rng)?;
    let outcome = play_out(&mut session, kickoff, policy.as_mut(), &mut rng, |_, _| {})?;
    let settlement = engine.settle_match(&profile, &outcome, &mut rng);

    ensure!(
        profile.apply(&settlement.update) == UpdateOutcome::Applied,
        "first delivery was not applied"
    );
    let settled = profile.clone();
    ensure!(
        profile.apply(&settlement.update) == UpdateOutcome::Duplicate && profile == settled,
        "second delivery changed the career"
    );

    let stored = serde_json::to_string(&profile)?;
    let mut restored: PlayerProfile = serde_json::from_str(&stored)?;
    ensure!(
        restored.has_applied(&outcome.match_key),
        "applied match {} lost in storage",
        outcome.match_key
    );
    let replay = engine.settle_match(&restored, &outcome, &mut rng);
    ensure!(
        restored.apply(&replay.update) == UpdateOutcome::Duplicate && restored == settled,
        "settling the same match again changed the career"
    );

    Ok(format!(
        "{} counted once ({} total matches)",
        outcome.match_key, restored.stats.matches
    ))
}

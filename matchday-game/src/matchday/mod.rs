//! Match sessions: an explicit state machine over decision prompts.
//!
//! A session moves `NotStarted -> ActionPending -> Resolving -> ...` until it
//! is `Finished`. Each prompt carries an id; an answer is accepted only for the
//! prompt that is currently live, so presses on superseded messages are
//! rejected before anything changes.
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::club::LeagueTier;
use crate::constants::{
    KEY_ACTION_CAP, KEY_CLOCK, KEY_CLOCK_LATE, KEY_CONTINUE, KEY_DEFENDER_DISTRIBUTE,
    KEY_DEFENDER_SET, KEY_FORWARD_AFTER_DRIBBLE, KEY_FORWARD_SET, KEY_FULL_TIME,
    KEY_KEEPER_DISTRIBUTE, KEY_KEEPER_SET, KEY_KICKOFF_ATTACKING, KEY_KICKOFF_DEFENDING,
};
use crate::profile::{MatchResult, MatchStats, Position};

pub mod config;
pub mod event;
pub(crate) mod resolver;

pub use config::{AttackWeights, MatchConfig, MatchConfigError, OpponentAttackChances, TeamAttackChances};
pub use event::{EventId, EventKind, MatchEvent, Side};

use event::EventDraft;
use resolver::{Next, Resolution, Resolver};

/// A choice offered to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Rush,
    JumpLeft,
    JumpRight,
    Kick,
    Throw,
    Tackle,
    Block,
    PassLeft,
    PassRight,
    Clear,
    Shoot,
    Pass,
    Dribble,
    Continue,
}

impl Action {
    /// Directions a shot can take; the keeper's reaction must match one.
    pub const SHOT_DIRECTIONS: [Self; 3] = [Self::Rush, Self::JumpLeft, Self::JumpRight];

    pub const ALL: [Self; 14] = [
        Self::Rush,
        Self::JumpLeft,
        Self::JumpRight,
        Self::Kick,
        Self::Throw,
        Self::Tackle,
        Self::Block,
        Self::PassLeft,
        Self::PassRight,
        Self::Clear,
        Self::Shoot,
        Self::Pass,
        Self::Dribble,
        Self::Continue,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Rush => "rush",
            Self::JumpLeft => "jump_left",
            Self::JumpRight => "jump_right",
            Self::Kick => "kick",
            Self::Throw => "throw",
            Self::Tackle => "tackle",
            Self::Block => "block",
            Self::PassLeft => "pass_left",
            Self::PassRight => "pass_right",
            Self::Clear => "clear",
            Self::Shoot => "shoot",
            Self::Pass => "pass",
            Self::Dribble => "dribble",
            Self::Continue => "continue",
        }
    }

    /// Choices offered to `position` at `phase`.
    #[must_use]
    pub const fn available(position: Position, phase: Phase) -> &'static [Self] {
        match (position, phase) {
            (Position::Goalkeeper, Phase::First) => &[Self::Rush, Self::JumpLeft, Self::JumpRight],
            (Position::Goalkeeper, Phase::Second) => &[Self::Kick, Self::Throw],
            (Position::Defender, Phase::First) => &[Self::Tackle, Self::Block],
            (Position::Defender, Phase::Second) => &[Self::PassLeft, Self::PassRight, Self::Clear],
            (Position::Forward, Phase::First) => &[Self::Shoot, Self::Pass, Self::Dribble],
            (Position::Forward, Phase::Second) => &[Self::Shoot, Self::Pass],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.key() == s)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

/// First or second decision within one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    First,
    Second,
}

/// Live decision point presented to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: u32,
    pub phase: Phase,
    pub actions: SmallVec<[Action; 3]>,
}

impl Prompt {
    #[must_use]
    pub fn offers(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    FullTime,
    ActionCap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchState {
    NotStarted,
    ActionPending { prompt: Prompt },
    Resolving { prompt: Prompt, action: Action },
    Continuing { prompt: Prompt },
    Finished { reason: FinishReason },
}

impl MatchState {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// Prompt awaiting an answer, if any.
    #[must_use]
    pub const fn live_prompt(&self) -> Option<&Prompt> {
        match self {
            Self::ActionPending { prompt } | Self::Continuing { prompt } => Some(prompt),
            _ => None,
        }
    }
}

/// Goals scored by each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub team: u8,
    pub opponent: u8,
}

/// A button press tied to the prompt it was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionInput {
    pub prompt_id: u32,
    pub action: Action,
}

/// Fixed facts about the match being played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub user_id: u64,
    pub position: Position,
    pub club: String,
    pub opponent: String,
    pub is_home: bool,
    pub tier: LeagueTier,
    pub round: u32,
    /// Canonical virtual date of the match.
    pub date: String,
    /// Identifies this round when folding the result into the profile.
    pub match_key: String,
}

/// Final figures of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub match_key: String,
    pub score: Score,
    pub result: MatchResult,
    pub stats: MatchStats,
    pub reason: FinishReason,
    pub minute: u32,
    pub actions_taken: u32,
}

/// Why an input was refused. Nothing in the session changes on refusal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no match is in progress")]
    NoActiveMatch,
    #[error("the match has not kicked off yet")]
    NotStarted,
    #[error("the match has already kicked off")]
    AlreadyStarted,
    #[error("button belongs to an older message (live prompt {expected}, pressed {got})")]
    StaleMessage { expected: u32, got: u32 },
    #[error("the previous action is still being resolved")]
    Busy,
    #[error("the match is already over")]
    Finished,
    #[error("{action} is not one of the current options")]
    InvalidAction { action: Action },
    #[error("no action is waiting to be resolved")]
    NothingToResolve,
}

/// Events and the next prompt produced by one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub events: Vec<MatchEvent>,
    pub prompt: Option<Prompt>,
    pub finished: bool,
}

/// One user's live match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSession {
    setup: MatchSetup,
    config: MatchConfig,
    state: MatchState,
    minute: u32,
    score: Score,
    stats: MatchStats,
    actions_taken: u32,
    moment: u32,
    seq: u16,
    next_prompt_id: u32,
}

impl MatchSession {
    #[must_use]
    pub fn new(setup: MatchSetup, config: MatchConfig) -> Self {
        Self {
            setup,
            config,
            state: MatchState::NotStarted,
            minute: 0,
            score: Score::default(),
            stats: MatchStats::default(),
            actions_taken: 0,
            moment: 0,
            seq: 0,
            next_prompt_id: 1,
        }
    }

    #[must_use]
    pub const fn setup(&self) -> &MatchSetup {
        &self.setup
    }

    #[must_use]
    pub const fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub const fn minute(&self) -> u32 {
        self.minute
    }

    #[must_use]
    pub const fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub const fn stats(&self) -> &MatchStats {
        &self.stats
    }

    #[must_use]
    pub const fn actions_taken(&self) -> u32 {
        self.actions_taken
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Result figures once the session is finished.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        let MatchState::Finished { reason } = self.state else {
            return None;
        };
        Some(MatchOutcome {
            match_key: self.setup.match_key.clone(),
            score: self.score,
            result: MatchResult::from_score(self.score.team, self.score.opponent),
            stats: self.stats,
            reason,
            minute: self.minute,
            actions_taken: self.actions_taken,
        })
    }

    fn emit(&mut self, events: &mut Vec<MatchEvent>, draft: EventDraft) {
        events.push(MatchEvent {
            id: EventId {
                moment: self.moment,
                seq: self.seq,
            },
            minute: self.minute,
            kind: draft.kind,
            side: draft.side,
            ui_key: draft.ui_key.to_string(),
            image_key: draft.image_key.map(str::to_string),
            payload: draft.payload,
        });
        self.seq = self.seq.saturating_add(1);
    }

    fn issue_prompt(&mut self, phase: Phase, actions: &[Action]) -> Prompt {
        let prompt = Prompt {
            id: self.next_prompt_id,
            phase,
            actions: actions.iter().copied().collect(),
        };
        self.next_prompt_id = self.next_prompt_id.wrapping_add(1);
        prompt
    }

    fn start_moment(&mut self) {
        self.moment += 1;
        self.seq = 0;
    }

    /// Begin the match: announce who attacks first and issue the first prompt.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::AlreadyStarted`] unless the session is new.
    pub fn kick_off<R: Rng>(&mut self, rng: &mut R) -> Result<Transition, MatchError> {
        if self.state != MatchState::NotStarted {
            return Err(MatchError::AlreadyStarted);
        }
        let mut transition = Transition::default();
        self.start_moment();
        let key = if self.setup.position.defends_first() {
            KEY_KICKOFF_DEFENDING
        } else {
            KEY_KICKOFF_ATTACKING
        };
        let payload = json!({
            "club": self.setup.club,
            "opponent": self.setup.opponent,
            "home": self.setup.is_home,
            "round": self.setup.round,
            "tier": self.setup.tier.key(),
            "date": self.setup.date,
        });
        self.emit(
            &mut transition.events,
            EventDraft::new(EventKind::Kickoff, Side::Neutral, key).payload(payload),
        );
        log::info!(
            "match kick-off for player {}: {} vs {} (round {})",
            self.setup.user_id,
            self.setup.club,
            self.setup.opponent,
            self.setup.round
        );
        self.open_moment(&mut transition, rng, false);
        Ok(transition)
    }

    /// Check `input` against the live prompt and mark it as being resolved.
    ///
    /// # Errors
    ///
    /// Rejects input for a session that has not started, is already resolving
    /// or has finished, for a superseded prompt and for an action the prompt
    /// does not offer.
    pub fn accept(&mut self, input: ActionInput) -> Result<(), MatchError> {
        let prompt = match &self.state {
            MatchState::NotStarted => return Err(MatchError::NotStarted),
            MatchState::Finished { .. } => return Err(MatchError::Finished),
            MatchState::Resolving { .. } => return Err(MatchError::Busy),
            MatchState::ActionPending { prompt } | MatchState::Continuing { prompt } => prompt,
        };
        if input.prompt_id != prompt.id {
            log::debug!(
                "player {} pressed stale prompt {} (live {})",
                self.setup.user_id,
                input.prompt_id,
                prompt.id
            );
            return Err(MatchError::StaleMessage {
                expected: prompt.id,
                got: input.prompt_id,
            });
        }
        if !prompt.offers(input.action) {
            return Err(MatchError::InvalidAction {
                action: input.action,
            });
        }
        self.state = MatchState::Resolving {
            prompt: prompt.clone(),
            action: input.action,
        };
        Ok(())
    }

    /// Resolve the accepted action and move to the next state.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::NothingToResolve`] unless [`accept`](Self::accept)
    /// succeeded first.
    pub fn resolve<R: Rng>(&mut self, rng: &mut R) -> Result<Transition, MatchError> {
        let MatchState::Resolving { prompt, action } = &self.state else {
            return Err(MatchError::NothingToResolve);
        };
        let (prompt, action) = (prompt.clone(), *action);
        let phase = prompt.phase;
        let mut transition = Transition::default();

        if action == Action::Continue {
            self.open_moment(&mut transition, rng, true);
            return Ok(transition);
        }

        let Some(resolution) =
            Resolver::new(&self.config, self.setup.position, rng).resolve_action(phase, action)
        else {
            self.state = MatchState::ActionPending { prompt };
            return Err(MatchError::InvalidAction { action });
        };
        self.actions_taken += 1;
        let next = resolution.next;
        self.apply(&mut transition, resolution);

        if self.actions_taken >= self.config.action_cap {
            self.finish(&mut transition, FinishReason::ActionCap);
            return Ok(transition);
        }
        match next {
            Next::SecondPhase => self.second_phase(&mut transition),
            Next::EndMoment => self.end_moment(&mut transition, rng),
        }
        Ok(transition)
    }

    /// Accept and resolve in one step.
    ///
    /// # Errors
    ///
    /// See [`accept`](Self::accept).
    pub fn handle<R: Rng>(
        &mut self,
        input: ActionInput,
        rng: &mut R,
    ) -> Result<Transition, MatchError> {
        self.accept(input)?;
        self.resolve(rng)
    }

    fn apply(&mut self, transition: &mut Transition, resolution: Resolution) {
        self.score.team = self.score.team.saturating_add(resolution.team_goals);
        self.score.opponent = self.score.opponent.saturating_add(resolution.opponent_goals);
        let stats = resolution.stats;
        self.stats.goals += stats.goals;
        self.stats.assists += stats.assists;
        self.stats.saves += stats.saves;
        self.stats.tackles += stats.tackles;
        self.stats.clearances += stats.clearances;
        self.stats.throws += stats.throws;
        for draft in resolution.drafts {
            let draft = if draft.kind == EventKind::Goal {
                let mut payload = draft.payload.clone();
                if !payload.is_object() {
                    payload = json!({});
                }
                if let Some(map) = payload.as_object_mut() {
                    map.insert("team".into(), self.score.team.into());
                    map.insert("opponent".into(), self.score.opponent.into());
                }
                draft.payload(payload)
            } else {
                draft
            };
            self.emit(&mut transition.events, draft);
        }
    }

    fn second_phase(&mut self, transition: &mut Transition) {
        let key = match self.setup.position {
            Position::Goalkeeper => KEY_KEEPER_DISTRIBUTE,
            Position::Defender => KEY_DEFENDER_DISTRIBUTE,
            Position::Forward => KEY_FORWARD_AFTER_DRIBBLE,
        };
        self.emit(
            &mut transition.events,
            EventDraft::new(EventKind::AttackStart, Side::Team, key),
        );
        let prompt = self.issue_prompt(
            Phase::Second,
            Action::available(self.setup.position, Phase::Second),
        );
        transition.prompt = Some(prompt.clone());
        self.state = MatchState::ActionPending { prompt };
    }

    fn tick_clock<R: Rng>(&mut self, transition: &mut Transition, rng: &mut R) {
        let step = rng.gen_range(self.config.minute_step_min..=self.config.minute_step_max);
        self.minute = self.minute.saturating_add(step);
        let key = if self.minute > self.config.late_minute {
            KEY_CLOCK_LATE
        } else {
            KEY_CLOCK
        };
        let payload = json!({ "minute": self.minute });
        self.emit(
            &mut transition.events,
            EventDraft::new(EventKind::Clock, Side::Neutral, key).payload(payload),
        );
    }

    fn full_time_reached(&self) -> bool {
        self.minute >= self.config.match_length
    }

    fn end_moment<R: Rng>(&mut self, transition: &mut Transition, rng: &mut R) {
        self.tick_clock(transition, rng);
        if self.full_time_reached() {
            self.finish(transition, FinishReason::FullTime);
            return;
        }
        if self.config.confirm_between_moments {
            let prompt = self.issue_prompt(Phase::First, &[Action::Continue]);
            self.emit(
                &mut transition.events,
                EventDraft::new(EventKind::Outcome, Side::Neutral, KEY_CONTINUE),
            );
            transition.prompt = Some(prompt.clone());
            self.state = MatchState::Continuing { prompt };
            return;
        }
        self.open_moment(transition, rng, true);
    }

    /// Start the next moment. Keepers and defenders sometimes watch their own
    /// side attack first; the moment then ends with an opponent attack that
    /// waits for the player.
    fn open_moment<R: Rng>(&mut self, transition: &mut Transition, rng: &mut R, advance: bool) {
        if advance {
            self.start_moment();
        }
        let position = self.setup.position;
        if position.defends_first()
            && advance
            && rng.gen_bool(f64::from(self.config.own_attack_chance.clamp(0.0, 1.0)))
        {
            let mut resolver = Resolver::new(&self.config, position, rng);
            resolver.team_attack(false);
            let resolution = resolver.finish_automated();
            self.apply(transition, resolution);
            self.tick_clock(transition, rng);
            if self.full_time_reached() {
                self.finish(transition, FinishReason::FullTime);
                return;
            }
            self.start_moment();
        }

        let key = match position {
            Position::Goalkeeper => KEY_KEEPER_SET,
            Position::Defender => KEY_DEFENDER_SET,
            Position::Forward => KEY_FORWARD_SET,
        };
        let side = if position.defends_first() {
            Side::Opponent
        } else {
            Side::Team
        };
        self.emit(
            &mut transition.events,
            EventDraft::new(EventKind::AttackStart, side, key)
                .payload(json!({ "minute": self.minute })),
        );
        let prompt = self.issue_prompt(Phase::First, Action::available(position, Phase::First));
        transition.prompt = Some(prompt.clone());
        self.state = MatchState::ActionPending { prompt };
    }

    fn finish(&mut self, transition: &mut Transition, reason: FinishReason) {
        if reason == FinishReason::ActionCap {
            self.emit(
                &mut transition.events,
                EventDraft::new(EventKind::ActionCap, Side::Neutral, KEY_ACTION_CAP)
                    .payload(json!({ "cap": self.config.action_cap })),
            );
        }
        let payload = json!({
            "team": self.score.team,
            "opponent": self.score.opponent,
            "minute": self.minute,
        });
        self.emit(
            &mut transition.events,
            EventDraft::new(EventKind::FullTime, Side::Neutral, KEY_FULL_TIME).payload(payload),
        );
        log::info!(
            "match over for player {}: {}-{} ({:?})",
            self.setup.user_id,
            self.score.team,
            self.score.opponent,
            reason
        );
        transition.prompt = None;
        transition.finished = true;
        self.state = MatchState::Finished { reason };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn setup(position: Position) -> MatchSetup {
        MatchSetup {
            user_id: 42,
            position,
            club: "Sibir".to_string(),
            opponent: "Kaluga".to_string(),
            is_home: true,
            tier: LeagueTier::Silver,
            round: 5,
            date: "2024-10-06".to_string(),
            match_key: "2024-09-01#5".to_string(),
        }
    }

    fn play_out(session: &mut MatchSession, rng: &mut ChaCha20Rng) -> Vec<u32> {
        let mut minutes = vec![session.minute()];
        let mut transition = session.kick_off(rng).unwrap();
        while let Some(prompt) = transition.prompt.clone() {
            let action = prompt.actions[0];
            transition = session
                .handle(
                    ActionInput {
                        prompt_id: prompt.id,
                        action,
                    },
                    rng,
                )
                .unwrap();
            minutes.push(session.minute());
        }
        minutes
    }

    #[test]
    fn every_position_plays_to_the_final_whistle() {
        for (seed, position) in Position::ALL.into_iter().enumerate() {
            let mut rng = ChaCha20Rng::seed_from_u64(seed as u64 + 100);
            let mut session = MatchSession::new(setup(position), MatchConfig::default());
            let minutes = play_out(&mut session, &mut rng);
            assert!(minutes.windows(2).all(|w| w[0] <= w[1]));
            assert!(session.is_finished());
            assert!(session.actions_taken() <= 50);
            let outcome = session.outcome().unwrap();
            assert_eq!(outcome.reason, FinishReason::FullTime);
            assert!(outcome.minute >= 90);
            assert_eq!(
                outcome.result,
                MatchResult::from_score(outcome.score.team, outcome.score.opponent)
            );
        }
    }

    #[test]
    fn action_cap_forces_termination() {
        let config = MatchConfig {
            action_cap: 3,
            ..MatchConfig::default()
        };
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut session = MatchSession::new(setup(Position::Forward), config);
        play_out(&mut session, &mut rng);
        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.reason, FinishReason::ActionCap);
        assert_eq!(outcome.actions_taken, 3);
        assert!(outcome.minute < 90);
    }

    #[test]
    fn stale_and_finished_input_is_rejected_without_change() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut session = MatchSession::new(setup(Position::Defender), MatchConfig::default());
        assert_eq!(
            session.accept(ActionInput {
                prompt_id: 1,
                action: Action::Tackle
            }),
            Err(MatchError::NotStarted)
        );

        let first = session.kick_off(&mut rng).unwrap().prompt.unwrap();
        let second = session
            .handle(
                ActionInput {
                    prompt_id: first.id,
                    action: Action::Block,
                },
                &mut rng,
            )
            .unwrap()
            .prompt
            .unwrap();
        assert_ne!(first.id, second.id);

        let before = session.clone();
        assert_eq!(
            session.handle(
                ActionInput {
                    prompt_id: first.id,
                    action: Action::Tackle
                },
                &mut rng
            ),
            Err(MatchError::StaleMessage {
                expected: second.id,
                got: first.id
            })
        );
        assert_eq!(session, before);

        let wrong = Action::Shoot;
        assert_eq!(
            session.accept(ActionInput {
                prompt_id: second.id,
                action: wrong
            }),
            Err(MatchError::InvalidAction { action: wrong })
        );
        assert_eq!(session, before);
    }

    #[test]
    fn overlapping_input_is_busy_until_resolved() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut session = MatchSession::new(setup(Position::Forward), MatchConfig::default());
        let prompt = session.kick_off(&mut rng).unwrap().prompt.unwrap();
        let input = ActionInput {
            prompt_id: prompt.id,
            action: Action::Shoot,
        };
        session.accept(input).unwrap();
        assert_eq!(session.accept(input), Err(MatchError::Busy));
        session.resolve(&mut rng).unwrap();
        assert_eq!(
            session.resolve(&mut rng),
            Err(MatchError::NothingToResolve)
        );
    }

    #[test]
    fn finished_session_rejects_everything() {
        let config = MatchConfig {
            action_cap: 1,
            ..MatchConfig::default()
        };
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let mut session = MatchSession::new(setup(Position::Forward), config);
        let prompt = session.kick_off(&mut rng).unwrap().prompt.unwrap();
        let input = ActionInput {
            prompt_id: prompt.id,
            action: Action::Shoot,
        };
        let transition = session.handle(input, &mut rng).unwrap();
        assert!(transition.finished);
        assert_eq!(session.handle(input, &mut rng), Err(MatchError::Finished));
        assert_eq!(session.kick_off(&mut rng), Err(MatchError::AlreadyStarted));
    }

    #[test]
    fn confirmation_prompt_between_moments() {
        let config = MatchConfig {
            confirm_between_moments: true,
            shot_on_target: 0.0,
            ..MatchConfig::default()
        };
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut session = MatchSession::new(setup(Position::Forward), config);
        let prompt = session.kick_off(&mut rng).unwrap().prompt.unwrap();
        let transition = session
            .handle(
                ActionInput {
                    prompt_id: prompt.id,
                    action: Action::Shoot,
                },
                &mut rng,
            )
            .unwrap();
        let pause = transition.prompt.unwrap();
        assert_eq!(pause.actions.as_slice(), &[Action::Continue]);
        assert!(matches!(session.state(), MatchState::Continuing { .. }));

        let next = session
            .handle(
                ActionInput {
                    prompt_id: pause.id,
                    action: Action::Continue,
                },
                &mut rng,
            )
            .unwrap()
            .prompt
            .unwrap();
        assert_eq!(next.phase, Phase::First);
        assert_eq!(session.actions_taken(), 1);
    }

    #[test]
    fn actions_parse_from_callback_keys() {
        for action in Action::ALL {
            assert_eq!(action.key().parse::<Action>(), Ok(action));
        }
        assert!("volley".parse::<Action>().is_err());
    }

    #[test]
    fn session_state_serializes() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mut session = MatchSession::new(setup(Position::Goalkeeper), MatchConfig::default());
        session.kick_off(&mut rng).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"state\":\"action_pending\""));
        let restored: MatchSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}

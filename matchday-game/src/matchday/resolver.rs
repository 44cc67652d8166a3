//! Table-driven resolution of player actions and automated attacks.
use rand::Rng;
use serde_json::json;

use super::config::MatchConfig;
use super::event::{EventDraft, EventKind, Side};
use super::{Action, Phase};
use crate::constants::{
    KEY_DEFENDER_BLOCK, KEY_DEFENDER_BLOCK_FAIL, KEY_DEFENDER_CLEAR, KEY_DEFENDER_CLEAR_FAIL,
    KEY_DEFENDER_FLUKE, KEY_DEFENDER_PASS, KEY_DEFENDER_PASS_FAIL, KEY_DEFENDER_TACKLE,
    KEY_DEFENDER_TACKLE_FAIL, KEY_FORWARD_ASSIST, KEY_FORWARD_CHANCE_MISSED, KEY_FORWARD_DRIBBLE,
    KEY_FORWARD_DRIBBLE_FAIL, KEY_FORWARD_PASS, KEY_FORWARD_PASS_FAIL, KEY_FORWARD_SHOT_GOAL,
    KEY_FORWARD_SHOT_SAVED, KEY_FORWARD_SHOT_WIDE, KEY_KEEPER_BEATEN, KEY_KEEPER_CORNER,
    KEY_KEEPER_KICK, KEY_KEEPER_KICK_FAIL, KEY_KEEPER_RESCUE, KEY_KEEPER_SAVE, KEY_KEEPER_THROW,
    KEY_KEEPER_THROW_FAIL, KEY_OPPONENT_ATTACK, KEY_OPPONENT_GOAL, KEY_OPPONENT_SAVED,
    KEY_OPPONENT_STOPPED, KEY_TEAM_ATTACK, KEY_TEAM_GOAL, KEY_TEAM_MISS,
};
use crate::profile::{MatchStats, Position};

/// Probability looked up from the match table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chance {
    Tackle,
    Block,
    Pass,
    Dribble,
    OnTarget,
    Kick,
    Throw,
    Clearance,
}

impl Chance {
    pub(crate) const fn of(self, config: &MatchConfig) -> f32 {
        match self {
            Self::Tackle => config.tackle_success,
            Self::Block => config.block_success,
            Self::Pass => config.pass_completion,
            Self::Dribble => config.dribble_success,
            Self::OnTarget => config.shot_on_target,
            Self::Kick => config.keeper_kick_success,
            Self::Throw => config.keeper_throw_success,
            Self::Clearance => config.clearance_success,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Check {
    /// Keeper must match a uniformly drawn shot direction.
    GuessDirection,
    Roll(Chance),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Credit {
    Nothing,
    Save,
    Tackle,
    Throw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conversion {
    OwnShot,
    AfterDribble,
}

/// What happens after the check is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    SecondPhase(Credit),
    EndMoment(Credit),
    KeeperBeaten,
    OpponentBreak,
    Finish(Conversion),
    TeammateFinish,
    LaunchTeamAttack,
    Clearance,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Branch {
    pub effect: Effect,
    pub ui_key: Option<&'static str>,
    pub image_key: Option<&'static str>,
}

const fn branch(
    effect: Effect,
    ui_key: Option<&'static str>,
    image_key: Option<&'static str>,
) -> Branch {
    Branch {
        effect,
        ui_key,
        image_key,
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ActionRule {
    pub position: Position,
    pub phase: Phase,
    pub action: Action,
    pub check: Check,
    pub success: Branch,
    pub failure: Branch,
}

const KEEPER_SAVE: Branch = branch(
    Effect::SecondPhase(Credit::Save),
    Some(KEY_KEEPER_SAVE),
    Some("goalkeeper/save"),
);
const KEEPER_MISS: Branch = branch(
    Effect::KeeperBeaten,
    Some(KEY_KEEPER_BEATEN),
    Some("goalkeeper/miss"),
);

pub(crate) static ACTION_RULES: [ActionRule; 15] = [
    ActionRule {
        position: Position::Goalkeeper,
        phase: Phase::First,
        action: Action::Rush,
        check: Check::GuessDirection,
        success: KEEPER_SAVE,
        failure: KEEPER_MISS,
    },
    ActionRule {
        position: Position::Goalkeeper,
        phase: Phase::First,
        action: Action::JumpLeft,
        check: Check::GuessDirection,
        success: KEEPER_SAVE,
        failure: KEEPER_MISS,
    },
    ActionRule {
        position: Position::Goalkeeper,
        phase: Phase::First,
        action: Action::JumpRight,
        check: Check::GuessDirection,
        success: KEEPER_SAVE,
        failure: KEEPER_MISS,
    },
    ActionRule {
        position: Position::Goalkeeper,
        phase: Phase::Second,
        action: Action::Kick,
        check: Check::Roll(Chance::Kick),
        success: branch(
            Effect::EndMoment(Credit::Nothing),
            Some(KEY_KEEPER_KICK),
            Some("goalkeeper/kick_success"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_KEEPER_KICK_FAIL),
            Some("goalkeeper/kick_fail"),
        ),
    },
    ActionRule {
        position: Position::Goalkeeper,
        phase: Phase::Second,
        action: Action::Throw,
        check: Check::Roll(Chance::Throw),
        success: branch(
            Effect::EndMoment(Credit::Throw),
            Some(KEY_KEEPER_THROW),
            Some("goalkeeper/throw_success"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_KEEPER_THROW_FAIL),
            Some("goalkeeper/throw_fail"),
        ),
    },
    ActionRule {
        position: Position::Defender,
        phase: Phase::First,
        action: Action::Tackle,
        check: Check::Roll(Chance::Tackle),
        success: branch(
            Effect::SecondPhase(Credit::Tackle),
            Some(KEY_DEFENDER_TACKLE),
            Some("defense/tackle_success"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_DEFENDER_TACKLE_FAIL),
            Some("defense/tackle_fail"),
        ),
    },
    ActionRule {
        position: Position::Defender,
        phase: Phase::First,
        action: Action::Block,
        check: Check::Roll(Chance::Block),
        success: branch(
            Effect::SecondPhase(Credit::Tackle),
            Some(KEY_DEFENDER_BLOCK),
            Some("defense/block_success"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_DEFENDER_BLOCK_FAIL),
            Some("defense/block_fail"),
        ),
    },
    ActionRule {
        position: Position::Defender,
        phase: Phase::Second,
        action: Action::PassLeft,
        check: Check::Roll(Chance::Pass),
        success: branch(
            Effect::LaunchTeamAttack,
            Some(KEY_DEFENDER_PASS),
            Some("pass/left"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_DEFENDER_PASS_FAIL),
            Some("pass/intercept"),
        ),
    },
    ActionRule {
        position: Position::Defender,
        phase: Phase::Second,
        action: Action::PassRight,
        check: Check::Roll(Chance::Pass),
        success: branch(
            Effect::LaunchTeamAttack,
            Some(KEY_DEFENDER_PASS),
            Some("pass/right"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_DEFENDER_PASS_FAIL),
            Some("pass/intercept"),
        ),
    },
    ActionRule {
        position: Position::Defender,
        phase: Phase::Second,
        action: Action::Clear,
        check: Check::Roll(Chance::Clearance),
        success: branch(Effect::Clearance, None, None),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_DEFENDER_CLEAR_FAIL),
            Some("defense/clear_fail"),
        ),
    },
    ActionRule {
        position: Position::Forward,
        phase: Phase::First,
        action: Action::Shoot,
        check: Check::Roll(Chance::OnTarget),
        success: branch(Effect::Finish(Conversion::OwnShot), None, None),
        failure: branch(
            Effect::EndMoment(Credit::Nothing),
            Some(KEY_FORWARD_SHOT_WIDE),
            Some("shot/miss"),
        ),
    },
    ActionRule {
        position: Position::Forward,
        phase: Phase::First,
        action: Action::Pass,
        check: Check::Roll(Chance::Pass),
        success: branch(
            Effect::TeammateFinish,
            Some(KEY_FORWARD_PASS),
            Some("pass/success"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_FORWARD_PASS_FAIL),
            Some("pass/intercept"),
        ),
    },
    ActionRule {
        position: Position::Forward,
        phase: Phase::First,
        action: Action::Dribble,
        check: Check::Roll(Chance::Dribble),
        success: branch(
            Effect::SecondPhase(Credit::Nothing),
            Some(KEY_FORWARD_DRIBBLE),
            Some("dribble/success"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_FORWARD_DRIBBLE_FAIL),
            Some("dribble/fail"),
        ),
    },
    ActionRule {
        position: Position::Forward,
        phase: Phase::Second,
        action: Action::Shoot,
        check: Check::Roll(Chance::OnTarget),
        success: branch(Effect::Finish(Conversion::AfterDribble), None, None),
        failure: branch(
            Effect::EndMoment(Credit::Nothing),
            Some(KEY_FORWARD_SHOT_WIDE),
            Some("shot/miss"),
        ),
    },
    ActionRule {
        position: Position::Forward,
        phase: Phase::Second,
        action: Action::Pass,
        check: Check::Roll(Chance::Pass),
        success: branch(
            Effect::TeammateFinish,
            Some(KEY_FORWARD_PASS),
            Some("pass/success"),
        ),
        failure: branch(
            Effect::OpponentBreak,
            Some(KEY_FORWARD_PASS_FAIL),
            Some("pass/intercept"),
        ),
    },
];

/// Find the rule for an action offered at `phase` to `position`.
pub(crate) fn rule_for(position: Position, phase: Phase, action: Action) -> Option<&'static ActionRule> {
    ACTION_RULES
        .iter()
        .find(|rule| rule.position == position && rule.phase == phase && rule.action == action)
}

/// Where the session goes once a resolution is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Next {
    SecondPhase,
    EndMoment,
}

/// Everything one resolution changed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub drafts: Vec<EventDraft>,
    pub team_goals: u8,
    pub opponent_goals: u8,
    pub stats: MatchStats,
    pub next: Next,
}

impl Resolution {
    const fn new() -> Self {
        Self {
            drafts: Vec::new(),
            team_goals: 0,
            opponent_goals: 0,
            stats: MatchStats {
                goals: 0,
                assists: 0,
                saves: 0,
                tackles: 0,
                clearances: 0,
                throws: 0,
            },
            next: Next::EndMoment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttackPlay {
    Dribble,
    Shot,
    Pass,
}

impl AttackPlay {
    const fn key(self) -> &'static str {
        match self {
            Self::Dribble => "dribble",
            Self::Shot => "shot",
            Self::Pass => "pass",
        }
    }
}

/// Rolls outcomes against the match table for one player position.
pub(crate) struct Resolver<'a, R: Rng> {
    config: &'a MatchConfig,
    position: Position,
    rng: &'a mut R,
    out: Resolution,
}

impl<'a, R: Rng> Resolver<'a, R> {
    pub(crate) fn new(config: &'a MatchConfig, position: Position, rng: &'a mut R) -> Self {
        Self {
            config,
            position,
            rng,
            out: Resolution::new(),
        }
    }

    fn roll(&mut self, chance: f32) -> bool {
        self.rng.gen_bool(f64::from(chance.clamp(0.0, 1.0)))
    }

    fn push(&mut self, draft: EventDraft) {
        self.out.drafts.push(draft);
    }

    fn credit(&mut self, credit: Credit) {
        match credit {
            Credit::Nothing => {}
            Credit::Save => self.out.stats.saves += 1,
            Credit::Tackle => self.out.stats.tackles += 1,
            Credit::Throw => self.out.stats.throws += 1,
        }
    }

    /// Resolve a player's choice. Returns `None` when `action` is not part of
    /// the position's tree at `phase`.
    pub(crate) fn resolve_action(mut self, phase: Phase, action: Action) -> Option<Resolution> {
        let rule = rule_for(self.position, phase, action)?;
        let (succeeded, payload) = match rule.check {
            Check::GuessDirection => {
                let shot = Action::SHOT_DIRECTIONS[self.rng.gen_range(0..Action::SHOT_DIRECTIONS.len())];
                (
                    shot == action,
                    json!({ "dive": action.key(), "shot": shot.key() }),
                )
            }
            Check::Roll(chance) => (self.roll(chance.of(self.config)), serde_json::Value::Null),
        };
        let branch = if succeeded { rule.success } else { rule.failure };
        if let Some(ui_key) = branch.ui_key {
            let side = if succeeded { Side::Team } else { Side::Opponent };
            self.push(
                EventDraft::new(EventKind::Outcome, side, ui_key)
                    .image(branch.image_key)
                    .payload(payload),
            );
        }
        self.apply_effect(branch.effect);
        Some(self.out)
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SecondPhase(credit) => {
                self.credit(credit);
                self.out.next = Next::SecondPhase;
            }
            Effect::EndMoment(credit) => self.credit(credit),
            Effect::KeeperBeaten => self.keeper_beaten(),
            Effect::OpponentBreak => self.opponent_attack(),
            Effect::Finish(conversion) => self.finish(conversion),
            Effect::TeammateFinish => self.teammate_finish(),
            Effect::LaunchTeamAttack => self.team_attack(true),
            Effect::Clearance => self.clearance(),
        }
    }

    fn keeper_beaten(&mut self) {
        let rescue = self.config.defender_rescue;
        let corner = self.config.corner_deflection;
        let roll: f32 = self.rng.r#gen();
        if roll < rescue {
            self.push(
                EventDraft::new(EventKind::Outcome, Side::Team, KEY_KEEPER_RESCUE)
                    .image(Some("defense/rescue")),
            );
        } else if roll < rescue + corner {
            self.push(
                EventDraft::new(EventKind::Outcome, Side::Neutral, KEY_KEEPER_CORNER)
                    .image(Some("goalkeeper/corner")),
            );
        } else {
            self.concede("shot");
        }
    }

    fn concede(&mut self, play: &'static str) {
        self.out.opponent_goals += 1;
        self.push(
            EventDraft::new(EventKind::Goal, Side::Opponent, KEY_OPPONENT_GOAL)
                .image(Some("opponent/goal"))
                .payload(json!({ "play": play })),
        );
    }

    fn finish(&mut self, conversion: Conversion) {
        let chance = match conversion {
            Conversion::OwnShot => self.config.conversion_own_shot,
            Conversion::AfterDribble => self.config.conversion_after_dribble,
        };
        if self.roll(chance) {
            self.out.stats.goals += 1;
            self.out.team_goals += 1;
            self.push(
                EventDraft::new(EventKind::Goal, Side::Team, KEY_FORWARD_SHOT_GOAL)
                    .image(Some("goals/goal")),
            );
        } else {
            self.push(
                EventDraft::new(EventKind::Outcome, Side::Opponent, KEY_FORWARD_SHOT_SAVED)
                    .image(Some("shot/saved")),
            );
        }
    }

    fn teammate_finish(&mut self) {
        if self.roll(self.config.conversion_after_pass) {
            self.out.stats.assists += 1;
            self.out.team_goals += 1;
            self.push(
                EventDraft::new(EventKind::Goal, Side::Team, KEY_FORWARD_ASSIST)
                    .image(Some("goals/goal")),
            );
        } else {
            self.push(EventDraft::new(
                EventKind::Outcome,
                Side::Neutral,
                KEY_FORWARD_CHANCE_MISSED,
            ));
        }
    }

    fn clearance(&mut self) {
        if self.roll(self.config.clearance_accidental_goal) {
            self.out.stats.goals += 1;
            self.out.team_goals += 1;
            self.push(
                EventDraft::new(EventKind::Goal, Side::Team, KEY_DEFENDER_FLUKE)
                    .image(Some("goals/goal")),
            );
        } else {
            self.out.stats.clearances += 1;
            self.push(
                EventDraft::new(EventKind::Outcome, Side::Team, KEY_DEFENDER_CLEAR)
                    .image(Some("defense/clear_success")),
            );
        }
    }

    fn pick_play(&mut self) -> AttackPlay {
        let weights = self.config.attack_weights;
        let total = weights.total();
        if total <= 0.0 {
            return AttackPlay::Shot;
        }
        let roll = self.rng.r#gen::<f32>() * total;
        if roll < weights.dribble {
            AttackPlay::Dribble
        } else if roll < weights.dribble + weights.shot {
            AttackPlay::Shot
        } else {
            AttackPlay::Pass
        }
    }

    /// Own side attacks without input. A goal credits the player an assist
    /// when their pass started the move.
    pub(crate) fn team_attack(&mut self, assisted: bool) {
        let play = self.pick_play();
        self.push(
            EventDraft::new(EventKind::AttackStart, Side::Team, KEY_TEAM_ATTACK)
                .payload(json!({ "play": play.key() })),
        );
        let chances = self.config.team_attack;
        let chance = match play {
            AttackPlay::Dribble => chances.dribble_scores,
            AttackPlay::Shot => chances.shot_scores,
            AttackPlay::Pass => chances.pass_scores,
        };
        if self.roll(chance) {
            self.out.team_goals += 1;
            if assisted {
                self.out.stats.assists += 1;
            }
            self.push(
                EventDraft::new(EventKind::Goal, Side::Team, KEY_TEAM_GOAL)
                    .image(Some("goals/goal"))
                    .payload(json!({ "play": play.key(), "assist": assisted })),
            );
        } else {
            self.push(
                EventDraft::new(EventKind::Outcome, Side::Team, KEY_TEAM_MISS)
                    .payload(json!({ "play": play.key() })),
            );
        }
    }

    /// Opponent exploits a lost ball. Every attempt that does not end in a
    /// goal is either a save or a tackle by the player's side.
    pub(crate) fn opponent_attack(&mut self) {
        let play = self.pick_play();
        self.push(
            EventDraft::new(EventKind::AttackStart, Side::Opponent, KEY_OPPONENT_ATTACK)
                .image(Some("opponent/attack"))
                .payload(json!({ "play": play.key() })),
        );
        let chances = self.config.opponent_attack;
        let scored_or_stopped = match play {
            AttackPlay::Dribble => {
                if !self.roll(chances.dribble_beats) || !self.roll(chances.dribble_shoots) {
                    Err(Credit::Tackle)
                } else if self.roll(chances.dribble_scores) {
                    Ok(())
                } else {
                    Err(Credit::Save)
                }
            }
            AttackPlay::Shot => {
                if self.roll(chances.shot_scores) {
                    Ok(())
                } else {
                    Err(Credit::Save)
                }
            }
            AttackPlay::Pass => {
                if !self.roll(chances.pass_finds) {
                    Err(Credit::Tackle)
                } else if self.roll(chances.pass_scores) {
                    Ok(())
                } else {
                    Err(Credit::Save)
                }
            }
        };
        match scored_or_stopped {
            Ok(()) => self.concede(play.key()),
            Err(Credit::Save) => {
                if self.position == Position::Goalkeeper {
                    self.out.stats.saves += 1;
                }
                self.push(
                    EventDraft::new(EventKind::Outcome, Side::Team, KEY_OPPONENT_SAVED)
                        .image(Some("goalkeeper/save"))
                        .payload(json!({ "play": play.key() })),
                );
            }
            Err(_) => {
                if self.position == Position::Defender {
                    self.out.stats.tackles += 1;
                }
                self.push(
                    EventDraft::new(EventKind::Outcome, Side::Team, KEY_OPPONENT_STOPPED)
                        .image(Some("defense/tackle_success"))
                        .payload(json!({ "play": play.key() })),
                );
            }
        }
    }

    pub(crate) fn finish_automated(self) -> Resolution {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchday::config::OpponentAttackChances;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn every_offered_action_has_a_rule() {
        for position in Position::ALL {
            for phase in [Phase::First, Phase::Second] {
                for action in Action::available(position, phase) {
                    assert!(
                        rule_for(position, phase, *action).is_some(),
                        "{position} {phase:?} {action}"
                    );
                }
            }
        }
        assert!(rule_for(Position::Forward, Phase::First, Action::Tackle).is_none());
        assert!(rule_for(Position::Goalkeeper, Phase::Second, Action::Rush).is_none());
    }

    #[test]
    fn tackle_rate_converges_to_table_value() {
        let config = MatchConfig::default();
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        let trials = 20_000;
        let mut successes = 0;
        for _ in 0..trials {
            let resolution = Resolver::new(&config, Position::Defender, &mut rng)
                .resolve_action(Phase::First, Action::Tackle)
                .unwrap();
            if resolution.next == Next::SecondPhase {
                successes += 1;
            }
        }
        let rate = f64::from(successes) / f64::from(trials);
        assert!((rate - 0.6).abs() < 0.02, "tackle rate {rate}");
    }

    #[test]
    fn keeper_save_opens_distribution_phase() {
        let config = MatchConfig::default();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut saw_save = false;
        let mut saw_miss = false;
        for _ in 0..200 {
            let resolution = Resolver::new(&config, Position::Goalkeeper, &mut rng)
                .resolve_action(Phase::First, Action::JumpLeft)
                .unwrap();
            if resolution.next == Next::SecondPhase {
                saw_save = true;
                assert_eq!(resolution.stats.saves, 1);
                assert_eq!(resolution.opponent_goals, 0);
            } else {
                saw_miss = true;
                assert_eq!(resolution.stats.saves, 0);
                assert!(resolution.opponent_goals <= 1);
            }
        }
        assert!(saw_save && saw_miss);
    }

    #[test]
    fn certain_tables_give_certain_outcomes() {
        let config = MatchConfig {
            shot_on_target: 1.0,
            conversion_own_shot: 1.0,
            pass_completion: 0.0,
            opponent_attack: OpponentAttackChances {
                dribble_beats: 1.0,
                dribble_shoots: 1.0,
                dribble_scores: 1.0,
                shot_scores: 1.0,
                pass_finds: 1.0,
                pass_scores: 1.0,
            },
            ..MatchConfig::default()
        };
        let mut rng = ChaCha20Rng::seed_from_u64(3);

        let goal = Resolver::new(&config, Position::Forward, &mut rng)
            .resolve_action(Phase::First, Action::Shoot)
            .unwrap();
        assert_eq!(goal.team_goals, 1);
        assert_eq!(goal.stats.goals, 1);
        assert!(goal.drafts.iter().any(|d| d.ui_key == KEY_FORWARD_SHOT_GOAL));

        let lost = Resolver::new(&config, Position::Forward, &mut rng)
            .resolve_action(Phase::First, Action::Pass)
            .unwrap();
        assert_eq!(lost.opponent_goals, 1);
        assert_eq!(lost.team_goals, 0);
        assert_eq!(lost.next, Next::EndMoment);
    }

    #[test]
    fn automated_credits_follow_position() {
        let config = MatchConfig {
            opponent_attack: OpponentAttackChances {
                dribble_beats: 0.0,
                dribble_shoots: 0.0,
                dribble_scores: 0.0,
                shot_scores: 0.0,
                pass_finds: 0.0,
                pass_scores: 0.0,
            },
            ..MatchConfig::default()
        };
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        for position in Position::ALL {
            for _ in 0..30 {
                let mut resolver = Resolver::new(&config, position, &mut rng);
                resolver.opponent_attack();
                let out = resolver.finish_automated();
                assert_eq!(out.opponent_goals, 0);
                let credited = out.stats.saves + out.stats.tackles;
                if position == Position::Forward {
                    assert_eq!(credited, 0);
                }
                if position == Position::Goalkeeper {
                    assert_eq!(out.stats.tackles, 0);
                }
                if position == Position::Defender {
                    assert_eq!(out.stats.saves, 0);
                }
            }
        }
    }
}

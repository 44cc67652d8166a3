//! Probability table and pacing for match sessions.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ACTION_CAP, ATTACK_WEIGHT_DRIBBLE, ATTACK_WEIGHT_PASS, ATTACK_WEIGHT_SHOT, BLOCK_SUCCESS,
    CLEARANCE_ACCIDENTAL_GOAL, CLEARANCE_SUCCESS, CONVERSION_AFTER_DRIBBLE, CONVERSION_AFTER_PASS,
    CONVERSION_OWN_SHOT, CORNER_DEFLECTION, DEFENDER_RESCUE, DRIBBLE_SUCCESS, KEEPER_KICK_SUCCESS,
    KEEPER_THROW_SUCCESS, LATE_MATCH_MINUTE, MATCH_LENGTH_MINUTES, MINUTE_STEP_MAX,
    MINUTE_STEP_MIN, OPPONENT_DRIBBLE_BEATS, OPPONENT_DRIBBLE_SCORES, OPPONENT_DRIBBLE_SHOOTS,
    OPPONENT_PASS_FINDS, OPPONENT_PASS_SCORES, OPPONENT_SHOT_SCORES, OWN_ATTACK_CHANCE,
    PASS_COMPLETION, SHOT_ON_TARGET, TACKLE_SUCCESS, TEAM_DRIBBLE_SCORES, TEAM_PASS_SCORES,
    TEAM_SHOT_SCORES,
};

/// Relative weights of the three ways an automated attack develops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackWeights {
    #[serde(default = "AttackWeights::default_dribble")]
    pub dribble: f32,
    #[serde(default = "AttackWeights::default_shot")]
    pub shot: f32,
    #[serde(default = "AttackWeights::default_pass")]
    pub pass: f32,
}

impl AttackWeights {
    const fn default_dribble() -> f32 {
        ATTACK_WEIGHT_DRIBBLE
    }

    const fn default_shot() -> f32 {
        ATTACK_WEIGHT_SHOT
    }

    const fn default_pass() -> f32 {
        ATTACK_WEIGHT_PASS
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.dribble + self.shot + self.pass
    }
}

impl Default for AttackWeights {
    fn default() -> Self {
        Self {
            dribble: Self::default_dribble(),
            shot: Self::default_shot(),
            pass: Self::default_pass(),
        }
    }
}

/// Chances used when the player's own side attacks without input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamAttackChances {
    #[serde(default = "TeamAttackChances::default_dribble")]
    pub dribble_scores: f32,
    #[serde(default = "TeamAttackChances::default_shot")]
    pub shot_scores: f32,
    #[serde(default = "TeamAttackChances::default_pass")]
    pub pass_scores: f32,
}

impl TeamAttackChances {
    const fn default_dribble() -> f32 {
        TEAM_DRIBBLE_SCORES
    }

    const fn default_shot() -> f32 {
        TEAM_SHOT_SCORES
    }

    const fn default_pass() -> f32 {
        TEAM_PASS_SCORES
    }
}

impl Default for TeamAttackChances {
    fn default() -> Self {
        Self {
            dribble_scores: Self::default_dribble(),
            shot_scores: Self::default_shot(),
            pass_scores: Self::default_pass(),
        }
    }
}

/// Chances used when the opponent breaks through after a failed action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentAttackChances {
    #[serde(default = "OpponentAttackChances::default_dribble_beats")]
    pub dribble_beats: f32,
    #[serde(default = "OpponentAttackChances::default_dribble_shoots")]
    pub dribble_shoots: f32,
    #[serde(default = "OpponentAttackChances::default_dribble_scores")]
    pub dribble_scores: f32,
    #[serde(default = "OpponentAttackChances::default_shot_scores")]
    pub shot_scores: f32,
    #[serde(default = "OpponentAttackChances::default_pass_finds")]
    pub pass_finds: f32,
    #[serde(default = "OpponentAttackChances::default_pass_scores")]
    pub pass_scores: f32,
}

impl OpponentAttackChances {
    const fn default_dribble_beats() -> f32 {
        OPPONENT_DRIBBLE_BEATS
    }

    const fn default_dribble_shoots() -> f32 {
        OPPONENT_DRIBBLE_SHOOTS
    }

    const fn default_dribble_scores() -> f32 {
        OPPONENT_DRIBBLE_SCORES
    }

    const fn default_shot_scores() -> f32 {
        OPPONENT_SHOT_SCORES
    }

    const fn default_pass_finds() -> f32 {
        OPPONENT_PASS_FINDS
    }

    const fn default_pass_scores() -> f32 {
        OPPONENT_PASS_SCORES
    }
}

impl Default for OpponentAttackChances {
    fn default() -> Self {
        Self {
            dribble_beats: Self::default_dribble_beats(),
            dribble_shoots: Self::default_dribble_shoots(),
            dribble_scores: Self::default_dribble_scores(),
            shot_scores: Self::default_shot_scores(),
            pass_finds: Self::default_pass_finds(),
            pass_scores: Self::default_pass_scores(),
        }
    }
}

/// Everything that shapes a match session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "MatchConfig::default_tackle")]
    pub tackle_success: f32,
    #[serde(default = "MatchConfig::default_block")]
    pub block_success: f32,
    #[serde(default = "MatchConfig::default_pass")]
    pub pass_completion: f32,
    #[serde(default = "MatchConfig::default_dribble")]
    pub dribble_success: f32,
    #[serde(default = "MatchConfig::default_on_target")]
    pub shot_on_target: f32,
    #[serde(default = "MatchConfig::default_conversion_own_shot")]
    pub conversion_own_shot: f32,
    #[serde(default = "MatchConfig::default_conversion_after_dribble")]
    pub conversion_after_dribble: f32,
    #[serde(default = "MatchConfig::default_conversion_after_pass")]
    pub conversion_after_pass: f32,
    #[serde(default = "MatchConfig::default_kick")]
    pub keeper_kick_success: f32,
    #[serde(default = "MatchConfig::default_throw")]
    pub keeper_throw_success: f32,
    #[serde(default = "MatchConfig::default_clearance")]
    pub clearance_success: f32,
    #[serde(default = "MatchConfig::default_accidental_goal")]
    pub clearance_accidental_goal: f32,
    #[serde(default = "MatchConfig::default_rescue")]
    pub defender_rescue: f32,
    #[serde(default = "MatchConfig::default_corner")]
    pub corner_deflection: f32,
    #[serde(default = "MatchConfig::default_own_attack")]
    pub own_attack_chance: f32,
    #[serde(default)]
    pub attack_weights: AttackWeights,
    #[serde(default)]
    pub team_attack: TeamAttackChances,
    #[serde(default)]
    pub opponent_attack: OpponentAttackChances,
    #[serde(default = "MatchConfig::default_step_min")]
    pub minute_step_min: u32,
    #[serde(default = "MatchConfig::default_step_max")]
    pub minute_step_max: u32,
    #[serde(default = "MatchConfig::default_length")]
    pub match_length: u32,
    #[serde(default = "MatchConfig::default_late_minute")]
    pub late_minute: u32,
    #[serde(default = "MatchConfig::default_action_cap")]
    pub action_cap: u32,
    /// Pause on a "continue" prompt between moments.
    #[serde(default)]
    pub confirm_between_moments: bool,
}

impl MatchConfig {
    const fn default_tackle() -> f32 {
        TACKLE_SUCCESS
    }

    const fn default_block() -> f32 {
        BLOCK_SUCCESS
    }

    const fn default_pass() -> f32 {
        PASS_COMPLETION
    }

    const fn default_dribble() -> f32 {
        DRIBBLE_SUCCESS
    }

    const fn default_on_target() -> f32 {
        SHOT_ON_TARGET
    }

    const fn default_conversion_own_shot() -> f32 {
        CONVERSION_OWN_SHOT
    }

    const fn default_conversion_after_dribble() -> f32 {
        CONVERSION_AFTER_DRIBBLE
    }

    const fn default_conversion_after_pass() -> f32 {
        CONVERSION_AFTER_PASS
    }

    const fn default_kick() -> f32 {
        KEEPER_KICK_SUCCESS
    }

    const fn default_throw() -> f32 {
        KEEPER_THROW_SUCCESS
    }

    const fn default_clearance() -> f32 {
        CLEARANCE_SUCCESS
    }

    const fn default_accidental_goal() -> f32 {
        CLEARANCE_ACCIDENTAL_GOAL
    }

    const fn default_rescue() -> f32 {
        DEFENDER_RESCUE
    }

    const fn default_corner() -> f32 {
        CORNER_DEFLECTION
    }

    const fn default_own_attack() -> f32 {
        OWN_ATTACK_CHANCE
    }

    const fn default_step_min() -> u32 {
        MINUTE_STEP_MIN
    }

    const fn default_step_max() -> u32 {
        MINUTE_STEP_MAX
    }

    const fn default_length() -> u32 {
        MATCH_LENGTH_MINUTES
    }

    const fn default_late_minute() -> u32 {
        LATE_MATCH_MINUTE
    }

    const fn default_action_cap() -> u32 {
        ACTION_CAP
    }

    fn probabilities(&self) -> [(&'static str, f32); 25] {
        [
            ("tackle_success", self.tackle_success),
            ("block_success", self.block_success),
            ("pass_completion", self.pass_completion),
            ("dribble_success", self.dribble_success),
            ("shot_on_target", self.shot_on_target),
            ("conversion_own_shot", self.conversion_own_shot),
            ("conversion_after_dribble", self.conversion_after_dribble),
            ("conversion_after_pass", self.conversion_after_pass),
            ("keeper_kick_success", self.keeper_kick_success),
            ("keeper_throw_success", self.keeper_throw_success),
            ("clearance_success", self.clearance_success),
            ("clearance_accidental_goal", self.clearance_accidental_goal),
            ("defender_rescue", self.defender_rescue),
            ("corner_deflection", self.corner_deflection),
            ("own_attack_chance", self.own_attack_chance),
            ("team_attack.dribble_scores", self.team_attack.dribble_scores),
            ("team_attack.shot_scores", self.team_attack.shot_scores),
            ("team_attack.pass_scores", self.team_attack.pass_scores),
            ("opponent_attack.dribble_beats", self.opponent_attack.dribble_beats),
            ("opponent_attack.dribble_shoots", self.opponent_attack.dribble_shoots),
            ("opponent_attack.dribble_scores", self.opponent_attack.dribble_scores),
            ("opponent_attack.shot_scores", self.opponent_attack.shot_scores),
            ("opponent_attack.pass_finds", self.opponent_attack.pass_finds),
            ("opponent_attack.pass_scores", self.opponent_attack.pass_scores),
            (
                "rescue_plus_corner",
                self.defender_rescue + self.corner_deflection,
            ),
        ]
    }

    /// Validate the probability table and pacing.
    ///
    /// # Errors
    ///
    /// Returns `MatchConfigError` for a probability outside `[0, 1]`, a
    /// negative or all-zero attack weight set, an empty minute range or a
    /// zero match length or action cap.
    pub fn validate(&self) -> Result<(), MatchConfigError> {
        for (field, value) in self.probabilities() {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchConfigError::ProbabilityOutOfRange { field, value });
            }
        }
        let weights = self.attack_weights;
        if weights.dribble < 0.0 || weights.shot < 0.0 || weights.pass < 0.0 {
            return Err(MatchConfigError::NegativeAttackWeight);
        }
        if weights.total() <= 0.0 {
            return Err(MatchConfigError::ZeroAttackWeights);
        }
        if self.minute_step_min == 0 || self.minute_step_min > self.minute_step_max {
            return Err(MatchConfigError::EmptyMinuteRange {
                min: self.minute_step_min,
                max: self.minute_step_max,
            });
        }
        if self.match_length == 0 {
            return Err(MatchConfigError::ZeroMatchLength);
        }
        if self.action_cap == 0 {
            return Err(MatchConfigError::ZeroActionCap);
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tackle_success: Self::default_tackle(),
            block_success: Self::default_block(),
            pass_completion: Self::default_pass(),
            dribble_success: Self::default_dribble(),
            shot_on_target: Self::default_on_target(),
            conversion_own_shot: Self::default_conversion_own_shot(),
            conversion_after_dribble: Self::default_conversion_after_dribble(),
            conversion_after_pass: Self::default_conversion_after_pass(),
            keeper_kick_success: Self::default_kick(),
            keeper_throw_success: Self::default_throw(),
            clearance_success: Self::default_clearance(),
            clearance_accidental_goal: Self::default_accidental_goal(),
            defender_rescue: Self::default_rescue(),
            corner_deflection: Self::default_corner(),
            own_attack_chance: Self::default_own_attack(),
            attack_weights: AttackWeights::default(),
            team_attack: TeamAttackChances::default(),
            opponent_attack: OpponentAttackChances::default(),
            minute_step_min: Self::default_step_min(),
            minute_step_max: Self::default_step_max(),
            match_length: Self::default_length(),
            late_minute: Self::default_late_minute(),
            action_cap: Self::default_action_cap(),
            confirm_between_moments: false,
        }
    }
}

/// Errors raised when the match table is unusable.
#[derive(Debug, Error, PartialEq)]
pub enum MatchConfigError {
    #[error("{field} must be a probability between 0 and 1 (got {value:.2})")]
    ProbabilityOutOfRange { field: &'static str, value: f32 },
    #[error("attack weights must not be negative")]
    NegativeAttackWeight,
    #[error("attack weights must not all be zero")]
    ZeroAttackWeights,
    #[error("minute step range {min}..={max} is empty")]
    EmptyMinuteRange { min: u32, max: u32 },
    #[error("match length must be positive")]
    ZeroMatchLength,
    #[error("action cap must be positive")]
    ZeroActionCap,
}

//! Centralized balance and tuning constants for Matchday game logic.
//!
//! Every config struct falls back to these values when a field is omitted, so
//! an empty `{}` document always reproduces the shipped balance. Changing the
//! feel of a match or a season means changing a value here.

// Season calendar ------------------------------------------------------------
pub(crate) const SEASON_START_MONTH: u32 = 9;
pub(crate) const SEASON_END_MONTH: u32 = 5;
pub(crate) const WINTER_BREAK_START_MONTH: u32 = 12;
pub(crate) const WINTER_BREAK_RESUME_MONTH: u32 = 2;
pub(crate) const DAYS_BETWEEN_MATCHES: i64 = 7;
pub(crate) const FIRST_SEASON_YEAR: i32 = 2024;
pub(crate) const SEASON_ROUNDS: u32 = 18;

// Match clock ----------------------------------------------------------------
pub(crate) const MATCH_LENGTH_MINUTES: u32 = 90;
pub(crate) const LATE_MATCH_MINUTE: u32 = 85;
pub(crate) const MINUTE_STEP_MIN: u32 = 8;
pub(crate) const MINUTE_STEP_MAX: u32 = 12;
pub(crate) const ACTION_CAP: u32 = 50;
pub(crate) const OWN_ATTACK_CHANCE: f32 = 0.4;

// User action tables ---------------------------------------------------------
pub(crate) const TACKLE_SUCCESS: f32 = 0.6;
pub(crate) const BLOCK_SUCCESS: f32 = 0.5;
pub(crate) const PASS_COMPLETION: f32 = 0.7;
pub(crate) const DRIBBLE_SUCCESS: f32 = 0.6;
pub(crate) const SHOT_ON_TARGET: f32 = 0.7;
pub(crate) const CONVERSION_OWN_SHOT: f32 = 0.25;
pub(crate) const CONVERSION_AFTER_DRIBBLE: f32 = 0.2;
pub(crate) const CONVERSION_AFTER_PASS: f32 = 0.15;
pub(crate) const KEEPER_KICK_SUCCESS: f32 = 0.7;
pub(crate) const KEEPER_THROW_SUCCESS: f32 = 0.8;
pub(crate) const CLEARANCE_SUCCESS: f32 = 0.7;
pub(crate) const CLEARANCE_ACCIDENTAL_GOAL: f32 = 0.05;
pub(crate) const DEFENDER_RESCUE: f32 = 0.4;
pub(crate) const CORNER_DEFLECTION: f32 = 0.3;

// Automated attacks ----------------------------------------------------------
pub(crate) const ATTACK_WEIGHT_DRIBBLE: f32 = 0.3;
pub(crate) const ATTACK_WEIGHT_SHOT: f32 = 0.4;
pub(crate) const ATTACK_WEIGHT_PASS: f32 = 0.3;
pub(crate) const TEAM_DRIBBLE_SCORES: f32 = 0.35;
pub(crate) const TEAM_SHOT_SCORES: f32 = 0.3;
pub(crate) const TEAM_PASS_SCORES: f32 = 0.4;
pub(crate) const OPPONENT_DRIBBLE_BEATS: f32 = 0.6;
pub(crate) const OPPONENT_DRIBBLE_SHOOTS: f32 = 0.5;
pub(crate) const OPPONENT_DRIBBLE_SCORES: f32 = 0.4;
pub(crate) const OPPONENT_SHOT_SCORES: f32 = 0.3;
pub(crate) const OPPONENT_PASS_FINDS: f32 = 0.6;
pub(crate) const OPPONENT_PASS_SCORES: f32 = 0.4;

// Transfers ------------------------------------------------------------------
pub(crate) const TRANSFER_MIN_MATCHES: u32 = 10;
pub(crate) const TRANSFER_OFFER_COUNT: usize = 2;
pub(crate) const PROMOTION_MIN_GOALS: u32 = 5;
pub(crate) const PROMOTION_MIN_ASSISTS: u32 = 5;
pub(crate) const PROMOTION_MIN_SAVES: u32 = 40;
pub(crate) const PROMOTION_MIN_TACKLES: u32 = 25;
pub(crate) const LATERAL_MIN_STAT: u32 = 5;
pub(crate) const REGISTRATION_OFFER_COUNT: usize = 3;

// Presentation keys ----------------------------------------------------------
pub(crate) const KEY_KICKOFF_DEFENDING: &str = "match.kickoff.defending";
pub(crate) const KEY_KICKOFF_ATTACKING: &str = "match.kickoff.attacking";
pub(crate) const KEY_KEEPER_SET: &str = "match.keeper.set";
pub(crate) const KEY_KEEPER_SAVE: &str = "match.keeper.save";
pub(crate) const KEY_KEEPER_BEATEN: &str = "match.keeper.beaten";
pub(crate) const KEY_KEEPER_RESCUE: &str = "match.keeper.rescue";
pub(crate) const KEY_KEEPER_CORNER: &str = "match.keeper.corner";
pub(crate) const KEY_KEEPER_KICK: &str = "match.keeper.kick";
pub(crate) const KEY_KEEPER_KICK_FAIL: &str = "match.keeper.kick-fail";
pub(crate) const KEY_KEEPER_THROW: &str = "match.keeper.throw";
pub(crate) const KEY_KEEPER_THROW_FAIL: &str = "match.keeper.throw-fail";
pub(crate) const KEY_DEFENDER_TACKLE: &str = "match.defender.tackle";
pub(crate) const KEY_DEFENDER_TACKLE_FAIL: &str = "match.defender.tackle-fail";
pub(crate) const KEY_DEFENDER_BLOCK: &str = "match.defender.block";
pub(crate) const KEY_DEFENDER_BLOCK_FAIL: &str = "match.defender.block-fail";
pub(crate) const KEY_DEFENDER_PASS: &str = "match.defender.pass";
pub(crate) const KEY_DEFENDER_PASS_FAIL: &str = "match.defender.pass-fail";
pub(crate) const KEY_DEFENDER_CLEAR: &str = "match.defender.clear";
pub(crate) const KEY_DEFENDER_CLEAR_FAIL: &str = "match.defender.clear-fail";
pub(crate) const KEY_DEFENDER_FLUKE: &str = "match.defender.fluke-goal";
pub(crate) const KEY_FORWARD_SHOT_GOAL: &str = "match.forward.goal";
pub(crate) const KEY_FORWARD_SHOT_SAVED: &str = "match.forward.saved";
pub(crate) const KEY_FORWARD_SHOT_WIDE: &str = "match.forward.wide";
pub(crate) const KEY_FORWARD_PASS: &str = "match.forward.pass";
pub(crate) const KEY_FORWARD_PASS_FAIL: &str = "match.forward.pass-fail";
pub(crate) const KEY_FORWARD_ASSIST: &str = "match.forward.assist";
pub(crate) const KEY_FORWARD_CHANCE_MISSED: &str = "match.forward.chance-missed";
pub(crate) const KEY_FORWARD_DRIBBLE: &str = "match.forward.dribble";
pub(crate) const KEY_FORWARD_DRIBBLE_FAIL: &str = "match.forward.dribble-fail";
pub(crate) const KEY_TEAM_ATTACK: &str = "match.team.attack";
pub(crate) const KEY_TEAM_GOAL: &str = "match.team.goal";
pub(crate) const KEY_TEAM_MISS: &str = "match.team.miss";
pub(crate) const KEY_OPPONENT_ATTACK: &str = "match.opponent.attack";
pub(crate) const KEY_OPPONENT_GOAL: &str = "match.opponent.goal";
pub(crate) const KEY_OPPONENT_SAVED: &str = "match.opponent.saved";
pub(crate) const KEY_OPPONENT_STOPPED: &str = "match.opponent.stopped";
pub(crate) const KEY_CLOCK: &str = "match.clock";
pub(crate) const KEY_FULL_TIME: &str = "match.full-time";
pub(crate) const KEY_ACTION_CAP: &str = "match.action-cap";
pub(crate) const KEY_CLOCK_LATE: &str = "match.clock.late";
pub(crate) const KEY_CONTINUE: &str = "match.continue";
pub(crate) const KEY_DEFENDER_SET: &str = "match.defender.set";
pub(crate) const KEY_FORWARD_SET: &str = "match.forward.set";
pub(crate) const KEY_KEEPER_DISTRIBUTE: &str = "match.keeper.distribute";
pub(crate) const KEY_DEFENDER_DISTRIBUTE: &str = "match.defender.distribute";
pub(crate) const KEY_FORWARD_AFTER_DRIBBLE: &str = "match.forward.after-dribble";

// Profiles -------------------------------------------------------------------
pub(crate) const APPLIED_MATCH_HISTORY: usize = 64;

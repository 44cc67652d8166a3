use std::fmt;

use clap::ValueEnum;
use matchday_game::{Action, Position, Prompt};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// Picks a button for every prompt an automated player sees.
pub trait MatchPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    fn pick(&mut self, position: Position, prompt: &Prompt) -> Action;
}

/// Built-in ways of pressing buttons during automated matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Always the first offered button
    Steady,
    /// Always the last offered button
    Bold,
    /// A seeded random button
    Random,
}

impl Strategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Steady => "Steady",
            Self::Bold => "Bold",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn MatchPolicy + Send> {
        match self {
            Self::Steady => Box::new(SteadyPolicy),
            Self::Bold => Box::new(BoldPolicy),
            Self::Random => Box::new(RandomPolicy {
                rng: ChaCha20Rng::seed_from_u64(seed),
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct SteadyPolicy;
struct BoldPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl MatchPolicy for SteadyPolicy {
    fn name(&self) -> &'static str {
        "steady"
    }

    fn pick(&mut self, _position: Position, prompt: &Prompt) -> Action {
        prompt.actions.first().copied().unwrap_or(Action::Continue)
    }
}

impl MatchPolicy for BoldPolicy {
    fn name(&self) -> &'static str {
        "bold"
    }

    fn pick(&mut self, _position: Position, prompt: &Prompt) -> Action {
        prompt.actions.last().copied().unwrap_or(Action::Continue)
    }
}

impl MatchPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick(&mut self, _position: Position, prompt: &Prompt) -> Action {
        prompt
            .actions
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Action::Continue)
    }
}

/// Presses `preferred` whenever it is offered and the first button otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Prefer(pub Action);

impl MatchPolicy for Prefer {
    fn name(&self) -> &'static str {
        "prefer"
    }

    fn pick(&mut self, _position: Position, prompt: &Prompt) -> Action {
        if prompt.offers(self.0) {
            self.0
        } else {
            prompt.actions.first().copied().unwrap_or(Action::Continue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_game::Phase;

    fn prompt(position: Position, phase: Phase) -> Prompt {
        Prompt {
            id: 1,
            phase,
            actions: Action::available(position, phase).iter().copied().collect(),
        }
    }

    #[test]
    fn fixed_policies_pick_the_ends_of_the_row() {
        let forward = prompt(Position::Forward, Phase::First);
        let mut steady = Strategy::Steady.create_policy(0);
        let mut bold = Strategy::Bold.create_policy(0);
        assert_eq!(steady.pick(Position::Forward, &forward), Action::Shoot);
        assert_eq!(bold.pick(Position::Forward, &forward), Action::Dribble);
    }

    #[test]
    fn random_policy_only_picks_offered_actions() {
        let keeper = prompt(Position::Goalkeeper, Phase::First);
        let mut policy = Strategy::Random.create_policy(99);
        for _ in 0..50 {
            assert!(keeper.offers(policy.pick(Position::Goalkeeper, &keeper)));
        }
    }

    #[test]
    fn prefer_falls_back_when_the_action_is_missing() {
        let mut tackle = Prefer(Action::Tackle);
        let first = prompt(Position::Defender, Phase::First);
        let second = prompt(Position::Defender, Phase::Second);
        assert_eq!(tackle.pick(Position::Defender, &first), Action::Tackle);
        assert_eq!(tackle.pick(Position::Defender, &second), Action::PassLeft);
    }
}

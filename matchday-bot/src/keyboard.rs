//! Inline buttons and the callback data they carry.
use matchday_game::{Action, Club, LeagueTier, Position, Prompt, TransferOffer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::i18n::I18nBundle;

/// Every button press the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    CheckSubscription,
    ChoosePosition(Position),
    ChooseClub(String),
    PlayMatch,
    ShowStats,
    ReturnToMenu,
    Act { prompt_id: u32, action: Action },
    FinishMatch,
    Transfer(String),
    StayAtClub,
    ConfirmReset,
    CancelReset,
    ConfirmDelete,
    CancelDelete,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackError {
    #[error("unrecognised callback data {0:?}")]
    Unknown(String),
    #[error("malformed {kind} callback {data:?}")]
    Malformed { kind: &'static str, data: String },
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckSubscription => f.write_str("sub"),
            Self::ChoosePosition(position) => write!(f, "pos:{}", position.key()),
            Self::ChooseClub(club) => write!(f, "club:{club}"),
            Self::PlayMatch => f.write_str("play"),
            Self::ShowStats => f.write_str("stats"),
            Self::ReturnToMenu => f.write_str("menu"),
            Self::Act { prompt_id, action } => write!(f, "act:{prompt_id}:{}", action.key()),
            Self::FinishMatch => f.write_str("finish"),
            Self::Transfer(club) => write!(f, "transfer:{club}"),
            Self::StayAtClub => f.write_str("stay"),
            Self::ConfirmReset => f.write_str("reset:yes"),
            Self::CancelReset => f.write_str("reset:no"),
            Self::ConfirmDelete => f.write_str("delete:yes"),
            Self::CancelDelete => f.write_str("delete:no"),
        }
    }
}

impl FromStr for Callback {
    type Err = CallbackError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let malformed = |kind| CallbackError::Malformed {
            kind,
            data: data.to_string(),
        };
        let simple = match data {
            "sub" => Some(Self::CheckSubscription),
            "play" => Some(Self::PlayMatch),
            "stats" => Some(Self::ShowStats),
            "menu" => Some(Self::ReturnToMenu),
            "finish" => Some(Self::FinishMatch),
            "stay" => Some(Self::StayAtClub),
            "reset:yes" => Some(Self::ConfirmReset),
            "reset:no" => Some(Self::CancelReset),
            "delete:yes" => Some(Self::ConfirmDelete),
            "delete:no" => Some(Self::CancelDelete),
            _ => None,
        };
        if let Some(callback) = simple {
            return Ok(callback);
        }

        let (kind, rest) = data
            .split_once(':')
            .ok_or_else(|| CallbackError::Unknown(data.to_string()))?;
        match kind {
            "pos" => rest
                .parse()
                .map(Self::ChoosePosition)
                .map_err(|_| malformed("position")),
            "club" if !rest.is_empty() => Ok(Self::ChooseClub(rest.to_string())),
            "transfer" if !rest.is_empty() => Ok(Self::Transfer(rest.to_string())),
            "act" => {
                let (id, action) = rest.split_once(':').ok_or_else(|| malformed("action"))?;
                Ok(Self::Act {
                    prompt_id: id.parse().map_err(|_| malformed("action"))?,
                    action: action.parse().map_err(|_| malformed("action"))?,
                })
            }
            "club" | "transfer" => Err(malformed("club")),
            _ => Err(CallbackError::Unknown(data.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub callback: Callback,
}

impl Button {
    fn new(label: String, callback: Callback) -> Self {
        Self { label, callback }
    }
}

/// Rows of buttons shown under a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|button| vec![button]).collect(),
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    #[must_use]
    pub fn find(&self, predicate: impl Fn(&Callback) -> bool) -> Option<&Button> {
        self.buttons().find(|button| predicate(&button.callback))
    }
}

pub fn main_menu(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column([
        Button::new(i18n.t("menu.play"), Callback::PlayMatch),
        Button::new(i18n.t("menu.stats"), Callback::ShowStats),
    ])
}

pub fn positions(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column(Position::ALL.into_iter().map(|position| {
        Button::new(
            i18n.t(&format!("buttons.position.{}", position.key())),
            Callback::ChoosePosition(position),
        )
    }))
}

pub fn club_offers(clubs: &[&Club]) -> Keyboard {
    Keyboard::column(
        clubs
            .iter()
            .map(|club| Button::new(format!("🏆 {}", club.name), Callback::ChooseClub(club.name.clone()))),
    )
}

pub fn match_actions(i18n: &I18nBundle, prompt: &Prompt) -> Keyboard {
    Keyboard::column(prompt.actions.iter().map(|action| {
        Button::new(
            i18n.t(&format!("buttons.action.{}", action.key())),
            Callback::Act {
                prompt_id: prompt.id,
                action: *action,
            },
        )
    }))
}

pub fn after_match(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column([
        Button::new(i18n.t("menu.stats"), Callback::ShowStats),
        Button::new(i18n.t("menu.back"), Callback::ReturnToMenu),
    ])
}

pub fn finish_retry(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column([Button::new(i18n.t("buttons.finish"), Callback::FinishMatch)])
}

pub fn back_to_menu(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column([Button::new(i18n.t("menu.back"), Callback::ReturnToMenu)])
}

pub fn subscription(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column([Button::new(
        i18n.t("subscription.check"),
        Callback::CheckSubscription,
    )])
}

pub fn transfer_offer(i18n: &I18nBundle, offer: &TransferOffer, current_club: &str) -> Keyboard {
    let league = league_name(i18n, offer.tier);
    let mut buttons: Vec<Button> = offer
        .clubs
        .iter()
        .map(|club| Button::new(format!("{club} ({league})"), Callback::Transfer(club.clone())))
        .collect();
    let mut args = BTreeMap::new();
    args.insert("club", current_club);
    buttons.push(Button::new(
        i18n.tr("buttons.stay", Some(&args)),
        Callback::StayAtClub,
    ));
    Keyboard::column(buttons)
}

pub fn confirm_reset(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column([
        Button::new(i18n.t("reset.yes"), Callback::ConfirmReset),
        Button::new(i18n.t("reset.no"), Callback::CancelReset),
    ])
}

pub fn confirm_delete(i18n: &I18nBundle) -> Keyboard {
    Keyboard::column([
        Button::new(i18n.t("delete.yes"), Callback::ConfirmDelete),
        Button::new(i18n.t("delete.no"), Callback::CancelDelete),
    ])
}

pub fn league_name(i18n: &I18nBundle, tier: LeagueTier) -> String {
    i18n.t(&format!("leagues.{}", tier.key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_game::Phase;

    fn prompt(id: u32, position: Position, phase: Phase) -> Prompt {
        Prompt {
            id,
            phase,
            actions: Action::available(position, phase).iter().copied().collect(),
        }
    }

    #[test]
    fn callbacks_survive_encoding() {
        let samples = [
            Callback::CheckSubscription,
            Callback::ChoosePosition(Position::Goalkeeper),
            Callback::ChooseClub("Dinamo-2 Moscow".to_string()),
            Callback::Act {
                prompt_id: 41,
                action: Action::JumpLeft,
            },
            Callback::Transfer("Irtysh Omsk".to_string()),
            Callback::CancelDelete,
        ];
        for callback in samples {
            assert_eq!(callback.to_string().parse::<Callback>(), Ok(callback));
        }
    }

    #[test]
    fn malformed_data_is_rejected() {
        assert_eq!(
            "bogus".parse::<Callback>(),
            Err(CallbackError::Unknown("bogus".to_string()))
        );
        assert!(matches!(
            "act:x:shoot".parse::<Callback>(),
            Err(CallbackError::Malformed { kind: "action", .. })
        ));
        assert!(matches!(
            "act:3:moonwalk".parse::<Callback>(),
            Err(CallbackError::Malformed { .. })
        ));
        assert!(matches!(
            "pos:striker".parse::<Callback>(),
            Err(CallbackError::Malformed { kind: "position", .. })
        ));
        assert!("club:".parse::<Callback>().is_err());
    }

    #[test]
    fn action_buttons_carry_the_prompt_id() {
        let i18n = I18nBundle::new("en");
        let keyboard = match_actions(&i18n, &prompt(9, Position::Defender, Phase::Second));
        let callbacks: Vec<String> = keyboard
            .buttons()
            .map(|button| button.callback.to_string())
            .collect();
        assert_eq!(
            callbacks,
            ["act:9:pass_left", "act:9:pass_right", "act:9:clear"]
        );
        assert!(keyboard.buttons().all(|button| !button.label.starts_with("buttons.")));
    }
}

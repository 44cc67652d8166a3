//! Conversation handling on top of the career engine.
//!
//! Every user owns one [`UserSlot`] behind an async mutex, so input from the
//! same user is processed strictly one message at a time while other users
//! proceed independently.
use chrono::NaiveDate;
use matchday_game::{
    Action, ActionInput, CareerEngine, CareerError, LeagueTier, MatchError, MatchSession,
    MatchStart, Position, ProfileUpdate, Transition, UpdateOutcome,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

use crate::config::BotConfig;
use crate::i18n::I18nBundle;
use crate::keyboard::{self, Callback, Keyboard};
use crate::oracle::SubscriptionOracle;
use crate::render;
use crate::store::{PlayerStore, StoreError};
use crate::transport::{MessageId, MessagingSink, TransportError};

pub const MAX_NAME_CHARS: usize = 32;

/// One message from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Command { name: String, args: Vec<String> },
    Text(String),
    Callback { message_id: MessageId, data: String },
}

impl Incoming {
    /// Parse a console line: `/command args`, `!callback` (optionally
    /// `!callback@message`), anything else is text.
    #[must_use]
    pub fn parse(line: &str, last_keyboard: MessageId) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(rest) = line.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            let name = parts.next()?.to_string();
            return Some(Self::Command {
                name,
                args: parts.map(str::to_string).collect(),
            });
        }
        if let Some(rest) = line.strip_prefix('!') {
            let (data, message_id) = rest
                .rsplit_once('@')
                .and_then(|(data, id)| id.parse().ok().map(|id| (data, id)))
                .unwrap_or((rest, last_keyboard));
            return Some(Self::Callback {
                message_id,
                data: data.to_string(),
            });
        }
        Some(Self::Text(line.to_string()))
    }

    #[must_use]
    pub fn command(name: &str) -> Self {
        Self::Command {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn callback(message_id: MessageId, callback: &Callback) -> Self {
        Self::Callback {
            message_id,
            data: callback.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Career(#[from] CareerError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub locale: String,
    pub pause: Duration,
    pub admins: Vec<u64>,
    pub seed: u64,
    /// Fixed wall-clock date; the local date when unset.
    pub today: Option<NaiveDate>,
}

impl ServiceSettings {
    #[must_use]
    pub fn from_config(config: &BotConfig, seed: u64) -> Self {
        Self {
            locale: config.locale.clone(),
            pause: Duration::from_millis(config.pause_ms),
            admins: config.admins.clone(),
            seed,
            today: None,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&BotConfig::default(), 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Flow {
    #[default]
    Idle,
    AwaitingName,
    AwaitingPosition {
        name: String,
    },
    AwaitingClub {
        name: String,
        position: Position,
        offers: Vec<String>,
    },
    ConfirmReset,
    ConfirmDelete,
}

#[derive(Debug)]
struct UserSlot {
    flow: Flow,
    session: Option<MatchSession>,
    /// Message carrying the live action buttons.
    prompt_message: Option<MessageId>,
    rng: ChaCha20Rng,
}

impl UserSlot {
    fn new(seed: u64) -> Self {
        Self {
            flow: Flow::Idle,
            session: None,
            prompt_message: None,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    fn has_live_match(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.is_finished())
    }
}

const fn rejection_key(err: &MatchError) -> &'static str {
    match err {
        MatchError::StaleMessage { .. } => "match.stale",
        MatchError::Busy => "match.busy",
        MatchError::Finished => "match.finished",
        MatchError::InvalidAction { .. } => "match.invalid",
        _ => "match.none",
    }
}

pub struct CareerService<S, M, O> {
    engine: CareerEngine,
    store: S,
    sink: M,
    oracle: O,
    i18n: I18nBundle,
    settings: ServiceSettings,
    slots: Mutex<HashMap<u64, Arc<tokio::sync::Mutex<UserSlot>>>>,
}

impl<S, M, O> CareerService<S, M, O>
where
    S: PlayerStore,
    M: MessagingSink,
    O: SubscriptionOracle,
{
    pub fn new(engine: CareerEngine, store: S, sink: M, oracle: O, settings: ServiceSettings) -> Self {
        Self {
            engine,
            store,
            sink,
            oracle,
            i18n: I18nBundle::new(&settings.locale),
            settings,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub const fn engine(&self) -> &CareerEngine {
        &self.engine
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn sink(&self) -> &M {
        &self.sink
    }

    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    pub const fn i18n(&self) -> &I18nBundle {
        &self.i18n
    }

    pub async fn has_live_match(&self, user_id: u64) -> bool {
        self.slot(user_id).lock().await.has_live_match()
    }

    fn slot(&self, user_id: u64) -> Arc<tokio::sync::Mutex<UserSlot>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let seed = self.settings.seed ^ user_id;
        Arc::clone(
            slots
                .entry(user_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(UserSlot::new(seed)))),
        )
    }

    fn forget(&self, user_id: u64) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id);
    }

    fn today(&self) -> NaiveDate {
        self.settings
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    fn tier_of(&self, club: &str) -> LeagueTier {
        self.engine.directory().tier_of(club).unwrap_or_default()
    }

    async fn pause(&self) {
        if !self.settings.pause.is_zero() {
            tokio::time::sleep(self.settings.pause).await;
        }
    }

    /// Process one message. Failures are logged and the user is asked to
    /// retry; the error is returned for the caller's own logging.
    ///
    /// # Errors
    ///
    /// Returns store, transport and engine failures.
    pub async fn handle(&self, user_id: u64, incoming: Incoming) -> Result<(), ServiceError> {
        let slot = self.slot(user_id);
        let mut slot = slot.lock().await;
        let result = self.dispatch(user_id, &mut slot, incoming).await;
        if let Err(err) = &result {
            log::warn!("request from user {user_id} failed: {err}");
            if !matches!(err, ServiceError::Transport(_)) {
                if let Err(send_err) = self
                    .sink
                    .send_text(user_id, &self.i18n.t("error.retry"), None)
                    .await
                {
                    log::warn!("could not ask user {user_id} to retry: {send_err}");
                }
            }
        }
        result
    }

    async fn dispatch(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        incoming: Incoming,
    ) -> Result<(), ServiceError> {
        match incoming {
            Incoming::Callback { message_id, data } => {
                let callback = match data.parse::<Callback>() {
                    Ok(callback) => callback,
                    Err(err) => {
                        log::debug!("user {user_id} sent bad callback: {err}");
                        return self.notice(user_id, "match.invalid").await;
                    }
                };
                if callback == Callback::CheckSubscription {
                    return self.check_subscription(user_id).await;
                }
                if !self.gate(user_id).await? {
                    return Ok(());
                }
                self.on_callback(user_id, slot, message_id, callback).await
            }
            Incoming::Command { name, args } => {
                if !self.gate(user_id).await? {
                    return Ok(());
                }
                self.on_command(user_id, slot, &name, &args).await
            }
            Incoming::Text(text) => {
                if !self.gate(user_id).await? {
                    return Ok(());
                }
                self.on_text(user_id, slot, &text).await
            }
        }
    }

    async fn on_command(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        name: &str,
        args: &[String],
    ) -> Result<(), ServiceError> {
        match name {
            "start" => self.start(user_id, slot).await,
            "play" => self.play(user_id, slot).await,
            "stats" => self.stats(user_id).await,
            "menu" => self.menu(user_id, slot).await,
            "reset_stats" => self.ask_confirmation(user_id, slot, Flow::ConfirmReset).await,
            "delete_player" => self.ask_confirmation(user_id, slot, Flow::ConfirmDelete).await,
            "admin_delete_player" => self.admin_delete(user_id, slot, args).await,
            _ => self.say_key(user_id, "error.unknown", None).await,
        }
    }

    async fn on_callback(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        message_id: MessageId,
        callback: Callback,
    ) -> Result<(), ServiceError> {
        match callback {
            Callback::CheckSubscription => self.check_subscription(user_id).await,
            Callback::ChoosePosition(position) => {
                self.choose_position(user_id, slot, position).await
            }
            Callback::ChooseClub(club) => self.choose_club(user_id, slot, &club).await,
            Callback::PlayMatch => self.play(user_id, slot).await,
            Callback::ShowStats => self.stats(user_id).await,
            Callback::ReturnToMenu => self.menu(user_id, slot).await,
            Callback::Act { prompt_id, action } => {
                self.act(user_id, slot, message_id, prompt_id, action).await
            }
            Callback::FinishMatch => self.finish_button(user_id, slot).await,
            Callback::Transfer(club) => self.transfer(user_id, slot, &club).await,
            Callback::StayAtClub => self.stay(user_id).await,
            Callback::ConfirmReset => self.reset(user_id, slot).await,
            Callback::ConfirmDelete => self.delete(user_id, slot).await,
            Callback::CancelReset => self.cancel(user_id, slot, Flow::ConfirmReset).await,
            Callback::CancelDelete => self.cancel(user_id, slot, Flow::ConfirmDelete).await,
        }
    }

    async fn say(
        &self,
        user_id: u64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, ServiceError> {
        Ok(self.sink.send_text(user_id, text, keyboard).await?)
    }

    async fn say_key(
        &self,
        user_id: u64,
        key: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), ServiceError> {
        self.say(user_id, &self.i18n.t(key), keyboard).await?;
        Ok(())
    }

    async fn notice(&self, user_id: u64, key: &str) -> Result<(), ServiceError> {
        self.sink.notify(user_id, &self.i18n.t(key)).await?;
        Ok(())
    }

    async fn gate(&self, user_id: u64) -> Result<bool, ServiceError> {
        if self.oracle.is_subscribed(user_id).await {
            return Ok(true);
        }
        log::debug!("user {user_id} is not subscribed");
        let keyboard = keyboard::subscription(&self.i18n);
        self.say_key(user_id, "subscription.required", Some(&keyboard))
            .await?;
        Ok(false)
    }

    async fn check_subscription(&self, user_id: u64) -> Result<(), ServiceError> {
        if self.oracle.is_subscribed(user_id).await {
            let keyboard = keyboard::main_menu(&self.i18n);
            self.say_key(user_id, "subscription.thanks", Some(&keyboard))
                .await
        } else {
            let keyboard = keyboard::subscription(&self.i18n);
            self.say_key(user_id, "subscription.missing", Some(&keyboard))
                .await
        }
    }

    async fn start(&self, user_id: u64, slot: &mut UserSlot) -> Result<(), ServiceError> {
        if slot.has_live_match() {
            return self.say_key(user_id, "match.in-progress", None).await;
        }
        match self.store.get(user_id).await? {
            Some(profile) => {
                slot.flow = Flow::Idle;
                let text = render::welcome_back(&self.i18n, &profile, self.tier_of(&profile.club));
                self.say(user_id, &text, Some(&keyboard::main_menu(&self.i18n)))
                    .await?;
            }
            None => {
                slot.flow = Flow::AwaitingName;
                self.say_key(user_id, "welcome.new", None).await?;
            }
        }
        Ok(())
    }

    async fn on_text(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        text: &str,
    ) -> Result<(), ServiceError> {
        if slot.flow != Flow::AwaitingName {
            return self.say_key(user_id, "error.unknown", None).await;
        }
        let name = text.trim();
        let length = name.chars().count();
        if length == 0 || length > MAX_NAME_CHARS {
            let text = render::with_args(
                &self.i18n,
                "registration.name-invalid",
                &[("max", MAX_NAME_CHARS.to_string())],
            );
            self.say(user_id, &text, None).await?;
            return Ok(());
        }
        slot.flow = Flow::AwaitingPosition {
            name: name.to_string(),
        };
        let keyboard = keyboard::positions(&self.i18n);
        self.say_key(user_id, "registration.position", Some(&keyboard))
            .await
    }

    async fn choose_position(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        position: Position,
    ) -> Result<(), ServiceError> {
        let Flow::AwaitingPosition { name } = &slot.flow else {
            return self.say_key(user_id, "registration.stale", None).await;
        };
        let name = name.clone();
        let offers = self.engine.registration_offers(&mut slot.rng);
        let text = render::registration_offers(&self.i18n, &name, position, &offers);
        let keyboard = keyboard::club_offers(&offers);
        slot.flow = Flow::AwaitingClub {
            name,
            position,
            offers: offers.iter().map(|club| club.name.clone()).collect(),
        };
        self.say(user_id, &text, Some(&keyboard)).await?;
        Ok(())
    }

    async fn choose_club(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        club: &str,
    ) -> Result<(), ServiceError> {
        let (name, position) = match &slot.flow {
            Flow::AwaitingClub {
                name,
                position,
                offers,
            } if offers.iter().any(|offer| offer == club) => (name.clone(), *position),
            _ => return self.say_key(user_id, "registration.stale", None).await,
        };
        if self.store.get(user_id).await?.is_some() {
            slot.flow = Flow::Idle;
            let keyboard = keyboard::main_menu(&self.i18n);
            return self
                .say_key(user_id, "registration.exists", Some(&keyboard))
                .await;
        }
        let profile = self
            .engine
            .register(user_id, &name, position, club, self.today())?;
        self.store.create(profile.clone()).await?;
        slot.flow = Flow::Idle;
        let text = render::registered(&self.i18n, &profile);
        self.say(user_id, &text, Some(&keyboard::main_menu(&self.i18n)))
            .await?;
        Ok(())
    }

    async fn play(&self, user_id: u64, slot: &mut UserSlot) -> Result<(), ServiceError> {
        if let Some(prompt) = slot
            .session
            .as_ref()
            .and_then(|session| session.state().live_prompt())
        {
            // Re-offer the live buttons in case the last prompt never arrived.
            let keyboard = keyboard::match_actions(&self.i18n, prompt);
            let id = self
                .say(user_id, &self.i18n.t("match.in-progress"), Some(&keyboard))
                .await?;
            slot.prompt_message = Some(id);
            return Ok(());
        }
        if slot.has_live_match() {
            return self.notice(user_id, "match.busy").await;
        }
        if slot.session.as_ref().is_some_and(MatchSession::is_finished) {
            // Settle the unsaved result before a new match replaces it.
            return self.finish_match(user_id, slot).await;
        }
        let Some(mut profile) = self.store.get(user_id).await? else {
            return self.say_key(user_id, "match.no-player", None).await;
        };
        let before = profile.clone();
        let start = self.engine.start_match(&mut profile, &mut slot.rng);
        if profile != before {
            self.store
                .update(user_id, &ProfileUpdate::replace_from(&profile))
                .await?;
        }
        let menu = keyboard::main_menu(&self.i18n);
        match start {
            Err(CareerError::NoFixture { club, round }) => {
                log::warn!("no fixture for {club} in round {round} (player {user_id})");
                self.say_key(user_id, "match.no-fixture", Some(&menu)).await
            }
            Err(err) => Err(err.into()),
            Ok(MatchStart::Blocked(reason)) => {
                let text = render::block_reason(&self.i18n, &reason);
                self.say(user_id, &text, Some(&menu)).await?;
                Ok(())
            }
            Ok(MatchStart::Ready {
                session,
                kickoff,
                notices,
            }) => {
                for notice in &notices {
                    self.say(user_id, &render::start_notice(&self.i18n, notice), None)
                        .await?;
                }
                slot.flow = Flow::Idle;
                slot.session = Some(*session);
                slot.prompt_message = None;
                self.play_out(user_id, slot, kickoff).await
            }
        }
    }

    /// Deliver a transition's events, attaching the next prompt's buttons to
    /// the last message, and settle the match once it is over.
    async fn play_out(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        transition: Transition,
    ) -> Result<(), ServiceError> {
        let Some(session) = slot.session.as_ref() else {
            return Ok(());
        };
        let setup = session.setup().clone();
        let keyboard = transition
            .prompt
            .as_ref()
            .map(|prompt| keyboard::match_actions(&self.i18n, prompt));
        let count = transition.events.len();
        let mut last_message = None;
        for (index, event) in transition.events.iter().enumerate() {
            if index > 0 {
                self.pause().await;
            }
            let text = render::match_event(&self.i18n, &setup, event);
            let attach = if index + 1 == count {
                keyboard.as_ref()
            } else {
                None
            };
            let id = match &event.image_key {
                Some(image) => self.sink.send_image(user_id, image, &text, attach).await?,
                None => self.sink.send_text(user_id, &text, attach).await?,
            };
            last_message = Some(id);
        }
        if let Some(keyboard) = &keyboard {
            if count == 0 {
                let id = self
                    .say(user_id, &self.i18n.t("match.continue"), Some(keyboard))
                    .await?;
                last_message = Some(id);
            }
            slot.prompt_message = last_message;
        }
        if transition.finished {
            self.pause().await;
            self.finish_match(user_id, slot).await?;
        }
        Ok(())
    }

    async fn act(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        message_id: MessageId,
        prompt_id: u32,
        action: Action,
    ) -> Result<(), ServiceError> {
        let Some(session) = slot.session.as_mut() else {
            return self.notice(user_id, "match.none").await;
        };
        if slot
            .prompt_message
            .is_some_and(|live| live != message_id)
            && !session.is_finished()
        {
            log::debug!("user {user_id} pressed a button on old message {message_id}");
            return self.notice(user_id, "match.stale").await;
        }
        if let Err(err) = session.accept(ActionInput { prompt_id, action }) {
            log::debug!("user {user_id} action {action} rejected: {err}");
            return self.notice(user_id, rejection_key(&err)).await;
        }
        slot.prompt_message = None;
        self.pause().await;
        let transition = session.resolve(&mut slot.rng)?;
        self.play_out(user_id, slot, transition).await
    }

    async fn finish_button(&self, user_id: u64, slot: &mut UserSlot) -> Result<(), ServiceError> {
        match &slot.session {
            Some(session) if session.is_finished() => self.finish_match(user_id, slot).await,
            Some(_) => self.notice(user_id, "match.in-progress").await,
            None => self.notice(user_id, "match.none").await,
        }
    }

    /// Fold a finished session into the stored profile. A failed write keeps
    /// the session so the player can retry; the match key makes the retry
    /// safe.
    async fn finish_match(&self, user_id: u64, slot: &mut UserSlot) -> Result<(), ServiceError> {
        let Some(session) = slot.session.as_ref() else {
            return Ok(());
        };
        let Some(outcome) = session.outcome() else {
            return Ok(());
        };
        let setup = session.setup().clone();
        let Some(profile) = self.store.get(user_id).await? else {
            slot.session = None;
            return self.say_key(user_id, "match.no-player", None).await;
        };
        let settlement = self.engine.settle_match(&profile, &outcome, &mut slot.rng);
        let applied = match self.store.update(user_id, &settlement.update).await {
            Ok(applied) => applied,
            Err(err) => {
                log::warn!(
                    "could not save match {} for player {user_id}: {err}",
                    outcome.match_key
                );
                let keyboard = keyboard::finish_retry(&self.i18n);
                return self
                    .say_key(user_id, "match.finish-retry", Some(&keyboard))
                    .await;
            }
        };
        slot.session = None;
        slot.prompt_message = None;

        let career = match self.store.get(user_id).await {
            Ok(Some(stored)) => stored,
            _ => {
                let mut projected = profile.clone();
                projected.apply(&settlement.update);
                projected
            }
        };
        let summary = render::match_summary(&self.i18n, &setup, &outcome, &career);
        self.say(user_id, &summary, Some(&keyboard::after_match(&self.i18n)))
            .await?;
        if applied == UpdateOutcome::Duplicate {
            log::debug!("match {} was already saved", outcome.match_key);
            return Ok(());
        }

        if settlement.new_season {
            let text =
                render::new_season(&self.i18n, settlement.advance.date, profile.current_round);
            self.say(user_id, &text, None).await?;
        }
        if let Some(offer) = &settlement.offer {
            let text = render::transfer_offer(&self.i18n, offer);
            let keyboard = keyboard::transfer_offer(&self.i18n, offer, &career.club);
            self.say(user_id, &text, Some(&keyboard)).await?;
        }
        Ok(())
    }

    async fn stats(&self, user_id: u64) -> Result<(), ServiceError> {
        let Some(profile) = self.store.get(user_id).await? else {
            return self.say_key(user_id, "stats.missing", None).await;
        };
        let text = render::stats_view(&self.i18n, &profile, self.tier_of(&profile.club));
        self.say(user_id, &text, Some(&keyboard::back_to_menu(&self.i18n)))
            .await?;
        Ok(())
    }

    async fn menu(&self, user_id: u64, slot: &mut UserSlot) -> Result<(), ServiceError> {
        if slot.has_live_match() {
            return self.notice(user_id, "match.in-progress").await;
        }
        if slot.session.as_ref().is_some_and(MatchSession::is_finished) {
            // A finished but unsaved match still needs the finish button.
            return self.finish_match(user_id, slot).await;
        }
        self.start(user_id, slot).await
    }

    async fn transfer(
        &self,
        user_id: u64,
        slot: &UserSlot,
        club: &str,
    ) -> Result<(), ServiceError> {
        if slot.has_live_match() {
            return self.notice(user_id, "match.in-progress").await;
        }
        let Some(profile) = self.store.get(user_id).await? else {
            return self.say_key(user_id, "match.no-player", None).await;
        };
        let update = match self.engine.accept_transfer(&profile, club) {
            Ok(update) => update,
            Err(CareerError::NoPendingOffer) => {
                return self.say_key(user_id, "transfer.none", None).await;
            }
            Err(CareerError::ClubNotOffered(_)) => {
                return self.say_key(user_id, "transfer.not-offered", None).await;
            }
            Err(err) => return Err(err.into()),
        };
        self.store.update(user_id, &update).await?;
        let text = render::with_args(
            &self.i18n,
            "transfer.done",
            &[
                ("club", club.to_string()),
                ("league", keyboard::league_name(&self.i18n, self.tier_of(club))),
            ],
        );
        self.say(user_id, &text, Some(&keyboard::main_menu(&self.i18n)))
            .await?;
        Ok(())
    }

    async fn stay(&self, user_id: u64) -> Result<(), ServiceError> {
        let Some(profile) = self.store.get(user_id).await? else {
            return self.say_key(user_id, "match.no-player", None).await;
        };
        if profile.pending_offer.is_none() {
            return self.say_key(user_id, "transfer.none", None).await;
        }
        let update = self.engine.decline_transfer(&profile);
        self.store.update(user_id, &update).await?;
        let text = render::with_args(
            &self.i18n,
            "transfer.declined",
            &[("club", profile.club.clone())],
        );
        self.say(user_id, &text, Some(&keyboard::main_menu(&self.i18n)))
            .await?;
        Ok(())
    }

    async fn ask_confirmation(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        flow: Flow,
    ) -> Result<(), ServiceError> {
        if slot.has_live_match() {
            return self.say_key(user_id, "match.in-progress", None).await;
        }
        let Some(profile) = self.store.get(user_id).await? else {
            return self.say_key(user_id, "delete.missing", None).await;
        };
        let (key, keyboard) = if flow == Flow::ConfirmReset {
            ("reset.confirm", keyboard::confirm_reset(&self.i18n))
        } else {
            ("delete.confirm", keyboard::confirm_delete(&self.i18n))
        };
        slot.flow = flow;
        let text = render::confirm_profile(&self.i18n, key, &profile);
        self.say(user_id, &text, Some(&keyboard)).await?;
        Ok(())
    }

    async fn cancel(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        flow: Flow,
    ) -> Result<(), ServiceError> {
        if slot.flow != flow {
            return self.say_key(user_id, "registration.stale", None).await;
        }
        slot.flow = Flow::Idle;
        let key = if flow == Flow::ConfirmReset {
            "reset.cancelled"
        } else {
            "delete.cancelled"
        };
        self.say_key(user_id, key, Some(&keyboard::main_menu(&self.i18n)))
            .await
    }

    async fn reset(&self, user_id: u64, slot: &mut UserSlot) -> Result<(), ServiceError> {
        if slot.flow != Flow::ConfirmReset {
            return self.say_key(user_id, "registration.stale", None).await;
        }
        if slot.has_live_match() {
            return self.say_key(user_id, "match.in-progress", None).await;
        }
        let Some(profile) = self.store.get(user_id).await? else {
            slot.flow = Flow::Idle;
            return self.say_key(user_id, "delete.missing", None).await;
        };
        let today = self.today();
        let update = self.engine.reset_career(&profile, today);
        self.store.update(user_id, &update).await?;
        slot.flow = Flow::Idle;
        slot.session = None;
        let start = self.engine.clock().initial_date(today);
        let text = render::with_args(
            &self.i18n,
            "reset.done",
            &[("date", render::display_date(start))],
        );
        self.say(user_id, &text, Some(&keyboard::main_menu(&self.i18n)))
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: u64, slot: &mut UserSlot) -> Result<(), ServiceError> {
        if slot.flow != Flow::ConfirmDelete {
            return self.say_key(user_id, "registration.stale", None).await;
        }
        if slot.has_live_match() {
            return self.say_key(user_id, "match.in-progress", None).await;
        }
        let removed = self.store.delete(user_id).await?;
        slot.flow = Flow::Idle;
        slot.session = None;
        self.forget(user_id);
        let key = if removed.is_some() {
            "delete.done"
        } else {
            "delete.missing"
        };
        self.say_key(user_id, key, None).await
    }

    async fn admin_delete(
        &self,
        user_id: u64,
        slot: &mut UserSlot,
        args: &[String],
    ) -> Result<(), ServiceError> {
        if !self.settings.admins.contains(&user_id) {
            log::warn!("user {user_id} tried an admin command");
            return self.say_key(user_id, "admin.denied", None).await;
        }
        let Some(target) = args.first().and_then(|arg| arg.parse::<u64>().ok()) else {
            return self.say_key(user_id, "admin.usage", None).await;
        };
        let text = match self.store.delete(target).await? {
            Some(profile) => {
                if target == user_id {
                    slot.session = None;
                    slot.flow = Flow::Idle;
                } else {
                    self.forget(target);
                }
                log::info!("admin {user_id} deleted player {target}");
                render::with_args(
                    &self.i18n,
                    "admin.done",
                    &[("name", profile.name), ("id", target.to_string())],
                )
            }
            None => render::with_args(&self.i18n, "admin.missing", &[("id", target.to_string())]),
        };
        self.say(user_id, &text, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::AllowAll;
    use crate::store::MemoryPlayerStore;
    use crate::transport::RecordingSink;

    #[test]
    fn console_lines_parse_into_messages() {
        assert_eq!(
            Incoming::parse("/admin_delete_player 42", 0),
            Some(Incoming::Command {
                name: "admin_delete_player".to_string(),
                args: vec!["42".to_string()],
            })
        );
        assert_eq!(
            Incoming::parse("!act:3:shoot", 17),
            Some(Incoming::Callback {
                message_id: 17,
                data: "act:3:shoot".to_string(),
            })
        );
        assert_eq!(
            Incoming::parse("!play@5", 17),
            Some(Incoming::Callback {
                message_id: 5,
                data: "play".to_string(),
            })
        );
        assert_eq!(
            Incoming::parse("  Ivan Petrov ", 0),
            Some(Incoming::Text("Ivan Petrov".to_string()))
        );
        assert_eq!(Incoming::parse("   ", 0), None);
    }

    #[tokio::test]
    async fn deleting_a_player_drops_their_slot() {
        let engine = CareerEngine::with_defaults().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();
        let profile = engine
            .register(5, "Ivan", Position::Forward, "Kaluga", today)
            .unwrap();
        let settings = ServiceSettings {
            locale: "en".to_string(),
            pause: Duration::ZERO,
            admins: Vec::new(),
            seed: 3,
            today: Some(today),
        };
        let service = CareerService::new(
            engine,
            MemoryPlayerStore::new(),
            RecordingSink::new(),
            AllowAll,
            settings,
        );
        service.store().create(profile).await.unwrap();

        service
            .handle(5, Incoming::command("delete_player"))
            .await
            .unwrap();
        let (message_id, _) = service.sink().last_keyboard(5).unwrap();
        assert!(service.slots.lock().unwrap().contains_key(&5));
        service
            .handle(5, Incoming::callback(message_id, &Callback::ConfirmDelete))
            .await
            .unwrap();

        assert!(service.store().get(5).await.unwrap().is_none());
        assert!(!service.slots.lock().unwrap().contains_key(&5));
    }

    #[test]
    fn match_rejections_map_to_notices() {
        assert_eq!(
            rejection_key(&MatchError::StaleMessage {
                expected: 2,
                got: 1
            }),
            "match.stale"
        );
        assert_eq!(rejection_key(&MatchError::Busy), "match.busy");
        assert_eq!(rejection_key(&MatchError::Finished), "match.finished");
        assert_eq!(rejection_key(&MatchError::NotStarted), "match.none");
    }
}

use chrono::NaiveDate;
use matchday_bot::{
    AllowAll, AllowList, Callback, CareerService, Incoming, MemoryPlayerStore, PlayerStore,
    Recorded, RecordingSink, ServiceError, ServiceSettings, StoreError, SubscriptionOracle,
};
use matchday_game::{
    CareerEngine, LeagueTier, OfferKind, PlayerProfile, Position, ProfileUpdate, TransferOffer,
    UpdateOutcome,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Memory store whose writes can be switched off.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryPlayerStore,
    fail_updates: AtomicBool,
}

impl FlakyStore {
    fn set_failing(&self, failing: bool) {
        self.fail_updates.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PlayerStore for FlakyStore {
    async fn get(&self, user_id: u64) -> Result<Option<PlayerProfile>, StoreError> {
        self.inner.get(user_id).await
    }

    async fn create(&self, profile: PlayerProfile) -> Result<(), StoreError> {
        self.inner.create(profile).await
    }

    async fn update(
        &self,
        user_id: u64,
        update: &ProfileUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("database offline".to_string()));
        }
        self.inner.update(user_id, update).await
    }

    async fn delete(&self, user_id: u64) -> Result<Option<PlayerProfile>, StoreError> {
        self.inner.delete(user_id).await
    }
}

type Service<O> = CareerService<FlakyStore, RecordingSink, O>;

fn service_with<O: SubscriptionOracle>(oracle: O, admins: Vec<u64>) -> Service<O> {
    let settings = ServiceSettings {
        locale: "en".to_string(),
        pause: Duration::ZERO,
        admins,
        seed: 7,
        today: NaiveDate::from_ymd_opt(2024, 8, 20),
    };
    CareerService::new(
        CareerEngine::with_defaults().unwrap(),
        FlakyStore::default(),
        RecordingSink::new(),
        oracle,
        settings,
    )
}

fn service() -> Service<AllowAll> {
    service_with(AllowAll, Vec::new())
}

fn last_message(service: &Service<impl SubscriptionOracle>, user: u64) -> Recorded {
    service.sink().messages_for(user).pop().unwrap()
}

async fn press<O: SubscriptionOracle>(
    service: &Service<O>,
    user: u64,
    pick: impl Fn(&Callback) -> bool,
) -> Result<(), ServiceError> {
    let (message_id, keyboard) = service.sink().last_keyboard(user).unwrap();
    let button = keyboard.find(pick).unwrap().clone();
    service
        .handle(user, Incoming::callback(message_id, &button.callback))
        .await
}

async fn register<O: SubscriptionOracle>(service: &Service<O>, user: u64, position: Position) {
    service.handle(user, Incoming::command("start")).await.unwrap();
    service
        .handle(user, Incoming::Text("Ivan".to_string()))
        .await
        .unwrap();
    press(service, user, |cb| *cb == Callback::ChoosePosition(position))
        .await
        .unwrap();
    press(service, user, |cb| matches!(cb, Callback::ChooseClub(_)))
        .await
        .unwrap();
}

async fn stored(service: &Service<impl SubscriptionOracle>, user: u64) -> PlayerProfile {
    service.store().get(user).await.unwrap().unwrap()
}

fn is_action(callback: &Callback) -> bool {
    matches!(callback, Callback::Act { .. })
}

/// Press the first offered action until the match is over.
async fn play_out<O: SubscriptionOracle>(service: &Service<O>, user: u64) {
    for _ in 0..200 {
        if !service.has_live_match(user).await {
            return;
        }
        press(service, user, is_action).await.unwrap();
    }
    panic!("match did not finish");
}

#[tokio::test]
async fn registration_walks_name_position_and_club() {
    let service = service();
    service.handle(1, Incoming::command("start")).await.unwrap();
    assert!(last_message(&service, 1).text.contains("What is your name?"));

    service
        .handle(1, Incoming::Text("x".repeat(40)))
        .await
        .unwrap();
    assert!(last_message(&service, 1).text.contains("32"));

    service
        .handle(1, Incoming::Text("  Ivan  ".to_string()))
        .await
        .unwrap();
    press(&service, 1, |cb| *cb == Callback::ChoosePosition(Position::Goalkeeper))
        .await
        .unwrap();
    let (_, offers) = service.sink().last_keyboard(1).unwrap();
    assert_eq!(offers.buttons().count(), 3);

    press(&service, 1, |cb| matches!(cb, Callback::ChooseClub(_)))
        .await
        .unwrap();
    let profile = stored(&service, 1).await;
    assert_eq!(profile.name, "Ivan");
    assert_eq!(profile.position, Position::Goalkeeper);
    assert_eq!(
        service.engine().directory().tier_of(&profile.club),
        Some(LeagueTier::Silver)
    );
    assert_eq!(profile.virtual_date, "2024-09-01");
    assert_eq!(profile.current_round, 1);
    assert!(profile.personal_calendar.is_some());
    assert!(last_message(&service, 1).text.contains("01.09.2024"));

    // A second /start greets the existing player.
    service.handle(1, Incoming::command("start")).await.unwrap();
    assert!(last_message(&service, 1).text.contains("Hi, Ivan!"));
}

#[tokio::test]
async fn a_full_match_is_folded_into_the_career() {
    let service = service();
    register(&service, 3, Position::Forward).await;
    press(&service, 3, |cb| *cb == Callback::PlayMatch)
        .await
        .unwrap();
    assert!(service.has_live_match(3).await);
    assert!(
        service
            .sink()
            .messages_for(3)
            .iter()
            .any(|m| m.text.contains("Kick-off!"))
    );

    play_out(&service, 3).await;
    let profile = stored(&service, 3).await;
    assert_eq!(profile.stats.matches, 1);
    assert_eq!(
        profile.stats.wins + profile.stats.draws + profile.stats.losses,
        1
    );
    assert_eq!(profile.current_round, 2);
    assert_eq!(profile.virtual_date, "2024-09-08");
    assert!(profile.has_applied("2024-09-01#1"));
    let summary = service
        .sink()
        .messages_for(3)
        .into_iter()
        .rev()
        .find(|m| m.text.contains("Match over!"))
        .unwrap();
    assert!(summary.text.contains("Next match: 08.09.2024"));
}

#[tokio::test]
async fn live_match_blocks_start_and_reset() {
    let service = service();
    register(&service, 4, Position::Defender).await;
    press(&service, 4, |cb| *cb == Callback::PlayMatch)
        .await
        .unwrap();

    service.handle(4, Incoming::command("start")).await.unwrap();
    assert!(last_message(&service, 4).text.contains("A match is in progress"));
    service
        .handle(4, Incoming::command("reset_stats"))
        .await
        .unwrap();
    assert!(last_message(&service, 4).text.contains("A match is in progress"));

    // Asking to play again re-offers the live buttons.
    service.handle(4, Incoming::command("play")).await.unwrap();
    let (_, keyboard) = service.sink().last_keyboard(4).unwrap();
    assert!(keyboard.find(is_action).is_some());
}

#[tokio::test]
async fn stale_button_presses_are_rejected() {
    let service = service();
    register(&service, 5, Position::Goalkeeper).await;
    press(&service, 5, |cb| *cb == Callback::PlayMatch)
        .await
        .unwrap();
    let (old_message, old_keyboard) = service.sink().last_keyboard(5).unwrap();
    let old_button = old_keyboard.find(is_action).unwrap().clone();

    press(&service, 5, is_action).await.unwrap();
    let before = service.sink().messages_for(5).len();
    service
        .handle(5, Incoming::callback(old_message, &old_button.callback))
        .await
        .unwrap();

    let after = service.sink().messages_for(5);
    assert_eq!(after.len(), before + 1);
    let reply = after.last().unwrap();
    assert!(reply.notice);
    if service.has_live_match(5).await {
        assert_eq!(reply.text, "That button belongs to an older message.");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duplicate_deliveries_are_processed_once() {
    let service = Arc::new(service());
    register(&*service, 6, Position::Defender).await;
    press(&*service, 6, |cb| *cb == Callback::PlayMatch)
        .await
        .unwrap();
    let (message_id, keyboard) = service.sink().last_keyboard(6).unwrap();
    let callback = keyboard.find(is_action).unwrap().callback.clone();
    let before = service.sink().messages_for(6).len();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&service);
            let incoming = Incoming::callback(message_id, &callback);
            tokio::spawn(async move { service.handle(6, incoming).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let notices = service.sink().messages_for(6)[before..]
        .iter()
        .filter(|m| m.notice)
        .count();
    assert_eq!(notices, 1);
}

#[tokio::test]
async fn unsubscribed_users_are_gated() {
    let oracle = Arc::new(AllowList::new(std::iter::empty()));
    let service = service_with(Arc::clone(&oracle), Vec::new());

    service.handle(8, Incoming::command("start")).await.unwrap();
    assert!(last_message(&service, 8).text.contains("Subscribe to our channel"));
    press(&service, 8, |cb| *cb == Callback::CheckSubscription)
        .await
        .unwrap();
    assert!(last_message(&service, 8).text.contains("still not subscribed"));

    oracle.subscribe(8).await;
    press(&service, 8, |cb| *cb == Callback::CheckSubscription)
        .await
        .unwrap();
    assert!(last_message(&service, 8).text.contains("Thanks for subscribing"));
    service.handle(8, Incoming::command("start")).await.unwrap();
    assert!(last_message(&service, 8).text.contains("What is your name?"));
}

#[tokio::test]
async fn reset_and_delete_need_confirmation() {
    let service = service();
    register(&service, 9, Position::Forward).await;
    press(&service, 9, |cb| *cb == Callback::PlayMatch)
        .await
        .unwrap();
    play_out(&service, 9).await;
    let club = stored(&service, 9).await.club;

    service
        .handle(9, Incoming::command("reset_stats"))
        .await
        .unwrap();
    press(&service, 9, |cb| *cb == Callback::ConfirmReset)
        .await
        .unwrap();
    let profile = stored(&service, 9).await;
    assert!(profile.stats.is_zero());
    assert_eq!(profile.current_round, 1);
    assert_eq!(profile.virtual_date, "2024-09-01");
    assert_eq!(profile.club, club);
    assert_eq!(profile.name, "Ivan");

    service.handle(9, Incoming::command("play")).await.unwrap();
    play_out(&service, 9).await;
    let replayed = stored(&service, 9).await;
    assert_eq!(replayed.stats.matches, 1);
    assert_eq!(replayed.current_round, 2);

    service
        .handle(9, Incoming::command("delete_player"))
        .await
        .unwrap();
    press(&service, 9, |cb| *cb == Callback::CancelDelete)
        .await
        .unwrap();
    assert!(service.store().get(9).await.unwrap().is_some());

    service
        .handle(9, Incoming::command("delete_player"))
        .await
        .unwrap();
    press(&service, 9, |cb| *cb == Callback::ConfirmDelete)
        .await
        .unwrap();
    assert!(service.store().get(9).await.unwrap().is_none());

    // A confirmation without the question is treated as stale.
    service
        .handle(9, Incoming::callback(0, &Callback::ConfirmDelete))
        .await
        .unwrap();
    assert!(last_message(&service, 9).text.contains("expired"));
}

#[tokio::test]
async fn only_admins_delete_other_players() {
    let service = service_with(AllowAll, vec![99]);
    register(&service, 10, Position::Goalkeeper).await;

    let admin = |args: &[&str]| Incoming::Command {
        name: "admin_delete_player".to_string(),
        args: args.iter().map(|arg| (*arg).to_string()).collect(),
    };
    service.handle(11, admin(&["10"])).await.unwrap();
    assert!(last_message(&service, 11).text.contains("not allowed"));

    service.handle(99, admin(&[])).await.unwrap();
    assert!(last_message(&service, 99).text.contains("/admin_delete_player <ID>"));
    service.handle(99, admin(&["77"])).await.unwrap();
    assert!(last_message(&service, 99).text.contains("ID 77 not found"));
    service.handle(99, admin(&["10"])).await.unwrap();
    assert_eq!(
        last_message(&service, 99).text,
        "✅ Player Ivan (ID: 10) deleted."
    );
    assert!(service.store().get(10).await.unwrap().is_none());
}

#[tokio::test]
async fn transfer_offers_can_be_accepted_or_declined() {
    let service = service();
    let engine = service.engine();
    let silver = engine.directory().names_in(LeagueTier::Silver);
    let gold = engine.directory().names_in(LeagueTier::Gold);
    let today = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();
    let mut profile = engine
        .register(12, "Ivan", Position::Forward, &silver[0], today)
        .unwrap();
    profile.pending_offer = Some(TransferOffer {
        tier: LeagueTier::Gold,
        kind: OfferKind::Promotion,
        clubs: vec![gold[0].clone(), gold[1].clone()],
    });
    let old_calendar = profile.personal_calendar.clone();
    service.store().create(profile).await.unwrap();

    service
        .handle(12, Incoming::callback(0, &Callback::Transfer(gold[5].clone())))
        .await
        .unwrap();
    assert!(last_message(&service, 12).text.contains("did not make you an offer"));

    service
        .handle(12, Incoming::callback(0, &Callback::Transfer(gold[1].clone())))
        .await
        .unwrap();
    let moved = stored(&service, 12).await;
    assert_eq!(moved.club, gold[1]);
    assert!(moved.pending_offer.is_none());
    assert_ne!(moved.personal_calendar, old_calendar);
    assert!(last_message(&service, 12).text.contains("FNL Gold"));

    service
        .handle(12, Incoming::callback(0, &Callback::StayAtClub))
        .await
        .unwrap();
    assert!(last_message(&service, 12).text.contains("no offer on the table"));
}

#[tokio::test]
async fn failed_save_keeps_the_result_for_a_retry() {
    let service = service();
    register(&service, 13, Position::Defender).await;
    press(&service, 13, |cb| *cb == Callback::PlayMatch)
        .await
        .unwrap();
    service.store().set_failing(true);
    play_out(&service, 13).await;

    assert_eq!(stored(&service, 13).await.stats.matches, 0);
    let (_, keyboard) = service.sink().last_keyboard(13).unwrap();
    assert!(keyboard.find(|cb| *cb == Callback::FinishMatch).is_some());

    service.store().set_failing(false);
    press(&service, 13, |cb| *cb == Callback::FinishMatch)
        .await
        .unwrap();
    assert_eq!(stored(&service, 13).await.stats.matches, 1);

    service
        .handle(13, Incoming::callback(0, &Callback::FinishMatch))
        .await
        .unwrap();
    assert!(last_message(&service, 13).notice);
    assert_eq!(stored(&service, 13).await.stats.matches, 1);
}

#[tokio::test]
async fn play_settles_an_unsaved_match_before_starting_another() {
    let service = service();
    register(&service, 17, Position::Forward).await;
    press(&service, 17, |cb| *cb == Callback::PlayMatch)
        .await
        .unwrap();
    service.store().set_failing(true);
    play_out(&service, 17).await;

    service.handle(17, Incoming::command("play")).await.unwrap();
    assert!(!service.has_live_match(17).await);
    let (_, keyboard) = service.sink().last_keyboard(17).unwrap();
    assert!(keyboard.find(|cb| *cb == Callback::FinishMatch).is_some());
    assert_eq!(stored(&service, 17).await.stats.matches, 0);

    service.store().set_failing(false);
    service.handle(17, Incoming::command("play")).await.unwrap();
    let profile = stored(&service, 17).await;
    assert_eq!(profile.stats.matches, 1);
    assert_eq!(profile.current_round, 2);

    service.handle(17, Incoming::command("play")).await.unwrap();
    assert!(service.has_live_match(17).await);
}

#[tokio::test]
async fn winter_break_moves_the_player_to_february() {
    let service = service();
    let engine = service.engine();
    let club = engine.directory().names_in(LeagueTier::Silver)[2].clone();
    let today = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();
    let mut profile = engine
        .register(14, "Ivan", Position::Goalkeeper, &club, today)
        .unwrap();
    profile.virtual_date = "10.12.2024".to_string();
    profile.current_round = 10;
    service.store().create(profile).await.unwrap();

    service.handle(14, Incoming::command("play")).await.unwrap();
    assert!(
        last_message(&service, 14)
            .text
            .contains("The season resumes on 01.02.2025")
    );
    assert!(!service.has_live_match(14).await);
    assert_eq!(stored(&service, 14).await.virtual_date, "2025-02-01");
}

#[tokio::test]
async fn transport_failures_surface_without_losing_state() {
    let service = service();
    register(&service, 15, Position::Forward).await;
    service.sink().set_offline(true);
    let err = service
        .handle(15, Incoming::command("stats"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));

    service.sink().set_offline(false);
    service.handle(15, Incoming::command("stats")).await.unwrap();
    assert!(last_message(&service, 15).text.contains("Player Ivan"));
}

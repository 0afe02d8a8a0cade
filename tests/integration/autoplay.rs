//! Autoplay sessions end to end: pacing, shutdown and persistence.

use rust_decimal_macros::dec;
use std::time::Duration;

use plinko::engine::rng::seeded;
use plinko::engine::{build_multiplier_table, OutcomeEngine};
use plinko::ledger::{Ledger, Wallet};
use plinko::session::{AutoplaySession, StopReason};
use plinko::storage;
use plinko::types::{RiskTier, Wager};

fn temp_path() -> String {
    std::env::temp_dir()
        .join(format!("plinko_autoplay_{}.json", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string()
}

fn session(units: u32, delay_ms: u64, path: &str) -> AutoplaySession {
    let table = build_multiplier_table(RiskTier::Medium, 12).unwrap();
    AutoplaySession::new(OutcomeEngine::default(), table, Wager::new(dec!(2), units))
        .with_ball_delay(Duration::from_millis(delay_ms))
        .with_state_file(path)
}

#[tokio::test]
async fn test_resumed_session_continues_saved_wallet() {
    let path = temp_path();

    let mut wallet = Wallet::new(dec!(500));
    let first = session(3, 1, &path)
        .with_rounds(4)
        .run(&mut wallet, &mut seeded(10), std::future::pending())
        .await
        .unwrap();
    assert_eq!(first.stop_reason, StopReason::RoundsComplete);

    let saved = storage::load_wallet(Some(&path)).unwrap().unwrap();
    let mut resumed = Wallet::from_state(saved);
    assert_eq!(resumed.balance(), wallet.balance());
    assert_eq!(resumed.game_count(), 4);

    let second = session(3, 1, &path)
        .with_rounds(2)
        .run(&mut resumed, &mut seeded(11), std::future::pending())
        .await
        .unwrap();
    assert_eq!(second.starting_balance, first.final_balance);
    assert_eq!(resumed.game_count(), 6);
    assert_eq!(resumed.initial_deposit(), Some(dec!(500)));

    let saved = storage::load_wallet(Some(&path)).unwrap().unwrap();
    assert_eq!(saved.game_count, 6);
    assert_eq!(saved.balance, resumed.balance());

    storage::delete_wallet(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_shutdown_persists_partial_round() {
    let path = temp_path();
    let mut wallet = Wallet::new(dec!(500));

    let report = session(40, 25, &path)
        .run(
            &mut wallet,
            &mut seeded(4),
            tokio::time::sleep(Duration::from_millis(90)),
        )
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::Shutdown);
    let cancelled = report.cancelled.expect("first round should be cut short");
    assert!(cancelled.units_resolved() < 40);
    assert_eq!(cancelled.total_stake + cancelled.refunded_stake, dec!(80));

    let saved = storage::load_wallet(Some(&path)).unwrap().unwrap();
    assert_eq!(saved.balance, dec!(500) + cancelled.net_result);
    assert_eq!(saved.transactions.len(), 1);

    storage::delete_wallet(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_balls_are_paced() {
    let path = temp_path();
    let mut wallet = Wallet::new(dec!(500));

    let started = tokio::time::Instant::now();
    session(5, 20, &path)
        .with_rounds(1)
        .run(&mut wallet, &mut seeded(6), std::future::pending())
        .await
        .unwrap();

    // First ball drops immediately, the other four wait one delay each.
    assert!(started.elapsed() >= Duration::from_millis(80));

    storage::delete_wallet(Some(&path)).unwrap();
}

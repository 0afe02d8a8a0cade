//! Wallet lifecycle across play, approval and persistence.

use rust_decimal_macros::dec;

use plinko::engine::rng::seeded;
use plinko::engine::{build_multiplier_table, resolve_wager};
use plinko::ledger::{Ledger, Wallet};
use plinko::storage;
use plinko::types::{PlinkoError, RiskTier, TransactionKind, TransactionStatus, Wager, WagerRejection};

fn temp_path() -> String {
    std::env::temp_dir()
        .join(format!("plinko_lifecycle_{}.json", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string()
}

#[test]
fn test_deposit_play_withdraw_and_reload() {
    let path = temp_path();
    let table = build_multiplier_table(RiskTier::Medium, 12).unwrap();
    let mut wallet = Wallet::new(dec!(0));

    // Nothing to play with until the deposit is approved.
    let deposit = wallet.request_deposit(dec!(100)).unwrap();
    let err = resolve_wager(&table, Wager::new(dec!(5), 2), &mut seeded(1), &mut wallet).unwrap_err();
    assert!(matches!(
        err,
        PlinkoError::InvalidWager(WagerRejection::InsufficientBalance { .. })
    ));
    wallet.approve(deposit.id).unwrap();
    assert_eq!(wallet.balance(), dec!(100));

    let settlement =
        resolve_wager(&table, Wager::new(dec!(5), 2), &mut seeded(1), &mut wallet).unwrap();
    let after_game = dec!(100) + settlement.net_result;
    assert_eq!(wallet.balance(), after_game);
    assert_eq!(wallet.initial_deposit(), Some(dec!(100)));
    assert_eq!(wallet.game_count(), 1);

    let withdrawal = wallet.request_withdrawal(dec!(10)).unwrap();
    assert_eq!(wallet.balance(), after_game - dec!(10));
    assert_eq!(wallet.pending().len(), 1);

    // Persist with the withdrawal still pending, then deny it after reload.
    storage::save_wallet(wallet.state(), Some(&path)).unwrap();
    let mut restored = Wallet::from_state(storage::load_wallet(Some(&path)).unwrap().unwrap());
    assert_eq!(restored.balance(), after_game - dec!(10));
    assert_eq!(restored.pending()[0].id, withdrawal.id);

    restored.deny(withdrawal.id).unwrap();
    assert_eq!(restored.balance(), after_game);

    let history = restored.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, TransactionKind::Withdrawal);
    assert_eq!(history[0].status, TransactionStatus::Failed);
    assert!(matches!(history[1].kind, TransactionKind::Win | TransactionKind::Loss));
    assert_eq!(history[2].kind, TransactionKind::Deposit);
    assert_eq!(history[2].status, TransactionStatus::Completed);

    let stats = restored.stats();
    assert_eq!(stats.deposited, dec!(100));
    assert_eq!(stats.withdrawn, dec!(0));
    assert_eq!(stats.net_game_result(), settlement.net_result);

    storage::delete_wallet(Some(&path)).unwrap();
}

#[test]
fn test_rejected_wager_leaves_saved_state_untouched() {
    let path = temp_path();
    let table = build_multiplier_table(RiskTier::High, 10).unwrap();
    let mut wallet = Wallet::new(dec!(12));
    storage::save_wallet(wallet.state(), Some(&path)).unwrap();

    assert!(resolve_wager(&table, Wager::new(dec!(4), 4), &mut seeded(3), &mut wallet).is_err());
    assert!(resolve_wager(&table, Wager::new(dec!(-1), 1), &mut seeded(3), &mut wallet).is_err());

    let reloaded = storage::load_wallet(Some(&path)).unwrap().unwrap();
    assert_eq!(reloaded.balance, wallet.balance());
    assert_eq!(reloaded.transactions, wallet.state().transactions);
    assert_eq!(wallet.game_count(), 0);
    assert_eq!(wallet.initial_deposit(), None);

    storage::delete_wallet(Some(&path)).unwrap();
}

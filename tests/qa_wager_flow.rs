//! End-to-end ledger scenarios driven through the public crate API.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;
use wagerhall::ledger::{Ledger, LedgerError, STARTING_BALANCE};
use wagerhall::store::CsvStore;

fn ledger_at(dir: &TempDir, seed: u64) -> Ledger<StdRng> {
    let store = CsvStore::new(dir.path().join("accounts.csv"));
    Ledger::with_rng(store, StdRng::seed_from_u64(seed))
}

#[test]
fn qa_tc_registrations_load_back_with_starting_balance() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_at(&dir, 1);

    for name in ["alice", "bob", "carol"] {
        ledger.register(name, "secret").unwrap();
    }

    let store = CsvStore::new(dir.path().join("accounts.csv"));
    let accounts = store.load_all().unwrap();
    assert_eq!(accounts.len(), 3);
    for account in &accounts {
        assert_eq!(account.balance(), STARTING_BALANCE);
    }
    let names: Vec<&str> = accounts.iter().map(|a| a.username()).collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}

#[test]
fn qa_tc_full_player_journey() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_at(&dir, 11);

    // Register "bob"/"x" -> balance 50
    let bob = ledger.register("bob", "x").unwrap();
    assert_eq!(bob.balance(), 50);

    // Recharge of 0 is rejected, balance untouched
    assert!(matches!(
        ledger.recharge("bob", 0).unwrap_err(),
        LedgerError::InvalidAmount
    ));
    assert_eq!(ledger.balance_of("bob").unwrap(), 50);

    // Login works only with the right credential
    assert!(ledger.authenticate("bob", "x").is_ok());
    assert!(matches!(
        ledger.authenticate("bob", "y").unwrap_err(),
        LedgerError::InvalidCredentials
    ));

    // A round moves the balance by exactly its reported delta
    let round = ledger.play_round("bob").unwrap();
    assert_eq!(ledger.balance_of("bob").unwrap(), 50 + round.delta);
}

/// 1000 rounds with a seeded source reproduce the same final balance.
/// The game has a negative expected value, so the driver recharges a
/// fixed amount whenever play is blocked; the recharge path consumes no
/// randomness, keeping both runs on the same outcome sequence.
#[test]
fn qa_tc_seeded_runs_reproduce_final_balance() {
    let run = |seed: u64| -> i64 {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_at(&dir, seed);
        ledger.register("bob", "x").unwrap();

        let mut balance = STARTING_BALANCE;
        for _ in 0..1000 {
            match ledger.play_round("bob") {
                Ok(round) => balance = round.balance,
                Err(LedgerError::InsufficientFunds) => {
                    balance = ledger.recharge("bob", 100).unwrap();
                }
                Err(e) => panic!("unexpected ledger error: {e}"),
            }
        }
        balance
    };

    assert_eq!(run(42), run(42));
}

#[test]
fn qa_tc_leaderboard_tracks_round_results() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_at(&dir, 5);

    for name in ["p1", "p2", "p3", "p4", "p5", "p6", "p7"] {
        ledger.register(name, "secret").unwrap();
    }

    // 7 accounts, leaderboard capped at 5, all tied at the starting
    // balance: registration order breaks the ties.
    let top = ledger.top_players(5).unwrap();
    assert_eq!(top.len(), 5);
    let names: Vec<&str> = top.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["p1", "p2", "p3", "p4", "p5"]);

    // One resolved round reorders the next leaderboard call
    let round = ledger.play_round("p6").unwrap();
    let top = ledger.top_players(7).unwrap();
    let p6 = top.iter().find(|(n, _)| n == "p6").unwrap();
    assert_eq!(p6.1, round.balance);
    match round.delta {
        d if d > 0 => assert_eq!(top[0].0, "p6"), // win: p6 leads outright
        _ => assert_eq!(top[6].0, "p6"),          // loss: p6 falls to the bottom
    }

    let balances: Vec<i64> = top.iter().map(|(_, b)| *b).collect();
    let mut sorted = balances.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(balances, sorted);
}

#[test]
fn qa_tc_store_survives_process_restart() {
    let dir = TempDir::new().unwrap();
    {
        let ledger = ledger_at(&dir, 9);
        ledger.register("alice", "p1").unwrap();
        ledger.recharge("alice", 50).unwrap();
    }
    // New engine over the same file sees the persisted state
    let ledger = ledger_at(&dir, 10);
    let account = ledger.authenticate("alice", "p1").unwrap();
    assert_eq!(account.balance(), 100);
}

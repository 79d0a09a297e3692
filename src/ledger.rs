//! Ledger - account registration, authentication and the wager game
//!
//! Every operation is a short read-modify-write over the whole account
//! store. The engine holds no state between calls beyond the persisted
//! file and the injected random source; a single mutex serializes all
//! operations so two concurrent rounds cannot race the full-file rewrite
//! into a lost update.

use crate::account::Account;
use crate::store::{self, CsvStore, FIELD_DELIMITER, StoreError};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

// ============================================================
// Game constants
// ============================================================

/// Balance granted on registration
pub const STARTING_BALANCE: i64 = 50;
/// Credited on a winning round
pub const WIN_PAYOUT: i64 = 15;
/// Debited on a losing round
pub const LOSS_PENALTY: i64 = 10;
/// Probability that a round is won
pub const WIN_PROBABILITY: f64 = 0.20;

// ============================================================
// Errors
// ============================================================

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("username is empty or contains characters the store cannot hold")]
    InvalidUsername,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid username or credential")]
    InvalidCredentials,

    #[error("no registered accounts, register first")]
    NoAccounts,

    #[error("recharge amount must be at least 1")]
    InvalidAmount,

    #[error("no account registered for '{0}'")]
    UnknownAccount(String),

    #[error("balance is empty, recharge to continue playing")]
    InsufficientFunds,

    #[error("balance overflow")]
    Overflow,

    #[error("credential hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================
// Round outcome
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    /// Signed balance delta this outcome applies
    pub const fn delta(self) -> i64 {
        match self {
            Outcome::Win => WIN_PAYOUT,
            Outcome::Lose => -LOSS_PENALTY,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Lose => write!(f, "lose"),
        }
    }
}

/// Result of one resolved wager round. By the time a caller sees this,
/// the balance change is already persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RoundResult {
    pub outcome: Outcome,
    pub delta: i64,
    pub balance: i64,
}

/// Draw one round outcome from the given source: P(Win) = 0.20.
pub fn draw_outcome<R: Rng>(rng: &mut R) -> Outcome {
    if rng.gen_bool(WIN_PROBABILITY) {
        Outcome::Win
    } else {
        Outcome::Lose
    }
}

// ============================================================
// Ledger
// ============================================================

struct Inner<R> {
    store: CsvStore,
    rng: R,
}

/// The ledger engine. Stateless between calls except for the persisted
/// store; the random source is injected so outcomes are reproducible
/// under test (`with_rng` + a seeded `StdRng`).
pub struct Ledger<R = StdRng> {
    inner: Mutex<Inner<R>>,
}

impl Ledger<StdRng> {
    /// Production constructor: entropy-seeded outcome source.
    pub fn new(store: CsvStore) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }
}

impl<R: Rng> Ledger<R> {
    pub fn with_rng(store: CsvStore, rng: R) -> Self {
        Self {
            inner: Mutex::new(Inner { store, rng }),
        }
    }

    /// Register a new account with the starting balance and persist it.
    ///
    /// # Errors
    /// - `InvalidUsername` for names that are empty after trimming or
    ///   carry the store delimiter / line breaks
    /// - `UsernameTaken` if the (trimmed, case-sensitive) name exists
    pub fn register(&self, username: &str, credential: &str) -> Result<Account, LedgerError> {
        let username = username.trim();
        let credential = credential.trim();
        validate_username(username)?;

        let inner = self.inner.lock().expect("ledger mutex poisoned");
        let mut accounts = inner.store.load_all()?;
        if store::find_by_username(&accounts, username).is_some() {
            return Err(LedgerError::UsernameTaken(username.to_string()));
        }

        let account = Account::new(username, hash_credential(credential)?, STARTING_BALANCE);
        accounts.push(account.clone());
        inner.store.save_all(&accounts)?;

        tracing::info!(username, "account registered");
        Ok(account)
    }

    /// Authenticate against the stored credential hash.
    ///
    /// # Errors
    /// - `NoAccounts` when the store holds no accounts at all (distinct
    ///   "no registered users" case)
    /// - `InvalidCredentials` on unknown username or hash mismatch
    pub fn authenticate(&self, username: &str, credential: &str) -> Result<Account, LedgerError> {
        let username = username.trim();
        let credential = credential.trim();

        let inner = self.inner.lock().expect("ledger mutex poisoned");
        let accounts = inner.store.load_all()?;
        if accounts.is_empty() {
            return Err(LedgerError::NoAccounts);
        }
        let account =
            store::find_by_username(&accounts, username).ok_or(LedgerError::InvalidCredentials)?;
        if !verify_credential(credential, account.credential()) {
            tracing::warn!(username, "authentication failed");
            return Err(LedgerError::InvalidCredentials);
        }
        Ok(account.clone())
    }

    /// Add `amount` to the stored balance and persist; returns the new
    /// balance.
    ///
    /// # Errors
    /// - `InvalidAmount` unless `amount >= 1`
    /// - `UnknownAccount` if the username is not stored
    pub fn recharge(&self, username: &str, amount: i64) -> Result<i64, LedgerError> {
        if amount < 1 {
            return Err(LedgerError::InvalidAmount);
        }
        let username = username.trim();

        let inner = self.inner.lock().expect("ledger mutex poisoned");
        let mut accounts = inner.store.load_all()?;
        let idx = accounts
            .iter()
            .position(|a| a.username() == username)
            .ok_or_else(|| LedgerError::UnknownAccount(username.to_string()))?;

        let new_balance = accounts[idx]
            .apply_delta(amount)
            .map_err(|_| LedgerError::Overflow)?;
        inner.store.save_all(&accounts)?;

        tracing::info!(username, amount, new_balance, "balance recharged");
        Ok(new_balance)
    }

    /// Play one wager round: draw win/lose, apply +15/-10, persist.
    ///
    /// Outcome decision and persistence happen under the same lock hold;
    /// if the save fails the error propagates and no outcome is reported,
    /// so a reported outcome always has its balance change on disk.
    ///
    /// # Errors
    /// - `InsufficientFunds` if the stored balance is <= 0 (the round is
    ///   blocked, nothing is drawn or mutated)
    /// - `UnknownAccount` if the username is not stored
    pub fn play_round(&self, username: &str) -> Result<RoundResult, LedgerError> {
        let username = username.trim();

        let mut guard = self.inner.lock().expect("ledger mutex poisoned");
        let inner = &mut *guard;
        let mut accounts = inner.store.load_all()?;
        let idx = accounts
            .iter()
            .position(|a| a.username() == username)
            .ok_or_else(|| LedgerError::UnknownAccount(username.to_string()))?;

        if accounts[idx].balance() <= 0 {
            return Err(LedgerError::InsufficientFunds);
        }

        let outcome = draw_outcome(&mut inner.rng);
        let delta = outcome.delta();
        let balance = accounts[idx]
            .apply_delta(delta)
            .map_err(|_| LedgerError::Overflow)?;
        inner.store.save_all(&accounts)?;

        tracing::debug!(username, %outcome, delta, balance, "round resolved");
        Ok(RoundResult {
            outcome,
            delta,
            balance,
        })
    }

    /// Current stored balance for an account (read-only).
    ///
    /// # Errors
    /// - `UnknownAccount` if the username is not stored
    pub fn balance_of(&self, username: &str) -> Result<i64, LedgerError> {
        let username = username.trim();
        let inner = self.inner.lock().expect("ledger mutex poisoned");
        let accounts = inner.store.load_all()?;
        store::find_by_username(&accounts, username)
            .map(|a| a.balance())
            .ok_or_else(|| LedgerError::UnknownAccount(username.to_string()))
    }

    /// Top `n` players by balance, descending; ties keep the original
    /// insertion (registration) order.
    pub fn top_players(&self, n: usize) -> Result<Vec<(String, i64)>, LedgerError> {
        let inner = self.inner.lock().expect("ledger mutex poisoned");
        let mut accounts = inner.store.load_all()?;
        // Stable sort: equal balances stay in file (insertion) order.
        accounts.sort_by_key(|a| std::cmp::Reverse(a.balance()));
        Ok(accounts
            .into_iter()
            .take(n)
            .map(|a| (a.username().to_string(), a.balance()))
            .collect())
    }
}

fn validate_username(username: &str) -> Result<(), LedgerError> {
    if username.is_empty()
        || username.contains(FIELD_DELIMITER)
        || username.contains('\n')
        || username.contains('\r')
    {
        return Err(LedgerError::InvalidUsername);
    }
    Ok(())
}

// ============================================================
// Credential hashing
// ============================================================

fn hash_credential(credential: &str) -> Result<String, LedgerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(credential.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| LedgerError::Hash(e.to_string()))
}

fn verify_credential(credential: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(credential.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ============================================================
// TESTS
// ============================================================

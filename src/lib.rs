//! Wagerhall - CSV-backed account ledger with a randomized wager game
//!
//! # Modules
//!
//! - [`account`] - Enforced account type (username, credential hash, balance)
//! - [`store`] - Flat-file account store with atomic rewrite
//! - [`ledger`] - Registration, authentication, recharge, wager rounds, leaderboard
//! - [`session`] - Ephemeral login sessions (owned by the gateway)
//! - [`gateway`] - HTTP JSON API over the ledger
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing setup (rolling file + stdout)

pub mod account;
pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod session;
pub mod store;

// Convenient re-exports at crate root
pub use account::Account;
pub use ledger::{
    LOSS_PENALTY, Ledger, LedgerError, Outcome, RoundResult, STARTING_BALANCE, WIN_PAYOUT,
    WIN_PROBABILITY,
};
pub use session::{Session, SessionRegistry};
pub use store::{CsvStore, StoreError};

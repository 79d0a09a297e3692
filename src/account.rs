/// ENFORCED ACCOUNT TYPE - Used by the Ledger
///
/// This is the single source of truth for a player's stored record.
/// All balance mutations go through `apply_delta`.
///
/// # Enforcement Strategy:
/// 1. Fields are PRIVATE - no direct access
/// 2. Mutations return Result - errors are explicit
/// 3. checked arithmetic - overflow protection
use serde::{Deserialize, Serialize};

/// One registered player: username, credential hash, balance.
///
/// # Invariants (enforced by private fields):
/// - username is immutable after creation (store-wide uniqueness is the
///   Ledger's job, see `Ledger::register`)
/// - balance only changes through `apply_delta`
/// - balance is signed: storage enforces no floor, a losing round may
///   drive it below zero; the game layer blocks play at balance <= 0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    username: String,   // PRIVATE - use username()
    credential: String, // PRIVATE - argon2 PHC string, use credential()
    balance: i64,       // PRIVATE - ONLY modified through apply_delta
}

impl Account {
    pub fn new(username: impl Into<String>, credential: impl Into<String>, balance: i64) -> Self {
        Self {
            username: username.into(),
            credential: credential.into(),
            balance,
        }
    }

    /// Read-only access to the username
    #[inline(always)]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Read-only access to the stored credential hash
    #[inline(always)]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Read-only access to the balance
    #[inline(always)]
    pub const fn balance(&self) -> i64 {
        self.balance
    }

    /// Apply a signed balance delta (recharge, win payout, loss penalty).
    ///
    /// # Errors
    /// Returns error on i64 overflow; the balance is unchanged.
    ///
    /// # Effects
    /// Returns the new balance.
    pub fn apply_delta(&mut self, delta: i64) -> Result<i64, &'static str> {
        self.balance = self
            .balance
            .checked_add(delta)
            .ok_or("balance delta overflow")?;
        Ok(self.balance)
    }
}

// ============================================================
// TESTS
// ============================================================

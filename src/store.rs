//! Account Store - flat CSV file holding all registered accounts
//!
//! The whole file is read and rewritten on every operation; there is no
//! incremental update or indexing. Saves go through a temp file in the
//! same directory followed by a rename, so a crash mid-write can never
//! leave a partial file behind.

use crate::account::Account;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================
// File format constants
// ============================================================

/// Header row of the accounts file
pub const ACCOUNTS_HEADER: &str = "username,credential,balance";

/// Column delimiter. Usernames must never contain it; credential hashes
/// may (argon2 PHC strings embed commas in their parameter list), which
/// is why rows are parsed positionally rather than by a plain split.
pub const FIELD_DELIMITER: char = ',';

// ============================================================
// Errors
// ============================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("account file corrupt at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("field cannot be stored in the accounts file: {0}")]
    UnencodableField(String),
}

// ============================================================
// CsvStore
// ============================================================

/// CSV-backed account store.
///
/// A missing file reads as an empty store; an unparseable file is
/// `StoreError::Corrupt`. The store itself takes no locks - callers
/// serialize mutations (see `Ledger`).
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every account from the backing file.
    ///
    /// # Errors
    /// - `Corrupt` if the header or any row is unparseable
    /// - `Io` on any other read failure
    ///
    /// A missing file or a file with only the header yields an empty vec.
    pub fn load_all(&self) -> Result<Vec<Account>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut accounts = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if idx == 0 {
                if line.trim() != ACCOUNTS_HEADER {
                    return Err(StoreError::Corrupt {
                        line: 1,
                        reason: format!("unexpected header '{}'", line.trim()),
                    });
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            let account = parse_row(line).map_err(|reason| StoreError::Corrupt {
                line: idx + 1,
                reason,
            })?;
            accounts.push(account);
        }
        Ok(accounts)
    }

    /// Overwrite the entire backing file with the given accounts.
    ///
    /// Writes to `<path>.tmp` and renames over the target, so readers
    /// observe either the old file or the new one, never a torn write.
    ///
    /// # Errors
    /// - `UnencodableField` if a username carries the delimiter or a line
    ///   break (rejected rather than escaped), or a credential carries a
    ///   line break
    /// - `Io` on any write/rename failure
    pub fn save_all(&self, accounts: &[Account]) -> Result<(), StoreError> {
        for account in accounts {
            validate_field(account.username(), true)?;
            validate_field(account.credential(), false)?;
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            writeln!(file, "{}", ACCOUNTS_HEADER)?;
            for account in accounts {
                writeln!(
                    file,
                    "{},{},{}",
                    account.username(),
                    account.credential(),
                    account.balance()
                )?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Exact-match lookup after trimming whitespace on the probe.
/// Stored usernames are already trimmed at registration.
pub fn find_by_username<'a>(accounts: &'a [Account], name: &str) -> Option<&'a Account> {
    let name = name.trim();
    accounts.iter().find(|a| a.username() == name)
}

// ============================================================
// Row parsing
// ============================================================

/// Parse one data row: `username,credential,balance`.
///
/// Username is everything before the first delimiter, balance everything
/// after the last; the credential is the (possibly delimiter-bearing)
/// middle.
fn parse_row(line: &str) -> Result<Account, String> {
    let (username, rest) = line
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| "expected 3 columns, found 1".to_string())?;
    let (credential, balance_str) = rest
        .rsplit_once(FIELD_DELIMITER)
        .ok_or_else(|| "expected 3 columns, found 2".to_string())?;

    let username = username.trim();
    if username.is_empty() {
        return Err("empty username".to_string());
    }
    let balance: i64 = balance_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid balance '{}'", balance_str.trim()))?;

    Ok(Account::new(username, credential, balance))
}

fn validate_field(value: &str, is_username: bool) -> Result<(), StoreError> {
    if value.contains('\n') || value.contains('\r') {
        return Err(StoreError::UnencodableField(value.to_string()));
    }
    if is_username && (value.contains(FIELD_DELIMITER) || value.trim().is_empty()) {
        return Err(StoreError::UnencodableField(value.to_string()));
    }
    Ok(())
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, CsvStore) {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(dir.path().join("accounts.csv"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, store) = temp_store();
        let accounts = vec![
            Account::new("alice", "hash-a", 50),
            Account::new("bob", "hash-b", -5),
        ];
        store.save_all(&accounts).unwrap();
        assert_eq!(store.load_all().unwrap(), accounts);
    }

    #[test]
    fn test_header_only_loads_empty() {
        let (_dir, store) = temp_store();
        store.save_all(&[]).unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_credential_may_contain_delimiter() {
        // argon2 PHC strings look like: $argon2id$v=19$m=19456,t=2,p=1$...
        let (_dir, store) = temp_store();
        let accounts = vec![Account::new(
            "alice",
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
            50,
        )];
        store.save_all(&accounts).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, accounts);
    }

    #[test]
    fn test_corrupt_balance_rejected() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            format!("{}\nalice,hash,not-a-number\n", ACCOUNTS_HEADER),
        )
        .unwrap();
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }));
    }

    #[test]
    fn test_corrupt_header_rejected() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "user,pass,wallet\nalice,hash,50\n").unwrap();
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 1, .. }));
    }

    #[test]
    fn test_missing_column_rejected() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), format!("{}\nalice,50\n", ACCOUNTS_HEADER)).unwrap();
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }));
    }

    #[test]
    fn test_delimiter_in_username_rejected_on_save() {
        let (_dir, store) = temp_store();
        let accounts = vec![Account::new("al,ice", "hash", 50)];
        let err = store.save_all(&accounts).unwrap_err();
        assert!(matches!(err, StoreError::UnencodableField(_)));
        // Nothing was written
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites_whole_file() {
        let (_dir, store) = temp_store();
        store
            .save_all(&[Account::new("alice", "h", 50), Account::new("bob", "h", 50)])
            .unwrap();
        store.save_all(&[Account::new("alice", "h", 65)]).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].balance(), 65);
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let (_dir, store) = temp_store();
        store.save_all(&[Account::new("alice", "h", 50)]).unwrap();
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_find_by_username_trims_probe() {
        let accounts = vec![Account::new("alice", "h", 50)];
        assert!(find_by_username(&accounts, "  alice  ").is_some());
        assert!(find_by_username(&accounts, "Alice").is_none()); // case-sensitive
        assert!(find_by_username(&accounts, "carol").is_none());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            format!("{}\nalice,hash,50\n\nbob,hash,42\n", ACCOUNTS_HEADER),
        )
        .unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
    }
}

use crate::ledger::Ledger;
use crate::session::SessionRegistry;

/// Gateway application state (shared)
pub struct AppState {
    /// The account ledger and game engine
    pub ledger: Ledger,
    /// Live login sessions (token -> username + cached balance)
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            sessions: SessionRegistry::new(),
        }
    }
}

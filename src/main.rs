//! Wagerhall - wager-game account service
//!
//! This is the main entry point. Architecture:
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │ Gateway  │───▶│  Ledger  │───▶│ CsvStore │
//! │ (axum)   │    │ (+ RNG)  │    │ (file)   │
//! └──────────┘    └──────────┘    └──────────┘
//!
//! Ledger responsibilities:
//! - register / authenticate against the stored credential hash
//! - recharge and wager-round balance mutations (persist-before-report)
//! - leaderboard queries
//! ```

use std::sync::Arc;

use wagerhall::config::AppConfig;
use wagerhall::gateway;
use wagerhall::gateway::state::AppState;
use wagerhall::ledger::Ledger;
use wagerhall::logging;
use wagerhall::store::CsvStore;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = logging::init_logging(&config);

    tracing::info!(%env, store = %config.store.path, "starting wagerhall");

    let store = CsvStore::new(&config.store.path);
    let ledger = Ledger::new(store);
    let state = Arc::new(AppState::new(ledger));

    gateway::run_server(&config.gateway, state).await;
}

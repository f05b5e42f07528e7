//! Lazily built process-wide client.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use once_cell::sync::Lazy;
use tracing::debug;

use super::core::GeminiClient;
use crate::Result;

static SHARED: Lazy<ArcSwapOption<GeminiClient>> = Lazy::new(ArcSwapOption::empty);
static INIT: Mutex<()> = Mutex::new(());

/// Process-wide client, built from the environment on first use.
///
/// Concurrent first calls build at most one client. A failed build leaves the
/// slot empty, so a later call can retry after the environment is fixed.
pub fn shared_client() -> Result<Arc<GeminiClient>> {
    if let Some(client) = SHARED.load_full() {
        return Ok(client);
    }
    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(client) = SHARED.load_full() {
        return Ok(client);
    }
    let client = Arc::new(GeminiClient::from_env()?);
    debug!(model = client.model(), "initialized shared client");
    SHARED.store(Some(client.clone()));
    Ok(client)
}

/// Replace the process-wide client.
pub fn install_shared_client(client: Arc<GeminiClient>) {
    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    SHARED.store(Some(client));
}

/// Drop the process-wide client; the next [`shared_client`] call rebuilds it.
pub fn reset_shared_client() {
    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    SHARED.store(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::tokens::CostLedger;

    #[test]
    fn test_install_and_reset() {
        let client = Arc::new(
            GeminiClient::builder()
                .config(ClientConfig::new("k"))
                .ledger(Arc::new(CostLedger::new()))
                .build()
                .unwrap(),
        );
        install_shared_client(client.clone());
        let shared = shared_client().unwrap();
        assert!(Arc::ptr_eq(&shared, &client));
        assert!(Arc::ptr_eq(&shared_client().unwrap(), &client));
        reset_shared_client();
        assert!(SHARED.load_full().is_none());
    }
}

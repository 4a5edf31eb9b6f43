//! Shared bookkeeping for the in-memory booking services.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

struct LedgerState<T> {
    entries: HashMap<String, T>,
    next_id: u32,
    fail_on_book: bool,
    fail_on_cancel: bool,
    delay: Duration,
}

/// Confirmed bookings keyed by confirmation number, plus failure switches
/// for exercising compensation paths.
#[derive(Clone)]
pub(crate) struct Ledger<T> {
    prefix: &'static str,
    state: Arc<RwLock<LedgerState<T>>>,
}

impl<T: Clone + Send + Sync> Ledger<T> {
    pub(crate) fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            state: Arc::new(RwLock::new(LedgerState {
                entries: HashMap::new(),
                next_id: 0,
                fail_on_book: false,
                fail_on_cancel: false,
                delay: Duration::ZERO,
            })),
        }
    }

    pub(crate) async fn set_fail_on_book(&self, fail: bool) {
        self.state.write().await.fail_on_book = fail;
    }

    pub(crate) async fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().await.fail_on_cancel = fail;
    }

    pub(crate) async fn set_delay(&self, delay: Duration) {
        self.state.write().await.delay = delay;
    }

    /// Records `entry` and returns its confirmation number, e.g. `FL-0001`.
    pub(crate) async fn book(&self, entry: T, declined: &str) -> Result<String, String> {
        self.wait().await;
        let mut state = self.state.write().await;
        if state.fail_on_book {
            return Err(declined.to_string());
        }

        state.next_id += 1;
        let confirmation = format!("{}-{:04}", self.prefix, state.next_id);
        state.entries.insert(confirmation.clone(), entry);
        Ok(confirmation)
    }

    pub(crate) async fn cancel(&self, confirmation: &str) -> Result<(), String> {
        self.wait().await;
        let mut state = self.state.write().await;
        if state.fail_on_cancel {
            return Err(format!("cancellation of {confirmation} rejected"));
        }
        match state.entries.remove(confirmation) {
            Some(_) => Ok(()),
            None => Err(format!("unknown confirmation {confirmation}")),
        }
    }

    pub(crate) async fn get(&self, confirmation: &str) -> Option<T> {
        self.state.read().await.entries.get(confirmation).cloned()
    }

    pub(crate) async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    async fn wait(&self) {
        let delay = self.state.read().await.delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

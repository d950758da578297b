//! Mock implementations for auth traits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{ClientCredentials, CredentialExchange, ExchangeError};

type Outcome = Result<String, ExchangeError>;

/// Scripted credential exchange.
///
/// Answers from a queue of outcomes, then repeats a fallback forever.
/// Clones share the script and the call counter, so a test can keep one
/// clone for assertions after moving another into a manager.
#[derive(Debug, Clone)]
pub struct MockCredentialExchange {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    fallback: Arc<Mutex<Outcome>>,
    calls: Arc<AtomicUsize>,
}

impl MockCredentialExchange {
    /// A mock that rejects every request until scripted otherwise.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(Err(rejected()))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a successful exchange returning `token`.
    #[must_use]
    pub fn then_ok(self, token: impl Into<String>) -> Self {
        self.script.lock().push_back(Ok(token.into()));
        self
    }

    /// Queue a rejected exchange.
    #[must_use]
    pub fn then_fail(self) -> Self {
        self.then_err(rejected())
    }

    #[must_use]
    pub fn then_err(self, error: ExchangeError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    /// Answer `token` once the script runs out.
    #[must_use]
    pub fn always(self, token: impl Into<String>) -> Self {
        *self.fallback.lock() = Ok(token.into());
        self
    }

    /// Reject every request once the script runs out.
    #[must_use]
    pub fn always_fail(self) -> Self {
        *self.fallback.lock() = Err(rejected());
        self
    }

    /// Number of exchanges attempted so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCredentialExchange {
    fn default() -> Self {
        Self::new()
    }
}

fn rejected() -> ExchangeError {
    ExchangeError::Rejected { status: 401, body: "unauthorized".to_string() }
}

#[async_trait]
impl CredentialExchange for MockCredentialExchange {
    async fn exchange(&self, _credentials: &ClientCredentials) -> Result<String, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.lock().clone())
    }
}

//! Token lifecycle manager with autonomous renewal
//!
//! Acquires a bearer credential with the `client_credentials` grant and keeps
//! it fresh from a background task:
//! - Fail-fast credential format check before any network call
//! - Renewal scheduled `renew_before` ahead of the token's `exp`
//! - Fixed-interval retry after a failed exchange, bounded by a consecutive
//!   failure count, after which the manager is terminally failed
//! - Read access through a cloneable [`TokenAccessor`], so renewals are
//!   visible to every holder without handing out references
//!
//! ```text
//! Unstarted -> Acquiring -> Valid -> Acquiring (renewal) -> ... -> Failed
//! ```
//!
//! This is the only place in the crate that retries.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::client::ExchangeError;
use super::credential::{ClientCredentials, Credential, CredentialFormat};
use super::traits::CredentialExchange;

/// Error type for token manager operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenManagerError {
    /// Client id or secret does not have the platform's shape.
    #[error("Invalid credential format: {0}")]
    InvalidCredentialFormat(String),

    /// `start` has not been called.
    #[error("Token manager not started")]
    NotStarted,

    /// Started, but no token has been acquired yet.
    #[error("Token acquisition in progress")]
    AcquisitionInProgress,

    #[error("Token manager already running")]
    AlreadyRunning,

    #[error("Credential exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    /// The issued token could not be decoded.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// Retries exhausted; no token will be issued by this run.
    #[error("Token acquisition failed after {attempts} attempts: {last_error}")]
    Terminal { attempts: u32, last_error: String },

    /// The manager was stopped before a token was acquired.
    #[error("Token manager stopped")]
    Cancelled,
}

/// Observable lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Unstarted,
    Acquiring,
    Valid { expires_at: DateTime<Utc> },
    Failed { attempts: u32, last_error: String },
}

/// Timing and retry knobs for the renewal task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalPolicy {
    /// Renew this long before the token's expiry.
    pub renew_before: Duration,
    /// Wait between failed exchange attempts.
    pub retry_interval: Duration,
    /// Consecutive failures tolerated; one more is terminal.
    pub max_failures: u32,
    pub format: CredentialFormat,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            renew_before: Duration::from_secs(60),
            retry_interval: Duration::from_secs(10),
            max_failures: 10,
            format: CredentialFormat::default(),
        }
    }
}

/// Join timeout when stopping the renewal task.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// State shared between the manager, its accessors and the renewal task.
#[derive(Debug)]
struct Shared {
    credential: RwLock<Option<Credential>>,
    state: watch::Sender<TokenState>,
}

impl Shared {
    fn new() -> Self {
        let (state, _) = watch::channel(TokenState::Unstarted);
        Self { credential: RwLock::new(None), state }
    }

    fn set_state(&self, state: TokenState) {
        self.state.send_replace(state);
    }

    /// Commit a fresh credential. The credential is stored before the state
    /// flips to `Valid`, so an observer of `Valid` always reads it.
    fn commit(&self, credential: Credential) {
        let expires_at = credential.expires_at;
        *self.credential.write() = Some(credential);
        self.set_state(TokenState::Valid { expires_at });
    }

    fn reset(&self) {
        *self.credential.write() = None;
        self.set_state(TokenState::Unstarted);
    }

    fn current_token(&self) -> Result<Credential, TokenManagerError> {
        match &*self.state.borrow() {
            TokenState::Unstarted => return Err(TokenManagerError::NotStarted),
            TokenState::Failed { attempts, last_error } => {
                return Err(TokenManagerError::Terminal {
                    attempts: *attempts,
                    last_error: last_error.clone(),
                })
            }
            TokenState::Acquiring | TokenState::Valid { .. } => {}
        }
        self.credential.read().clone().ok_or(TokenManagerError::AcquisitionInProgress)
    }
}

/// Read-only, cloneable view of the managed credential.
///
/// Never blocks: callers that need to wait for the first token use the
/// [`AcquisitionHandle`] returned by [`TokenLifecycleManager::start`] or
/// [`TokenAccessor::subscribe`].
#[derive(Debug, Clone)]
pub struct TokenAccessor {
    shared: Arc<Shared>,
}

impl TokenAccessor {
    /// Latest committed credential.
    ///
    /// # Errors
    /// - [`TokenManagerError::NotStarted`] before `start`
    /// - [`TokenManagerError::AcquisitionInProgress`] until the first token
    /// - [`TokenManagerError::Terminal`] once retries are exhausted
    pub fn current_token(&self) -> Result<Credential, TokenManagerError> {
        self.shared.current_token()
    }

    pub fn state(&self) -> TokenState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TokenState> {
        self.shared.state.subscribe()
    }
}

/// Resolves once per `start`: with the first credential, or with the error
/// that ended the run.
#[derive(Debug)]
pub struct AcquisitionHandle {
    rx: oneshot::Receiver<Result<Credential, TokenManagerError>>,
}

impl AcquisitionHandle {
    pub async fn wait(self) -> Result<Credential, TokenManagerError> {
        self.rx.await.map_err(|_| TokenManagerError::Cancelled)?
    }
}

struct RenewalTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the bearer credential and the task that renews it.
///
/// Dropping the manager cancels the renewal task.
pub struct TokenLifecycleManager<C: CredentialExchange + 'static> {
    exchange: Arc<C>,
    policy: RenewalPolicy,
    shared: Arc<Shared>,
    task: Mutex<Option<RenewalTask>>,
}

impl<C: CredentialExchange + 'static> TokenLifecycleManager<C> {
    #[must_use]
    pub fn new(exchange: C) -> Self {
        Self::with_policy(exchange, RenewalPolicy::default())
    }

    #[must_use]
    pub fn with_policy(exchange: C, policy: RenewalPolicy) -> Self {
        Self {
            exchange: Arc::new(exchange),
            policy,
            shared: Arc::new(Shared::new()),
            task: Mutex::new(None),
        }
    }

    /// Validate `credentials` and spawn the renewal task.
    ///
    /// Must be called from within a Tokio runtime. A manager that stopped or
    /// failed may be started again.
    ///
    /// # Errors
    /// - [`TokenManagerError::InvalidCredentialFormat`] without any network
    ///   call
    /// - [`TokenManagerError::AlreadyRunning`] if a renewal task is live
    pub fn start(
        &self,
        credentials: ClientCredentials,
    ) -> Result<AcquisitionHandle, TokenManagerError> {
        credentials.validate(&self.policy.format)?;

        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return Err(TokenManagerError::AlreadyRunning);
        }

        info!(client_id = %credentials.client_id, "Starting token lifecycle");

        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        *self.shared.credential.write() = None;
        self.shared.set_state(TokenState::Acquiring);

        let handle = tokio::spawn(renewal_loop(
            Arc::clone(&self.exchange),
            credentials,
            Arc::clone(&self.shared),
            self.policy.clone(),
            cancel.clone(),
            tx,
        ));
        *task = Some(RenewalTask { cancel, handle });

        Ok(AcquisitionHandle { rx })
    }

    /// Cancel the renewal task and wait for it to exit. Idempotent.
    pub async fn stop(&self) {
        let Some(RenewalTask { cancel, handle }) = self.task.lock().take() else {
            return;
        };

        info!("Stopping token lifecycle");
        cancel.cancel();

        if tokio::time::timeout(STOP_TIMEOUT, handle).await.is_err() {
            warn!(timeout_secs = STOP_TIMEOUT.as_secs(), "Renewal task did not stop in time");
        }

        self.shared.reset();
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    pub fn accessor(&self) -> TokenAccessor {
        TokenAccessor { shared: Arc::clone(&self.shared) }
    }

    /// See [`TokenAccessor::current_token`].
    pub fn current_token(&self) -> Result<Credential, TokenManagerError> {
        self.shared.current_token()
    }

    pub fn state(&self) -> TokenState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TokenState> {
        self.shared.state.subscribe()
    }

    pub fn policy(&self) -> &RenewalPolicy {
        &self.policy
    }
}

impl<C: CredentialExchange + 'static> Drop for TokenLifecycleManager<C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.cancel.cancel();
        }
    }
}

async fn acquire<C: CredentialExchange>(
    exchange: &C,
    credentials: &ClientCredentials,
) -> Result<Credential, TokenManagerError> {
    let token = exchange.exchange(credentials).await?;
    Credential::from_jwt(token)
}

/// Background task: acquire, sleep until renewal, repeat.
///
/// Owns everything it touches through `Arc`s, so it never depends on the
/// manager value that spawned it.
async fn renewal_loop<C: CredentialExchange>(
    exchange: Arc<C>,
    credentials: ClientCredentials,
    shared: Arc<Shared>,
    policy: RenewalPolicy,
    cancel: CancellationToken,
    first: oneshot::Sender<Result<Credential, TokenManagerError>>,
) {
    let mut first = Some(first);
    let mut failures: u32 = 0;

    loop {
        shared.set_state(TokenState::Acquiring);

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = acquire(exchange.as_ref(), &credentials) => outcome,
        };

        let delay = match outcome {
            Ok(credential) => {
                failures = 0;
                let delay = credential.renewal_delay(Utc::now(), policy.renew_before);
                info!(
                    expires_at = %credential.expires_at,
                    renew_in_secs = delay.as_secs(),
                    "Access token acquired"
                );
                shared.commit(credential.clone());
                if let Some(tx) = first.take() {
                    let _ = tx.send(Ok(credential));
                }
                delay
            }
            Err(err) => {
                failures += 1;
                if failures > policy.max_failures {
                    error!(attempts = failures, error = %err, "Token acquisition failed permanently");
                    let last_error = err.to_string();
                    shared.set_state(TokenState::Failed {
                        attempts: failures,
                        last_error: last_error.clone(),
                    });
                    if let Some(tx) = first.take() {
                        let terminal =
                            TokenManagerError::Terminal { attempts: failures, last_error };
                        let _ = tx.send(Err(terminal));
                    }
                    return;
                }
                warn!(
                    attempt = failures,
                    retry_in_secs = policy.retry_interval.as_secs(),
                    error = %err,
                    "Token acquisition failed; retrying"
                );
                policy.retry_interval
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    if let Some(tx) = first.take() {
        let _ = tx.send(Err(TokenManagerError::Cancelled));
    }
    debug!("Token renewal task cancelled");
}

// ── Verification session ──
//
// Drives one verification back face: fetches a sharing link from the
// owning card, publishes the resulting status and, for non-static
// documents, counts the code down to expiry. Every `load()` starts a new
// generation; results and ticks from older generations are dropped.

use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use docwallet_api::ShareLink;
use futures_util::Stream;
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::context::WalletContext;
use crate::error::CoreError;
use crate::model::{CardModel, CardRef, Localization, VerificationType};
use crate::util::lock;

const TICK: Duration = Duration::from_secs(1);
const SESSION_EVENT_CAPACITY: usize = 32;

const SESSION_TIME_KEY: &str = "document_general_session_time";
const REGISTRY_ERROR_KEY: &str = "document_general_registry_error";
const REGISTRY_ERROR_DESCRIPTION_KEY: &str = "document_general_registry_error_description";
const REGISTRY_ERROR_ICON: &str = "😔";

// ── Status ───────────────────────────────────────────────────────────

/// Generic failure shown on the back face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryError {
    pub icon: String,
    pub title: String,
    pub description: String,
}

impl RegistryError {
    pub fn new(localization: Localization) -> Self {
        Self {
            icon: REGISTRY_ERROR_ICON.to_owned(),
            title: localization.key(REGISTRY_ERROR_KEY),
            description: localization.key(REGISTRY_ERROR_DESCRIPTION_KEY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready {
        link: String,
        barcode: Option<String>,
        /// Code lifetime; `None` for static documents.
        expires_in: Option<Duration>,
    },
    Expired,
    Offline,
    Error(RegistryError),
}

impl SessionStatus {
    /// Whether the face should offer a retry (which calls `load()`).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Expired | Self::Offline | Self::Error(_))
    }
}

/// One countdown step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub remaining_secs: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Status(SessionStatus),
    Tick(Countdown),
}

/// Render the countdown label, e.g. `Code valid for 2:05 min`.
pub fn format_countdown(label: &str, remaining_secs: u64, localization: Localization) -> String {
    let minutes = (remaining_secs / 60) % 60;
    let seconds = remaining_secs % 60;
    let unit = match localization {
        Localization::En => "min",
        Localization::Ua => "хв",
    };
    format!("{label} {minutes}:{seconds:02} {unit}")
}

// ── Session ──────────────────────────────────────────────────────────

/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct VerificationSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    card: Weak<dyn CardModel>,
    is_static: bool,
    default_ttl: Duration,
    localization: Localization,
    context: WalletContext,
    status: watch::Sender<SessionStatus>,
    events: broadcast::Sender<SessionEvent>,
    state: Mutex<SessionState>,
}

struct SessionState {
    generation: u64,
    cancelled: bool,
    verification: VerificationType,
    label: String,
    timer: Option<CancellationToken>,
}

impl SessionState {
    /// In-flight requests are left to finish; their results are dropped
    /// by the generation check in `apply`.
    fn stop_countdown(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.cancelled && self.generation == generation
    }
}

impl VerificationSession {
    /// Session for `card`. Holds the card weakly; a dropped card makes
    /// `load()` a no-op.
    pub fn new(card: &CardRef, verification: VerificationType, context: WalletContext) -> Self {
        let localization = card.localization();
        let is_static = card.document_type().is_some_and(|t| t.is_static);
        let (status, _) = watch::channel(SessionStatus::Idle);
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);

        Self {
            inner: Arc::new(SessionInner {
                card: Arc::downgrade(card),
                is_static,
                default_ttl: context.config().code_ttl,
                localization,
                context,
                status,
                events,
                state: Mutex::new(SessionState {
                    generation: 0,
                    cancelled: false,
                    verification,
                    label: localization.key(SESSION_TIME_KEY),
                    timer: None,
                }),
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.inner.status.borrow().clone()
    }

    /// Status changes and countdown ticks, in emission order.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Latest status as a `Stream`.
    pub fn status_stream(&self) -> StatusStream {
        StatusStream {
            inner: WatchStream::new(self.inner.status.subscribe()),
        }
    }

    pub fn verification_type(&self) -> VerificationType {
        lock(&self.inner.state).verification
    }

    pub fn is_cancelled(&self) -> bool {
        lock(&self.inner.state).cancelled
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Request a fresh link. Emits `Loading` immediately and supersedes
    /// any earlier request and countdown. Must run inside a Tokio runtime.
    pub fn load(&self) {
        let Some(card) = self.inner.card.upgrade() else {
            debug!("card dropped; verification load ignored");
            return;
        };

        let generation = {
            let mut state = lock(&self.inner.state);
            state.stop_countdown();
            state.generation += 1;
            state.cancelled = false;
            state.generation
        };
        self.inner.set_status(SessionStatus::Loading);

        let Some(request) = card.sharing_request() else {
            warn!(card = card.id(), "card offers no sharing request");
            self.inner.apply(
                generation,
                Err(CoreError::Unsupported {
                    operation: "verification".into(),
                }),
            );
            return;
        };
        drop(card);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = request.await;
            inner.apply(generation, result.map_err(CoreError::from));
        });
    }

    /// Switch between QR and barcode. Brightness follows: raised for a
    /// ready barcode, restored for QR.
    pub fn select_verification_type(&self, verification: VerificationType) {
        lock(&self.inner.state).verification = verification;
        self.inner.sync_brightness();
    }

    /// Tear down: later results and ticks are ignored, the countdown
    /// stops and brightness is restored.
    pub fn cancel(&self) {
        {
            let mut state = lock(&self.inner.state);
            state.cancelled = true;
            state.stop_countdown();
        }
        self.inner.context.brightness().restore();
    }
}

impl SessionInner {
    fn set_status(&self, status: SessionStatus) {
        debug!(%status, "verification status");
        self.status.send_replace(status.clone());
        let _ = self.events.send(SessionEvent::Status(status));
    }

    fn sync_brightness(&self) {
        let wants_raise = {
            let state = lock(&self.state);
            !state.cancelled
                && state.verification == VerificationType::Barcode
                && matches!(*self.status.borrow(), SessionStatus::Ready { .. })
        };
        if wants_raise {
            self.context.brightness().raise();
        } else {
            self.context.brightness().restore();
        }
    }

    fn apply(self: &Arc<Self>, generation: u64, result: Result<ShareLink, CoreError>) {
        {
            let mut state = lock(&self.state);
            if !state.is_current(generation) {
                debug!(generation, current = state.generation, "dropping stale verification result");
                return;
            }

            match result {
                Ok(link) => {
                    let ttl = link.timer_time.map_or(self.default_ttl, Duration::from_secs);
                    self.set_status(SessionStatus::Ready {
                        link: link.link,
                        barcode: link.barcode,
                        expires_in: (!self.is_static).then_some(ttl),
                    });
                    if !self.is_static {
                        if let Some(text) = link.timer_text {
                            state.label = text;
                        }
                        let token = CancellationToken::new();
                        state.timer = Some(token.clone());
                        tokio::spawn(run_countdown(Arc::clone(self), generation, ttl.as_secs(), token));
                    }
                }
                Err(e) if e.is_offline() => {
                    debug!(error = %e, "verification offline");
                    self.set_status(SessionStatus::Offline);
                }
                Err(e) => {
                    warn!(error = %e, "verification failed");
                    self.set_status(SessionStatus::Error(RegistryError::new(self.localization)));
                }
            }
        }
        self.sync_brightness();
    }

    /// One countdown step. Returns `false` once the countdown should stop.
    fn tick(&self, generation: u64, remaining: u64) -> bool {
        let mut state = lock(&self.state);
        if !state.is_current(generation) {
            return false;
        }
        let text = format_countdown(&state.label, remaining, self.localization);
        let _ = self.events.send(SessionEvent::Tick(Countdown {
            remaining_secs: remaining,
            text,
        }));
        if remaining == 0 {
            state.timer = None;
            self.set_status(SessionStatus::Expired);
            return false;
        }
        true
    }
}

async fn run_countdown(inner: Arc<SessionInner>, generation: u64, ttl_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut remaining = ttl_secs;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                remaining = remaining.saturating_sub(1);
                if !inner.tick(generation, remaining) {
                    break;
                }
            }
        }
    }
}

// ── StatusStream ─────────────────────────────────────────────────────

/// `Stream` adapter over the session's status `watch` channel.
pub struct StatusStream {
    inner: WatchStream<SessionStatus>,
}

impl Stream for StatusStream {
    type Item = SessionStatus;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

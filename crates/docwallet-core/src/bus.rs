// ── Documents event bus ──
//
// Broadcast channel connecting the loader, the reordering service, the
// push handler and the collection/stack states. Dropping a
// `Subscription` unsubscribes.

use tokio::sync::broadcast;
use tracing::warn;

use crate::model::{ActionKind, DocTypeCode};

/// Which set of documents the collection is presenting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum DocumentsMode {
    #[default]
    Documents,
    Wallet,
}

/// Notifications exchanged between collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentsEvent {
    /// The loader stored fresh documents.
    DocumentsUpdated,
    /// A secondary document source finished updating.
    SecondaryUpdated,
    /// The user changed the type or stack order.
    Reordered,
    ModeSwitched(DocumentsMode),
    /// A push asked the user to share a document.
    SharingRequestReceived,
    /// A document of this type was just added.
    DocumentAdded(DocTypeCode),
    /// The user tried to add a document that is already in the wallet.
    DocumentExists(DocTypeCode),
    /// An action the selecting card did not handle, for the host.
    ActionRequested(ActionKind),
}

/// Cloneable publisher handle.
#[derive(Debug, Clone)]
pub struct DocumentsBus {
    tx: broadcast::Sender<DocumentsEvent>,
}

impl DocumentsBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to every live subscriber. Returns how many received it.
    pub fn publish(&self, event: DocumentsEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A live subscription. Lagged events are skipped with a warning.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<DocumentsEvent>,
}

impl Subscription {
    /// Wait for the next event. `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<DocumentsEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "documents subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-queued event, if any.
    pub fn try_recv(&mut self) -> Option<DocumentsEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "documents subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

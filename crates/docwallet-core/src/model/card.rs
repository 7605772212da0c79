// ── Card capability contract ──
//
// Every entry in the collection, real document or synthetic "add
// document" card, is a `CardModel`. The collection, stack and action
// router only ever talk to cards through this trait.

use std::fmt;
use std::sync::Arc;

use docwallet_api::ShareLink;
use futures_util::future::BoxFuture;

use super::document::{DocTypeCode, DocumentRecord, DocumentType, Localization};

/// Shared handle to a card. Cards are immutable snapshots; a refresh
/// replaces them wholesale.
pub type CardRef = Arc<dyn CardModel>;

/// A pending verification-link request, owned by the session that
/// awaits it.
pub type SharingFuture = BoxFuture<'static, Result<ShareLink, docwallet_api::Error>>;

/// Grouped card actions; each inner vector is rendered as one section.
pub type ActionGroups = Vec<Vec<CardAction>>;

// ── Placement ────────────────────────────────────────────────────────

/// Where the card is being shown. Cards may offer different actions in
/// the main collection and inside a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Collection,
    Stack,
}

// ── Actions ──────────────────────────────────────────────────────────

/// What an action does when selected.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
pub enum ActionKind {
    FullInfo { card_id: String },
    Translate { card_id: String, to: Localization },
    Rate { doc_type: DocTypeCode },
    Reorder,
    ReorderStack { doc_type: DocTypeCode },
    Faq { category: Option<String> },
    Replacement { card_id: String },
    OpenUrl { url: String },
    AddDocument,
    OpenStack { doc_type: DocTypeCode },
}

/// A titled, selectable action. `title` is a localization key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAction {
    pub title: String,
    pub icon: Option<String>,
    pub kind: ActionKind,
}

impl CardAction {
    pub fn new(title: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            title: title.into(),
            icon: None,
            kind,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Result of offering an action to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The card performed the action itself.
    Handled,
    /// The card does not handle this action; the caller forwards it.
    Unhandled,
}

// ── Error state & back face ──────────────────────────────────────────

/// Error shown on the front of a card instead of live data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPresentation {
    pub title: String,
    pub description: String,
    pub action: Option<CardAction>,
}

/// What flipping a card reveals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackFace {
    /// A live verification session (QR / barcode).
    Verification,
    /// A recovery action in place of a code.
    Recovery(CardAction),
    /// The card cannot be flipped.
    Unavailable,
}

// ── CardModel ────────────────────────────────────────────────────────

/// Capability contract of a card.
///
/// Implementations must be cheap to query: the collection reads ids,
/// records and actions on every refresh and user interaction.
pub trait CardModel: Send + Sync {
    /// Stable identifier within its document type.
    fn id(&self) -> &str;

    /// Key the reordering service sorts members of a stack by.
    fn order_key(&self) -> &str {
        self.id()
    }

    /// Document type of the card; `None` for synthetic cards.
    fn document_type(&self) -> Option<&DocumentType>;

    /// Underlying record; `None` for synthetic cards.
    fn record(&self) -> Option<&DocumentRecord>;

    /// Error shown instead of the document face. Resolved when the card
    /// is built and constant for the card's lifetime.
    fn error_state(&self) -> Option<&ErrorPresentation> {
        None
    }

    fn short_description(&self) -> String {
        self.document_type()
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }

    fn localization(&self) -> Localization {
        self.record()
            .and_then(DocumentRecord::current_localization)
            .unwrap_or_default()
    }

    /// What flipping reveals. Cards in an error state never expose a
    /// live code unless they override this.
    fn back_face(&self) -> BackFace {
        if self.error_state().is_some() {
            BackFace::Unavailable
        } else {
            BackFace::Verification
        }
    }

    /// Start a verification-link request. `None` when the card cannot be
    /// verified.
    fn sharing_request(&self) -> Option<SharingFuture>;

    fn card_actions(&self, placement: Placement) -> ActionGroups;

    fn accessibility_actions(&self, placement: Placement) -> ActionGroups {
        self.card_actions(placement)
    }

    /// Offer an action selected from this card's sheet.
    fn handle_action(&self, _action: &ActionKind) -> ActionOutcome {
        ActionOutcome::Unhandled
    }

    /// Ask the card to refresh its backing data if it is stale.
    fn update_if_needed(&self) {}
}

impl fmt::Debug for dyn CardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardModel")
            .field("id", &self.id())
            .field("type", &self.document_type().map(|t| t.code.as_str()))
            .finish_non_exhaustive()
    }
}

/// Same card snapshot for diffing purposes: same id, same order key and
/// matching records under `comparison`.
pub fn same_card(a: &dyn CardModel, b: &dyn CardModel, comparison: crate::RecordComparison) -> bool {
    if a.id() != b.id() || a.order_key() != b.order_key() {
        return false;
    }
    match (a.record(), b.record()) {
        (Some(ra), Some(rb)) => ra.matches(rb, comparison),
        (None, None) => true,
        _ => false,
    }
}

// ── Collection state ──
//
// The main documents carousel: grouped cards plus the trailing "add
// document" card, the centered index, pending scroll requests and
// routing of user interactions. Owned by a single task; see `driver`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::actions::{ActionRouter, Trigger};
use crate::bus::{DocumentsEvent, DocumentsMode};
use crate::cards::{ADD_DOCUMENT_CARD_ID, AddDocumentCard};
use crate::carousel::Carousel;
use crate::context::WalletContext;
use crate::flip::FlipController;
use crate::model::{ActionKind, CardGroup, CardRef, MultipleOrSingle, Placement};
use crate::services::{DocumentReorderingService, DocumentsLoader, DocumentsProvider};
use crate::view::ViewEvent;

const REACHABILITY_ERROR_KEY: &str = "document_general_reachability_error";

/// Collaborators the collection pulls documents and ordering from.
#[derive(Clone)]
pub struct CollectionDeps {
    pub provider: Arc<dyn DocumentsProvider>,
    pub reordering: Arc<dyn DocumentReorderingService>,
    pub loader: Arc<dyn DocumentsLoader>,
}

pub struct CollectionState {
    context: WalletContext,
    deps: CollectionDeps,
    router: ActionRouter,
    carousel: Carousel,
    pending_scroll: Option<String>,
    visible: bool,
    mode: DocumentsMode,
    view: mpsc::UnboundedSender<ViewEvent>,
}

impl CollectionState {
    pub fn new(
        context: WalletContext,
        deps: CollectionDeps,
        view: mpsc::UnboundedSender<ViewEvent>,
    ) -> Self {
        let router = ActionRouter::new(Placement::Collection, &context);
        Self {
            carousel: Carousel::new(context.clone()),
            context,
            deps,
            router,
            pending_scroll: None,
            visible: false,
            mode: DocumentsMode::default(),
            view,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.carousel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carousel.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&CardGroup> {
        self.carousel.group(index)
    }

    pub fn groups(&self) -> Vec<CardGroup> {
        self.carousel.groups()
    }

    pub fn centered_index(&self) -> Option<usize> {
        self.carousel.centered()
    }

    pub fn flip_controller(&self, index: usize) -> Option<&Arc<FlipController>> {
        self.carousel.flip(index)
    }

    /// Whether the trailing "add document" card is in place.
    pub fn has_additional_card(&self) -> bool {
        self.len()
            .checked_sub(1)
            .and_then(|last| self.carousel.group(last))
            .is_some_and(|g| g.representative().id() == ADD_DOCUMENT_CARD_ID)
    }

    pub fn mode(&self) -> DocumentsMode {
        self.mode
    }

    pub fn pending_scroll(&self) -> Option<&str> {
        self.pending_scroll.as_deref()
    }

    // ── Document set ─────────────────────────────────────────────────

    /// First load of the collection.
    pub fn configure(&mut self) {
        self.deps.reordering.update_orders_if_needed();
        self.refresh();
    }

    /// Rebuild the entries from the provider. Emits `DocumentsUpdated`
    /// only when they differ from what is shown.
    pub fn refresh(&mut self) -> bool {
        let order = self.deps.reordering.doc_types_order();
        let mut groups = self.deps.provider.documents(&order);
        let add: CardRef = Arc::new(AddDocumentCard);
        groups.push(MultipleOrSingle::single(add));

        if self.carousel.replace(groups) {
            info!(entries = self.carousel.len(), mode = %self.mode, "collection updated");
            self.emit(ViewEvent::DocumentsUpdated);
            true
        } else {
            debug!("collection unchanged; render skipped");
            false
        }
    }

    pub fn documents_updated(&mut self) {
        self.refresh();
        self.scroll_pending();
    }

    /// Ancillary per-card state changed; the entries stay as they are.
    pub fn secondary_updated(&self) {
        for group in self.carousel.groups() {
            for card in group.values() {
                card.update_if_needed();
            }
        }
    }

    // ── Visibility ───────────────────────────────────────────────────

    pub fn view_did_appear(&mut self) {
        self.deps.loader.update_if_needed();
        self.scroll_pending();
    }

    /// Hidden collections show every card's front.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.scroll_pending();
        } else {
            self.carousel.hide_all();
        }
    }

    pub fn on_reachability(&self, reachable: bool) {
        let text = (!reachable).then(|| {
            self.context
                .config()
                .default_localization
                .key(REACHABILITY_ERROR_KEY)
        });
        self.emit(ViewEvent::StatusText(text));
    }

    pub fn update_background_image(&self, image: Option<String>) {
        self.emit(ViewEvent::BackgroundImage(image));
    }

    // ── Scrolling ────────────────────────────────────────────────────

    /// External request to show the document of type `code`. Remembered
    /// until it can be honored.
    pub fn process_action(&mut self, code: &str) {
        if !self.scroll_to(code) {
            debug!(code, "scroll deferred");
            self.pending_scroll = Some(code.to_owned());
        }
    }

    /// Scroll to the first entry of type `code`. Fails while hidden or
    /// when no such entry exists.
    pub fn scroll_to(&self, code: &str) -> bool {
        if !self.visible {
            return false;
        }
        let Some(index) = self.carousel.position_of(code) else {
            return false;
        };
        self.emit(ViewEvent::ScrollTo { index });
        true
    }

    fn scroll_pending(&mut self) {
        if let Some(code) = self.pending_scroll.clone() {
            if self.scroll_to(&code) {
                self.pending_scroll = None;
            }
        }
    }

    // ── Interaction ──────────────────────────────────────────────────

    /// The carousel came to rest on `index`.
    pub fn settle(&mut self, index: usize) {
        self.carousel.settle(index);
    }

    /// Tap on a card: center it and flip it.
    pub fn select_item(&mut self, index: usize) {
        if index >= self.carousel.len() {
            return;
        }
        self.carousel.settle(index);
        if let Some(flip) = self.carousel.flip(index) {
            flip.flip(None);
            let face = flip.face();
            self.emit(ViewEvent::Flipped { index, face });
        }
    }

    /// Tap on the stack indicator of a grouped entry.
    pub fn stack_clicked(&self, index: usize) {
        let Some(group) = self.carousel.group(index) else {
            return;
        };
        if group.is_single() {
            return;
        }
        if let Some(doc_type) = group.representative().document_type() {
            self.emit(ViewEvent::OpenStack(doc_type.clone()));
        }
    }

    /// Returns whether anything was presented.
    pub fn context_menu(&self, index: usize) -> bool {
        self.route(index, Trigger::ContextMenu)
    }

    pub fn accessibility_menu(&self, index: usize) -> bool {
        self.route(index, Trigger::AccessibilityMenu)
    }

    fn route(&self, index: usize, trigger: Trigger) -> bool {
        let (Some(group), Some(flip)) = (self.carousel.group(index), self.carousel.flip(index))
        else {
            return false;
        };
        match self.router.resolve(group, flip, trigger) {
            Some(command) => {
                command.dispatch(&self.view);
                true
            }
            None => false,
        }
    }

    // ── Bus ──────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &DocumentsEvent) {
        match event {
            DocumentsEvent::DocumentsUpdated | DocumentsEvent::Reordered => {
                self.documents_updated();
            }
            DocumentsEvent::ModeSwitched(mode) => {
                self.mode = *mode;
                self.documents_updated();
            }
            DocumentsEvent::SecondaryUpdated => self.secondary_updated(),
            DocumentsEvent::SharingRequestReceived => self.emit(ViewEvent::SharingRequestReceived),
            // A new document is shown only if the collection is on
            // screen; nothing is remembered for later.
            DocumentsEvent::DocumentAdded(code) => {
                self.documents_updated();
                self.scroll_to(code.as_str());
            }
            DocumentsEvent::DocumentExists(code) => self.process_action(code.as_str()),
            DocumentsEvent::ActionRequested(ActionKind::OpenStack { doc_type }) => {
                let found = self
                    .carousel
                    .position_of_type(doc_type)
                    .and_then(|i| self.carousel.group(i))
                    .and_then(|g| g.representative().document_type().cloned());
                if let Some(doc_type) = found {
                    self.emit(ViewEvent::OpenStack(doc_type));
                }
            }
            DocumentsEvent::ActionRequested(_) => {}
        }
    }

    /// The screen is going away: every session ends.
    pub fn detach(&mut self) {
        self.visible = false;
        self.carousel.hide_all();
    }

    fn emit(&self, event: ViewEvent) {
        if self.view.send(event).is_err() {
            debug!("view closed; event dropped");
        }
    }
}

// ── Stack state ──
//
// The members of one document type, each as its own entry, in the
// user's stack order. Closes itself once fewer than two members are
// left.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::actions::{ActionRouter, Trigger};
use crate::bus::DocumentsEvent;
use crate::carousel::Carousel;
use crate::context::WalletContext;
use crate::flip::FlipController;
use crate::model::{
    CardGroup, CardRef, DocumentType, MultipleOrSingle, Placement, sort_by_order_keys,
};
use crate::services::{DocumentReorderingService, DocumentsProvider};
use crate::view::ViewEvent;

pub struct StackState {
    doc_type: DocumentType,
    provider: Arc<dyn DocumentsProvider>,
    reordering: Arc<dyn DocumentReorderingService>,
    router: ActionRouter,
    carousel: Carousel,
    view: mpsc::UnboundedSender<ViewEvent>,
}

impl StackState {
    pub fn new(
        doc_type: DocumentType,
        provider: Arc<dyn DocumentsProvider>,
        reordering: Arc<dyn DocumentReorderingService>,
        context: &WalletContext,
        view: mpsc::UnboundedSender<ViewEvent>,
    ) -> Self {
        let router = ActionRouter::new(Placement::Stack, context);
        Self {
            doc_type,
            provider,
            reordering,
            router,
            carousel: Carousel::new(context.clone()),
            view,
        }
    }

    pub fn doc_type(&self) -> &DocumentType {
        &self.doc_type
    }

    pub fn title(&self) -> &str {
        self.doc_type.stack_title()
    }

    pub fn len(&self) -> usize {
        self.carousel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carousel.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&CardGroup> {
        self.carousel.group(index)
    }

    pub fn centered_index(&self) -> Option<usize> {
        self.carousel.centered()
    }

    pub fn flip_controller(&self, index: usize) -> Option<&Arc<FlipController>> {
        self.carousel.flip(index)
    }

    fn members(&self) -> Vec<CardRef> {
        let code = self.doc_type.code.as_str();
        let mut members = self
            .provider
            .documents(std::slice::from_ref(&self.doc_type.code))
            .into_iter()
            .find(|g| {
                g.representative()
                    .document_type()
                    .is_some_and(|t| t.is_same_as(code))
            })
            .map(MultipleOrSingle::into_values)
            .unwrap_or_default();
        sort_by_order_keys(&mut members, &self.reordering.order_for(&self.doc_type.code));
        members
    }

    /// Rebuild the members. A stack left with one member or none asks
    /// its screen to close.
    pub fn refresh(&mut self) {
        let groups: Vec<CardGroup> = self.members().into_iter().map(MultipleOrSingle::single).collect();

        if self.carousel.replace(groups) {
            info!(doc_type = %self.doc_type.code, members = self.carousel.len(), "stack updated");
            self.emit(ViewEvent::DocumentsUpdated);
        }
        if self.carousel.len() <= 1 {
            debug!(doc_type = %self.doc_type.code, "stack too small; closing");
            self.emit(ViewEvent::Close);
        }
    }

    /// Show `groups` as they are, bypassing the provider.
    #[cfg(test)]
    pub(crate) fn seed(&mut self, groups: Vec<CardGroup>) {
        self.carousel.replace(groups);
    }

    pub fn view_did_appear(&self) {
        self.emit(ViewEvent::StackAppeared(self.doc_type.code.clone()));
    }

    pub fn settle(&mut self, index: usize) {
        self.carousel.settle(index);
    }

    /// Flip the member in place. `refresh` only produces single members,
    /// so the group branch covers entries seeded some other way: a
    /// member that is itself a group opens its own stack.
    pub fn select_item(&mut self, index: usize) {
        let Some(group) = self.carousel.group(index) else {
            return;
        };
        if !group.is_single() {
            if let Some(doc_type) = group.representative().document_type() {
                self.emit(ViewEvent::OpenStack(doc_type.clone()));
            }
            return;
        }
        self.carousel.settle(index);
        if let Some(flip) = self.carousel.flip(index) {
            flip.flip(None);
            let face = flip.face();
            self.emit(ViewEvent::Flipped { index, face });
        }
    }

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

    pub fn update_background_image(&self, image: Option<String>) {
        self.emit(ViewEvent::BackgroundImage(image));
    }

    /// Stacks only follow reorders.
    pub fn handle_event(&mut self, event: &DocumentsEvent) {
        if *event == DocumentsEvent::Reordered {
            self.refresh();
        }
    }

    pub fn detach(&mut self) {
        self.carousel.hide_all();
    }

    fn emit(&self, event: ViewEvent) {
        if self.view.send(event).is_err() {
            debug!("stack view closed; event dropped");
        }
    }
}

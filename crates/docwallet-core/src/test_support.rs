// Test doubles shared by the unit tests of this crate.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use docwallet_api::{Error as ApiError, ShareLink};
use futures_util::FutureExt;
use tokio::sync::oneshot;

use crate::config::WalletConfig;
use crate::context::{ScreenBrightness, WalletContext};
use crate::model::{
    ActionGroups, ActionKind, ActionOutcome, BackFace, CardAction, CardGroup, CardModel, CardRef,
    DocTypeCode, DocumentRecord, DocumentType, ErrorPresentation, Localization, Placement,
    SharingFuture, StoredDocuments, group_by_type,
};
use crate::services::{
    DocumentsLoader, DocumentsProvider, DriverLicenseStorage, ReservePhotoService, SharingApi,
};

pub(crate) type ShareResult = Result<ShareLink, ApiError>;

/// Let spawned tasks run to their next await point.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub(crate) fn context_with(backend: Arc<CountingBrightness>) -> WalletContext {
    WalletContext::new(WalletConfig::default(), backend)
}

// ── Brightness ───────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct CountingBrightness {
    increases: AtomicUsize,
    resets: AtomicUsize,
}

impl CountingBrightness {
    pub(crate) fn increases(&self) -> usize {
        self.increases.load(Ordering::SeqCst)
    }

    pub(crate) fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl ScreenBrightness for CountingBrightness {
    fn increase(&self) {
        self.increases.fetch_add(1, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Cards ────────────────────────────────────────────────────────────

enum Response {
    Ready(ShareResult),
    Deferred(oneshot::Receiver<ShareResult>),
    Pending,
}

pub(crate) struct MockCard {
    id: String,
    doc_type: Option<DocumentType>,
    record: Option<DocumentRecord>,
    error: Option<ErrorPresentation>,
    back_face: Option<BackFace>,
    actions: ActionGroups,
    accessibility: Option<ActionGroups>,
    handles: Vec<ActionKind>,
    sharing: bool,
    responses: Mutex<VecDeque<Response>>,
    pub(crate) handled: Mutex<Vec<ActionKind>>,
    pub(crate) updates: AtomicUsize,
}

impl MockCard {
    /// A card of `doc_type`; an empty type makes an untyped card.
    pub(crate) fn new(id: &str, doc_type: &str) -> Self {
        let typed = !doc_type.is_empty();
        Self {
            id: id.to_owned(),
            doc_type: typed.then(|| DocumentType::new(doc_type, doc_type)),
            record: typed.then(|| DocumentRecord::new(id, format!("N-{id}"), 200)),
            error: None,
            back_face: None,
            actions: Vec::new(),
            accessibility: None,
            handles: Vec::new(),
            sharing: typed,
            responses: Mutex::new(VecDeque::new()),
            handled: Mutex::new(Vec::new()),
            updates: AtomicUsize::new(0),
        }
    }

    pub(crate) fn static_doc(mut self) -> Self {
        self.doc_type = self.doc_type.map(|t| t.with_static(true));
        self
    }

    pub(crate) fn with_status(mut self, status: i32) -> Self {
        if let Some(record) = self.record.as_mut() {
            record.doc_status = status;
        }
        self
    }

    pub(crate) fn with_full_name(mut self, name: &str) -> Self {
        if let Some(record) = self.record.as_mut() {
            record.doc_data.full_name = Some(name.to_owned());
        }
        self
    }

    pub(crate) fn with_error(mut self) -> Self {
        self.error = Some(ErrorPresentation {
            title: "error".into(),
            description: "error description".into(),
            action: None,
        });
        self
    }

    pub(crate) fn with_back_face(mut self, face: BackFace) -> Self {
        self.back_face = Some(face);
        self
    }

    pub(crate) fn with_actions(mut self, actions: ActionGroups) -> Self {
        self.actions = actions;
        self
    }

    pub(crate) fn with_accessibility(mut self, actions: ActionGroups) -> Self {
        self.accessibility = Some(actions);
        self
    }

    pub(crate) fn handling(mut self, kind: ActionKind) -> Self {
        self.handles.push(kind);
        self
    }

    pub(crate) fn without_sharing(mut self) -> Self {
        self.sharing = false;
        self
    }

    pub(crate) fn respond(self, result: ShareResult) -> Self {
        self.responses.lock().unwrap().push_back(Response::Ready(result));
        self
    }

    pub(crate) fn pending_response(self) -> Self {
        self.responses.lock().unwrap().push_back(Response::Pending);
        self
    }

    /// Queue `n` responses the test completes by hand, in request order.
    pub(crate) fn deferred(self, n: usize) -> (Self, Vec<oneshot::Sender<ShareResult>>) {
        let mut senders = Vec::with_capacity(n);
        {
            let mut responses = self.responses.lock().unwrap();
            for _ in 0..n {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                responses.push_back(Response::Deferred(rx));
            }
        }
        (self, senders)
    }

    pub(crate) fn into_ref(self) -> CardRef {
        Arc::new(self)
    }

    pub(crate) fn handled(&self) -> Vec<ActionKind> {
        self.handled.lock().unwrap().clone()
    }
}

impl CardModel for MockCard {
    fn id(&self) -> &str {
        &self.id
    }

    fn document_type(&self) -> Option<&DocumentType> {
        self.doc_type.as_ref()
    }

    fn record(&self) -> Option<&DocumentRecord> {
        self.record.as_ref()
    }

    fn error_state(&self) -> Option<&ErrorPresentation> {
        self.error.as_ref()
    }

    fn back_face(&self) -> BackFace {
        match &self.back_face {
            Some(face) => face.clone(),
            None if self.error.is_some() => BackFace::Unavailable,
            None => BackFace::Verification,
        }
    }

    fn sharing_request(&self) -> Option<SharingFuture> {
        if !self.sharing {
            return None;
        }
        let next = self.responses.lock().unwrap().pop_front();
        Some(match next {
            Some(Response::Ready(result)) => async move { result }.boxed(),
            Some(Response::Deferred(rx)) => {
                async move {
                    rx.await.unwrap_or_else(|_| {
                        Err(ApiError::Status {
                            status: 503,
                            message: "response abandoned".into(),
                        })
                    })
                }
                .boxed()
            }
            Some(Response::Pending) | None => futures_util::future::pending::<ShareResult>().boxed(),
        })
    }

    fn card_actions(&self, _placement: Placement) -> ActionGroups {
        self.actions.clone()
    }

    fn accessibility_actions(&self, placement: Placement) -> ActionGroups {
        self.accessibility
            .clone()
            .unwrap_or_else(|| self.card_actions(placement))
    }

    fn handle_action(&self, action: &ActionKind) -> ActionOutcome {
        if self.handles.contains(action) {
            self.handled.lock().unwrap().push(action.clone());
            ActionOutcome::Handled
        } else {
            ActionOutcome::Unhandled
        }
    }

    fn update_if_needed(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn action(kind: ActionKind) -> CardAction {
    CardAction::new(kind.to_string(), kind)
}

// ── Provider & loader ────────────────────────────────────────────────

/// Provider serving a replaceable list of cards, grouped by type.
#[derive(Default)]
pub(crate) struct MockProvider {
    cards: Mutex<Vec<CardRef>>,
    pub(crate) calls: AtomicUsize,
}

impl MockProvider {
    pub(crate) fn with(cards: Vec<CardRef>) -> Arc<Self> {
        let provider = Self::default();
        *provider.cards.lock().unwrap() = cards;
        Arc::new(provider)
    }

    pub(crate) fn set(&self, cards: Vec<CardRef>) {
        *self.cards.lock().unwrap() = cards;
    }
}

impl DocumentsProvider for MockProvider {
    fn documents(&self, order: &[DocTypeCode]) -> Vec<CardGroup> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let cards = self.cards.lock().unwrap().clone();
        let groups = group_by_type(order, cards);
        if order.is_empty() {
            return groups;
        }
        groups
            .into_iter()
            .filter(|g| {
                g.representative()
                    .document_type()
                    .is_some_and(|t| order.contains(&t.code))
            })
            .collect()
    }
}

#[derive(Default)]
pub(crate) struct MockLoader {
    pub(crate) updates: AtomicUsize,
    pub(crate) need_updates: AtomicUsize,
}

impl DocumentsLoader for MockLoader {
    fn update_if_needed(&self) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn set_need_updates(&self) {
        self.need_updates.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Card services ────────────────────────────────────────────────────

/// Sharing API answering with a link that encodes the request, and
/// recording each request path.
#[derive(Default)]
pub(crate) struct RecordingSharing {
    calls: Mutex<Vec<String>>,
}

impl RecordingSharing {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, path: String, localization: Option<Localization>) -> SharingFuture {
        let query = localization.map_or("default", Localization::as_query);
        let link = format!("https://share/{path}?{query}");
        self.calls.lock().unwrap().push(path);
        async move { Ok(ShareLink::new(link, None, None)) }.boxed()
    }
}

impl SharingApi for RecordingSharing {
    fn share_document(
        &self,
        doc_type: &DocTypeCode,
        document_id: &str,
        localization: Option<Localization>,
    ) -> SharingFuture {
        self.answer(format!("{doc_type}/{document_id}"), localization)
    }

    fn share_driver_license(
        &self,
        document_id: &str,
        localization: Option<Localization>,
    ) -> SharingFuture {
        self.answer(format!("driver-license/{document_id}"), localization)
    }
}

#[derive(Default)]
pub(crate) struct MemoryStorage {
    stored: Mutex<Option<StoredDocuments>>,
}

impl DriverLicenseStorage for MemoryStorage {
    fn driver_license(&self) -> Option<StoredDocuments> {
        self.stored.lock().unwrap().clone()
    }

    fn save_driver_license(&self, documents: StoredDocuments) {
        *self.stored.lock().unwrap() = Some(documents);
    }
}

pub(crate) struct FixedPhoto(pub(crate) Option<String>);

impl ReservePhotoService for FixedPhoto {
    fn reserve_photo(&self) -> Option<String> {
        self.0.clone()
    }
}

// ── In-memory reordering service ──
//
// Keeps the type order and the per-type stack orders in memory and
// announces every change on the documents bus. Synchronization only
// tracks which orders still need pushing; there is no remote here.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::bus::{DocumentsBus, DocumentsEvent};
use crate::model::DocTypeCode;
use crate::services::DocumentReorderingService;
use crate::util::lock;

#[derive(Default)]
struct OrderState {
    types: Vec<DocTypeCode>,
    stacks: HashMap<DocTypeCode, Vec<String>>,
    types_pending: bool,
    stacks_pending: HashSet<DocTypeCode>,
}

pub struct InMemoryReorderingService {
    state: Mutex<OrderState>,
    bus: DocumentsBus,
}

impl InMemoryReorderingService {
    pub fn new(bus: DocumentsBus) -> Self {
        Self {
            state: Mutex::new(OrderState::default()),
            bus,
        }
    }

    pub fn with_types(bus: DocumentsBus, types: Vec<DocTypeCode>) -> Self {
        let service = Self::new(bus);
        lock(&service.state).types = types;
        service
    }

    /// Whether any order is waiting for synchronization.
    pub fn has_pending_sync(&self) -> bool {
        let state = lock(&self.state);
        state.types_pending || !state.stacks_pending.is_empty()
    }
}

impl DocumentReorderingService for InMemoryReorderingService {
    fn doc_types_order(&self) -> Vec<DocTypeCode> {
        lock(&self.state).types.clone()
    }

    fn set_order(&self, order: Vec<DocTypeCode>, synchronize: bool) {
        {
            let mut state = lock(&self.state);
            state.types = order;
            state.types_pending |= synchronize;
        }
        self.bus.publish(DocumentsEvent::Reordered);
    }

    fn order_for(&self, doc_type: &DocTypeCode) -> Vec<String> {
        lock(&self.state)
            .stacks
            .get(doc_type)
            .cloned()
            .unwrap_or_default()
    }

    fn set_order_for(&self, order: Vec<String>, doc_type: &DocTypeCode) {
        {
            let mut state = lock(&self.state);
            state.stacks.insert(doc_type.clone(), order);
            state.stacks_pending.insert(doc_type.clone());
        }
        self.bus.publish(DocumentsEvent::Reordered);
    }

    fn synchronize_if_needed(&self) {
        let mut state = lock(&self.state);
        if !state.types_pending && state.stacks_pending.is_empty() {
            return;
        }
        info!(
            types = state.types_pending,
            stacks = state.stacks_pending.len(),
            "synchronizing document orders"
        );
        state.types_pending = false;
        state.stacks_pending.clear();
    }

    fn clean_synchronized(&self, doc_type: &DocTypeCode) {
        let mut state = lock(&self.state);
        state.stacks.remove(doc_type);
        state.stacks_pending.remove(doc_type);
        debug!(%doc_type, "dropped stored stack order");
    }

    fn update_orders_if_needed(&self) {
        let mut state = lock(&self.state);
        let mut seen = HashSet::new();
        let before = state.types.len();
        state.types.retain(|code| seen.insert(code.clone()));
        if state.types.len() != before {
            debug!(removed = before - state.types.len(), "removed duplicate type codes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> DocTypeCode {
        DocTypeCode::from(s)
    }

    #[test]
    fn set_order_publishes_reordered() {
        let bus = DocumentsBus::new(8);
        let mut sub = bus.subscribe();
        let service = InMemoryReorderingService::new(bus);

        service.set_order(vec![code("passport"), code("driver-license")], true);

        assert_eq!(sub.try_recv(), Some(DocumentsEvent::Reordered));
        assert_eq!(service.doc_types_order(), vec![code("passport"), code("driver-license")]);
        assert!(service.has_pending_sync());
    }

    #[test]
    fn stack_orders_are_per_type_and_synchronize_clears_pending() {
        let service = InMemoryReorderingService::new(DocumentsBus::new(8));
        service.set_order_for(vec!["b".into(), "a".into()], &code("passport"));

        assert_eq!(service.order_for(&code("passport")), vec!["b".to_owned(), "a".to_owned()]);
        assert!(service.order_for(&code("vehicle")).is_empty());

        service.synchronize_if_needed();
        assert!(!service.has_pending_sync());
    }

    #[test]
    fn clean_synchronized_forgets_stack_order() {
        let service = InMemoryReorderingService::new(DocumentsBus::new(8));
        service.set_order_for(vec!["a".into()], &code("passport"));
        service.clean_synchronized(&code("passport"));
        assert!(service.order_for(&code("passport")).is_empty());
        assert!(!service.has_pending_sync());
    }

    #[test]
    fn update_orders_drops_duplicates() {
        let service = InMemoryReorderingService::with_types(
            DocumentsBus::new(8),
            vec![code("a"), code("b"), code("a")],
        );
        service.update_orders_if_needed();
        assert_eq!(service.doc_types_order(), vec![code("a"), code("b")]);
    }
}

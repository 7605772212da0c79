use crate::model::{
    ActionGroups, ActionKind, BackFace, CardAction, CardModel, DocumentRecord, DocumentType,
    Placement, SharingFuture,
};

/// Id of the synthetic card appended after the documents.
pub const ADD_DOCUMENT_CARD_ID: &str = "add-document";

/// Trailing "add document" card. Has no document, no back face and no
/// context menu; its accessibility menu offers adding and reordering.
#[derive(Debug, Default)]
pub struct AddDocumentCard;

impl CardModel for AddDocumentCard {
    fn id(&self) -> &str {
        ADD_DOCUMENT_CARD_ID
    }

    fn document_type(&self) -> Option<&DocumentType> {
        None
    }

    fn record(&self) -> Option<&DocumentRecord> {
        None
    }

    fn back_face(&self) -> BackFace {
        BackFace::Unavailable
    }

    fn sharing_request(&self) -> Option<SharingFuture> {
        None
    }

    fn card_actions(&self, _placement: Placement) -> ActionGroups {
        Vec::new()
    }

    fn accessibility_actions(&self, _placement: Placement) -> ActionGroups {
        vec![vec![
            CardAction::new("document_add_document", ActionKind::AddDocument),
            CardAction::new("document_general_change_documents_order", ActionKind::Reorder),
        ]]
    }
}

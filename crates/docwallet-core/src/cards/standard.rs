use super::{CardServices, common_actions_tail};
use crate::model::{
    ActionGroups, ActionKind, CardAction, CardModel, DocumentRecord, DocumentType, Placement,
    SharingFuture,
};

/// A document card with no type-specific behavior.
pub struct StandardCard {
    record: DocumentRecord,
    doc_type: DocumentType,
    services: CardServices,
}

impl StandardCard {
    pub fn new(record: DocumentRecord, doc_type: DocumentType, services: CardServices) -> Self {
        Self {
            record,
            doc_type,
            services,
        }
    }
}

impl CardModel for StandardCard {
    fn id(&self) -> &str {
        &self.record.id
    }

    fn order_key(&self) -> &str {
        &self.record.doc_number
    }

    fn document_type(&self) -> Option<&DocumentType> {
        Some(&self.doc_type)
    }

    fn record(&self) -> Option<&DocumentRecord> {
        Some(&self.record)
    }

    fn sharing_request(&self) -> Option<SharingFuture> {
        Some(self.services.sharing.share_document(
            &self.doc_type.code,
            &self.record.id,
            self.record.share_localization,
        ))
    }

    fn card_actions(&self, placement: Placement) -> ActionGroups {
        vec![
            vec![
                CardAction::new(
                    "action_title_full_info",
                    ActionKind::FullInfo {
                        card_id: self.record.id.clone(),
                    },
                )
                .with_icon("ds_docInfo"),
            ],
            common_actions_tail(&self.doc_type, placement),
        ]
    }
}

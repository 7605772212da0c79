// ── Concrete cards ──

mod add_document;
mod driver_license;
mod standard;

use std::sync::Arc;

pub use add_document::{ADD_DOCUMENT_CARD_ID, AddDocumentCard};
pub use driver_license::{DRIVER_LICENSE_CODE, DriverLicenseCard, DriverLicenseStatus, DriverLicenseUrls};
pub use standard::StandardCard;

use crate::bus::DocumentsBus;
use crate::model::{ActionKind, CardAction, CardRef, DocumentRecord, DocumentType, Placement};
use crate::services::{DriverLicenseStorage, ReservePhotoService, SharingApi};

/// Collaborators every document card needs.
#[derive(Clone)]
pub struct CardServices {
    pub sharing: Arc<dyn SharingApi>,
    pub bus: DocumentsBus,
}

/// Builds cards from records, picking the card kind by document type.
#[derive(Clone)]
pub struct CardFactory {
    services: CardServices,
    storage: Arc<dyn DriverLicenseStorage>,
    reserve_photo: Arc<dyn ReservePhotoService>,
    urls: DriverLicenseUrls,
}

impl CardFactory {
    pub fn new(
        services: CardServices,
        storage: Arc<dyn DriverLicenseStorage>,
        reserve_photo: Arc<dyn ReservePhotoService>,
    ) -> Self {
        Self {
            services,
            storage,
            reserve_photo,
            urls: DriverLicenseUrls::default(),
        }
    }

    #[must_use]
    pub fn with_urls(mut self, urls: DriverLicenseUrls) -> Self {
        self.urls = urls;
        self
    }

    pub fn build(&self, doc_type: &DocumentType, record: DocumentRecord) -> CardRef {
        if doc_type.is_same_as(DRIVER_LICENSE_CODE) {
            Arc::new(DriverLicenseCard::new(
                record,
                doc_type.clone(),
                self.services.clone(),
                Arc::clone(&self.storage),
                self.reserve_photo.as_ref(),
                &self.urls,
            ))
        } else {
            Arc::new(StandardCard::new(record, doc_type.clone(), self.services.clone()))
        }
    }
}

/// Last action section shared by all document cards: rate, reorder and
/// FAQ. Inside a stack, reorder applies to the stack's members.
pub(crate) fn common_actions_tail(doc_type: &DocumentType, placement: Placement) -> Vec<CardAction> {
    let reorder = match placement {
        Placement::Collection => {
            CardAction::new("document_general_change_documents_order", ActionKind::Reorder)
        }
        Placement::Stack => CardAction::new(
            "document_general_change_stack_documents_order",
            ActionKind::ReorderStack {
                doc_type: doc_type.code.clone(),
            },
        ),
    };
    vec![
        CardAction::new(
            "document_general_rate",
            ActionKind::Rate {
                doc_type: doc_type.code.clone(),
            },
        )
        .with_icon("ds_rating"),
        reorder.with_icon("ds_reorder"),
        CardAction::new(
            "menu_faq",
            ActionKind::Faq {
                category: doc_type.faq_category_id.clone(),
            },
        )
        .with_icon("ds_faq"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedPhoto, MemoryStorage, RecordingSharing};

    fn factory() -> CardFactory {
        CardFactory::new(
            CardServices {
                sharing: Arc::new(RecordingSharing::default()),
                bus: DocumentsBus::new(4),
            },
            Arc::new(MemoryStorage::default()),
            Arc::new(FixedPhoto(None)),
        )
    }

    #[test]
    fn driver_licence_records_get_the_driver_licence_card() {
        let card = factory().build(
            &DocumentType::new(DRIVER_LICENSE_CODE, "Driver licence"),
            DocumentRecord::new("dl-1", "AAA", 1010),
        );
        assert!(card.error_state().is_some());
        assert_eq!(card.short_description(), "AAA");
    }

    #[test]
    fn other_types_get_the_standard_card() {
        let card = factory().build(
            &DocumentType::new("passport", "Passport"),
            DocumentRecord::new("p-1", "FX1", 1010),
        );
        assert!(card.error_state().is_none());
        assert_eq!(card.short_description(), "Passport");
    }

    #[test]
    fn faq_carries_the_type_category() {
        let mut doc_type = DocumentType::new("passport", "Passport");
        doc_type.faq_category_id = Some("passports".into());
        let tail = common_actions_tail(&doc_type, Placement::Collection);
        assert_eq!(tail[2].kind, ActionKind::Faq {
            category: Some("passports".into())
        });
    }
}

// ── Collaborator contracts ──
//
// Everything the collection depends on but does not own: where
// documents come from, how they are ordered, and how verification links
// are fetched. Hosts plug in real implementations; tests plug in fakes.

use docwallet_api::SharingClient;

use crate::model::{CardGroup, DocTypeCode, Localization, SharingFuture, StoredDocuments};

/// Builds the card groups for the given type order.
pub trait DocumentsProvider: Send + Sync {
    fn documents(&self, order: &[DocTypeCode]) -> Vec<CardGroup>;
}

/// Persisted ordering of document types and of the members of each
/// type's stack.
pub trait DocumentReorderingService: Send + Sync {
    fn doc_types_order(&self) -> Vec<DocTypeCode>;
    fn set_order(&self, order: Vec<DocTypeCode>, synchronize: bool);
    fn order_for(&self, doc_type: &DocTypeCode) -> Vec<String>;
    fn set_order_for(&self, order: Vec<String>, doc_type: &DocTypeCode);
    fn synchronize_if_needed(&self);
    fn clean_synchronized(&self, doc_type: &DocTypeCode);
    fn update_orders_if_needed(&self);
}

/// Background loader of the documents store. Publishes
/// `DocumentsEvent::DocumentsUpdated` on the bus when it stores data.
pub trait DocumentsLoader: Send + Sync {
    fn update_if_needed(&self);
    fn set_need_updates(&self);
}

/// Local storage of the driver licence document.
pub trait DriverLicenseStorage: Send + Sync {
    fn driver_license(&self) -> Option<StoredDocuments>;
    fn save_driver_license(&self, documents: StoredDocuments);
}

/// Backup photo source used when a driver licence arrives without one.
pub trait ReservePhotoService: Send + Sync {
    fn reserve_photo(&self) -> Option<String>;
}

/// Verification-link requests.
pub trait SharingApi: Send + Sync {
    fn share_document(
        &self,
        doc_type: &DocTypeCode,
        document_id: &str,
        localization: Option<Localization>,
    ) -> SharingFuture;

    fn share_driver_license(
        &self,
        document_id: &str,
        localization: Option<Localization>,
    ) -> SharingFuture;
}

impl SharingApi for SharingClient {
    fn share_document(
        &self,
        doc_type: &DocTypeCode,
        document_id: &str,
        localization: Option<Localization>,
    ) -> SharingFuture {
        let client = self.clone();
        let doc_type = doc_type.as_str().to_owned();
        let document_id = document_id.to_owned();
        Box::pin(async move {
            client
                .share_document(&doc_type, &document_id, localization.map(Localization::as_query))
                .await
        })
    }

    fn share_driver_license(
        &self,
        document_id: &str,
        localization: Option<Localization>,
    ) -> SharingFuture {
        let client = self.clone();
        let document_id = document_id.to_owned();
        Box::pin(async move {
            client
                .share_driver_license(&document_id, localization.map(Localization::as_query))
                .await
        })
    }
}

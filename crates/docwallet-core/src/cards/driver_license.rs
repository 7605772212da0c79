// ── Driver licence card ──
//
// Status-driven error presentation, reserve-photo fallback and an
// in-card translate action persisted through `DriverLicenseStorage`.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{CardServices, common_actions_tail};
use crate::bus::DocumentsEvent;
use crate::model::{
    ActionGroups, ActionKind, ActionOutcome, BackFace, CardAction, CardModel, DocumentRecord,
    DocumentType, ErrorPresentation, Localization, Placement, SharingFuture,
};
use crate::services::{DriverLicenseStorage, ReservePhotoService};

/// Document type code of the driver licence.
pub const DRIVER_LICENSE_CODE: &str = "driver-license";

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DriverLicenseStatus {
    Ok,
    NoPhoto,
    OldFormat,
    NeedVerification,
    NotValid,
    Deposited,
    Destroyed,
    Unknown,
}

impl DriverLicenseStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            200 => Self::Ok,
            1010 => Self::NoPhoto,
            1011 => Self::OldFormat,
            1012 => Self::NeedVerification,
            1016 => Self::NotValid,
            1020 => Self::Deposited,
            1050 => Self::Destroyed,
            _ => Self::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 200,
            Self::NoPhoto => 1010,
            Self::OldFormat => 1011,
            Self::NeedVerification => 1012,
            Self::NotValid => 1016,
            Self::Deposited => 1020,
            Self::Destroyed => 1050,
            Self::Unknown => -1,
        }
    }
}

/// External pages the error recovery actions open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverLicenseUrls {
    pub driver_queue: String,
    pub service_center: String,
}

impl Default for DriverLicenseUrls {
    fn default() -> Self {
        Self {
            driver_queue: "https://eq.hsc.gov.ua/".into(),
            service_center: "https://hsc.gov.ua/".into(),
        }
    }
}

fn error_for(
    status: DriverLicenseStatus,
    localization: Localization,
    urls: &DriverLicenseUrls,
    card_id: &str,
) -> Option<ErrorPresentation> {
    let open = |title: &str, url: &str| {
        CardAction::new(localization.key(title), ActionKind::OpenUrl { url: url.to_owned() })
    };
    let (title, description, action) = match status {
        DriverLicenseStatus::NoPhoto => (
            "driver_error_photo",
            "driver_error_photo_descr",
            open("driver_error_action", &urls.driver_queue),
        ),
        DriverLicenseStatus::NeedVerification => (
            "driver_error_need_verification",
            "driver_error_need_verification_descr",
            open("driver_error_to_driver_search_action", &urls.service_center),
        ),
        DriverLicenseStatus::OldFormat => (
            "driver_error_old_format",
            "driver_error_old_format_descr",
            open("driver_error_action", &urls.driver_queue),
        ),
        DriverLicenseStatus::Deposited => (
            "driver_error_deposited",
            "driver_error_deposited_descr",
            open("driver_error_to_driver_search_action", &urls.service_center),
        ),
        DriverLicenseStatus::Destroyed => (
            "driver_error_destroyed",
            "driver_error_destroyed_descr",
            replacement_action(card_id),
        ),
        _ => return None,
    };
    Some(ErrorPresentation {
        title: localization.key(title),
        description: localization.key(description),
        action: Some(action),
    })
}

fn replacement_action(card_id: &str) -> CardAction {
    CardAction::new(
        "driver_license_replacement",
        ActionKind::Replacement {
            card_id: card_id.to_owned(),
        },
    )
    .with_icon("ds_refresh")
}

// ── Card ─────────────────────────────────────────────────────────────

pub struct DriverLicenseCard {
    record: DocumentRecord,
    doc_type: DocumentType,
    status: DriverLicenseStatus,
    photo: Option<String>,
    error: Option<ErrorPresentation>,
    services: CardServices,
    storage: Arc<dyn DriverLicenseStorage>,
}

impl DriverLicenseCard {
    pub fn new(
        record: DocumentRecord,
        doc_type: DocumentType,
        services: CardServices,
        storage: Arc<dyn DriverLicenseStorage>,
        reserve_photo: &dyn ReservePhotoService,
        urls: &DriverLicenseUrls,
    ) -> Self {
        let status = DriverLicenseStatus::from_code(record.doc_status);
        let localization = record.current_localization().unwrap_or_default();

        let photo = record
            .photo()
            .map(str::to_owned)
            .or_else(|| reserve_photo.reserve_photo().filter(|p| !p.is_empty()));

        let error = if status == DriverLicenseStatus::NoPhoto && photo.is_some() {
            debug!(card_id = %record.id, "photo present; no-photo error suppressed");
            None
        } else {
            error_for(status, localization, urls, &record.id)
        };

        Self {
            record,
            doc_type,
            status,
            photo,
            error,
            services,
            storage,
        }
    }

    pub fn status(&self) -> DriverLicenseStatus {
        self.status
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    fn translate(&self, to: Localization) {
        let Some(stored) = self.storage.driver_license() else {
            warn!(card_id = %self.record.id, "no stored driver licence to translate");
            return;
        };
        let mut updated = stored;
        for record in &mut updated.data {
            if record.id == self.record.id {
                record.share_localization = Some(to);
            }
        }
        self.storage.save_driver_license(updated);
        self.services.bus.publish(DocumentsEvent::Reordered);
        debug!(card_id = %self.record.id, %to, "driver licence translated");
    }

    fn common_actions(&self) -> ActionGroups {
        let current = self.record.share_localization;
        let translate_title = if current == Some(Localization::En) {
            "general_translate_ukrainian"
        } else {
            "general_translate_english"
        };
        let to = if current == Some(Localization::En) {
            Localization::Ua
        } else {
            Localization::En
        };
        vec![
            vec![
                CardAction::new(
                    "action_title_full_info",
                    ActionKind::FullInfo {
                        card_id: self.record.id.clone(),
                    },
                )
                .with_icon("ds_docInfo"),
                CardAction::new(
                    translate_title,
                    ActionKind::Translate {
                        card_id: self.record.id.clone(),
                        to,
                    },
                )
                .with_icon(to.key("translate_to")),
            ],
            vec![replacement_action(&self.record.id)],
        ]
    }
}

impl CardModel for DriverLicenseCard {
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

    fn error_state(&self) -> Option<&ErrorPresentation> {
        self.error.as_ref()
    }

    fn short_description(&self) -> String {
        self.record.doc_number.clone()
    }

    fn back_face(&self) -> BackFace {
        match (&self.error, self.status) {
            (None, _) => BackFace::Verification,
            (Some(_), DriverLicenseStatus::Destroyed) => {
                BackFace::Recovery(replacement_action(&self.record.id))
            }
            (Some(_), _) => BackFace::Unavailable,
        }
    }

    fn sharing_request(&self) -> Option<SharingFuture> {
        Some(
            self.services
                .sharing
                .share_driver_license(&self.record.id, self.record.share_localization),
        )
    }

    fn card_actions(&self, placement: Placement) -> ActionGroups {
        let mut actions = self.common_actions();
        actions.push(common_actions_tail(&self.doc_type, placement));
        actions
    }

    fn handle_action(&self, action: &ActionKind) -> ActionOutcome {
        match action {
            ActionKind::Translate { card_id, to } if *card_id == self.record.id => {
                self.translate(*to);
                ActionOutcome::Handled
            }
            _ => ActionOutcome::Unhandled,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bus::DocumentsBus;
    use crate::test_support::{FixedPhoto, MemoryStorage, RecordingSharing};
    use crate::model::{DocumentContent, StoredDocuments};

    fn record(status: i32, photo: Option<&str>) -> DocumentRecord {
        let mut record = DocumentRecord::new("dl-1", "AAA123", status);
        if let Some(image) = photo {
            record.content.push(DocumentContent {
                code: "photo".into(),
                image: image.into(),
            });
        }
        record
    }

    struct Fixture {
        sharing: Arc<RecordingSharing>,
        storage: Arc<MemoryStorage>,
        bus: DocumentsBus,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                sharing: Arc::new(RecordingSharing::default()),
                storage: Arc::new(MemoryStorage::default()),
                bus: DocumentsBus::new(8),
            }
        }

        fn card(&self, record: DocumentRecord, reserve: Option<&str>) -> DriverLicenseCard {
            DriverLicenseCard::new(
                record,
                DocumentType::new(DRIVER_LICENSE_CODE, "Driver licence"),
                CardServices {
                    sharing: self.sharing.clone(),
                    bus: self.bus.clone(),
                },
                self.storage.clone(),
                &FixedPhoto(reserve.map(str::to_owned)),
                &DriverLicenseUrls::default(),
            )
        }
    }

    #[test]
    fn status_codes_round_trip_and_unknown_is_catch_all() {
        for code in [200, 1010, 1011, 1012, 1016, 1020, 1050] {
            assert_eq!(DriverLicenseStatus::from_code(code).code(), code);
        }
        assert_eq!(DriverLicenseStatus::from_code(777), DriverLicenseStatus::Unknown);
    }

    #[test]
    fn no_photo_without_any_photo_shows_the_error() {
        let card = Fixture::new().card(record(1010, None), None);
        let error = card.error_state().unwrap();
        assert_eq!(error.title, "driver_error_photo");
        assert!(matches!(
            error.action.as_ref().map(|a| &a.kind),
            Some(ActionKind::OpenUrl { .. })
        ));
        assert_eq!(card.back_face(), BackFace::Unavailable);
    }

    #[test]
    fn reserve_photo_fills_the_gap_and_clears_no_photo() {
        let card = Fixture::new().card(record(1010, None), Some("reserve=="));
        assert!(card.error_state().is_none());
        assert_eq!(card.photo(), Some("reserve=="));
        assert_eq!(card.back_face(), BackFace::Verification);
    }

    #[test]
    fn record_photo_wins_over_reserve() {
        let card = Fixture::new().card(record(200, Some("own==")), Some("reserve=="));
        assert_eq!(card.photo(), Some("own=="));
    }

    #[test]
    fn english_records_get_english_error_keys() {
        let r = record(1011, None).with_share_localization(Localization::En);
        let card = Fixture::new().card(r, None);
        assert_eq!(card.error_state().unwrap().title, "driver_error_old_format_en");
    }

    #[test]
    fn destroyed_offers_replacement_instead_of_a_code() {
        let card = Fixture::new().card(record(1050, Some("own==")), None);
        assert!(card.error_state().is_some());
        assert!(matches!(
            card.back_face(),
            BackFace::Recovery(CardAction { kind: ActionKind::Replacement { .. }, .. })
        ));
    }

    #[test]
    fn stack_placement_swaps_reorder_for_stack_reorder() {
        let card = Fixture::new().card(record(200, Some("own==")), None);
        let kinds = |p| -> Vec<ActionKind> {
            card.card_actions(p).into_iter().flatten().map(|a| a.kind).collect()
        };
        assert!(kinds(Placement::Collection).contains(&ActionKind::Reorder));
        assert!(kinds(Placement::Stack).contains(&ActionKind::ReorderStack {
            doc_type: DRIVER_LICENSE_CODE.into()
        }));
        assert!(!kinds(Placement::Stack).contains(&ActionKind::Reorder));
    }

    #[test]
    fn translate_persists_and_announces_a_reorder() {
        let fx = Fixture::new();
        fx.storage.save_driver_license(StoredDocuments {
            status: 200,
            expiration_date: None,
            data: vec![record(200, None), DocumentRecord::new("dl-2", "BBB", 200)],
        });
        let mut sub = fx.bus.subscribe();
        let card = fx.card(record(200, Some("own==")), None);

        let to = ActionKind::Translate {
            card_id: "dl-1".into(),
            to: Localization::En,
        };
        assert_eq!(card.handle_action(&to), ActionOutcome::Handled);

        let saved = fx.storage.driver_license().unwrap();
        assert_eq!(saved.data[0].share_localization, Some(Localization::En));
        assert_eq!(saved.data[1].share_localization, None);
        assert_eq!(sub.try_recv(), Some(DocumentsEvent::Reordered));
    }

    #[test]
    fn other_actions_are_left_to_the_host() {
        let card = Fixture::new().card(record(200, None), None);
        assert_eq!(card.handle_action(&ActionKind::Reorder), ActionOutcome::Unhandled);
    }

    #[tokio::test]
    async fn sharing_uses_the_driver_licence_endpoint() {
        let fx = Fixture::new();
        let card = fx.card(record(200, None).with_share_localization(Localization::En), None);

        let link = card.sharing_request().unwrap().await.unwrap();

        assert_eq!(link.link, "https://share/driver-license/dl-1?eng");
        assert_eq!(fx.sharing.calls(), vec!["driver-license/dl-1".to_owned()]);
    }
}

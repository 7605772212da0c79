// ── Domain model ──
//
// Document records, the card capability contract and the one-or-many
// container the collection is built from.

pub mod card;
pub mod document;
pub mod group;

pub use card::{
    ActionGroups, ActionKind, ActionOutcome, BackFace, CardAction, CardModel, CardRef,
    ErrorPresentation, Placement, SharingFuture, same_card,
};
pub use document::{
    DocData, DocTypeCode, DocumentContent, DocumentRecord, DocumentType, FrontCard, Localization,
    PHOTO_CONTENT_CODE, StoredDocuments, VerificationType,
};
pub use group::{CardGroup, MultipleOrSingle, group_by_type, sort_by_order_keys};

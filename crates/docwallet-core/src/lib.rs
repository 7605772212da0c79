//! Presentation state machine of the documents wallet.
//!
//! This crate owns everything between the document store and a view
//! layer, without owning any rendering:
//!
//! - **[`CollectionState`]**: the main carousel. Groups cards by
//!   document type, appends the "add document" card, skips re-renders
//!   when a refresh yields the same snapshot, and routes taps, context
//!   menus and deep-link scrolls.
//!
//! - **[`StackState`]**: the members of a single document type, in the
//!   user's stack order. Closes its screen once one member or none is
//!   left.
//!
//! - **[`VerificationSession`]**: the QR/barcode back face of a card:
//!   fetches a share link and counts down to expiry. Failures become
//!   offline or registry errors; superseded or cancelled loads never
//!   touch its status.
//!
//! - **[`ActionRouter`]**: turns a long press or accessibility request
//!   into "open stack", an [`ActionSheet`], or nothing.
//!
//! - **[`CardModel`]**: the capability contract every card implements,
//!   with [`cards`] providing the driver licence, standard and
//!   add-document cards.
//!
//! Process-wide services (configuration, screen brightness, the
//! [`DocumentsBus`]) travel in a [`WalletContext`] passed to constructors.
//! [`driver`] runs a collection or stack on its own task.

pub mod actions;
pub mod bus;
pub mod cards;
pub mod carousel;
pub mod collection;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod flip;
pub mod model;
pub mod reordering;
pub mod services;
pub mod session;
pub mod stack;
pub mod view;

mod util;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use actions::{ActionRouter, ActionSheet, CodeToggle, Command, Selection, Trigger};
pub use bus::{DocumentsBus, DocumentsEvent, DocumentsMode, Subscription};
pub use cards::{CardFactory, CardServices};
pub use collection::{CollectionDeps, CollectionState};
pub use config::{RecordComparison, WalletConfig};
pub use context::{BrightnessController, NoopBrightness, ScreenBrightness, WalletContext};
pub use driver::{CollectionInput, StackInput, spawn_collection_task, spawn_stack_task};
pub use error::CoreError;
pub use flip::{Face, FlipController};
pub use reordering::InMemoryReorderingService;
pub use services::{
    DocumentReorderingService, DocumentsLoader, DocumentsProvider, DriverLicenseStorage,
    ReservePhotoService, SharingApi,
};
pub use session::{
    Countdown, RegistryError, SessionEvent, SessionStatus, StatusStream, VerificationSession,
};
pub use stack::StackState;
pub use view::ViewEvent;

// ── Model re-exports ────────────────────────────────────────────────
pub use model::{
    ActionKind, BackFace, CardAction, CardGroup, CardModel, CardRef, DocTypeCode, DocumentRecord,
    DocumentType, Localization, MultipleOrSingle, Placement, VerificationType,
};

// ── View events ──
//
// Everything the collection and stack states ask their view to do.
// Delivered over an unbounded channel so state transitions never wait
// on rendering.

use crate::actions::ActionSheet;
use crate::flip::Face;
use crate::model::{DocTypeCode, DocumentType};

#[derive(Debug)]
pub enum ViewEvent {
    /// The entries changed; re-render from the state's snapshot.
    DocumentsUpdated,
    /// Scroll the carousel to `index`.
    ScrollTo { index: usize },
    /// A card's face changed.
    Flipped { index: usize, face: Face },
    OpenStack(DocumentType),
    /// Dismiss the stack screen.
    Close,
    PresentActionSheet(ActionSheet),
    /// Connectivity banner text; `None` hides it.
    StatusText(Option<String>),
    /// A push asked the user to share; the view shows its prompt.
    SharingRequestReceived,
    BackgroundImage(Option<String>),
    /// The stack for this type became visible.
    StackAppeared(DocTypeCode),
}

// ── Card flip controller ──
//
// Owns the face a card shows and, while the verification back face is
// up, the session behind it. Hiding the back face always tears the
// session down.

use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use crate::context::WalletContext;
use crate::model::{BackFace, CardAction, CardModel, CardRef, VerificationType};
use crate::session::VerificationSession;
use crate::util::lock;

/// The face a card currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Face {
    Front,
    Verification(VerificationType),
    Recovery(CardAction),
}

pub struct FlipController {
    card: Weak<dyn CardModel>,
    context: WalletContext,
    state: Mutex<FlipState>,
}

struct FlipState {
    face: Face,
    session: Option<VerificationSession>,
    focused: bool,
}

impl FlipController {
    pub fn new(card: &CardRef, context: WalletContext) -> Arc<Self> {
        Arc::new(Self {
            card: Arc::downgrade(card),
            context,
            state: Mutex::new(FlipState {
                face: Face::Front,
                session: None,
                focused: false,
            }),
        })
    }

    pub fn face(&self) -> Face {
        lock(&self.state).face.clone()
    }

    pub fn is_flipped(&self) -> bool {
        lock(&self.state).face != Face::Front
    }

    /// The live session while the verification face is up.
    pub fn session(&self) -> Option<VerificationSession> {
        lock(&self.state).session.clone()
    }

    /// Flip the card.
    ///
    /// `None` toggles: front to the card's back face (QR by default), any
    /// back face to front. `Some(kind)` makes sure the verification face
    /// shows `kind`, flipping over if needed.
    pub fn flip(&self, verification: Option<VerificationType>) {
        let mut state = lock(&self.state);
        let current = state.face.clone();
        match (current, verification) {
            (Face::Front, requested) => self.show_back(&mut state, requested.unwrap_or_default()),
            (Face::Verification(current), Some(requested)) => {
                if current != requested {
                    if let Some(session) = &state.session {
                        session.select_verification_type(requested);
                    }
                    state.face = Face::Verification(requested);
                }
            }
            (Face::Verification(_) | Face::Recovery(_), None) => Self::hide_back(&mut state),
            (Face::Recovery(_), Some(requested)) => {
                Self::hide_back(&mut state);
                self.show_back(&mut state, requested);
            }
        }
    }

    /// Return to the front face, tearing down any session.
    pub fn show_front(&self) {
        Self::hide_back(&mut lock(&self.state));
    }

    /// Focus follows the carousel center. Losing focus flips back to front.
    pub fn set_focused(&self, focused: bool) {
        let mut state = lock(&self.state);
        state.focused = focused;
        if !focused && state.face != Face::Front {
            debug!("card lost focus; showing front");
            Self::hide_back(&mut state);
        }
    }

    pub fn is_focused(&self) -> bool {
        lock(&self.state).focused
    }

    fn show_back(&self, state: &mut FlipState, verification: VerificationType) {
        let Some(card) = self.card.upgrade() else {
            debug!("card dropped; flip ignored");
            return;
        };
        match card.back_face() {
            BackFace::Verification => {
                let session = VerificationSession::new(&card, verification, self.context.clone());
                session.load();
                state.session = Some(session);
                state.face = Face::Verification(verification);
            }
            BackFace::Recovery(action) => state.face = Face::Recovery(action),
            BackFace::Unavailable => debug!(card = card.id(), "card has no back face"),
        }
    }

    fn hide_back(state: &mut FlipState) {
        if let Some(session) = state.session.take() {
            session.cancel();
        }
        state.face = Face::Front;
    }
}

impl Drop for FlipController {
    fn drop(&mut self) {
        Self::hide_back(&mut lock(&self.state));
    }
}

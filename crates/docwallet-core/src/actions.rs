// ── Action routing ──
//
// Decides what a long press or an accessibility activation on a
// collection entry does: open the stack, present an action sheet, or
// nothing at all.

use std::fmt;
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::debug;

use crate::bus::{DocumentsBus, DocumentsEvent};
use crate::config::WalletConfig;
use crate::context::WalletContext;
use crate::flip::FlipController;
use crate::model::{
    ActionGroups, ActionKind, ActionOutcome, CardAction, CardGroup, CardModel, DocumentType,
    Placement, VerificationType,
};
use crate::view::ViewEvent;

const OPEN_IN_STACK_KEY: &str = "document_open_in_stack_accessibility";

/// How the user asked for actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ContextMenu,
    AccessibilityMenu,
}

/// What the router decided.
#[derive(Debug)]
pub enum Command {
    OpenStack(DocumentType),
    PresentActionSheet(ActionSheet),
}

impl Command {
    /// Hand the command to the view.
    pub fn dispatch(self, view: &mpsc::UnboundedSender<ViewEvent>) {
        let event = match self {
            Self::OpenStack(doc_type) => ViewEvent::OpenStack(doc_type),
            Self::PresentActionSheet(sheet) => ViewEvent::PresentActionSheet(sheet),
        };
        if view.send(event).is_err() {
            debug!("view closed; command dropped");
        }
    }
}

// ── Router ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ActionRouter {
    placement: Placement,
    config: WalletConfig,
    bus: DocumentsBus,
}

impl ActionRouter {
    pub fn new(placement: Placement, context: &WalletContext) -> Self {
        Self {
            placement,
            config: context.config().clone(),
            bus: context.bus().clone(),
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Resolve the command for `group`. `flip` is the representative's
    /// flip controller; the sheet only keeps a weak handle to it.
    pub fn resolve(
        &self,
        group: &CardGroup,
        flip: &Arc<FlipController>,
        trigger: Trigger,
    ) -> Option<Command> {
        let card = group.representative();

        if !group.is_single() {
            let doc_type = card.document_type()?.clone();
            return match (trigger, self.placement) {
                (Trigger::ContextMenu, Placement::Collection) => Some(Command::OpenStack(doc_type)),
                (Trigger::ContextMenu, Placement::Stack) => None,
                (Trigger::AccessibilityMenu, _) => {
                    let open = CardAction::new(
                        OPEN_IN_STACK_KEY,
                        ActionKind::OpenStack {
                            doc_type: doc_type.code,
                        },
                    );
                    Some(Command::PresentActionSheet(ActionSheet {
                        groups: vec![vec![open]],
                        code_toggle: None,
                        card: Arc::downgrade(card),
                        bus: self.bus.clone(),
                    }))
                }
            };
        }

        let groups = match trigger {
            Trigger::ContextMenu => card.card_actions(self.placement),
            Trigger::AccessibilityMenu => card.accessibility_actions(self.placement),
        };
        if groups.iter().all(Vec::is_empty) {
            return None;
        }

        let code_toggle = card
            .document_type()
            .filter(|t| self.config.allows_code_action(&t.code))
            .map(|_| CodeToggle {
                flip: Arc::downgrade(flip),
            });

        Some(Command::PresentActionSheet(ActionSheet {
            groups,
            code_toggle,
            card: Arc::downgrade(card),
            bus: self.bus.clone(),
        }))
    }
}

// ── ActionSheet ──────────────────────────────────────────────────────

/// A presented set of actions. Selection goes to the card first; what
/// the card does not handle is published on the bus for the host.
pub struct ActionSheet {
    groups: ActionGroups,
    code_toggle: Option<CodeToggle>,
    card: Weak<dyn CardModel>,
    bus: DocumentsBus,
}

/// Outcome of selecting from a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    HandledByCard,
    Forwarded,
    /// The action is not on this sheet.
    Ignored,
}

impl ActionSheet {
    pub fn groups(&self) -> &ActionGroups {
        &self.groups
    }

    pub fn code_toggle(&self) -> Option<&CodeToggle> {
        self.code_toggle.as_ref()
    }

    pub fn select(&self, kind: &ActionKind) -> Selection {
        if !self.groups.iter().flatten().any(|a| &a.kind == kind) {
            return Selection::Ignored;
        }
        if let Some(card) = self.card.upgrade() {
            if card.handle_action(kind) == ActionOutcome::Handled {
                return Selection::HandledByCard;
            }
        }
        debug!(action = %kind, "forwarding action");
        self.bus.publish(DocumentsEvent::ActionRequested(kind.clone()));
        Selection::Forwarded
    }
}

impl fmt::Debug for ActionSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSheet")
            .field("groups", &self.groups)
            .field("code_toggle", &self.code_toggle.is_some())
            .finish_non_exhaustive()
    }
}

/// "Show code" entry of a sheet. Inert once the card's flip controller
/// is gone.
#[derive(Debug, Clone)]
pub struct CodeToggle {
    flip: Weak<FlipController>,
}

impl CodeToggle {
    /// Flip to the requested code. Returns `false` if nothing happened.
    pub fn show(&self, verification: VerificationType) -> bool {
        match self.flip.upgrade() {
            Some(flip) => {
                flip.flip(Some(verification));
                true
            }
            None => {
                debug!("flip controller gone; code toggle inert");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::NoopBrightness;
    use crate::flip::Face;
    use crate::model::{CardRef, DocTypeCode, MultipleOrSingle};
    use crate::test_support::{MockCard, action};

    fn router(placement: Placement, allowed: &[&str]) -> (ActionRouter, DocumentsBus) {
        let config = WalletConfig {
            code_action_allowed_types: allowed.iter().map(|c| DocTypeCode::from(*c)).collect(),
            ..WalletConfig::default()
        };
        let context = WalletContext::new(config, Arc::new(NoopBrightness));
        (ActionRouter::new(placement, &context), context.bus().clone())
    }

    fn sheet(command: Option<Command>) -> ActionSheet {
        match command {
            Some(Command::PresentActionSheet(sheet)) => sheet,
            other => panic!("expected action sheet, got {other:?}"),
        }
    }

    fn actions() -> ActionGroups {
        vec![
            vec![action(ActionKind::FullInfo { card_id: "dl-1".into() })],
            vec![action(ActionKind::Reorder)],
        ]
    }

    #[test]
    fn single_card_gets_its_actions_and_code_toggle_when_allowed() {
        let (router, _bus) = router(Placement::Collection, &["driver-license"]);
        let card = MockCard::new("dl-1", "driver-license").with_actions(actions()).into_ref();
        let flip = FlipController::new(&card, WalletContext::headless());

        let sheet = sheet(router.resolve(&MultipleOrSingle::single(card), &flip, Trigger::ContextMenu));

        assert_eq!(sheet.groups(), &actions());
        assert!(sheet.code_toggle().is_some());
    }

    #[test]
    fn code_toggle_absent_for_types_not_allowed() {
        let (router, _bus) = router(Placement::Collection, &["passport"]);
        let card = MockCard::new("dl-1", "driver-license").with_actions(actions()).into_ref();
        let flip = FlipController::new(&card, WalletContext::headless());

        let sheet = sheet(router.resolve(&MultipleOrSingle::single(card), &flip, Trigger::ContextMenu));

        assert!(sheet.code_toggle().is_none());
    }

    #[test]
    fn empty_action_list_resolves_to_nothing() {
        let (router, _bus) = router(Placement::Collection, &["driver-license"]);
        let card = MockCard::new("dl-1", "driver-license")
            .with_actions(vec![vec![]])
            .into_ref();
        let flip = FlipController::new(&card, WalletContext::headless());

        assert!(
            router
                .resolve(&MultipleOrSingle::single(card), &flip, Trigger::ContextMenu)
                .is_none()
        );
    }

    #[test]
    fn stack_group_context_menu_opens_the_stack_in_the_collection() {
        let (router, _bus) = router(Placement::Collection, &[]);
        let members: Vec<CardRef> = vec![
            MockCard::new("p1", "passport").into_ref(),
            MockCard::new("p2", "passport").into_ref(),
        ];
        let flip = FlipController::new(&members[0], WalletContext::headless());
        let group = MultipleOrSingle::multiple(members);

        let command = router.resolve(&group, &flip, Trigger::ContextMenu);

        assert!(matches!(command, Some(Command::OpenStack(t)) if t.code.as_str() == "passport"));
    }

    #[test]
    fn stack_group_context_menu_does_nothing_inside_a_stack() {
        let (router, _bus) = router(Placement::Stack, &[]);
        let members: Vec<CardRef> = vec![
            MockCard::new("p1", "passport").into_ref(),
            MockCard::new("p2", "passport").into_ref(),
        ];
        let flip = FlipController::new(&members[0], WalletContext::headless());

        let command = router.resolve(&MultipleOrSingle::multiple(members), &flip, Trigger::ContextMenu);

        assert!(command.is_none());
    }

    #[test]
    fn stack_group_accessibility_offers_open_in_stack_only() {
        let (router, bus) = router(Placement::Collection, &["passport"]);
        let mut sub = bus.subscribe();
        let members: Vec<CardRef> = vec![
            MockCard::new("p1", "passport").into_ref(),
            MockCard::new("p2", "passport").into_ref(),
        ];
        let flip = FlipController::new(&members[0], WalletContext::headless());

        let sheet = sheet(router.resolve(
            &MultipleOrSingle::multiple(members),
            &flip,
            Trigger::AccessibilityMenu,
        ));
        let open = ActionKind::OpenStack {
            doc_type: "passport".into(),
        };

        assert_eq!(sheet.groups().len(), 1);
        assert_eq!(sheet.groups()[0][0].kind, open);
        assert!(sheet.code_toggle().is_none());
        assert_eq!(sheet.select(&open), Selection::Forwarded);
        assert_eq!(sub.try_recv(), Some(DocumentsEvent::ActionRequested(open)));
    }

    #[test]
    fn card_handles_first_then_bus_gets_the_rest() {
        let (router, bus) = router(Placement::Collection, &[]);
        let mut sub = bus.subscribe();
        let full_info = ActionKind::FullInfo { card_id: "dl-1".into() };
        let mock = Arc::new(
            MockCard::new("dl-1", "driver-license")
                .with_actions(actions())
                .handling(full_info.clone()),
        );
        let card: CardRef = mock.clone();
        let flip = FlipController::new(&card, WalletContext::headless());

        let sheet = sheet(router.resolve(&MultipleOrSingle::single(card), &flip, Trigger::ContextMenu));

        assert_eq!(sheet.select(&full_info), Selection::HandledByCard);
        assert_eq!(mock.handled(), vec![full_info]);
        assert_eq!(sub.try_recv(), None);

        assert_eq!(sheet.select(&ActionKind::Reorder), Selection::Forwarded);
        assert_eq!(sub.try_recv(), Some(DocumentsEvent::ActionRequested(ActionKind::Reorder)));

        assert_eq!(sheet.select(&ActionKind::AddDocument), Selection::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn code_toggle_flips_while_the_controller_lives() {
        let (router, _bus) = router(Placement::Collection, &["driver-license"]);
        let card = MockCard::new("dl-1", "driver-license")
            .with_actions(actions())
            .pending_response()
            .into_ref();
        let flip = FlipController::new(&card, WalletContext::headless());
        let sheet = sheet(router.resolve(&MultipleOrSingle::single(card), &flip, Trigger::ContextMenu));
        let toggle = sheet.code_toggle().unwrap().clone();

        assert!(toggle.show(VerificationType::Barcode));
        assert_eq!(flip.face(), Face::Verification(VerificationType::Barcode));

        drop(flip);
        assert!(!toggle.show(VerificationType::Qr));
    }
}

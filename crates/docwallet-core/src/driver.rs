// ── State drivers ──
//
// Background tasks that own a `CollectionState` or `StackState` and
// serialize every mutation onto themselves: host inputs, bus events and
// the reachability signal are selected over until cancelled.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::collection::CollectionState;
use crate::context::WalletContext;
use crate::stack::StackState;

/// Host-side inputs to the collection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionInput {
    ViewDidAppear,
    SetVisible(bool),
    Settled(usize),
    Select(usize),
    StackClicked(usize),
    ContextMenu(usize),
    AccessibilityMenu(usize),
    /// Deep-link style request to show a document type.
    ExternalAction(String),
    BackgroundImage(Option<String>),
}

/// Host-side inputs to a stack task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackInput {
    ViewDidAppear,
    Settled(usize),
    Select(usize),
    ContextMenu(usize),
    AccessibilityMenu(usize),
    BackgroundImage(Option<String>),
}

/// Run `state` until `cancel` fires or the host drops its input sender.
/// The task hands the state back when it ends.
pub fn spawn_collection_task(
    mut state: CollectionState,
    context: &WalletContext,
    mut inputs: mpsc::UnboundedReceiver<CollectionInput>,
    mut reachability: watch::Receiver<bool>,
    cancel: CancellationToken,
) -> JoinHandle<CollectionState> {
    let mut events = context.bus().subscribe();
    tokio::spawn(async move {
        state.configure();
        state.on_reachability(*reachability.borrow_and_update());

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                input = inputs.recv() => {
                    let Some(input) = input else { break };
                    apply_collection_input(&mut state, input);
                }
                Some(event) = events.recv() => {
                    debug!(?event, "collection event");
                    state.handle_event(&event);
                }
                Ok(()) = reachability.changed() => {
                    let reachable = *reachability.borrow_and_update();
                    state.on_reachability(reachable);
                }
            }
        }

        state.detach();
        debug!("collection task stopped");
        state
    })
}

fn apply_collection_input(state: &mut CollectionState, input: CollectionInput) {
    match input {
        CollectionInput::ViewDidAppear => state.view_did_appear(),
        CollectionInput::SetVisible(visible) => state.set_visible(visible),
        CollectionInput::Settled(index) => state.settle(index),
        CollectionInput::Select(index) => state.select_item(index),
        CollectionInput::StackClicked(index) => state.stack_clicked(index),
        CollectionInput::ContextMenu(index) => {
            state.context_menu(index);
        }
        CollectionInput::AccessibilityMenu(index) => {
            state.accessibility_menu(index);
        }
        CollectionInput::ExternalAction(code) => state.process_action(&code),
        CollectionInput::BackgroundImage(image) => state.update_background_image(image),
    }
}

pub fn spawn_stack_task(
    mut state: StackState,
    context: &WalletContext,
    mut inputs: mpsc::UnboundedReceiver<StackInput>,
    cancel: CancellationToken,
) -> JoinHandle<StackState> {
    let mut events = context.bus().subscribe();
    tokio::spawn(async move {
        state.refresh();

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                input = inputs.recv() => {
                    let Some(input) = input else { break };
                    match input {
                        StackInput::ViewDidAppear => state.view_did_appear(),
                        StackInput::Settled(index) => state.settle(index),
                        StackInput::Select(index) => state.select_item(index),
                        StackInput::ContextMenu(index) => {
                            state.context_menu(index);
                        }
                        StackInput::AccessibilityMenu(index) => {
                            state.accessibility_menu(index);
                        }
                        StackInput::BackgroundImage(image) => state.update_background_image(image),
                    }
                }
                Some(event) = events.recv() => state.handle_event(&event),
            }
        }

        state.detach();
        debug!(doc_type = %state.doc_type().code, "stack task stopped");
        state
    })
}

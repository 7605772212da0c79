//! `stack`: members of one document type in stack order.

use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use docwallet_core::{StackState, ViewEvent};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::list::{MemberView, status_cell};
use super::{Wallet, drain};

#[derive(Debug, Serialize)]
struct StackMember {
    position: usize,
    #[serde(flatten)]
    member: MemberView,
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Back")]
    back_face: &'static str,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn handle(wallet: &Wallet, doc_type: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let doc_type = wallet.store.snapshot().doc_type(doc_type);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut state = StackState::new(
        doc_type,
        wallet.provider.clone(),
        wallet.reordering.clone(),
        &wallet.context,
        tx,
    );
    state.refresh();
    state.view_did_appear();

    if state.is_empty() {
        return Err(CliError::NotFound {
            resource_type: "document type".into(),
            identifier: state.doc_type().code.to_string(),
        });
    }

    let members: Vec<StackMember> = (0..state.len())
        .filter_map(|i| state.item(i).map(|group| (i, group)))
        .map(|(position, group)| StackMember {
            position,
            member: MemberView::from_card(group.representative()),
        })
        .collect();

    let painter = Painter::new(global.color);
    let rendered = output::render_list(
        global.output,
        &members,
        |m| MemberRow {
            position: m.position,
            id: m.member.id.clone(),
            description: m.member.description.clone(),
            back_face: m.member.back_face,
            status: status_cell(painter, std::slice::from_ref(&m.member)),
        },
        |m| m.member.id.clone(),
    );

    if !global.quiet && matches!(global.output, OutputFormat::Table) {
        eprintln!("{}", painter.dim(state.title()));
    }
    output::print_output(&rendered, global.quiet);

    let closes = drain(&mut rx)
        .iter()
        .any(|event| matches!(event, ViewEvent::Close));
    if closes {
        debug!("stack holds a single document");
        if !global.quiet {
            eprintln!(
                "{}",
                painter.warn("Only one document of this type; the wallet shows it without a stack.")
            );
        }
    }
    Ok(())
}

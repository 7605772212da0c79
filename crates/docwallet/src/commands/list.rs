//! `list`: the collection as the carousel presents it.

use serde::Serialize;
use tabled::Tabled;

use docwallet_core::cards::ADD_DOCUMENT_CARD_ID;
use docwallet_core::{BackFace, CardGroup, CardRef};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::Wallet;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub description: String,
    pub back_face: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MemberView {
    pub fn from_card(card: &CardRef) -> Self {
        Self {
            id: card.id().to_owned(),
            description: card.short_description(),
            back_face: back_face_label(&card.back_face()),
            error: card.error_state().map(|e| e.title.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    pub name: String,
    pub members: Vec<MemberView>,
}

impl EntryView {
    fn from_group(position: usize, group: &CardGroup) -> Self {
        let card = group.representative();
        let doc_type = card.document_type();
        let name = if card.id() == ADD_DOCUMENT_CARD_ID {
            "(add document)".to_owned()
        } else {
            doc_type.map(|t| t.name.clone()).unwrap_or_default()
        };
        Self {
            position,
            doc_type: doc_type.map(|t| t.code.to_string()),
            name,
            members: group.values().iter().map(MemberView::from_card).collect(),
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Type")]
    doc_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Documents")]
    ids: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub(crate) fn back_face_label(face: &BackFace) -> &'static str {
    match face {
        BackFace::Verification => "code",
        BackFace::Recovery(_) => "recovery",
        BackFace::Unavailable => "-",
    }
}

pub(crate) fn status_cell(painter: Painter, members: &[MemberView]) -> String {
    let errors: Vec<&str> = members.iter().filter_map(|m| m.error.as_deref()).collect();
    if errors.is_empty() {
        painter.ok("ok")
    } else {
        painter.error(&errors.join(", "))
    }
}

pub fn handle(wallet: &Wallet, global: &GlobalOpts) -> Result<(), CliError> {
    let (state, _view) = wallet.collection();
    let entries: Vec<EntryView> = state
        .groups()
        .iter()
        .enumerate()
        .map(|(i, group)| EntryView::from_group(i, group))
        .collect();

    let painter = Painter::new(global.color);
    let rendered = output::render_list(
        global.output,
        &entries,
        |e| EntryRow {
            position: e.position,
            doc_type: e.doc_type.clone().unwrap_or_else(|| painter.dim("-")),
            name: e.name.clone(),
            ids: e
                .members
                .iter()
                .map(|m| m.id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            status: status_cell(painter, &e.members),
        },
        |e| {
            e.members
                .iter()
                .map(|m| m.id.as_str())
                .collect::<Vec<_>>()
                .join(",")
        },
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

//! `add-types`: document types the user can still add.

use tabled::Tabled;

use docwallet_api::{DocToAdd, SharingClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DocToAddRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&DocToAdd> for DocToAddRow {
    fn from(doc: &DocToAdd) -> Self {
        Self {
            code: doc.code.clone(),
            name: doc.name.clone(),
        }
    }
}

pub async fn handle(client: &SharingClient, global: &GlobalOpts) -> Result<(), CliError> {
    let docs = client.docs_to_add().await?;
    let rendered = output::render_list(global.output, &docs, |d| DocToAddRow::from(d), |d| d.code.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

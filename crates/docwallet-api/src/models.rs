// Wire types for the sharing endpoints.

use serde::{Deserialize, Serialize};

/// Verification link returned by a share request.
///
/// `timer_time` is the code lifetime in seconds; when absent the caller
/// falls back to its configured default. `timer_text` is the label shown
/// in front of the countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    #[serde(default)]
    pub id: String,
    pub link: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub timer_text: Option<String>,
    #[serde(default)]
    pub timer_time: Option<u64>,
}

impl ShareLink {
    pub fn new(link: impl Into<String>, barcode: Option<String>, timer_time: Option<u64>) -> Self {
        Self {
            id: String::new(),
            link: link.into(),
            barcode,
            timer_text: None,
            timer_time,
        }
    }
}

/// A document type the user may add to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocToAdd {
    pub code: String,
    pub name: String,
}

/// Envelope of the docs-to-add endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsToAddResponse {
    #[serde(default)]
    pub documents: Vec<DocToAdd>,
}

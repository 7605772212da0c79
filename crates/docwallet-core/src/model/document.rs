// ── Document domain types ──
//
// Records as delivered by the documents loader, plus the per-type
// descriptor the collection groups and routes by.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RecordComparison;

// ── DocTypeCode ──────────────────────────────────────────────────────

/// Stable code of a document type, e.g. `driver-license`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocTypeCode(String);

impl DocTypeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocTypeCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DocTypeCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Localization ─────────────────────────────────────────────────────

/// Language a document face (and its shared link) is rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumString)]
pub enum Localization {
    #[default]
    #[serde(rename = "ua")]
    #[strum(to_string = "ua")]
    Ua,
    #[serde(rename = "eng", alias = "en")]
    #[strum(to_string = "eng", serialize = "en")]
    En,
}

impl Localization {
    /// The other language of the pair.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ua => Self::En,
            Self::En => Self::Ua,
        }
    }

    /// Value sent as the `localization` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Ua => "ua",
            Self::En => "eng",
        }
    }

    /// Resolve a localization key for this language. English keys carry
    /// an `_en` suffix.
    pub fn key(self, base: &str) -> String {
        match self {
            Self::Ua => base.to_owned(),
            Self::En => format!("{base}_en"),
        }
    }
}

// ── VerificationType ─────────────────────────────────────────────────

/// Which code a verification back face shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerificationType {
    #[default]
    Qr,
    Barcode,
}

// ── DocumentType ─────────────────────────────────────────────────────

/// Descriptor of a document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub code: DocTypeCode,
    pub name: String,
    /// Title of the stack screen, when it differs from `name`.
    #[serde(default)]
    pub stack_name: Option<String>,
    #[serde(default)]
    pub faq_category_id: Option<String>,
    /// Static documents have codes that never expire.
    #[serde(default)]
    pub is_static: bool,
    /// Other codes that identify the same document type (external links,
    /// push payloads).
    #[serde(default)]
    pub aliases: Vec<DocTypeCode>,
}

impl DocumentType {
    pub fn new(code: impl Into<DocTypeCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            stack_name: None,
            faq_category_id: None,
            is_static: false,
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = DocTypeCode>) -> Self {
        self.aliases = aliases.into_iter().collect();
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Does `code` refer to this document type?
    pub fn is_same_as(&self, code: &str) -> bool {
        self.code.as_str() == code || self.aliases.iter().any(|a| a.as_str() == code)
    }

    pub fn stack_title(&self) -> &str {
        self.stack_name.as_deref().unwrap_or(&self.name)
    }
}

// ── Document record ──────────────────────────────────────────────────

/// A content item attached to a record (photo, signature).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    pub code: String,
    pub image: String,
}

/// Content code of the holder photo.
pub const PHOTO_CONTENT_CODE: &str = "photo";

/// Display data of a record. Only the fields the wallet reads are typed;
/// the rest is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocData {
    #[serde(default)]
    pub doc_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-language front faces of a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontCard {
    #[serde(rename = "UA", default)]
    pub ua: Option<Vec<Value>>,
    #[serde(rename = "EN", default)]
    pub en: Option<Vec<Value>>,
}

/// One document as returned by the documents endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub doc_status: i32,
    pub id: String,
    #[serde(default)]
    pub qr: Option<String>,
    pub doc_number: String,
    #[serde(default)]
    pub content: Vec<DocumentContent>,
    #[serde(default)]
    pub doc_data: DocData,
    #[serde(default)]
    pub data_for_displaying_in_order_configurations: Option<Value>,
    #[serde(default)]
    pub front_card: Option<FrontCard>,
    #[serde(default)]
    pub full_info: Option<Vec<Value>>,
    #[serde(default)]
    pub share_localization: Option<Localization>,
    #[serde(default)]
    pub front_card_background: Option<String>,
}

impl DocumentRecord {
    pub fn new(id: impl Into<String>, doc_number: impl Into<String>, doc_status: i32) -> Self {
        Self {
            doc_status,
            id: id.into(),
            qr: None,
            doc_number: doc_number.into(),
            content: Vec::new(),
            doc_data: DocData::default(),
            data_for_displaying_in_order_configurations: None,
            front_card: None,
            full_info: None,
            share_localization: None,
            front_card_background: None,
        }
    }

    /// Equality on the identifying triple only.
    pub fn identity_eq(&self, other: &Self) -> bool {
        self.id == other.id && self.doc_number == other.doc_number && self.doc_status == other.doc_status
    }

    /// `Full` compares every field, content and QR payload included.
    pub fn matches(&self, other: &Self, comparison: RecordComparison) -> bool {
        match comparison {
            RecordComparison::Full => self == other,
            RecordComparison::Identity => self.identity_eq(other),
        }
    }

    /// The holder photo, if the record carries a non-empty one.
    pub fn photo(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.code == PHOTO_CONTENT_CODE)
            .map(|c| c.image.as_str())
            .filter(|image| !image.is_empty())
    }

    /// Language the record currently presents. An explicit share
    /// localization wins; otherwise whichever front face is populated,
    /// Ukrainian first.
    pub fn current_localization(&self) -> Option<Localization> {
        if self.share_localization.is_some() {
            return self.share_localization;
        }
        let front = self.front_card.as_ref()?;
        let populated = |face: &Option<Vec<Value>>| face.as_ref().is_some_and(|f| !f.is_empty());
        if populated(&front.ua) {
            Some(Localization::Ua)
        } else if populated(&front.en) {
            Some(Localization::En)
        } else {
            None
        }
    }

    /// Copy of this record presented in `localization`.
    pub fn with_share_localization(&self, localization: Localization) -> Self {
        Self {
            share_localization: Some(localization),
            ..self.clone()
        }
    }
}

/// Stored state of a multi-record document (the driver licence storage
/// keeps one of these).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocuments {
    pub status: i32,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub data: Vec<DocumentRecord>,
}

impl StoredDocuments {
    /// Copy with every record presented in `localization`.
    pub fn with_localization(&self, localization: Localization) -> Self {
        Self {
            data: self
                .data
                .iter()
                .map(|r| r.with_share_localization(localization))
                .collect(),
            ..self.clone()
        }
    }
}

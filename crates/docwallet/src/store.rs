//! JSON documents file backing the CLI wallet.
//!
//! The file carries the document types, the records per type code, an
//! optional type order and an optional reserve photo:
//!
//! ```json
//! {
//!   "types":   [{ "code": "driver-license", "name": "Driver licence" }],
//!   "records": { "driver-license": [{ "docStatus": 200, "id": "dl-1", "docNumber": "AAA 1" }] },
//!   "order":   ["driver-license"],
//!   "reservePhoto": "<base64>"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use docwallet_core::cards::DRIVER_LICENSE_CODE;
use docwallet_core::model::{StoredDocuments, group_by_type};
use docwallet_core::{
    CardFactory, CardGroup, CardRef, DocTypeCode, DocumentRecord, DocumentType, DocumentsBus,
    DocumentsEvent, DocumentsLoader, DocumentsProvider, DriverLicenseStorage, ReservePhotoService,
};

use crate::error::CliError;

const STORED_OK_STATUS: i32 = 200;

// ── File format ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsFile {
    #[serde(default)]
    pub types: Vec<DocumentType>,
    #[serde(default)]
    pub records: BTreeMap<DocTypeCode, Vec<DocumentRecord>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<DocTypeCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_photo: Option<String>,
}

impl DocumentsFile {
    pub fn read(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CliError::documents_file(path, e))?;
        serde_json::from_str(&raw).map_err(|e| CliError::documents_file(path, e))
    }

    fn write(&self, path: &Path) -> Result<(), CliError> {
        let rendered = serde_json::to_string_pretty(self)?;
        std::fs::write(path, rendered)?;
        Ok(())
    }

    /// Descriptor for `code`, matching aliases. Codes without a declared
    /// type get a bare descriptor named after the code.
    pub fn doc_type(&self, code: &str) -> DocumentType {
        self.types
            .iter()
            .find(|t| t.is_same_as(code))
            .cloned()
            .unwrap_or_else(|| DocumentType::new(code, code))
    }

    /// Explicit order first, then declared types, then any other record
    /// type, each code once.
    pub fn type_order(&self) -> Vec<DocTypeCode> {
        let mut order: Vec<DocTypeCode> = Vec::new();
        let candidates = self
            .order
            .iter()
            .cloned()
            .chain(self.types.iter().map(|t| t.code.clone()))
            .chain(self.records.keys().map(|code| self.doc_type(code.as_str()).code));
        for code in candidates {
            if !order.contains(&code) {
                order.push(code);
            }
        }
        order
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// In-memory copy of the documents file. Driver licence updates are
/// written back; `DocumentsLoader::update_if_needed` re-reads the file
/// once it has been marked stale.
pub struct FileStore {
    path: PathBuf,
    data: Mutex<DocumentsFile>,
    bus: DocumentsBus,
    stale: AtomicBool,
}

impl FileStore {
    pub fn open(path: &Path, bus: DocumentsBus) -> Result<Self, CliError> {
        let data = DocumentsFile::read(path)?;
        debug!(
            path = %path.display(),
            types = data.records.len(),
            "documents file loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            data: Mutex::new(data),
            bus,
            stale: AtomicBool::new(false),
        })
    }

    pub fn snapshot(&self) -> DocumentsFile {
        self.data().clone()
    }

    fn data(&self) -> MutexGuard<'_, DocumentsFile> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DriverLicenseStorage for FileStore {
    fn driver_license(&self) -> Option<StoredDocuments> {
        let data = self.data();
        let code = data.doc_type(DRIVER_LICENSE_CODE).code;
        data.records.get(&code).map(|records| StoredDocuments {
            status: STORED_OK_STATUS,
            expiration_date: None,
            data: records.clone(),
        })
    }

    fn save_driver_license(&self, documents: StoredDocuments) {
        let mut data = self.data();
        let code = data.doc_type(DRIVER_LICENSE_CODE).code;
        data.records.insert(code, documents.data);
        match data.write(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "driver licence saved"),
            Err(err) => warn!(path = %self.path.display(), error = %err, "could not save driver licence"),
        }
    }
}

impl ReservePhotoService for FileStore {
    fn reserve_photo(&self) -> Option<String> {
        self.data().reserve_photo.clone()
    }
}

impl DocumentsLoader for FileStore {
    fn update_if_needed(&self) {
        if !self.stale.swap(false, Ordering::AcqRel) {
            return;
        }
        let fresh = match DocumentsFile::read(&self.path) {
            Ok(fresh) => fresh,
            Err(err) => {
                warn!(error = %err, "documents reload failed");
                return;
            }
        };
        let changed = {
            let mut data = self.data();
            let changed = *data != fresh;
            *data = fresh;
            changed
        };
        if changed {
            info!(path = %self.path.display(), "documents file changed");
            self.bus.publish(DocumentsEvent::DocumentsUpdated);
        }
    }

    fn set_need_updates(&self) {
        self.stale.store(true, Ordering::Release);
    }
}

// ── Provider ─────────────────────────────────────────────────────────

/// Builds cards for every record in the store.
pub struct FileProvider {
    store: Arc<FileStore>,
    factory: CardFactory,
}

impl FileProvider {
    pub fn new(store: Arc<FileStore>, factory: CardFactory) -> Self {
        Self { store, factory }
    }

    pub fn cards(&self) -> Vec<CardRef> {
        let data = self.store.snapshot();
        data.records
            .iter()
            .flat_map(|(code, records)| {
                let doc_type = data.doc_type(code.as_str());
                records
                    .iter()
                    .map(|record| self.factory.build(&doc_type, record.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl DocumentsProvider for FileProvider {
    fn documents(&self, order: &[DocTypeCode]) -> Vec<CardGroup> {
        group_by_type(order, self.cards())
    }
}

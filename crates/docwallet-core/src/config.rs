// ── Runtime wallet configuration ──
//
// These types tune the collection and verification behavior. They never
// touch disk: the host builds a `WalletConfig` (usually through
// docwallet-config) and hands it to `WalletContext`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{DocTypeCode, Localization};

/// Code lifetime used when the server does not return one.
pub const DEFAULT_CODE_TTL: Duration = Duration::from_secs(180);

/// Capacity of the documents event bus.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// How two snapshots of the same card are compared when deciding whether
/// the collection needs to re-render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordComparison {
    /// Every field of the record participates.
    #[default]
    Full,
    /// Only id, number and status participate.
    Identity,
}

/// Configuration for a wallet instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Fallback lifetime of a verification code.
    pub code_ttl: Duration,
    /// Document types whose action sheet offers the "show code" toggle.
    pub code_action_allowed_types: Vec<DocTypeCode>,
    /// Equality used by the collection diff.
    pub record_comparison: RecordComparison,
    /// Localization used for fixed texts when a card carries none.
    pub default_localization: Localization,
    /// Capacity of the broadcast bus between collaborators.
    pub event_capacity: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            code_ttl: DEFAULT_CODE_TTL,
            code_action_allowed_types: Vec::new(),
            record_comparison: RecordComparison::Full,
            default_localization: Localization::Ua,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl WalletConfig {
    /// Whether cards of this type get the code toggle in their action sheet.
    pub fn allows_code_action(&self, code: &DocTypeCode) -> bool {
        self.code_action_allowed_types.contains(code)
    }
}

// ── Shared wallet context ──
//
// Process-wide resources handed to every state object: configuration,
// the screen brightness controller and the documents bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::bus::DocumentsBus;
use crate::config::WalletConfig;

/// Platform hook for the screen brightness.
pub trait ScreenBrightness: Send + Sync {
    fn increase(&self);
    fn reset(&self);
}

/// Backend for hosts without a screen to brighten.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBrightness;

impl ScreenBrightness for NoopBrightness {
    fn increase(&self) {}
    fn reset(&self) {}
}

/// Tracks whether brightness is currently raised so raise and restore
/// are both idempotent.
pub struct BrightnessController {
    backend: Arc<dyn ScreenBrightness>,
    raised: AtomicBool,
}

impl BrightnessController {
    pub fn new(backend: Arc<dyn ScreenBrightness>) -> Self {
        Self {
            backend,
            raised: AtomicBool::new(false),
        }
    }

    pub fn raise(&self) {
        if !self.raised.swap(true, Ordering::AcqRel) {
            debug!("raising screen brightness");
            self.backend.increase();
        }
    }

    pub fn restore(&self) {
        if self.raised.swap(false, Ordering::AcqRel) {
            debug!("restoring screen brightness");
            self.backend.reset();
        }
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

// ── WalletContext ────────────────────────────────────────────────────

/// Cheaply cloneable via `Arc<ContextInner>`.
#[derive(Clone)]
pub struct WalletContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: WalletConfig,
    brightness: BrightnessController,
    bus: DocumentsBus,
}

impl WalletContext {
    pub fn new(config: WalletConfig, brightness: Arc<dyn ScreenBrightness>) -> Self {
        let bus = DocumentsBus::new(config.event_capacity);
        Self {
            inner: Arc::new(ContextInner {
                config,
                brightness: BrightnessController::new(brightness),
                bus,
            }),
        }
    }

    /// Context with default config and no brightness backend.
    pub fn headless() -> Self {
        Self::new(WalletConfig::default(), Arc::new(NoopBrightness))
    }

    pub fn config(&self) -> &WalletConfig {
        &self.inner.config
    }

    pub fn brightness(&self) -> &BrightnessController {
        &self.inner.brightness
    }

    pub fn bus(&self) -> &DocumentsBus {
        &self.inner.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingBrightness;

    #[test]
    fn raise_and_restore_are_idempotent() {
        let backend = Arc::new(CountingBrightness::default());
        let brightness = BrightnessController::new(backend.clone());

        brightness.restore();
        brightness.raise();
        brightness.raise();
        assert!(brightness.is_raised());
        brightness.restore();
        brightness.restore();

        assert_eq!(backend.increases(), 1);
        assert_eq!(backend.resets(), 1);
        assert!(!brightness.is_raised());
    }
}

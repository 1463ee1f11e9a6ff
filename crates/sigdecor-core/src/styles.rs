//! Overlay stylesheet registration
//!
//! The stylesheet is installed once no matter how many sessions use it.
//! Each user holds a `StyleGuard`; the first guard installs the sheet and
//! dropping the last one removes it again.

use lazy_static::lazy_static;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Rules shared by every decoration overlay
pub const OVERLAY_STYLESHEET: &str = "\
.sigdecor-overlay { position: absolute; pointer-events: none; overflow: visible; user-select: none; }
.sigdecor-overlay .sigdecor-curves { overflow: visible; }
.sigdecor-overlay .sigdecor-label { white-space: nowrap; line-height: 1; }
@media print { .sigdecor-overlay { print-color-adjust: exact; -webkit-print-color-adjust: exact; } }
";

lazy_static! {
    static ref GLOBAL_REGISTRY: StyleRegistry = StyleRegistry::new();
}

#[derive(Debug, Default)]
struct RegistryState {
    active: usize,
    installed: Option<&'static str>,
    installs: usize,
}

/// Reference-counted owner of the overlay stylesheet
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, for hosts that share one document
    pub fn global() -> &'static StyleRegistry {
        &GLOBAL_REGISTRY
    }

    /// Take a registration; installs the stylesheet if this is the first one
    pub fn register(&self) -> StyleGuard {
        let mut state = self.lock();
        state.active += 1;
        if state.installed.is_none() {
            state.installed = Some(OVERLAY_STYLESHEET);
            state.installs += 1;
            debug!("Installed signature overlay stylesheet");
        }
        StyleGuard {
            registry: self.clone(),
        }
    }

    /// Currently installed stylesheet, if any
    pub fn stylesheet(&self) -> Option<&'static str> {
        self.lock().installed
    }

    pub fn is_installed(&self) -> bool {
        self.stylesheet().is_some()
    }

    /// Number of live guards
    pub fn active_registrations(&self) -> usize {
        self.lock().active
    }

    /// How many times the stylesheet has been installed over the registry's lifetime
    pub fn install_count(&self) -> usize {
        self.lock().installs
    }

    fn release(&self) {
        let mut state = self.lock();
        state.active = state.active.saturating_sub(1);
        if state.active == 0 && state.installed.take().is_some() {
            debug!("Removed signature overlay stylesheet");
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // State stays consistent across a panicking holder; keep using it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Live registration; releases on drop
#[derive(Debug)]
pub struct StyleGuard {
    registry: StyleRegistry,
}

impl Drop for StyleGuard {
    fn drop(&mut self) {
        self.registry.release();
    }
}

//! Process-wide canonical layout.
//!
//! Orchestrators that serve one fuzzing run per process can use this slot
//! instead of owning a [`CanonicalSlot`] themselves.

use alloc::sync::Arc;

use crate::instance::InstanceTranslator;
use crate::module::KernelModule;
use crate::registry::{CanonicalRegistry, CanonicalSlot, Error};

/// Global canonical slot
static CANONICAL: CanonicalSlot = CanonicalSlot::new();

/// Build the canonical layout before accepting connections.
pub fn init(modules: &[KernelModule]) -> Result<Arc<CanonicalRegistry>, Error> {
    CANONICAL.init(modules)
}

/// Check if the canonical layout has been built.
pub fn is_initialized() -> bool {
    CANONICAL.is_initialized()
}

/// Get the canonical layout.
pub fn registry() -> Result<Arc<CanonicalRegistry>, Error> {
    CANONICAL.get()
}

/// Register a connecting instance; the first one becomes canonical.
pub fn connect(modules: &[KernelModule]) -> InstanceTranslator {
    CANONICAL.connect(modules)
}

/// Build a translator for an instance after the layout exists.
pub fn instance(modules: &[KernelModule]) -> Result<InstanceTranslator, Error> {
    CANONICAL.instance(modules)
}

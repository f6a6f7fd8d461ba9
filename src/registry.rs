//! Canonical module layout.
//!
//! The canonical layout is the module layout of the first instance to
//! register. It is built once per fuzzing run and shared read-only by every
//! [`InstanceTranslator`] afterwards, since all of them compute their
//! offsets relative to it.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use spin::Once;

use crate::instance::InstanceTranslator;
use crate::locator;
use crate::module::KernelModule;

/// Error types for the canonical layout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The canonical layout has already been built.
    AlreadyInitialized,
    /// The canonical layout has not been built yet.
    NotInitialized,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "Canonical layout already initialized"),
            Self::NotInitialized => write!(f, "Canonical layout not initialized"),
        }
    }
}

impl core::error::Error for Error {}

/// The reference module layout all instances translate to.
#[derive(Debug, Clone)]
pub struct CanonicalRegistry {
    /// Truncated canonical address by module name.
    modules: HashMap<String, u32>,
    /// Sorted truncated canonical addresses.
    keys: Vec<u32>,
}

impl CanonicalRegistry {
    /// Build the canonical layout from a module list.
    ///
    /// Duplicate names keep the last address seen. An empty list disables
    /// module translation for the whole run.
    pub fn new(modules: &[KernelModule]) -> Self {
        let mut names = HashMap::with_capacity(modules.len());
        for module in modules {
            names.insert(module.name.clone(), module.start());
        }
        let keys = locator::sorted_keys(modules.iter().map(KernelModule::start));

        Self {
            modules: names,
            keys,
        }
    }

    /// Canonical (truncated) address of the named module.
    pub fn canonical_addr(&self, name: &str) -> Option<u32> {
        self.modules.get(name).copied()
    }

    /// Sorted canonical module addresses.
    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// Number of named modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether module translation is disabled for this run.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One-time holder of the canonical layout.
///
/// Starts uninitialized and becomes built exactly once, either through an
/// explicit [`init`](Self::init) or through the first [`connect`](Self::connect).
/// Translators can only be created once the layout is built.
pub struct CanonicalSlot {
    layout: Once<Arc<CanonicalRegistry>>,
}

impl CanonicalSlot {
    /// Create an uninitialized slot.
    pub const fn new() -> Self {
        Self { layout: Once::new() }
    }

    /// Check if the canonical layout has been built.
    pub fn is_initialized(&self) -> bool {
        self.layout.is_completed()
    }

    /// Build the canonical layout from `modules`.
    ///
    /// Fails with [`Error::AlreadyInitialized`] if a layout already exists;
    /// the existing layout is left untouched.
    pub fn init(&self, modules: &[KernelModule]) -> Result<Arc<CanonicalRegistry>, Error> {
        let mut built = false;
        let layout = self.layout.call_once(|| {
            built = true;
            build_layout(modules)
        });

        if built {
            Ok(layout.clone())
        } else {
            warn!("canonical layout already initialized, ignoring {} modules", modules.len());
            Err(Error::AlreadyInitialized)
        }
    }

    /// Get the canonical layout.
    pub fn get(&self) -> Result<Arc<CanonicalRegistry>, Error> {
        self.layout.get().cloned().ok_or(Error::NotInitialized)
    }

    /// Register an instance, making it canonical if it is the first.
    ///
    /// Concurrent first connections are serialized; exactly one of them
    /// defines the layout.
    pub fn connect(&self, modules: &[KernelModule]) -> InstanceTranslator {
        let layout = self.layout.call_once(|| build_layout(modules)).clone();
        InstanceTranslator::new(layout, modules)
    }

    /// Build a translator for an instance once the layout exists.
    pub fn instance(&self, modules: &[KernelModule]) -> Result<InstanceTranslator, Error> {
        let layout = self.get()?;
        Ok(InstanceTranslator::new(layout, modules))
    }
}

impl Default for CanonicalSlot {
    fn default() -> Self {
        Self::new()
    }
}

fn build_layout(modules: &[KernelModule]) -> Arc<CanonicalRegistry> {
    let registry = CanonicalRegistry::new(modules);
    if registry.is_empty() {
        info!("canonical layout: no modules, module translation disabled");
    } else {
        info!(
            "canonical layout: {} modules, {:#x} - {:#x}",
            registry.len(),
            registry.keys[0],
            registry.keys[registry.keys.len() - 1]
        );
    }
    Arc::new(registry)
}

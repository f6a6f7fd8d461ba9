//! Per-instance address translation.
//!
//! An [`InstanceTranslator`] maps one instance's module addresses to the
//! canonical layout and back. It keeps two independent offset tables, one
//! keyed by instance addresses and one keyed by canonical addresses, each
//! with its own sorted key sequence for lookup.

use alloc::sync::Arc;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::locator;
use crate::module::{KernelModule, truncate_addr};
use crate::registry::CanonicalRegistry;
use crate::signal::SignalElems;

/// Offset and bound of one module in a translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleOffset {
    /// Signed delta from source-space to destination-space addresses.
    pub offset: i64,
    /// Exclusive end of the module in source space.
    pub end_addr: u32,
}

impl ModuleOffset {
    /// Translate `addr`, wrapping modulo 2^32.
    #[inline]
    pub fn apply(&self, addr: u32) -> u32 {
        (i64::from(addr) + self.offset) as u32
    }
}

type OffsetTable = HashMap<u32, ModuleOffset>;

/// Bidirectional translator between one instance and the canonical layout.
#[derive(Debug, Clone)]
pub struct InstanceTranslator {
    canonical: Arc<CanonicalRegistry>,
    /// Sorted keys of `inst_to_canonical`.
    inst_keys: Vec<u32>,
    /// Sorted keys of `canonical_to_inst`.
    canonical_keys: Vec<u32>,
    inst_to_canonical: OffsetTable,
    canonical_to_inst: OffsetTable,
}

impl InstanceTranslator {
    /// Build the offset tables for an instance.
    ///
    /// Modules the canonical layout does not know by name are left out of
    /// both tables, so their PCs pass through untranslated.
    pub fn new(canonical: Arc<CanonicalRegistry>, modules: &[KernelModule]) -> Self {
        let mut inst_to_canonical = OffsetTable::with_capacity(modules.len());
        let mut canonical_to_inst = OffsetTable::with_capacity(modules.len());

        for module in modules {
            let Some(canonical_addr) = canonical.canonical_addr(&module.name) else {
                warn!(
                    "module {} at {:#x} is not in the canonical layout, not translating it",
                    module.name, module.addr
                );
                continue;
            };
            let inst_addr = module.start();
            let size = truncate_addr(module.size);

            inst_to_canonical.insert(
                inst_addr,
                ModuleOffset {
                    offset: i64::from(canonical_addr) - i64::from(inst_addr),
                    end_addr: inst_addr.wrapping_add(size),
                },
            );
            canonical_to_inst.insert(
                canonical_addr,
                ModuleOffset {
                    offset: i64::from(inst_addr) - i64::from(canonical_addr),
                    end_addr: canonical_addr.wrapping_add(size),
                },
            );
            debug!(
                "module {}: instance {:#x} <-> canonical {:#x}, size {:#x}",
                module.name, inst_addr, canonical_addr, size
            );
        }

        let inst_keys = locator::sorted_keys(inst_to_canonical.keys().copied());
        let canonical_keys = locator::sorted_keys(canonical_to_inst.keys().copied());

        info!(
            "instance translator: {} of {} modules mapped to canonical layout",
            inst_keys.len(),
            modules.len()
        );

        Self {
            canonical,
            inst_keys,
            canonical_keys,
            inst_to_canonical,
            canonical_to_inst,
        }
    }

    /// The canonical layout this translator is bound to.
    pub fn canonical(&self) -> &Arc<CanonicalRegistry> {
        &self.canonical
    }

    /// Number of modules translated for this instance.
    pub fn module_count(&self) -> usize {
        self.inst_keys.len()
    }

    /// Whether translation in either direction is a no-op.
    ///
    /// True for an instance without modules, and for the instance that
    /// defined the canonical layout.
    pub fn is_identity(&self) -> bool {
        self.inst_to_canonical.values().all(|m| m.offset == 0)
            && self.canonical_to_inst.values().all(|m| m.offset == 0)
    }

    /// Whether canonical addresses translate to anything for this instance.
    pub(crate) fn decanonicalizes(&self) -> bool {
        !self.canonical_keys.is_empty()
    }

    /// Translate instance PCs and signal to canonical space, in place.
    pub fn canonicalize<S>(&self, pcs: &mut [u32], signal: &mut S)
    where
        S: SignalElems + ?Sized,
    {
        // Skip conversion if modules are not used.
        if self.inst_keys.is_empty() {
            return;
        }
        convert_pcs(&self.inst_keys, &self.inst_to_canonical, pcs);
        convert_signal(&self.inst_keys, &self.inst_to_canonical, signal);
    }

    /// Translate canonical PCs and signal to this instance's space, in place.
    pub fn decanonicalize<S>(&self, pcs: &mut [u32], signal: &mut S)
    where
        S: SignalElems + ?Sized,
    {
        if self.canonical_keys.is_empty() {
            return;
        }
        convert_pcs(&self.canonical_keys, &self.canonical_to_inst, pcs);
        convert_signal(&self.canonical_keys, &self.canonical_to_inst, signal);
    }

    /// Translate instance PCs to canonical space, in place.
    pub fn canonicalize_pcs(&self, pcs: &mut [u32]) {
        if !self.inst_keys.is_empty() {
            convert_pcs(&self.inst_keys, &self.inst_to_canonical, pcs);
        }
    }

    /// Translate canonical PCs to this instance's space, in place.
    pub fn decanonicalize_pcs(&self, pcs: &mut [u32]) {
        if !self.canonical_keys.is_empty() {
            convert_pcs(&self.canonical_keys, &self.canonical_to_inst, pcs);
        }
    }
}

/// Translate one address, or `None` if it lies outside every module.
#[inline]
fn translate(addr: u32, keys: &[u32], table: &OffsetTable) -> Option<u32> {
    let idx = locator::find_module(addr, keys)?;
    let module = table.get(&keys[idx])?;
    if addr < module.end_addr {
        Some(module.apply(addr))
    } else {
        None
    }
}

fn convert_pcs(keys: &[u32], table: &OffsetTable, pcs: &mut [u32]) {
    for pc in pcs.iter_mut() {
        if let Some(translated) = translate(*pc, keys, table) {
            *pc = translated;
        }
    }
}

/// Signal elements are translated whole, as if they were addresses. The
/// module bits dominate the hash residue, so the residue rides along.
fn convert_signal<S>(keys: &[u32], table: &OffsetTable, signal: &mut S)
where
    S: SignalElems + ?Sized,
{
    for idx in 0..signal.elems().len() {
        let elem = signal.elems()[idx];
        if let Some(translated) = translate(elem, keys, table) {
            signal.update_elem(idx, translated);
        }
    }
}

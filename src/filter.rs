//! Coverage filter translation.
//!
//! A coverage filter is built once in canonical space and has to be moved
//! into each instance's address space before it is shipped to that
//! instance.

use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::instance::InstanceTranslator;

/// Sparse filter: PC to an opaque per-PC value.
pub type CoverFilter = HashMap<u32, u32>;

impl InstanceTranslator {
    /// Translate a canonical filter into this instance's address space.
    ///
    /// Values are kept, keys are translated with the same rule as PCs. If
    /// translation is disabled for this instance or the filter is empty, the
    /// filter is handed back as is. Two canonical PCs landing on the same
    /// instance PC can only happen with overlapping modules; one of the
    /// values survives, which one depends on iteration order.
    pub fn decanonicalize_filter(&self, filter: CoverFilter) -> CoverFilter {
        // Skip conversion if modules or filtering are not used.
        if !self.decanonicalizes() || filter.is_empty() {
            return filter;
        }

        let (mut pcs, vals): (Vec<u32>, Vec<u32>) = filter.into_iter().unzip();
        self.decanonicalize_pcs(&mut pcs);

        let translated: CoverFilter = pcs.into_iter().zip(vals).collect();
        trace!("decanonicalized filter with {} PCs", translated.len());
        translated
    }
}

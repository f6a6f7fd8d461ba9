//! Module lookup by truncated address.
//!
//! Modules are indexed by their sorted start addresses. A lookup returns
//! the module with the greatest start address not above the query; the
//! caller still has to check the module's end address.

use alloc::vec::Vec;

/// Build an ascending key sequence from truncated start addresses.
///
/// Equal start addresses collapse into one key.
pub fn sorted_keys<I>(addrs: I) -> Vec<u32>
where
    I: IntoIterator<Item = u32>,
{
    let mut keys: Vec<u32> = addrs.into_iter().collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Find the index of the module that may contain `addr`.
///
/// Returns `None` if `addr` is below every start address (or `keys` is
/// empty). Otherwise returns the index of the greatest key `<= addr`.
#[inline]
pub fn find_module(addr: u32, keys: &[u32]) -> Option<usize> {
    // First index whose start is strictly above addr.
    keys.partition_point(|&start| start <= addr).checked_sub(1)
}

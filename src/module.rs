//! Kernel module descriptors and the 32-bit address boundary.
//!
//! Module addresses arrive as full 64-bit load addresses, but coverage PCs
//! and signal elements are 32 bits wide. Every address crosses into the
//! translation tables through [`truncate_addr`].

use alloc::string::String;

/// A kernel module as reported by one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelModule {
    /// Module name, identical across instances that load the same module.
    pub name: String,
    /// Instance-specific load address.
    pub addr: u64,
    /// Size of the module in bytes.
    pub size: u64,
}

impl KernelModule {
    /// Create a module descriptor.
    pub fn new(name: &str, addr: u64, size: u64) -> Self {
        Self {
            name: String::from(name),
            addr,
            size,
        }
    }

    /// Truncated start address.
    #[inline]
    pub fn start(&self) -> u32 {
        truncate_addr(self.addr)
    }

    /// Truncated exclusive end address (`addr + size`).
    #[inline]
    pub fn end(&self) -> u32 {
        truncate_addr(self.addr.wrapping_add(self.size))
    }
}

/// Narrow a 64-bit address to the 32-bit coverage address space.
///
/// Only the low 32 bits survive. This is sound only when the high 32 bits
/// are the same for every module being compared, which holds on x86_64 and
/// arm64 kernels without KASLR spreading modules across 4GB windows. If two
/// modules differ in their high bits their translations silently alias;
/// nothing here detects it.
#[inline]
pub const fn truncate_addr(addr: u64) -> u32 {
    addr as u32
}

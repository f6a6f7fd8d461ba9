//! Kernel module address canonicalization for fuzzer coverage.
//!
//! Every fuzzing instance runs the same kernel, but its modules may be
//! loaded at different base addresses. This crate remaps module-relative
//! coverage PCs and signal elements between an instance's address space
//! and one shared canonical address space, fixed by the first instance to
//! register.
//!
//! # Features
//!
//! - `global` - Process-wide canonical slot with free functions (default)
//!
//! # Quick Start
//!
//! ```
//! use covcanon::module::KernelModule;
//! use covcanon::registry::CanonicalSlot;
//! use covcanon::signal::Signal;
//!
//! let slot = CanonicalSlot::new();
//!
//! // The first instance to connect defines the canonical layout.
//! let first = slot.connect(&[KernelModule::new("ext4", 0x20000, 0x5000)]);
//! let second = slot.connect(&[KernelModule::new("ext4", 0x40000, 0x5000)]);
//!
//! let mut pcs = [0x40010];
//! let mut signal = Signal::from_raw(&[0x40aaa], 0).serialize();
//! second.canonicalize(&mut pcs, &mut signal);
//! assert_eq!(pcs, [0x20010]);
//! assert!(signal.deserialize().contains(0x20aaa));
//!
//! // The canonical instance itself is never translated.
//! let mut pcs = [0x20010];
//! first.canonicalize_pcs(&mut pcs);
//! assert_eq!(pcs, [0x20010]);
//! ```

#![no_std]

extern crate alloc;

#[macro_use]
extern crate log;

// =============================================================================
// Address Model
// =============================================================================

pub mod module;

pub mod locator;

// =============================================================================
// Coverage Representation
// =============================================================================

pub mod signal;

// =============================================================================
// Translation
// =============================================================================

pub mod registry;

pub mod instance;

pub mod filter;

// =============================================================================
// Process-wide Slot
// =============================================================================

#[cfg(feature = "global")]
pub mod global;

// Re-export key types for convenience
pub use filter::CoverFilter;
pub use instance::{InstanceTranslator, ModuleOffset};
pub use module::{KernelModule, truncate_addr};
pub use registry::{CanonicalRegistry, CanonicalSlot, Error};
pub use signal::{SerialSignal, Signal, SignalElems};

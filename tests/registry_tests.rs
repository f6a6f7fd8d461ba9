//! Integration tests for the canonical layout.
//!
//! Tests layout construction and the one-time slot lifecycle.

use covcanon::instance::InstanceTranslator;
use covcanon::module::KernelModule;
use covcanon::registry::{CanonicalRegistry, CanonicalSlot, Error};

fn layout() -> Vec<KernelModule> {
    vec![
        KernelModule::new("ext4", 0xffff_ffff_a004_0000, 0x5000),
        KernelModule::new("kvm", 0xffff_ffff_a001_5000, 0x5000),
        KernelModule::new("nf_tables", 0xffff_ffff_a002_0000, 0x10000),
    ]
}

// =============================================================================
// Registry Construction Tests
// =============================================================================

#[test]
fn test_registry_keys_sorted() {
    let registry = CanonicalRegistry::new(&layout());
    assert_eq!(registry.keys(), &[0xa001_5000, 0xa002_0000, 0xa004_0000]);
    assert_eq!(registry.len(), 3);
    assert!(!registry.is_empty());
}

#[test]
fn test_registry_truncated_addr_by_name() {
    let registry = CanonicalRegistry::new(&layout());
    assert_eq!(registry.canonical_addr("kvm"), Some(0xa001_5000));
    assert_eq!(registry.canonical_addr("missing"), None);
}

#[test]
fn test_registry_empty() {
    let registry = CanonicalRegistry::new(&[]);
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.keys().is_empty());
}

#[test]
fn test_registry_duplicate_name_last_wins() {
    let registry = CanonicalRegistry::new(&[
        KernelModule::new("dup", 0x1000, 0x100),
        KernelModule::new("dup", 0x2000, 0x100),
    ]);
    assert_eq!(registry.canonical_addr("dup"), Some(0x2000));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_registry_equal_truncated_addrs() {
    let registry = CanonicalRegistry::new(&[
        KernelModule::new("a", 0x0000_0001_0000_1000, 0x100),
        KernelModule::new("b", 0x0000_0002_0000_1000, 0x100),
    ]);
    assert_eq!(registry.keys(), &[0x1000]);
    assert_eq!(registry.canonical_addr("a"), Some(0x1000));
    assert_eq!(registry.canonical_addr("b"), Some(0x1000));
}

// =============================================================================
// Slot Lifecycle Tests
// =============================================================================

#[test]
fn test_slot_starts_uninitialized() {
    let slot = CanonicalSlot::new();
    assert!(!slot.is_initialized());
    assert_eq!(slot.get().unwrap_err(), Error::NotInitialized);
}

#[test]
fn test_slot_instance_before_init() {
    let slot = CanonicalSlot::new();
    let result = slot.instance(&layout());
    assert!(matches!(result, Err(Error::NotInitialized)));
}

#[test]
fn test_slot_init_once() {
    let slot = CanonicalSlot::new();
    let registry = slot.init(&layout()).unwrap();
    assert!(slot.is_initialized());
    assert_eq!(registry.len(), 3);

    let again = slot.init(&[KernelModule::new("other", 0x1000, 0x100)]);
    assert_eq!(again.unwrap_err(), Error::AlreadyInitialized);

    // The first layout is kept.
    let current = slot.get().unwrap();
    assert_eq!(current.canonical_addr("other"), None);
    assert_eq!(current.canonical_addr("ext4"), Some(0xa004_0000));
}

#[test]
fn test_slot_first_connect_wins() {
    let slot = CanonicalSlot::new();
    let first = slot.connect(&layout());
    assert!(first.is_identity());

    let moved = vec![KernelModule::new("kvm", 0xffff_ffff_a009_0000, 0x5000)];
    let second = slot.connect(&moved);
    assert!(!second.is_identity());
    assert_eq!(second.canonical().canonical_addr("kvm"), Some(0xa001_5000));
    assert_eq!(slot.get().unwrap().len(), 3);
}

#[test]
fn test_slot_instance_after_init() {
    let slot = CanonicalSlot::new();
    slot.init(&layout()).unwrap();
    let translator = slot.instance(&layout()).unwrap();
    assert!(translator.is_identity());
    assert_eq!(translator.module_count(), 3);
}

#[test]
fn test_translators_share_registry() {
    let slot = CanonicalSlot::new();
    let a = slot.connect(&layout());
    let b = slot.connect(&layout());
    assert!(std::sync::Arc::ptr_eq(a.canonical(), b.canonical()));
}

#[test]
fn test_concurrent_first_connect() {
    let slot = std::sync::Arc::new(CanonicalSlot::new());
    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let slot = slot.clone();
            std::thread::spawn(move || {
                slot.connect(&[KernelModule::new("m", 0x1000 * (i + 1), 0x100)]);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(slot.is_initialized());
    assert_eq!(slot.get().unwrap().len(), 1);
}

#[test]
fn test_translator_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InstanceTranslator>();
    assert_send_sync::<CanonicalSlot>();
}

// =============================================================================
// Error Display Tests
// =============================================================================

#[test]
fn test_error_display_already_initialized() {
    let msg = format!("{}", Error::AlreadyInitialized);
    assert!(msg.contains("already initialized"));
}

#[test]
fn test_error_display_not_initialized() {
    let msg = format!("{}", Error::NotInitialized);
    assert!(msg.contains("not initialized"));
}

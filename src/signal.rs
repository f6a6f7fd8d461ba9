//! Coverage signal representation.
//!
//! A signal element is a 32-bit value whose upper bits come from a PC and
//! whose lower bits hold a hash residue. [`Signal`] is the deduplicated
//! value set used for comparison and merging, [`SerialSignal`] is the
//! ordered form shipped between the orchestrator and instances and the one
//! translated in place.

use alloc::vec::Vec;
use hashbrown::HashMap;

/// Priority attached to a signal element.
pub type Prio = u8;

/// Ordered, index-addressable signal elements.
///
/// This is the only surface the translator needs from a signal: read the
/// elements in order and overwrite one by index.
pub trait SignalElems {
    /// All elements in order.
    fn elems(&self) -> &[u32];

    /// Overwrite the element at `idx`.
    fn update_elem(&mut self, idx: usize, elem: u32);
}

/// Set of signal elements with their priorities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signal {
    elems: HashMap<u32, Prio>,
}

impl Signal {
    /// Create an empty signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signal from raw elements, all with the same priority.
    pub fn from_raw(raw: &[u32], prio: Prio) -> Self {
        let mut elems = HashMap::with_capacity(raw.len());
        for &elem in raw {
            elems.insert(elem, prio);
        }
        Self { elems }
    }

    /// Number of distinct elements.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether the signal has no elements.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Whether `elem` is part of the signal.
    pub fn contains(&self, elem: u32) -> bool {
        self.elems.contains_key(&elem)
    }

    /// Priority of `elem`, if present.
    pub fn prio(&self, elem: u32) -> Option<Prio> {
        self.elems.get(&elem).copied()
    }

    /// Merge `other` into this signal, keeping the higher priority.
    pub fn merge(&mut self, other: &Signal) {
        for (&elem, &prio) in &other.elems {
            let entry = self.elems.entry(elem).or_insert(prio);
            if *entry < prio {
                *entry = prio;
            }
        }
    }

    /// Convert to the ordered form. Element order is unspecified.
    pub fn serialize(&self) -> SerialSignal {
        let mut serial = SerialSignal {
            elems: Vec::with_capacity(self.elems.len()),
            prios: Vec::with_capacity(self.elems.len()),
        };
        for (&elem, &prio) in &self.elems {
            serial.elems.push(elem);
            serial.prios.push(prio);
        }
        serial
    }
}

/// Ordered signal with parallel element and priority arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerialSignal {
    elems: Vec<u32>,
    prios: Vec<Prio>,
}

impl SerialSignal {
    /// Build from parallel arrays.
    ///
    /// # Panics
    ///
    /// Panics if the arrays differ in length.
    pub fn from_parts(elems: Vec<u32>, prios: Vec<Prio>) -> Self {
        assert_eq!(elems.len(), prios.len(), "signal elems and prios differ in length");
        Self { elems, prios }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Priorities, parallel to [`SignalElems::elems`].
    pub fn prios(&self) -> &[Prio] {
        &self.prios
    }

    /// Rebuild the value set.
    ///
    /// If translation made two elements equal, the later one's priority wins.
    pub fn deserialize(&self) -> Signal {
        let mut elems = HashMap::with_capacity(self.elems.len());
        for (&elem, &prio) in self.elems.iter().zip(&self.prios) {
            elems.insert(elem, prio);
        }
        Signal { elems }
    }
}

impl SignalElems for SerialSignal {
    fn elems(&self) -> &[u32] {
        &self.elems
    }

    fn update_elem(&mut self, idx: usize, elem: u32) {
        self.elems[idx] = elem;
    }
}

impl SignalElems for [u32] {
    fn elems(&self) -> &[u32] {
        self
    }

    fn update_elem(&mut self, idx: usize, elem: u32) {
        self[idx] = elem;
    }
}

impl SignalElems for Vec<u32> {
    fn elems(&self) -> &[u32] {
        self
    }

    fn update_elem(&mut self, idx: usize, elem: u32) {
        self[idx] = elem;
    }
}

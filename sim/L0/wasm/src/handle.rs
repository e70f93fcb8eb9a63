//! Generation-tagged handles.
//!
//! A handle packs a slot index and the slot's reuse counter into one positive
//! `i32`: `raw = generation << 8 | index`. Generation 0 encodes to the bare
//! index, so the first handle issued for slot 3 is `3`.

use std::ffi::c_int;
use std::fmt;

/// Bits reserved for the slot index.
pub const INDEX_BITS: u32 = 8;

/// Largest table a handle can address.
pub const MAX_CAPACITY: usize = 1 << INDEX_BITS;

/// Generations wrap at 2^23 so the packed value stays a positive `i32`.
pub const GENERATION_MASK: u32 = (1 << (31 - INDEX_BITS)) - 1;

const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;

/// Sentinel returned by creation functions on failure.
pub const INVALID_HANDLE: c_int = -1;

/// A reference to one registry slot at one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    index: usize,
    generation: u32,
}

impl Handle {
    /// Handle for `index` at `generation`. The generation is wrapped to
    /// [`GENERATION_MASK`].
    #[must_use]
    pub fn new(index: usize, generation: u32) -> Self {
        Self {
            index,
            generation: generation & GENERATION_MASK,
        }
    }

    /// Slot index.
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }

    /// Slot generation at the time the handle was issued.
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Pack into the ABI representation.
    ///
    /// Indices at or above [`MAX_CAPACITY`] never come out of a registry;
    /// their high bits are dropped.
    #[must_use]
    pub fn to_raw(self) -> c_int {
        let index = self.index as u32 & INDEX_MASK;
        ((self.generation << INDEX_BITS) | index) as c_int
    }

    /// Unpack an ABI value. Zero and negative values are never handles.
    #[must_use]
    pub fn from_raw(raw: c_int) -> Option<Self> {
        if raw <= 0 {
            return None;
        }
        let raw = raw as u32;
        Some(Self {
            index: (raw & INDEX_MASK) as usize,
            generation: raw >> INDEX_BITS,
        })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (slot {}, gen {})", self.to_raw(), self.index, self.generation)
    }
}

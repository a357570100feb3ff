//! Value types shared by several commands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An identifier carried in two one-digit radix-220 slots.
///
/// The wire keeps the low part in the first slot and the high part,
/// shifted left by one, in the second. The bit freed by the shift is a
/// per-use flag (a mirrored sprite, a bound item) and is kept so that a
/// decoded value re-encodes to the same two characters.
///
/// Ids below 24200 are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackedId {
    pub id: u32,
    pub flag: bool,
}

impl PackedId {
    /// Largest id (exclusive) the two slots can carry.
    pub const LIMIT: u32 = 220 * 110;

    /// Creates an id with the flag bit clear.
    pub fn new(id: u32) -> Self {
        Self { id, flag: false }
    }

    /// Reassembles an id from its two slot values.
    pub fn unpack(low: u32, high: u32) -> Self {
        Self {
            id: low + 220 * (high >> 1),
            flag: high & 1 == 1,
        }
    }

    /// Splits the id into `(low, high)` slot values.
    pub fn pack(self) -> (u32, u32) {
        debug_assert!(self.id < Self::LIMIT, "packed id {} out of range", self.id);
        let low = self.id % 220;
        let high = ((self.id / 220) << 1) | u32::from(self.flag);
        (low, high)
    }
}

impl From<u32> for PackedId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for PackedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flag {
            write!(f, "#{}*", self.id)
        } else {
            write!(f, "#{}", self.id)
        }
    }
}

/// One tile of a map region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: u8,
    pub y: u8,
    pub tile: PackedId,
}

/// One occupied inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub slot: u8,
    pub item: PackedId,
    pub count: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_uses_shifted_high_slot() {
        // high = 5 -> shifted part 2, flag set.
        let id = PackedId::unpack(7, 5);
        assert_eq!(id, PackedId { id: 7 + 440, flag: true });
    }

    #[test]
    fn test_pack_inverts_unpack_over_every_slot_pair() {
        for low in 0..220 {
            for high in 0..220 {
                assert_eq!(PackedId::unpack(low, high).pack(), (low, high));
            }
        }
    }

    #[test]
    fn test_pack_largest_id() {
        let id = PackedId::new(PackedId::LIMIT - 1);
        assert_eq!(id.pack(), (219, 218));
        assert_eq!(PackedId::unpack(219, 218), id);
    }
}

//! Explicit bit-field packing
//!
//! GCC and Clang (System V / Itanium ABI) allocate `unsigned int` bit-fields
//! from the least significant bit of the storage unit upward, in declaration
//! order. Every packed field the engine exposes is described here as a shift
//! and a width against a `u32` storage unit, so reads and writes never depend
//! on how Rust would lay out a bit-field.

/// Position and width of one bit-field inside a `u32` storage unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    shift: u32,
    width: u32,
}

impl BitField {
    pub const fn new(shift: u32, width: u32) -> Self {
        assert!(width > 0 && shift + width <= u32::BITS);
        Self { shift, width }
    }

    /// Unshifted mask, which is also the largest storable value
    pub const fn mask(&self) -> u32 {
        u32::MAX >> (u32::BITS - self.width)
    }

    /// Extract the field from `word`
    pub const fn get(&self, word: u32) -> u32 {
        (word >> self.shift) & self.mask()
    }

    /// Return `word` with the field replaced by `value` truncated to the field width
    pub const fn set(&self, word: u32, value: u32) -> u32 {
        let mask = self.mask();
        (word & !(mask << self.shift)) | ((value & mask) << self.shift)
    }
}

/// Generates a getter/setter pair per field for a `u32` newtype
///
/// Getters widen to `u32`; setters truncate to the field width.
macro_rules! bitfield_accessors {
    ($($(#[$doc:meta])* $get:ident / $set:ident: $field:expr;)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub const fn $get(&self) -> u32 {
                $field.get(self.0)
            }

            #[inline]
            pub fn $set(&mut self, value: u32) {
                self.0 = $field.set(self.0, value);
            }
        )*
    };
}

pub(crate) use bitfield_accessors;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(BitField::new(0, 1).mask(), 0b1);
        assert_eq!(BitField::new(7, 4).mask(), 0b1111);
        assert_eq!(BitField::new(0, 32).mask(), u32::MAX);
    }

    #[test]
    fn test_set_truncates() {
        let font = BitField::new(7, 4);
        let word = font.set(0, 17);
        assert_eq!(font.get(word), 1);
        assert_eq!(word, 1 << 7);
    }

    #[test]
    fn test_set_preserves_neighbours() {
        let low = BitField::new(0, 1);
        let mid = BitField::new(1, 2);
        let high = BitField::new(3, 1);

        let mut word = 0;
        word = low.set(word, 1);
        word = high.set(word, 1);
        word = mid.set(word, 0b11);
        word = mid.set(word, 0b10);

        assert_eq!(low.get(word), 1);
        assert_eq!(mid.get(word), 0b10);
        assert_eq!(high.get(word), 1);
        assert_eq!(word, 0b1101);
    }

    #[test]
    fn test_high_bits_ignored_on_get() {
        let field = BitField::new(4, 2);
        assert_eq!(field.get(u32::MAX), 0b11);
        assert_eq!(field.get(0b1100_1111), 0b00);
    }
}

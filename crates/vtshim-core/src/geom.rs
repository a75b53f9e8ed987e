//! Positions, rectangles and line info passed through callback slots

use std::ffi::c_int;

use crate::bits::{bitfield_accessors, BitField};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VTermPos {
    pub row: c_int,
    pub col: c_int,
}

impl VTermPos {
    pub const fn new(row: c_int, col: c_int) -> Self {
        Self { row, col }
    }
}

/// Half-open rectangle: `end_row` and `end_col` are exclusive
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VTermRect {
    pub start_row: c_int,
    pub end_row: c_int,
    pub start_col: c_int,
    pub end_col: c_int,
}

impl VTermRect {
    pub const fn new(start_row: c_int, end_row: c_int, start_col: c_int, end_col: c_int) -> Self {
        Self {
            start_row,
            end_row,
            start_col,
            end_col,
        }
    }

    pub const fn rows(&self) -> c_int {
        self.end_row - self.start_row
    }

    pub const fn cols(&self) -> c_int {
        self.end_col - self.start_col
    }

    pub const fn contains(&self, pos: VTermPos) -> bool {
        pos.row >= self.start_row
            && pos.row < self.end_row
            && pos.col >= self.start_col
            && pos.col < self.end_col
    }
}

pub const LINE_DOUBLEWIDTH: BitField = BitField::new(0, 1);
pub const LINE_DOUBLEHEIGHT: BitField = BitField::new(1, 2);

/// Per-row line attributes, a C bit-field struct
/// (`doublewidth:1`, `doubleheight:2`)
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VTermLineInfo(u32);

impl VTermLineInfo {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    bitfield_accessors! {
        doublewidth / set_doublewidth: LINE_DOUBLEWIDTH;
        /// 0 = normal, 1 = top half, 2 = bottom half
        doubleheight / set_doubleheight: LINE_DOUBLEHEIGHT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = VTermRect::new(0, 2, 1, 3);
        assert_eq!((rect.rows(), rect.cols()), (2, 2));
        assert!(rect.contains(VTermPos::new(0, 1)));
        assert!(rect.contains(VTermPos::new(1, 2)));
        assert!(!rect.contains(VTermPos::new(2, 1)));
        assert!(!rect.contains(VTermPos::new(0, 0)));
    }

    #[test]
    fn test_line_info_bits() {
        let mut info = VTermLineInfo::default();
        info.set_doublewidth(1);
        info.set_doubleheight(2);
        assert_eq!(info.bits(), 0b101);
        assert_eq!(info.doublewidth(), 1);
        assert_eq!(info.doubleheight(), 2);

        info.set_doubleheight(4);
        assert_eq!(info.doubleheight(), 0);
        assert_eq!(info.doublewidth(), 1);
    }
}

//! Screen cell layout
//!
//! [`VTermScreenCell`] matches the engine's `VTermScreenCell` byte for byte:
//!
//! | offset | field   | C type                      |
//! |--------|---------|-----------------------------|
//! | 0      | `chars` | `uint32_t[6]`               |
//! | 24     | `width` | `char`                      |
//! | 28     | `attrs` | `unsigned int` bit-fields   |
//! | 32     | `fg`    | `VTermColor`                |
//! | 36     | `bg`    | `VTermColor`                |
//!
//! [`ScreenCell`] is an owned copy for code that wants plain Rust values.

use std::mem::{align_of, offset_of, size_of};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::bits::{bitfield_accessors, BitField};
use crate::color::{Color, VTermColor};
use crate::error::{Result, ShimError};

/// Maximum number of code points (base plus combining) in one cell
pub const VTERM_MAX_CHARS_PER_CELL: usize = 6;

pub const ATTR_BOLD: BitField = BitField::new(0, 1);
pub const ATTR_UNDERLINE: BitField = BitField::new(1, 2);
pub const ATTR_ITALIC: BitField = BitField::new(3, 1);
pub const ATTR_BLINK: BitField = BitField::new(4, 1);
pub const ATTR_REVERSE: BitField = BitField::new(5, 1);
pub const ATTR_STRIKE: BitField = BitField::new(6, 1);
pub const ATTR_FONT: BitField = BitField::new(7, 4);
pub const ATTR_DWL: BitField = BitField::new(11, 1);
pub const ATTR_DHL: BitField = BitField::new(12, 2);

pub const UNDERLINE_OFF: u32 = 0;
pub const UNDERLINE_SINGLE: u32 = 1;
pub const UNDERLINE_DOUBLE: u32 = 2;

pub const DHL_NONE: u32 = 0;
pub const DHL_TOP: u32 = 1;
pub const DHL_BOTTOM: u32 = 2;

/// The packed `attrs` word of a screen cell
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VTermScreenCellAttrs(u32);

impl VTermScreenCellAttrs {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    bitfield_accessors! {
        bold / set_bold: ATTR_BOLD;
        /// 0 = off, 1 = single, 2 = double
        underline / set_underline: ATTR_UNDERLINE;
        italic / set_italic: ATTR_ITALIC;
        blink / set_blink: ATTR_BLINK;
        reverse / set_reverse: ATTR_REVERSE;
        strike / set_strike: ATTR_STRIKE;
        /// Alternate font index, 0 to 9
        font / set_font: ATTR_FONT;
        /// On a DECDWL or DECDHL line
        dwl / set_dwl: ATTR_DWL;
        /// On a DECDHL line (1 = top half, 2 = bottom half)
        dhl / set_dhl: ATTR_DHL;
    }
}

/// A single engine screen cell
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VTermScreenCell {
    pub chars: [u32; VTERM_MAX_CHARS_PER_CELL],
    pub width: i8,
    pub attrs: VTermScreenCellAttrs,
    pub fg: VTermColor,
    pub bg: VTermColor,
}

const _: () = {
    assert!(offset_of!(VTermScreenCell, chars) == 0);
    assert!(offset_of!(VTermScreenCell, width) == 24);
    assert!(offset_of!(VTermScreenCell, attrs) == 28);
    assert!(offset_of!(VTermScreenCell, fg) == 32);
    assert!(offset_of!(VTermScreenCell, bg) == 36);
    assert!(size_of::<VTermScreenCell>() == 40);
    assert!(align_of::<VTermScreenCell>() == 4);
};

impl Default for VTermScreenCell {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl VTermScreenCell {
    pub const fn zeroed() -> Self {
        Self {
            chars: [0; VTERM_MAX_CHARS_PER_CELL],
            width: 0,
            attrs: VTermScreenCellAttrs(0),
            fg: VTermColor::ZERO,
            bg: VTermColor::ZERO,
        }
    }

    /// Copy code points up to the first zero into `out`
    ///
    /// Fails without writing anything if `out` is shorter than
    /// [`VTERM_MAX_CHARS_PER_CELL`].
    pub fn chars_into(&self, out: &mut [u32]) -> Result<usize> {
        copy_code_points(&self.chars, out)
    }

    /// Copy up to [`VTERM_MAX_CHARS_PER_CELL`] code points into the cell
    ///
    /// Slots past the copied prefix keep their previous contents. Returns the
    /// number of code points written.
    pub fn set_chars(&mut self, chars: &[u32]) -> usize {
        let count = chars.len().min(VTERM_MAX_CHARS_PER_CELL);
        self.chars[..count].copy_from_slice(&chars[..count]);
        count
    }

    pub fn width(&self) -> i8 {
        self.width
    }

    pub fn set_width(&mut self, width: i8) {
        self.width = width;
    }

    pub fn fg(&self) -> VTermColor {
        self.fg
    }

    pub fn set_fg(&mut self, color: VTermColor) {
        self.fg = color;
    }

    pub fn bg(&self) -> VTermColor {
        self.bg
    }

    pub fn set_bg(&mut self, color: VTermColor) {
        self.bg = color;
    }

    /// Address of the cell `amount` elements away from `cell`
    ///
    /// Uses wrapping arithmetic, so computing the address is always safe;
    /// dereferencing it is only valid inside the caller's cell array.
    pub fn offset(cell: *const Self, amount: isize) -> *const Self {
        cell.wrapping_offset(amount)
    }

    pub fn offset_mut(cell: *mut Self, amount: isize) -> *mut Self {
        cell.wrapping_offset(amount)
    }
}

/// Copy a zero-terminated code point array into a caller buffer
pub(crate) fn copy_code_points(
    chars: &[u32; VTERM_MAX_CHARS_PER_CELL],
    out: &mut [u32],
) -> Result<usize> {
    ensure_capacity(out.len())?;
    let count = chars
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(VTERM_MAX_CHARS_PER_CELL);
    out[..count].copy_from_slice(&chars[..count]);
    Ok(count)
}

pub(crate) fn ensure_capacity(capacity: usize) -> Result<()> {
    if capacity < VTERM_MAX_CHARS_PER_CELL {
        log::debug!(
            "chars buffer of {} rejected, need {}",
            capacity,
            VTERM_MAX_CHARS_PER_CELL
        );
        return Err(ShimError::BufferTooSmall {
            capacity,
            required: VTERM_MAX_CHARS_PER_CELL,
        });
    }
    Ok(())
}

/// Decode code points, replacing invalid scalar values with U+FFFD
pub(crate) fn decode_code_points(code_points: &[u32]) -> Vec<char> {
    code_points
        .iter()
        .map(|&c| char::from_u32(c).unwrap_or('\u{FFFD}'))
        .collect()
}

bitflags! {
    /// Single-bit cell attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CellFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const BLINK = 1 << 2;
        const REVERSE = 1 << 3;
        const STRIKE = 1 << 4;
        /// On a double-width line
        const DWL = 1 << 5;
    }
}

/// Owned form of the packed attribute word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellStyle {
    pub flags: CellFlags,
    pub underline: u8,
    pub font: u8,
    pub dhl: u8,
}

impl CellStyle {
    pub fn from_attrs(attrs: VTermScreenCellAttrs) -> Self {
        let mut flags = CellFlags::empty();
        flags.set(CellFlags::BOLD, attrs.bold() != 0);
        flags.set(CellFlags::ITALIC, attrs.italic() != 0);
        flags.set(CellFlags::BLINK, attrs.blink() != 0);
        flags.set(CellFlags::REVERSE, attrs.reverse() != 0);
        flags.set(CellFlags::STRIKE, attrs.strike() != 0);
        flags.set(CellFlags::DWL, attrs.dwl() != 0);

        // Fields are at most 4 bits wide, so the narrowing is lossless.
        Self {
            flags,
            underline: attrs.underline() as u8,
            font: attrs.font() as u8,
            dhl: attrs.dhl() as u8,
        }
    }

    /// Pack into the engine's attribute word, masking each field to its width
    pub fn to_attrs(&self) -> VTermScreenCellAttrs {
        let mut attrs = VTermScreenCellAttrs::default();
        attrs.set_bold(self.flags.contains(CellFlags::BOLD) as u32);
        attrs.set_underline(self.underline as u32);
        attrs.set_italic(self.flags.contains(CellFlags::ITALIC) as u32);
        attrs.set_blink(self.flags.contains(CellFlags::BLINK) as u32);
        attrs.set_reverse(self.flags.contains(CellFlags::REVERSE) as u32);
        attrs.set_strike(self.flags.contains(CellFlags::STRIKE) as u32);
        attrs.set_font(self.font as u32);
        attrs.set_dwl(self.flags.contains(CellFlags::DWL) as u32);
        attrs.set_dhl(self.dhl as u32);
        attrs
    }
}

/// Owned copy of a screen cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenCell {
    pub chars: Vec<char>,
    pub width: i8,
    pub style: CellStyle,
    pub fg: Color,
    pub bg: Color,
}

impl Default for ScreenCell {
    fn default() -> Self {
        Self::from_raw(&VTermScreenCell::zeroed())
    }
}

impl ScreenCell {
    /// Single-width cell holding `c` with default colors
    pub fn new(c: char) -> Self {
        Self {
            chars: vec![c],
            width: 1,
            style: CellStyle::default(),
            fg: Color::DefaultFg,
            bg: Color::DefaultBg,
        }
    }

    pub fn from_raw(raw: &VTermScreenCell) -> Self {
        let mut buf = [0u32; VTERM_MAX_CHARS_PER_CELL];
        // The buffer is exactly the budget, so this cannot fail.
        let count = raw.chars_into(&mut buf).unwrap_or(0);

        Self {
            chars: decode_code_points(&buf[..count]),
            width: raw.width(),
            style: CellStyle::from_attrs(raw.attrs),
            fg: Color::from(raw.fg()),
            bg: Color::from(raw.bg()),
        }
    }

    /// Copy the cell at `ptr`; the pointer is not freed or retained
    ///
    /// # Safety
    /// `ptr` must be null or point to a live, initialized cell.
    pub unsafe fn from_ptr(ptr: *const VTermScreenCell) -> Option<Self> {
        ptr.as_ref().map(Self::from_raw)
    }

    /// Copy `cols` consecutive cells starting at `ptr`
    ///
    /// # Safety
    /// `ptr` must point to at least `cols` live, initialized cells.
    pub unsafe fn line_from_ptr(ptr: *const VTermScreenCell, cols: usize) -> Vec<Self> {
        (0..cols as isize)
            .map(|col| Self::from_raw(&*VTermScreenCell::offset(ptr, col)))
            .collect()
    }

    /// Build the engine representation
    ///
    /// Characters past [`VTERM_MAX_CHARS_PER_CELL`] are dropped.
    pub fn to_raw(&self) -> VTermScreenCell {
        let code_points: Vec<u32> = self.chars.iter().map(|&c| c as u32).collect();
        let mut raw = VTermScreenCell::zeroed();
        raw.set_chars(&code_points);
        raw.set_width(self.width);
        raw.attrs = self.style.to_attrs();
        raw.set_fg(self.fg.into());
        raw.set_bg(self.bg.into());
        raw
    }

    /// Characters of the cell as a string
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_cell() {
        let cell = VTermScreenCell::zeroed();
        assert_eq!(cell.chars, [0; VTERM_MAX_CHARS_PER_CELL]);
        assert_eq!(cell.width, 0);
        assert_eq!(cell.attrs.bits(), 0);
        assert_eq!(cell.fg, VTermColor::ZERO);
        assert_eq!(cell.bg, VTermColor::ZERO);
    }

    #[test]
    fn test_chars_round_trip() {
        let mut cell = VTermScreenCell::zeroed();
        assert_eq!(cell.set_chars(&[0x65, 0x301]), 2);

        let mut out = [0u32; VTERM_MAX_CHARS_PER_CELL];
        assert_eq!(cell.chars_into(&mut out), Ok(2));
        assert_eq!(&out[..2], &[0x65, 0x301]);
        assert_eq!(&cell.chars[2..], &[0; 4]);
    }

    #[test]
    fn test_chars_full_budget() {
        let mut cell = VTermScreenCell::zeroed();
        let input = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(cell.set_chars(&input), VTERM_MAX_CHARS_PER_CELL);

        let mut out = [0u32; 8];
        assert_eq!(cell.chars_into(&mut out), Ok(VTERM_MAX_CHARS_PER_CELL));
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 0, 0]);
    }

    #[test]
    fn test_chars_into_short_buffer() {
        let mut cell = VTermScreenCell::zeroed();
        cell.set_chars(&[0x41]);

        let mut out = [0xFFFF_FFFFu32; VTERM_MAX_CHARS_PER_CELL - 1];
        assert_eq!(
            cell.chars_into(&mut out),
            Err(ShimError::BufferTooSmall {
                capacity: VTERM_MAX_CHARS_PER_CELL - 1,
                required: VTERM_MAX_CHARS_PER_CELL,
            })
        );
        assert!(out.iter().all(|&c| c == 0xFFFF_FFFF));
    }

    #[test]
    fn test_set_chars_keeps_tail() {
        let mut cell = VTermScreenCell::zeroed();
        cell.set_chars(&[1, 2, 3]);
        cell.set_chars(&[9]);
        assert_eq!(cell.chars, [9, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_attr_bit_positions() {
        let mut attrs = VTermScreenCellAttrs::default();
        attrs.set_bold(1);
        assert_eq!(attrs.bits(), 0b1);
        attrs.set_underline(UNDERLINE_DOUBLE);
        assert_eq!(attrs.bits(), 0b101);
        attrs.set_font(9);
        assert_eq!(attrs.bits(), 0b101 | (9 << 7));
        attrs.set_dhl(DHL_BOTTOM);
        assert_eq!(attrs.bits(), 0b101 | (9 << 7) | (2 << 12));
    }

    #[test]
    fn test_attr_truncation() {
        let mut attrs = VTermScreenCellAttrs::default();
        attrs.set_font(17);
        assert_eq!(attrs.font(), 1);
        attrs.set_bold(2);
        assert_eq!(attrs.bold(), 0);
        attrs.set_underline(5);
        assert_eq!(attrs.underline(), UNDERLINE_SINGLE);
        attrs.set_dhl(5);
        assert_eq!(attrs.dhl(), DHL_TOP);
        // Neighbours of the truncated fields are untouched
        assert_eq!(attrs.italic(), 0);
        assert_eq!(attrs.dwl(), 0);
    }

    #[test]
    fn test_offset() {
        let cells = [VTermScreenCell::zeroed(); 4];
        let base = cells.as_ptr();
        assert_eq!(VTermScreenCell::offset(base, 0), base);

        let third = VTermScreenCell::offset(base, 3);
        let distance = third as usize - base as usize;
        assert_eq!(distance, 3 * size_of::<VTermScreenCell>());
        assert_eq!(VTermScreenCell::offset(third, -3), base);
    }

    #[test]
    fn test_style_conversion() {
        let style = CellStyle {
            flags: CellFlags::BOLD | CellFlags::STRIKE | CellFlags::DWL,
            underline: 1,
            font: 3,
            dhl: 2,
        };
        let attrs = style.to_attrs();
        assert_eq!(attrs.bold(), 1);
        assert_eq!(attrs.italic(), 0);
        assert_eq!(attrs.strike(), 1);
        assert_eq!(attrs.dwl(), 1);
        assert_eq!(attrs.font(), 3);
        assert_eq!(CellStyle::from_attrs(attrs), style);
    }

    #[test]
    fn test_screen_cell_from_raw() {
        let mut raw = VTermScreenCell::zeroed();
        raw.set_chars(&[0x41, 0]);
        raw.set_width(1);
        raw.attrs.set_bold(1);
        raw.set_fg(VTermColor::indexed(2));
        raw.set_bg(VTermColor::default_bg());

        let cell = ScreenCell::from_raw(&raw);
        assert_eq!(cell.chars, vec!['A']);
        assert_eq!(cell.text(), "A");
        assert_eq!(cell.width, 1);
        assert!(cell.style.flags.contains(CellFlags::BOLD));
        assert_eq!(cell.style.underline as u32, UNDERLINE_OFF);
        assert_eq!(cell.style.dhl as u32, DHL_NONE);
        assert_eq!(cell.fg, Color::Indexed(2));
        assert_eq!(cell.bg, Color::DefaultBg);
        assert_eq!(cell.to_raw(), raw);
    }

    #[test]
    fn test_screen_cell_invalid_code_point() {
        let mut raw = VTermScreenCell::zeroed();
        raw.set_chars(&[0xD800, 0x42]);
        let cell = ScreenCell::from_raw(&raw);
        assert_eq!(cell.chars, vec![char::REPLACEMENT_CHARACTER, 'B']);
    }

    #[test]
    fn test_line_from_ptr() {
        let line: Vec<VTermScreenCell> = "hi!"
            .chars()
            .map(|c| ScreenCell::new(c).to_raw())
            .collect();

        let cells = unsafe { ScreenCell::line_from_ptr(line.as_ptr(), line.len()) };
        let text: String = cells.iter().map(ScreenCell::text).collect();
        assert_eq!(text, "hi!");
        assert!(cells.iter().all(|c| c.fg == Color::DefaultFg));
    }

    #[test]
    fn test_screen_cell_serializes() {
        let cell = ScreenCell::new('x');
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["chars"], serde_json::json!(["x"]));
        assert_eq!(json["width"], 1);

        let back: ScreenCell = serde_json::from_value(json).unwrap();
        assert_eq!(back, cell);
    }
}

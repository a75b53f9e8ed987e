//! Color types for screen cells
//!
//! The engine stores a color as a 4-byte tagged union:
//! - byte 0 is the type: RGB or indexed, optionally flagged as default fg/bg
//! - bytes 1-3 are red, green, blue for RGB colors
//! - byte 1 is the palette index for indexed colors
//!
//! [`VTermColor`] mirrors that union exactly; [`Color`] is the owned form.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub const VTERM_COLOR_RGB: u8 = 0x00;
pub const VTERM_COLOR_INDEXED: u8 = 0x01;
pub const VTERM_COLOR_TYPE_MASK: u8 = 0x01;
pub const VTERM_COLOR_DEFAULT_FG: u8 = 0x02;
pub const VTERM_COLOR_DEFAULT_BG: u8 = 0x04;
pub const VTERM_COLOR_DEFAULT_MASK: u8 = 0x06;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RgbVariant {
    kind: u8,
    red: u8,
    green: u8,
    blue: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexedVariant {
    kind: u8,
    idx: u8,
}

/// Engine color union
///
/// Every constructor writes all four bytes, so reading any variant is
/// always reading initialized memory.
#[repr(C)]
#[derive(Clone, Copy)]
pub union VTermColor {
    kind: u8,
    rgb: RgbVariant,
    indexed: IndexedVariant,
}

const _: () = assert!(std::mem::size_of::<VTermColor>() == 4);
const _: () = assert!(std::mem::align_of::<VTermColor>() == 1);

impl VTermColor {
    /// All-zero color, which the engine reads as RGB black
    pub const ZERO: Self = Self::from_bytes([0; 4]);

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            rgb: RgbVariant {
                kind: bytes[0],
                red: bytes[1],
                green: bytes[2],
                blue: bytes[3],
            },
        }
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        // SAFETY: all constructors initialize the full 4 bytes and every
        // bit pattern is a valid `RgbVariant`.
        let rgb = unsafe { self.rgb };
        [rgb.kind, rgb.red, rgb.green, rgb.blue]
    }

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_bytes([VTERM_COLOR_RGB, red, green, blue])
    }

    /// Palette entry; the index shares byte 1 with `red`
    pub const fn indexed(idx: u8) -> Self {
        Self::from_bytes([VTERM_COLOR_INDEXED, idx, 0, 0])
    }

    /// The engine's default foreground marker
    pub const fn default_fg() -> Self {
        Self::from_bytes([VTERM_COLOR_RGB | VTERM_COLOR_DEFAULT_FG, 0, 0, 0])
    }

    /// The engine's default background marker
    pub const fn default_bg() -> Self {
        Self::from_bytes([VTERM_COLOR_RGB | VTERM_COLOR_DEFAULT_BG, 0, 0, 0])
    }

    /// Raw type byte, including default flags
    pub const fn kind(&self) -> u8 {
        // SAFETY: byte 0 is initialized by every constructor.
        unsafe { self.kind }
    }

    pub const fn is_indexed(&self) -> bool {
        self.kind() & VTERM_COLOR_TYPE_MASK == VTERM_COLOR_INDEXED
    }

    pub const fn is_rgb(&self) -> bool {
        self.kind() & VTERM_COLOR_TYPE_MASK == VTERM_COLOR_RGB
    }

    pub const fn is_default_fg(&self) -> bool {
        self.kind() & VTERM_COLOR_DEFAULT_FG != 0
    }

    pub const fn is_default_bg(&self) -> bool {
        self.kind() & VTERM_COLOR_DEFAULT_BG != 0
    }

    /// Palette index, if this is an indexed color
    pub const fn index(&self) -> Option<u8> {
        // SAFETY: bytes 0 and 1 are initialized by every constructor.
        let indexed = unsafe { self.indexed };
        if indexed.kind & VTERM_COLOR_TYPE_MASK == VTERM_COLOR_INDEXED {
            Some(indexed.idx)
        } else {
            None
        }
    }

    /// RGB components, if this is an RGB color
    pub const fn components(&self) -> Option<Rgb> {
        if self.is_rgb() {
            let [_, r, g, b] = self.to_bytes();
            Some(Rgb::new(r, g, b))
        } else {
            None
        }
    }
}

impl Default for VTermColor {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for VTermColor {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for VTermColor {}

impl Hash for VTermColor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl fmt::Debug for VTermColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [kind, a, b, c] = self.to_bytes();
        if self.is_indexed() {
            f.debug_struct("VTermColor")
                .field("kind", &kind)
                .field("idx", &a)
                .finish()
        } else {
            f.debug_struct("VTermColor")
                .field("kind", &kind)
                .field("red", &a)
                .field("green", &b)
                .field("blue", &c)
                .finish()
        }
    }
}

/// RGB color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Owned color specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Default foreground color
    DefaultFg,
    /// Default background color
    DefaultBg,
    /// 256-color palette index (0-255)
    Indexed(u8),
    /// 24-bit true color
    Rgb(Rgb),
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(Rgb::new(r, g, b))
    }
}

impl From<VTermColor> for Color {
    /// Default flags take precedence over the RGB/indexed payload
    fn from(color: VTermColor) -> Self {
        if color.is_default_fg() {
            Self::DefaultFg
        } else if color.is_default_bg() {
            Self::DefaultBg
        } else if let Some(idx) = color.index() {
            Self::Indexed(idx)
        } else {
            let [_, r, g, b] = color.to_bytes();
            Self::rgb(r, g, b)
        }
    }
}

impl From<Color> for VTermColor {
    fn from(color: Color) -> Self {
        match color {
            Color::DefaultFg => Self::default_fg(),
            Color::DefaultBg => Self::default_bg(),
            Color::Indexed(idx) => Self::indexed(idx),
            Color::Rgb(Rgb { r, g, b }) => Self::rgb(r, g, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rgb_black() {
        let color = VTermColor::ZERO;
        assert!(color.is_rgb());
        assert!(!color.is_default_fg());
        assert_eq!(color.components(), Some(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_indexed_layout() {
        let color = VTermColor::indexed(196);
        assert_eq!(color.to_bytes(), [VTERM_COLOR_INDEXED, 196, 0, 0]);
        assert_eq!(color.index(), Some(196));
        assert_eq!(color.components(), None);
    }

    #[test]
    fn test_rgb_layout() {
        let color = VTermColor::rgb(0x12, 0x34, 0x56);
        assert_eq!(color.to_bytes(), [VTERM_COLOR_RGB, 0x12, 0x34, 0x56]);
        assert_eq!(color.index(), None);
    }

    #[test]
    fn test_default_flags() {
        assert!(VTermColor::default_fg().is_default_fg());
        assert!(!VTermColor::default_fg().is_default_bg());
        assert!(VTermColor::default_bg().is_default_bg());
        assert_eq!(
            VTermColor::default_fg().kind() & VTERM_COLOR_DEFAULT_MASK,
            VTERM_COLOR_DEFAULT_FG
        );
        assert_eq!(VTermColor::indexed(3).kind() & VTERM_COLOR_DEFAULT_MASK, 0);
        assert_eq!(Color::from(VTermColor::default_bg()), Color::DefaultBg);
    }

    #[test]
    fn test_color_conversion() {
        let cases = [
            Color::DefaultFg,
            Color::DefaultBg,
            Color::Indexed(7),
            Color::rgb(255, 128, 0),
        ];
        for color in cases {
            assert_eq!(Color::from(VTermColor::from(color)), color);
        }
    }

    #[test]
    fn test_equality_is_bytewise() {
        let rgb = VTermColor::from_bytes([0, 1, 2, 3]);
        assert_eq!(VTermColor::rgb(1, 2, 3), rgb);
        assert_ne!(VTermColor::rgb(1, 0, 0), VTermColor::indexed(1));
    }
}

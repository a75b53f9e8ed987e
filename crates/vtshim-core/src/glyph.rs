//! Glyph info layout
//!
//! The engine builds a `VTermGlyphInfo` for each glyph it is about to commit
//! and hands it to the state layer's `putglyph` slot. Foreign observers only
//! ever read it; construction is the engine's business.

use std::ffi::c_int;
use std::mem::{offset_of, size_of};

use serde::{Deserialize, Serialize};

use crate::bits::{bitfield_accessors, BitField};
use crate::cell::{decode_code_points, ensure_capacity, VTERM_MAX_CHARS_PER_CELL};
use crate::error::Result;

pub const GLYPH_PROTECTED_CELL: BitField = BitField::new(0, 1);
pub const GLYPH_DWL: BitField = BitField::new(1, 1);
pub const GLYPH_DHL: BitField = BitField::new(2, 2);

/// The packed flag word following `width`
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VTermGlyphFlags(u32);

impl VTermGlyphFlags {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    bitfield_accessors! {
        /// Cannot be erased by a selective erase
        protected_cell / set_protected_cell: GLYPH_PROTECTED_CELL;
        dwl / set_dwl: GLYPH_DWL;
        dhl / set_dhl: GLYPH_DHL;
    }
}

/// Pending glyph description, owned by the engine
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VTermGlyphInfo {
    chars: *const u32,
    width: c_int,
    flags: VTermGlyphFlags,
}

const _: () = {
    const CHARS: usize = size_of::<*const u32>();
    assert!(offset_of!(VTermGlyphInfo, width) == CHARS);
    assert!(offset_of!(VTermGlyphInfo, flags) == CHARS + 4);
};

impl VTermGlyphInfo {
    /// Engine-side constructor
    ///
    /// `chars` must stay valid for as long as the glyph info is read and be
    /// zero-terminated within [`VTERM_MAX_CHARS_PER_CELL`] entries (or hold
    /// exactly that many). `dhl` is truncated to 2 bits.
    pub fn new(chars: *const u32, width: c_int, protected_cell: bool, dwl: bool, dhl: u32) -> Self {
        let mut flags = VTermGlyphFlags::default();
        flags.set_protected_cell(protected_cell as u32);
        flags.set_dwl(dwl as u32);
        flags.set_dhl(dhl);
        Self {
            chars,
            width,
            flags,
        }
    }

    /// Copy code points up to the first zero into `out`
    ///
    /// Fails without reading or writing anything if `out` is shorter than
    /// [`VTERM_MAX_CHARS_PER_CELL`]. A null `chars` pointer reads as empty.
    ///
    /// # Safety
    /// The `chars` pointer this glyph was built with must still be valid.
    pub unsafe fn chars_into(&self, out: &mut [u32]) -> Result<usize> {
        ensure_capacity(out.len())?;
        if self.chars.is_null() {
            return Ok(0);
        }

        let mut count = 0;
        while count < VTERM_MAX_CHARS_PER_CELL {
            let c = *self.chars.add(count);
            if c == 0 {
                break;
            }
            out[count] = c;
            count += 1;
        }
        Ok(count)
    }

    pub fn width(&self) -> c_int {
        self.width
    }

    pub fn protected_cell(&self) -> u32 {
        self.flags.protected_cell()
    }

    pub fn dwl(&self) -> u32 {
        self.flags.dwl()
    }

    pub fn dhl(&self) -> u32 {
        self.flags.dhl()
    }

    pub fn flags(&self) -> VTermGlyphFlags {
        self.flags
    }
}

/// Owned copy of a glyph info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphInfo {
    pub chars: Vec<char>,
    pub width: i32,
    pub protected_cell: bool,
    /// On a DECDWL or DECDHL line
    pub dwl: bool,
    /// On a DECDHL line (1 = top, 2 = bottom)
    pub dhl: u8,
}

impl GlyphInfo {
    /// # Safety
    /// `raw`'s `chars` pointer must still be valid.
    pub unsafe fn from_raw(raw: &VTermGlyphInfo) -> Self {
        let mut buf = [0u32; VTERM_MAX_CHARS_PER_CELL];
        let count = raw.chars_into(&mut buf).unwrap_or(0);

        Self {
            chars: decode_code_points(&buf[..count]),
            width: raw.width(),
            protected_cell: raw.protected_cell() != 0,
            dwl: raw.dwl() != 0,
            dhl: raw.dhl() as u8,
        }
    }

    /// Copy the glyph info at `ptr`
    ///
    /// # Safety
    /// `ptr` must be null or point to a live glyph info whose `chars`
    /// pointer is valid.
    pub unsafe fn from_ptr(ptr: *const VTermGlyphInfo) -> Option<Self> {
        ptr.as_ref().map(|raw| Self::from_raw(raw))
    }
}

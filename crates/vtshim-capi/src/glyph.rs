//! Glyph info exports
//!
//! Read-only: the engine builds glyph info and hands it to the state
//! layer's `putglyph` slot, where a foreign callback inspects it.

use std::ffi::{c_int, c_uint};
use std::slice;

use vtshim_core::{VTermGlyphInfo, VTERM_MAX_CHARS_PER_CELL};

use crate::chars_status;

/// Same contract as `vterm_cell_get_chars`
///
/// # Safety
/// `info` and its `chars` pointer must be valid; `out` must be valid for
/// `capacity` writes when `capacity` is at least the budget.
#[no_mangle]
pub unsafe extern "C" fn vterm_glyph_info_get_chars(
    info: *const VTermGlyphInfo,
    out: *mut u32,
    capacity: usize,
) -> c_int {
    if capacity < VTERM_MAX_CHARS_PER_CELL {
        return chars_status((*info).chars_into(&mut []));
    }
    chars_status((*info).chars_into(slice::from_raw_parts_mut(out, capacity)))
}

/// # Safety
/// `info` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_glyph_info_width(info: *const VTermGlyphInfo) -> c_int {
    (*info).width()
}

/// # Safety
/// `info` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_glyph_info_protected_cell(info: *const VTermGlyphInfo) -> c_uint {
    (*info).protected_cell()
}

/// # Safety
/// `info` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_glyph_info_dwl(info: *const VTermGlyphInfo) -> c_uint {
    (*info).dwl()
}

/// # Safety
/// `info` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_glyph_info_dhl(info: *const VTermGlyphInfo) -> c_uint {
    (*info).dhl()
}

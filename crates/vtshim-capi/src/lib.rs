//! vtshim-capi: flat C ABI over libvterm's packed layouts
//!
//! Every export takes and returns fixed-width scalars, raw pointers or
//! nullable function pointers, so a foreign caller never has to encode a
//! C bit-field or a struct of function pointers itself. The exports are
//! thin wrappers around `vtshim-core`.
//!
//! Pointers passed in are borrowed for the duration of one call. Apart from
//! the documented null cases, invalid pointers are not detected.

pub mod callbacks;
pub mod cell;
pub mod glyph;
pub mod line_info;

use std::ffi::c_int;

use vtshim_core::Result;

/// Returned by the `*_get_chars` exports when the output buffer is shorter
/// than `VTERM_MAX_CHARS_PER_CELL`
pub const VTERM_SHIM_CAPACITY_ERROR: c_int = -1;

/// Map a code point copy to its C return value
fn chars_status(copied: Result<usize>) -> c_int {
    match copied {
        Ok(count) => count as c_int,
        Err(_) => VTERM_SHIM_CAPACITY_ERROR,
    }
}

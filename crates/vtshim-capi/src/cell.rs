//! Screen cell exports

use std::ffi::{c_int, c_uint, c_void};
use std::mem::size_of;
use std::ptr;
use std::slice;

use vtshim_core::{
    CellAllocator, VTermAllocatorFunctions, VTermColor, VTermScreenCell, VTERM_MAX_CHARS_PER_CELL,
};

use crate::chars_status;

/// Allocate one zero-filled cell from the C heap
///
/// Returns null on allocation failure. Release with [`vterm_cell_free`].
#[no_mangle]
pub extern "C" fn vterm_cell_new() -> *mut VTermScreenCell {
    // SAFETY: the system allocator has no caller-supplied functions
    match unsafe { CellAllocator::System.allocate_cell() } {
        Ok(cell) => cell.as_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

/// Allocate one zero-filled cell through the engine's allocator pair
///
/// A null or incomplete `funcs` table falls back to the C heap. Release
/// with [`vterm_cell_free_with_allocator`] and the same arguments.
///
/// # Safety
/// `funcs` must be null or point to a valid allocator table whose functions
/// are sound to call with `allocdata`.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_new_with_allocator(
    funcs: *const VTermAllocatorFunctions,
    allocdata: *mut c_void,
) -> *mut VTermScreenCell {
    match CellAllocator::resolve(funcs, allocdata).allocate_cell() {
        Ok(cell) => cell.as_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

/// # Safety
/// `cell` must be null or come from [`vterm_cell_new`], not yet freed.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_free(cell: *mut VTermScreenCell) {
    CellAllocator::System.free_cell(cell);
}

/// # Safety
/// `cell` must be null or come from [`vterm_cell_new_with_allocator`]
/// called with the same `funcs` and `allocdata`, not yet freed.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_free_with_allocator(
    cell: *mut VTermScreenCell,
    funcs: *const VTermAllocatorFunctions,
    allocdata: *mut c_void,
) {
    CellAllocator::resolve(funcs, allocdata).free_cell(cell);
}

/// Copy the cell's code points, up to the first zero, into `out`
///
/// Returns the number copied, or `VTERM_SHIM_CAPACITY_ERROR` without
/// touching `out` when `capacity` is below the per-cell budget.
///
/// # Safety
/// `cell` must be valid; `out` must be valid for `capacity` writes when
/// `capacity` is at least the budget.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_get_chars(
    cell: *const VTermScreenCell,
    out: *mut u32,
    capacity: usize,
) -> c_int {
    if capacity < VTERM_MAX_CHARS_PER_CELL {
        return chars_status((*cell).chars_into(&mut []));
    }
    chars_status((*cell).chars_into(slice::from_raw_parts_mut(out, capacity)))
}

/// Copy up to the per-cell budget of code points from `chars`
///
/// # Safety
/// `cell` must be valid; `chars` must be valid for `len` reads when `len`
/// is non-zero.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_set_chars(
    cell: *mut VTermScreenCell,
    chars: *const u32,
    len: usize,
) {
    if len == 0 {
        return;
    }
    (*cell).set_chars(slice::from_raw_parts(chars, len));
}

/// # Safety
/// `cell` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_get_width(cell: *const VTermScreenCell) -> i8 {
    (*cell).width()
}

/// # Safety
/// `cell` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_set_width(cell: *mut VTermScreenCell, width: i8) {
    (*cell).set_width(width);
}

macro_rules! attr_exports {
    ($($get:ident / $set:ident => $field:ident / $field_set:ident;)*) => {
        $(
            /// # Safety
            /// `cell` must be valid.
            #[no_mangle]
            pub unsafe extern "C" fn $get(cell: *const VTermScreenCell) -> c_uint {
                (*cell).attrs.$field()
            }

            /// Stores the low bits of `value` that fit the field
            ///
            /// # Safety
            /// `cell` must be valid.
            #[no_mangle]
            pub unsafe extern "C" fn $set(cell: *mut VTermScreenCell, value: c_uint) {
                (*cell).attrs.$field_set(value);
            }
        )*
    };
}

attr_exports! {
    vterm_cell_get_bold / vterm_cell_set_bold => bold / set_bold;
    vterm_cell_get_underline / vterm_cell_set_underline => underline / set_underline;
    vterm_cell_get_italic / vterm_cell_set_italic => italic / set_italic;
    vterm_cell_get_blink / vterm_cell_set_blink => blink / set_blink;
    vterm_cell_get_reverse / vterm_cell_set_reverse => reverse / set_reverse;
    vterm_cell_get_strike / vterm_cell_set_strike => strike / set_strike;
    vterm_cell_get_font / vterm_cell_set_font => font / set_font;
    vterm_cell_get_dwl / vterm_cell_set_dwl => dwl / set_dwl;
    vterm_cell_get_dhl / vterm_cell_set_dhl => dhl / set_dhl;
}

/// # Safety
/// `cell` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_get_fg(cell: *const VTermScreenCell) -> VTermColor {
    (*cell).fg()
}

/// # Safety
/// `cell` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_set_fg(cell: *mut VTermScreenCell, color: VTermColor) {
    (*cell).set_fg(color);
}

/// # Safety
/// `cell` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_get_bg(cell: *const VTermScreenCell) -> VTermColor {
    (*cell).bg()
}

/// # Safety
/// `cell` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_cell_set_bg(cell: *mut VTermScreenCell, color: VTermColor) {
    (*cell).set_bg(color);
}

/// Address of the cell `offset` elements away from `cell`
///
/// Never dereferences; the result is only meaningful inside the caller's
/// cell array.
#[no_mangle]
pub extern "C" fn vterm_cell_pointer_arithmetic(
    cell: *mut VTermScreenCell,
    offset: c_int,
) -> *mut VTermScreenCell {
    VTermScreenCell::offset_mut(cell, offset as isize)
}

/// Size in bytes of one cell, the stride of a cell array
#[no_mangle]
pub extern "C" fn vterm_cell_sizeof() -> usize {
    size_of::<VTermScreenCell>()
}

#[no_mangle]
pub extern "C" fn vterm_cell_max_chars() -> c_int {
    VTERM_MAX_CHARS_PER_CELL as c_int
}

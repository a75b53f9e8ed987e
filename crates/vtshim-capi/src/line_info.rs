//! Line info exports, for the state layer's `setlineinfo` slot

use std::ffi::c_uint;

use vtshim_core::VTermLineInfo;

/// # Safety
/// `info` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_line_info_get_doublewidth(info: *const VTermLineInfo) -> c_uint {
    (*info).doublewidth()
}

/// 0 = normal, 1 = top half, 2 = bottom half
///
/// # Safety
/// `info` must be valid.
#[no_mangle]
pub unsafe extern "C" fn vterm_line_info_get_doubleheight(info: *const VTermLineInfo) -> c_uint {
    (*info).doubleheight()
}

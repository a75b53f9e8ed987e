//! Single-cell allocation
//!
//! A cell is allocated either through the engine's allocator pair (the
//! `VTermAllocatorFunctions` and `allocdata` a session was created with) or
//! through the C heap. Whichever path allocated a cell must free it.

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr::{self, NonNull};

use crate::cell::VTermScreenCell;
use crate::error::{Result, ShimError};

pub type MallocFn = unsafe extern "C" fn(size: usize, allocdata: *mut c_void) -> *mut c_void;
pub type FreeFn = unsafe extern "C" fn(ptr: *mut c_void, allocdata: *mut c_void);

/// The engine's allocator table
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VTermAllocatorFunctions {
    pub malloc: Option<MallocFn>,
    pub free: Option<FreeFn>,
}

/// Where a cell's memory comes from
#[derive(Debug, Clone, Copy)]
pub enum CellAllocator<'a> {
    /// `calloc` / `free` from the C heap, compatible with a foreign `free()`
    System,
    /// The engine's allocator pair
    Engine {
        functions: &'a VTermAllocatorFunctions,
        allocdata: *mut c_void,
    },
}

impl<'a> CellAllocator<'a> {
    /// Pick the engine allocator when a complete table is given, otherwise
    /// the system allocator
    ///
    /// The choice depends only on the arguments, so resolving the same
    /// arguments for `new` and `free` always pairs them.
    ///
    /// # Safety
    /// `functions` must be null or valid for `'a`.
    pub unsafe fn resolve(
        functions: *const VTermAllocatorFunctions,
        allocdata: *mut c_void,
    ) -> Self {
        match functions.as_ref() {
            Some(table) if table.malloc.is_some() && table.free.is_some() => Self::Engine {
                functions: table,
                allocdata,
            },
            _ => Self::System,
        }
    }

    /// Allocate one zero-filled cell
    ///
    /// # Safety
    /// For [`CellAllocator::Engine`], the allocator functions must be sound
    /// to call with `allocdata`.
    pub unsafe fn allocate_cell(&self) -> Result<NonNull<VTermScreenCell>> {
        let size = size_of::<VTermScreenCell>();
        let raw = match *self {
            Self::System => libc::calloc(1, size),
            Self::Engine {
                functions,
                allocdata,
            } => match functions.malloc {
                Some(malloc) => {
                    let raw = malloc(size, allocdata);
                    if !raw.is_null() {
                        ptr::write_bytes(raw.cast::<u8>(), 0, size);
                    }
                    raw
                }
                None => ptr::null_mut(),
            },
        };

        match NonNull::new(raw.cast::<VTermScreenCell>()) {
            Some(cell) => {
                log::trace!("allocated cell {:p} via {}", cell, self.name());
                Ok(cell)
            }
            None => {
                log::debug!("cell allocation via {} failed", self.name());
                Err(ShimError::AllocFailed { size })
            }
        }
    }

    /// Release a cell; null is a no-op
    ///
    /// # Safety
    /// `cell` must be null or have come from [`Self::allocate_cell`] on an
    /// allocator resolved from the same arguments, and not been freed since.
    pub unsafe fn free_cell(&self, cell: *mut VTermScreenCell) {
        if cell.is_null() {
            log::debug!("ignoring free of null cell");
            return;
        }
        log::trace!("freeing cell {:p} via {}", cell, self.name());
        match *self {
            Self::System => libc::free(cell.cast()),
            Self::Engine {
                functions,
                allocdata,
            } => {
                if let Some(free) = functions.free {
                    free(cell.cast(), allocdata);
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::System => "system allocator",
            Self::Engine { .. } => "engine allocator",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counts {
        allocs: AtomicUsize,
        frees: AtomicUsize,
    }

    unsafe extern "C" fn counting_malloc(size: usize, allocdata: *mut c_void) -> *mut c_void {
        let counts = &*(allocdata as *const Counts);
        counts.allocs.fetch_add(1, Ordering::SeqCst);
        let raw = libc::malloc(size);
        // Dirty the block so zero-filling is observable
        ptr::write_bytes(raw.cast::<u8>(), 0xA5, size);
        raw
    }

    unsafe extern "C" fn counting_free(ptr: *mut c_void, allocdata: *mut c_void) {
        let counts = &*(allocdata as *const Counts);
        counts.frees.fetch_add(1, Ordering::SeqCst);
        libc::free(ptr);
    }

    #[test]
    fn test_resolve() {
        let full = VTermAllocatorFunctions {
            malloc: Some(counting_malloc),
            free: Some(counting_free),
        };
        let partial = VTermAllocatorFunctions {
            malloc: Some(counting_malloc),
            free: None,
        };
        unsafe {
            assert!(matches!(
                CellAllocator::resolve(&full, ptr::null_mut()),
                CellAllocator::Engine { .. }
            ));
            assert!(matches!(
                CellAllocator::resolve(&partial, ptr::null_mut()),
                CellAllocator::System
            ));
            assert!(matches!(
                CellAllocator::resolve(ptr::null(), ptr::null_mut()),
                CellAllocator::System
            ));
        }
    }

    #[test]
    fn test_system_cell_is_zeroed() {
        unsafe {
            let cell = CellAllocator::System.allocate_cell().unwrap();
            assert_eq!(*cell.as_ptr(), VTermScreenCell::zeroed());
            CellAllocator::System.free_cell(cell.as_ptr());
        }
    }

    #[test]
    fn test_engine_allocator_pairs() {
        let counts = Counts::default();
        let functions = VTermAllocatorFunctions {
            malloc: Some(counting_malloc),
            free: Some(counting_free),
        };
        let allocdata = &counts as *const Counts as *mut c_void;

        unsafe {
            let allocator = CellAllocator::resolve(&functions, allocdata);
            for _ in 0..16 {
                let cell = allocator.allocate_cell().unwrap();
                assert_eq!(*cell.as_ptr(), VTermScreenCell::zeroed());
                allocator.free_cell(cell.as_ptr());
            }
            allocator.free_cell(ptr::null_mut());
        }

        assert_eq!(counts.allocs.load(Ordering::SeqCst), 16);
        assert_eq!(counts.frees.load(Ordering::SeqCst), 16);
    }

    #[test]
    fn test_engine_allocation_failure() {
        let _ = env_logger::builder().is_test(true).try_init();

        unsafe extern "C" fn failing_malloc(_: usize, _: *mut c_void) -> *mut c_void {
            ptr::null_mut()
        }
        unsafe extern "C" fn noop_free(_: *mut c_void, _: *mut c_void) {}

        let functions = VTermAllocatorFunctions {
            malloc: Some(failing_malloc),
            free: Some(noop_free),
        };
        let result = unsafe { CellAllocator::resolve(&functions, ptr::null_mut()).allocate_cell() };
        assert_eq!(
            result,
            Err(ShimError::AllocFailed {
                size: size_of::<VTermScreenCell>()
            })
        );
    }
}

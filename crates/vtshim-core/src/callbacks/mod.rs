//! Callback tables
//!
//! The engine receives each layer's callbacks as a struct of nullable C
//! function pointers plus a separate `void *user`. [`CallbackTable`] keeps
//! the two together: the engine struct sits at offset 0 so a pointer to the
//! table is also a valid pointer to the engine struct, and the user pointer
//! travels with it.
//!
//! Each submodule defines one layer's struct, its slot setters, a slot
//! bitmask for inspection, and an event enum with a `dispatch` method that
//! calls a slot the way the engine does.

pub mod parser;
pub mod screen;
pub mod state;

use std::ffi::c_void;
use std::fmt;
use std::ptr;

pub use parser::{ParserEvent, ParserSlots, VTermParserCallbacks};
pub use screen::{ScreenEvent, ScreenSlots, VTermScreenCallbacks};
pub use state::{StateEvent, StateSlots, VTermStateCallbacks};

/// Reports which slots of a callback struct are populated
pub trait CallbackSlots {
    type Slots: Copy + fmt::Debug;

    fn set_slots(&self) -> Self::Slots;
}

/// A layer's callback struct plus the user pointer shared by all its slots
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CallbackTable<C> {
    callbacks: C,
    user: *mut c_void,
}

impl<C: Default> Default for CallbackTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Default> CallbackTable<C> {
    /// Table with every slot empty and a null user pointer
    pub fn new() -> Self {
        Self {
            callbacks: C::default(),
            user: ptr::null_mut(),
        }
    }
}

impl<C> CallbackTable<C> {
    pub fn with_user(callbacks: C, user: *mut c_void) -> Self {
        Self { callbacks, user }
    }

    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    pub fn user(&self) -> *mut c_void {
        self.user
    }

    pub fn set_user(&mut self, user: *mut c_void) {
        self.user = user;
    }

    /// Pointer to hand to the engine's `*_set_callbacks`
    ///
    /// The table must outlive the engine's use of it.
    pub fn engine_ptr(&self) -> *const C {
        &self.callbacks
    }
}

impl<C: CallbackSlots> CallbackTable<C> {
    pub fn set_slots(&self) -> C::Slots {
        self.callbacks.set_slots()
    }
}

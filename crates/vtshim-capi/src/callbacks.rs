//! Callback table exports
//!
//! A table is heap-allocated by `vterm_<layer>_callbacks_new` and starts with
//! every slot null. Slots are filled one at a time, then the pointer from
//! `vterm_<layer>_callbacks_engine_ptr` and the user pointer are handed to
//! the engine's `*_set_callbacks`. The table must outlive that registration.

use std::ffi::c_void;
use std::ptr;

use vtshim_core::callbacks::{parser, screen, state};
use vtshim_core::callbacks::{VTermParserCallbacks, VTermScreenCallbacks, VTermStateCallbacks};
use vtshim_core::CallbackTable;

macro_rules! table_exports {
    (
        $callbacks:ty {
            new: $new:ident,
            free: $free:ident,
            set_user: $set_user:ident,
            get_user: $get_user:ident,
            engine_ptr: $engine_ptr:ident,
            slots: $slots:ident,
        }
        $($setter:ident => $method:ident($slot_fn:ty);)*
    ) => {
        /// Allocate a table with every slot null and a null user pointer
        #[no_mangle]
        pub extern "C" fn $new() -> *mut CallbackTable<$callbacks> {
            Box::into_raw(Box::new(CallbackTable::<$callbacks>::new()))
        }

        /// # Safety
        /// `table` must be null or come from the matching `_new`, not yet
        /// freed, and no longer registered with the engine.
        #[no_mangle]
        pub unsafe extern "C" fn $free(table: *mut CallbackTable<$callbacks>) {
            if table.is_null() {
                log::debug!("ignoring free of null {}", stringify!($callbacks));
                return;
            }
            drop(Box::from_raw(table));
        }

        /// # Safety
        /// `table` must be null or valid.
        #[no_mangle]
        pub unsafe extern "C" fn $set_user(
            table: *mut CallbackTable<$callbacks>,
            user: *mut c_void,
        ) {
            if let Some(table) = table.as_mut() {
                table.set_user(user);
            }
        }

        /// # Safety
        /// `table` must be null or valid.
        #[no_mangle]
        pub unsafe extern "C" fn $get_user(table: *const CallbackTable<$callbacks>) -> *mut c_void {
            table.as_ref().map_or(ptr::null_mut(), |table| table.user())
        }

        /// Pointer to pass as the engine's `callbacks` argument
        ///
        /// # Safety
        /// `table` must be null or valid.
        #[no_mangle]
        pub unsafe extern "C" fn $engine_ptr(
            table: *const CallbackTable<$callbacks>,
        ) -> *const $callbacks {
            table.as_ref().map_or(ptr::null(), |table| table.engine_ptr())
        }

        /// Bitmask of populated slots, in slot order from bit 0
        ///
        /// # Safety
        /// `table` must be null or valid.
        #[no_mangle]
        pub unsafe extern "C" fn $slots(table: *const CallbackTable<$callbacks>) -> u32 {
            table.as_ref().map_or(0, |table| table.set_slots().bits())
        }

        $(
            /// Store `callback` in its slot; null clears it
            ///
            /// # Safety
            /// `table` must be null or valid. `callback` is not checked.
            #[no_mangle]
            pub unsafe extern "C" fn $setter(
                table: *mut CallbackTable<$callbacks>,
                callback: Option<$slot_fn>,
            ) {
                if let Some(table) = table.as_mut() {
                    table.callbacks_mut().$method(callback);
                }
            }
        )*
    };
}

table_exports! {
    VTermParserCallbacks {
        new: vterm_parser_callbacks_new,
        free: vterm_parser_callbacks_free,
        set_user: vterm_parser_callbacks_set_user,
        get_user: vterm_parser_callbacks_get_user,
        engine_ptr: vterm_parser_callbacks_engine_ptr,
        slots: vterm_parser_callbacks_slots,
    }
    vterm_parser_callbacks_set_text => set_text(parser::TextFn);
    vterm_parser_callbacks_set_control => set_control(parser::ControlFn);
    vterm_parser_callbacks_set_escape => set_escape(parser::EscapeFn);
    vterm_parser_callbacks_set_csi => set_csi(parser::CsiFn);
    vterm_parser_callbacks_set_osc => set_osc(parser::OscFn);
    vterm_parser_callbacks_set_dcs => set_dcs(parser::DcsFn);
    vterm_parser_callbacks_set_resize => set_resize(parser::ResizeFn);
}

table_exports! {
    VTermStateCallbacks {
        new: vterm_state_callbacks_new,
        free: vterm_state_callbacks_free,
        set_user: vterm_state_callbacks_set_user,
        get_user: vterm_state_callbacks_get_user,
        engine_ptr: vterm_state_callbacks_engine_ptr,
        slots: vterm_state_callbacks_slots,
    }
    vterm_state_callbacks_set_putglyph => set_putglyph(state::PutGlyphFn);
    vterm_state_callbacks_set_movecursor => set_movecursor(state::MoveCursorFn);
    vterm_state_callbacks_set_scrollrect => set_scrollrect(state::ScrollRectFn);
    vterm_state_callbacks_set_moverect => set_moverect(state::MoveRectFn);
    vterm_state_callbacks_set_erase => set_erase(state::EraseFn);
    vterm_state_callbacks_set_initpen => set_initpen(state::InitPenFn);
    vterm_state_callbacks_set_setpenattr => set_setpenattr(state::SetPenAttrFn);
    vterm_state_callbacks_set_settermprop => set_settermprop(state::SetTermPropFn);
    vterm_state_callbacks_set_bell => set_bell(state::BellFn);
    vterm_state_callbacks_set_resize => set_resize(state::ResizeFn);
    vterm_state_callbacks_set_setlineinfo => set_setlineinfo(state::SetLineInfoFn);
}

table_exports! {
    VTermScreenCallbacks {
        new: vterm_screen_callbacks_new,
        free: vterm_screen_callbacks_free,
        set_user: vterm_screen_callbacks_set_user,
        get_user: vterm_screen_callbacks_get_user,
        engine_ptr: vterm_screen_callbacks_engine_ptr,
        slots: vterm_screen_callbacks_slots,
    }
    vterm_screen_callbacks_set_damage => set_damage(screen::DamageFn);
    vterm_screen_callbacks_set_moverect => set_moverect(screen::MoveRectFn);
    vterm_screen_callbacks_set_movecursor => set_movecursor(screen::MoveCursorFn);
    vterm_screen_callbacks_set_settermprop => set_settermprop(screen::SetTermPropFn);
    vterm_screen_callbacks_set_bell => set_bell(screen::BellFn);
    vterm_screen_callbacks_set_resize => set_resize(screen::ResizeFn);
    vterm_screen_callbacks_set_sb_pushline => set_sb_pushline(screen::SbPushLineFn);
    vterm_screen_callbacks_set_sb_popline => set_sb_popline(screen::SbPopLineFn);
}

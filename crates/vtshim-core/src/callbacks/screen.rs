//! Screen layer callbacks

use std::ffi::{c_int, c_void};
use std::mem::{offset_of, size_of};

use bitflags::bitflags;

use super::{CallbackSlots, CallbackTable};
use crate::cell::VTermScreenCell;
use crate::geom::{VTermPos, VTermRect};
use crate::value::{VTermProp, VTermValue};

pub type DamageFn = unsafe extern "C" fn(rect: VTermRect, user: *mut c_void) -> c_int;
pub type MoveRectFn =
    unsafe extern "C" fn(dest: VTermRect, src: VTermRect, user: *mut c_void) -> c_int;
pub type MoveCursorFn = unsafe extern "C" fn(
    pos: VTermPos,
    oldpos: VTermPos,
    visible: c_int,
    user: *mut c_void,
) -> c_int;
pub type SetTermPropFn =
    unsafe extern "C" fn(prop: VTermProp, val: *mut VTermValue, user: *mut c_void) -> c_int;
pub type BellFn = unsafe extern "C" fn(user: *mut c_void) -> c_int;
pub type ResizeFn = unsafe extern "C" fn(rows: c_int, cols: c_int, user: *mut c_void) -> c_int;
pub type SbPushLineFn =
    unsafe extern "C" fn(cols: c_int, cells: *const VTermScreenCell, user: *mut c_void) -> c_int;
pub type SbPopLineFn =
    unsafe extern "C" fn(cols: c_int, cells: *mut VTermScreenCell, user: *mut c_void) -> c_int;

/// The engine's `VTermScreenCallbacks`; field order is the ABI
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VTermScreenCallbacks {
    pub damage: Option<DamageFn>,
    pub moverect: Option<MoveRectFn>,
    pub movecursor: Option<MoveCursorFn>,
    pub settermprop: Option<SetTermPropFn>,
    pub bell: Option<BellFn>,
    pub resize: Option<ResizeFn>,
    pub sb_pushline: Option<SbPushLineFn>,
    pub sb_popline: Option<SbPopLineFn>,
}

const _: () = {
    const SLOT: usize = size_of::<Option<DamageFn>>();
    const TABLE: usize = size_of::<[Option<DamageFn>; 8]>();
    assert!(size_of::<VTermScreenCallbacks>() == TABLE);
    assert!(offset_of!(VTermScreenCallbacks, damage) == 0);
    assert!(offset_of!(VTermScreenCallbacks, moverect) == SLOT);
    assert!(offset_of!(VTermScreenCallbacks, movecursor) == 2 * SLOT);
    assert!(offset_of!(VTermScreenCallbacks, settermprop) == 3 * SLOT);
    assert!(offset_of!(VTermScreenCallbacks, bell) == 4 * SLOT);
    assert!(offset_of!(VTermScreenCallbacks, resize) == 5 * SLOT);
    assert!(offset_of!(VTermScreenCallbacks, sb_pushline) == 6 * SLOT);
    assert!(offset_of!(VTermScreenCallbacks, sb_popline) == 7 * SLOT);
};

bitflags! {
    /// Populated slots of a [`VTermScreenCallbacks`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScreenSlots: u32 {
        const DAMAGE = 1 << 0;
        const MOVERECT = 1 << 1;
        const MOVECURSOR = 1 << 2;
        const SETTERMPROP = 1 << 3;
        const BELL = 1 << 4;
        const RESIZE = 1 << 5;
        const SB_PUSHLINE = 1 << 6;
        const SB_POPLINE = 1 << 7;
    }
}

impl VTermScreenCallbacks {
    pub fn set_damage(&mut self, callback: Option<DamageFn>) {
        self.damage = callback;
    }

    pub fn set_moverect(&mut self, callback: Option<MoveRectFn>) {
        self.moverect = callback;
    }

    pub fn set_movecursor(&mut self, callback: Option<MoveCursorFn>) {
        self.movecursor = callback;
    }

    pub fn set_settermprop(&mut self, callback: Option<SetTermPropFn>) {
        self.settermprop = callback;
    }

    pub fn set_bell(&mut self, callback: Option<BellFn>) {
        self.bell = callback;
    }

    pub fn set_resize(&mut self, callback: Option<ResizeFn>) {
        self.resize = callback;
    }

    /// Called with a line leaving the top of the screen
    pub fn set_sb_pushline(&mut self, callback: Option<SbPushLineFn>) {
        self.sb_pushline = callback;
    }

    /// Called to refill a line from scrollback; return 0 if none is available
    pub fn set_sb_popline(&mut self, callback: Option<SbPopLineFn>) {
        self.sb_popline = callback;
    }

    /// Invoke the slot for `event`, as the engine would
    ///
    /// Returns `None` without calling anything when the slot is empty.
    ///
    /// # Safety
    /// Every populated slot must be a function of the declared signature
    /// that is sound to call with `user`.
    pub unsafe fn dispatch(&self, event: ScreenEvent<'_>, user: *mut c_void) -> Option<c_int> {
        let slot = event.slot();
        let status = match event {
            ScreenEvent::Damage(rect) => self.damage.map(|cb| cb(rect, user)),
            ScreenEvent::MoveRect { dest, src } => self.moverect.map(|cb| cb(dest, src, user)),
            ScreenEvent::MoveCursor {
                pos,
                old_pos,
                visible,
            } => self
                .movecursor
                .map(|cb| cb(pos, old_pos, visible as c_int, user)),
            ScreenEvent::SetTermProp { prop, value } => {
                self.settermprop.map(|cb| cb(prop, value, user))
            }
            ScreenEvent::Bell => self.bell.map(|cb| cb(user)),
            ScreenEvent::Resize { rows, cols } => self.resize.map(|cb| cb(rows, cols, user)),
            ScreenEvent::SbPushLine(cells) => self
                .sb_pushline
                .map(|cb| cb(cells.len() as c_int, cells.as_ptr(), user)),
            ScreenEvent::SbPopLine(cells) => self
                .sb_popline
                .map(|cb| cb(cells.len() as c_int, cells.as_mut_ptr(), user)),
        };
        if status.is_none() {
            log::trace!("screen slot {:?} empty, event dropped", slot);
        }
        status
    }
}

impl CallbackSlots for VTermScreenCallbacks {
    type Slots = ScreenSlots;

    fn set_slots(&self) -> ScreenSlots {
        let mut slots = ScreenSlots::empty();
        slots.set(ScreenSlots::DAMAGE, self.damage.is_some());
        slots.set(ScreenSlots::MOVERECT, self.moverect.is_some());
        slots.set(ScreenSlots::MOVECURSOR, self.movecursor.is_some());
        slots.set(ScreenSlots::SETTERMPROP, self.settermprop.is_some());
        slots.set(ScreenSlots::BELL, self.bell.is_some());
        slots.set(ScreenSlots::RESIZE, self.resize.is_some());
        slots.set(ScreenSlots::SB_PUSHLINE, self.sb_pushline.is_some());
        slots.set(ScreenSlots::SB_POPLINE, self.sb_popline.is_some());
        slots
    }
}

/// An event the screen layer reports
#[derive(Debug)]
pub enum ScreenEvent<'a> {
    Damage(VTermRect),
    MoveRect { dest: VTermRect, src: VTermRect },
    MoveCursor {
        pos: VTermPos,
        old_pos: VTermPos,
        visible: bool,
    },
    SetTermProp {
        prop: VTermProp,
        value: &'a mut VTermValue,
    },
    Bell,
    Resize { rows: c_int, cols: c_int },
    SbPushLine(&'a [VTermScreenCell]),
    SbPopLine(&'a mut [VTermScreenCell]),
}

impl ScreenEvent<'_> {
    pub fn slot(&self) -> ScreenSlots {
        match self {
            Self::Damage(_) => ScreenSlots::DAMAGE,
            Self::MoveRect { .. } => ScreenSlots::MOVERECT,
            Self::MoveCursor { .. } => ScreenSlots::MOVECURSOR,
            Self::SetTermProp { .. } => ScreenSlots::SETTERMPROP,
            Self::Bell => ScreenSlots::BELL,
            Self::Resize { .. } => ScreenSlots::RESIZE,
            Self::SbPushLine(_) => ScreenSlots::SB_PUSHLINE,
            Self::SbPopLine(_) => ScreenSlots::SB_POPLINE,
        }
    }
}

impl CallbackTable<VTermScreenCallbacks> {
    /// Dispatch with the table's own user pointer
    ///
    /// # Safety
    /// See [`VTermScreenCallbacks::dispatch`].
    pub unsafe fn dispatch(&self, event: ScreenEvent<'_>) -> Option<c_int> {
        self.callbacks().dispatch(event, self.user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ScreenCell;

    unsafe extern "C" fn count_bell(user: *mut c_void) -> c_int {
        *(user as *mut u32) += 1;
        1
    }

    unsafe extern "C" fn record_pushline(
        cols: c_int,
        cells: *const VTermScreenCell,
        user: *mut c_void,
    ) -> c_int {
        let lines = &mut *(user as *mut Vec<String>);
        let line = ScreenCell::line_from_ptr(cells, cols as usize);
        lines.push(line.iter().map(ScreenCell::text).collect());
        1
    }

    #[test]
    fn test_new_table_is_empty() {
        let table: CallbackTable<VTermScreenCallbacks> = CallbackTable::new();
        assert_eq!(table.set_slots(), ScreenSlots::empty());
    }

    #[test]
    fn test_only_set_slot_is_reported() {
        let mut callbacks = VTermScreenCallbacks::default();
        callbacks.set_sb_pushline(Some(record_pushline));
        assert_eq!(callbacks.set_slots(), ScreenSlots::SB_PUSHLINE);

        callbacks.set_sb_pushline(None);
        assert_eq!(callbacks.set_slots(), ScreenSlots::empty());
    }

    #[test]
    fn test_dispatch_skips_empty_slots() {
        let mut rings = 0u32;
        let mut table = CallbackTable::with_user(
            VTermScreenCallbacks::default(),
            &mut rings as *mut u32 as *mut c_void,
        );

        assert_eq!(unsafe { table.dispatch(ScreenEvent::Bell) }, None);

        table.callbacks_mut().set_bell(Some(count_bell));
        assert_eq!(unsafe { table.dispatch(ScreenEvent::Bell) }, Some(1));
        assert_eq!(
            unsafe { table.dispatch(ScreenEvent::Resize { rows: 2, cols: 2 }) },
            None
        );
        assert_eq!(rings, 1);
    }

    #[test]
    fn test_dispatch_pushline() {
        let mut lines: Vec<String> = Vec::new();
        let mut callbacks = VTermScreenCallbacks::default();
        callbacks.set_sb_pushline(Some(record_pushline));
        let user = &mut lines as *mut Vec<String> as *mut c_void;
        let table = CallbackTable::with_user(callbacks, user);

        let line = [ScreenCell::new('o').to_raw(), ScreenCell::new('k').to_raw()];
        let status = unsafe { table.dispatch(ScreenEvent::SbPushLine(&line)) };
        assert_eq!(status, Some(1));
        assert_eq!(lines, vec!["ok".to_string()]);
    }
}

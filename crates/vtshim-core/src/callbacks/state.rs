//! State layer callbacks

use std::ffi::{c_int, c_void};
use std::mem::{offset_of, size_of};

use bitflags::bitflags;

use super::{CallbackSlots, CallbackTable};
use crate::geom::{VTermLineInfo, VTermPos, VTermRect};
use crate::glyph::VTermGlyphInfo;
use crate::value::{VTermAttr, VTermProp, VTermValue};

pub type PutGlyphFn =
    unsafe extern "C" fn(info: *mut VTermGlyphInfo, pos: VTermPos, user: *mut c_void) -> c_int;
pub type MoveCursorFn = unsafe extern "C" fn(
    pos: VTermPos,
    oldpos: VTermPos,
    visible: c_int,
    user: *mut c_void,
) -> c_int;
pub type ScrollRectFn = unsafe extern "C" fn(
    rect: VTermRect,
    downward: c_int,
    rightward: c_int,
    user: *mut c_void,
) -> c_int;
pub type MoveRectFn =
    unsafe extern "C" fn(dest: VTermRect, src: VTermRect, user: *mut c_void) -> c_int;
pub type EraseFn =
    unsafe extern "C" fn(rect: VTermRect, selective: c_int, user: *mut c_void) -> c_int;
pub type InitPenFn = unsafe extern "C" fn(user: *mut c_void) -> c_int;
pub type SetPenAttrFn =
    unsafe extern "C" fn(attr: VTermAttr, val: *mut VTermValue, user: *mut c_void) -> c_int;
pub type SetTermPropFn =
    unsafe extern "C" fn(prop: VTermProp, val: *mut VTermValue, user: *mut c_void) -> c_int;
pub type BellFn = unsafe extern "C" fn(user: *mut c_void) -> c_int;
pub type ResizeFn = unsafe extern "C" fn(
    rows: c_int,
    cols: c_int,
    delta: *mut VTermPos,
    user: *mut c_void,
) -> c_int;
pub type SetLineInfoFn = unsafe extern "C" fn(
    row: c_int,
    newinfo: *const VTermLineInfo,
    oldinfo: *const VTermLineInfo,
    user: *mut c_void,
) -> c_int;

/// The engine's `VTermStateCallbacks`; field order is the ABI
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VTermStateCallbacks {
    pub putglyph: Option<PutGlyphFn>,
    pub movecursor: Option<MoveCursorFn>,
    pub scrollrect: Option<ScrollRectFn>,
    pub moverect: Option<MoveRectFn>,
    pub erase: Option<EraseFn>,
    pub initpen: Option<InitPenFn>,
    pub setpenattr: Option<SetPenAttrFn>,
    pub settermprop: Option<SetTermPropFn>,
    pub bell: Option<BellFn>,
    pub resize: Option<ResizeFn>,
    pub setlineinfo: Option<SetLineInfoFn>,
}

const _: () = {
    const SLOT: usize = size_of::<Option<PutGlyphFn>>();
    const TABLE: usize = size_of::<[Option<PutGlyphFn>; 11]>();
    assert!(size_of::<VTermStateCallbacks>() == TABLE);
    assert!(offset_of!(VTermStateCallbacks, putglyph) == 0);
    assert!(offset_of!(VTermStateCallbacks, movecursor) == SLOT);
    assert!(offset_of!(VTermStateCallbacks, scrollrect) == 2 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, moverect) == 3 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, erase) == 4 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, initpen) == 5 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, setpenattr) == 6 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, settermprop) == 7 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, bell) == 8 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, resize) == 9 * SLOT);
    assert!(offset_of!(VTermStateCallbacks, setlineinfo) == 10 * SLOT);
};

bitflags! {
    /// Populated slots of a [`VTermStateCallbacks`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateSlots: u32 {
        const PUTGLYPH = 1 << 0;
        const MOVECURSOR = 1 << 1;
        const SCROLLRECT = 1 << 2;
        const MOVERECT = 1 << 3;
        const ERASE = 1 << 4;
        const INITPEN = 1 << 5;
        const SETPENATTR = 1 << 6;
        const SETTERMPROP = 1 << 7;
        const BELL = 1 << 8;
        const RESIZE = 1 << 9;
        const SETLINEINFO = 1 << 10;
    }
}

impl VTermStateCallbacks {
    pub fn set_putglyph(&mut self, callback: Option<PutGlyphFn>) {
        self.putglyph = callback;
    }

    pub fn set_movecursor(&mut self, callback: Option<MoveCursorFn>) {
        self.movecursor = callback;
    }

    pub fn set_scrollrect(&mut self, callback: Option<ScrollRectFn>) {
        self.scrollrect = callback;
    }

    pub fn set_moverect(&mut self, callback: Option<MoveRectFn>) {
        self.moverect = callback;
    }

    pub fn set_erase(&mut self, callback: Option<EraseFn>) {
        self.erase = callback;
    }

    pub fn set_initpen(&mut self, callback: Option<InitPenFn>) {
        self.initpen = callback;
    }

    pub fn set_setpenattr(&mut self, callback: Option<SetPenAttrFn>) {
        self.setpenattr = callback;
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

    pub fn set_setlineinfo(&mut self, callback: Option<SetLineInfoFn>) {
        self.setlineinfo = callback;
    }

    /// Invoke the slot for `event`, as the engine would
    ///
    /// Returns `None` without calling anything when the slot is empty.
    ///
    /// # Safety
    /// Every populated slot must be a function of the declared signature
    /// that is sound to call with `user`. A `PutGlyph` event's glyph info
    /// must have a valid `chars` pointer.
    pub unsafe fn dispatch(&self, event: StateEvent<'_>, user: *mut c_void) -> Option<c_int> {
        let slot = event.slot();
        let status = match event {
            StateEvent::PutGlyph { info, pos } => self.putglyph.map(|cb| cb(info, pos, user)),
            StateEvent::MoveCursor {
                pos,
                old_pos,
                visible,
            } => self
                .movecursor
                .map(|cb| cb(pos, old_pos, visible as c_int, user)),
            StateEvent::ScrollRect {
                rect,
                downward,
                rightward,
            } => self
                .scrollrect
                .map(|cb| cb(rect, downward, rightward, user)),
            StateEvent::MoveRect { dest, src } => self.moverect.map(|cb| cb(dest, src, user)),
            StateEvent::Erase { rect, selective } => {
                self.erase.map(|cb| cb(rect, selective as c_int, user))
            }
            StateEvent::InitPen => self.initpen.map(|cb| cb(user)),
            StateEvent::SetPenAttr { attr, value } => {
                self.setpenattr.map(|cb| cb(attr, value, user))
            }
            StateEvent::SetTermProp { prop, value } => {
                self.settermprop.map(|cb| cb(prop, value, user))
            }
            StateEvent::Bell => self.bell.map(|cb| cb(user)),
            StateEvent::Resize { rows, cols, delta } => {
                self.resize.map(|cb| cb(rows, cols, delta, user))
            }
            StateEvent::SetLineInfo { row, new, old } => {
                self.setlineinfo.map(|cb| cb(row, new, old, user))
            }
        };
        if status.is_none() {
            log::trace!("state slot {:?} empty, event dropped", slot);
        }
        status
    }
}

impl CallbackSlots for VTermStateCallbacks {
    type Slots = StateSlots;

    fn set_slots(&self) -> StateSlots {
        let mut slots = StateSlots::empty();
        slots.set(StateSlots::PUTGLYPH, self.putglyph.is_some());
        slots.set(StateSlots::MOVECURSOR, self.movecursor.is_some());
        slots.set(StateSlots::SCROLLRECT, self.scrollrect.is_some());
        slots.set(StateSlots::MOVERECT, self.moverect.is_some());
        slots.set(StateSlots::ERASE, self.erase.is_some());
        slots.set(StateSlots::INITPEN, self.initpen.is_some());
        slots.set(StateSlots::SETPENATTR, self.setpenattr.is_some());
        slots.set(StateSlots::SETTERMPROP, self.settermprop.is_some());
        slots.set(StateSlots::BELL, self.bell.is_some());
        slots.set(StateSlots::RESIZE, self.resize.is_some());
        slots.set(StateSlots::SETLINEINFO, self.setlineinfo.is_some());
        slots
    }
}

/// An event the state layer reports
#[derive(Debug)]
pub enum StateEvent<'a> {
    PutGlyph {
        info: &'a mut VTermGlyphInfo,
        pos: VTermPos,
    },
    MoveCursor {
        pos: VTermPos,
        old_pos: VTermPos,
        visible: bool,
    },
    ScrollRect {
        rect: VTermRect,
        downward: c_int,
        rightward: c_int,
    },
    MoveRect { dest: VTermRect, src: VTermRect },
    Erase { rect: VTermRect, selective: bool },
    InitPen,
    SetPenAttr {
        attr: VTermAttr,
        value: &'a mut VTermValue,
    },
    SetTermProp {
        prop: VTermProp,
        value: &'a mut VTermValue,
    },
    Bell,
    Resize {
        rows: c_int,
        cols: c_int,
        delta: &'a mut VTermPos,
    },
    SetLineInfo {
        row: c_int,
        new: &'a VTermLineInfo,
        old: &'a VTermLineInfo,
    },
}

impl StateEvent<'_> {
    pub fn slot(&self) -> StateSlots {
        match self {
            Self::PutGlyph { .. } => StateSlots::PUTGLYPH,
            Self::MoveCursor { .. } => StateSlots::MOVECURSOR,
            Self::ScrollRect { .. } => StateSlots::SCROLLRECT,
            Self::MoveRect { .. } => StateSlots::MOVERECT,
            Self::Erase { .. } => StateSlots::ERASE,
            Self::InitPen => StateSlots::INITPEN,
            Self::SetPenAttr { .. } => StateSlots::SETPENATTR,
            Self::SetTermProp { .. } => StateSlots::SETTERMPROP,
            Self::Bell => StateSlots::BELL,
            Self::Resize { .. } => StateSlots::RESIZE,
            Self::SetLineInfo { .. } => StateSlots::SETLINEINFO,
        }
    }
}

impl CallbackTable<VTermStateCallbacks> {
    /// Dispatch with the table's own user pointer
    ///
    /// # Safety
    /// See [`VTermStateCallbacks::dispatch`].
    pub unsafe fn dispatch(&self, event: StateEvent<'_>) -> Option<c_int> {
        self.callbacks().dispatch(event, self.user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GlyphInfo;

    unsafe extern "C" fn capture_glyph(
        info: *mut VTermGlyphInfo,
        pos: VTermPos,
        user: *mut c_void,
    ) -> c_int {
        let seen = &mut *(user as *mut Vec<(GlyphInfo, VTermPos)>);
        if let Some(glyph) = GlyphInfo::from_ptr(info) {
            seen.push((glyph, pos));
        }
        1
    }

    unsafe extern "C" fn shift_delta(
        rows: c_int,
        _cols: c_int,
        delta: *mut VTermPos,
        _user: *mut c_void,
    ) -> c_int {
        (*delta).row = -rows;
        1
    }

    unsafe extern "C" fn read_line_info(
        row: c_int,
        newinfo: *const VTermLineInfo,
        oldinfo: *const VTermLineInfo,
        _user: *mut c_void,
    ) -> c_int {
        row * 100 + ((*newinfo).doubleheight() * 10 + (*oldinfo).doublewidth()) as c_int
    }

    #[test]
    fn test_slots_track_setters() {
        let mut callbacks = VTermStateCallbacks::default();
        assert!(callbacks.set_slots().is_empty());

        callbacks.set_putglyph(Some(capture_glyph));
        callbacks.set_resize(Some(shift_delta));
        let expected = StateSlots::PUTGLYPH | StateSlots::RESIZE;
        assert_eq!(callbacks.set_slots(), expected);
    }

    #[test]
    fn test_dispatch_putglyph() {
        let mut seen: Vec<(GlyphInfo, VTermPos)> = Vec::new();
        let mut callbacks = VTermStateCallbacks::default();
        callbacks.set_putglyph(Some(capture_glyph));
        let table = CallbackTable::with_user(callbacks, &mut seen as *mut _ as *mut c_void);

        let chars = [0x7Au32, 0];
        let mut info = VTermGlyphInfo::new(chars.as_ptr(), 1, true, false, 0);
        let pos = VTermPos::new(3, 4);
        let event = StateEvent::PutGlyph {
            info: &mut info,
            pos,
        };
        let status = unsafe { table.dispatch(event) };

        assert_eq!(status, Some(1));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.chars, vec!['z']);
        assert!(seen[0].0.protected_cell);
        assert_eq!(seen[0].1, pos);
    }

    #[test]
    fn test_dispatch_resize_writes_delta() {
        let mut callbacks = VTermStateCallbacks::default();
        callbacks.set_resize(Some(shift_delta));

        let mut delta = VTermPos::default();
        let status = unsafe {
            callbacks.dispatch(
                StateEvent::Resize {
                    rows: 3,
                    cols: 80,
                    delta: &mut delta,
                },
                std::ptr::null_mut(),
            )
        };
        assert_eq!(status, Some(1));
        assert_eq!(delta.row, -3);
    }

    #[test]
    fn test_dispatch_setlineinfo() {
        let mut callbacks = VTermStateCallbacks::default();
        callbacks.set_setlineinfo(Some(read_line_info));

        let mut new = VTermLineInfo::default();
        new.set_doubleheight(2);
        let mut old = VTermLineInfo::default();
        old.set_doublewidth(1);

        let status = unsafe {
            callbacks.dispatch(
                StateEvent::SetLineInfo {
                    row: 4,
                    new: &new,
                    old: &old,
                },
                std::ptr::null_mut(),
            )
        };
        assert_eq!(status, Some(421));
        assert_eq!(
            unsafe { callbacks.dispatch(StateEvent::Bell, std::ptr::null_mut()) },
            None
        );
    }
}

//! Parser layer callbacks

use std::ffi::{c_char, c_int, c_long, c_uchar, c_void, CStr};
use std::mem::{offset_of, size_of};
use std::ptr;

use bitflags::bitflags;

use super::{CallbackSlots, CallbackTable};

pub type TextFn =
    unsafe extern "C" fn(bytes: *const c_char, len: usize, user: *mut c_void) -> c_int;
pub type ControlFn = unsafe extern "C" fn(control: c_uchar, user: *mut c_void) -> c_int;
pub type EscapeFn =
    unsafe extern "C" fn(bytes: *const c_char, len: usize, user: *mut c_void) -> c_int;
pub type CsiFn = unsafe extern "C" fn(
    leader: *const c_char,
    args: *const c_long,
    argcount: c_int,
    intermed: *const c_char,
    command: c_char,
    user: *mut c_void,
) -> c_int;
pub type OscFn =
    unsafe extern "C" fn(command: *const c_char, cmdlen: usize, user: *mut c_void) -> c_int;
pub type DcsFn =
    unsafe extern "C" fn(command: *const c_char, cmdlen: usize, user: *mut c_void) -> c_int;
pub type ResizeFn = unsafe extern "C" fn(rows: c_int, cols: c_int, user: *mut c_void) -> c_int;

/// The engine's `VTermParserCallbacks`; field order is the ABI
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VTermParserCallbacks {
    pub text: Option<TextFn>,
    pub control: Option<ControlFn>,
    pub escape: Option<EscapeFn>,
    pub csi: Option<CsiFn>,
    pub osc: Option<OscFn>,
    pub dcs: Option<DcsFn>,
    pub resize: Option<ResizeFn>,
}

const _: () = {
    const SLOT: usize = size_of::<Option<TextFn>>();
    const TABLE: usize = size_of::<[Option<TextFn>; 7]>();
    assert!(size_of::<VTermParserCallbacks>() == TABLE);
    assert!(offset_of!(VTermParserCallbacks, text) == 0);
    assert!(offset_of!(VTermParserCallbacks, control) == SLOT);
    assert!(offset_of!(VTermParserCallbacks, escape) == 2 * SLOT);
    assert!(offset_of!(VTermParserCallbacks, csi) == 3 * SLOT);
    assert!(offset_of!(VTermParserCallbacks, osc) == 4 * SLOT);
    assert!(offset_of!(VTermParserCallbacks, dcs) == 5 * SLOT);
    assert!(offset_of!(VTermParserCallbacks, resize) == 6 * SLOT);
};

bitflags! {
    /// Populated slots of a [`VTermParserCallbacks`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParserSlots: u32 {
        const TEXT = 1 << 0;
        const CONTROL = 1 << 1;
        const ESCAPE = 1 << 2;
        const CSI = 1 << 3;
        const OSC = 1 << 4;
        const DCS = 1 << 5;
        const RESIZE = 1 << 6;
    }
}

impl VTermParserCallbacks {
    /// Called with a run of printable bytes; return how many were consumed
    pub fn set_text(&mut self, callback: Option<TextFn>) {
        self.text = callback;
    }

    pub fn set_control(&mut self, callback: Option<ControlFn>) {
        self.control = callback;
    }

    pub fn set_escape(&mut self, callback: Option<EscapeFn>) {
        self.escape = callback;
    }

    /// Called once per complete CSI sequence
    pub fn set_csi(&mut self, callback: Option<CsiFn>) {
        self.csi = callback;
    }

    pub fn set_osc(&mut self, callback: Option<OscFn>) {
        self.osc = callback;
    }

    pub fn set_dcs(&mut self, callback: Option<DcsFn>) {
        self.dcs = callback;
    }

    pub fn set_resize(&mut self, callback: Option<ResizeFn>) {
        self.resize = callback;
    }

    /// Invoke the slot for `event`, as the engine would
    ///
    /// Returns `None` without calling anything when the slot is empty.
    ///
    /// # Safety
    /// Every populated slot must be a function of the declared signature
    /// that is sound to call with `user`.
    pub unsafe fn dispatch(&self, event: ParserEvent<'_>, user: *mut c_void) -> Option<c_int> {
        let slot = event.slot();
        let status = match event {
            ParserEvent::Text(bytes) => self
                .text
                .map(|cb| cb(bytes.as_ptr().cast(), bytes.len(), user)),
            ParserEvent::Control(byte) => self.control.map(|cb| cb(byte, user)),
            ParserEvent::Escape(bytes) => self
                .escape
                .map(|cb| cb(bytes.as_ptr().cast(), bytes.len(), user)),
            ParserEvent::Csi {
                leader,
                args,
                intermed,
                command,
            } => self.csi.map(|cb| {
                cb(
                    leader.map_or(ptr::null(), CStr::as_ptr),
                    args.as_ptr(),
                    args.len() as c_int,
                    intermed.map_or(ptr::null(), CStr::as_ptr),
                    command as c_char,
                    user,
                )
            }),
            ParserEvent::Osc(command) => self
                .osc
                .map(|cb| cb(command.as_ptr().cast(), command.len(), user)),
            ParserEvent::Dcs(command) => self
                .dcs
                .map(|cb| cb(command.as_ptr().cast(), command.len(), user)),
            ParserEvent::Resize { rows, cols } => self.resize.map(|cb| cb(rows, cols, user)),
        };
        if status.is_none() {
            log::trace!("parser slot {:?} empty, event dropped", slot);
        }
        status
    }
}

impl CallbackSlots for VTermParserCallbacks {
    type Slots = ParserSlots;

    fn set_slots(&self) -> ParserSlots {
        let mut slots = ParserSlots::empty();
        slots.set(ParserSlots::TEXT, self.text.is_some());
        slots.set(ParserSlots::CONTROL, self.control.is_some());
        slots.set(ParserSlots::ESCAPE, self.escape.is_some());
        slots.set(ParserSlots::CSI, self.csi.is_some());
        slots.set(ParserSlots::OSC, self.osc.is_some());
        slots.set(ParserSlots::DCS, self.dcs.is_some());
        slots.set(ParserSlots::RESIZE, self.resize.is_some());
        slots
    }
}

/// A parsed unit the parser reports
#[derive(Debug, Clone, Copy)]
pub enum ParserEvent<'a> {
    Text(&'a [u8]),
    Control(u8),
    Escape(&'a [u8]),
    Csi {
        /// Private-mode leader bytes such as `?`
        leader: Option<&'a CStr>,
        args: &'a [c_long],
        intermed: Option<&'a CStr>,
        command: u8,
    },
    Osc(&'a [u8]),
    Dcs(&'a [u8]),
    Resize { rows: c_int, cols: c_int },
}

impl ParserEvent<'_> {
    pub fn slot(&self) -> ParserSlots {
        match self {
            Self::Text(_) => ParserSlots::TEXT,
            Self::Control(_) => ParserSlots::CONTROL,
            Self::Escape(_) => ParserSlots::ESCAPE,
            Self::Csi { .. } => ParserSlots::CSI,
            Self::Osc(_) => ParserSlots::OSC,
            Self::Dcs(_) => ParserSlots::DCS,
            Self::Resize { .. } => ParserSlots::RESIZE,
        }
    }
}

impl CallbackTable<VTermParserCallbacks> {
    /// Dispatch with the table's own user pointer
    ///
    /// # Safety
    /// See [`VTermParserCallbacks::dispatch`].
    pub unsafe fn dispatch(&self, event: ParserEvent<'_>) -> Option<c_int> {
        self.callbacks().dispatch(event, self.user())
    }
}

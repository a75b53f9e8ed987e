//! Pen attributes, terminal properties and their value union
//!
//! The engine passes these enums by value as C `int`s, so they are modelled
//! as transparent newtypes: any integer the engine sends is representable.

use std::ffi::{c_char, c_int};

use crate::color::VTermColor;

/// Pen attribute selector for the state layer's `setpenattr` slot
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VTermAttr(pub c_int);

impl VTermAttr {
    pub const BOLD: Self = Self(1);
    pub const UNDERLINE: Self = Self(2);
    pub const ITALIC: Self = Self(3);
    pub const BLINK: Self = Self(4);
    pub const REVERSE: Self = Self(5);
    pub const STRIKE: Self = Self(6);
    pub const FONT: Self = Self(7);
    pub const FOREGROUND: Self = Self(8);
    pub const BACKGROUND: Self = Self(9);
}

/// Terminal property selector for the `settermprop` slots
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VTermProp(pub c_int);

impl VTermProp {
    pub const CURSORVISIBLE: Self = Self(1);
    pub const CURSORBLINK: Self = Self(2);
    pub const ALTSCREEN: Self = Self(3);
    pub const TITLE: Self = Self(4);
    pub const ICONNAME: Self = Self(5);
    pub const REVERSE: Self = Self(6);
    pub const CURSORSHAPE: Self = Self(7);
    pub const MOUSE: Self = Self(8);
}

/// Value carried alongside a [`VTermAttr`] or [`VTermProp`]
///
/// Which member is live depends on the selector; reading a member is
/// therefore `unsafe`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union VTermValue {
    pub boolean: c_int,
    pub number: c_int,
    pub string: *mut c_char,
    pub color: VTermColor,
}

impl VTermValue {
    pub const fn boolean(value: bool) -> Self {
        Self {
            boolean: value as c_int,
        }
    }

    pub const fn number(value: c_int) -> Self {
        Self { number: value }
    }

    pub const fn color(value: VTermColor) -> Self {
        Self { color: value }
    }
}

impl std::fmt::Debug for VTermValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VTermValue { .. }")
    }
}

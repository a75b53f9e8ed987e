//! vtshim-core: layout-exact mirrors of libvterm's data structures
//!
//! This crate provides the pieces a foreign caller needs to share memory
//! with the engine without encoding C bit-fields or function-pointer structs
//! itself:
//! - Screen cell and glyph info structs with explicit bit-field accessors
//! - The 4-byte tagged color union
//! - Parser, state and screen callback tables with per-slot setters
//! - Allocator routing for single cells
//! - Owned snapshots for reading engine memory into plain Rust values

pub mod alloc;
pub mod bits;
pub mod callbacks;
pub mod cell;
pub mod color;
pub mod error;
pub mod geom;
pub mod glyph;
pub mod value;

pub use alloc::{CellAllocator, VTermAllocatorFunctions};
pub use bits::BitField;
pub use callbacks::{CallbackSlots, CallbackTable};
pub use cell::{
    CellFlags, CellStyle, ScreenCell, VTermScreenCell, VTermScreenCellAttrs,
    VTERM_MAX_CHARS_PER_CELL,
};
pub use color::{Color, Rgb, VTermColor};
pub use error::{Result, ShimError};
pub use geom::{VTermLineInfo, VTermPos, VTermRect};
pub use glyph::{GlyphInfo, VTermGlyphFlags, VTermGlyphInfo};
pub use value::{VTermAttr, VTermProp, VTermValue};

//! ID types for resources and scene objects.

use serde::{Deserialize, Serialize};

/// Handle to a loaded texture or the first frame of an animation.
///
/// Frames of an animation occupy consecutive handles starting at the
/// base handle returned by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// Creates a texture handle from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the handle of frame `frame` counted from this base handle.
    #[must_use]
    pub const fn frame(self, frame: u32) -> Self {
        Self(self.0 + frame)
    }
}

/// Slot index into the scene's object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectIndex(u32);

impl ObjectIndex {
    /// Creates an object index from a raw value.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize` for table lookups.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Liveness token of an object slot.
///
/// A slot gets a fresh signature every time a new object occupies it, so a
/// captured signature that no longer matches means the original object is
/// gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(u32);

impl Signature {
    /// Creates a signature from a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw signature value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#![forbid(unsafe_code)]

//! Resource value types carried by the built-in commands.
//!
//! These mirror the addressing scheme of the editor's data store: a resource
//! is identified by its type, an optional language, and an index within that
//! type. Bitmaps travel as raw indexed-color pixel buffers.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::CommandError;

/// Numeric resource type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResourceType(pub u16);

/// Language a localized resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResourceLanguage {
    /// Not localized.
    #[default]
    Any,
    Standard,
    French,
    German,
}

impl ResourceLanguage {
    /// Two-bit code used when packing a key.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Any => 0,
            Self::Standard => 1,
            Self::French => 2,
            Self::German => 3,
        }
    }
}

impl fmt::Display for ResourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::Standard => "std",
            Self::French => "fr",
            Self::German => "de",
        };
        f.write_str(name)
    }
}

/// Address of one resource in the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResourceKey {
    pub resource_type: ResourceType,
    pub language: ResourceLanguage,
    pub index: u16,
}

impl ResourceKey {
    /// Mask applied to the index when packing into an integer.
    pub const INDEX_MASK: u16 = 0x3FFF;

    /// Key for a resource that is not localized.
    #[must_use]
    pub const fn new(resource_type: ResourceType, index: u16) -> Self {
        Self {
            resource_type,
            language: ResourceLanguage::Any,
            index,
        }
    }

    /// Key for a localized resource.
    #[must_use]
    pub const fn localized(
        resource_type: ResourceType,
        language: ResourceLanguage,
        index: u16,
    ) -> Self {
        Self {
            resource_type,
            language,
            index,
        }
    }

    /// Pack the key into a single integer: `type << 16 | language << 14 | index`.
    ///
    /// Only the low 14 bits of the index survive.
    #[must_use]
    pub const fn to_int(self) -> u32 {
        ((self.resource_type.0 as u32) << 16)
            | (self.language.code() << 14)
            | (self.index & Self::INDEX_MASK) as u32
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.resource_type.0, self.language, self.index
        )
    }
}

/// Raw indexed-color bitmap: one palette index per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Private palette as packed RGB triples, if the bitmap carries one.
    pub palette: Option<Vec<u8>>,
}

impl RawBitmap {
    /// Largest pixel count a bitmap may have (4096 x 4096).
    pub const MAX_PIXELS: usize = 1 << 24;

    /// Create a bitmap, checking that the pixel buffer matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CommandError> {
        let expected = Self::pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(CommandError::InvalidState(format!(
                "bitmap {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            palette: None,
        })
    }

    /// Bitmap of the given size with every pixel set to `index`.
    pub fn filled(width: u32, height: u32, index: u8) -> Result<Self, CommandError> {
        let count = Self::pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![index; count],
            palette: None,
        })
    }

    fn pixel_count(width: u32, height: u32) -> Result<usize, CommandError> {
        (width as usize)
            .checked_mul(height as usize)
            .filter(|&count| count <= Self::MAX_PIXELS)
            .ok_or_else(|| {
                CommandError::InvalidState(format!(
                    "bitmap {width}x{height} exceeds {} pixels",
                    Self::MAX_PIXELS
                ))
            })
    }

    /// Attach a private palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Vec<u8>) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Size in bytes for memory accounting.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.pixels.len()
            + self.palette.as_ref().map_or(0, Vec::len)
    }
}

//! Fixed-layout texture header blobs embedded in type-32 entries.
//!
//! The first part of a texture entry is an opaque metadata blob. Only a few
//! fields at fixed offsets are understood; the blob is otherwise carried
//! through verbatim so a re-encoded archive stays structurally identical.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

const WIDTH_OFFSET: usize = 64;
const HEIGHT_OFFSET: usize = 66;
const DEPTH_OFFSET: usize = 68;
const LEGACY_FORMAT_OFFSET: usize = 70;
const MIP_AND_TYPE_OFFSET: usize = 71;

/// Smallest blob that still contains every known field.
pub const MIN_BLOB_SIZE: usize = 72;

/// Decoded view of a texture header blob.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
    pub width: u16,
    pub height: u16,
    pub depth: u8,

    /// Overloaded legacy pixel-format code; see [`crate::dds::legacy_format`].
    pub legacy_format: u8,

    /// Mip levels, taken from the high six bits of the packed byte.
    pub mip_count: u8,

    /// Texture classification from the low two bits: 0 flat, 1 cubemap,
    /// 2 volume.
    pub tex_type: u8,
}

impl TextureHeader {
    /// Read the known fields out of a header blob.
    pub fn parse(blob: &[u8]) -> Result<Self> {
        if blob.len() < MIN_BLOB_SIZE {
            return Err(Error::MalformedArchive);
        }

        let packed = blob[MIP_AND_TYPE_OFFSET];
        Ok(TextureHeader {
            width: LittleEndian::read_u16(&blob[WIDTH_OFFSET..]),
            height: LittleEndian::read_u16(&blob[HEIGHT_OFFSET..]),
            depth: blob[DEPTH_OFFSET],
            legacy_format: blob[LEGACY_FORMAT_OFFSET],
            mip_count: packed >> 2,
            tex_type: packed & 0x03,
        })
    }
}

/// Overwrite the dimension fields of a header blob in place.
pub fn patch_dimensions(blob: &mut [u8], width: u16, height: u16) {
    LittleEndian::write_u16(&mut blob[WIDTH_OFFSET..WIDTH_OFFSET + 2], width);
    LittleEndian::write_u16(&mut blob[HEIGHT_OFFSET..HEIGHT_OFFSET + 2], height);
}

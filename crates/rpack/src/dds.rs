//! Canonical pixel formats and DDS header synthesis.
//!
//! Texture entries do not store their pixel format directly. The embedded
//! legacy format byte is overloaded, so resolution runs through a chain of
//! lookups instead: a file-name suffix table first, the legacy numeric table
//! second, and a BC1 fallback when neither matches. Both tables are plain
//! static data; the synthesizer itself only ever sees a resolved
//! [`PixelFormat`].

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

const DDS_MAGIC: u32 = 0x2053_4444; // "DDS "

const DDSD_CAPS: u32 = 0x1;
const DDSD_HEIGHT: u32 = 0x2;
const DDSD_WIDTH: u32 = 0x4;
const DDSD_PITCH: u32 = 0x8;
const DDSD_PIXELFORMAT: u32 = 0x1000;
const DDSD_MIPMAPCOUNT: u32 = 0x20000;
const DDSD_LINEARSIZE: u32 = 0x80000;
const DDSD_DEPTH: u32 = 0x800000;

const DDPF_FOURCC: u32 = 0x4;

const DDSCAPS_COMPLEX: u32 = 0x8;
const DDSCAPS_TEXTURE: u32 = 0x1000;
const DDSCAPS_MIPMAP: u32 = 0x400000;

const DDSCAPS2_CUBEMAP: u32 = 0x200;
const DDSCAPS2_VOLUME: u32 = 0x200000;

const FOURCC_DXT1: u32 = 0x3154_5844; // 'DXT1'
const FOURCC_DX10: u32 = 0x3031_5844; // 'DX10'

const DX10_DIMENSION_TEXTURE2D: u32 = 3;

/// Size of the classic DDS preamble: magic plus the 124-byte header.
pub const DDS_HEADER_SIZE: usize = 128;

/// Size of the preamble when the DX10 extension header follows.
pub const DDS_DX10_HEADER_SIZE: usize = 148;

/// One of the fixed set of pixel formats the synthesizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bc1,
    Bc4,
    Bc4Snorm,
    Bc5,
    Bc5Snorm,
    Bc6hUf16,
    Bc7,
    R8,
    R8Snorm,
    Rg8,
    Rg8Snorm,
    R16,
    R16Snorm,
    Rg16,
    Rg16Snorm,
    Rgba8,
    Rgba8Snorm,
    Rgba8Uint,
    Rgba16,
    Rgba16Snorm,
    Rgba16F,
}

impl PixelFormat {
    /// Fallback used whenever neither resolution stage matches.
    pub const FALLBACK: PixelFormat = PixelFormat::Bc1;

    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Bc1 => "BC1",
            PixelFormat::Bc4 => "BC4",
            PixelFormat::Bc4Snorm => "BC4_SNORM",
            PixelFormat::Bc5 => "BC5",
            PixelFormat::Bc5Snorm => "BC5_SNORM",
            PixelFormat::Bc6hUf16 => "BC6H_UF16",
            PixelFormat::Bc7 => "BC7",
            PixelFormat::R8 => "R8",
            PixelFormat::R8Snorm => "R8_SNORM",
            PixelFormat::Rg8 => "RG8",
            PixelFormat::Rg8Snorm => "RG8_SNORM",
            PixelFormat::R16 => "R16",
            PixelFormat::R16Snorm => "R16_SNORM",
            PixelFormat::Rg16 => "RG16",
            PixelFormat::Rg16Snorm => "RG16_SNORM",
            PixelFormat::Rgba8 => "RGBA8",
            PixelFormat::Rgba8Snorm => "RGBA8_SNORM",
            PixelFormat::Rgba8Uint => "RGBA8_UINT",
            PixelFormat::Rgba16 => "RGBA16",
            PixelFormat::Rgba16Snorm => "RGBA16_SNORM",
            PixelFormat::Rgba16F => "RGBA16F",
        }
    }

    /// Whether this is a block-compressed format.
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            PixelFormat::Bc1
                | PixelFormat::Bc4
                | PixelFormat::Bc4Snorm
                | PixelFormat::Bc5
                | PixelFormat::Bc5Snorm
                | PixelFormat::Bc6hUf16
                | PixelFormat::Bc7
        )
    }

    /// Bytes per 4x4 block for compressed formats.
    pub fn block_size(self) -> u32 {
        match self {
            PixelFormat::Bc1 | PixelFormat::Bc4 | PixelFormat::Bc4Snorm => 8,
            _ => 16,
        }
    }

    /// Bits per pixel for uncompressed formats.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8 | PixelFormat::R8Snorm => 8,
            PixelFormat::Rg8
            | PixelFormat::Rg8Snorm
            | PixelFormat::R16
            | PixelFormat::R16Snorm => 16,
            PixelFormat::Rg16
            | PixelFormat::Rg16Snorm
            | PixelFormat::Rgba8
            | PixelFormat::Rgba8Snorm
            | PixelFormat::Rgba8Uint => 32,
            _ => 64,
        }
    }

    /// DXGI format code written into the DX10 extension header.
    pub fn dxgi_format(self) -> u32 {
        match self {
            PixelFormat::Rgba16F => 10,
            PixelFormat::Rgba16 => 11,
            PixelFormat::Rgba16Snorm => 13,
            PixelFormat::Rgba8 => 28,
            PixelFormat::Rgba8Uint => 30,
            PixelFormat::Rgba8Snorm => 31,
            PixelFormat::Rg16 => 35,
            PixelFormat::Rg16Snorm => 37,
            PixelFormat::Rg8 => 49,
            PixelFormat::Rg8Snorm => 51,
            PixelFormat::R16 => 56,
            PixelFormat::R16Snorm => 58,
            PixelFormat::R8 => 61,
            PixelFormat::R8Snorm => 63,
            PixelFormat::Bc1 => 71,
            PixelFormat::Bc4 => 80,
            PixelFormat::Bc4Snorm => 81,
            PixelFormat::Bc5 => 83,
            PixelFormat::Bc5Snorm => 84,
            PixelFormat::Bc6hUf16 => 95,
            PixelFormat::Bc7 => 98,
        }
    }

    /// Whether the format needs the DX10 extension header. Only BC1 fits the
    /// classic DXT1 fourCC descriptor.
    pub fn uses_extended_header(self) -> bool {
        !matches!(self, PixelFormat::Bc1)
    }
}

/// Known file-name suffix tokens and the formats they imply.
#[rustfmt::skip]
static SUFFIX_FORMATS: &[(&str, PixelFormat)] = &[
    ("1skybox", PixelFormat::Rgba16F), ("2048skybox", PixelFormat::Bc6hUf16),
    ("32skybox", PixelFormat::Bc6hUf16), ("4096skybox", PixelFormat::Bc6hUf16),
    ("64skybox", PixelFormat::Bc6hUf16), ("aclg", PixelFormat::Rgba8),
    ("ani", PixelFormat::Bc4), ("anm", PixelFormat::Rgba16Snorm),
    ("bbs", PixelFormat::Bc4), ("bbt", PixelFormat::Rgba16),
    ("bld", PixelFormat::Bc4), ("bldopc", PixelFormat::Bc4),
    ("bldsnorm", PixelFormat::Bc4Snorm), ("cau", PixelFormat::Bc4),
    ("cgd", PixelFormat::Bc4), ("che", PixelFormat::Bc1),
    ("chg", PixelFormat::Bc4), ("chi", PixelFormat::Bc7),
    ("chm", PixelFormat::Bc5), ("chn", PixelFormat::Bc5Snorm),
    ("cld", PixelFormat::Bc4), ("clg", PixelFormat::Rgba8),
    ("clp", PixelFormat::Bc4Snorm), ("cou", PixelFormat::Bc7),
    ("cpd", PixelFormat::Bc4), ("crb", PixelFormat::Bc4),
    ("ddf", PixelFormat::Bc7), ("default", PixelFormat::Bc1),
    ("deh", PixelFormat::Bc1), ("det", PixelFormat::Bc4),
    ("dif", PixelFormat::Bc1), ("difa", PixelFormat::Bc7),
    ("dir", PixelFormat::Rgba8Snorm), ("dirs2d", PixelFormat::Rg16Snorm),
    ("dirs3d", PixelFormat::Rgba8Snorm), ("diru2d", PixelFormat::Rg16),
    ("dit", PixelFormat::Bc4), ("dml", PixelFormat::Bc7),
    ("dn1", PixelFormat::R16Snorm), ("dnr", PixelFormat::R16Snorm),
    ("dpo", PixelFormat::Bc4Snorm), ("dpt", PixelFormat::Bc4),
    ("dtc", PixelFormat::Bc1), ("dtm", PixelFormat::Bc7),
    ("dv1", PixelFormat::Rgba16F), ("dvc", PixelFormat::Rgba16F),
    ("dye", PixelFormat::Bc7), ("ema", PixelFormat::Rgba8),
    ("ems", PixelFormat::Bc1), ("end", PixelFormat::Bc6hUf16),
    ("enr", PixelFormat::Bc6hUf16), ("env", PixelFormat::Bc1),
    ("exp", PixelFormat::R8), ("eym", PixelFormat::Bc5),
    ("fam", PixelFormat::Rgba8), ("fdc", PixelFormat::Bc7),
    ("fdm", PixelFormat::Bc4), ("flm", PixelFormat::Bc5Snorm),
    ("flw", PixelFormat::Bc4), ("fow", PixelFormat::Bc7),
    ("frs", PixelFormat::Bc4), ("frz", PixelFormat::Bc4),
    ("fxd", PixelFormat::Bc7), ("fxe", PixelFormat::Bc7),
    ("fxm", PixelFormat::Bc5Snorm), ("fxn", PixelFormat::Bc5Snorm),
    ("fxs", PixelFormat::Bc7), ("fxt", PixelFormat::Rgba8),
    ("ghn", PixelFormat::Bc5Snorm), ("glr", PixelFormat::Bc4),
    ("gra", PixelFormat::Rgba8), ("grc", PixelFormat::Rgba16F),
    ("grd", PixelFormat::Rgba8), ("gre", PixelFormat::Rgba8),
    ("grf", PixelFormat::Rgba8), ("grm", PixelFormat::Rgba8),
    ("gro", PixelFormat::Bc4Snorm), ("grr", PixelFormat::R8),
    ("grs", PixelFormat::Rgba8), ("guitmp", PixelFormat::Rgba8),
    ("guitmpmask", PixelFormat::R8), ("hcb", PixelFormat::Bc6hUf16),
    ("hcl", PixelFormat::Bc1), ("hdc", PixelFormat::Bc7),
    ("hgt", PixelFormat::R8), ("hil", PixelFormat::R8),
    ("hil2f", PixelFormat::Rg8), ("hil3f", PixelFormat::Rgba8),
    ("hld", PixelFormat::Rgba8), ("hli", PixelFormat::Bc6hUf16),
    ("hnm", PixelFormat::Bc5Snorm), ("hqrfl", PixelFormat::Bc6hUf16),
    ("hsh", PixelFormat::R8), ("hwd", PixelFormat::R8),
    ("idx", PixelFormat::Bc4), ("loc", PixelFormat::Bc1),
    ("lut", PixelFormat::Rgba8), ("m3dc", PixelFormat::Bc1),
    ("m3dm", PixelFormat::Bc4), ("m3dnrm", PixelFormat::Bc5Snorm),
    ("mli", PixelFormat::Bc6hUf16), ("msk", PixelFormat::Bc4),
    ("msv", PixelFormat::R8), ("mtx0", PixelFormat::Rgba16Snorm),
    ("mtx1", PixelFormat::Rgba16Snorm), ("mtx2", PixelFormat::Rgba16Snorm),
    ("nlt", PixelFormat::Bc4), ("nm1", PixelFormat::R16),
    ("nrd", PixelFormat::Rgba8Uint), ("nrm", PixelFormat::Bc5Snorm),
    ("ocl", PixelFormat::Bc4), ("od1", PixelFormat::Bc7),
    ("od2", PixelFormat::Bc7), ("od3", PixelFormat::Bc7),
    ("od4", PixelFormat::Bc7), ("oe1", PixelFormat::Bc7),
    ("oe2", PixelFormat::Bc7), ("oe3", PixelFormat::Bc7),
    ("oe4", PixelFormat::Bc7), ("ofc", PixelFormat::Bc7),
    ("off", PixelFormat::Bc4), ("ofo", PixelFormat::Bc1),
    ("olm", PixelFormat::Bc4Snorm), ("olmhlp", PixelFormat::Rgba8),
    ("olmsrc", PixelFormat::Rgba8), ("opc", PixelFormat::Bc4),
    ("ovr", PixelFormat::Bc4), ("ovr3d", PixelFormat::R8),
    ("ppc0", PixelFormat::Bc7), ("ppcm", PixelFormat::Bc7),
    ("ppd0", PixelFormat::Bc5), ("ppm0", PixelFormat::Bc4),
    ("ppmm", PixelFormat::Bc4), ("ppnm", PixelFormat::Bc5Snorm),
    ("prc", PixelFormat::Bc7), ("pre", PixelFormat::Rg8),
    ("prj", PixelFormat::Bc7), ("ref", PixelFormat::Bc7),
    ("rfm", PixelFormat::Bc4), ("rgh", PixelFormat::Bc4),
    ("rot", PixelFormat::Bc5Snorm), ("satdif", PixelFormat::Bc7),
    ("satnrm", PixelFormat::Bc5Snorm), ("satrgh", PixelFormat::Bc4),
    ("satspc", PixelFormat::Bc7), ("sdf", PixelFormat::R8),
    ("sdm", PixelFormat::Rgba8), ("skm", PixelFormat::Rgba16F),
    ("skn", PixelFormat::Bc4), ("sky", PixelFormat::Bc6hUf16),
    ("spc", PixelFormat::Bc1), ("srgh", PixelFormat::Bc4Snorm),
    ("thc", PixelFormat::Bc4), ("tng", PixelFormat::Bc5Snorm),
    ("trn", PixelFormat::Bc4), ("trs", PixelFormat::R16),
    ("txc", PixelFormat::Bc4), ("uic", PixelFormat::Bc7),
    ("uics", PixelFormat::Bc7), ("uif", PixelFormat::Bc4),
    ("uifmsdf", PixelFormat::Bc7), ("uim", PixelFormat::Bc4),
    ("uims", PixelFormat::Bc4), ("uimu", PixelFormat::R8),
    ("uimus", PixelFormat::R8), ("uinrm", PixelFormat::Bc5Snorm),
    ("uistory", PixelFormat::Bc7), ("uiu", PixelFormat::Rgba8),
    ("uius", PixelFormat::Rgba8), ("usr", PixelFormat::Rgba8),
    ("uva", PixelFormat::Bc1), ("uvg", PixelFormat::Rgba8),
    ("uvm", PixelFormat::Bc4), ("va1", PixelFormat::Rgba8),
    ("vas", PixelFormat::Rgba8), ("vgn", PixelFormat::Rgba8),
    ("wflm", PixelFormat::Bc5Snorm), ("wmp", PixelFormat::Rgba8),
    ("wri", PixelFormat::Bc5Snorm), ("wscm", PixelFormat::Bc4),
    ("wvw", PixelFormat::Bc5Snorm), ("wwv", PixelFormat::R8Snorm),
    ("xuic", PixelFormat::Bc7), ("xuicna", PixelFormat::Bc1),
    ("xuil8", PixelFormat::R8), ("xuiu", PixelFormat::Rgba8),
    ("zet", PixelFormat::Bc4),
];

fn suffix_lookup(candidate: &str) -> Option<PixelFormat> {
    SUFFIX_FORMATS
        .iter()
        .find(|(token, _)| *token == candidate)
        .map(|(_, format)| *format)
}

/// Resolve a format from the file name's underscore-delimited suffix.
///
/// The longest suffix is probed first, so `a_b_c` tries `a_b_c`, then `b_c`,
/// then `c`. Matching is case-insensitive on the name without its extension.
pub fn suffix_format(file_name: &str) -> Option<PixelFormat> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())?
        .to_ascii_lowercase();

    let tokens: Vec<&str> = stem.split('_').collect();
    (0..tokens.len()).find_map(|i| suffix_lookup(&tokens[i..].join("_")))
}

/// Resolve a format from the legacy numeric code embedded in the texture
/// header. A few codes are overloaded and need the texture type to pick a
/// side. Unknown codes return `None`.
pub fn legacy_format(code: u8, tex_type: u8) -> Option<PixelFormat> {
    let format = match code {
        23 | 89 | 186 => PixelFormat::Bc1,
        4 | 8 | 10 | 11 | 14 | 16 | 25 | 27 | 35 | 38 | 43 | 44 | 50 | 81 | 83 | 86 | 91 | 95
        | 97 | 99 | 107 | 108 | 114 | 121 | 125 | 133 | 135 | 137 | 183 | 189 => PixelFormat::Bc4,
        12 | 22 | 52 => PixelFormat::Bc4Snorm,
        19 | 106 => PixelFormat::Bc5,
        20 | 41 | 47 | 48 | 49 | 82 | 90 | 109 | 115 | 120 | 134 | 144 | 180 | 182 | 184 => {
            PixelFormat::Bc5Snorm
        }
        1 | 2 | 3 | 5 | 62 => PixelFormat::Bc6hUf16,
        17 | 18 | 24 | 28 | 29 | 30 | 45 | 51 | 53 | 54 | 55 | 63 | 92 | 93 | 94 | 104 | 105
        | 110 | 112 | 119 | 122 | 128 | 145 => PixelFormat::Bc7,
        37 | 60 | 64 | 68 | 84 | 100 | 118 | 143 | 187 => PixelFormat::R8,
        185 => PixelFormat::R8Snorm,
        111 => PixelFormat::Rg8,
        87 => PixelFormat::Rg8Snorm,
        56 => PixelFormat::R16,
        33 | 34 => PixelFormat::R16Snorm,
        36 => PixelFormat::Rg16,
        32 => PixelFormat::Rg16Snorm,
        6 | 21 | 42 | 46 | 61 | 67 | 78 | 146 | 147 | 149 | 150 | 152 | 181 | 188 => {
            PixelFormat::Rgba8
        }
        31 => PixelFormat::Rgba8Snorm,
        88 => PixelFormat::Rgba8Uint,
        9 | 141 => PixelFormat::Rgba16,
        7 | 85 => PixelFormat::Rgba16Snorm,
        0 | 39 | 40 | 124 => PixelFormat::Rgba16F,

        // Overloaded codes where the texture type decides.
        59 | 139 => {
            if tex_type == 1 {
                PixelFormat::Bc7
            } else {
                PixelFormat::Bc1
            }
        }
        65 => {
            if tex_type == 1 {
                PixelFormat::Bc6hUf16
            } else {
                PixelFormat::R8
            }
        }
        66 => {
            if tex_type == 1 {
                PixelFormat::Bc6hUf16
            } else {
                PixelFormat::Rg8
            }
        }
        80 => {
            if tex_type == 1 {
                PixelFormat::Bc6hUf16
            } else {
                PixelFormat::Bc1
            }
        }
        96 => {
            if tex_type == 1 {
                PixelFormat::Bc4Snorm
            } else {
                PixelFormat::Rgba8
            }
        }
        113 => {
            if tex_type == 1 {
                PixelFormat::Bc7
            } else {
                PixelFormat::Bc4
            }
        }
        _ => return None,
    };
    Some(format)
}

/// Run the full resolution chain for a texture: suffix, then legacy code,
/// then the BC1 fallback with a warning.
pub fn resolve_format(file_name: &str, legacy_code: u8, tex_type: u8) -> PixelFormat {
    if let Some(format) = suffix_format(file_name) {
        return format;
    }
    legacy_format(legacy_code, tex_type).unwrap_or_else(|| {
        warn!(
            "unrecognized pixel format code {legacy_code} for {file_name}, \
             falling back to {}",
            PixelFormat::FALLBACK.name()
        );
        PixelFormat::FALLBACK
    })
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Synthesize the DDS preamble for an extracted texture: the magic plus the
/// 124-byte header, followed by the 20-byte DX10 extension whenever the
/// format needs it.
pub fn generate_header(
    width: u32,
    height: u32,
    mip_count: u32,
    depth: u32,
    tex_type: u8,
    format: PixelFormat,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(DDS_DX10_HEADER_SIZE);

    let pitch_or_linear_flag = if format.is_compressed() {
        DDSD_LINEARSIZE
    } else {
        DDSD_PITCH
    };

    let mut flags = DDSD_CAPS | DDSD_PIXELFORMAT | DDSD_WIDTH | DDSD_HEIGHT | pitch_or_linear_flag;
    if mip_count > 1 {
        flags |= DDSD_MIPMAPCOUNT;
    }
    if depth > 1 {
        flags |= DDSD_DEPTH;
    }

    let pitch_or_linear = if format.is_compressed() {
        let blocks_wide = width.div_ceil(4).max(1);
        let blocks_high = height.div_ceil(4).max(1);
        blocks_wide * blocks_high * format.block_size()
    } else {
        (width * format.bits_per_pixel() + 7) / 8
    };

    push_u32(&mut out, DDS_MAGIC);
    push_u32(&mut out, 124);
    push_u32(&mut out, flags);
    push_u32(&mut out, height);
    push_u32(&mut out, width);
    push_u32(&mut out, pitch_or_linear);
    push_u32(&mut out, if depth > 1 { depth } else { 0 });
    push_u32(&mut out, if mip_count > 1 { mip_count } else { 0 });
    out.extend_from_slice(&[0u8; 44]);

    // DDS_PIXELFORMAT descriptor
    push_u32(&mut out, 32);
    push_u32(&mut out, DDPF_FOURCC);
    push_u32(
        &mut out,
        if format.uses_extended_header() {
            FOURCC_DX10
        } else {
            FOURCC_DXT1
        },
    );
    out.extend_from_slice(&[0u8; 20]);

    let mut caps = DDSCAPS_TEXTURE;
    if mip_count > 1 {
        caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
    }
    if depth > 1 || tex_type != 0 {
        caps |= DDSCAPS_COMPLEX;
    }
    push_u32(&mut out, caps);

    let caps2 = match tex_type {
        1 => DDSCAPS2_CUBEMAP,
        2 => DDSCAPS2_VOLUME,
        _ => 0,
    };
    push_u32(&mut out, caps2);
    out.extend_from_slice(&[0u8; 12]);

    if format.uses_extended_header() {
        push_u32(&mut out, format.dxgi_format());
        push_u32(&mut out, DX10_DIMENSION_TEXTURE2D);
        push_u32(&mut out, 0); // miscFlag
        push_u32(&mut out, 1); // arraySize
        push_u32(&mut out, 0); // miscFlags2
    }

    out
}

/// Declared shape of a replacement DDS file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsInfo {
    pub width: u16,
    pub height: u16,
    pub header_size: usize,
}

/// Probe a replacement image: read the declared dimensions and detect
/// whether a DX10 extension header follows the classic one. Returns the
/// info plus the pixel payload after the header.
pub fn probe(data: &[u8]) -> Option<(DdsInfo, &[u8])> {
    if data.len() < DDS_HEADER_SIZE {
        return None;
    }

    let height = LittleEndian::read_u32(&data[12..16]) as u16;
    let width = LittleEndian::read_u32(&data[16..20]) as u16;

    let header_size = if LittleEndian::read_u32(&data[84..88]) == FOURCC_DX10 {
        DDS_DX10_HEADER_SIZE
    } else {
        DDS_HEADER_SIZE
    };

    let payload = data.get(header_size..).unwrap_or(&[]);
    Some((
        DdsInfo {
            width,
            height,
            header_size,
        },
        payload,
    ))
}

#[cfg(test)]
mod test {
    use byteorder::{ByteOrder, LittleEndian};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn suffix_resolution_uses_longest_suffix_first() {
        assert_eq!(suffix_format("stone_wall_dif.tex"), Some(PixelFormat::Bc1));
        assert_eq!(suffix_format("cliff_nm1.tex"), Some(PixelFormat::R16));
        assert_eq!(
            suffix_format("props/crate_old_nrm.tex"),
            Some(PixelFormat::Bc5Snorm)
        );
        // A bare table token with no prefix still matches.
        assert_eq!(suffix_format("sky.tex"), Some(PixelFormat::Bc6hUf16));
        assert_eq!(suffix_format("portrait.tex"), None);
    }

    #[test]
    fn suffix_resolution_is_case_insensitive() {
        assert_eq!(suffix_format("Stone_DIF.TEX"), Some(PixelFormat::Bc1));
    }

    #[test]
    fn legacy_codes_resolve() {
        assert_eq!(legacy_format(23, 0), Some(PixelFormat::Bc1));
        assert_eq!(legacy_format(56, 0), Some(PixelFormat::R16));
        assert_eq!(legacy_format(88, 0), Some(PixelFormat::Rgba8Uint));
        assert_eq!(legacy_format(255, 0), None);
    }

    #[test]
    fn overloaded_legacy_codes_follow_texture_type() {
        assert_eq!(legacy_format(59, 1), Some(PixelFormat::Bc7));
        assert_eq!(legacy_format(59, 0), Some(PixelFormat::Bc1));
        assert_eq!(legacy_format(65, 1), Some(PixelFormat::Bc6hUf16));
        assert_eq!(legacy_format(65, 0), Some(PixelFormat::R8));
        assert_eq!(legacy_format(96, 1), Some(PixelFormat::Bc4Snorm));
        assert_eq!(legacy_format(96, 2), Some(PixelFormat::Rgba8));
    }

    #[test]
    fn unknown_code_falls_back_to_bc1() {
        assert_eq!(resolve_format("portrait.tex", 201, 0), PixelFormat::Bc1);
    }

    #[test]
    fn suffix_wins_over_legacy_code() {
        assert_eq!(resolve_format("face_chi.tex", 23, 0), PixelFormat::Bc7);
    }

    #[test]
    fn classic_header_for_bc1() {
        let header = generate_header(64, 64, 1, 1, 0, PixelFormat::Bc1);
        assert_eq!(header.len(), DDS_HEADER_SIZE);
        assert_eq!(&header[..4], b"DDS ");
        assert_eq!(LittleEndian::read_u32(&header[84..88]), FOURCC_DXT1);
    }

    #[test]
    fn extended_header_for_bc7() {
        let header = generate_header(64, 64, 1, 1, 0, PixelFormat::Bc7);
        assert_eq!(header.len(), DDS_DX10_HEADER_SIZE);
        assert_eq!(LittleEndian::read_u32(&header[84..88]), FOURCC_DX10);
        assert_eq!(LittleEndian::read_u32(&header[128..132]), 98);
        // dimension = 2D texture, array size = 1
        assert_eq!(LittleEndian::read_u32(&header[132..136]), 3);
        assert_eq!(LittleEndian::read_u32(&header[140..144]), 1);
    }

    #[test]
    fn compressed_formats_declare_linear_size() {
        let header = generate_header(129, 65, 1, 1, 0, PixelFormat::Bc1);
        let flags = LittleEndian::read_u32(&header[8..12]);
        assert_eq!(flags & DDSD_LINEARSIZE, DDSD_LINEARSIZE);
        assert_eq!(flags & DDSD_PITCH, 0);
        // ceil(129/4) * ceil(65/4) * 8
        assert_eq!(LittleEndian::read_u32(&header[20..24]), 33 * 17 * 8);
    }

    #[test]
    fn uncompressed_formats_declare_pitch() {
        let header = generate_header(100, 50, 1, 1, 0, PixelFormat::Rgba8);
        let flags = LittleEndian::read_u32(&header[8..12]);
        assert_eq!(flags & DDSD_PITCH, DDSD_PITCH);
        assert_eq!(flags & DDSD_LINEARSIZE, 0);
        assert_eq!(LittleEndian::read_u32(&header[20..24]), 400);
    }

    #[test]
    fn mip_and_depth_bits_only_when_above_one() {
        let plain = generate_header(16, 16, 1, 1, 0, PixelFormat::Bc1);
        let flags = LittleEndian::read_u32(&plain[8..12]);
        assert_eq!(flags & (DDSD_MIPMAPCOUNT | DDSD_DEPTH), 0);
        let caps = LittleEndian::read_u32(&plain[108..112]);
        assert_eq!(caps, DDSCAPS_TEXTURE);

        let mipped = generate_header(16, 16, 5, 4, 0, PixelFormat::Bc1);
        let flags = LittleEndian::read_u32(&mipped[8..12]);
        assert_eq!(
            flags & (DDSD_MIPMAPCOUNT | DDSD_DEPTH),
            DDSD_MIPMAPCOUNT | DDSD_DEPTH
        );
        assert_eq!(LittleEndian::read_u32(&mipped[24..28]), 4);
        assert_eq!(LittleEndian::read_u32(&mipped[28..32]), 5);
        let caps = LittleEndian::read_u32(&mipped[108..112]);
        assert_eq!(
            caps,
            DDSCAPS_TEXTURE | DDSCAPS_COMPLEX | DDSCAPS_MIPMAP
        );
    }

    #[test]
    fn cubemap_and_volume_caps() {
        let cube = generate_header(16, 16, 1, 1, 1, PixelFormat::Bc7);
        assert_eq!(LittleEndian::read_u32(&cube[112..116]), DDSCAPS2_CUBEMAP);
        let caps = LittleEndian::read_u32(&cube[108..112]);
        assert_eq!(caps & DDSCAPS_COMPLEX, DDSCAPS_COMPLEX);

        let volume = generate_header(16, 16, 1, 8, 2, PixelFormat::Bc7);
        assert_eq!(LittleEndian::read_u32(&volume[112..116]), DDSCAPS2_VOLUME);
    }

    #[test]
    fn probe_reads_dimensions_and_skips_the_right_header() {
        let mut classic = generate_header(32, 16, 1, 1, 0, PixelFormat::Bc1);
        classic.extend_from_slice(&[0xAB; 8]);
        let (info, payload) = probe(&classic).unwrap();
        assert_eq!(info.width, 32);
        assert_eq!(info.height, 16);
        assert_eq!(info.header_size, DDS_HEADER_SIZE);
        assert_eq!(payload, &[0xAB; 8]);

        let mut extended = generate_header(32, 16, 1, 1, 0, PixelFormat::Bc7);
        extended.extend_from_slice(&[0xCD; 4]);
        let (info, payload) = probe(&extended).unwrap();
        assert_eq!(info.header_size, DDS_DX10_HEADER_SIZE);
        assert_eq!(payload, &[0xCD; 4]);

        assert_eq!(probe(&[0u8; 16]), None);
    }
}

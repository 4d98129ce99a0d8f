//! Base types for the structure of an rpack archive.

use binrw::{BinRead, BinWrite};

/// Logical file type carried by texture entries.
pub const TEXTURE_FILE_TYPE: u8 = 32;

/// Every part inside a section starts on a 16-byte boundary.
pub const PART_ALIGNMENT: u64 = 16;

/// The metadata region is padded to this boundary before section data.
pub const METADATA_ALIGNMENT: u64 = 4096;

/// rpack archive header
///
/// Fixed 36-byte header at the start of every archive. All data is stored in
/// little endian format. The signature and classification bytes are carried
/// through verbatim when re-encoding; only the count and size fields get
/// rewritten.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct ArchiveHeader {
    pub signature: u32,
    pub version: u32,

    /// Four classification bytes of unknown meaning, preserved as-is.
    pub c1: u8,
    pub c2: u8,
    pub c3: u8,
    pub c4: u8,

    /// The number of file parts in the part table
    pub parts_count: u32,

    /// The number of sections in the section table
    pub sections_count: u32,

    /// The number of logical files in the file-map table
    pub files_count: u32,

    /// The size in bytes of the name block
    pub file_names_size: u32,

    /// The number of entries in the name-index table
    pub fnames_count: u32,

    pub alignment: u32,
}

/// Size of the serialized [`ArchiveHeader`]
pub const HEADER_SIZE: u64 = 36;

/// rpack section entry
///
/// A section is a contiguous region of the archive holding many file parts of
/// related classification. A packed size of 0 means the section is stored raw.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct SectionEntry {
    pub file_type: u8,
    pub type2: u8,
    pub type3: u8,
    pub type4: u8,

    /// Absolute offset of the section data, stored in 16-byte units
    pub raw_offset: u32,

    /// The size of the section data when fully unpacked
    pub unpacked_size: u32,

    /// The stored size when the section is compressed, or 0 for raw
    pub packed_size: u32,

    /// The number of parts placed in this section
    pub resource_count: u16,

    pub unk: u16,
}

/// Size of a serialized [`SectionEntry`]
pub const SECTION_ENTRY_SIZE: u64 = 20;

impl SectionEntry {
    /// Byte offset of the section data from the start of the archive.
    pub fn offset(&self) -> u64 {
        u64::from(self.raw_offset) << 4
    }
}

/// rpack file part
///
/// A part is a contiguous byte range within one section belonging to exactly
/// one logical file. Its raw offset is relative to the owning section's start.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct FilePart {
    /// Index of the owning section
    pub section_index: u8,

    pub unk1: u8,

    /// Index of the owning logical file
    pub file_index: u16,

    /// Offset within the owning section, stored in 16-byte units
    pub raw_offset: u32,

    /// The size of the part data in bytes
    pub size: u32,

    pub unk2: u32,
}

/// Size of a serialized [`FilePart`]
pub const FILE_PART_SIZE: u64 = 16;

impl FilePart {
    /// Byte offset of the part data from the start of its section.
    pub fn offset(&self) -> u64 {
        u64::from(self.raw_offset) << 4
    }
}

/// rpack file-map entry
///
/// One per logical file; points at the file's name and at its first part in
/// the part table. A file occupies `parts_count` contiguous parts.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct FileMapEntry {
    pub parts_count: u8,
    pub unk1: u8,
    pub file_type: u8,
    pub unk2: u8,

    /// Index into the (alphabetically sorted) name table
    pub file_index: u32,

    /// Index of the file's first part in the part table
    pub first_part_index: u32,
}

/// Size of a serialized [`FileMapEntry`]
pub const FILE_MAP_ENTRY_SIZE: u64 = 12;

impl FileMapEntry {
    /// Whether this entry is a texture with the usual header+payload pair.
    pub fn is_texture(&self) -> bool {
        self.file_type == TEXTURE_FILE_TYPE && self.parts_count == 2
    }
}

/// rpack name-index entry: byte offset of one name inside the name block.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct FileNameIndex {
    pub offset: u32,
}

/// Size of a serialized [`FileNameIndex`]
pub const NAME_INDEX_SIZE: u64 = 4;

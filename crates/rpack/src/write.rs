//! Types for writing rpack archives
//!
//! All offset and alignment arithmetic for the encoded form lives here: the
//! metadata region is padded to a 4096-byte boundary, sections are laid out
//! contiguously after it, and every stored offset is in 16-byte units.

use std::io::{Seek, Write};

use binrw::BinWrite;

use crate::buffer::ChunkedBuffer;
use crate::error::Result;
use crate::project::SectionInfo;
use crate::types::{
    ArchiveHeader, FileMapEntry, FileNameIndex, FilePart, SectionEntry, FILE_MAP_ENTRY_SIZE,
    FILE_PART_SIZE, HEADER_SIZE, METADATA_ALIGNMENT, NAME_INDEX_SIZE, SECTION_ENTRY_SIZE,
};

/// Round `offset` up to the next multiple of `alignment`.
pub fn align_up(offset: u64, alignment: u64) -> u64 {
    offset.div_ceil(alignment) * alignment
}

/// Total size of the metadata region before padding: header plus the four
/// tables plus the name block.
pub fn metadata_size(
    sections: usize,
    parts: usize,
    files: usize,
    name_indices: usize,
    name_block_len: usize,
) -> u64 {
    HEADER_SIZE
        + sections as u64 * SECTION_ENTRY_SIZE
        + parts as u64 * FILE_PART_SIZE
        + files as u64 * FILE_MAP_ENTRY_SIZE
        + name_indices as u64 * NAME_INDEX_SIZE
        + name_block_len as u64
}

/// Build the final section table: classification bytes from the project,
/// freshly measured sizes, resource counts tallied during assembly, and
/// contiguous offsets starting at the padded metadata boundary. Re-encoded
/// sections are always stored raw.
pub fn layout_sections(
    infos: &[SectionInfo],
    resource_counts: &[u16],
    sizes: &[u64],
    data_start: u64,
) -> Vec<SectionEntry> {
    let mut offset = data_start;
    infos
        .iter()
        .zip(resource_counts)
        .zip(sizes)
        .map(|((info, &resource_count), &size)| {
            let entry = SectionEntry {
                file_type: info.file_type,
                type2: info.type2,
                type3: info.type3,
                type4: info.type4,
                raw_offset: (offset >> 4) as u32,
                unpacked_size: size as u32,
                packed_size: 0,
                resource_count,
                unk: info.unk,
            };
            offset += size;
            entry
        })
        .collect()
}

/// Write a complete archive: header, section table, part table, file-map
/// table, name-index table, name block, zero padding to the 4096-byte
/// boundary, then every section buffer in section-index order.
#[allow(clippy::too_many_arguments)]
pub fn write_archive<W: Write + Seek>(
    writer: &mut W,
    header: &ArchiveHeader,
    sections: &[SectionEntry],
    parts: &[FilePart],
    file_maps: &[FileMapEntry],
    name_indices: &[FileNameIndex],
    name_block: &[u8],
    buffers: &[ChunkedBuffer],
) -> Result<()> {
    header.write(writer)?;
    for section in sections {
        section.write(writer)?;
    }
    for part in parts {
        part.write(writer)?;
    }
    for map in file_maps {
        map.write(writer)?;
    }
    for index in name_indices {
        index.write(writer)?;
    }
    writer.write_all(name_block)?;

    let metadata = metadata_size(
        sections.len(),
        parts.len(),
        file_maps.len(),
        name_indices.len(),
        name_block.len(),
    );
    let padding = align_up(metadata, METADATA_ALIGNMENT) - metadata;
    if padding > 0 {
        writer.write_all(&vec![0u8; padding as usize])?;
    }

    for buffer in buffers {
        buffer.copy_to(writer)?;
    }

    Ok(())
}

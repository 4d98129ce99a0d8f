//! Types for reading rpack archives
//!

use std::io::{Cursor, Read, Seek, SeekFrom};

use binrw::BinRead;

use crate::compression;
use crate::error::{Error, Result};
use crate::types::{
    ArchiveHeader, FileMapEntry, FileNameIndex, FilePart, SectionEntry, HEADER_SIZE,
};

/// Decoded archive metadata: the header, all four tables and the name block.
///
/// Section payloads are not held here; they are pulled from the source stream
/// on demand through [`Archive::decompress_sections`] and
/// [`Archive::read_part_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    /// The header bytes exactly as stored, kept for the project file.
    pub raw_header: [u8; HEADER_SIZE as usize],
    pub header: ArchiveHeader,
    pub sections: Vec<SectionEntry>,
    pub parts: Vec<FilePart>,
    pub file_maps: Vec<FileMapEntry>,
    pub name_indices: Vec<FileNameIndex>,
    pub name_block: Vec<u8>,
}

/// Per-section cache of inflated payloads. Raw sections stay `None` and are
/// sliced straight out of the source stream instead.
#[derive(Debug, Default)]
pub struct SectionCache {
    sections: Vec<Option<Vec<u8>>>,
}

impl Archive {
    /// Read the archive metadata, collecting every table the header declares.
    ///
    /// Any declared count that would read past end-of-stream fails with
    /// [`Error::MalformedArchive`].
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut raw_header = [0u8; HEADER_SIZE as usize];
        reader
            .read_exact(&mut raw_header)
            .map_err(|_| Error::MalformedArchive)?;
        let header = ArchiveHeader::read(&mut Cursor::new(&raw_header))?;

        let sections = (0..header.sections_count)
            .map(|_| SectionEntry::read(reader).map_err(|_| Error::MalformedArchive))
            .collect::<Result<Vec<_>>>()?;
        let parts = (0..header.parts_count)
            .map(|_| FilePart::read(reader).map_err(|_| Error::MalformedArchive))
            .collect::<Result<Vec<_>>>()?;
        let file_maps = (0..header.files_count)
            .map(|_| FileMapEntry::read(reader).map_err(|_| Error::MalformedArchive))
            .collect::<Result<Vec<_>>>()?;
        let name_indices = (0..header.fnames_count)
            .map(|_| FileNameIndex::read(reader).map_err(|_| Error::MalformedArchive))
            .collect::<Result<Vec<_>>>()?;

        let mut name_block = vec![0u8; header.file_names_size as usize];
        reader
            .read_exact(&mut name_block)
            .map_err(|_| Error::MalformedArchive)?;

        Ok(Archive {
            raw_header,
            header,
            sections,
            parts,
            file_maps,
            name_indices,
            name_block,
        })
    }

    /// Number of logical files in the archive.
    pub fn len(&self) -> usize {
        self.file_maps.len()
    }

    /// Whether the archive contains no files.
    pub fn is_empty(&self) -> bool {
        self.file_maps.is_empty()
    }

    /// NUL-terminated name for a file index in the name table.
    pub fn file_name(&self, index: u32) -> Result<String> {
        let name_index = self
            .name_indices
            .get(index as usize)
            .ok_or(Error::MalformedArchive)?;
        let tail = self
            .name_block
            .get(name_index.offset as usize..)
            .ok_or(Error::MalformedArchive)?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
    }

    /// File-map entries sorted by `(section, offset)` of their first part.
    ///
    /// The file-map table's own order does not reflect physical layout; this
    /// recovers the approximate storage order used when extracting.
    pub fn files_in_physical_order(&self) -> Result<Vec<FileMapEntry>> {
        let mut keyed = self
            .file_maps
            .iter()
            .map(|map| {
                let first = self
                    .parts
                    .get(map.first_part_index as usize)
                    .ok_or(Error::MalformedArchive)?;
                let key = (u64::from(first.section_index) << 32) | u64::from(first.raw_offset);
                Ok((key, *map))
            })
            .collect::<Result<Vec<_>>>()?;

        keyed.sort_by_key(|(key, _)| *key);
        Ok(keyed.into_iter().map(|(_, map)| map).collect())
    }

    /// Inflate every compressed section up front. Raw sections are left out
    /// of the cache and read directly from the stream later.
    pub fn decompress_sections<R: Read + Seek>(&self, reader: &mut R) -> Result<SectionCache> {
        let mut cache = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            if section.packed_size == 0 {
                cache.push(None);
                continue;
            }

            reader.seek(SeekFrom::Start(section.offset()))?;
            let mut packed = vec![0u8; section.packed_size as usize];
            reader
                .read_exact(&mut packed)
                .map_err(|_| Error::MalformedArchive)?;
            cache.push(compression::decompress_block(&packed)?);
        }
        Ok(SectionCache { sections: cache })
    }

    /// Extract the bytes of one part, either out of the decompressed cache
    /// or straight from the stream for raw sections.
    pub fn read_part_data<R: Read + Seek>(
        &self,
        reader: &mut R,
        part: &FilePart,
        cache: &SectionCache,
    ) -> Result<Vec<u8>> {
        let section = self
            .sections
            .get(part.section_index as usize)
            .ok_or(Error::MalformedArchive)?;

        if let Some(Some(data)) = cache.sections.get(part.section_index as usize) {
            let start = part.offset() as usize;
            let end = start + part.size as usize;
            return data
                .get(start..end)
                .map(<[u8]>::to_vec)
                .ok_or(Error::MalformedArchive);
        }

        reader.seek(SeekFrom::Start(section.offset() + part.offset()))?;
        let mut data = vec![0u8; part.size as usize];
        reader
            .read_exact(&mut data)
            .map_err(|_| Error::MalformedArchive)?;
        Ok(data)
    }

    /// Parts belonging to one file-map entry, in order.
    pub fn parts_of(&self, map: &FileMapEntry) -> Result<&[FilePart]> {
        let start = map.first_part_index as usize;
        let end = start + map.parts_count as usize;
        self.parts.get(start..end).ok_or(Error::MalformedArchive)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::Archive;
    use crate::error::Error;

    #[test]
    fn truncated_header_is_malformed() {
        let result = Archive::read(&mut Cursor::new(vec![0u8; 20]));
        assert!(matches!(result, Err(Error::MalformedArchive)));
    }

    #[test]
    fn counts_past_end_of_stream_are_malformed() {
        // A header declaring one section entry with nothing following it.
        let mut input = vec![0u8; 36];
        input[16] = 1; // sections_count
        let result = Archive::read(&mut Cursor::new(input));
        assert!(matches!(result, Err(Error::MalformedArchive)));
    }

    #[test]
    fn empty_archive_reads() {
        let archive = Archive::read(&mut Cursor::new(vec![0u8; 36])).unwrap();
        assert!(archive.is_empty());
        assert_eq!(archive.len(), 0);
    }
}

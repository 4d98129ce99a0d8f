//! Rebuilding an archive from a project and a directory of loose files.
//!
//! Nothing positional survives from the original archive: the part, file-map
//! and section tables are derived from scratch on every run, with fresh
//! offsets, a re-sorted name table and a remapped file-index namespace.

use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use binrw::{BinRead, BinWrite};
use bon::Builder;
use indexmap::IndexMap;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::buffer::ChunkedBuffer;
use crate::dds;
use crate::error::{Error, Result};
use crate::project::{
    self, FileEntry, Project, ARCHIVE_EXTENSION, IMAGE_EXTENSION, PROJECT_SUFFIX,
};
use crate::texture::{self, TextureHeader};
use crate::types::{
    ArchiveHeader, FileMapEntry, FileNameIndex, FilePart, HEADER_SIZE, METADATA_ALIGNMENT,
};
use crate::write;

/// Options for how an archive should be rebuilt
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct RepackOptions {
    /// Also persist an updated project (remapped indices, rewritten header)
    /// next to the produced archive, for future incremental repacking.
    #[builder(default)]
    pub save_project: bool,
}

/// Repack a `<name>_unpack` directory using its persisted project.
///
/// Fails with [`Error::MissingProjectFile`] before any work begins when the
/// sibling project file does not exist. Returns the path of the new archive.
#[instrument(skip_all, fields(directory = %unpack_dir.display()))]
pub fn repack_directory(unpack_dir: &Path, options: RepackOptions) -> Result<PathBuf> {
    let project_path = project::project_path_for_directory(unpack_dir)
        .ok_or_else(|| Error::MissingProjectFile(unpack_dir.to_path_buf()))?;

    info!("reading project {}", project_path.display());
    let project = Project::load(&project_path)?;

    process_repack(unpack_dir, &project, options)
}

/// Rebuild an archive from an arbitrary directory of image files, pooling
/// metadata from every project file next to it.
///
/// Projects are scanned in lexicographic file-name order; when the same
/// output image name appears in more than one project, the first one scanned
/// wins. Images with no recorded metadata are skipped with a warning.
#[instrument(skip_all, fields(directory = %source_dir.display()))]
pub fn assemble_directory(source_dir: &Path, options: RepackOptions) -> Result<PathBuf> {
    let scan_dir = source_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut pool: IndexMap<String, FileEntry> = IndexMap::new();
    let mut template: Option<Project> = None;

    for path in project_files_in(scan_dir)? {
        let project = match Project::load(&path) {
            Ok(project) => project,
            Err(err) => {
                warn!("skipping unreadable project {}: {err}", path.display());
                continue;
            }
        };

        info!("pooling metadata from {}", path.display());
        for entry in &project.files {
            pool.entry(entry.image_name().to_ascii_lowercase())
                .or_insert_with(|| entry.clone());
        }
        template.get_or_insert(project);
    }

    let template = template.ok_or_else(|| Error::MissingProjectFile(scan_dir.to_path_buf()))?;
    info!("found metadata for {} files", pool.len());

    let mut files = Vec::new();
    for image in image_files_in(source_dir) {
        match pool.get(&image.to_ascii_lowercase()) {
            Some(entry) => files.push(entry.clone()),
            None => warn!("no recorded metadata for {image}, skipping"),
        }
    }

    let project = Project {
        raw_header: template.raw_header,
        sections: template.sections,
        files,
    };

    process_repack(source_dir, &project, options)
}

/// Project files next to the source directory, in scan order.
fn project_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(PROJECT_SUFFIX))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Image file names (base name only) found anywhere under the directory.
fn image_files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .filter(|name| {
            Path::new(name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(IMAGE_EXTENSION))
        })
        .collect();
    names.sort();
    names
}

fn process_repack(source_dir: &Path, project: &Project, options: RepackOptions) -> Result<PathBuf> {
    let base = project::archive_base_name(source_dir).unwrap_or_else(|| {
        source_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned()
    });

    // Keep only entries whose expected replacement file actually exists.
    let included: Vec<&FileEntry> = project
        .files
        .iter()
        .filter(|entry| source_dir.join(entry.expected_source_name()).is_file())
        .collect();

    if included.is_empty() {
        warn!("no matching files found in {}, producing an empty archive", source_dir.display());
    } else {
        info!("repacking {} files", included.len());
    }

    let sections_count = project.sections.len();
    let mut buffers: Vec<ChunkedBuffer> = (0..sections_count).map(|_| ChunkedBuffer::new()).collect();
    let mut resource_counts = vec![0u16; sections_count];
    let mut new_parts: Vec<FilePart> = Vec::new();
    let mut new_maps: Vec<FileMapEntry> = Vec::new();
    let mut accumulated_parts = 0u32;

    for (index, entry) in included.iter().enumerate() {
        new_maps.push(FileMapEntry {
            parts_count: entry.parts_count,
            unk1: entry.unk1,
            file_type: entry.file_type,
            unk2: entry.unk2,
            file_index: index as u32,
            first_part_index: accumulated_parts,
        });

        if entry.is_texture() {
            encode_texture(source_dir, entry, index, &mut buffers, &mut resource_counts, &mut new_parts)?;
        } else {
            encode_parts(source_dir, entry, index, &mut buffers, &mut resource_counts, &mut new_parts)?;
        }

        accumulated_parts += u32::from(entry.parts_count);
    }

    let (name_block, name_indices, file_index_remap) =
        rebuild_name_table(included.iter().map(|e| e.relative_path.as_str()));
    for map in &mut new_maps {
        map.file_index = file_index_remap[map.file_index as usize];
    }
    new_maps.sort_by_key(|map| map.file_index);

    let mut header = read_project_header(project)?;
    header.parts_count = new_parts.len() as u32;
    header.files_count = new_maps.len() as u32;
    header.file_names_size = name_block.len() as u32;
    header.fnames_count = name_indices.len() as u32;

    let metadata = write::metadata_size(
        sections_count,
        new_parts.len(),
        new_maps.len(),
        name_indices.len(),
        name_block.len(),
    );
    let data_start = write::align_up(metadata, METADATA_ALIGNMENT);
    let sizes: Vec<u64> = buffers.iter().map(ChunkedBuffer::len).collect();
    let new_sections = write::layout_sections(&project.sections, &resource_counts, &sizes, data_start);

    let output_path = source_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(format!("custom_{base}_pc.{ARCHIVE_EXTENSION}"));
    info!("creating {}", output_path.display());

    let mut out = File::create(&output_path)?;
    write::write_archive(
        &mut out,
        &header,
        &new_sections,
        &new_parts,
        &new_maps,
        &name_indices,
        &name_block,
        &buffers,
    )?;

    if options.save_project {
        let updated = Project {
            raw_header: serialize_header(&header)?,
            sections: project.sections.clone(),
            files: included
                .iter()
                .enumerate()
                .map(|(index, entry)| FileEntry {
                    original_index: file_index_remap[index],
                    ..(*entry).clone()
                })
                .collect(),
        };
        let updated_path = project::project_path_for_archive(&output_path);
        info!("saving updated project {}", updated_path.display());
        updated.save(&updated_path)?;
    }

    info!("all files repacked");
    Ok(output_path)
}

/// Append a replacement texture: the recorded header blob (with dimensions
/// patched to match the replacement image) and the image's pixel payload,
/// each padded to the 16-byte part boundary in its own target section.
fn encode_texture(
    source_dir: &Path,
    entry: &FileEntry,
    index: usize,
    buffers: &mut [ChunkedBuffer],
    resource_counts: &mut [u16],
    new_parts: &mut Vec<FilePart>,
) -> Result<()> {
    let (blob_info, pixel_info) = match entry.parts.as_slice() {
        [blob, pixels] => (blob, pixels),
        _ => return Err(Error::MalformedArchive),
    };

    let mut blob = entry
        .texture_header
        .clone()
        .ok_or_else(|| Error::MissingRequiredMetadata(entry.relative_path.clone()))?;

    let image_path = source_dir.join(entry.image_name());
    let image = fs::read(&image_path)?;
    let (image_info, payload) = dds::probe(&image).ok_or(Error::InvalidDds(image_path))?;

    let recorded = TextureHeader::parse(&blob)?;
    if image_info.width != recorded.width || image_info.height != recorded.height {
        info!(
            "{}: updated {}x{} to {}x{}",
            entry.relative_path, recorded.width, recorded.height, image_info.width, image_info.height
        );
        texture::patch_dimensions(&mut blob, image_info.width, image_info.height);
    }

    append_part(blob_info.section_index, blob_info.unk1, index, &blob, buffers, resource_counts, new_parts)?;
    append_part(pixel_info.section_index, pixel_info.unk1, index, payload, buffers, resource_counts, new_parts)
}

/// Append every part of a non-texture entry verbatim from its loose file.
fn encode_parts(
    source_dir: &Path,
    entry: &FileEntry,
    index: usize,
    buffers: &mut [ChunkedBuffer],
    resource_counts: &mut [u16],
    new_parts: &mut Vec<FilePart>,
) -> Result<()> {
    for (p, part_info) in entry.parts.iter().enumerate() {
        let data = fs::read(source_dir.join(entry.part_source_name(p)))?;
        append_part(part_info.section_index, part_info.unk1, index, &data, buffers, resource_counts, new_parts)?;
    }
    Ok(())
}

fn append_part(
    section_index: u8,
    unk1: u8,
    file_index: usize,
    data: &[u8],
    buffers: &mut [ChunkedBuffer],
    resource_counts: &mut [u16],
    new_parts: &mut Vec<FilePart>,
) -> Result<()> {
    let buffer = buffers
        .get_mut(section_index as usize)
        .ok_or(Error::MalformedArchive)?;

    new_parts.push(FilePart {
        section_index,
        unk1,
        file_index: file_index as u16,
        raw_offset: (buffer.len() >> 4) as u32,
        size: data.len() as u32,
        unk2: 0,
    });

    buffer.write_all(data)?;
    buffer.pad_to_alignment()?;
    resource_counts[section_index as usize] += 1;
    Ok(())
}

/// Build the alphabetically sorted name block and index table, plus the
/// mapping from processing-order index to sorted-order index.
fn rebuild_name_table<'a>(
    names: impl Iterator<Item = &'a str>,
) -> (Vec<u8>, Vec<FileNameIndex>, Vec<u32>) {
    let processing: Vec<&str> = names.collect();
    let mut sorted = processing.clone();
    sorted.sort_unstable();

    let mut name_block = Vec::new();
    let mut name_indices = Vec::with_capacity(sorted.len());
    for name in &sorted {
        name_indices.push(FileNameIndex {
            offset: name_block.len() as u32,
        });
        name_block.extend_from_slice(name.as_bytes());
        name_block.push(0);
    }

    let remap = processing
        .iter()
        .map(|name| {
            sorted
                .iter()
                .position(|s| s == name)
                .expect("sorted names are a permutation of the processing order") as u32
        })
        .collect();

    (name_block, name_indices, remap)
}

fn read_project_header(project: &Project) -> Result<ArchiveHeader> {
    if project.raw_header.len() != HEADER_SIZE as usize {
        return Err(Error::MalformedArchive);
    }
    Ok(ArchiveHeader::read(&mut Cursor::new(&project.raw_header))?)
}

fn serialize_header(header: &ArchiveHeader) -> Result<Vec<u8>> {
    let mut raw = Cursor::new(Vec::with_capacity(HEADER_SIZE as usize));
    header.write(&mut raw)?;
    Ok(raw.into_inner())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::rebuild_name_table;

    #[test]
    fn name_table_is_sorted_alphabetically() {
        let (block, indices, remap) = rebuild_name_table(["b.tex", "a.tex"].into_iter());

        assert_eq!(block, b"a.tex\0b.tex\0");
        assert_eq!(indices[0].offset, 0);
        assert_eq!(indices[1].offset, 6);
        // Processing index 0 ("b.tex") becomes sorted index 1.
        assert_eq!(remap, vec![1, 0]);
    }

    #[test]
    fn sorting_is_ordinal() {
        // Byte-wise comparison: uppercase sorts before lowercase.
        let (_, _, remap) = rebuild_name_table(["a.tex", "B.tex"].into_iter());
        assert_eq!(remap, vec![1, 0]);
    }
}

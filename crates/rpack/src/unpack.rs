//! Unpacking an archive into loose files plus a project for later repacking.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::dds;
use crate::error::Result;
use crate::project::{self, FileEntry, PartInfo, Project, SectionInfo, UNPACK_SUFFIX};
use crate::read::Archive;
use crate::texture::TextureHeader;

/// Unpack one archive next to itself.
///
/// Creates `<stem>_unpack/` (replacing any previous run), extracts every
/// logical file in recovered physical order, synthesizes a DDS image for
/// each texture entry, and persists the project JSON beside the archive.
/// Returns the output directory.
#[instrument(skip_all, fields(archive = %archive_path.display()))]
pub fn unpack_archive(archive_path: &Path) -> Result<PathBuf> {
    let stem = archive_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let output_dir = archive_path.with_file_name(format!("{stem}{UNPACK_SUFFIX}"));

    if output_dir.is_dir() {
        fs::remove_dir_all(&output_dir)?;
    }
    fs::create_dir_all(&output_dir)?;
    info!("extracting to {}", output_dir.display());

    let mut reader = File::open(archive_path)?;
    let archive = Archive::read(&mut reader)?;

    let mut project = Project {
        raw_header: archive.raw_header.to_vec(),
        sections: archive.sections.iter().map(SectionInfo::from).collect(),
        files: Vec::with_capacity(archive.len()),
    };

    let cache = archive.decompress_sections(&mut reader)?;
    let ordered = archive.files_in_physical_order()?;
    let total = ordered.len();

    for (index, map) in ordered.iter().enumerate() {
        let internal_name = archive.file_name(map.file_index)?;
        info!("[{}/{total}] {internal_name}", index + 1);

        let mut entry = FileEntry {
            original_index: map.file_index,
            relative_path: internal_name.replace('\\', "/"),
            parts_count: map.parts_count,
            file_type: map.file_type,
            unk1: map.unk1,
            unk2: map.unk2,
            texture_header: None,
            parts: Vec::with_capacity(map.parts_count as usize),
        };

        let parts = archive.parts_of(map)?;
        for part in parts {
            entry.parts.push(PartInfo {
                section_index: part.section_index,
                unk1: part.unk1,
            });
        }

        if map.is_texture() {
            let blob = archive.read_part_data(&mut reader, &parts[0], &cache)?;
            let pixels = archive.read_part_data(&mut reader, &parts[1], &cache)?;

            let texture = TextureHeader::parse(&blob)?;
            let format =
                dds::resolve_format(&entry.relative_path, texture.legacy_format, texture.tex_type);
            info!("{} resolved as {}", entry.image_name(), format.name());

            let header = dds::generate_header(
                u32::from(texture.width),
                u32::from(texture.height),
                u32::from(texture.mip_count),
                u32::from(texture.depth),
                texture.tex_type,
                format,
            );

            let output_path = output_dir.join(entry.image_name());
            let mut image = header;
            image.extend_from_slice(&pixels);
            fs::write(&output_path, image)?;

            entry.texture_header = Some(blob);
        } else {
            for (p, part) in parts.iter().enumerate() {
                let data = archive.read_part_data(&mut reader, part, &cache)?;
                let output_path = output_dir.join(entry.part_source_name(p));
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output_path, data)?;
            }
        }

        project.files.push(entry);
    }

    project.save(&project::project_path_for_archive(archive_path))?;

    Ok(output_dir)
}

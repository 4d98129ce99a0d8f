use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use rpack::buffer::ChunkedBuffer;
use rpack::error::Error;
use rpack::project::{Project, SectionInfo};
use rpack::read::Archive;
use rpack::repack::{assemble_directory, repack_directory, RepackOptions};
use rpack::texture::TextureHeader;
use rpack::types::{ArchiveHeader, FileMapEntry, FileNameIndex, FilePart};
use rpack::unpack::unpack_archive;
use rpack::write;
use tracing_test::traced_test;

const BLOB_LEN: usize = 76;
const PIXELS_LEN: usize = 32;
const CONFIG_DATA: &[u8] = b"0123456789";

fn texture_blob(width: u16, height: u16) -> Vec<u8> {
    let mut blob = vec![0u8; BLOB_LEN];
    LittleEndian::write_u16(&mut blob[64..66], width);
    LittleEndian::write_u16(&mut blob[66..68], height);
    blob[68] = 1; // depth
    blob[71] = 1 << 2; // one mip, flat texture
    blob
}

fn pixel_payload() -> Vec<u8> {
    (0..PIXELS_LEN as u8).collect()
}

/// Write `world_pc.rpack` into `dir`: one 8x8 texture ("textures/stone_dif.tex",
/// blob in section 0 and pixels in section 1) plus one plain binary file
/// ("data/config.bin" in section 0).
fn write_sample_archive(dir: &Path) -> Result<PathBuf> {
    let blob = texture_blob(8, 8);

    let mut buffers = vec![ChunkedBuffer::new(), ChunkedBuffer::new()];
    buffers[0].write_all(&blob).into_diagnostic()?;
    buffers[0].pad_to_alignment().into_diagnostic()?;
    buffers[0].write_all(CONFIG_DATA).into_diagnostic()?;
    buffers[0].pad_to_alignment().into_diagnostic()?;
    buffers[1].write_all(&pixel_payload()).into_diagnostic()?;
    buffers[1].pad_to_alignment().into_diagnostic()?;

    let parts = vec![
        FilePart {
            section_index: 0,
            size: BLOB_LEN as u32,
            ..FilePart::default()
        },
        FilePart {
            section_index: 1,
            size: PIXELS_LEN as u32,
            ..FilePart::default()
        },
        FilePart {
            section_index: 0,
            file_index: 1,
            raw_offset: 80 >> 4,
            size: CONFIG_DATA.len() as u32,
            ..FilePart::default()
        },
    ];
    let file_maps = vec![
        FileMapEntry {
            parts_count: 1,
            file_type: 1,
            file_index: 0,
            first_part_index: 2,
            ..FileMapEntry::default()
        },
        FileMapEntry {
            parts_count: 2,
            file_type: 32,
            file_index: 1,
            first_part_index: 0,
            ..FileMapEntry::default()
        },
    ];
    let name_block = b"data/config.bin\0textures/stone_dif.tex\0".to_vec();
    let name_indices = vec![FileNameIndex { offset: 0 }, FileNameIndex { offset: 16 }];

    let header = ArchiveHeader {
        signature: 0x6B617052,
        version: 1,
        parts_count: parts.len() as u32,
        sections_count: 2,
        files_count: file_maps.len() as u32,
        file_names_size: name_block.len() as u32,
        fnames_count: name_indices.len() as u32,
        ..ArchiveHeader::default()
    };

    let infos = vec![
        SectionInfo {
            file_type: 1,
            ..SectionInfo::default()
        },
        SectionInfo {
            file_type: 2,
            ..SectionInfo::default()
        },
    ];
    let sizes: Vec<u64> = buffers.iter().map(ChunkedBuffer::len).collect();
    let metadata = write::metadata_size(2, parts.len(), file_maps.len(), 2, name_block.len());
    let sections = write::layout_sections(
        &infos,
        &[2, 1],
        &sizes,
        write::align_up(metadata, 4096),
    );

    let path = dir.join("world_pc.rpack");
    let mut out = File::create(&path).into_diagnostic()?;
    write::write_archive(
        &mut out,
        &header,
        &sections,
        &parts,
        &file_maps,
        &name_indices,
        &name_block,
        &buffers,
    )?;
    Ok(path)
}

#[traced_test]
#[test]
fn unpack_extracts_images_and_project() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let archive_path = write_sample_archive(dir.path())?;

    let out_dir = unpack_archive(&archive_path)?;
    assert_eq!(out_dir, dir.path().join("world_pc_unpack"));

    // "dif" suffix resolves to BC1, which keeps the classic 128-byte header.
    let image = fs::read(out_dir.join("stone_dif.dds")).into_diagnostic()?;
    assert_eq!(&image[..4], b"DDS ");
    assert_eq!(image.len(), 128 + PIXELS_LEN);
    assert_eq!(&image[128..], pixel_payload());
    assert_eq!(LittleEndian::read_u32(&image[12..16]), 8); // height
    assert_eq!(LittleEndian::read_u32(&image[16..20]), 8); // width

    let config = fs::read(out_dir.join("data/config.bin")).into_diagnostic()?;
    assert_eq!(config, CONFIG_DATA);

    // The resolved format is reported per texture at the default level.
    logs_assert(|lines: &[&str]| {
        let reported = lines
            .iter()
            .any(|line| line.contains("INFO") && line.contains("stone_dif.dds resolved as BC1"));
        if reported {
            Ok(())
        } else {
            Err("no resolved-format report at info level".into())
        }
    });

    let project = Project::load(&dir.path().join("world_pc_repack.json"))?;
    assert_eq!(project.files.len(), 2);
    assert_eq!(project.sections.len(), 2);
    // Physical order: the texture's parts precede the binary file.
    assert_eq!(project.files[0].relative_path, "textures/stone_dif.tex");
    assert_eq!(project.files[0].texture_header, Some(texture_blob(8, 8)));
    assert_eq!(project.files[1].relative_path, "data/config.bin");
    assert_eq!(project.files[1].texture_header, None);

    Ok(())
}

#[traced_test]
#[test]
fn unpack_then_repack_preserves_payloads() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let archive_path = write_sample_archive(dir.path())?;
    let out_dir = unpack_archive(&archive_path)?;

    let rebuilt_path = repack_directory(&out_dir, RepackOptions::default())?;
    assert_eq!(rebuilt_path, dir.path().join("custom_world_pc_pc.rpack"));

    let mut reader = File::open(&rebuilt_path).into_diagnostic()?;
    let rebuilt = Archive::read(&mut reader)?;
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt.file_name(0)?, "data/config.bin");
    assert_eq!(rebuilt.file_name(1)?, "textures/stone_dif.tex");

    let cache = rebuilt.decompress_sections(&mut reader)?;
    let texture = &rebuilt.file_maps[1];
    assert!(texture.is_texture());
    let parts = rebuilt.parts_of(texture)?;
    assert_eq!(
        rebuilt.read_part_data(&mut reader, &parts[0], &cache)?,
        texture_blob(8, 8)
    );
    assert_eq!(
        rebuilt.read_part_data(&mut reader, &parts[1], &cache)?,
        pixel_payload()
    );

    let config = &rebuilt.file_maps[0];
    let parts = rebuilt.parts_of(config)?;
    assert_eq!(
        rebuilt.read_part_data(&mut reader, &parts[0], &cache)?,
        CONFIG_DATA
    );

    // Rebuilt sections are always stored raw.
    assert!(rebuilt.sections.iter().all(|s| s.packed_size == 0));

    Ok(())
}

#[traced_test]
#[test]
fn resized_image_updates_the_texture_header() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let archive_path = write_sample_archive(dir.path())?;
    let out_dir = unpack_archive(&archive_path)?;

    // Pretend the image was re-exported at 16x16.
    let image_path = out_dir.join("stone_dif.dds");
    let mut image = fs::read(&image_path).into_diagnostic()?;
    LittleEndian::write_u32(&mut image[12..16], 16);
    LittleEndian::write_u32(&mut image[16..20], 16);
    fs::write(&image_path, &image).into_diagnostic()?;

    let rebuilt_path = repack_directory(&out_dir, RepackOptions::default())?;
    let mut reader = File::open(&rebuilt_path).into_diagnostic()?;
    let rebuilt = Archive::read(&mut reader)?;
    let cache = rebuilt.decompress_sections(&mut reader)?;

    let texture = &rebuilt.file_maps[1];
    let parts = rebuilt.parts_of(texture)?;
    let blob = rebuilt.read_part_data(&mut reader, &parts[0], &cache)?;
    let header = TextureHeader::parse(&blob)?;
    assert_eq!(header.width, 16);
    assert_eq!(header.height, 16);

    Ok(())
}

#[traced_test]
#[test]
fn deleted_files_are_left_out() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let archive_path = write_sample_archive(dir.path())?;
    let out_dir = unpack_archive(&archive_path)?;

    fs::remove_file(out_dir.join("data/config.bin")).into_diagnostic()?;

    let rebuilt_path = repack_directory(&out_dir, RepackOptions::default())?;
    let mut reader = File::open(&rebuilt_path).into_diagnostic()?;
    let rebuilt = Archive::read(&mut reader)?;

    assert_eq!(rebuilt.len(), 1);
    assert_eq!(rebuilt.file_name(0)?, "textures/stone_dif.tex");
    assert_eq!(rebuilt.header.parts_count, 2);

    Ok(())
}

#[traced_test]
#[test]
fn repack_without_project_fails_up_front() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let orphan = dir.path().join("world_pc_unpack");
    fs::create_dir_all(&orphan).into_diagnostic()?;

    let result = repack_directory(&orphan, RepackOptions::default());
    assert!(matches!(result, Err(Error::MissingProjectFile(_))));

    Ok(())
}

#[traced_test]
#[test]
fn assemble_pools_metadata_from_sibling_projects() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let archive_path = write_sample_archive(dir.path())?;
    let out_dir = unpack_archive(&archive_path)?;

    // A fresh mod directory holding just the texture, next to the project
    // file the unpack left behind.
    let mix_dir = dir.path().join("mix");
    fs::create_dir_all(&mix_dir).into_diagnostic()?;
    fs::copy(
        out_dir.join("stone_dif.dds"),
        mix_dir.join("stone_dif.dds"),
    )
    .into_diagnostic()?;

    let rebuilt_path = assemble_directory(&mix_dir, RepackOptions::default())?;
    assert_eq!(rebuilt_path, dir.path().join("custom_mix_pc.rpack"));

    let mut reader = File::open(&rebuilt_path).into_diagnostic()?;
    let rebuilt = Archive::read(&mut reader)?;
    assert_eq!(rebuilt.len(), 1);
    assert_eq!(rebuilt.file_name(0)?, "textures/stone_dif.tex");

    let cache = rebuilt.decompress_sections(&mut reader)?;
    let parts = rebuilt.parts_of(&rebuilt.file_maps[0])?;
    assert_eq!(
        rebuilt.read_part_data(&mut reader, &parts[1], &cache)?,
        pixel_payload()
    );

    Ok(())
}

#[traced_test]
#[test]
fn save_project_writes_an_updated_project() -> Result<()> {
    let dir = tempfile::tempdir().into_diagnostic()?;
    let archive_path = write_sample_archive(dir.path())?;
    let out_dir = unpack_archive(&archive_path)?;

    let options = RepackOptions::builder().save_project(true).build();
    let rebuilt_path = repack_directory(&out_dir, options)?;

    let updated = Project::load(&dir.path().join("custom_world_pc_pc_repack.json"))?;
    assert_eq!(updated.files.len(), 2);
    // Indices now reflect the rebuilt name table.
    assert_eq!(updated.files[0].relative_path, "textures/stone_dif.tex");
    assert_eq!(updated.files[0].original_index, 1);
    assert_eq!(updated.files[1].original_index, 0);

    // The updated header matches what was written to disk.
    let mut reader = File::open(&rebuilt_path).into_diagnostic()?;
    let rebuilt = Archive::read(&mut reader)?;
    assert_eq!(updated.raw_header, rebuilt.raw_header.to_vec());

    Ok(())
}

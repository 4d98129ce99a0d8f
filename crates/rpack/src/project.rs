//! The project interchange representation persisted alongside each archive.
//!
//! A project records everything the repack pipeline needs to re-derive the
//! part and file-map tables without reusing any positional data from the
//! original archive: the raw header bytes, per-section classification, and
//! per-file metadata including the raw texture header blob for textures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{SectionEntry, TEXTURE_FILE_TYPE};

/// File extension of the archives themselves.
pub const ARCHIVE_EXTENSION: &str = "rpack";

/// Extension given to extracted texture images.
pub const IMAGE_EXTENSION: &str = "dds";

/// Naming convention for unpack output directories.
pub const UNPACK_SUFFIX: &str = "_unpack";

/// Naming convention for persisted project files.
pub const PROJECT_SUFFIX: &str = "_repack.json";

/// Persisted project for one archive.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// The original 36 header bytes, carried through verbatim. Count fields
    /// are rewritten on encode; everything else is preserved.
    pub raw_header: Vec<u8>,
    pub sections: Vec<SectionInfo>,
    pub files: Vec<FileEntry>,
}

/// Per-section classification, with no positional data.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub file_type: u8,
    pub type2: u8,
    pub type3: u8,
    pub type4: u8,
    pub unk: u16,
}

impl From<&SectionEntry> for SectionInfo {
    fn from(entry: &SectionEntry) -> Self {
        SectionInfo {
            file_type: entry.file_type,
            type2: entry.type2,
            type3: entry.type3,
            type4: entry.type4,
            unk: entry.unk,
        }
    }
}

/// One logical file of the archive.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// The file's index into the original archive's name table.
    pub original_index: u32,
    pub relative_path: String,
    pub parts_count: u8,
    pub file_type: u8,
    pub unk1: u8,
    pub unk2: u8,

    /// Raw texture header blob, present only for texture entries. Required
    /// to rebuild the archive and to detect dimension edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_header: Option<Vec<u8>>,

    pub parts: Vec<PartInfo>,
}

/// Per-part placement data that survives a round trip.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartInfo {
    pub section_index: u8,
    pub unk1: u8,
}

impl FileEntry {
    /// Whether this entry is a texture extracted as a single image file.
    pub fn is_texture(&self) -> bool {
        self.file_type == TEXTURE_FILE_TYPE && self.parts_count == 2
    }

    fn base_name(&self) -> &str {
        Path::new(&self.relative_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.relative_path)
    }

    /// Name of the image file a texture entry is extracted to. Directory
    /// components are dropped; only the base name survives.
    pub fn image_name(&self) -> String {
        format!("{}.{IMAGE_EXTENSION}", self.base_name())
    }

    /// On-disk name of one part of a non-texture entry.
    pub fn part_source_name(&self, part: usize) -> String {
        if self.parts_count == 1 {
            self.relative_path.clone()
        } else {
            format!("{part}_{}", self.relative_path)
        }
    }

    /// The path (relative to the source directory) this entry is expected
    /// at when repacking.
    pub fn expected_source_name(&self) -> String {
        if self.is_texture() {
            self.image_name()
        } else {
            self.part_source_name(0)
        }
    }
}

impl Project {
    /// Load a project from its JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingProjectFile(path.to_path_buf()));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Persist the project as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Project file written next to `archive` when unpacking it.
pub fn project_path_for_archive(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    archive.with_file_name(format!("{stem}{PROJECT_SUFFIX}"))
}

/// Base archive name an unpack directory was produced from, if the
/// directory follows the `<name>_unpack` convention.
pub fn archive_base_name(directory: &Path) -> Option<String> {
    directory
        .file_name()
        .and_then(|s| s.to_str())
        .and_then(|name| name.strip_suffix(UNPACK_SUFFIX))
        .map(str::to_owned)
}

/// Project file expected next to a `<name>_unpack` directory.
pub fn project_path_for_directory(directory: &Path) -> Option<PathBuf> {
    let base = archive_base_name(directory)?;
    Some(directory.with_file_name(format!("{base}{PROJECT_SUFFIX}")))
}

//! This library handles unpacking and rebuilding **RPACK** resource archives.
//!
//! # RPACK Archive Format Documentation
//!
//! This crate provides utilities to read, extract and rebuild the **RPACK** archive format used
//! to ship game resources, most prominently textures. The format is a custom binary container
//! that stores many resources split into typed sections. Archive files carry the `.rpack`
//! extension.
//!
//! ## File Structure
//!
//! An RPACK file consists of a header, four metadata tables, a name block, zero padding up to a
//! 4096-byte boundary, and finally the section data.
//!
//! ### Header
//!
//! | Offset (bytes) | Field              | Description                                          |
//! |----------------|--------------------|------------------------------------------------------|
//! | 0x0000         | Signature          | 4 bytes: container signature                         |
//! | 0x0004         | Version            | 4 bytes: format version                              |
//! | 0x0008         | Compression flags  | 4 bytes: observed, carried through verbatim          |
//! | 0x000C         | Parts count        | 4 bytes: number of entries in the part table         |
//! | 0x0010         | Sections count     | 4 bytes: number of entries in the section table      |
//! | 0x0014         | Files count        | 4 bytes: number of entries in the file-map table     |
//! | 0x0018         | Name block size    | 4 bytes: size of the name block in bytes             |
//! | 0x001C         | Name count         | 4 bytes: number of entries in the name-index table   |
//! | 0x0020         | Block alignment    | 4 bytes: observed, carried through verbatim          |
//!
//! ### Section Table
//!
//! Each of the 20-byte section entries describes one contiguous data region:
//!
//! | Offset (bytes) | Field              | Description                                          |
//! |----------------|--------------------|------------------------------------------------------|
//! | 0x0000         | Type bytes         | 4 bytes: section classification                      |
//! | 0x0004         | Raw offset         | 4 bytes: absolute byte offset divided by 16          |
//! | 0x0008         | Unpacked size      | 4 bytes: size of the section data when decompressed  |
//! | 0x000C         | Packed size        | 4 bytes: compressed size, or 0 when stored raw       |
//! | 0x0010         | Resource count     | 2 bytes: number of parts stored in the section       |
//! | 0x0012         | Unknown            | 2 bytes: observed, carried through verbatim          |
//!
//! A section whose packed size is non-zero holds a single zlib stream covering the whole
//! section; its parts are addressed inside the decompressed image.
//!
//! ### Part Table
//!
//! Each 16-byte part locates one fragment of a file inside a section:
//!
//! | Offset (bytes) | Field              | Description                                          |
//! |----------------|--------------------|------------------------------------------------------|
//! | 0x0000         | Section index      | 1 byte: which section holds this part                |
//! | 0x0001         | Unknown            | 1 byte: observed, carried through verbatim           |
//! | 0x0002         | File index         | 2 bytes: owning file, in processing order            |
//! | 0x0004         | Raw offset         | 4 bytes: section-relative byte offset divided by 16  |
//! | 0x0008         | Size               | 4 bytes: part size in bytes                          |
//! | 0x000C         | Unknown            | 4 bytes: observed, carried through verbatim          |
//!
//! ### File-Map Table
//!
//! Each 12-byte entry groups a run of consecutive parts into one logical file:
//!
//! | Offset (bytes) | Field              | Description                                          |
//! |----------------|--------------------|------------------------------------------------------|
//! | 0x0000         | Parts count        | 1 byte: number of parts making up the file           |
//! | 0x0001         | Unknown            | 1 byte: observed, carried through verbatim           |
//! | 0x0002         | File type          | 1 byte: 32 marks a texture                           |
//! | 0x0003         | Unknown            | 1 byte: observed, carried through verbatim           |
//! | 0x0004         | File index         | 4 bytes: index into the name-index table             |
//! | 0x0008         | First part index   | 4 bytes: index of the file's first part              |
//!
//! ### Name Tables
//!
//! The name-index table holds one 4-byte offset per file, pointing into the name block. The
//! name block stores NUL-terminated relative paths, sorted alphabetically. The file-map table
//! is sorted by file index, so names and maps line up positionally after a rebuild.
//!
//! ## Textures
//!
//! A texture is a file of type 32 with exactly two parts: a 72-byte-plus metadata blob holding
//! width, height, depth, a legacy pixel-format code and a packed mip/type byte, followed by the
//! raw pixel payload. Extraction synthesizes a standard DDS header (classic 128-byte, or
//! 148-byte with a DX10 extension for formats classic headers cannot express) so the payload
//! opens in ordinary image tools.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.rpack`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: Whole-section zlib; rebuilt archives are always stored raw

pub mod buffer;
pub mod compression;
pub mod dds;
pub mod error;
pub mod project;
pub mod read;
pub mod repack;
pub mod texture;
pub mod types;
pub mod unpack;
pub mod write;

pub use error::{Error, Result};
pub use project::Project;
pub use read::Archive;
pub use repack::{assemble_directory, repack_directory, RepackOptions};
pub use unpack::unpack_archive;

//! Section decompression handling.
//!
//! Compressed sections start with the zlib signature byte `0x78`; anything
//! else is passed through untouched. Re-encoded archives always store their
//! sections raw, so there is no compression path on the write side.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::instrument;

use crate::error::Result;

/// First byte of every zlib stream.
const ZLIB_SIGNATURE: u8 = 0x78;

/// Whether a stored section payload carries the zlib signature.
pub fn is_zlib(data: &[u8]) -> bool {
    data.len() > 2 && data[0] == ZLIB_SIGNATURE
}

/// Unpack a stored section payload.
///
/// Returns the inflated bytes when the payload is a zlib stream, or `None`
/// when the payload is stored raw and can be sliced in place.
#[instrument(skip(data), fields(size = data.len()))]
pub fn decompress_block(data: &[u8]) -> Result<Option<Vec<u8>>> {
    if !is_zlib(data) {
        return Ok(None);
    }

    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(Some(out))
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::{write::ZlibEncoder, Compression};
    use pretty_assertions::assert_eq;

    use super::decompress_block;
    use crate::error::Result;

    #[test]
    fn raw_block_passes_through() -> Result<()> {
        assert_eq!(decompress_block(&[0x01, 0x02, 0x03, 0x04])?, None);
        Ok(())
    }

    #[test]
    fn short_block_passes_through() -> Result<()> {
        assert_eq!(decompress_block(&[0x78])?, None);
        Ok(())
    }

    #[test]
    fn zlib_block_is_inflated() -> Result<()> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"Hello World")?;
        let compressed = encoder.finish()?;

        let inflated = decompress_block(&compressed)?;
        assert_eq!(inflated.as_deref(), Some(&b"Hello World"[..]));

        Ok(())
    }
}

//! Best-effort body decompression keyed on `Content-Encoding`.
//!
//! A payload that fails to decode is returned as received. The failure is
//! logged and never reaches the caller. Decoded output never exceeds the
//! caller's limit.

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::io::{self, Read};
use tracing::{debug, warn};

const BROTLI_BUFFER_SIZE: usize = 4096;

/// A decoded body and whether any part of it was cut off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub body: Vec<u8>,
    pub truncated: bool,
}

/// Decode `body` according to a `Content-Encoding` header value.
///
/// `gzip`/`x-gzip`, `br` and `deflate` are understood (case-insensitively).
/// A missing header, `identity`, or any other value passes the body through.
///
/// At most `max_len` decoded bytes are kept. `input_truncated` says the
/// compressed stream was already cut on the wire; in that case the bytes
/// decoded before the stream ran out are kept instead of the raw payload.
#[must_use]
pub fn decompress(
    body: Vec<u8>,
    content_encoding: Option<&str>,
    max_len: usize,
    input_truncated: bool,
) -> Decoded {
    let passthrough = |body: Vec<u8>| Decoded {
        body,
        truncated: input_truncated,
    };
    let Some(encoding) = content_encoding.map(|e| e.trim().to_ascii_lowercase()) else {
        return passthrough(body);
    };

    let (plain, status) = match encoding.as_str() {
        "gzip" | "x-gzip" => read_capped(GzDecoder::new(body.as_slice()), max_len),
        "br" => read_capped(
            brotli::Decompressor::new(body.as_slice(), BROTLI_BUFFER_SIZE),
            max_len,
        ),
        // Servers disagree on whether "deflate" means zlib-wrapped or raw.
        "deflate" => match read_capped(ZlibDecoder::new(body.as_slice()), max_len) {
            (plain, Err(_)) if plain.is_empty() => {
                read_capped(DeflateDecoder::new(body.as_slice()), max_len)
            }
            zlib => zlib,
        },
        "" | "identity" => return passthrough(body),
        other => {
            debug!("Unrecognized content encoding {other:?}; passing body through");
            return passthrough(body);
        }
    };

    match status {
        Ok(hit_cap) => {
            if hit_cap {
                warn!("Decoded {encoding} body exceeds {max_len} bytes; truncated");
            }
            Decoded {
                body: plain,
                truncated: hit_cap || input_truncated,
            }
        }
        Err(e) if input_truncated && !plain.is_empty() => {
            warn!(
                "{encoding} stream cut at the size limit ({e}); keeping {} decoded bytes",
                plain.len()
            );
            Decoded {
                body: plain,
                truncated: true,
            }
        }
        Err(e) => {
            warn!("Failed to decode {encoding} body ({e}); using raw bytes");
            passthrough(body)
        }
    }
}

/// Reads at most `max_len` bytes. The status is whether more output was
/// available; on a decode error, the bytes produced so far are still returned.
fn read_capped(reader: impl Read, max_len: usize) -> (Vec<u8>, io::Result<bool>) {
    let cap = u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(1);
    let mut out = Vec::new();
    let status = reader.take(cap).read_to_end(&mut out);
    let hit_cap = out.len() > max_len;
    out.truncate(max_len);
    (out, status.map(|_| hit_cap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    const PLAIN: &[u8] = b"<html><body><p>Hello, compressed world!</p></body></html>";
    const LIMIT: usize = 1024 * 1024;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn brotli_compress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
            enc.write_all(data).unwrap();
        }
        out
    }

    fn decode(body: Vec<u8>, encoding: Option<&str>) -> Vec<u8> {
        let decoded = decompress(body, encoding, LIMIT, false);
        assert!(!decoded.truncated);
        decoded.body
    }

    #[test]
    fn test_gzip_round_trip() {
        assert_eq!(decode(gzip(PLAIN), Some("gzip")), PLAIN);
        assert_eq!(decode(gzip(PLAIN), Some("X-GZIP")), PLAIN);
    }

    #[test]
    fn test_brotli_round_trip() {
        assert_eq!(decode(brotli_compress(PLAIN), Some("br")), PLAIN);
    }

    #[test]
    fn test_deflate_zlib_and_raw() {
        let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
        zlib.write_all(PLAIN).unwrap();
        assert_eq!(decode(zlib.finish().unwrap(), Some("deflate")), PLAIN);

        let mut raw = DeflateEncoder::new(Vec::new(), Compression::default());
        raw.write_all(PLAIN).unwrap();
        assert_eq!(decode(raw.finish().unwrap(), Some("deflate")), PLAIN);
    }

    #[test]
    fn test_passthrough_without_or_unknown_encoding() {
        assert_eq!(decode(PLAIN.to_vec(), None), PLAIN);
        assert_eq!(decode(PLAIN.to_vec(), Some("identity")), PLAIN);
        assert_eq!(decode(PLAIN.to_vec(), Some("zstd")), PLAIN);
    }

    #[test]
    fn test_corrupt_payload_falls_back_to_raw() {
        let garbage = b"definitely not gzip".to_vec();
        assert_eq!(decode(garbage.clone(), Some("gzip")), garbage);
        assert_eq!(decode(garbage.clone(), Some("br")), garbage);
    }

    #[test]
    fn test_decoded_output_is_capped() {
        let bomb = gzip(&vec![0u8; 4 * 1024 * 1024]);
        assert!(bomb.len() < 64 * 1024);

        let decoded = decompress(bomb, Some("gzip"), 1000, false);
        assert!(decoded.truncated);
        assert_eq!(decoded.body.len(), 1000);
        assert!(decoded.body.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_output_exactly_at_cap_is_not_truncated() {
        let decoded = decompress(gzip(PLAIN), Some("gzip"), PLAIN.len(), false);
        assert!(!decoded.truncated);
        assert_eq!(decoded.body, PLAIN);
    }

    #[test]
    fn test_cut_stream_keeps_decoded_prefix() {
        let page: String = (0..20_000).map(|i| format!("<p>paragraph {i}</p>")).collect();
        let compressed = gzip(page.as_bytes());
        let half = compressed[..compressed.len() / 2].to_vec();

        let decoded = decompress(half, Some("gzip"), LIMIT, true);
        assert!(decoded.truncated);
        assert!(!decoded.body.is_empty());
        assert!(page.as_bytes().starts_with(&decoded.body));
    }

    #[test]
    fn test_cut_stream_without_output_stays_raw() {
        let garbage = b"definitely not gzip".to_vec();
        let decoded = decompress(garbage.clone(), Some("gzip"), LIMIT, true);
        assert!(decoded.truncated);
        assert_eq!(decoded.body, garbage);
    }
}

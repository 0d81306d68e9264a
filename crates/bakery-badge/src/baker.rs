//! # PNG Baking
//!
//! Embeds a signed assertion into a PNG image as an ancillary text chunk,
//! turning the image into a self-contained verifiable credential. This is
//! deliberately not a general PNG editor: it walks the chunk stream,
//! validates structure, and touches exactly one chunk type.
//!
//! ## Chunk Layout
//!
//! A PNG is an 8-byte signature followed by chunks of the form
//! `length (u32 BE) | type (4 bytes) | data | CRC-32 over type+data`.
//! The assertion is carried in an `iTXt` chunk with keyword `openbadges`
//! (the Open Badges baking convention), uncompressed, with empty language
//! tag and translated keyword:
//!
//! ```text
//! "openbadges" NUL  0x00 0x00  NUL  NUL  <UTF-8 JWS>
//! ```
//!
//! The chunk is inserted immediately after `IHDR`, ahead of any image
//! data. Every other chunk passes through byte-identical and in original
//! order; decoders that ignore unknown ancillary chunks render the
//! original pixels unchanged.
//!
//! ## Re-Baking
//!
//! Existing `openbadges` `iTXt` chunks are dropped during baking, so
//! re-baking replaces the payload instead of accumulating chunks. Foreign
//! `iTXt` chunks (other keywords) are left alone.

use crate::error::{BadgeError, BadgeResult};
use crate::signer::SignedAssertion;

/// The fixed 8-byte PNG file signature.
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// International text chunk type; ancillary and safe for unaware decoders
/// to skip.
const ITXT: [u8; 4] = *b"iTXt";

/// Keyword reserved for the embedded assertion.
const BADGE_KEYWORD: &[u8] = b"openbadges";

/// PNG caps chunk data length at 2^31 - 1 bytes.
const MAX_CHUNK_DATA: usize = 0x7FFF_FFFF;

/// A parsed chunk, borrowing the input buffer.
///
/// `raw` spans the full encoding (length, type, data, CRC) so unmodified
/// chunks can be copied through byte-identically.
struct RawChunk<'a> {
    chunk_type: [u8; 4],
    data: &'a [u8],
    raw: &'a [u8],
}

impl RawChunk<'_> {
    fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }

    /// Whether this is the reserved assertion chunk: `iTXt` with the
    /// `openbadges` keyword.
    fn is_badge_chunk(&self) -> bool {
        self.chunk_type == ITXT
            && self.data.len() > BADGE_KEYWORD.len()
            && &self.data[..BADGE_KEYWORD.len()] == BADGE_KEYWORD
            && self.data[BADGE_KEYWORD.len()] == 0
    }
}

/// Walk and validate the chunk stream.
///
/// Rejects a missing PNG signature, truncated chunk headers or data, CRC
/// mismatches, a first chunk that is not `IHDR`, and a stream that does
/// not end with `IEND` — each with the offending offset or chunk named.
fn parse_chunks(png: &[u8]) -> BadgeResult<Vec<RawChunk<'_>>> {
    if png.len() < PNG_SIGNATURE.len() || png[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(BadgeError::InvalidImage {
            reason: "missing PNG signature".into(),
        });
    }

    let mut chunks = Vec::new();
    let mut offset = PNG_SIGNATURE.len();
    while offset < png.len() {
        if png.len() - offset < 12 {
            return Err(BadgeError::InvalidImage {
                reason: format!("truncated chunk header at offset {offset}"),
            });
        }
        let length = u32::from_be_bytes([
            png[offset],
            png[offset + 1],
            png[offset + 2],
            png[offset + 3],
        ]) as usize;
        if length > MAX_CHUNK_DATA {
            return Err(BadgeError::InvalidImage {
                reason: format!("chunk at offset {offset} declares illegal length {length}"),
            });
        }
        if png.len() - offset - 12 < length {
            return Err(BadgeError::InvalidImage {
                reason: format!("truncated chunk data at offset {offset}"),
            });
        }
        let chunk_type: [u8; 4] = png[offset + 4..offset + 8].try_into().unwrap_or([0; 4]);
        let data = &png[offset + 8..offset + 8 + length];
        let stored_crc = u32::from_be_bytes([
            png[offset + 8 + length],
            png[offset + 9 + length],
            png[offset + 10 + length],
            png[offset + 11 + length],
        ]);
        let computed_crc = chunk_crc(&chunk_type, data);
        if stored_crc != computed_crc {
            return Err(BadgeError::InvalidImage {
                reason: format!(
                    "CRC mismatch in {} chunk at offset {offset}",
                    String::from_utf8_lossy(&chunk_type)
                ),
            });
        }
        chunks.push(RawChunk {
            chunk_type,
            data,
            raw: &png[offset..offset + 12 + length],
        });
        offset += 12 + length;
    }

    match chunks.first() {
        Some(first) if first.chunk_type == *b"IHDR" => {}
        Some(first) => {
            return Err(BadgeError::InvalidImage {
                reason: format!("first chunk is {}, expected IHDR", first.type_name()),
            })
        }
        None => {
            return Err(BadgeError::InvalidImage {
                reason: "no chunks after PNG signature".into(),
            })
        }
    }
    if chunks.last().map(|c| c.chunk_type) != Some(*b"IEND") {
        return Err(BadgeError::InvalidImage {
            reason: "chunk stream does not end with IEND".into(),
        });
    }

    Ok(chunks)
}

/// CRC-32 over chunk type and data, as PNG requires.
fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}

/// Encode the reserved `iTXt` chunk carrying the JWS.
fn encode_badge_chunk(jws: &str) -> BadgeResult<Vec<u8>> {
    let text = jws.as_bytes();
    // keyword NUL, compression flag + method, empty language tag NUL,
    // empty translated keyword NUL, then the text.
    let mut data = Vec::with_capacity(BADGE_KEYWORD.len() + 5 + text.len());
    data.extend_from_slice(BADGE_KEYWORD);
    data.push(0);
    data.push(0); // compression flag: uncompressed
    data.push(0); // compression method
    data.push(0); // language tag terminator
    data.push(0); // translated keyword terminator
    data.extend_from_slice(text);

    if data.len() > MAX_CHUNK_DATA {
        return Err(BadgeError::Encoding {
            reason: format!(
                "signed assertion is {} bytes; a single chunk holds at most {MAX_CHUNK_DATA}",
                data.len()
            ),
        });
    }

    let mut chunk = Vec::with_capacity(12 + data.len());
    chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
    chunk.extend_from_slice(&ITXT);
    chunk.extend_from_slice(&data);
    chunk.extend_from_slice(&chunk_crc(&ITXT, &data).to_be_bytes());
    Ok(chunk)
}

/// Embed a signed assertion into a PNG template.
///
/// Returns the baked image bytes; the input is never modified. Re-baking
/// an already-baked image replaces the embedded payload.
pub fn bake(png: &[u8], signed: &SignedAssertion) -> BadgeResult<Vec<u8>> {
    bake_jws(png, signed.jws())
}

fn bake_jws(png: &[u8], jws: &str) -> BadgeResult<Vec<u8>> {
    let chunks = parse_chunks(png)?;
    let badge_chunk = encode_badge_chunk(jws)?;

    let mut out = Vec::with_capacity(png.len() + badge_chunk.len());
    out.extend_from_slice(&PNG_SIGNATURE);
    for (index, chunk) in chunks.iter().enumerate() {
        if chunk.is_badge_chunk() {
            // Re-bake: the replacement already sits after IHDR.
            continue;
        }
        out.extend_from_slice(chunk.raw);
        if index == 0 {
            // parse_chunks guarantees chunk 0 is IHDR.
            out.extend_from_slice(&badge_chunk);
        }
    }

    tracing::debug!(
        input_len = png.len(),
        output_len = out.len(),
        "baked assertion into PNG"
    );
    Ok(out)
}

/// Extract the embedded JWS from a baked PNG, if present.
///
/// Validates the whole chunk stream first, so a corrupt image is reported
/// as such rather than as "no badge found".
pub fn extract(png: &[u8]) -> BadgeResult<Option<String>> {
    for chunk in parse_chunks(png)? {
        if !chunk.is_badge_chunk() {
            continue;
        }
        let rest = &chunk.data[BADGE_KEYWORD.len() + 1..];
        if rest.len() < 4 {
            return Err(BadgeError::InvalidImage {
                reason: "openbadges chunk too short for iTXt fields".into(),
            });
        }
        if rest[0] != 0 {
            return Err(BadgeError::InvalidImage {
                reason: "openbadges chunk declares a compressed payload, which is not supported"
                    .into(),
            });
        }
        // Skip compression flag + method, then the two NUL-terminated
        // fields (language tag, translated keyword).
        let mut cursor = 2;
        for field in ["language tag", "translated keyword"] {
            match rest[cursor..].iter().position(|&b| b == 0) {
                Some(nul) => cursor += nul + 1,
                None => {
                    return Err(BadgeError::InvalidImage {
                        reason: format!("openbadges chunk missing {field} terminator"),
                    })
                }
            }
        }
        let text = String::from_utf8(rest[cursor..].to_vec()).map_err(|_| {
            BadgeError::InvalidImage {
                reason: "openbadges chunk payload is not valid UTF-8".into(),
            }
        })?;
        return Ok(Some(text));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Encode an arbitrary chunk with a correct CRC.
    fn make_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut chunk = Vec::new();
        chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
        chunk.extend_from_slice(chunk_type);
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());
        chunk
    }

    /// A structurally valid 1x1 grayscale PNG (the IDAT payload is opaque
    /// to the chunk layer).
    fn tiny_png(idat: &[u8]) -> Vec<u8> {
        let ihdr = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(make_chunk(b"IHDR", &ihdr));
        png.extend(make_chunk(b"IDAT", idat));
        png.extend(make_chunk(b"IEND", &[]));
        png
    }

    #[test]
    fn bake_then_extract_recovers_payload() {
        let png = tiny_png(&[1, 2, 3, 4]);
        let baked = bake_jws(&png, "header.payload.signature").unwrap();
        let extracted = extract(&baked).unwrap();
        assert_eq!(extracted.as_deref(), Some("header.payload.signature"));
    }

    #[test]
    fn extract_on_unbaked_image_is_none() {
        let png = tiny_png(&[1, 2, 3, 4]);
        assert_eq!(extract(&png).unwrap(), None);
    }

    #[test]
    fn other_chunks_pass_through_byte_identical() {
        let png = tiny_png(&[9, 8, 7]);
        let baked = bake_jws(&png, "x.y.z").unwrap();

        // Removing the inserted chunk must reproduce the input exactly.
        let badge_chunk = encode_badge_chunk("x.y.z").unwrap();
        let ihdr_end = PNG_SIGNATURE.len() + 12 + 13;
        let mut stripped = baked[..ihdr_end].to_vec();
        stripped.extend_from_slice(&baked[ihdr_end + badge_chunk.len()..]);
        assert_eq!(stripped, png);
    }

    #[test]
    fn badge_chunk_sits_between_ihdr_and_idat() {
        let png = tiny_png(&[1]);
        let baked = bake_jws(&png, "a.b.c").unwrap();
        let chunks = parse_chunks(&baked).unwrap();
        let types: Vec<String> = chunks.iter().map(|c| c.type_name()).collect();
        assert_eq!(types, vec!["IHDR", "iTXt", "IDAT", "IEND"]);
    }

    #[test]
    fn rebake_replaces_instead_of_duplicating() {
        let png = tiny_png(&[1, 2, 3]);
        let first = bake_jws(&png, "first.payload.sig").unwrap();
        let second = bake_jws(&first, "second.payload.sig").unwrap();

        let badge_chunks = parse_chunks(&second)
            .unwrap()
            .iter()
            .filter(|c| c.is_badge_chunk())
            .count();
        assert_eq!(badge_chunks, 1);
        assert_eq!(
            extract(&second).unwrap().as_deref(),
            Some("second.payload.sig")
        );
    }

    #[test]
    fn foreign_itxt_chunks_are_preserved() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(make_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
        png.extend(make_chunk(b"iTXt", b"Comment\0\0\0\0\0hello"));
        png.extend(make_chunk(b"IDAT", &[5]));
        png.extend(make_chunk(b"IEND", &[]));

        let baked = bake_jws(&png, "a.b.c").unwrap();
        let chunks = parse_chunks(&baked).unwrap();
        let itxt_count = chunks.iter().filter(|c| c.chunk_type == ITXT).count();
        assert_eq!(itxt_count, 2);
        assert_eq!(extract(&baked).unwrap().as_deref(), Some("a.b.c"));
    }

    #[test]
    fn missing_signature_is_rejected() {
        let err = bake_jws(b"GIF89a not a png", "a.b.c").unwrap_err();
        match err {
            BadgeError::InvalidImage { reason } => assert!(reason.contains("signature")),
            other => panic!("expected InvalidImage, got {other}"),
        }
    }

    #[test]
    fn truncated_chunk_is_rejected_with_offset() {
        let mut png = tiny_png(&[1, 2, 3]);
        png.truncate(png.len() - 5);
        let err = bake_jws(&png, "a.b.c").unwrap_err();
        match err {
            BadgeError::InvalidImage { reason } => assert!(reason.contains("truncated")),
            other => panic!("expected InvalidImage, got {other}"),
        }
    }

    #[test]
    fn crc_mismatch_is_rejected_naming_chunk() {
        let mut png = tiny_png(&[1, 2, 3]);
        let idat_data_start = PNG_SIGNATURE.len() + 12 + 13 + 8;
        png[idat_data_start] ^= 0xFF;
        let err = bake_jws(&png, "a.b.c").unwrap_err();
        match err {
            BadgeError::InvalidImage { reason } => {
                assert!(reason.contains("CRC"));
                assert!(reason.contains("IDAT"));
            }
            other => panic!("expected InvalidImage, got {other}"),
        }
    }

    #[test]
    fn stream_not_starting_with_ihdr_is_rejected() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(make_chunk(b"IDAT", &[1]));
        png.extend(make_chunk(b"IEND", &[]));
        let err = bake_jws(&png, "a.b.c").unwrap_err();
        match err {
            BadgeError::InvalidImage { reason } => assert!(reason.contains("IHDR")),
            other => panic!("expected InvalidImage, got {other}"),
        }
    }

    #[test]
    fn stream_without_iend_is_rejected() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(make_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
        png.extend(make_chunk(b"IDAT", &[1]));
        let err = bake_jws(&png, "a.b.c").unwrap_err();
        match err {
            BadgeError::InvalidImage { reason } => assert!(reason.contains("IEND")),
            other => panic!("expected InvalidImage, got {other}"),
        }
    }

    proptest! {
        #[test]
        fn arbitrary_idat_payloads_pass_through(
            idat in proptest::collection::vec(any::<u8>(), 0..512),
            jws in "[A-Za-z0-9_-]{1,64}\\.[A-Za-z0-9_-]{1,64}\\.[A-Za-z0-9_-]{1,64}",
        ) {
            let png = tiny_png(&idat);
            let baked = bake_jws(&png, &jws).unwrap();
            let extracted = extract(&baked).unwrap();
            prop_assert_eq!(extracted.as_deref(), Some(jws.as_str()));

            let chunks = parse_chunks(&baked).unwrap();
            let idat_chunk = chunks.iter().find(|c| c.chunk_type == *b"IDAT").unwrap();
            prop_assert_eq!(idat_chunk.data, idat.as_slice());
        }
    }
}

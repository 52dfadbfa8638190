//! Payload text handling
//!
//! Payloads are kept as hex text until a caller needs the bytes, for ex. to rebuild a file
//! transferred in chunks. The bytes are never interpreted, apart from sniffing the gzip
//! magic number.

use crate::error::LogError;
use crate::record::MatchedPair;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Magic number of gzip streams
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Concatenate byte field fragments into one contiguous hex string
///
/// Fragments are split on commas and whitespace. A `0x`/`0X` prefixed token is one byte and
/// is padded to 2 digits (`0x8` is `08`); other tokens are copied as is, so that garbage is
/// reported by [`decode_hex`] rather than silently dropped.
pub fn normalize_payload<S: AsRef<str>>(fragments: &[S]) -> String {
    let mut out = String::with_capacity(fragments.iter().map(|s| s.as_ref().len()).sum());
    let tokens = fragments
        .iter()
        .flat_map(|f| f.as_ref().split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|t| !t.is_empty());
    for token in tokens {
        match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            Some(digits) if digits.len() == 1 => {
                out.push('0');
                out.push_str(digits);
            }
            Some(digits) => out.push_str(digits),
            None => out.push_str(token),
        }
    }
    out
}

/// Decode contiguous hex text into bytes
pub fn decode_hex(s: &str) -> Result<Vec<u8>, LogError> {
    hex::decode(s).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { index, .. } => LogError::InvalidHex(index),
        // odd length
        _ => LogError::InvalidHex(s.len()),
    })
}

/// Returns true if `data` starts with the gzip magic number
#[inline]
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Rebuild transferred objects from matched pairs
///
/// Pairs are grouped by request resource id, ordered by request sequence number (ties keep
/// their relative order), and their decoded payloads are concatenated. Pairs without a
/// resource id or payload are skipped, and so are payloads that fail to decode.
pub fn reassemble(pairs: &[MatchedPair]) -> BTreeMap<u64, Vec<u8>> {
    let mut sorted: Vec<&MatchedPair> = pairs.iter().collect();
    sorted.sort_by_key(|p| p.request.sequence_number);
    let mut objects: BTreeMap<u64, Vec<u8>> = BTreeMap::new();
    for pair in sorted {
        let (resource_id, payload) = match (pair.request.resource_id, &pair.response.payload) {
            (Some(id), Some(payload)) => (id, payload),
            _ => continue,
        };
        match decode_hex(payload) {
            Ok(bytes) => {
                debug!(
                    "resource {}: {} bytes from {}",
                    resource_id,
                    bytes.len(),
                    pair.response.source_label
                );
                objects.entry(resource_id).or_default().extend_from_slice(&bytes);
            }
            Err(e) => warn!(
                "skipping payload of MsgId {} ({}): {}",
                pair.correlation_id(),
                pair.response.source_label,
                e
            ),
        }
    }
    objects
}

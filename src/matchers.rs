//! Line matchers
//!
//! Each matcher recognizes one kind of structural line of the dump and returns a typed
//! result, or `None` if the line does not match. Matchers never fail: a line that
//! matches nothing is simply ignored by the scanner.
//!
//! Field matchers are anchored at the start of the line (after indentation), so
//! `ReqMsgId: 1` is not a `MsgId` line and `VolumeId: 1` is not an `Id` line.

use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{char, multispace0, space0, space1, u64 as dec_u64};
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

/// Prefix of the line announcing a new processing block
pub const BLOCK_START: &str = "=== Processing: ";
const BLOCK_END: &str = " ===";
const OBJECT_OFFSET: &str = ">>> Found object at offset ";

fn numeric_field<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, u64> {
    preceded(tuple((multispace0, tag(name), char(':'), space1)), dec_u64)
}

/// Matches `=== Processing: <label>.bin ===` anywhere in the line, and returns the label
pub fn block_start(line: &str) -> Option<&str> {
    let r: IResult<&str, &str> = terminated(take_until(BLOCK_START), tag(BLOCK_START))(line);
    let (rest, _) = r.ok()?;
    let end = rest.rfind(BLOCK_END)?;
    let label = &rest[..end];
    if label.len() > ".bin".len() && label.ends_with(".bin") {
        Some(label)
    } else {
        None
    }
}

/// Matches `MsgId: <n>`
pub fn msg_id(line: &str) -> Option<u64> {
    numeric_field("MsgId")(line).ok().map(|(_, v)| v)
}

/// Matches `ReqMsgId: <n>`
pub fn req_msg_id(line: &str) -> Option<u64> {
    numeric_field("ReqMsgId")(line).ok().map(|(_, v)| v)
}

/// Matches `Id: <n>`
pub fn resource_id(line: &str) -> Option<u64> {
    numeric_field("Id")(line).ok().map(|(_, v)| v)
}

/// Matches `>>> Found object at offset <n>` anywhere in the line
pub fn object_offset(line: &str) -> Option<u64> {
    let r: IResult<&str, u64> = preceded(
        terminated(take_until(OBJECT_OFFSET), tag(OBJECT_OFFSET)),
        dec_u64,
    )(line);
    r.ok().map(|(_, v)| v)
}

/// Opening line of a multi-line byte field
#[derive(Debug, PartialEq, Eq)]
pub struct BytesOpen<'a> {
    /// Content found after the opening brace, up to the closing brace if any
    pub inline: &'a str,
    /// True if the opening line also closes the field
    pub closed: bool,
}

/// Matches `Bytes: {...`
pub fn bytes_open(line: &str) -> Option<BytesOpen> {
    let r: IResult<&str, _> = tuple((multispace0, tag("Bytes:"), space1, char('{'), space0))(line);
    let (rest, _) = r.ok()?;
    let (inline, closed) = match rest.find('}') {
        Some(pos) => (&rest[..pos], true),
        None => (rest, false),
    };
    Some(BytesOpen {
        inline: inline.trim(),
        closed,
    })
}

/// Matches a line holding only `}`, which closes a top-level structure
#[inline]
pub fn is_closing_brace(line: &str) -> bool {
    line.trim() == "}"
}

/// Matches a line holding only the byte field terminator
#[inline]
pub fn is_payload_close(line: &str) -> bool {
    matches!(line.trim(), "}," | "}")
}

/// Extract the sequence number from a source label
///
/// The number is taken from the first `/<digits><tag>` occurrence, where `<tag>` is one of
/// `tags` (for ex. `_sent_data.bin`). Returns `None` if there is no such occurrence.
pub fn sequence_number(label: &str, tags: &[&str]) -> Option<u64> {
    label.match_indices('/').find_map(|(pos, _)| {
        let r: IResult<&str, u64> = dec_u64(&label[pos + 1..]);
        match r {
            Ok((rest, n)) if tags.iter().any(|t| !t.is_empty() && rest.starts_with(t)) => Some(n),
            _ => None,
        }
    })
}

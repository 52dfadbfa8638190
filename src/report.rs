//! Statistics and listings of a correlation
//!
//! These functions only shape and print data. The persisted pair report and the mapping file
//! are written by the [`serialize`](crate::serialize) module.

use crate::correlate::Correlation;
use crate::record::{MatchedPair, OptionalId, Request, Response};
use std::fmt;
use std::io::{self, Write};

/// Default number of hex characters shown for a payload in listings
pub const DEFAULT_PREVIEW: usize = 200;

/// Counts describing a correlation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_requests: usize,
    pub total_responses: usize,
    pub matched: usize,
    pub unmatched_requests: usize,
    pub unmatched_responses: usize,
    /// Requests skipped because their id was already taken (also counted as unmatched)
    pub duplicate_requests: usize,
    /// Responses hidden by an earlier response with the same id (not counted as unmatched)
    pub shadowed_responses: usize,
}

impl Summary {
    pub fn new(requests: &[Request], responses: &[Response], c: &Correlation) -> Summary {
        Summary {
            total_requests: requests.len(),
            total_responses: responses.len(),
            matched: c.pairs.len(),
            unmatched_requests: c.unmatched_requests.len(),
            unmatched_responses: c.unmatched_responses.len(),
            duplicate_requests: c.duplicate_requests,
            shadowed_responses: c.shadowed_responses.len(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "STATISTICS")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total requests:                  {}", self.total_requests)?;
        writeln!(f, "Total responses:                 {}", self.total_responses)?;
        writeln!(f, "Matched pairs:                   {}", self.matched)?;
        writeln!(f, "Unmatched requests:              {}", self.unmatched_requests)?;
        writeln!(f, "Unmatched responses:             {}", self.unmatched_responses)?;
        writeln!(f, "Duplicate requests:              {}", self.duplicate_requests)?;
        writeln!(f, "Shadowed responses:              {}", self.shadowed_responses)?;
        writeln!(f, "{}", rule)
    }
}

/// Sort pairs by request sequence number
///
/// The sort is stable: pairs with the same sequence number keep their relative order, and
/// pairs without sequence number come first.
pub fn sort_by_sequence(pairs: &mut [MatchedPair]) {
    pairs.sort_by_key(|p| p.request.sequence_number);
}

/// Truncate hex text to at most `max` characters
pub fn preview(payload: Option<&str>, max: usize) -> &str {
    match payload {
        // hex text is ASCII, but do not split a character of garbage input
        Some(p) => match p.char_indices().nth(max) {
            Some((end, _)) => &p[..end],
            None => p,
        },
        None => "None",
    }
}

/// Print matched pairs, with payloads truncated to `max_payload` characters
pub fn write_matched_pairs<W: Write>(
    w: &mut W,
    pairs: &[MatchedPair],
    max_payload: usize,
) -> io::Result<()> {
    let rule = "=".repeat(80);
    writeln!(w, "\n{}", rule)?;
    writeln!(w, "MATCHED PAIRS")?;
    writeln!(w, "{}", rule)?;
    for (i, pair) in pairs.iter().enumerate() {
        writeln!(w, "\nPair {}:", i + 1)?;
        writeln!(w, "  MsgId:       {}", pair.correlation_id())?;
        writeln!(w, "  Resource Id: {}", OptionalId(pair.request.resource_id))?;
        writeln!(w, "  Request:     {}", pair.request.source_label)?;
        writeln!(w, "  Response:    {}", pair.response.source_label)?;
        writeln!(
            w,
            "  Bytes:       {}...",
            preview(pair.response.payload.as_deref(), max_payload)
        )?;
    }
    writeln!(w, "\n{}\n", rule)
}

/// Print unmatched and shadowed records
pub fn write_unmatched<W: Write>(w: &mut W, c: &Correlation) -> io::Result<()> {
    let rule = "=".repeat(60);
    if !c.unmatched_requests.is_empty() {
        writeln!(w, "\n{}", rule)?;
        writeln!(w, "UNMATCHED REQUESTS ({})", c.unmatched_requests.len())?;
        writeln!(w, "{}", rule)?;
        for r in &c.unmatched_requests {
            writeln!(
                w,
                "  MsgId: {} (Id: {}) - {}",
                r.correlation_id,
                OptionalId(r.resource_id),
                r.source_label
            )?;
        }
        writeln!(w)?;
    }
    for (title, list) in [
        ("UNMATCHED RESPONSES", &c.unmatched_responses),
        ("SHADOWED RESPONSES", &c.shadowed_responses),
    ] {
        if list.is_empty() {
            continue;
        }
        writeln!(w, "\n{}", rule)?;
        writeln!(w, "{} ({})", title, list.len())?;
        writeln!(w, "{}", rule)?;
        for r in list.iter() {
            writeln!(w, "  ReqMsgId: {} - {}", r.in_reply_to, r.source_label)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::correlate;

    fn request(id: u64, seq: Option<u64>) -> Request {
        Request {
            source_label: format!("req{}", id),
            correlation_id: id,
            sequence_number: seq,
            resource_id: Some(1),
        }
    }

    fn response(id: u64) -> Response {
        Response {
            source_label: format!("res{}", id),
            in_reply_to: id,
            sequence_number: None,
            payload: Some("00112233".to_owned()),
            offset: None,
        }
    }

    #[test]
    fn test_summary_partition() {
        let reqs = [request(1, None), request(1, None), request(2, None)];
        let resps = [response(1), response(1), response(3)];
        let c = correlate(&reqs, &resps);
        let s = Summary::new(&reqs, &resps, &c);
        assert_eq!(s.matched + s.unmatched_requests, s.total_requests);
        assert_eq!(
            s.matched + s.unmatched_responses + s.shadowed_responses,
            s.total_responses
        );
        assert_eq!(s.duplicate_requests, 1);
        assert!(s.to_string().contains("Matched pairs:                   1"));
    }

    #[test]
    fn test_sort_by_sequence() {
        let reqs = [request(1, Some(9)), request(2, None), request(3, Some(4)), request(4, Some(4))];
        let resps = [response(1), response(2), response(3), response(4)];
        let c = correlate(&reqs, &resps);
        let mut pairs = c.pairs.clone();
        sort_by_sequence(&mut pairs);
        let ids: Vec<u64> = pairs.iter().map(|p| p.correlation_id()).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview(Some("deadbeef"), 4), "dead");
        assert_eq!(preview(Some("dead"), 200), "dead");
        assert_eq!(preview(None, 4), "None");
    }

    #[test]
    fn test_write_listings() {
        let reqs = [request(1, None), request(5, None)];
        let resps = [response(1), response(6)];
        let c = correlate(&reqs, &resps);
        let mut out = Vec::new();
        write_matched_pairs(&mut out, &c.pairs, 4).unwrap();
        write_unmatched(&mut out, &c).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  Bytes:       0011...\n"));
        assert!(text.contains("UNMATCHED REQUESTS (1)"));
        assert!(text.contains("  MsgId: 5 (Id: 1) - req5"));
        assert!(text.contains("  ReqMsgId: 6 - res6"));
        assert!(!text.contains("SHADOWED"));
    }
}

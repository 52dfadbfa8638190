//! Persisted reports
//!
//! The pair report lists every matched pair with its untruncated payload, so that
//! transferred objects can be rebuilt later by concatenating payloads in sequence order.
//! The mapping file is a CSV view of the same pairs.

use crate::record::{MatchedPair, OptionalId};
use cookie_factory::combinator::string;
use cookie_factory::multi::many_ref;
use cookie_factory::sequence::tuple;
use cookie_factory::{gen, GenError, SerializeFn};
use std::io::Write;

/// Header line of the mapping file
pub const MAPPINGS_HEADER: &str =
    "# Resource mappings (resource_id, msg_id, request_file, req_msg_id, response_file, offset)\n";

/// Serialize one record of the pair report. `index` starts at 1.
pub fn pair_record<W: Write>(index: usize, pair: MatchedPair) -> impl SerializeFn<W> {
    tuple((
        string(format!("Pair {}:\n", index)),
        string(format!("  MsgId:       {}\n", pair.correlation_id())),
        string(format!(
            "  Document Id: {}\n",
            OptionalId(pair.request.resource_id)
        )),
        string(format!("  Request:     {}\n", pair.request.source_label)),
        string(format!("  Response:    {}\n", pair.response.source_label)),
        string(format!(
            "  Bytes:       {}\n\n",
            pair.response.payload.as_deref().unwrap_or("None")
        )),
    ))
}

/// Serialize one line of the mapping file
///
/// A missing resource id is written as an empty field, a missing offset as `0`.
pub fn mapping_line<W: Write>(pair: MatchedPair) -> impl SerializeFn<W> {
    let resource_id = pair
        .request
        .resource_id
        .map(|id| id.to_string())
        .unwrap_or_default();
    string(format!(
        "{},{},{},{},{},{}\n",
        resource_id,
        pair.request.correlation_id,
        pair.request.source_label,
        pair.response.in_reply_to,
        pair.response.source_label,
        pair.response.offset.unwrap_or(0)
    ))
}

/// Write the pair report, in the order of `pairs`. Returns the number of bytes written.
pub fn write_pair_report<W: Write>(w: W, pairs: &[MatchedPair]) -> Result<u64, GenError> {
    gen(
        tuple((
            string(format!("Total matched pairs: {}\n", pairs.len())),
            string(format!("{}\n\n", "=".repeat(80))),
            many_ref(pairs.iter().enumerate(), |(i, pair)| {
                pair_record(i + 1, *pair)
            }),
        )),
        w,
    )
    .map(|res| res.1)
}

/// Write the mapping file, in the order of `pairs`. Returns the number of bytes written.
pub fn write_mappings<W: Write>(w: W, pairs: &[MatchedPair]) -> Result<u64, GenError> {
    gen(
        tuple((
            string(MAPPINGS_HEADER),
            many_ref(pairs.iter(), |pair| mapping_line(*pair)),
        )),
        w,
    )
    .map(|res| res.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Request, Response};

    fn records() -> (Request, Response) {
        let request = Request {
            source_label: "/cap/215_sent_data.bin".to_owned(),
            correlation_id: 1001,
            sequence_number: Some(215),
            resource_id: Some(55),
        };
        let response = Response {
            source_label: "/cap/216_received_data.bin".to_owned(),
            in_reply_to: 1001,
            sequence_number: Some(216),
            payload: Some("deadbeef".to_owned()),
            offset: Some(24),
        };
        (request, response)
    }

    #[test]
    fn test_pair_report() {
        let (request, response) = records();
        let pairs = [MatchedPair {
            request: &request,
            response: &response,
        }];
        let mut v = Vec::new();
        let len = write_pair_report(&mut v, &pairs).expect("serialization failed");
        assert_eq!(len as usize, v.len());
        let expected = format!(
            "Total matched pairs: 1\n{}\n\n\
             Pair 1:\n  MsgId:       1001\n  Document Id: 55\n\
             \x20 Request:     /cap/215_sent_data.bin\n\
             \x20 Response:    /cap/216_received_data.bin\n\
             \x20 Bytes:       deadbeef\n\n",
            "=".repeat(80)
        );
        assert_eq!(String::from_utf8(v).unwrap(), expected);
    }

    #[test]
    fn test_empty_pair_report() {
        let mut v = Vec::new();
        write_pair_report(&mut v, &[]).expect("serialization failed");
        assert!(String::from_utf8(v)
            .unwrap()
            .starts_with("Total matched pairs: 0\n"));
    }

    #[test]
    fn test_mappings() {
        let (mut request, response) = records();
        let mut v = Vec::new();
        {
            let pairs = [MatchedPair {
                request: &request,
                response: &response,
            }];
            write_mappings(&mut v, &pairs).expect("serialization failed");
        }
        let text = String::from_utf8(v).unwrap();
        assert_eq!(
            text,
            format!(
                "{}55,1001,/cap/215_sent_data.bin,1001,/cap/216_received_data.bin,24\n",
                MAPPINGS_HEADER
            )
        );

        request.resource_id = None;
        let mut v = Vec::new();
        gen(
            mapping_line(MatchedPair {
                request: &request,
                response: &response,
            }),
            &mut v,
        )
        .expect("serialization failed");
        assert!(v.starts_with(b",1001,"));
    }
}

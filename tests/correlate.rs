use rpc_log_parser::{correlate, scan_str, Request, Response, ScannerConfig};

fn request_block(seq: u64, msg_id: u64, resource_id: u64) -> String {
    format!(
        "=== Processing: /cap/{}_sent_data.bin ===
   MsgId: {}
   Result: &mtproto.TLUploadGetFile{{
        Location: &mtproto.InputFileLocation{{
            Id: {},
        }},
}}
",
        seq, msg_id, resource_id
    )
}

fn response_block(seq: u64, reply_to: u64, bytes: &str) -> String {
    format!(
        "=== Processing: /cap/{}_received_data.bin ===
   Result: &mtproto.TLRpcResult{{
        ReqMsgId: {},
        Result: &mtproto.TLUploadFile{{
            Bytes: {{{}}},
        }},
}}
",
        seq, reply_to, bytes
    )
}

#[test]
fn test_single_exchange() {
    let log = request_block(1, 1001, 55) + &response_block(2, 1001, "de ad be ef");
    let output = scan_str(&log, &ScannerConfig::default());
    assert_eq!(output.requests.len(), 1);
    assert_eq!(output.requests[0].correlation_id, 1001);
    assert_eq!(output.requests[0].resource_id, Some(55));
    assert_eq!(output.responses.len(), 1);
    assert_eq!(output.responses[0].in_reply_to, 1001);
    assert_eq!(output.responses[0].payload.as_deref(), Some("deadbeef"));

    let c = correlate(&output.requests, &output.responses);
    assert_eq!(c.pairs.len(), 1);
    assert!(std::ptr::eq(c.pairs[0].request, &output.requests[0]));
    assert!(std::ptr::eq(c.pairs[0].response, &output.responses[0]));
    assert!(c.is_complete());
}

#[test]
fn test_duplicate_request_ids() {
    let log = request_block(1, 42, 7) + &request_block(2, 42, 8) + &response_block(3, 42, "00");
    let output = scan_str(&log, &ScannerConfig::default());
    assert_eq!(output.requests.len(), 2);

    let c = correlate(&output.requests, &output.responses);
    assert_eq!(c.pairs.len(), 1);
    assert_eq!(c.pairs[0].request.resource_id, Some(7));
    assert_eq!(c.unmatched_requests.len(), 1);
    assert_eq!(c.unmatched_requests[0].resource_id, Some(8));
    assert_eq!(c.duplicate_requests, 1);
    assert!(c.unmatched_responses.is_empty());
}

#[test]
fn test_truncated_request() {
    let log = "\
=== Processing: /cap/1_sent_data.bin ===
   MsgId: 1001
   Result: &mtproto.TLUploadGetFile{
        Location: &mtproto.InputFileLocation{
";
    let output = scan_str(log, &ScannerConfig::default());
    assert!(output.requests.is_empty());
    assert_eq!(output.stats.truncated, 1);
    let c = correlate(&output.requests, &output.responses);
    assert!(c.pairs.is_empty());
    assert!(c.is_complete());
}

fn request(id: u64, seq: u64) -> Request {
    Request {
        source_label: format!("/cap/{}_sent_data.bin", seq),
        correlation_id: id,
        sequence_number: Some(seq),
        resource_id: Some(id % 3),
    }
}

fn response(id: u64, seq: u64) -> Response {
    Response {
        source_label: format!("/cap/{}_received_data.bin", seq),
        in_reply_to: id,
        sequence_number: Some(seq),
        payload: Some(format!("{:04x}", seq)),
        offset: None,
    }
}

#[test]
fn test_correlation_properties() {
    // ids repeat on both sides, some have no counterpart
    let req_ids = [5, 1, 5, 9, 2, 1, 7, 5];
    let resp_ids = [1, 3, 5, 1, 2, 2, 8, 5, 6];
    let requests: Vec<Request> = req_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| request(id, 2 * i as u64))
        .collect();
    let responses: Vec<Response> = resp_ids
        .iter()
        .enumerate()
        .map(|(i, &id)| response(id, 2 * i as u64 + 1))
        .collect();

    let c = correlate(&requests, &responses);

    // at most one pair per id, and pairs join equal ids
    let mut pair_ids: Vec<u64> = c.pairs.iter().map(|p| p.correlation_id()).collect();
    assert!(c
        .pairs
        .iter()
        .all(|p| p.request.correlation_id == p.response.in_reply_to));
    pair_ids.sort_unstable();
    pair_ids.dedup();
    assert_eq!(pair_ids, [1, 2, 5]);
    assert_eq!(c.pairs.len(), 3);

    // first request and first response of each id win
    for pair in &c.pairs {
        let id = pair.correlation_id();
        let first_req = requests.iter().find(|r| r.correlation_id == id).unwrap();
        let first_resp = responses.iter().find(|r| r.in_reply_to == id).unwrap();
        assert!(std::ptr::eq(pair.request, first_req));
        assert!(std::ptr::eq(pair.response, first_resp));
    }

    assert_eq!(c.pairs.len() + c.unmatched_requests.len(), requests.len());
    assert_eq!(
        c.pairs.len() + c.unmatched_responses.len() + c.shadowed_responses.len(),
        responses.len()
    );
    assert_eq!(c.duplicate_requests, 3);
    let unmatched_resp: Vec<u64> = c.unmatched_responses.iter().map(|r| r.in_reply_to).collect();
    assert_eq!(unmatched_resp, [3, 8, 6]);
    let shadowed: Vec<u64> = c.shadowed_responses.iter().map(|r| r.in_reply_to).collect();
    assert_eq!(shadowed, [1, 2, 5]);

    // inputs are untouched, and a second run gives the same result
    let again = correlate(&requests, &responses);
    assert_eq!(again.pairs, c.pairs);
    assert_eq!(again.unmatched_requests, c.unmatched_requests);
    assert_eq!(again.unmatched_responses, c.unmatched_responses);
}

#[test]
fn test_empty_inputs() {
    let c = correlate(&[], &[]);
    assert!(c.pairs.is_empty());
    assert!(c.is_complete());

    let requests = [request(1, 0)];
    let c = correlate(&requests, &[]);
    assert_eq!(c.unmatched_requests.len(), 1);
    let responses = [response(1, 1)];
    let c = correlate(&[], &responses);
    assert_eq!(c.unmatched_responses.len(), 1);
}

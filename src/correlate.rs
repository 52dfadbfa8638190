//! Request/response correlation
//!
//! Requests and responses are matched on `Request::correlation_id == Response::in_reply_to`.
//! Ids can legitimately be reused over a long capture, so collisions are resolved rather
//! than rejected: the first response seen for an id is the only candidate for that id, and
//! the first request seen for an id takes it. Later records sharing the id are reported as
//! unmatched (requests) or shadowed (responses).

use crate::record::{MatchedPair, Request, Response};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::ptr;

/// Result of correlating the output of a scan
///
/// All fields borrow the records they refer to. Each list keeps the input order.
#[derive(Clone, Debug, Default)]
pub struct Correlation<'a> {
    /// Matched pairs, in request order. No two pairs share a correlation id.
    pub pairs: Vec<MatchedPair<'a>>,
    /// Requests not part of any pair, including requests whose id was taken by an earlier
    /// request
    pub unmatched_requests: Vec<&'a Request>,
    /// Responses whose id was not taken by any pair
    pub unmatched_responses: Vec<&'a Response>,
    /// Responses whose id was taken by a pair holding an earlier response with the same id
    pub shadowed_responses: Vec<&'a Response>,
    /// Number of requests skipped because their id was already taken
    pub duplicate_requests: usize,
}

impl<'a> Correlation<'a> {
    /// Returns true if every request and every response is part of a pair
    pub fn is_complete(&self) -> bool {
        self.unmatched_requests.is_empty()
            && self.unmatched_responses.is_empty()
            && self.shadowed_responses.is_empty()
    }
}

/// Pair requests with responses
///
/// `requests` and `responses` are not modified, and the result does not depend on anything
/// but their content and order.
pub fn correlate<'a>(requests: &'a [Request], responses: &'a [Response]) -> Correlation<'a> {
    let mut by_reply: BTreeMap<u64, &'a Response> = BTreeMap::new();
    for response in responses {
        let first = *by_reply.entry(response.in_reply_to).or_insert(response);
        if !ptr::eq(first, response) {
            warn!(
                "response {} shadowed by {} (ReqMsgId: {})",
                response.source_label, first.source_label, response.in_reply_to
            );
        }
    }

    let mut consumed = BTreeSet::new();
    let mut result = Correlation::default();
    for request in requests {
        let id = request.correlation_id;
        if consumed.contains(&id) {
            warn!(
                "duplicate request MsgId {} in {}",
                id, request.source_label
            );
            result.duplicate_requests += 1;
            result.unmatched_requests.push(request);
            continue;
        }
        match by_reply.get(&id) {
            Some(&response) => {
                debug!(
                    "matched MsgId {}: {} -> {}",
                    id, request.source_label, response.source_label
                );
                consumed.insert(id);
                result.pairs.push(MatchedPair { request, response });
            }
            None => result.unmatched_requests.push(request),
        }
    }

    for response in responses {
        let id = response.in_reply_to;
        if !consumed.contains(&id) {
            result.unmatched_responses.push(response);
        } else if !ptr::eq(by_reply[&id], response) {
            result.shadowed_responses.push(response);
        }
    }
    result
}

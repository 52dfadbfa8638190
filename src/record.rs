use std::fmt;

/// An outbound request recovered from a closed request block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Label of the capture unit the request was dumped from
    pub source_label: String,
    /// Protocol message id of the request
    pub correlation_id: u64,
    /// Number extracted from the label, for presentation order only
    pub sequence_number: Option<u64>,
    /// Id of the requested object, found in the nested location structure
    pub resource_id: Option<u64>,
}

/// An inbound response recovered from a closed result envelope
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    /// Label of the capture unit the response was dumped from
    pub source_label: String,
    /// Message id of the request this response claims to answer
    pub in_reply_to: u64,
    /// Number extracted from the label, for presentation order only
    pub sequence_number: Option<u64>,
    /// Contiguous hex text of the byte field
    pub payload: Option<String>,
    /// Offset of the decoded object in the capture unit, when the dumper had to scan for it
    pub offset: Option<u64>,
}

impl Response {
    /// Length of the payload, in hex characters
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, |p| p.len())
    }
}

/// A request and the response answering it
///
/// Both records are borrowed: a pair is a view over the scan output, and the records stay
/// addressable on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchedPair<'a> {
    pub request: &'a Request,
    pub response: &'a Response,
}

impl<'a> MatchedPair<'a> {
    /// The id shared by both sides of the pair
    #[inline]
    pub fn correlation_id(&self) -> u64 {
        self.request.correlation_id
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Request: {} (MsgId: {}, Id: {})",
            self.source_label,
            self.correlation_id,
            OptionalId(self.resource_id)
        )
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Response: {} (ReqMsgId: {}, Bytes: {} chars)",
            self.source_label,
            self.in_reply_to,
            self.payload_len()
        )
    }
}

/// Display helper printing `None` for a missing id
#[derive(Clone, Copy, Debug)]
pub struct OptionalId(pub Option<u64>);

impl fmt::Display for OptionalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => f.write_str("None"),
        }
    }
}

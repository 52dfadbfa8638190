//! Log scanner
//!
//! The scanner turns a dump into [`Request`] and [`Response`] records in one pass. The dump
//! is a sequence of processing blocks, each starting with a line like
//! `=== Processing: /captures/215_sent_data.bin ===`, followed by the pretty-printed
//! objects decoded from that capture unit.
//!
//! A record is emitted only when its structure closes. Structures cut by the start of a new
//! block or by the end of input are dropped without error.
//!
//! There are 3 main ways of scanning:
//!
//! - [`scan_file`] opens and scans a file, and is the only fallible entry point
//! - [`scan_str`] scans a log already loaded into memory
//! - [`Scanner::feed_line`] / [`Scanner::scan_reader`] give control over the input, for ex.
//!   to scan several sources into the same output

use crate::config::ScannerConfig;
use crate::error::LogError;
use crate::matchers;
use crate::payload::normalize_payload;
use crate::reader::{LineReader, DEFAULT_CAPACITY};
use crate::record::{Request, Response};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;

/// Counters describing a scan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of lines read
    pub lines: usize,
    /// Number of block-start markers seen
    pub blocks: usize,
    /// Request blocks closed without a resource id
    pub dropped_requests: usize,
    /// Request or response structures left open by a new block or by end of input
    pub truncated: usize,
}

impl ScanStats {
    fn add(&mut self, other: &ScanStats) {
        self.lines += other.lines;
        self.blocks += other.blocks;
        self.dropped_requests += other.dropped_requests;
        self.truncated += other.truncated;
    }
}

/// Records recovered from one or more logs, in input order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub requests: Vec<Request>,
    pub responses: Vec<Response>,
    pub stats: ScanStats,
}

impl ScanOutput {
    /// Append the records of another scan, for ex. of the next log file
    pub fn extend(&mut self, other: ScanOutput) {
        self.requests.extend(other.requests);
        self.responses.extend(other.responses);
        self.stats.add(&other.stats);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RequestState {
    Closed,
    Open,
    InLocation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ResponseState {
    Closed,
    Envelope,
    Body,
    Payload(Vec<String>),
}

/// Parse state of the current processing block
#[derive(Clone, Debug)]
struct BlockState {
    label: Option<String>,
    msg_id: Option<u64>,
    reply_to: Option<u64>,
    request: RequestState,
    resource_id: Option<u64>,
    response: ResponseState,
    offset: Option<u64>,
}

impl BlockState {
    fn new(label: Option<String>) -> BlockState {
        BlockState {
            label,
            msg_id: None,
            reply_to: None,
            request: RequestState::Closed,
            resource_id: None,
            response: ResponseState::Closed,
            offset: None,
        }
    }

    fn is_idle(&self) -> bool {
        self.request == RequestState::Closed && self.response == ResponseState::Closed
    }
}

/// Single-pass scanner over the lines of a dump
///
/// ```rust
/// use rpc_log_parser::{Scanner, ScannerConfig};
///
/// let log = "\
/// === Processing: /cap/1_sent_data.bin ===
///    MsgId: 1001
///    Result: &mtproto.TLUploadGetFile{
///         Location: &mtproto.InputFileLocation{
///             Id: 55,
///         },
/// }
/// ";
/// let mut scanner = Scanner::new(ScannerConfig::default());
/// for line in log.lines() {
///     scanner.feed_line(line);
/// }
/// let output = scanner.finish();
/// assert_eq!(output.requests.len(), 1);
/// assert_eq!(output.requests[0].correlation_id, 1001);
/// assert_eq!(output.requests[0].resource_id, Some(55));
/// ```
pub struct Scanner {
    config: ScannerConfig,
    state: BlockState,
    output: ScanOutput,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner::new(ScannerConfig::default())
    }
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Scanner {
        Scanner {
            config,
            state: BlockState::new(None),
            output: ScanOutput::default(),
        }
    }

    /// Counters of the scan so far
    pub fn stats(&self) -> &ScanStats {
        &self.output.stats
    }

    /// Process one line (without terminator)
    ///
    /// A line triggers at most one transition. Lines matching no transition are ignored.
    pub fn feed_line(&mut self, line: &str) {
        self.output.stats.lines += 1;

        if let Some(label) = matchers::block_start(line) {
            self.start_block(label);
            return;
        }

        // byte field content is opaque until the field closes
        if let ResponseState::Payload(fragments) = &mut self.state.response {
            if !matchers::is_payload_close(line) {
                let fragment = line.trim();
                if !fragment.is_empty() {
                    fragments.push(fragment.to_owned());
                }
                return;
            }
            if let ResponseState::Payload(fragments) =
                mem::replace(&mut self.state.response, ResponseState::Closed)
            {
                self.emit_response(&fragments);
            }
            return;
        }

        if let Some(id) = matchers::msg_id(line) {
            if self.state.is_idle() {
                self.state.msg_id = Some(id);
            }
            return;
        }

        if self.state.label.is_some()
            && self.state.msg_id.is_some()
            && line.contains(self.config.request_type.as_str())
        {
            if self.is_outbound() {
                self.state.request = RequestState::Open;
                self.state.resource_id = None;
            }
            return;
        }

        if self.state.request != RequestState::Closed
            && line.contains(self.config.location_type.as_str())
        {
            self.state.request = RequestState::InLocation;
            return;
        }

        if self.state.request == RequestState::InLocation {
            if let Some(id) = matchers::resource_id(line) {
                self.state.resource_id = Some(id);
                return;
            }
        }

        if matchers::is_closing_brace(line) {
            if self.state.request != RequestState::Closed {
                self.finish_request();
                return;
            }
            // envelope without byte field, for ex. a `TLBoolTrue` result
            if matches!(
                self.state.response,
                ResponseState::Envelope | ResponseState::Body
            ) {
                debug!(
                    "closing result envelope without payload in {}",
                    self.state.label.as_deref().unwrap_or("<no block>")
                );
                self.state.response = ResponseState::Closed;
                return;
            }
        }

        if let Some(offset) = matchers::object_offset(line) {
            if self.is_inbound() {
                self.state.offset = Some(offset);
                return;
            }
        }

        if line.contains(self.config.envelope_type.as_str()) {
            self.state.response = ResponseState::Envelope;
            return;
        }

        let in_envelope = matches!(
            self.state.response,
            ResponseState::Envelope | ResponseState::Body
        );

        if in_envelope {
            if let Some(id) = matchers::req_msg_id(line) {
                self.state.reply_to = Some(id);
                return;
            }
        }

        if self.state.response == ResponseState::Envelope
            && self.state.label.is_some()
            && line.contains(self.config.response_type.as_str())
        {
            if self.is_inbound() && self.state.reply_to.is_some() {
                self.state.response = ResponseState::Body;
            }
            return;
        }

        if self.state.response == ResponseState::Body {
            if let Some(open) = matchers::bytes_open(line) {
                let mut fragments = Vec::new();
                if !open.inline.is_empty() {
                    fragments.push(open.inline.to_owned());
                }
                if open.closed {
                    self.state.response = ResponseState::Closed;
                    self.emit_response(&fragments);
                } else {
                    self.state.response = ResponseState::Payload(fragments);
                }
            }
        }
    }

    /// Scan all lines of `reader`
    ///
    /// Only read errors are reported. The buffer grows as needed to hold long lines.
    pub fn scan_reader<R: Read>(&mut self, reader: R) -> Result<(), LogError> {
        let mut reader = LineReader::new(DEFAULT_CAPACITY, reader);
        loop {
            match reader.next() {
                Ok((offset, line)) => {
                    self.feed_line(&line);
                    reader.consume(offset);
                }
                Err(LogError::Eof) => break,
                Err(LogError::Incomplete(_)) => reader.refill()?,
                Err(LogError::BufferTooSmall) => {
                    let new_size = reader.capacity() * 2;
                    if !reader.grow(new_size) {
                        return Err(LogError::BufferTooSmall);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// End the scan and return the records
    ///
    /// Structures still open are dropped.
    pub fn finish(mut self) -> ScanOutput {
        self.close_block();
        self.output
    }

    fn start_block(&mut self, label: &str) {
        self.close_block();
        self.output.stats.blocks += 1;
        self.state = BlockState::new(Some(label.to_owned()));
    }

    fn close_block(&mut self) {
        if !self.state.is_idle() {
            debug!(
                "dropping unterminated structure in {}",
                self.state.label.as_deref().unwrap_or("<no block>")
            );
            self.output.stats.truncated += 1;
        }
    }

    fn is_outbound(&self) -> bool {
        self.state
            .label
            .as_deref()
            .map_or(false, |label| self.config.is_outbound(label))
    }

    fn is_inbound(&self) -> bool {
        self.state
            .label
            .as_deref()
            .map_or(false, |label| self.config.is_inbound(label))
    }

    fn sequence_number(&self, label: &str) -> Option<u64> {
        matchers::sequence_number(
            label,
            &[
                self.config.outbound_tag.as_str(),
                self.config.inbound_tag.as_str(),
            ],
        )
    }

    fn finish_request(&mut self) {
        self.state.request = RequestState::Closed;
        let resource_id = self.state.resource_id.take();
        match (&self.state.label, self.state.msg_id, resource_id) {
            (Some(label), Some(correlation_id), Some(resource_id)) => {
                let request = Request {
                    source_label: label.clone(),
                    correlation_id,
                    sequence_number: self.sequence_number(label),
                    resource_id: Some(resource_id),
                };
                debug!("{}", request);
                self.output.requests.push(request);
            }
            (label, msg_id, _) => {
                debug!(
                    "dropping request without resource id in {} (MsgId: {:?})",
                    label.as_deref().unwrap_or("<no block>"),
                    msg_id
                );
                self.output.stats.dropped_requests += 1;
            }
        }
    }

    fn emit_response(&mut self, fragments: &[String]) {
        let offset = self.state.offset.take();
        if let (Some(label), Some(in_reply_to)) = (&self.state.label, self.state.reply_to) {
            let response = Response {
                source_label: label.clone(),
                in_reply_to,
                sequence_number: self.sequence_number(label),
                payload: Some(normalize_payload(fragments)),
                offset,
            };
            debug!("{}", response);
            self.output.responses.push(response);
        }
    }
}

/// Scan a log already loaded into memory
pub fn scan_str(input: &str, config: &ScannerConfig) -> ScanOutput {
    let mut scanner = Scanner::new(config.clone());
    for line in input.lines() {
        scanner.feed_line(line);
    }
    scanner.finish()
}

/// Open and scan a log file
///
/// Failing to open the file is the only error condition: once scanning has started, damaged
/// content only results in fewer records.
pub fn scan_file<P: AsRef<Path>>(path: P, config: &ScannerConfig) -> Result<ScanOutput, LogError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut scanner = Scanner::new(config.clone());
    scanner.scan_reader(file)?;
    let output = scanner.finish();
    info!(
        "{}: {} lines, {} requests, {} responses",
        path.display(),
        output.stats.lines,
        output.requests.len(),
        output.responses.len()
    );
    Ok(output)
}

//! # RPC traffic log parser
//!
//! This crate recovers request/response pairs from textual dumps of captured RPC traffic,
//! and the payload bytes carried by each exchange.
//!
//! A dump is a sequence of processing blocks, one per capture unit (for ex.
//! `215_sent_data.bin`), each followed by the pretty-printed objects decoded from it. The
//! [`Scanner`] turns the dump into [`Request`] and [`Response`] records in a single pass,
//! dropping structures truncated by the capture. [`correlate`] then pairs requests with
//! responses on their message ids, resolving duplicate ids deterministically
//! (first seen wins).
//!
//! The defaults of [`ScannerConfig`] recognize MTProto `upload.getFile` requests and their
//! `upload.file` results, but the marker vocabulary can be changed.
//!
//! # Example
//!
//! ```rust
//! use rpc_log_parser::*;
//!
//! let log = "\
//! === Processing: /cap/215_sent_data.bin ===
//!    MsgId: 1001
//!    Result: &mtproto.TLUploadGetFile{
//!         Location: &mtproto.InputFileLocation{
//!             Id: 55,
//!         },
//! }
//! === Processing: /cap/216_received_data.bin ===
//!    Result: &mtproto.TLRpcResult{
//!         ReqMsgId: 1001,
//!         Result: &mtproto.TLUploadFile{
//!                 Bytes: {0xde, 0xad,
//!                     0xbe, 0xef,
//!                 },
//!         },
//! }
//! ";
//! let output = scan_str(log, &ScannerConfig::default());
//! let correlation = correlate(&output.requests, &output.responses);
//! assert_eq!(correlation.pairs.len(), 1);
//! let pair = &correlation.pairs[0];
//! assert_eq!(pair.request.resource_id, Some(55));
//! assert_eq!(pair.response.payload.as_deref(), Some("deadbeef"));
//! assert!(correlation.is_complete());
//! ```
//!
//! Logs on disk are read with [`scan_file`], which streams lines through a [`LineReader`]
//! and only fails if the file cannot be opened or read.

mod config;
mod correlate;
mod error;
mod reader;
mod record;
mod scanner;
pub use config::*;
pub use correlate::*;
pub use error::*;
pub use reader::*;
pub use record::*;
pub use scanner::*;

pub mod matchers;
pub mod payload;
pub mod report;

#[cfg(feature = "serialize")]
pub mod serialize;

#[cfg(test)]
#[macro_use]
extern crate hex_literal;

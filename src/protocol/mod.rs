//! Protocol module - handshake response, status texts and datagram framing.
//!
//! This module implements the relay wire format consumed by the wrappers:
//! - 2-byte handshake response record and its deferred check
//! - 2-byte big-endian length prefix for datagram frames
//! - Status-code to text lookup

mod frame;
mod handshake;
mod status_text;
mod wire_format;

pub use frame::{build_frame, read_frame};
pub use handshake::{read_response, DeferredHandshake};
pub use status_text::{DefaultStatusText, StatusText};
pub use wire_format::{
    decode_frame_header, encode_frame_header, status, Response, FRAME_HEADER_SIZE,
    MAX_DATAGRAM_SIZE, RESPONSE_SIZE, VERSION_1,
};

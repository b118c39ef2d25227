//! Server response decoding
//!
//! Format sniffing for bodies that may be CBOR, JSON or gzip-compressed JSON,
//! and unwrapping of the `{code, data}` envelope.

mod envelope;
mod errors;
mod sniffer;

pub use envelope::{registration_options_from_bytes, ServerEnvelope, SUCCESS_CODE};
pub use errors::{ResponseError, UndecodableResponseError};
pub use sniffer::{decode_response, DecodedResponse, ResponseFormat};

//! AMF0 wire values
//!
//! Every control-plane and metadata value exchanged with clients is an AMF0
//! value: a one-byte marker followed by a kind-specific payload.

pub mod amf0;
pub mod value;

pub use amf0::{Amf0Decoder, Amf0Encoder};
pub use value::{AmfKind, AmfProperties, AmfValue};

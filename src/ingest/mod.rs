//! Ingest of a single published stream
//!
//! [`StreamRecorder`] is what the connection layer drives once a publisher
//! starts sending media: it keeps the registry informed and writes every
//! admitted tag to an FLV sink.

pub mod config;
pub mod recorder;

pub use config::RecorderConfig;
pub use recorder::{RecorderStats, StreamRecorder};

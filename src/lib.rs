//! Ingest core for a live RTMP media server
//!
//! This crate provides the pieces that sit behind an RTMP connection once a
//! publisher is sending media:
//!
//! - [`media::codec`]: classification of raw FLV audio/video payloads
//! - [`amf`]: AMF0 encoding/decoding of control-plane and metadata values
//! - [`media::muxer`]: FLV file writing with backward tag-size pointers
//! - [`registry`]: live directory of vhosts, streams and clients
//! - [`ingest`]: a per-stream recorder tying the above together
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufWriter;
//!
//! use bytes::Bytes;
//! use rtmp_ingest::ingest::{RecorderConfig, StreamRecorder};
//! use rtmp_ingest::registry::{self, Request};
//!
//! # async fn run() -> rtmp_ingest::Result<()> {
//! let registry = registry::global();
//! let cid = registry.ids().next_id();
//! let sink = BufWriter::new(File::create("s1.flv")?);
//!
//! let mut recorder = StreamRecorder::new(
//!     registry,
//!     Request::new("live", "app", "s1"),
//!     cid,
//!     sink,
//!     RecorderConfig::default(),
//! );
//! recorder.start().await?;
//! recorder.on_video(0, Bytes::from_static(&[0x17, 0x01, 0x00, 0x00, 0x00])).await?;
//! recorder.finish().await?;
//! # Ok(())
//! # }
//! ```

pub mod amf;
pub mod error;
pub mod ingest;
pub mod media;
pub mod registry;

pub use amf::{AmfKind, AmfValue};
pub use error::{Error, Result};
pub use ingest::{RecorderConfig, StreamRecorder};
pub use media::{FlvMuxer, MuxerConfig};
pub use registry::{Request, StatRegistry};

//! Live statistics registry
//!
//! The registry is the directory of everything the server is serving: virtual
//! hosts, the streams published under them, and the viewer sessions attached
//! to those streams. Ingest events (publish, codec info, frames, close) feed
//! it; reporting code reads snapshots back out by id.
//!
//! # Architecture
//!
//! ```text
//!                         Arc<StatRegistry>
//!            ┌──────────────────────────────────────────┐
//!            │ vhosts:  id -> VHostEntry  <- name       │
//!            │ streams: id -> RwLock<StreamEntry> <- url│
//!            │ clients: id -> ClientEntry               │
//!            │ ids:     IdGenerator (1, 2, 3, ...)      │
//!            └───────────────────┬──────────────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!   [Publisher]             [Publisher]             [Reporting]
//!   on_stream_publish()     on_video_info()         find_stream()
//!   on_video_frames()       on_stream_close()       vhosts()
//! ```
//!
//! Entities refer to each other by id (a stream stores its vhost id, a client
//! its stream id), never by pointer.

pub mod entry;
pub mod error;
pub mod id;
pub mod request;
pub mod store;

use std::sync::{Arc, OnceLock};

pub use entry::{
    AudioDescriptor, ClientInfo, StreamInfo, VHostInfo, VideoDescriptor,
};
pub use error::RegistryError;
pub use id::IdGenerator;
pub use request::Request;
pub use store::StatRegistry;

static GLOBAL: OnceLock<Arc<StatRegistry>> = OnceLock::new();

/// Process-wide registry, created on first use
///
/// Meant for the composition root only; library code takes an
/// `Arc<StatRegistry>` so tests can use isolated instances.
pub fn global() -> Arc<StatRegistry> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(StatRegistry::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_is_shared() {
        let a = global();
        let b = global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}

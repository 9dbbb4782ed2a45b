//! Registry entries and snapshot types
//!
//! Entries are the live, lock-protected records owned by the registry.
//! Snapshots (`*Info`) are plain copies handed out to callers.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use crate::media::codec::{AudioFormat, AudioSampleRate, AudioSoundType, VideoCodec};

use super::request::Request;

/// Video codec parameters of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDescriptor {
    pub codec: VideoCodec,
    /// AVC profile indication (66, 77, 100, ...)
    pub profile: u8,
    /// AVC level indication (31 = 3.1)
    pub level: u8,
}

/// Audio codec parameters of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioDescriptor {
    pub codec: AudioFormat,
    pub sample_rate: AudioSampleRate,
    pub sound_type: AudioSoundType,
    /// AAC audio object type (2 = LC, 5 = HE)
    pub aac_object: u8,
}

/// A virtual host
///
/// Counters are atomics so stream and client handlers can update them while
/// holding only their own entry's lock.
#[derive(Debug)]
pub struct VHostEntry {
    pub id: u64,
    pub name: String,
    nb_streams: AtomicU32,
    nb_clients: AtomicU32,
}

impl VHostEntry {
    pub(super) fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            nb_streams: AtomicU32::new(0),
            nb_clients: AtomicU32::new(0),
        }
    }

    /// Number of streams with an active publisher
    pub fn nb_streams(&self) -> u32 {
        self.nb_streams.load(Ordering::Acquire)
    }

    pub fn nb_clients(&self) -> u32 {
        self.nb_clients.load(Ordering::Acquire)
    }

    pub(super) fn stream_published(&self) {
        self.nb_streams.fetch_add(1, Ordering::AcqRel);
    }

    pub(super) fn stream_closed(&self) {
        saturating_decrement(&self.nb_streams);
    }

    pub(super) fn client_connected(&self) {
        self.nb_clients.fetch_add(1, Ordering::AcqRel);
    }

    pub(super) fn client_disconnected(&self) {
        saturating_decrement(&self.nb_clients);
    }

    pub fn snapshot(&self) -> VHostInfo {
        VHostInfo {
            id: self.id,
            name: self.name.clone(),
            nb_streams: self.nb_streams(),
            nb_clients: self.nb_clients(),
        }
    }
}

fn saturating_decrement(counter: &AtomicU32) {
    // Err means the counter was already zero
    let _ = counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
}

/// A published (or once-published) stream
#[derive(Debug)]
pub struct StreamEntry {
    pub id: u64,
    /// Owning vhost, fixed at creation
    pub vhost_id: u64,
    pub app: String,
    pub name: String,
    pub url: String,
    /// True between publish and close
    pub active: bool,
    /// Connection id of the current publisher
    pub publisher_id: Option<u64>,
    pub nb_clients: u32,
    pub nb_frames: u64,
    pub video: Option<VideoDescriptor>,
    pub audio: Option<AudioDescriptor>,
}

impl StreamEntry {
    pub(super) fn new(id: u64, vhost_id: u64, req: &Request) -> Self {
        Self {
            id,
            vhost_id,
            app: req.app.clone(),
            name: req.stream.clone(),
            url: req.url(),
            active: false,
            publisher_id: None,
            nb_clients: 0,
            nb_frames: 0,
            video: None,
            audio: None,
        }
    }

    pub fn snapshot(&self) -> StreamInfo {
        StreamInfo {
            id: self.id,
            vhost_id: self.vhost_id,
            app: self.app.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
            active: self.active,
            publisher_id: self.publisher_id,
            nb_clients: self.nb_clients,
            nb_frames: self.nb_frames,
            video: self.video,
            audio: self.audio,
        }
    }
}

/// A viewer session attached to a stream
#[derive(Debug, Clone)]
pub struct ClientEntry {
    pub id: u64,
    pub stream_id: u64,
    pub vhost_id: u64,
    pub connected_at: Instant,
}

impl ClientEntry {
    pub fn snapshot(&self) -> ClientInfo {
        ClientInfo {
            id: self.id,
            stream_id: self.stream_id,
            vhost_id: self.vhost_id,
            connected_at: self.connected_at,
        }
    }
}

/// Point-in-time copy of a vhost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VHostInfo {
    pub id: u64,
    pub name: String,
    pub nb_streams: u32,
    pub nb_clients: u32,
}

/// Point-in-time copy of a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub id: u64,
    pub vhost_id: u64,
    pub app: String,
    pub name: String,
    pub url: String,
    pub active: bool,
    pub publisher_id: Option<u64>,
    pub nb_clients: u32,
    pub nb_frames: u64,
    pub video: Option<VideoDescriptor>,
    pub audio: Option<AudioDescriptor>,
}

/// Point-in-time copy of a client
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub id: u64,
    pub stream_id: u64,
    pub vhost_id: u64,
    pub connected_at: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vhost_counters_saturate() {
        let vhost = VHostEntry::new(1, "live");
        vhost.stream_closed();
        vhost.client_disconnected();
        assert_eq!(vhost.nb_streams(), 0);
        assert_eq!(vhost.nb_clients(), 0);

        vhost.stream_published();
        vhost.stream_published();
        vhost.stream_closed();
        assert_eq!(vhost.nb_streams(), 1);

        let info = vhost.snapshot();
        assert_eq!(info.name, "live");
        assert_eq!(info.nb_streams, 1);
    }

    #[test]
    fn test_stream_entry_from_request() {
        let entry = StreamEntry::new(2, 1, &Request::new("live", "app", "s1"));
        assert_eq!(entry.url, "live/app/s1");
        assert_eq!(entry.app, "app");
        assert_eq!(entry.name, "s1");
        assert!(!entry.active);
        assert!(entry.video.is_none());

        let info = entry.snapshot();
        assert_eq!(info.id, 2);
        assert_eq!(info.vhost_id, 1);
    }
}

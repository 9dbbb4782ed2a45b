//! Statistics registry implementation
//!
//! The directory of every vhost, stream and client the server has seen.
//! Ingest events resolve-or-create their vhost and stream by name; reporting
//! code looks entries up by id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::media::codec::{AudioFormat, AudioSampleRate, AudioSoundType, VideoCodec};

use super::entry::{
    AudioDescriptor, ClientEntry, ClientInfo, StreamEntry, StreamInfo, VHostEntry, VHostInfo,
    VideoDescriptor,
};
use super::error::RegistryError;
use super::id::IdGenerator;
use super::request::Request;

#[derive(Default)]
struct VHostTable {
    by_id: HashMap<u64, Arc<VHostEntry>>,
    by_name: HashMap<String, Arc<VHostEntry>>,
}

#[derive(Default)]
struct StreamTable {
    by_id: HashMap<u64, Arc<RwLock<StreamEntry>>>,
    by_url: HashMap<String, Arc<RwLock<StreamEntry>>>,
}

/// Central registry of vhosts, streams and clients
///
/// Thread-safe via `RwLock`. Lookups and events on already-known streams take
/// only read locks on the tables; creation takes the table's write lock and
/// re-checks, so concurrent first events for one name create one entry.
///
/// Lock order: clients, then vhosts, then streams, then a stream entry.
pub struct StatRegistry {
    vhosts: RwLock<VHostTable>,
    streams: RwLock<StreamTable>,
    clients: RwLock<HashMap<u64, ClientEntry>>,
    ids: IdGenerator,
}

impl StatRegistry {
    /// Create an empty registry with its own id sequence
    pub fn new() -> Self {
        Self::with_ids(IdGenerator::new())
    }

    /// Create an empty registry drawing ids from `ids`
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self {
            vhosts: RwLock::new(VHostTable::default()),
            streams: RwLock::new(StreamTable::default()),
            clients: RwLock::new(HashMap::new()),
            ids,
        }
    }

    /// The id source, shared with the connection layer for connection ids
    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Look up a vhost by id
    pub async fn find_vhost(&self, id: u64) -> Result<VHostInfo, RegistryError> {
        let vhosts = self.vhosts.read().await;
        vhosts
            .by_id
            .get(&id)
            .map(|v| v.snapshot())
            .ok_or(RegistryError::VHostNotFound(id))
    }

    /// Look up a stream by id
    pub async fn find_stream(&self, id: u64) -> Result<StreamInfo, RegistryError> {
        let entry = {
            let streams = self.streams.read().await;
            streams
                .by_id
                .get(&id)
                .cloned()
                .ok_or(RegistryError::StreamNotFound(id))?
        };
        let snapshot = entry.read().await.snapshot();
        Ok(snapshot)
    }

    /// Look up a client by id
    pub async fn find_client(&self, id: u64) -> Result<ClientInfo, RegistryError> {
        let clients = self.clients.read().await;
        clients
            .get(&id)
            .map(|c| c.snapshot())
            .ok_or(RegistryError::ClientNotFound(id))
    }

    /// Snapshot of every vhost, ordered by id
    pub async fn vhosts(&self) -> Vec<VHostInfo> {
        let vhosts = self.vhosts.read().await;
        let mut out: Vec<_> = vhosts.by_id.values().map(|v| v.snapshot()).collect();
        out.sort_by_key(|v| v.id);
        out
    }

    /// Snapshot of every stream, ordered by id
    pub async fn streams(&self) -> Vec<StreamInfo> {
        let entries: Vec<_> = {
            let streams = self.streams.read().await;
            streams.by_id.values().cloned().collect()
        };

        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            out.push(entry.read().await.snapshot());
        }
        out.sort_by_key(|s| s.id);
        out
    }

    /// Mark a stream as published by connection `cid`
    ///
    /// Creates the vhost and stream on first use. The vhost's stream count
    /// only moves on an inactive to active transition, so a repeated publish
    /// is not double counted. Returns the stream id.
    pub async fn on_stream_publish(&self, req: &Request, cid: u64) -> u64 {
        let vhost = self.resolve_vhost(&req.vhost).await;
        let stream = self.resolve_stream(&vhost, req).await;

        let mut entry = stream.write().await;
        entry.publisher_id = Some(cid);
        if !entry.active {
            entry.active = true;
            vhost.stream_published();
        }

        tracing::info!(
            stream = %entry.url,
            stream_id = entry.id,
            vhost_id = vhost.id,
            cid = cid,
            vhost_streams = vhost.nb_streams(),
            "Stream published"
        );

        entry.id
    }

    /// Mark a stream as closed
    ///
    /// A close from a connection that is no longer the publisher of an active
    /// stream is stale and ignored. Otherwise codec descriptors are cleared,
    /// and the vhost counter only moves if the stream was active.
    pub async fn on_stream_close(&self, req: &Request, cid: u64) {
        let vhost = self.resolve_vhost(&req.vhost).await;
        let stream = self.resolve_stream(&vhost, req).await;

        let mut entry = stream.write().await;
        if entry.active && entry.publisher_id != Some(cid) {
            tracing::warn!(
                stream = %entry.url,
                publisher = ?entry.publisher_id,
                cid = cid,
                "Ignoring close from superseded publisher"
            );
            return;
        }

        entry.video = None;
        entry.audio = None;

        if !entry.active {
            tracing::debug!(stream = %entry.url, cid = cid, "Close for inactive stream");
            return;
        }

        entry.active = false;
        entry.publisher_id = None;
        vhost.stream_closed();

        tracing::info!(
            stream = %entry.url,
            stream_id = entry.id,
            cid = cid,
            frames = entry.nb_frames,
            vhost_streams = vhost.nb_streams(),
            "Stream closed"
        );
    }

    /// Replace the stream's video descriptor
    pub async fn on_video_info(&self, req: &Request, codec: VideoCodec, profile: u8, level: u8) {
        let vhost = self.resolve_vhost(&req.vhost).await;
        let stream = self.resolve_stream(&vhost, req).await;

        let mut entry = stream.write().await;
        entry.video = Some(VideoDescriptor {
            codec,
            profile,
            level,
        });

        tracing::info!(
            stream = %entry.url,
            codec = codec.name(),
            profile = profile,
            level = level,
            "Video info updated"
        );
    }

    /// Replace the stream's audio descriptor
    pub async fn on_audio_info(
        &self,
        req: &Request,
        codec: AudioFormat,
        sample_rate: AudioSampleRate,
        sound_type: AudioSoundType,
        aac_object: u8,
    ) {
        let vhost = self.resolve_vhost(&req.vhost).await;
        let stream = self.resolve_stream(&vhost, req).await;

        let mut entry = stream.write().await;
        entry.audio = Some(AudioDescriptor {
            codec,
            sample_rate,
            sound_type,
            aac_object,
        });

        tracing::info!(
            stream = %entry.url,
            codec = ?codec,
            sample_rate = sample_rate.to_hz(),
            sound_type = ?sound_type,
            aac_object = aac_object,
            "Audio info updated"
        );
    }

    /// Add `count` to the stream's frame counter
    pub async fn on_video_frames(&self, req: &Request, count: u64) {
        let vhost = self.resolve_vhost(&req.vhost).await;
        let stream = self.resolve_stream(&vhost, req).await;

        let mut entry = stream.write().await;
        entry.nb_frames = entry.nb_frames.saturating_add(count);
    }

    /// Attach a viewer session to a stream
    ///
    /// A client id seen before is left as it is.
    pub async fn on_client(&self, client_id: u64, req: &Request) {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client_id) {
            tracing::debug!(client_id = client_id, stream = %req, "Client already registered");
            return;
        }

        let vhost = self.resolve_vhost(&req.vhost).await;
        let stream = self.resolve_stream(&vhost, req).await;

        let mut entry = stream.write().await;
        entry.nb_clients += 1;
        vhost.client_connected();

        clients.insert(
            client_id,
            ClientEntry {
                id: client_id,
                stream_id: entry.id,
                vhost_id: vhost.id,
                connected_at: Instant::now(),
            },
        );

        tracing::info!(
            client_id = client_id,
            stream = %entry.url,
            stream_clients = entry.nb_clients,
            "Client connected"
        );
    }

    /// Detach a viewer session
    pub async fn on_client_disconnect(&self, client_id: u64) -> Result<(), RegistryError> {
        let mut clients = self.clients.write().await;
        let client = clients
            .remove(&client_id)
            .ok_or(RegistryError::ClientNotFound(client_id))?;

        let vhost = self.vhosts.read().await.by_id.get(&client.vhost_id).cloned();
        let stream = self.streams.read().await.by_id.get(&client.stream_id).cloned();

        if let Some(stream) = stream {
            let mut entry = stream.write().await;
            entry.nb_clients = entry.nb_clients.saturating_sub(1);
            if let Some(vhost) = vhost {
                vhost.client_disconnected();
            }

            tracing::info!(
                client_id = client_id,
                stream = %entry.url,
                stream_clients = entry.nb_clients,
                connected_secs = client.connected_at.elapsed().as_secs(),
                "Client disconnected"
            );
        }

        Ok(())
    }

    async fn resolve_vhost(&self, name: &str) -> Arc<VHostEntry> {
        {
            let vhosts = self.vhosts.read().await;
            if let Some(vhost) = vhosts.by_name.get(name) {
                return Arc::clone(vhost);
            }
        }

        let mut vhosts = self.vhosts.write().await;
        if let Some(vhost) = vhosts.by_name.get(name) {
            return Arc::clone(vhost);
        }

        let vhost = Arc::new(VHostEntry::new(self.ids.next_id(), name));
        vhosts.by_id.insert(vhost.id, Arc::clone(&vhost));
        vhosts.by_name.insert(name.to_string(), Arc::clone(&vhost));

        tracing::info!(vhost = %name, vhost_id = vhost.id, "VHost created");
        vhost
    }

    async fn resolve_stream(&self, vhost: &VHostEntry, req: &Request) -> Arc<RwLock<StreamEntry>> {
        let url = req.url();
        {
            let streams = self.streams.read().await;
            if let Some(stream) = streams.by_url.get(&url) {
                return Arc::clone(stream);
            }
        }

        let mut streams = self.streams.write().await;
        if let Some(stream) = streams.by_url.get(&url) {
            return Arc::clone(stream);
        }

        let id = self.ids.next_id();
        let stream = Arc::new(RwLock::new(StreamEntry::new(id, vhost.id, req)));
        streams.by_id.insert(id, Arc::clone(&stream));
        streams.by_url.insert(url.clone(), Arc::clone(&stream));

        tracing::info!(stream = %url, stream_id = id, vhost_id = vhost.id, "Stream created");
        stream
    }
}

impl Default for StatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Per-stream recorder
//!
//! Sits between the connection layer and the muxer/registry pair:
//!
//! ```text
//!   publisher ──► on_video/on_audio/on_metadata
//!                     │
//!                     ├── classify payload (media::codec)
//!                     ├── codec info / frame counts ──► StatRegistry
//!                     └── FLV tag ──► FlvMuxer ──► sink
//! ```
//!
//! Once the sink fails the recorder refuses further media with
//! `MuxError::SessionTerminated` and stops reporting it to the registry; the
//! owner is expected to tear the
//! connection down and call [`StreamRecorder::finish`], which still closes the
//! stream in the registry.

use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{MuxError, Result};
use crate::media::aac::AudioSpecificConfig;
use crate::media::codec::{self, AudioFormat, AudioSampleRate, AudioSoundType, VideoCodec};
use crate::media::flv::{FlvTag, FlvTagType};
use crate::media::h264::AvcConfig;
use crate::media::muxer::FlvMuxer;
use crate::registry::{Request, StatRegistry};

use super::config::RecorderConfig;

/// Counters for one recording
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub video_tags: u64,
    pub audio_tags: u64,
    pub metadata_tags: u64,
    /// Video payloads rejected by the admission filter
    pub dropped_video: u64,
    /// Bytes handed to the sink, header included
    pub bytes_written: u64,
}

/// Records one published stream to an FLV sink
pub struct StreamRecorder<W: Write> {
    registry: Arc<StatRegistry>,
    request: Request,
    cid: u64,
    muxer: FlvMuxer<W>,
    frame_report_batch: u64,
    pending_frames: u64,
    stats: RecorderStats,
    failed: bool,
}

impl<W: Write> StreamRecorder<W> {
    /// Create a recorder for the stream named by `request`, published by
    /// connection `cid`
    pub fn new(
        registry: Arc<StatRegistry>,
        request: Request,
        cid: u64,
        sink: W,
        config: RecorderConfig,
    ) -> Self {
        Self {
            registry,
            request,
            cid,
            muxer: FlvMuxer::with_config(sink, config.muxer),
            frame_report_batch: config.frame_report_batch.max(1),
            pending_frames: 0,
            stats: RecorderStats::default(),
            failed: false,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn stats(&self) -> RecorderStats {
        RecorderStats {
            bytes_written: self.muxer.bytes_written(),
            ..self.stats
        }
    }

    /// True once a sink failure has ended this session
    pub fn is_terminated(&self) -> bool {
        self.failed
    }

    /// Publish the stream and write the FLV header
    pub async fn start(&mut self) -> Result<()> {
        let stream_id = self.registry.on_stream_publish(&self.request, self.cid).await;
        self.mux(|m| m.write_header())?;

        tracing::info!(
            stream = %self.request,
            stream_id = stream_id,
            cid = self.cid,
            "Recording started"
        );
        Ok(())
    }

    /// Record a video payload
    ///
    /// Returns `Ok(None)` when the payload is not admitted (unknown frame type
    /// or codec), otherwise the number of bytes written.
    pub async fn on_video(&mut self, timestamp: u32, payload: Bytes) -> Result<Option<usize>> {
        self.ensure_live()?;
        if !codec::video_is_acceptable(&payload) {
            self.stats.dropped_video += 1;
            tracing::debug!(
                stream = %self.request,
                first_byte = ?payload.first(),
                "Dropping unacceptable video payload"
            );
            return Ok(None);
        }

        if codec::video_is_sequence_header(&payload) {
            match AvcConfig::from_video_payload(&payload) {
                Ok(avc) => {
                    tracing::debug!(
                        stream = %self.request,
                        profile = avc.profile_name(),
                        level = %avc.level_string(),
                        "AVC sequence header"
                    );
                    self.registry
                        .on_video_info(&self.request, VideoCodec::Avc, avc.profile, avc.level)
                        .await;
                }
                Err(e) => {
                    tracing::warn!(stream = %self.request, error = %e, "Unparseable AVC sequence header");
                }
            }
        } else {
            self.pending_frames += 1;
            if self.pending_frames >= self.frame_report_batch {
                self.report_frames().await;
            }
        }

        let written = self.mux(|m| m.write_video(timestamp, &payload))?;
        self.stats.video_tags += 1;
        Ok(Some(written))
    }

    /// Record an audio payload
    pub async fn on_audio(&mut self, timestamp: u32, payload: Bytes) -> Result<usize> {
        self.ensure_live()?;
        if codec::audio_is_sequence_header(&payload) {
            match AudioSpecificConfig::from_audio_payload(&payload) {
                Ok(asc) => {
                    let flags = payload[0];
                    self.registry
                        .on_audio_info(
                            &self.request,
                            AudioFormat::Aac,
                            AudioSampleRate::from_byte(flags),
                            AudioSoundType::from_byte(flags),
                            asc.audio_object_type,
                        )
                        .await;
                }
                Err(e) => {
                    tracing::warn!(stream = %self.request, error = %e, "Unparseable AAC sequence header");
                }
            }
        }

        let written = self.mux(|m| m.write_audio(timestamp, &payload))?;
        self.stats.audio_tags += 1;
        Ok(written)
    }

    /// Record a metadata payload (AMF0-encoded onMetaData body)
    pub async fn on_metadata(&mut self, payload: Bytes) -> Result<usize> {
        self.ensure_live()?;
        let written = self.mux(|m| m.write_metadata(&payload))?;
        self.stats.metadata_tags += 1;
        Ok(written)
    }

    /// Record a tag, dispatching on its type
    pub async fn on_tag(&mut self, tag: FlvTag) -> Result<Option<usize>> {
        match tag.tag_type {
            FlvTagType::Video => self.on_video(tag.timestamp, tag.data).await,
            FlvTagType::Audio => self.on_audio(tag.timestamp, tag.data).await.map(Some),
            FlvTagType::Script => self.on_metadata(tag.data).await.map(Some),
        }
    }

    /// Finish the recording and close the stream
    ///
    /// The stream is closed in the registry even when the final flush fails.
    pub async fn finish(mut self) -> Result<(W, RecorderStats)> {
        self.report_frames().await;

        let flushed = if self.failed {
            Ok(())
        } else {
            self.muxer.flush()
        };

        self.registry.on_stream_close(&self.request, self.cid).await;

        let stats = self.stats();
        tracing::info!(
            stream = %self.request,
            cid = self.cid,
            video_tags = stats.video_tags,
            audio_tags = stats.audio_tags,
            dropped_video = stats.dropped_video,
            bytes = stats.bytes_written,
            terminated = self.failed,
            "Recording finished"
        );

        flushed?;
        Ok((self.muxer.into_inner(), stats))
    }

    async fn report_frames(&mut self) {
        if self.pending_frames > 0 {
            self.registry
                .on_video_frames(&self.request, self.pending_frames)
                .await;
            self.pending_frames = 0;
        }
    }

    /// Refuse media once the session has ended, before it reaches the registry
    fn ensure_live(&self) -> Result<()> {
        if self.failed {
            return Err(MuxError::SessionTerminated.into());
        }
        Ok(())
    }

    fn mux<F>(&mut self, write: F) -> Result<usize>
    where
        F: FnOnce(&mut FlvMuxer<W>) -> std::result::Result<usize, MuxError>,
    {
        self.ensure_live()?;

        match write(&mut self.muxer) {
            Ok(n) => Ok(n),
            Err(e @ MuxError::Sink(_)) => {
                self.failed = true;
                tracing::error!(
                    stream = %self.request,
                    cid = self.cid,
                    error = %e,
                    "Recording sink failed, terminating session"
                );
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

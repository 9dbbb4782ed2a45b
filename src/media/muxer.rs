//! FLV muxer
//!
//! Writes an FLV file header followed by tags, each trailed by a back-pointer
//! holding the size of the tag just written:
//!
//! ```text
//! +--------+---+-----+-----------+-------+-----------+-------+-----------+
//! | "FLV"  |ver|flags|hdr size(9)| PTS0=0| tag 1     | PTS1  | tag 2 ... |
//! +--------+---+-----+-----------+-------+-----------+-------+-----------+
//! ```
//!
//! Each tag is assembled into one buffer and handed to the sink with a single
//! `write_all`, so a sink never sees a partial tag from this side.

use std::io::Write;

use bytes::{BufMut, BytesMut};

use super::flv::{
    FlvTag, FlvTagType, FLV_FLAG_AUDIO, FLV_FLAG_VIDEO, FLV_HEADER_SIZE, FLV_MAX_TAG_DATA_SIZE,
    FLV_PREVIOUS_TAG_SIZE, FLV_SIGNATURE, FLV_TAG_HEADER_SIZE, FLV_VERSION, TAG_TYPE_AUDIO,
    TAG_TYPE_METADATA, TAG_TYPE_VIDEO,
};
use crate::error::MuxError;

/// Size of the file header plus the leading zero back-pointer
pub const FLV_FILE_PREAMBLE_SIZE: usize = FLV_HEADER_SIZE as usize + FLV_PREVIOUS_TAG_SIZE;

/// Layout of the 4-byte timestamp field in a tag header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampLayout {
    /// Plain 32-bit big-endian
    Full32,
    /// Lower 24 bits big-endian, then the upper 8 bits (published FLV layout)
    Extended,
}

/// What `write_tags` does when one tag fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Skip rejected tags and collect them in the report
    ///
    /// A sink failure still ends the drain: the sink may hold part of the
    /// failed tag, and anything appended after it would break the
    /// back-pointer chain.
    BestEffort,
    /// Return the first failure
    StopOnError,
}

/// Muxer configuration
#[derive(Debug, Clone)]
pub struct MuxerConfig {
    /// Set the audio flag in the file header
    pub has_audio: bool,

    /// Set the video flag in the file header
    pub has_video: bool,

    /// Tag type byte used for metadata tags
    pub metadata_tag_type: u8,

    /// Timestamp field layout
    pub timestamp_layout: TimestampLayout,

    /// Batch write error handling
    pub drain_policy: DrainPolicy,
}

impl Default for MuxerConfig {
    fn default() -> Self {
        Self {
            has_audio: true,
            has_video: true,
            metadata_tag_type: TAG_TYPE_METADATA,
            timestamp_layout: TimestampLayout::Full32,
            drain_policy: DrainPolicy::BestEffort,
        }
    }
}

impl MuxerConfig {
    /// Set which media the file header announces
    pub fn media(mut self, has_audio: bool, has_video: bool) -> Self {
        self.has_audio = has_audio;
        self.has_video = has_video;
        self
    }

    /// Set the metadata tag type (0x18 by default, 0x12 for script data)
    pub fn metadata_tag_type(mut self, tag_type: u8) -> Self {
        self.metadata_tag_type = tag_type;
        self
    }

    /// Set the timestamp layout
    pub fn timestamp_layout(mut self, layout: TimestampLayout) -> Self {
        self.timestamp_layout = layout;
        self
    }

    /// Set the drain policy for `write_tags`
    pub fn drain_policy(mut self, policy: DrainPolicy) -> Self {
        self.drain_policy = policy;
        self
    }

    fn header_flags(&self) -> u8 {
        let mut flags = 0;
        if self.has_audio {
            flags |= FLV_FLAG_AUDIO;
        }
        if self.has_video {
            flags |= FLV_FLAG_VIDEO;
        }
        flags
    }
}

/// Outcome of a best-effort `write_tags`
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Tags written successfully
    pub written: usize,
    /// Bytes written for those tags
    pub bytes: usize,
    /// Index into the input and the error for each failed tag
    pub failures: Vec<(usize, MuxError)>,
}

impl DrainReport {
    /// True when every tag was written
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Streaming FLV writer over any byte sink
#[derive(Debug)]
pub struct FlvMuxer<W: Write> {
    sink: W,
    config: MuxerConfig,
    header_written: bool,
    bytes_written: u64,
    previous_tag_size: u32,
}

impl<W: Write> FlvMuxer<W> {
    /// Create a muxer with the default configuration
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, MuxerConfig::default())
    }

    pub fn with_config(sink: W, config: MuxerConfig) -> Self {
        Self {
            sink,
            config,
            header_written: false,
            bytes_written: 0,
            previous_tag_size: 0,
        }
    }

    pub fn config(&self) -> &MuxerConfig {
        &self.config
    }

    /// Write the file header and the leading zero back-pointer
    pub fn write_header(&mut self) -> Result<usize, MuxError> {
        if self.header_written {
            return Err(MuxError::HeaderAlreadyWritten);
        }

        let mut buf = BytesMut::with_capacity(FLV_FILE_PREAMBLE_SIZE);
        buf.put_slice(&FLV_SIGNATURE);
        buf.put_u8(FLV_VERSION);
        buf.put_u8(self.config.header_flags());
        buf.put_u32(FLV_HEADER_SIZE);
        buf.put_u32(0); // PreviousTagSize0

        self.sink.write_all(&buf)?;
        self.header_written = true;
        self.bytes_written += buf.len() as u64;

        tracing::debug!(flags = self.config.header_flags(), "FLV header written");
        Ok(buf.len())
    }

    /// Write an audio tag; returns the bytes written (payload + 15)
    pub fn write_audio(&mut self, timestamp: u32, payload: &[u8]) -> Result<usize, MuxError> {
        self.write_tag(TAG_TYPE_AUDIO, timestamp, payload)
    }

    /// Write a video tag; returns the bytes written (payload + 15)
    pub fn write_video(&mut self, timestamp: u32, payload: &[u8]) -> Result<usize, MuxError> {
        self.write_tag(TAG_TYPE_VIDEO, timestamp, payload)
    }

    /// Write a metadata tag at timestamp 0
    pub fn write_metadata(&mut self, payload: &[u8]) -> Result<usize, MuxError> {
        self.write_tag(self.config.metadata_tag_type, 0, payload)
    }

    /// Write a sequence of tags in order
    ///
    /// Script tags go through `write_metadata` and lose their timestamp.
    pub fn write_tags(&mut self, tags: &[FlvTag]) -> Result<DrainReport, MuxError> {
        let mut report = DrainReport::default();

        for (index, tag) in tags.iter().enumerate() {
            let result = match tag.tag_type {
                FlvTagType::Audio => self.write_audio(tag.timestamp, &tag.data),
                FlvTagType::Video => self.write_video(tag.timestamp, &tag.data),
                FlvTagType::Script => self.write_metadata(&tag.data),
            };

            match result {
                Ok(n) => {
                    report.written += 1;
                    report.bytes += n;
                }
                Err(e) => match self.config.drain_policy {
                    DrainPolicy::StopOnError => return Err(e),
                    DrainPolicy::BestEffort => {
                        tracing::warn!(
                            index = index,
                            tag_type = ?tag.tag_type,
                            timestamp = tag.timestamp,
                            error = %e,
                            "Failed to write FLV tag"
                        );
                        let torn = matches!(e, MuxError::Sink(_));
                        report.failures.push((index, e));
                        if torn {
                            break;
                        }
                    }
                },
            }
        }

        Ok(report)
    }

    /// Flush the sink
    pub fn flush(&mut self) -> Result<(), MuxError> {
        self.sink.flush()?;
        Ok(())
    }

    /// Total bytes handed to the sink, header included
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Back-pointer value written after the most recent tag (0 before any tag)
    pub fn previous_tag_size(&self) -> u32 {
        self.previous_tag_size
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Consume the muxer and return the sink
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_tag(&mut self, tag_type: u8, timestamp: u32, payload: &[u8]) -> Result<usize, MuxError> {
        if !self.header_written {
            return Err(MuxError::HeaderNotWritten);
        }
        if payload.len() > FLV_MAX_TAG_DATA_SIZE {
            return Err(MuxError::TagTooLarge(payload.len()));
        }

        let data_size = payload.len() as u32;
        let tag_size = FLV_TAG_HEADER_SIZE as u32 + data_size;

        let mut buf = BytesMut::with_capacity(tag_size as usize + FLV_PREVIOUS_TAG_SIZE);
        buf.put_u8(tag_type);
        buf.put_uint(data_size as u64, 3);
        match self.config.timestamp_layout {
            TimestampLayout::Full32 => buf.put_u32(timestamp),
            TimestampLayout::Extended => {
                buf.put_uint((timestamp & 0x00FF_FFFF) as u64, 3);
                buf.put_u8((timestamp >> 24) as u8);
            }
        }
        buf.put_uint(0, 3); // stream id
        buf.put_slice(payload);
        buf.put_u32(tag_size);

        self.sink.write_all(&buf)?;
        self.bytes_written += buf.len() as u64;
        self.previous_tag_size = tag_size;

        tracing::trace!(tag_type = tag_type, timestamp = timestamp, size = data_size, "FLV tag written");
        Ok(buf.len())
    }
}

//! FLV container constants and the tag model
//!
//! Every RTMP audio/video/data message body is an FLV tag body; the muxer adds
//! the 11-byte tag header and the trailing back-pointer.
//!
//! ```text
//! file:  "FLV" | version(1) | flags(1) | header size(4) | PTS0(4) | tags...
//! tag:   type(1) | size(3) | timestamp(4) | stream id(3) | body(size) | PTS(4)
//! ```

use bytes::Bytes;

use super::codec::{self, AudioFormat, VideoCodec, VideoFrameType};

/// File signature
pub const FLV_SIGNATURE: [u8; 3] = *b"FLV";
pub const FLV_VERSION: u8 = 0x01;

/// Size of the file header, also the value of its header-size field
pub const FLV_HEADER_SIZE: u32 = 9;

/// type(1) + size(3) + timestamp(4) + stream id(3)
pub const FLV_TAG_HEADER_SIZE: usize = 11;

/// Width of the back-pointer trailing every tag
pub const FLV_PREVIOUS_TAG_SIZE: usize = 4;

/// Largest body the 24-bit size field can describe
pub const FLV_MAX_TAG_DATA_SIZE: usize = 0x00FF_FFFF;

/// Header flag bits
pub const FLV_FLAG_AUDIO: u8 = 0x01;
pub const FLV_FLAG_VIDEO: u8 = 0x04;

pub const TAG_TYPE_AUDIO: u8 = 0x08;
pub const TAG_TYPE_VIDEO: u8 = 0x09;

/// Metadata tag type written by the ingest muxer
pub const TAG_TYPE_METADATA: u8 = 0x18;

/// Script data tag type of the published FLV format
pub const TAG_TYPE_SCRIPT: u8 = 0x12;

/// Kind of media a tag carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlvTagType {
    Audio,
    Video,
    /// onMetaData and other AMF0 data
    Script,
}

/// One tag body with its type and timestamp
#[derive(Debug, Clone)]
pub struct FlvTag {
    pub tag_type: FlvTagType,
    /// Milliseconds
    pub timestamp: u32,
    /// Body including the codec header bytes
    pub data: Bytes,
}

impl FlvTag {
    pub fn new(tag_type: FlvTagType, timestamp: u32, data: Bytes) -> Self {
        Self {
            tag_type,
            timestamp,
            data,
        }
    }

    pub fn video(timestamp: u32, data: Bytes) -> Self {
        Self::new(FlvTagType::Video, timestamp, data)
    }

    pub fn audio(timestamp: u32, data: Bytes) -> Self {
        Self::new(FlvTagType::Audio, timestamp, data)
    }

    /// Script data always sits at timestamp 0
    pub fn script(data: Bytes) -> Self {
        Self::new(FlvTagType::Script, 0, data)
    }

    /// Codec of a video tag
    pub fn video_codec(&self) -> Option<VideoCodec> {
        match self.tag_type {
            FlvTagType::Video => self.data.first().and_then(|&b| VideoCodec::from_byte(b)),
            _ => None,
        }
    }

    /// Frame type of a video tag
    pub fn frame_type(&self) -> Option<VideoFrameType> {
        match self.tag_type {
            FlvTagType::Video => self.data.first().and_then(|&b| VideoFrameType::from_byte(b)),
            _ => None,
        }
    }

    /// Sound format of an audio tag
    pub fn sound_format(&self) -> Option<AudioFormat> {
        match self.tag_type {
            FlvTagType::Audio => self.data.first().and_then(|&b| AudioFormat::from_byte(b)),
            _ => None,
        }
    }

    pub fn is_keyframe(&self) -> bool {
        self.tag_type == FlvTagType::Video && codec::video_is_keyframe(&self.data)
    }

    /// AVC or AAC sequence header
    pub fn is_sequence_header(&self) -> bool {
        match self.tag_type {
            FlvTagType::Video => codec::video_is_sequence_header(&self.data),
            FlvTagType::Audio => codec::audio_is_sequence_header(&self.data),
            FlvTagType::Script => false,
        }
    }

    /// Size on disk: header, body and back-pointer
    pub fn muxed_size(&self) -> usize {
        FLV_TAG_HEADER_SIZE + self.data.len() + FLV_PREVIOUS_TAG_SIZE
    }
}

//! Codec classification of raw FLV payloads
//!
//! Pure predicates over the first bytes of an audio/video message body. They
//! never fail: a short or malformed payload is simply "not a match", since
//! such payloads are a normal transient condition on a live stream.
//!
//! ```text
//! video byte 0 = frameType(4) | codecId(4)
//! video byte 1 = AVCPacketType            (codecId == 7)
//! audio byte 0 = soundFormat(4) | rate(2) | size(1) | channels(1)
//! audio byte 1 = AACPacketType            (soundFormat == 10)
//! ```
//!
//! The typed views at the bottom decode the same bitfields into enums for
//! callers that need more than a yes/no answer.

/// Frame type of a keyframe
pub const FRAME_TYPE_KEYFRAME: u8 = 1;

/// Codec id of AVC (H.264)
pub const VIDEO_CODEC_AVC: u8 = 7;

/// Sound format of AAC
pub const AUDIO_FORMAT_AAC: u8 = 10;

/// AVC/AAC packet type of a sequence header
pub const PACKET_TYPE_SEQUENCE_HEADER: u8 = 0;

/// Frame types accepted at ingest
const ACCEPTED_FRAME_TYPES: std::ops::RangeInclusive<u8> = 1..=5;

/// Codec ids accepted at ingest
const ACCEPTED_VIDEO_CODECS: std::ops::RangeInclusive<u8> = 2..=7;

#[inline]
fn high_nibble(b: u8) -> u8 {
    (b >> 4) & 0x0F
}

#[inline]
fn low_nibble(b: u8) -> u8 {
    b & 0x0F
}

/// Video payload whose frame type is keyframe
pub fn video_is_keyframe(payload: &[u8]) -> bool {
    payload
        .first()
        .is_some_and(|&b| high_nibble(b) == FRAME_TYPE_KEYFRAME)
}

/// Video payload carrying AVC
pub fn video_is_h264(payload: &[u8]) -> bool {
    payload
        .first()
        .is_some_and(|&b| low_nibble(b) == VIDEO_CODEC_AVC)
}

/// AVC keyframe whose packet type is the sequence header
pub fn video_is_sequence_header(payload: &[u8]) -> bool {
    if !video_is_h264(payload) || payload.len() < 2 {
        return false;
    }

    high_nibble(payload[0]) == FRAME_TYPE_KEYFRAME && payload[1] == PACKET_TYPE_SEQUENCE_HEADER
}

/// Ingest admission filter for video payloads
pub fn video_is_acceptable(payload: &[u8]) -> bool {
    let Some(&b) = payload.first() else {
        return false;
    };

    ACCEPTED_FRAME_TYPES.contains(&high_nibble(b)) && ACCEPTED_VIDEO_CODECS.contains(&low_nibble(b))
}

/// Audio payload carrying AAC
pub fn audio_is_aac(payload: &[u8]) -> bool {
    payload
        .first()
        .is_some_and(|&b| high_nibble(b) == AUDIO_FORMAT_AAC)
}

/// AAC payload whose packet type is the sequence header
pub fn audio_is_sequence_header(payload: &[u8]) -> bool {
    audio_is_aac(payload) && payload.len() >= 2 && payload[1] == PACKET_TYPE_SEQUENCE_HEADER
}

wire_enum! {
    /// Video frame type, high nibble of video byte 0
    pub enum VideoFrameType {
        Keyframe = 1 => "keyframe",
        InterFrame = 2 => "inter frame",
        /// H.263 only
        DisposableInterFrame = 3 => "disposable inter frame",
        /// Reserved for server use
        GeneratedKeyframe = 4 => "generated keyframe",
        /// Video info/command frame
        VideoInfoFrame = 5 => "video info frame",
    }
}

wire_enum! {
    /// Video codec id, low nibble of video byte 0
    pub enum VideoCodec {
        SorensonH263 = 2 => "H.263",
        ScreenVideo = 3 => "ScreenVideo",
        Vp6 = 4 => "VP6",
        Vp6Alpha = 5 => "VP6A",
        ScreenVideoV2 = 6 => "ScreenVideo2",
        Avc = 7 => "H.264",
    }
}

wire_enum! {
    /// Sound format, high nibble of audio byte 0
    pub enum AudioFormat {
        /// Platform endian
        LinearPcm = 0 => "PCM",
        Adpcm = 1 => "ADPCM",
        Mp3 = 2 => "MP3",
        LinearPcmLe = 3 => "PCM-LE",
        Nellymoser16kMono = 4 => "Nellymoser 16k",
        Nellymoser8kMono = 5 => "Nellymoser 8k",
        Nellymoser = 6 => "Nellymoser",
        G711ALaw = 7 => "G.711 A-law",
        G711MuLaw = 8 => "G.711 mu-law",
        Aac = 10 => "AAC",
        Speex = 11 => "Speex",
        Mp38k = 14 => "MP3 8k",
        DeviceSpecific = 15 => "device specific",
    }
}

wire_enum! {
    /// Sample rate class, bits 2-3 of audio byte 0
    pub enum AudioSampleRate {
        Rate5512 = 0 => "5.5 kHz",
        Rate11025 = 1 => "11 kHz",
        Rate22050 = 2 => "22 kHz",
        Rate44100 = 3 => "44 kHz",
    }
}

wire_enum! {
    /// Sample size, bit 1 of audio byte 0 (uncompressed formats only)
    pub enum AudioSampleSize {
        Bits8 = 0 => "8-bit",
        Bits16 = 1 => "16-bit",
    }
}

wire_enum! {
    /// Channel layout, bit 0 of audio byte 0
    pub enum AudioSoundType {
        Mono = 0 => "mono",
        Stereo = 1 => "stereo",
    }
}

impl VideoFrameType {
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_value(high_nibble(b))
    }
}

impl VideoCodec {
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_value(low_nibble(b))
    }
}

impl AudioFormat {
    /// `None` for the reserved formats 9, 12 and 13
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_value(high_nibble(b))
    }
}

// The 2-bit and 1-bit fields cover every value, so these never fail.

impl AudioSampleRate {
    pub fn from_byte(b: u8) -> Self {
        match (b >> 2) & 0x03 {
            0 => Self::Rate5512,
            1 => Self::Rate11025,
            2 => Self::Rate22050,
            _ => Self::Rate44100,
        }
    }

    pub fn to_hz(self) -> u32 {
        [5512, 11025, 22050, 44100][self as usize]
    }
}

impl AudioSampleSize {
    pub fn from_byte(b: u8) -> Self {
        if b & 0x02 == 0 {
            Self::Bits8
        } else {
            Self::Bits16
        }
    }
}

impl AudioSoundType {
    pub fn from_byte(b: u8) -> Self {
        if b & 0x01 == 0 {
            Self::Mono
        } else {
            Self::Stereo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_exhaustive() {
        for b in 0..=u8::MAX {
            let frame_type = b >> 4;
            let codec_id = b & 0x0F;
            let expected = (1..=5).contains(&frame_type) && (2..=7).contains(&codec_id);
            assert_eq!(
                video_is_acceptable(&[b, 0x00]),
                expected,
                "byte 0x{:02x}",
                b
            );
        }
        assert!(!video_is_acceptable(&[]));
    }

    #[test]
    fn test_keyframe_exhaustive() {
        for b in 0..=u8::MAX {
            assert_eq!(video_is_keyframe(&[b]), b >> 4 == 1, "byte 0x{:02x}", b);
        }
        assert!(!video_is_keyframe(&[]));
    }

    #[test]
    fn test_h264() {
        assert!(video_is_h264(&[0x17]));
        assert!(video_is_h264(&[0x27, 0x01]));
        assert!(!video_is_h264(&[0x12]));
        assert!(!video_is_h264(&[]));
    }

    #[test]
    fn test_video_sequence_header() {
        assert!(video_is_sequence_header(&[0x17, 0x00]));
        assert!(video_is_sequence_header(&[0x17, 0x00, 0x00, 0x00, 0x00, 0x01]));

        // Each condition violated in turn
        assert!(!video_is_sequence_header(&[0x14, 0x00])); // not AVC
        assert!(!video_is_sequence_header(&[0x17])); // too short
        assert!(!video_is_sequence_header(&[0x27, 0x00])); // not a keyframe
        assert!(!video_is_sequence_header(&[0x17, 0x01])); // NALU
        assert!(!video_is_sequence_header(&[0x17, 0x02])); // end of sequence
        assert!(!video_is_sequence_header(&[]));
    }

    #[test]
    fn test_aac() {
        assert!(audio_is_aac(&[0xAF]));
        assert!(audio_is_aac(&[0xA0]));
        assert!(!audio_is_aac(&[0x2F]));
        assert!(!audio_is_aac(&[]));
    }

    #[test]
    fn test_audio_sequence_header() {
        assert!(audio_is_sequence_header(&[0xAF, 0x00, 0x12, 0x10]));
        assert!(!audio_is_sequence_header(&[0xAF, 0x01, 0x21]));
        assert!(!audio_is_sequence_header(&[0xAF]));
        assert!(!audio_is_sequence_header(&[0x2F, 0x00]));
    }

    #[test]
    fn test_typed_views_agree_with_predicates() {
        for b in 0..=u8::MAX {
            let payload = [b];
            assert_eq!(
                VideoFrameType::from_byte(b) == Some(VideoFrameType::Keyframe),
                video_is_keyframe(&payload)
            );
            assert_eq!(
                VideoCodec::from_byte(b) == Some(VideoCodec::Avc),
                video_is_h264(&payload)
            );
            assert_eq!(
                AudioFormat::from_byte(b) == Some(AudioFormat::Aac),
                audio_is_aac(&payload)
            );
            // Admission is exactly "both fields decode"
            assert_eq!(
                VideoFrameType::from_byte(b).is_some() && VideoCodec::from_byte(b).is_some(),
                video_is_acceptable(&payload)
            );
        }
    }

    #[test]
    fn test_wire_values_roundtrip() {
        for v in 0..16u8 {
            if let Some(format) = AudioFormat::from_value(v) {
                assert_eq!(format.value(), v);
            }
        }
        assert!(AudioFormat::from_value(9).is_none());
        assert!(AudioFormat::from_value(12).is_none());
        assert!(AudioFormat::from_value(13).is_none());
        assert_eq!(VideoCodec::Avc.name(), "H.264");
        assert_eq!(VideoCodec::from_byte(0x12), Some(VideoCodec::SorensonH263));
    }

    #[test]
    fn test_audio_bitfields() {
        // 0xAF = AAC, 44 kHz, 16-bit, stereo
        assert_eq!(AudioSampleRate::from_byte(0xAF), AudioSampleRate::Rate44100);
        assert_eq!(AudioSampleSize::from_byte(0xAF), AudioSampleSize::Bits16);
        assert_eq!(AudioSoundType::from_byte(0xAF), AudioSoundType::Stereo);

        // 0x22 = MP3, 5.5 kHz, 16-bit, mono
        assert_eq!(AudioSampleRate::from_byte(0x22), AudioSampleRate::Rate5512);
        assert_eq!(AudioSampleSize::from_byte(0x20), AudioSampleSize::Bits8);
        assert_eq!(AudioSoundType::from_byte(0x22), AudioSoundType::Mono);

        assert_eq!(AudioSampleRate::from_byte(0x04).to_hz(), 11025);
        assert_eq!(AudioSampleRate::from_byte(0x08).to_hz(), 22050);
        assert_eq!(AudioSampleRate::Rate5512.to_hz(), 5512);
    }
}

//! AAC sequence header parsing
//!
//! An AAC audio payload is the sound format byte, the AAC packet type, then
//! either the AudioSpecificConfig (packet type 0) or a raw frame (1).
//!
//! ```text
//! AudioSpecificConfig (bit-packed, MSB first):
//!   objectType(5) | freqIndex(4) | [frequency(24) if freqIndex == 15]
//!   | channelConfig(4) | frameLengthFlag(1) | ...
//! ```

use crate::error::{MediaError, Result};

/// Sound format byte and packet type ahead of the config
pub const AAC_AUDIO_HEADER_SIZE: usize = 2;

/// Frequency index that announces an explicit 24-bit frequency
const EXPLICIT_FREQUENCY_INDEX: u32 = 0x0F;

/// Sampling frequency by index; 13 and 14 are reserved
const SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

wire_enum! {
    /// Second byte of an AAC audio payload
    pub enum AacPacketType {
        SequenceHeader = 0 => "sequence header",
        Raw = 1 => "raw",
    }
}

impl AacPacketType {
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_value(b)
    }
}

wire_enum! {
    /// MPEG-4 audio object types seen on RTMP ingest
    pub enum AacProfile {
        Main = 1 => "AAC Main",
        Lc = 2 => "AAC LC",
        Ssr = 3 => "AAC SSR",
        Ltp = 4 => "AAC LTP",
        /// Spectral band replication
        Sbr = 5 => "HE-AAC",
        Scalable = 6 => "AAC Scalable",
        /// SBR plus parametric stereo
        Ps = 29 => "HE-AACv2",
    }
}

impl AacProfile {
    pub fn from_object_type(object_type: u8) -> Option<Self> {
        Self::from_value(object_type)
    }
}

/// MSB-first reader over a byte slice
struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read `n` (at most 32) bits, or `None` past the end
    fn read(&mut self, n: usize) -> Option<u32> {
        if self.pos + n > self.data.len() * 8 {
            return None;
        }
        let mut out = 0u32;
        for _ in 0..n {
            let bit = (self.data[self.pos / 8] >> (7 - self.pos % 8)) & 1;
            out = (out << 1) | bit as u32;
            self.pos += 1;
        }
        Some(out)
    }
}

/// Decoded AudioSpecificConfig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    /// MPEG-4 audio object type (2 = LC, 5 = HE)
    pub audio_object_type: u8,
    pub sampling_frequency_index: u8,
    /// Hz, from the table or the explicit field
    pub sampling_frequency: u32,
    pub channel_configuration: u8,
    /// Set for 960-sample frames
    pub frame_length_flag: bool,
}

impl AudioSpecificConfig {
    /// Parse the config carried by an AAC sequence header payload
    pub fn from_audio_payload(payload: &[u8]) -> Result<Self> {
        match payload.get(AAC_AUDIO_HEADER_SIZE..) {
            Some(config) => Self::parse(config),
            None => Err(MediaError::InvalidAacConfig.into()),
        }
    }

    /// Parse a bare AudioSpecificConfig
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::read_fields(&mut BitReader::new(data))
            .ok_or_else(|| MediaError::InvalidAacConfig.into())
    }

    fn read_fields(bits: &mut BitReader<'_>) -> Option<Self> {
        let audio_object_type = bits.read(5)? as u8;
        let index = bits.read(4)?;
        let sampling_frequency = if index == EXPLICIT_FREQUENCY_INDEX {
            bits.read(24)?
        } else {
            *SAMPLE_RATES.get(index as usize)?
        };
        let channel_configuration = bits.read(4)? as u8;
        let frame_length_flag = bits.read(1)? == 1;

        Some(Self {
            audio_object_type,
            sampling_frequency_index: index as u8,
            sampling_frequency,
            channel_configuration,
            frame_length_flag,
        })
    }

    pub fn profile(&self) -> Option<AacProfile> {
        AacProfile::from_object_type(self.audio_object_type)
    }

    /// Channel count; 0 when the layout is carried in the stream itself
    pub fn channels(&self) -> u8 {
        match self.channel_configuration {
            7 => 8,
            c @ 1..=6 => c,
            _ => 0,
        }
    }

    pub fn samples_per_frame(&self) -> u32 {
        if self.frame_length_flag {
            960
        } else {
            1024
        }
    }
}

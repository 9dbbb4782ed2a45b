//! Media handling for ingest
//!
//! This module provides:
//! - Codec classification of raw audio/video payloads
//! - FLV tag model and muxer
//! - H.264/AVC and AAC sequence header parsing

/// Declares a fieldless enum over a wire code with a value lookup and a
/// display name per variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Look up the variant for an already extracted field value
            pub fn from_value(value: u8) -> Option<Self> {
                match value {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Field value on the wire
            pub fn value(self) -> u8 {
                self as u8
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }
    };
}

pub mod aac;
pub mod codec;
pub mod flv;
pub mod h264;
pub mod muxer;

pub use aac::{AacPacketType, AacProfile, AudioSpecificConfig};
pub use codec::{
    AudioFormat, AudioSampleRate, AudioSampleSize, AudioSoundType, VideoCodec, VideoFrameType,
};
pub use flv::{FlvTag, FlvTagType};
pub use h264::{AvcConfig, AvcPacketType};
pub use muxer::{DrainPolicy, DrainReport, FlvMuxer, MuxerConfig, TimestampLayout};

//! AVC decoder configuration record parsing
//!
//! A video payload with codec id 7 is laid out as
//!
//! ```text
//! frameType|codecId (1) | AVCPacketType (1) | compositionTime (SI24) | body
//! ```
//!
//! and for packet type 0 the body is an AVCDecoderConfigurationRecord:
//!
//! ```text
//! version=1 | profile | compatibility | level | 0b111111xx (NALU length - 1)
//! | 0b111nnnnn (SPS count) | { u16 len | SPS }* | PPS count | { u16 len | PPS }*
//! ```

use bytes::Bytes;

use crate::error::{MediaError, Result};

/// Codec byte, packet type and composition time
pub const AVC_VIDEO_HEADER_SIZE: usize = 5;

/// Shortest record: six fixed bytes plus the PPS count
const MIN_RECORD_SIZE: usize = 7;

const PROFILE_NAMES: &[(u8, &str)] = &[
    (66, "Baseline"),
    (77, "Main"),
    (88, "Extended"),
    (100, "High"),
    (110, "High 10"),
    (122, "High 4:2:2"),
    (244, "High 4:4:4"),
];

wire_enum! {
    /// Second byte of an AVC video payload
    pub enum AvcPacketType {
        SequenceHeader = 0 => "sequence header",
        Nalu = 1 => "NALU",
        EndOfSequence = 2 => "end of sequence",
    }
}

impl AvcPacketType {
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_value(b)
    }
}

/// Decoded AVCDecoderConfigurationRecord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvcConfig {
    /// profile_idc (66, 77, 100, ...)
    pub profile: u8,
    pub compatibility: u8,
    /// level_idc, ten times the level number
    pub level: u8,
    /// Width of the length prefix in front of each NALU
    pub nalu_length_size: u8,
    pub sps: Vec<Bytes>,
    pub pps: Vec<Bytes>,
}

/// Forward-only view over the record
struct Reader<'a>(&'a [u8]);

impl<'a> Reader<'a> {
    fn u8(&mut self) -> Option<u8> {
        let (&b, rest) = self.0.split_first()?;
        self.0 = rest;
        Some(b)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.0.len() < n {
            return None;
        }
        let (head, rest) = self.0.split_at(n);
        self.0 = rest;
        Some(head)
    }

    fn u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    /// `count` parameter sets, each behind a 16-bit length
    fn parameter_sets(&mut self, count: usize) -> Option<Vec<Bytes>> {
        (0..count)
            .map(|_| {
                let len = self.u16()? as usize;
                self.take(len).map(Bytes::copy_from_slice)
            })
            .collect()
    }
}

impl AvcConfig {
    /// Parse the record carried by an AVC sequence header payload
    pub fn from_video_payload(payload: &[u8]) -> Result<Self> {
        match payload.get(AVC_VIDEO_HEADER_SIZE..) {
            Some(record) => Self::parse(record),
            None => Err(MediaError::InvalidAvcConfig.into()),
        }
    }

    /// Parse a bare AVCDecoderConfigurationRecord
    pub fn parse(record: &[u8]) -> Result<Self> {
        if record.len() < MIN_RECORD_SIZE {
            return Err(MediaError::InvalidAvcConfig.into());
        }
        Self::read(&mut Reader(record)).ok_or_else(|| MediaError::InvalidAvcConfig.into())
    }

    fn read(r: &mut Reader<'_>) -> Option<Self> {
        if r.u8()? != 1 {
            return None;
        }
        let profile = r.u8()?;
        let compatibility = r.u8()?;
        let level = r.u8()?;
        let nalu_length_size = (r.u8()? & 0x03) + 1;

        let sps_count = r.u8()? & 0x1F;
        let sps = r.parameter_sets(sps_count as usize)?;
        let pps_count = r.u8()?;
        let pps = r.parameter_sets(pps_count as usize)?;

        Some(Self {
            profile,
            compatibility,
            level,
            nalu_length_size,
            sps,
            pps,
        })
    }

    pub fn profile_name(&self) -> &'static str {
        PROFILE_NAMES
            .iter()
            .find(|(idc, _)| *idc == self.profile)
            .map_or("Unknown", |&(_, name)| name)
    }

    /// Dotted level, `31` becomes "3.1"
    pub fn level_string(&self) -> String {
        format!("{}.{}", self.level / 10, self.level % 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    // Main 4.0, 2-byte NALU lengths, two SPS, one PPS
    const RECORD: &[u8] = &[
        0x01, 0x4D, 0x40, 0x28, 0xFD, 0xE2, //
        0x00, 0x03, 0x67, 0x4D, 0x40, //
        0x00, 0x02, 0x67, 0x4E, //
        0x01, 0x00, 0x03, 0x68, 0xCE, 0x3C,
    ];

    #[test]
    fn test_packet_type() {
        assert_eq!(AvcPacketType::from_byte(2), Some(AvcPacketType::EndOfSequence));
        assert_eq!(AvcPacketType::from_byte(1).map(AvcPacketType::name), Some("NALU"));
        assert_eq!(AvcPacketType::from_byte(9), None);
    }

    #[test]
    fn test_parse_record() {
        let avc = AvcConfig::parse(RECORD).unwrap();
        assert_eq!(avc.profile, 77);
        assert_eq!(avc.compatibility, 0x40);
        assert_eq!(avc.level, 40);
        assert_eq!(avc.nalu_length_size, 2);
        assert_eq!(avc.sps.len(), 2);
        assert_eq!(&avc.sps[1][..], &[0x67, 0x4E]);
        assert_eq!(&avc.pps[0][..], &[0x68, 0xCE, 0x3C]);
        assert_eq!(avc.profile_name(), "Main");
        assert_eq!(avc.level_string(), "4.0");
    }

    #[test]
    fn test_from_video_payload() {
        let mut payload = vec![0x17, 0x00, 0x00, 0x00, 0x00];
        payload.extend_from_slice(RECORD);
        assert_eq!(AvcConfig::from_video_payload(&payload).unwrap().level, 40);

        let err = AvcConfig::from_video_payload(&[0x17, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Media(MediaError::InvalidAvcConfig)));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut record = RECORD.to_vec();
        record[0] = 0x00;
        assert!(AvcConfig::parse(&record).is_err());
    }

    #[test]
    fn test_rejects_truncation() {
        // every strict prefix fails somewhere
        for end in 0..RECORD.len() {
            assert!(AvcConfig::parse(&RECORD[..end]).is_err(), "prefix {}", end);
        }
    }

    #[test]
    fn test_no_parameter_sets() {
        let avc = AvcConfig::parse(&[0x01, 0x42, 0xC0, 0x1E, 0xFF, 0xE0, 0x00]).unwrap();
        assert_eq!(avc.profile_name(), "Baseline");
        assert_eq!(avc.nalu_length_size, 4);
        assert!(avc.sps.is_empty());
        assert!(avc.pps.is_empty());

        let odd = AvcConfig::parse(&[0x01, 0x2A, 0x00, 0x0B, 0xFF, 0xE0, 0x00]).unwrap();
        assert_eq!(odd.profile_name(), "Unknown");
        assert_eq!(odd.level_string(), "1.1");
    }
}

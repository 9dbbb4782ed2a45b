//! AMF0 encoder and decoder
//!
//! Every value is a marker byte followed by a kind-specific payload:
//!
//! ```text
//! Number       00 | f64
//! Boolean      01 | u8
//! String       02 | u16 len | utf8
//! Object       03 | { u16 len | utf8 key | value }* | 00 00 09
//! Null         05
//! Undefined    06
//! Reference    07 | u16 index
//! EcmaArray    08 | u32 count hint | { key | value }* | 00 00 09
//! StrictArray  0A | u32 count | value*
//! Date         0B | f64 millis | i16 time zone
//! LongString   0C | u32 len | utf8
//! XmlDocument  0F | u32 len | utf8
//! TypedObject  10 | u16 len | class name | { key | value }* | 00 00 09
//! ```
//!
//! MovieClip (04), Unsupported (0D) and RecordSet (0E) carry no payload and
//! decode as `Undefined`. AVM+ (11) would switch to AMF3 and is refused.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::value::{AmfKind, AmfProperties, AmfValue};
use crate::error::AmfError;

/// Deepest container nesting the decoder follows
const MAX_NESTING_DEPTH: usize = 64;

/// Peek at the kind of the next value without consuming anything
pub fn peek_kind(buf: &Bytes) -> Option<AmfKind> {
    buf.first().and_then(|&marker| AmfKind::from_marker(marker))
}

/// Length-checked reads over the input buffer
struct Input<'a>(&'a mut Bytes);

impl Input<'_> {
    fn need(&self, needed: usize) -> Result<(), AmfError> {
        let remaining = self.0.remaining();
        if remaining < needed {
            Err(AmfError::Truncated { needed, remaining })
        } else {
            Ok(())
        }
    }

    fn u8(&mut self) -> Result<u8, AmfError> {
        self.need(1)?;
        Ok(self.0.get_u8())
    }

    fn u16(&mut self) -> Result<u16, AmfError> {
        self.need(2)?;
        Ok(self.0.get_u16())
    }

    fn u32(&mut self) -> Result<u32, AmfError> {
        self.need(4)?;
        Ok(self.0.get_u32())
    }

    fn f64(&mut self) -> Result<f64, AmfError> {
        self.need(8)?;
        Ok(self.0.get_f64())
    }

    fn utf8(&mut self, len: usize) -> Result<String, AmfError> {
        self.need(len)?;
        let raw = self.0.split_to(len);
        std::str::from_utf8(&raw)
            .map(str::to_owned)
            .map_err(|_| AmfError::InvalidUtf8)
    }

    fn short_string(&mut self) -> Result<String, AmfError> {
        let len = self.u16()?;
        self.utf8(len as usize)
    }

    fn long_string(&mut self) -> Result<String, AmfError> {
        let len = self.u32()?;
        self.utf8(len as usize)
    }

    fn is_empty(&self) -> bool {
        !self.0.has_remaining()
    }
}

/// AMF0 decoder
///
/// Strict by default: a marker outside the AMF0 table is an error. Lenient
/// mode maps unknown markers to `Undefined` and accepts an object body that
/// runs out before its end sentinel, which some encoders produce.
///
/// The decoder remembers every complex value it has produced so that
/// reference markers can resolve; call [`reset`](Self::reset) between
/// unrelated messages.
#[derive(Debug, Default)]
pub struct Amf0Decoder {
    references: Vec<AmfValue>,
    lenient: bool,
}

impl Amf0Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lenient(lenient: bool) -> Self {
        Self {
            references: Vec::new(),
            lenient,
        }
    }

    /// Forget the reference table
    pub fn reset(&mut self) {
        self.references.clear();
    }

    /// Decode the next value, whatever its kind
    pub fn decode(&mut self, buf: &mut Bytes) -> Result<AmfValue, AmfError> {
        self.read_value(&mut Input(buf), 1)
    }

    /// Decode the next value, which must be of `kind`
    ///
    /// On a marker mismatch only the marker byte has been consumed.
    pub fn decode_expect(
        &mut self,
        kind: AmfKind,
        buf: &mut Bytes,
    ) -> Result<AmfValue, AmfError> {
        let mut input = Input(buf);
        let found = input.u8()?;
        if found != kind.marker() {
            return Err(AmfError::TypeMismatch {
                expected: kind,
                found,
            });
        }
        self.read_payload(kind, &mut input, 1)
    }

    /// Decode values until the buffer is exhausted
    pub fn decode_all(&mut self, buf: &mut Bytes) -> Result<Vec<AmfValue>, AmfError> {
        let mut input = Input(buf);
        let mut out = Vec::new();
        while !input.is_empty() {
            out.push(self.read_value(&mut input, 1)?);
        }
        Ok(out)
    }

    fn read_value(&mut self, input: &mut Input<'_>, depth: usize) -> Result<AmfValue, AmfError> {
        let marker = input.u8()?;
        match AmfKind::from_marker(marker) {
            Some(kind) => self.read_payload(kind, input, depth),
            None if self.lenient => Ok(AmfValue::Undefined),
            None => Err(AmfError::UnknownMarker(marker)),
        }
    }

    fn read_payload(
        &mut self,
        kind: AmfKind,
        input: &mut Input<'_>,
        depth: usize,
    ) -> Result<AmfValue, AmfError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(AmfError::NestingTooDeep);
        }

        let value = match kind {
            AmfKind::Number => AmfValue::Number(input.f64()?),
            AmfKind::Boolean => AmfValue::Boolean(input.u8()? != 0),
            AmfKind::String => AmfValue::String(input.short_string()?),
            AmfKind::LongString => AmfValue::LongString(input.long_string()?),
            AmfKind::XmlDocument => AmfValue::Xml(input.long_string()?),
            AmfKind::Null => AmfValue::Null,
            AmfKind::Undefined | AmfKind::MovieClip | AmfKind::Unsupported | AmfKind::RecordSet => {
                AmfValue::Undefined
            }
            AmfKind::Date => {
                let millis = input.f64()?;
                // Time zone is reserved and ignored
                input.u16()?;
                AmfValue::Date(millis)
            }
            AmfKind::Reference => {
                let index = input.u16()?;
                return self
                    .references
                    .get(index as usize)
                    .cloned()
                    .ok_or(AmfError::InvalidReference(index));
            }
            AmfKind::Object => {
                let slot = self.reserve_slot();
                let props = self.read_properties(input, depth)?;
                return Ok(self.fill_slot(slot, AmfValue::Object(props)));
            }
            AmfKind::EcmaArray => {
                input.u32()?;
                let slot = self.reserve_slot();
                let props = self.read_properties(input, depth)?;
                return Ok(self.fill_slot(slot, AmfValue::EcmaArray(props)));
            }
            AmfKind::TypedObject => {
                let class_name = input.short_string()?;
                let slot = self.reserve_slot();
                let properties = self.read_properties(input, depth)?;
                let obj = AmfValue::TypedObject {
                    class_name,
                    properties,
                };
                return Ok(self.fill_slot(slot, obj));
            }
            AmfKind::StrictArray => {
                let count = input.u32()? as usize;
                let slot = self.reserve_slot();
                // The count is untrusted; let the vector grow as values arrive
                let mut items = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    items.push(self.read_value(input, depth + 1)?);
                }
                return Ok(self.fill_slot(slot, AmfValue::StrictArray(items)));
            }
            AmfKind::ObjectEnd => return Err(AmfError::InvalidObjectEnd),
            AmfKind::AvmPlus => return Err(AmfError::Amf3Unsupported),
        };
        Ok(value)
    }

    /// Complex values take their reference index before their children do
    fn reserve_slot(&mut self) -> usize {
        self.references.push(AmfValue::Undefined);
        self.references.len() - 1
    }

    fn fill_slot(&mut self, slot: usize, value: AmfValue) -> AmfValue {
        self.references[slot] = value.clone();
        value
    }

    /// Key/value pairs up to the empty key and end marker
    fn read_properties(
        &mut self,
        input: &mut Input<'_>,
        depth: usize,
    ) -> Result<AmfProperties, AmfError> {
        let mut props = AmfProperties::new();
        loop {
            let key = input.short_string()?;
            if !key.is_empty() {
                let value = self.read_value(input, depth + 1)?;
                props.insert(key, value);
                continue;
            }

            if self.lenient && input.is_empty() {
                return Ok(props);
            }
            let end = input.u8()?;
            if end != AmfKind::ObjectEnd.marker() && !self.lenient {
                return Err(AmfError::InvalidObjectEnd);
            }
            return Ok(props);
        }
    }
}

fn put_short_string(out: &mut BytesMut, s: &str) -> Result<(), AmfError> {
    // Object keys and class names have no long form
    let len = u16::try_from(s.len()).map_err(|_| AmfError::KeyTooLong(s.len()))?;
    out.put_u16(len);
    out.put_slice(s.as_bytes());
    Ok(())
}

fn put_long_string(out: &mut BytesMut, s: &str) {
    out.put_u32(s.len() as u32);
    out.put_slice(s.as_bytes());
}

fn put_properties(out: &mut BytesMut, props: &AmfProperties) -> Result<(), AmfError> {
    for (key, value) in props {
        // An empty key would read back as the end sentinel
        if key.is_empty() {
            return Err(AmfError::EmptyKey);
        }
        put_short_string(out, key)?;
        put_value(out, value)?;
    }
    out.put_slice(&[0x00, 0x00, AmfKind::ObjectEnd.marker()]);
    Ok(())
}

fn put_value(out: &mut BytesMut, value: &AmfValue) -> Result<(), AmfError> {
    let kind = value.kind();
    out.put_u8(kind.marker());

    match value {
        AmfValue::Number(n) => out.put_f64(*n),
        AmfValue::Boolean(b) => out.put_u8(u8::from(*b)),
        // kind() has already promoted oversized strings
        AmfValue::String(s) if kind == AmfKind::String => put_short_string(out, s)?,
        AmfValue::String(s) | AmfValue::LongString(s) | AmfValue::Xml(s) => {
            put_long_string(out, s)
        }
        AmfValue::Null | AmfValue::Undefined => {}
        AmfValue::Object(props) => put_properties(out, props)?,
        AmfValue::EcmaArray(props) => {
            out.put_u32(props.len() as u32);
            put_properties(out, props)?;
        }
        AmfValue::StrictArray(items) => {
            out.put_u32(items.len() as u32);
            for item in items {
                put_value(out, item)?;
            }
        }
        AmfValue::Date(millis) => {
            out.put_f64(*millis);
            out.put_i16(0);
        }
        AmfValue::TypedObject {
            class_name,
            properties,
        } => {
            put_short_string(out, class_name)?;
            put_properties(out, properties)?;
        }
    }
    Ok(())
}

/// AMF0 encoder accumulating values into one buffer
#[derive(Debug, Default)]
pub struct Amf0Encoder {
    out: BytesMut,
}

impl Amf0Encoder {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: BytesMut::with_capacity(capacity),
        }
    }

    /// Append one value
    ///
    /// On error nothing from this call is left in the buffer.
    pub fn encode(&mut self, value: &AmfValue) -> Result<(), AmfError> {
        self.encode_all(std::slice::from_ref(value))
    }

    /// Append values back to back, all or nothing
    pub fn encode_all(&mut self, values: &[AmfValue]) -> Result<(), AmfError> {
        let mark = self.out.len();
        let result = values.iter().try_for_each(|value| put_value(&mut self.out, value));
        if result.is_err() {
            self.out.truncate(mark);
        }
        result
    }

    /// Take the bytes encoded so far, leaving the encoder empty
    pub fn finish(&mut self) -> Bytes {
        self.out.split().freeze()
    }

    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }
}

/// Encode one value
pub fn encode(value: &AmfValue) -> Result<Bytes, AmfError> {
    encode_all(std::slice::from_ref(value))
}

/// Encode a sequence of values back to back
pub fn encode_all(values: &[AmfValue]) -> Result<Bytes, AmfError> {
    let mut encoder = Amf0Encoder::new();
    encoder.encode_all(values)?;
    Ok(encoder.finish())
}

/// Decode one value with a fresh strict decoder
pub fn decode(data: &[u8]) -> Result<AmfValue, AmfError> {
    Amf0Decoder::new().decode(&mut Bytes::copy_from_slice(data))
}

/// Decode every value in `data` with a fresh strict decoder
pub fn decode_all(data: &[u8]) -> Result<Vec<AmfValue>, AmfError> {
    Amf0Decoder::new().decode_all(&mut Bytes::copy_from_slice(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(value: &AmfValue) -> Bytes {
        encode(value).unwrap()
    }

    fn wire_all(values: &[AmfValue]) -> Bytes {
        encode_all(values).unwrap()
    }

    fn reencode(value: &AmfValue) -> AmfValue {
        decode(&wire(value)).unwrap()
    }

    fn meta() -> AmfValue {
        AmfValue::ecma_array([
            ("duration", AmfValue::from(0.0)),
            ("framerate", AmfValue::from(30.0)),
            ("videocodecid", AmfValue::from(7.0)),
            ("encoder", AmfValue::from("Lavf58.29.100")),
        ])
    }

    #[test]
    fn test_number_layout() {
        // 1.5 = 0x3FF8000000000000
        let encoded = wire(&AmfValue::Number(1.5));
        assert_eq!(&encoded[..], &[0x00, 0x3F, 0xF8, 0, 0, 0, 0, 0, 0]);

        for n in [-0.25, 1e300, f64::INFINITY, 25.0] {
            assert_eq!(reencode(&AmfValue::Number(n)), AmfValue::Number(n));
        }
        assert!(reencode(&AmfValue::Number(f64::NAN))
            .as_number()
            .is_some_and(f64::is_nan));
    }

    #[test]
    fn test_boolean_and_empty_kinds() {
        assert_eq!(&wire(&AmfValue::Boolean(true))[..], &[0x01, 0x01]);
        assert_eq!(&wire(&AmfValue::Null)[..], &[0x05]);
        assert_eq!(&wire(&AmfValue::Undefined)[..], &[0x06]);

        // Any non-zero byte is true
        assert_eq!(decode(&[0x01, 0x7F]), Ok(AmfValue::Boolean(true)));
        assert_eq!(decode(&[0x01, 0x00]), Ok(AmfValue::Boolean(false)));
    }

    #[test]
    fn test_date_drops_timezone() {
        let data = [0x0B, 0x42, 0x78, 0xBC, 0xFE, 0x56, 0x80, 0x00, 0x00, 0xFF, 0xC4];
        let value = decode(&data).unwrap();
        assert_eq!(value, AmfValue::Date(1_700_000_000_000.0));
        // Re-encoded with a zero time zone
        assert_eq!(&wire(&value)[9..], &[0x00, 0x00]);
    }

    #[test]
    fn test_string_prefix_widths() {
        let encoded = wire(&AmfValue::from("FCPublish"));
        assert_eq!(&encoded[..3], &[0x02, 0x00, 0x09]);
        assert_eq!(&encoded[3..], b"FCPublish");

        let boundary = AmfValue::String("a".repeat(0xFFFF));
        let encoded = wire(&boundary);
        assert_eq!(encoded[0], 0x02);
        assert_eq!(reencode(&boundary), boundary);

        let oversized = "b".repeat(0x1_0001);
        let encoded = wire(&AmfValue::String(oversized.clone()));
        assert_eq!(&encoded[..5], &[0x0C, 0x00, 0x01, 0x00, 0x01]);
        assert_eq!(decode(&encoded), Ok(AmfValue::LongString(oversized)));
    }

    #[test]
    fn test_long_string_and_xml() {
        let value = AmfValue::LongString("é".into());
        assert_eq!(&wire(&value)[..], &[0x0C, 0x00, 0x00, 0x00, 0x02, 0xC3, 0xA9]);
        assert_eq!(reencode(&value), value);

        let xml = AmfValue::Xml("<a/>".into());
        assert_eq!(wire(&xml)[0], 0x0F);
        assert_eq!(reencode(&xml), xml);
    }

    #[test]
    fn test_object_sentinel() {
        let obj = AmfValue::object([("level", AmfValue::from("status"))]);
        let encoded = wire(&obj);
        assert_eq!(encoded[0], 0x03);
        assert!(encoded.ends_with(&[0x00, 0x00, 0x09]));
        assert_eq!(reencode(&obj), obj);

        assert_eq!(&wire(&AmfValue::object::<&str, _>([]))[..], &[0x03, 0x00, 0x00, 0x09]);
    }

    #[test]
    fn test_ecma_array_count_is_a_hint() {
        let encoded = wire(&meta());
        assert_eq!(&encoded[..5], &[0x08, 0x00, 0x00, 0x00, 0x04]);

        // Wrong count on the wire still decodes every pair
        let mut patched = encoded.to_vec();
        patched[4] = 0x63;
        assert_eq!(decode(&patched), Ok(meta()));
    }

    #[test]
    fn test_strict_array_and_typed_object() {
        let arr = AmfValue::from(vec![AmfValue::Null, AmfValue::from(2.0), AmfValue::from("x")]);
        assert_eq!(&wire(&arr)[..5], &[0x0A, 0x00, 0x00, 0x00, 0x03]);
        assert_eq!(reencode(&arr), arr);

        let typed = AmfValue::TypedObject {
            class_name: "flex.messaging.io.ArrayCollection".into(),
            properties: AmfProperties::from([("source".to_string(), arr)]),
        };
        assert_eq!(reencode(&typed), typed);
    }

    #[test]
    fn test_nested_lookup() {
        let info = AmfValue::object([
            ("code", AmfValue::from("NetStream.Publish.Start")),
            ("data", AmfValue::object([("version", AmfValue::from("3,5,3,888"))])),
        ]);
        let decoded = reencode(&info);
        assert_eq!(
            decoded.get("data").and_then(|d| d.get_string("version")),
            Some("3,5,3,888")
        );
    }

    #[test]
    fn test_decode_expect() {
        let mut decoder = Amf0Decoder::new();

        let mut buf = wire_all(&[AmfValue::from("createStream"), AmfValue::from(4.0)]);
        assert_eq!(
            decoder.decode_expect(AmfKind::String, &mut buf),
            Ok(AmfValue::from("createStream"))
        );
        assert!(AmfKind::Number.is_next(&buf));

        // Mismatch consumes the marker and nothing else
        let err = decoder.decode_expect(AmfKind::Boolean, &mut buf).unwrap_err();
        assert_eq!(
            err,
            AmfError::TypeMismatch {
                expected: AmfKind::Boolean,
                found: 0x00
            }
        );
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn test_peek_kind() {
        let buf = wire(&meta());
        assert_eq!(peek_kind(&buf), Some(AmfKind::EcmaArray));
        assert_eq!(peek_kind(&buf), Some(AmfKind::EcmaArray));
        assert_eq!(peek_kind(&Bytes::from_static(&[0x12])), None);
        assert_eq!(peek_kind(&Bytes::new()), None);
    }

    #[test]
    fn test_script_body_sequence() {
        let values = [AmfValue::from("@setDataFrame"), AmfValue::from("onMetaData"), meta()];
        let decoded = decode_all(&wire_all(&values)).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[1].as_str(), Some("onMetaData"));
        assert_eq!(decoded[2].get_number("framerate"), Some(30.0));
        assert_eq!(decode_all(&[]), Ok(vec![]));
    }

    #[test]
    fn test_truncation_reports_sizes() {
        assert_eq!(
            decode(&[]),
            Err(AmfError::Truncated {
                needed: 1,
                remaining: 0
            })
        );
        assert_eq!(
            decode(&[0x00, 0x3F, 0xF8, 0x00]),
            Err(AmfError::Truncated {
                needed: 8,
                remaining: 3
            })
        );
        assert_eq!(
            decode(&[0x0C, 0x00, 0x00, 0x01, 0x00, b'x']),
            Err(AmfError::Truncated {
                needed: 256,
                remaining: 1
            })
        );
        // Object cut off before its sentinel
        assert!(matches!(
            decode(&[0x03, 0x00, 0x01, b'k', 0x05]),
            Err(AmfError::Truncated { .. })
        ));
    }

    #[test]
    fn test_bad_utf8() {
        assert_eq!(decode(&[0x02, 0x00, 0x01, 0xFF]), Err(AmfError::InvalidUtf8));
    }

    #[test]
    fn test_unknown_and_reserved_markers() {
        assert_eq!(decode(&[0x12]), Err(AmfError::UnknownMarker(0x12)));
        assert_eq!(decode(&[0x09]), Err(AmfError::InvalidObjectEnd));
        assert_eq!(decode(&[0x11]), Err(AmfError::Amf3Unsupported));
        for reserved in [0x04, 0x0D, 0x0E] {
            assert_eq!(decode(&[reserved]), Ok(AmfValue::Undefined));
        }

        let mut lenient = Amf0Decoder::with_lenient(true);
        let mut buf = Bytes::from_static(&[0x12, 0x05]);
        assert_eq!(lenient.decode_all(&mut buf), Ok(vec![AmfValue::Undefined, AmfValue::Null]));
    }

    #[test]
    fn test_object_end_handling() {
        // Empty key followed by a byte other than 0x09
        let bad_end = [0x03, 0x00, 0x00, 0x05];
        assert_eq!(decode(&bad_end), Err(AmfError::InvalidObjectEnd));

        // Sentinel missing entirely
        let unterminated = [0x03, 0x00, 0x01, b'k', 0x05, 0x00, 0x00];
        assert!(decode(&unterminated).is_err());

        let mut lenient = Amf0Decoder::with_lenient(true);
        let mut buf = Bytes::copy_from_slice(&unterminated);
        assert_eq!(lenient.decode(&mut buf).unwrap().get("k"), Some(&AmfValue::Null));
    }

    #[test]
    fn test_references() {
        let first = AmfValue::object([("n", AmfValue::from(1.0))]);
        let second = AmfValue::from(vec![AmfValue::from(true)]);

        let mut data = wire_all(&[first.clone(), second.clone()]).to_vec();
        data.extend_from_slice(&[0x07, 0x00, 0x01, 0x07, 0x00, 0x00]);
        assert_eq!(decode_all(&data), Ok(vec![first.clone(), second.clone(), second, first]));

        assert_eq!(decode(&[0x07, 0x00, 0x00]), Err(AmfError::InvalidReference(0)));
        assert!(matches!(decode(&[0x07, 0x00]), Err(AmfError::Truncated { .. })));
    }

    #[test]
    fn test_reset_forgets_references() {
        let mut decoder = Amf0Decoder::default();
        let mut buf = wire(&AmfValue::object::<&str, _>([]));
        decoder.decode(&mut buf).unwrap();

        let mut reference = Bytes::from_static(&[0x07, 0x00, 0x00]);
        assert!(decoder.decode(&mut reference.clone()).is_ok());

        decoder.reset();
        assert_eq!(decoder.decode(&mut reference), Err(AmfError::InvalidReference(0)));
    }

    #[test]
    fn test_depth_limit() {
        let mut value = AmfValue::Null;
        for _ in 0..MAX_NESTING_DEPTH {
            value = AmfValue::from(vec![value]);
        }
        // 64 arrays plus the innermost null
        assert_eq!(decode(&wire(&value)), Err(AmfError::NestingTooDeep));

        let mut shallow = AmfValue::Null;
        for _ in 0..MAX_NESTING_DEPTH - 1 {
            shallow = AmfValue::from(vec![shallow]);
        }
        assert!(decode(&wire(&shallow)).is_ok());
    }

    #[test]
    fn test_encoder_buffer() {
        let mut encoder = Amf0Encoder::with_capacity(8);
        assert!(encoder.is_empty());
        assert_eq!(encoder.encode_all(&[AmfValue::Null, AmfValue::Boolean(false)]), Ok(()));
        assert_eq!(encoder.len(), 3);
        assert_eq!(&encoder.finish()[..], &[0x05, 0x01, 0x00]);
        assert_eq!(encoder.len(), 0);
    }

    #[test]
    fn test_roundtrip_every_variant() {
        let cases = [
            AmfValue::Number(0.0),
            AmfValue::Number(-0.0),
            AmfValue::Number(f64::MAX),
            AmfValue::Number(f64::MIN),
            AmfValue::Number(f64::MIN_POSITIVE),
            AmfValue::Number(f64::NEG_INFINITY),
            AmfValue::Boolean(true),
            AmfValue::Boolean(false),
            AmfValue::String(String::new()),
            AmfValue::String("x".repeat(0xFFFF)),
            AmfValue::String("日本語".into()),
            AmfValue::LongString(String::new()),
            AmfValue::LongString("y".repeat(0x1_0000)),
            AmfValue::Null,
            AmfValue::Undefined,
            AmfValue::object::<&str, _>([]),
            AmfValue::ecma_array::<&str, _>([]),
            AmfValue::StrictArray(Vec::new()),
            AmfValue::Date(0.0),
            AmfValue::Date(-86_400_000.0),
            AmfValue::Xml(String::new()),
            AmfValue::TypedObject {
                class_name: String::new(),
                properties: AmfProperties::new(),
            },
            meta(),
        ];
        for value in cases {
            let back = reencode(&value);
            assert_eq!(back, value);
            assert_eq!(back.kind(), value.kind());
        }

        // -0.0 == 0.0, so check the sign bit survives too
        let zero = reencode(&AmfValue::Number(-0.0));
        assert!(zero.as_number().is_some_and(f64::is_sign_negative));
    }

    #[test]
    fn test_oversized_key_refused() {
        let key = "k".repeat(0x1_0005);
        let obj = AmfValue::object([(key.clone(), AmfValue::Null)]);
        assert_eq!(encode(&obj), Err(AmfError::KeyTooLong(0x1_0005)));

        let typed = AmfValue::TypedObject {
            class_name: key,
            properties: AmfProperties::new(),
        };
        assert_eq!(encode(&typed), Err(AmfError::KeyTooLong(0x1_0005)));

        assert_eq!(
            encode(&AmfValue::ecma_array([("", AmfValue::Null)])),
            Err(AmfError::EmptyKey)
        );

        // Longest legal key still round-trips
        let widest = AmfValue::object([("k".repeat(0xFFFF), AmfValue::from(1.0))]);
        assert_eq!(reencode(&widest), widest);
    }

    #[test]
    fn test_failed_encode_leaves_buffer_untouched() {
        let mut encoder = Amf0Encoder::new();
        assert_eq!(encoder.encode(&AmfValue::Null), Ok(()));

        let nested = AmfValue::from(vec![
            AmfValue::from(1.0),
            AmfValue::object([("z".repeat(0x1_0000), AmfValue::Null)]),
        ]);
        assert_eq!(
            encoder.encode_all(&[AmfValue::from(true), nested]),
            Err(AmfError::KeyTooLong(0x1_0000))
        );
        assert_eq!(&encoder.finish()[..], &[0x05]);
    }
}

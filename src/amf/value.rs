//! AMF0 value types
//!
//! [`AmfValue`] is the closed set of values that travel over the control
//! plane. [`AmfKind`] names the wire kind of each value and owns its marker
//! byte, so every legal marker maps to exactly one kind.

use std::collections::HashMap;

use bytes::Bytes;

/// Property map of objects, ECMA arrays and typed objects
pub type AmfProperties = HashMap<String, AmfValue>;

/// AMF0 wire kind; the discriminant is the marker byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AmfKind {
    Number = 0x00,
    Boolean = 0x01,
    String = 0x02,
    Object = 0x03,
    /// Reserved
    MovieClip = 0x04,
    Null = 0x05,
    Undefined = 0x06,
    Reference = 0x07,
    EcmaArray = 0x08,
    ObjectEnd = 0x09,
    StrictArray = 0x0A,
    Date = 0x0B,
    LongString = 0x0C,
    Unsupported = 0x0D,
    /// Reserved
    RecordSet = 0x0E,
    XmlDocument = 0x0F,
    TypedObject = 0x10,
    /// Switch to AMF3
    AvmPlus = 0x11,
}

/// Kinds in marker order
const KINDS: [AmfKind; 18] = [
    AmfKind::Number,
    AmfKind::Boolean,
    AmfKind::String,
    AmfKind::Object,
    AmfKind::MovieClip,
    AmfKind::Null,
    AmfKind::Undefined,
    AmfKind::Reference,
    AmfKind::EcmaArray,
    AmfKind::ObjectEnd,
    AmfKind::StrictArray,
    AmfKind::Date,
    AmfKind::LongString,
    AmfKind::Unsupported,
    AmfKind::RecordSet,
    AmfKind::XmlDocument,
    AmfKind::TypedObject,
    AmfKind::AvmPlus,
];

impl AmfKind {
    /// Marker byte written before this kind's payload
    pub const fn marker(self) -> u8 {
        self as u8
    }

    pub fn from_marker(marker: u8) -> Option<Self> {
        KINDS.get(marker as usize).copied()
    }

    /// Whether the next value in `buf` is of this kind, without consuming it
    pub fn is_next(self, buf: &Bytes) -> bool {
        buf.first() == Some(&self.marker())
    }
}

/// A decoded AMF0 value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AmfValue {
    Number(f64),
    Boolean(bool),
    /// Encoded as `LongString` once it outgrows the 16-bit length prefix,
    /// so such a value decodes back as [`AmfValue::LongString`]
    String(String),
    Object(AmfProperties),
    #[default]
    Null,
    Undefined,
    /// Associative array; the wire count is only a hint
    EcmaArray(AmfProperties),
    StrictArray(Vec<AmfValue>),
    /// Milliseconds since the Unix epoch; the time zone field is dropped
    Date(f64),
    LongString(String),
    Xml(String),
    TypedObject {
        class_name: String,
        properties: AmfProperties,
    },
}

fn collect_properties<K, I>(pairs: I) -> AmfProperties
where
    K: Into<String>,
    I: IntoIterator<Item = (K, AmfValue)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

impl AmfValue {
    /// Build an anonymous object from key/value pairs
    pub fn object<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AmfValue)>,
    {
        AmfValue::Object(collect_properties(pairs))
    }

    /// Build an ECMA array from key/value pairs, as used by onMetaData
    pub fn ecma_array<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AmfValue)>,
    {
        AmfValue::EcmaArray(collect_properties(pairs))
    }

    /// Wire kind this value encodes as
    pub fn kind(&self) -> AmfKind {
        match self {
            AmfValue::Number(_) => AmfKind::Number,
            AmfValue::Boolean(_) => AmfKind::Boolean,
            AmfValue::String(s) if s.len() > u16::MAX as usize => AmfKind::LongString,
            AmfValue::String(_) => AmfKind::String,
            AmfValue::Object(_) => AmfKind::Object,
            AmfValue::Null => AmfKind::Null,
            AmfValue::Undefined => AmfKind::Undefined,
            AmfValue::EcmaArray(_) => AmfKind::EcmaArray,
            AmfValue::StrictArray(_) => AmfKind::StrictArray,
            AmfValue::Date(_) => AmfKind::Date,
            AmfValue::LongString(_) => AmfKind::LongString,
            AmfValue::Xml(_) => AmfKind::XmlDocument,
            AmfValue::TypedObject { .. } => AmfKind::TypedObject,
        }
    }

    /// Text of a `String` or `LongString`
    pub fn as_str(&self) -> Option<&str> {
        if let AmfValue::String(s) | AmfValue::LongString(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        if let AmfValue::Number(n) = *self {
            Some(n)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let AmfValue::Boolean(b) = *self {
            Some(b)
        } else {
            None
        }
    }

    /// Properties of any map-shaped value
    pub fn properties(&self) -> Option<&AmfProperties> {
        match self {
            AmfValue::Object(props)
            | AmfValue::EcmaArray(props)
            | AmfValue::TypedObject {
                properties: props, ..
            } => Some(props),
            _ => None,
        }
    }

    pub fn elements(&self) -> Option<&[AmfValue]> {
        if let AmfValue::StrictArray(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Null and Undefined both mean "no value"
    pub fn is_null(&self) -> bool {
        matches!(self, AmfValue::Null | AmfValue::Undefined)
    }

    /// Property lookup on map-shaped values
    pub fn get(&self, key: &str) -> Option<&AmfValue> {
        self.properties().and_then(|props| props.get(key))
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AmfValue::as_str)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AmfValue::as_number)
    }
}

macro_rules! amf_from {
    ($($ty:ty => |$v:ident| $conv:expr;)+) => {
        $(
            impl From<$ty> for AmfValue {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )+
    };
}

amf_from! {
    bool => |v| AmfValue::Boolean(v);
    f64 => |v| AmfValue::Number(v);
    u32 => |v| AmfValue::Number(f64::from(v));
    String => |v| AmfValue::String(v);
    &str => |v| AmfValue::String(v.to_owned());
}

impl<V: Into<AmfValue>> From<Vec<V>> for AmfValue {
    fn from(items: Vec<V>) -> Self {
        AmfValue::StrictArray(items.into_iter().map(Into::into).collect())
    }
}

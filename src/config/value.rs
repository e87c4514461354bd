//! Typed item values and the flag kinds they map to

use serde::Serialize;

/// A configuration value of one of the supported kinds.
///
/// Used for item defaults and for values picked up from the environment or the
/// command line. Every variant except `Structured` can be bound to a flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemValue {
    Str(String),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint(u64),
    Bool(bool),
    StrList(Vec<String>),
    /// Arbitrary structured record, registered as a default only.
    Structured(serde_json::Value),
}

/// Flag type registered for an item, derived from its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Str,
    Int8,
    Int16,
    Int32,
    Int,
    Uint8,
    Uint16,
    Uint32,
    Uint,
    Bool,
    StrList,
}

impl ItemValue {
    /// Wrap any serializable record as a structured default.
    pub fn structured<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Structured)
    }

    /// The flag kind for this value, or `None` when it cannot become a flag.
    pub fn flag_kind(&self) -> Option<FlagKind> {
        let kind = match self {
            Self::Str(_) => FlagKind::Str,
            Self::Int8(_) => FlagKind::Int8,
            Self::Int16(_) => FlagKind::Int16,
            Self::Int32(_) => FlagKind::Int32,
            Self::Int(_) => FlagKind::Int,
            Self::Uint8(_) => FlagKind::Uint8,
            Self::Uint16(_) => FlagKind::Uint16,
            Self::Uint32(_) => FlagKind::Uint32,
            Self::Uint(_) => FlagKind::Uint,
            Self::Bool(_) => FlagKind::Bool,
            Self::StrList(_) => FlagKind::StrList,
            Self::Structured(_) => return None,
        };
        Some(kind)
    }

    /// Coerce a raw environment string into a value shaped like `self`.
    ///
    /// Strings that do not parse as the expected kind are kept verbatim, so a
    /// typed read or the item's validator reports the mismatch.
    pub fn coerce_like(&self, raw: &str) -> ItemValue {
        let Some(kind) = self.flag_kind() else {
            return serde_json::from_str(raw)
                .map(ItemValue::Structured)
                .unwrap_or_else(|_| ItemValue::Str(raw.to_string()));
        };
        kind.parse(raw).unwrap_or_else(|| ItemValue::Str(raw.to_string()))
    }
}

impl FlagKind {
    /// Parse a raw string into a value of this kind.
    ///
    /// Lists are whitespace separated, booleans accept `true/false/1/0`.
    pub fn parse(self, raw: &str) -> Option<ItemValue> {
        let trimmed = raw.trim();
        let value = match self {
            Self::Str => ItemValue::Str(raw.to_string()),
            Self::Int8 => ItemValue::Int8(trimmed.parse().ok()?),
            Self::Int16 => ItemValue::Int16(trimmed.parse().ok()?),
            Self::Int32 => ItemValue::Int32(trimmed.parse().ok()?),
            Self::Int => ItemValue::Int(trimmed.parse().ok()?),
            Self::Uint8 => ItemValue::Uint8(trimmed.parse().ok()?),
            Self::Uint16 => ItemValue::Uint16(trimmed.parse().ok()?),
            Self::Uint32 => ItemValue::Uint32(trimmed.parse().ok()?),
            Self::Uint => ItemValue::Uint(trimmed.parse().ok()?),
            Self::Bool => ItemValue::Bool(parse_bool(trimmed)?),
            Self::StrList => {
                ItemValue::StrList(raw.split_whitespace().map(str::to_string).collect())
            }
        };
        Some(value)
    }

    /// Neutral default registered with the flag parser, rendered as text.
    ///
    /// `None` for lists: an absent list flag already means "no values".
    pub fn neutral_default(self) -> Option<&'static str> {
        match self {
            Self::Str => Some(""),
            Self::Bool => Some("false"),
            Self::StrList => None,
            Self::Int8
            | Self::Int16
            | Self::Int32
            | Self::Int
            | Self::Uint8
            | Self::Uint16
            | Self::Uint32
            | Self::Uint => Some("0"),
        }
    }
}

/// Same words clap's `BoolishValueParser` accepts for boolean flags.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<bool> for ItemValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ItemValue {
    fn from(value: Vec<String>) -> Self {
        Self::StrList(value)
    }
}

impl From<Vec<&str>> for ItemValue {
    fn from(value: Vec<&str>) -> Self {
        Self::StrList(value.into_iter().map(str::to_string).collect())
    }
}

impl From<serde_json::Value> for ItemValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ItemValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_int!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint,
);

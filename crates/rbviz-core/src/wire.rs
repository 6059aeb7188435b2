//! Nested wire records and their JSON text form.
//!
//! A snapshot is a single JSON object:
//!
//! ```text
//! {"title":"...","selectedNode":3,"tree":{"c":false,"l":{...},"r":{...}}}
//! ```
//!
//! Node records use one- or two-letter keys:
//!
//! | key  | meaning                                              |
//! |------|------------------------------------------------------|
//! | `c`  | color flag (`true` = red), required                  |
//! | `d`  | debug text                                           |
//! | `e`  | per-node validation error                            |
//! | `se` | whole-subtree validation error (root only)           |
//! | `p`  | parent divergence: rank, `-1` (outside), or `null`   |
//! | `l`  | left: nested record (canonical) or rank (divergent)  |
//! | `r`  | right: nested record (canonical) or rank (divergent) |
//!
//! Keys are written in the order above, so equal trees always produce
//! identical text.

use serde::de::{self, value::MapAccessDeserializer, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::ser::CharEscape;
use std::{fmt, io};

use crate::error::{Result, WireError};

/// Remaining stack below which a nested record is written on a fresh segment.
const RED_ZONE: usize = 64 * 1024;

/// Size of each extra stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

/// The root object of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Rank of the node to highlight initially.
    #[serde(rename = "selectedNode", default, skip_serializing_if = "Option::is_none")]
    pub selected_node: Option<i64>,

    /// The canonical tree. Required, but may be `null` for an empty tree.
    #[serde(deserialize_with = "required_nullable")]
    pub tree: Option<WireNode>,
}

/// The serialized form of one canonical node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    #[serde(rename = "c")]
    pub is_red: bool,

    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,

    #[serde(rename = "e", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "se", default, skip_serializing_if = "Option::is_none")]
    pub subtree_error: Option<String>,

    /// `None` omits the key; `Some(None)` is an explicit `null`.
    #[serde(
        rename = "p",
        default,
        deserialize_with = "present_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<Option<i64>>,

    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    pub left: Option<WireChild>,

    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub right: Option<WireChild>,
}

impl WireNode {
    /// A record carrying only a color.
    pub fn new(is_red: bool) -> Self {
        Self {
            is_red,
            debug: None,
            error: None,
            subtree_error: None,
            parent: None,
            left: None,
            right: None,
        }
    }

    /// Move nested child records into `into`, leaving rank references in place.
    fn take_nested(&mut self, into: &mut Vec<Box<WireNode>>) {
        for slot in [&mut self.left, &mut self.right] {
            if matches!(slot, Some(WireChild::Node(_))) {
                if let Some(WireChild::Node(child)) = slot.take() {
                    into.push(child);
                }
            }
        }
    }
}

// Frees nested records from a heap stack instead of recursing per level.
impl Drop for WireNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_nested(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.take_nested(&mut pending);
        }
    }
}

/// A child slot: a nested canonical child, or a rank reference for a divergent pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum WireChild {
    Ref(i64),
    Node(Box<WireNode>),
}

impl Serialize for WireChild {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            WireChild::Ref(rank) => serializer.serialize_i64(*rank),
            WireChild::Node(node) => {
                stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || node.serialize(serializer))
            }
        }
    }
}

impl<'de> Deserialize<'de> for WireChild {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ChildVisitor)
    }
}

/// Dispatches on the JSON value kind; nested records stream straight into
/// [`WireNode`].
struct ChildVisitor;

impl<'de> Visitor<'de> for ChildVisitor {
    type Value = WireChild;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a node record or an integer rank")
    }

    fn visit_i64<E: de::Error>(self, rank: i64) -> std::result::Result<WireChild, E> {
        Ok(WireChild::Ref(rank))
    }

    fn visit_u64<E: de::Error>(self, rank: u64) -> std::result::Result<WireChild, E> {
        // Too large for any tree; the decoder reads it as outside
        Ok(WireChild::Ref(i64::try_from(rank).unwrap_or(i64::MAX)))
    }

    fn visit_map<A>(self, map: A) -> std::result::Result<WireChild, A::Error>
    where
        A: MapAccess<'de>,
    {
        let node = WireNode::deserialize(MapAccessDeserializer::new(map))?;
        Ok(WireChild::Node(Box::new(node)))
    }
}

/// Deserialize a field that must be present but may be `null`.
fn required_nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Distinguish an explicit `null` from a missing key.
fn present_nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Encode a snapshot to compact JSON text.
///
/// With `escape_non_ascii`, every character outside printable ASCII is
/// written as a `\uXXXX` escape (UTF-16 surrogate pairs above the BMP), so
/// the text can be embedded anywhere that only tolerates ASCII.
pub fn to_json(document: &WireDocument, escape_non_ascii: bool) -> Result<String> {
    if !escape_non_ascii {
        return Ok(serde_json::to_string(document)?);
    }

    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    document.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| WireError::Encoding(e.to_string()))
}

/// Parse JSON text into a snapshot.
///
/// Fails on anything that is not well-formed JSON of the snapshot shape.
/// Semantic anomalies (sentinels, dangling ranks, error strings) are kept
/// as data for the decoder to interpret.
pub fn from_json(text: &str) -> Result<WireDocument> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    // Degenerate trees can nest far deeper than serde_json's default limit,
    // so the parser grows its stack instead
    deserializer.disable_recursion_limit();
    let stacked = serde_stacker::Deserializer::new(&mut deserializer);
    let document = WireDocument::deserialize(stacked)?;
    deserializer.end()?;
    Ok(document)
}

/// Compact JSON formatter that escapes everything outside printable ASCII.
///
/// Only `"` and `\` keep their short escapes; every other escaped
/// character, control characters included, is written as `\uXXXX`.
struct AsciiFormatter;

impl serde_json::ser::Formatter for AsciiFormatter {
    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let byte = match char_escape {
            CharEscape::Quote => return writer.write_all(b"\\\""),
            CharEscape::ReverseSolidus => return writer.write_all(b"\\\\"),
            CharEscape::Solidus => b'/',
            CharEscape::Backspace => 0x08,
            CharEscape::FormFeed => 0x0c,
            CharEscape::LineFeed => b'\n',
            CharEscape::CarriageReturn => b'\r',
            CharEscape::Tab => b'\t',
            CharEscape::AsciiControl(byte) => byte,
        };
        write!(writer, "\\u{:04x}", byte)
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

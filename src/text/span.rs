use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use super::cut::{cut, Cut, Pieces};
use crate::arena::{Arena, Block};
use crate::constants::{is_blank_byte, FIELD_DELIMITER, LINE_BREAK};
use crate::Result;

/// Borrowed view over bytes owned by an input buffer or an arena.
///
/// Equality is byte-wise. An empty span is a valid value; absence is
/// expressed as `Option<Str>`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Str<'a> {
    bytes: &'a [u8],
}

impl<'a> Str<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// `source[begin..end]`, or an empty span when the range is invalid.
    pub fn span(source: &'a [u8], begin: usize, end: usize) -> Self {
        Self::new(source.get(begin..end).unwrap_or(&[]))
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drops leading bytes `<= b' '`.
    pub fn trim_left(self) -> Self {
        let start = self
            .bytes
            .iter()
            .position(|&byte| !is_blank_byte(byte))
            .unwrap_or(self.bytes.len());
        Self::new(&self.bytes[start..])
    }

    /// Drops trailing bytes `<= b' '`.
    pub fn trim_right(self) -> Self {
        let end = self
            .bytes
            .iter()
            .rposition(|&byte| !is_blank_byte(byte))
            .map_or(0, |idx| idx + 1);
        Self::new(&self.bytes[..end])
    }

    pub fn trim(self) -> Self {
        self.trim_left().trim_right()
    }

    pub fn substring(self, offset: usize) -> Self {
        Self::new(self.bytes.get(offset..).unwrap_or(&[]))
    }

    pub fn cut(self, delimiter: u8) -> Cut<'a> {
        cut(self, delimiter)
    }

    pub fn split_quoted(self, delimiter: u8) -> Pieces<'a> {
        Pieces::new(self, delimiter)
    }

    pub fn lines(self) -> Pieces<'a> {
        self.split_quoted(LINE_BREAK)
    }

    pub fn fields(self) -> Pieces<'a> {
        self.split_quoted(FIELD_DELIMITER)
    }

    pub fn to_str_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Copies the span into `arena` with a trailing NUL byte.
    pub fn to_owned_cstring(self, arena: &mut Arena) -> Result<Block> {
        arena.alloc_cstr(self.bytes)
    }
}

impl<'a> From<&'a str> for Str<'a> {
    fn from(value: &'a str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Str<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Str<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for Str<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl fmt::Debug for Str<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}

impl fmt::Display for Str<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl Serialize for Str<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_str_lossy())
    }
}

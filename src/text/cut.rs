use std::iter::FusedIterator;

use memchr::memchr2;

use super::Str;
use crate::constants::QUOTE;

/// Result of splitting a span at its first unquoted delimiter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cut<'a> {
    pub head: Str<'a>,
    pub tail: Str<'a>,
    /// `false` when no unquoted delimiter was found; `head` is then the whole
    /// input and `tail` is empty.
    pub ok: bool,
}

/// Splits `s` at the first `delimiter` that is not inside double quotes.
///
/// Every `"` toggles the quoted state; an unterminated quote keeps the rest of
/// the input quoted.
pub fn cut(s: Str<'_>, delimiter: u8) -> Cut<'_> {
    let bytes = s.as_bytes();
    let mut quoted = false;
    let mut pos = 0;
    while let Some(found) = memchr2(delimiter, QUOTE, &bytes[pos..]) {
        let idx = pos + found;
        if bytes[idx] == QUOTE {
            quoted = !quoted;
        } else if !quoted {
            return Cut {
                head: Str::new(&bytes[..idx]),
                tail: Str::new(&bytes[idx + 1..]),
                ok: true,
            };
        }
        pos = idx + 1;
    }
    Cut {
        head: s,
        tail: Str::default(),
        ok: false,
    }
}

/// Repeated [`cut`] while the remaining tail is non-empty.
///
/// A trailing delimiter therefore yields no trailing empty piece, while
/// interior empty pieces are kept.
#[derive(Debug, Clone)]
pub struct Pieces<'a> {
    rest: Str<'a>,
    delimiter: u8,
}

impl<'a> Pieces<'a> {
    pub fn new(s: Str<'a>, delimiter: u8) -> Self {
        Self { rest: s, delimiter }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Str<'a>;

    fn next(&mut self) -> Option<Str<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let Cut { head, tail, .. } = cut(self.rest, self.delimiter);
        self.rest = tail;
        Some(head)
    }
}

impl FusedIterator for Pieces<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pieces(input: &str, delimiter: u8) -> Vec<String> {
        Str::from(input)
            .split_quoted(delimiter)
            .map(|piece| piece.to_string())
            .collect()
    }

    #[rstest::rstest]
    fn test_cut_simple() {
        let c = cut(Str::from("a,b,c"), b',');
        assert!(c.ok);
        assert_eq!(c.head, "a");
        assert_eq!(c.tail, "b,c");
    }

    #[rstest::rstest]
    fn test_cut_without_delimiter() {
        let c = cut(Str::from("abc"), b',');
        assert!(!c.ok);
        assert_eq!(c.head, "abc");
        assert!(c.tail.is_empty());
    }

    #[rstest::rstest]
    fn test_cut_empty_input() {
        let c = cut(Str::default(), b',');
        assert!(!c.ok);
        assert!(c.head.is_empty());
        assert!(c.tail.is_empty());
    }

    #[rstest::rstest]
    fn test_cut_skips_quoted_delimiter() {
        let c = cut(Str::from("\"b,c\",d"), b',');
        assert!(c.ok);
        assert_eq!(c.head, "\"b,c\"");
        assert_eq!(c.tail, "d");
    }

    #[rstest::rstest]
    fn test_cut_delimiter_at_end() {
        let c = cut(Str::from("a,"), b',');
        assert!(c.ok);
        assert_eq!(c.head, "a");
        assert!(c.tail.is_empty());
    }

    #[rstest::rstest]
    #[case("a,b,c", &["a", "b", "c"])]
    #[case("a,\"b,c\",d", &["a", "\"b,c\"", "d"])]
    #[case("a,,b", &["a", "", "b"])]
    #[case(",a", &["", "a"])]
    #[case("a,b,", &["a", "b"])]
    #[case("", &[])]
    #[case("\"x,\"\"y\"\",z\",w", &["\"x,\"\"y\"\",z\"", "w"])]
    fn test_split_fields(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(pieces(input, b','), expected);
    }

    #[rstest::rstest]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(pieces("a,\"b,c,d", b','), ["a", "\"b,c,d"]);
    }

    #[rstest::rstest]
    fn test_quoted_line_break_is_not_a_row_split() {
        let rows = pieces("x,\"two\nlines\"\ny", b'\n');
        assert_eq!(rows, ["x,\"two\nlines\"", "y"]);
    }

    #[rstest::rstest]
    fn test_quote_delimiter_never_splits() {
        let c = cut(Str::from("a\"b\"c"), b'"');
        assert!(!c.ok);
    }
}

//! SIMD-accelerated HTML scanning using memchr
//!
//! Uses memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)

use memchr::{memchr, memchr2, memmem};

/// Byte cursor over the source text used by the lexer
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advance by n bytes, clamped to the end of input
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Advance to the end of input
    #[inline]
    pub fn advance_to_end(&mut self) {
        self.pos = self.input.len();
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.input[self.pos..].starts_with(needle)
    }

    /// Skip whitespace characters, returning how many bytes were skipped
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while self.pos < self.input.len() && is_whitespace(self.input[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Find next '<' or '&' (text content boundaries)
    #[inline]
    pub fn find_text_boundary(&self) -> Option<usize> {
        memchr2(b'<', b'&', &self.input[self.pos..]).map(|i| self.pos + i)
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, &self.input[self.pos..]).map(|i| self.pos + i)
    }

    /// Find next occurrence of a byte sequence
    #[inline]
    pub fn find_bytes(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(&self.input[self.pos..], needle).map(|i| self.pos + i)
    }

    /// Find the next `</name` (ASCII case-insensitive), used to end raw text
    /// elements such as `<script>`.
    pub fn find_end_tag(&self, name: &[u8]) -> Option<usize> {
        let mut from = self.pos;
        while let Some(rel) = memmem::find(&self.input[from..], b"</") {
            let at = from + rel;
            let name_end = at + 2 + name.len();
            if let Some(candidate) = self.input.get(at + 2..name_end) {
                let terminated = self
                    .input
                    .get(name_end)
                    .is_none_or(|&b| b == b'>' || b == b'/' || is_whitespace(b));
                if candidate.eq_ignore_ascii_case(name) && terminated {
                    return Some(at);
                }
            }
            from = at + 2;
        }
        None
    }

    /// Read a tag or attribute name, advancing past it.
    pub fn read_name(&mut self) -> Option<(usize, usize)> {
        let start = self.pos;
        if !self.peek().is_some_and(is_name_start_char) {
            return None;
        }
        self.pos += 1;
        while self.pos < self.input.len() && is_name_char(self.input[self.pos]) {
            self.pos += 1;
        }
        Some((start, self.pos))
    }

    /// Advance while `pred` holds, returning the consumed range.
    pub fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> (usize, usize) {
        let start = self.pos;
        while self.pos < self.input.len() && pred(self.input[self.pos]) {
            self.pos += 1;
        }
        (start, self.pos)
    }
}

/// HTML whitespace (space, tab, newline, form feed, carriage return)
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

/// Check if byte can start a tag name.
/// Allows ASCII letters and non-ASCII (UTF-8 Unicode)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

/// Check if byte can continue a tag or attribute name
#[inline]
pub fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':') || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_text_boundary() {
        let scanner = Scanner::new("hello &amp; <world>");
        assert_eq!(scanner.find_text_boundary(), Some(6));
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new("element-name>");
        assert_eq!(scanner.read_name(), Some((0, 12)));
        assert_eq!(scanner.position(), 12);
        assert_eq!(Scanner::new("1abc").read_name(), None);
    }

    #[test]
    fn test_find_end_tag() {
        let scanner = Scanner::new("if (a </b) x; </SCRIPT >");
        assert_eq!(scanner.find_end_tag(b"script"), Some(14));
        assert_eq!(Scanner::new("</scripts>").find_end_tag(b"script"), None);
    }

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = Scanner::new("  \t\n hello");
        assert_eq!(scanner.skip_whitespace(), 5);
        assert_eq!(scanner.position(), 5);
    }
}

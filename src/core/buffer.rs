//! Input text buffer
//!
//! The buffer is a stack of chunks. The bottom chunk is the formula itself;
//! every macro expansion pushes a new chunk on top, so splicing costs the
//! same regardless of how much input remains. Reading always takes from the
//! top chunk, and exhausted expansion chunks are dropped as reading passes
//! their end.

use crate::utils::error::{ErrorKind, ParseResult, TexError};

#[derive(Debug)]
struct Chunk {
    text: String,
    pos: usize,
}

impl Chunk {
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn is_exhausted(&self) -> bool {
        self.pos >= self.text.len()
    }
}

#[derive(Debug)]
pub struct TextBuffer {
    chunks: Vec<Chunk>,
    /// Unread bytes in expansion chunks
    pending: usize,
    max_buffer: usize,
}

impl TextBuffer {
    pub fn new(text: &str, max_buffer: usize) -> Self {
        TextBuffer {
            chunks: vec![Chunk {
                text: text.to_string(),
                pos: 0,
            }],
            pending: 0,
            max_buffer,
        }
    }

    /// The original text
    pub fn source(&self) -> &str {
        &self.chunks[0].text
    }

    /// Byte offset reached in the original text
    pub fn position(&self) -> usize {
        self.chunks[0].pos
    }

    /// Whether reading currently takes from expanded text
    pub fn in_expansion(&self) -> bool {
        self.chunks.len() > 1
    }

    pub fn peek(&self) -> Option<char> {
        self.chunks.last().and_then(|c| c.rest().chars().next())
    }

    /// Character `n` positions ahead, looking across chunk boundaries
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        let mut remaining = n;
        for chunk in self.chunks.iter().rev() {
            if let Some(c) = chunk.rest().chars().nth(remaining) {
                return Some(c);
            }
            // the chunk is shorter than `remaining`
            remaining -= chunk.rest().chars().count();
        }
        None
    }

    /// Whether the unread input starts with `text`
    pub fn starts_with(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(i, c)| self.peek_nth(i) == Some(c))
    }

    /// Consume `text` if the input starts with it
    pub fn eat(&mut self, text: &str) -> bool {
        if !self.starts_with(text) {
            return false;
        }
        for _ in text.chars() {
            self.next_char();
        }
        true
    }

    pub fn next_char(&mut self) -> Option<char> {
        let top = self.chunks.len() - 1;
        let c = self.chunks[top].rest().chars().next()?;
        self.chunks[top].pos += c.len_utf8();
        if top > 0 {
            self.pending -= c.len_utf8();
        }
        self.drop_exhausted();
        Some(c)
    }

    /// Unread text of the top chunk
    pub fn rest_of_chunk(&self) -> &str {
        self.chunks.last().map_or("", Chunk::rest)
    }

    /// Skip `bytes` bytes of the top chunk
    pub fn advance(&mut self, bytes: usize) {
        let top = self.chunks.len() - 1;
        let step = bytes.min(self.chunks[top].text.len() - self.chunks[top].pos);
        self.chunks[top].pos += step;
        if top > 0 {
            self.pending -= step;
        }
        self.drop_exhausted();
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.next_char();
        }
    }

    /// Push expanded text in front of the remaining input
    pub fn splice(&mut self, text: String) -> ParseResult<()> {
        if self.pending + text.len() > self.max_buffer {
            return Err(TexError::simple(ErrorKind::MaxBufferSize));
        }
        if text.is_empty() {
            return Ok(());
        }
        self.pending += text.len();
        self.chunks.push(Chunk { text, pos: 0 });
        Ok(())
    }

    fn drop_exhausted(&mut self) {
        while self.chunks.len() > 1 && self.chunks[self.chunks.len() - 1].is_exhausted() {
            self.chunks.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(buffer: &mut TextBuffer) -> String {
        let mut out = String::new();
        while let Some(c) = buffer.next_char() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_reads_source() {
        let mut buffer = TextBuffer::new("x+y", 100);
        assert_eq!(buffer.peek(), Some('x'));
        assert_eq!(drain(&mut buffer), "x+y");
        assert_eq!(buffer.peek(), None);
        assert_eq!(buffer.position(), 3);
    }

    #[test]
    fn test_splice_reads_expansion_first() {
        let mut buffer = TextBuffer::new("ab", 100);
        buffer.next_char();
        buffer.splice("XY".to_string()).unwrap();
        assert!(buffer.in_expansion());
        assert_eq!(buffer.pending, 2);
        assert_eq!(drain(&mut buffer), "XYb");
        assert!(!buffer.in_expansion());
        assert_eq!(buffer.pending, 0);
    }

    #[test]
    fn test_peek_nth_crosses_chunks() {
        let mut buffer = TextBuffer::new("cd", 100);
        buffer.splice("ab".to_string()).unwrap();
        assert_eq!(buffer.peek_nth(0), Some('a'));
        assert_eq!(buffer.peek_nth(2), Some('c'));
        assert_eq!(buffer.peek_nth(4), None);
    }

    #[test]
    fn test_peek_nth_long_input() {
        let text = "x".repeat(20000) + "y";
        let mut buffer = TextBuffer::new(&text, 100);
        buffer.splice("ab".to_string()).unwrap();
        assert_eq!(buffer.peek_nth(1), Some('b'));
        assert_eq!(buffer.peek_nth(2), Some('x'));
        assert_eq!(buffer.peek_nth(20002), Some('y'));
        assert_eq!(buffer.peek_nth(20003), None);
        assert!(buffer.starts_with("abxx"));
    }

    #[test]
    fn test_max_buffer() {
        let mut buffer = TextBuffer::new("", 4);
        buffer.splice("abc".to_string()).unwrap();
        let err = buffer.splice("de".to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MaxBufferSize);
    }

    #[test]
    fn test_advance_in_chunk() {
        let mut buffer = TextBuffer::new("2pt x", 100);
        assert_eq!(buffer.rest_of_chunk(), "2pt x");
        buffer.advance(3);
        buffer.skip_whitespace();
        assert_eq!(buffer.peek(), Some('x'));
    }

    #[test]
    fn test_eat_across_chunks() {
        let mut buffer = TextBuffer::new("cd", 100);
        buffer.splice("ab".to_string()).unwrap();
        assert!(buffer.starts_with("abc"));
        assert!(!buffer.eat("abd"));
        assert!(buffer.eat("abc"));
        assert_eq!(buffer.peek(), Some('d'));
    }

    #[test]
    fn test_multibyte() {
        let mut buffer = TextBuffer::new("\u{03B1}b", 100);
        assert_eq!(buffer.next_char(), Some('\u{03B1}'));
        assert_eq!(buffer.position(), 2);
        assert_eq!(buffer.next_char(), Some('b'));
    }
}

//! Buffered character access over template input
//!
//! A [`CharacterStream`] exposes codepoint-level positioning (current,
//! previous, arbitrary look-ahead and look-behind) over either an
//! in-memory string or a line-oriented reader. File-backed streams append
//! one normalized line at a time on demand and trim the head of the
//! buffer once it grows past [`MAX_BUFFER`], always keeping at least
//! [`LOOK_BEHIND`] codepoints behind the current position.

use std::io::BufRead;

/// Buffer size above which the consumed head is dropped.
const MAX_BUFFER: usize = 4096;
/// Codepoints guaranteed to stay available behind the current position.
const LOOK_BEHIND: usize = 1024;

pub struct CharacterStream {
    reader: Option<Box<dyn BufRead>>,
    buffer: Vec<char>,
    /// Index of the current character; may sit one past the end when
    /// the stream is exhausted.
    pos: usize,
    /// Synthetic character before the start of the buffer. String
    /// buffers simulate a line start so that line-anchored markers are
    /// recognized at position 0.
    start_prev: Option<char>,
    line: usize,
    eof: bool,
}

impl CharacterStream {
    /// Stream over an in-memory string, usually one line of input.
    pub fn from_str(text: &str) -> Self {
        Self {
            reader: None,
            buffer: text.chars().collect(),
            pos: 0,
            start_prev: Some('\n'),
            line: 1,
            eof: true,
        }
    }

    /// Stream over a line-oriented reader (file input).
    pub fn from_reader(reader: Box<dyn BufRead>) -> Self {
        Self {
            reader: Some(reader),
            buffer: Vec::new(),
            pos: 0,
            start_prev: None,
            line: 1,
            eof: false,
        }
    }

    /// Reads lines until at least `upto` characters are available from
    /// the current position, or the source is exhausted.
    fn ensure(&mut self, upto: usize) {
        while !self.eof && self.buffer.len() < self.pos + upto {
            let Some(reader) = self.reader.as_mut() else {
                self.eof = true;
                break;
            };
            let mut raw = String::new();
            match reader.read_line(&mut raw) {
                Ok(0) | Err(_) => {
                    self.eof = true;
                }
                Ok(_) => {
                    // normalize CRLF / CR and guarantee one trailing EOL
                    while raw.ends_with('\n') || raw.ends_with('\r') {
                        raw.pop();
                    }
                    self.buffer.extend(raw.chars());
                    self.buffer.push('\n');
                }
            }
        }
    }

    fn advance(&mut self) {
        self.pos += 1;
        if self.pos >= 2 * LOOK_BEHIND && self.buffer.len() > MAX_BUFFER {
            let drop = self.pos - LOOK_BEHIND;
            self.buffer.drain(..drop);
            self.pos = LOOK_BEHIND;
        }
    }

    pub fn current_char(&mut self) -> Option<char> {
        self.ensure(1);
        self.buffer.get(self.pos).copied()
    }

    /// Advances one character and returns the new current character.
    pub fn next_char(&mut self) -> Option<char> {
        self.ensure(2);
        if self.pos < self.buffer.len() {
            self.advance();
        }
        self.current_char()
    }

    pub fn prev_char(&self) -> Option<char> {
        if self.pos == 0 {
            self.start_prev
        } else {
            self.buffer.get(self.pos - 1).copied()
        }
    }

    /// The `count` characters ending at (and including) the current one,
    /// or `None` when not enough characters lie behind.
    pub fn last_chars(&mut self, count: usize) -> Option<String> {
        self.ensure(1);
        if count == 0 || self.pos + 1 < count || self.pos >= self.buffer.len() {
            return None;
        }
        Some(self.buffer[self.pos + 1 - count..=self.pos].iter().collect())
    }

    /// The `count` characters after the current one, without advancing,
    /// or `None` when fewer are available.
    pub fn peek_ahead(&mut self, count: usize) -> Option<String> {
        self.ensure(count + 1);
        let from = self.pos + 1;
        if from + count > self.buffer.len() {
            return None;
        }
        Some(self.buffer[from..from + count].iter().collect())
    }

    /// Consumes and returns `count` characters starting at the current
    /// one; the stream ends up on the character after them.
    pub fn get_string(&mut self, count: usize) -> Option<String> {
        self.ensure(count);
        if self.pos + count > self.buffer.len() {
            return None;
        }
        let text: String = self.buffer[self.pos..self.pos + count].iter().collect();
        for _ in 0..count {
            self.advance();
        }
        Some(text)
    }

    /// Case-insensitive match of `word` against the characters starting
    /// at the current position. Does not advance.
    pub fn matches_ci(&mut self, word: &str) -> bool {
        let len = word.chars().count();
        self.ensure(len);
        if self.pos + len > self.buffer.len() {
            return false;
        }
        self.buffer[self.pos..self.pos + len]
            .iter()
            .zip(word.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }

    /// Skips the EOL the stream currently sits on, if any, counting one
    /// line. Returns whether an EOL was skipped.
    pub fn adjust_next_line(&mut self) -> bool {
        if self.current_char() == Some('\n') {
            self.advance();
            self.line += 1;
            true
        } else {
            false
        }
    }

    /// Consumes up to and including the next EOL and returns the new
    /// current character.
    pub fn goto_next_line(&mut self) -> Option<char> {
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '\n' {
                self.line += 1;
                break;
            }
        }
        self.current_char()
    }

    /// Returns the rest of the current line without its EOL, leaving the
    /// stream on the EOL itself. `None` once the source is exhausted.
    pub fn get_line(&mut self) -> Option<String> {
        self.adjust_next_line();
        self.current_char()?;
        let mut text = String::new();
        while let Some(c) = self.current_char() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        Some(text)
    }

    pub fn current_line(&self) -> usize {
        self.line
    }

    /// Appends more characters to the buffer; used when an escaped
    /// section continues past the end of a string-backed line.
    pub fn append_text(&mut self, text: &str) {
        self.buffer.extend(text.chars());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_and_counts_them() {
        let mut stream =
            CharacterStream::from_reader(Box::new(std::io::Cursor::new("one\r\ntwo\nthree")));
        assert_eq!(stream.get_line().as_deref(), Some("one"));
        assert_eq!(stream.current_line(), 1);
        assert_eq!(stream.get_line().as_deref(), Some("two"));
        assert_eq!(stream.current_line(), 2);
        assert_eq!(stream.get_line().as_deref(), Some("three"));
        assert_eq!(stream.current_line(), 3);
        assert_eq!(stream.get_line(), None);
    }

    #[test]
    fn string_buffer_simulates_line_start() {
        let mut stream = CharacterStream::from_str("abc");
        assert_eq!(stream.prev_char(), Some('\n'));
        assert_eq!(stream.current_char(), Some('a'));
        assert_eq!(stream.next_char(), Some('b'));
        assert_eq!(stream.prev_char(), Some('a'));
    }

    #[test]
    fn peeks_do_not_advance() {
        let mut stream = CharacterStream::from_str("hello");
        assert_eq!(stream.peek_ahead(2).as_deref(), Some("el"));
        assert_eq!(stream.peek_ahead(5), None);
        assert_eq!(stream.current_char(), Some('h'));
        assert!(stream.matches_ci("HELLO"));
        stream.next_char();
        assert_eq!(stream.last_chars(2).as_deref(), Some("he"));
    }

    #[test]
    fn head_trimming_keeps_look_behind() {
        let text: String = std::iter::repeat("abcdefgh\n").take(1200).collect();
        let mut stream = CharacterStream::from_reader(Box::new(std::io::Cursor::new(text)));
        let mut count = 0usize;
        while stream.get_line().is_some() {
            count += 1;
        }
        assert_eq!(count, 1200);
    }
}

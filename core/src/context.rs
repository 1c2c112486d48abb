//! Parse state for one dispatched line.
//!
//! A [`ParseContext`] owns the normalized input, a byte cursor into it, and
//! the [`Output`] accumulator that becomes the response blob.

use std::fmt;

/// Placeholder byte sent when a dispatch printed nothing.
pub const EMPTY_RESPONSE: u8 = b'#';

/// How an appended piece of output relates to what is already written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Continue the current line.
    Current,
    /// Start a new line. Ignored while the buffer is still empty.
    New,
}

/// Growable response buffer.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{LineMode, Output};
///
/// let mut out = Output::new();
/// out.append(LineMode::New, "first");
/// out.append(LineMode::Current, " still first");
/// out.append(LineMode::New, "second");
/// assert_eq!(out.as_str(), "first still first\nsecond");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    buf: String,
}

impl Output {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` according to `mode`.
    pub fn append(&mut self, mode: LineMode, text: &str) {
        if mode == LineMode::New && !self.buf.is_empty() {
            self.buf.push('\n');
        }
        self.buf.push_str(text);
    }

    /// Appends formatted text according to `mode`.
    pub fn append_fmt(&mut self, mode: LineMode, args: fmt::Arguments<'_>) {
        if mode == LineMode::New && !self.buf.is_empty() {
            self.buf.push('\n');
        }
        // Writing into a String cannot fail.
        let _ = fmt::Write::write_fmt(&mut self.buf, args);
    }

    /// Everything written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes handed to a transport: the text, or the single
    /// [`EMPTY_RESPONSE`] byte when nothing was written.
    pub fn response_bytes(&self) -> &[u8] {
        if self.buf.is_empty() {
            &[EMPTY_RESPONSE]
        } else {
            self.buf.as_bytes()
        }
    }

    /// Converts the accumulator into the bytes handed to a transport.
    ///
    /// An empty accumulator becomes the single [`EMPTY_RESPONSE`] byte.
    pub fn into_bytes(self) -> Vec<u8> {
        if self.buf.is_empty() {
            vec![EMPTY_RESPONSE]
        } else {
            self.buf.into_bytes()
        }
    }
}

/// Input buffer, cursor and output accumulator for one dispatch.
#[derive(Debug, Clone)]
pub struct ParseContext {
    input: String,
    cursor: usize,
    output: Output,
}

impl ParseContext {
    /// Creates a context over `input` with the cursor at the start.
    ///
    /// The input is used as given; callers dispatching raw lines should
    /// normalize them first (see [`crate::normalize`]).
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            cursor: 0,
            output: Output::new(),
        }
    }

    /// Full input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor, clamped to the input length.
    pub fn set_position(&mut self, position: usize) {
        self.cursor = position.min(self.input.len());
    }

    /// Unconsumed input.
    pub fn remaining(&self) -> &str {
        self.input.get(self.cursor..).unwrap_or_default()
    }

    /// Returns `true` when the cursor is at the end of input.
    pub fn at_end(&self) -> bool {
        self.cursor >= self.input.len()
    }

    /// Consumes and returns the next byte.
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.input.as_bytes().get(self.cursor).copied()?;
        self.cursor += 1;
        Some(byte)
    }

    /// Steps the cursor back by one byte.
    pub fn unread(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Returns the next byte without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.cursor).copied()
    }

    /// Skips whitespace and returns how many bytes were skipped.
    pub fn skip_whitespace(&mut self) -> usize {
        let mut skipped = 0;
        while let Some(byte) = self.peek_byte() {
            if !is_white_space(byte) {
                break;
            }
            self.cursor += 1;
            skipped += 1;
        }
        skipped
    }

    /// Output written so far.
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Appends `text` to the output.
    pub fn print(&mut self, mode: LineMode, text: &str) {
        self.output.append(mode, text);
    }

    /// Appends `text` on a new output line.
    pub fn println(&mut self, text: &str) {
        self.output.append(LineMode::New, text);
    }

    /// Appends formatted text to the output.
    pub fn print_fmt(&mut self, mode: LineMode, args: fmt::Arguments<'_>) {
        self.output.append_fmt(mode, args);
    }

    /// Consumes the context, returning its output.
    pub fn into_output(self) -> Output {
        self.output
    }
}

/// Whitespace as understood by the scanner and matcher.
pub fn is_white_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_is_noop_on_empty_buffer() {
        let mut out = Output::new();
        out.append(LineMode::New, "only");
        assert_eq!(out.as_str(), "only");
    }

    #[test]
    fn test_empty_output_becomes_placeholder() {
        assert_eq!(Output::new().into_bytes(), vec![b'#']);
        let mut out = Output::new();
        out.append(LineMode::Current, "x");
        assert_eq!(out.into_bytes(), b"x".to_vec());
    }

    #[test]
    fn test_append_fmt() {
        let mut out = Output::new();
        out.append_fmt(LineMode::New, format_args!("id {} is shown", 7));
        out.append_fmt(LineMode::New, format_args!("{}", "next"));
        assert_eq!(out.as_str(), "id 7 is shown\nnext");
    }

    #[test]
    fn test_context_printing() {
        let mut ctx = ParseContext::new("");
        ctx.println("first");
        ctx.print(LineMode::Current, ",");
        ctx.println("second");
        assert_eq!(ctx.output().as_str(), "first,\nsecond");
        assert_eq!(ctx.into_output().into_bytes(), b"first,\nsecond".to_vec());
    }

    #[test]
    fn test_cursor_movement() {
        let mut ctx = ParseContext::new("  ab");
        assert_eq!(ctx.skip_whitespace(), 2);
        assert_eq!(ctx.next_byte(), Some(b'a'));
        ctx.unread();
        assert_eq!(ctx.remaining(), "ab");
        ctx.set_position(100);
        assert!(ctx.at_end());
        assert_eq!(ctx.next_byte(), None);
        assert_eq!(ctx.remaining(), "");
    }
}

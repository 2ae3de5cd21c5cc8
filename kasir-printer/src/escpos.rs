//! ESC/POS command builder
//!
//! Accumulates a UTF-8 `String` with embedded control sequences. The caller
//! encodes it (`String::into_bytes`) before handing it to a printer.

use crate::wrap::chunk;

/// Length cap for the short rule drawn between receipt line items
pub const SHORT_RULE_MAX: usize = 20;

/// String-based ESC/POS command builder
pub struct EscPosTextBuilder {
    buf: String,
    width: usize,
}

impl EscPosTextBuilder {
    /// Create a new text builder with specified paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        Self {
            buf: String::with_capacity(1024),
            width,
        }
    }

    /// Get the configured paper width
    pub fn width(&self) -> usize {
        self.width
    }

    // === Printer Control ===

    /// Initialize printer (ESC @)
    pub fn init(&mut self) -> &mut Self {
        self.buf.push_str("\x1B\x40");
        self
    }

    /// Select the normal font, clearing emphasis and size (ESC ! 0)
    pub fn font_normal(&mut self) -> &mut Self {
        self.buf.push_str("\x1B\x21\x00");
        self
    }

    // === Text Output ===

    /// Write text followed by newline
    pub fn write_line(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self.buf.push('\n');
        self
    }

    /// Write `s` chunked to the paper width, one line per segment
    pub fn write_wrapped(&mut self, s: &str) -> &mut Self {
        let width = self.width;
        self.write_wrapped_prefixed("", s, width)
    }

    /// Write `s` chunked to `width`, each line preceded by `prefix`
    pub fn write_wrapped_prefixed(&mut self, prefix: &str, s: &str, width: usize) -> &mut Self {
        for segment in chunk(s, width) {
            self.buf.push_str(prefix);
            self.write_line(segment);
        }
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn align_center(&mut self) -> &mut Self {
        self.buf.push_str("\x1B\x61\x01");
        self
    }

    /// Align text to left (default)
    pub fn align_left(&mut self) -> &mut Self {
        self.buf.push_str("\x1B\x61\x00");
        self
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn eq_sep(&mut self) -> &mut Self {
        self.write_line(&"=".repeat(self.width))
    }

    /// Print a line of '-' characters
    pub fn dash_sep(&mut self) -> &mut Self {
        self.write_line(&"-".repeat(self.width))
    }

    /// Print a short '-' rule, at most [`SHORT_RULE_MAX`] wide
    pub fn short_dash_sep(&mut self) -> &mut Self {
        self.write_line(&"-".repeat(self.width.min(SHORT_RULE_MAX)))
    }

    // === Paper Control ===

    /// Print and feed n lines (ESC d n)
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.push_str("\x1B\x64");
        self.buf.push(char::from(lines));
        self
    }

    /// Feed n lines then full cut (GS V A n)
    pub fn cut_feed(&mut self, lines: u8) -> &mut Self {
        self.buf.push_str("\x1D\x56\x41");
        self.buf.push(char::from(lines));
        self
    }

    // === Build ===

    /// Finalize and return the accumulated string
    pub fn finalize(self) -> String {
        self.buf
    }

    /// Get the current buffer as a string reference
    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

//! Line-based screen buffer driven by the VTE state machine.

use tracing::debug;
use vte::{Params, Perform};

/// A grow-as-needed screen buffer.
///
/// Unlike a full terminal emulator there is no fixed grid: banner output is
/// short-lived and line-oriented, so lines are allocated lazily and extended
/// with spaces when the cursor addresses a column past the current end.
/// SGR sequences are consumed without effect, which is exactly the color
/// stripping the decoder needs.
#[derive(Debug, Default)]
pub struct Screen {
    /// Rendered lines
    lines: Vec<String>,
    /// Cursor row (0-based)
    row: usize,
    /// Cursor column (0-based)
    col: usize,
}

impl Screen {
    /// Create an empty screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes through the VTE parser.
    pub fn process(&mut self, bytes: &[u8]) {
        let mut parser = vte::Parser::new();
        for byte in bytes {
            parser.advance(self, *byte);
        }
    }

    /// Read back the rendered text.
    ///
    /// Trailing whitespace is trimmed from every line and trailing blank
    /// lines are dropped, mirroring what an operator would read off the
    /// terminal.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<&str> = self.lines.iter().map(|l| l.trim_end()).collect();
        while matches!(lines.last(), Some(last) if last.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn line_mut(&mut self, row: usize) -> &mut String {
        if self.lines.len() <= row {
            self.lines.resize(row + 1, String::new());
        }
        &mut self.lines[row]
    }

    fn put_char(&mut self, c: char) {
        let col = self.col;
        let line = self.line_mut(self.row);
        let mut chars: Vec<char> = line.chars().collect();
        if chars.len() <= col {
            chars.resize(col + 1, ' ');
        }
        chars[col] = c;
        *line = chars.into_iter().collect();
        self.col += 1;
    }

    fn erase_in_line(&mut self, mode: u16) {
        let col = self.col;
        let line = self.line_mut(self.row);
        let chars: Vec<char> = line.chars().collect();
        *line = match mode {
            // Cursor to end of line
            0 => chars.into_iter().take(col).collect(),
            // Start of line to cursor
            1 => {
                let mut cleared: Vec<char> = chars;
                for slot in cleared.iter_mut().take(col + 1) {
                    *slot = ' ';
                }
                cleared.into_iter().collect()
            }
            // Entire line
            2 => String::new(),
            _ => return,
        };
    }

    fn erase_in_display(&mut self, mode: u16) {
        match mode {
            // Cursor to end of screen
            0 => {
                self.erase_in_line(0);
                self.lines.truncate(self.row + 1);
            }
            // Start of screen to cursor
            1 => {
                for row in 0..self.row {
                    if let Some(line) = self.lines.get_mut(row) {
                        line.clear();
                    }
                }
                self.erase_in_line(1);
            }
            // Entire screen
            2 => {
                self.lines.clear();
            }
            _ => {}
        }
    }
}

/// First parameter of a CSI sequence, with the VT100 default.
fn first_param(params: &Params, default: u16) -> u16 {
    match params.iter().next().map(|p| p[0]) {
        Some(0) | None => default,
        Some(n) => n,
    }
}

impl Perform for Screen {
    /// Print a character at the cursor position.
    fn print(&mut self, c: char) {
        self.put_char(c);
    }

    /// Execute a control character.
    fn execute(&mut self, byte: u8) {
        match byte {
            // Backspace (BS)
            0x08 => {
                self.col = self.col.saturating_sub(1);
            }

            // Horizontal Tab (HT)
            0x09 => {
                self.col = ((self.col / 8) + 1) * 8;
            }

            // Line Feed (LF). The scheduler shell emits both bare LF and
            // CRLF line endings; treat LF as a full line break so read-back
            // lines stay column-aligned either way.
            0x0A => {
                self.row += 1;
                self.col = 0;
            }

            // Carriage Return (CR)
            0x0D => {
                self.col = 0;
            }

            _ => {} // Ignore other control codes
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _c: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    /// CSI (Control Sequence Introducer) dispatch.
    fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], _ignore: bool, c: char) {
        match c {
            // Cursor Up (CUU)
            'A' => {
                let n = first_param(params, 1) as usize;
                self.row = self.row.saturating_sub(n);
            }

            // Cursor Down (CUD)
            'B' => {
                let n = first_param(params, 1) as usize;
                self.row += n;
            }

            // Cursor Forward (CUF)
            'C' => {
                let n = first_param(params, 1) as usize;
                self.col += n;
            }

            // Cursor Backward (CUB)
            'D' => {
                let n = first_param(params, 1) as usize;
                self.col = self.col.saturating_sub(n);
            }

            // Cursor Position (CUP), 1-based row;col
            'H' | 'f' => {
                let mut iter = params.iter();
                let row = iter.next().map(|p| p[0]).filter(|&n| n > 0).unwrap_or(1);
                let col = iter.next().map(|p| p[0]).filter(|&n| n > 0).unwrap_or(1);
                self.row = (row - 1) as usize;
                self.col = (col - 1) as usize;
            }

            // Erase in Display (ED)
            'J' => {
                let mode = params.iter().next().map(|p| p[0]).unwrap_or(0);
                self.erase_in_display(mode);
            }

            // Erase in Line (EL)
            'K' => {
                let mode = params.iter().next().map(|p| p[0]).unwrap_or(0);
                self.erase_in_line(mode);
            }

            // SGR (colors/attributes): consumed, not rendered
            'm' => {}

            _ => {
                debug!("Ignoring CSI sequence: {}", c);
            }
        }
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}

/// Render a raw byte stream to the plain text a terminal would display.
pub fn render_to_text(bytes: &[u8]) -> String {
    let mut screen = Screen::new();
    screen.process(bytes);
    screen.to_text()
}

//! An in-memory VT100-series terminal emulator.
//!
//! Feed it the characters (or raw bytes) a program writes to its
//! pseudo-terminal and read back a grid of styled cells, the cursor
//! and the active modes, as a user of a real VT100-family terminal
//! would see them. The crate does no I/O of its own.
//!
//! The two moving parts are [`Stream`], a state machine that parses
//! control codes and escape sequences into named events, and
//! [`Screen`], a listener that implements those events over the cell
//! grid. They are wired together with [`Stream::attach`]; any number
//! of extra listeners can observe the same event flow by implementing
//! [`Handler`].
//!
//! ```
//! use vt_screen::TermSetting;
//!
//! let mut term = TermSetting::new().columns(80).lines(24).build();
//! term.feed("Hello \x1b[31mWorld\x1b[0m!");
//! assert_eq!(term.display()[0].trim_end(), "Hello World!");
//! assert_eq!(term.cursor().x, 12);
//! ```

extern crate encoding_rs;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate slog;
extern crate sloggers;

mod bytes;
mod cell;
mod charset;
pub mod control;
mod log;
pub mod mode;
mod screen;
mod stream;

pub use bytes::{ByteStream, ErrorPolicy};
pub use cell::{Cell, CellAttrs, Color, Cursor};
pub use charset::Charset;
pub use log::{build_logger, LogType, OpenMode, Severity};
pub use screen::{Margins, Screen};
pub use stream::{Handler, Stream, MAX_PARAMS};

use std::cell::RefCell;
use std::rc::Rc;

/// Emulator builder. A default 80x24 terminal can be tweaked by
/// builder methods before [`build`](TermSetting::build) wires the
/// parser to a screen:
///
/// ```
/// use vt_screen::{LogType, Severity, TermSetting};
///
/// let term = TermSetting::new()
///     .columns(132)
///     .lines(50)
///     .debug_type(LogType::Stderr(Severity::Warning))
///     .build();
/// assert_eq!(term.display().len(), 50);
/// ```
#[derive(Clone, Debug)]
pub struct TermSetting {
    columns: usize,
    lines: usize,
    debug_log: LogType,
}

impl TermSetting {
    pub fn new() -> TermSetting {
        TermSetting {
            columns: 80,
            lines: 24,
            debug_log: LogType::None,
        }
    }

    pub fn columns(mut self, u: usize) -> Self {
        self.columns = u;
        self
    }

    pub fn lines(mut self, u: usize) -> Self {
        self.lines = u;
        self
    }

    pub fn debug_type(mut self, l: LogType) -> Self {
        self.debug_log = l;
        self
    }

    pub fn build(self) -> Term {
        let logger = build_logger(&self.debug_log);
        let screen = Rc::new(RefCell::new(Screen::with_logger(
            self.columns,
            self.lines,
            logger.clone(),
        )));
        let mut stream = Stream::with_logger(logger);
        stream.attach(screen.clone());
        Term {
            bytes: ByteStream::new(stream),
            screen: screen,
        }
    }
}

impl Default for TermSetting {
    fn default() -> TermSetting {
        TermSetting::new()
    }
}

/// A ready-wired emulator: a byte-decoding parser with one attached
/// [`Screen`].
pub struct Term {
    bytes: ByteStream,
    screen: Rc<RefCell<Screen>>,
}

impl Term {
    /// Feed decoded characters.
    pub fn feed(&mut self, input: &str) {
        self.bytes.stream_mut().feed(input);
    }

    /// Feed raw bytes through the decoding adapter.
    pub fn feed_bytes(&mut self, input: &[u8]) {
        self.bytes.feed(input);
    }

    pub fn display(&self) -> Vec<String> {
        self.screen.borrow().display()
    }

    pub fn cursor(&self) -> Cursor {
        *self.screen.borrow().cursor()
    }

    /// The attached screen, for direct inspection. Do not resize it
    /// from inside a listener callback.
    pub fn screen(&self) -> Rc<RefCell<Screen>> {
        self.screen.clone()
    }

    /// The underlying parser, e.g. for attaching more listeners.
    pub fn stream_mut(&mut self) -> &mut Stream {
        self.bytes.stream_mut()
    }

    pub fn resize(&mut self, lines: usize, columns: usize) {
        self.screen.borrow_mut().resize(lines, columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term() -> Term {
        TermSetting::new().build()
    }

    fn padded(text: &str, width: usize) -> String {
        let mut s = text.to_owned();
        while s.chars().count() < width {
            s.push(' ');
        }
        s
    }

    #[test]
    fn hello_world() {
        let mut term = term();
        term.feed("Hello World!");
        let display = term.display();
        assert_eq!(display[0], padded("Hello World!", 80));
        for row in &display[1..] {
            assert_eq!(*row, padded("", 80));
        }
        assert_eq!((term.cursor().x, term.cursor().y), (12, 0));
    }

    #[test]
    fn cursor_up_five() {
        let mut term = term();
        term.feed("\x1b[11;1H");
        assert_eq!((term.cursor().x, term.cursor().y), (0, 10));
        term.feed("\x1b[5A");
        assert_eq!((term.cursor().x, term.cursor().y), (0, 5));
    }

    #[test]
    fn wrap_at_right_edge() {
        let mut term = term();
        term.feed(&"X".repeat(81));
        let display = term.display();
        assert_eq!(display[0], "X".repeat(80));
        assert_eq!(display[1], padded("X", 80));
        assert_eq!((term.cursor().x, term.cursor().y), (1, 1));
    }

    #[test]
    fn scroll_at_bottom() {
        let mut term = term();
        for line in 0..24 {
            term.feed(&format!("\x1b[{};1H{}", line + 1, line % 10));
        }
        term.feed("\x1b[24;1H\n");
        let display = term.display();
        assert_eq!(display[0], padded("1", 80));
        assert_eq!(display[22], padded("3", 80));
        assert_eq!(display[23], padded("", 80));
        assert_eq!((term.cursor().x, term.cursor().y), (0, 23));
    }

    #[test]
    fn save_restore_with_sgr() {
        let mut term = term();
        term.feed("\x1b[31m\x1b7\x1b[32mA\x1b8B");
        let screen = term.screen();
        let screen = screen.borrow();
        assert_eq!(screen.cell(0, 0).fg, Color::Green);
        assert_eq!(screen.cell(1, 0).fg, Color::Red);
        assert_eq!(screen.cursor().x, 2);
    }

    #[test]
    fn erase_in_display_whole_screen() {
        let mut term = term();
        term.feed("scribble\x1b[12;20Hnoise");
        let cursor = term.cursor();
        term.feed("\x1b[2J");
        for row in term.display() {
            assert_eq!(row, padded("", 80));
        }
        assert_eq!(term.cursor(), cursor);
        let screen = term.screen();
        assert_eq!(*screen.borrow().cell(0, 0), Cell::default());
    }

    #[test]
    fn full_reset_restores_construction_state() {
        let mut term = term();
        term.feed("junk\x1b[31;44m\x1b[5;10r\x1b[?6h\x1b(0more");
        term.feed("\x1bc");
        let fresh = TermSetting::new().build();
        assert_eq!(term.display(), fresh.display());
        assert_eq!(term.cursor(), fresh.cursor());
        let screen = term.screen();
        let fresh_screen = fresh.screen();
        assert_eq!(*screen.borrow().mode(), *fresh_screen.borrow().mode());
    }

    #[test]
    fn bytes_and_characters_mix() {
        let mut term = term();
        term.feed_bytes(b"caf\xc3\xa9");
        assert_eq!(term.display()[0], padded("caf\u{e9}", 80));
        term.feed("\r\x1b[K");
        assert_eq!(term.display()[0], padded("", 80));
    }

    #[test]
    fn private_mode_numbers_are_namespaced() {
        let mut term = term();
        term.feed("\x1b[?6h\x1b[20h");
        let screen = term.screen();
        let screen = screen.borrow();
        assert!(screen.mode().contains(&mode::DECOM));
        assert!(screen.mode().contains(&mode::LNM));
        assert!(!screen.mode().contains(&6));
    }
}

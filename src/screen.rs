//! The screen model: grid, cursor, margins, modes, tabs, charsets and
//! the DEC save/restore stack.
//!
//! [`Screen`] implements [`Handler`], so it can be attached straight to
//! a [`Stream`](::Stream). All operations clamp out-of-range input and
//! never fail; unrecognized sequences arrive through `debug` and are
//! only logged.

use std::cmp::{max, min};
use std::collections::BTreeSet;

use slog::{Discard, Logger};

use cell::{Cell, CellAttrs, Color, Cursor};
use charset::Charset;
use mode;
use stream::Handler;

/// The scroll region, 0-based inclusive rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Margins {
    pub top: usize,
    pub bottom: usize,
}

/// Snapshot pushed by DECSC and popped by DECRC.
#[derive(Copy, Clone, Debug)]
struct Savepoint {
    cursor: Cursor,
    g0: Charset,
    g1: Charset,
    charset: usize,
    origin: bool,
    wrap: bool,
}

/// Count parameters default to one.
fn or_one(count: u32) -> usize {
    if count == 0 {
        1
    } else {
        count as usize
    }
}

fn named_color(index: u32) -> Color {
    match index {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Brown,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::White,
    }
}

fn bright_color(index: u32) -> Color {
    match index {
        0 => Color::BrightBlack,
        1 => Color::BrightRed,
        2 => Color::BrightGreen,
        3 => Color::BrightBrown,
        4 => Color::BrightBlue,
        5 => Color::BrightMagenta,
        6 => Color::BrightCyan,
        _ => Color::BrightWhite,
    }
}

/// An in-memory VT100-family screen.
#[derive(Debug)]
pub struct Screen {
    buffer: Vec<Vec<Cell>>,
    cursor: Cursor,
    lines: usize,
    columns: usize,
    margins: Margins,
    mode: BTreeSet<u32>,
    tabstops: BTreeSet<usize>,
    g0: Charset,
    g1: Charset,
    charset: usize,
    savepoints: Vec<Savepoint>,
    logger: Logger,
}

impl Screen {
    pub fn new(columns: usize, lines: usize) -> Screen {
        Screen::with_logger(columns, lines, Logger::root(Discard, o!()))
    }

    pub fn with_logger(columns: usize, lines: usize, logger: Logger) -> Screen {
        assert!(
            columns >= 1 && lines >= 1,
            "a screen needs at least one cell"
        );
        let mut screen = Screen {
            buffer: Vec::new(),
            cursor: Cursor::default(),
            lines: lines,
            columns: columns,
            margins: Margins {
                top: 0,
                bottom: lines - 1,
            },
            mode: BTreeSet::new(),
            tabstops: BTreeSet::new(),
            g0: Charset::default(),
            g1: Charset::default(),
            charset: 0,
            savepoints: Vec::new(),
            logger: logger,
        };
        screen.reset();
        screen
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// The set of active mode numbers, private ones shifted as in
    /// [`mode`](::mode).
    pub fn mode(&self) -> &BTreeSet<u32> {
        &self.mode
    }

    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.buffer[y][x]
    }

    /// The grid as one string of exactly `columns` characters per row,
    /// in visual order.
    pub fn display(&self) -> Vec<String> {
        self.buffer
            .iter()
            .map(|line| line.iter().map(|cell| cell.data).collect())
            .collect()
    }

    /// Grow or shrink the grid. Shrinking drops rows from the bottom
    /// and columns from the left; growing appends blank rows at the
    /// bottom and blank columns at the right. Margins snap back to the
    /// full screen and origin mode is cleared.
    ///
    /// Must not be called from inside a listener callback.
    pub fn resize(&mut self, lines: usize, columns: usize) {
        assert!(
            columns >= 1 && lines >= 1,
            "a screen needs at least one cell"
        );
        trace!(self.logger, "(resize) {}x{}", columns, lines);
        if lines < self.lines {
            self.buffer.truncate(lines);
        } else {
            for _ in self.lines..lines {
                self.buffer.push(vec![Cell::default(); self.columns]);
            }
        }
        if columns < self.columns {
            let surplus = self.columns - columns;
            for line in self.buffer.iter_mut() {
                line.drain(..surplus);
            }
        } else if columns > self.columns {
            let missing = columns - self.columns;
            for line in self.buffer.iter_mut() {
                line.extend(vec![Cell::default(); missing]);
            }
        }
        self.lines = lines;
        self.columns = columns;
        self.margins = Margins {
            top: 0,
            bottom: lines - 1,
        };
        self.reset_mode(&[mode::DECOM], false);
    }

    fn active_charset(&self) -> Charset {
        match self.charset {
            0 => self.g0,
            _ => self.g1,
        }
    }

    /// Clamp the cursor into the addressable area: the scroll region
    /// when requested or under origin mode, the whole screen otherwise.
    fn ensure_bounds(&mut self, use_margins: bool) {
        let (top, bottom) = if use_margins || self.mode.contains(&mode::DECOM) {
            (self.margins.top, self.margins.bottom)
        } else {
            (0, self.lines - 1)
        };
        self.cursor.x = min(self.cursor.x, self.columns - 1);
        self.cursor.y = max(top, min(self.cursor.y, bottom));
    }

    fn blank_line(&self, template: Cell) -> Vec<Cell> {
        vec![template; self.columns]
    }
}

impl Handler for Screen {
    fn debug(&mut self, params: &[u32], byte: char) {
        warn!(
            self.logger,
            "[unhandled sequence] params={:?}, byte={:?}",
            params,
            byte
        );
    }

    fn draw(&mut self, ch: char) {
        let ch = self.active_charset().translate(ch);
        // A cursor parked past the last column records a pending wrap;
        // resolve it before writing.
        if self.cursor.x == self.columns {
            if self.mode.contains(&mode::DECAWM) {
                self.carriage_return();
                self.linefeed();
            } else {
                self.cursor.x -= 1;
            }
        }
        if self.mode.contains(&mode::IRM) {
            self.insert_characters(1);
        }
        trace!(
            self.logger,
            "(draw) ch={:?} cursor=({}, {})",
            ch,
            self.cursor.x,
            self.cursor.y
        );
        self.buffer[self.cursor.y][self.cursor.x] = self.cursor.attrs.with_data(ch);
        // Not cursor_forward(): stepping past the last column is what
        // records the pending wrap.
        self.cursor.x += 1;
    }

    fn bell(&mut self) {
        trace!(self.logger, "(bell)");
    }

    fn backspace(&mut self) {
        self.cursor_back(1);
    }

    fn tab(&mut self) {
        let column = self.tabstops
            .iter()
            .find(|&&stop| stop > self.cursor.x)
            .cloned()
            .unwrap_or(self.columns - 1);
        self.cursor.x = min(column, self.columns - 1);
    }

    fn linefeed(&mut self) {
        self.index();
        if self.mode.contains(&mode::LNM) {
            self.carriage_return();
        }
    }

    fn carriage_return(&mut self) {
        self.cursor.x = 0;
    }

    fn shift_out(&mut self) {
        self.charset = 1;
    }

    fn shift_in(&mut self) {
        self.charset = 0;
    }

    fn reset(&mut self) {
        trace!(self.logger, "(reset)");
        self.buffer = vec![vec![Cell::default(); self.columns]; self.lines];
        self.margins = Margins {
            top: 0,
            bottom: self.lines - 1,
        };
        self.mode.clear();
        self.mode.insert(mode::DECAWM);
        self.mode.insert(mode::DECTCEM);
        self.g0 = Charset::default();
        self.g1 = Charset::default();
        self.charset = 0;
        self.tabstops = (8..self.columns).step_by(8).collect();
        self.cursor = Cursor::default();
        self.savepoints.clear();
    }

    fn index(&mut self) {
        let Margins { top, bottom } = self.margins;
        if self.cursor.y == bottom {
            self.buffer.remove(top);
            let blank = self.blank_line(Cell::default());
            self.buffer.insert(bottom, blank);
        } else {
            self.cursor_down(1);
        }
    }

    fn reverse_index(&mut self) {
        let Margins { top, bottom } = self.margins;
        if self.cursor.y == top {
            self.buffer.remove(bottom);
            let blank = self.blank_line(Cell::default());
            self.buffer.insert(top, blank);
        } else {
            self.cursor_up(1);
        }
    }

    fn set_tab_stop(&mut self) {
        self.tabstops.insert(self.cursor.x);
    }

    fn clear_tab_stop(&mut self, how: u32) {
        if how == 3 {
            self.tabstops.clear();
        } else {
            self.tabstops.remove(&self.cursor.x);
        }
    }

    fn save_cursor(&mut self) {
        self.savepoints.push(Savepoint {
            cursor: self.cursor,
            g0: self.g0,
            g1: self.g1,
            charset: self.charset,
            origin: self.mode.contains(&mode::DECOM),
            wrap: self.mode.contains(&mode::DECAWM),
        });
    }

    fn restore_cursor(&mut self) {
        match self.savepoints.pop() {
            Some(savepoint) => {
                self.g0 = savepoint.g0;
                self.g1 = savepoint.g1;
                self.charset = savepoint.charset;
                if savepoint.origin {
                    self.set_mode(&[mode::DECOM], false);
                } else {
                    self.reset_mode(&[mode::DECOM], false);
                }
                if savepoint.wrap {
                    self.set_mode(&[mode::DECAWM], false);
                } else {
                    self.reset_mode(&[mode::DECAWM], false);
                }
                self.cursor = savepoint.cursor;
                self.ensure_bounds(true);
            }
            None => {
                // Nothing saved: home the cursor and leave origin mode.
                self.reset_mode(&[mode::DECOM], false);
                self.cursor_position(0, 0);
            }
        }
    }

    fn alignment_display(&mut self) {
        let filler = Cell::default().with_data('E');
        for line in self.buffer.iter_mut() {
            for cell in line.iter_mut() {
                *cell = filler;
            }
        }
    }

    fn set_charset(&mut self, code: char, mode: char) {
        match Charset::from_code(code) {
            Some(table) => match mode {
                '(' => self.g0 = table,
                ')' => self.g1 = table,
                _ => {}
            },
            None => warn!(self.logger, "(set_charset) unknown code {:?}", code),
        }
    }

    fn cursor_up(&mut self, count: u32) {
        self.cursor.y = self.cursor.y.saturating_sub(or_one(count));
        self.ensure_bounds(false);
    }

    fn cursor_down(&mut self, count: u32) {
        self.cursor.y += or_one(count);
        self.ensure_bounds(false);
    }

    fn cursor_forward(&mut self, count: u32) {
        self.cursor.x += or_one(count);
        self.ensure_bounds(false);
    }

    fn cursor_back(&mut self, count: u32) {
        self.cursor.x = self.cursor.x.saturating_sub(or_one(count));
        self.ensure_bounds(false);
    }

    fn cursor_up1(&mut self, count: u32) {
        self.cursor_up(count);
        self.carriage_return();
    }

    fn cursor_down1(&mut self, count: u32) {
        self.cursor_down(count);
        self.carriage_return();
    }

    fn cursor_to_column(&mut self, column: u32) {
        self.cursor.x = or_one(column) - 1;
        self.ensure_bounds(false);
    }

    fn cursor_to_line(&mut self, line: u32) {
        self.cursor.y = or_one(line) - 1;
        if self.mode.contains(&mode::DECOM) {
            self.cursor.y += self.margins.top;
        }
        self.ensure_bounds(false);
    }

    fn cursor_position(&mut self, line: u32, column: u32) {
        let mut line = or_one(line) - 1;
        let column = or_one(column) - 1;
        if self.mode.contains(&mode::DECOM) {
            line += self.margins.top;
            // The cursor may not leave the scroll region.
            if line > self.margins.bottom {
                return;
            }
        }
        self.cursor.x = column;
        self.cursor.y = line;
        self.ensure_bounds(false);
    }

    fn insert_characters(&mut self, count: u32) {
        let count = min(or_one(count), self.columns - min(self.cursor.x, self.columns));
        let blank = self.cursor.attrs;
        let (x, y) = (self.cursor.x, self.cursor.y);
        for _ in 0..count {
            self.buffer[y].insert(x, blank);
            self.buffer[y].pop();
        }
    }

    fn delete_characters(&mut self, count: u32) {
        let count = min(or_one(count), self.columns - min(self.cursor.x, self.columns));
        let blank = self.cursor.attrs;
        let (x, y) = (self.cursor.x, self.cursor.y);
        for _ in 0..count {
            self.buffer[y].remove(x);
            self.buffer[y].push(blank);
        }
    }

    fn erase_characters(&mut self, count: u32) {
        let blank = self.cursor.attrs;
        for column in self.cursor.x..min(self.cursor.x + or_one(count), self.columns) {
            self.buffer[self.cursor.y][column] = blank;
        }
    }

    fn insert_lines(&mut self, count: u32) {
        let count = or_one(count);
        let Margins { top, bottom } = self.margins;
        if self.cursor.y < top || self.cursor.y > bottom {
            return;
        }
        let blank = self.cursor.attrs;
        for line in self.cursor.y..min(bottom + 1, self.cursor.y + count) {
            self.buffer.remove(bottom);
            let filler = self.blank_line(blank);
            self.buffer.insert(line, filler);
        }
        self.carriage_return();
    }

    fn delete_lines(&mut self, count: u32) {
        let count = or_one(count);
        let Margins { top, bottom } = self.margins;
        if self.cursor.y < top || self.cursor.y > bottom {
            return;
        }
        let blank = self.cursor.attrs;
        for _ in 0..min(bottom - self.cursor.y + 1, count) {
            self.buffer.remove(self.cursor.y);
            let filler = self.blank_line(blank);
            self.buffer.insert(bottom, filler);
        }
        self.carriage_return();
    }

    fn erase_in_line(&mut self, how: u32) {
        let blank = self.cursor.attrs;
        let (start, end) = match how {
            0 => (self.cursor.x, self.columns),
            1 => (0, min(self.cursor.x + 1, self.columns)),
            _ => (0, self.columns),
        };
        for column in start..end {
            self.buffer[self.cursor.y][column] = blank;
        }
    }

    fn erase_in_display(&mut self, how: u32) {
        let blank = self.cursor.attrs;
        let (start, end) = match how {
            0 => (self.cursor.y + 1, self.lines),
            1 => (0, self.cursor.y),
            _ => (0, self.lines),
        };
        for line in start..end {
            for cell in self.buffer[line].iter_mut() {
                *cell = blank;
            }
        }
        if how == 0 || how == 1 {
            self.erase_in_line(how);
        }
    }

    fn set_margins(&mut self, top: u32, bottom: u32) {
        let top = min(top.saturating_sub(1) as usize, self.lines - 1);
        let bottom = if bottom == 0 {
            self.lines - 1
        } else {
            min(bottom as usize - 1, self.lines - 1)
        };
        // Regions narrower than two lines are refused, as on the VT102.
        if bottom > top {
            trace!(self.logger, "(set_margins) {}..{}", top, bottom);
            self.margins = Margins {
                top: top,
                bottom: bottom,
            };
            self.cursor_position(0, 0);
        } else {
            warn!(
                self.logger,
                "(set_margins) degenerate region {}..{}",
                top,
                bottom
            );
        }
    }

    fn set_mode(&mut self, modes: &[u32], private: bool) {
        let modes: Vec<u32> = if private {
            modes.iter().map(|m| m << mode::PRIVATE_SHIFT).collect()
        } else {
            modes.to_vec()
        };
        trace!(self.logger, "(set_mode) modes={:?}", modes);
        for m in &modes {
            self.mode.insert(*m);
        }
        // The 132 column font erases the screen and homes the cursor.
        if modes.contains(&mode::DECCOLM) {
            self.resize(self.lines, 132);
            self.erase_in_display(2);
            self.cursor_position(0, 0);
        }
        // vttest expects entering origin mode to home the cursor too.
        if modes.contains(&mode::DECOM) {
            self.cursor_position(0, 0);
        }
        if modes.contains(&mode::DECSCNM) {
            for line in self.buffer.iter_mut() {
                for cell in line.iter_mut() {
                    cell.attrs.insert(CellAttrs::REVERSE);
                }
            }
            self.select_graphic_rendition(&[7]);
        }
        if modes.contains(&mode::DECTCEM) {
            self.cursor.hidden = false;
        }
    }

    fn reset_mode(&mut self, modes: &[u32], private: bool) {
        let modes: Vec<u32> = if private {
            modes.iter().map(|m| m << mode::PRIVATE_SHIFT).collect()
        } else {
            modes.to_vec()
        };
        trace!(self.logger, "(reset_mode) modes={:?}", modes);
        for m in &modes {
            self.mode.remove(m);
        }
        if modes.contains(&mode::DECCOLM) {
            self.resize(self.lines, 80);
            self.erase_in_display(2);
            self.cursor_position(0, 0);
        }
        if modes.contains(&mode::DECOM) {
            self.cursor_position(0, 0);
        }
        if modes.contains(&mode::DECSCNM) {
            for line in self.buffer.iter_mut() {
                for cell in line.iter_mut() {
                    cell.attrs.remove(CellAttrs::REVERSE);
                }
            }
            self.select_graphic_rendition(&[27]);
        }
        if modes.contains(&mode::DECTCEM) {
            self.cursor.hidden = true;
        }
    }

    fn select_graphic_rendition(&mut self, params: &[u32]) {
        let params: Vec<u32> = if params.is_empty() {
            vec![0]
        } else {
            params.to_vec()
        };
        let mut attrs = self.cursor.attrs;
        let mut iter = params.into_iter();
        while let Some(param) = iter.next() {
            match param {
                0 => {
                    attrs.fg = Color::Default;
                    attrs.bg = Color::Default;
                    attrs.attrs = CellAttrs::empty();
                }
                1 => attrs.attrs.insert(CellAttrs::BOLD),
                3 => attrs.attrs.insert(CellAttrs::ITALICS),
                4 => attrs.attrs.insert(CellAttrs::UNDERSCORE),
                5 => attrs.attrs.insert(CellAttrs::BLINK),
                7 => attrs.attrs.insert(CellAttrs::REVERSE),
                9 => attrs.attrs.insert(CellAttrs::STRIKETHROUGH),
                22 => attrs.attrs.remove(CellAttrs::BOLD),
                23 => attrs.attrs.remove(CellAttrs::ITALICS),
                24 => attrs.attrs.remove(CellAttrs::UNDERSCORE),
                25 => attrs.attrs.remove(CellAttrs::BLINK),
                27 => attrs.attrs.remove(CellAttrs::REVERSE),
                29 => attrs.attrs.remove(CellAttrs::STRIKETHROUGH),
                30..=37 => attrs.fg = named_color(param - 30),
                39 => attrs.fg = Color::Default,
                40..=47 => attrs.bg = named_color(param - 40),
                49 => attrs.bg = Color::Default,
                // aixterm bright foregrounds imply bold, following
                // xterm.
                90..=97 => {
                    attrs.fg = bright_color(param - 90);
                    attrs.attrs.insert(CellAttrs::BOLD);
                }
                100..=107 => attrs.bg = bright_color(param - 100),
                38 | 48 => {
                    // Parse the extended-color introducer, but the
                    // palette is the fixed named one: skip its payload.
                    match iter.next() {
                        Some(5) => {
                            iter.next();
                        }
                        Some(2) => {
                            iter.next();
                            iter.next();
                            iter.next();
                        }
                        _ => {}
                    }
                }
                _ => warn!(self.logger, "(SGR) unknown parameter {}", param),
            }
        }
        self.cursor.attrs = attrs;
    }
}

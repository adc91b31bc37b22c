//! The character stream parser.
//!
//! [`Stream`] consumes decoded characters one at a time, recognizes
//! control codes, `ESC`/`CSI`/sharp/charset-designation sequences and
//! dispatches named events to every attached [`Handler`] in attach
//! order. It performs no screen mutation itself; [`Screen`](::Screen)
//! is simply one possible listener.

use std::cell::RefCell;
use std::cmp::min;
use std::rc::Rc;

use slog::{Discard, Logger};

use control::{C0, C1};

/// Upper bound on CSI parameters kept for one sequence. Sequences
/// carrying more abort with a `debug` event.
pub const MAX_PARAMS: usize = 16;

/// Largest value a single numeric parameter can take.
const PARAM_CAP: u32 = 9999;

/// A listener for parser events.
///
/// One method per event, each defaulting to a no-op, so a listener only
/// implements what it observes. `before`/`after` are called around every
/// delivered event with the event name; `debug` receives sequences the
/// parser did not recognize.
pub trait Handler {
    /// Called before each event is delivered to this listener.
    fn before(&mut self, _event: &'static str) {}
    /// Called after each event was delivered to this listener.
    fn after(&mut self, _event: &'static str) {}
    /// An unrecognized sequence: its parameters and the final byte.
    fn debug(&mut self, _params: &[u32], _byte: char) {}

    /// A character to be displayed.
    fn draw(&mut self, _ch: char) {}
    /// BEL. No screen mutation, visible to listeners only.
    fn bell(&mut self) {}
    /// BS.
    fn backspace(&mut self) {}
    /// HT, move right to the next tab stop.
    fn tab(&mut self) {}
    /// LF, VT or FF.
    fn linefeed(&mut self) {}
    /// CR.
    fn carriage_return(&mut self) {}
    /// SO, activate the G1 character set.
    fn shift_out(&mut self) {}
    /// SI, activate the G0 character set.
    fn shift_in(&mut self) {}

    /// RIS, reset the terminal to its initial state.
    fn reset(&mut self) {}
    /// IND, move down one line scrolling at the bottom margin.
    fn index(&mut self) {}
    /// RI, the mirror of `index`.
    fn reverse_index(&mut self) {}
    /// HTS, set a tab stop at the current column.
    fn set_tab_stop(&mut self) {}
    /// DECSC.
    fn save_cursor(&mut self) {}
    /// DECRC.
    fn restore_cursor(&mut self) {}
    /// DECALN, fill the screen with uppercase E.
    fn alignment_display(&mut self) {}
    /// Designate the charset named by `code` into G0 (`mode` is `(`)
    /// or G1 (`mode` is `)`).
    fn set_charset(&mut self, _code: char, _mode: char) {}

    /// CUU.
    fn cursor_up(&mut self, _count: u32) {}
    /// CUD / VPR.
    fn cursor_down(&mut self, _count: u32) {}
    /// CUF / HPR.
    fn cursor_forward(&mut self, _count: u32) {}
    /// CUB.
    fn cursor_back(&mut self, _count: u32) {}
    /// CPL, up plus carriage return.
    fn cursor_up1(&mut self, _count: u32) {}
    /// CNL, down plus carriage return.
    fn cursor_down1(&mut self, _count: u32) {}
    /// CHA / HPA, 1-based column.
    fn cursor_to_column(&mut self, _column: u32) {}
    /// VPA, 1-based line.
    fn cursor_to_line(&mut self, _line: u32) {}
    /// CUP / HVP, 1-based coordinates, 0 meaning default.
    fn cursor_position(&mut self, _line: u32, _column: u32) {}

    /// ICH.
    fn insert_characters(&mut self, _count: u32) {}
    /// DCH.
    fn delete_characters(&mut self, _count: u32) {}
    /// ECH.
    fn erase_characters(&mut self, _count: u32) {}
    /// IL.
    fn insert_lines(&mut self, _count: u32) {}
    /// DL.
    fn delete_lines(&mut self, _count: u32) {}
    /// EL with selector 0, 1 or 2.
    fn erase_in_line(&mut self, _how: u32) {}
    /// ED with selector 0, 1 or 2.
    fn erase_in_display(&mut self, _how: u32) {}
    /// TBC, selector 3 clears every stop.
    fn clear_tab_stop(&mut self, _how: u32) {}
    /// DECSTBM, 1-based inclusive rows, 0 meaning default.
    fn set_margins(&mut self, _top: u32, _bottom: u32) {}
    /// SM, `private` tells whether the sequence carried `?`.
    fn set_mode(&mut self, _modes: &[u32], _private: bool) {}
    /// RM.
    fn reset_mode(&mut self, _modes: &[u32], _private: bool) {}
    /// SGR.
    fn select_graphic_rendition(&mut self, _params: &[u32]) {}
}

/// Parser states.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    /// Ground: plain characters and C0/C1 controls.
    Stream,
    /// Just saw ESC.
    Escape,
    /// Inside CSI parameter bytes.
    Arguments,
    /// After `ESC #`.
    Sharp,
    /// After `ESC (` or `ESC )`.
    Charset,
}

/// The sequence being collected while in the `Arguments` (or `Charset`)
/// state.
#[derive(Debug)]
struct Sequence {
    params: [u32; MAX_PARAMS],
    len: usize,
    current: u32,
    private: bool,
    mode: char,
}

impl Sequence {
    fn new() -> Sequence {
        Sequence {
            params: [0; MAX_PARAMS],
            len: 0,
            current: 0,
            private: false,
            mode: '(',
        }
    }

    fn clear(&mut self) {
        self.len = 0;
        self.current = 0;
        self.private = false;
    }

    fn accumulate(&mut self, digit: u32) {
        self.current = min(self.current * 10 + digit, PARAM_CAP);
    }

    /// Finish the parameter under accumulation. `false` means the
    /// parameter list is full.
    fn push_current(&mut self) -> bool {
        if self.len == MAX_PARAMS {
            return false;
        }
        self.params[self.len] = self.current;
        self.len += 1;
        self.current = 0;
        true
    }

    fn params(&self) -> &[u32] {
        &self.params[..self.len]
    }

    fn arg(&self, idx: usize) -> u32 {
        self.params().get(idx).cloned().unwrap_or(0)
    }
}

macro_rules! dispatch {
    ($slf:ident, $event:ident ( $($arg:expr),* )) => {
        for listener in &$slf.listeners {
            let mut listener = listener.borrow_mut();
            listener.before(stringify!($event));
            listener.$event($($arg),*);
            listener.after(stringify!($event));
        }
    };
}

/// The parser/dispatcher.
///
/// Feed it characters; attached listeners receive the resulting events
/// serially, in attach order. Listener callbacks must not resize an
/// attached screen mid-dispatch.
pub struct Stream {
    state: State,
    seq: Sequence,
    listeners: Vec<Rc<RefCell<dyn Handler>>>,
    logger: Logger,
}

impl Stream {
    pub fn new() -> Stream {
        Stream::with_logger(Logger::root(Discard, o!()))
    }

    pub fn with_logger(logger: Logger) -> Stream {
        Stream {
            state: State::Stream,
            seq: Sequence::new(),
            listeners: Vec::new(),
            logger: logger,
        }
    }

    /// Attach a listener. Every event is delivered to all listeners in
    /// attach order.
    pub fn attach(&mut self, listener: Rc<RefCell<dyn Handler>>) {
        self.listeners.push(listener);
    }

    /// Feed every character of `input` to the parser.
    pub fn feed(&mut self, input: &str) {
        for ch in input.chars() {
            self.feed_char(ch);
        }
    }

    /// Advance the state machine by one character.
    pub fn feed_char(&mut self, ch: char) {
        match self.state {
            State::Stream => self.advance_stream(ch),
            State::Escape => self.advance_escape(ch),
            State::Sharp => self.advance_sharp(ch),
            State::Charset => self.advance_charset(ch),
            State::Arguments => self.advance_arguments(ch),
        }
    }

    fn advance_stream(&mut self, ch: char) {
        match ch {
            C0::BEL => dispatch!(self, bell()),
            C0::BS => dispatch!(self, backspace()),
            C0::HT => dispatch!(self, tab()),
            C0::LF | C0::VT | C0::FF => dispatch!(self, linefeed()),
            C0::CR => dispatch!(self, carriage_return()),
            C0::SO => dispatch!(self, shift_out()),
            C0::SI => dispatch!(self, shift_in()),
            C0::ESC => self.state = State::Escape,
            C1::CSI => {
                self.seq.clear();
                self.state = State::Arguments;
            }
            C0::NUL | C0::DEL => {}
            _ => dispatch!(self, draw(ch)),
        }
    }

    fn advance_escape(&mut self, ch: char) {
        self.state = State::Stream;
        match ch {
            '#' => self.state = State::Sharp,
            '[' => {
                self.seq.clear();
                self.state = State::Arguments;
            }
            '(' | ')' => {
                self.seq.clear();
                self.seq.mode = ch;
                self.state = State::Charset;
            }
            'c' => dispatch!(self, reset()),
            'D' => dispatch!(self, index()),
            'E' => dispatch!(self, linefeed()),
            'H' => dispatch!(self, set_tab_stop()),
            'M' => dispatch!(self, reverse_index()),
            '7' => dispatch!(self, save_cursor()),
            '8' => dispatch!(self, restore_cursor()),
            _ => {
                warn!(
                    self.logger,
                    "[unhandled! (ESC)] byte={:?} ({:02x})",
                    ch,
                    ch as u32
                );
                dispatch!(self, debug(&[], ch));
            }
        }
    }

    fn advance_sharp(&mut self, ch: char) {
        self.state = State::Stream;
        match ch {
            '8' => dispatch!(self, alignment_display()),
            _ => {
                warn!(self.logger, "[unhandled! (sharp)] byte={:?}", ch);
                dispatch!(self, debug(&[], ch));
            }
        }
    }

    fn advance_charset(&mut self, ch: char) {
        self.state = State::Stream;
        let mode = self.seq.mode;
        trace!(self.logger, "(charset) code={:?} mode={:?}", ch, mode);
        dispatch!(self, set_charset(ch, mode));
    }

    fn advance_arguments(&mut self, ch: char) {
        match ch {
            '?' => {
                // Only the first parameter byte may mark the sequence
                // private.
                if self.seq.len == 0 && self.seq.current == 0 {
                    self.seq.private = true;
                }
            }
            // Basic controls embedded mid-sequence are executed without
            // touching the collected parameters.
            C0::BEL => dispatch!(self, bell()),
            C0::BS => dispatch!(self, backspace()),
            C0::HT => dispatch!(self, tab()),
            C0::LF | C0::VT | C0::FF => dispatch!(self, linefeed()),
            C0::CR => dispatch!(self, carriage_return()),
            C0::SP => {}
            C0::CAN | C0::SUB => {
                // VT100 displays the aborting character.
                dispatch!(self, draw(ch));
                self.seq.clear();
                self.state = State::Stream;
            }
            '0'..='9' => self.seq.accumulate(ch as u32 - '0' as u32),
            ';' => {
                if !self.seq.push_current() {
                    self.overflow(ch);
                }
            }
            _ => {
                if !self.seq.push_current() {
                    self.overflow(ch);
                    return;
                }
                self.dispatch_csi(ch);
                self.seq.clear();
                self.state = State::Stream;
            }
        }
    }

    /// Too many parameters: report and drop the whole sequence.
    fn overflow(&mut self, ch: char) {
        warn!(
            self.logger,
            "[too many parameters] params={:?}, byte={:?}",
            self.seq.params(),
            ch
        );
        let seq = &self.seq;
        dispatch!(self, debug(seq.params(), ch));
        self.seq.clear();
        self.state = State::Stream;
    }

    fn dispatch_csi(&mut self, action: char) {
        let seq = &self.seq;
        let params = seq.params();
        let private = seq.private;
        let p0 = seq.arg(0);
        let p1 = seq.arg(1);
        trace!(
            self.logger,
            "(CSI) action={:?}, params={:?}, private={:?}",
            action,
            params,
            private
        );
        match action {
            '@' => dispatch!(self, insert_characters(p0)),
            'A' => dispatch!(self, cursor_up(p0)),
            'B' | 'e' => dispatch!(self, cursor_down(p0)),
            'C' | 'a' => dispatch!(self, cursor_forward(p0)),
            'D' => dispatch!(self, cursor_back(p0)),
            'E' => dispatch!(self, cursor_down1(p0)),
            'F' => dispatch!(self, cursor_up1(p0)),
            'G' | '\'' => dispatch!(self, cursor_to_column(p0)),
            'H' | 'f' => dispatch!(self, cursor_position(p0, p1)),
            'J' => dispatch!(self, erase_in_display(p0)),
            'K' => dispatch!(self, erase_in_line(p0)),
            'L' => dispatch!(self, insert_lines(p0)),
            'M' => dispatch!(self, delete_lines(p0)),
            'P' => dispatch!(self, delete_characters(p0)),
            'X' => dispatch!(self, erase_characters(p0)),
            'd' => dispatch!(self, cursor_to_line(p0)),
            'g' => dispatch!(self, clear_tab_stop(p0)),
            'h' => dispatch!(self, set_mode(params, private)),
            'l' => dispatch!(self, reset_mode(params, private)),
            'm' => dispatch!(self, select_graphic_rendition(params)),
            'r' => dispatch!(self, set_margins(p0, p1)),
            's' => dispatch!(self, save_cursor()),
            'u' => dispatch!(self, restore_cursor()),
            _ => {
                warn!(
                    self.logger,
                    "[unhandled! (CSI)] action={:?}, params={:?}",
                    action,
                    params
                );
                dispatch!(self, debug(params, action));
            }
        }
    }
}

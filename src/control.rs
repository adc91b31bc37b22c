//! Control characters recognized by the parser.
//!
//! The parser works on decoded characters rather than raw bytes, so the
//! constants here are `char`s.

/// C0 set of 7-bit control characters (from ANSI X3.4-1977).
#[allow(non_snake_case)]
pub mod C0 {
    /// Null filler, ignored by the terminal.
    pub const NUL: char = '\x00';
    /// Bell, triggers the bell, buzzer, or beeper on the terminal.
    pub const BEL: char = '\x07';
    /// Backspace, can be used to define overstruck characters.
    pub const BS: char = '\x08';
    /// Horizontal Tabulation, move to next predetermined position.
    pub const HT: char = '\x09';
    /// Linefeed, move to same position on next line.
    pub const LF: char = '\x0a';
    /// Vertical Tabulation, move to next predetermined line.
    pub const VT: char = '\x0b';
    /// Form Feed, move to next form or page.
    pub const FF: char = '\x0c';
    /// Carriage Return, move to first character of current line.
    pub const CR: char = '\x0d';
    /// Shift Out, switch to G1 (other half of character set).
    pub const SO: char = '\x0e';
    /// Shift In, switch to G0 (normal half of character set).
    pub const SI: char = '\x0f';
    /// Cancel (makes VT100 abort current escape sequence if any).
    pub const CAN: char = '\x18';
    /// Substitute (VT100 uses this to display parity errors).
    pub const SUB: char = '\x1a';
    /// Prefix to an escape sequence.
    pub const ESC: char = '\x1b';
    /// Space.
    pub const SP: char = '\x20';
    /// Delete, ignored by the terminal.
    pub const DEL: char = '\x7f';
}

/// C1 set of 8-bit control characters (from ANSI X3.64-1979).
///
/// CSI is the only one the parser acts upon; the rest of the C1 range
/// passes through like any other character.
#[allow(non_snake_case)]
pub mod C1 {
    /// Control Sequence Introducer.
    pub const CSI: char = '\u{9b}';
}

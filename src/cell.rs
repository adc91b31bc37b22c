use std::fmt;

/// Color of a cell, either the terminal default or one of the named
/// palette entries selectable through SGR 30-37/40-47 and their
/// aixterm bright variants (90-97/100-107).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Default,
    Black,
    Red,
    Green,
    /// SGR 33. VT-era palettes call this brown, not yellow.
    Brown,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightBrown,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    /// Lowercase palette name, e.g. `"default"` or `"brightred"`.
    pub fn name(&self) -> &'static str {
        match *self {
            Color::Default => "default",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Brown => "brown",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
            Color::BrightBlack => "brightblack",
            Color::BrightRed => "brightred",
            Color::BrightGreen => "brightgreen",
            Color::BrightBrown => "brightbrown",
            Color::BrightBlue => "brightblue",
            Color::BrightMagenta => "brightmagenta",
            Color::BrightCyan => "brightcyan",
            Color::BrightWhite => "brightwhite",
        }
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::Default
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

bitflags! {
    /// Boolean text attributes of a cell, packed into one byte.
    pub struct CellAttrs: u8 {
        const BOLD          = 0b000001;
        const ITALICS       = 0b000010;
        const UNDERSCORE    = 0b000100;
        const STRIKETHROUGH = 0b001000;
        const REVERSE       = 0b010000;
        const BLINK         = 0b100000;
    }
}

impl Default for CellAttrs {
    fn default() -> CellAttrs {
        CellAttrs::empty()
    }
}

/// One slot of the screen grid: a displayed character plus its styling.
///
/// Cells are plain values; every draw or erase writes a fresh one. The
/// default cell is a space with default colors and no attributes, and is
/// what blank regions of the grid are filled with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cell {
    pub data: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

impl Cell {
    pub fn bold(&self) -> bool {
        self.attrs.contains(CellAttrs::BOLD)
    }
    pub fn italics(&self) -> bool {
        self.attrs.contains(CellAttrs::ITALICS)
    }
    pub fn underscore(&self) -> bool {
        self.attrs.contains(CellAttrs::UNDERSCORE)
    }
    pub fn strikethrough(&self) -> bool {
        self.attrs.contains(CellAttrs::STRIKETHROUGH)
    }
    pub fn reverse(&self) -> bool {
        self.attrs.contains(CellAttrs::REVERSE)
    }
    pub fn blink(&self) -> bool {
        self.attrs.contains(CellAttrs::BLINK)
    }
    /// The same cell with another character in it.
    pub fn with_data(&self, data: char) -> Cell {
        Cell { data: data, ..*self }
    }
}

impl Default for Cell {
    fn default() -> Cell {
        Cell {
            data: ' ',
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttrs::empty(),
        }
    }
}

/// The screen cursor: position, visibility and the style template
/// applied to freshly drawn cells. The template's `data` is ignored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
    pub attrs: Cell,
    pub hidden: bool,
}

impl Default for Cursor {
    fn default() -> Cursor {
        Cursor {
            x: 0,
            y: 0,
            attrs: Cell::default(),
            hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_blank() {
        let cell = Cell::default();
        assert_eq!(cell.data, ' ');
        assert_eq!(cell.fg, Color::Default);
        assert_eq!(cell.bg, Color::Default);
        assert!(!cell.bold() && !cell.italics() && !cell.underscore());
        assert!(!cell.strikethrough() && !cell.reverse() && !cell.blink());
    }

    #[test]
    fn with_data_keeps_style() {
        let mut cell = Cell::default();
        cell.fg = Color::Red;
        cell.attrs.insert(CellAttrs::BOLD);
        let drawn = cell.with_data('x');
        assert_eq!(drawn.data, 'x');
        assert_eq!(drawn.fg, Color::Red);
        assert!(drawn.bold());
    }

    #[test]
    fn color_names() {
        assert_eq!(Color::Default.name(), "default");
        assert_eq!(Color::Brown.name(), "brown");
        assert_eq!(Color::BrightMagenta.name(), "brightmagenta");
    }
}

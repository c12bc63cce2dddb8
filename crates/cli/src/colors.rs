use colored::{ColoredString, Colorize};

/// Semantic colors for the terminal front-end.
///
/// Extends `colored::Colorize` so any string can be styled by role instead of
/// by raw RGB value.
pub trait ThemeColor: Colorize + Sized {
    fn black_stone(self) -> ColoredString {
        self.truecolor(255, 210, 100).bold()
    }

    fn white_stone(self) -> ColoredString {
        self.truecolor(220, 230, 255).bold()
    }

    fn grid(self) -> ColoredString {
        self.truecolor(100, 110, 150)
    }

    fn highlight(self) -> ColoredString {
        self.truecolor(100, 210, 255)
    }

    fn success(self) -> ColoredString {
        self.truecolor(80, 250, 210)
    }

    fn failure(self) -> ColoredString {
        self.truecolor(255, 90, 120)
    }

    fn warning(self) -> ColoredString {
        self.truecolor(255, 160, 80)
    }
}

impl<T: Colorize> ThemeColor for T {}

//! Console output sink for status lines, headlines, tables and progress.
//!
//! One `Console` is constructed per invocation and passed by reference;
//! headline numbering and the border style are instance state, never
//! process-wide globals.

use std::io::{self, IsTerminal, Write};

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Default,
    Green,
    Yellow,
    Red,
    Cyan,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Default => "",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Red => "\x1b[31m",
            Color::Cyan => "\x1b[36m",
        }
    }
}

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

struct Spinner {
    message: String,
    frame: usize,
}

pub struct Console<W: Write> {
    out: W,
    verbose: bool,
    color: bool,
    fancy_border: bool,
    headline_counter: u32,
    spinner: Option<Spinner>,
}

impl Console<io::Stdout> {
    /// Console on stdout; color is enabled only when stdout is a terminal.
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Console::new(io::stdout()).with_color(color)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            verbose: false,
            color: false,
            fancy_border: true,
            headline_counter: 0,
            spinner: None,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_fancy_border(mut self, fancy: bool) -> Self {
        self.fancy_border = fancy;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Consume the console and hand back the writer (used by tests to
    /// inspect captured output).
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    pub fn writeln(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }

    fn paint(&self, color: Color, text: &str) -> String {
        if !self.color || color == Color::Default {
            return text.to_string();
        }
        format!("{}{}{}", color.code(), text, RESET)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(Color::Green, text)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(Color::Yellow, text)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(Color::Red, text)
    }

    /// Write a numbered, boxed headline.
    pub fn headline(&mut self, title: &str) {
        self.headline_colored(title, Color::Default);
    }

    pub fn headline_colored(&mut self, title: &str, color: Color) {
        self.headline_counter += 1;
        let title = format!(" {}: {} ", self.headline_counter, title);

        let (top_left, top_right, bottom_left, bottom_right, vertical, horizontal) =
            if self.fancy_border {
                ('╔', '╗', '╚', '╝', '║', '═')
            } else {
                ('+', '+', '+', '+', '|', '-')
            };

        let bar: String = std::iter::repeat(horizontal)
            .take(title.chars().count())
            .collect();

        let top = self.paint(color, &format!("{top_left}{bar}{top_right}"));
        let mid = self.paint(color, &format!("{vertical}{title}{vertical}"));
        let bottom = self.paint(color, &format!("{bottom_left}{bar}{bottom_right}"));

        self.writeln("");
        self.writeln(&top);
        self.writeln(&mid);
        self.writeln(&bottom);
    }

    /// Render an aligned table with a border row above and below the
    /// header and at the bottom.
    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>]) {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let border: String = widths
            .iter()
            .map(|w| format!("+{}", "-".repeat(w + 2)))
            .chain(std::iter::once("+".to_string()))
            .collect();

        let render_row = |cells: &[String], widths: &[usize]| -> String {
            let mut line = String::new();
            for (cell, width) in cells.iter().zip(widths) {
                let pad = width - cell.chars().count();
                line.push_str(&format!("| {}{} ", cell, " ".repeat(pad)));
            }
            line.push('|');
            line
        };

        let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

        self.writeln(&border);
        self.writeln(&render_row(&header_cells, &widths));
        self.writeln(&border);
        for row in rows {
            self.writeln(&render_row(row, &widths));
        }
        self.writeln(&border);
    }

    /// Overwrite the current line with `text`.
    pub fn replace_inline(&mut self, text: &str) {
        self.write("\r");
        self.write(text);
    }

    /// Clear the current line after an inline countdown.
    pub fn clear_line(&mut self) {
        self.write("\r");
        self.write("                ");
        self.writeln("");
    }

    /// Count down on a single line, one tick per second.
    pub fn countdown(&mut self, seconds: u64) {
        if seconds == 0 {
            return;
        }
        let mut remaining = seconds;
        while remaining > 0 {
            self.replace_inline(&format!("{} Seconds", remaining));
            remaining -= 1;
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
        self.clear_line();
    }

    pub fn spinner_start(&mut self, message: &str) {
        self.spinner = Some(Spinner {
            message: message.to_string(),
            frame: 0,
        });
        self.draw_spinner();
    }

    pub fn spinner_tick(&mut self) {
        if let Some(spinner) = &mut self.spinner {
            spinner.frame = (spinner.frame + 1) % SPINNER_FRAMES.len();
        }
        self.draw_spinner();
    }

    pub fn spinner_stop(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            let blank = " ".repeat(spinner.message.chars().count() + 2);
            self.write(&format!("\r{}\r", blank));
        }
    }

    fn draw_spinner(&mut self) {
        let line = match &self.spinner {
            Some(spinner) => format!("\r{} {}", SPINNER_FRAMES[spinner.frame], spinner.message),
            None => return,
        };
        self.write(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn headline_numbers_increment_per_console() {
        let mut console = Console::new(Vec::new()).with_fancy_border(false);
        console.headline("First");
        console.headline("Second");
        let output = captured(console);
        assert!(output.contains("| 1: First |"));
        assert!(output.contains("| 2: Second |"));
    }

    #[test]
    fn headline_fancy_border_uses_box_drawing() {
        let mut console = Console::new(Vec::new());
        console.headline("Deploy");
        let output = captured(console);
        assert!(output.contains("║ 1: Deploy ║"));
        assert!(output.contains('╔'));
        assert!(output.contains('╝'));
    }

    #[test]
    fn table_aligns_columns() {
        let mut console = Console::new(Vec::new());
        console.table(
            &["Param", "Value"],
            &[
                vec!["db_host".to_string(), "localhost".to_string()],
                vec!["x".to_string(), "1".to_string()],
            ],
        );
        let output = captured(console);
        assert!(output.contains("| Param   | Value     |"));
        assert!(output.contains("| db_host | localhost |"));
        assert!(output.contains("| x       | 1         |"));
        assert!(output.contains("+---------+-----------+"));
    }

    #[test]
    fn styled_text_is_plain_without_color() {
        let console = Console::new(Vec::new());
        assert_eq!(console.success("ok"), "ok");
        assert_eq!(console.error("bad"), "bad");
    }

    #[test]
    fn styled_text_wraps_in_ansi_with_color() {
        let console = Console::new(Vec::new()).with_color(true);
        assert_eq!(console.success("ok"), "\x1b[32mok\x1b[0m");
        assert_eq!(console.warning("hm"), "\x1b[33mhm\x1b[0m");
    }

    #[test]
    fn spinner_draws_and_clears() {
        let mut console = Console::new(Vec::new());
        console.spinner_start("working");
        console.spinner_tick();
        console.spinner_stop();
        let output = captured(console);
        assert!(output.contains("| working"));
        assert!(output.contains("/ working"));
        assert!(output.ends_with("\r"));
    }
}

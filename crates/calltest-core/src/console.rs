//! Styled pass/fail lines.

use std::io::Write;

use colored::Colorize;

/// When to style output with ANSI colors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ColorChoice {
    /// Defer to `colored`'s own terminal and `NO_COLOR`/`CLICOLOR` detection.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Parse from string (case-insensitive). Unknown values fall back to `Auto`.
    #[must_use]
    pub fn from_str_loose(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "always" | "on" | "force" | "true" => Self::Always,
            "never" | "off" | "none" | "false" => Self::Never,
            _ => Self::Auto,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        }
    }

    /// Install this choice as `colored`'s process-wide override.
    ///
    /// Only binaries should call this; library code styles per [`Console`].
    pub fn apply_global(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Pass,
    Fail,
}

/// Line-oriented writer for engine verdicts.
///
/// Write errors are dropped: console output is cosmetic and must never turn a
/// verdict into a crash.
#[derive(Debug)]
pub struct Console<W> {
    writer: W,
    color: ColorChoice,
}

impl Console<std::io::Stdout> {
    /// Console on the process's standard output.
    #[must_use]
    pub fn stdout(color: ColorChoice) -> Self {
        Self::new(std::io::stdout(), color)
    }
}

impl<W: Write> Console<W> {
    #[must_use]
    pub const fn new(writer: W, color: ColorChoice) -> Self {
        Self { writer, color }
    }

    /// Emit a green line.
    pub fn pass(&mut self, line: &str) {
        let styled = self.paint(line, Tone::Pass);
        let _ = writeln!(self.writer, "{styled}");
    }

    /// Emit a red line.
    pub fn fail(&mut self, line: &str) {
        let styled = self.paint(line, Tone::Fail);
        let _ = writeln!(self.writer, "{styled}");
    }

    /// Emit a red header followed by tab-indented entries inside brackets.
    pub fn fail_block(&mut self, header: &str, entries: &[String]) {
        self.fail(header);
        self.fail("[");
        for entry in entries {
            let styled = self.paint(entry, Tone::Fail);
            let _ = writeln!(self.writer, "\t{styled}");
        }
        self.fail("]");
    }

    pub fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if self.color == ColorChoice::Never {
            return text.to_owned();
        }
        match tone {
            Tone::Pass => text.green().to_string(),
            Tone::Fail => text.red().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).expect("utf8")
    }

    #[test]
    fn plain_console_writes_one_line_per_verdict() {
        let mut console = Console::new(Vec::new(), ColorChoice::Never);
        console.pass("PASS: ok");
        console.fail("FAIL: nope");
        assert_eq!(written(console), "PASS: ok\nFAIL: nope\n");
    }

    #[test]
    fn fail_block_brackets_entries() {
        let mut console = Console::new(Vec::new(), ColorChoice::Never);
        console.fail_block(
            "FAIL: swap",
            &[String::from("case 1"), String::from("case 2")],
        );
        assert_eq!(written(console), "FAIL: swap\n[\n\tcase 1\n\tcase 2\n]\n");
    }

    #[test]
    fn color_choice_parses_loosely() {
        assert_eq!(ColorChoice::from_str_loose("ALWAYS"), ColorChoice::Always);
        assert_eq!(ColorChoice::from_str_loose("off"), ColorChoice::Never);
        assert_eq!(ColorChoice::from_str_loose("whatever"), ColorChoice::Auto);
    }
}

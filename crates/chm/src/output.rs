//! Colored progress and summary output on stderr.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    success: Style,
    warning: Style,
    error: Style,
    heading: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            heading: Style::new().cyan().bold(),
        }
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }

    /// Plain progress line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.styled(&self.success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.error, msg);
    }

    /// Summary title, usually the help project title.
    pub(crate) fn heading(&self, msg: &str) {
        self.styled(&self.heading, msg);
    }

    /// One `label  value` summary row.
    pub(crate) fn count(&self, label: &str, value: usize) {
        let _ = self.term.write_line(&format!("  {label:<10} {value:>6}"));
    }
}

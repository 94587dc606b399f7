//! Status lines for the terminal.
//!
//! Everything goes to stderr so that `metro render` can stream markup on stdout.

use console::{Style, Term};

/// How a status line is colored.
#[derive(Clone, Copy)]
enum Tone {
    Plain,
    Good,
    Caution,
    Bad,
    Heading,
}

impl Tone {
    fn style(self) -> Option<Style> {
        match self {
            Self::Plain => None,
            Self::Good => Some(Style::new().green()),
            Self::Caution => Some(Style::new().yellow()),
            Self::Bad => Some(Style::new().red()),
            Self::Heading => Some(Style::new().cyan().bold()),
        }
    }
}

pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Tone::Good, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(Tone::Caution, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Bad, msg);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.line(Tone::Heading, msg);
    }

    /// Write one line; a closed stderr is not worth failing over.
    fn line(&self, tone: Tone, msg: &str) {
        let text = match tone.style() {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_owned(),
        };
        let _ = self.term.write_line(&text);
    }
}

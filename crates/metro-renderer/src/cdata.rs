//! Keeps CDATA sections out of reach of the rewrite passes.
//!
//! Code macros carry their body verbatim in CDATA. Later passes work on
//! markup with regexes, so every CDATA section is swapped for an opaque
//! token first and put back once all passes have run.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>").unwrap());

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").unwrap());

/// CDATA sections taken out of a document.
#[derive(Debug, Default)]
pub(crate) struct Shelf {
    sections: Vec<String>,
}

impl Shelf {
    /// Replace every CDATA section in `html` with a token.
    pub(crate) fn stash(&mut self, html: &str) -> String {
        CDATA_RE
            .replace_all(html, |caps: &Captures<'_>| {
                self.sections.push(caps[0].to_owned());
                format!("\u{E000}{}\u{E001}", self.sections.len() - 1)
            })
            .into_owned()
    }

    /// Put stashed sections back in place of their tokens.
    pub(crate) fn restore(&self, html: &str) -> String {
        if self.sections.is_empty() {
            return html.to_owned();
        }
        TOKEN_RE
            .replace_all(html, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.sections.get(index))
                    .map_or_else(|| caps[0].to_owned(), Clone::clone)
            })
            .into_owned()
    }
}

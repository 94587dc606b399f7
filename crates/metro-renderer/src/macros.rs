//! Callout markers and blockquote directives.
//!
//! Two syntaxes produce Confluence macros:
//!
//! - Paragraph markers `~?...?~`, `~!...!~` and `~%...%~` become info, note
//!   and warning macros. Opening and closing markers are replaced
//!   independently, so a callout may span several paragraphs.
//! - Blockquotes whose paragraphs start with a directive keyword
//!   (`Info:`, `Note:`, `Warning:`, `Panel:`, `Expand:`, `ExpandAll`,
//!   `LiveSearch`) are replaced by the assembled macros. Paragraphs without a
//!   keyword are dropped from the replacement; a blockquote without any
//!   keyword is left as is. Only innermost blockquotes are considered.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::util::capitalize_first;

/// Closes a callout opened by [`Callout::open_tag`].
const CLOSE_TAG: &str = "</p></ac:rich-text-body></ac:structured-macro></p>";

const BLOCKQUOTE_OPEN: &str = "<blockquote>";
const BLOCKQUOTE_CLOSE: &str = "</blockquote>";

static EXPAND_ALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:<(?:em|strong)>)?\s*ExpandAll\b").unwrap());

static LIVE_SEARCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:<(?:em|strong)>)?\s*LiveSearch\b").unwrap());

/// Keywords that take a colon, in matching priority order.
static KEYWORDS: LazyLock<Vec<Keyword>> = LazyLock::new(|| {
    vec![
        Keyword::new("Info", Directive::Callout(Callout::Info)),
        Keyword::new("Note", Directive::Callout(Callout::Note)),
        Keyword::new("Warning", Directive::Callout(Callout::Warning)),
        Keyword::new("Panel", Directive::Titled("panel")),
        Keyword::new("Expand", Directive::Titled("expand")),
    ]
});

/// Callout macro kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Callout {
    Info,
    Note,
    Warning,
}

impl Callout {
    fn macro_name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Note => "note",
            Self::Warning => "warning",
        }
    }

    fn open_tag(self) -> String {
        format!(
            r#"<p><ac:structured-macro ac:name="{}"><ac:rich-text-body><p>"#,
            self.macro_name()
        )
    }
}

/// What a blockquote paragraph turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Directive {
    Callout(Callout),
    /// Macro with a title parameter and a body (`panel`, `expand`).
    Titled(&'static str),
    ExpandAll,
    LiveSearch,
}

/// A directive keyword followed by a colon.
struct Keyword {
    directive: Directive,
    detect: Regex,
    /// Spelling variants, tried in order; the first match is stripped.
    variants: Vec<Regex>,
}

impl Keyword {
    fn new(word: &str, directive: Directive) -> Self {
        const OPEN: &str = r"<(?:em|strong)>\s*";
        const CLOSE: &str = r"</(?:em|strong)>";

        let detect = format!(r"(?i)^(?:<(?:em|strong)>)?\s*{word}\s*(?:{CLOSE})?\s*:");
        let variants = [
            format!(r"(?i)^{word}:\s*"),
            format!(r"(?i)^{OPEN}{word}:{CLOSE}\s*"),
            format!(r"(?i)^{OPEN}{word}{CLOSE}:\s*"),
            format!(r"(?i)^{word}\s+:\s*"),
            format!(r"(?i)^{OPEN}{word}\s+:{CLOSE}\s*"),
            format!(r"(?i)^{OPEN}{word}\s+{CLOSE}:\s*"),
        ];

        Self {
            directive,
            detect: Regex::new(&detect).unwrap(),
            variants: variants.iter().map(|v| Regex::new(v).unwrap()).collect(),
        }
    }

    /// Remove the keyword and its punctuation from the start of `text`.
    fn strip<'t>(&self, text: &'t str) -> &'t str {
        self.variants
            .iter()
            .find_map(|re| re.find(text))
            .map_or(text, |m| &text[m.end()..])
    }
}

/// Convert callout markers and directive blockquotes into macros.
pub(crate) fn convert(html: &str) -> String {
    let html = convert_markers(html);
    convert_blockquotes(&html)
}

/// Replace innermost directive blockquotes; enclosing ones are left as is.
fn convert_blockquotes(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(close) = rest.find(BLOCKQUOTE_CLOSE) {
        let end = close + BLOCKQUOTE_CLOSE.len();
        match rest[..close].rfind(BLOCKQUOTE_OPEN) {
            Some(open) => {
                out.push_str(&rest[..open]);
                let inner = &rest[open + BLOCKQUOTE_OPEN.len()..close];
                match convert_blockquote(inner) {
                    Some(replacement) => out.push_str(&replacement),
                    None => out.push_str(&rest[open..end]),
                }
            }
            None => out.push_str(&rest[..end]),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Replace `~?`/`~!`/`~%` paragraph markers with callout macro tags.
fn convert_markers(html: &str) -> String {
    const MARKERS: [(&str, &str, Callout); 3] = [
        ("<p>~?", "?~</p>", Callout::Info),
        ("<p>~!", "!~</p>", Callout::Note),
        ("<p>~%", "%~</p>", Callout::Warning),
    ];

    let mut out = html.to_owned();
    for (open, close, kind) in MARKERS {
        if out.contains(open) {
            out = out.replace(open, &kind.open_tag());
        }
        if out.contains(close) {
            out = out.replace(close, CLOSE_TAG);
        }
    }
    out
}

/// Build macro markup for the content of one blockquote.
///
/// Returns `None` when no paragraph carries a directive.
fn convert_blockquote(content: &str) -> Option<String> {
    let paragraphs: Vec<&str> = if content.contains("</p>") {
        let mut parts: Vec<&str> = content.split("</p>").collect();
        parts.pop();
        parts
    } else {
        vec![content]
    };

    let mut markup = String::new();
    for paragraph in paragraphs {
        let paragraph = paragraph.trim();
        let text = paragraph.strip_prefix("<p>").unwrap_or(paragraph);
        let Some((directive, rest)) = detect(text) else {
            continue;
        };
        render_directive(directive, rest, &mut markup);
    }

    if markup.is_empty() {
        None
    } else {
        Some(markup.trim_end().to_owned())
    }
}

/// Find the directive at the start of a paragraph and the text after its keyword.
fn detect(text: &str) -> Option<(Directive, &str)> {
    if let Some(keyword) = KEYWORDS.iter().find(|k| k.detect.is_match(text)) {
        return Some((keyword.directive, keyword.strip(text)));
    }
    if EXPAND_ALL_RE.is_match(text) {
        return Some((Directive::ExpandAll, ""));
    }
    if LIVE_SEARCH_RE.is_match(text) {
        return Some((Directive::LiveSearch, ""));
    }
    None
}

fn render_directive(directive: Directive, text: &str, out: &mut String) {
    match directive {
        Directive::Callout(kind) => {
            writeln!(
                out,
                "{}{}{CLOSE_TAG}",
                kind.open_tag(),
                capitalize_first(text.trim())
            )
            .unwrap();
        }
        Directive::Titled(name) => {
            let (title, body) = text.split_once('\n').unwrap_or((text, ""));
            writeln!(
                out,
                r#"<p><ac:structured-macro ac:name="{name}"><ac:parameter ac:name="title">{}</ac:parameter><ac:rich-text-body><p>{}{CLOSE_TAG}"#,
                title.trim(),
                body.trim()
            )
            .unwrap();
        }
        Directive::ExpandAll => {
            out.push_str("<ac:structured-macro ac:name=\"expand-collapse-all\"/>\n");
        }
        Directive::LiveSearch => {
            out.push_str(concat!(
                r#"<p><ac:structured-macro ac:name="livesearch">"#,
                r#"<ac:parameter ac:name="spaceKey"><ri:space ri:space-key="@self"/></ac:parameter>"#,
                r#"<ac:parameter ac:name="placeholder">Search this space</ac:parameter>"#,
                "</ac:structured-macro></p>\n",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn callout(name: &str, body: &str) -> String {
        format!(
            r#"<p><ac:structured-macro ac:name="{name}"><ac:rich-text-body><p>{body}</p></ac:rich-text-body></ac:structured-macro></p>"#
        )
    }

    #[test]
    fn test_info_marker() {
        let result = convert("<p>~?Heads up.?~</p>");
        assert_eq!(result, callout("info", "Heads up."));
    }

    #[test]
    fn test_note_and_warning_markers() {
        let result = convert("<p>~!A note.!~</p>\n<p>~%A warning.%~</p>");
        assert_eq!(
            result,
            format!("{}\n{}", callout("note", "A note."), callout("warning", "A warning."))
        );
    }

    #[test]
    fn test_marker_counts_match_occurrences() {
        let result = convert("<p>~?one?~</p>\n<p>~?two?~</p>\n<p>~%three%~</p>");
        assert_eq!(result.matches(r#"ac:name="info""#).count(), 2);
        assert_eq!(result.matches(r#"ac:name="warning""#).count(), 1);
        assert_eq!(
            result.matches("<ac:rich-text-body>").count(),
            result.matches("</ac:rich-text-body>").count()
        );
    }

    #[test]
    fn test_marker_spanning_paragraphs() {
        let result = convert("<p>~?First.</p>\n<p>Second.?~</p>");
        assert_eq!(
            result,
            r#"<p><ac:structured-macro ac:name="info"><ac:rich-text-body><p>First.</p>
<p>Second.</p></ac:rich-text-body></ac:structured-macro></p>"#
        );
    }

    #[test]
    fn test_note_blockquote() {
        let result = convert("<blockquote><p>Note: Remember this.</p></blockquote>");
        assert_eq!(result, callout("note", "Remember this."));
    }

    #[test]
    fn test_blockquote_with_newlines() {
        let result = convert("<blockquote>\n<p>Info: keep it short.</p>\n</blockquote>\n<p>After</p>");
        assert_eq!(
            result,
            format!("{}\n<p>After</p>", callout("info", "Keep it short."))
        );
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let result = convert("<blockquote><p>WARNING: hot surface.</p></blockquote>");
        assert_eq!(result, callout("warning", "Hot surface."));
    }

    #[test]
    fn test_keyword_spelling_variants() {
        let inputs = [
            "<p>Note: text</p>",
            "<p>Note : text</p>",
            "<p><strong>Note:</strong> text</p>",
            "<p><strong>Note</strong>: text</p>",
            "<p><em>Note :</em> text</p>",
            "<p><em>Note </em>: text</p>",
        ];
        for input in inputs {
            let result = convert(&format!("<blockquote>{input}</blockquote>"));
            assert_eq!(result, callout("note", "Text"), "input: {input}");
        }
    }

    #[test]
    fn test_plain_blockquote_unchanged() {
        let html = "<blockquote><p>Just a quote.</p></blockquote>";
        assert_eq!(convert(html), html);
    }

    #[test]
    fn test_keyword_without_colon_is_not_a_directive() {
        let html = "<blockquote><p>Notes are useful.</p></blockquote>";
        assert_eq!(convert(html), html);
    }

    #[test]
    fn test_unmatched_paragraphs_are_dropped() {
        let result = convert(
            "<blockquote>\n<p>Plain text.</p>\n<p>Warning: careful.</p>\n<p>More plain text.</p>\n</blockquote>",
        );
        assert_eq!(result, callout("warning", "Careful."));
    }

    #[test]
    fn test_multiple_directives_in_one_blockquote() {
        let result = convert("<blockquote>\n<p>Info: one.</p>\n<p>Note: two.</p>\n</blockquote>");
        assert_eq!(
            result,
            format!("{}\n{}", callout("info", "One."), callout("note", "Two."))
        );
    }

    #[test]
    fn test_panel_title_and_body() {
        let result = convert("<blockquote>\n<p>Panel: Setup\nInstall the tool.\nRun it.</p>\n</blockquote>");
        assert_eq!(
            result,
            r#"<p><ac:structured-macro ac:name="panel"><ac:parameter ac:name="title">Setup</ac:parameter><ac:rich-text-body><p>Install the tool.
Run it.</p></ac:rich-text-body></ac:structured-macro></p>"#
        );
    }

    #[test]
    fn test_expand_title_only() {
        let result = convert("<blockquote><p>Expand: Details</p></blockquote>");
        assert_eq!(
            result,
            r#"<p><ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">Details</ac:parameter><ac:rich-text-body><p></p></ac:rich-text-body></ac:structured-macro></p>"#
        );
    }

    #[test]
    fn test_expand_all() {
        let result = convert("<blockquote><p>ExpandAll</p></blockquote>");
        assert_eq!(result, r#"<ac:structured-macro ac:name="expand-collapse-all"/>"#);
    }

    #[test]
    fn test_live_search() {
        let result = convert("<blockquote><p>LiveSearch</p></blockquote>");
        assert!(result.contains(r#"ac:name="livesearch""#));
        assert!(result.contains(r#"<ri:space ri:space-key="@self"/>"#));
        assert!(result.contains(">Search this space<"));
        assert!(!result.contains("blockquote"));
    }

    #[test]
    fn test_callout_keeps_inline_markup() {
        let result = convert("<blockquote><p>Info: see <a href=\"x.html\">docs</a>.</p></blockquote>");
        assert_eq!(result, callout("info", r#"See <a href="x.html">docs</a>."#));
    }

    #[test]
    fn test_several_blockquotes_independent() {
        let result = convert(
            "<blockquote><p>Note: a.</p></blockquote>\n<blockquote><p>Plain.</p></blockquote>",
        );
        assert_eq!(
            result,
            format!("{}\n<blockquote><p>Plain.</p></blockquote>", callout("note", "A."))
        );
    }

    #[test]
    fn test_convert_is_idempotent() {
        let once = convert(
            "<p>~?tip?~</p>\n<blockquote><p>Note: a.</p></blockquote>\n<blockquote><p>Quote.</p></blockquote>",
        );
        assert_eq!(convert(&once), once);
    }

    #[test]
    fn test_nested_blockquote_tags_stay_balanced() {
        let html = "<blockquote>\n<p>Note: a</p>\n<blockquote>\n<p>b</p>\n</blockquote>\n</blockquote>";
        let result = convert(html);
        assert_eq!(result, html);
        assert_eq!(
            result.matches("<blockquote>").count(),
            result.matches("</blockquote>").count()
        );
    }

    #[test]
    fn test_nested_directive_converted_inside_plain_quote() {
        let result = convert("<blockquote>\n<p>Quote.</p>\n<blockquote><p>Info: x.</p></blockquote>\n</blockquote>");
        assert_eq!(
            result,
            format!("<blockquote>\n<p>Quote.</p>\n{}\n</blockquote>", callout("info", "X."))
        );
    }
}

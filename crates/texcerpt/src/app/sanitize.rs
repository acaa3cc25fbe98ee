//! Rewrites applied to extracted section bodies before compilation.
//!
//! Extracted fragments routinely reference images, custom colors, and page-control commands that
//! are missing or meaningless in a standalone excerpt. Each rewrite here is a pure
//! `&str -> String` step; [`PIPELINE`] fixes the order they run in.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::braces;

/// Replacement text for stripped `\includegraphics` commands.
pub const IMAGE_PLACEHOLDER: &str = "[Image removed]";

const LONGTABLE_OPEN: &str = "\\begin{longtable";
const LONGTABLE_CLOSE: &str = "\\end{longtable";

/// A single named rewrite step.
#[derive(Debug, Clone, Copy)]
pub struct Rewrite {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Rewrites in the order they are applied.
pub const PIPELINE: &[Rewrite] = &[
    Rewrite {
        name: "includegraphics",
        apply: replace_images,
    },
    Rewrite {
        name: "definecolor",
        apply: strip_definecolor,
    },
    Rewrite {
        name: "color",
        apply: strip_color,
    },
    Rewrite {
        name: "Needspace",
        apply: strip_needspace,
    },
    Rewrite {
        name: "textcolor",
        apply: unwrap_textcolor,
    },
    Rewrite {
        name: "rowcolor",
        apply: strip_rowcolor,
    },
    Rewrite {
        name: "cellcolor",
        apply: strip_cellcolor,
    },
    Rewrite {
        name: "newpage",
        apply: strip_newpage,
    },
    Rewrite {
        name: "newline-comment",
        apply: strip_commented_newline,
    },
];

static INCLUDEGRAPHICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\includegraphics\s*(?:\[[^\]]*\])?\s*\{[^}]*\}").expect("valid"));
static DEFINECOLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\definecolor\{[^}]*\}\{[^}]*\}\{[^}]*\}").expect("valid"));
static COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\color\{[^}]*\}").expect("valid"));
static NEEDSPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\Needspace\{[^}]*\}").expect("valid"));
static TEXTCOLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\textcolor\{[^}]*\}").expect("valid"));
static ROWCOLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\rowcolor\{[^}]*\}").expect("valid"));
static CELLCOLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\cellcolor\{[^}]*\}").expect("valid"));
static NEWPAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\newpage\b").expect("valid"));
static COMMENTED_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\newline\s*%").expect("valid"));

pub fn replace_images(body: &str) -> String {
    INCLUDEGRAPHICS
        .replace_all(body, IMAGE_PLACEHOLDER)
        .into_owned()
}

pub fn strip_definecolor(body: &str) -> String {
    DEFINECOLOR.replace_all(body, "").into_owned()
}

pub fn strip_color(body: &str) -> String {
    COLOR.replace_all(body, "").into_owned()
}

pub fn strip_needspace(body: &str) -> String {
    NEEDSPACE.replace_all(body, "").into_owned()
}

/// `\textcolor{c}{text}` becomes `text`. The text argument is a balanced group and is unwrapped
/// recursively; a color command without one is left as is.
pub fn unwrap_textcolor(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    while let Some(head) = TEXTCOLOR.find(rest) {
        let after = &rest[head.end()..];
        match braces::split_group(after) {
            Some((text, tail)) => {
                out.push_str(&rest[..head.start()]);
                out.push_str(&unwrap_textcolor(text));
                rest = tail;
            }
            None => {
                out.push_str(&rest[..head.end()]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn strip_rowcolor(body: &str) -> String {
    ROWCOLOR.replace_all(body, "").into_owned()
}

pub fn strip_cellcolor(body: &str) -> String {
    CELLCOLOR.replace_all(body, "").into_owned()
}

pub fn strip_newpage(body: &str) -> String {
    NEWPAGE.replace_all(body, "").into_owned()
}

pub fn strip_commented_newline(body: &str) -> String {
    COMMENTED_NEWLINE.replace_all(body, "").into_owned()
}

/// Run every rewrite in [`PIPELINE`] order.
pub fn sanitize(body: &str) -> String {
    PIPELINE
        .iter()
        .fold(body.to_owned(), |text, rewrite| (rewrite.apply)(&text))
}

/// Append one `\end{longtable}` when the body opens more longtables than it closes.
///
/// Sections are cut at the first `\end`, so a longtable whose inner `tabular` closes first is
/// left dangling.
pub fn close_dangling_longtable(body: String) -> String {
    let opened = body.matches(LONGTABLE_OPEN).count();
    let closed = body.matches(LONGTABLE_CLOSE).count();
    if opened <= closed {
        return body;
    }
    tracing::debug!(opened, closed, "closing dangling longtable");
    let mut repaired = body;
    if !repaired.ends_with('\n') {
        repaired.push('\n');
    }
    repaired.push_str("\\end{longtable}");
    repaired
}

/// Sanitize a section body and repair a dangling longtable.
pub fn prepare_body(body: &str) -> String {
    close_dangling_longtable(sanitize(body))
}

//! Allow-list HTML cleaning for model output that is about to be rendered live.
//!
//! The model's reply is untrusted. Nothing it returns reaches a browser without
//! going through [`sanitize_html`] first.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Elements removed together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "iframe", "object", "embed", "noscript", "template", "frame", "frameset", "applet",
];

const ALLOWED_TAGS: &[&str] = &[
    "html", "head", "body", "title", "meta", "style",
    "header", "footer", "main", "section", "article", "aside", "nav", "div", "span",
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "a", "img", "figure", "figcaption",
    "ul", "ol", "li", "dl", "dt", "dd", "blockquote", "q", "cite", "pre", "code",
    "strong", "em", "b", "i", "u", "s", "small", "mark", "sub", "sup", "abbr", "time",
    "address", "br", "hr",
    "table", "caption", "thead", "tbody", "tfoot", "tr", "th", "td",
    "form", "label", "input", "button", "select", "option", "textarea",
];

const ALLOWED_ATTRS: &[&str] = &[
    "class", "id", "style", "title", "lang", "dir", "role",
    "href", "src", "alt", "width", "height", "loading", "target", "rel",
    "charset", "name", "content", "datetime", "cite",
    "colspan", "rowspan", "scope", "align",
    "type", "value", "placeholder", "for", "action", "method",
    "disabled", "checked", "selected", "required", "min", "max", "step", "rows", "cols",
];

const URL_ATTRS: &[&str] = &["href", "src", "action", "cite"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static DROP_BLOCK_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    DROP_WITH_CONTENT
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect()
});

static STYLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)(<style\b[^>]*>)(.*?)(</style\s*>)").unwrap());

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9-]*)([^>]*)>").unwrap());

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .unwrap()
});

static UNSAFE_CSS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)expression\s*\(|javascript\s*:|vbscript\s*:|@import|-moz-binding|behavior\s*:")
        .unwrap()
});

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A```[a-zA-Z0-9_-]*[ \t]*\n(.*?)\n?```\z").unwrap());

/// Clean model output so it can be opened as a live document.
pub fn sanitize_html(raw: &str) -> String {
    let mut html = COMMENT_RE.replace_all(raw, "").into_owned();

    for re in DROP_BLOCK_RES.iter() {
        html = re.replace_all(&html, "").into_owned();
    }

    html = STYLE_BLOCK_RE
        .replace_all(&html, |caps: &Captures| {
            format!("{}{}{}", &caps[1], clean_css(&caps[2]), &caps[3])
        })
        .into_owned();

    TAG_RE.replace_all(&html, rewrite_tag).into_owned()
}

fn rewrite_tag(caps: &Captures) -> String {
    let closing = !caps[1].is_empty();
    let name = caps[2].to_ascii_lowercase();

    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return String::new();
    }
    if closing {
        return format!("</{}>", name);
    }

    let raw_attrs = &caps[3];
    let mut out = format!("<{}", name);
    for attr in ATTR_RE.captures_iter(raw_attrs) {
        let attr_name = attr[1].to_ascii_lowercase();
        if !attr_allowed(&attr_name) {
            continue;
        }

        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map(|m| m.as_str());

        match value {
            None => {
                out.push(' ');
                out.push_str(&attr_name);
            }
            Some(value) => {
                let value = if URL_ATTRS.contains(&attr_name.as_str()) {
                    if !is_safe_url(value) {
                        continue;
                    }
                    value.to_string()
                } else if attr_name == "style" {
                    clean_css(value)
                } else {
                    value.to_string()
                };
                out.push_str(&format!(" {}=\"{}\"", attr_name, value.replace('"', "&quot;")));
            }
        }
    }

    if raw_attrs.trim_end().ends_with('/') {
        out.push_str(" /");
    }
    out.push('>');
    out
}

fn attr_allowed(name: &str) -> bool {
    if name.starts_with("on") {
        return false;
    }
    ALLOWED_ATTRS.contains(&name) || name.starts_with("aria-") || name.starts_with("data-")
}

/// Relative links, fragments and allow-listed schemes pass. Anything with an
/// entity before the first path separator is refused, since browsers decode
/// entities in attribute values before resolving the scheme.
fn is_safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let head_end = compact
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(compact.len());
    let head = &compact[..head_end];

    match head.find(':') {
        Some(idx) => ALLOWED_SCHEMES.contains(&&head[..idx]),
        None => !head.contains('&'),
    }
}

fn clean_css(css: &str) -> String {
    UNSAFE_CSS_RE.replace_all(css, "").into_owned()
}

/// Models like to wrap documents in ```html fences. Only a reply that is
/// exactly one fenced block is unwrapped; anything else comes back trimmed.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    match FENCE_RE.captures(trimmed) {
        Some(caps) if !caps[1].contains("```") => caps[1].trim().to_string(),
        _ => trimmed.to_string(),
    }
}

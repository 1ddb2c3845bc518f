use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Attributes that survive sanitizing; everything else is dropped.
pub const ALLOWED_ATTRIBUTES: [&str; 3] = ["style", "colspan", "rowspan"];

// One attribute: a name, optionally `=` and a quoted, unquoted or empty value.
// Must stay in step with the capturing form in `ATTRIBUTE`.
const ATTRIBUTE_SHAPE: &str =
    r#"[^\s"'>/=<]+(?:\s*=(?:\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)?"#;

// Comments and CDATA are matched first so their contents are never rewritten.
// Attributes after the first may follow a quoted value with no whitespace.
static MARKUP_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<([A-Za-z][A-Za-z0-9:_.-]*)((?:\s+{attr}(?:\s*{attr})*)?)\s*(/?)\s*>",
        attr = ATTRIBUTE_SHAPE
    );
    Regex::new(&pattern).expect("markup pattern is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=<]+)(?:\s*=(?:\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?)?"#)
        .expect("attribute pattern is valid")
});

/// Strips every element attribute outside [`ALLOWED_ATTRIBUTES`].
///
/// Kept attributes are re-emitted with lowercase names and double-quoted values,
/// so the output is a fixed point: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(markup: &str) -> String {
    MARKUP_TOKEN
        .replace_all(markup, |caps: &Captures| match caps.get(1) {
            Some(tag) => rewrite_start_tag(
                tag.as_str(),
                caps.get(2).map_or("", |m| m.as_str()),
                caps.get(3).is_some_and(|m| !m.as_str().is_empty()),
            ),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn rewrite_start_tag(name: &str, attributes: &str, self_closing: bool) -> String {
    let mut tag = format!("<{}", name);

    for attr in ATTRIBUTE.captures_iter(attributes) {
        let attr_name = attr[1].to_ascii_lowercase();
        if !ALLOWED_ATTRIBUTES.contains(&attr_name.as_str()) {
            continue;
        }
        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map_or("", |m| m.as_str());
        tag.push_str(&format!(" {}=\"{}\"", attr_name, value.replace('"', "&quot;")));
    }

    if self_closing {
        tag.push('/');
    }
    tag.push('>');
    tag
}

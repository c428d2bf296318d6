use std::fmt;

use serde::Serialize;

/// A fragment of markup that is safe to embed in a page.
///
/// The only ways to build one are [`Html::text`] (which escapes) and
/// [`content_tag`] (which escapes attribute values), so concatenating
/// fragments never introduces unescaped input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Html(String);

impl Html {
    /// Escaped text.
    pub fn text(s: &str) -> Self {
        Self(escape(s))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, other: Html) {
        self.0.push_str(&other.0);
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromIterator<Html> for Html {
    fn from_iter<I: IntoIterator<Item = Html>>(iter: I) -> Self {
        let mut joined = Html::empty();
        for fragment in iter {
            joined.push(fragment);
        }
        joined
    }
}

/// Build `<name attr="value"...>body</name>`.
///
/// Attributes with a `None` value are emitted as bare boolean attributes
/// (e.g. `selected`).
pub fn content_tag(name: &str, body: Html, attrs: &[(&str, Option<&str>)]) -> Html {
    let mut out = String::with_capacity(name.len() * 2 + body.0.len() + 5);
    out.push('<');
    out.push_str(name);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
    }
    out.push('>');
    out.push_str(&body.0);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    Html(out)
}

/// A Bootstrap icon with an accessible label.
pub fn icon(name: &str, label: &str) -> Html {
    let class = format!("bi bi-{}", name);
    content_tag(
        "i",
        Html::empty(),
        &[("class", Some(class.as_str())), ("role", Some("img")), ("title", Some(label))],
    )
}

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_content_tag_escapes_attributes_and_text() {
        let tag = content_tag(
            "span",
            Html::text("<b>"),
            &[("class", Some("a\"b")), ("hidden", None)],
        );
        assert_eq!(
            tag.as_str(),
            r#"<span class="a&quot;b" hidden>&lt;b&gt;</span>"#
        );
    }

    #[test]
    fn test_icon() {
        assert_eq!(
            icon("star", "Favourite").as_str(),
            r#"<i class="bi bi-star" role="img" title="Favourite"></i>"#
        );
    }

    #[test]
    fn test_collect_concatenates() {
        let joined: Html = vec![Html::text("a"), Html::text("&")].into_iter().collect();
        assert_eq!(joined.as_str(), "a&amp;");
    }
}

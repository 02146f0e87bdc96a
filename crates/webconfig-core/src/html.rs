//! Stack-disciplined HTML builder.
//!
//! [`HtmlBuilder`] keeps a stack of open tag names. Opening a tag pushes it,
//! closing pops it and checks the name, and [`HtmlBuilder::finish`] closes
//! whatever is still open in LIFO order. Text goes through [`encode_text`] and
//! attribute values through [`encode_attribute`]; [`HtmlBuilder::append`] is
//! the one deliberate bypass, for fragments that were already built.
//!
//! Most callers should prefer [`HtmlBuilder::element`], which closes its tag
//! itself and so can never produce a mismatched close.
//!
//! # Examples
//!
//! ```
//! use webconfig_core::html::{Attrs, HtmlBuilder};
//!
//! let mut b = HtmlBuilder::new();
//! b.element("p", &Attrs::new().with("class", "note"), |b| {
//!     b.text("1 < 2");
//! });
//! assert_eq!(b.finish(), "<p class=\"note\">\n1 &lt; 2</p>\n");
//! ```

use std::fmt;

use crate::error::{WebConfigError, WebConfigResult};

const DOCTYPE: &str = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.0 Transitional//EN\">\n";
const META_CHARSET: &str = "<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">\n";

/// Encodes text content for insertion between tags.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their entity equivalents.
pub fn encode_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Encodes a value for use inside a double-quoted attribute.
///
/// Same replacements as [`encode_text`], plus line breaks so a value can
/// never split the tag across lines.
pub fn encode_attribute(s: &str) -> String {
    encode_text(s).replace('\n', "&#10;").replace('\r', "&#13;")
}

/// An ordered list of HTML attributes.
///
/// Values are stored raw and encoded when the list is rendered, so callers
/// never have to remember to escape them. Attributes without a value
/// (`checked`, `selected`, ...) are added with [`Attrs::flag`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    items: Vec<(String, Option<String>)>,
}

impl Attrs {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `name="value"` attribute.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Adds a value-less attribute such as `checked`.
    #[must_use]
    pub fn flag(mut self, name: &str) -> Self {
        self.items.push((name.to_string(), None));
        self
    }

    /// Adds a value-less attribute only when `condition` holds.
    #[must_use]
    pub fn flag_if(self, name: &str, condition: bool) -> Self {
        if condition {
            self.flag(name)
        } else {
            self
        }
    }

    /// Adds a `name="value"` attribute when `value` is present.
    #[must_use]
    pub fn with_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    /// Appends all attributes of `other`.
    #[must_use]
    pub fn extend(mut self, other: &Self) -> Self {
        self.items.extend(other.items.iter().cloned());
        self
    }

    /// Adds a `name="value"` attribute in place.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        self.items.push((name.to_string(), Some(value.into())));
    }

    /// Returns `true` if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.items {
            match value {
                Some(v) => write!(f, " {}=\"{}\"", encode_attribute(name), encode_attribute(v))?,
                None => write!(f, " {}", encode_attribute(name))?,
            }
        }
        Ok(())
    }
}

/// A markup emitter that tracks open tags.
#[derive(Debug, Default)]
pub struct HtmlBuilder {
    stack: Vec<String>,
    out: String,
}

impl HtmlBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `tag` without attributes.
    ///
    /// Opening `html` also emits the doctype, and opening `head` emits a
    /// charset `meta` right after it.
    pub fn open(&mut self, tag: &str) -> &mut Self {
        self.open_with(tag, &Attrs::new())
    }

    /// Opens `tag` with the given attributes.
    pub fn open_with(&mut self, tag: &str, attrs: &Attrs) -> &mut Self {
        if tag.eq_ignore_ascii_case("html") {
            self.out.push_str(DOCTYPE);
        }
        self.stack.push(tag.to_string());
        self.out.push_str(&format!("<{tag}{attrs}>\n"));
        if tag.eq_ignore_ascii_case("head") {
            self.out.push_str(META_CHARSET);
        }
        self
    }

    /// Closes `tag`, which must be the innermost open tag.
    ///
    /// On a mismatch nothing is emitted and the stack is left untouched.
    pub fn close(&mut self, tag: &str) -> WebConfigResult<&mut Self> {
        match self.stack.last() {
            Some(top) if top == tag => {
                self.stack.pop();
                self.out.push_str(&format!("</{tag}>\n"));
                Ok(self)
            }
            top => Err(WebConfigError::UnbalancedMarkup {
                expected: tag.to_string(),
                found: top.cloned(),
            }),
        }
    }

    /// Opens `tag`, runs `body`, then closes `tag` and anything `body` left open.
    pub fn element(&mut self, tag: &str, attrs: &Attrs, body: impl FnOnce(&mut Self)) -> &mut Self {
        let depth = self.stack.len();
        self.open_with(tag, attrs);
        body(self);
        self.close_to(depth);
        self
    }

    /// Emits a tag that has no closing counterpart (`input`, `img`, ...).
    pub fn void(&mut self, tag: &str, attrs: &Attrs) -> &mut Self {
        self.out.push_str(&format!("<{tag}{attrs}>\n"));
        self
    }

    /// Appends encoded text.
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.out.push_str(&encode_text(s));
        self
    }

    /// Appends a raw, trusted fragment without encoding.
    pub fn append(&mut self, raw: &str) -> &mut Self {
        self.out.push_str(raw);
        self
    }

    /// References an external script.
    pub fn include_js(&mut self, src: &str) -> &mut Self {
        let attrs = Attrs::new().with("src", src).with("type", "text/javascript");
        self.out.push_str(&format!("<script{attrs}></script>\n"));
        self
    }

    /// References an external stylesheet.
    pub fn include_css(&mut self, href: &str) -> &mut Self {
        let attrs = Attrs::new()
            .with("rel", "stylesheet")
            .with("href", href)
            .with("type", "text/css");
        self.out.push_str(&format!("<link{attrs}>\n"));
        self
    }

    /// Emits an anchor pointing at `url` with encoded `text`.
    pub fn link(&mut self, url: &str, text: &str) -> &mut Self {
        self.element("a", &Attrs::new().with("href", url), |b| {
            b.text(text);
        })
    }

    /// Emits an image.
    pub fn image(&mut self, src: &str) -> &mut Self {
        self.void("img", &Attrs::new().with("src", src))
    }

    /// Emits a non-breaking space.
    pub fn nbsp(&mut self) -> &mut Self {
        self.append("&nbsp;")
    }

    /// Emits a line break.
    pub fn br(&mut self) -> &mut Self {
        self.append("<br>")
    }

    /// Emits a horizontal rule.
    pub fn hr(&mut self) -> &mut Self {
        self.append("<hr>")
    }

    /// Returns the number of currently open tags.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Closes every open tag, innermost first.
    pub fn close_all(&mut self) -> &mut Self {
        self.close_to(0);
        self
    }

    /// Closes all remaining tags and returns the markup.
    pub fn finish(mut self) -> String {
        self.close_all();
        self.out
    }

    fn close_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            if let Some(tag) = self.stack.pop() {
                self.out.push_str(&format!("</{tag}>\n"));
            }
        }
    }
}

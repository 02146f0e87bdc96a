//! Generated HTML pages.
//!
//! Every page is built with [`HtmlBuilder`]'s scoped `element` form, so the
//! markup is always balanced.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use webconfig_core::html::{Attrs, HtmlBuilder};
use webconfig_forms::{FormSettings, Registry};

/// Title of the top-level frameset.
pub const APP_TITLE: &str = "Web Config";

/// Credit link required by the slider scripts.
pub const SLIDER_CREDIT_URL: &str = "http://carpe.ambiprospect.com/slider/";

const SLIDER_CREDIT_TEXT: &str = "sliders by CARPE Design";

const FORM_STYLE: &str = "th    {text-align: right;}\ntd    {padding-left: 1em; text-align: left;}\n";

const DOCLICK_SCRIPT: &str = "function doclick(sel){\n  sel.value=\"True\";\n  sel.form.submit();\n}\n";

const MENU_SCRIPT: &str = "function frmUpdate(page){ parent.contents.location=page; }\n";

/// Characters escaped in generated link targets.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn none() -> Attrs {
    Attrs::new()
}

/// The top page: a two-column frameset holding the menu and the contents.
pub fn frameset_page() -> String {
    let mut b = HtmlBuilder::new();
    b.element("html", &none(), |b| {
        b.element("head", &none(), |b| {
            b.element("title", &none(), |b| {
                b.text(APP_TITLE);
            });
        });
        b.element("frameset", &none().with("cols", "200,*"), |b| {
            b.void("frame", &none().with("src", "menu.cgi").with("name", "menu"));
            b.void("frame", &none().with("src", "contents.cgi").with("name", "contents"));
            b.element("noframes", &none(), |b| {
                b.text("A browser which supports frame display is required for browsing this page.");
            });
        });
    });
    b.finish()
}

/// The menu: one link per distinct form name, loading the form into the
/// contents frame.
pub fn menu_page(registry: &Registry) -> String {
    let mut b = HtmlBuilder::new();
    b.element("html", &none(), |b| {
        b.element("head", &none(), |b| {
            b.element("script", &none().with("language", "javascript"), |b| {
                b.append(MENU_SCRIPT);
            });
        });
        b.element("body", &none(), |b| {
            b.element("fieldset", &none(), |b| {
                b.element("table", &none(), |b| {
                    for name in registry.form_names() {
                        let page = format!("{name}.cgi");
                        let anchor = none()
                            .with("href", encode_path(&page))
                            .with("target", "contents")
                            .with(
                                "onclick",
                                format!("frmUpdate('{}'); return false;", js_string(&page)),
                            );
                        b.element("tr", &none(), |b| {
                            b.element("td", &none(), |b| {
                                b.element("a", &anchor, |b| {
                                    b.text(name);
                                });
                            });
                        });
                    }
                });
            });
        });
    });
    b.finish()
}

/// A form page: every input of `name` in registration order, followed by
/// SUBMIT/RESET unless the form submits itself.
///
/// A name with no registered form renders an empty form.
pub fn form_page(registry: &Registry, name: &str) -> String {
    let fallback;
    let form = if let Some(form) = registry.form(name) {
        form
    } else {
        fallback = FormSettings::new(name);
        &fallback
    };

    let mut b = HtmlBuilder::new();
    b.element("html", &none(), |b| {
        b.element("head", &none(), |b| {
            b.element("title", &none(), |b| {
                b.text(name);
            });
            b.element("style", &none().with("type", "text/css"), |b| {
                b.append(FORM_STYLE);
            });
            b.include_js("scripts/slider.js");
            b.include_css("styles/slider.css");
            b.element("script", &none().with("type", "text/javascript"), |b| {
                b.append(DOCLICK_SCRIPT);
            });
        });
        b.element("body", &none(), |b| {
            b.element("h2", &none(), |b| {
                b.text(name);
            });
            b.hr();
            let attrs = none()
                .with("name", name)
                .with("action", encode_path(&form.page_url()))
                .with("method", "post");
            b.element("form", &attrs, |b| {
                b.element("table", &none(), |b| {
                    for input in registry.inputs_for_form(name) {
                        input.render(form, b);
                    }
                    b.element("tr", &none(), |b| {
                        b.element("th", &none(), |_| {});
                        b.element("td", &none(), |b| {
                            if !form.auto_submit {
                                b.void("input", &none().with("type", "submit").with("value", "SUBMIT"));
                                b.void("input", &none().with("type", "reset").with("value", "RESET"));
                            }
                        });
                    });
                });
            });
            b.hr();
            b.link(SLIDER_CREDIT_URL, SLIDER_CREDIT_TEXT);
        });
    });
    b.finish()
}

/// The body sent with every 404.
pub fn not_found_page() -> String {
    let mut b = HtmlBuilder::new();
    b.element("html", &none(), |b| {
        b.element("head", &none(), |_| {});
        b.element("body", &none(), |b| {
            b.text("File not found!!");
        });
    });
    b.finish()
}

/// A directory listing: subdirectories first, then files, each linked
/// below `url`.
pub fn listing_page(relative: &str, url: &str, dirs: &[String], files: &[String]) -> String {
    let mut b = HtmlBuilder::new();
    b.element("html", &none(), |b| {
        b.element("head", &none(), |_| {});
        b.element("body", &none(), |b| {
            b.element("h2", &none(), |b| {
                b.text(&format!("Folder listing for {relative}"));
            });
            for name in dirs.iter().chain(files) {
                b.link(&child_href(url, name), &format!("[{name}]"));
                b.br();
            }
        });
    });
    b.finish()
}

/// The link target for `name` inside the directory at `url`.
fn child_href(url: &str, name: &str) -> String {
    let base = encode_path(url.trim_end_matches('/'));
    format!("{base}/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// Percent-encodes each segment of a `/`-separated path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Escapes a value for a single-quoted JavaScript string.
fn js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

//! Request routing.
//!
//! | Route | Response |
//! |---|---|
//! | `/` | frameset with `menu.cgi` and `contents.cgi` |
//! | `/menu.cgi` | one link per form |
//! | `/{form}.cgi` | the generated form page |
//! | anything else | a file or directory listing under the root, or 404 |
//!
//! A POST first applies its form-encoded body to the registry and is then
//! routed like a GET.

use std::path::Path;

use http::StatusCode;

use webconfig_core::{Settings, WebConfigError, WebConfigResult};
use webconfig_forms::Registry;
use webconfig_http::{parse_form_body, Request, Response};

use crate::pages;
use crate::static_files::StaticFiles;

/// Suffix of generated pages.
pub const GENERATED_SUFFIX: &str = ".cgi";

/// Path of the generated menu.
pub const MENU_URL: &str = "/menu.cgi";

/// Routes requests to generated pages or static files.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    static_files: StaticFiles,
}

impl Dispatcher {
    /// Creates a dispatcher serving files from `settings.root_folder`.
    pub fn new(settings: &Settings) -> Self {
        Self::with_static_files(StaticFiles::new(
            &settings.root_folder,
            settings.index_file.clone(),
        ))
    }

    /// Creates a dispatcher around an existing [`StaticFiles`].
    pub const fn with_static_files(static_files: StaticFiles) -> Self {
        Self { static_files }
    }

    /// The static file server.
    pub const fn static_files(&self) -> &StaticFiles {
        &self.static_files
    }

    /// Fills `response` for `request`.
    ///
    /// Values that fail to apply are logged and skipped. Missing or
    /// rejected static paths produce the 404 page.
    ///
    /// # Errors
    ///
    /// Currently always succeeds; the signature matches
    /// [`Handler`](webconfig_http::Handler).
    pub fn dispatch(
        &self,
        registry: &mut Registry,
        request: &Request,
        response: &mut Response,
    ) -> WebConfigResult<()> {
        if request.is_post() {
            let pairs = parse_form_body(request.body());
            let report = registry.apply_all(&pairs);
            tracing::debug!(
                applied = report.applied.len(),
                ignored = report.ignored.len(),
                failed = report.failed.len(),
                "form submission applied"
            );
        }

        let url = request.url();
        if url == "/" {
            response.set_html(pages::frameset_page());
        } else if url.ends_with(GENERATED_SUFFIX) {
            if url == MENU_URL {
                response.set_html(pages::menu_page(registry));
            } else {
                let name = form_name(url);
                response.set_html(pages::form_page(registry, &name));
            }
        } else {
            self.serve_static(url, response);
        }
        Ok(())
    }

    fn serve_static(&self, url: &str, response: &mut Response) {
        if let Err(e) = self.static_files.serve(url, response) {
            match &e {
                WebConfigError::NotFound(_) => tracing::debug!(url, "not found"),
                WebConfigError::SuspiciousOperation(_) => {
                    tracing::warn!(url, error = %e, "rejected path outside root");
                }
                _ => tracing::warn!(url, error = %e, "could not serve static path"),
            }
            *response = Response::with_status(StatusCode::NOT_FOUND);
            response.set_html(pages::not_found_page());
        }
    }
}

/// The form name addressed by a `.cgi` URL: its file name without extension.
fn form_name(url: &str) -> String {
    Path::new(url)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

//! Render stage: plot descriptors → panel items → HTML fragment.
//!
//! URL resolution is the only transformation applied to backend data:
//! absolute `http://` / `https://` URLs (any letter case) pass through, and
//! everything else is appended to the API base as-is. Captions are carried
//! verbatim; the HTML writer entity-escapes text and attribute values the
//! same way DOM text/attribute setters would, and does nothing more.

use crate::error::HingeError;
use crate::output::{Plot, RenderedPlot};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Alt text used when a plot has no caption.
pub const DEFAULT_ALT: &str = "Hinge analysis plot";

static RE_ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

/// Resolve a plot URL against the API base.
pub fn resolve_url(api_base: &str, url: &str) -> String {
    if RE_ABSOLUTE_URL.is_match(url) {
        url.to_string()
    } else {
        format!("{api_base}{url}")
    }
}

/// Build the panel items for `plots`, preserving order.
pub fn render_plots(api_base: &str, plots: &[Plot]) -> Vec<RenderedPlot> {
    plots
        .iter()
        .map(|plot| {
            let caption = plot.caption.clone().filter(|c| !c.is_empty());
            RenderedPlot {
                src: resolve_url(api_base, &plot.url),
                alt: caption.clone().unwrap_or_else(|| DEFAULT_ALT.to_string()),
                caption,
            }
        })
        .collect()
}

/// Serialise panel items as the results grid fragment.
pub fn to_html(plots: &[RenderedPlot]) -> String {
    let mut html = String::from("<div class=\"hinge-plots-grid\">\n");
    for plot in plots {
        html.push_str("  <div class=\"hinge-plot-item\">\n");
        html.push_str(&format!(
            "    <img class=\"hinge-plot-img\" src=\"{}\" alt=\"{}\" loading=\"lazy\">\n",
            escape(&plot.src),
            escape(&plot.alt)
        ));
        if let Some(ref caption) = plot.caption {
            html.push_str(&format!(
                "    <div class=\"hinge-plot-caption\">{}</div>\n",
                escape(caption)
            ));
        }
        html.push_str("  </div>\n");
    }
    html.push_str("</div>\n");
    html
}

/// Write an HTML fragment to `path`.
///
/// Atomic write: write to a sibling temp file, then rename over the target.
pub async fn write_html(path: &Path, html: &str) -> Result<(), HingeError> {
    let write_err = |source| HingeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, html).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {} bytes of HTML to {}", html.len(), path.display());
    Ok(())
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

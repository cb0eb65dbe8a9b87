//! Static export: every page written as a plain HTML file.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{CatalogError, Result};
use crate::site::Site;
use crate::views;

#[derive(Debug, Default)]
pub struct ExportSummary {
    pub pages_written: usize,
    pub skipped: Vec<String>,
    pub assets_copied: usize,
}

/// Writes `index.html`, `productos/<slug>/index.html` for every slug, and `404.html`
/// under `out_dir`, then copies `static_dir` (when it exists) to `out_dir/static`.
pub async fn export_site(site: &Site, out_dir: &Path, static_dir: Option<&Path>) -> Result<ExportSummary> {
    fs::create_dir_all(out_dir)?;
    let mut summary = ExportSummary::default();

    write_page(&out_dir.join("index.html"), &site.render_catalog().await?)?;
    summary.pages_written += 1;

    for slug in site.slugs().await? {
        if !is_safe_segment(&slug) {
            warn!(slug = %slug, "slug is not a safe path segment, skipping");
            summary.skipped.push(slug);
            continue;
        }
        match site.render_product(&slug, None).await {
            Ok(html) => {
                let target = out_dir.join("productos").join(&slug).join("index.html");
                write_page(&target, &html)?;
                summary.pages_written += 1;
            }
            Err(CatalogError::NotFound(_)) => {
                warn!(slug = %slug, "listing disappeared during export, skipping");
                summary.skipped.push(slug);
            }
            Err(e) => return Err(e),
        }
    }

    write_page(&out_dir.join("404.html"), &views::render_not_found())?;
    summary.pages_written += 1;

    if let Some(dir) = static_dir.filter(|d| d.is_dir()) {
        summary.assets_copied = copy_dir(dir, &out_dir.join("static"))?;
    }

    info!(
        pages = summary.pages_written,
        skipped = summary.skipped.len(),
        assets = summary.assets_copied,
        out = %out_dir.display(),
        "static export finished"
    );
    Ok(summary)
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(())
}

fn is_safe_segment(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
}

fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let source: PathBuf = entry.path();
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir(&source, &target)?;
        } else {
            fs::copy(&source, &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

//! Image CDN URLs for asset references.
//!
//! Asset references look like `image-<id>-<width>x<height>-<format>`; the CDN serves
//! `<id>-<width>x<height>.<format>` under the project and dataset and applies the
//! transformation parameters itself.

use crate::models::ImageRef;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetId {
    pub fn parse(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix("image-")?;
        let mut parts = rest.rsplitn(3, '-');
        let format = parts.next()?;
        let dimensions = parts.next()?;
        let id = parts.next()?;

        let (w, h) = dimensions.split_once('x')?;
        let width = w.parse().ok()?;
        let height = h.parse().ok()?;

        if id.is_empty() || format.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            width,
            height,
            format: format.to_string(),
        })
    }

    fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.id, self.width, self.height, self.format)
    }
}

#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    pub fn image<'a>(&'a self, image: &'a ImageRef) -> ImageUrl<'a> {
        ImageUrl {
            builder: self,
            image,
            width: None,
            height: None,
            auto_format: false,
        }
    }
}

/// A pending URL for one image; nothing is resolved until `url()`.
#[derive(Debug, Clone)]
pub struct ImageUrl<'a> {
    builder: &'a ImageUrlBuilder,
    image: &'a ImageRef,
    width: Option<u32>,
    height: Option<u32>,
    auto_format: bool,
}

impl<'a> ImageUrl<'a> {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn size(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    pub fn auto_format(mut self) -> Self {
        self.auto_format = true;
        self
    }

    /// `None` when the asset reference cannot be parsed.
    pub fn url(&self) -> Option<String> {
        let asset = AssetId::parse(self.image.reference())?;
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(crop) = self.image.crop {
            let has_crop = crop.top > 0.0 || crop.bottom > 0.0 || crop.left > 0.0 || crop.right > 0.0;
            if has_crop {
                let w = asset.width as f64;
                let h = asset.height as f64;
                let left = (crop.left * w).round();
                let top = (crop.top * h).round();
                let width = (w - crop.right * w - left).round().max(1.0);
                let height = (h - crop.bottom * h - top).round().max(1.0);
                params.push(("rect", format!("{},{},{},{}", left, top, width, height)));
            }
        }

        let focal = match (self.image.hotspot, self.width, self.height) {
            (Some(hotspot), Some(_), Some(_)) => Some(hotspot),
            _ => None,
        };
        if let Some(hotspot) = focal {
            params.push(("fp-x", format_fraction(hotspot.x)));
            params.push(("fp-y", format_fraction(hotspot.y)));
        }

        if let Some(w) = self.width {
            params.push(("w", w.to_string()));
        }
        if let Some(h) = self.height {
            params.push(("h", h.to_string()));
        }
        if focal.is_some() {
            params.push(("fit", "crop".to_string()));
            params.push(("crop", "focalpoint".to_string()));
        }
        if self.auto_format {
            params.push(("auto", "format".to_string()));
        }

        let mut url = format!(
            "{}/{}/{}/{}",
            CDN_BASE,
            self.builder.project_id,
            self.builder.dataset,
            asset.file_name()
        );
        if !params.is_empty() {
            let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        Some(url)
    }
}

fn format_fraction(value: f64) -> String {
    let clamped = value.clamp(0.0, 1.0);
    let text = format!("{:.4}", clamped);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

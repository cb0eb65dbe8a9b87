use askama::Template;

use crate::config::SiteConfig;
use crate::constants::{
    product_path, CARD_IMAGE_SIZE, DESCRIPTION_FALLBACK, DETAIL_CATEGORY_FALLBACK, EMPTY_CATALOG,
    GALLERY_QUERY_PARAM, GENERAL_CONTACT_MESSAGE, MAIN_IMAGE_SIZE, NO_IMAGE, OG_IMAGE_WIDTH,
    PLACEHOLDER_IMAGE_URL, SITE_NAME, SITE_TAGLINE, THUMBNAIL_SIZE,
};
use crate::format::{
    category_label, format_measurements, format_price, listing_contact_message, whatsapp_link,
};
use crate::gallery::Gallery;
use crate::images::ImageUrlBuilder;
use crate::models::{Furniture, ImageRef};

#[derive(Debug, Clone)]
pub struct PictureView {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone)]
pub struct ListingCard {
    pub href: String,
    pub title: String,
    pub category: String,
    pub price: String,
    pub measurements: Option<String>,
    pub image: Option<PictureView>,
}

#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub href: String,
    pub url: String,
    pub alt: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub og_url: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub site_name: &'static str,
    pub tagline: &'static str,
    pub cards: Vec<ListingCard>,
    pub empty_message: &'static str,
    pub no_image: &'static str,
    pub contact_link: String,
}

#[derive(Template)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub site_name: &'static str,
    pub meta: PageMeta,
    pub title: String,
    pub category: String,
    pub detail_category: String,
    pub price: Option<String>,
    pub description: String,
    pub material: Option<String>,
    pub measurements: Option<String>,
    pub main_image: Option<PictureView>,
    pub thumbnails: Vec<Thumbnail>,
    pub no_image: &'static str,
    pub contact_link: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub site_name: &'static str,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub site_name: &'static str,
    pub message: &'a str,
}

fn picture(images: &ImageUrlBuilder, image: &ImageRef, title: &str, width: u32, height: u32) -> Option<PictureView> {
    let url = images.image(image).size(width, height).auto_format().url()?;
    Some(PictureView {
        url,
        alt: image.alt_or(title).to_string(),
    })
}

/// Card for the catalog grid. `None` for listings without a slug.
pub fn listing_card(item: &Furniture, images: &ImageUrlBuilder) -> Option<ListingCard> {
    let slug = item.slug_str()?;
    Some(ListingCard {
        href: product_path(slug),
        title: item.title.clone(),
        category: category_label(item.ambiente).to_string(),
        price: format_price(item.price),
        measurements: item.measurements.as_ref().and_then(format_measurements),
        image: item
            .cover()
            .and_then(|img| picture(images, img, &item.title, CARD_IMAGE_SIZE, CARD_IMAGE_SIZE)),
    })
}

pub fn index_page(items: &[Furniture], images: &ImageUrlBuilder, site: &SiteConfig) -> IndexTemplate {
    IndexTemplate {
        site_name: SITE_NAME,
        tagline: SITE_TAGLINE,
        cards: items.iter().filter_map(|item| listing_card(item, images)).collect(),
        empty_message: EMPTY_CATALOG,
        no_image: NO_IMAGE,
        contact_link: whatsapp_link(&site.whatsapp_number, GENERAL_CONTACT_MESSAGE),
    }
}

pub fn product_page(
    item: &Furniture,
    gallery: &Gallery,
    images: &ImageUrlBuilder,
    site: &SiteConfig,
) -> ProductTemplate {
    let title = item.title.clone();
    let slug = item.slug_str().unwrap_or_default();
    let path = product_path(slug);

    let main_image = gallery
        .active()
        .and_then(|img| picture(images, img, &title, MAIN_IMAGE_SIZE, MAIN_IMAGE_SIZE));

    let thumbnails = if gallery.has_thumbnails() {
        gallery
            .images()
            .iter()
            .filter_map(|img| {
                let view = picture(images, img, &title, THUMBNAIL_SIZE, THUMBNAIL_SIZE)?;
                Some(Thumbnail {
                    href: format!("{}?{}={}", path, GALLERY_QUERY_PARAM, img.reference()),
                    url: view.url,
                    alt: view.alt,
                    active: gallery.is_active(img),
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    let og_image = gallery
        .active()
        .and_then(|img| images.image(img).width(OG_IMAGE_WIDTH).auto_format().url())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

    let description = item.description_text();
    let meta = PageMeta {
        title: format!("{} | {}", title, SITE_NAME),
        description: description
            .map(str::to_string)
            .unwrap_or_else(|| format!("Mueble a medida: {} fabricado por {}.", title, SITE_NAME)),
        og_title: format!("{} | {}", title, SITE_NAME),
        og_description: description
            .map(str::to_string)
            .unwrap_or_else(|| "Mueble a medida de alta calidad.".to_string()),
        og_image,
        og_url: format!("{}{}", site.base_url, path),
    };

    let price = item
        .price
        .filter(|p| *p != 0.0)
        .map(|p| format_price(Some(p)));

    ProductTemplate {
        site_name: SITE_NAME,
        meta,
        category: category_label(item.ambiente).to_string(),
        detail_category: item
            .ambiente
            .map(|a| a.label().to_string())
            .unwrap_or_else(|| DETAIL_CATEGORY_FALLBACK.to_string()),
        price,
        description: description.unwrap_or(DESCRIPTION_FALLBACK).to_string(),
        material: item.material_text().map(str::to_string),
        measurements: item.measurements.as_ref().and_then(format_measurements),
        main_image,
        thumbnails,
        no_image: NO_IMAGE,
        contact_link: whatsapp_link(&site.whatsapp_number, &listing_contact_message(&title)),
        title,
    }
}

pub fn render_not_found() -> String {
    NotFoundTemplate { site_name: SITE_NAME }
        .render()
        .unwrap_or_else(|_| "<h1>Página no encontrada</h1>".to_string())
}

pub fn render_server_error(message: &str) -> String {
    ErrorTemplate { site_name: SITE_NAME, message }
        .render()
        .unwrap_or_else(|_| "<h1>Error interno</h1>".to_string())
}

//! Texts, routes and sizes shared by the listing and detail pages.

pub const SITE_NAME: &str = "Carpintería Panchi";
pub const SITE_TAGLINE: &str = "Muebles a medida";

// Content type
pub const FURNITURE_TYPE: &str = "furniture";
pub const SLUG_MAX_LENGTH: usize = 96;
pub const DEFAULT_UNIT: &str = "cm";

// Routes
pub const PRODUCT_ROUTE_PREFIX: &str = "/productos/";
pub const CATALOG_ROOT: &str = "/";

// Fallback texts
pub const PRICE_ON_REQUEST: &str = "Consultar";
pub const PRICE_PREFIX: &str = "AR$";
pub const NO_IMAGE: &str = "Sin imagen";
pub const GENERAL_CATEGORY: &str = "Mueble general";
pub const DETAIL_CATEGORY_FALLBACK: &str = "Varios";
pub const MISSING_DIMENSION: &str = "-";
pub const EMPTY_CATALOG: &str = "No hay muebles publicados todavía.";
pub const DESCRIPTION_FALLBACK: &str = "Consulta por más detalles sobre este producto.";
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/1200x1200.png?text=Sin+imagen";

// Contact
pub const GENERAL_CONTACT_MESSAGE: &str = "Hola Panchi, quiero consultar por un mueble.";
pub const LISTING_CONTACT_PREFIX: &str = "Hola Panchi, quiero consultar por: ";

// Image sizes (px)
pub const CARD_IMAGE_SIZE: u32 = 800;
pub const MAIN_IMAGE_SIZE: u32 = 1200;
pub const THUMBNAIL_SIZE: u32 = 100;
pub const OG_IMAGE_WIDTH: u32 = 1600;

// Revalidation
pub const REVALIDATE_SECRET_HEADER: &str = "x-revalidate-secret";
pub const GALLERY_QUERY_PARAM: &str = "imagen";

/// Path of the detail page for a slug.
pub fn product_path(slug: &str) -> String {
    format!("{}{}", PRODUCT_ROUTE_PREFIX, slug)
}

/// Extract the slug from a detail page path, if the path is one.
pub fn slug_from_path(path: &str) -> Option<&str> {
    path.strip_prefix(PRODUCT_ROUTE_PREFIX)
        .map(|s| s.trim_end_matches('/'))
        .filter(|s| !s.is_empty() && !s.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_path_round_trips_through_slug_from_path() {
        let path = product_path("mesa-de-roble");
        assert_eq!(path, "/productos/mesa-de-roble");
        assert_eq!(slug_from_path(&path), Some("mesa-de-roble"));
    }

    #[test]
    fn slug_from_path_rejects_other_routes() {
        assert_eq!(slug_from_path("/"), None);
        assert_eq!(slug_from_path("/productos/"), None);
        assert_eq!(slug_from_path("/productos/a/b"), None);
        assert_eq!(slug_from_path("/api/revalidate"), None);
    }
}

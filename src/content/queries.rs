//! GROQ queries used by the catalog.

// Fields every page needs
pub const FURNITURE_PROJECTION: &str =
    "{_id, title, slug, description, ambiente, measurements, material, price, images, publishedAt}";

pub fn list_furniture() -> String {
    format!(
        r#"*[_type=="furniture" && defined(slug.current)] | order(publishedAt desc){}"#,
        FURNITURE_PROJECTION
    )
}

pub fn furniture_by_slug() -> String {
    format!(
        r#"*[_type=="furniture" && slug.current == $slug][0]{}"#,
        FURNITURE_PROJECTION
    )
}

pub fn all_slugs() -> String {
    r#"*[_type=="furniture" && defined(slug.current)].slug.current"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_filter_on_type_and_slug() {
        assert!(list_furniture().starts_with(r#"*[_type=="furniture" && defined(slug.current)] | order(publishedAt desc){_id"#));
        assert!(furniture_by_slug().contains("slug.current == $slug][0]{"));
        assert!(all_slugs().ends_with("].slug.current"));
    }
}

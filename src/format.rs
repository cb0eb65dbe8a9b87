use reqwest::Url;

use crate::constants::{
    GENERAL_CATEGORY, LISTING_CONTACT_PREFIX, MISSING_DIMENSION, PRICE_ON_REQUEST, PRICE_PREFIX,
};
use crate::models::{Ambiente, Measurements};

/// `AR$ 150000`, or `Consultar` when there is no price.
/// A zero price is treated as "no price", the same as an unset field.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p != 0.0 && p.is_finite() => format!("{} {}", PRICE_PREFIX, format_number(p)),
        _ => PRICE_ON_REQUEST.to_string(),
    }
}

/// Whole numbers print without decimals.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// `alto x ancho x profundidad unidad`, `-` for each missing dimension.
/// `None` when no dimension is set at all.
pub fn format_measurements(m: &Measurements) -> Option<String> {
    let dims = [m.alto, m.ancho, m.profundidad];
    let present = |d: &Option<f64>| matches!(d, Some(v) if *v != 0.0);
    if !dims.iter().any(present) {
        return None;
    }

    let parts: Vec<String> = dims
        .iter()
        .map(|d| match d {
            Some(v) if *v != 0.0 => format_number(*v),
            _ => MISSING_DIMENSION.to_string(),
        })
        .collect();

    Some(format!("{} {}", parts.join(" x "), m.unit()))
}

pub fn category_label(ambiente: Option<Ambiente>) -> &'static str {
    ambiente.map(|a| a.label()).unwrap_or(GENERAL_CATEGORY)
}

pub fn listing_contact_message(title: &str) -> String {
    format!("{}{}", LISTING_CONTACT_PREFIX, title)
}

/// wa.me deep link with a pre-filled message.
pub fn whatsapp_link(number: &str, message: &str) -> String {
    let digits: String = number.chars().filter(|c| !c.is_whitespace() && *c != '+').collect();
    let base = format!("https://wa.me/{}", digits);
    match Url::parse_with_params(&base, &[("text", message)]) {
        // form encoding writes spaces as '+'; a literal '+' is already %2B
        Ok(url) => url.as_str().replace('+', "%20"),
        Err(_) => base,
    }
}

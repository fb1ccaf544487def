//! Synthetic, network-free placeholder images.

use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha256};

use crate::domain::entities::{VehicleIdentity, normalize_term};

/// Colour used when there is no make to derive one from.
pub const NEUTRAL_COLOR: &str = "#4b5563";

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

/// Derives a stable, fairly dark accent colour from a make.
#[must_use]
pub fn derived_brand_color(make: &str) -> String {
    let make = normalize_term(make);
    if make.is_empty() {
        return NEUTRAL_COLOR.to_string();
    }
    let digest = Sha256::digest(make.as_bytes());
    // Keep channels in 0x20..=0x9f so white text stays readable.
    let rgb: Vec<u8> = digest[..3].iter().map(|b| 0x20 + (b % 0x80)).collect();
    format!("#{}", hex::encode(rgb))
}

/// Builds an inline SVG placeholder showing the vehicle name as text.
///
/// The result is a `data:image/svg+xml;base64,…` URI: always renderable,
/// deterministic for a given identity and colour.
#[must_use]
pub fn synthetic_placeholder(identity: &VehicleIdentity, color: &str) -> String {
    let title = escape_xml(&identity.display_name());
    let subtitle = identity
        .known_year()
        .map(|year| year.to_string())
        .unwrap_or_default();
    let color = if is_hex_color(color) { color } else { NEUTRAL_COLOR };

    let svg = format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
            r##"<rect width="100%" height="100%" fill="{color}"/>"##,
            r##"<text x="50%" y="48%" fill="#ffffff" font-family="sans-serif" font-size="48" text-anchor="middle">{title}</text>"##,
            r##"<text x="50%" y="60%" fill="#e5e7eb" font-family="sans-serif" font-size="32" text-anchor="middle">{subtitle}</text>"##,
            "</svg>"
        ),
        w = WIDTH,
        h = HEIGHT,
        color = color,
        title = title,
        subtitle = subtitle,
    );

    format!(
        "data:image/svg+xml;base64,{}",
        general_purpose::STANDARD.encode(svg)
    )
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::reliability::is_reliable;

    fn decode(url: &str) -> String {
        let payload = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        String::from_utf8(general_purpose::STANDARD.decode(payload).unwrap()).unwrap()
    }

    #[test]
    fn test_placeholder_is_reliable_and_deterministic() {
        let identity = VehicleIdentity::new("Toyota", "Camry", 2023);
        let a = synthetic_placeholder(&identity, "#eb0a1e");
        let b = synthetic_placeholder(&identity, "#eb0a1e");

        assert_eq!(a, b);
        assert!(is_reliable(Some(&a)));
    }

    #[test]
    fn test_placeholder_contains_escaped_text() {
        let identity = VehicleIdentity::new("Rolls & Royce", "<Ghost>", 0);
        let svg = decode(&synthetic_placeholder(&identity, "not-a-colour"));

        assert!(svg.contains("Rolls &amp; Royce &lt;Ghost&gt;"));
        assert!(svg.contains(NEUTRAL_COLOR));
    }

    #[test]
    fn test_derived_color_stable_and_case_insensitive() {
        let a = derived_brand_color("Subaru");
        assert_eq!(a, derived_brand_color(" subaru "));
        assert!(is_hex_color(&a));
        assert_eq!(derived_brand_color(""), NEUTRAL_COLOR);
    }
}

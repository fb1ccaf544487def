//! Terminal placeholder card shown once every image failed.

use crate::domain::entities::VehicleIdentity;

/// Text-only card naming the vehicle. Never triggers a network request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderCard {
    /// "Make Model" line.
    pub title: String,
    /// Year line, empty when unknown.
    pub subtitle: String,
    /// Accent colour as `#rrggbb`.
    pub accent: String,
}

impl PlaceholderCard {
    /// Builds the card for a vehicle.
    #[must_use]
    pub fn for_vehicle(identity: &VehicleIdentity, accent: impl Into<String>) -> Self {
        Self {
            title: identity.display_name(),
            subtitle: identity
                .known_year()
                .map(|year| year.to_string())
                .unwrap_or_default(),
            accent: accent.into(),
        }
    }

    /// Lines of the card body, without the frame.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        let mut lines = vec![self.title.as_str()];
        if !self.subtitle.is_empty() {
            lines.push(self.subtitle.as_str());
        }
        lines.push(self.accent.as_str());
        lines
    }
}

impl std::fmt::Display for PlaceholderCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self.lines();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let border = "-".repeat(width + 2);

        writeln!(f, "+{border}+")?;
        for line in lines {
            writeln!(f, "| {line:<width$} |")?;
        }
        write!(f, "+{border}+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_text() {
        let card = PlaceholderCard::for_vehicle(&VehicleIdentity::new("Mazda", "MX-5", 1990), "#101010");

        assert_eq!(card.title, "Mazda MX-5");
        assert_eq!(card.subtitle, "1990");
        assert_eq!(
            card.to_string(),
            "+------------+\n| Mazda MX-5 |\n| 1990       |\n| #101010    |\n+------------+"
        );
    }

    #[test]
    fn test_unknown_vehicle() {
        let card = PlaceholderCard::for_vehicle(&VehicleIdentity::new("", "", 0), "#4b5563");

        assert_eq!(card.title, "Unknown vehicle");
        assert!(card.subtitle.is_empty());
        assert_eq!(card.lines().len(), 2);
    }
}

//! Theme catalogue and application to the styling context.
//!
//! Tenants pick a theme by 1-based index. The index is clamped into the
//! catalogue, so any integer selects some theme.

use std::collections::BTreeMap;

use serde::Serialize;
use shopfront_core::ImageResolver;

use crate::api::Tenant;

/// One color set. Values are HSL triples without the `hsl()` wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub card: &'static str,
    pub card_foreground: &'static str,
    pub popover: &'static str,
    pub popover_foreground: &'static str,
    pub primary: &'static str,
    pub primary_foreground: &'static str,
    pub secondary: &'static str,
    pub secondary_foreground: &'static str,
    pub muted: &'static str,
    pub muted_foreground: &'static str,
    pub accent: &'static str,
    pub accent_foreground: &'static str,
    pub destructive: &'static str,
    pub destructive_foreground: &'static str,
    pub border: &'static str,
    pub input: &'static str,
    pub ring: &'static str,
}

impl Palette {
    /// CSS custom properties, in declaration order.
    #[must_use]
    pub const fn variables(&self) -> [(&'static str, &'static str); 19] {
        [
            ("--background", self.background),
            ("--foreground", self.foreground),
            ("--card", self.card),
            ("--card-foreground", self.card_foreground),
            ("--popover", self.popover),
            ("--popover-foreground", self.popover_foreground),
            ("--primary", self.primary),
            ("--primary-foreground", self.primary_foreground),
            ("--secondary", self.secondary),
            ("--secondary-foreground", self.secondary_foreground),
            ("--muted", self.muted),
            ("--muted-foreground", self.muted_foreground),
            ("--accent", self.accent),
            ("--accent-foreground", self.accent_foreground),
            ("--destructive", self.destructive),
            ("--destructive-foreground", self.destructive_foreground),
            ("--border", self.border),
            ("--input", self.input),
            ("--ring", self.ring),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gradients {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub hero: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fonts {
    pub heading: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: i64,
    pub name: &'static str,
    pub description: &'static str,
    pub light: Palette,
    pub dark: Palette,
    /// Corner radius; shared by both modes but only applied in light mode.
    pub radius: &'static str,
    pub gradients: Gradients,
    pub fonts: Fonts,
}

const INTER: Fonts = Fonts {
    heading: "Inter, system-ui, sans-serif",
    body: "Inter, system-ui, sans-serif",
};

pub static THEMES: [Theme; 3] = [
    Theme {
        id: 1,
        name: "Natural",
        description: "Earthy tones with green accents - warm and organic feel",
        light: Palette {
            background: "35 40% 94%",
            foreground: "25 30% 15%",
            card: "40 45% 98%",
            card_foreground: "25 30% 15%",
            popover: "40 45% 98%",
            popover_foreground: "25 30% 15%",
            primary: "145 50% 42%",
            primary_foreground: "0 0% 100%",
            secondary: "35 35% 85%",
            secondary_foreground: "25 30% 15%",
            muted: "35 30% 88%",
            muted_foreground: "25 20% 40%",
            accent: "30 70% 60%",
            accent_foreground: "25 30% 15%",
            destructive: "0 70% 50%",
            destructive_foreground: "0 0% 100%",
            border: "35 30% 82%",
            input: "35 30% 82%",
            ring: "145 50% 42%",
        },
        dark: Palette {
            background: "20 14% 10%",
            foreground: "40 33% 98%",
            card: "20 14% 14%",
            card_foreground: "40 33% 98%",
            popover: "20 14% 14%",
            popover_foreground: "40 33% 98%",
            primary: "150 25% 50%",
            primary_foreground: "0 0% 100%",
            secondary: "20 14% 18%",
            secondary_foreground: "40 33% 98%",
            muted: "20 14% 18%",
            muted_foreground: "40 20% 65%",
            accent: "270 30% 60%",
            accent_foreground: "0 0% 100%",
            destructive: "0 65% 50%",
            destructive_foreground: "0 0% 100%",
            border: "20 14% 22%",
            input: "20 14% 22%",
            ring: "150 25% 50%",
        },
        radius: "1rem",
        gradients: Gradients {
            primary: "linear-gradient(135deg, hsl(145 50% 42%) 0%, hsl(145 50% 32%) 100%)",
            secondary: "linear-gradient(135deg, hsl(35 35% 85%) 0%, hsl(35 30% 78%) 100%)",
            hero: "linear-gradient(135deg, hsl(35 40% 94%) 0%, hsl(145 30% 88%) 100%)",
        },
        fonts: INTER,
    },
    Theme {
        id: 2,
        name: "Modern Blue",
        description: "Clean blue tones - professional and trustworthy",
        light: Palette {
            background: "210 55% 92%",
            foreground: "220 40% 12%",
            card: "210 60% 97%",
            card_foreground: "220 40% 12%",
            popover: "210 60% 97%",
            popover_foreground: "220 40% 12%",
            primary: "215 85% 48%",
            primary_foreground: "0 0% 100%",
            secondary: "210 50% 82%",
            secondary_foreground: "220 40% 12%",
            muted: "210 45% 85%",
            muted_foreground: "215 25% 35%",
            accent: "200 75% 50%",
            accent_foreground: "0 0% 100%",
            destructive: "0 75% 55%",
            destructive_foreground: "0 0% 100%",
            border: "210 40% 78%",
            input: "210 40% 78%",
            ring: "215 85% 48%",
        },
        dark: Palette {
            background: "222 47% 8%",
            foreground: "210 40% 98%",
            card: "222 47% 12%",
            card_foreground: "210 40% 98%",
            popover: "222 47% 12%",
            popover_foreground: "210 40% 98%",
            primary: "217 91% 60%",
            primary_foreground: "0 0% 100%",
            secondary: "222 47% 16%",
            secondary_foreground: "210 40% 98%",
            muted: "222 47% 16%",
            muted_foreground: "215 20% 65%",
            accent: "262 83% 68%",
            accent_foreground: "0 0% 100%",
            destructive: "0 72% 51%",
            destructive_foreground: "0 0% 100%",
            border: "222 47% 20%",
            input: "222 47% 20%",
            ring: "217 91% 60%",
        },
        radius: "0.75rem",
        gradients: Gradients {
            primary: "linear-gradient(135deg, hsl(215 85% 48%) 0%, hsl(215 85% 38%) 100%)",
            secondary: "linear-gradient(135deg, hsl(210 50% 82%) 0%, hsl(210 45% 75%) 100%)",
            hero: "linear-gradient(135deg, hsl(210 55% 92%) 0%, hsl(200 50% 88%) 100%)",
        },
        fonts: INTER,
    },
    Theme {
        id: 3,
        name: "Luxury Gold",
        description: "Elegant champagne and gold - premium and luxurious",
        light: Palette {
            background: "45 35% 90%",
            foreground: "30 25% 10%",
            card: "45 40% 96%",
            card_foreground: "30 25% 10%",
            popover: "45 40% 96%",
            popover_foreground: "30 25% 10%",
            primary: "42 88% 55%",
            primary_foreground: "30 25% 10%",
            secondary: "40 30% 78%",
            secondary_foreground: "30 25% 10%",
            muted: "40 25% 82%",
            muted_foreground: "30 15% 35%",
            accent: "25 60% 50%",
            accent_foreground: "0 0% 100%",
            destructive: "0 75% 50%",
            destructive_foreground: "0 0% 100%",
            border: "40 25% 75%",
            input: "40 25% 75%",
            ring: "42 88% 55%",
        },
        dark: Palette {
            background: "0 0% 5%",
            foreground: "0 0% 98%",
            card: "0 0% 9%",
            card_foreground: "0 0% 98%",
            popover: "0 0% 9%",
            popover_foreground: "0 0% 98%",
            primary: "45 93% 50%",
            primary_foreground: "0 0% 9%",
            secondary: "0 0% 15%",
            secondary_foreground: "0 0% 98%",
            muted: "0 0% 15%",
            muted_foreground: "0 0% 64%",
            accent: "45 70% 40%",
            accent_foreground: "0 0% 98%",
            destructive: "0 62% 50%",
            destructive_foreground: "0 0% 100%",
            border: "0 0% 18%",
            input: "0 0% 18%",
            ring: "45 93% 50%",
        },
        radius: "0.5rem",
        gradients: Gradients {
            primary: "linear-gradient(135deg, hsl(42 88% 55%) 0%, hsl(38 85% 45%) 100%)",
            secondary: "linear-gradient(135deg, hsl(40 30% 78%) 0%, hsl(40 25% 70%) 100%)",
            hero: "linear-gradient(135deg, hsl(45 35% 90%) 0%, hsl(35 30% 85%) 100%)",
        },
        fonts: INTER,
    },
];

/// Theme for a 1-based index, clamped into the catalogue.
#[must_use]
pub fn theme_by_index(index: i64) -> &'static Theme {
    let last = THEMES.len() - 1;
    let position = usize::try_from(index.saturating_sub(1)).map_or(0, |i| i.min(last));
    THEMES.get(position).unwrap_or_else(default_theme)
}

#[must_use]
pub fn theme_by_id(id: i64) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

#[must_use]
pub fn default_theme() -> &'static Theme {
    let [natural, ..] = &THEMES;
    natural
}

// =============================================================================
// Styling context
// =============================================================================

/// Where a theme gets applied (the document root, in a browser host).
pub trait StyleTarget {
    fn set_property(&mut self, name: &str, value: &str);
    fn set_dark_class(&mut self, dark: bool);
    fn set_title(&mut self, title: &str);
    fn set_favicon(&mut self, href: &str);
}

/// In-memory styling context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStyle {
    pub properties: BTreeMap<String, String>,
    pub dark: bool,
    pub title: Option<String>,
    pub favicon: Option<String>,
}

impl DocumentStyle {
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

impl StyleTarget for DocumentStyle {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    fn set_dark_class(&mut self, dark: bool) {
        self.dark = dark;
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_favicon(&mut self, href: &str) {
        self.favicon = Some(href.to_string());
    }
}

/// Write the theme's variables for the chosen mode and toggle the dark class.
pub fn apply_theme(target: &mut impl StyleTarget, theme: &Theme, dark: bool) {
    let palette = if dark { &theme.dark } else { &theme.light };
    for (name, value) in palette.variables() {
        target.set_property(name, value);
    }
    if !dark {
        target.set_property("--radius", theme.radius);
    }
    target.set_dark_class(dark);
}

/// Set the document title and favicon from the tenant's brand.
pub fn apply_branding(target: &mut impl StyleTarget, tenant: &Tenant, images: &ImageResolver) {
    let title = match tenant.brand.tagline.as_deref().filter(|t| !t.is_empty()) {
        Some(tagline) => format!("{} - {tagline}", tenant.name),
        None => tenant.name.clone(),
    };
    target.set_title(&title);
    if let Some(logo) = tenant.brand.logo_url.as_deref().filter(|l| !l.is_empty()) {
        target.set_favicon(&images.resolve(logo));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::TenantId;

    use super::*;
    use crate::api::Brand;

    #[test]
    fn test_index_is_clamped() {
        assert_eq!(theme_by_index(1).name, "Natural");
        assert_eq!(theme_by_index(2).name, "Modern Blue");
        assert_eq!(theme_by_index(3).name, "Luxury Gold");
        assert_eq!(theme_by_index(0).id, 1);
        assert_eq!(theme_by_index(-4).id, 1);
        assert_eq!(theme_by_index(99).id, 3);
        assert_eq!(theme_by_index(i64::MIN).id, 1);
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(theme_by_id(2).unwrap().radius, "0.75rem");
        assert!(theme_by_id(4).is_none());
        assert_eq!(default_theme().id, 1);
    }

    #[test]
    fn test_radius_only_in_light_mode() {
        let mut light = DocumentStyle::default();
        apply_theme(&mut light, theme_by_index(3), false);
        assert_eq!(light.property("--radius"), Some("0.5rem"));
        assert_eq!(light.property("--primary"), Some("42 88% 55%"));
        assert!(!light.dark);

        let mut dark = DocumentStyle::default();
        apply_theme(&mut dark, theme_by_index(3), true);
        assert!(dark.property("--radius").is_none());
        assert_eq!(dark.property("--background"), Some("0 0% 5%"));
        assert_eq!(dark.properties.len(), 19);
        assert!(dark.dark);
    }

    #[test]
    fn test_branding_title_and_favicon() {
        let tenant = Tenant {
            id: TenantId::new("t1"),
            name: "Acme".to_string(),
            domain: "acme".to_string(),
            address: None,
            brand: Brand {
                tagline: Some("Everything".to_string()),
                logo_url: Some("/logo.png".to_string()),
                ..Brand::default()
            },
            categories: vec![],
        };
        let mut style = DocumentStyle::default();
        apply_branding(&mut style, &tenant, &ImageResolver::new("https://cdn.test/"));
        assert_eq!(style.title.as_deref(), Some("Acme - Everything"));
        assert_eq!(style.favicon.as_deref(), Some("https://cdn.test/logo.png"));
    }
}

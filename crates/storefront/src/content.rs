//! Tenant-driven hero and footer content.
//!
//! The tenant's brand may customize either block field by field; anything it
//! leaves out falls back to the storefront defaults below.

use serde::Serialize;
use shopfront_core::ImageResolver;

use crate::api::{QuickLink, SocialLinks, Tenant};

pub const DEFAULT_HERO_TITLE: &str = "Elevate Your Style";
pub const DEFAULT_HERO_SUBTITLE: &str = "Discover curated collections designed for the modern you.";
pub const DEFAULT_HERO_CTA_TEXT: &str = "Shop Now";
pub const DEFAULT_HERO_CTA_LINK: &str = "/products";
pub const DEFAULT_HERO_IMAGE: &str =
    "https://images.pexels.com/photos/5709661/pexels-photo-5709661.jpeg";

pub const DEFAULT_STORE_NAME: &str = "Store";
pub const DEFAULT_DESCRIPTION: &str = "Your trusted shopping destination.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub background_image: String,
}

impl HeroContent {
    #[must_use]
    pub fn resolve(tenant: Option<&Tenant>, images: &ImageResolver) -> Self {
        let hero = tenant.and_then(|t| t.brand.hero.as_ref());
        let pick = |value: Option<&String>, default: &str| {
            value
                .filter(|v| !v.is_empty())
                .map_or_else(|| default.to_string(), Clone::clone)
        };

        Self {
            title: pick(hero.and_then(|h| h.title.as_ref()), DEFAULT_HERO_TITLE),
            subtitle: pick(hero.and_then(|h| h.subtitle.as_ref()), DEFAULT_HERO_SUBTITLE),
            cta_text: pick(hero.and_then(|h| h.cta_text.as_ref()), DEFAULT_HERO_CTA_TEXT),
            cta_link: pick(hero.and_then(|h| h.cta_link.as_ref()), DEFAULT_HERO_CTA_LINK),
            background_image: hero
                .and_then(|h| h.background_image.as_deref())
                .filter(|v| !v.is_empty())
                .map_or_else(|| DEFAULT_HERO_IMAGE.to_string(), |raw| images.resolve(raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub name: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterContent {
    pub store_name: String,
    pub logo_url: Option<String>,
    pub description: String,
    pub company_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub copyright: String,
    pub quick_links: Vec<QuickLink>,
    /// Only the networks the tenant configured, in display order.
    pub social_links: Vec<SocialLink>,
}

impl FooterContent {
    #[must_use]
    pub fn resolve(tenant: Option<&Tenant>, year: i32, images: &ImageResolver) -> Self {
        let store_name = tenant
            .map(|t| t.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_STORE_NAME)
            .to_string();
        let brand = tenant.map(|t| &t.brand);
        let footer = brand.and_then(|b| b.footer.as_ref());
        let set = |value: Option<&String>| value.filter(|v| !v.is_empty()).cloned();

        let domain = tenant
            .map(|t| t.domain.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or("store");

        let quick_links = match footer.map(|f| &f.quick_links) {
            Some(links) if !links.is_empty() => links.clone(),
            _ => default_quick_links(),
        };

        Self {
            logo_url: set(brand.and_then(|b| b.logo_url.as_ref())).map(|l| images.resolve(&l)),
            description: set(brand.and_then(|b| b.description.as_ref()))
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            company_name: set(footer.and_then(|f| f.company_name.as_ref()))
                .unwrap_or_else(|| store_name.clone()),
            email: set(footer.and_then(|f| f.email.as_ref()))
                .unwrap_or_else(|| format!("support@{domain}")),
            phone: set(footer.and_then(|f| f.phone.as_ref())),
            address: set(footer.and_then(|f| f.address.as_ref()))
                .or_else(|| set(tenant.and_then(|t| t.address.as_ref()))),
            copyright: set(footer.and_then(|f| f.copyright_text.as_ref()))
                .unwrap_or_else(|| format!("© {year} {store_name}. All rights reserved.")),
            quick_links,
            social_links: footer
                .and_then(|f| f.social_links.as_ref())
                .map(social_links)
                .unwrap_or_default(),
            store_name,
        }
    }
}

fn default_quick_links() -> Vec<QuickLink> {
    [("Home", "/"), ("Shop", "/products"), ("About", "/about"), ("Contact", "/contact")]
        .into_iter()
        .map(|(label, url)| QuickLink {
            label: label.to_string(),
            url: url.to_string(),
        })
        .collect()
}

fn social_links(links: &SocialLinks) -> Vec<SocialLink> {
    [
        ("Facebook", &links.facebook),
        ("Twitter", &links.twitter),
        ("Instagram", &links.instagram),
        ("YouTube", &links.youtube),
        ("LinkedIn", &links.linkedin),
    ]
    .into_iter()
    .filter_map(|(name, href)| {
        href.as_ref()
            .filter(|h| !h.is_empty())
            .map(|href| SocialLink {
                name,
                href: href.clone(),
            })
    })
    .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::TenantId;

    use super::*;
    use crate::api::{Brand, FooterCustomization, HeroCustomization};

    fn tenant(brand: Brand) -> Tenant {
        Tenant {
            id: TenantId::new("t1"),
            name: "Acme".to_string(),
            domain: "acme".to_string(),
            address: Some("1 Main St".to_string()),
            brand,
            categories: vec![],
        }
    }

    #[test]
    fn test_hero_defaults_without_tenant() {
        let hero = HeroContent::resolve(None, &ImageResolver::new(""));
        assert_eq!(hero.title, DEFAULT_HERO_TITLE);
        assert_eq!(hero.cta_link, "/products");
        assert_eq!(hero.background_image, DEFAULT_HERO_IMAGE);
    }

    #[test]
    fn test_hero_partial_override() {
        let tenant = tenant(Brand {
            hero: Some(HeroCustomization {
                title: Some("Summer Sale".to_string()),
                background_image: Some("/hero.jpg".to_string()),
                ..HeroCustomization::default()
            }),
            ..Brand::default()
        });
        let hero = HeroContent::resolve(Some(&tenant), &ImageResolver::new("https://cdn.test/"));
        assert_eq!(hero.title, "Summer Sale");
        assert_eq!(hero.subtitle, DEFAULT_HERO_SUBTITLE);
        assert_eq!(hero.background_image, "https://cdn.test/hero.jpg");
    }

    #[test]
    fn test_footer_fallbacks() {
        let footer = FooterContent::resolve(Some(&tenant(Brand::default())), 2026, &ImageResolver::new(""));
        assert_eq!(footer.company_name, "Acme");
        assert_eq!(footer.email, "support@acme");
        assert_eq!(footer.address.as_deref(), Some("1 Main St"));
        assert_eq!(footer.copyright, "© 2026 Acme. All rights reserved.");
        assert_eq!(footer.description, DEFAULT_DESCRIPTION);
        let labels: Vec<_> = footer.quick_links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["Home", "Shop", "About", "Contact"]);
        assert!(footer.social_links.is_empty());

        let anonymous = FooterContent::resolve(None, 2026, &ImageResolver::new(""));
        assert_eq!(anonymous.store_name, "Store");
        assert_eq!(anonymous.email, "support@store");
    }

    #[test]
    fn test_footer_customization_wins() {
        let tenant = tenant(Brand {
            footer: Some(FooterCustomization {
                company_name: Some("Acme Ltd".to_string()),
                email: Some("hello@acme.test".to_string()),
                copyright_text: Some("(c) Acme".to_string()),
                social_links: Some(SocialLinks {
                    instagram: Some("https://instagram.test/acme".to_string()),
                    twitter: Some(String::new()),
                    ..SocialLinks::default()
                }),
                quick_links: vec![QuickLink {
                    label: "FAQ".to_string(),
                    url: "/faq".to_string(),
                }],
                ..FooterCustomization::default()
            }),
            ..Brand::default()
        });
        let footer = FooterContent::resolve(Some(&tenant), 2026, &ImageResolver::new(""));
        assert_eq!(footer.company_name, "Acme Ltd");
        assert_eq!(footer.email, "hello@acme.test");
        assert_eq!(footer.copyright, "(c) Acme");
        assert_eq!(footer.quick_links.len(), 1);
        assert_eq!(footer.social_links.len(), 1);
        assert_eq!(footer.social_links[0].name, "Instagram");
    }
}

//! Conversion from raw API payloads to canonical types.
//!
//! The API is inconsistent across endpoints and versions: ids arrive as
//! numbers or strings, images as strings or objects with one of several keys,
//! stock as a flat field or a nested inventory quantity, and category links as
//! an id or an embedded object. All of that is settled here.

use serde::Deserialize;
use serde::de::IgnoredAny;
use shopfront_core::{
    CategoryId, ImageResolver, Price, ProductId, SubCategoryId, reconcile_stock,
};

use super::types::{Category, CategoryRef, Product, SubCategory};

// =============================================================================
// Lenient field deserializers
// =============================================================================

pub mod de {
    use serde::{Deserialize, Deserializer};
    use shopfront_core::UserRole;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Str(String),
        Bool(bool),
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Self::Int(n) => n.to_string(),
                Self::Float(f) => f.to_string(),
                Self::Str(s) => s,
                Self::Bool(b) => b.to_string(),
            }
        }

        #[allow(clippy::cast_possible_truncation)] // integral check happens first
        fn into_i64(self) -> Option<i64> {
            match self {
                Self::Int(n) => Some(n),
                Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
                Self::Str(s) => s.trim().parse().ok(),
                _ => None,
            }
        }
    }

    /// A required identifier sent as either a string or a number.
    pub fn lenient_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: From<String>,
    {
        Scalar::deserialize(deserializer).map(|s| T::from(s.into_string()))
    }

    /// An optional identifier sent as a string, a number or null.
    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?
            .map(Scalar::into_string)
            .filter(|s| !s.is_empty()))
    }

    /// An optional integer sent as a number, a numeric string or null.
    /// Anything unparseable counts as absent.
    pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_i64))
    }

    /// A role string; unknown roles count as absent.
    pub fn opt_role<'de, D>(deserializer: D) -> Result<Option<UserRole>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|r| serde_json::from_value(serde_json::Value::String(r)).ok()))
    }

    /// Theme index, defaulting to the first theme when missing or malformed.
    pub fn theme_index<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_i64(deserializer)?.unwrap_or(1))
    }
}

// =============================================================================
// Raw payloads
// =============================================================================

/// Image reference in any of the shapes the API uses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawImage {
    Path(String),
    Object {
        url: Option<String>,
        #[serde(rename = "imageUrl")]
        image_url: Option<String>,
        path: Option<String>,
        src: Option<String>,
    },
    Other(IgnoredAny),
}

impl RawImage {
    fn reference(&self) -> Option<&str> {
        match self {
            Self::Path(p) => Some(p),
            Self::Object {
                url,
                image_url,
                path,
                src,
            } => url
                .as_deref()
                .or(image_url.as_deref())
                .or(path.as_deref())
                .or(src.as_deref()),
            Self::Other(_) => None,
        }
    }
}

/// Category link: either a bare id or an embedded object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCategoryLink {
    Embedded {
        #[serde(deserialize_with = "de::opt_i64", default)]
        id: Option<i64>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        slug: Option<String>,
    },
    Id(#[serde(deserialize_with = "de::opt_i64")] Option<i64>),
}

impl RawCategoryLink {
    fn id(&self) -> Option<i64> {
        match self {
            Self::Embedded { id, .. } | Self::Id(id) => *id,
        }
    }

    fn to_ref(&self) -> Option<CategoryRef> {
        match self {
            Self::Embedded {
                id: Some(id),
                name,
                slug,
            } => Some(CategoryRef {
                id: *id,
                name: name.clone().unwrap_or_default(),
                slug: slug.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawInventory {
    #[serde(deserialize_with = "de::opt_i64")]
    quantity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawProduct {
    #[serde(deserialize_with = "de::opt_string")]
    id: Option<String>,
    title: Option<String>,
    slug: Option<String>,
    price: Option<Price>,
    #[serde(deserialize_with = "de::opt_i64")]
    stock: Option<i64>,
    brand: Option<String>,
    images: Option<Vec<RawImage>>,
    description: Option<String>,
    #[serde(deserialize_with = "de::opt_i64")]
    category_id: Option<i64>,
    #[serde(deserialize_with = "de::opt_i64")]
    sub_category_id: Option<i64>,
    inventory: Option<RawInventory>,
    category: Option<RawCategoryLink>,
    sub_category: Option<RawCategoryLink>,
}

impl RawProduct {
    pub(crate) fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Normalize into a [`Product`].
    ///
    /// `fallback_id` is used when the payload omits its own id (detail
    /// responses sometimes do).
    pub(crate) fn into_product(self, images: &ImageResolver, fallback_id: Option<&ProductId>) -> Option<Product> {
        let id = self
            .id
            .map(ProductId::new)
            .or_else(|| fallback_id.cloned())?;

        let stock = reconcile_stock(
            self.stock,
            self.inventory.as_ref().and_then(|i| i.quantity),
        );
        let category_id = self
            .category_id
            .or_else(|| self.category.as_ref().and_then(RawCategoryLink::id))
            .map(CategoryId::new);
        let sub_category_id = self
            .sub_category_id
            .or_else(|| self.sub_category.as_ref().and_then(RawCategoryLink::id))
            .map(SubCategoryId::new);
        let resolved_images = self
            .images
            .unwrap_or_default()
            .iter()
            .map(|img| images.resolve_opt(img.reference()))
            .collect();

        Some(Product {
            slug: self.slug.unwrap_or_else(|| id.to_string()),
            title: self.title.unwrap_or_else(|| "Untitled".to_string()),
            price: self.price.unwrap_or(Price::ZERO),
            stock,
            brand: self.brand.unwrap_or_default(),
            images: resolved_images,
            description: self.description.filter(|d| !d.is_empty()),
            category_id,
            sub_category_id,
            category: self.category.as_ref().and_then(RawCategoryLink::to_ref),
            sub_category: self.sub_category.as_ref().and_then(RawCategoryLink::to_ref),
            id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCategory {
    #[serde(deserialize_with = "de::opt_i64")]
    id: Option<i64>,
    name: Option<String>,
    slug: Option<String>,
}

impl RawCategory {
    pub(crate) fn into_category(self) -> Option<Category> {
        let id = self.id?;
        let name = self.name.unwrap_or_default();
        Some(Category {
            id: CategoryId::new(id),
            slug: self.slug.unwrap_or_else(|| slugify(&name)),
            name,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawSubCategory {
    #[serde(deserialize_with = "de::opt_i64")]
    id: Option<i64>,
    name: Option<String>,
    slug: Option<String>,
    #[serde(deserialize_with = "de::opt_i64")]
    category_id: Option<i64>,
    category: Option<RawCategory>,
}

impl RawSubCategory {
    pub(crate) fn into_sub_category(self) -> Option<SubCategory> {
        let id = self.id?;
        let category = self.category.and_then(RawCategory::into_category);
        let name = self.name.unwrap_or_default();
        Some(SubCategory {
            id: SubCategoryId::new(id),
            slug: self.slug.unwrap_or_else(|| slugify(&name)),
            name,
            category_id: self
                .category_id
                .map(CategoryId::new)
                .or_else(|| category.as_ref().map(|c| c.id)),
            category,
        })
    }
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolver() -> ImageResolver {
        ImageResolver::new("https://cdn.acme.test")
    }

    fn product(value: serde_json::Value) -> Product {
        serde_json::from_value::<RawProduct>(value)
            .unwrap()
            .into_product(&resolver(), None)
            .unwrap()
    }

    #[test]
    fn test_image_shapes_resolve_through_one_resolver() {
        let p = product(json!({
            "id": "p1",
            "images": [
                "/a.jpg",
                { "imageUrl": "https://other.test/b.jpg" },
                { "path": "/c.jpg" },
                { "src": "bare.jpg" },
                42
            ]
        }));
        assert_eq!(
            p.images,
            vec![
                "https://cdn.acme.test/a.jpg",
                "https://other.test/b.jpg",
                "https://cdn.acme.test/c.jpg",
                "/placeholder.svg",
                "/placeholder.svg",
            ]
        );
    }

    #[test]
    fn test_nested_inventory_wins_over_flat_stock() {
        let p = product(json!({ "id": "p1", "stock": 10, "inventory": { "quantity": 3 } }));
        assert_eq!(p.stock, 3);
        let p = product(json!({ "id": "p1", "stock": "4" }));
        assert_eq!(p.stock, 4);
        let p = product(json!({ "id": "p1" }));
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn test_category_link_shapes() {
        let p = product(json!({
            "id": 5,
            "category": { "id": "2", "name": "Shoes", "slug": "shoes" },
            "subCategory": 9
        }));
        assert_eq!(p.id.as_str(), "5");
        assert_eq!(p.category_id, Some(CategoryId::new(2)));
        assert_eq!(p.sub_category_id, Some(SubCategoryId::new(9)));
        assert_eq!(p.category.unwrap().name, "Shoes");
        assert!(p.sub_category.is_none());
    }

    #[test]
    fn test_explicit_category_id_preferred() {
        let p = product(json!({ "id": "p1", "categoryId": 3, "category": { "id": 4 } }));
        assert_eq!(p.category_id, Some(CategoryId::new(3)));
    }

    #[test]
    fn test_defaults_and_fallback_id() {
        let raw: RawProduct = serde_json::from_value(json!({ "price": "12.50" })).unwrap();
        assert!(raw.id().is_none());
        let p = raw
            .into_product(&resolver(), Some(&ProductId::new("p9")))
            .unwrap();
        assert_eq!(p.id.as_str(), "p9");
        assert_eq!(p.slug, "p9");
        assert_eq!(p.title, "Untitled");
        assert_eq!(p.price, Price::from_cents(1250));
    }

    #[test]
    fn test_product_without_any_id_is_dropped() {
        let raw: RawProduct = serde_json::from_value(json!({ "title": "Ghost" })).unwrap();
        assert!(raw.into_product(&resolver(), None).is_none());
    }

    #[test]
    fn test_subcategory_takes_parent_from_embedded_category() {
        let raw: RawSubCategory = serde_json::from_value(json!({
            "id": 4,
            "name": "Running Shoes",
            "category": { "id": 2, "name": "Shoes", "slug": "shoes" }
        }))
        .unwrap();
        let sub = raw.into_sub_category().unwrap();
        assert_eq!(sub.category_id, Some(CategoryId::new(2)));
        assert_eq!(sub.slug, "running-shoes");
    }
}

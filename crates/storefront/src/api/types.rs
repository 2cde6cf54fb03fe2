//! Canonical domain types produced by the API client.
//!
//! These are the only shapes slices and views ever see. Everything the remote
//! API may send in more than one form is folded into these types by
//! [`conversions`](super::conversions) on receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::{
    CategoryId, OrderId, OrderStatus, PLACEHOLDER_IMAGE, Price, ProductId, SubCategoryId, TenantId,
    UserId, UserRole,
};

use super::conversions::de;

// =============================================================================
// Catalog
// =============================================================================

/// A product as displayed and as snapshotted into cart and favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub price: Price,
    /// Authoritative stock figure (see `reconcile_stock`)
    pub stock: u32,
    pub brand: String,
    /// Resolved image URLs, first is the primary image
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<SubCategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<CategoryRef>,
}

impl Product {
    /// The primary image reference, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Image to show for the product: the primary image as resolved when the
    /// product was decoded, or the placeholder.
    #[must_use]
    pub fn display_image(&self) -> String {
        self.primary_image().unwrap_or(PLACEHOLDER_IMAGE).to_string()
    }
}

/// Embedded category or subcategory summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Product listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub sub_category: Option<SubCategoryId>,
}

impl ProductFilter {
    #[must_use]
    pub const fn category(id: CategoryId) -> Self {
        Self {
            category: Some(id),
            sub_category: None,
        }
    }

    /// Query parameters for the listing endpoint.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = self.category {
            params.push(("categoryId", category.to_string()));
        }
        if let Some(sub) = self.sub_category {
            params.push(("subCategoryId", sub.to_string()));
        }
        params
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub total_amount: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "order_items", alias = "orderItems", alias = "items", default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderCustomer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(deserialize_with = "de::lenient_string")]
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<OrderProduct>,
}

/// Product summary embedded in an order line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderProduct {
    pub title: String,
    pub slug: String,
    pub brand: String,
    pub price: Price,
}

/// Customer summary embedded in admin order listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderCustomer {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
}

/// Order submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub total_amount: Price,
    #[serde(rename = "order_items")]
    pub items: Vec<NewOrderLine>,
}

impl NewOrder {
    /// Build a submission whose total is the sum of its lines.
    #[must_use]
    pub fn from_lines(items: Vec<NewOrderLine>) -> Self {
        let total_amount = items.iter().map(|l| l.unit_price.times(l.quantity)).sum();
        Self {
            total_amount,
            items,
        }
    }

    /// Build a submission with an explicit total (e.g. including shipping).
    #[must_use]
    pub const fn with_total(items: Vec<NewOrderLine>, total_amount: Price) -> Self {
        Self {
            total_amount,
            items,
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
}

/// Login response as received. Completeness is checked by the user slice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub user: Option<LoginUser>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginUser {
    #[serde(deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "de::opt_role")]
    pub role: Option<UserRole>,
}

// =============================================================================
// Tenant
// =============================================================================

/// A white-labeled storefront instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: TenantId,
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub brand: Brand,
    #[serde(default)]
    pub categories: Vec<TenantCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Brand {
    pub logo_url: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    /// 1-based theme index
    #[serde(deserialize_with = "de::theme_index")]
    pub theme: i64,
    pub hero: Option<HeroCustomization>,
    pub footer: Option<FooterCustomization>,
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            logo_url: None,
            tagline: None,
            description: None,
            theme: 1,
            hero: None,
            footer: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroCustomization {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterCustomization {
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub copyright_text: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub quick_links: Vec<QuickLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub sub_categories: Vec<TenantSubCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSubCategory {
    pub id: SubCategoryId,
    pub name: String,
}

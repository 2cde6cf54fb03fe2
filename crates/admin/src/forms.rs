//! Product form validation and submission encoding.
//!
//! Form fields arrive as the raw strings a user typed. [`ProductForm::validate`]
//! reports every problem at once so a form can mark each field inline, and
//! yields a [`ValidProduct`] that knows how to become a multipart body.

use std::fmt;

use rust_decimal::Decimal;
use shopfront_core::{CategoryId, Price, SubCategoryId};
use shopfront_storefront::api::{FilePart, MultipartForm};

/// Images a product may carry, existing and new combined.
pub const MAX_IMAGES: usize = 5;

/// Multipart field name for uploaded image files.
pub const IMAGE_FIELD: &str = "images";

/// Raw product form input.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub brand: String,
    pub category_id: Option<CategoryId>,
    pub sub_category_id: Option<SubCategoryId>,
}

/// Which field a problem belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Price,
    Stock,
    Category,
    Images,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every problem found in a form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    #[must_use]
    pub fn for_field(&self, field: Field) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, field: Field, message: &'static str) {
        self.0.push(FieldError { field, message });
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message).collect();
        f.write_str(&messages.join("; "))
    }
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub stock: u32,
    pub brand: String,
    pub category_id: CategoryId,
    pub sub_category_id: Option<SubCategoryId>,
}

impl ProductForm {
    /// Check the form. `image_count` is the number of images the product
    /// would end up with.
    ///
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self, image_count: usize) -> Result<ValidProduct, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(Field::Title, "Title is required");
        }
        let description = self.description.trim();
        if description.is_empty() {
            errors.push(Field::Description, "Description is required");
        }
        let price = self
            .price
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|p| p.is_sign_positive() && !p.is_zero());
        if price.is_none() {
            errors.push(Field::Price, "Price must be a positive number");
        }
        let stock = self.stock.trim().parse::<u32>().ok();
        if stock.is_none() {
            errors.push(Field::Stock, "Stock must be a non-negative integer");
        }
        if self.category_id.is_none() {
            errors.push(Field::Category, "Category is required");
        }
        if image_count > MAX_IMAGES {
            errors.push(Field::Images, "A product can have at most 5 images");
        }

        match (price, stock, self.category_id) {
            (Some(price), Some(stock), Some(category_id)) if errors.is_empty() => {
                Ok(ValidProduct {
                    title: title.to_string(),
                    description: description.to_string(),
                    price: Price::new(price),
                    stock,
                    brand: self.brand.trim().to_string(),
                    category_id,
                    sub_category_id: self.sub_category_id,
                })
            }
            _ => Err(errors),
        }
    }
}

impl ValidProduct {
    /// Multipart body with the product fields and `images` as file parts.
    #[must_use]
    pub fn to_multipart(&self, images: Vec<FilePart>) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("title", &self.title)
            .text("description", &self.description)
            .text("price", self.price.to_string())
            .text("stock", self.stock.to_string())
            .text("brand", &self.brand)
            .text("categoryId", self.category_id.to_string());
        if let Some(sub) = self.sub_category_id {
            form = form.text("subCategoryId", sub.to_string());
        }
        images.into_iter().fold(form, MultipartForm::file)
    }
}

/// An image file for upload under the `images` field.
#[must_use]
pub fn image_part(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> FilePart {
    FilePart {
        field: IMAGE_FIELD.to_string(),
        file_name: file_name.into(),
        content_type: content_type.into(),
        bytes,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            title: " Linen Shirt ".to_string(),
            description: "Breathable".to_string(),
            price: "49.90".to_string(),
            stock: "12".to_string(),
            brand: "Acme".to_string(),
            category_id: Some(CategoryId::new(2)),
            sub_category_id: None,
        }
    }

    #[test]
    fn test_valid_form() {
        let product = form().validate(1).unwrap();
        assert_eq!(product.title, "Linen Shirt");
        assert_eq!(product.price, Price::from_cents(4990));
        assert_eq!(product.stock, 12);
    }

    #[test]
    fn test_all_problems_reported_together() {
        let errors = ProductForm::default().validate(6).unwrap_err();
        assert_eq!(errors.0.len(), 6);
        assert_eq!(errors.for_field(Field::Title), Some("Title is required"));
        assert_eq!(errors.for_field(Field::Images), Some("A product can have at most 5 images"));
    }

    #[test]
    fn test_price_and_stock_rules() {
        for price in ["0", "-3", "abc", ""] {
            let errors = ProductForm {
                price: price.to_string(),
                ..form()
            }
            .validate(0)
            .unwrap_err();
            assert_eq!(errors.for_field(Field::Price), Some("Price must be a positive number"));
        }
        for stock in ["-1", "2.5", "x"] {
            let errors = ProductForm {
                stock: stock.to_string(),
                ..form()
            }
            .validate(0)
            .unwrap_err();
            assert!(errors.for_field(Field::Stock).is_some());
        }
        assert!(ProductForm {
            stock: "0".to_string(),
            ..form()
        }
        .validate(0)
        .is_ok());
    }

    #[test]
    fn test_multipart_fields() {
        let product = ProductForm {
            sub_category_id: Some(SubCategoryId::new(7)),
            ..form()
        }
        .validate(1)
        .unwrap();
        let body = product.to_multipart(vec![image_part("a.png", "image/png", vec![1, 2])]);
        assert_eq!(body.field("categoryId"), Some("2"));
        assert_eq!(body.field("subCategoryId"), Some("7"));
        assert_eq!(body.field("price"), Some("49.90"));
        assert_eq!(body.files.len(), 1);
        assert_eq!(body.files[0].field, "images");
    }
}

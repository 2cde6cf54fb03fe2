//! `shopfront admin`

use std::path::{Path, PathBuf};

use shopfront_admin::{AdminClient, OrderFilter, ProductForm, image_part};
use shopfront_core::{OrderId, OrderStatus, ProductId};
use shopfront_storefront::Store;
use thiserror::Error;

use super::CommandResult;
use crate::output;

/// Errors preparing an admin command.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported image type: {0}")]
    UnsupportedType(PathBuf),
}

fn admin(store: &Store) -> AdminClient {
    AdminClient::new(store.client().clone())
}

fn content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

pub async fn create_product(store: &Store, form: &ProductForm, images: &[PathBuf]) -> CommandResult {
    let mut parts = Vec::with_capacity(images.len());
    for path in images {
        let mime = content_type(path).ok_or_else(|| ImageError::UnsupportedType(path.clone()))?;
        let bytes = tokio::fs::read(path).await.map_err(|source| ImageError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        parts.push(image_part(name, mime, bytes));
    }

    let created = admin(store).create_product(form, parts).await?;
    output::emit(&created)?;
    Ok(())
}

pub async fn delete_product(store: &Store, id: &str) -> CommandResult {
    admin(store).delete_product(&ProductId::new(id)).await?;
    output::status(&format!("Product {id} deleted"));
    Ok(())
}

pub async fn list_orders(store: &Store, status: Option<OrderStatus>, query: String) -> CommandResult {
    let orders = admin(store).list_orders().await?;
    let filter = OrderFilter { status, query };
    output::emit(&filter.apply(&orders))?;
    Ok(())
}

pub async fn update_order_status(store: &Store, id: OrderId, status: OrderStatus) -> CommandResult {
    admin(store).update_order_status(id, status).await?;
    output::status(&format!("Order {id} is now {status}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type(Path::new("a/b.JPG")), Some("image/jpeg"));
        assert_eq!(content_type(Path::new("shot.webp")), Some("image/webp"));
        assert_eq!(content_type(Path::new("notes.txt")), None);
        assert_eq!(content_type(Path::new("noext")), None);
    }
}

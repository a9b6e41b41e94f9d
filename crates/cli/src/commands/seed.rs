//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - id: linen-apron
//!     name: Linen Apron
//!     description: Hand-dyed, one size.
//!     price: "34.00"
//!     image_url: /images/apron.jpg
//! delivery_options:
//!   - name: Standard
//!     price: "4.95"
//!     description: 3-5 working days
//! ```
//!
//! Products are matched on `id` and delivery options on `name`, so running
//! the same file twice changes nothing.

use std::path::Path;

use bramble_core::ProductId;
use bramble_storefront::db::{self, DeliveryOptionRepository, ProductRepository};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{CommandError, database_url};

/// Top-level seed document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    #[serde(default)]
    pub delivery_options: Vec<DeliveryOptionSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryOptionSeed {
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
}

/// Rows written by a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub delivery_options: usize,
}

/// Problems that would make a seed row unusable, one message per problem.
fn validate(seed: &CatalogSeed) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, product) in seed.products.iter().enumerate() {
        if product.id.trim().is_empty() {
            errors.push(format!("products[{i}]: id is empty"));
        }
        if product.name.trim().is_empty() {
            errors.push(format!("products[{i}]: name is empty"));
        }
        if product.price.is_sign_negative() {
            errors.push(format!("products[{i}]: price is negative"));
        }
    }

    for (i, option) in seed.delivery_options.iter().enumerate() {
        if option.name.trim().is_empty() {
            errors.push(format!("delivery_options[{i}]: name is empty"));
        }
        if option.price.is_sign_negative() {
            errors.push(format!("delivery_options[{i}]: price is negative"));
        }
    }

    errors
}

/// Parse and validate a seed document.
///
/// # Errors
///
/// Returns `CommandError::Yaml` for malformed YAML and
/// `CommandError::Invalid` listing every unusable entry.
pub fn parse(content: &str) -> Result<CatalogSeed, CommandError> {
    let seed: CatalogSeed = serde_yaml::from_str(content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        for err in &errors {
            tracing::error!("  - {err}");
        }
        return Err(CommandError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }

    Ok(seed)
}

/// Upsert every product and delivery option in `path`.
///
/// The file is read and validated before connecting to the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, `DATABASE_URL` is
/// unset, or a write fails.
pub async fn catalog(path: &Path) -> Result<SeedSummary, CommandError> {
    tracing::info!(path = %path.display(), "Loading catalog");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let seed = parse(&content)?;

    tracing::info!(
        products = seed.products.len(),
        delivery_options = seed.delivery_options.len(),
        "Parsed catalog"
    );

    let pool = db::create_pool(&database_url()?).await?;
    let mut summary = SeedSummary::default();

    let products = ProductRepository::new(&pool);
    for product in &seed.products {
        let saved = products
            .upsert(
                &ProductId::new(product.id.trim()),
                product.name.trim(),
                product.description.as_deref(),
                product.price,
                product.image_url.as_deref(),
            )
            .await?;
        tracing::debug!(id = %saved.id, "Product upserted");
        summary.products += 1;
    }

    let options = DeliveryOptionRepository::new(&pool);
    for option in &seed.delivery_options {
        let saved = options
            .upsert(option.name.trim(), option.price, option.description.as_deref())
            .await?;
        tracing::debug!(id = %saved.id, name = %saved.name, "Delivery option upserted");
        summary.delivery_options += 1;
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let seed = parse(
            r#"
products:
  - id: linen-apron
    name: Linen Apron
    price: "34.00"
delivery_options:
  - name: Standard
    price: "4.95"
    description: 3-5 working days
"#,
        )
        .unwrap();

        assert_eq!(seed.products.len(), 1);
        assert_eq!(seed.products[0].price, Decimal::new(3400, 2));
        assert!(seed.products[0].image_url.is_none());
        assert_eq!(seed.delivery_options[0].name, "Standard");
    }

    #[test]
    fn test_sections_are_optional() {
        let seed = parse("delivery_options: []").unwrap();
        assert!(seed.products.is_empty());
    }

    #[test]
    fn test_unusable_rows_are_rejected() {
        let err = parse(
            r#"
products:
  - id: " "
    name: Apron
    price: "-1"
"#,
        )
        .unwrap_err();

        assert!(matches!(err, CommandError::Invalid(ref msg) if msg.starts_with("2 ")));
    }

    #[test]
    fn test_unknown_sections_are_rejected() {
        assert!(matches!(
            parse("coupons: []").unwrap_err(),
            CommandError::Yaml(_)
        ));
    }
}

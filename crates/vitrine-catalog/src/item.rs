//! Listing and seller types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::ids::{ItemId, SellerId};
use crate::money::Money;

/// Seller summary embedded in every listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    /// Seller identifier.
    pub id: SellerId,
    /// Display name.
    pub name: String,
    /// Average rating (0.0-5.0).
    #[serde(default)]
    pub rating: f32,
    /// Whether the seller passed identity verification.
    #[serde(default)]
    pub verified: bool,
    /// Share of conversations answered, in percent.
    #[serde(default)]
    pub response_rate: u8,
    /// Typical response delay label (e.g., "< 1h").
    #[serde(default)]
    pub response_time: String,
    /// Number of items sold so far.
    #[serde(default)]
    pub items_sold: u32,
}

impl SellerSummary {
    /// Create a seller summary with no history.
    pub fn new(id: impl Into<SellerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating: 0.0,
            verified: false,
            response_rate: 0,
            response_time: String::new(),
            items_sold: 0,
        }
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = rating.clamp(0.0, 5.0);
        self
    }

    /// Mark the seller as verified.
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Set the response metrics.
    pub fn with_response(mut self, rate: u8, time: impl Into<String>) -> Self {
        self.response_rate = rate.min(100);
        self.response_time = time.into();
        self
    }

    /// Set the number of items sold.
    pub fn with_items_sold(mut self, count: u32) -> Self {
        self.items_sold = count;
        self
    }
}

/// A catalog listing.
///
/// Listings are read-only once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique listing identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Category label (e.g., "Chaussures").
    pub category: String,
    /// Sub-category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    /// Current asking price.
    pub price: Money,
    /// Price before discount, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    /// Discount percentage (0-100).
    #[serde(default)]
    pub discount: u8,
    /// Image references.
    #[serde(default)]
    pub images: Vec<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Condition label (e.g., "Neuf", "Très bon état").
    #[serde(default)]
    pub condition: String,
    /// Location label.
    #[serde(default)]
    pub location: String,
    /// View counter.
    #[serde(default)]
    pub views: u32,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
    /// Whether the current user marked it as favorite.
    #[serde(default)]
    pub is_favorite: bool,
    /// Seller summary.
    pub seller: SellerSummary,
}

impl Item {
    /// Create a listing with no discount and empty descriptive fields.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money,
        seller: SellerSummary,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            sub_category: None,
            price,
            original_price: None,
            discount: 0,
            images: Vec::new(),
            description: String::new(),
            condition: String::new(),
            location: String::new(),
            views: 0,
            created_at: Utc::now(),
            is_favorite: false,
            seller,
        }
    }

    /// Set the sub-category.
    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    /// Set the original price and derive the discount from it.
    pub fn with_original_price(mut self, original: Money) -> Self {
        self.original_price = Some(original);
        self.discount = self.derived_discount();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the condition label.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Set the location label.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Add an image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(image.into());
        self
    }

    /// Set the view counter.
    pub fn with_views(mut self, views: u32) -> Self {
        self.views = views;
        self
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Discount computed from `price` and `original_price`.
    pub fn derived_discount(&self) -> u8 {
        self.original_price
            .map(|original| self.price.discount_percent_from(&original))
            .unwrap_or(0)
    }

    /// Check the pricing rules: discount is at most 100, and an original
    /// price is in the same currency and not below the current price.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidItem {
            id: self.id.to_string(),
            reason,
        };

        if self.discount > 100 {
            return Err(invalid(format!("discount {} exceeds 100", self.discount)));
        }
        if let Some(ref original) = self.original_price {
            if original.currency != self.price.currency {
                return Err(invalid(format!(
                    "original price in {} but price in {}",
                    original.currency.code(),
                    self.price.currency.code()
                )));
            }
            if original.amount_cents < self.price.amount_cents {
                return Err(invalid(format!(
                    "original price {} below price {}",
                    original.display(),
                    self.price.display()
                )));
            }
        }
        Ok(())
    }

    /// Check whether the listing is on sale.
    pub fn is_discounted(&self) -> bool {
        self.discount > 0
    }

    /// Check whether the category or sub-category label equals `name` exactly.
    pub fn in_category(&self, name: &str) -> bool {
        self.category == name || self.sub_category.as_deref() == Some(name)
    }

    /// Check whether name, category or description contains `needle`.
    ///
    /// `needle` must already be lowercased.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    /// Get the primary image, if any.
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

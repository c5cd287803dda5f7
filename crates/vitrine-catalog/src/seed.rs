//! Catalog loading and the built-in demo catalog.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::CatalogError;
use crate::item::{Item, SellerSummary};
use crate::money::{Currency, Money};

/// Parse a JSON array of items, rejecting duplicate ids and items that
/// fail [`Item::validate`].
pub fn parse_items(json: &str) -> Result<Vec<Item>, CatalogError> {
    let items: Vec<Item> = serde_json::from_str(json)?;
    check_unique_ids(&items)?;
    items.iter().try_for_each(Item::validate)?;
    Ok(items)
}

/// Read a JSON array of items from a file.
pub fn load_items_json(path: impl AsRef<Path>) -> Result<Vec<Item>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_items(&content)
}

fn check_unique_ids(items: &[Item]) -> Result<(), CatalogError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(CatalogError::DuplicateItem(item.id.to_string()));
        }
    }
    Ok(())
}

fn eur(amount: f64) -> Money {
    Money::from_decimal(amount, Currency::EUR)
}

fn listed_at(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

/// The eight-listing demo catalog.
///
/// Two listings are shoes, five are discounted.
pub fn demo_catalog() -> Vec<Item> {
    let awa = SellerSummary::new("seller-awa", "Awa Boutique")
        .with_rating(4.8)
        .verified()
        .with_response(98, "< 1h")
        .with_items_sold(152);
    let koffi = SellerSummary::new("seller-koffi", "Koffi")
        .with_rating(4.2)
        .with_response(85, "< 3h")
        .with_items_sold(23);
    let mariam = SellerSummary::new("seller-mariam", "Mariam Déco")
        .with_rating(4.6)
        .verified()
        .with_response(92, "< 2h")
        .with_items_sold(67);

    vec![
        Item::new("item-001", "Nike Air Max 270", "Chaussures", eur(89.0), awa.clone())
            .with_original_price(eur(129.0))
            .with_description("Baskets portées deux fois, taille 42, boîte d'origine.")
            .with_condition("Très bon état")
            .with_location("Abidjan, Cocody")
            .with_image("items/item-001/1.jpg")
            .with_views(342)
            .with_created_at(listed_at(1_717_236_000)),
        Item::new("item-002", "iPhone 13 128 Go", "Électronique", eur(520.0), koffi.clone())
            .with_sub_category("Téléphones")
            .with_original_price(eur(650.0))
            .with_description("Batterie à 89 %, vendu avec coque et chargeur.")
            .with_condition("Bon état")
            .with_location("Dakar, Plateau")
            .with_image("items/item-002/1.jpg")
            .with_views(1204)
            .with_created_at(listed_at(1_717_322_400)),
        Item::new("item-003", "Robe wax sur mesure", "Vêtements", eur(45.0), mariam.clone())
            .with_sub_category("Robes")
            .with_description("Robe longue en pagne wax, taille M.")
            .with_condition("Neuf")
            .with_location("Abidjan, Marcory")
            .with_image("items/item-003/1.jpg")
            .with_views(88)
            .with_created_at(listed_at(1_717_408_800)),
        Item::new("item-004", "Sandales en cuir", "Mode", eur(30.0), mariam.clone())
            .with_sub_category("Chaussures")
            .with_original_price(eur(40.0))
            .with_description("Sandales artisanales, pointure 39.")
            .with_condition("Neuf")
            .with_location("Bamako")
            .with_image("items/item-004/1.jpg")
            .with_views(51)
            .with_created_at(listed_at(1_717_495_200)),
        Item::new("item-005", "Canapé trois places", "Maison", eur(250.0), koffi.clone())
            .with_description("Canapé en tissu gris, à venir chercher sur place.")
            .with_condition("Bon état")
            .with_location("Lomé")
            .with_image("items/item-005/1.jpg")
            .with_views(176)
            .with_created_at(listed_at(1_717_581_600)),
        Item::new("item-006", "Casque Sony WH-1000XM4", "Électronique", eur(180.0), awa.clone())
            .with_sub_category("Audio")
            .with_original_price(eur(240.0))
            .with_description("Réduction de bruit active, étui inclus.")
            .with_condition("Très bon état")
            .with_location("Dakar, Almadies")
            .with_image("items/item-006/1.jpg")
            .with_views(409)
            .with_created_at(listed_at(1_717_668_000)),
        Item::new("item-007", "Lampe de chevet en rotin", "Maison", eur(25.0), mariam)
            .with_sub_category("Décoration")
            .with_original_price(eur(35.0))
            .with_description("Abat-jour tressé à la main.")
            .with_condition("Neuf")
            .with_location("Cotonou")
            .with_image("items/item-007/1.jpg")
            .with_views(63)
            .with_created_at(listed_at(1_717_754_400)),
        Item::new("item-008", "Vélo de ville", "Sport", eur(150.0), koffi)
            .with_description("Cadre aluminium, 7 vitesses, révisé récemment.")
            .with_condition("Bon état")
            .with_location("Ouagadougou")
            .with_image("items/item-008/1.jpg")
            .with_views(97)
            .with_created_at(listed_at(1_717_840_800)),
    ]
}

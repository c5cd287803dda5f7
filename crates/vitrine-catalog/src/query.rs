//! Query keys and their filter predicates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::item::Item;

/// Category labels that mean "every item".
const ALL_ALIASES: [&str; 3] = ["Tous", "all", "All"];

/// The kind of collection a query key selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    All,
    Category,
    Discounted,
    Search,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Category => "category",
            Self::Discounted => "discounted",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies one logical, filtered view of the catalog.
///
/// Equal keys share one cached result list and one in-flight request, so
/// keys should be built through the constructors, which normalize their
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "param", rename_all = "lowercase")]
pub enum QueryKey {
    /// Every item.
    All,
    /// Items whose category or sub-category equals the name.
    Category(String),
    /// Items with a discount.
    Discounted,
    /// Items whose name, category or description contains the text.
    Search(String),
}

impl QueryKey {
    /// Key for a category. The aliases "Tous", "all" and "All" select every item.
    pub fn category(name: impl Into<String>) -> Self {
        let name = name.into();
        if ALL_ALIASES.contains(&name.as_str()) {
            Self::All
        } else {
            Self::Category(name)
        }
    }

    /// Key for a free-text search. Surrounding whitespace is ignored.
    pub fn search(text: impl AsRef<str>) -> Self {
        Self::Search(text.as_ref().trim().to_string())
    }

    /// Rewrite a key built by hand into its canonical form.
    pub fn normalize(self) -> Self {
        match self {
            Self::Category(name) => Self::category(name),
            Self::Search(text) => Self::search(text),
            other => other,
        }
    }

    /// Get the collection kind.
    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::All => CollectionKind::All,
            Self::Category(_) => CollectionKind::Category,
            Self::Discounted => CollectionKind::Discounted,
            Self::Search(_) => CollectionKind::Search,
        }
    }

    /// Get the key parameter (category name or search text).
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::Category(name) => Some(name),
            Self::Search(text) => Some(text),
            Self::All | Self::Discounted => None,
        }
    }

    /// Stable string form, used in logs and cache listings.
    pub fn cache_key(&self) -> String {
        match self.param() {
            Some(param) => format!("catalog:{}:{}", self.kind(), param),
            None => format!("catalog:{}", self.kind()),
        }
    }

    /// Check whether an item belongs to this key's candidate set.
    pub fn matches(&self, item: &Item) -> bool {
        self.matcher().matches(item)
    }

    /// Filter items down to this key's candidate set, preserving order.
    pub fn candidates<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        let matcher = self.matcher();
        items.iter().filter(|item| matcher.matches(item)).collect()
    }

    fn matcher(&self) -> Matcher<'_> {
        match self {
            Self::All => Matcher::Any,
            Self::Category(name) if ALL_ALIASES.contains(&name.as_str()) => Matcher::Any,
            Self::Category(name) => Matcher::Category(name),
            Self::Discounted => Matcher::Discounted,
            Self::Search(text) => Matcher::Text(text.to_lowercase()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// Predicate with the search needle lowercased once per filter pass.
enum Matcher<'a> {
    Any,
    Category(&'a str),
    Discounted,
    Text(String),
}

impl Matcher<'_> {
    fn matches(&self, item: &Item) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Category(name) => item.in_category(name),
            Matcher::Discounted => item.is_discounted(),
            Matcher::Text(needle) => item.contains_text(needle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::demo_catalog;

    #[test]
    fn test_all_aliases_normalize_to_all() {
        assert_eq!(QueryKey::category("Tous"), QueryKey::All);
        assert_eq!(QueryKey::category("all"), QueryKey::All);
        assert_eq!(QueryKey::category("All"), QueryKey::All);
        assert_eq!(QueryKey::category("ALL"), QueryKey::Category("ALL".to_string()));
    }

    #[test]
    fn test_hand_built_alias_still_matches_everything() {
        let catalog = demo_catalog();
        let key = QueryKey::Category("Tous".to_string());

        assert_eq!(key.candidates(&catalog).len(), catalog.len());
        assert_eq!(key.normalize(), QueryKey::All);
    }

    #[test]
    fn test_category_filter() {
        let catalog = demo_catalog();
        let shoes = QueryKey::category("Chaussures").candidates(&catalog);

        assert_eq!(shoes.len(), 2);
        assert!(shoes.iter().all(|item| item.in_category("Chaussures")));
    }

    #[test]
    fn test_category_filter_is_case_sensitive() {
        let catalog = demo_catalog();
        assert!(QueryKey::category("chaussures").candidates(&catalog).is_empty());
    }

    #[test]
    fn test_discounted_filter() {
        let catalog = demo_catalog();
        let on_sale = QueryKey::Discounted.candidates(&catalog);

        assert_eq!(on_sale.len(), 5);
        assert!(on_sale.iter().all(|item| item.discount > 0));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = demo_catalog();
        let hits = QueryKey::search("nike").candidates(&catalog);

        assert!(hits.iter().any(|item| item.name == "Nike Air Max 270"));
    }

    #[test]
    fn test_search_trims_text() {
        assert_eq!(QueryKey::search("  nike "), QueryKey::Search("nike".to_string()));
    }

    #[test]
    fn test_candidates_preserve_catalog_order() {
        let catalog = demo_catalog();
        let hits = QueryKey::Discounted.candidates(&catalog);
        let positions: Vec<usize> = hits
            .iter()
            .map(|hit| catalog.iter().position(|item| item.id == hit.id).unwrap())
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(QueryKey::All.cache_key(), "catalog:all");
        assert_eq!(QueryKey::category("Chaussures").cache_key(), "catalog:category:Chaussures");
        assert_eq!(QueryKey::Discounted.to_string(), "catalog:discounted");
        assert_eq!(QueryKey::search("Nike").cache_key(), "catalog:search:Nike");
    }

    #[test]
    fn test_key_serialization() {
        let json = serde_json::to_string(&QueryKey::category("Mode")).unwrap();
        assert_eq!(json, r#"{"kind":"category","param":"Mode"}"#);

        let key: QueryKey = serde_json::from_str(r#"{"kind":"discounted"}"#).unwrap();
        assert_eq!(key, QueryKey::Discounted);
    }
}

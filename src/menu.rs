//! # Menu
//!
//! Menu records as they come from the JSON dataset, plus the helpers the rest
//! of the crate needs on top of them:
//!
//! - `Category`: tagged wine families / food groups (case-insensitive parse).
//! - `parse_price` / `format_price`: locale currency strings (`"12,50 €"`).
//! - `MenuItem::search_blob`: normalized text used by lexical/semantic matching.
//! - `validate_menu`: reports incomplete records and duplicate ids.
//! - Browsing helpers (wine list, appellations, food list).
//!
//! Deserialization is lenient: absent or `null` optional fields become empty,
//! and a record with missing required fields still loads so that validation can
//! report it instead of failing the whole dataset.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use tracing::warn;

use crate::text::normalize_text;

/// Wine family or food group of a menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    RedWine,
    WhiteWine,
    Sparkling,
    /// Tapas / raciones; keeps the original label.
    Food(String),
    /// Anything else; keeps the original label (empty when missing).
    Other(String),
}

impl Category {
    pub const RED_LABEL: &'static str = "VINOS TINTOS";
    pub const WHITE_LABEL: &'static str = "VINOS BLANCOS";
    pub const SPARKLING_LABEL: &'static str = "ESPUMOSOS";

    /// Parse a dataset label. Wine families match case-insensitively.
    pub fn parse(label: &str) -> Self {
        let upper = label.trim().to_uppercase();
        match upper.as_str() {
            Self::RED_LABEL => Self::RedWine,
            Self::WHITE_LABEL => Self::WhiteWine,
            Self::SPARKLING_LABEL => Self::Sparkling,
            _ if upper.contains("TAPEO") || upper == "RACIONES" => {
                Self::Food(label.trim().to_string())
            }
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::RedWine => Self::RED_LABEL,
            Self::WhiteWine => Self::WHITE_LABEL,
            Self::Sparkling => Self::SPARKLING_LABEL,
            Self::Food(l) | Self::Other(l) => l,
        }
    }

    pub fn is_wine(&self) -> bool {
        matches!(self, Self::RedWine | Self::WhiteWine | Self::Sparkling)
    }

    pub fn is_food(&self) -> bool {
        matches!(self, Self::Food(_))
    }

    /// Category equality used by the hard filter: exact for wine families,
    /// case-insensitive on the label for everything else.
    pub fn matches(&self, other: &Category) -> bool {
        match (self, other) {
            (Self::Food(a), Self::Food(b)) | (Self::Other(a), Self::Other(b)) => {
                a.eq_ignore_ascii_case(b)
            }
            _ => self == other,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Other(l) if l.is_empty())
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.label().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A customer review attached to a wine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserReview {
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// One entry of the menu dataset (wine or food).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Locale currency string, e.g. `"25,00 €"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    /// Missing, `null` or non-string labels decode as the empty `Other("")`,
    /// which validation reports as a missing category.
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Category,
    /// Appellation (D.O.).
    #[serde(
        default,
        rename = "do",
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub appellation: Option<String>,
    /// Sommelier note.
    #[serde(default, deserialize_with = "lenient_string")]
    pub review: String,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source name → score on that source's own scale (5-star, 100-point, ...).
    #[serde(default, deserialize_with = "lenient_ratings", skip_serializing_if = "Option::is_none")]
    pub ratings: Option<BTreeMap<String, serde_json::Value>>,
    /// Entries that are not review objects are dropped.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub user_reviews: Vec<UserReview>,
    #[serde(default, deserialize_with = "lenient_tags", skip_serializing_if = "Option::is_none")]
    pub pairing_tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_tags", skip_serializing_if = "Option::is_none")]
    pub vivino_food: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub glass_price: Option<String>,
}

impl MenuItem {
    /// Numeric price, `None` when the price string is malformed.
    pub fn price_value(&self) -> Option<f64> {
        parse_price(&self.price)
    }

    /// Normalized text blob searched by lexical and semantic matching:
    /// name, appellation, review, user review texts, pairing tags and
    /// Vivino food tags.
    pub fn search_blob(&self) -> String {
        let reviews = self
            .user_reviews
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let pairing = self.pairing_tags.as_deref().unwrap_or_default().join(" ");
        let vivino = self.vivino_food.as_deref().unwrap_or_default().join(" ");

        normalize_text(
            &[
                self.name.as_str(),
                self.appellation.as_deref().unwrap_or_default(),
                self.review.as_str(),
                reviews.as_str(),
                pairing.as_str(),
                vivino.as_str(),
            ]
            .join(" "),
        )
    }

    /// Numeric rating values; non-numeric entries are skipped.
    pub fn numeric_ratings(&self) -> Vec<f64> {
        self.ratings
            .as_ref()
            .map(|r| r.values().filter_map(serde_json::Value::as_f64).collect())
            .unwrap_or_default()
    }

    /// Tags used to find matching dishes: `pairing_tags`, else `vivino_food`.
    pub fn pairing_signals(&self) -> &[String] {
        self.pairing_tags
            .as_deref()
            .or(self.vivino_food.as_deref())
            .unwrap_or_default()
    }

    /// Image path for display: absolute URL first, then the local photo folder.
    pub fn image_src(&self) -> Option<String> {
        if let Some(url) = &self.image_url {
            return Some(url.clone());
        }
        self.image.as_ref().map(|img| format!("fotos/{img}"))
    }
}

/* ----------------------------
Prices
---------------------------- */

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)").expect("leading number regex"));

/// Parse a locale price such as `"12,50 €"` into `12.5`.
///
/// Strips the euro sign, trims, turns the first comma into a decimal point and
/// reads the leading number. Unparsable or negative values yield `None`.
pub fn parse_price(price: &str) -> Option<f64> {
    let cleaned = price.replace('€', "");
    let cleaned = cleaned.trim().replacen(',', ".", 1);
    let m = LEADING_NUMBER.find(&cleaned)?;
    let value: f64 = m.as_str().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Render an amount the way the menu does: `"12,50 €"`.
pub fn format_price(amount: f64) -> String {
    format!("{:.2} €", amount).replace('.', ",")
}

/* ----------------------------
Validation
---------------------------- */

const REQUIRED_FIELDS: [&str; 4] = ["id", "name", "price", "category"];

/// A record missing one or more required fields.
#[derive(Debug, Clone, PartialEq)]
pub struct IncompleteItem {
    pub index: usize,
    /// Item id, or `SIN_ID` when the id itself is missing.
    pub id: String,
    pub missing: Vec<&'static str>,
}

/// Outcome of `validate_menu`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuReport {
    pub incomplete: Vec<IncompleteItem>,
    pub duplicate_ids: Vec<String>,
}

impl MenuReport {
    pub fn is_clean(&self) -> bool {
        self.incomplete.is_empty() && self.duplicate_ids.is_empty()
    }
}

/// Check required fields and id uniqueness. Problems are logged, never fatal.
pub fn validate_menu(menu: &[MenuItem]) -> MenuReport {
    let mut report = MenuReport::default();

    for (index, item) in menu.iter().enumerate() {
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| match *field {
                "id" => item.id.trim().is_empty(),
                "name" => item.name.trim().is_empty(),
                "price" => item.price.trim().is_empty(),
                _ => item.category.is_missing(),
            })
            .collect();
        if !missing.is_empty() {
            let id = if item.id.trim().is_empty() {
                "SIN_ID".to_string()
            } else {
                item.id.clone()
            };
            report.incomplete.push(IncompleteItem { index, id, missing });
        }
    }

    let mut seen = HashSet::new();
    let mut dups = BTreeSet::new();
    for item in menu.iter().filter(|i| !i.id.is_empty()) {
        if !seen.insert(item.id.as_str()) {
            dups.insert(item.id.clone());
        }
    }
    report.duplicate_ids = dups.into_iter().collect();

    if !report.incomplete.is_empty() {
        let sample = report
            .incomplete
            .iter()
            .take(5)
            .map(|it| format!("{} [missing: {}]", it.id, it.missing.join(", ")))
            .collect::<Vec<_>>()
            .join(" | ");
        warn!(
            target: "ingest",
            count = report.incomplete.len(),
            %sample,
            "menu has incomplete items"
        );
    }
    if !report.duplicate_ids.is_empty() {
        warn!(target: "ingest", ids = ?report.duplicate_ids, "menu has duplicate ids");
    }

    report
}

/* ----------------------------
Browsing
---------------------------- */

pub fn find_by_id<'a>(menu: &'a [MenuItem], id: &str) -> Option<&'a MenuItem> {
    menu.iter().find(|i| i.id == id)
}

/// Entries of the three wine families, in menu order.
pub fn wines(menu: &[MenuItem]) -> Vec<&MenuItem> {
    menu.iter().filter(|i| i.category.is_wine()).collect()
}

/// Tapas / raciones entries, in menu order.
pub fn food_items(menu: &[MenuItem]) -> Vec<&MenuItem> {
    menu.iter().filter(|i| i.category.is_food()).collect()
}

/// Distinct, sorted appellations across the wine list.
pub fn appellations(menu: &[MenuItem]) -> Vec<String> {
    wines(menu)
        .into_iter()
        .filter_map(|w| w.appellation.as_deref())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Wine list restricted to one appellation (`None` = all wines).
pub fn wines_by_appellation<'a>(
    menu: &'a [MenuItem],
    appellation: Option<&str>,
) -> Vec<&'a MenuItem> {
    wines(menu)
        .into_iter()
        .filter(|w| match appellation {
            None => true,
            Some(d) => w.appellation.as_deref() == Some(d),
        })
        .collect()
}

/* ----------------------------
Lenient field decoding
---------------------------- */

fn lenient_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(d)?.unwrap_or_default())
}

/// String as is, number stringified, anything else `None`.
fn lenient_opt_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(serde_json::Value::deserialize(d)?))
}

fn scalar_to_string(v: serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_category<'de, D>(d: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(d)?
        .map(|label| Category::parse(&label))
        .unwrap_or_default())
}

/// Number, or a numeric string (`"4,5"` allowed); anything else `None`.
fn lenient_opt_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replacen(',', ".", 1).parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite()))
}

fn lenient_ratings<'de, D>(d: D) -> Result<Option<BTreeMap<String, serde_json::Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Object(m) => Some(m.into_iter().collect()),
        _ => None,
    })
}

/// List of tags; scalar entries are kept (numbers stringified), the rest
/// dropped. A non-list value is `None`.
fn lenient_tags<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Array(items) => {
            Some(items.into_iter().filter_map(scalar_to_string).collect())
        }
        _ => None,
    })
}

/// List of records; entries of the wrong shape are dropped, a non-list value
/// is empty.
fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_price_parses() {
        assert_eq!(parse_price("12,50 €"), Some(12.5));
        assert_eq!(parse_price("25,00 €"), Some(25.0));
        assert_eq!(parse_price("  8 €"), Some(8.0));
        assert_eq!(parse_price("120,5€"), Some(120.5));
    }

    #[test]
    fn malformed_price_is_none() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("consultar"), None);
        assert_eq!(parse_price("€"), None);
        assert_eq!(parse_price("-3,00 €"), None);
    }

    #[test]
    fn price_reads_leading_number_only() {
        // Only the first comma becomes a decimal point.
        assert_eq!(parse_price("1.200,00 €"), Some(1.2));
        assert_eq!(parse_price("14,90 € / copa"), Some(14.9));
    }

    #[test]
    fn format_uses_comma_decimal() {
        assert_eq!(format_price(12.5), "12,50 €");
        assert_eq!(format_price(0.0), "0,00 €");
        assert_eq!(format_price(41.0), "41,00 €");
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(Category::parse("vinos tintos"), Category::RedWine);
        assert_eq!(Category::parse("Vinos Blancos "), Category::WhiteWine);
        assert_eq!(Category::parse("ESPUMOSOS"), Category::Sparkling);
        assert!(Category::parse("DE TAPEO").is_food());
        assert!(Category::parse("Raciones").is_food());
        assert_eq!(Category::parse("POSTRES"), Category::Other("POSTRES".into()));
    }

    #[test]
    fn other_categories_match_ignoring_case() {
        let a = Category::Other("Generosos".into());
        let b = Category::Other("GENEROSOS".into());
        assert!(a.matches(&b));
        assert!(!Category::RedWine.matches(&Category::WhiteWine));
    }

    #[test]
    fn lenient_decoding_of_partial_records() {
        let item: MenuItem = serde_json::from_value(json!({
            "id": "W1",
            "name": "Rioja X",
            "price": 25,
            "category": "VINOS TINTOS",
            "review": null,
            "user_reviews": null,
            "ratings": {"vivino": 4.2, "notes": "n/a"}
        }))
        .unwrap();
        assert_eq!(item.price, "25");
        assert_eq!(item.review, "");
        assert!(item.user_reviews.is_empty());
        assert_eq!(item.numeric_ratings(), vec![4.2]);
        assert_eq!(item.category, Category::RedWine);
    }

    #[test]
    fn malformed_fields_degrade_instead_of_failing() {
        let item: MenuItem = serde_json::from_value(json!({
            "id": "W3",
            "name": "Godello",
            "price": "21,00 €",
            "category": null,
            "do": 7,
            "glass_price": 6.5,
            "image": ["a.jpg"],
            "ratings": "93 puntos",
            "pairing_tags": ["pulpo", 3, {"x": 1}],
            "vivino_food": "pescado",
            "user_reviews": [{"author": "Eva", "text": "Fresco", "rating": "4,5"}, "bien", {"text": "ok", "rating": true}]
        }))
        .unwrap();
        assert!(item.category.is_missing());
        assert_eq!(item.appellation.as_deref(), Some("7"));
        assert_eq!(item.glass_price.as_deref(), Some("6.5"));
        assert_eq!(item.image, None);
        assert_eq!(item.ratings, None);
        assert_eq!(item.pairing_tags, Some(vec!["pulpo".to_string(), "3".to_string()]));
        assert_eq!(item.vivino_food, None);
        assert_eq!(item.user_reviews.len(), 2);
        assert_eq!(item.user_reviews[0].rating, Some(4.5));
        assert_eq!(item.user_reviews[1].rating, None);

        let report = validate_menu(std::slice::from_ref(&item));
        assert_eq!(report.incomplete.len(), 1);
        assert_eq!(report.incomplete[0].missing, vec!["category"]);
    }

    #[test]
    fn non_string_category_is_missing() {
        let item: MenuItem = serde_json::from_value(json!({
            "id": "W4", "name": "X", "price": "10,00 €", "category": 12
        }))
        .unwrap();
        assert_eq!(item.category, Category::parse("12"));
        let item: MenuItem = serde_json::from_value(json!({
            "id": "W5", "name": "X", "price": "10,00 €", "category": ["VINOS TINTOS"]
        }))
        .unwrap();
        assert!(item.category.is_missing());
    }

    #[test]
    fn appellation_round_trips_as_do() {
        let item: MenuItem = serde_json::from_value(json!({
            "id": "W2", "name": "Pazo", "price": "19,00 €",
            "category": "VINOS BLANCOS", "do": "Rías Baixas"
        }))
        .unwrap();
        assert_eq!(item.appellation.as_deref(), Some("Rías Baixas"));
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["do"], json!("Rías Baixas"));
        assert_eq!(back["category"], json!("VINOS BLANCOS"));
    }

    #[test]
    fn search_blob_covers_all_text_sources() {
        let item = MenuItem {
            name: "Viña Tondonia".into(),
            appellation: Some("Rioja".into()),
            review: "Elegante y fino".into(),
            user_reviews: vec![UserReview {
                author: "Ana".into(),
                text: "Sedoso".into(),
                rating: Some(5.0),
            }],
            pairing_tags: Some(vec!["Cordero".into()]),
            vivino_food: Some(vec!["Caza".into()]),
            ..Default::default()
        };
        let blob = item.search_blob();
        for needle in ["vina tondonia", "rioja", "elegante", "sedoso", "cordero", "caza"] {
            assert!(blob.contains(needle), "blob missing {needle}: {blob}");
        }
    }

    #[test]
    fn validation_reports_missing_fields_and_duplicates() {
        let menu = vec![
            MenuItem {
                id: "W1".into(),
                name: "A".into(),
                price: "10,00 €".into(),
                category: Category::RedWine,
                ..Default::default()
            },
            MenuItem {
                id: "W1".into(),
                name: "B".into(),
                price: "11,00 €".into(),
                category: Category::RedWine,
                ..Default::default()
            },
            MenuItem {
                name: "No id".into(),
                ..Default::default()
            },
        ];
        let report = validate_menu(&menu);
        assert_eq!(report.duplicate_ids, vec!["W1".to_string()]);
        assert_eq!(report.incomplete.len(), 1);
        assert_eq!(report.incomplete[0].id, "SIN_ID");
        assert_eq!(report.incomplete[0].missing, vec!["id", "price", "category"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn browsing_helpers() {
        let menu = vec![
            MenuItem {
                id: "W1".into(),
                category: Category::RedWine,
                appellation: Some("Toro".into()),
                ..Default::default()
            },
            MenuItem {
                id: "W2".into(),
                category: Category::WhiteWine,
                appellation: Some("Rías Baixas".into()),
                ..Default::default()
            },
            MenuItem {
                id: "W3".into(),
                category: Category::RedWine,
                appellation: Some("Toro".into()),
                ..Default::default()
            },
            MenuItem {
                id: "F1".into(),
                category: Category::parse("DE TAPEO"),
                image: Some("pulpo.jpg".into()),
                ..Default::default()
            },
        ];
        assert_eq!(wines(&menu).len(), 3);
        assert_eq!(food_items(&menu).len(), 1);
        assert_eq!(appellations(&menu), vec!["Rías Baixas", "Toro"]);
        assert_eq!(wines_by_appellation(&menu, Some("Toro")).len(), 2);
        assert_eq!(wines_by_appellation(&menu, None).len(), 3);
        assert_eq!(menu[3].image_src().as_deref(), Some("fotos/pulpo.jpg"));
        assert_eq!(find_by_id(&menu, "W2").map(|i| i.id.as_str()), Some("W2"));
    }
}

//! DOM extraction of product cards
//!
//! This module turns a result page's HTML into validated [`NewProduct`]
//! records. Field locations on the target site are unstable, so every
//! field is read through an ordered list of extractor strategies tried in
//! order until one yields a value:
//! - title: several known card layouts, then a sentinel when all fail
//!   (a card without a title still carries useful price and image signal)
//! - image: `src`, then the lazy-loading `data-src`, relative URLs
//!   resolved against the site base
//! - price: known price containers; a card whose price does not look like
//!   a currency-prefixed number is skipped (and counted), never stored

use crate::storage::NewProduct;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Selector the pipeline waits on before reading a result page
pub const CARD_WAIT_SELECTOR: &str = "[data-id]";

/// Title used when no title location matches
pub const UNKNOWN_TITLE: &str = "Unknown";

/// One product card per `data-id` container
const CARD_SELECTOR: &str = "div[data-id]";

/// Title locations, primary first; the last entry is a legacy layout
const TITLE_SELECTORS: &[&str] = &["div.KzDlHZ", "a.wjcEIp", "a.WKTcLC", "div._4rR01T"];

/// Price locations, primary first
const PRICE_SELECTORS: &[&str] = &["div.Nx9bqj", "div._30jeq3", "div._1_WHN1"];

/// Image attributes in preference order; `data-src` covers lazy loading
const IMAGE_ATTRS: &[&str] = &["src", "data-src"];

/// Markup that indicates a pagination control is present
const PAGINATION_SELECTORS: &[&str] = &["nav.WSL9JP", "a._9QVEpD"];

/// A single "extract one field from a card" strategy
pub trait FieldExtractor {
    /// Returns the field value, or `None` when this location has nothing
    fn extract(&self, card: &ElementRef<'_>) -> Option<String>;
}

/// Extracts the trimmed text of the first element matching a selector
struct TextField {
    selector: Selector,
}

impl FieldExtractor for TextField {
    fn extract(&self, card: &ElementRef<'_>) -> Option<String> {
        card.select(&self.selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Extracts the first non-empty attribute of the first matching element
struct AttrField {
    selector: Selector,
    attrs: &'static [&'static str],
}

impl FieldExtractor for AttrField {
    fn extract(&self, card: &ElementRef<'_>) -> Option<String> {
        let element = card.select(&self.selector).next()?;
        self.attrs
            .iter()
            .find_map(|attr| element.value().attr(attr))
            .map(|value| value.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// Builds a text-extraction chain from a selector list
///
/// Selectors that fail to parse are dropped rather than aborting the run.
fn text_chain(selectors: &[&str]) -> Vec<Box<dyn FieldExtractor>> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .map(|selector| Box::new(TextField { selector }) as Box<dyn FieldExtractor>)
        .collect()
}

/// Tries each strategy in order until one yields a value
fn first_match(card: &ElementRef<'_>, extractors: &[Box<dyn FieldExtractor>]) -> Option<String> {
    extractors.iter().find_map(|e| e.extract(card))
}

/// Why a card was skipped instead of extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSkip {
    /// No price location matched
    MissingPrice,

    /// A price was found but does not look like a currency amount
    MalformedPrice(String),
}

impl std::fmt::Display for CardSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPrice => write!(f, "no price found"),
            Self::MalformedPrice(raw) => write!(f, "malformed price {:?}", raw),
        }
    }
}

/// Everything extracted from one result page
#[derive(Debug)]
pub struct PageExtraction {
    /// Validated products, in card order
    pub products: Vec<NewProduct>,

    /// Cards rejected during validation
    pub skipped: Vec<CardSkip>,

    /// Whether the page carries a pagination control
    pub has_next: bool,
}

/// Card extractor with prebuilt field strategies
pub struct CardExtractor {
    titles: Vec<Box<dyn FieldExtractor>>,
    prices: Vec<Box<dyn FieldExtractor>>,
    images: Vec<Box<dyn FieldExtractor>>,
}

impl CardExtractor {
    /// Builds the extractor strategy chains
    pub fn new() -> Self {
        let images = Selector::parse("img")
            .ok()
            .map(|selector| {
                vec![Box::new(AttrField {
                    selector,
                    attrs: IMAGE_ATTRS,
                }) as Box<dyn FieldExtractor>]
            })
            .unwrap_or_default();

        Self {
            titles: text_chain(TITLE_SELECTORS),
            prices: text_chain(PRICE_SELECTORS),
            images,
        }
    }

    /// Extracts every product card from a result page
    ///
    /// # Arguments
    ///
    /// * `html` - The page HTML
    /// * `base_url` - Base URL for resolving relative image links
    pub fn extract_page(&self, html: &str, base_url: &Url) -> PageExtraction {
        let document = Html::parse_document(html);

        let mut products = Vec::new();
        let mut skipped = Vec::new();

        if let Ok(card_selector) = Selector::parse(CARD_SELECTOR) {
            for card in document.select(&card_selector) {
                match self.extract_card(&card, base_url) {
                    Ok(product) => products.push(product),
                    Err(skip) => skipped.push(skip),
                }
            }
        }

        let has_next = has_pagination(&document);

        PageExtraction {
            products,
            skipped,
            has_next,
        }
    }

    /// Extracts a single card, validating the price
    fn extract_card(
        &self,
        card: &ElementRef<'_>,
        base_url: &Url,
    ) -> Result<NewProduct, CardSkip> {
        let title =
            first_match(card, &self.titles).unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let image_url =
            first_match(card, &self.images).and_then(|raw| resolve_image(&raw, base_url));

        let price = first_match(card, &self.prices).ok_or(CardSkip::MissingPrice)?;
        if !looks_like_price(&price) {
            return Err(CardSkip::MalformedPrice(price));
        }

        Ok(NewProduct {
            title,
            image_url,
            price,
            created_at: None,
        })
    }
}

impl Default for CardExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks whether the document carries a pagination control
fn has_pagination(document: &Html) -> bool {
    PAGINATION_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .any(|selector| document.select(&selector).next().is_some())
}

/// Resolves an image URL, joining relative links against the site base
fn resolve_image(raw: &str, base_url: &Url) -> Option<String> {
    if raw.starts_with("http") {
        Some(raw.to_string())
    } else {
        base_url.join(raw).ok().map(|url| url.to_string())
    }
}

/// Checks whether text looks like a currency-prefixed numeric string
///
/// Accepts values like `₹12,999` or `$5.99`: a non-empty non-digit prefix
/// followed by digits, commas and periods only. Bare numbers and prose
/// are rejected; price is the field downstream analysis leans on.
pub fn looks_like_price(text: &str) -> bool {
    let text = text.trim();

    match text.find(|c: char| c.is_ascii_digit()) {
        // No digits at all, or nothing before them to act as a currency marker
        None | Some(0) => false,
        Some(first_digit) => {
            let (prefix, amount) = text.split_at(first_digit);
            !prefix.trim().is_empty()
                && amount
                    .chars()
                    .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://www.flipkart.com").unwrap()
    }

    fn card(inner: &str) -> String {
        format!(r#"<html><body><div data-id="x1">{}</div></body></html>"#, inner)
    }

    #[test]
    fn test_extracts_full_card() {
        let html = card(
            r#"<div class="KzDlHZ">Acme Phone 5G</div>
               <img src="https://img.example.com/p.jpg"/>
               <div class="Nx9bqj">₹12,999</div>"#,
        );
        let extraction = CardExtractor::new().extract_page(&html, &base_url());

        assert_eq!(extraction.products.len(), 1);
        let product = &extraction.products[0];
        assert_eq!(product.title, "Acme Phone 5G");
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://img.example.com/p.jpg")
        );
        assert_eq!(product.price, "₹12,999");
    }

    #[test]
    fn test_title_falls_back_to_alternate_locations() {
        let html = card(
            r#"<a class="wjcEIp">Alternate Title</a>
               <div class="Nx9bqj">₹500</div>"#,
        );
        let extraction = CardExtractor::new().extract_page(&html, &base_url());
        assert_eq!(extraction.products[0].title, "Alternate Title");
    }

    #[test]
    fn test_title_falls_back_to_legacy_layout() {
        let html = card(
            r#"<div class="_4rR01T">Legacy Title</div>
               <div class="_30jeq3">₹750</div>"#,
        );
        let extraction = CardExtractor::new().extract_page(&html, &base_url());
        assert_eq!(extraction.products[0].title, "Legacy Title");
    }

    #[test]
    fn test_missing_title_uses_sentinel() {
        let html = card(r#"<div class="Nx9bqj">₹999</div>"#);
        let extraction = CardExtractor::new().extract_page(&html, &base_url());

        assert_eq!(extraction.products.len(), 1);
        assert_eq!(extraction.products[0].title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_missing_price_skips_card() {
        let html = card(r#"<div class="KzDlHZ">No Price Here</div>"#);
        let extraction = CardExtractor::new().extract_page(&html, &base_url());

        assert!(extraction.products.is_empty());
        assert_eq!(extraction.skipped, vec![CardSkip::MissingPrice]);
    }

    #[test]
    fn test_malformed_price_skips_card() {
        let html = card(
            r#"<div class="KzDlHZ">Odd Pricing</div>
               <div class="Nx9bqj">Currently unavailable</div>"#,
        );
        let extraction = CardExtractor::new().extract_page(&html, &base_url());

        assert!(extraction.products.is_empty());
        assert_eq!(
            extraction.skipped,
            vec![CardSkip::MalformedPrice(
                "Currently unavailable".to_string()
            )]
        );
    }

    #[test]
    fn test_lazy_loaded_image_uses_data_src() {
        let html = card(
            r#"<div class="KzDlHZ">Lazy</div>
               <img data-src="https://img.example.com/lazy.jpg"/>
               <div class="Nx9bqj">₹100</div>"#,
        );
        let extraction = CardExtractor::new().extract_page(&html, &base_url());
        assert_eq!(
            extraction.products[0].image_url.as_deref(),
            Some("https://img.example.com/lazy.jpg")
        );
    }

    #[test]
    fn test_relative_image_joined_with_base() {
        let html = card(
            r#"<div class="KzDlHZ">Rel</div>
               <img src="/image/p.jpg"/>
               <div class="Nx9bqj">₹100</div>"#,
        );
        let extraction = CardExtractor::new().extract_page(&html, &base_url());
        assert_eq!(
            extraction.products[0].image_url.as_deref(),
            Some("https://www.flipkart.com/image/p.jpg")
        );
    }

    #[test]
    fn test_missing_image_is_tolerated() {
        let html = card(
            r#"<div class="KzDlHZ">No Image</div>
               <div class="Nx9bqj">₹100</div>"#,
        );
        let extraction = CardExtractor::new().extract_page(&html, &base_url());
        assert_eq!(extraction.products[0].image_url, None);
    }

    #[test]
    fn test_multiple_cards_in_order() {
        let html = r#"<html><body>
            <div data-id="a"><div class="KzDlHZ">One</div><div class="Nx9bqj">₹1</div></div>
            <div data-id="b"><div class="KzDlHZ">Two</div><div class="Nx9bqj">₹2</div></div>
            <div data-id="c"><div class="KzDlHZ">Three</div><div class="Nx9bqj">₹3</div></div>
        </body></html>"#;
        let extraction = CardExtractor::new().extract_page(html, &base_url());

        let titles: Vec<&str> = extraction
            .products
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_page_without_cards_yields_nothing() {
        let html = "<html><body><p>Nothing to see</p></body></html>";
        let extraction = CardExtractor::new().extract_page(html, &base_url());

        assert!(extraction.products.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_pagination_detected() {
        let html = r#"<html><body>
            <div data-id="a"><div class="KzDlHZ">One</div><div class="Nx9bqj">₹1</div></div>
            <nav class="WSL9JP"><a href="?page=2">2</a></nav>
        </body></html>"#;
        let extraction = CardExtractor::new().extract_page(html, &base_url());
        assert!(extraction.has_next);
    }

    #[test]
    fn test_pagination_absent() {
        let html = card(r#"<div class="KzDlHZ">One</div><div class="Nx9bqj">₹1</div>"#);
        let extraction = CardExtractor::new().extract_page(&html, &base_url());
        assert!(!extraction.has_next);
    }

    #[test]
    fn test_looks_like_price_accepts_currency_amounts() {
        for price in ["₹12,999", "₹1,29,999", "$5.99", "Rs. 450", "€ 1.299,00"] {
            assert!(looks_like_price(price), "{:?} should be accepted", price);
        }
    }

    #[test]
    fn test_looks_like_price_rejects_everything_else() {
        for price in ["", "  ", "1299", "Price on request", "₹", "12,999₹"] {
            assert!(!looks_like_price(price), "{:?} should be rejected", price);
        }
    }
}

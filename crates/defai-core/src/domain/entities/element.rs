//! Answers collected when creating a new element.

use crate::domain::{
    error::DomainError,
    validation::validate_element_name,
    value_objects::{Category, Tier},
};

/// Default description for a freshly created element.
pub const DEFAULT_DESCRIPTION: &str = "A DEFAI element";

/// Author used when none is given and `$USER` is unset.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Everything the materializer writes into a new project.
///
/// `name` is always a valid element slug; construction goes through
/// [`ElementDetails::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDetails {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub author: String,
    pub category: Category,
    pub tier: Tier,
    pub price: f64,
}

impl ElementDetails {
    /// Details with defaults derived from the slug.
    ///
    /// # Errors
    ///
    /// `InvalidElementName` if `name` is not a valid element slug.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if !validate_element_name(&name) {
            return Err(DomainError::InvalidElementName { name });
        }
        Ok(Self {
            display_name: title_case(&name),
            name,
            description: DEFAULT_DESCRIPTION.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            category: Category::default(),
            tier: Tier::default(),
            price: 0.0,
        })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// # Errors
    ///
    /// `InvalidPrice` for negative or non-finite values.
    pub fn with_price(mut self, price: f64) -> Result<Self, DomainError> {
        if !price.is_finite() || price < 0.0 {
            return Err(DomainError::InvalidPrice(price.to_string()));
        }
        self.price = price;
        Ok(self)
    }

    /// Sentinel strings in template entry files and their replacements.
    ///
    /// Category and tier sentinels include their single quotes so only the
    /// string literals in the element config are touched, never prose.
    pub fn placeholders(&self) -> [(&'static str, String); 6] {
        [
            ("element-id", self.name.clone()),
            ("Element Name", self.display_name.clone()),
            ("Element description", self.description.clone()),
            ("Your Name", self.author.clone()),
            ("'Utilities'", format!("'{}'", self.category)),
            ("'free'", format!("'{}'", self.tier)),
        ]
    }

    /// Plain text substitution of every placeholder in `source`.
    pub fn apply_placeholders(&self, source: &str) -> String {
        self.placeholders()
            .iter()
            .fold(source.to_string(), |acc, (sentinel, value)| {
                acc.replace(sentinel, value)
            })
    }
}

/// `price-ticker-2` -> `Price Ticker 2`
pub fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_from_slug() {
        let details = ElementDetails::new("price-ticker").unwrap();
        assert_eq!(details.display_name, "Price Ticker");
        assert_eq!(details.description, DEFAULT_DESCRIPTION);
        assert_eq!(details.category, Category::Utilities);
        assert_eq!(details.tier, Tier::Free);
        assert_eq!(details.price, 0.0);
    }

    #[test]
    fn rejects_invalid_slug_before_anything_else() {
        assert!(matches!(
            ElementDetails::new("My_Widget"),
            Err(DomainError::InvalidElementName { .. })
        ));
    }

    #[test]
    fn rejects_negative_price() {
        let details = ElementDetails::new("my-widget").unwrap();
        assert!(details.clone().with_price(-1.0).is_err());
        assert!(details.clone().with_price(f64::NAN).is_err());
        assert_eq!(details.with_price(2.5).unwrap().price, 2.5);
    }

    #[test]
    fn replaces_sentinels_in_source() {
        let details = ElementDetails::new("my-widget")
            .unwrap()
            .with_author("Ada")
            .with_category(Category::Trading)
            .with_tier(Tier::Gold);
        let source = "export const config = { id: 'element-id', name: 'Element Name', \
                      author: 'Your Name', category: 'Utilities', tier: 'free' };\n\
                      // Utilities panel for free users";
        let rendered = details.apply_placeholders(source);

        assert!(rendered.contains("id: 'my-widget'"));
        assert!(rendered.contains("name: 'My Widget'"));
        assert!(rendered.contains("author: 'Ada'"));
        assert!(rendered.contains("category: 'Trading'"));
        assert!(rendered.contains("tier: 'gold'"));
        assert!(rendered.ends_with("// Utilities panel for free users"));
    }

    #[test]
    fn substitution_is_idempotent_for_same_answers() {
        let details = ElementDetails::new("my-widget").unwrap();
        let once = details.apply_placeholders("<h2>Element Name</h2>");
        assert_eq!(details.apply_placeholders(&once), once);
    }

    #[test]
    fn title_case_handles_digits() {
        assert_eq!(title_case("price-ticker-2"), "Price Ticker 2");
        assert_eq!(title_case("abc"), "Abc");
    }
}

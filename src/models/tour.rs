//! # Tour Declarations
//!
//! The tour document and its rules. Name length, difficulty membership,
//! ratings bounds and the discount-below-price rule are all checked in one
//! pass; creation additionally checks required fields.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Accepted difficulty ratings.
pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "difficult"];

/// Shortest accepted tour name.
pub const NAME_MIN_CHARS: usize = 10;

/// Longest accepted tour name.
pub const NAME_MAX_CHARS: usize = 40;

/// Incoming tour payload. Every field is optional at the parsing stage so
/// that validation can report all missing or broken fields together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TourDraft {
    pub name: Option<String>,
    pub duration: Option<f64>,
    pub max_group_size: Option<u64>,
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
}

impl TourDraft {
    /// Validates a creation payload: presence rules plus every field rule.
    pub fn validate_new(&self) -> Result<(), Vec<String>> {
        let mut messages = Vec::new();

        match self.name.as_deref() {
            None => messages.push("A tour must have a name".to_string()),
            Some(name) => name_rules(name, &mut messages),
        }
        if self.duration.is_none() {
            messages.push("A tour must have a duration".to_string());
        }
        if self.max_group_size.is_none() {
            messages.push("A tour must have a group size".to_string());
        }
        match self.difficulty.as_deref() {
            None => messages.push("A tour must have a difficulty".to_string()),
            Some(difficulty) => difficulty_rule(difficulty, &mut messages),
        }
        if self.price.is_none() {
            messages.push("A tour must have a price".to_string());
        }
        if self.summary.as_deref().map_or(true, |s| s.trim().is_empty()) {
            messages.push("A tour must have a summary".to_string());
        }
        if self.image_cover.is_none() {
            messages.push("A tour must have a cover image".to_string());
        }
        self.shared_rules(&mut messages);

        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages)
        }
    }

    /// Validates a partial update: only rules for the fields present.
    pub fn validate_update(&self) -> Result<(), Vec<String>> {
        let mut messages = Vec::new();

        if let Some(name) = self.name.as_deref() {
            name_rules(name, &mut messages);
        }
        if let Some(difficulty) = self.difficulty.as_deref() {
            difficulty_rule(difficulty, &mut messages);
        }
        self.shared_rules(&mut messages);

        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages)
        }
    }

    fn shared_rules(&self, messages: &mut Vec<String>) {
        if let Some(rating) = self.ratings_average {
            if rating < 1.0 {
                messages.push("Ratings must be above 1.0".to_string());
            }
            if rating > 5.0 {
                messages.push("Ratings must be below 5.0".to_string());
            }
        }
        // Cross-field rule only applies when both sides are supplied.
        if let (Some(discount), Some(price)) = (self.price_discount, self.price) {
            if discount >= price {
                messages.push(format!(
                    "Discount price ({discount}) should be below the regular price"
                ));
            }
        }
    }

    /// Builds the stored document, filling declared defaults.
    ///
    /// Call only after [`TourDraft::validate_new`] has passed.
    pub fn into_document(self) -> Value {
        let name = self.name.unwrap_or_default();
        json!({
            "name": name,
            "slug": slugify(&name),
            "duration": self.duration,
            "max_group_size": self.max_group_size,
            "difficulty": self.difficulty,
            "ratings_average": self.ratings_average.unwrap_or(4.5),
            "ratings_quantity": 0,
            "price": self.price,
            "price_discount": self.price_discount,
            "summary": self.summary,
            "description": self.description,
            "image_cover": self.image_cover,
            "images": self.images.unwrap_or_default(),
            "start_dates": self.start_dates.unwrap_or_default(),
            "secret_tour": self.secret_tour.unwrap_or(false),
            "created_at": Utc::now(),
        })
    }

    /// Builds a patch containing only the supplied fields; a renamed tour
    /// gets its slug rederived.
    pub fn into_patch(self) -> Value {
        let mut patch = Map::new();
        if let Some(name) = self.name {
            patch.insert("slug".to_string(), Value::String(slugify(&name)));
            patch.insert("name".to_string(), Value::String(name));
        }
        if let Some(duration) = self.duration {
            patch.insert("duration".to_string(), json!(duration));
        }
        if let Some(size) = self.max_group_size {
            patch.insert("max_group_size".to_string(), json!(size));
        }
        if let Some(difficulty) = self.difficulty {
            patch.insert("difficulty".to_string(), Value::String(difficulty));
        }
        if let Some(rating) = self.ratings_average {
            patch.insert("ratings_average".to_string(), json!(rating));
        }
        if let Some(price) = self.price {
            patch.insert("price".to_string(), json!(price));
        }
        if let Some(discount) = self.price_discount {
            patch.insert("price_discount".to_string(), json!(discount));
        }
        if let Some(summary) = self.summary {
            patch.insert("summary".to_string(), Value::String(summary));
        }
        if let Some(description) = self.description {
            patch.insert("description".to_string(), Value::String(description));
        }
        if let Some(cover) = self.image_cover {
            patch.insert("image_cover".to_string(), Value::String(cover));
        }
        if let Some(images) = self.images {
            patch.insert("images".to_string(), json!(images));
        }
        if let Some(dates) = self.start_dates {
            patch.insert("start_dates".to_string(), json!(dates));
        }
        if let Some(secret) = self.secret_tour {
            patch.insert("secret_tour".to_string(), Value::Bool(secret));
        }
        Value::Object(patch)
    }
}

fn name_rules(name: &str, messages: &mut Vec<String>) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        messages.push("A tour must have a name".to_string());
        return;
    }
    let chars = trimmed.chars().count();
    if chars < NAME_MIN_CHARS {
        messages.push(format!(
            "A tour name must have at least {NAME_MIN_CHARS} characters"
        ));
    }
    if chars > NAME_MAX_CHARS {
        messages.push(format!(
            "A tour name must have at most {NAME_MAX_CHARS} characters"
        ));
    }
}

fn difficulty_rule(difficulty: &str, messages: &mut Vec<String>) {
    if !DIFFICULTIES.contains(&difficulty) {
        messages.push("Difficulty is either: easy, medium, or difficult".to_string());
    }
}

/// Lowercase, hyphen-separated form of a display name.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> TourDraft {
        TourDraft {
            name: Some("The Forest Hiker".to_string()),
            duration: Some(5.0),
            max_group_size: Some(25),
            difficulty: Some("easy".to_string()),
            price: Some(397.0),
            summary: Some("Breathtaking hike through the Canadian Banff National Park".to_string()),
            image_cover: Some("tour-1-cover.jpg".to_string()),
            ..TourDraft::default()
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate_new().is_ok());
    }

    #[test]
    fn test_empty_draft_collects_every_required_message() {
        let messages = TourDraft::default().validate_new().unwrap_err();

        assert!(messages.contains(&"A tour must have a name".to_string()));
        assert!(messages.contains(&"A tour must have a duration".to_string()));
        assert!(messages.contains(&"A tour must have a group size".to_string()));
        assert!(messages.contains(&"A tour must have a difficulty".to_string()));
        assert!(messages.contains(&"A tour must have a price".to_string()));
        assert!(messages.contains(&"A tour must have a summary".to_string()));
        assert!(messages.contains(&"A tour must have a cover image".to_string()));
        assert_eq!(messages.len(), 7);
    }

    #[test]
    fn test_name_length_rules() {
        let mut draft = valid_draft();
        draft.name = Some("Too short".to_string());
        let messages = draft.validate_new().unwrap_err();
        assert!(messages[0].contains("at least 10"));

        let mut draft = valid_draft();
        draft.name = Some("A".repeat(41));
        let messages = draft.validate_new().unwrap_err();
        assert!(messages[0].contains("at most 40"));
    }

    #[test]
    fn test_unknown_difficulty_rejected() {
        let mut draft = valid_draft();
        draft.difficulty = Some("impossible".to_string());

        let messages = draft.validate_new().unwrap_err();
        assert_eq!(
            messages,
            vec!["Difficulty is either: easy, medium, or difficult".to_string()]
        );
    }

    #[test]
    fn test_ratings_bounds() {
        let mut draft = valid_draft();
        draft.ratings_average = Some(0.5);
        assert!(draft.validate_new().unwrap_err()[0].contains("above 1.0"));

        let mut draft = valid_draft();
        draft.ratings_average = Some(5.5);
        assert!(draft.validate_new().unwrap_err()[0].contains("below 5.0"));
    }

    #[test]
    fn test_discount_must_be_below_price() {
        let mut draft = valid_draft();
        draft.price_discount = Some(500.0);

        let messages = draft.validate_new().unwrap_err();
        assert!(messages[0].contains("below the regular price"));

        let mut draft = valid_draft();
        draft.price_discount = Some(100.0);
        assert!(draft.validate_new().is_ok());
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        let draft = TourDraft {
            price: Some(499.0),
            ..TourDraft::default()
        };
        assert!(draft.validate_update().is_ok());

        let draft = TourDraft {
            difficulty: Some("impossible".to_string()),
            ..TourDraft::default()
        };
        assert!(draft.validate_update().is_err());
    }

    #[test]
    fn test_document_gets_defaults_and_slug() {
        let doc = valid_draft().into_document();

        assert_eq!(doc["slug"], "the-forest-hiker");
        assert_eq!(doc["ratings_average"], 4.5);
        assert_eq!(doc["ratings_quantity"], 0);
        assert_eq!(doc["secret_tour"], false);
        assert_eq!(doc["images"], json!([]));
        assert!(doc["created_at"].is_string());
    }

    #[test]
    fn test_patch_contains_only_supplied_fields() {
        let draft = TourDraft {
            price: Some(499.0),
            ..TourDraft::default()
        };

        let patch = draft.into_patch();
        let obj = patch.as_object().unwrap();

        assert_eq!(obj.len(), 1);
        assert_eq!(obj["price"], 499.0);
    }

    #[test]
    fn test_rename_patch_rederives_slug() {
        let draft = TourDraft {
            name: Some("The Sea Explorer".to_string()),
            ..TourDraft::default()
        };

        let patch = draft.into_patch();
        assert_eq!(patch["slug"], "the-sea-explorer");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
        assert_eq!(slugify("  Tour -- No. 7!  "), "tour-no-7");
        assert_eq!(slugify(""), "");
    }
}

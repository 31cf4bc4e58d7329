use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FormErrors, max_length, required};
use crate::domain::{Category, Location, Post, PostDraft};

pub const PUB_DATE_REQUIRED_MESSAGE: &str = "Enter a valid publication date.";
pub const PUB_DATE_FORMAT_MESSAGE: &str = "Use a valid date format: YYYY-MM-DD.";

const TITLE_MAX_LENGTH: usize = 256;
const CHOICE_MESSAGE: &str = "Select a valid choice. That choice is not one of the available choices.";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Raw post form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFormData {
    pub title: String,
    pub text: String,
    pub pub_date: String,
    pub location: String,
    pub category: String,
    pub is_published: Option<String>,
    pub image: String,
}

impl PostFormData {
    /// Prefill the form from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: post.pub_date.format("%Y-%m-%d").to_string(),
            location: post.location_id.map(|id| id.to_string()).unwrap_or_default(),
            category: post.category_id.map(|id| id.to_string()).unwrap_or_default(),
            is_published: post.is_published.then(|| "on".to_string()),
            image: post.image.clone().unwrap_or_default(),
        }
    }

    /// Validate against the categories and locations a post may reference.
    pub fn validate(
        &self,
        categories: &[Category],
        locations: &[Location],
    ) -> Result<PostDraft, FormErrors> {
        let mut errors = FormErrors::new();

        let title = required(&mut errors, "title", &self.title);
        max_length(&mut errors, "title", title, TITLE_MAX_LENGTH);
        let text = required(&mut errors, "text", &self.text);

        let pub_date = match parse_pub_date(&self.pub_date) {
            Ok(date) => Some(date),
            Err(message) => {
                errors.add("pub_date", message);
                None
            }
        };

        let category_id = {
            let raw = required(&mut errors, "category", &self.category);
            if raw.is_empty() {
                None
            } else {
                let id = choice(raw, categories.iter().map(|c| c.id));
                if id.is_none() {
                    errors.add("category", CHOICE_MESSAGE);
                }
                id
            }
        };

        let location_id = match self.location.trim() {
            "" => None,
            raw => {
                let id = choice(raw, locations.iter().map(|l| l.id));
                if id.is_none() {
                    errors.add("location", CHOICE_MESSAGE);
                }
                id
            }
        };

        let image = match self.image.trim() {
            "" => None,
            path => Some(path.to_string()),
        };

        match pub_date {
            Some(pub_date) if errors.is_empty() => Ok(PostDraft {
                title: title.to_string(),
                text: text.to_string(),
                pub_date,
                location_id,
                category_id,
                is_published: checkbox(self.is_published.as_deref()),
                image,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PUB_DATE_REQUIRED_MESSAGE);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|datetime| datetime.and_utc())
        .ok_or(PUB_DATE_FORMAT_MESSAGE)
}

fn choice(raw: &str, mut ids: impl Iterator<Item = i64>) -> Option<i64> {
    let id = raw.parse::<i64>().ok()?;
    ids.any(|known| known == id).then_some(id)
}

fn checkbox(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => !matches!(v.as_str(), "" | "false" | "0" | "off"),
    }
}

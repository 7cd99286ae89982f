//! Response normalization for the content API.
//!
//! The backend changed shape across deployments: the oldest endpoints return
//! a bare JSON array, the Frappe-era endpoints wrap everything in a
//! `{"message": {"success": ..., "data": ...}}` envelope, and a few return a
//! raw object. All of that is decoded here, once, at the boundary; the rest
//! of the crate only ever sees the canonical models.

use serde_json::Value;

use crate::models::{
    Activity, ActivityDay, ActivityImage, ActivityPage, BookIntroduction, CatalogItem,
    IntroductionPage, Section,
};

/// A payload that could not be turned into canonical data.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The payload was not an object or array, or its data field was not
    /// shaped the way the operation requires.
    #[error("malformed payload")]
    MalformedPayload,

    /// The backend envelope reported failure, or did not follow the
    /// envelope convention at all.
    #[error("{message}")]
    Backend {
        message: String,
        errors: Option<Value>,
    },

    /// A record was missing a field the canonical model requires.
    #[error("record missing required field `{0}`")]
    MissingField(&'static str),
}

/// Unwrap the backend envelope and return the payload's data value.
///
/// Bare arrays are the data. Objects carrying a `message` field follow the
/// wrapper convention and must report `success: true`; any other `message`
/// shape is a backend failure. Objects without a `message` field are the
/// data themselves (the fetch layer has already checked the HTTP status).
pub fn unwrap_envelope(raw: &Value) -> Result<&Value, NormalizeError> {
    match raw {
        Value::Array(_) => Ok(raw),
        Value::Object(fields) => match fields.get("message") {
            Some(message) => unwrap_message(message),
            None => Ok(raw),
        },
        _ => Err(NormalizeError::MalformedPayload),
    }
}

fn unwrap_message(message: &Value) -> Result<&Value, NormalizeError> {
    let envelope = match message.as_object() {
        Some(envelope) => envelope,
        None => {
            return Err(NormalizeError::Backend {
                message: "unexpected response shape".to_string(),
                errors: None,
            })
        }
    };

    match envelope.get("success").and_then(Value::as_bool) {
        Some(true) => envelope
            .get("data")
            .ok_or(NormalizeError::MalformedPayload),
        _ => Err(NormalizeError::Backend {
            message: envelope
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| "unexpected response shape".to_string()),
            errors: envelope.get("errors").cloned(),
        }),
    }
}

/// Normalize a list payload into catalog items.
///
/// Accepts both a data array and a single data object (mapped to a
/// one-element list), since older endpoints were inconsistent about it.
pub fn catalog_items(raw: &Value) -> Result<Vec<CatalogItem>, NormalizeError> {
    let data = unwrap_envelope(raw)?;
    match data {
        Value::Array(entries) => entries.iter().map(catalog_item_from_value).collect(),
        Value::Object(_) => Ok(vec![catalog_item_from_value(data)?]),
        _ => Err(NormalizeError::MalformedPayload),
    }
}

/// Normalize a single-record payload into one catalog item.
pub fn catalog_item(raw: &Value) -> Result<CatalogItem, NormalizeError> {
    let data = unwrap_envelope(raw)?;
    if !data.is_object() {
        return Err(NormalizeError::MalformedPayload);
    }
    catalog_item_from_value(data)
}

/// Normalize a paged activities payload.
pub fn activity_page(raw: &Value) -> Result<ActivityPage, NormalizeError> {
    let data = unwrap_envelope(raw)?;
    let activities = match data.get("activities") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(activity_from_value)
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(NormalizeError::MalformedPayload),
    };

    Ok(ActivityPage {
        total: int_field(data, &["total"]).unwrap_or(activities.len() as i64),
        total_pages: int_field(data, &["totalPages", "total_pages"]).unwrap_or(1),
        current_page: int_field(data, &["currentPage", "current_page"]).unwrap_or(1),
        activities,
    })
}

/// Normalize a paged book-introductions payload.
pub fn introduction_page(raw: &Value) -> Result<IntroductionPage, NormalizeError> {
    let data = unwrap_envelope(raw)?;
    let introductions = match data.get("introductions") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(introduction_from_value)
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(NormalizeError::MalformedPayload),
    };

    Ok(IntroductionPage {
        total: int_field(data, &["total"]).unwrap_or(introductions.len() as i64),
        total_pages: int_field(data, &["totalPages", "total_pages"]).unwrap_or(1),
        current_page: int_field(data, &["currentPage", "current_page"]).unwrap_or(1),
        introductions,
    })
}

/// Normalize a single book-introduction payload.
pub fn introduction(raw: &Value) -> Result<BookIntroduction, NormalizeError> {
    let data = unwrap_envelope(raw)?;
    if !data.is_object() {
        return Err(NormalizeError::MalformedPayload);
    }
    introduction_from_value(data)
}

fn catalog_item_from_value(value: &Value) -> Result<CatalogItem, NormalizeError> {
    if !value.is_object() {
        return Err(NormalizeError::MalformedPayload);
    }

    let id = str_field(value, &["_id", "id"])
        .filter(|id| !id.is_empty())
        .ok_or(NormalizeError::MissingField("id"))?;
    let title = str_field(value, &["title", "libraryTitle", "bookTitle"])
        .ok_or(NormalizeError::MissingField("title"))?;

    Ok(CatalogItem {
        id,
        title,
        authors: author_list(value),
        category: str_field(value, &["category"]),
        document_type: str_field(value, &["documentType", "document_type"]),
        series_name: str_field(value, &["seriesName", "series_name"]),
        language: str_field(value, &["language"]),
        library_code: str_field(value, &["libraryCode", "library_code"]),
        cover_image: str_field(value, &["coverImage", "cover_image"]),
        is_new_book: bool_field(value, &["isNewBook", "is_new_book"]),
        is_featured_book: bool_field(value, &["isFeaturedBook", "is_featured_book"]),
        is_audio_book: bool_field(value, &["isAudioBook", "is_audio_book"]),
        publish_year: year_field(value),
        borrow_count: int_field(value, &["borrowCount", "totalBorrowCount", "borrow_count"]),
        rating: float_field(value, &["rating"]),
        created_at: str_field(value, &["createdAt", "created_at"]),
        description: section_field(value, &["description"]),
        introduction: section_field(value, &["introduction"]),
        audio_book: section_field(value, &["audioBook", "audio_book"]),
    })
}

fn introduction_from_value(value: &Value) -> Result<BookIntroduction, NormalizeError> {
    if !value.is_object() {
        return Err(NormalizeError::MalformedPayload);
    }

    let id = str_field(value, &["_id", "id"])
        .filter(|id| !id.is_empty())
        .ok_or(NormalizeError::MissingField("id"))?;
    let title = str_field(value, &["title"]).ok_or(NormalizeError::MissingField("title"))?;

    let related_book = value
        .get("relatedBook")
        .or_else(|| value.get("related_book"))
        .filter(|book| book.is_object())
        .map(catalog_item_from_value)
        .transpose()?;

    Ok(BookIntroduction {
        id,
        title,
        slug: str_field(value, &["slug"]),
        description: str_field(value, &["description"]),
        content: str_field(value, &["content"]),
        is_featured: bool_field(value, &["isFeatured", "is_featured"]),
        status: str_field(value, &["status"]),
        related_book,
        created_at: str_field(value, &["createdAt", "created_at"]),
        modified_at: str_field(value, &["modifiedAt", "modified_at"]),
    })
}

fn activity_from_value(value: &Value) -> Result<Activity, NormalizeError> {
    if !value.is_object() {
        return Err(NormalizeError::MalformedPayload);
    }

    let id = str_field(value, &["_id", "id"])
        .filter(|id| !id.is_empty())
        .ok_or(NormalizeError::MissingField("id"))?;
    let title = str_field(value, &["title"]).ok_or(NormalizeError::MissingField("title"))?;

    Ok(Activity {
        id,
        title,
        date: str_field(value, &["date"]),
        images: image_list(value.get("images")),
        days: day_list(value.get("days")),
        is_published: bool_field(value, &["isPublished", "is_published"]),
        created_at: str_field(value, &["createdAt", "created_at"]),
    })
}

fn day_list(value: Option<&Value>) -> Vec<ActivityDay> {
    let entries = match value.and_then(Value::as_array) {
        Some(entries) => entries,
        None => return vec![],
    };

    entries
        .iter()
        .filter_map(|entry| {
            Some(ActivityDay {
                day_number: int_field(entry, &["day_number", "dayNumber"]).unwrap_or(0),
                date: str_field(entry, &["date"]),
                title: str_field(entry, &["title"])?,
                description: str_field(entry, &["description"]),
                is_published: bool_field(entry, &["is_published", "isPublished"]),
                images: image_list(entry.get("images")),
            })
        })
        .collect()
}

fn image_list(value: Option<&Value>) -> Vec<ActivityImage> {
    let entries = match value.and_then(Value::as_array) {
        Some(entries) => entries,
        None => return vec![],
    };

    entries
        .iter()
        .filter_map(|entry| {
            Some(ActivityImage {
                url: str_field(entry, &["url"])?,
                caption: str_field(entry, &["caption"]),
            })
        })
        .collect()
}

fn author_list(value: &Value) -> Vec<String> {
    if let Some(entries) = value.get("authors").and_then(Value::as_array) {
        return entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    // Oldest records carried a single `author` string instead.
    str_field(value, &["author"])
        .filter(|author| !author.is_empty())
        .map(|author| vec![author])
        .unwrap_or_default()
}

fn section_field(value: &Value, keys: &[&str]) -> Option<Section> {
    match keys.iter().find_map(|key| value.get(key)) {
        Some(Value::Object(fields)) => Some(Section {
            content: fields
                .get("content")
                .and_then(Value::as_str)
                .map(str::to_string),
            link_embed: fields
                .get("linkEmbed")
                .or_else(|| fields.get("link_embed"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        Some(Value::String(text)) => Some(Section {
            content: Some(text.clone()),
            link_embed: None,
        }),
        _ => None,
    }
}

// Absence stays `None`; an explicitly blank string stays `Some("")` so
// callers can tell unset apart from blank.
fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn bool_field(value: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .find_map(|key| value.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn int_field(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| value.get(key)).and_then(Value::as_i64)
}

fn float_field(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| value.get(key)).and_then(Value::as_f64)
}

// Publish years arrive as numbers from some revisions and as strings from
// others.
fn year_field(value: &Value) -> Option<i64> {
    let raw = value.get("publishYear").or_else(|| value.get("publish_year"))?;
    match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

use serde::{Deserialize, Serialize};

/// One browsable library entry (a "title", not a physical copy), after
/// normalization from whichever backend shape supplied it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub category: Option<String>,
    pub document_type: Option<String>,
    pub series_name: Option<String>,
    pub language: Option<String>,
    pub library_code: Option<String>,
    pub cover_image: Option<String>,
    pub is_new_book: bool,
    pub is_featured_book: bool,
    pub is_audio_book: bool,
    pub publish_year: Option<i64>,
    pub borrow_count: Option<i64>,
    pub rating: Option<f64>,
    pub created_at: Option<String>,
    pub description: Option<Section>,
    pub introduction: Option<Section>,
    pub audio_book: Option<Section>,
}

/// One content tab on the detail page: free text, an embeddable link, or both.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Section {
    pub content: Option<String>,
    pub link_embed: Option<String>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.link_embed.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityImage {
    pub url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityDay {
    pub day_number: i64,
    pub date: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub images: Vec<ActivityImage>,
}

/// A library event/activity with its photo gallery.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub date: Option<String>,
    pub images: Vec<ActivityImage>,
    pub days: Vec<ActivityDay>,
    pub is_published: bool,
    pub created_at: Option<String>,
}

/// Paged activities response as the backend shapes it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityPage {
    pub activities: Vec<Activity>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// A book-introduction article, optionally linked to a catalog item.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookIntroduction {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub is_featured: bool,
    pub status: Option<String>,
    pub related_book: Option<CatalogItem>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
}

/// Paged book-introduction response as the backend shapes it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IntroductionPage {
    pub introductions: Vec<BookIntroduction>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

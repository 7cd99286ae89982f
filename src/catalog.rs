//! In-memory catalog querying: search, filters, sorting, pagination, and
//! the hero-slot selection for the library grid.
//!
//! The engine is handed an already-fetched, already-normalized item list;
//! it never touches the network.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::CatalogItem;
use crate::slug::fold_lower;

/// Default grid size of the library page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recent `created_at` first; undated items sort last.
    #[default]
    Newest,
    /// Oldest `created_at` first; undated items sort first.
    Oldest,
    /// Title ascending, compared on diacritic-folded lowercase titles.
    TitleAz,
    /// Title descending, same collation.
    TitleZa,
}

/// One user interaction's worth of catalog filtering state.
///
/// Constructed fresh per keystroke/checkbox/page change; it is purely a
/// function input and owns nothing.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    /// Matched case-insensitively against title and every author entry.
    pub search_term: String,
    /// OR-matched (substring) against category and document type.
    pub categories: Vec<String>,
    /// OR-matched (exact) against the series name.
    pub series: Vec<String>,
    pub only_new: bool,
    pub only_featured: bool,
    pub only_audio: bool,
    pub sort: SortKey,
    /// 1-indexed.
    pub page: usize,
    pub page_size: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            categories: vec![],
            series: vec![],
            only_new: false,
            only_featured: false,
            only_audio: false,
            sort: SortKey::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of query results plus the totals the pagination widget needs.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub total_count: usize,
    pub total_pages: usize,
}

impl CatalogPage {
    /// Pick the hero-slot item for this page: the first featured item,
    /// falling back to the first item. The grid excludes the hero so it is
    /// never rendered twice.
    pub fn hero_split(&self) -> (Option<&CatalogItem>, Vec<&CatalogItem>) {
        let hero = self
            .items
            .iter()
            .find(|item| item.is_featured_book)
            .or_else(|| self.items.first());

        let hero_id = match hero {
            Some(hero) => hero.id.as_str(),
            None => return (None, vec![]),
        };

        let grid = self.items.iter().filter(|item| item.id != hero_id).collect();
        (hero, grid)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A zero page size is a caller bug, not a query that matched nothing.
    #[error("page size must be at least 1")]
    InvalidPageSize,
}

/// Filter, sort, and slice the catalog.
///
/// All filters AND together; the category and series sets OR internally.
/// Sorting is stable, so ties keep their incoming relative order. A page
/// past the end yields an empty page with correct totals rather than an
/// error; page 0 is treated as page 1.
pub fn query(items: &[CatalogItem], q: &CatalogQuery) -> Result<CatalogPage, CatalogError> {
    if q.page_size == 0 {
        return Err(CatalogError::InvalidPageSize);
    }

    let mut matched: Vec<&CatalogItem> = items.iter().filter(|item| matches(item, q)).collect();
    sort_items(&mut matched, q.sort);

    let total_count = matched.len();
    let total_pages = total_count.div_ceil(q.page_size).max(1);

    let start = q.page.saturating_sub(1).saturating_mul(q.page_size);
    let page_items = if start >= total_count {
        vec![]
    } else {
        matched[start..(start + q.page_size).min(total_count)]
            .iter()
            .map(|item| (*item).clone())
            .collect()
    };

    Ok(CatalogPage {
        items: page_items,
        total_count,
        total_pages,
    })
}

fn matches(item: &CatalogItem, q: &CatalogQuery) -> bool {
    matches_search(item, &q.search_term)
        && matches_categories(item, &q.categories)
        && matches_series(item, &q.series)
        && (!q.only_new || item.is_new_book)
        && (!q.only_featured || item.is_featured_book)
        && (!q.only_audio || item.is_audio_book)
}

fn matches_search(item: &CatalogItem, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    item.title.to_lowercase().contains(&term)
        || item
            .authors
            .iter()
            .any(|author| author.to_lowercase().contains(&term))
}

fn matches_categories(item: &CatalogItem, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }

    let category = item.category.as_deref().unwrap_or("");
    let document_type = item.document_type.as_deref().unwrap_or("");
    selected
        .iter()
        .any(|wanted| category.contains(wanted.as_str()) || document_type.contains(wanted.as_str()))
}

// Series names are controlled vocabulary, so membership is exact rather
// than substring.
fn matches_series(item: &CatalogItem, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }

    match item.series_name.as_deref() {
        Some(series) => selected.iter().any(|wanted| wanted == series),
        None => false,
    }
}

fn sort_items(items: &mut [&CatalogItem], sort: SortKey) {
    match sort {
        SortKey::Newest => {
            items.sort_by_cached_key(|item| std::cmp::Reverse(created_timestamp(item)))
        }
        SortKey::Oldest => items.sort_by_cached_key(|item| created_timestamp(item)),
        SortKey::TitleAz => items.sort_by_cached_key(|item| fold_lower(&item.title)),
        SortKey::TitleZa => {
            items.sort_by_cached_key(|item| std::cmp::Reverse(fold_lower(&item.title)))
        }
    }
}

/// Parse `created_at` into epoch seconds for recency sorting.
///
/// Missing or unparseable dates count as timestamp 0, which places them
/// last under `Newest` and first under `Oldest`.
fn created_timestamp(item: &CatalogItem) -> i64 {
    let raw = match item.created_at.as_deref() {
        Some(raw) => raw.trim(),
        None => return 0,
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.timestamp();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.and_utc().timestamp();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return parsed.and_utc().timestamp();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(0);
    }

    0
}

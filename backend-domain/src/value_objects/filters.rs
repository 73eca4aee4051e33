// Listing filters
// Raw query parameters are normalized here before any query is built

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::parse_date;
use crate::value_objects::{SortColumn, SortDirection};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 12;
pub const MAX_LIMIT: u32 = 50;

/// Query string as received. Every field stays a string so a malformed
/// value can fall back to its default instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListParams {
    pub id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub featured: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl EventListParams {
    /// Builds params from decoded query pairs. A repeated key keeps its
    /// last value and unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut out = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "id" => &mut out.id,
                "page" => &mut out.page,
                "limit" => &mut out.limit,
                "category" => &mut out.category,
                "featured" => &mut out.featured,
                "search" => &mut out.search,
                "date_from" => &mut out.date_from,
                "date_to" => &mut out.date_to,
                "price_min" => &mut out.price_min,
                "price_max" => &mut out.price_max,
                "sort" => &mut out.sort,
                "direction" => &mut out.direction,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventFilters {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub search_terms: Vec<String>,
    pub search_term: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub sort: SortColumn,
    pub direction: SortDirection,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            category: None,
            featured: None,
            search_terms: Vec::new(),
            search_term: None,
            date_from: None,
            date_to: None,
            price_min: None,
            price_max: None,
            sort: SortColumn::default(),
            direction: SortDirection::default(),
        }
    }
}

impl EventFilters {
    pub fn from_params(params: &EventListParams) -> Self {
        let search_term = non_empty(params.search.as_deref()).map(str::to_string);
        let search_terms = search_term
            .as_deref()
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            page: parse_page(params.page.as_deref()),
            limit: parse_limit(params.limit.as_deref()),
            category: non_empty(params.category.as_deref())
                .filter(|value| *value != "all")
                .map(str::to_string),
            featured: parse_featured(params.featured.as_deref()),
            search_terms,
            search_term,
            date_from: params.date_from.as_deref().and_then(|v| parse_date(v).ok()),
            date_to: params.date_to.as_deref().and_then(|v| parse_date(v).ok()),
            price_min: parse_price(params.price_min.as_deref()),
            price_max: parse_price(params.price_max.as_deref()),
            sort: params
                .sort
                .as_deref()
                .map(|v| SortColumn::from(v.trim()))
                .unwrap_or_default(),
            direction: params
                .direction
                .as_deref()
                .map(|v| SortDirection::from(v.trim()))
                .unwrap_or_default(),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Start of the `date_from` day, inclusive.
    pub fn date_from_bound(&self) -> Option<NaiveDateTime> {
        self.date_from.and_then(|day| day.and_hms_opt(0, 0, 0))
    }

    /// Last second of the `date_to` day, inclusive.
    pub fn date_to_bound(&self) -> Option<NaiveDateTime> {
        self.date_to.and_then(|day| day.and_hms_opt(23, 59, 59))
    }
}

/// Validates the `id` parameter of a single-event lookup.
pub fn parse_event_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .and_then(|page| u32::try_from(page).ok())
        .unwrap_or(DEFAULT_PAGE)
}

fn parse_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|limit| (1..=i64::from(MAX_LIMIT)).contains(limit))
        .map(|limit| limit as u32)
        .unwrap_or(DEFAULT_LIMIT)
}

fn parse_featured(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim)?.parse::<i64>().ok()? {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|price| price.is_finite() && *price >= 0.0)
}

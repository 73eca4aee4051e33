// In-memory evaluation of listing filters
// Mirrors the SQL predicates built by the query builder

use std::cmp::Ordering;

use crate::entities::Event;
use crate::value_objects::{EventFilters, SortColumn, SortDirection};

pub fn matches(filters: &EventFilters, event: &Event) -> bool {
    if let Some(category) = &filters.category {
        let same = event
            .category
            .as_deref()
            .map(|value| value.to_lowercase() == category.to_lowercase())
            .unwrap_or(false);
        if !same {
            return false;
        }
    }
    if let Some(featured) = filters.featured {
        if event.featured != featured {
            return false;
        }
    }
    if !filters
        .search_terms
        .iter()
        .all(|term| term_matches(event, &term.to_lowercase()))
    {
        return false;
    }
    if let Some(from) = filters.date_from_bound() {
        if event.event_date < from {
            return false;
        }
    }
    if let Some(to) = filters.date_to_bound() {
        if event.event_date > to {
            return false;
        }
    }
    if let Some(min) = filters.price_min {
        if event.price < min {
            return false;
        }
    }
    if let Some(max) = filters.price_max {
        if event.price > max {
            return false;
        }
    }
    true
}

fn term_matches(event: &Event, term: &str) -> bool {
    [
        Some(event.title.as_str()),
        event.description.as_deref(),
        event.location.as_deref(),
        event.organizer.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(term))
}

pub fn compare(column: SortColumn, direction: SortDirection, a: &Event, b: &Event) -> Ordering {
    let ordering = match column {
        SortColumn::EventDate => a.event_date.cmp(&b.event_date),
        SortColumn::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortColumn::Price => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
        SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    let ordering = match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

/// Filters, sorts and slices `events` the way the count and data queries
/// do. Returns the filtered total and the requested page.
pub fn select_page(filters: &EventFilters, events: &[Event]) -> (u64, Vec<Event>) {
    let mut matched = events
        .iter()
        .filter(|event| matches(filters, event))
        .cloned()
        .collect::<Vec<_>>();
    let total = matched.len() as u64;
    matched.sort_by(|a, b| compare(filters.sort, filters.direction, a, b));
    let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
    let page = matched
        .into_iter()
        .skip(offset)
        .take(filters.limit as usize)
        .collect();
    (total, page)
}

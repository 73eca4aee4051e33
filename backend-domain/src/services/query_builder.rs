// Event query builder
// Turns validated filters into a parameterized count query and data query

use chrono::NaiveDateTime;

use crate::value_objects::EventFilters;

pub const EVENTS_TABLE: &str = "events";

/// Columns read for every event. `price` is cast so it decodes as a float
/// regardless of the DECIMAL precision of the column, and the integer
/// columns are cast to signed BIGINT so UNSIGNED schemas decode too.
pub const EVENT_COLUMNS: &str = "CAST(id AS SIGNED) AS id, title, description, location, \
organizer, category, sub_categories, event_date, CAST(price AS DOUBLE) AS price, featured, \
ticketTypes, main_image, banner_image, CAST(total_tickets AS SIGNED) AS total_tickets, \
CAST(available_tickets AS SIGNED) AS available_tickets, duration, created_at";

pub const SEARCH_COLUMNS: [&str; 4] = ["title", "description", "location", "organizer"];

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// A WHERE condition and the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl Predicate {
    fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Both statements share `params`; the data statement additionally ends
/// in `LIMIT ? OFFSET ?`, bound from `limit` and `offset` after `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub count_sql: String,
    pub data_sql: String,
    pub params: Vec<SqlParam>,
    pub limit: u32,
    pub offset: u64,
}

pub fn single_event_sql() -> String {
    format!("SELECT {} FROM {} WHERE id = ?", EVENT_COLUMNS, EVENTS_TABLE)
}

#[derive(Debug, Default)]
pub struct EventQueryBuilder {
    predicates: Vec<Predicate>,
}

impl EventQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn with_filters(mut self, filters: &EventFilters) -> Self {
        if let Some(category) = &filters.category {
            self.predicates
                .push(Predicate::new("category = ?", vec![SqlParam::Text(category.clone())]));
        }
        if let Some(featured) = filters.featured {
            self.predicates
                .push(Predicate::new("featured = ?", vec![SqlParam::Bool(featured)]));
        }
        for term in &filters.search_terms {
            self.predicates.push(search_term_predicate(term));
        }
        if let Some(from) = filters.date_from_bound() {
            self.predicates
                .push(Predicate::new("event_date >= ?", vec![SqlParam::DateTime(from)]));
        }
        if let Some(to) = filters.date_to_bound() {
            self.predicates
                .push(Predicate::new("event_date <= ?", vec![SqlParam::DateTime(to)]));
        }
        if let Some(min) = filters.price_min {
            self.predicates
                .push(Predicate::new("price >= ?", vec![SqlParam::Float(min)]));
        }
        if let Some(max) = filters.price_max {
            self.predicates
                .push(Predicate::new("price <= ?", vec![SqlParam::Float(max)]));
        }
        self
    }

    pub fn build(self, filters: &EventFilters) -> EventQuery {
        let where_clause = if self.predicates.is_empty() {
            String::new()
        } else {
            let joined = self
                .predicates
                .iter()
                .map(|p| p.sql.as_str())
                .collect::<Vec<_>>()
                .join(" AND ");
            format!(" WHERE {}", joined)
        };
        let params = self
            .predicates
            .into_iter()
            .flat_map(|p| p.params)
            .collect::<Vec<_>>();

        let count_sql = format!("SELECT COUNT(*) FROM {}{}", EVENTS_TABLE, where_clause);
        let data_sql = format!(
            "SELECT {} FROM {}{} ORDER BY {} {} LIMIT ? OFFSET ?",
            EVENT_COLUMNS,
            EVENTS_TABLE,
            where_clause,
            filters.sort.as_sql(),
            filters.direction.as_sql(),
        );

        EventQuery {
            count_sql,
            data_sql,
            params,
            limit: filters.limit,
            offset: filters.offset(),
        }
    }
}

pub fn build_event_query(filters: &EventFilters) -> EventQuery {
    EventQueryBuilder::new().with_filters(filters).build(filters)
}

/// One term must appear in at least one searchable column. Terms are
/// combined with AND by the caller, so different terms may hit different
/// columns.
fn search_term_predicate(term: &str) -> Predicate {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    let sql = SEARCH_COLUMNS
        .iter()
        .map(|column| format!("LOWER({}) LIKE ?", column))
        .collect::<Vec<_>>()
        .join(" OR ");
    let params = SEARCH_COLUMNS
        .iter()
        .map(|_| SqlParam::Text(pattern.clone()))
        .collect();
    Predicate::new(format!("({})", sql), params)
}

/// Escapes LIKE wildcards so user text is matched literally.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{EventListParams, SortColumn, SortDirection};

    fn filters_with(update: impl FnOnce(&mut EventListParams)) -> EventFilters {
        let mut params = EventListParams::default();
        update(&mut params);
        EventFilters::from_params(&params)
    }

    #[test]
    fn no_filters_builds_plain_queries() {
        let filters = EventFilters::default();
        let query = build_event_query(&filters);
        assert_eq!(query.count_sql, "SELECT COUNT(*) FROM events");
        assert_eq!(
            query.data_sql,
            format!("SELECT {} FROM events ORDER BY event_date ASC LIMIT ? OFFSET ?", EVENT_COLUMNS)
        );
        assert!(query.params.is_empty());
        assert_eq!(query.limit, 12);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn search_terms_are_anded_and_columns_ored() {
        let filters = filters_with(|p| p.search = Some("Jazz night".to_string()));
        let query = build_event_query(&filters);
        let clause = "(LOWER(title) LIKE ? OR LOWER(description) LIKE ? OR LOWER(location) LIKE ? OR LOWER(organizer) LIKE ?)";
        assert_eq!(
            query.count_sql,
            format!("SELECT COUNT(*) FROM events WHERE {} AND {}", clause, clause)
        );
        assert_eq!(query.params.len(), 8);
        assert!(query.params[..4]
            .iter()
            .all(|p| *p == SqlParam::Text("%jazz%".to_string())));
        assert!(query.params[4..]
            .iter()
            .all(|p| *p == SqlParam::Text("%night%".to_string())));
    }

    #[test]
    fn count_and_data_share_the_where_clause() {
        let filters = filters_with(|p| {
            p.category = Some("Music".to_string());
            p.featured = Some("1".to_string());
            p.price_min = Some("10".to_string());
            p.price_max = Some("100".to_string());
            p.page = Some("3".to_string());
            p.limit = Some("5".to_string());
        });
        let query = build_event_query(&filters);
        let where_clause = "WHERE category = ? AND featured = ? AND price >= ? AND price <= ?";
        assert!(query.count_sql.ends_with(where_clause));
        assert!(query.data_sql.contains(where_clause));
        assert_eq!(
            query.params,
            vec![
                SqlParam::Text("Music".to_string()),
                SqlParam::Bool(true),
                SqlParam::Float(10.0),
                SqlParam::Float(100.0),
            ]
        );
        assert_eq!(query.limit, 5);
        assert_eq!(query.offset, 10);
    }

    #[test]
    fn date_range_binds_whole_day_bounds() {
        let filters = filters_with(|p| {
            p.date_from = Some("2025-06-01".to_string());
            p.date_to = Some("2025-06-01".to_string());
        });
        let query = build_event_query(&filters);
        assert!(query.count_sql.ends_with("WHERE event_date >= ? AND event_date <= ?"));
        let expected_from = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("from");
        let expected_to = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .expect("to");
        assert_eq!(
            query.params,
            vec![SqlParam::DateTime(expected_from), SqlParam::DateTime(expected_to)]
        );
    }

    #[test]
    fn order_by_uses_whitelisted_column() {
        let filters = filters_with(|p| {
            p.sort = Some("price; DELETE FROM events".to_string());
            p.direction = Some("DESC".to_string());
        });
        assert_eq!(filters.sort, SortColumn::EventDate);
        assert_eq!(filters.direction, SortDirection::Desc);
        let query = build_event_query(&filters);
        assert!(query.data_sql.contains("ORDER BY event_date DESC LIMIT ? OFFSET ?"));
        assert!(!query.data_sql.contains("DELETE"));
    }

    #[test]
    fn user_text_never_reaches_the_sql() {
        let filters = filters_with(|p| {
            p.category = Some("x' OR '1'='1".to_string());
            p.search = Some("'; DROP TABLE events; --".to_string());
        });
        let query = build_event_query(&filters);
        assert!(!query.data_sql.contains("DROP"));
        assert!(!query.data_sql.contains("'1'='1"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        let filters = filters_with(|p| p.search = Some("100%".to_string()));
        let query = build_event_query(&filters);
        assert_eq!(query.params[0], SqlParam::Text("%100\\%%".to_string()));
    }

    #[test]
    fn single_lookup_is_parameterized() {
        assert_eq!(
            single_event_sql(),
            format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS)
        );
    }

    #[test]
    fn integer_columns_are_read_as_signed() {
        for column in ["id", "total_tickets", "available_tickets"] {
            let cast = format!("CAST({} AS SIGNED) AS {}", column, column);
            assert!(EVENT_COLUMNS.contains(&cast), "{}", column);
            assert!(single_event_sql().contains(&cast), "{}", column);
        }
        assert!(single_event_sql().ends_with("WHERE id = ?"));
    }
}

// Sort value objects
// Only these variants ever reach an ORDER BY clause

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    EventDate,
    Title,
    Price,
    CreatedAt,
}

impl SortColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::EventDate => "event_date",
            SortColumn::Title => "title",
            SortColumn::Price => "price",
            SortColumn::CreatedAt => "created_at",
        }
    }
}

impl From<&str> for SortColumn {
    fn from(s: &str) -> Self {
        match s {
            "title" => SortColumn::Title,
            "price" => SortColumn::Price,
            "created_at" => SortColumn::CreatedAt,
            _ => SortColumn::EventDate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl From<&str> for SortDirection {
    fn from(s: &str) -> Self {
        if s.to_lowercase() == "desc" {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

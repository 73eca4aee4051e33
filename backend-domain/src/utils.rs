use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use regex::Regex;

pub const MYSQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}

/// Parses a strict `YYYY-MM-DD` day. Anything with extra characters, a
/// different layout or an impossible calendar day is rejected.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    if !date_pattern().is_match(date) {
        return Err(anyhow!("date must be YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|err| anyhow!(err))
}

/// Datetimes travel as `YYYY-MM-DD HH:MM:SS`, the same text MySQL returns.
pub mod mysql_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MYSQL_DATETIME_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(MYSQL_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, MYSQL_DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::MYSQL_DATETIME_FORMAT;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(inner) => {
                    serializer.serialize_str(&inner.format(MYSQL_DATETIME_FORMAT).to_string())
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|value| super::parse(&value).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

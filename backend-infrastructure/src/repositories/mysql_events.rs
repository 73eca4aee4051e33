use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{Arguments, FromRow};
use tracing::debug;

use backend_domain::{
    build_event_query, decode_json_column, encode_json_column, single_event_sql, DbConfig, Event,
    EventFilters, EventRepository, EventSlice, SqlParam,
};

const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INT AUTO_INCREMENT PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT NULL,
    category VARCHAR(100) NULL,
    sub_categories TEXT NULL,
    event_date DATETIME NOT NULL,
    location VARCHAR(255) NULL,
    main_image VARCHAR(512) NULL,
    banner_image VARCHAR(512) NULL,
    price DECIMAL(10,2) NOT NULL DEFAULT 0,
    total_tickets INT NULL,
    available_tickets INT NULL,
    featured TINYINT(1) NOT NULL DEFAULT 0,
    organizer VARCHAR(255) NULL,
    duration VARCHAR(100) NULL,
    ticketTypes TEXT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    INDEX idx_event_date (event_date),
    INDEX idx_category (category)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

const INSERT_EVENT: &str = "INSERT INTO events \
(title, description, category, sub_categories, event_date, location, main_image, banner_image, \
price, total_tickets, available_tickets, featured, organizer, duration, ticketTypes) \
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Raw row as MySQL returns it; JSON columns are still text.
#[derive(Debug, FromRow)]
struct EventRecord {
    id: i64,
    title: String,
    description: Option<String>,
    location: Option<String>,
    organizer: Option<String>,
    category: Option<String>,
    sub_categories: Option<String>,
    event_date: NaiveDateTime,
    price: Option<f64>,
    featured: Option<bool>,
    #[sqlx(rename = "ticketTypes")]
    ticket_types: Option<String>,
    main_image: Option<String>,
    banner_image: Option<String>,
    total_tickets: Option<i64>,
    available_tickets: Option<i64>,
    duration: Option<String>,
    created_at: Option<NaiveDateTime>,
}

impl From<EventRecord> for Event {
    fn from(row: EventRecord) -> Self {
        Self {
            sub_categories: decode_json_column(row.id, "sub_categories", row.sub_categories.as_deref()),
            ticket_types: decode_json_column(row.id, "ticketTypes", row.ticket_types.as_deref()),
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            organizer: row.organizer,
            category: row.category,
            event_date: row.event_date,
            price: row.price.unwrap_or_default(),
            featured: row.featured.unwrap_or(false),
            main_image: row.main_image,
            banner_image: row.banner_image,
            total_tickets: row.total_tickets,
            available_tickets: row.available_tickets,
            duration: row.duration,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct MySqlEventRepository {
    pool: MySqlPool,
}

impl MySqlEventRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool; connection errors surface on the
    /// first query, bounded by the configured timeout.
    pub fn connect_lazy(config: &DbConfig) -> Self {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database)
            .charset("utf8mb4");
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_lazy_with(options);
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_EVENTS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

fn bind_params(params: &[SqlParam]) -> Result<MySqlArguments> {
    let mut args = MySqlArguments::default();
    for param in params {
        let added = match param {
            SqlParam::Text(value) => args.add(value.clone()),
            SqlParam::Int(value) => args.add(*value),
            SqlParam::Float(value) => args.add(*value),
            SqlParam::Bool(value) => args.add(*value),
            SqlParam::DateTime(value) => args.add(*value),
        };
        added.map_err(|err| anyhow!(err))?;
    }
    Ok(args)
}

#[async_trait]
impl EventRepository for MySqlEventRepository {
    async fn list_events(&self, filters: &EventFilters) -> Result<EventSlice> {
        let query = build_event_query(filters);
        debug!(sql = %query.data_sql, params = query.params.len(), "listing events");

        let total: i64 = sqlx::query_scalar_with(&query.count_sql, bind_params(&query.params)?)
            .fetch_one(&self.pool)
            .await?;

        let mut data_args = bind_params(&query.params)?;
        data_args.add(query.limit).map_err(|err| anyhow!(err))?;
        data_args.add(query.offset).map_err(|err| anyhow!(err))?;
        let rows = sqlx::query_as_with::<_, EventRecord, _>(&query.data_sql, data_args)
            .fetch_all(&self.pool)
            .await?;

        Ok(EventSlice {
            total: u64::try_from(total).unwrap_or_default(),
            events: rows.into_iter().map(Event::from).collect(),
        })
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        let sql = single_event_sql();
        let row = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Event::from))
    }

    async fn insert_event(&self, event: &Event) -> Result<i64> {
        let result = sqlx::query(INSERT_EVENT)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.category)
            .bind(encode_json_column(&event.sub_categories)?)
            .bind(event.event_date)
            .bind(&event.location)
            .bind(&event.main_image)
            .bind(&event.banner_image)
            .bind(event.price)
            .bind(event.total_tickets)
            .bind(event.available_tickets)
            .bind(event.featured)
            .bind(&event.organizer)
            .bind(&event.duration)
            .bind(encode_json_column(&event.ticket_types)?)
            .execute(&self.pool)
            .await?;
        Ok(i64::try_from(result.last_insert_id())?)
    }

    async fn ping(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

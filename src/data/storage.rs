#[cfg(debug_assertions)]
use crate::config::DF;
use {
    crate::{
        domain::{Series, SeriesPoint},
        utils::{format_date, parse_date},
    },
    anyhow::{Context, Result},
    async_trait::async_trait,
    chrono::NaiveDate,
    sqlx::{
        ConnectOptions, Pool, QueryBuilder, Row, Sqlite,
        sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    },
    std::{str::FromStr, time::Duration},
};

/// Daily closes per symbol. The only source of a `Series` for the forecaster.
#[async_trait]
pub trait SeriesStorage: Send + Sync {
    async fn initialize(&self) -> Result<()>;
    async fn last_date(&self, symbol: &str) -> Result<Option<NaiveDate>>;
    /// Insert or overwrite closes by date. Returns the number of points written.
    async fn upsert_points(&self, symbol: &str, points: &[SeriesPoint]) -> Result<u64>;
    /// `None` when nothing is stored for `symbol`.
    async fn load_series(&self, symbol: &str) -> Result<Option<Series>>;
}

pub struct SqliteStorage {
    pool: Pool<Sqlite>,
}

impl SqliteStorage {
    pub async fn new(db_path: &str) -> Result<Self> {
        let connection_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(60))
            .synchronous(SqliteSynchronous::Normal)
            .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .with_context(|| format!("Failed to open series database: {}", db_path))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SeriesStorage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_closes (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL NOT NULL,
                PRIMARY KEY (symbol, date)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn last_date(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        let row = sqlx::query(
            r#"
            SELECT MAX(date) as last_date
            FROM daily_closes
            WHERE symbol = ?
            "#,
        )
        .bind(symbol)
        .fetch_one(&self.pool)
        .await?;

        let last: Option<String> = row.try_get("last_date")?;
        last.as_deref().map(parse_date).transpose()
    }

    /// Batches rows in chunks of 5000 to stay within SQLite's 32k parameter limit.
    async fn upsert_points(&self, symbol: &str, points: &[SeriesPoint]) -> Result<u64> {
        if points.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for chunk in points.chunks(5000) {
            let mut query_builder =
                QueryBuilder::new("INSERT OR REPLACE INTO daily_closes (symbol, date, close) ");

            query_builder.push_values(chunk, |mut b, p| {
                b.push_bind(symbol)
                    .push_bind(format_date(p.date))
                    .push_bind(p.value);
            });

            query_builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        #[cfg(debug_assertions)]
        if DF.log_series_store {
            log::debug!("SERIES STORE: wrote {} rows for {}", points.len(), symbol);
        }
        Ok(points.len() as u64)
    }

    async fn load_series(&self, symbol: &str) -> Result<Option<Series>> {
        let rows = sqlx::query(
            r#"
            SELECT date, close
            FROM daily_closes
            WHERE symbol = ?
            ORDER BY date ASC
            "#,
        )
        .bind(symbol)
        .fetch_all(&self.pool)
        .await?;

        #[cfg(debug_assertions)]
        if DF.log_series_store {
            log::debug!("SERIES STORE: read {} rows for {}", rows.len(), symbol);
        }

        if rows.is_empty() {
            return Ok(None);
        }

        let points = rows
            .iter()
            .map(|row| {
                let date: String = row.try_get("date")?;
                Ok(SeriesPoint::new(parse_date(&date)?, row.try_get("close")?))
            })
            .collect::<Result<Vec<_>>>()?;

        let series = Series::new(symbol, points)
            .with_context(|| format!("Stored series for {} is invalid", symbol))?;
        Ok(Some(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(d: u32, v: f64) -> SeriesPoint {
        SeriesPoint::new(NaiveDate::from_ymd_opt(2024, 3, d).unwrap(), v)
    }

    async fn open(dir: &tempfile::TempDir) -> SqliteStorage {
        let path = dir.path().join("series.sqlite");
        let storage = SqliteStorage::new(path.to_str().unwrap()).await.unwrap();
        storage.initialize().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_empty_symbol_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open(&dir).await;
        assert!(storage.load_series("NFLX").await.unwrap().is_none());
        assert!(storage.last_date("NFLX").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_trip_is_date_ordered_and_per_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open(&dir).await;

        // Out of order on insert; loaded back sorted.
        let written = storage
            .upsert_points("NFLX", &[point(3, 12.0), point(1, 10.0), point(2, 11.0)])
            .await
            .unwrap();
        assert_eq!(written, 3);
        storage.upsert_points("AAPL", &[point(1, 99.0)]).await.unwrap();

        let series = storage.load_series("NFLX").await.unwrap().unwrap();
        assert_eq!(series.symbol(), "NFLX");
        assert_eq!(series.values(), &[10.0, 11.0, 12.0]);
        assert_eq!(
            storage.last_date("NFLX").await.unwrap(),
            Some(point(3, 0.0).date)
        );
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_date() {
        let dir = tempfile::tempdir().unwrap();
        let storage = open(&dir).await;

        storage.upsert_points("NFLX", &[point(1, 10.0), point(2, 11.0)]).await.unwrap();
        storage.upsert_points("NFLX", &[point(2, 15.0)]).await.unwrap();

        let series = storage.load_series("NFLX").await.unwrap().unwrap();
        assert_eq!(series.values(), &[10.0, 15.0]);
    }
}

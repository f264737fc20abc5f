//! PostgreSQL implementation of the currency and rate stores.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use currex_common::{
    Currency, CurrencyCode, CurrencyId, CurrencyPair, ExchangeRate, ExchangeRateId,
    NewExchangeRate, StorageError, StorageResult,
};
use currex_fx::{CurrencyStore, ExchangeRateStore};

use crate::error::map_sqlx_error;

const RATE_COLUMNS: &str = r#"
    r.id AS id,
    r.rate AS rate,
    bc.id AS bc_id,
    bc.code AS bc_code,
    bc.full_name AS bc_full_name,
    bc.sign AS bc_sign,
    tc.id AS tc_id,
    tc.code AS tc_code,
    tc.full_name AS tc_full_name,
    tc.sign AS tc_sign
"#;

#[derive(Debug, sqlx::FromRow)]
struct CurrencyRow {
    id: Uuid,
    code: String,
    full_name: String,
    sign: String,
}

impl TryFrom<CurrencyRow> for Currency {
    type Error = StorageError;

    fn try_from(row: CurrencyRow) -> Result<Self, Self::Error> {
        Ok(Currency {
            id: CurrencyId::from_uuid(row.id),
            code: stored_code(&row.code)?,
            full_name: row.full_name,
            sign: row.sign,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExchangeRateRow {
    id: Uuid,
    rate: Decimal,
    bc_id: Uuid,
    bc_code: String,
    bc_full_name: String,
    bc_sign: String,
    tc_id: Uuid,
    tc_code: String,
    tc_full_name: String,
    tc_sign: String,
}

impl TryFrom<ExchangeRateRow> for ExchangeRate {
    type Error = StorageError;

    fn try_from(row: ExchangeRateRow) -> Result<Self, Self::Error> {
        Ok(ExchangeRate {
            id: ExchangeRateId::from_uuid(row.id),
            base: Currency {
                id: CurrencyId::from_uuid(row.bc_id),
                code: stored_code(&row.bc_code)?,
                full_name: row.bc_full_name,
                sign: row.bc_sign,
            },
            target: Currency {
                id: CurrencyId::from_uuid(row.tc_id),
                code: stored_code(&row.tc_code)?,
                full_name: row.tc_full_name,
                sign: row.tc_sign,
            },
            rate: row.rate,
        })
    }
}

fn stored_code(raw: &str) -> StorageResult<CurrencyCode> {
    CurrencyCode::parse(raw)
        .map_err(|e| StorageError::Database(format!("stored currency code {raw:?}: {e}")))
}

/// Store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error(e, "connect"))?;

        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Database(format!("migration failed: {e}")))?;

        info!("Database migrations applied");
        Ok(())
    }

    /// Underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CurrencyStore for PgStore {
    async fn find_currency_by_code(&self, code: &CurrencyCode) -> StorageResult<Option<Currency>> {
        let row = sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, full_name, sign FROM currencies WHERE code = $1",
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "find currency"))?;

        debug!(code = %code, found = row.is_some(), "Currency lookup");
        row.map(Currency::try_from).transpose()
    }

    async fn list_currencies(&self) -> StorageResult<Vec<Currency>> {
        sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, full_name, sign FROM currencies ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "list currencies"))?
        .into_iter()
        .map(Currency::try_from)
        .collect()
    }

    #[instrument(skip(self, currency), fields(code = %currency.code))]
    async fn save_currency(&self, currency: Currency) -> StorageResult<Currency> {
        let row = sqlx::query_as::<_, CurrencyRow>(
            "INSERT INTO currencies (id, code, full_name, sign) VALUES ($1, $2, $3, $4) \
             RETURNING id, code, full_name, sign",
        )
        .bind(currency.id.as_uuid())
        .bind(currency.code.as_str())
        .bind(&currency.full_name)
        .bind(&currency.sign)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &format!("currency code {}", currency.code)))?;

        Currency::try_from(row)
    }
}

#[async_trait]
impl ExchangeRateStore for PgStore {
    async fn find_rate(&self, pair: &CurrencyPair) -> StorageResult<Option<ExchangeRate>> {
        let sql = format!(
            "SELECT {RATE_COLUMNS} FROM exchange_rates r \
             JOIN currencies bc ON bc.id = r.base_currency_id \
             JOIN currencies tc ON tc.id = r.target_currency_id \
             WHERE bc.code = $1 AND tc.code = $2"
        );
        let row = sqlx::query_as::<_, ExchangeRateRow>(&sql)
            .bind(pair.base.as_str())
            .bind(pair.target.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "find rate"))?;

        debug!(pair = %pair, found = row.is_some(), "Rate lookup");
        row.map(ExchangeRate::try_from).transpose()
    }

    async fn list_rates(&self) -> StorageResult<Vec<ExchangeRate>> {
        let sql = format!(
            "SELECT {RATE_COLUMNS} FROM exchange_rates r \
             JOIN currencies bc ON bc.id = r.base_currency_id \
             JOIN currencies tc ON tc.id = r.target_currency_id \
             ORDER BY bc.code, tc.code"
        );
        sqlx::query_as::<_, ExchangeRateRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "list rates"))?
            .into_iter()
            .map(ExchangeRate::try_from)
            .collect()
    }

    #[instrument(skip(self, rate), fields(pair = %rate.pair))]
    async fn save_rate(&self, rate: NewExchangeRate) -> StorageResult<ExchangeRate> {
        // A missing code leaves the subquery NULL and trips the NOT NULL constraint.
        let sql = format!(
            "WITH r AS ( \
                 INSERT INTO exchange_rates (id, base_currency_id, target_currency_id, rate) \
                 VALUES ($1, \
                         (SELECT id FROM currencies WHERE code = $2), \
                         (SELECT id FROM currencies WHERE code = $3), \
                         $4) \
                 RETURNING id, base_currency_id, target_currency_id, rate \
             ) \
             SELECT {RATE_COLUMNS} FROM r \
             JOIN currencies bc ON bc.id = r.base_currency_id \
             JOIN currencies tc ON tc.id = r.target_currency_id"
        );
        let row = sqlx::query_as::<_, ExchangeRateRow>(&sql)
            .bind(rate.id.as_uuid())
            .bind(rate.pair.base.as_str())
            .bind(rate.pair.target.as_str())
            .bind(rate.rate)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, &format!("pair {}", rate.pair)))?;

        ExchangeRate::try_from(row)
    }

    #[instrument(skip(self))]
    async fn update_rate(
        &self,
        pair: &CurrencyPair,
        rate: Decimal,
    ) -> StorageResult<Option<ExchangeRate>> {
        let sql = format!(
            "WITH r AS ( \
                 UPDATE exchange_rates SET rate = $3 \
                 WHERE base_currency_id = (SELECT id FROM currencies WHERE code = $1) \
                   AND target_currency_id = (SELECT id FROM currencies WHERE code = $2) \
                 RETURNING id, base_currency_id, target_currency_id, rate \
             ) \
             SELECT {RATE_COLUMNS} FROM r \
             JOIN currencies bc ON bc.id = r.base_currency_id \
             JOIN currencies tc ON tc.id = r.target_currency_id"
        );
        let row = sqlx::query_as::<_, ExchangeRateRow>(&sql)
            .bind(pair.base.as_str())
            .bind(pair.target.as_str())
            .bind(rate)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, &format!("pair {pair}")))?;

        row.map(ExchangeRate::try_from).transpose()
    }
}

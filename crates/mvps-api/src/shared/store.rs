//! SQLite storage helpers
//!
//! Every repository that implements [`SqliteTable`] becomes a [`PageSource`]
//! filtered by a [`FilterSet`]; keyset and offset queries share the same
//! condition rendering so the two modes cannot diverge.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteRow, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, FromRow, QueryBuilder, Sqlite, SqlitePool, Type};

use crate::shared::error::Result;
use crate::shared::filter::FilterSet;
use crate::shared::pagination::{Keyed, PageSource, RowKey};

/// A table whose rows can be listed page by page.
pub trait SqliteTable: Send + Sync {
    type Entity: for<'r> FromRow<'r, SqliteRow> + Keyed + Send + Unpin;

    const TABLE: &'static str;
    /// Integer primary key, also the keyset ordering column
    const KEY_COLUMN: &'static str;

    fn pool(&self) -> &SqlitePool;
}

fn select_matching<T: SqliteTable>(filter: &FilterSet) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT * FROM ");
    qb.push(T::TABLE).push(" WHERE 1=1");
    filter.push_conditions(&mut qb);
    qb
}

#[async_trait]
impl<T: SqliteTable> PageSource for T {
    type Item = T::Entity;
    type Filter = FilterSet;

    async fn find_page_after(
        &self,
        after: Option<RowKey>,
        filter: &FilterSet,
        limit: u32,
    ) -> Result<Vec<T::Entity>> {
        let mut qb = select_matching::<T>(filter);
        if let Some(after) = after {
            qb.push(" AND ").push(T::KEY_COLUMN).push(" > ").push_bind(after);
        }
        qb.push(" ORDER BY ").push(T::KEY_COLUMN).push(" ASC LIMIT ");
        qb.push_bind(i64::from(limit));

        let rows = qb.build_query_as::<T::Entity>().fetch_all(self.pool()).await?;
        Ok(rows)
    }

    async fn find_page_at(
        &self,
        offset: u64,
        filter: &FilterSet,
        limit: u32,
    ) -> Result<Vec<T::Entity>> {
        let mut qb = select_matching::<T>(filter);
        qb.push(" ORDER BY ").push(T::KEY_COLUMN).push(" ASC LIMIT ");
        qb.push_bind(i64::from(limit));
        qb.push(" OFFSET ");
        qb.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows = qb.build_query_as::<T::Entity>().fetch_all(self.pool()).await?;
        Ok(rows)
    }

    async fn count_matching(&self, filter: &FilterSet) -> Result<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(T::TABLE).push(" WHERE 1=1");
        filter.push_conditions(&mut qb);

        let count: i64 = qb.build_query_scalar().fetch_one(self.pool()).await?;
        Ok(count.max(0) as u64)
    }
}

/// Every matching row in key order, unpaged.
pub async fn fetch_all_matching<T: SqliteTable>(
    table: &T,
    filter: &FilterSet,
) -> Result<Vec<T::Entity>> {
    let mut qb = select_matching::<T>(filter);
    qb.push(" ORDER BY ").push(T::KEY_COLUMN).push(" ASC");

    let rows = qb.build_query_as::<T::Entity>().fetch_all(table.pool()).await?;
    Ok(rows)
}

/// Current time truncated to what the store keeps.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// An INTEGER epoch-millis column.
///
/// Entities map it with `#[sqlx(try_from = "EpochMillis")]` onto a
/// `DateTime<Utc>` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochMillis(pub DateTime<Utc>);

impl Type<Sqlite> for EpochMillis {
    fn type_info() -> SqliteTypeInfo {
        <i64 as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <i64 as Type<Sqlite>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Sqlite> for EpochMillis {
    fn decode(value: SqliteValueRef<'r>) -> std::result::Result<Self, BoxDynError> {
        let millis = <i64 as Decode<Sqlite>>::decode(value)?;
        DateTime::from_timestamp_millis(millis)
            .map(EpochMillis)
            .ok_or_else(|| format!("invalid epoch millis {millis}").into())
    }
}

impl From<EpochMillis> for DateTime<Utc> {
    fn from(value: EpochMillis) -> Self {
        value.0
    }
}

/// Format an optional date for storage.
pub fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

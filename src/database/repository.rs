use sqlx::postgres::{PgRow, Postgres};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgPool, QueryBuilder};

use crate::database::error::DatabaseError;
use crate::database::models::Entity;

/// A row type that knows how to write itself back to its table
pub trait Columns: Entity + for<'r> FromRow<'r, PgRow> {
    /// Every column, `id` first, in the order `bind_values` pushes them
    const COLUMNS: &'static [&'static str];

    fn bind_values(&self, values: &mut Separated<'_, 'static, Postgres, &'static str>);
}

/// Table access shared by every entity
pub struct Repository<'a, T> {
    pool: &'a PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T: Columns> Repository<'a, T> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self, order: &str) -> Result<Vec<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", T::TABLE, order);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(self.pool).await?)
    }

    /// Rows whose `column` equals `value`
    pub async fn select_where(
        &self,
        column: &str,
        value: &str,
        order: &str,
    ) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY {}",
            T::TABLE,
            column,
            order
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .fetch_all(self.pool)
            .await?)
    }

    pub async fn select_id(&self, id: &str) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    pub async fn insert(&self, row: &T) -> Result<T, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            T::TABLE,
            T::COLUMNS.join(", ")
        ));
        row.bind_values(&mut qb.separated(", "));
        qb.push(") RETURNING *");

        qb.build_query_as::<T>()
            .fetch_one(self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    /// Insert, or on a `conflict` key collision overwrite `update` columns
    /// of the existing row from the new one
    pub async fn upsert(
        &self,
        row: &T,
        conflict: &[&str],
        update: &[&str],
    ) -> Result<T, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            T::TABLE,
            T::COLUMNS.join(", ")
        ));
        row.bind_values(&mut qb.separated(", "));
        let assignments: Vec<String> = update
            .iter()
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect();
        qb.push(format!(
            ") ON CONFLICT ({}) DO UPDATE SET {} RETURNING *",
            conflict.join(", "),
            assignments.join(", ")
        ));

        qb.build_query_as::<T>()
            .fetch_one(self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    /// Overwrite every column of an existing row
    pub async fn save(&self, row: &T) -> Result<Option<T>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "UPDATE {} SET ({}) = (",
            T::TABLE,
            T::COLUMNS.join(", ")
        ));
        row.bind_values(&mut qb.separated(", "));
        qb.push(") WHERE id = ");
        qb.push_bind(row.id().to_string());
        qb.push(" RETURNING *");

        qb.build_query_as::<T>()
            .fetch_optional(self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    /// Delete by id; a missing row is not an error
    pub async fn delete_id(&self, id: &str) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        sqlx::query(&sql)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DatabaseError::from_delete(e, T::LABEL))?;
        Ok(())
    }
}

use crate::error::AppResult;
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection};

/// Product-count lookup owned by the storefront side of the system.
#[async_trait]
pub trait ProductCounter: Send + Sync {
    async fn count_products(&self, user_id: i64) -> AppResult<i64>;
}

/// Counts rows in the storefront's products table.
///
/// The table is not managed by this crate's migrations; its name and owner
/// column come from configuration.
#[derive(Clone)]
pub struct DbProductCounter {
    pool: DatabaseConnection,
    table: String,
    owner_column: String,
}

impl DbProductCounter {
    pub fn new(pool: DatabaseConnection, table: &str, owner_column: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
            owner_column: owner_column.to_string(),
        }
    }
}

#[async_trait]
impl ProductCounter for DbProductCounter {
    async fn count_products(&self, user_id: i64) -> AppResult<i64> {
        let query = Query::select()
            .expr_as(Expr::col(Alias::new(&self.owner_column)).count(), Alias::new("total"))
            .from(Alias::new(&self.table))
            .and_where(Expr::col(Alias::new(&self.owner_column)).eq(user_id))
            .to_owned();
        let backend = self.pool.get_database_backend();
        let row = self.pool.query_one(backend.build(&query)).await?;
        let total = match row {
            Some(row) => row.try_get::<i64>("", "total")?,
            None => 0,
        };
        Ok(total)
    }
}

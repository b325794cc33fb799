use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 部分唯一索引：同一用户最多一条 active 订阅（Postgres 与 SQLite 语法一致）
        let db = manager.get_connection();
        db.execute(Statement::from_string(
            manager.get_database_backend(),
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_user_subscriptions_active \
             ON user_subscriptions (user_id) WHERE status = 'active'"
                .to_string(),
        ))
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute(Statement::from_string(
            manager.get_database_backend(),
            "DROP INDEX IF EXISTS uq_user_subscriptions_active".to_string(),
        ))
        .await?;
        Ok(())
    }
}

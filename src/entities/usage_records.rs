use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 用量统计表实体
/// 说明:
/// - period_month: 自然月 (YYYY-MM)，不是订阅的计费周期
/// - (user_id, period_month) 唯一，首次读写时懒创建
/// - reset 原地清零，不会切换 period_month
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub period_month: String,
    pub messages_received: i32,
    pub posts_created: i32,
    pub current_staff_count: i32,
    pub last_reset_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Plans {
    Table,
    Id,
    Slug,
    Name,
    PriceCents,
    BillingCycle,
    MaxProducts,
    MaxPostsPerMonth,
    MaxMessagesPerMonth,
    MaxStaffUsers,
    HasCustomDomain,
    HasThemeAccess,
    BrandingRemoved,
    IsActive,
    DisplayOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Addons {
    Table,
    Id,
    Slug,
    Name,
    AddonType,
    PriceCents,
    BillingCycle,
    ProvidesQuantity,
    AvailableForPlans,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserSubscriptions {
    Table,
    Id,
    UserId,
    PlanId,
    Status,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CancelAtPeriodEnd,
    CancelledAt,
    NextBillingDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserAddons {
    Table,
    Id,
    UserId,
    AddonId,
    QuantityPurchased,
    Status,
    PurchasedAt,
    NextRenewalDate,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UsageRecords {
    Table,
    Id,
    UserId,
    PeriodMonth,
    MessagesReceived,
    PostsCreated,
    CurrentStaffCount,
    LastResetAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 套餐目录
        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plans::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Plans::Slug).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Plans::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Plans::PriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Plans::BillingCycle).string_len(16).not_null())
                    .col(ColumnDef::new(Plans::MaxProducts).integer().null())
                    .col(ColumnDef::new(Plans::MaxPostsPerMonth).integer().null())
                    .col(ColumnDef::new(Plans::MaxMessagesPerMonth).integer().null())
                    .col(ColumnDef::new(Plans::MaxStaffUsers).integer().not_null())
                    .col(
                        ColumnDef::new(Plans::HasCustomDomain)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Plans::HasThemeAccess)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Plans::BrandingRemoved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Plans::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Plans::DisplayOrder).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Plans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Plans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 增值包目录
        manager
            .create_table(
                Table::create()
                    .table(Addons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addons::Slug).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Addons::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Addons::AddonType).string_len(32).not_null())
                    .col(ColumnDef::new(Addons::PriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Addons::BillingCycle).string_len(16).not_null())
                    .col(ColumnDef::new(Addons::ProvidesQuantity).integer().not_null())
                    .col(ColumnDef::new(Addons::AvailableForPlans).json().not_null())
                    .col(ColumnDef::new(Addons::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Addons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Addons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSubscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSubscriptions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserSubscriptions::PlanId).big_integer().not_null())
                    .col(ColumnDef::new(UserSubscriptions::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(UserSubscriptions::CurrentPeriodStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CurrentPeriodEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CancelAtPeriodEnd)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::NextBillingDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSubscriptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_subscriptions_plan")
                            .from(UserSubscriptions::Table, UserSubscriptions::PlanId)
                            .to(Plans::Table, Plans::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAddons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAddons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAddons::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserAddons::AddonId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserAddons::QuantityPurchased)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(UserAddons::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(UserAddons::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddons::NextRenewalDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserAddons::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserAddons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAddons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_addons_addon")
                            .from(UserAddons::Table, UserAddons::AddonId)
                            .to(Addons::Table, Addons::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UsageRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageRecords::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UsageRecords::PeriodMonth).string_len(7).not_null())
                    .col(
                        ColumnDef::new(UsageRecords::MessagesReceived)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageRecords::PostsCreated)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageRecords::CurrentStaffCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageRecords::LastResetAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UsageRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsageRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_subscriptions_user")
                    .table(UserSubscriptions::Table)
                    .col(UserSubscriptions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_subscriptions_period_end")
                    .table(UserSubscriptions::Table)
                    .col(UserSubscriptions::Status)
                    .col(UserSubscriptions::CurrentPeriodEnd)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_addons_user_status")
                    .table(UserAddons::Table)
                    .col(UserAddons::UserId)
                    .col(UserAddons::Status)
                    .to_owned(),
            )
            .await?;

        // 每个用户每个自然月只有一条用量记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_usage_records_user_period")
                    .table(UsageRecords::Table)
                    .col(UsageRecords::UserId)
                    .col(UsageRecords::PeriodMonth)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(UsageRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(UserAddons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(UserSubscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Addons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Plans::Table).to_owned())
            .await?;
        Ok(())
    }
}

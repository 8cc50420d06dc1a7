use sea_orm_migration::prelude::*;

/// Events (活动；guests 为嵌入的嘉宾条目 JSONB 数组)
#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Name,
    Description,
    Date,
    Location,
    Status,
    Guests,
    RaffleId,
    Version,
    CreatedAt,
    UpdatedAt,
}

/// Raffles (抽奖；prizes / participants 为嵌入的 JSONB 数组)
#[derive(DeriveIden)]
enum Raffles {
    Table,
    Id,
    Name,
    Description,
    EventId,
    Status,
    Prizes,
    Participants,
    CurrentWinner,
    ClaimDeadline,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 文档整体读写：
/// - 每次保存都带 version 条件（乐观并发）
/// - current_winner 只能通过 "IS NULL" 条件更新写入
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Events::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Events::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::Location).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Events::Status)
                            .string_len(16)
                            .not_null()
                            .default("upcoming"),
                    )
                    .col(
                        ColumnDef::new(Events::Guests)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Events::RaffleId).uuid().null())
                    .col(
                        ColumnDef::new(Events::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Raffles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Raffles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Raffles::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Raffles::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Raffles::EventId).uuid().null())
                    .col(
                        ColumnDef::new(Raffles::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Raffles::Prizes)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Raffles::Participants)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Raffles::CurrentWinner).uuid().null())
                    .col(
                        ColumnDef::new(Raffles::ClaimDeadline)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Raffles::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Raffles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Raffles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 后台清理任务按截止时间扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_raffles_claim_deadline")
                    .table(Raffles::Table)
                    .col(Raffles::ClaimDeadline)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_raffles_event_id")
                    .table(Raffles::Table)
                    .col(Raffles::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Raffles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Events::Table).to_owned())
            .await?;
        Ok(())
    }
}

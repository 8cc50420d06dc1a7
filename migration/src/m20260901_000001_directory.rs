use sea_orm_migration::prelude::*;

/// Employees (员工档案)
#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    EmployeeCode,
    Name,
    Email,
    Department,
    Position,
    JoinDate,
    Status,
    RaffleEligible,
    RaffleExclusionReason,
    CreatedAt,
    UpdatedAt,
}

/// Guests (活动嘉宾，员工或外部人员)
#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Organization,
    GuestType,
    EmployeeId,
    CreatedAt,
    UpdatedAt,
}

/// Module configs (模块设置，settings 为带类型标签的 JSONB 数组)
#[derive(DeriveIden)]
enum ModuleConfigs {
    Table,
    ModuleId,
    Settings,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Employees::EmployeeCode)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Employees::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Employees::Department)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::Position).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::JoinDate).date().not_null())
                    .col(
                        ColumnDef::new(Employees::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Employees::RaffleEligible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Employees::RaffleExclusionReason).text().null())
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Employees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 工号、邮箱唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employees_code_unique")
                    .table(Employees::Table)
                    .col(Employees::EmployeeCode)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employees_email_unique")
                    .table(Employees::Table)
                    .col(Employees::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employees_department")
                    .table(Employees::Table)
                    .col(Employees::Department)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Guests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Guests::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Guests::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Guests::Phone).string_len(32).null())
                    .col(ColumnDef::new(Guests::Organization).string_len(255).null())
                    .col(ColumnDef::new(Guests::GuestType).string_len(16).not_null())
                    .col(ColumnDef::new(Guests::EmployeeId).uuid().null())
                    .col(
                        ColumnDef::new(Guests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Guests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 嘉宾按邮箱 upsert
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_guests_email_unique")
                    .table(Guests::Table)
                    .col(Guests::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ModuleConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModuleConfigs::ModuleId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ModuleConfigs::Settings)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ModuleConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(ModuleConfigs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Guests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Employees::Table).to_owned())
            .await?;
        Ok(())
    }
}

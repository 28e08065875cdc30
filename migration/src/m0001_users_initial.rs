use sea_orm_migration::{prelude::*, schema::*};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "users::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_len(User::Username, 150).not_null().unique_key())
                    .col(string_len(User::Email, 254).not_null().unique_key())
                    .col(string_len(User::Password, 128).not_null())
                    .col(string_len(User::Role, 20).not_null().default("cliente"))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(User::DateJoined)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    #[sea_orm(iden = "users_user")]
    Table,
    Id,
    Username,
    Email,
    Password,
    Role,
    IsActive,
    DateJoined,
}

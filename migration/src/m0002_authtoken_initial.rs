use sea_orm_migration::{prelude::*, schema::*};

use crate::m0001_users_initial::User;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "authtoken::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Token::Table)
                    .if_not_exists()
                    .col(char_len(Token::Key, 40).primary_key())
                    .col(integer(Token::UserId).not_null().unique_key())
                    .col(
                        timestamp_with_time_zone(Token::Created)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_authtoken_token_user")
                            .from(Token::Table, Token::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Token::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Token {
    #[sea_orm(iden = "authtoken_token")]
    Table,
    Key,
    UserId,
    Created,
}

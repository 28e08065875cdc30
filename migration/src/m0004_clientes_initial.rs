use sea_orm_migration::{prelude::*, schema::*};

use crate::m0001_users_initial::User;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "clientes::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cliente::Table)
                    .if_not_exists()
                    .col(pk_auto(Cliente::Id))
                    .col(integer(Cliente::UserId).not_null().unique_key())
                    .col(string_len(Cliente::NombreCompleto, 200).not_null())
                    .col(string_len_null(Cliente::Telefono, 30))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clientes_cliente_user")
                            .from(Cliente::Table, Cliente::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cliente::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Cliente {
    #[sea_orm(iden = "clientes_cliente")]
    Table,
    Id,
    UserId,
    NombreCompleto,
    Telefono,
}

use sea_orm_migration::{prelude::*, schema::*};

use crate::m0001_users_initial::User;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "empleados::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Empleado::Table)
                    .if_not_exists()
                    .col(pk_auto(Empleado::Id))
                    .col(integer(Empleado::UserId).not_null().unique_key())
                    .col(string_len(Empleado::Especialidad, 30).not_null())
                    .col(boolean(Empleado::Activo).not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_empleados_empleado_user")
                            .from(Empleado::Table, Empleado::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Empleado::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Empleado {
    #[sea_orm(iden = "empleados_empleado")]
    Table,
    Id,
    UserId,
    Especialidad,
    Activo,
}

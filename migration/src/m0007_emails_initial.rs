use sea_orm_migration::{prelude::*, schema::*};

use crate::m0001_users_initial::User;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "emails::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NotificacionConfig::Table)
                    .if_not_exists()
                    .col(pk_auto(NotificacionConfig::Id))
                    .col(integer(NotificacionConfig::UserId).not_null().unique_key())
                    .col(boolean(NotificacionConfig::TurnoCreado).not_null().default(true))
                    .col(boolean(NotificacionConfig::TurnoConfirmado).not_null().default(true))
                    .col(boolean(NotificacionConfig::TurnoCancelado).not_null().default(true))
                    .col(boolean(NotificacionConfig::TurnoReasignado).not_null().default(true))
                    .col(boolean(NotificacionConfig::Recordatorio).not_null().default(true))
                    .col(boolean(NotificacionConfig::Encuesta).not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emails_notificacionconfig_user")
                            .from(NotificacionConfig::Table, NotificacionConfig::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notificacion::Table)
                    .if_not_exists()
                    .col(pk_auto(Notificacion::Id))
                    .col(integer(Notificacion::UserId).not_null())
                    .col(string_len(Notificacion::Tipo, 30).not_null())
                    .col(string_len(Notificacion::Titulo, 200).not_null())
                    .col(text(Notificacion::Mensaje).not_null())
                    .col(boolean(Notificacion::Leida).not_null().default(false))
                    .col(timestamp_with_time_zone_null(Notificacion::LeidaAt))
                    .col(
                        timestamp_with_time_zone(Notificacion::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emails_notificacion_user")
                            .from(Notificacion::Table, Notificacion::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notificacion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificacionConfig::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum NotificacionConfig {
    #[sea_orm(iden = "emails_notificacionconfig")]
    Table,
    Id,
    UserId,
    TurnoCreado,
    TurnoConfirmado,
    TurnoCancelado,
    TurnoReasignado,
    Recordatorio,
    Encuesta,
}

#[derive(DeriveIden)]
enum Notificacion {
    #[sea_orm(iden = "emails_notificacion")]
    Table,
    Id,
    UserId,
    Tipo,
    Titulo,
    Mensaje,
    Leida,
    LeidaAt,
    CreatedAt,
}

use sea_orm_migration::{prelude::*, schema::*};

use crate::m0004_clientes_initial::Cliente;
use crate::m0006_turnos_initial::Turno;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "encuestas::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Encuesta::Table)
                    .if_not_exists()
                    .col(pk_auto(Encuesta::Id))
                    .col(integer(Encuesta::TurnoId).not_null().unique_key())
                    .col(integer(Encuesta::ClienteId).not_null())
                    .col(integer_null(Encuesta::Puntuacion))
                    .col(text_null(Encuesta::Comentario))
                    .col(timestamp_with_time_zone_null(Encuesta::RespondidaAt))
                    .col(
                        timestamp_with_time_zone(Encuesta::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_encuestas_encuesta_turno")
                            .from(Encuesta::Table, Encuesta::TurnoId)
                            .to(Turno::Table, Turno::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_encuestas_encuesta_cliente")
                            .from(Encuesta::Table, Encuesta::ClienteId)
                            .to(Cliente::Table, Cliente::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Encuesta::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Encuesta {
    #[sea_orm(iden = "encuestas_encuesta")]
    Table,
    Id,
    TurnoId,
    ClienteId,
    Puntuacion,
    Comentario,
    RespondidaAt,
    CreatedAt,
}

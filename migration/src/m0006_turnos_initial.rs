use sea_orm_migration::{prelude::*, schema::*};

use crate::m0003_servicios_initial::Servicio;
use crate::m0004_clientes_initial::Cliente;
use crate::m0005_empleados_initial::Empleado;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "turnos::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Turno::Table)
                    .if_not_exists()
                    .col(pk_auto(Turno::Id))
                    .col(integer(Turno::ClienteId).not_null())
                    .col(integer(Turno::EmpleadoId).not_null())
                    .col(integer(Turno::ServicioId).not_null())
                    .col(timestamp_with_time_zone(Turno::FechaHora).not_null())
                    .col(string_len(Turno::Estado, 20).not_null().default("pendiente"))
                    .col(double(Turno::PrecioFinal).not_null())
                    .col(text_null(Turno::NotasCliente))
                    .col(
                        timestamp_with_time_zone(Turno::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_turnos_turno_cliente")
                            .from(Turno::Table, Turno::ClienteId)
                            .to(Cliente::Table, Cliente::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_turnos_turno_empleado")
                            .from(Turno::Table, Turno::EmpleadoId)
                            .to(Empleado::Table, Empleado::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_turnos_turno_servicio")
                            .from(Turno::Table, Turno::ServicioId)
                            .to(Servicio::Table, Servicio::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_turnos_turno_empleado_fecha")
                    .table(Turno::Table)
                    .col(Turno::EmpleadoId)
                    .col(Turno::FechaHora)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Turno::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Turno {
    #[sea_orm(iden = "turnos_turno")]
    Table,
    Id,
    ClienteId,
    EmpleadoId,
    ServicioId,
    FechaHora,
    Estado,
    PrecioFinal,
    NotasCliente,
    CreatedAt,
}

use sea_orm_migration::{prelude::*, schema::*};

use crate::m0003_servicios_initial::Servicio;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "servicios::m0002_servicio_descuento_reasignacion"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Servicio::Table)
                    .add_column(
                        double(Alias::new("descuento_reasignacion"))
                            .not_null()
                            .default(0.0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Servicio::Table)
                    .drop_column(Alias::new("descuento_reasignacion"))
                    .to_owned(),
            )
            .await
    }
}

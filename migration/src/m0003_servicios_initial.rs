use sea_orm_migration::{prelude::*, schema::*};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "servicios::m0001_initial"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CategoriaServicio::Table)
                    .if_not_exists()
                    .col(pk_auto(CategoriaServicio::Id))
                    .col(string_len(CategoriaServicio::Nombre, 100).not_null().unique_key())
                    .col(text_null(CategoriaServicio::Descripcion))
                    .to_owned(),
            )
            .await?;

        // Prices are stored as REAL so SQLite keeps a float affinity for them.
        manager
            .create_table(
                Table::create()
                    .table(Servicio::Table)
                    .if_not_exists()
                    .col(pk_auto(Servicio::Id))
                    .col(string_len(Servicio::Nombre, 100).not_null())
                    .col(double(Servicio::Precio).not_null())
                    .col(integer(Servicio::DuracionMinutos).not_null().default(30))
                    .col(boolean(Servicio::Activo).not_null().default(true))
                    .col(integer(Servicio::CategoriaId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_servicios_servicio_categoria")
                            .from(Servicio::Table, Servicio::CategoriaId)
                            .to(CategoriaServicio::Table, CategoriaServicio::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Servicio::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoriaServicio::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CategoriaServicio {
    #[sea_orm(iden = "servicios_categoriaservicio")]
    Table,
    Id,
    Nombre,
    Descripcion,
}

#[derive(DeriveIden)]
pub enum Servicio {
    #[sea_orm(iden = "servicios_servicio")]
    Table,
    Id,
    Nombre,
    Precio,
    DuracionMinutos,
    Activo,
    CategoriaId,
}

use sea_orm_migration::prelude::*;

/// One table holds every collection; rows are addressed by
/// `(collection, partition_key, sort_key)`.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Documents {
    Table,
    Collection,
    PartitionKey,
    SortKey,
    Body,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Collection).text().not_null())
                    .col(ColumnDef::new(Documents::PartitionKey).text().not_null())
                    .col(ColumnDef::new(Documents::SortKey).text().not_null())
                    .col(ColumnDef::new(Documents::Body).json_binary().not_null())
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Documents::Collection)
                            .col(Documents::PartitionKey)
                            .col(Documents::SortKey),
                    )
                    .to_owned(),
            )
            .await?;

        // Newest-first scans walk the key columns in reverse.
        manager
            .create_index(
                Index::create()
                    .name("idx_documents_scan")
                    .table(Documents::Table)
                    .col((Documents::Collection, IndexOrder::Asc))
                    .col((Documents::PartitionKey, IndexOrder::Desc))
                    .col((Documents::SortKey, IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

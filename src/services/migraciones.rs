//! Repairs of the migration tracking table.
//!
//! Every migration version is `<app>::<name>`. These operations only touch the
//! bookkeeping rows; none of them runs or reverts schema changes, except
//! [`apply_with_fallback`] which first tries a normal run.

use std::collections::HashSet;

use chrono::Utc;
use migration::{app_label, initial_tables, MigrationName, Migrator, MigratorTrait, APP_SEPARATOR};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use sea_orm_migration::{seaql_migrations, SchemaManager};
use serde::Serialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    /// Rows under the old app before the rename.
    pub before: usize,
    /// Rows now tracked under the new app. Always equals `before`.
    pub renamed: u64,
    /// Part of `renamed`: old rows dropped because the new app already
    /// tracked the same migration.
    pub merged: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub version: String,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub migrations: Vec<MigrationStatus>,
    /// Tracking rows with no migration of that name.
    pub orphans: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrateOutcome {
    Applied,
    FakedAfterError {
        error: String,
        version: String,
        inserted: u64,
    },
}

pub fn known_versions() -> Vec<String> {
    Migrator::migrations()
        .iter()
        .map(|m| m.name().to_string())
        .collect()
}

async fn tracked_versions(db: &DatabaseConnection) -> AppResult<Vec<String>> {
    Migrator::install(db).await?;
    Ok(seaql_migrations::Entity::find()
        .order_by_asc(seaql_migrations::Column::Version)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect())
}

fn validate_app(name: &str) -> AppResult<()> {
    if name.trim().is_empty() || name.contains(APP_SEPARATOR) {
        return Err(AppError::BadRequest(format!("Invalid app label '{}'", name)));
    }
    Ok(())
}

pub async fn status(db: &DatabaseConnection) -> AppResult<StatusReport> {
    let tracked: HashSet<String> = tracked_versions(db).await?.into_iter().collect();
    let known = known_versions();

    let migrations = known
        .iter()
        .map(|version| MigrationStatus {
            version: version.clone(),
            applied: tracked.contains(version),
        })
        .collect();

    let known: HashSet<&String> = known.iter().collect();
    let mut orphans: Vec<String> = tracked.iter().filter(|v| !known.contains(v)).cloned().collect();
    orphans.sort();

    Ok(StatusReport { migrations, orphans })
}

/// Move every tracking row of app `from` to app `to`.
pub async fn rename_app(db: &DatabaseConnection, from: &str, to: &str) -> AppResult<RenameOutcome> {
    validate_app(from)?;
    validate_app(to)?;
    if from == to {
        return Err(AppError::BadRequest("Source and target app are the same".to_string()));
    }

    let tracked = tracked_versions(db).await?;
    let existing: HashSet<&String> = tracked.iter().collect();
    let old_rows: Vec<&String> = tracked
        .iter()
        .filter(|v| v.contains(APP_SEPARATOR) && app_label(v) == from)
        .collect();

    let mut outcome = RenameOutcome {
        before: old_rows.len(),
        renamed: 0,
        merged: 0,
    };

    for old in old_rows {
        let rest = &old[from.len() + APP_SEPARATOR.len()..];
        let new_version = format!("{}{}{}", to, APP_SEPARATOR, rest);

        if existing.contains(&new_version) {
            let result = seaql_migrations::Entity::delete_by_id(old.clone())
                .exec(db)
                .await?;
            outcome.merged += result.rows_affected;
            outcome.renamed += result.rows_affected;
            continue;
        }

        let result = seaql_migrations::Entity::update_many()
            .col_expr(seaql_migrations::Column::Version, Expr::value(new_version))
            .filter(seaql_migrations::Column::Version.eq(old.as_str()))
            .exec(db)
            .await?;
        outcome.renamed += result.rows_affected;
    }

    tracing::info!(
        from,
        to,
        before = outcome.before,
        renamed = outcome.renamed,
        merged = outcome.merged,
        "Migration app renamed"
    );
    Ok(outcome)
}

/// Record `version` as applied without running it. Returns 1 when a row was
/// inserted and 0 when it was already tracked.
pub async fn fake_apply(db: &DatabaseConnection, version: &str) -> AppResult<u64> {
    if !known_versions().iter().any(|v| v == version) {
        return Err(AppError::BadRequest(format!("Unknown migration '{}'", version)));
    }
    Migrator::install(db).await?;

    let row = seaql_migrations::ActiveModel {
        version: Set(version.to_string()),
        applied_at: Set(Utc::now().timestamp()),
    };
    let inserted = seaql_migrations::Entity::insert(row)
        .on_conflict(
            OnConflict::column(seaql_migrations::Column::Version)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    tracing::info!(version, inserted, "Migration faked");
    Ok(inserted)
}

/// Fake every pending initial migration whose tables already exist.
/// Returns the versions that were marked applied.
pub async fn fake_initial(db: &DatabaseConnection) -> AppResult<Vec<String>> {
    let tracked: HashSet<String> = tracked_versions(db).await?.into_iter().collect();
    let manager = SchemaManager::new(db);

    let mut faked = Vec::new();
    for version in known_versions() {
        let tables = initial_tables(&version);
        if tables.is_empty() || tracked.contains(&version) {
            continue;
        }

        let mut all_exist = true;
        for table in tables {
            if !manager.has_table(*table).await? {
                all_exist = false;
                break;
            }
        }
        if !all_exist {
            continue;
        }

        if fake_apply(db, &version).await? > 0 {
            faked.push(version);
        }
    }
    Ok(faked)
}

/// Run pending migrations. If that fails and a `fallback` version is given,
/// report the error and mark `fallback` applied instead. No retry, no rollback.
pub async fn apply_with_fallback(
    db: &DatabaseConnection,
    fallback: Option<&str>,
) -> AppResult<MigrateOutcome> {
    match Migrator::up(db, None).await {
        Ok(()) => Ok(MigrateOutcome::Applied),
        Err(e) => {
            tracing::warn!(error = %e, "Migration run failed");
            let Some(version) = fallback else {
                return Err(e.into());
            };
            let inserted = fake_apply(db, version).await?;
            Ok(MigrateOutcome::FakedAfterError {
                error: e.to_string(),
                version: version.to_string(),
                inserted,
            })
        }
    }
}

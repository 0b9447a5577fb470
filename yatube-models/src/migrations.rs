use crate::{Connection, Error, Result};
use diesel::connection::{Connection as Conn, SimpleConnection};
use migrations_internals::{setup_database, MigrationConnection};
use tracing::info;

/// One embedded migration, named after its version.
pub struct Migration {
    name: &'static str,
    up: &'static str,
    down: &'static str,
}

impl Migration {
    fn run(&self, conn: &Connection) -> Result<()> {
        info!("Running migration {}", self.name);
        conn.batch_execute(self.up).map_err(Error::from)
    }

    fn revert(&self, conn: &Connection) -> Result<()> {
        info!("Reverting migration {}", self.name);
        conn.batch_execute(self.down).map_err(Error::from)
    }
}

/// Migrations sorted by version, embedded at compile time.
pub struct ImportedMigrations(&'static [Migration]);

impl ImportedMigrations {
    pub fn run_pending_migrations(&self, conn: &Connection) -> Result<()> {
        use diesel::dsl::sql;
        use diesel::sql_types::Bool;
        use diesel::{select, RunQueryDsl};
        #[cfg(feature = "postgres")]
        let schema_exists: bool = select(sql::<Bool>(
            "EXISTS \
             (SELECT 1 \
             FROM information_schema.tables \
             WHERE table_name = '__diesel_schema_migrations')",
        ))
        .get_result(conn)?;
        #[cfg(feature = "sqlite")]
        let schema_exists: bool = select(sql::<Bool>(
            "EXISTS \
             (SELECT 1 \
             FROM sqlite_master \
             WHERE type = 'table' \
             AND name = '__diesel_schema_migrations')",
        ))
        .get_result(conn)?;

        if !schema_exists {
            setup_database(conn)?;
        }

        let first_pending = self.first_pending(conn)?;
        for migration in &self.0[first_pending..] {
            conn.transaction(|| {
                migration.run(conn)?;
                conn.insert_new_migration(migration.name)
                    .map_err(Error::from)
            })?;
        }
        Ok(())
    }

    pub fn is_pending(&self, conn: &Connection) -> Result<bool> {
        let latest_migration = conn.latest_run_migration_version()?;
        match (latest_migration, self.0.last()) {
            (Some(migration), Some(last)) => Ok(last.name != migration),
            (None, Some(_)) => Ok(true),
            (_, None) => Ok(false),
        }
    }

    pub fn rerun_last_migration(&self, conn: &Connection) -> Result<()> {
        let latest_migration = conn
            .latest_run_migration_version()?
            .ok_or(Error::NotFound)?;
        let id = self
            .0
            .binary_search_by_key(&latest_migration.as_str(), |m| m.name)
            .map_err(|_| Error::NotFound)?;
        let migration = &self.0[id];
        conn.transaction(|| {
            migration.revert(conn)?;
            migration.run(conn)
        })
    }

    /// Index of the first migration that was never run.
    fn first_pending(&self, conn: &Connection) -> Result<usize> {
        match conn.latest_run_migration_version()? {
            Some(migration) => self
                .0
                .binary_search_by_key(&migration.as_str(), |mig| mig.name)
                .map(|id| id + 1)
                .map_err(|_| Error::NotFound),
            None => Ok(0),
        }
    }
}

pub const IMPORTED_MIGRATIONS: ImportedMigrations = {
    import_migrations! {}
};

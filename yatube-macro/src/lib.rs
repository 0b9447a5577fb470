#![recursion_limit = "128"]

#[macro_use]
extern crate quote;

use proc_macro::TokenStream;
use std::fs::{read_dir, read_to_string};
use std::path::{Path, PathBuf};

/// Embeds every migration of the selected backend into the binary.
///
/// Expands to an `ImportedMigrations` value, so it must be invoked where
/// `ImportedMigrations` and `Migration` are in scope.
#[proc_macro]
pub fn import_migrations(input: TokenStream) -> TokenStream {
    assert!(input.is_empty());
    let migration_dir = if cfg!(feature = "postgres") {
        "migrations/postgres"
    } else if cfg!(feature = "sqlite") {
        "migrations/sqlite"
    } else {
        "migrations"
    };
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .find(|path| path.join(migration_dir).is_dir() || path.join(".git").exists())
        .expect("migrations dir not found")
        .join(migration_dir);

    let mut dirs = read_dir(root)
        .expect("migrations dir is not readable")
        .map(|entry| entry.expect("invalid migrations dir entry"))
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    dirs.sort_unstable();

    let migrations = dirs.iter().map(read_migration).collect::<Vec<_>>();
    let names = migrations.iter().map(|m| &m.0);
    let ups = migrations.iter().map(|m| strip_comments(&m.1));
    let downs = migrations.iter().map(|m| strip_comments(&m.2));

    quote!(
        ImportedMigrations(
            &[#(Migration { name: #names, up: #ups, down: #downs }),*]
        )
    )
    .into()
}

/// Migration version: the first 14 digits of the directory name
/// (`2022-08-01-000001_create_users` gives `20220801000001`).
fn read_migration(dir: &PathBuf) -> (String, String, String) {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .expect("migration dir name is not valid UTF-8")
        .chars()
        .filter(char::is_ascii_digit)
        .take(14)
        .collect::<String>();
    let up = read_to_string(dir.join("up.sql")).expect("up.sql is missing");
    let down = read_to_string(dir.join("down.sql")).expect("down.sql is missing");
    (name, up, down)
}

fn strip_comments(sql: &str) -> String {
    sql.lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
}

use clap::{App, ArgMatches, SubCommand};
use yatube_models::{migrations::IMPORTED_MIGRATIONS, Connection};

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("migration")
        .about("Manage migrations")
        .subcommand(SubCommand::with_name("run").about("Run pending migrations"))
        .subcommand(SubCommand::with_name("redo").about("Rerun latest migration"))
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    match args.subcommand() {
        ("run", Some(_)) => {
            IMPORTED_MIGRATIONS
                .run_pending_migrations(conn)
                .expect("Failed to run migrations");
            println!("Database is up to date");
        }
        ("redo", Some(_)) => IMPORTED_MIGRATIONS
            .rerun_last_migration(conn)
            .expect("Failed to rerun migrations"),
        ("", None) => command().print_help().expect("Couldn't print help"),
        _ => println!("Unknown subcommand"),
    }
}

use clap::{App, Arg, ArgMatches, SubCommand};
use yatube_models::{
    groups::{Group, NewGroup, TITLE_MAX_LENGTH},
    Connection, Error,
};

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("groups")
        .about("Manage groups")
        .subcommand(
            SubCommand::with_name("new")
                .arg(
                    Arg::with_name("title")
                        .short("t")
                        .long("title")
                        .takes_value(true)
                        .help("The title of the group"),
                )
                .arg(
                    Arg::with_name("slug")
                        .short("s")
                        .long("slug")
                        .takes_value(true)
                        .help("The slug used in the group's URL"),
                )
                .arg(
                    Arg::with_name("description")
                        .short("d")
                        .long("description")
                        .takes_value(true)
                        .help("What the group is about"),
                )
                .about("Create a new group"),
        )
        .subcommand(SubCommand::with_name("list").about("List all groups"))
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    match args.subcommand() {
        ("new", Some(x)) => new(x, conn),
        ("list", Some(_)) => list(conn),
        ("", None) => command().print_help().expect("Couldn't print help"),
        _ => println!("Unknown subcommand"),
    }
}

fn new<'a>(args: &ArgMatches<'a>, conn: &Connection) {
    let title = args
        .value_of("title")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Title"));
    let slug = args
        .value_of("slug")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Slug"));
    let description = args
        .value_of("description")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Description"));

    let group = match NewGroup::new(&title, &slug, &description) {
        Ok(group) => group,
        Err(_) => {
            eprintln!(
                "Invalid group: the title must be 1 to {} characters long \
                 and the slug may only contain letters, digits, - and _",
                TITLE_MAX_LENGTH
            );
            return;
        }
    };
    match Group::insert(conn, group) {
        Ok(group) => println!("Created group {} (/group/{}/)", group.title, group.slug),
        Err(Error::Db(e)) => eprintln!("Couldn't save the group, is the slug taken? ({})", e),
        Err(e) => eprintln!("Couldn't save the group: {}", e),
    }
}

fn list(conn: &Connection) {
    for group in Group::list(conn).expect("Couldn't list groups") {
        println!("{}\t{}", group.slug, group.title);
    }
}

#![allow(clippy::too_many_arguments)]
#![feature(decl_macro, proc_macro_hygiene)]

#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

use diesel::r2d2::ConnectionManager;
use rocket::Rocket;
use std::process::exit;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use yatube_models::{
    db_conn::{DbPool, PragmaForeignKey},
    migrations::IMPORTED_MIGRATIONS,
    Connection, CONFIG,
};

#[macro_use]
mod template_utils;
mod cache;
mod routes;
mod templates;
mod uploads;
mod utils;

#[cfg(all(test, feature = "sqlite"))]
mod tests;

use cache::PageCache;
use uploads::MediaStore;

/// Initializes a database pool.
fn init_pool() -> Option<DbPool> {
    let manager = ConnectionManager::<Connection>::new(CONFIG.database_url.as_str());
    let mut builder = DbPool::builder()
        .connection_customizer(Box::new(PragmaForeignKey))
        .min_idle(CONFIG.db_min_idle);
    if let Some(max_size) = CONFIG.db_max_size {
        builder = builder.max_size(max_size);
    };
    builder.build(manager).ok()
}

/// Builds the application around an existing pool, page cache and media store.
pub(crate) fn init_rocket(
    config: rocket::Config,
    dbpool: DbPool,
    cache: PageCache,
    media: MediaStore,
) -> Rocket {
    rocket::custom(config)
        .mount(
            "/",
            routes![
                routes::posts::index,
                routes::posts::details,
                routes::posts::new,
                routes::posts::new_auth,
                routes::posts::create,
                routes::posts::create_auth,
                routes::posts::edit,
                routes::posts::edit_auth,
                routes::posts::update,
                routes::posts::update_auth,
                routes::groups::details,
                routes::comments::create,
                routes::comments::create_auth,
                routes::comments::redirect,
                routes::comments::redirect_auth,
                routes::user::details,
                routes::user::follow,
                routes::user::follow_auth,
                routes::user::follow_post,
                routes::user::follow_post_auth,
                routes::user::unfollow,
                routes::user::unfollow_auth,
                routes::user::unfollow_post,
                routes::user::unfollow_post_auth,
                routes::user::feed,
                routes::user::feed_auth,
                routes::session::new,
                routes::session::create,
                routes::session::delete,
                routes::session::signup,
                routes::session::signup_create,
            ],
        )
        .register(catchers![
            routes::errors::not_found,
            routes::errors::unprocessable_entity,
            routes::errors::server_error,
        ])
        .manage(dbpool)
        .manage(cache)
        .manage(media)
}

fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dbpool = init_pool().expect("main: database pool initialization error");
    let pending = dbpool
        .get()
        .map_err(|e| e.to_string())
        .and_then(|conn| IMPORTED_MIGRATIONS.is_pending(&conn).map_err(|e| e.to_string()));
    match pending {
        Ok(false) => {}
        Ok(true) => {
            error!("The database is not up to date. Run `ytb migration run` first.");
            exit(1);
        }
        Err(e) => {
            error!("Couldn't check the database state: {}", e);
            exit(1);
        }
    }

    let config = match CONFIG.rocket.clone() {
        Ok(config) => config,
        Err(e) => {
            error!(
                "Invalid server configuration ({:?}). Check ROCKET_ADDRESS, ROCKET_PORT and ROCKET_SECRET_KEY.",
                e
            );
            exit(1);
        }
    };
    if CONFIG.index_cache_ttl.as_secs() == 0 {
        warn!("INDEX_CACHE_TTL is 0, the index page won't be cached");
    }
    info!("Serving Yatube on {}", CONFIG.base_url);

    let cache = PageCache::new(CONFIG.index_cache_ttl);
    let media = MediaStore::new(&CONFIG.media_directory);
    init_rocket(config, dbpool, cache, media).launch();
}

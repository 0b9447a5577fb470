use crate::{cache::PageCache, init_rocket, uploads::MediaStore};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use guid_create::GUID;
use rocket::{
    config::{Environment, LoggingLevel},
    http::{ContentType, Cookie, Status},
    local::{Client, LocalRequest, LocalResponse},
};
use serde_json::Value;
use std::{env::temp_dir, fs, path::PathBuf, time::Duration};
use yatube_models::{
    config::limits,
    db_conn::{DbPool, PragmaForeignKey},
    groups::{Group, NewGroup},
    migrations::IMPORTED_MIGRATIONS,
    posts::{NewPost, Post},
    users::{NewUser, User, AUTH_COOKIE},
    Connection,
};


pub(crate) const BOUNDARY: &str = "yatube-test-boundary";

/// A full application over a throwaway SQLite database and media directory.
pub(crate) struct TestApp {
    pub client: Client,
    pub pool: DbPool,
    dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = temp_dir().join(format!("yatube-test-{}", GUID::rand()));
        fs::create_dir_all(&dir).expect("Couldn't create the test directory");
        let manager = ConnectionManager::<Connection>::new(
            dir.join("db.sqlite").to_string_lossy().into_owned(),
        );
        let pool = DbPool::builder()
            .max_size(4)
            .connection_customizer(Box::new(PragmaForeignKey))
            .build(manager)
            .expect("Couldn't build the test pool");
        IMPORTED_MIGRATIONS
            .run_pending_migrations(&pool.get().expect("Couldn't get a connection"))
            .expect("Couldn't run migrations");

        let config = rocket::Config::build(Environment::Development)
            .limits(limits())
            .log_level(LoggingLevel::Off)
            .finalize()
            .expect("Invalid test configuration");
        let rocket = init_rocket(
            config,
            pool.clone(),
            PageCache::new(Duration::from_secs(60)),
            MediaStore::new(dir.join("media")),
        );
        let client = Client::new(rocket).expect("Invalid rocket instance");
        TestApp { client, pool, dir }
    }

    pub fn conn(&self) -> PooledConnection<ConnectionManager<Connection>> {
        self.pool.get().expect("Couldn't get a connection")
    }

    pub fn cache(&self) -> &PageCache {
        self.client
            .rocket()
            .state::<PageCache>()
            .expect("The page cache is not managed")
    }

    pub fn media_root(&self) -> PathBuf {
        self.dir.join("media")
    }

    pub fn get(&self, uri: &str) -> LocalRequest<'_> {
        self.client.get(uri.to_owned())
    }

    pub fn post(&self, uri: &str, body: &str) -> LocalRequest<'_> {
        self.client
            .post(uri.to_owned())
            .header(ContentType::Form)
            .body(body.to_owned())
    }

    pub fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> LocalRequest<'_> {
        self.client
            .post(uri.to_owned())
            .header(ContentType::with_params(
                "multipart",
                "form-data",
                ("boundary", BOUNDARY),
            ))
            .body(multipart_body(fields, file))
    }

    /// Fills the database with the same small world for every test.
    pub fn fixtures(&self) -> Fixtures {
        let conn = self.conn();
        let new_user = |name: &str| {
            NewUser::new_local(
                &conn,
                name.to_owned(),
                String::new(),
                format!("{}@example.com", name),
                None,
            )
            .expect("Couldn't create user")
        };
        let author = new_user("auth");
        let other = new_user("other");
        let follower = new_user("follower");
        let group = Group::insert(
            &conn,
            NewGroup::new("Test group", "test-slug", "Test description")
                .expect("Invalid group"),
        )
        .expect("Couldn't create group");
        let other_group = Group::insert(
            &conn,
            NewGroup::new("Other group", "other-slug", "Another description")
                .expect("Invalid group"),
        )
        .expect("Couldn't create group");
        let post = new_post(&conn, "Test post", &author, Some(&group));
        Fixtures {
            author,
            other,
            follower,
            group,
            other_group,
            post,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

pub(crate) struct Fixtures {
    pub author: User,
    pub other: User,
    pub follower: User,
    pub group: Group,
    pub other_group: Group,
    pub post: Post,
}

pub(crate) fn new_post(conn: &Connection, text: &str, author: &User, group: Option<&Group>) -> Post {
    Post::insert(
        conn,
        NewPost {
            text: text.to_owned(),
            author_id: author.id,
            group_id: group.map(|g| g.id),
            image: None,
        },
    )
    .expect("Couldn't create post")
}

pub(crate) fn logged_in<'c>(req: LocalRequest<'c>, user: &User) -> LocalRequest<'c> {
    req.private_cookie(Cookie::new(AUTH_COOKIE, user.id.to_string()))
}

pub(crate) fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/gif\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub(crate) fn json_body(response: &mut LocalResponse<'_>) -> Value {
    assert_eq!(response.status(), Status::Ok);
    let body = response.body_string().expect("Empty response");
    serde_json::from_str(&body).expect("The page is not valid JSON")
}

pub(crate) fn location(response: &LocalResponse<'_>) -> Option<String> {
    response.headers().get_one("Location").map(str::to_owned)
}

/// Texts of the posts listed in a page context.
pub(crate) fn listed_texts(page: &Value) -> Vec<String> {
    page["page_obj"]["object_list"]
        .as_array()
        .expect("No post list in the page")
        .iter()
        .filter_map(|p| p["text"].as_str().map(str::to_owned))
        .collect()
}

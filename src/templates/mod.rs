//! Page contexts.
//!
//! Every page is a JSON object naming its template, the viewer, and the
//! values a template for that page would receive.

use crate::template_utils::BaseContext;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::io;
use yatube_models::{
    comments::Comment, groups::Group, posts::Post, users::User, Connection, Result,
};

pub mod errors;
pub mod groups;
pub mod posts;
pub mod session;
pub mod users;

fn write_page(
    out: &mut Vec<u8>,
    ctx: BaseContext<'_>,
    template: &str,
    context: Value,
) -> io::Result<()> {
    let mut page = json!({
        "template": template,
        "user": ctx.as_ref().map(UserCard::from),
    });
    if let (Value::Object(page), Value::Object(context)) = (&mut page, context) {
        page.extend(context);
    }
    serde_json::to_writer(out, &page).map_err(io::Error::from)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserCard {
    pub id: i32,
    pub username: String,
    pub name: String,
}

impl From<&User> for UserCard {
    fn from(user: &User) -> Self {
        UserCard {
            id: user.id,
            username: user.username.clone(),
            name: user.name(),
        }
    }
}

/// A post as listings and detail pages show it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostCard {
    pub id: i32,
    pub text: String,
    pub short_text: String,
    pub pub_date: NaiveDateTime,
    pub author: UserCard,
    pub group: Option<Group>,
    pub image: Option<String>,
}

impl PostCard {
    pub fn new(conn: &Connection, post: Post) -> Result<Self> {
        let author = post.get_author(conn)?;
        let group = post.get_group(conn)?;
        Ok(PostCard {
            id: post.id,
            short_text: post.short_text(),
            pub_date: post.creation_date,
            author: UserCard::from(&author),
            group,
            image: post.image.map(|path| media_url(&path)),
            text: post.text,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommentCard {
    pub id: i32,
    pub text: String,
    pub created: NaiveDateTime,
    pub author: Option<UserCard>,
}

impl CommentCard {
    pub fn new(conn: &Connection, comment: Comment) -> Result<Self> {
        let author = comment.get_author(conn)?;
        Ok(CommentCard {
            id: comment.id,
            created: comment.creation_date,
            author: author.as_ref().map(UserCard::from),
            text: comment.text,
        })
    }
}

/// Public address of a stored upload.
pub fn media_url(path: &str) -> String {
    format!("/media/{}", path)
}

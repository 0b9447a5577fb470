use crate::{
    posts::{Post, SHORT_TEXT_LENGTH},
    schema::comments,
    users::User,
    Connection, Error, Result,
};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Serialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: Option<i32>,
    pub author_id: Option<i32>,
    pub text: String,
    pub creation_date: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "comments"]
pub struct NewComment {
    pub post_id: Option<i32>,
    pub author_id: Option<i32>,
    pub text: String,
}

impl Comment {
    insert!(comments, NewComment);
    get!(comments);

    /// Comments of a post, oldest first.
    pub fn list_for_post(conn: &Connection, post_id: i32) -> Result<Vec<Comment>> {
        comments::table
            .filter(comments::post_id.eq(post_id))
            .order((comments::creation_date.asc(), comments::id.asc()))
            .load::<Comment>(conn)
            .map_err(Error::from)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        comments::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn get_author(&self, conn: &Connection) -> Result<Option<User>> {
        self.author_id.map(|id| User::get(conn, id)).transpose()
    }

    /// Attaches a new comment by `author` to `post`. Blank text is refused.
    pub fn create(conn: &Connection, post: &Post, author: &User, text: &str) -> Result<Comment> {
        if text.trim().is_empty() {
            return Err(Error::InvalidValue);
        }
        Comment::insert(
            conn,
            NewComment {
                post_id: Some(post.id),
                author_id: Some(author.id),
                text: text.to_owned(),
            },
        )
    }

    pub fn short_text(&self) -> String {
        self.text.chars().take(SHORT_TEXT_LENGTH).collect()
    }
}

impl std::fmt::Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_text())
    }
}

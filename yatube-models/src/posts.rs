use crate::{
    comments::Comment,
    groups::Group,
    schema::{follows, posts},
    users::User,
    Connection, Error, Result,
};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

/// Number of characters of the text used when a post is shown as a one-liner.
pub const SHORT_TEXT_LENGTH: usize = 15;

#[derive(Queryable, Identifiable, Clone, Debug, PartialEq, Serialize)]
pub struct Post {
    pub id: i32,
    pub text: String,
    pub creation_date: NaiveDateTime,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

#[derive(Insertable)]
#[table_name = "posts"]
pub struct NewPost {
    pub text: String,
    pub author_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

/// The part of a post its author can change. The author and the
/// publication date are fixed once the post exists.
#[derive(AsChangeset)]
#[table_name = "posts"]
#[changeset_options(treat_none_as_null = "true")]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<i32>,
    pub image: Option<String>,
}

macro_rules! newest_first {
    ($query:expr) => {
        $query.order((posts::creation_date.desc(), posts::id.desc()))
    };
}

impl Post {
    insert!(posts, NewPost);
    get!(posts);

    pub fn update(&self, conn: &Connection, changes: PostChanges) -> Result<Self> {
        diesel::update(self).set(changes).execute(conn)?;
        Post::get(conn, self.id)
    }

    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self)
            .execute(conn)
            .map(|_| ())
            .map_err(Error::from)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        posts::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    /// Newest posts of the whole site, between two offsets.
    pub fn list_page(conn: &Connection, (min, max): (i32, i32)) -> Result<Vec<Post>> {
        newest_first!(posts::table)
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_group(conn: &Connection, group: &Group) -> Result<i64> {
        posts::table
            .filter(posts::group_id.eq(group.id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn list_page_for_group(
        conn: &Connection,
        group: &Group,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        newest_first!(posts::table.filter(posts::group_id.eq(group.id)))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn count_for_author(conn: &Connection, author: &User) -> Result<i64> {
        posts::table
            .filter(posts::author_id.eq(author.id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn list_page_for_author(
        conn: &Connection,
        author: &User,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        newest_first!(posts::table.filter(posts::author_id.eq(author.id)))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    /// Number of posts written by the authors `user` follows.
    pub fn count_feed(conn: &Connection, user: &User) -> Result<i64> {
        let followed = follows::table
            .filter(follows::user_id.eq(user.id))
            .select(follows::author_id);
        posts::table
            .filter(posts::author_id.eq_any(followed))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn list_page_feed(
        conn: &Connection,
        user: &User,
        (min, max): (i32, i32),
    ) -> Result<Vec<Post>> {
        let followed = follows::table
            .filter(follows::user_id.eq(user.id))
            .select(follows::author_id);
        newest_first!(posts::table.filter(posts::author_id.eq_any(followed)))
            .offset(min.into())
            .limit((max - min).into())
            .load::<Post>(conn)
            .map_err(Error::from)
    }

    pub fn get_author(&self, conn: &Connection) -> Result<User> {
        User::get(conn, self.author_id)
    }

    pub fn get_group(&self, conn: &Connection) -> Result<Option<Group>> {
        self.group_id.map(|id| Group::get(conn, id)).transpose()
    }

    pub fn get_comments(&self, conn: &Connection) -> Result<Vec<Comment>> {
        Comment::list_for_post(conn, self.id)
    }

    pub fn is_author(&self, user: &User) -> bool {
        self.author_id == user.id
    }

    /// The first characters of the text.
    pub fn short_text(&self) -> String {
        self.text.chars().take(SHORT_TEXT_LENGTH).collect()
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.short_text())
    }
}

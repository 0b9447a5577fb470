use crate::{schema::follows, users::User, Connection, Error, Result};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

/// `user_id` follows `author_id`.
#[derive(Clone, Debug, Queryable, Identifiable, Associations)]
#[belongs_to(User, foreign_key = "author_id")]
pub struct Follow {
    pub id: i32,
    pub user_id: i32,
    pub author_id: i32,
}

#[derive(Insertable)]
#[table_name = "follows"]
pub struct NewFollow {
    pub user_id: i32,
    pub author_id: i32,
}

impl Follow {
    insert!(follows, NewFollow);
    get!(follows);

    pub fn find(conn: &Connection, from: i32, to: i32) -> Result<Follow> {
        follows::table
            .filter(follows::user_id.eq(from))
            .filter(follows::author_id.eq(to))
            .first(conn)
            .map_err(Error::from)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        follows::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    /// Subscribes `user` to `author`.
    ///
    /// Following yourself is ignored, and so is following someone twice:
    /// `None` is returned when no new edge was created.
    pub fn follow(conn: &Connection, user: &User, author: &User) -> Result<Option<Follow>> {
        if user.id == author.id {
            return Ok(None);
        }
        match Follow::find(conn, user.id, author.id) {
            Ok(_) => Ok(None),
            Err(Error::NotFound) => Follow::insert(
                conn,
                NewFollow {
                    user_id: user.id,
                    author_id: author.id,
                },
            )
            .map(Some),
            Err(e) => Err(e),
        }
    }

    /// Removes every edge from `user` to `author`, failing with
    /// `Error::NotFound` when there is none.
    pub fn unfollow(conn: &Connection, user: &User, author: &User) -> Result<()> {
        let deleted = diesel::delete(
            follows::table
                .filter(follows::user_id.eq(user.id))
                .filter(follows::author_id.eq(author.id)),
        )
        .execute(conn)?;
        if deleted == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self)
            .execute(conn)
            .map(|_| ())
            .map_err(Error::from)
    }

    /// Readable form of the edge, `"<user> follows <author>"`.
    pub fn describe(&self, conn: &Connection) -> Result<String> {
        let user = User::get(conn, self.user_id)?;
        let author = User::get(conn, self.author_id)?;
        Ok(format!("{} follows {}", user.username, author.username))
    }
}

use crate::{
    db_conn::DbConn, follows::Follow, posts::Post, schema::users, Connection, Error, Result,
};
use chrono::NaiveDateTime;
use diesel::{self, BelongingToDsl, ExpressionMethods, QueryDsl, RunQueryDsl};
use rocket::{
    outcome::IntoOutcome,
    request::{self, FromRequest, Request},
};
use std::{
    cmp::PartialEq,
    hash::{Hash, Hasher},
};

#[derive(Queryable, Identifiable, Clone, Debug, AsChangeset, Serialize)]
#[changeset_options(treat_none_as_null = "true")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub creation_date: NaiveDateTime,
}

#[derive(Default, Insertable)]
#[table_name = "users"]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub hashed_password: Option<String>,
}

pub const AUTH_COOKIE: &str = "user_id";

impl User {
    insert!(users, NewUser);
    get!(users);
    find_by!(users, find_by_name, username as &str);
    find_by!(users, find_by_email, email as &str);

    /// The display name, or the username when none was given.
    pub fn name(&self) -> String {
        if self.display_name.is_empty() {
            self.username.clone()
        } else {
            self.display_name.clone()
        }
    }

    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self)
            .execute(conn)
            .map(|_| ())
            .map_err(Error::from)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        users::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn hash_pass(pass: &str) -> Result<String> {
        bcrypt::hash(pass, 10).map_err(Error::from)
    }

    pub fn login(conn: &Connection, ident: &str, password: &str) -> Result<User> {
        let user = match User::find_by_name(conn, ident) {
            Ok(user) => Ok(user),
            _ => User::find_by_email(conn, ident),
        };

        match user {
            Ok(user) => {
                let matches = user
                    .hashed_password
                    .as_ref()
                    .map(|hash| bcrypt::verify(password, hash).unwrap_or(false))
                    .unwrap_or(false);
                if matches {
                    Ok(user)
                } else {
                    Err(Error::NotFound)
                }
            }
            Err(e) => {
                // spend the same time as a real check, so unknown names can't be told apart
                let _ = bcrypt::verify(password, FAKE_HASH);
                Err(e)
            }
        }
    }

    pub fn count_posts(&self, conn: &Connection) -> Result<i64> {
        Post::count_for_author(conn, self)
    }

    pub fn count_followers(&self, conn: &Connection) -> Result<i64> {
        use crate::schema::follows;
        let follows = Follow::belonging_to(self).select(follows::user_id);
        users::table
            .filter(users::id.eq_any(follows))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn count_followed(&self, conn: &Connection) -> Result<i64> {
        use crate::schema::follows;
        let f = follows::table
            .filter(follows::user_id.eq(self.id))
            .select(follows::author_id);
        users::table
            .filter(users::id.eq_any(f))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn is_following(&self, conn: &Connection, other_id: i32) -> Result<bool> {
        use crate::schema::follows;
        follows::table
            .filter(follows::user_id.eq(self.id))
            .filter(follows::author_id.eq(other_id))
            .count()
            .get_result::<i64>(conn)
            .map_err(Error::from)
            .map(|r| r > 0)
    }
}

/// A valid bcrypt hash that matches no password anyone will type.
const FAKE_HASH: &str = "$2b$10$Fz0k8jFzC8oT4b0lGfX2.OQ0Zp7lS3g2zQ2lHn3lE0Gq7tJf6QW1S";

impl<'a, 'r> FromRequest<'a, 'r> for User {
    type Error = ();

    fn from_request(request: &'a Request<'r>) -> request::Outcome<User, ()> {
        let conn = request.guard::<DbConn>()?;
        request
            .cookies()
            .get_private(AUTH_COOKIE)
            .and_then(|cookie| cookie.value().parse().ok())
            .and_then(|id| User::get(&*conn, id).ok())
            .or_forward(())
    }
}

impl Eq for User {}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl NewUser {
    /// Creates a new local user
    pub fn new_local(
        conn: &Connection,
        username: String,
        display_name: String,
        email: String,
        password: Option<String>,
    ) -> Result<User> {
        User::insert(
            conn,
            NewUser {
                username,
                display_name,
                email,
                hashed_password: password,
            },
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{follows::NewFollow, tests::db, Connection as Conn};
    use assert_json_diff::assert_json_include;
    use diesel::Connection;
    use serde_json::json;

    pub(crate) fn fill_database(conn: &Conn) -> Vec<User> {
        let admin = NewUser::new_local(
            conn,
            "admin".to_owned(),
            "The admin".to_owned(),
            "admin@example.com".to_owned(),
            Some("invalid_admin_password".to_owned()),
        )
        .unwrap();
        let user = NewUser::new_local(
            conn,
            "user".to_owned(),
            "Some user".to_owned(),
            "user@example.com".to_owned(),
            Some("invalid_user_password".to_owned()),
        )
        .unwrap();
        let other = NewUser::new_local(
            conn,
            "other".to_owned(),
            String::new(),
            "other@example.com".to_owned(),
            Some("invalid_other_password".to_owned()),
        )
        .unwrap();

        vec![admin, user, other]
    }

    #[test]
    fn find_by() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            fill_database(&conn);
            let test_user = NewUser::new_local(
                &conn,
                "test".to_owned(),
                "test user".to_owned(),
                "test@example.com".to_owned(),
                None,
            )
            .unwrap();
            assert_eq!(
                test_user.id,
                User::find_by_name(&conn, "test").unwrap().id
            );
            assert_eq!(
                test_user.id,
                User::find_by_email(&conn, "test@example.com").unwrap().id
            );
            assert_eq!(test_user.id, User::get(&conn, test_user.id).unwrap().id);
            assert!(matches!(
                User::find_by_name(&conn, "nobody"),
                Err(Error::NotFound)
            ));
            Ok(())
        });
    }

    #[test]
    fn name() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let users = fill_database(&conn);
            assert_eq!(users[0].name(), "The admin");
            assert_eq!(users[2].name(), "other");
            Ok(())
        });
    }

    #[test]
    fn auth() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            fill_database(&conn);
            let test_user = NewUser::new_local(
                &conn,
                "test".to_owned(),
                "test user".to_owned(),
                "test@example.com".to_owned(),
                Some(User::hash_pass("test_password").unwrap()),
            )
            .unwrap();

            assert_eq!(
                User::login(&conn, "test", "test_password").unwrap().id,
                test_user.id
            );
            assert_eq!(
                User::login(&conn, "test@example.com", "test_password")
                    .unwrap()
                    .id,
                test_user.id
            );
            assert!(User::login(&conn, "test", "other_password").is_err());
            assert!(User::login(&conn, "nobody", "test_password").is_err());
            Ok(())
        });
    }

    #[test]
    fn followers() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let users = fill_database(&conn);
            Follow::insert(
                &conn,
                NewFollow {
                    user_id: users[1].id,
                    author_id: users[0].id,
                },
            )
            .unwrap();
            Follow::insert(
                &conn,
                NewFollow {
                    user_id: users[2].id,
                    author_id: users[0].id,
                },
            )
            .unwrap();

            assert_eq!(users[0].count_followers(&conn).unwrap(), 2);
            assert_eq!(users[1].count_followed(&conn).unwrap(), 1);
            assert_eq!(users[0].count_followed(&conn).unwrap(), 0);
            assert!(users[1].is_following(&conn, users[0].id).unwrap());
            assert!(!users[0].is_following(&conn, users[1].id).unwrap());
            assert!(users[2].is_following(&conn, users[0].id).unwrap());
            Ok(())
        });
    }

    #[test]
    fn delete() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let users = fill_database(&conn);
            assert_eq!(User::count(&conn).unwrap(), 3);
            users[2].delete(&conn).unwrap();
            assert!(User::get(&conn, users[2].id).is_err());
            assert_eq!(User::count(&conn).unwrap(), 2);
            Ok(())
        });
    }

    #[test]
    fn password_is_never_serialized() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let users = fill_database(&conn);
            let value = serde_json::to_value(&users[1]).unwrap();
            assert_json_include!(
                actual: value.clone(),
                expected: json!({
                    "username": "user",
                    "display_name": "Some user",
                    "email": "user@example.com",
                })
            );
            assert!(value.get("hashed_password").is_none());
            Ok(())
        });
    }
}

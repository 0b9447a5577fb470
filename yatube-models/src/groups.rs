use crate::{schema::groups, Connection, Error, Result};
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};

#[derive(Clone, Debug, PartialEq, Queryable, Identifiable, AsChangeset, Serialize)]
pub struct Group {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Insertable)]
#[table_name = "groups"]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Longest accepted group title.
pub const TITLE_MAX_LENGTH: usize = 200;

impl Group {
    insert!(groups, NewGroup);
    get!(groups);
    find_by!(groups, find_by_slug, slug as &str);

    /// Every group, alphabetically, as offered by the post form.
    pub fn list(conn: &Connection) -> Result<Vec<Group>> {
        groups::table
            .order(groups::title.asc())
            .load::<Group>(conn)
            .map_err(Error::from)
    }

    /// Deleting a group keeps its posts, which just lose their group.
    pub fn delete(&self, conn: &Connection) -> Result<()> {
        diesel::delete(self)
            .execute(conn)
            .map(|_| ())
            .map_err(Error::from)
    }
}

impl NewGroup {
    pub fn new(title: &str, slug: &str, description: &str) -> Result<NewGroup> {
        if title.trim().is_empty()
            || title.chars().count() > TITLE_MAX_LENGTH
            || !is_valid_slug(slug)
        {
            return Err(Error::InvalidValue);
        }
        Ok(NewGroup {
            title: title.trim().to_owned(),
            slug: slug.to_owned(),
            description: description.to_owned(),
        })
    }
}

/// Slugs are made of ASCII letters, digits, hyphens and underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{tests::db, Connection as Conn};
    use diesel::Connection;

    pub(crate) fn fill_database(conn: &Conn) -> Vec<Group> {
        vec![
            Group::insert(
                conn,
                NewGroup::new("Test group", "test-slug", "Test description").unwrap(),
            )
            .unwrap(),
            Group::insert(
                conn,
                NewGroup::new("Another group", "test-slug2", "Another description").unwrap(),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn find_by_slug() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            let groups = fill_database(&conn);
            assert_eq!(Group::find_by_slug(&conn, "test-slug").unwrap(), groups[0]);
            assert!(Group::find_by_slug(&conn, "missing").is_err());
            assert_eq!(groups[0].to_string(), "Test group");
            Ok(())
        });
    }

    #[test]
    fn list_is_sorted() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            fill_database(&conn);
            let titles = Group::list(&conn)
                .unwrap()
                .into_iter()
                .map(|g| g.title)
                .collect::<Vec<_>>();
            assert_eq!(titles, vec!["Another group", "Test group"]);
            Ok(())
        });
    }

    #[test]
    fn slug_is_unique() {
        let conn = db();
        conn.test_transaction::<_, (), _>(|| {
            fill_database(&conn);
            assert!(Group::insert(
                &conn,
                NewGroup::new("Copy", "test-slug", "").unwrap()
            )
            .is_err());
            Ok(())
        });
    }

    #[test]
    fn validation() {
        assert!(NewGroup::new("", "slug", "").is_err());
        assert!(NewGroup::new("Title", "not a slug", "").is_err());
        assert!(NewGroup::new(&"x".repeat(TITLE_MAX_LENGTH + 1), "slug", "").is_err());
        assert!(NewGroup::new("Title", "a_slug-2", "").is_ok());
    }
}

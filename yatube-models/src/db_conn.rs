use crate::Connection;
use diesel::r2d2::{
    ConnectionManager, CustomizeConnection, Error as ConnError, Pool, PooledConnection,
};
#[cfg(feature = "sqlite")]
use diesel::{connection::SimpleConnection, ConnectionError};
use rocket::{
    http::Status,
    request::{self, FromRequest},
    Outcome, Request, State,
};
use std::ops::Deref;

pub type DbPool = Pool<ConnectionManager<Connection>>;

/// Per-connection setup. SQLite needs foreign keys switched on for the
/// `ON DELETE` rules of the schema to apply.
#[cfg(feature = "sqlite")]
pub fn init_connection(conn: &Connection) -> diesel::QueryResult<()> {
    conn.batch_execute("PRAGMA foreign_keys = on; PRAGMA busy_timeout = 5000;")
}

#[cfg(feature = "postgres")]
pub fn init_connection(_conn: &Connection) -> diesel::QueryResult<()> {
    Ok(())
}

#[derive(Debug)]
pub struct PragmaForeignKey;
impl CustomizeConnection<Connection, ConnError> for PragmaForeignKey {
    #[cfg(feature = "sqlite")]
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), ConnError> {
        init_connection(conn).map_err(|_| {
            ConnError::ConnectionError(ConnectionError::BadConnection(String::from(
                "PRAGMA foreign_keys = on failed",
            )))
        })
    }
    #[cfg(feature = "postgres")]
    fn on_acquire(&self, _conn: &mut Connection) -> Result<(), ConnError> {
        Ok(())
    }
}

// From rocket documentation

// Connection request guard type: a wrapper around an r2d2 pooled connection.
pub struct DbConn(pub PooledConnection<ConnectionManager<Connection>>);

/// Attempts to retrieve a single connection from the managed database pool. If
/// no pool is currently managed, fails with an `InternalServerError` status. If
/// no connections are available, fails with a `ServiceUnavailable` status.
impl<'a, 'r> FromRequest<'a, 'r> for DbConn {
    type Error = ();

    fn from_request(request: &'a Request<'r>) -> request::Outcome<Self, Self::Error> {
        let pool = request.guard::<State<'_, DbPool>>()?;
        match pool.get() {
            Ok(conn) => Outcome::Success(DbConn(conn)),
            Err(_) => Outcome::Failure((Status::ServiceUnavailable, ())),
        }
    }
}

// For the convenience of using an &DbConn as an &Connection.
impl Deref for DbConn {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

use crate::{
    routes::{errors::ErrorPage, paginate, Page},
    template_utils::Rendered,
    templates::UserCard,
    utils,
};
use rocket::{http::uri::Origin, response::Redirect};
use tracing::info;
use yatube_models::{db_conn::DbConn, follows::Follow, posts::Post, users::User};

pub fn profile_url(user: &User) -> String {
    format!("/profile/{}/", user.username)
}

#[get("/profile/<name>?<page>")]
pub fn details(
    name: String,
    page: Option<Page>,
    account: Option<User>,
    conn: DbConn,
) -> Result<Rendered, ErrorPage> {
    let author = User::find_by_name(&conn, &name)?;
    let page_obj = paginate(&conn, author.count_posts(&conn)?, page, |limits| {
        Post::list_page_for_author(&conn, &author, limits)
    })?;
    let following = match account {
        Some(ref account) => account.is_following(&conn, author.id)?,
        None => false,
    };
    Ok(render!(users::details(
        &account,
        &UserCard::from(&author),
        &page_obj,
        following,
        author.count_followers(&conn)?,
        author.count_followed(&conn)?
    )))
}

fn follow_author(name: &str, user: &User, conn: &DbConn) -> Result<Redirect, ErrorPage> {
    let author = User::find_by_name(conn, name)?;
    if let Some(follow) = Follow::follow(conn, user, &author)? {
        info!("{}", follow.describe(conn)?);
    }
    Ok(Redirect::to(profile_url(&author)))
}

fn unfollow_author(name: &str, user: &User, conn: &DbConn) -> Result<Redirect, ErrorPage> {
    let author = User::find_by_name(conn, name)?;
    Follow::unfollow(conn, user, &author)?;
    info!("{} unfollowed {}", user.username, author.username);
    Ok(Redirect::to(profile_url(&author)))
}

#[get("/profile/<name>/follow")]
pub fn follow(name: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    follow_author(&name, &user, &conn)
}

#[get("/profile/<_name>/follow", rank = 2)]
pub fn follow_auth(_name: String, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

#[post("/profile/<name>/follow")]
pub fn follow_post(name: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    follow_author(&name, &user, &conn)
}

#[post("/profile/<_name>/follow", rank = 2)]
pub fn follow_post_auth(_name: String, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

#[get("/profile/<name>/unfollow")]
pub fn unfollow(name: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    unfollow_author(&name, &user, &conn)
}

#[get("/profile/<_name>/unfollow", rank = 2)]
pub fn unfollow_auth(_name: String, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

#[post("/profile/<name>/unfollow")]
pub fn unfollow_post(name: String, user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    unfollow_author(&name, &user, &conn)
}

#[post("/profile/<_name>/unfollow", rank = 2)]
pub fn unfollow_post_auth(_name: String, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

/// Posts of everyone the user follows.
#[get("/follow?<page>")]
pub fn feed(page: Option<Page>, user: User, conn: DbConn) -> Result<Rendered, ErrorPage> {
    let page_obj = paginate(&conn, Post::count_feed(&conn, &user)?, page, |limits| {
        Post::list_page_feed(&conn, &user, limits)
    })?;
    Ok(render!(posts::follow(&Some(user), &page_obj)))
}

#[get("/follow", rank = 2)]
pub fn feed_auth(origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

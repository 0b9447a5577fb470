use crate::{
    routes::{errors::ErrorPage, paginate, Page},
    template_utils::Rendered,
};
use yatube_models::{db_conn::DbConn, groups::Group, posts::Post, users::User};

#[get("/group/<slug>?<page>")]
pub fn details(
    slug: String,
    page: Option<Page>,
    user: Option<User>,
    conn: DbConn,
) -> Result<Rendered, ErrorPage> {
    let group = Group::find_by_slug(&conn, &slug)?;
    let page_obj = paginate(&conn, Post::count_for_group(&conn, &group)?, page, |limits| {
        Post::list_page_for_group(&conn, &group, limits)
    })?;
    Ok(render!(groups::details(&user, &group, &page_obj)))
}

use crate::{template_utils::Rendered, templates::PostCard};
use rocket::{
    http::RawStr,
    request::FromFormValue,
    response::Redirect,
};
use shrinkwraprs::Shrinkwrap;
use yatube_models::{
    pagination::{PageObj, Paginator},
    posts::Post,
    Connection, Result, CONFIG,
};

/// Either a page or a redirection, for handlers that may end up on another page.
#[derive(Responder)]
pub enum RespondOrRedirect {
    Response(Rendered),
    Redirect(Redirect),
}

impl From<Rendered> for RespondOrRedirect {
    fn from(response: Rendered) -> Self {
        RespondOrRedirect::Response(response)
    }
}

impl From<Redirect> for RespondOrRedirect {
    fn from(redirect: Redirect) -> Self {
        RespondOrRedirect::Redirect(redirect)
    }
}

/// The `?page=` of listings. Anything that isn't a number is ignored.
#[derive(Shrinkwrap, Copy, Clone, Debug, UriDisplayQuery)]
pub struct Page(i32);

impl<'v> FromFormValue<'v> for Page {
    type Error = &'v RawStr;
    fn from_form_value(form_value: &'v RawStr) -> std::result::Result<Page, &'v RawStr> {
        match form_value.parse::<i32>() {
            Ok(page) => Ok(Page(page)),
            _ => Err(form_value),
        }
    }
}

/// Loads one page of posts and turns them into cards.
pub fn paginate<F>(
    conn: &Connection,
    count: i64,
    page: Option<Page>,
    fetch: F,
) -> Result<PageObj<PostCard>>
where
    F: FnOnce((i32, i32)) -> Result<Vec<Post>>,
{
    Paginator::new(count, CONFIG.posts_per_page)
        .get_page(page.map(|p| *p), fetch)?
        .try_map(|post| PostCard::new(conn, post))
}

pub mod comments;
pub mod errors;
pub mod groups;
pub mod posts;
pub mod session;
pub mod user;

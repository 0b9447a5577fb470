use crate::{
    routes::{
        errors::ErrorPage,
        posts::{details_url, not_blank},
    },
    utils,
};
use rocket::{http::uri::Origin, request::LenientForm, response::Redirect};
use tracing::info;
use validator::Validate;
use yatube_models::{comments::Comment, db_conn::DbConn, posts::Post, users::User};

#[derive(Default, FromForm, Validate, Serialize)]
pub struct NewCommentForm {
    #[validate(custom(function = "not_blank", message = "This field is required"))]
    pub text: String,
}

/// Comments are posted from the detail page, where every outcome leads back.
#[post("/posts/<id>/comment", data = "<form>")]
pub fn create(
    id: i32,
    form: Option<LenientForm<NewCommentForm>>,
    user: User,
    conn: DbConn,
) -> Result<Redirect, ErrorPage> {
    let post = Post::get(&conn, id)?;
    if let Some(form) = form {
        if form.validate().is_ok() {
            let comment = Comment::create(&conn, &post, &user, &form.text)?;
            info!("{} commented post {} ({})", user.username, post.id, comment.id);
        }
    }
    Ok(Redirect::to(details_url(post.id)))
}

#[post("/posts/<_id>/comment", rank = 2)]
pub fn create_auth(_id: i32, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

#[get("/posts/<id>/comment")]
pub fn redirect(id: i32, _user: User, conn: DbConn) -> Result<Redirect, ErrorPage> {
    let post = Post::get(&conn, id)?;
    Ok(Redirect::to(details_url(post.id)))
}

#[get("/posts/<_id>/comment", rank = 2)]
pub fn redirect_auth(_id: i32, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

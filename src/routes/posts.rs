use crate::{
    cache::PageCache,
    routes::{comments::NewCommentForm, errors::ErrorPage, paginate, Page, RespondOrRedirect},
    template_utils::Rendered,
    templates::{CommentCard, PostCard},
    uploads::{FormBody, ImageKind, MediaStore, Upload},
    utils,
};
use rocket::{
    http::{uri::Origin, ContentType},
    request::{FormItems, FromForm},
    response::Redirect,
    Data, State,
};
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};
use yatube_models::{
    db_conn::DbConn,
    groups::Group,
    posts::{NewPost, Post, PostChanges},
    users::User,
    Connection, Error,
};

#[get("/?<page>")]
pub fn index(
    page: Option<Page>,
    user: Option<User>,
    conn: DbConn,
    cache: State<'_, PageCache>,
) -> Result<Rendered, ErrorPage> {
    // what the page shows depends on who is looking at it
    let key = format!(
        "index?page={}#{}",
        page.map_or(1, |p| *p),
        user.as_ref().map_or(0, |u| u.id)
    );
    cache
        .get_or_render(&key, || -> Result<Vec<u8>, ErrorPage> {
            let page_obj = paginate(&conn, Post::count(&conn)?, page, |limits| {
                Post::list_page(&conn, limits)
            })?;
            Ok(render!(posts::index(&user, &page_obj)).0)
        })
        .map(Rendered)
}

#[get("/posts/<id>")]
pub fn details(id: i32, user: Option<User>, conn: DbConn) -> Result<Rendered, ErrorPage> {
    let post = Post::get(&conn, id)?;
    let posts_count = post.get_author(&conn)?.count_posts(&conn)?;
    let comments = post
        .get_comments(&conn)?
        .into_iter()
        .map(|c| CommentCard::new(&conn, c))
        .collect::<yatube_models::Result<Vec<_>>>()?;
    let post = PostCard::new(&conn, post)?;
    Ok(render!(posts::details(
        &user,
        &post,
        posts_count,
        &comments,
        &NewCommentForm::default()
    )))
}

#[derive(Clone, Debug, Default, FromForm, Validate, Serialize)]
pub struct NewPostForm {
    #[validate(custom(function = "not_blank", message = "This field is required"))]
    pub text: String,
    pub group: Option<i32>,
}

pub fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::new("required"))
    } else {
        Ok(())
    }
}

impl NewPostForm {
    fn from_post(post: &Post) -> Self {
        NewPostForm {
            text: post.text.clone(),
            group: post.group_id,
        }
    }

    /// Reads an url-encoded body, ignoring fields the form doesn't know.
    /// A body that can't be read gives an empty form with an error.
    fn parse(encoded: &str) -> (NewPostForm, ValidationErrors) {
        match NewPostForm::from_form(&mut FormItems::from(encoded), true) {
            Ok(form) => {
                let errors = form.validate().err().unwrap_or_default();
                (form, errors)
            }
            Err(e) => {
                warn!("Unreadable post form: {:?}", e);
                let form = NewPostForm::default();
                let mut errors = form.validate().err().unwrap_or_default();
                let mut error = ValidationError::new("invalid_form");
                error.message = Some("The form couldn't be read".into());
                errors.add("__all__", error);
                (form, errors)
            }
        }
    }
}

/// A submitted post form, checked against the database.
struct PostSubmission {
    form: NewPostForm,
    image: Option<(Upload, ImageKind)>,
    errors: ValidationErrors,
}

impl PostSubmission {
    fn read(
        conn: &Connection,
        data: Data,
        ct: &ContentType,
    ) -> yatube_models::Result<PostSubmission> {
        let mut body = FormBody::read(data, ct)?;
        let (form, mut errors) = NewPostForm::parse(&body.encoded);

        if let Some(group) = form.group {
            match Group::get(conn, group) {
                Ok(_) => {}
                Err(Error::NotFound) => {
                    let mut error = ValidationError::new("invalid_choice");
                    error.message = Some("Select a valid group".into());
                    errors.add("group", error);
                }
                Err(e) => return Err(e),
            }
        }

        let image = match body.files.remove("image") {
            Some(upload) => match ImageKind::detect(&upload.bytes) {
                Some(kind) => Some((upload, kind)),
                None => {
                    warn!("Rejected upload {:?}: not an image", upload.filename);
                    let mut error = ValidationError::new("invalid_image");
                    error.message = Some("Upload a valid image".into());
                    errors.add("image", error);
                    None
                }
            },
            None => None,
        };

        Ok(PostSubmission {
            form,
            image,
            errors,
        })
    }

    fn is_valid(&self) -> bool {
        self.errors.errors().is_empty()
    }

    fn store_image(&self, media: &MediaStore) -> yatube_models::Result<Option<String>> {
        self.image
            .as_ref()
            .map(|(upload, kind)| media.store_post_image(upload, *kind))
            .transpose()
    }
}

pub fn details_url(id: i32) -> String {
    format!("/posts/{}/", id)
}

#[get("/create")]
pub fn new(user: User, conn: DbConn) -> Result<Rendered, ErrorPage> {
    let groups = Group::list(&conn)?;
    Ok(render!(posts::new(
        &Some(user),
        &NewPostForm::default(),
        &groups,
        &ValidationErrors::default(),
        None
    )))
}

#[get("/create", rank = 2)]
pub fn new_auth(origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

#[post("/create", data = "<data>")]
pub fn create(
    user: User,
    data: Data,
    ct: &ContentType,
    conn: DbConn,
    media: State<'_, MediaStore>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let submission = PostSubmission::read(&conn, data, ct)?;
    if !submission.is_valid() {
        let groups = Group::list(&conn)?;
        return Ok(render!(posts::new(
            &Some(user),
            &submission.form,
            &groups,
            &submission.errors,
            None
        ))
        .into());
    }

    let image = submission.store_image(&media)?;
    let post = Post::insert(
        &conn,
        NewPost {
            text: submission.form.text,
            author_id: user.id,
            group_id: submission.form.group,
            image,
        },
    )?;
    info!("{} published post {}", user.username, post.id);
    Ok(Redirect::to(crate::routes::user::profile_url(&user)).into())
}

#[post("/create", rank = 2)]
pub fn create_auth(origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

#[get("/posts/<id>/edit")]
pub fn edit(id: i32, user: User, conn: DbConn) -> Result<RespondOrRedirect, ErrorPage> {
    let post = Post::get(&conn, id)?;
    if !post.is_author(&user) {
        return Ok(Redirect::to(details_url(id)).into());
    }
    let groups = Group::list(&conn)?;
    Ok(render!(posts::new(
        &Some(user),
        &NewPostForm::from_post(&post),
        &groups,
        &ValidationErrors::default(),
        Some(post.id)
    ))
    .into())
}

#[get("/posts/<_id>/edit", rank = 2)]
pub fn edit_auth(_id: i32, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

#[post("/posts/<id>/edit", data = "<data>")]
pub fn update(
    id: i32,
    user: User,
    data: Data,
    ct: &ContentType,
    conn: DbConn,
    media: State<'_, MediaStore>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let post = Post::get(&conn, id)?;
    if !post.is_author(&user) {
        warn!("{} tried to edit post {} of someone else", user.username, id);
        return Ok(Redirect::to(details_url(id)).into());
    }

    let submission = PostSubmission::read(&conn, data, ct)?;
    if !submission.is_valid() {
        let groups = Group::list(&conn)?;
        return Ok(render!(posts::new(
            &Some(user),
            &submission.form,
            &groups,
            &submission.errors,
            Some(post.id)
        ))
        .into());
    }

    // no new upload keeps the current image
    let image = submission.store_image(&media)?.or_else(|| post.image.clone());
    post.update(
        &conn,
        PostChanges {
            text: submission.form.text,
            group_id: submission.form.group,
            image,
        },
    )?;
    Ok(Redirect::to(details_url(id)).into())
}

#[post("/posts/<_id>/edit", rank = 2)]
pub fn update_auth(_id: i32, origin: &Origin<'_>) -> Redirect {
    utils::requires_login(origin)
}

use crate::{
    routes::{errors::ErrorPage, RespondOrRedirect},
    template_utils::Rendered,
    utils,
};
use rocket::{
    http::{Cookie, Cookies, SameSite},
    request::LenientForm,
    response::Redirect,
};
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};
use yatube_models::{
    db_conn::DbConn,
    users::{NewUser, User, AUTH_COOKIE},
    Error,
};

#[derive(Default, FromForm, Serialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub next: Option<String>,
}

fn log_in(cookies: &mut Cookies<'_>, user: &User) {
    cookies.add_private(
        Cookie::build(AUTH_COOKIE, user.id.to_string())
            .same_site(SameSite::Lax)
            .finish(),
    );
}

#[get("/auth/login?<next>")]
pub fn new(next: Option<String>, user: Option<User>) -> Rendered {
    let form = LoginForm {
        next,
        ..LoginForm::default()
    };
    render!(session::login(&user, &form, &ValidationErrors::default()))
}

#[post("/auth/login", data = "<form>")]
pub fn create(
    form: LenientForm<LoginForm>,
    mut cookies: Cookies<'_>,
    conn: DbConn,
) -> Result<RespondOrRedirect, ErrorPage> {
    let mut form = form.into_inner();
    form.username = form.username.trim().to_owned();
    match User::login(&conn, &form.username, &form.password) {
        Ok(user) => {
            log_in(&mut cookies, &user);
            info!("{} logged in", user.username);
            let destination = form
                .next
                .filter(|next| utils::is_local_path(next))
                .unwrap_or_else(|| "/".to_owned());
            Ok(Redirect::to(destination).into())
        }
        Err(Error::NotFound) => {
            warn!("Failed login attempt for {}", form.username);
            let mut errors = ValidationErrors::new();
            let mut error = ValidationError::new("invalid_login");
            error.message = Some("Invalid username or password".into());
            errors.add("__all__", error);
            Ok(render!(session::login(&None, &form, &errors)).into())
        }
        Err(e) => Err(e.into()),
    }
}

#[get("/auth/logout")]
pub fn delete(mut cookies: Cookies<'_>) -> Redirect {
    if let Some(cookie) = cookies.get_private(AUTH_COOKIE) {
        cookies.remove_private(cookie);
    }
    Redirect::to("/")
}

#[derive(Default, FromForm, Validate, Serialize)]
pub struct NewUserForm {
    #[validate(
        length(
            min = 1,
            max = 150,
            message = "Username should be between 1 and 150 characters long"
        ),
        custom(
            function = "validate_username",
            message = "Only letters, digits and @.+-_ are allowed"
        )
    )]
    pub username: String,
    pub display_name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 8, message = "Password should be at least 8 characters long"))]
    pub password: String,
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        Ok(())
    } else {
        Err(ValidationError::new("username_illegal_char"))
    }
}

fn taken(errors: &mut ValidationErrors, field: &'static str, message: &'static str) {
    let mut error = ValidationError::new("unique");
    error.message = Some(message.into());
    errors.add(field, error);
}

#[get("/auth/signup")]
pub fn signup(user: Option<User>) -> Rendered {
    render!(session::signup(
        &user,
        &NewUserForm::default(),
        &ValidationErrors::default()
    ))
}

#[post("/auth/signup", data = "<form>")]
pub fn signup_create(
    form: LenientForm<NewUserForm>,
    mut cookies: Cookies<'_>,
    conn: DbConn,
) -> Result<RespondOrRedirect, ErrorPage> {
    let mut form = form.into_inner();
    form.username = form.username.trim().to_owned();
    form.email = form.email.trim().to_owned();

    let mut errors = form.validate().err().unwrap_or_default();
    if User::find_by_name(&conn, &form.username).is_ok() {
        taken(&mut errors, "username", "This username is already taken");
    }
    if User::find_by_email(&conn, &form.email).is_ok() {
        taken(&mut errors, "email", "This email is already used");
    }
    if !errors.errors().is_empty() {
        return Ok(render!(session::signup(&None, &form, &errors)).into());
    }

    let user = NewUser::new_local(
        &conn,
        form.username.clone(),
        form.display_name.trim().to_owned(),
        form.email.clone(),
        Some(User::hash_pass(&form.password)?),
    )?;
    info!("New user: {}", user.username);
    log_in(&mut cookies, &user);
    Ok(Redirect::to("/").into())
}

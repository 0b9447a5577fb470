use super::write_page;
use crate::routes::session::{LoginForm, NewUserForm};
use crate::template_utils::BaseContext;
use std::io;
use validator::ValidationErrors;

pub fn login(
    out: &mut Vec<u8>,
    ctx: BaseContext<'_>,
    form: &LoginForm,
    errors: &ValidationErrors,
) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "users/login",
        json!({ "form": form, "errors": errors }),
    )
}

pub fn signup(
    out: &mut Vec<u8>,
    ctx: BaseContext<'_>,
    form: &NewUserForm,
    errors: &ValidationErrors,
) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "users/signup",
        json!({ "form": form, "errors": errors }),
    )
}

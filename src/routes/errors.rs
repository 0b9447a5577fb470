use crate::template_utils::Rendered;
use rocket::{
    http::Status,
    request::FromRequest,
    response::{self, Responder},
    Request,
};
use tracing::warn;
use yatube_models::{users::User, Error};

#[derive(Debug)]
pub struct ErrorPage(Error);

impl From<Error> for ErrorPage {
    fn from(err: Error) -> ErrorPage {
        ErrorPage(err)
    }
}

impl<'r> Responder<'r> for ErrorPage {
    fn respond_to(self, req: &Request<'_>) -> response::Result<'r> {
        let user = User::from_request(req).succeeded();
        let (page, status) = match self.0 {
            Error::NotFound => (render!(errors::not_found(&user)), Status::NotFound),
            Error::Unauthorized => (render!(errors::not_authorized(&user)), Status::Forbidden),
            err => {
                warn!("Request to {} failed: {}", req.uri(), err);
                (render!(errors::server_error(&user)), Status::InternalServerError)
            }
        };
        page.respond_to(req).map(|mut res| {
            res.set_status(status);
            res
        })
    }
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> Rendered {
    let user = User::from_request(req).succeeded();
    render!(errors::not_found(&user))
}

#[catch(422)]
pub fn unprocessable_entity(req: &Request<'_>) -> Rendered {
    let user = User::from_request(req).succeeded();
    render!(errors::unprocessable_entity(&user))
}

#[catch(500)]
pub fn server_error(req: &Request<'_>) -> Rendered {
    let user = User::from_request(req).succeeded();
    render!(errors::server_error(&user))
}

use rocket::http::{ContentType, Method, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::io::Cursor;
use tracing::error;
use yatube_models::users::User;

/// Who is looking at the page.
pub type BaseContext<'a> = &'a Option<User>;

/// A rendered page context, served as JSON.
#[derive(Debug)]
pub struct Rendered(pub Vec<u8>);

impl Rendered {
    /// Stand-in body for a page that couldn't be written.
    pub fn failed(err: std::io::Error) -> Self {
        error!("Couldn't render page: {}", err);
        Rendered(br#"{"template":"core/500"}"#.to_vec())
    }

    pub fn etag(&self) -> String {
        let mut hasher = DefaultHasher::new();
        hasher.write(&self.0);
        format!("{:x}", hasher.finish())
    }
}

impl<'r> Responder<'r> for Rendered {
    fn respond_to(self, r: &Request<'_>) -> response::Result<'r> {
        // forms answer every other method: only GET pages get an ETag
        if r.method() != Method::Get {
            return Response::build()
                .header(ContentType::JSON)
                .sized_body(Cursor::new(self.0))
                .ok();
        }
        let etag = self.etag();
        if r.headers()
            .get("If-None-Match")
            .any(|s| s.trim_matches('"') == etag)
        {
            Response::build()
                .status(Status::NotModified)
                .raw_header("ETag", format!("\"{}\"", etag))
                .ok()
        } else {
            Response::build()
                .header(ContentType::JSON)
                .raw_header("ETag", format!("\"{}\"", etag))
                .sized_body(Cursor::new(self.0))
                .ok()
        }
    }
}

#[macro_export]
macro_rules! render {
    ($group:tt :: $page:tt ( $( $param:expr ),* ) ) => {
        {
            use crate::templates;
            use crate::template_utils::Rendered;

            let mut res = vec![];
            match templates::$group::$page(
                &mut res,
                $(
                    $param
                ),*
            ) {
                Ok(()) => Rendered(res),
                Err(e) => Rendered::failed(e),
            }
        }
    }
}

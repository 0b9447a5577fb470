use rocket::http::uri::Origin;
use rocket::response::Redirect;
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/auth/login/";

/// Sends a guest to the login page, remembering where they wanted to go.
pub fn requires_login(origin: &Origin<'_>) -> Redirect {
    Redirect::to(login_url(&origin.to_string()))
}

pub fn login_url(next: &str) -> String {
    let next = form_urlencoded::byte_serialize(next.as_bytes())
        .collect::<String>()
        .replace("%2F", "/");
    format!("{}?next={}", LOGIN_PATH, next)
}

/// Only paths of this site are accepted as a post-login destination.
pub fn is_local_path(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_keeps_slashes() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=/create/");
        assert_eq!(
            login_url("/follow/?page=2"),
            "/auth/login/?next=/follow/%3Fpage%3D2"
        );
    }

    #[test]
    fn local_paths() {
        assert!(is_local_path("/posts/1/"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path(""));
    }
}

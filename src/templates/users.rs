use super::{write_page, PostCard, UserCard};
use crate::template_utils::BaseContext;
use std::io;
use yatube_models::pagination::PageObj;

pub fn details(
    out: &mut Vec<u8>,
    ctx: BaseContext<'_>,
    author: &UserCard,
    page: &PageObj<PostCard>,
    following: bool,
    followers_count: i64,
    followed_count: i64,
) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "posts/profile",
        json!({
            "author": author,
            "page_obj": page,
            "posts_count": page.count,
            "following": following,
            "followers_count": followers_count,
            "followed_count": followed_count,
        }),
    )
}

use super::{write_page, CommentCard, PostCard};
use crate::routes::{comments::NewCommentForm, posts::NewPostForm};
use crate::template_utils::BaseContext;
use std::io;
use validator::ValidationErrors;
use yatube_models::{groups::Group, pagination::PageObj};

pub fn index(out: &mut Vec<u8>, ctx: BaseContext<'_>, page: &PageObj<PostCard>) -> io::Result<()> {
    write_page(out, ctx, "posts/index", json!({ "page_obj": page }))
}

pub fn follow(out: &mut Vec<u8>, ctx: BaseContext<'_>, page: &PageObj<PostCard>) -> io::Result<()> {
    write_page(out, ctx, "posts/follow", json!({ "page_obj": page }))
}

pub fn details(
    out: &mut Vec<u8>,
    ctx: BaseContext<'_>,
    post: &PostCard,
    posts_count: i64,
    comments: &[CommentCard],
    form: &NewCommentForm,
) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "posts/post_detail",
        json!({
            "post": post,
            "posts_count": posts_count,
            "comments": comments,
            "form": form,
        }),
    )
}

/// The post form, blank, refilled after errors or holding the post being edited.
pub fn new(
    out: &mut Vec<u8>,
    ctx: BaseContext<'_>,
    form: &NewPostForm,
    groups: &[Group],
    errors: &ValidationErrors,
    editing: Option<i32>,
) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "posts/create_post",
        json!({
            "form": form,
            "groups": groups,
            "errors": errors,
            "is_edit": editing.is_some(),
            "post_id": editing,
        }),
    )
}

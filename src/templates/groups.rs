use super::{write_page, PostCard};
use crate::template_utils::BaseContext;
use std::io;
use yatube_models::{groups::Group, pagination::PageObj};

pub fn details(
    out: &mut Vec<u8>,
    ctx: BaseContext<'_>,
    group: &Group,
    page: &PageObj<PostCard>,
) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "posts/group_list",
        json!({ "group": group, "page_obj": page }),
    )
}

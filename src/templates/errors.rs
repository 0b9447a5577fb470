use super::write_page;
use crate::template_utils::BaseContext;
use std::io;

pub fn not_found(out: &mut Vec<u8>, ctx: BaseContext<'_>) -> io::Result<()> {
    write_page(out, ctx, "core/404", json!({ "error_message": "Page not found" }))
}

pub fn not_authorized(out: &mut Vec<u8>, ctx: BaseContext<'_>) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "core/403",
        json!({ "error_message": "You are not allowed to do that" }),
    )
}

pub fn unprocessable_entity(out: &mut Vec<u8>, ctx: BaseContext<'_>) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "core/422",
        json!({ "error_message": "The submitted data couldn't be processed" }),
    )
}

pub fn server_error(out: &mut Vec<u8>, ctx: BaseContext<'_>) -> io::Result<()> {
    write_page(
        out,
        ctx,
        "core/500",
        json!({ "error_message": "Something went wrong on our side" }),
    )
}

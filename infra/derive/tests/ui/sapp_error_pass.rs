use sapp_derive::sapp_error;
use std::borrow::Cow;

#[sapp_error]
pub enum SeedError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: SeedError = "boom".into();
    let _ = err.to_string();
}

use sapp_derive::sapp_error;

#[sapp_error]
pub enum QualifiedError {
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse {
        source: std::num::ParseIntError,
        context: ::std::option::Option<std::borrow::Cow<'static, str>>,
    },
}

fn main() {
    let parsed: Result<u32, QualifiedError> = "x".parse::<u32>().context("parsing");
    assert!(parsed.is_err());
}

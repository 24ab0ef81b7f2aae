use std::borrow::Cow;

/// Catalog loading and search errors.
#[sapp_derive::sapp_error]
pub enum CatalogError {
    /// The seed file could not be read.
    #[error("Catalog seed unreadable{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The seed document is not valid JSON or does not describe items.
    #[error("Catalog seed malformed{}: {source}", format_context(.context))]
    Parse { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Duplicate catalog item{}: {message}", format_context(.context))]
    DuplicateItem { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid catalog item{}: {message}", format_context(.context))]
    InvalidItem { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid search query{}: {message}", format_context(.context))]
    InvalidQuery { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

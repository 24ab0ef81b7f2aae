use std::borrow::Cow;

#[sapp_derive::sapp_error]
pub enum CartError {
    /// The session handle is unknown, closed, or expired after being idle.
    #[error("Cart session not found{}: {message}", format_context(.context))]
    SessionNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid wishlist notes{}: {message}", format_context(.context))]
    InvalidNotes { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal cart error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

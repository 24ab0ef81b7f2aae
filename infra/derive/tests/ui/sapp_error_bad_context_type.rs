use sapp_derive::sapp_error;

#[sapp_error]
pub enum DemoError {
    #[error("IO error: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },
}

fn main() {}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("invalid channel id {input:?}: {source}")]
    InvalidChannelId {
        input: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ── Context helpers ─────────────────────────────────────────────────────────

/// Error types that can be built from a bare message.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// `"{context}: {source}"` as the caller's error type.
pub fn contextual<E: FromMessage>(context: String, source: &dyn std::fmt::Display) -> E {
    E::from_message(format!("{context}: {source}"))
}

/// Define a crate-local `Context` trait adding `.context()` and
/// `.with_context()` to any `Result` with a displayable error.
///
/// The invoking module must have `Error: FromMessage` and a `Result<T>` alias
/// in scope, e.g. `logrelay_common::impl_context!();` in `config/src/error.rs`.
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> Result<T>;
            fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> Result<T>;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> Result<T> {
                self.with_context(|| context)
            }

            fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> Result<T> {
                self.map_err(|source| $crate::error::contextual::<Error>(f().into(), &source))
            }
        }
    };
}

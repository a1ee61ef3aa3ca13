use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("script is missing: received null or undefined")]
    MissingInput,

    #[error("script should be a string, input was `{received}`")]
    InvalidInput { received: String },

    /// A panic raised while lexing or rendering, caught at the top of a parse.
    #[error(
        "internal parser fault: {message}\nplease file a bug report and attach the script that triggered it"
    )]
    Internal { message: String },
}

impl ParseError {
    pub fn invalid_input(received: impl Into<String>) -> Self {
        ParseError::InvalidInput {
            received: received.into(),
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        ParseError::Internal { message }
    }
}

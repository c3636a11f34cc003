use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-in is not configured. Set IDEAPAL_SUPABASE_URL and IDEAPAL_SUPABASE_ANON_KEY.")]
    NotConfigured,
    #[error("Not authenticated.")]
    NotAuthenticated,
    #[error("could not reach the account service: {0}")]
    Request(#[from] reqwest::Error),
    /// Message reported by the service, passed through as-is.
    #[error("{message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// Profile form rejections. The messages are shown verbatim under the form.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Not authenticated.")]
    NotAuthenticated,
    #[error("Username is required.")]
    UsernameRequired,
    #[error("Username can only contain letters, numbers, and underscores.")]
    UsernameInvalid,
    #[error("Please enter a valid age.")]
    InvalidAge,
    #[error("Please enter a valid graduation year.")]
    InvalidGraduationYear,
    #[error("Username is already taken. Please choose another.")]
    UsernameTaken,
    #[error(transparent)]
    Backend(#[from] AuthError),
}

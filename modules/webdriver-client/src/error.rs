use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("WebDriver error: {0}")]
    Session(String),

    #[error("Script execution failed: {0}")]
    Script(String),
}

impl From<thirtyfour::error::WebDriverError> for SessionError {
    fn from(err: thirtyfour::error::WebDriverError) -> Self {
        SessionError::Session(err.to_string())
    }
}

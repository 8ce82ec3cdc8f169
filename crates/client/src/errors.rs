use thiserror::Error;

pub const LOGIN_FAILED: &str = "Invalid email or password";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response; `message` is the server's `message` field when present.
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("already subscribed to service {0}")]
    AlreadySubscribed(i32),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Banner text for a failed action.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } => message.clone(),
            ClientError::Network(_) => "Unable to reach the server. Please check your connection and try again.".into(),
            ClientError::Decode(_) => "The server sent an unexpected response.".into(),
            ClientError::AlreadySubscribed(_) => "You are already subscribed to this service.".into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_text() {
        let e = ClientError::Status { status: 409, message: "Customer is already subscribed to this service".into() };
        assert_eq!(e.user_message(), "Customer is already subscribed to this service");
        assert_eq!(e.status(), Some(409));
        assert!(ClientError::Network("refused".into()).user_message().starts_with("Unable to reach"));
        assert_eq!(ClientError::AlreadySubscribed(3).status(), None);
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_names_code_and_url() {
        let status = Error::Status {
            status: 503,
            url: "http://localhost/people/".to_string(),
        };
        assert_eq!(
            status.to_string(),
            "unexpected status 503 from http://localhost/people/"
        );
    }

    #[test]
    fn decode_error_converts_from_serde_json() {
        let decode = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = Error::from(decode);
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().starts_with("failed to decode response"));
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("catalog configuration error: {0}")]
    Configuration(String),

    #[error("unknown service code: {0}")]
    UnknownService(String),

    #[error("missing parameters for {service_code}: {}", .missing.join(", "))]
    MissingParameters {
        service_code: String,
        missing: Vec<String>,
    },

    #[error("http status {status}")]
    Transport { status: u16, body: String },

    #[error("query rejected: {description} (query string: {query_string})")]
    QueryRejected {
        description: String,
        query_string: String,
    },

    #[error("service code mismatch: requested {requested}, returned {returned}")]
    ServiceCodeMismatch { requested: String, returned: String },

    #[error("record {index} has no record type field")]
    MissingDiscriminator { index: usize },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
}

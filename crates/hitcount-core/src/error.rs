use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The input could not be turned into a site origin: empty, relative,
    /// unparseable, or missing a host.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

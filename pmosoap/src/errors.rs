use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving a WSDL or invoking one of its operations.
#[derive(Error, Debug)]
pub enum SoapClientError {
    /// Structural problem in the WSDL (e.g. a port without address).
    #[error("WSDL error: {0}")]
    Wsdl(String),

    /// Malformed or unexpected SOAP response.
    #[error("SOAP error: {0}")]
    Soap(String),

    /// The remote service reported a fault; carries the fault text verbatim.
    #[error("{0}")]
    Service(String),

    #[error("WSDL file {} does not exist or cannot be read: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Cannot encode request: {0}")]
    Encode(String),

    #[error("XML writing error: {0}")]
    XmlWrite(#[from] xmltree::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SoapClientError {
    pub fn wsdl(message: impl Into<String>) -> Self {
        SoapClientError::Wsdl(message.into())
    }

    pub fn soap(message: impl Into<String>) -> Self {
        SoapClientError::Soap(message.into())
    }

    pub fn encode(message: impl Into<String>) -> Self {
        SoapClientError::Encode(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        SoapClientError::Transport(message.into())
    }

    /// True when the remote service answered with a SOAP fault.
    pub fn is_service_fault(&self) -> bool {
        matches!(self, SoapClientError::Service(_))
    }
}

impl From<ureq::Error> for SoapClientError {
    fn from(err: ureq::Error) -> Self {
        SoapClientError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SoapClientError>;

//! # pmosoap - Generic document/literal SOAP client
//!
//! Reads a WSDL file, discovers its operations (endpoint, SOAP action,
//! response element) and exposes each of them as a callable taking nested
//! [`SoapValue`] data. No schema is used: request and response structure is
//! inferred from the data itself.
//!
//! ## Example
//!
//! ```no_run
//! use pmosoap::{Service, SoapValue, soap_map};
//!
//! let service = Service::load("stockquote.wsdl", None)?;
//! let price = service.call("GetLastTradePrice", &soap_map! { "tickerSymbol" => "ACME" })?;
//!
//! if let Some(text) = price.as_text() {
//!     println!("ACME: {text}");
//! }
//! # Ok::<(), pmosoap::SoapClientError>(())
//! ```
//!
//! ## Data mapping
//!
//! - a [`SoapMap`] entry `name => value` becomes `<name>value</name>`
//! - an entry `@name => value` becomes an attribute of the parent element
//! - a list under one key becomes repeated sibling elements
//! - on decoding, repeated siblings are merged into a [`SoapValue::List`],
//!   a single occurrence stays a scalar or a map

pub mod config;
pub mod datetime;
pub mod errors;
pub mod operation;
pub mod service;
pub mod soap;
pub mod transport;
pub mod value;
pub mod wsdl;

pub use config::SoapConfig;
pub use errors::{Result, SoapClientError};
pub use operation::Operation;
pub use service::Service;
pub use transport::{HttpRequest, Transport, UreqTransport};
pub use value::{ATTRIBUTE_MARKER, SoapMap, SoapValue};
pub use wsdl::{OperationDescriptor, ServiceDescriptor};

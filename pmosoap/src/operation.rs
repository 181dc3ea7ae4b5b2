use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::errors::Result;
use crate::soap::{decode_response, encode};
use crate::transport::{HttpRequest, Transport};
use crate::value::{SoapMap, SoapValue};
use crate::wsdl::OperationDescriptor;

/// Headers and namespaces injected into every request of one operation.
#[derive(Debug, Clone, Default)]
struct RequestConfig {
    headers: SoapMap,
    namespaces: IndexMap<String, String>,
}

/// A callable WSDL operation.
///
/// Header and namespace changes apply to every call started afterwards,
/// including calls made from other threads sharing this operation. A call
/// already in flight keeps the configuration it was encoded with.
pub struct Operation {
    descriptor: OperationDescriptor,
    config: RwLock<RequestConfig>,
    user_agent: String,
    transport: Arc<dyn Transport>,
}

impl Operation {
    pub fn new(
        descriptor: OperationDescriptor,
        user_agent: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            descriptor,
            config: RwLock::new(RequestConfig::default()),
            user_agent: user_agent.into(),
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    /// Add (or replace) one SOAP header field.
    pub fn add_header(&self, name: impl Into<String>, value: impl Into<SoapValue>) {
        self.config
            .write()
            .headers
            .insert(name.into(), value.into());
    }

    pub fn add_headers(&self, headers: &SoapMap) {
        let mut config = self.config.write();
        for (name, value) in headers {
            config.headers.insert(name.clone(), value.clone());
        }
    }

    /// Declare an extra `xmlns:<prefix>` on the request envelope.
    pub fn add_namespace(&self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.config
            .write()
            .namespaces
            .insert(prefix.into(), uri.into());
    }

    pub fn headers(&self) -> SoapMap {
        self.config.read().headers.clone()
    }

    pub fn namespaces(&self) -> IndexMap<String, String> {
        self.config.read().namespaces.clone()
    }

    /// Encode the request envelope without sending it.
    pub fn make_request(&self, params: &SoapMap) -> Result<String> {
        let config = self.config.read().clone();

        encode(
            &self.descriptor.name,
            &self.descriptor.target_namespace,
            &config.namespaces,
            &config.headers,
            &SoapValue::Map(params.clone()),
        )
    }

    /// Decode a raw response, stripping the WSDL output element if present.
    pub fn parse_response(&self, response: &[u8]) -> Result<SoapValue> {
        decode_response(response, &self.descriptor.response_name)
    }

    /// Encode, send and decode one call.
    ///
    /// `SOAPAction` carries the WSDL `soapAction` text verbatim and is
    /// omitted when empty.
    ///
    /// Faults reported by the service surface as
    /// [`SoapClientError::Service`](crate::SoapClientError::Service).
    pub fn invoke(&self, params: &SoapMap) -> Result<SoapValue> {
        let body = self.make_request(params)?;

        let mut request = HttpRequest::post(self.descriptor.endpoint.as_str(), body.into_bytes())
            .with_header("User-Agent", self.user_agent.as_str())
            .with_header("Content-Type", "text/xml");
        if !self.descriptor.soap_action.is_empty() {
            request = request.with_header("SOAPAction", self.descriptor.soap_action.as_str());
        }

        debug!(
            operation = %self.descriptor.name,
            endpoint = %self.descriptor.endpoint,
            "Invoking SOAP operation"
        );

        let response = self.transport.send(&request)?;
        self.parse_response(&response)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("descriptor", &self.descriptor)
            .field("config", &*self.config.read())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;

use crate::config::SoapConfig;
use crate::errors::{Result, SoapClientError};
use crate::operation::Operation;
use crate::transport::{Transport, UreqTransport};
use crate::value::{SoapMap, SoapValue};
use crate::wsdl::{ServiceDescriptor, resolve};

/// Proxy for a web service described by a WSDL file.
///
/// Operations are resolved once at load time and looked up by name.
///
/// ```no_run
/// use pmosoap::{Service, soap_map};
///
/// let service = Service::load("weather.wsdl", None)?;
/// let forecast = service.call("GetForecast", &soap_map! { "city" => "Lyon" })?;
/// println!("{forecast:?}");
/// # Ok::<(), pmosoap::SoapClientError>(())
/// ```
#[derive(Debug)]
pub struct Service {
    descriptor: ServiceDescriptor,
    operations: IndexMap<String, Operation>,
}

impl Service {
    /// Load a WSDL file with the default configuration and the ureq transport.
    pub fn load(path: impl AsRef<Path>, headers: Option<&SoapMap>) -> Result<Self> {
        let config = SoapConfig::default();
        let transport = Arc::new(UreqTransport::new(&config));
        let service = Self::load_with(path, &config, transport)?;

        if let Some(headers) = headers {
            service.add_headers_to_all(headers);
        }
        Ok(service)
    }

    pub fn load_with(
        path: impl AsRef<Path>,
        config: &SoapConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let wsdl = fs::read(path).map_err(|source| SoapClientError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_wsdl_bytes(&path.display().to_string(), &wsdl, config, transport)
    }

    /// Build the service from WSDL bytes the caller already holds.
    pub fn from_wsdl_bytes(
        source: &str,
        wsdl: &[u8],
        config: &SoapConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let descriptor = resolve(source, wsdl)?;

        let operations = descriptor
            .operations
            .iter()
            .map(|(name, op)| {
                (
                    name.clone(),
                    Operation::new(op.clone(), config.user_agent.as_str(), transport.clone()),
                )
            })
            .collect::<IndexMap<_, _>>();

        info!(
            source = %source,
            operations = operations.len(),
            "Loaded SOAP service"
        );

        Ok(Self {
            descriptor,
            operations,
        })
    }

    pub fn source(&self) -> &str {
        &self.descriptor.source
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Look up an operation; unknown names are an error.
    pub fn operation(&self, name: &str) -> Result<&Operation> {
        self.operations
            .get(name)
            .ok_or_else(|| SoapClientError::UnknownOperation(name.to_string()))
    }

    pub fn call(&self, name: &str, params: &SoapMap) -> Result<SoapValue> {
        self.operation(name)?.invoke(params)
    }

    pub fn add_headers_to_all(&self, headers: &SoapMap) {
        for operation in self.operations.values() {
            operation.add_headers(headers);
        }
    }

    pub fn add_namespace_to_all(&self, prefix: &str, uri: &str) {
        for operation in self.operations.values() {
            operation.add_namespace(prefix, uri);
        }
    }
}

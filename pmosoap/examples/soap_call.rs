//! Load a WSDL, list its operations and optionally call one of them.
//!
//! ```text
//! cargo run -p pmosoap --example soap_call -- service.wsdl
//! cargo run -p pmosoap --example soap_call -- --debug service.wsdl GetForecast '{"city": "Lyon"}'
//! ```
//!
//! `--debug` logs the raw request and response.

use std::env;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use pmosoap::{Service, SoapConfig, SoapMap, SoapValue, UreqTransport};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args: Vec<String> = env::args().collect();
    let debug = args.iter().any(|arg| arg == "--debug");
    args.retain(|arg| arg != "--debug");
    if args.len() < 2 {
        return Err(anyhow!(
            "usage: {} [--debug] <wsdl> [operation] [json params]",
            args[0]
        ));
    }

    let config = SoapConfig::default().with_debug(debug);
    let transport = Arc::new(UreqTransport::new(&config));
    let service = Service::load_with(&args[1], &config, transport)?;

    let Some(operation_name) = args.get(2) else {
        println!("Operations of {}:", service.source());
        for operation in service.operations() {
            let descriptor = operation.descriptor();
            println!(
                "  {} -> {} (SOAPAction: {:?})",
                descriptor.name, descriptor.endpoint, descriptor.soap_action
            );
        }
        return Ok(());
    };

    let params = match args.get(3) {
        Some(json) => match SoapValue::from(serde_json::from_str::<serde_json::Value>(json)?) {
            SoapValue::Map(map) => map,
            _ => return Err(anyhow!("parameters must be a JSON object")),
        },
        None => SoapMap::new(),
    };

    let result = service.call(operation_name, &params)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

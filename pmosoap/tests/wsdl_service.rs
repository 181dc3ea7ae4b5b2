use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};

use pmosoap::soap::decode_response;
use pmosoap::{
    HttpRequest, Service, SoapClientError, SoapConfig, SoapMap, SoapValue, Transport, soap_map,
};

const STOCKQUOTE_WSDL: &str = include_str!("data/stockquote.wsdl");

/// Replays canned responses in order and keeps every request it receives.
struct ScriptedTransport {
    replies: Mutex<VecDeque<String>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn with_replies(replies: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> pmosoap::Result<Vec<u8>> {
        self.sent.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .map(String::into_bytes)
            .ok_or_else(|| SoapClientError::transport("no scripted reply left"))
    }
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>{body}</soap:Body>
</soap:Envelope>"#
    )
}

fn write_wsdl(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("stockquote.wsdl");
    fs::write(&path, STOCKQUOTE_WSDL).unwrap();
    path
}

#[test]
fn load_discovers_operations_from_all_ports() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_wsdl(&dir);

    let service = Service::load_with(
        &path,
        &SoapConfig::default(),
        ScriptedTransport::with_replies(Vec::new()),
    )?;

    let names: Vec<&str> = service.operation_names().collect();
    assert_eq!(names, vec!["GetLastTradePrice", "ListSymbols", "GetHistory"]);
    assert_eq!(service.descriptor().target_namespace, "http://example.com/stockquote");

    let history = service.operation("GetHistory")?.descriptor();
    assert_eq!(history.endpoint, "https://quotes.example.com/stockquote12");
    assert_eq!(history.soap_action, "http://example.com/GetHistory");
    assert_eq!(history.response_name, "");
    assert_eq!(history.port, "StockQuoteSoap12Port");
    assert_eq!(history.binding, "StockQuoteSoap12Binding");

    Ok(())
}

#[test]
fn load_with_headers_applies_them_to_every_operation() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_wsdl(&dir);

    let headers = soap_map! { "ApiKey" => "secret" };
    let service = Service::load(&path, Some(&headers))?;

    for operation in service.operations() {
        assert_eq!(operation.headers(), headers);
    }
    Ok(())
}

#[test]
fn missing_wsdl_file_is_a_load_error() {
    let result = Service::load("/definitely/not/here.wsdl", None);
    assert!(matches!(result, Err(SoapClientError::Load { .. })));
}

#[test]
fn call_encodes_sends_and_unwraps() -> anyhow::Result<()> {
    let transport = ScriptedTransport::with_replies(vec![envelope(
        r#"<m:GetLastTradePriceResponse xmlns:m="http://example.com/stockquote"><m:price>34.5</m:price></m:GetLastTradePriceResponse>"#,
    )]);
    let service = Service::from_wsdl_bytes(
        "stockquote.wsdl",
        STOCKQUOTE_WSDL.as_bytes(),
        &SoapConfig::default().with_user_agent("quotes-test/1.0"),
        transport.clone(),
    )?;

    let price = service.call("GetLastTradePrice", &soap_map! { "tickerSymbol" => "ACME" })?;
    assert_eq!(price, SoapValue::from("34.5"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "http://quotes.example.com/stockquote");
    assert_eq!(sent[0].header("User-Agent"), Some("quotes-test/1.0"));
    assert_eq!(
        sent[0].header("SOAPAction"),
        Some("http://example.com/GetLastTradePrice")
    );

    let body = String::from_utf8(sent[0].body.clone())?;
    assert!(body.contains("xmlns=\"http://example.com/stockquote\""));
    assert!(body.contains("<GetLastTradePrice><tickerSymbol>ACME</tickerSymbol></GetLastTradePrice>"));

    Ok(())
}

#[test]
fn repeated_response_elements_become_a_list() -> anyhow::Result<()> {
    let transport = ScriptedTransport::with_replies(vec![
        envelope("<ListSymbolsResponse><symbol>ACME</symbol></ListSymbolsResponse>"),
        envelope(
            "<ListSymbolsResponse><symbol>ACME</symbol><symbol>INIT</symbol><symbol>WAYNE</symbol></ListSymbolsResponse>",
        ),
    ]);
    let service = Service::from_wsdl_bytes(
        "stockquote.wsdl",
        STOCKQUOTE_WSDL.as_bytes(),
        &SoapConfig::default(),
        transport.clone(),
    )?;

    let single = service.call("ListSymbols", &SoapMap::new())?;
    assert_eq!(single, SoapValue::from("ACME"));

    let many = service.call("ListSymbols", &SoapMap::new())?;
    assert_eq!(many, SoapValue::from(vec!["ACME", "INIT", "WAYNE"]));

    // Empty soapAction: header omitted
    assert!(transport.sent().iter().all(|r| r.header("SOAPAction").is_none()));
    Ok(())
}

#[test]
fn fault_is_reported_as_service_error() -> anyhow::Result<()> {
    let transport = ScriptedTransport::with_replies(vec![envelope(
        "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>Unknown symbol XYZ</faultstring><detail/></soap:Fault>",
    )]);
    let service = Service::from_wsdl_bytes(
        "stockquote.wsdl",
        STOCKQUOTE_WSDL.as_bytes(),
        &SoapConfig::default(),
        transport,
    )?;

    let err = service
        .call("GetLastTradePrice", &soap_map! { "tickerSymbol" => "XYZ" })
        .unwrap_err();
    assert!(err.is_service_fault());
    assert_eq!(err.to_string(), "Unknown symbol XYZ");
    Ok(())
}

#[test]
fn response_without_body_is_a_soap_error() -> anyhow::Result<()> {
    let transport = ScriptedTransport::with_replies(vec![
        "<html><body>Bad gateway</body></html>".to_string(),
    ]);
    let service = Service::from_wsdl_bytes(
        "stockquote.wsdl",
        STOCKQUOTE_WSDL.as_bytes(),
        &SoapConfig::default(),
        transport,
    )?;

    assert!(matches!(
        service.call("ListSymbols", &SoapMap::new()),
        Err(SoapClientError::Soap(_))
    ));
    Ok(())
}

#[test]
fn scalar_request_round_trips_through_decoding() -> anyhow::Result<()> {
    let service = Service::from_wsdl_bytes(
        "stockquote.wsdl",
        STOCKQUOTE_WSDL.as_bytes(),
        &SoapConfig::default(),
        ScriptedTransport::with_replies(Vec::new()),
    )?;
    let operation = service.operation("GetHistory")?;
    operation.add_namespace("xsd", "http://www.w3.org/2001/XMLSchema");

    let params = soap_map! {
        "symbol" => "ACME",
        "days" => 30,
        "detailed" => true,
        "range" => soap_map! { "from" => "2024-01-01", "to" => "2024-01-31" },
        "field" => vec!["open", "close"],
    };

    let request = operation.make_request(&params)?;
    let decoded = decode_response(request.as_bytes(), "")?;

    let expected = soap_map! {
        "symbol" => "ACME",
        "days" => "30",
        "detailed" => "true",
        "range" => soap_map! { "from" => "2024-01-01", "to" => "2024-01-31" },
        "field" => vec!["open", "close"],
    };
    assert_eq!(decoded.get("GetHistory"), Some(&SoapValue::from(expected)));
    Ok(())
}

#[test]
fn whitespace_text_round_trips_through_decoding() -> anyhow::Result<()> {
    let service = Service::from_wsdl_bytes(
        "stockquote.wsdl",
        STOCKQUOTE_WSDL.as_bytes(),
        &SoapConfig::default(),
        ScriptedTransport::with_replies(Vec::new()),
    )?;

    let params = soap_map! { "sep" => " ", "symbol" => "ACME" };
    let request = service.operation("ListSymbols")?.make_request(&params)?;
    let decoded = decode_response(request.as_bytes(), "ListSymbols")?;

    assert_eq!(decoded, SoapValue::from(params));
    Ok(())
}

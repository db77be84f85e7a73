//! Unit tests for the web console component.

use std::io::{Read, Write};
use std::net::TcpStream;

use rstest::{fixture, rstest};
use serde_json::Value;

use super::*;
use crate::{ManagementComponent, WrappedComponent};

#[fixture]
fn registry() -> Arc<ObjectRegistry> {
    ObjectRegistry::shared()
}

fn started(registry: &Arc<ObjectRegistry>) -> (WrappedComponent<WebConsoleDelegateFactory>, String) {
    let mut component = WrappedComponent::new(WebConsoleDelegateFactory::new(Arc::clone(registry)));
    component
        .init(&BootstrapProperties::from_pairs([(
            WEBCONSOLE_LISTEN_ADDRESS,
            "tcp://127.0.0.1:0",
        )]))
        .expect("init console");
    component.start().expect("start console");
    let name = ObjectName::parse(WEBCONSOLE_OBJECT_NAME).expect("console name");
    let bound = registry
        .attributes(&name)
        .expect("console registered")
        .get("boundAddress")
        .and_then(Value::as_str)
        .expect("console bound")
        .to_owned();
    (component, bound)
}

fn http(address: &str, request_line: &str) -> (String, Value) {
    let mut stream = TcpStream::connect(address).expect("connect to console");
    stream
        .write_all(format!("{request_line}\r\nHost: localhost\r\nConnection: close\r\n\r\n").as_bytes())
        .expect("write request");
    let mut response = String::new();
    stream.read_to_string(&mut response).expect("read response");
    let (head, body) = response.split_once("\r\n\r\n").expect("http response");
    let status = head.lines().next().unwrap_or_default().to_owned();
    (status, serde_json::from_str(body).expect("json body"))
}

#[rstest]
fn missing_address_leaves_console_inert(registry: Arc<ObjectRegistry>) {
    let mut component = WrappedComponent::new(WebConsoleDelegateFactory::new(Arc::clone(&registry)));
    component.init(&BootstrapProperties::new()).expect("init");
    component.start().expect("start");

    assert!(registry.is_empty());
    assert!(!component.delegate().is_configured());
}

#[rstest]
fn lists_registered_objects(registry: Arc<ObjectRegistry>) {
    let (mut component, address) = started(&registry);

    let (status, body) = http(&address, "GET /objects HTTP/1.1");

    assert_eq!(status, "HTTP/1.1 200 OK");
    let objects = body
        .get("objects")
        .and_then(Value::as_array)
        .expect("objects array");
    assert_eq!(objects.len(), 1);
    let first = objects.first().expect("console entry");
    assert_eq!(first.get("name"), Some(&json!(WEBCONSOLE_OBJECT_NAME)));
    assert_eq!(first.get("kind"), Some(&json!("WebConsole")));

    component.destroy().expect("destroy");
    assert!(registry.is_empty());
}

#[rstest]
#[case::unknown_path("GET /admin HTTP/1.1", "HTTP/1.1 404 Not Found")]
#[case::wrong_method("POST /objects HTTP/1.1", "HTTP/1.1 405 Method Not Allowed")]
fn rejects_other_requests(
    registry: Arc<ObjectRegistry>,
    #[case] request_line: &str,
    #[case] expected: &str,
) {
    let (mut component, address) = started(&registry);

    let (status, body) = http(&address, request_line);

    assert_eq!(status, expected);
    assert!(body.get("error").is_some());
    component.destroy().expect("destroy");
}

#[rstest]
fn stopped_console_refuses_connections(registry: Arc<ObjectRegistry>) {
    let (mut component, address) = started(&registry);
    let (status, _) = http(&address, "GET /objects HTTP/1.1");
    assert_eq!(status, "HTTP/1.1 200 OK");

    component.stop().expect("stop console");

    let name = ObjectName::parse(WEBCONSOLE_OBJECT_NAME).expect("console name");
    let attributes = registry.attributes(&name).expect("console still registered");
    assert_eq!(attributes.get("active"), Some(&json!(false)));
    assert!(TcpStream::connect(address.as_str()).is_err());
    component.destroy().expect("destroy");
}

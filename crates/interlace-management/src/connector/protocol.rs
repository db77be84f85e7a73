//! Line protocol spoken by the connector server.
//!
//! Each request is one line and each reply one JSON document on its own line:
//!
//! - `AUTH <token>` authenticates the connection when a token is configured;
//! - `LIST` replies with the registered object names;
//! - `GET <name>` replies with the object's attributes;
//! - `QUIT` closes the connection.
//!
//! Failures reply with `{"error": "..."}`.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::listener::ConnectionHandler;
use crate::{MANAGEMENT_TARGET, ObjectName, ObjectRegistry};

const MAX_LINE_BYTES: u64 = 8 * 1024;

pub(super) struct ConnectorProtocol {
    registry: Arc<ObjectRegistry>,
    token: Option<String>,
}

enum Reply {
    Continue(Value),
    Close(Option<Value>),
}

impl ConnectorProtocol {
    pub(super) const fn new(registry: Arc<ObjectRegistry>, token: Option<String>) -> Self {
        Self { registry, token }
    }

    fn serve(&self, stream: TcpStream) -> io::Result<()> {
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let mut authenticated = self.token.is_none();
        let mut line = String::new();
        loop {
            line.clear();
            let read = (&mut reader)
                .take(MAX_LINE_BYTES)
                .read_line(&mut line)?;
            if read == 0 {
                return Ok(());
            }
            let reply = if authenticated {
                self.dispatch(line.trim())
            } else {
                self.authenticate(line.trim(), &mut authenticated)
            };
            match reply {
                Reply::Continue(value) => write_reply(&mut writer, &value)?,
                Reply::Close(value) => {
                    if let Some(last) = value {
                        write_reply(&mut writer, &last)?;
                    }
                    return Ok(());
                }
            }
        }
    }

    fn authenticate(&self, request: &str, authenticated: &mut bool) -> Reply {
        let offered = request.strip_prefix("AUTH ").map(str::trim);
        if offered.is_some() && offered == self.token.as_deref() {
            *authenticated = true;
            return Reply::Continue(json!({ "ok": true }));
        }
        Reply::Close(Some(error("authentication required")))
    }

    fn dispatch(&self, request: &str) -> Reply {
        let (command, argument) = request
            .split_once(' ')
            .map_or((request, ""), |(command, rest)| (command, rest.trim()));
        match command {
            "LIST" => {
                let names: Vec<String> = self
                    .registry
                    .names()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                Reply::Continue(json!(names))
            }
            "GET" => Reply::Continue(self.attributes(argument)),
            "AUTH" => Reply::Continue(json!({ "ok": true })),
            "QUIT" => Reply::Close(None),
            "" => Reply::Continue(error("empty request")),
            other => Reply::Continue(error(&format!("unknown command '{other}'"))),
        }
    }

    fn attributes(&self, raw_name: &str) -> Value {
        match ObjectName::parse(raw_name).and_then(|name| self.registry.attributes(&name)) {
            Ok(attributes) => json!(attributes),
            Err(failure) => error(&failure.to_string()),
        }
    }
}

impl ConnectionHandler for ConnectorProtocol {
    fn handle(&self, stream: TcpStream) {
        if let Err(error) = self.serve(stream) {
            tracing::debug!(target: MANAGEMENT_TARGET, %error, "connector connection closed");
        }
    }
}

fn error(message: &str) -> Value {
    json!({ "error": message })
}

fn write_reply(writer: &mut impl Write, value: &Value) -> io::Result<()> {
    let mut encoded = serde_json::to_vec(value).map_err(io::Error::other)?;
    encoded.push(b'\n');
    writer.write_all(&encoded)?;
    writer.flush()
}

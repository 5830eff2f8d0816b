//! In-process HTTP stub for integration tests.
//!
//! Each stub accepts exactly one connection on 127.0.0.1, records the
//! request and answers with a canned response followed by `Connection: close`.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct StubServer {
    pub base_url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl StubServer {
    /// Serves one response with the given status line and body.
    pub fn respond(status: u16, reason: &str, content_type: &str, body: &str) -> Self {
        Self::respond_with_headers(status, reason, &[("Content-Type", content_type)], body)
    }

    /// Like [`respond`](Self::respond), with arbitrary extra headers.
    pub fn respond_with_headers(
        status: u16,
        reason: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let base_url = format!("http://{}", listener.local_addr().expect("stub address"));
        let response = http_response(status, reason, headers, body);

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept stub connection");
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).expect("write stub response");
            stream.flush().expect("flush stub response");
            request
        });

        StubServer { base_url, handle }
    }

    pub fn json(status: u16, body: &str) -> Self {
        let reason = if status == 200 { "OK" } else { "Error" };
        Self::respond(status, reason, "application/json", body)
    }

    /// Waits for the single request and returns it.
    pub fn captured(self) -> CapturedRequest {
        self.handle.join().expect("stub thread panicked")
    }
}

fn http_response(status: u16, reason: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {} {}\r\n", status, reason);
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ));
    response
}

/// Serves one JSON response over TLS with a freshly generated self-signed
/// certificate for `localhost`. Returns the `https://localhost:<port>` base URL.
///
/// The handshake fails when the client verifies certificates; the thread then
/// just exits.
pub fn self_signed_tls_server(body: &str) -> String {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .expect("generate self-signed certificate");
    let cert_der = cert.serialize_der().expect("serialize certificate");
    let key_der = cert.serialize_private_key_der();

    let config = rustls::ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(vec![rustls::Certificate(cert_der)], rustls::PrivateKey(key_der))
        .expect("server TLS config");
    let config = Arc::new(config);

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind TLS listener");
    let port = listener.local_addr().expect("TLS address").port();
    let response = http_response(200, "OK", &[("Content-Type", "application/json")], body);

    thread::spawn(move || {
        let Ok((tcp, _)) = listener.accept() else {
            return;
        };
        let Ok(connection) = rustls::ServerConnection::new(config) else {
            return;
        };
        let mut tls = rustls::StreamOwned::new(connection, tcp);
        if skip_request_head(&mut tls).is_err() {
            return;
        }
        let _ = tls.write_all(response.as_bytes());
        let _ = tls.flush();
        tls.conn.send_close_notify();
        let _ = tls.flush();
    });

    format!("https://localhost:{}", port)
}

/// Reads up to the blank line that ends a request head.
fn skip_request_head(stream: &mut impl Read) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line.trim_end().is_empty() {
            return Ok(());
        }
    }
}

/// Accepts one connection and never answers it.
pub fn silent_server(hold_for: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind silent listener");
    let base_url = format!("http://{}", listener.local_addr().expect("silent address"));
    thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(hold_for);
            drop(stream);
        }
    });
    base_url
}

/// Accepts one connection, writes plain-text HTTP without reading, and closes.
/// A TLS client talking to it sees garbage instead of a handshake.
pub fn plaintext_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind plaintext listener");
    let addr = listener.local_addr().expect("plaintext address");
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = stream.write_all(
                b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            let _ = stream.flush();
            thread::sleep(Duration::from_millis(200));
        }
    });
    format!("https://{}", addr)
}

/// An address nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway address");
    drop(listener);
    format!("http://{}", addr)
}

fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("read request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header line");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).expect("read request body");

    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

//! HTTP transport boundary
//!
//! The adapters never touch the network directly. They build an
//! [`HttpRequest`] descriptor and hand it to a [`Transport`], which yields the
//! parsed JSON payload. [`MonoioHttpsClient`] is the production transport:
//! - Single-threaded async with monoio
//! - Direct TLS integration with rustls (verification configurable)
//! - One HTTP/1.1 exchange per connection (`Connection: close`)

use crate::errors::{ExchangeError, Result};
use coinbridge_core::PerfTimer;

use async_trait::async_trait;
use monoio::io::{AsyncReadRent, AsyncWriteRentExt};
use monoio::net::TcpStream;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP method used by the exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Fully built request, consumed once by a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Target URL, possibly already carrying a literal query string
    pub url: String,
    /// Pre-encoded query string appended to `url`
    pub query: Option<String>,
    /// Pre-encoded `application/x-www-form-urlencoded` body
    pub form: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    /// New GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// New POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: None,
            form: None,
            headers: BTreeMap::new(),
        }
    }

    /// Attach an encoded query string (ignored when empty)
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    /// Attach an encoded form body
    pub fn with_form(mut self, body: impl Into<String>) -> Self {
        self.form = Some(body.into());
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Header value by exact name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// URL placed on the request line
    pub fn target(&self) -> String {
        match &self.query {
            None => self.url.clone(),
            Some(query) if self.url.ends_with('?') => format!("{}{}", self.url, query),
            Some(query) => format!("{}?{}", self.url, query),
        }
    }
}

/// Executes request descriptors against an exchange.
///
/// Errors mean no payload was obtained; exchange-level rejections arrive as
/// an `Ok` JSON payload.
#[async_trait(?Send)]
pub trait Transport {
    async fn execute(&self, request: HttpRequest) -> Result<Value>;
}

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientOptions {
    /// Verify server certificates against the webpki roots
    pub strict_tls: bool,
    /// Deadline for connect + request + response; requires a runtime built
    /// with timers enabled
    pub timeout: Option<Duration>,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            strict_tls: true,
            timeout: None,
        }
    }
}

/// Parse a base URL, accepting only `https`
pub fn parse_https_url(raw: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(raw)?;
    if parsed.scheme() != "https" {
        return Err(ExchangeError::InvalidUrl(format!(
            "{raw}: scheme must be https, got {}",
            parsed.scheme()
        )));
    }
    Ok(parsed)
}

/// Monoio-native HTTPS client
pub struct MonoioHttpsClient {
    tls_config: Arc<ClientConfig>,
    timeout: Option<Duration>,
}

/// Raw HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON, classifying failures by status
    pub fn into_json(self) -> Result<Value> {
        let parsed = serde_json::from_str::<Value>(&self.body);
        match parsed {
            Ok(value) => Ok(value),
            Err(_) if !(200..300).contains(&self.status) => {
                Err(ExchangeError::HttpError(self.status, self.body))
            }
            Err(e) => Err(ExchangeError::Serialization(format!("{e}: {}", self.body))),
        }
    }
}

impl MonoioHttpsClient {
    /// Create a new HTTPS client with strict certificate verification
    pub fn new() -> Result<Self> {
        Self::with_options(HttpClientOptions::default())
    }

    /// Create a client with explicit TLS and timeout settings
    pub fn with_options(options: HttpClientOptions) -> Result<Self> {
        let tls_config = if options.strict_tls {
            let mut root_store = rustls::RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth()
        } else {
            warn!("⚠️  TLS certificate verification disabled");
            ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoCertificateVerification))
                .with_no_client_auth()
        };

        Ok(Self {
            tls_config: Arc::new(tls_config),
            timeout: options.timeout,
        })
    }

    /// Send a request and return the raw response
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        match self.timeout {
            Some(limit) => monoio::time::timeout(limit, self.send_inner(request))
                .await
                .map_err(|_| {
                    ExchangeError::Timeout(format!("{} {} after {limit:?}", request.method.as_str(), request.url))
                })?,
            None => self.send_inner(request).await,
        }
    }

    async fn send_inner(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let target = request.target();
        let parsed_url = parse_https_url(&target)?;

        let host = parsed_url
            .host_str()
            .ok_or_else(|| ExchangeError::InvalidUrl("No host in URL".to_string()))?
            .to_string();
        let port = parsed_url.port_or_known_default().unwrap_or(443);
        let mut path_and_query = match parsed_url.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };
        if let Some(query) = parsed_url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        let tcp_stream = TcpStream::connect(format!("{host}:{port}"))
            .await
            .map_err(|e| ExchangeError::Transport(format!("TCP connect failed: {e}")))?;

        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| ExchangeError::Transport(format!("Invalid server name: {e:?}")))?;
        let tls_conn = ClientConnection::new(self.tls_config.clone(), server_name)
            .map_err(|e| ExchangeError::Transport(format!("TLS setup failed: {e}")))?;
        let mut tls_stream = TlsStream::new(tcp_stream, tls_conn);

        let body = request.form.as_deref().unwrap_or("");
        let mut head = format!(
            "{} {path_and_query} HTTP/1.1\r\n\
             Host: {host}\r\n\
             User-Agent: CoinBridge/0.1\r\n\
             Accept: application/json\r\n\
             Connection: close\r\n\
             Content-Length: {}\r\n",
            request.method.as_str(),
            body.len()
        );
        if request.form.is_some() {
            head.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
        }
        for (name, value) in &request.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");
        head.push_str(body);

        tls_stream.write_all(head.as_bytes()).await?;
        let raw = tls_stream.read_to_end().await?;

        parse_http_response(&raw)
    }
}

#[async_trait(?Send)]
impl Transport for MonoioHttpsClient {
    async fn execute(&self, request: HttpRequest) -> Result<Value> {
        let _timer = PerfTimer::start(format!("http_{}", request.method.as_str()));
        let response = self.send(&request).await?;
        debug!("📡 {} -> {}", request.method.as_str(), response.status);
        response.into_json()
    }
}

/// Parse a complete HTTP/1.1 response
fn parse_http_response(data: &[u8]) -> Result<HttpResponse> {
    let header_end = data
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or_else(|| ExchangeError::Transport("Invalid HTTP response: no header terminator".to_string()))?;

    let head = String::from_utf8_lossy(&data[..header_end]);
    let mut lines = head.lines();

    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| ExchangeError::Transport("Invalid status line".to_string()))?;

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let mut response = HttpResponse {
        status,
        headers,
        body: String::new(),
    };

    let raw_body = &data[header_end + 4..];
    let chunked = response
        .header("Transfer-Encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));
    response.body = if chunked {
        String::from_utf8_lossy(&decode_chunked(raw_body)?).into_owned()
    } else {
        String::from_utf8_lossy(raw_body).into_owned()
    };

    Ok(response)
}

/// Decode a `Transfer-Encoding: chunked` body
fn decode_chunked(mut data: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(data.len());
    loop {
        let line_end = data
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or_else(|| ExchangeError::Transport("Truncated chunk header".to_string()))?;
        let size_text = String::from_utf8_lossy(&data[..line_end]);
        // chunk extensions follow a ';'
        let size_hex = size_text.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| ExchangeError::Transport(format!("Invalid chunk size: {size_hex}")))?;

        data = &data[line_end + 2..];
        if size == 0 {
            return Ok(body);
        }
        if data.len() < size {
            return Err(ExchangeError::Transport("Truncated chunk body".to_string()));
        }
        body.extend_from_slice(&data[..size]);
        data = data.get(size + 2..).unwrap_or(&[]);
    }
}

/// rustls session driven over a monoio TCP stream
struct TlsStream {
    stream: TcpStream,
    tls_conn: ClientConnection,
}

impl TlsStream {
    fn new(stream: TcpStream, tls_conn: ClientConnection) -> Self {
        Self { stream, tls_conn }
    }

    /// Push all pending TLS records to the socket
    async fn flush_tls(&mut self) -> Result<()> {
        while self.tls_conn.wants_write() {
            let mut records = Vec::with_capacity(8192);
            self.tls_conn
                .write_tls(&mut records)
                .map_err(|e| ExchangeError::Transport(format!("TLS write failed: {e}")))?;
            if !records.is_empty() {
                let (result, _) = self.stream.write_all(records).await;
                result.map_err(|e| ExchangeError::Transport(format!("TCP write failed: {e}")))?;
            }
        }
        Ok(())
    }

    /// Read one batch of TLS records from the socket. Returns false on EOF.
    async fn fill_tls(&mut self) -> Result<bool> {
        let (result, buf) = self.stream.read(vec![0u8; 4096]).await;
        let bytes_read =
            result.map_err(|e| ExchangeError::Transport(format!("TCP read failed: {e}")))?;
        if bytes_read == 0 {
            return Ok(false);
        }

        self.tls_conn
            .read_tls(&mut std::io::Cursor::new(&buf[..bytes_read]))
            .map_err(|e| ExchangeError::Transport(format!("TLS read failed: {e}")))?;
        self.tls_conn
            .process_new_packets()
            .map_err(|e| ExchangeError::Transport(format!("TLS process failed: {e}")))?;
        Ok(true)
    }

    async fn complete_handshake(&mut self) -> Result<()> {
        while self.tls_conn.is_handshaking() {
            self.flush_tls().await?;
            if !self.tls_conn.is_handshaking() {
                break;
            }
            if !self.fill_tls().await? {
                return Err(ExchangeError::Transport(
                    "Connection closed during handshake".to_string(),
                ));
            }
        }
        self.flush_tls().await
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.complete_handshake().await?;
        self.tls_conn
            .writer()
            .write_all(data)
            .map_err(|e| ExchangeError::Transport(format!("TLS application write failed: {e}")))?;
        self.flush_tls().await
    }

    async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        let mut plaintext = vec![0u8; 4096];

        loop {
            match self.tls_conn.reader().read(&mut plaintext) {
                Ok(0) => break,
                Ok(n) => {
                    response.extend_from_slice(&plaintext[..n]);
                    continue;
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                // servers commonly close without close_notify
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(ExchangeError::Transport(format!("TLS read failed: {e}"))),
            }

            if !self.fill_tls().await? {
                break;
            }
        }

        Ok(response)
    }
}

/// Certificate verifier that accepts any server, for `strict_tls = false`
#[derive(Debug)]
struct NoCertificateVerification;

impl ServerCertVerifier for NoCertificateVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

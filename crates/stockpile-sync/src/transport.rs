//! # Remote Transport
//!
//! Request/response access to the remote source of truth.
//!
//! ## Wire Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     {base_url}/{products_path}                          │
//! │                                                                         │
//! │  GET   ──►  200 [ {id,name,price_cents,quantity}, ... ]                 │
//! │             non-2xx                ──► Err(UnexpectedStatus)            │
//! │             empty / "null" body    ──► Ok(vec![])                       │
//! │                                                                         │
//! │  POST {product}  ──►  any status, body optional                         │
//! │             RemoteResponse { status, body: Option<Product> }            │
//! │             the repository decides what a status means                  │
//! │                                                                         │
//! │  No response at all (refused, reset, timeout) ──► Err(...)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use stockpile_core::Product;

use crate::config::RemoteSettings;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Response
// =============================================================================

/// A response from the remote that carried a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse<T> {
    /// HTTP status code.
    pub status: u16,

    /// Decoded body, `None` when the remote sent nothing.
    pub body: Option<T>,
}

impl<T> RemoteResponse<T> {
    /// Creates a response.
    pub fn new(status: u16, body: Option<T>) -> Self {
        RemoteResponse { status, body }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Remote source of truth for products.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Fetches the full remote collection.
    async fn list_all(&self) -> SyncResult<Vec<Product>>;

    /// Submits one product.
    ///
    /// `Err` only when no response arrived; every status code is `Ok`.
    async fn save(&self, product: &Product) -> SyncResult<RemoteResponse<Product>>;
}

// =============================================================================
// HTTP Transport
// =============================================================================

/// JSON-over-HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    products_url: Url,
}

impl HttpTransport {
    /// Builds the client and resolves the collection URL.
    pub fn new(settings: &RemoteSettings) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        let products_url = products_url(&settings.base_url, &settings.products_path)?;
        debug!(url = %products_url, "Remote transport ready");

        Ok(HttpTransport {
            client,
            products_url,
        })
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn list_all(&self) -> SyncResult<Vec<Product>> {
        let response = self.client.get(self.products_url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), url = %self.products_url, "Remote list rejected");
            return Err(SyncError::UnexpectedStatus(status.as_u16()));
        }

        let text = response.text().await?;
        let products: Vec<Product> = parse_optional_body(&text)?.unwrap_or_default();

        debug!(count = products.len(), "Remote list received");
        Ok(products)
    }

    async fn save(&self, product: &Product) -> SyncResult<RemoteResponse<Product>> {
        let response = self
            .client
            .post(self.products_url.clone())
            .json(product)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), id = ?product.id, "Remote save rejected");
            return Ok(RemoteResponse::new(status.as_u16(), None));
        }

        let text = response.text().await?;
        let body = parse_optional_body::<Product>(&text)?;
        debug!(
            status = status.as_u16(),
            id = ?product.id,
            has_body = body.is_some(),
            "Remote save confirmed"
        );

        Ok(RemoteResponse::new(status.as_u16(), body))
    }
}

/// Joins the collection path onto the base URL.
///
/// The base is treated as a directory whether or not it ends in `/`.
fn products_url(base_url: &str, products_path: &str) -> SyncResult<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }

    Ok(base.join(products_path.trim_start_matches('/'))?)
}

/// Decodes a body that may legitimately be absent.
///
/// Empty, whitespace-only and literal `null` bodies are `None`.
fn parse_optional_body<T: DeserializeOwned>(text: &str) -> SyncResult<Option<T>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport_for(server: &MockServer) -> HttpTransport {
        HttpTransport::new(&RemoteSettings::new(server.uri())).unwrap()
    }

    #[test]
    fn test_products_url_normalization() {
        assert_eq!(
            products_url("http://host:8080", "products").unwrap().as_str(),
            "http://host:8080/products"
        );
        assert_eq!(
            products_url("http://host:8080/api", "/products").unwrap().as_str(),
            "http://host:8080/api/products"
        );
        assert_eq!(
            products_url("http://host:8080/api/", "products").unwrap().as_str(),
            "http://host:8080/api/products"
        );
        assert!(products_url("::nope::", "products").is_err());
    }

    #[test]
    fn test_parse_optional_body() {
        assert_eq!(parse_optional_body::<Product>("").unwrap(), None);
        assert_eq!(parse_optional_body::<Product>("  \n").unwrap(), None);
        assert_eq!(parse_optional_body::<Product>("null").unwrap(), None);
        assert_eq!(
            parse_optional_body::<Product>(r#"{"id":4,"name":"Ink","price_cents":300,"quantity":3}"#)
                .unwrap(),
            Some(Product::new("Ink", 300, 3).with_id(4))
        );
        assert!(matches!(
            parse_optional_body::<Product>("<html>"),
            Err(SyncError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn test_response_success_range() {
        assert!(RemoteResponse::<Product>::new(200, None).is_success());
        assert!(RemoteResponse::<Product>::new(201, None).is_success());
        assert!(!RemoteResponse::<Product>::new(304, None).is_success());
        assert!(!RemoteResponse::<Product>::new(400, None).is_success());
    }

    #[tokio::test]
    async fn test_list_all_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Pen", "price_cents": 150, "quantity": 7},
                {"id": 2, "name": "Ink", "price_cents": 300, "quantity": 3}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let products = transport_for(&server).list_all().await.unwrap();

        assert_eq!(
            products,
            vec![
                Product::new("Pen", 150, 7).with_id(1),
                Product::new("Ink", 300, 3).with_id(2),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_all_null_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        assert!(transport_for(&server).list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = transport_for(&server).list_all().await.unwrap_err();
        assert!(matches!(err, SyncError::UnexpectedStatus(500)));
    }

    #[tokio::test]
    async fn test_save_created_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .and(body_json(json!({"name": "Pen", "price_cents": 150, "quantity": 10})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!(
                {"id": 1, "name": "Pen", "price_cents": 150, "quantity": 10}
            )))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport_for(&server)
            .save(&Product::new("Pen", 150, 10))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, Some(Product::new("Pen", 150, 10).with_id(1)));
    }

    #[tokio::test]
    async fn test_save_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let response = transport_for(&server)
            .save(&Product::new("Pen", 150, 10))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.body, None);
    }

    #[tokio::test]
    async fn test_save_rejected_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(400).set_body_string("name is required"))
            .mount(&server)
            .await;

        let response = transport_for(&server)
            .save(&Product::new("", 0, 0))
            .await
            .unwrap();

        assert_eq!(response, RemoteResponse::new(400, None));
    }

    /// Serves one request with a 400 whose body is cut short, so any attempt
    /// to read the body fails.
    async fn truncated_rejection_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 64\r\n\r\nname is")
                .await
                .unwrap();
            socket.flush().await.unwrap();
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_save_rejection_ignores_unreadable_body() {
        let base_url = truncated_rejection_server().await;
        let transport = HttpTransport::new(&RemoteSettings::new(base_url)).unwrap();

        let response = transport
            .save(&Product::new("", 0, 0))
            .await
            .unwrap();

        assert_eq!(response, RemoteResponse::new(400, None));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport =
            HttpTransport::new(&RemoteSettings::new(format!("http://127.0.0.1:{port}"))).unwrap();

        let err = transport.list_all().await.unwrap_err();
        assert!(err.is_transport_error());
        assert!(matches!(err, SyncError::ConnectionFailed(_)));

        let err = transport.save(&Product::new("Pen", 150, 10)).await.unwrap_err();
        assert!(matches!(err, SyncError::ConnectionFailed(_)));
    }
}

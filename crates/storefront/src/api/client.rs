//! REST client for the cart service.
//!
//! Uses `reqwest` with a per-request timeout taken from configuration. A
//! timeout surfaces as `CartApiError::Http` like any other transport failure.

use std::sync::Arc;

use eshop_core::{ProductId, UserId};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::types::{
    AddItemRequest, CartResponse, ClearCartRequest, CreateOrderRequest, OrderResponse,
    UpdateQuantityRequest,
};
use super::{CartApiError, CartService};
use crate::config::CartApiConfig;

/// Maximum number of body characters copied into errors and logs.
const MAX_BODY_CHARS: usize = 500;

// =============================================================================
// CartApiClient
// =============================================================================

/// Client for the cart REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CartApiClient {
    inner: Arc<CartApiClientInner>,
}

struct CartApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
}

impl CartApiClient {
    /// Create a new cart API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CartApiConfig) -> Result<Self, CartApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CartApiClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
            }),
        })
    }

    /// Build an endpoint URL from path segments. Each segment is percent-encoded.
    ///
    /// `.` and `..` survive percent-encoding and would be resolved as dot
    /// segments, so they are refused.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CartApiError> {
        if let Some(segment) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(CartApiError::InvalidPath((*segment).to_string()));
        }
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Start a request with the standard headers.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header("Accept", "application/json");

        match &self.inner.api_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, CartApiError> {
        let response = builder.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body),
                "Cart API returned non-success status"
            );
            return Err(CartApiError::Api {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        Ok(body)
    }

    /// Send a request and parse its JSON body. An empty body parses as `T::default()`.
    async fn send_json<T: DeserializeOwned + Default>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, CartApiError> {
        let body = self.send(builder).await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse cart API response"
            );
            CartApiError::Parse(e)
        })
    }
}

impl CartService for CartApiClient {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<CartResponse, CartApiError> {
        let url = self.endpoint(&["cart"])?;
        let cart: CartResponse = self.send_json(self.request(Method::GET, url)).await?;
        debug!(
            lines = cart.items.as_ref().map_or(0, Vec::len),
            "Fetched cart"
        );
        Ok(cart)
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id, quantity = request.quantity))]
    async fn add_item(&self, request: &AddItemRequest) -> Result<(), CartApiError> {
        let url = self.endpoint(&["cart", "add"])?;
        self.send(self.request(Method::POST, url).json(request))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_item(&self, product_id: &ProductId) -> Result<(), CartApiError> {
        let url = self.endpoint(&["cart", product_id.as_str()])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CartApiError> {
        let url = self.endpoint(&["cart", product_id.as_str(), "quantity"])?;
        let body = UpdateQuantityRequest { quantity };
        self.send(self.request(Method::PUT, url).json(&body))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self, user_id: Option<&UserId>) -> Result<(), CartApiError> {
        let url = self.endpoint(&["cart", "clear"])?;
        let body = ClearCartRequest {
            user_id: user_id.cloned(),
        };
        self.send(self.request(Method::DELETE, url).json(&body))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(items = request.items.len()))]
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderResponse, CartApiError> {
        let url = self.endpoint(&["orders"])?;
        self.send_json(self.request(Method::POST, url).json(request))
            .await
    }
}

/// Truncate a response body for logs and error messages.
fn truncate(body: &str) -> String {
    body.chars().take(MAX_BODY_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> CartApiClient {
        CartApiClient::new(&CartApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.endpoint(&["cart", "p1", "quantity"]).unwrap().as_str(),
            "http://localhost:5000/api/cart/p1/quantity"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_base() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(
            c.endpoint(&["cart"]).unwrap().as_str(),
            "http://localhost:5000/api/cart"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.endpoint(&["cart", "a/b c"]).unwrap().as_str(),
            "http://localhost:5000/api/cart/a%2Fb%20c"
        );
    }

    #[test]
    fn test_endpoint_rejects_dot_segments() {
        let c = client("http://localhost:5000/api");
        assert!(matches!(
            c.endpoint(&["cart", ".."]),
            Err(CartApiError::InvalidPath(s)) if s == ".."
        ));
        assert!(matches!(
            c.endpoint(&["cart", ".", "quantity"]),
            Err(CartApiError::InvalidPath(_))
        ));
        // Dots inside an id are ordinary characters.
        assert_eq!(
            c.endpoint(&["cart", "a..b"]).unwrap().as_str(),
            "http://localhost:5000/api/cart/a..b"
        );
    }

    #[test]
    fn test_truncate() {
        let long = "x".repeat(MAX_BODY_CHARS + 10);
        assert_eq!(truncate(&long).len(), MAX_BODY_CHARS);
        assert_eq!(truncate("short"), "short");
    }
}

//! # Product Resolver - HTTP Client for the Remote Product Database
//!
//! This module performs the network product lookup given a barcode string.
//! It is the only component in the session layer that talks to the network.
//!
//! ## Lookup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Resolver Flow                                    │
//! │                                                                         │
//! │  resolve("3017620422003")                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {base}/api/v2/product/3017620422003.json                           │
//! │       │                                                                 │
//! │       ├── HTTP 200, status=1, product ────► Ok(Some(Product))           │
//! │       ├── HTTP 200, status=0 ─────────────► Ok(None)                    │
//! │       ├── HTTP 404 ───────────────────────► Ok(None)                    │
//! │       ├── HTTP 5xx ───────────────────────► Err(HttpStatus)             │
//! │       └── transport/parse failure ────────► Err(Connection…/Malformed…) │
//! │                                                                         │
//! │  The resolver reports TYPED errors; the session collapses them all      │
//! │  into the ConnectionError outcome and logs the detail.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use shelfscan_core::Product;

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Resolver Contract
// =============================================================================

/// The remote lookup service translating a barcode into product data.
///
/// A single asynchronous call with no side effects visible to the session
/// other than its result:
/// - `Ok(Some(product))` - the database knows the code
/// - `Ok(None)` - the database answered, but no product exists for the code
/// - `Err(_)` - transport, protocol, or decoding failure
#[async_trait]
pub trait ProductResolver: Send + Sync {
    /// Resolves one barcode against the product database.
    async fn resolve(&self, barcode: &str) -> SessionResult<Option<Product>>;
}

// =============================================================================
// Resolver Configuration
// =============================================================================

/// Configuration for the HTTP resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base URL of the product database.
    pub base_url: String,

    /// User-Agent header sent with every lookup.
    pub user_agent: String,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_string(),
            user_agent: format!("shelfscan/{} (scan)", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Raw lookup response from the product database.
///
/// The database answers HTTP 200 with `status = 0` for unknown codes rather
/// than a 404, so both shapes must map to "no product".
#[derive(Debug, Deserialize)]
struct LookupResponse {
    /// 1 = product found, 0 = no product for this code.
    #[serde(default)]
    status: u8,

    /// The product record, present when `status` is 1.
    #[serde(default)]
    product: Option<RemoteProduct>,
}

/// The subset of the remote product record the scan flow surfaces.
#[derive(Debug, Deserialize)]
struct RemoteProduct {
    #[serde(default)]
    product_name: Option<String>,

    #[serde(default)]
    brands: Option<String>,

    #[serde(default)]
    quantity: Option<String>,

    #[serde(default)]
    image_front_url: Option<String>,

    #[serde(default)]
    nutriscore_grade: Option<String>,
}

/// Maps a decoded lookup response into the domain product, or `None` when
/// the database has no record for the code.
fn map_response(barcode: &str, body: LookupResponse) -> Option<Product> {
    if body.status != 1 {
        return None;
    }

    let remote = body.product?;

    // Records exist whose name was never filled in; fall back to the code so
    // the shell always has something to display.
    let name = remote
        .product_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| barcode.to_string());

    Some(Product {
        barcode: barcode.to_string(),
        name,
        brands: remote.brands,
        quantity: remote.quantity,
        image_url: remote.image_front_url,
        nutrition_grade: remote.nutriscore_grade,
    })
}

// =============================================================================
// HTTP Resolver
// =============================================================================

/// HTTP resolver client for the remote product database.
pub struct HttpResolver {
    /// Validated base URL.
    base_url: Url,

    /// Shared connection pool.
    client: reqwest::Client,
}

impl HttpResolver {
    /// Creates a resolver from configuration.
    pub fn new(config: ResolverConfig) -> SessionResult<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SessionError::ConnectionFailed(e.to_string()))?;

        Ok(HttpResolver { base_url, client })
    }

    /// Creates a resolver with default configuration.
    pub fn with_defaults() -> SessionResult<Self> {
        Self::new(ResolverConfig::default())
    }

    /// Builds the lookup URL for one barcode.
    fn lookup_url(&self, barcode: &str) -> SessionResult<Url> {
        self.base_url
            .join(&format!("api/v2/product/{barcode}.json"))
            .map_err(SessionError::from)
    }
}

#[async_trait]
impl ProductResolver for HttpResolver {
    #[instrument(skip_all, fields(barcode = %barcode))]
    async fn resolve(&self, barcode: &str) -> SessionResult<Option<Product>> {
        let url = self.lookup_url(barcode)?;
        debug!(%url, "Product lookup");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        // Unknown codes answer 404 on the v2 endpoint
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(SessionError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body: LookupResponse = response.json().await?;
        Ok(map_response(barcode, body))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_response_found() {
        let body: LookupResponse = serde_json::from_str(
            r#"{
                "status": 1,
                "product": {
                    "product_name": "Nutella",
                    "brands": "Ferrero",
                    "quantity": "400 g",
                    "image_front_url": "https://images.example/nutella.jpg",
                    "nutriscore_grade": "e"
                }
            }"#,
        )
        .unwrap();

        let product = map_response("3017620422003", body).unwrap();
        assert_eq!(product.barcode, "3017620422003");
        assert_eq!(product.name, "Nutella");
        assert_eq!(product.brands.as_deref(), Some("Ferrero"));
        assert_eq!(product.nutrition_grade.as_deref(), Some("e"));
    }

    #[test]
    fn test_map_response_not_found() {
        let body: LookupResponse =
            serde_json::from_str(r#"{"status": 0, "status_verbose": "no code or invalid code"}"#)
                .unwrap();
        assert_eq!(map_response("0000000000000", body), None);
    }

    #[test]
    fn test_map_response_found_without_payload_is_not_found() {
        // status=1 with a missing product block is treated as "no product"
        let body: LookupResponse = serde_json::from_str(r#"{"status": 1}"#).unwrap();
        assert_eq!(map_response("3017620422003", body), None);
    }

    #[test]
    fn test_map_response_blank_name_falls_back_to_barcode() {
        let body: LookupResponse = serde_json::from_str(
            r#"{"status": 1, "product": {"product_name": "  "}}"#,
        )
        .unwrap();
        let product = map_response("40111445", body).unwrap();
        assert_eq!(product.name, "40111445");
    }

    #[test]
    fn test_lookup_url_shape() {
        let resolver = HttpResolver::with_defaults().unwrap();
        let url = resolver.lookup_url("3017620422003").unwrap();
        assert_eq!(
            url.as_str(),
            "https://world.openfoodfacts.org/api/v2/product/3017620422003.json"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ResolverConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HttpResolver::new(config),
            Err(SessionError::InvalidUrl(_))
        ));
    }
}

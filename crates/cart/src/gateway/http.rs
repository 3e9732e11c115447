//! Storefront REST client.

use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt, stream};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::{
    cart::{
        CartLineItem, CartTotals, LineItemId, MutationRequest, StockSnapshot, UpsertOutcome,
        UserId,
    },
    gateway::{
        CartGateway, GatewayError, StockGateway,
        records::{LineItemPage, MessageRecord, StockRecord, TotalsRecord, UpsertForm},
    },
    identity::CartIdentity,
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for connecting to the storefront API.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// API root, e.g. `"https://shop.example/api/v1"`.
    pub base_url: String,

    /// Bearer token sent with every request when present.
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    /// Configuration with no token and the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for the storefront cart and product endpoints.
#[derive(Debug, Clone)]
pub struct HttpStorefrontClient {
    config: HttpGatewayConfig,
    http: Client,
}

impl HttpStorefrontClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);

        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn cart_list_url(&self, cart: &CartIdentity, user: Option<UserId>) -> String {
        match user {
            Some(user) => self.url(&format!("cart-list/{cart}/{user}/")),
            None => self.url(&format!("cart-list/{cart}/")),
        }
    }

    /// Cart listing as a lazy sequence of pages, following `next` links.
    pub fn line_item_pages(
        &self,
        cart: &CartIdentity,
        user: Option<UserId>,
    ) -> impl Stream<Item = Result<Vec<CartLineItem>, GatewayError>> + Send + '_ {
        let first = self.cart_list_url(cart, user);

        stream::try_unfold(
            (Some(first), FxHashSet::default()),
            move |(next, mut visited)| async move {
                let Some(url) = next else {
                    return Ok(None);
                };

                let (items, next) = self.fetch_page(&url).await?;

                visited.insert(url);

                // A `next` link back to a page already fetched would never terminate.
                let next = next.filter(|next| {
                    let repeat = visited.contains(next);

                    if repeat {
                        warn!(%next, "cart listing links back to a fetched page, stopping");
                    }

                    !repeat
                });

                Ok::<_, GatewayError>(Some((items, (next, visited))))
            },
        )
    }

    async fn fetch_page(
        &self,
        url: &str,
    ) -> Result<(Vec<CartLineItem>, Option<String>), GatewayError> {
        let response = self.request(Method::GET, url).send().await?;
        let page: LineItemPage = ensure_success(response, "cart listing")
            .await?
            .json()
            .await?;

        let (items, next) = page.into_parts();

        debug!(
            url,
            items = items.len(),
            has_next = next.is_some(),
            "fetched cart page"
        );

        Ok((items, next))
    }
}

#[async_trait]
impl CartGateway for HttpStorefrontClient {
    #[tracing::instrument(
        name = "cart.gateway.list_items",
        skip(self, cart),
        fields(item_count = tracing::field::Empty),
        err
    )]
    async fn list_items(
        &self,
        cart: &CartIdentity,
        user: Option<UserId>,
    ) -> Result<Vec<CartLineItem>, GatewayError> {
        let items = self.line_item_pages(cart, user).try_concat().await?;

        tracing::Span::current().record("item_count", items.len());

        Ok(items)
    }

    #[tracing::instrument(
        name = "cart.gateway.upsert_item",
        skip(self, request),
        fields(product = %request.product, qty = request.qty, adjusted = tracing::field::Empty),
        err
    )]
    async fn upsert_item(&self, request: &MutationRequest) -> Result<UpsertOutcome, GatewayError> {
        let response = self
            .request(Method::POST, &self.url("cart/"))
            .form(&UpsertForm::from(request))
            .send()
            .await?;

        let response = ensure_success(response, "cart upsert").await?;
        let body = response.text().await?;

        // Some deployments answer with an empty body.
        let record: MessageRecord = if body.trim().is_empty() {
            MessageRecord::default()
        } else {
            serde_json::from_str(&body).map_err(|error| {
                GatewayError::UnexpectedResponse(format!("cart upsert body: {error}"))
            })?
        };

        let outcome = UpsertOutcome::from_message(record.message);

        tracing::Span::current().record("adjusted", outcome.adjusted);

        Ok(outcome)
    }

    #[tracing::instrument(name = "cart.gateway.delete_item", skip(self, cart), err)]
    async fn delete_item(
        &self,
        cart: &CartIdentity,
        item: LineItemId,
        user: Option<UserId>,
    ) -> Result<(), GatewayError> {
        let url = match user {
            Some(user) => self.url(&format!("cart-delete/{cart}/{item}/{user}/")),
            None => self.url(&format!("cart-delete/{cart}/{item}/")),
        };

        let response = self.request(Method::DELETE, &url).send().await?;

        ensure_success(response, "cart delete").await?;

        Ok(())
    }

    #[tracing::instrument(name = "cart.gateway.fetch_totals", skip(self, cart), err)]
    async fn fetch_totals(&self, cart: &CartIdentity) -> Result<CartTotals, GatewayError> {
        let response = self
            .request(Method::GET, &self.url(&format!("cart-detail/{cart}/")))
            .send()
            .await?;

        let record: TotalsRecord = ensure_success(response, "cart totals")
            .await?
            .json()
            .await?;

        Ok(record.into())
    }
}

#[async_trait]
impl StockGateway for HttpStorefrontClient {
    #[tracing::instrument(name = "cart.gateway.fetch_stock", skip(self), err)]
    async fn fetch_stock(&self, slug: &str) -> Result<StockSnapshot, GatewayError> {
        let response = self
            .request(Method::GET, &self.url(&format!("products/{slug}/")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(slug, "product no longer exists, treating stock as zero");

            return Ok(StockSnapshot {
                stock_qty: 0,
                title: slug.to_owned(),
            });
        }

        let record: StockRecord = ensure_success(response, "product stock")
            .await?
            .json()
            .await?;

        Ok(record.into())
    }
}

async fn ensure_success(response: Response, action: &str) -> Result<Response, GatewayError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    Err(GatewayError::UnexpectedResponse(format!(
        "{action} request failed with status {status}: {text}"
    )))
}

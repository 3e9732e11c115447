//! HTTP gateway against a local storefront API.
//!
//! The server answers the cart listing in two pages (envelope with a `next`
//! link, then a bare page), echoes upserts with an "adjusted" message, and
//! reports one product as gone with a 404. A user listing links back to its
//! first page.

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::{delete, get, post},
};
use futures::TryStreamExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use storefront_cart::{
    cart::{LineItemId, MutationRequest, ProductId, UserId, Variant},
    gateway::{CartGateway, HttpGatewayConfig, HttpStorefrontClient, StockGateway},
    identity::CartIdentity,
};
use testresult::TestResult;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Default)]
struct Recorded {
    forms: Vec<HashMap<String, String>>,
    deletes: Vec<(String, u64, Option<u64>)>,
    tokens: Vec<String>,
}

#[derive(Clone)]
struct Api {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
}

fn line(id: u64, product: u64, color: &str, size: &str) -> Value {
    json!({
        "id": id,
        "product": {
            "id": product,
            "title": format!("Product {product}"),
            "slug": format!("product-{product}"),
            "price": "12.50",
            "stock_qty": 8,
            "shipping_amount": "3.00"
        },
        "qty": 2,
        "price": "12.50",
        "color": color,
        "size": size,
        "country": ""
    })
}

async fn first_page(State(api): State<Api>, headers: HeaderMap) -> Json<Value> {
    if let Some(token) = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) {
        api.recorded.lock().await.tokens.push(token.to_string());
    }

    Json(json!({
        "results": [line(1, 10, "No Color", "No Size")],
        "next": format!("http://{}/api/pages/2/", api.addr),
        "previous": null
    }))
}

async fn second_page() -> Json<Value> {
    Json(json!([line(2, 11, "Red", "XL")]))
}

async fn user_page(State(api): State<Api>, Path((_cart, user)): Path<(String, u64)>) -> Json<Value> {
    Json(json!({
        "results": [line(3, 12, "No Color", "No Size")],
        "next": format!("http://{}/api/pages/user/{user}/", api.addr),
    }))
}

async fn user_second_page(State(api): State<Api>, Path(user): Path<u64>) -> Json<Value> {
    Json(json!({
        "results": [line(4, 13, "No Color", "No Size")],
        "next": format!("http://{}/api/cart-list/abcdefghij/{user}/", api.addr),
    }))
}

async fn upsert(State(api): State<Api>, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    api.recorded.lock().await.forms.push(form);

    Json(json!({ "message": "Qty Adjusted to available stock" }))
}

async fn remove(
    State(api): State<Api>,
    Path((cart, item, user)): Path<(String, u64, u64)>,
) -> StatusCode {
    api.recorded.lock().await.deletes.push((cart, item, Some(user)));

    StatusCode::NO_CONTENT
}

async fn remove_anonymous(
    State(api): State<Api>,
    Path((cart, item)): Path<(String, u64)>,
) -> StatusCode {
    api.recorded.lock().await.deletes.push((cart, item, None));

    StatusCode::NO_CONTENT
}

async fn totals() -> Json<Value> {
    Json(json!({
        "mrp_total": "45.00",
        "discounted_total": "40.50",
        "shipping": "3.00",
        "grand_total": "43.50"
    }))
}

async fn product(Path(slug): Path<String>) -> impl IntoResponse {
    if slug == "gone" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." })));
    }

    (
        StatusCode::OK,
        Json(json!({ "title": "Linen Shirt", "slug": slug, "stock_qty": 4 })),
    )
}

async fn serve() -> TestResult<(HttpStorefrontClient, Arc<Mutex<Recorded>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let recorded = Arc::new(Mutex::new(Recorded::default()));

    let app = Router::new()
        .route("/api/cart-list/{cart}/", get(first_page))
        .route("/api/pages/2/", get(second_page))
        .route("/api/cart-list/{cart}/{user}/", get(user_page))
        .route("/api/pages/user/{user}/", get(user_second_page))
        .route("/api/cart/", post(upsert))
        .route("/api/cart-delete/{cart}/{item}/", delete(remove_anonymous))
        .route("/api/cart-delete/{cart}/{item}/{user}/", delete(remove))
        .route("/api/cart-detail/{cart}/", get(totals))
        .route("/api/products/{slug}/", get(product))
        .with_state(Api {
            addr,
            recorded: recorded.clone(),
        });

    tokio::spawn(async move { axum::serve(listener, app).await });

    let mut config = HttpGatewayConfig::new(format!("http://{addr}/api/"));

    config.token = Some("secret".to_string());

    Ok((HttpStorefrontClient::new(config)?, recorded))
}

#[tokio::test]
async fn listing_follows_next_links_and_decodes_variants() -> TestResult {
    let (client, recorded) = serve().await?;
    let cart: CartIdentity = "abcdefghij".parse()?;

    let items = client.list_items(&cart, None).await?;

    assert_eq!(
        items.iter().map(|item| item.id).collect::<Vec<_>>(),
        vec![LineItemId::new(1), LineItemId::new(2)]
    );
    assert_eq!(items.first().map(|item| item.variant.clone()), Some(Variant::none()));
    assert_eq!(
        items.get(1).map(|item| item.variant.clone()),
        Some(Variant {
            color: Some("Red".to_string()),
            size: Some("XL".to_string()),
        })
    );
    assert!(
        items.iter().all(|item| item.country.is_none()),
        "blank country should decode as absent"
    );
    assert_eq!(recorded.lock().await.tokens, vec!["Bearer secret".to_string()]);

    Ok(())
}

#[tokio::test]
async fn listing_stops_when_pages_link_back() -> TestResult {
    let (client, _recorded) = serve().await?;
    let cart: CartIdentity = "abcdefghij".parse()?;

    let items = client.list_items(&cart, Some(UserId::new(5))).await?;

    assert_eq!(
        items.iter().map(|item| item.id).collect::<Vec<_>>(),
        vec![LineItemId::new(3), LineItemId::new(4)],
        "each page is fetched once"
    );

    Ok(())
}

#[tokio::test]
async fn pages_are_streamed_lazily() -> TestResult {
    let (client, _recorded) = serve().await?;
    let cart: CartIdentity = "abcdefghij".parse()?;

    let pages: Vec<_> = client.line_item_pages(&cart, None).try_collect().await?;

    assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 1]);

    Ok(())
}

#[tokio::test]
async fn upsert_posts_a_form_with_sentinel_variants() -> TestResult {
    let (client, recorded) = serve().await?;

    let outcome = client
        .upsert_item(&MutationRequest {
            cart_id: "abcdefghij".parse()?,
            product: ProductId::new(10),
            user: Some(UserId::new(5)),
            qty: 3,
            price: Decimal::new(12_50, 2),
            shipping_amount: Decimal::new(3_00, 2),
            country: None,
            variant: Variant {
                color: None,
                size: Some("M".to_string()),
            },
        })
        .await?;

    assert!(outcome.adjusted, "message mentions an adjustment");

    let recorded = recorded.lock().await;
    let form = recorded.forms.first().ok_or("no upsert received")?;

    assert_eq!(form.get("product").map(String::as_str), Some("10"));
    assert_eq!(form.get("user").map(String::as_str), Some("5"));
    assert_eq!(form.get("qty").map(String::as_str), Some("3"));
    assert_eq!(form.get("price").map(String::as_str), Some("12.50"));
    assert_eq!(form.get("color").map(String::as_str), Some("No Color"));
    assert_eq!(form.get("size").map(String::as_str), Some("M"));
    assert_eq!(form.get("cart_id").map(String::as_str), Some("abcdefghij"));
    assert!(!form.contains_key("country"), "absent country is not sent");

    Ok(())
}

#[tokio::test]
async fn delete_targets_the_line_and_user() -> TestResult {
    let (client, recorded) = serve().await?;
    let cart: CartIdentity = "abcdefghij".parse()?;

    client.delete_item(&cart, LineItemId::new(7), None).await?;
    client
        .delete_item(&cart, LineItemId::new(8), Some(UserId::new(5)))
        .await?;

    assert_eq!(
        recorded.lock().await.deletes,
        vec![
            ("abcdefghij".to_string(), 7, None),
            ("abcdefghij".to_string(), 8, Some(5)),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn totals_keep_decimal_precision() -> TestResult {
    let (client, _recorded) = serve().await?;
    let cart: CartIdentity = "abcdefghij".parse()?;

    let totals = client.fetch_totals(&cart).await?;

    assert_eq!(totals.discounted_total, Decimal::new(40_50, 2));
    assert_eq!(totals.grand_total, Decimal::new(43_50, 2));

    Ok(())
}

#[tokio::test]
async fn missing_product_has_no_stock() -> TestResult {
    let (client, _recorded) = serve().await?;

    let live = client.fetch_stock("linen-shirt").await?;
    let gone = client.fetch_stock("gone").await?;

    assert_eq!((live.stock_qty, live.title.as_str()), (4, "Linen Shirt"));
    assert_eq!((gone.stock_qty, gone.title.as_str()), (0, "gone"));

    Ok(())
}

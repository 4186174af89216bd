//! End-to-end cart tests against the stub stock API.
//!
//! These drive `CartStore` through the real HTTP client and file storage.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use rocketshoes_cart::{
    AmountUpdate, Cart, CartNotice, DEFAULT_STORAGE_KEY, FileStore, KeyValueStore, Price,
    ProductId, RecordingNotifier,
};
use rocketshoes_integration_tests::{StubStockApi, open_store};

async fn stub_with_catalog() -> StubStockApi {
    let api = StubStockApi::start().await;
    api.add_product(1, "Tênis de Caminhada Leve Confortável", 179.9, 3);
    api.add_product(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 139.9, 5);
    api.add_product(3, "Tênis Adidas Duramo Lite 2.0", 219.9, 2);
    api
}

fn amounts(cart: &Cart) -> Vec<(i64, u32)> {
    cart.iter().map(|i| (i.id.as_i64(), i.amount)).collect()
}

// ============================================================================
// Add
// ============================================================================

#[tokio::test]
async fn test_add_new_product_over_http() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let notices = Arc::new(RecordingNotifier::new());
    let store = open_store(api.client(), &dir.path().join("storage.json"), notices.clone());

    store.add_product(ProductId::new(2)).await;

    let cart = store.cart();
    assert_eq!(amounts(&cart), vec![(2, 1)]);
    let item = cart.get(ProductId::new(2)).unwrap();
    assert_eq!(
        item.name,
        "Tênis VR Caminhada Confortável Detalhes Couro Masculino"
    );
    assert_eq!(item.price, Price::from_cents(13_990));
    assert!(item.image_url.ends_with("tenis2.jpg"));
    assert!(notices.notices().is_empty());
}

#[tokio::test]
async fn test_add_until_stock_runs_out() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let notices = Arc::new(RecordingNotifier::new());
    let store = open_store(api.client(), &dir.path().join("storage.json"), notices.clone());

    for _ in 0..4 {
        store.add_product(ProductId::new(3)).await;
    }

    assert_eq!(amounts(&store.cart()), vec![(3, 2)]);
    assert_eq!(
        notices.notices(),
        vec![CartNotice::StockExceeded, CartNotice::StockExceeded]
    );
    // Product metadata is fetched once; stock on every attempt.
    assert_eq!(api.product_requests(), 1);
    assert_eq!(api.stock_requests(), 4);
}

#[tokio::test]
async fn test_add_unknown_product_reports_add_failed() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let notices = Arc::new(RecordingNotifier::new());
    let store = open_store(api.client(), &dir.path().join("storage.json"), notices.clone());

    store.add_product(ProductId::new(404)).await;

    assert!(store.cart().is_empty());
    assert_eq!(notices.notices(), vec![CartNotice::AddFailed]);
}

#[tokio::test]
async fn test_product_metadata_is_cached_across_remove_and_add() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let notices = Arc::new(RecordingNotifier::new());
    let store = open_store(api.client(), &dir.path().join("storage.json"), notices.clone());

    store.add_product(ProductId::new(1)).await;
    store.remove_product(ProductId::new(1));
    store.add_product(ProductId::new(1)).await;

    assert_eq!(amounts(&store.cart()), vec![(1, 1)]);
    assert_eq!(api.product_requests(), 1);
    assert!(notices.notices().is_empty());
}

// ============================================================================
// Upstream failures
// ============================================================================

#[tokio::test]
async fn test_server_errors_leave_cart_unchanged() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let notices = Arc::new(RecordingNotifier::new());
    let store = open_store(api.client(), &path, notices.clone());

    store.add_product(ProductId::new(1)).await;
    let before = store.cart();
    let stored_before = FileStore::new(&path).get(DEFAULT_STORAGE_KEY).unwrap();

    api.set_failing(true);
    store.add_product(ProductId::new(1)).await;
    store
        .update_product_amount(AmountUpdate {
            product_id: ProductId::new(1),
            amount: 2,
        })
        .await;

    assert_eq!(*store.cart(), *before);
    assert_eq!(
        notices.notices(),
        vec![CartNotice::AddFailed, CartNotice::UpdateFailed]
    );
    assert_eq!(
        FileStore::new(&path).get(DEFAULT_STORAGE_KEY).unwrap(),
        stored_before
    );

    api.set_failing(false);
    store.add_product(ProductId::new(1)).await;
    assert_eq!(amounts(&store.cart()), vec![(1, 2)]);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_amount_against_live_stock() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let notices = Arc::new(RecordingNotifier::new());
    let store = open_store(api.client(), &dir.path().join("storage.json"), notices.clone());

    store.add_product(ProductId::new(2)).await;
    store
        .update_product_amount(AmountUpdate {
            product_id: ProductId::new(2),
            amount: 5,
        })
        .await;
    assert_eq!(amounts(&store.cart()), vec![(2, 5)]);

    // Stock drops after the fact; the cart is not re-validated until it changes.
    api.set_stock(2, 2);
    assert_eq!(amounts(&store.cart()), vec![(2, 5)]);

    store
        .update_product_amount(AmountUpdate {
            product_id: ProductId::new(2),
            amount: 4,
        })
        .await;
    assert_eq!(amounts(&store.cart()), vec![(2, 5)]);
    assert_eq!(notices.take(), vec![CartNotice::StockExceeded]);

    store
        .update_product_amount(AmountUpdate {
            product_id: ProductId::new(2),
            amount: 2,
        })
        .await;
    assert_eq!(amounts(&store.cart()), vec![(2, 2)]);
    assert!(notices.notices().is_empty());
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let notices = Arc::new(RecordingNotifier::new());

    let first = open_store(api.client(), &path, notices.clone());
    first.add_product(ProductId::new(3)).await;
    first.add_product(ProductId::new(1)).await;
    first.add_product(ProductId::new(1)).await;
    first.add_product(ProductId::new(2)).await;
    first.remove_product(ProductId::new(2));
    let expected = first.cart();
    drop(first);

    let second = open_store(api.client(), &path, notices.clone());
    assert_eq!(*second.cart(), *expected);
    assert_eq!(amounts(&second.cart()), vec![(3, 1), (1, 2)]);
    assert_eq!(second.cart().total(), Price::from_cents(57_970));
    assert!(notices.notices().is_empty());
}

#[tokio::test]
async fn test_storage_file_layout() {
    let api = stub_with_catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let store = open_store(api.client(), &path, Arc::new(RecordingNotifier::new()));

    store.add_product(ProductId::new(1)).await;

    let file: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let raw = file.get(DEFAULT_STORAGE_KEY).and_then(|v| v.as_str()).unwrap();
    let stored: serde_json::Value = serde_json::from_str(raw).unwrap();

    let items = stored.as_array().unwrap();
    assert_eq!(items.len(), 1);
    let item = items.first().unwrap();
    assert_eq!(item["id"], 1);
    assert_eq!(item["title"], "Tênis de Caminhada Leve Confortável");
    assert_eq!(
        item["image"],
        "https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis1.jpg"
    );
    assert_eq!(item["amount"], 1);
    let price: Price = serde_json::from_value(item["price"].clone()).unwrap();
    assert_eq!(price, Price::from_cents(17_990));

    let cart: Cart = serde_json::from_str(raw).unwrap();
    assert_eq!(cart, *store.cart());
}

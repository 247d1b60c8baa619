//! End-to-end: catalog mutations in the commerce service flow into the cart
//! and wishlist services, and the cart prices its lines from the replicated
//! products and coupons rather than from the catalog itself.

use std::sync::Arc;
use std::time::Duration;

use cart_rs::cart_service::{CartService, LineRequest};
use commerce_rs::catalog_service::{CatalogService, NewCoupon, NewProduct, ProductPatch};
use event_bus::InMemoryBus;
use event_contracts::Publisher;
use replica_store::{MemoryStore, ReplicaStore};
use wishlist_rs::wishlist_service::WishlistService;

const DEADLINE: Duration = Duration::from_secs(5);

async fn wait_for_product(
    products: &MemoryStore<cart_rs::replicas::ProductReplica>,
    id: &str,
    version: u64,
) {
    let start = tokio::time::Instant::now();
    loop {
        if products
            .get(id)
            .await
            .unwrap()
            .is_some_and(|replica| replica.version >= version)
        {
            return;
        }
        assert!(start.elapsed() < DEADLINE, "product replica missing");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

fn laptop() -> NewProduct {
    NewProduct {
        merchant_id: "merchant-1".into(),
        title: "Laptop".into(),
        description: "13 inch".into(),
        thumbnail: "https://cdn/laptop.png".into(),
        images: None,
        price: 1000.0,
        is_used: false,
    }
}

#[tokio::test]
async fn cart_prices_lines_from_the_replicated_catalog() {
    let bus = Arc::new(InMemoryBus::new());

    let products: MemoryStore<cart_rs::replicas::ProductReplica> = MemoryStore::new();
    let coupons: MemoryStore<cart_rs::replicas::CouponReplica> = MemoryStore::new();
    let cart_service = CartService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(products.clone()),
        Arc::new(coupons.clone()),
        Publisher::new(bus.clone()),
    );
    cart_rs::listeners::spawn_listeners(
        bus.clone(),
        Arc::new(products.clone()),
        Arc::new(coupons.clone()),
        cart_service.clone(),
    );
    // Let the listener tasks finish subscribing before the first publish.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let catalog = CatalogService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Publisher::new(bus.clone()),
    );

    let product = catalog.create_product(laptop()).await.unwrap();
    wait_for_product(&products, &product.id, 0).await;

    let cart = cart_service
        .create_cart(
            "customer-1",
            vec![LineRequest {
                product_id: product.id.clone(),
                quantity: 2,
            }],
        )
        .await
        .unwrap();
    assert_eq!(cart.total_cart_price, 2000.0);

    // A price change upstream is reflected in carts built afterwards.
    catalog
        .update_product(
            &product.id,
            ProductPatch {
                price: Some(900.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    wait_for_product(&products, &product.id, 1).await;

    let repriced = cart_service
        .update_items(
            &cart.id,
            vec![LineRequest {
                product_id: product.id.clone(),
                quantity: 2,
            }],
        )
        .await
        .unwrap();
    assert_eq!(repriced.total_cart_price, 1800.0);

    catalog
        .create_coupon(NewCoupon {
            admin: "admin-1".into(),
            coupon: "SAVE10".into(),
            expire: "2026-12-31T00:00:00Z".into(),
            discount: 10.0,
        })
        .await
        .unwrap();

    // The coupon replica arrives asynchronously, so retry until it does.
    let start = tokio::time::Instant::now();
    let discounted = loop {
        match cart_service.apply_coupon(&cart.id, "SAVE10").await {
            Ok(cart) => break cart,
            Err(cart_rs::cart_service::CartError::CouponNotFound(_)) => {
                assert!(start.elapsed() < DEADLINE, "coupon replica missing");
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    };
    assert_eq!(discounted.total_price_after_discount, Some(1620.0));
}

#[tokio::test]
async fn wishlist_follows_product_availability() {
    let bus = Arc::new(InMemoryBus::new());

    let products: MemoryStore<wishlist_rs::replicas::ProductReplica> = MemoryStore::new();
    wishlist_rs::listeners::spawn_listeners(bus.clone(), Arc::new(products.clone()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    let wishlist = WishlistService::new(Arc::new(products.clone()));

    let catalog = CatalogService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Publisher::new(bus.clone()),
    );
    let product = catalog.create_product(laptop()).await.unwrap();

    let start = tokio::time::Instant::now();
    loop {
        if wishlist.add("customer-1", &product.id).await.is_ok() {
            break;
        }
        assert!(start.elapsed() < DEADLINE, "product replica missing");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(wishlist.list("customer-1").await.unwrap().len(), 1);

    // Deleting the product upstream empties the wishlist view.
    catalog.delete_product(&product.id).await.unwrap();
    let start = tokio::time::Instant::now();
    loop {
        if wishlist.list("customer-1").await.unwrap().is_empty() {
            break;
        }
        assert!(start.elapsed() < DEADLINE, "deleted product still listed");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

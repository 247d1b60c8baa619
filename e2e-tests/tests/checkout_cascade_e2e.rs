//! End-to-end checkout: auth, commerce, cart, order, and payment wired to one
//! bus. Creating an order consumes the cart through the `order:deletedCart`
//! cascade and the payment service ends up with a mirror of the order.

use std::sync::Arc;
use std::time::Duration;

use auth_rs::user_service::{NewUser, UserService};
use cart_rs::cart_service::{CartService, LineRequest};
use commerce_rs::catalog_service::{CatalogService, NewProduct};
use event_bus::InMemoryBus;
use event_contracts::order::ShippingAddress;
use event_contracts::user::Role;
use event_contracts::Publisher;
use order_rs::order_service::{OrderService, Pricing};
use replica_store::{MemoryStore, ReplicaStore};

const DEADLINE: Duration = Duration::from_secs(10);
const POLL: Duration = Duration::from_millis(20);

async fn wait_until<F, Fut>(mut check: F, what: &str)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = tokio::time::Instant::now();
    loop {
        if check().await {
            return;
        }
        assert!(start.elapsed() < DEADLINE, "timed out waiting for {what}");
        tokio::time::sleep(POLL).await;
    }
}

fn shipping() -> ShippingAddress {
    ShippingAddress {
        name: "Alice".into(),
        address: "1 Main St".into(),
        phone: "+15550100".into(),
        city: "Springfield".into(),
        country: "US".into(),
        postal_code: "12345".into(),
    }
}

#[tokio::test]
async fn checkout_consumes_the_cart_and_mirrors_the_order_everywhere() {
    let bus = Arc::new(InMemoryBus::new());

    // Cart service with its product and coupon replicas.
    let cart_products: MemoryStore<cart_rs::replicas::ProductReplica> = MemoryStore::new();
    let cart_coupons: MemoryStore<cart_rs::replicas::CouponReplica> = MemoryStore::new();
    let carts: MemoryStore<cart_rs::cart::Cart> = MemoryStore::new();
    let cart_service = CartService::new(
        Arc::new(carts.clone()),
        Arc::new(cart_products.clone()),
        Arc::new(cart_coupons.clone()),
        Publisher::new(bus.clone()),
    );
    cart_rs::listeners::spawn_listeners(
        bus.clone(),
        Arc::new(cart_products.clone()),
        Arc::new(cart_coupons.clone()),
        cart_service.clone(),
    );

    // Order service with its user and cart replicas.
    let order_users: MemoryStore<order_rs::replicas::UserReplica> = MemoryStore::new();
    let order_carts: MemoryStore<order_rs::replicas::CartReplica> = MemoryStore::new();
    order_rs::listeners::spawn_listeners(
        bus.clone(),
        Arc::new(order_users.clone()),
        Arc::new(order_carts.clone()),
    );
    let order_service = OrderService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(order_users.clone()),
        Arc::new(order_carts.clone()),
        Publisher::new(bus.clone()),
        Pricing {
            tax_price: 1.0,
            shipping_price: 2.0,
        },
    );

    // Payment mirrors orders (and prunes products and users it knows about).
    let payment_orders: MemoryStore<payment_rs::replicas::OrderReplica> = MemoryStore::new();
    let payment_products: MemoryStore<payment_rs::replicas::ProductReplica> = MemoryStore::new();
    let payment_users: MemoryStore<payment_rs::replicas::UserReplica> = MemoryStore::new();
    payment_rs::listeners::spawn_listeners(
        bus.clone(),
        Arc::new(payment_orders.clone()),
        Arc::new(payment_products.clone()),
        Arc::new(payment_users.clone()),
    );
    // Let the listener tasks finish subscribing before the first publish.
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Upstream writes: one user, one product.
    let auth = UserService::new(Arc::new(MemoryStore::new()), Publisher::new(bus.clone()));
    let user = auth
        .create_user(NewUser {
            email: "alice@example.com".into(),
            username: "alice".into(),
            profile_picture: "https://cdn/alice.png".into(),
            role: Role::Customer,
        })
        .await
        .unwrap();

    let catalog = CatalogService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
        Publisher::new(bus.clone()),
    );
    let product = catalog
        .create_product(NewProduct {
            merchant_id: "merchant-1".into(),
            title: "Keyboard".into(),
            description: "mechanical".into(),
            thumbnail: "https://cdn/keyboard.png".into(),
            images: None,
            price: 5.0,
            is_used: false,
        })
        .await
        .unwrap();

    let product_id = product.id.clone();
    wait_until(
        || {
            let cart_products = cart_products.clone();
            let product_id = product_id.clone();
            async move { cart_products.get(&product_id).await.unwrap().is_some() }
        },
        "product replica in cart service",
    )
    .await;

    let cart = cart_service
        .create_cart(
            &user.id,
            vec![LineRequest {
                product_id: product.id.clone(),
                quantity: 2,
            }],
        )
        .await
        .unwrap();
    assert_eq!(cart.total_cart_price, 10.0);

    // Checkout needs both replicas present in the order service.
    let user_id = user.id.clone();
    let cart_id = cart.id.clone();
    wait_until(
        || {
            let order_users = order_users.clone();
            let order_carts = order_carts.clone();
            let user_id = user_id.clone();
            let cart_id = cart_id.clone();
            async move {
                order_users.get(&user_id).await.unwrap().is_some()
                    && order_carts.get(&cart_id).await.unwrap().is_some()
            }
        },
        "user and cart replicas in order service",
    )
    .await;

    let order = order_service
        .create_order(&user.id, &cart.id, shipping())
        .await
        .unwrap();
    assert_eq!(order.total_order_price, 13.0);

    // The cascade retires the authoritative cart and, through the republished
    // cart:deleted, the order service's own cart replica.
    let cart_id = cart.id.clone();
    wait_until(
        || {
            let carts = carts.clone();
            let order_carts = order_carts.clone();
            let cart_id = cart_id.clone();
            async move {
                carts.get(&cart_id).await.unwrap().is_none()
                    && order_carts.get(&cart_id).await.unwrap().is_none()
            }
        },
        "cart retirement cascade",
    )
    .await;

    let order_id = order.id.clone();
    wait_until(
        || {
            let payment_orders = payment_orders.clone();
            let order_id = order_id.clone();
            async move {
                payment_orders
                    .get(&order_id)
                    .await
                    .unwrap()
                    .is_some_and(|mirror| mirror.total_order_price == 13.0)
            }
        },
        "order mirror in payment service",
    )
    .await;
}

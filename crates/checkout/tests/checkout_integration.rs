//! Integration tests for the checkout saga.

use std::sync::Arc;
use std::time::Duration;

use checkout::{
    CartService, CheckoutError, CheckoutOrchestrator, InMemoryCartService, InMemoryCatalogService,
    InMemoryCurrencyService, InMemoryDependencies, InMemoryEmailService, InMemoryPaymentService,
    InMemoryShippingService, PlaceOrderRequest, ServiceError, steps,
};
use common::{BackgroundTasks, BuildTag, CorrelationContext, RequestId, UserId};
use domain::{Address, CartItem, CreditCardInfo, Money, Product};
use load_simulator::{LoadCounter, LoadSimulatorConfig, RecordingMarkerNotifier};

fn usd(units: i64, nanos: i32) -> Money {
    Money::new("USD", units, nanos).unwrap()
}

struct TestHarness {
    orchestrator: Arc<CheckoutOrchestrator>,
    services: InMemoryDependencies,
    markers: RecordingMarkerNotifier,
    tasks: BackgroundTasks,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_load_config(LoadSimulatorConfig::default())
    }

    fn with_load_config(config: LoadSimulatorConfig) -> Self {
        let catalog = InMemoryCatalogService::new();
        catalog.insert(Product::new("productA", "Product A", usd(10, 0)));
        catalog.insert(Product::new("productB", "Product B", usd(5, 0)));

        let services = InMemoryDependencies {
            cart: InMemoryCartService::new(),
            catalog,
            currency: InMemoryCurrencyService::with_default_rates(),
            shipping: InMemoryShippingService::new(usd(3, 0)),
            payment: InMemoryPaymentService::new(),
            email: InMemoryEmailService::new(),
        };

        let tasks = BackgroundTasks::new();
        let markers = RecordingMarkerNotifier::new();
        let load = Arc::new(LoadCounter::new(
            config,
            Arc::new(markers.clone()),
            tasks.clone(),
        ));
        let orchestrator = Arc::new(CheckoutOrchestrator::new(
            services.as_dependencies(),
            load,
            tasks.clone(),
        ));

        Self {
            orchestrator,
            services,
            markers,
            tasks,
        }
    }

    async fn seed_cart(&self, user: &str) {
        let user_id = UserId::new(user);
        let ctx = ctx(user);
        self.services
            .cart
            .add_item(&ctx, &user_id, CartItem::new("productA", 2))
            .await
            .unwrap();
        self.services
            .cart
            .add_item(&ctx, &user_id, CartItem::new("productB", 1))
            .await
            .unwrap();
    }

    async fn wait_for_follow_ups(&self) {
        for _ in 0..500 {
            if self.tasks.pending() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("background tasks did not finish");
    }
}

fn ctx(user: &str) -> CorrelationContext {
    CorrelationContext::new(UserId::new(user), RequestId::generate(), BuildTag::new("c34e68a7"))
}

fn request(user: &str, currency: &str) -> PlaceOrderRequest {
    PlaceOrderRequest {
        user_id: UserId::new(user),
        user_currency: currency.to_string(),
        address: Address {
            street_address: "1600 Amphitheatre Parkway".to_string(),
            city: "Mountain View".to_string(),
            state: "CA".to_string(),
            country: "USA".to_string(),
            zip_code: 94043,
        },
        email: format!("{user}@example.com"),
        credit_card: CreditCardInfo {
            credit_card_number: "4432-8015-6152-0454".to_string(),
            credit_card_cvv: 672,
            credit_card_expiration_year: 2099,
            credit_card_expiration_month: 1,
        },
    }
}

#[tokio::test]
async fn test_happy_path_charges_exact_total() {
    let h = TestHarness::new();
    h.seed_cart("alice").await;

    let order = h
        .orchestrator
        .place_order(&ctx("alice"), request("alice", "USD"))
        .await
        .unwrap();

    // 10.00 * 2 + 5.00 * 1 + 3.00
    let charges = h.services.payment.charges();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].amount, usd(28, 0));

    assert_eq!(order.shipping_cost, usd(3, 0));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].item, CartItem::new("productA", 2));
    assert_eq!(order.items[0].cost, usd(10, 0));

    let shipments = h.services.shipping.shipments();
    assert_eq!(shipments.len(), 1);
    assert_eq!(shipments[0].tracking_id, order.shipping_tracking_id);

    h.wait_for_follow_ups().await;
    assert!(h.services.cart.items(&UserId::new("alice")).is_empty());
    let sent = h.services.email.sent_to("alice@example.com");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains(&order.order_id.to_string()));
}

#[tokio::test]
async fn test_order_priced_in_user_currency() {
    let h = TestHarness::new();
    // 2 USD per EUR
    h.services.currency.set_rate("USD", 2_000_000_000);
    h.seed_cart("bob").await;

    let order = h
        .orchestrator
        .place_order(&ctx("bob"), request("bob", "EUR"))
        .await
        .unwrap();

    let eur = |units, nanos| Money::new("EUR", units, nanos).unwrap();
    assert_eq!(order.shipping_cost, eur(1, 500_000_000));
    assert_eq!(order.items[0].cost, eur(5, 0));
    assert_eq!(order.items[1].cost, eur(2, 500_000_000));
    // 5.00 * 2 + 2.50 + 1.50
    assert_eq!(h.services.payment.charges()[0].amount, eur(14, 0));
}

#[tokio::test]
async fn test_cart_failure_short_circuits() {
    let h = TestHarness::new();
    h.seed_cart("carol").await;
    h.services.cart.set_fail_on_get(true);

    let result = h
        .orchestrator
        .place_order(&ctx("carol"), request("carol", "USD"))
        .await;

    match result {
        Err(CheckoutError::DependencyFailure { step, cause }) => {
            assert_eq!(step, steps::STEP_CART);
            assert!(matches!(cause, ServiceError::Unavailable(_)));
        }
        other => panic!("expected cart failure, got {other:?}"),
    }
    assert_eq!(h.services.catalog.lookups(), 0);
    assert_eq!(h.services.shipping.quote_calls(), 0);
    assert_eq!(h.services.payment.charge_calls(), 0);
    assert!(h.services.shipping.shipments().is_empty());
}

#[tokio::test]
async fn test_item_pricing_failure_aborts_order() {
    let h = TestHarness::new();
    let user = UserId::new("dave");
    h.services
        .cart
        .add_item(&ctx("dave"), &user, CartItem::new("productA", 1))
        .await
        .unwrap();
    h.services
        .cart
        .add_item(&ctx("dave"), &user, CartItem::new("discontinued", 1))
        .await
        .unwrap();

    let result = h
        .orchestrator
        .place_order(&ctx("dave"), request("dave", "USD"))
        .await;

    match result {
        Err(CheckoutError::DependencyFailure { step, cause }) => {
            assert_eq!(step, steps::STEP_PRODUCT_CATALOG);
            assert!(matches!(cause, ServiceError::NotFound(_)));
        }
        other => panic!("expected catalog failure, got {other:?}"),
    }
    assert_eq!(h.services.payment.charge_calls(), 0);
    assert_eq!(h.services.cart.items(&user).len(), 2);
}

#[tokio::test]
async fn test_unsupported_currency_fails_at_conversion() {
    let h = TestHarness::new();
    h.seed_cart("erin").await;

    let result = h
        .orchestrator
        .place_order(&ctx("erin"), request("erin", "XYZ"))
        .await;

    match result {
        Err(CheckoutError::DependencyFailure { step, .. }) => {
            assert_eq!(step, steps::STEP_CURRENCY)
        }
        other => panic!("expected currency failure, got {other:?}"),
    }
    assert_eq!(h.services.payment.charge_calls(), 0);
}

#[tokio::test]
async fn test_rejected_card_is_payment_failure() {
    let h = TestHarness::new();
    h.seed_cart("frank").await;
    let mut req = request("frank", "USD");
    req.credit_card.credit_card_expiration_year = 2001;

    let result = h.orchestrator.place_order(&ctx("frank"), req).await;

    match result {
        Err(CheckoutError::DependencyFailure { step, cause }) => {
            assert_eq!(step, steps::STEP_PAYMENT);
            assert!(matches!(cause, ServiceError::InvalidArgument(_)));
        }
        other => panic!("expected payment failure, got {other:?}"),
    }
    assert!(h.services.shipping.shipments().is_empty());
}

#[tokio::test]
async fn test_shipping_failure_after_payment_is_unavailable() {
    let h = TestHarness::new();
    h.seed_cart("grace").await;
    h.services.shipping.set_fail_on_ship(true);

    let result = h
        .orchestrator
        .place_order(&ctx("grace"), request("grace", "USD"))
        .await;

    assert!(matches!(result, Err(CheckoutError::Unavailable(_))));

    // Charged, not refunded, and no follow-ups.
    assert_eq!(h.services.payment.charges().len(), 1);
    h.wait_for_follow_ups().await;
    assert_eq!(h.services.cart.empty_calls(), 0);
    assert_eq!(h.services.cart.items(&UserId::new("grace")).len(), 2);
    assert!(h.services.email.sent().is_empty());
}

#[tokio::test]
async fn test_follow_up_failures_do_not_fail_order() {
    let h = TestHarness::new();
    h.seed_cart("heidi").await;
    h.services.cart.set_fail_on_empty(true);
    h.services.email.set_fail_on_send(true);

    let result = h
        .orchestrator
        .place_order(&ctx("heidi"), request("heidi", "USD"))
        .await;
    assert!(result.is_ok());

    h.wait_for_follow_ups().await;
    assert_eq!(h.services.cart.empty_calls(), 1);
    assert!(h.services.email.sent().is_empty());
}

#[tokio::test]
async fn test_marker_fires_once_across_orders() {
    let h = TestHarness::with_load_config(LoadSimulatorConfig::with_thresholds(35_000, 15));

    h.orchestrator
        .place_order(&ctx("ivan"), request("ivan", "USD"))
        .await
        .unwrap();
    h.wait_for_follow_ups().await;
    assert!(h.markers.markers().is_empty());

    for _ in 0..3 {
        h.orchestrator
            .place_order(&ctx("ivan"), request("ivan", "USD"))
            .await
            .unwrap();
    }
    h.wait_for_follow_ups().await;

    let markers = h.markers.markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].threshold, 15);
    assert!((20..=22).contains(&markers[0].size));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_share_load_counter() {
    let h = TestHarness::new();
    let users: Vec<String> = (0..20).map(|i| format!("user-{i}")).collect();
    for user in &users {
        h.seed_cart(user).await;
    }

    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            let orchestrator = h.orchestrator.clone();
            let user = user.clone();
            tokio::spawn(async move {
                orchestrator
                    .place_order(&ctx(&user), request(&user, "USD"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let size = h.orchestrator.load_counter_size();
    assert!((200..=220).contains(&size), "size was {size}");
    assert_eq!(h.services.payment.charges().len(), 20);
}

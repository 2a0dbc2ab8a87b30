//! Checkout orchestrator driving the order-placement saga.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{BackgroundTasks, CorrelationContext, OrderId, UserId};
use domain::{Address, CartItem, CreditCardInfo, OrderItem, OrderResult, order_total};
use load_simulator::{DiscountModel, LatencyProfile, LoadCounter};
use tracing::Instrument;

use crate::error::{CheckoutError, Result, ServiceError};
use crate::services::Dependencies;
use crate::state::CheckoutStep;
use crate::steps;

/// Orchestrator tuning.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Upper bound on every synchronous dependency call.
    pub call_timeout: Duration,
    /// Simulated processing time after each successful dependency call.
    pub processing_latency: LatencyProfile,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            processing_latency: LatencyProfile::disabled(),
        }
    }
}

/// Inbound order placement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    pub user_currency: String,
    pub address: Address,
    pub email: String,
    pub credit_card: CreditCardInfo,
}

/// State owned by one in-flight order placement.
#[derive(Debug)]
struct OrderWorkflowContext {
    correlation: CorrelationContext,
    order_id: OrderId,
    step: CheckoutStep,
    user_currency: String,
    address: Address,
    email: String,
    credit_card: CreditCardInfo,
    cart: Vec<CartItem>,
}

impl OrderWorkflowContext {
    fn new(ctx: &CorrelationContext, order_id: OrderId, request: PlaceOrderRequest) -> Self {
        Self {
            correlation: ctx.with_order(order_id),
            order_id,
            step: CheckoutStep::Start,
            user_currency: request.user_currency,
            address: request.address,
            email: request.email,
            credit_card: request.credit_card,
            cart: Vec::new(),
        }
    }

    fn advance(&mut self, to: CheckoutStep) -> Result<()> {
        if !self.step.can_advance_to(to) {
            return Err(CheckoutError::InvariantViolation(format!(
                "cannot move from {} to {}",
                self.step, to
            )));
        }
        tracing::debug!(order_id = %self.order_id, from = %self.step, to = %to, "checkout step");
        self.step = to;
        Ok(())
    }
}

/// Places orders against the cart, catalog, currency, shipping, payment and
/// email services.
///
/// Every synchronous step runs in sequence and any failure aborts the order
/// without retry. Payment is never refunded: a shipping failure after a
/// successful charge is reported as [`CheckoutError::Unavailable`]. Cart
/// clearing and the confirmation email are detached follow-ups whose
/// outcome never reaches the caller.
pub struct CheckoutOrchestrator {
    deps: Dependencies,
    load: Arc<LoadCounter>,
    discounts: DiscountModel,
    tasks: BackgroundTasks,
    config: CheckoutConfig,
}

impl CheckoutOrchestrator {
    pub fn new(deps: Dependencies, load: Arc<LoadCounter>, tasks: BackgroundTasks) -> Self {
        Self {
            deps,
            load,
            discounts: DiscountModel::default(),
            tasks,
            config: CheckoutConfig::default(),
        }
    }

    pub fn with_discount_model(mut self, discounts: DiscountModel) -> Self {
        self.discounts = discounts;
        self
    }

    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Current size of the shared load counter.
    pub fn load_counter_size(&self) -> u64 {
        self.load.current_size()
    }

    pub fn load_counter(&self) -> &Arc<LoadCounter> {
        &self.load
    }

    /// Places an order and returns its result once it has shipped.
    #[tracing::instrument(
        skip(self, ctx, request),
        fields(
            user_id = %request.user_id,
            request_id = %ctx.request_id,
            build = %ctx.build,
            order_id = tracing::field::Empty,
            cachesize = tracing::field::Empty,
        )
    )]
    pub async fn place_order(
        &self,
        ctx: &CorrelationContext,
        request: PlaceOrderRequest,
    ) -> Result<OrderResult> {
        metrics::counter!("checkout_orders_total").increment(1);
        let started = Instant::now();

        let result = self.run(ctx, request).await;

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);
        match &result {
            Ok(order) => {
                metrics::counter!("checkout_orders_completed").increment(1);
                tracing::info!(
                    order_id = %order.order_id,
                    tracking_id = %order.shipping_tracking_id,
                    duration,
                    "order placed"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_orders_failed", "step" => e.step()).increment(1);
                tracing::warn!(step = e.step(), error = %e, duration, "order failed");
            }
        }
        result
    }

    async fn run(&self, ctx: &CorrelationContext, request: PlaceOrderRequest) -> Result<OrderResult> {
        let span = tracing::Span::current();

        let load = self.load.record_order();
        let cachesize = load.current;
        span.record("cachesize", cachesize);

        let order_id = OrderId::new();
        span.record("order_id", tracing::field::display(order_id));

        let user_id = request.user_id.clone();
        let mut wf = OrderWorkflowContext::new(ctx, order_id, request);

        wf.cart = self
            .call(
                steps::STEP_CART,
                self.deps.cart.get_cart(&wf.correlation, &user_id),
            )
            .await?;
        wf.advance(CheckoutStep::CartFetched)?;

        let items = self.price_items(&wf).await?;
        wf.advance(CheckoutStep::Priced)?;

        let discount = self.discounts.discount_value(user_id.as_str(), cachesize).await;
        tracing::info!(
            percent = discount.percent,
            branch = discount.branch.as_str(),
            simulated_calls = discount.simulated_calls,
            "discount computed"
        );
        wf.advance(CheckoutStep::Discounted)?;

        let quote_usd = self
            .call(
                steps::STEP_SHIPPING_QUOTE,
                self.deps
                    .shipping
                    .get_quote(&wf.correlation, &wf.address, &wf.cart),
            )
            .await?;
        wf.advance(CheckoutStep::ShippingQuoted)?;

        let shipping_cost = self
            .call(
                steps::STEP_CURRENCY,
                self.deps
                    .currency
                    .convert(&wf.correlation, &quote_usd, &wf.user_currency),
            )
            .await?;
        let total = order_total(&wf.user_currency, &shipping_cost, &items)?;
        wf.advance(CheckoutStep::CurrencyConverted)?;

        let transaction_id = self
            .call(
                steps::STEP_PAYMENT,
                self.deps
                    .payment
                    .charge(&wf.correlation, &total, &wf.credit_card),
            )
            .await?;
        tracing::info!(%transaction_id, amount = %total, "payment went through");
        wf.advance(CheckoutStep::Charged)?;

        let tracking_id = self
            .bounded(
                self.deps
                    .shipping
                    .ship_order(&wf.correlation, &wf.address, &wf.cart),
            )
            .await
            .map_err(|e| {
                tracing::warn!(
                    order_id = %wf.order_id,
                    charged = wf.step.is_charged(),
                    error = %e,
                    "shipping failed after payment"
                );
                CheckoutError::Unavailable(e)
            })?;
        self.config.processing_latency.wait().await;
        wf.advance(CheckoutStep::Shipped)?;

        let order = OrderResult {
            order_id,
            shipping_tracking_id: tracking_id,
            shipping_cost,
            shipping_address: wf.address.clone(),
            items,
        };
        wf.advance(CheckoutStep::Completed)?;

        self.submit_follow_ups(&wf, &order);
        Ok(order)
    }

    /// Prices every cart line in the user's currency. The first failing
    /// line aborts the order.
    async fn price_items(&self, wf: &OrderWorkflowContext) -> Result<Vec<OrderItem>> {
        let mut items = Vec::with_capacity(wf.cart.len());
        for item in &wf.cart {
            let product = self
                .call(
                    steps::STEP_PRODUCT_CATALOG,
                    self.deps
                        .catalog
                        .get_product(&wf.correlation, &item.product_id),
                )
                .await?;
            let cost = self
                .call(
                    steps::STEP_CURRENCY,
                    self.deps
                        .currency
                        .convert(&wf.correlation, &product.price_usd, &wf.user_currency),
                )
                .await?;
            items.push(OrderItem::new(item.clone(), cost));
        }
        Ok(items)
    }

    /// Detaches cart clearing and the confirmation email.
    fn submit_follow_ups(&self, wf: &OrderWorkflowContext, order: &OrderResult) {
        let cart = self.deps.cart.clone();
        let ctx = wf.correlation.clone();
        let user_id = ctx.user_id.clone();
        self.tasks.submit(
            steps::STEP_EMPTY_CART,
            async move { cart.empty_cart(&ctx, &user_id).await }
                .instrument(tracing::info_span!("empty_cart", order_id = %order.order_id)),
        );

        let email_service = self.deps.email.clone();
        let ctx = wf.correlation.clone();
        let email = wf.email.clone();
        let confirmation = order.clone();
        self.tasks.submit(
            steps::STEP_CONFIRMATION_EMAIL,
            async move {
                email_service
                    .send_order_confirmation(&ctx, &email, &confirmation)
                    .await
            }
            .instrument(tracing::info_span!("confirmation_email", order_id = %order.order_id)),
        );
    }

    /// Runs one synchronous dependency call: bounded by the call timeout,
    /// tagged with `step` on failure, followed by simulated processing time.
    async fn call<T, F>(&self, step: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ServiceError>>,
    {
        let value = self
            .bounded(fut)
            .await
            .map_err(|cause| CheckoutError::DependencyFailure { step, cause })?;
        self.config.processing_latency.wait().await;
        Ok(value)
    }

    async fn bounded<T, F>(&self, fut: F) -> std::result::Result<T, ServiceError>
    where
        F: Future<Output = std::result::Result<T, ServiceError>>,
    {
        tokio::time::timeout(self.config.call_timeout, fut)
            .await
            .unwrap_or(Err(ServiceError::DeadlineExceeded(self.config.call_timeout)))
    }
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("load", &self.load)
            .field("discounts", &self.discounts)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

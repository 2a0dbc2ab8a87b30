//! Checkout step names, used for error tags, metrics labels and logs.

/// Fetch the user's cart.
pub const STEP_CART: &str = "cart";

/// Look up a cart item's catalog price.
pub const STEP_PRODUCT_CATALOG: &str = "product_catalog";

/// Convert an amount into the user's currency.
pub const STEP_CURRENCY: &str = "currency";

/// Obtain a shipping quote.
pub const STEP_SHIPPING_QUOTE: &str = "shipping_quote";

/// Charge the payment instrument.
pub const STEP_PAYMENT: &str = "payment";

/// Ship the order.
pub const STEP_SHIP_ORDER: &str = "ship_order";

/// Detached: empty the user's cart.
pub const STEP_EMPTY_CART: &str = "empty_cart";

/// Detached: send the confirmation email.
pub const STEP_CONFIRMATION_EMAIL: &str = "confirmation_email";

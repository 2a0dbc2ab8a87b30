//! Checkout saga state machine.

/// The position of one order placement in its lifecycle.
///
/// State transitions (strictly linear, no back-edges):
/// ```text
/// Start ──► CartFetched ──► Priced ──► Discounted ──► ShippingQuoted
///       ──► CurrencyConverted ──► Charged ──► Shipped ──► Completed
/// ```
/// Cart clearing and the confirmation email run detached after
/// `Completed` and are not part of this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CheckoutStep {
    #[default]
    Start,
    CartFetched,
    Priced,
    Discounted,
    ShippingQuoted,
    CurrencyConverted,
    Charged,
    Shipped,
    Completed,
}

impl CheckoutStep {
    /// Returns the only state this one may move to.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Start => Some(CheckoutStep::CartFetched),
            CheckoutStep::CartFetched => Some(CheckoutStep::Priced),
            CheckoutStep::Priced => Some(CheckoutStep::Discounted),
            CheckoutStep::Discounted => Some(CheckoutStep::ShippingQuoted),
            CheckoutStep::ShippingQuoted => Some(CheckoutStep::CurrencyConverted),
            CheckoutStep::CurrencyConverted => Some(CheckoutStep::Charged),
            CheckoutStep::Charged => Some(CheckoutStep::Shipped),
            CheckoutStep::Shipped => Some(CheckoutStep::Completed),
            CheckoutStep::Completed => None,
        }
    }

    pub fn can_advance_to(&self, target: CheckoutStep) -> bool {
        self.next() == Some(target)
    }

    /// Returns true once the payment has been taken.
    pub fn is_charged(&self) -> bool {
        *self >= CheckoutStep::Charged
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Start => "Start",
            CheckoutStep::CartFetched => "CartFetched",
            CheckoutStep::Priced => "Priced",
            CheckoutStep::Discounted => "Discounted",
            CheckoutStep::ShippingQuoted => "ShippingQuoted",
            CheckoutStep::CurrencyConverted => "CurrencyConverted",
            CheckoutStep::Charged => "Charged",
            CheckoutStep::Shipped => "Shipped",
            CheckoutStep::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_start() {
        assert_eq!(CheckoutStep::default(), CheckoutStep::Start);
    }

    #[test]
    fn test_walk_reaches_completed_in_order() {
        let mut step = CheckoutStep::Start;
        let mut visited = vec![step];
        while let Some(next) = step.next() {
            assert!(next > step);
            step = next;
            visited.push(step);
        }
        assert_eq!(visited.len(), 9);
        assert_eq!(step, CheckoutStep::Completed);
        assert!(step.next().is_none());
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(CheckoutStep::Start.can_advance_to(CheckoutStep::CartFetched));
        assert!(!CheckoutStep::Start.can_advance_to(CheckoutStep::Priced));
        assert!(!CheckoutStep::Charged.can_advance_to(CheckoutStep::Priced));
        assert!(!CheckoutStep::Completed.can_advance_to(CheckoutStep::Start));
    }

    #[test]
    fn test_is_charged() {
        assert!(!CheckoutStep::CurrencyConverted.is_charged());
        assert!(CheckoutStep::Charged.is_charged());
        assert!(CheckoutStep::Shipped.is_charged());
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckoutStep::Start.to_string(), "Start");
        assert_eq!(CheckoutStep::ShippingQuoted.to_string(), "ShippingQuoted");
        assert_eq!(CheckoutStep::Completed.to_string(), "Completed");
    }
}

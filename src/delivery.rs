//! Delivery
//!
//! Tiered delivery charges. A [`DeliveryRules`] table maps a (post-discount) basket
//! subtotal to the cost of the first tier whose limit is strictly greater than it.
//! The last tier is always [`TierLimit::Unbounded`], so every subtotal resolves to a tier.

use std::{cmp::Ordering, fmt};

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors raised while building a delivery rule table.
#[derive(Debug, Error, PartialEq)]
pub enum DeliveryRulesError {
    /// No tiers were provided.
    #[error("delivery rules need at least one tier")]
    NoTiers,

    /// No tier covers subtotals above the highest limit.
    #[error("the last delivery tier must be unbounded")]
    MissingUnboundedTier,

    /// More than one tier has no limit.
    #[error("only one delivery tier may be unbounded, found {0}")]
    MultipleUnboundedTiers(usize),

    /// A tier has a negative cost or limit.
    #[error("delivery tier {0} has a negative amount")]
    NegativeAmount(usize),

    /// A tier's amounts cannot be combined with the first tier's.
    #[error("delivery tier {tier}: {source}")]
    Money {
        /// Index of the offending tier
        tier: usize,

        /// Wrapped currency mismatch
        source: MoneyError,
    },
}

/// Upper bound of a delivery tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TierLimit<'a> {
    /// Applies to subtotals strictly below this amount.
    Below(Money<'a, Currency>),

    /// Applies to every subtotal not matched by an earlier tier.
    Unbounded,
}

impl<'a> TierLimit<'a> {
    /// Check whether a subtotal falls under this limit.
    ///
    /// A subtotal equal to the limit does not qualify; it belongs to the next tier.
    pub fn admits(&self, subtotal: &Money<'a, Currency>) -> bool {
        match self {
            TierLimit::Below(limit) => subtotal.to_minor_units() < limit.to_minor_units(),
            TierLimit::Unbounded => true,
        }
    }

    /// The limit amount, `None` when unbounded.
    pub fn amount(&self) -> Option<Money<'a, Currency>> {
        match self {
            TierLimit::Below(limit) => Some(*limit),
            TierLimit::Unbounded => None,
        }
    }

    fn sort_key(&self) -> Option<i64> {
        self.amount().map(|limit| limit.to_minor_units())
    }
}

impl fmt::Display for TierLimit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierLimit::Below(limit) => write!(f, "below {limit}"),
            TierLimit::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// A single row of the delivery table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryTier<'a> {
    /// Upper bound (exclusive) of the subtotals this tier covers
    pub limit: TierLimit<'a>,

    /// Delivery charge for this tier
    pub cost: Money<'a, Currency>,
}

impl<'a> DeliveryTier<'a> {
    /// Tier for subtotals strictly below `limit`.
    pub fn below(limit: Money<'a, Currency>, cost: Money<'a, Currency>) -> Self {
        DeliveryTier {
            limit: TierLimit::Below(limit),
            cost,
        }
    }

    /// Catch-all tier for every remaining subtotal.
    pub fn unbounded(cost: Money<'a, Currency>) -> Self {
        DeliveryTier {
            limit: TierLimit::Unbounded,
            cost,
        }
    }
}

/// Customer-facing note attached to a resolved delivery tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMessage {
    /// The tier costs nothing.
    FreeDelivery,

    /// The tier is cheaper than the most expensive tier.
    DeliveryDiscount,
}

impl DeliveryMessage {
    /// Text shown to the customer.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMessage::FreeDelivery => "Free delivery",
            DeliveryMessage::DeliveryDiscount => "Delivery discount applied",
        }
    }
}

impl fmt::Display for DeliveryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tier a subtotal resolved to, with its customer-facing message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedDeliveryRule<'a> {
    /// Limit of the matched tier
    pub limit: TierLimit<'a>,

    /// Cost of the matched tier
    pub cost: Money<'a, Currency>,

    /// `None` for the standard (base) tier
    pub message: Option<DeliveryMessage>,
}

/// Ordered delivery tier table.
#[derive(Debug, Clone)]
pub struct DeliveryRules<'a> {
    tiers: Vec<DeliveryTier<'a>>,
    currency: &'a Currency,
    max_cost: i64,
}

impl<'a> DeliveryRules<'a> {
    /// Build a delivery table.
    ///
    /// Tiers are sorted by ascending limit (stable, unbounded last), so callers may pass
    /// them in any order.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryRulesError`] if the table is empty, has no unbounded tier or
    /// more than one, contains negative amounts, or mixes currencies.
    pub fn new(tiers: impl Into<Vec<DeliveryTier<'a>>>) -> Result<Self, DeliveryRulesError> {
        let mut tiers = tiers.into();

        let currency = tiers
            .first()
            .map(|tier| tier.cost.currency())
            .ok_or(DeliveryRulesError::NoTiers)?;

        for (idx, tier) in tiers.iter().enumerate() {
            validate_tier(idx, tier, currency)?;
        }

        let unbounded = tiers
            .iter()
            .filter(|tier| tier.limit == TierLimit::Unbounded)
            .count();

        match unbounded {
            0 => return Err(DeliveryRulesError::MissingUnboundedTier),
            1 => {}
            n => return Err(DeliveryRulesError::MultipleUnboundedTiers(n)),
        }

        tiers.sort_by(|a, b| compare_limits(&a.limit, &b.limit));

        let max_cost = tiers
            .iter()
            .map(|tier| tier.cost.to_minor_units())
            .max()
            .unwrap_or_default();

        Ok(DeliveryRules {
            tiers,
            currency,
            max_cost,
        })
    }

    /// Delivery cost for a subtotal.
    ///
    /// Falls back to zero if no tier matches, which the unbounded last tier rules out.
    pub fn cost(&self, subtotal: &Money<'a, Currency>) -> Money<'a, Currency> {
        self.resolve(subtotal).map_or_else(
            || Money::from_minor(0, self.currency),
            |(_, tier)| tier.cost,
        )
    }

    /// The tier a subtotal falls into, with its customer-facing message.
    ///
    /// - cost of zero: [`DeliveryMessage::FreeDelivery`]
    /// - cheaper than the most expensive tier, and not the first tier:
    ///   [`DeliveryMessage::DeliveryDiscount`]
    /// - otherwise no message
    pub fn applied_rule(&self, subtotal: &Money<'a, Currency>) -> Option<AppliedDeliveryRule<'a>> {
        let (idx, tier) = self.resolve(subtotal)?;
        let cost = tier.cost.to_minor_units();

        let message = if cost == 0 {
            Some(DeliveryMessage::FreeDelivery)
        } else if cost < self.max_cost && idx > 0 {
            Some(DeliveryMessage::DeliveryDiscount)
        } else {
            None
        };

        Some(AppliedDeliveryRule {
            limit: tier.limit,
            cost: tier.cost,
            message,
        })
    }

    /// Tiers in ascending limit order.
    pub fn tiers(&self) -> &[DeliveryTier<'a>] {
        &self.tiers
    }

    /// Currency of every tier.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    fn resolve(&self, subtotal: &Money<'a, Currency>) -> Option<(usize, &DeliveryTier<'a>)> {
        self.tiers
            .iter()
            .enumerate()
            .find(|(_, tier)| tier.limit.admits(subtotal))
    }
}

fn validate_tier<'a>(
    idx: usize,
    tier: &DeliveryTier<'a>,
    currency: &'a Currency,
) -> Result<(), DeliveryRulesError> {
    let zero = Money::from_minor(0, currency);

    for amount in [Some(tier.cost), tier.limit.amount()].iter().flatten() {
        let negative = zero
            .gt(amount)
            .map_err(|source| DeliveryRulesError::Money { tier: idx, source })?;

        if negative {
            return Err(DeliveryRulesError::NegativeAmount(idx));
        }
    }

    Ok(())
}

fn compare_limits(a: &TierLimit<'_>, b: &TierLimit<'_>) -> Ordering {
    match (a.sort_key(), b.sort_key()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

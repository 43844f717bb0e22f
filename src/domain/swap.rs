use super::coin::Coin;
use super::payment::{AddressOrIndex, SourceKind};
use crate::error::FlowError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account offered as one side of a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapAccount {
    pub coin: Coin,
    pub label: String,
    pub address: AddressOrIndex,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Balance in base units.
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwapSide {
    Base,
    Counter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapDirection {
    OnChain,
    FromUserkey,
    ToUserkey,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStep {
    #[default]
    InitSwap,
    EnterAmount,
    PreviewSwap,
    OrderDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: Coin,
    pub counter: Coin,
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.counter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub volume: Decimal,
    pub price: Decimal,
    pub margin_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub id: String,
    pub pair: String,
    pub price_tiers: Vec<PriceTier>,
    pub sample_deposit_address: String,
}

/// A quote together with the unit rate derived from its tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedQuote {
    pub quote: SwapQuote,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapLimits {
    pub currency: String,
    pub min_order: Decimal,
    pub max_order: Decimal,
    pub max_possible_order: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapOrder {
    pub id: String,
    pub state: String,
    pub direction: SwapDirection,
    pub quote_id: String,
    pub amount: Decimal,
}

/// Deposit address of the user's linked exchange account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeAccount {
    pub address: String,
}

/// Custodial trading account used as a payment beneficiary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: String,
    pub name: String,
    pub address: String,
    pub currency: Coin,
}

/// How long a non-crypto deposit locks withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LockRule {
    Days(u32),
    Duration {
        #[serde(rename = "lockTime")]
        lock_time: u64,
    },
}

const SECONDS_PER_DAY: u64 = 86_400;

/// Normalizes a lock rule to whole days, using `default_days` when the rule is
/// absent or zero days.
pub fn lock_days(rule: Option<&LockRule>, default_days: u32) -> u32 {
    match rule {
        Some(LockRule::Days(days)) if *days > 0 => *days,
        Some(LockRule::Duration { lock_time }) => {
            u32::try_from(lock_time / SECONDS_PER_DAY).unwrap_or(u32::MAX)
        }
        _ => default_days,
    }
}

pub fn pair(base: &SwapAccount, counter: &SwapAccount) -> TradingPair {
    TradingPair {
        base: base.coin,
        counter: counter.coin,
    }
}

pub fn direction(base: &SwapAccount, counter: &SwapAccount) -> SwapDirection {
    match (base.kind, counter.kind) {
        (SourceKind::Account, SourceKind::Account) => SwapDirection::OnChain,
        (SourceKind::Account, SourceKind::Custodial) => SwapDirection::FromUserkey,
        (SourceKind::Custodial, SourceKind::Account) => SwapDirection::ToUserkey,
        (SourceKind::Custodial, SourceKind::Custodial) => SwapDirection::Internal,
    }
}

/// Price for `amount` of the base coin, interpolated linearly between the
/// tiers that bracket it. Amounts outside the tiers take the nearest tier price.
///
/// Fails with [`FlowError::Validation`] when the interpolation overflows.
pub fn rate(tiers: &[PriceTier], amount: Decimal) -> Result<Decimal, FlowError> {
    let (Some(first), Some(last)) = (tiers.first(), tiers.last()) else {
        return Ok(Decimal::ZERO);
    };
    if amount <= first.volume {
        return Ok(first.price);
    }

    for window in tiers.windows(2) {
        let (lower, upper) = (&window[0], &window[1]);
        if lower.volume < amount && amount <= upper.volume {
            return interpolate(lower, upper, amount)
                .ok_or_else(|| FlowError::validation("quote price tiers are out of range"));
        }
    }

    Ok(last.price)
}

fn interpolate(lower: &PriceTier, upper: &PriceTier, amount: Decimal) -> Option<Decimal> {
    let span = upper.volume.checked_sub(lower.volume)?;
    if span.is_zero() {
        return Some(upper.price);
    }
    let slope = upper.price.checked_sub(lower.price)?.checked_div(span)?;
    let offset = slope.checked_mul(amount.checked_sub(lower.volume)?)?;
    lower.price.checked_add(offset)
}

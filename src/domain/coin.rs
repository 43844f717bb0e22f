use crate::error::FlowError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coins the wallet can send or swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Coin {
    Bch,
    Btc,
    Eth,
    Pax,
    Usdt,
    Wdgld,
    Xlm,
    Algo,
}

/// The payment-builder family that constructs drafts for a coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuilderFamily {
    Btc,
    Bch,
    Eth,
    Xlm,
}

impl Coin {
    pub const ALL: [Coin; 8] = [
        Coin::Bch,
        Coin::Btc,
        Coin::Eth,
        Coin::Pax,
        Coin::Usdt,
        Coin::Wdgld,
        Coin::Xlm,
        Coin::Algo,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Coin::Bch => "BCH",
            Coin::Btc => "BTC",
            Coin::Eth => "ETH",
            Coin::Pax => "PAX",
            Coin::Usdt => "USDT",
            Coin::Wdgld => "WDGLD",
            Coin::Xlm => "XLM",
            Coin::Algo => "ALGO",
        }
    }

    /// ALGO has no builder yet.
    pub fn family(&self) -> Option<BuilderFamily> {
        match self {
            Coin::Btc => Some(BuilderFamily::Btc),
            Coin::Bch => Some(BuilderFamily::Bch),
            Coin::Eth | Coin::Pax | Coin::Usdt | Coin::Wdgld => Some(BuilderFamily::Eth),
            Coin::Xlm => Some(BuilderFamily::Xlm),
            Coin::Algo => None,
        }
    }

    pub fn is_erc20(&self) -> bool {
        matches!(self, Coin::Pax | Coin::Usdt | Coin::Wdgld)
    }

    /// Destinations for memo-bearing coins are written as `ADDRESS:MEMO`.
    pub fn has_memo(&self) -> bool {
        matches!(self, Coin::Xlm)
    }

    pub fn decimals(&self) -> u32 {
        match self {
            Coin::Btc | Coin::Bch | Coin::Wdgld => 8,
            Coin::Eth | Coin::Pax => 18,
            Coin::Usdt | Coin::Algo => 6,
            Coin::Xlm => 7,
        }
    }

    fn unit(&self) -> Decimal {
        Decimal::from_i128_with_scale(10i128.pow(self.decimals()), 0)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Coin {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coin::ALL
            .into_iter()
            .find(|coin| coin.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FlowError::InvalidCoinType(s.to_string()))
    }
}

/// Converts an amount in standard units (e.g. BTC) to base units (e.g. satoshi).
/// Fails when the result does not fit in a `Decimal`.
pub fn convert_standard_to_base(coin: Coin, amount: Decimal) -> Result<Decimal, FlowError> {
    amount
        .checked_mul(coin.unit())
        .map(|base| base.normalize())
        .ok_or_else(|| FlowError::Validation(format!("{amount} {coin} is out of range")))
}

/// Converts an amount in base units back to standard units.
pub fn convert_base_to_standard(coin: Coin, amount: Decimal) -> Result<Decimal, FlowError> {
    amount
        .checked_div(coin.unit())
        .map(|standard| standard.normalize())
        .ok_or_else(|| {
            FlowError::Validation(format!("{amount} base units of {coin} is out of range"))
        })
}

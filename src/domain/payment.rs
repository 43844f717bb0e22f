use super::coin::Coin;
use super::ports::PaymentBuilderBox;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DestinationKind {
    /// Funds held by the platform itself.
    Custodial,
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceKind {
    Account,
    Custodial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoType {
    Text,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    Regular,
    #[default]
    Priority,
}

/// A wallet account is addressed either by its derivation index or an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressOrIndex {
    Index(u32),
    Address(String),
}

/// Chain parameters handed to a builder when a draft is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NetworkParams {
    Bitcoin { name: String },
    Ethereum { chain_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub address: AddressOrIndex,
    pub kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub address: String,
    pub kind: DestinationKind,
    pub memo: Option<String>,
    pub memo_type: Option<MemoType>,
    pub account_exists: bool,
}

/// Snapshot of an in-progress payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentValue {
    pub coin: Coin,
    pub network: Option<NetworkParams>,
    pub is_erc20: bool,
    pub from: Option<Source>,
    pub to: Option<Destination>,
    /// Amount in base units.
    pub amount: Option<Decimal>,
    pub fee_tier: Option<FeeTier>,
    pub fee: Option<Decimal>,
    pub effective_balance: Decimal,
    pub built: bool,
    pub signed: bool,
    pub published: bool,
    pub tx_id: Option<String>,
}

impl PaymentValue {
    pub fn empty(coin: Coin) -> Self {
        Self {
            coin,
            network: None,
            is_erc20: coin.is_erc20(),
            from: None,
            to: None,
            amount: None,
            fee_tier: None,
            fee: None,
            effective_balance: Decimal::ZERO,
            built: false,
            signed: false,
            published: false,
            tx_id: None,
        }
    }

    /// Result reported when a provisional payment could not be calculated.
    pub fn degraded(coin: Coin) -> Self {
        Self::empty(coin)
    }

    pub fn with_balance(coin: Coin, effective_balance: Decimal) -> Self {
        Self {
            effective_balance,
            ..Self::empty(coin)
        }
    }
}

/// User-supplied secret authorizing a signature. Wiped from memory on drop.
#[derive(Clone)]
pub struct SecondFactor(Zeroizing<String>);

impl SecondFactor {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for SecondFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecondFactor(***)")
    }
}

/// Draft stages. A draft only moves forward:
/// `Fresh -> Addressed -> Built -> Signed -> Published`.
#[derive(Debug)]
pub struct Fresh;
#[derive(Debug)]
pub struct Addressed;
#[derive(Debug)]
pub struct Built;
#[derive(Debug)]
pub struct Signed;
#[derive(Debug)]
pub struct Published;

/// An in-progress payment bound to the builder of its coin family.
///
/// Each step consumes the draft and returns the next one, so `sign` can only
/// follow `build` and `publish` can only follow `sign`.
pub struct PaymentDraft<S> {
    builder: PaymentBuilderBox,
    value: PaymentValue,
    _stage: PhantomData<S>,
}

impl<S> PaymentDraft<S> {
    fn advance<T>(self, value: PaymentValue) -> PaymentDraft<T> {
        PaymentDraft {
            builder: self.builder,
            value,
            _stage: PhantomData,
        }
    }

    pub fn value(&self) -> &PaymentValue {
        &self.value
    }

    pub fn into_value(self) -> PaymentValue {
        self.value
    }

    pub fn coin(&self) -> Coin {
        self.value.coin
    }
}

impl PaymentDraft<Fresh> {
    pub fn new(builder: PaymentBuilderBox, value: PaymentValue) -> Self {
        Self {
            builder,
            value,
            _stage: PhantomData,
        }
    }

    pub async fn init(self, is_erc20: bool, coin: Coin) -> Result<Self> {
        let value = self.builder.init(self.value.clone(), is_erc20, coin).await?;
        Ok(self.advance(value))
    }

    pub async fn fee(self, tier: FeeTier) -> Result<Self> {
        let value = self.builder.fee(self.value.clone(), tier).await?;
        Ok(self.advance(value))
    }

    pub async fn from(self, address: AddressOrIndex, kind: SourceKind) -> Result<Self> {
        let value = self.builder.from(self.value.clone(), address, kind).await?;
        Ok(self.advance(value))
    }

    pub async fn amount(self, amount: Decimal) -> Result<Self> {
        let value = self.builder.amount(self.value.clone(), amount).await?;
        Ok(self.advance(value))
    }

    pub async fn to(self, address: &str, kind: DestinationKind) -> Result<PaymentDraft<Addressed>> {
        let value = self.builder.to(self.value.clone(), address, kind).await?;
        Ok(self.advance(value))
    }
}

impl PaymentDraft<Addressed> {
    pub async fn memo(self, memo: &str) -> Result<Self> {
        let value = self.builder.memo(self.value.clone(), memo).await?;
        Ok(self.advance(value))
    }

    pub async fn memo_type(self, memo_type: MemoType) -> Result<Self> {
        let value = self.builder.memo_type(self.value.clone(), memo_type).await?;
        Ok(self.advance(value))
    }

    pub async fn set_destination_account_exists(self, exists: bool) -> Result<Self> {
        let value = self
            .builder
            .set_destination_account_exists(self.value.clone(), exists)
            .await?;
        Ok(self.advance(value))
    }

    /// Resolves fee and inputs.
    pub async fn build(self) -> Result<PaymentDraft<Built>> {
        let value = self.builder.build(self.value.clone()).await?;
        Ok(self.advance(value))
    }
}

impl PaymentDraft<Built> {
    pub async fn sign(self, secret: Option<&SecondFactor>) -> Result<PaymentDraft<Signed>> {
        let value = self.builder.sign(self.value.clone(), secret).await?;
        Ok(self.advance(value))
    }
}

impl PaymentDraft<Signed> {
    pub async fn publish(self) -> Result<PaymentDraft<Published>> {
        let value = self.builder.publish(self.value.clone()).await?;
        Ok(self.advance(value))
    }
}

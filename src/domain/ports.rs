use super::coin::Coin;
use super::event::Event;
use super::payment::{
    AddressOrIndex, DestinationKind, FeeTier, MemoType, PaymentValue, SecondFactor, SourceKind,
};
use super::state::AppState;
use super::swap::{
    Beneficiary, ExchangeAccount, LockRule, SwapDirection, SwapLimits, SwapOrder, SwapQuote,
    TradingPair,
};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Deposit method whose withdrawal lock is checked before alerting the user.
pub const PAYMENT_CARD: &str = "PAYMENT_CARD";

/// Remote wallet API.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn get_payments_account_exchange(
        &self,
        coin: Coin,
    ) -> std::result::Result<ExchangeAccount, ApiError>;

    async fn get_sb_payment_account(&self, coin: Coin)
    -> std::result::Result<Beneficiary, ApiError>;

    async fn check_withdrawal_locks(
        &self,
        payment_method: &str,
    ) -> std::result::Result<LockRule, ApiError>;

    async fn notify_non_custodial_to_custodial_transfer(
        &self,
        coin: Coin,
        address: &str,
        tx_id: &str,
        amount: &str,
        product: &str,
    ) -> std::result::Result<(), ApiError>;

    async fn create_swap_order(
        &self,
        direction: SwapDirection,
        quote_id: &str,
        amount: Decimal,
    ) -> std::result::Result<SwapOrder, ApiError>;

    async fn get_swap_quote(
        &self,
        pair: &TradingPair,
        direction: SwapDirection,
    ) -> std::result::Result<SwapQuote, ApiError>;

    async fn get_swap_limits(&self, currency: &str) -> std::result::Result<SwapLimits, ApiError>;
}

/// Per-coin-family payment construction. Every step may suspend on network
/// calls and returns the updated payment value.
#[async_trait]
pub trait PaymentBuilder: Send + Sync {
    async fn init(&self, payment: PaymentValue, is_erc20: bool, coin: Coin)
    -> Result<PaymentValue>;
    async fn fee(&self, payment: PaymentValue, tier: FeeTier) -> Result<PaymentValue>;
    async fn from(
        &self,
        payment: PaymentValue,
        address: AddressOrIndex,
        kind: SourceKind,
    ) -> Result<PaymentValue>;
    async fn amount(&self, payment: PaymentValue, amount: Decimal) -> Result<PaymentValue>;
    async fn to(
        &self,
        payment: PaymentValue,
        address: &str,
        kind: DestinationKind,
    ) -> Result<PaymentValue>;
    async fn memo(&self, payment: PaymentValue, memo: &str) -> Result<PaymentValue>;
    async fn memo_type(&self, payment: PaymentValue, memo_type: MemoType) -> Result<PaymentValue>;
    async fn set_destination_account_exists(
        &self,
        payment: PaymentValue,
        exists: bool,
    ) -> Result<PaymentValue>;
    async fn build(&self, payment: PaymentValue) -> Result<PaymentValue>;
    async fn sign(
        &self,
        payment: PaymentValue,
        secret: Option<&SecondFactor>,
    ) -> Result<PaymentValue>;
    async fn publish(&self, payment: PaymentValue) -> Result<PaymentValue>;
}

/// Application state container. Events are applied one at a time, so readers
/// always see a consistent snapshot.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn dispatch(&self, event: Event) -> Result<()>;
    async fn state(&self) -> Result<AppState>;
    fn subscribe(&self) -> broadcast::Receiver<Event>;
}

/// Asks the user for the wallet's second password.
///
/// Resolves to `None` when the wallet has no second password and fails with
/// `FlowError::SecondFactorCancelled` when the user dismisses the prompt.
#[async_trait]
pub trait SecondFactorPrompt: Send + Sync {
    async fn prompt(&self) -> Result<Option<SecondFactor>>;
}

pub type WalletApiBox = Arc<dyn WalletApi>;
pub type PaymentBuilderBox = Arc<dyn PaymentBuilder>;
pub type StateStoreBox = Arc<dyn StateStore>;
pub type SecondFactorPromptBox = Arc<dyn SecondFactorPrompt>;

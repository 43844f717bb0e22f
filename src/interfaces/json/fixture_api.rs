use crate::domain::coin::Coin;
use crate::domain::ports::WalletApi;
use crate::domain::swap::{
    Beneficiary, ExchangeAccount, LockRule, SwapDirection, SwapLimits, SwapOrder, SwapQuote,
    TradingPair,
};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOperation {
    GetPaymentsAccountExchange,
    GetSbPaymentAccount,
    CheckWithdrawalLocks,
    NotifyNonCustodialToCustodialTransfer,
    CreateSwapOrder,
    GetSwapQuote,
    GetSwapLimits,
}

/// Canned API responses, as read from a JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiFixture {
    pub exchange_accounts: HashMap<Coin, ExchangeAccount>,
    pub trading_accounts: HashMap<Coin, Beneficiary>,
    pub lock_rule: Option<LockRule>,
    pub quote: Option<SwapQuote>,
    pub limits: Option<SwapLimits>,
    /// Failures to return instead of data, per operation.
    pub errors: HashMap<ApiOperation, ApiError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferNotice {
    pub coin: Coin,
    pub address: String,
    pub tx_id: String,
    pub amount: String,
    pub product: String,
}

/// A [`WalletApi`] that answers from an [`ApiFixture`] and remembers the
/// writes it receives.
pub struct FixtureApi {
    fixture: ApiFixture,
    notices: Mutex<Vec<TransferNotice>>,
    orders: Mutex<Vec<SwapOrder>>,
}

impl FixtureApi {
    pub fn new(fixture: ApiFixture) -> Self {
        Self {
            fixture,
            notices: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        let fixture = serde_json::from_reader(source)?;
        Ok(Self::new(fixture))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub async fn notices(&self) -> Vec<TransferNotice> {
        self.notices.lock().await.clone()
    }

    pub async fn orders(&self) -> Vec<SwapOrder> {
        self.orders.lock().await.clone()
    }

    fn check(&self, operation: ApiOperation) -> std::result::Result<(), ApiError> {
        match self.fixture.errors.get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn not_found(what: impl std::fmt::Display) -> ApiError {
    ApiError::new("NOT_FOUND", format!("{what} not found"))
}

#[async_trait]
impl WalletApi for FixtureApi {
    async fn get_payments_account_exchange(
        &self,
        coin: Coin,
    ) -> std::result::Result<ExchangeAccount, ApiError> {
        self.check(ApiOperation::GetPaymentsAccountExchange)?;
        self.fixture
            .exchange_accounts
            .get(&coin)
            .cloned()
            .ok_or_else(|| not_found(format_args!("{coin} exchange account")))
    }

    async fn get_sb_payment_account(
        &self,
        coin: Coin,
    ) -> std::result::Result<Beneficiary, ApiError> {
        self.check(ApiOperation::GetSbPaymentAccount)?;
        self.fixture
            .trading_accounts
            .get(&coin)
            .cloned()
            .ok_or_else(|| not_found(format_args!("{coin} trading account")))
    }

    async fn check_withdrawal_locks(
        &self,
        payment_method: &str,
    ) -> std::result::Result<LockRule, ApiError> {
        self.check(ApiOperation::CheckWithdrawalLocks)?;
        self.fixture
            .lock_rule
            .clone()
            .ok_or_else(|| not_found(format_args!("{payment_method} lock rule")))
    }

    async fn notify_non_custodial_to_custodial_transfer(
        &self,
        coin: Coin,
        address: &str,
        tx_id: &str,
        amount: &str,
        product: &str,
    ) -> std::result::Result<(), ApiError> {
        self.check(ApiOperation::NotifyNonCustodialToCustodialTransfer)?;
        self.notices.lock().await.push(TransferNotice {
            coin,
            address: address.to_string(),
            tx_id: tx_id.to_string(),
            amount: amount.to_string(),
            product: product.to_string(),
        });
        Ok(())
    }

    async fn create_swap_order(
        &self,
        direction: SwapDirection,
        quote_id: &str,
        amount: Decimal,
    ) -> std::result::Result<SwapOrder, ApiError> {
        self.check(ApiOperation::CreateSwapOrder)?;
        let mut orders = self.orders.lock().await;
        let order = SwapOrder {
            id: format!("order-{}", orders.len() + 1),
            state: "PENDING_DEPOSIT".to_string(),
            direction,
            quote_id: quote_id.to_string(),
            amount,
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn get_swap_quote(
        &self,
        pair: &TradingPair,
        _direction: SwapDirection,
    ) -> std::result::Result<SwapQuote, ApiError> {
        self.check(ApiOperation::GetSwapQuote)?;
        self.fixture
            .quote
            .clone()
            .ok_or_else(|| not_found(format_args!("{pair} quote")))
    }

    async fn get_swap_limits(&self, currency: &str) -> std::result::Result<SwapLimits, ApiError> {
        self.check(ApiOperation::GetSwapLimits)?;
        self.fixture
            .limits
            .clone()
            .ok_or_else(|| not_found(format_args!("{currency} swap limits")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = r#"{
        "lock_rule": {"lockTime": 259200},
        "exchange_accounts": {"XLM": {"address": "GEXCHANGE:1234"}},
        "errors": {"get_swap_limits": {"type": "UNAVAILABLE", "message": "try later"}}
    }"#;

    #[tokio::test]
    async fn test_reads_fixture_document() {
        let api = FixtureApi::from_reader(FIXTURE.as_bytes()).unwrap();
        assert_eq!(
            api.check_withdrawal_locks("PAYMENT_CARD").await.unwrap(),
            LockRule::Duration { lock_time: 259_200 }
        );
        assert_eq!(
            api.get_payments_account_exchange(Coin::Xlm).await.unwrap().address,
            "GEXCHANGE:1234"
        );
    }

    #[tokio::test]
    async fn test_injected_error_and_missing_data() {
        let api = FixtureApi::from_reader(FIXTURE.as_bytes()).unwrap();
        let err = api.get_swap_limits("USD").await.unwrap_err();
        assert_eq!(err.kind, "UNAVAILABLE");

        let err = api.get_sb_payment_account(Coin::Btc).await.unwrap_err();
        assert_eq!(err.kind, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_orders_are_recorded() {
        let api = FixtureApi::new(ApiFixture::default());
        let order = api
            .create_swap_order(SwapDirection::OnChain, "q-1", dec!(100))
            .await
            .unwrap();
        assert_eq!(order.id, "order-1");
        assert_eq!(api.orders().await, vec![order]);
    }
}

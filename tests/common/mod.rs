#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use walletflow::application::poller::QuotePoller;
use walletflow::application::resolver::{PaymentBuilders, PaymentResolver};
use walletflow::application::send::SendFlows;
use walletflow::application::swap::SwapFlows;
use walletflow::config::FlowConfig;
use walletflow::domain::coin::{BuilderFamily, Coin};
use walletflow::domain::event::Event;
use walletflow::domain::payment::{AddressOrIndex, SourceKind};
use walletflow::domain::ports::{SecondFactorPromptBox, WalletApi};
use walletflow::domain::swap::{
    Beneficiary, ExchangeAccount, LockRule, PriceTier, SwapAccount, SwapDirection, SwapLimits,
    SwapOrder, SwapQuote, TradingPair,
};
use walletflow::error::ApiError;
use walletflow::infrastructure::in_memory::InMemoryStateStore;
use walletflow::infrastructure::simulated::SimulatedPaymentBuilder;

pub const POLL_INTERVAL: Duration = Duration::from_secs(120);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scripted [`WalletApi`] that counts every call by operation name.
pub struct MockApi {
    pub exchange_account: std::result::Result<ExchangeAccount, ApiError>,
    pub trading_account: std::result::Result<Beneficiary, ApiError>,
    pub lock_rule: std::result::Result<LockRule, ApiError>,
    pub notify: std::result::Result<(), ApiError>,
    pub order: std::result::Result<(), ApiError>,
    pub quote: std::result::Result<SwapQuote, ApiError>,
    pub limits: std::result::Result<SwapLimits, ApiError>,
    pub calls: Mutex<Vec<&'static str>>,
    pub orders: Mutex<Vec<(SwapDirection, String, Decimal)>>,
    pub limit_currencies: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<(Coin, String, String, String, String)>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            exchange_account: Ok(ExchangeAccount {
                address: "exchange-deposit".to_string(),
            }),
            trading_account: Ok(Beneficiary {
                id: "beneficiary-1".to_string(),
                name: "Trading".to_string(),
                address: "trading-deposit".to_string(),
                currency: Coin::Btc,
            }),
            lock_rule: Ok(LockRule::Duration { lock_time: 172_800 }),
            notify: Ok(()),
            order: Ok(()),
            quote: Ok(quote()),
            limits: Ok(SwapLimits {
                currency: "USD".to_string(),
                min_order: dec!(10),
                max_order: dec!(1000),
                max_possible_order: dec!(500),
            }),
            calls: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
            limit_currencies: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub fn orders(&self) -> Vec<(SwapDirection, String, Decimal)> {
        self.orders.lock().unwrap().clone()
    }

    pub fn limit_currencies(&self) -> Vec<String> {
        self.limit_currencies.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<(Coin, String, String, String, String)> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletApi for MockApi {
    async fn get_payments_account_exchange(
        &self,
        _coin: Coin,
    ) -> std::result::Result<ExchangeAccount, ApiError> {
        self.record("get_payments_account_exchange");
        self.exchange_account.clone()
    }

    async fn get_sb_payment_account(
        &self,
        _coin: Coin,
    ) -> std::result::Result<Beneficiary, ApiError> {
        self.record("get_sb_payment_account");
        self.trading_account.clone()
    }

    async fn check_withdrawal_locks(
        &self,
        _payment_method: &str,
    ) -> std::result::Result<LockRule, ApiError> {
        self.record("check_withdrawal_locks");
        self.lock_rule.clone()
    }

    async fn notify_non_custodial_to_custodial_transfer(
        &self,
        coin: Coin,
        address: &str,
        tx_id: &str,
        amount: &str,
        product: &str,
    ) -> std::result::Result<(), ApiError> {
        self.record("notify_non_custodial_to_custodial_transfer");
        self.notices.lock().unwrap().push((
            coin,
            address.to_string(),
            tx_id.to_string(),
            amount.to_string(),
            product.to_string(),
        ));
        self.notify.clone()
    }

    async fn create_swap_order(
        &self,
        direction: SwapDirection,
        quote_id: &str,
        amount: Decimal,
    ) -> std::result::Result<SwapOrder, ApiError> {
        self.record("create_swap_order");
        self.order.clone()?;
        self.orders
            .lock()
            .unwrap()
            .push((direction, quote_id.to_string(), amount));
        Ok(SwapOrder {
            id: "order-1".to_string(),
            state: "PENDING_DEPOSIT".to_string(),
            direction,
            quote_id: quote_id.to_string(),
            amount,
        })
    }

    async fn get_swap_quote(
        &self,
        _pair: &TradingPair,
        _direction: SwapDirection,
    ) -> std::result::Result<SwapQuote, ApiError> {
        self.record("get_swap_quote");
        self.quote.clone()
    }

    async fn get_swap_limits(&self, currency: &str) -> std::result::Result<SwapLimits, ApiError> {
        self.record("get_swap_limits");
        self.limit_currencies
            .lock()
            .unwrap()
            .push(currency.to_string());
        self.limits.clone()
    }
}

pub fn quote() -> SwapQuote {
    SwapQuote {
        id: "quote-1".to_string(),
        pair: "BTC-ETH".to_string(),
        price_tiers: vec![
            PriceTier {
                volume: dec!(0.5),
                price: dec!(30),
                margin_price: dec!(29.5),
            },
            PriceTier {
                volume: dec!(1.5),
                price: dec!(32),
                margin_price: dec!(31.5),
            },
        ],
        sample_deposit_address: "bc1qsampledeposit".to_string(),
    }
}

pub fn account(coin: Coin, kind: SourceKind) -> SwapAccount {
    SwapAccount {
        coin,
        label: format!("{coin} wallet"),
        address: AddressOrIndex::Index(0),
        kind,
        balance: Decimal::ZERO,
    }
}

/// One simulated builder per family, kept concrete so tests can read the calls.
pub struct Builders {
    pub btc: Arc<SimulatedPaymentBuilder>,
    pub bch: Arc<SimulatedPaymentBuilder>,
    pub eth: Arc<SimulatedPaymentBuilder>,
    pub xlm: Arc<SimulatedPaymentBuilder>,
}

impl Builders {
    pub fn with_balance(balance: Decimal) -> Self {
        let builder =
            |family| Arc::new(SimulatedPaymentBuilder::new(family).with_balance(balance));
        Self {
            btc: builder(BuilderFamily::Btc),
            bch: builder(BuilderFamily::Bch),
            eth: builder(BuilderFamily::Eth),
            xlm: builder(BuilderFamily::Xlm),
        }
    }

    pub fn ports(&self) -> PaymentBuilders {
        PaymentBuilders {
            btc: self.btc.clone(),
            bch: self.bch.clone(),
            eth: self.eth.clone(),
            xlm: self.xlm.clone(),
        }
    }
}

pub struct Harness {
    pub api: Arc<MockApi>,
    pub store: InMemoryStateStore,
    pub builders: Builders,
    pub config: FlowConfig,
}

impl Harness {
    pub fn new(api: MockApi) -> Self {
        Self::with_builders(api, Builders::with_balance(dec!(1_000_000_000)))
    }

    pub fn with_builders(api: MockApi, builders: Builders) -> Self {
        init_tracing();
        Self {
            api: Arc::new(api),
            store: InMemoryStateStore::new(),
            builders,
            config: FlowConfig::default(),
        }
    }

    pub fn resolver(&self) -> PaymentResolver {
        PaymentResolver::new(self.builders.ports(), self.config.networks.clone())
    }

    pub fn send_flows(&self, prompt: SecondFactorPromptBox) -> SendFlows {
        SendFlows::new(
            self.api.clone(),
            Arc::new(self.store.clone()),
            prompt,
            self.resolver(),
            self.config.clone(),
        )
    }

    pub fn swap_flows(&self) -> SwapFlows {
        SwapFlows::new(
            self.api.clone(),
            Arc::new(self.store.clone()),
            self.resolver(),
            self.config.clone(),
        )
    }

    pub fn poller(&self) -> QuotePoller {
        QuotePoller::new(
            self.api.clone(),
            Arc::new(self.store.clone()),
            POLL_INTERVAL,
        )
    }

    pub async fn history(&self) -> Vec<Event> {
        self.store.history().await
    }
}

use super::resolver::PaymentResolver;
use crate::config::FlowConfig;
use crate::domain::coin::{
    BuilderFamily, Coin, convert_base_to_standard, convert_standard_to_base,
};
use crate::domain::event::{Event, FormChange, FormName, Modal, SWAP_MODAL};
use crate::domain::payment::{DestinationKind, FeeTier, PaymentDraft, PaymentValue, SourceKind};
use crate::domain::ports::{StateStoreBox, WalletApiBox};
use crate::domain::swap::{SwapAccount, SwapQuote, SwapSide, SwapStep, direction};
use crate::error::{
    FlowError, NO_INIT_SWAP_FORM_VALUES, NO_QUOTE, NO_SWAP_AMOUNT_FORM_VALUES, NO_SWAP_QUOTE,
    Result, error_handler,
};
use rust_decimal::Decimal;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

const LOG_TARGET: &str = "walletflow::swap";

/// Flows behind the swap screens, apart from quote polling.
pub struct SwapFlows {
    api: WalletApiBox,
    store: StateStoreBox,
    resolver: PaymentResolver,
    config: FlowConfig,
}

impl SwapFlows {
    pub fn new(
        api: WalletApiBox,
        store: StateStoreBox,
        resolver: PaymentResolver,
        config: FlowConfig,
    ) -> Self {
        Self {
            api,
            store,
            resolver,
            config,
        }
    }

    pub async fn change_pair(&self, side: SwapSide, account: SwapAccount) -> Result<()> {
        self.store
            .dispatch(Event::FormChange(FormChange::InitSwapSide { side, account }))
            .await?;
        self.store
            .dispatch(Event::SetStep {
                step: SwapStep::InitSwap,
            })
            .await
    }

    /// Sizes a draft deposit of `amount` (standard units) from `source` for
    /// the given quote.
    ///
    /// Advisory only: any failure yields a value with zero effective balance
    /// for the source coin instead of an error.
    pub async fn calculate_provisional_payment(
        &self,
        source: &SwapAccount,
        quote: &SwapQuote,
        amount: Decimal,
        fee: Option<FeeTier>,
    ) -> PaymentValue {
        match self
            .try_provisional_payment(source, quote, amount, fee.unwrap_or_default())
            .await
        {
            Ok(payment) => payment,
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    flow = "calculate_provisional_payment",
                    coin = %source.coin,
                    error = %err,
                    "provisional payment unavailable"
                );
                PaymentValue::degraded(source.coin)
            }
        }
    }

    async fn try_provisional_payment(
        &self,
        source: &SwapAccount,
        quote: &SwapQuote,
        amount: Decimal,
        fee: FeeTier,
    ) -> Result<PaymentValue> {
        let coin = source.coin;
        let is_erc20 = coin.is_erc20();
        let family = if is_erc20 {
            BuilderFamily::Eth
        } else {
            coin.family()
                .ok_or_else(|| FlowError::payment(format!("no payment builder for {coin}")))?
        };

        let mut seed = PaymentValue::empty(coin);
        seed.network = self.resolver.networks().params(family);
        let payment = PaymentDraft::new(self.resolver.builders().for_family(family), seed)
            .init(is_erc20, coin)
            .await?
            .fee(fee)
            .await?
            .from(source.address.clone(), source.kind)
            .await?;

        let base_amount = convert_standard_to_base(coin, amount)?;
        match coin {
            Coin::Pax | Coin::Usdt | Coin::Eth | Coin::Xlm => {
                Ok(payment.amount(base_amount).await?.into_value())
            }
            _ => Ok(payment
                .amount(base_amount.trunc())
                .await?
                .to(&quote.sample_deposit_address, DestinationKind::Address)
                .await?
                .build()
                .await?
                .into_value()),
        }
    }

    pub async fn create_order(&self) -> Result<()> {
        self.store
            .dispatch(Event::FormStartSubmit {
                form: FormName::PreviewSwap,
            })
            .await?;

        let error = match self.try_create_order().await {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    flow = "create_order",
                    error = %err,
                    "swap order not created"
                );
                Some(error_handler(&err))
            }
        };
        self.store
            .dispatch(Event::FormStopSubmit {
                form: FormName::PreviewSwap,
                error,
            })
            .await
    }

    async fn try_create_order(&self) -> Result<()> {
        let state = self.store.state().await?;
        let form = &state.forms.init_swap;
        let (Some(base), Some(counter)) = (&form.base, &form.counter) else {
            return Err(FlowError::validation(NO_INIT_SWAP_FORM_VALUES));
        };
        let amount = state
            .forms
            .swap_amount
            .amount
            .filter(|amount| !amount.is_zero())
            .ok_or_else(|| FlowError::validation(NO_SWAP_AMOUNT_FORM_VALUES))?;

        let direction = direction(base, counter);
        let amount = convert_standard_to_base(base.coin, amount)?;
        let quote = state.swap.quote.get_or_fail(NO_SWAP_QUOTE)?;

        let order = self
            .api
            .create_swap_order(direction, &quote.quote.id, amount)
            .await?;
        info!(
            target: LOG_TARGET,
            order_id = %order.id,
            state = %order.state,
            ?direction,
            "swap order created"
        );
        self.store.dispatch(Event::OrderCreated { order }).await
    }

    pub async fn fetch_limits(&self) -> Result<()> {
        self.store.dispatch(Event::FetchLimitsLoading).await?;
        let currency = self
            .store
            .state()
            .await?
            .settings
            .currency
            .get_or_else(self.config.fiat_currency.clone());

        match self.api.get_swap_limits(&currency).await {
            Ok(limits) => self.store.dispatch(Event::FetchLimitsSuccess { limits }).await,
            Err(err) => {
                let err = FlowError::from(err);
                warn!(target: LOG_TARGET, flow = "fetch_limits", error = %err, "failed to fetch swap limits");
                self.store
                    .dispatch(Event::FetchLimitsFailure {
                        error: error_handler(&err),
                    })
                    .await
            }
        }
    }

    /// Prefills the amount form with the spendable balance of the base
    /// account once the next quote arrives.
    pub async fn init_amount_form(&self) -> Result<()> {
        let quotes = self.store.subscribe();
        self.init_amount_form_with(quotes).await
    }

    /// [`SwapFlows::init_amount_form`] with a subscription taken by the caller,
    /// so that a quote published right after the caller starts polling is not
    /// missed.
    pub async fn init_amount_form_with(&self, quotes: broadcast::Receiver<Event>) -> Result<()> {
        if let Err(err) = self.try_init_amount_form(quotes).await {
            warn!(
                target: LOG_TARGET,
                flow = "init_amount_form",
                error = %err,
                "amount form not initialized"
            );
            self.store
                .dispatch(Event::UpdatePaymentFailure {
                    error: error_handler(&err),
                })
                .await?;
        }
        Ok(())
    }

    async fn try_init_amount_form(&self, mut quotes: broadcast::Receiver<Event>) -> Result<()> {
        self.store.dispatch(Event::UpdatePaymentLoading).await?;
        let base = self.store.state().await?.forms.init_swap.base;

        loop {
            match quotes.recv().await {
                Ok(Event::FetchQuoteSuccess { .. }) => break,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return Err(FlowError::StoreClosed),
            }
        }

        let quote = self.store.state().await?.swap.quote.get_or_fail(NO_QUOTE)?;
        let Some(base) = base else {
            return self
                .store
                .dispatch(Event::SetStep {
                    step: SwapStep::InitSwap,
                })
                .await;
        };

        let payment = match base.kind {
            SourceKind::Account => {
                self.calculate_provisional_payment(&base, &quote.quote, Decimal::ZERO, None)
                    .await
            }
            SourceKind::Custodial => PaymentValue::with_balance(base.coin, base.balance),
        };
        let amount = convert_base_to_standard(base.coin, payment.effective_balance)?;
        self.store
            .dispatch(Event::UpdatePaymentSuccess { payment })
            .await?;

        self.store
            .dispatch(Event::FormChange(FormChange::SwapAmount { amount }))
            .await?;
        self.store.dispatch(Event::FetchLimits).await
    }

    pub async fn show_modal(
        &self,
        origin: String,
        base: Option<Coin>,
        counter: Option<Coin>,
    ) -> Result<()> {
        self.store
            .dispatch(Event::ModalOpened(Modal {
                name: SWAP_MODAL.to_string(),
                origin,
                base,
                counter,
            }))
            .await
    }
}

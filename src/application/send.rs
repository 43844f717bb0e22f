use super::resolver::{PaymentResolver, Resolution};
use crate::config::FlowConfig;
use crate::domain::coin::Coin;
use crate::domain::event::{Alert, Event, LOCKED_WITHDRAW_ERROR};
use crate::domain::payment::{
    DestinationKind, Fresh, MemoType, PaymentDraft, PaymentValue, SourceKind,
};
use crate::domain::ports::{PAYMENT_CARD, SecondFactorPromptBox, StateStoreBox, WalletApiBox};
use crate::domain::remote::Remote;
use crate::domain::swap::{ExchangeAccount, lock_days};
use crate::error::{BAD_2FA, FlowError, Result, error_handler};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

const LOG_TARGET: &str = "walletflow::send";

/// Flows behind the send screens: building and publishing payments, fetching
/// custodial destinations, and the withdrawal-lock alert.
pub struct SendFlows {
    api: WalletApiBox,
    store: StateStoreBox,
    prompt: SecondFactorPromptBox,
    resolver: PaymentResolver,
    config: FlowConfig,
}

impl SendFlows {
    pub fn new(
        api: WalletApiBox,
        store: StateStoreBox,
        prompt: SecondFactorPromptBox,
        resolver: PaymentResolver,
        config: FlowConfig,
    ) -> Self {
        Self {
            api,
            store,
            prompt,
            resolver,
            config,
        }
    }

    /// Addresses, builds, signs and publishes `payment`, returning the
    /// published value.
    ///
    /// For memo-bearing coins `destination` is `ADDRESS:MEMO`. The second
    /// password is requested after the build and before signing. Failures are
    /// returned as-is; a failed publish after a successful sign is not undone.
    pub async fn build_and_publish_payment(
        &self,
        coin: Coin,
        payment: PaymentDraft<Fresh>,
        destination: &str,
    ) -> Result<PaymentValue> {
        let payment = if coin.has_memo() {
            let mut parts = destination.split(':');
            let address = parts.next().unwrap_or_default();
            let memo = parts
                .next()
                .ok_or_else(|| FlowError::validation("destination is missing a memo"))?;
            payment
                .to(address, DestinationKind::Custodial)
                .await?
                .memo(memo)
                .await?
                .memo_type(MemoType::Text)
                .await?
                .set_destination_account_exists(true)
                .await?
        } else {
            payment.to(destination, DestinationKind::Custodial).await?
        };

        let payment = payment.build().await?;
        let secret = self.prompt.prompt().await?;
        let payment = payment.sign(secret.as_ref()).await?;
        let payment = payment.publish().await?;

        info!(
            target: LOG_TARGET,
            %coin,
            tx_id = payment.value().tx_id.as_deref().unwrap_or_default(),
            "payment published"
        );
        Ok(payment.into_value())
    }

    pub async fn fetch_payments_trading_account(&self, coin: Coin) -> Result<()> {
        self.store
            .dispatch(Event::FetchPaymentsTradingAccountLoading { coin })
            .await?;
        match self.api.get_sb_payment_account(coin).await {
            Ok(account) => {
                self.store
                    .dispatch(Event::FetchPaymentsTradingAccountSuccess { coin, account })
                    .await
            }
            Err(err) => {
                let err = FlowError::from(err);
                error!(
                    target: LOG_TARGET,
                    flow = "fetch_payments_trading_account",
                    %coin,
                    error = %err,
                    "failed to fetch trading account"
                );
                self.store
                    .dispatch(Event::FetchPaymentsTradingAccountFailure {
                        coin,
                        error: error_handler(&err),
                    })
                    .await
            }
        }
    }

    pub async fn fetch_payments_account_exchange(&self, coin: Coin) -> Result<()> {
        let err = match self.try_fetch_payments_account_exchange(coin).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        error!(
            target: LOG_TARGET,
            flow = "fetch_payments_account_exchange",
            %coin,
            error = %err,
            "failed to fetch exchange account"
        );

        let masked = self.config.mask_bad_2fa && err.api().is_some_and(|api| api.is_bad_2fa());
        let event = if masked {
            Event::FetchPaymentsAccountExchangeSuccess {
                coin,
                account: ExchangeAccount {
                    address: BAD_2FA.to_string(),
                },
            }
        } else {
            Event::FetchPaymentsAccountExchangeFailure {
                coin,
                error: error_handler(&err),
            }
        };
        self.store.dispatch(event).await
    }

    async fn try_fetch_payments_account_exchange(&self, coin: Coin) -> Result<()> {
        self.fetch_payments_trading_account(coin).await?;
        self.wait_for_user_data().await?;

        let linked = self
            .store
            .state()
            .await?
            .profile
            .exchange_account_linked
            .get_or_else(false);
        if !linked {
            return Err(FlowError::ExchangeNotLinked);
        }

        self.store
            .dispatch(Event::FetchPaymentsAccountExchangeLoading { coin })
            .await?;
        let account = self.api.get_payments_account_exchange(coin).await?;
        self.store
            .dispatch(Event::FetchPaymentsAccountExchangeSuccess { coin, account })
            .await
    }

    /// Resolves once the user's profile has been loaded.
    pub async fn wait_for_user_data(&self) -> Result<()> {
        let mut events = self.store.subscribe();
        if self.store.state().await?.profile.user_data_loaded {
            return Ok(());
        }
        loop {
            match events.recv().await {
                Ok(Event::ProfileLoaded { .. }) => return Ok(()),
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    if self.store.state().await?.profile.user_data_loaded {
                        return Ok(());
                    }
                }
                Err(RecvError::Closed) => return Err(FlowError::StoreClosed),
            }
        }
    }

    /// Tells the API about a self-custody payment into a custodial account.
    /// Payments missing a destination, amount or tx id, or sent from a
    /// custodial source, are ignored.
    pub async fn notify_non_custodial_to_custodial_transfer(
        &self,
        payment: &PaymentValue,
        product: &str,
    ) -> Result<()> {
        let (Some(to), Some(amount), Some(tx_id)) = (&payment.to, payment.amount, &payment.tx_id)
        else {
            return Ok(());
        };
        if payment
            .from
            .as_ref()
            .is_some_and(|from| from.kind == SourceKind::Custodial)
        {
            return Ok(());
        }

        self.api
            .notify_non_custodial_to_custodial_transfer(
                payment.coin,
                &to.address,
                tx_id,
                &amount.to_string(),
                product,
            )
            .await?;
        Ok(())
    }

    pub async fn get_withdrawal_lock_check(&self) -> Result<()> {
        self.store.dispatch(Event::GetLockRuleLoading).await?;
        match self.api.check_withdrawal_locks(PAYMENT_CARD).await {
            Ok(rule) => self.store.dispatch(Event::GetLockRuleSuccess { rule }).await,
            Err(err) => {
                let err = FlowError::from(err);
                error!(
                    target: LOG_TARGET,
                    flow = "get_withdrawal_lock_check",
                    error = %err,
                    "failed to check withdrawal locks"
                );
                self.store
                    .dispatch(Event::GetLockRuleFailure {
                        error: error_handler(&err),
                    })
                    .await
            }
        }
    }

    /// Alerts the user how many days a card deposit locks withdrawals. Never
    /// fails: problems are logged and the alert is skipped.
    pub async fn show_withdrawal_lock_alert(&self) {
        if let Err(err) = self.try_show_withdrawal_lock_alert().await {
            warn!(
                target: LOG_TARGET,
                flow = "show_withdrawal_lock_alert",
                error = %err,
                "withdrawal lock alert skipped"
            );
        }
    }

    async fn try_show_withdrawal_lock_alert(&self) -> Result<()> {
        self.get_withdrawal_lock_check().await?;
        let state = self.store.state().await?;
        let rule = state.send.withdraw_lock_check.as_option();
        let days = lock_days(rule, self.config.withdraw_lock_default_days);
        self.store
            .dispatch(Event::DisplayAlert(Alert {
                message: LOCKED_WITHDRAW_ERROR.to_string(),
                days: Some(days),
            }))
            .await
    }

    /// Fresh draft for `coin`, seeded from the payment currently in progress.
    pub fn payment_get_or_else(&self, coin: Coin, payment: &Remote<PaymentValue>) -> Resolution {
        self.resolver.resolve(coin, payment)
    }
}

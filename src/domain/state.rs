use super::coin::Coin;
use super::event::{Alert, Event, FormChange, FormName, Modal};
use super::lockbox::LockboxAction;
use super::payment::PaymentValue;
use super::remote::Remote;
use super::swap::{
    Beneficiary, ExchangeAccount, LockRule, RatedQuote, SwapAccount, SwapLimits, SwapOrder,
    SwapSide, SwapStep,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SendState {
    pub exchange_accounts: BTreeMap<Coin, Remote<ExchangeAccount>>,
    pub trading_accounts: BTreeMap<Coin, Remote<Beneficiary>>,
    pub withdraw_lock_check: Remote<LockRule>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SwapState {
    pub step: SwapStep,
    pub quote: Remote<RatedQuote>,
    pub limits: Remote<SwapLimits>,
    pub payment: Remote<PaymentValue>,
    pub order: Option<SwapOrder>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InitSwapForm {
    pub base: Option<SwapAccount>,
    pub counter: Option<SwapAccount>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SwapAmountForm {
    /// Amount in standard units of the base coin.
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmitState {
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FormState {
    pub init_swap: InitSwapForm,
    pub swap_amount: SwapAmountForm,
    pub submits: BTreeMap<String, SubmitState>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileState {
    pub user_data_loaded: bool,
    pub exchange_account_linked: Remote<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsState {
    pub currency: Remote<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LockboxState {
    pub last_action: Option<LockboxAction>,
    pub pending: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeState {
    /// Events the runtime skipped because it lagged behind the store.
    pub dropped_events: u64,
}

/// Snapshot of everything the flows read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub send: SendState,
    pub swap: SwapState,
    pub forms: FormState,
    pub profile: ProfileState,
    pub settings: SettingsState,
    pub lockbox: LockboxState,
    pub alerts: Vec<Alert>,
    pub modals: Vec<Modal>,
    pub runtime: RuntimeState,
}

fn form_key(form: FormName) -> String {
    match form {
        FormName::InitSwap => "initSwap",
        FormName::SwapAmount => "swapAmount",
        FormName::PreviewSwap => "previewSwap",
    }
    .to_string()
}

impl AppState {
    /// Reduces one event into the state. Intents leave the state untouched.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::FetchPaymentsAccountExchangeLoading { coin } => {
                self.send.exchange_accounts.insert(*coin, Remote::Loading);
            }
            Event::FetchPaymentsAccountExchangeSuccess { coin, account } => {
                self.send
                    .exchange_accounts
                    .insert(*coin, Remote::Success(account.clone()));
            }
            Event::FetchPaymentsAccountExchangeFailure { coin, error } => {
                self.send
                    .exchange_accounts
                    .insert(*coin, Remote::Failure(error.clone()));
            }
            Event::FetchPaymentsTradingAccountLoading { coin } => {
                self.send.trading_accounts.insert(*coin, Remote::Loading);
            }
            Event::FetchPaymentsTradingAccountSuccess { coin, account } => {
                self.send
                    .trading_accounts
                    .insert(*coin, Remote::Success(account.clone()));
            }
            Event::FetchPaymentsTradingAccountFailure { coin, error } => {
                self.send
                    .trading_accounts
                    .insert(*coin, Remote::Failure(error.clone()));
            }
            Event::GetLockRuleLoading => self.send.withdraw_lock_check = Remote::Loading,
            Event::GetLockRuleSuccess { rule } => {
                self.send.withdraw_lock_check = Remote::Success(rule.clone())
            }
            Event::GetLockRuleFailure { error } => {
                self.send.withdraw_lock_check = Remote::Failure(error.clone())
            }
            Event::DisplayAlert(alert) => self.alerts.push(alert.clone()),

            Event::SetStep { step } => self.swap.step = *step,
            Event::FetchQuoteLoading => self.swap.quote = Remote::Loading,
            Event::FetchQuoteSuccess { quote, rate } => {
                self.swap.quote = Remote::Success(RatedQuote {
                    quote: quote.clone(),
                    rate: *rate,
                })
            }
            Event::FetchQuoteFailure { error } => self.swap.quote = Remote::Failure(error.clone()),
            Event::FetchLimitsLoading => self.swap.limits = Remote::Loading,
            Event::FetchLimitsSuccess { limits } => {
                self.swap.limits = Remote::Success(limits.clone())
            }
            Event::FetchLimitsFailure { error } => {
                self.swap.limits = Remote::Failure(error.clone())
            }
            Event::UpdatePaymentLoading => self.swap.payment = Remote::Loading,
            Event::UpdatePaymentSuccess { payment } => {
                self.swap.payment = Remote::Success(payment.clone())
            }
            Event::UpdatePaymentFailure { error } => {
                self.swap.payment = Remote::Failure(error.clone())
            }
            Event::OrderCreated { order } => self.swap.order = Some(order.clone()),
            Event::ModalOpened(modal) => self.modals.push(modal.clone()),

            Event::FormChange(FormChange::InitSwapSide { side, account }) => {
                let slot = match side {
                    SwapSide::Base => &mut self.forms.init_swap.base,
                    SwapSide::Counter => &mut self.forms.init_swap.counter,
                };
                *slot = Some(account.clone());
            }
            Event::FormChange(FormChange::SwapAmount { amount }) => {
                self.forms.swap_amount.amount = Some(*amount);
            }
            Event::FormStartSubmit { form } => {
                self.forms.submits.insert(
                    form_key(*form),
                    SubmitState {
                        submitting: true,
                        error: None,
                    },
                );
            }
            Event::FormStopSubmit { form, error } => {
                self.forms.submits.insert(
                    form_key(*form),
                    SubmitState {
                        submitting: false,
                        error: error.clone(),
                    },
                );
            }

            Event::ProfileLoaded { exchange_linked } => {
                self.profile.user_data_loaded = true;
                self.profile.exchange_account_linked = Remote::Success(*exchange_linked);
            }
            Event::CurrencyLoaded { currency } => {
                self.settings.currency = Remote::Success(currency.clone())
            }

            Event::Lockbox { action } => {
                self.lockbox.last_action = Some(*action);
                self.lockbox.pending = action.as_str().ends_with("_LOADING");
            }

            Event::EventsDropped { missed } => {
                self.runtime.dropped_events = self.runtime.dropped_events.saturating_add(*missed)
            }

            Event::FetchPaymentsAccountExchange { .. }
            | Event::FetchPaymentsTradingAccount { .. }
            | Event::ShowWithdrawalLockAlert
            | Event::NotifyNonCustodialToCustodialTransfer { .. }
            | Event::ChangePair { .. }
            | Event::CreateOrder
            | Event::FetchLimits
            | Event::StartPollQuote
            | Event::StopPollQuote
            | Event::ShowModal { .. } => {}
        }
    }

    pub fn submit_state(&self, form: FormName) -> Option<&SubmitState> {
        self.forms.submits.get(&form_key(form))
    }
}

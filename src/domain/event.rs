use super::coin::Coin;
use super::lockbox::LockboxAction;
use super::payment::PaymentValue;
use super::swap::{
    Beneficiary, ExchangeAccount, LockRule, RatedQuote, SwapAccount, SwapLimits, SwapOrder,
    SwapQuote, SwapSide, SwapStep,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const LOCKED_WITHDRAW_ERROR: &str = "LOCKED_WITHDRAW_ERROR";
pub const SWAP_MODAL: &str = "SWAP_MODAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormName {
    InitSwap,
    SwapAmount,
    PreviewSwap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FormChange {
    InitSwapSide { side: SwapSide, account: SwapAccount },
    SwapAmount { amount: Decimal },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub message: String,
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modal {
    pub name: String,
    pub origin: String,
    pub base: Option<Coin>,
    pub counter: Option<Coin>,
}

/// Everything that flows through the state store: intents dispatched by the
/// host, and the state updates flows emit in response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    // send intents
    FetchPaymentsAccountExchange { coin: Coin },
    FetchPaymentsTradingAccount { coin: Coin },
    ShowWithdrawalLockAlert,
    NotifyNonCustodialToCustodialTransfer { payment: PaymentValue, product: String },

    // send updates
    FetchPaymentsAccountExchangeLoading { coin: Coin },
    FetchPaymentsAccountExchangeSuccess { coin: Coin, account: ExchangeAccount },
    FetchPaymentsAccountExchangeFailure { coin: Coin, error: String },
    FetchPaymentsTradingAccountLoading { coin: Coin },
    FetchPaymentsTradingAccountSuccess { coin: Coin, account: Beneficiary },
    FetchPaymentsTradingAccountFailure { coin: Coin, error: String },
    GetLockRuleLoading,
    GetLockRuleSuccess { rule: LockRule },
    GetLockRuleFailure { error: String },
    DisplayAlert(Alert),

    // swap intents
    ChangePair { side: SwapSide, account: SwapAccount },
    CreateOrder,
    FetchLimits,
    StartPollQuote,
    StopPollQuote,
    ShowModal { origin: String, base: Option<Coin>, counter: Option<Coin> },

    // swap updates
    SetStep { step: SwapStep },
    FetchQuoteLoading,
    FetchQuoteSuccess { quote: SwapQuote, rate: Decimal },
    FetchQuoteFailure { error: String },
    FetchLimitsLoading,
    FetchLimitsSuccess { limits: SwapLimits },
    FetchLimitsFailure { error: String },
    UpdatePaymentLoading,
    UpdatePaymentSuccess { payment: PaymentValue },
    UpdatePaymentFailure { error: String },
    OrderCreated { order: SwapOrder },
    ModalOpened(Modal),

    // forms
    FormChange(FormChange),
    FormStartSubmit { form: FormName },
    FormStopSubmit { form: FormName, error: Option<String> },

    // profile and settings
    ProfileLoaded { exchange_linked: bool },
    CurrencyLoaded { currency: String },

    Lockbox { action: LockboxAction },

    /// Emitted by the runtime when it fell behind the event stream and
    /// `missed` events were skipped without being routed.
    EventsDropped { missed: u64 },
}

impl Event {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::FetchPaymentsAccountExchange { .. } => "FETCH_PAYMENTS_ACCOUNT_EXCHANGE",
            Event::FetchPaymentsTradingAccount { .. } => "FETCH_PAYMENTS_TRADING_ACCOUNT",
            Event::ShowWithdrawalLockAlert => "SHOW_WITHDRAWAL_LOCK_ALERT",
            Event::NotifyNonCustodialToCustodialTransfer { .. } => {
                "NOTIFY_NON_CUSTODIAL_TO_CUSTODIAL_TRANSFER"
            }
            Event::FetchPaymentsAccountExchangeLoading { .. } => {
                "FETCH_PAYMENTS_ACCOUNT_EXCHANGE_LOADING"
            }
            Event::FetchPaymentsAccountExchangeSuccess { .. } => {
                "FETCH_PAYMENTS_ACCOUNT_EXCHANGE_SUCCESS"
            }
            Event::FetchPaymentsAccountExchangeFailure { .. } => {
                "FETCH_PAYMENTS_ACCOUNT_EXCHANGE_FAILURE"
            }
            Event::FetchPaymentsTradingAccountLoading { .. } => {
                "FETCH_PAYMENTS_TRADING_ACCOUNT_LOADING"
            }
            Event::FetchPaymentsTradingAccountSuccess { .. } => {
                "FETCH_PAYMENTS_TRADING_ACCOUNT_SUCCESS"
            }
            Event::FetchPaymentsTradingAccountFailure { .. } => {
                "FETCH_PAYMENTS_TRADING_ACCOUNT_FAILURE"
            }
            Event::GetLockRuleLoading => "GET_LOCK_RULE_LOADING",
            Event::GetLockRuleSuccess { .. } => "GET_LOCK_RULE_SUCCESS",
            Event::GetLockRuleFailure { .. } => "GET_LOCK_RULE_FAILURE",
            Event::DisplayAlert(_) => "DISPLAY_ALERT",
            Event::ChangePair { .. } => "CHANGE_PAIR",
            Event::CreateOrder => "CREATE_ORDER",
            Event::FetchLimits => "FETCH_LIMITS",
            Event::StartPollQuote => "START_POLL_QUOTE",
            Event::StopPollQuote => "STOP_POLL_QUOTE",
            Event::ShowModal { .. } => "SHOW_MODAL",
            Event::SetStep { .. } => "SET_STEP",
            Event::FetchQuoteLoading => "FETCH_QUOTE_LOADING",
            Event::FetchQuoteSuccess { .. } => "FETCH_QUOTE_SUCCESS",
            Event::FetchQuoteFailure { .. } => "FETCH_QUOTE_FAILURE",
            Event::FetchLimitsLoading => "FETCH_LIMITS_LOADING",
            Event::FetchLimitsSuccess { .. } => "FETCH_LIMITS_SUCCESS",
            Event::FetchLimitsFailure { .. } => "FETCH_LIMITS_FAILURE",
            Event::UpdatePaymentLoading => "UPDATE_PAYMENT_LOADING",
            Event::UpdatePaymentSuccess { .. } => "UPDATE_PAYMENT_SUCCESS",
            Event::UpdatePaymentFailure { .. } => "UPDATE_PAYMENT_FAILURE",
            Event::OrderCreated { .. } => "ORDER_CREATED",
            Event::ModalOpened(_) => "MODAL_OPENED",
            Event::FormChange(_) => "FORM_CHANGE",
            Event::FormStartSubmit { .. } => "FORM_START_SUBMIT",
            Event::FormStopSubmit { .. } => "FORM_STOP_SUBMIT",
            Event::ProfileLoaded { .. } => "PROFILE_LOADED",
            Event::CurrencyLoaded { .. } => "CURRENCY_LOADED",
            Event::Lockbox { action } => action.as_str(),
            Event::EventsDropped { .. } => "EVENTS_DROPPED",
        }
    }
}

impl From<RatedQuote> for Event {
    fn from(rated: RatedQuote) -> Self {
        Event::FetchQuoteSuccess {
            quote: rated.quote,
            rate: rated.rate,
        }
    }
}

use crate::domain::coin::{BuilderFamily, Coin};
use crate::domain::payment::{
    AddressOrIndex, Destination, DestinationKind, FeeTier, MemoType, PaymentValue, SecondFactor,
    Source, SourceKind,
};
use crate::domain::ports::PaymentBuilder;
use crate::error::{FlowError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderStep {
    Init,
    Fee,
    From,
    Amount,
    To,
    Memo,
    MemoType,
    SetDestinationAccountExists,
    Build,
    Sign,
    Publish,
}

impl fmt::Display for BuilderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A call received by the simulated builder, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderCall {
    Init { is_erc20: bool, coin: Coin },
    Fee(FeeTier),
    From(AddressOrIndex, SourceKind),
    Amount(Decimal),
    To(String, DestinationKind),
    Memo(String),
    MemoType(MemoType),
    SetDestinationAccountExists(bool),
    Build,
    Sign { with_secret: bool },
    Publish,
}

impl BuilderCall {
    pub fn step(&self) -> BuilderStep {
        match self {
            BuilderCall::Init { .. } => BuilderStep::Init,
            BuilderCall::Fee(_) => BuilderStep::Fee,
            BuilderCall::From(..) => BuilderStep::From,
            BuilderCall::Amount(_) => BuilderStep::Amount,
            BuilderCall::To(..) => BuilderStep::To,
            BuilderCall::Memo(_) => BuilderStep::Memo,
            BuilderCall::MemoType(_) => BuilderStep::MemoType,
            BuilderCall::SetDestinationAccountExists(_) => BuilderStep::SetDestinationAccountExists,
            BuilderCall::Build => BuilderStep::Build,
            BuilderCall::Sign { .. } => BuilderStep::Sign,
            BuilderCall::Publish => BuilderStep::Publish,
        }
    }
}

/// Flat fee per tier, in base units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub regular: Decimal,
    pub priority: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            regular: dec!(1000),
            priority: dec!(2500),
        }
    }
}

impl FeeSchedule {
    fn for_tier(&self, tier: FeeTier) -> Decimal {
        match tier {
            FeeTier::Regular => self.regular,
            FeeTier::Priority => self.priority,
        }
    }
}

/// In-process payment builder for one coin family.
///
/// Applies every step to the payment value the way a chain builder would,
/// without touching a network, and records each call it receives. A step can
/// be made to fail with [`SimulatedPaymentBuilder::fail_on`].
pub struct SimulatedPaymentBuilder {
    family: BuilderFamily,
    balance: Decimal,
    fees: FeeSchedule,
    fail_on: Option<BuilderStep>,
    calls: Mutex<Vec<BuilderCall>>,
}

impl SimulatedPaymentBuilder {
    pub fn new(family: BuilderFamily) -> Self {
        Self {
            family,
            balance: Decimal::ZERO,
            fees: FeeSchedule::default(),
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Spendable balance of any source account, in base units.
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub fn fail_on(mut self, step: BuilderStep) -> Self {
        self.fail_on = Some(step);
        self
    }

    pub fn family(&self) -> BuilderFamily {
        self.family
    }

    pub async fn calls(&self) -> Vec<BuilderCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: BuilderCall) -> Result<()> {
        let step = call.step();
        debug!(target: "walletflow::builder", family = ?self.family, %step, "builder call");
        self.calls.lock().await.push(call);
        if self.fail_on == Some(step) {
            return Err(FlowError::payment(format!("simulated failure at {step}")));
        }
        Ok(())
    }

    fn refresh_balance(&self, payment: &mut PaymentValue) {
        if payment.from.is_some() {
            let fee = payment.fee.unwrap_or_default();
            payment.effective_balance = (self.balance - fee).max(Decimal::ZERO);
        }
    }

    fn destination_mut<'a>(
        &self,
        payment: &'a mut PaymentValue,
        step: BuilderStep,
    ) -> Result<&'a mut Destination> {
        if self.family != BuilderFamily::Xlm {
            return Err(FlowError::payment(format!(
                "{step} is not supported by {:?} payments",
                self.family
            )));
        }
        payment
            .to
            .as_mut()
            .ok_or_else(|| FlowError::payment(format!("{step} requires a destination")))
    }
}

#[async_trait]
impl PaymentBuilder for SimulatedPaymentBuilder {
    async fn init(
        &self,
        mut payment: PaymentValue,
        is_erc20: bool,
        coin: Coin,
    ) -> Result<PaymentValue> {
        self.record(BuilderCall::Init { is_erc20, coin }).await?;
        payment.coin = coin;
        payment.is_erc20 = is_erc20;
        Ok(payment)
    }

    async fn fee(&self, mut payment: PaymentValue, tier: FeeTier) -> Result<PaymentValue> {
        self.record(BuilderCall::Fee(tier)).await?;
        payment.fee_tier = Some(tier);
        payment.fee = Some(self.fees.for_tier(tier));
        self.refresh_balance(&mut payment);
        Ok(payment)
    }

    async fn from(
        &self,
        mut payment: PaymentValue,
        address: AddressOrIndex,
        kind: SourceKind,
    ) -> Result<PaymentValue> {
        self.record(BuilderCall::From(address.clone(), kind)).await?;
        payment.from = Some(Source { address, kind });
        self.refresh_balance(&mut payment);
        Ok(payment)
    }

    async fn amount(&self, mut payment: PaymentValue, amount: Decimal) -> Result<PaymentValue> {
        self.record(BuilderCall::Amount(amount)).await?;
        if amount.is_sign_negative() {
            return Err(FlowError::payment("amount must not be negative"));
        }
        payment.amount = Some(amount);
        Ok(payment)
    }

    async fn to(
        &self,
        mut payment: PaymentValue,
        address: &str,
        kind: DestinationKind,
    ) -> Result<PaymentValue> {
        self.record(BuilderCall::To(address.to_string(), kind)).await?;
        if address.is_empty() {
            return Err(FlowError::payment("destination address is empty"));
        }
        payment.to = Some(Destination {
            address: address.to_string(),
            kind,
            memo: None,
            memo_type: None,
            account_exists: false,
        });
        Ok(payment)
    }

    async fn memo(&self, mut payment: PaymentValue, memo: &str) -> Result<PaymentValue> {
        self.record(BuilderCall::Memo(memo.to_string())).await?;
        self.destination_mut(&mut payment, BuilderStep::Memo)?.memo = Some(memo.to_string());
        Ok(payment)
    }

    async fn memo_type(&self, mut payment: PaymentValue, memo_type: MemoType) -> Result<PaymentValue> {
        self.record(BuilderCall::MemoType(memo_type)).await?;
        self.destination_mut(&mut payment, BuilderStep::MemoType)?
            .memo_type = Some(memo_type);
        Ok(payment)
    }

    async fn set_destination_account_exists(
        &self,
        mut payment: PaymentValue,
        exists: bool,
    ) -> Result<PaymentValue> {
        self.record(BuilderCall::SetDestinationAccountExists(exists))
            .await?;
        self.destination_mut(&mut payment, BuilderStep::SetDestinationAccountExists)?
            .account_exists = exists;
        Ok(payment)
    }

    async fn build(&self, mut payment: PaymentValue) -> Result<PaymentValue> {
        self.record(BuilderCall::Build).await?;
        if payment.to.is_none() {
            return Err(FlowError::payment("cannot build a payment without destination"));
        }
        let tier = payment.fee_tier.unwrap_or_default();
        let fee = *payment.fee.get_or_insert(self.fees.for_tier(tier));
        payment.fee_tier = Some(tier);
        if let Some(amount) = payment.amount
            && payment.from.is_some()
            && amount + fee > self.balance
        {
            return Err(FlowError::payment("insufficient funds"));
        }
        payment.built = true;
        Ok(payment)
    }

    async fn sign(
        &self,
        mut payment: PaymentValue,
        secret: Option<&SecondFactor>,
    ) -> Result<PaymentValue> {
        self.record(BuilderCall::Sign {
            with_secret: secret.is_some(),
        })
        .await?;
        if !payment.built {
            return Err(FlowError::payment("cannot sign an unbuilt payment"));
        }
        if secret.is_some_and(|s| s.expose().is_empty()) {
            return Err(FlowError::payment("second password is empty"));
        }
        payment.signed = true;
        Ok(payment)
    }

    async fn publish(&self, mut payment: PaymentValue) -> Result<PaymentValue> {
        self.record(BuilderCall::Publish).await?;
        if !payment.signed {
            return Err(FlowError::payment("cannot publish an unsigned payment"));
        }
        payment.published = true;
        let (high, low) = rand::random::<(u64, u64)>();
        payment.tx_id = Some(format!("{high:016x}{low:016x}"));
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fee_and_source_set_effective_balance() {
        let builder = SimulatedPaymentBuilder::new(BuilderFamily::Btc).with_balance(dec!(10000));
        let payment = PaymentValue::empty(Coin::Btc);
        let payment = builder.fee(payment, FeeTier::Regular).await.unwrap();
        let payment = builder
            .from(payment, AddressOrIndex::Index(0), SourceKind::Account)
            .await
            .unwrap();
        assert_eq!(payment.effective_balance, dec!(9000));
    }

    #[tokio::test]
    async fn test_memo_rejected_outside_xlm() {
        let builder = SimulatedPaymentBuilder::new(BuilderFamily::Eth);
        let payment = builder
            .to(PaymentValue::empty(Coin::Eth), "0xabc", DestinationKind::Custodial)
            .await
            .unwrap();
        assert!(matches!(
            builder.memo(payment, "1").await,
            Err(FlowError::Payment(_))
        ));
    }

    #[tokio::test]
    async fn test_build_checks_funds() {
        let builder = SimulatedPaymentBuilder::new(BuilderFamily::Btc).with_balance(dec!(1000));
        let payment = builder
            .from(PaymentValue::empty(Coin::Btc), AddressOrIndex::Index(0), SourceKind::Account)
            .await
            .unwrap();
        let payment = builder.amount(payment, dec!(900)).await.unwrap();
        let payment = builder
            .to(payment, "1dest", DestinationKind::Address)
            .await
            .unwrap();
        assert!(matches!(builder.build(payment).await, Err(FlowError::Payment(_))));
    }

    #[tokio::test]
    async fn test_fail_on_records_then_fails() {
        let builder = SimulatedPaymentBuilder::new(BuilderFamily::Xlm).fail_on(BuilderStep::Fee);
        let result = builder.fee(PaymentValue::empty(Coin::Xlm), FeeTier::Priority).await;
        assert!(result.is_err());
        assert_eq!(builder.calls().await, vec![BuilderCall::Fee(FeeTier::Priority)]);
    }
}

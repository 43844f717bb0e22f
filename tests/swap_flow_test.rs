mod common;

use common::{Builders, Harness, MockApi, account, quote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use walletflow::domain::coin::{BuilderFamily, Coin};
use walletflow::domain::event::{Event, FormChange, FormName, SWAP_MODAL};
use walletflow::domain::payment::{DestinationKind, FeeTier, PaymentValue, SourceKind};
use walletflow::domain::ports::StateStore;
use walletflow::domain::remote::Remote;
use walletflow::domain::swap::{SwapAccount, SwapDirection, SwapSide, SwapStep};
use walletflow::error::{
    ApiError, NO_INIT_SWAP_FORM_VALUES, NO_SWAP_AMOUNT_FORM_VALUES, NO_SWAP_QUOTE,
};
use walletflow::infrastructure::simulated::{BuilderCall, BuilderStep, SimulatedPaymentBuilder};

async fn dispatch(harness: &Harness, event: Event) {
    harness.store.dispatch(event).await.unwrap();
}

async fn select(harness: &Harness, base: SwapAccount, counter: SwapAccount) {
    for (side, account) in [(SwapSide::Base, base), (SwapSide::Counter, counter)] {
        dispatch(
            harness,
            Event::FormChange(FormChange::InitSwapSide { side, account }),
        )
        .await;
    }
}

async fn publish_quote(harness: &Harness) {
    dispatch(
        harness,
        Event::FetchQuoteSuccess {
            quote: quote(),
            rate: dec!(31),
        },
    )
    .await;
}

async fn preview_error(harness: &Harness) -> Option<String> {
    let state = harness.store.state().await.unwrap();
    let submit = state.submit_state(FormName::PreviewSwap).unwrap();
    assert!(!submit.submitting);
    submit.error.clone()
}

#[tokio::test]
async fn test_create_order_requires_pair() {
    let harness = Harness::new(MockApi::default());

    harness.swap_flows().create_order().await.unwrap();

    assert_eq!(
        preview_error(&harness).await.as_deref(),
        Some(NO_INIT_SWAP_FORM_VALUES)
    );
    assert_eq!(
        harness.history().await[0],
        Event::FormStartSubmit {
            form: FormName::PreviewSwap
        }
    );
    assert_eq!(harness.api.count("create_swap_order"), 0);
}

#[tokio::test]
async fn test_create_order_rejects_zero_amount() {
    let harness = Harness::new(MockApi::default());
    select(
        &harness,
        account(Coin::Btc, SourceKind::Account),
        account(Coin::Eth, SourceKind::Account),
    )
    .await;
    dispatch(
        &harness,
        Event::FormChange(FormChange::SwapAmount {
            amount: Decimal::ZERO,
        }),
    )
    .await;

    harness.swap_flows().create_order().await.unwrap();

    assert_eq!(
        preview_error(&harness).await.as_deref(),
        Some(NO_SWAP_AMOUNT_FORM_VALUES)
    );
}

#[tokio::test]
async fn test_create_order_requires_quote() {
    let harness = Harness::new(MockApi::default());
    select(
        &harness,
        account(Coin::Btc, SourceKind::Account),
        account(Coin::Eth, SourceKind::Account),
    )
    .await;
    dispatch(
        &harness,
        Event::FormChange(FormChange::SwapAmount { amount: dec!(0.5) }),
    )
    .await;

    harness.swap_flows().create_order().await.unwrap();

    assert_eq!(
        preview_error(&harness).await.as_deref(),
        Some(NO_SWAP_QUOTE)
    );
    assert_eq!(harness.api.count("create_swap_order"), 0);
}

#[tokio::test]
async fn test_create_order_sends_base_units_and_direction() {
    let harness = Harness::new(MockApi::default());
    select(
        &harness,
        account(Coin::Btc, SourceKind::Account),
        account(Coin::Eth, SourceKind::Custodial),
    )
    .await;
    dispatch(
        &harness,
        Event::FormChange(FormChange::SwapAmount { amount: dec!(0.5) }),
    )
    .await;
    publish_quote(&harness).await;

    harness.swap_flows().create_order().await.unwrap();

    assert_eq!(preview_error(&harness).await, None);
    assert_eq!(
        harness.api.orders(),
        vec![(
            SwapDirection::FromUserkey,
            "quote-1".to_string(),
            dec!(50000000)
        )]
    );
    let state = harness.store.state().await.unwrap();
    assert_eq!(state.swap.order.map(|order| order.id).as_deref(), Some("order-1"));
}

#[tokio::test]
async fn test_create_order_api_failure_lands_in_form() {
    let harness = Harness::new(MockApi {
        order: Err(ApiError::new("ORDER_REJECTED", "below minimum")),
        ..MockApi::default()
    });
    select(
        &harness,
        account(Coin::Eth, SourceKind::Custodial),
        account(Coin::Btc, SourceKind::Custodial),
    )
    .await;
    dispatch(
        &harness,
        Event::FormChange(FormChange::SwapAmount { amount: dec!(1) }),
    )
    .await;
    publish_quote(&harness).await;

    harness.swap_flows().create_order().await.unwrap();

    assert_eq!(
        preview_error(&harness).await.as_deref(),
        Some("below minimum")
    );
    assert!(harness.store.state().await.unwrap().swap.order.is_none());
}

#[tokio::test]
async fn test_create_order_amount_out_of_range_lands_in_form() {
    let harness = Harness::new(MockApi::default());
    select(
        &harness,
        account(Coin::Eth, SourceKind::Account),
        account(Coin::Btc, SourceKind::Account),
    )
    .await;
    dispatch(
        &harness,
        Event::FormChange(FormChange::SwapAmount {
            amount: dec!(100000000000),
        }),
    )
    .await;
    publish_quote(&harness).await;

    harness.swap_flows().create_order().await.unwrap();

    let error = preview_error(&harness).await.unwrap();
    assert!(error.contains("out of range"), "{error}");
    assert_eq!(harness.api.count("create_swap_order"), 0);
}

#[tokio::test]
async fn test_provisional_payment_builds_against_sample_deposit_address() {
    let harness = Harness::new(MockApi::default());

    let payment = harness
        .swap_flows()
        .calculate_provisional_payment(
            &account(Coin::Btc, SourceKind::Account),
            &quote(),
            dec!(0.5),
            Some(FeeTier::Regular),
        )
        .await;

    assert!(payment.built);
    assert_eq!(payment.effective_balance, dec!(999999000));
    assert_eq!(
        payment.to.map(|to| (to.address, to.kind)),
        Some(("bc1qsampledeposit".to_string(), DestinationKind::Address))
    );
    let calls = harness.builders.btc.calls().await;
    assert_eq!(calls[0], BuilderCall::Init {
        is_erc20: false,
        coin: Coin::Btc
    });
    assert!(calls.contains(&BuilderCall::Amount(dec!(50000000))));
    assert_eq!(calls.last(), Some(&BuilderCall::Build));
}

#[tokio::test]
async fn test_provisional_payment_stops_at_amount_for_account_coins() {
    let harness = Harness::new(MockApi::default());

    let payment = harness
        .swap_flows()
        .calculate_provisional_payment(
            &account(Coin::Pax, SourceKind::Account),
            &quote(),
            dec!(2),
            None,
        )
        .await;

    assert!(payment.is_erc20);
    assert!(!payment.built);
    assert_eq!(payment.fee_tier, Some(FeeTier::Priority));
    let steps: Vec<_> = harness
        .builders
        .eth
        .calls()
        .await
        .iter()
        .map(BuilderCall::step)
        .collect();
    assert_eq!(
        steps,
        vec![
            BuilderStep::Init,
            BuilderStep::Fee,
            BuilderStep::From,
            BuilderStep::Amount
        ]
    );
}

#[tokio::test]
async fn test_provisional_payment_degrades_on_builder_failure() {
    let mut builders = Builders::with_balance(dec!(100000));
    builders.btc = Arc::new(
        SimulatedPaymentBuilder::new(BuilderFamily::Btc)
            .with_balance(dec!(100000))
            .fail_on(BuilderStep::From),
    );
    let harness = Harness::with_builders(MockApi::default(), builders);

    let payment = harness
        .swap_flows()
        .calculate_provisional_payment(
            &account(Coin::Btc, SourceKind::Account),
            &quote(),
            dec!(0.1),
            None,
        )
        .await;

    assert_eq!(payment, PaymentValue::degraded(Coin::Btc));
    assert_eq!(payment.effective_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_provisional_payment_degrades_when_amount_out_of_range() {
    let harness = Harness::new(MockApi::default());

    let payment = harness
        .swap_flows()
        .calculate_provisional_payment(
            &account(Coin::Eth, SourceKind::Account),
            &quote(),
            dec!(100000000000),
            None,
        )
        .await;

    assert_eq!(payment, PaymentValue::degraded(Coin::Eth));
    assert!(
        !harness
            .builders
            .eth
            .calls()
            .await
            .iter()
            .any(|call| call.step() == BuilderStep::Amount)
    );
}

#[tokio::test]
async fn test_provisional_payment_degrades_without_builder() {
    let harness = Harness::new(MockApi::default());

    let payment = harness
        .swap_flows()
        .calculate_provisional_payment(
            &account(Coin::Algo, SourceKind::Account),
            &quote(),
            dec!(1),
            None,
        )
        .await;

    assert_eq!(payment, PaymentValue::degraded(Coin::Algo));
}

#[tokio::test]
async fn test_amount_form_prefilled_from_custodial_balance() {
    let harness = Harness::new(MockApi::default());
    let mut base = account(Coin::Btc, SourceKind::Custodial);
    base.balance = dec!(25000000);
    select(&harness, base, account(Coin::Eth, SourceKind::Account)).await;
    let flows = Arc::new(harness.swap_flows());

    let quotes = harness.store.subscribe();
    let task = {
        let flows = flows.clone();
        tokio::spawn(async move { flows.init_amount_form_with(quotes).await })
    };
    publish_quote(&harness).await;
    task.await.unwrap().unwrap();

    let state = harness.store.state().await.unwrap();
    assert_eq!(
        state.swap.payment,
        Remote::Success(PaymentValue::with_balance(Coin::Btc, dec!(25000000)))
    );
    assert_eq!(state.forms.swap_amount.amount, Some(dec!(0.25)));
    assert_eq!(harness.history().await.last(), Some(&Event::FetchLimits));
    assert!(harness.builders.btc.calls().await.is_empty());
}

#[tokio::test]
async fn test_amount_form_prefilled_from_provisional_payment() {
    let harness = Harness::new(MockApi::default());
    select(
        &harness,
        account(Coin::Btc, SourceKind::Account),
        account(Coin::Eth, SourceKind::Account),
    )
    .await;
    let flows = Arc::new(harness.swap_flows());

    let quotes = harness.store.subscribe();
    let task = {
        let flows = flows.clone();
        tokio::spawn(async move { flows.init_amount_form_with(quotes).await })
    };
    publish_quote(&harness).await;
    task.await.unwrap().unwrap();

    let state = harness.store.state().await.unwrap();
    assert_eq!(state.forms.swap_amount.amount, Some(dec!(9.999975)));
    assert!(state.swap.payment.is_success());
}

#[tokio::test]
async fn test_amount_form_without_base_returns_to_first_step() {
    let harness = Harness::new(MockApi::default());
    dispatch(
        &harness,
        Event::SetStep {
            step: SwapStep::EnterAmount,
        },
    )
    .await;
    let flows = Arc::new(harness.swap_flows());

    let quotes = harness.store.subscribe();
    let task = {
        let flows = flows.clone();
        tokio::spawn(async move { flows.init_amount_form_with(quotes).await })
    };
    publish_quote(&harness).await;
    task.await.unwrap().unwrap();

    let state = harness.store.state().await.unwrap();
    assert_eq!(state.swap.step, SwapStep::InitSwap);
    assert!(state.swap.payment.is_loading());
}

#[tokio::test]
async fn test_limits_use_user_currency_when_known() {
    let harness = Harness::new(MockApi::default());
    let flows = harness.swap_flows();

    flows.fetch_limits().await.unwrap();
    dispatch(
        &harness,
        Event::CurrencyLoaded {
            currency: "EUR".to_string(),
        },
    )
    .await;
    flows.fetch_limits().await.unwrap();

    assert_eq!(harness.api.limit_currencies(), vec!["USD", "EUR"]);
    assert!(harness.store.state().await.unwrap().swap.limits.is_success());
}

#[tokio::test]
async fn test_limits_failure_is_stored() {
    let harness = Harness::new(MockApi {
        limits: Err(ApiError::new("UNAVAILABLE", "")),
        ..MockApi::default()
    });

    harness.swap_flows().fetch_limits().await.unwrap();

    assert_eq!(
        harness.store.state().await.unwrap().swap.limits,
        Remote::Failure("UNAVAILABLE".to_string())
    );
}

#[tokio::test]
async fn test_change_pair_resets_step() {
    let harness = Harness::new(MockApi::default());
    dispatch(
        &harness,
        Event::SetStep {
            step: SwapStep::PreviewSwap,
        },
    )
    .await;

    harness
        .swap_flows()
        .change_pair(SwapSide::Counter, account(Coin::Xlm, SourceKind::Account))
        .await
        .unwrap();

    let state = harness.store.state().await.unwrap();
    assert_eq!(state.swap.step, SwapStep::InitSwap);
    assert_eq!(
        state.forms.init_swap.counter.map(|counter| counter.coin),
        Some(Coin::Xlm)
    );
}

#[tokio::test]
async fn test_show_modal_opens_swap_modal() {
    let harness = Harness::new(MockApi::default());

    harness
        .swap_flows()
        .show_modal("SendBtc".to_string(), Some(Coin::Btc), None)
        .await
        .unwrap();

    let modals = harness.store.state().await.unwrap().modals;
    assert_eq!(modals.len(), 1);
    assert_eq!(modals[0].name, SWAP_MODAL);
    assert_eq!(modals[0].base, Some(Coin::Btc));
}

use super::poller::QuotePoller;
use super::send::SendFlows;
use super::swap::SwapFlows;
use crate::domain::event::Event;
use crate::domain::ports::StateStoreBox;
use crate::domain::swap::SwapStep;
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const LOG_TARGET: &str = "walletflow::runtime";

/// Routes intent events from the store to the flow that handles them, each
/// flow running as its own task, and supervises the quote poller.
///
/// The poller and the amount-form task start when the user enters the amount
/// step and are aborted on `StopPollQuote`, on any other step, or when the
/// runtime is cancelled. `StartPollQuote` restarts the poller alone. At most
/// one amount-form task is alive at a time.
///
/// Intents are received over the store's broadcast channel. If the runtime
/// falls more than the channel capacity behind, the skipped events are lost.
/// Once it has caught up it dispatches `EventsDropped` with the number it
/// skipped, so the loss shows up in `AppState::runtime`.
pub struct FlowRuntime {
    store: StateStoreBox,
    send: Arc<SendFlows>,
    swap: Arc<SwapFlows>,
    poller: Arc<QuotePoller>,
    poll_task: Option<JoinHandle<()>>,
    amount_form_task: Option<JoinHandle<()>>,
}

impl FlowRuntime {
    pub fn new(
        store: StateStoreBox,
        send: Arc<SendFlows>,
        swap: Arc<SwapFlows>,
        poller: Arc<QuotePoller>,
    ) -> Self {
        Self {
            store,
            send,
            swap,
            poller,
            poll_task: None,
            amount_form_task: None,
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        let mut events = self.store.subscribe();
        let mut dropped = 0u64;
        info!(target: LOG_TARGET, "flow runtime started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = events.recv() => match received {
                    Ok(event) => self.route(event),
                    Err(RecvError::Lagged(missed)) => {
                        error!(target: LOG_TARGET, missed, "runtime fell behind the event stream, events dropped");
                        dropped = dropped.saturating_add(missed);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
            // Reporting into a full channel would overwrite the next unread event.
            if dropped > 0 && events.is_empty() {
                self.report_dropped(std::mem::take(&mut dropped)).await;
            }
        }
        self.stop_session();
        info!(target: LOG_TARGET, "flow runtime stopped");
    }

    fn route(&mut self, event: Event) {
        debug!(target: LOG_TARGET, event = event.name(), "route");
        match event {
            Event::FetchPaymentsAccountExchange { coin } => {
                let send = self.send.clone();
                spawn_flow("fetch_payments_account_exchange", async move {
                    send.fetch_payments_account_exchange(coin).await
                });
            }
            Event::FetchPaymentsTradingAccount { coin } => {
                let send = self.send.clone();
                spawn_flow("fetch_payments_trading_account", async move {
                    send.fetch_payments_trading_account(coin).await
                });
            }
            Event::ShowWithdrawalLockAlert => {
                let send = self.send.clone();
                spawn_flow("show_withdrawal_lock_alert", async move {
                    send.show_withdrawal_lock_alert().await;
                    Ok(())
                });
            }
            Event::NotifyNonCustodialToCustodialTransfer { payment, product } => {
                let send = self.send.clone();
                spawn_flow("notify_non_custodial_to_custodial_transfer", async move {
                    send.notify_non_custodial_to_custodial_transfer(&payment, &product)
                        .await
                });
            }
            Event::ChangePair { side, account } => {
                let swap = self.swap.clone();
                spawn_flow("change_pair", async move { swap.change_pair(side, account).await });
            }
            Event::CreateOrder => {
                let swap = self.swap.clone();
                spawn_flow("create_order", async move { swap.create_order().await });
            }
            Event::FetchLimits => {
                let swap = self.swap.clone();
                spawn_flow("fetch_limits", async move { swap.fetch_limits().await });
            }
            Event::ShowModal {
                origin,
                base,
                counter,
            } => {
                let swap = self.swap.clone();
                spawn_flow("show_modal", async move {
                    swap.show_modal(origin, base, counter).await
                });
            }
            Event::SetStep {
                step: SwapStep::EnterAmount,
            } => {
                self.stop_amount_form();
                // Subscribe before the poller can publish its first quote.
                let quotes = self.store.subscribe();
                let swap = self.swap.clone();
                self.amount_form_task = Some(spawn_flow("init_amount_form", async move {
                    swap.init_amount_form_with(quotes).await
                }));
                self.start_polling();
            }
            Event::SetStep { .. } | Event::StopPollQuote => self.stop_session(),
            Event::StartPollQuote => self.start_polling(),
            _ => {}
        }
    }

    fn start_polling(&mut self) {
        self.stop_polling();
        let poller = self.poller.clone();
        self.poll_task = Some(tokio::spawn(async move {
            match poller.run().await {
                Ok(exit) => debug!(target: LOG_TARGET, ?exit, "quote poller exited"),
                Err(err) => error!(target: LOG_TARGET, error = %err, "quote poller failed"),
            }
        }));
    }

    fn stop_polling(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }

    fn stop_amount_form(&mut self) {
        if let Some(task) = self.amount_form_task.take() {
            task.abort();
        }
    }

    fn stop_session(&mut self) {
        self.stop_polling();
        self.stop_amount_form();
    }

    async fn report_dropped(&self, missed: u64) {
        if let Err(err) = self.store.dispatch(Event::EventsDropped { missed }).await {
            warn!(target: LOG_TARGET, error = %err, "failed to report dropped events");
        }
    }
}

fn spawn_flow<F>(flow: &'static str, fut: F) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            error!(target: LOG_TARGET, flow, error = %err, "flow failed");
        }
    })
}

use crate::domain::event::Event;
use crate::domain::ports::{StateStoreBox, WalletApiBox};
use crate::domain::swap::{RatedQuote, SwapStep, direction, pair, rate};
use crate::error::{FlowError, Result, error_handler};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

const LOG_TARGET: &str = "walletflow::quote";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Stopped,
}

/// Result of a single poll attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Quoted(RatedQuote),
    /// Base or counter is not selected; the user was sent back to the first step.
    MissingPair,
}

/// Why [`QuotePoller::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Stopped,
    /// A poll failed; `StartPollQuote` was dispatched for the supervisor.
    RestartRequested,
}

/// Periodically fetches a swap quote for the pair selected in the init form.
///
/// One instance polls per swap session. The poller never restarts itself after
/// a failure: it waits one interval, dispatches `StartPollQuote` and returns,
/// leaving the restart to whoever supervises it.
pub struct QuotePoller {
    api: WalletApiBox,
    store: StateStoreBox,
    interval: Duration,
    state: watch::Sender<PollerState>,
}

impl QuotePoller {
    pub fn new(api: WalletApiBox, store: StateStoreBox, interval: Duration) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            api,
            store,
            interval,
            state,
        }
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: PollerState) {
        self.state.send_replace(state);
    }

    pub async fn run(&self) -> Result<PollExit> {
        self.set_state(PollerState::Polling);
        loop {
            match self.poll_once().await {
                Ok(PollOutcome::Quoted(_)) => tokio::time::sleep(self.interval).await,
                Ok(PollOutcome::MissingPair) => {
                    self.set_state(PollerState::Stopped);
                    return Ok(PollExit::Stopped);
                }
                Err(err) => {
                    warn!(target: LOG_TARGET, error = %err, "quote poll failed");
                    let dispatched = self.fail_and_request_restart(&err).await;
                    self.set_state(PollerState::Stopped);
                    dispatched?;
                    return Ok(PollExit::RestartRequested);
                }
            }
        }
    }

    async fn fail_and_request_restart(&self, err: &FlowError) -> Result<()> {
        self.store
            .dispatch(Event::FetchQuoteFailure {
                error: error_handler(err),
            })
            .await?;
        tokio::time::sleep(self.interval).await;
        self.store.dispatch(Event::StartPollQuote).await
    }

    /// One iteration of the polling loop, without the trailing delay.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        self.store.dispatch(Event::FetchQuoteLoading).await?;

        let form = self.store.state().await?.forms.init_swap;
        let (Some(base), Some(counter)) = (form.base, form.counter) else {
            self.store
                .dispatch(Event::SetStep {
                    step: SwapStep::InitSwap,
                })
                .await?;
            return Ok(PollOutcome::MissingPair);
        };

        let pair = pair(&base, &counter);
        let direction = direction(&base, &counter);
        let quote = self.api.get_swap_quote(&pair, direction).await?;
        let rated = RatedQuote {
            rate: rate(&quote.price_tiers, Decimal::ONE)?,
            quote,
        };
        debug!(target: LOG_TARGET, %pair, rate = %rated.rate, "quote received");

        self.store.dispatch(rated.clone().into()).await?;
        Ok(PollOutcome::Quoted(rated))
    }
}

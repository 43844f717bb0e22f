use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use walletflow::application::poller::{PollOutcome, QuotePoller};
use walletflow::application::resolver::{PaymentBuilders, PaymentResolver, Resolution};
use walletflow::application::send::SendFlows;
use walletflow::config::{FlowConfig, load_config};
use walletflow::domain::coin::{BuilderFamily, Coin, convert_standard_to_base};
use walletflow::domain::event::{Event, FormChange};
use walletflow::domain::payment::{AddressOrIndex, SourceKind};
use walletflow::domain::ports::{
    PaymentBuilderBox, SecondFactorPromptBox, StateStore, StateStoreBox, WalletApiBox,
};
use walletflow::domain::remote::Remote;
use walletflow::domain::swap::{LockRule, SwapAccount, SwapSide, lock_days};
use walletflow::infrastructure::in_memory::InMemoryStateStore;
use walletflow::infrastructure::prompt::StaticSecondFactor;
use walletflow::infrastructure::simulated::SimulatedPaymentBuilder;
use walletflow::interfaces::json::fixture_api::FixtureApi;
use walletflow::logging::init_tracing;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file. Defaults to walletflow.toml or config/walletflow.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a coin symbol to a fresh payment draft
    Resolve { coin: String },
    /// Normalize a withdrawal lock rule, given as JSON, to whole days
    LockDays { rule: Option<String> },
    /// Build, sign and publish a payment with the simulated builder
    Send {
        #[arg(long)]
        coin: Coin,
        /// Custodial destination; ADDRESS:MEMO for memo-bearing coins
        #[arg(long)]
        destination: String,
        /// Amount in standard units
        #[arg(long)]
        amount: Option<Decimal>,
        /// Spendable balance of the source, in standard units
        #[arg(long, default_value = "0")]
        balance: Decimal,
        #[arg(long)]
        second_password: Option<String>,
    },
    /// Fetch one swap quote from an API fixture
    Quote {
        #[arg(long)]
        fixture: PathBuf,
        #[arg(long)]
        base: Coin,
        #[arg(long)]
        counter: Coin,
        #[arg(long, value_enum, default_value_t = AccountKind::Account)]
        base_kind: AccountKind,
        #[arg(long, value_enum, default_value_t = AccountKind::Account)]
        counter_kind: AccountKind,
    },
    /// Show the withdrawal lock alert computed from an API fixture
    LockAlert {
        #[arg(long)]
        fixture: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AccountKind {
    Account,
    Custodial,
}

impl From<AccountKind> for SourceKind {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Account => SourceKind::Account,
            AccountKind::Custodial => SourceKind::Custodial,
        }
    }
}

/// Builders for every family, each holding `balance` base units.
fn simulated_builders(balance: Decimal) -> PaymentBuilders {
    let builder = |family| -> PaymentBuilderBox {
        Arc::new(SimulatedPaymentBuilder::new(family).with_balance(balance))
    };
    PaymentBuilders {
        btc: builder(BuilderFamily::Btc),
        bch: builder(BuilderFamily::Bch),
        eth: builder(BuilderFamily::Eth),
        xlm: builder(BuilderFamily::Xlm),
    }
}

fn swap_account(coin: Coin, kind: AccountKind) -> SwapAccount {
    SwapAccount {
        coin,
        label: format!("{coin} wallet"),
        address: AddressOrIndex::Index(0),
        kind: kind.into(),
        balance: Decimal::ZERO,
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config).into_diagnostic()?;
    init_tracing(&config.logging);

    match cli.command {
        Command::Resolve { coin } => resolve(&config, &coin),
        Command::LockDays { rule } => {
            let rule: Option<LockRule> = match rule.as_deref() {
                None | Some("") => None,
                Some(raw) => serde_json::from_str(raw).into_diagnostic()?,
            };
            println!("{}", lock_days(rule.as_ref(), config.withdraw_lock_default_days));
            Ok(())
        }
        Command::Send {
            coin,
            destination,
            amount,
            balance,
            second_password,
        } => send(config, coin, &destination, amount, balance, second_password).await,
        Command::Quote {
            fixture,
            base,
            counter,
            base_kind,
            counter_kind,
        } => {
            let api: WalletApiBox = Arc::new(FixtureApi::from_path(fixture).into_diagnostic()?);
            let store = InMemoryStateStore::new();
            for (side, account) in [
                (SwapSide::Base, swap_account(base, base_kind)),
                (SwapSide::Counter, swap_account(counter, counter_kind)),
            ] {
                store
                    .dispatch(Event::FormChange(FormChange::InitSwapSide { side, account }))
                    .await
                    .into_diagnostic()?;
            }

            let poller = QuotePoller::new(api, Arc::new(store), config.quote_poll_interval());
            match poller.poll_once().await.into_diagnostic()? {
                PollOutcome::Quoted(rated) => print_json(&json!({
                    "pair": format!("{base}-{counter}"),
                    "quote_id": rated.quote.id,
                    "rate": rated.rate,
                })),
                PollOutcome::MissingPair => Err(miette!("no trading pair selected")),
            }
        }
        Command::LockAlert { fixture } => {
            let api: WalletApiBox = Arc::new(FixtureApi::from_path(fixture).into_diagnostic()?);
            let store = InMemoryStateStore::new();
            let flows = SendFlows::new(
                api,
                Arc::new(store.clone()),
                Arc::new(StaticSecondFactor::none()),
                PaymentResolver::new(
                    simulated_builders(Decimal::ZERO),
                    config.networks.clone(),
                ),
                config,
            );
            flows.show_withdrawal_lock_alert().await;
            let state = store.state().await.into_diagnostic()?;
            print_json(&json!({ "alerts": state.alerts }))
        }
    }
}

fn resolve(config: &FlowConfig, symbol: &str) -> Result<()> {
    let resolver = PaymentResolver::new(
        simulated_builders(Decimal::ZERO),
        config.networks.clone(),
    );
    match resolver.resolve_symbol(symbol, &Remote::NotAsked).into_diagnostic()? {
        Resolution::Draft(draft) => print_json(&json!({ "draft": draft.value() })),
        Resolution::Placeholder => print_json(&json!({ "draft": null })),
    }
}

async fn send(
    config: FlowConfig,
    coin: Coin,
    destination: &str,
    amount: Option<Decimal>,
    balance: Decimal,
    second_password: Option<String>,
) -> Result<()> {
    let store: StateStoreBox = Arc::new(InMemoryStateStore::new());
    let prompt: SecondFactorPromptBox = match second_password {
        Some(secret) => Arc::new(StaticSecondFactor::new(secret)),
        None => Arc::new(StaticSecondFactor::none()),
    };
    let balance = convert_standard_to_base(coin, balance).into_diagnostic()?;
    let resolver = PaymentResolver::new(simulated_builders(balance), config.networks.clone());
    let api: WalletApiBox = Arc::new(FixtureApi::new(Default::default()));
    let flows = SendFlows::new(api, store, prompt, resolver, config);

    let Resolution::Draft(draft) = flows.payment_get_or_else(coin, &Remote::NotAsked) else {
        return Err(miette!("{coin} payments are not supported yet"));
    };
    let draft = match amount {
        Some(amount) => draft
            .from(AddressOrIndex::Index(0), SourceKind::Account)
            .await
            .into_diagnostic()?
            .amount(convert_standard_to_base(coin, amount).into_diagnostic()?)
            .await
            .into_diagnostic()?,
        None => draft,
    };

    let payment = flows
        .build_and_publish_payment(coin, draft, destination)
        .await
        .into_diagnostic()?;
    print_json(&json!({ "payment": payment }))
}

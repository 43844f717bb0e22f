use crate::config::NetworksConfig;
use crate::domain::coin::{BuilderFamily, Coin};
use crate::domain::payment::{Fresh, PaymentDraft, PaymentValue};
use crate::domain::ports::PaymentBuilderBox;
use crate::domain::remote::Remote;
use crate::error::Result;

/// One payment builder per coin family.
#[derive(Clone)]
pub struct PaymentBuilders {
    pub btc: PaymentBuilderBox,
    pub bch: PaymentBuilderBox,
    pub eth: PaymentBuilderBox,
    pub xlm: PaymentBuilderBox,
}

impl PaymentBuilders {
    pub fn for_family(&self, family: BuilderFamily) -> PaymentBuilderBox {
        match family {
            BuilderFamily::Btc => self.btc.clone(),
            BuilderFamily::Bch => self.bch.clone(),
            BuilderFamily::Eth => self.eth.clone(),
            BuilderFamily::Xlm => self.xlm.clone(),
        }
    }
}

/// Outcome of resolving a coin to its payment draft.
pub enum Resolution {
    Draft(PaymentDraft<Fresh>),
    /// Coins without a builder yet resolve to an inert placeholder.
    Placeholder,
}

impl Resolution {
    pub fn into_draft(self) -> Option<PaymentDraft<Fresh>> {
        match self {
            Resolution::Draft(draft) => Some(draft),
            Resolution::Placeholder => None,
        }
    }
}

/// Maps a coin to a fresh draft from the right builder, seeded with the best
/// known prior payment value.
#[derive(Clone)]
pub struct PaymentResolver {
    builders: PaymentBuilders,
    networks: NetworksConfig,
}

impl PaymentResolver {
    pub fn new(builders: PaymentBuilders, networks: NetworksConfig) -> Self {
        Self { builders, networks }
    }

    pub fn builders(&self) -> &PaymentBuilders {
        &self.builders
    }

    pub fn networks(&self) -> &NetworksConfig {
        &self.networks
    }

    pub fn resolve(&self, coin: Coin, prior: &Remote<PaymentValue>) -> Resolution {
        let Some(family) = coin.family() else {
            return Resolution::Placeholder;
        };
        let mut seed = prior.get_or_else(PaymentValue::empty(coin));
        seed.network = self.networks.params(family);
        Resolution::Draft(PaymentDraft::new(self.builders.for_family(family), seed))
    }

    /// Like [`PaymentResolver::resolve`], for a coin symbol coming from outside
    /// the type system. Unknown symbols fail with `FlowError::InvalidCoinType`.
    pub fn resolve_symbol(&self, symbol: &str, prior: &Remote<PaymentValue>) -> Result<Resolution> {
        let coin: Coin = symbol.parse()?;
        Ok(self.resolve(coin, prior))
    }
}

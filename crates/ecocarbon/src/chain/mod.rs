//! The capabilities the deployment and interaction flows need from the
//! network: deploying a contract, reading from it and sending transactions
//! to it.

pub mod envelope;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod rpc;

use {
    alloy::primitives::{Address, B256, U256},
    anyhow::{Result, anyhow, ensure},
    async_trait::async_trait,
    std::fmt::{self, Display, Formatter},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum ContractKind {
    SimpleGreeting,
    SimpleStorage,
    EcoCarbonToken,
}

impl ContractKind {
    /// All contracts in deployment order.
    pub const ALL: [Self; 3] = [
        Self::SimpleGreeting,
        Self::SimpleStorage,
        Self::EcoCarbonToken,
    ];

    pub fn artifact_name(self) -> &'static str {
        match self {
            Self::SimpleGreeting => contracts::SimpleGreeting::NAME,
            Self::SimpleStorage => contracts::SimpleStorage::NAME,
            Self::EcoCarbonToken => contracts::EcoCarbonToken::NAME,
        }
    }
}

/// A deployed contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContractHandle {
    pub kind: ContractKind,
    pub address: Address,
}

impl ContractHandle {
    pub fn new(kind: ContractKind, address: Address) -> Self {
        Self { kind, address }
    }
}

impl Display for ContractHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.address)
    }
}

/// The contract methods used by the tooling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    GetGreeting,
    UpdateGreeting(String),
    StoreCarbonData { key: String, value: U256 },
    GetCarbonData { key: String },
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    /// Implemented by every contract through `BaseRelayRecipient`.
    IsTrustedForwarder(Address),
}

impl Method {
    /// The contract implementing the method, `None` if all of them do.
    pub fn contract(&self) -> Option<ContractKind> {
        match self {
            Self::GetGreeting | Self::UpdateGreeting(_) => Some(ContractKind::SimpleGreeting),
            Self::StoreCarbonData { .. } | Self::GetCarbonData { .. } => {
                Some(ContractKind::SimpleStorage)
            }
            Self::Name | Self::Symbol | Self::Decimals | Self::TotalSupply => {
                Some(ContractKind::EcoCarbonToken)
            }
            Self::IsTrustedForwarder(_) => None,
        }
    }

    /// Whether calling the method changes contract state and therefore needs
    /// a transaction.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::UpdateGreeting(_) | Self::StoreCarbonData { .. })
    }

    /// Solidity name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetGreeting => "getGreeting",
            Self::UpdateGreeting(_) => "updateGreeting",
            Self::StoreCarbonData { .. } => "storeCarbonData",
            Self::GetCarbonData { .. } => "getCarbonData",
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Decimals => "decimals",
            Self::TotalSupply => "totalSupply",
            Self::IsTrustedForwarder(_) => "isTrustedForwarder",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Self::UpdateGreeting(text) => write!(f, "{name}({text:?})"),
            Self::StoreCarbonData { key, value } => write!(f, "{name}({key:?}, {value})"),
            Self::GetCarbonData { key } => write!(f, "{name}({key:?})"),
            Self::IsTrustedForwarder(forwarder) => write!(f, "{name}({forwarder})"),
            _ => write!(f, "{name}()"),
        }
    }
}

/// Checks that `method` can be invoked on `contract` in the requested mode.
pub fn ensure_callable(contract: &ContractHandle, method: &Method, write: bool) -> Result<()> {
    if let Some(kind) = method.contract() {
        ensure!(
            kind == contract.kind,
            "{method} is not implemented by {}",
            contract.kind
        );
    }
    match (write, method.is_write()) {
        (true, false) => Err(anyhow!("{method} is read-only, call it instead")),
        (false, true) => Err(anyhow!("{method} changes state, send a transaction instead")),
        _ => Ok(()),
    }
}

/// Result of a read-only contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Number(U256),
    Flag(bool),
}

impl Value {
    pub fn into_text(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            other => Err(anyhow!("expected text but got {other}")),
        }
    }

    pub fn into_number(self) -> Result<U256> {
        match self {
            Self::Number(number) => Ok(number),
            other => Err(anyhow!("expected number but got {other}")),
        }
    }

    pub fn into_flag(self) -> Result<bool> {
        match self {
            Self::Flag(flag) => Ok(flag),
            other => Err(anyhow!("expected flag but got {other}")),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// A mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
}

/// Access to the network. Every method suspends until the node answered or,
/// for transactions, until the transaction was mined.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait Chain: Send + Sync {
    /// Account signing every transaction.
    fn signer(&self) -> Address;

    async fn balance(&self, account: Address) -> Result<U256>;

    /// Deploys a new instance of `kind` with `trusted_forwarder` as its only
    /// constructor argument and returns its address.
    async fn deploy(&self, kind: ContractKind, trusted_forwarder: Address) -> Result<Address>;

    async fn call(&self, contract: ContractHandle, method: Method) -> Result<Value>;

    async fn send_transaction(&self, contract: ContractHandle, method: Method) -> Result<Receipt>;
}

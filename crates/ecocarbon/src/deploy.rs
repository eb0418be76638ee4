//! Deploys the contracts with a trusted forwarder, checks that they answer
//! and records where they live.

use {
    crate::{
        Error,
        chain::{Chain, ContractHandle, ContractKind, Method},
        environment::EnvironmentConfig,
        record::{ContractAddresses, DeploymentRecord, LacnetFeatures},
        store::DeploymentStore,
    },
    alloy::primitives::{Address, U256, utils::format_ether},
    anyhow::Context,
    chrono::Utc,
};

/// Written to `SimpleStorage` and read back to check that transactions are
/// accepted.
pub const VERIFICATION_KEY: &str = "pilot_tons_processed";
pub const VERIFICATION_VALUE: u64 = 1000;

pub const LACNET_NOTES: [&str; 4] = [
    "all contracts inherit from BaseRelayRecipient",
    "contracts must use _msgSender() instead of msg.sender",
    "meta-transactions are enabled for gasless operations",
    "see the LACNet documentation sections 8-9 for interaction details",
];

pub const RELAY_HINTS: [&str; 3] = [
    "ensure @lacchain/relay-contracts is installed",
    "verify the TRUSTED_FORWARDER address",
    "check the LACNet network configuration",
];

/// Runs a complete deployment. Any failure aborts the remaining steps,
/// contracts deployed up to that point stay on chain and nothing is saved.
pub async fn deploy(
    chain: &dyn Chain,
    store: &dyn DeploymentStore,
    config: &EnvironmentConfig,
    network: &str,
) -> Result<DeploymentRecord, Error> {
    let forwarder = trusted_forwarder(config)?;

    let deployer = chain.signer();
    let balance = chain.balance(deployer).await?;
    tracing::info!(
        %deployer,
        %forwarder,
        balance = %format_ether(balance),
        "starting deployment on LACNet"
    );

    let mut deployed = Vec::with_capacity(ContractKind::ALL.len());
    for kind in ContractKind::ALL {
        tracing::info!(contract = %kind, "deploying");
        let address = chain
            .deploy(kind, forwarder)
            .await
            .with_context(|| format!("failed to deploy {kind}"))?;
        tracing::info!(contract = %kind, %address, "deployed");
        deployed.push(address);
    }
    let contracts = ContractAddresses {
        simple_greeting: deployed[0],
        simple_storage: deployed[1],
        eco_carbon_token: deployed[2],
    };

    verify(chain, &contracts, forwarder).await?;

    let record = DeploymentRecord {
        timestamp: Utc::now(),
        network: network.to_string(),
        deployer,
        trusted_forwarder: forwarder,
        lacnet_features: LacnetFeatures::ENABLED,
        contracts,
    };
    let summary = serde_json::to_string(&record).context("failed to serialize record")?;
    tracing::info!(%summary, "LACNet deployment summary");
    store.save(&record).await?;

    for (i, note) in LACNET_NOTES.iter().enumerate() {
        tracing::info!("LACNet note {}: {note}", i + 1);
    }
    tracing::info!(%forwarder, "meta-transactions are relayed by the trusted forwarder");
    Ok(record)
}

fn trusted_forwarder(config: &EnvironmentConfig) -> Result<Address, Error> {
    let forwarder = config
        .trusted_forwarder
        .as_deref()
        .map(str::trim)
        .filter(|forwarder| !forwarder.is_empty())
        .ok_or(Error::MissingConfiguration("TRUSTED_FORWARDER"))?;
    forwarder
        .parse()
        .map_err(|err| Error::Configuration(format!("TRUSTED_FORWARDER {forwarder:?}: {err}")))
}

/// Exercises every contract once. The results are only logged, a forwarder
/// the token does not trust is reported but does not fail the deployment.
async fn verify(
    chain: &dyn Chain,
    contracts: &ContractAddresses,
    forwarder: Address,
) -> anyhow::Result<()> {
    let greeting = contracts.handle(ContractKind::SimpleGreeting);
    let storage = contracts.handle(ContractKind::SimpleStorage);
    let token = contracts.handle(ContractKind::EcoCarbonToken);

    let current = chain.call(greeting, Method::GetGreeting).await?.into_text()?;
    tracing::info!(greeting = %current, "read current greeting");

    chain
        .send_transaction(
            storage,
            Method::StoreCarbonData {
                key: VERIFICATION_KEY.to_string(),
                value: U256::from(VERIFICATION_VALUE),
            },
        )
        .await?;
    let stored = chain
        .call(
            storage,
            Method::GetCarbonData {
                key: VERIFICATION_KEY.to_string(),
            },
        )
        .await?
        .into_number()?;
    tracing::info!(key = VERIFICATION_KEY, %stored, "read back carbon data");

    let name = read_text(chain, token, Method::Name).await?;
    let symbol = read_text(chain, token, Method::Symbol).await?;
    let decimals = chain.call(token, Method::Decimals).await?.into_number()?;
    tracing::info!(%name, %symbol, %decimals, "read token metadata");

    let trusted = chain
        .call(token, Method::IsTrustedForwarder(forwarder))
        .await?
        .into_flag()?;
    if trusted {
        tracing::info!(%forwarder, "trusted forwarder correctly set");
    } else {
        tracing::warn!(%forwarder, contract = %token, "contract does not trust the forwarder");
    }
    Ok(())
}

async fn read_text(
    chain: &dyn Chain,
    contract: ContractHandle,
    method: Method,
) -> anyhow::Result<String> {
    chain.call(contract, method).await?.into_text()
}

/// Logs a failed deployment together with hints matching the failure.
pub fn report_failure(err: &Error) {
    tracing::error!(?err, "LACNet deployment failed");
    if err.is_relay_integration_failure() {
        for (i, hint) in RELAY_HINTS.iter().enumerate() {
            tracing::info!("BaseRelayRecipient troubleshooting {}: {hint}", i + 1);
        }
    }
}

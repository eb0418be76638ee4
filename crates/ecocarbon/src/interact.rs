//! Exercises previously deployed contracts.

use {
    crate::{
        Error,
        chain::{Chain, ContractKind, Method},
        record::DeploymentRecord,
    },
    alloy::primitives::{B256, U256, keccak256},
    anyhow::anyhow,
};

pub const GREETING: &str = "¡Hola desde San Martín, Perú!";

/// Pilot program figures written to `SimpleStorage`, in write order.
pub const CARBON_DATA: [(&str, u64); 4] = [
    ("families_participating", 127),
    ("tons_processed", 1000),
    ("tokens_minted", 11040),
    // kg
    ("co2_sequestered", 54000),
];

/// Name of the batch whose hash is shown as an example batch id. Minting
/// itself needs the minter role and is not attempted.
pub const SAMPLE_BATCH: &str = "batch_001_tocache";

pub const TROUBLESHOOTING: [&str; 3] = [
    "ensure the contracts are deployed",
    "check the private key and network configuration",
    "verify the account has sufficient gas",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionReport {
    /// Greeting read back after updating it.
    pub greeting: String,
    pub carbon_data: Vec<(String, U256)>,
    pub token: TokenInfo,
    pub sample_batch_id: B256,
}

/// Runs all interactions in order. The first failure aborts the rest.
pub async fn interact(
    chain: &dyn Chain,
    record: &DeploymentRecord,
) -> Result<InteractionReport, Error> {
    tracing::info!(
        account = %chain.signer(),
        network = %record.network,
        "interacting with deployed contracts"
    );

    let greeting = record.contracts.handle(ContractKind::SimpleGreeting);
    let receipt = chain
        .send_transaction(greeting, Method::UpdateGreeting(GREETING.to_string()))
        .await?;
    tracing::info!(tx = %receipt.transaction_hash, "greeting updated");
    let greeting = chain.call(greeting, Method::GetGreeting).await?.into_text()?;
    tracing::info!(%greeting, "read new greeting");

    let storage = record.contracts.handle(ContractKind::SimpleStorage);
    let mut carbon_data = Vec::with_capacity(CARBON_DATA.len());
    for (key, value) in CARBON_DATA {
        let value = U256::from(value);
        chain
            .send_transaction(
                storage,
                Method::StoreCarbonData {
                    key: key.to_string(),
                    value,
                },
            )
            .await?;
        tracing::info!(key, %value, "stored carbon data");
        carbon_data.push((key.to_string(), value));
    }

    let token = token_info(chain, record).await?;
    tracing::info!(
        name = %token.name,
        symbol = %token.symbol,
        decimals = token.decimals,
        total_supply = %token.total_supply,
        "read token info"
    );

    let sample_batch_id = keccak256(SAMPLE_BATCH);
    tracing::info!(batch = SAMPLE_BATCH, id = %sample_batch_id, "simulated batch id");
    tracing::info!("actual minting requires the MINTER_ROLE");

    Ok(InteractionReport {
        greeting,
        carbon_data,
        token,
        sample_batch_id,
    })
}

async fn token_info(chain: &dyn Chain, record: &DeploymentRecord) -> anyhow::Result<TokenInfo> {
    let token = record.contracts.handle(ContractKind::EcoCarbonToken);
    let name = chain.call(token, Method::Name).await?.into_text()?;
    let symbol = chain.call(token, Method::Symbol).await?.into_text()?;
    let decimals = chain.call(token, Method::Decimals).await?.into_number()?;
    let total_supply = chain.call(token, Method::TotalSupply).await?.into_number()?;
    Ok(TokenInfo {
        name,
        symbol,
        decimals: u8::try_from(decimals)
            .map_err(|_| anyhow!("token decimals {decimals} out of range"))?,
        total_supply,
    })
}

/// Logs a failed interaction run together with generic hints.
pub fn report_failure(err: &Error) {
    tracing::error!(?err, "interaction failed");
    for (i, tip) in TROUBLESHOOTING.iter().enumerate() {
        tracing::info!("troubleshooting {}: {tip}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            chain::{
                MockChain,
                Receipt,
                Value,
                fake::{self, FakeChain, Interaction},
            },
            record::{ContractAddresses, DEFAULT_NETWORK, LacnetFeatures},
        },
        alloy::primitives::Address,
        chrono::Utc,
        mockall::{Sequence, predicate::eq},
    };

    async fn deployed(chain: &FakeChain) -> DeploymentRecord {
        let forwarder = Address::repeat_byte(0xf0);
        let mut addresses = Vec::new();
        for kind in ContractKind::ALL {
            addresses.push(chain.deploy(kind, forwarder).await.unwrap());
        }
        record(ContractAddresses {
            simple_greeting: addresses[0],
            simple_storage: addresses[1],
            eco_carbon_token: addresses[2],
        })
    }

    fn record(contracts: ContractAddresses) -> DeploymentRecord {
        DeploymentRecord {
            timestamp: Utc::now(),
            network: DEFAULT_NETWORK.to_string(),
            deployer: Address::repeat_byte(0x5e),
            trusted_forwarder: Address::repeat_byte(0xf0),
            lacnet_features: LacnetFeatures::ENABLED,
            contracts,
        }
    }

    fn sends(chain: &FakeChain) -> Vec<Method> {
        chain
            .interactions()
            .into_iter()
            .filter_map(|interaction| match interaction {
                Interaction::Send(_, method) => Some(method),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn runs_all_interactions() {
        let chain = FakeChain::new();
        let record = deployed(&chain).await;

        let report = interact(&chain, &record).await.unwrap();

        assert_eq!(report.greeting, GREETING);
        assert_eq!(
            chain.greeting(record.contracts.simple_greeting).as_deref(),
            Some(GREETING)
        );
        assert_eq!(
            report.token,
            TokenInfo {
                name: fake::TOKEN_NAME.to_string(),
                symbol: fake::TOKEN_SYMBOL.to_string(),
                decimals: fake::TOKEN_DECIMALS,
                total_supply: U256::ZERO,
            }
        );
        assert_eq!(
            report.sample_batch_id,
            keccak256("batch_001_tocache".as_bytes())
        );
        assert_eq!(
            chain.carbon_data(record.contracts.simple_storage, "tokens_minted"),
            Some(U256::from(11040))
        );
    }

    #[tokio::test]
    async fn writes_carbon_data_in_order() {
        let chain = FakeChain::new();
        let record = deployed(&chain).await;

        let report = interact(&chain, &record).await.unwrap();

        let stores: Vec<_> = sends(&chain)
            .into_iter()
            .filter_map(|method| match method {
                Method::StoreCarbonData { key, value } => Some((key, value)),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = [
            ("families_participating", 127),
            ("tons_processed", 1000),
            ("tokens_minted", 11040),
            ("co2_sequestered", 54000),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), U256::from(value)))
        .collect();
        assert_eq!(stores, expected);
        assert_eq!(report.carbon_data, expected);
        assert!(!chain.interactions().iter().any(|interaction| matches!(
            interaction,
            Interaction::Call(_, Method::GetCarbonData { .. })
        )));
    }

    #[tokio::test]
    async fn unknown_contracts_abort_the_run() {
        let chain = FakeChain::new();
        let record = record(ContractAddresses {
            simple_greeting: Address::repeat_byte(1),
            simple_storage: Address::repeat_byte(2),
            eco_carbon_token: Address::repeat_byte(3),
        });

        let err = interact(&chain, &record).await.unwrap_err();

        assert!(matches!(err, Error::Operation(_)));
        assert_eq!(chain.interactions().len(), 1);
        report_failure(&err);
    }

    #[tokio::test]
    async fn failed_write_stops_remaining_writes() {
        let contracts = ContractAddresses {
            simple_greeting: Address::repeat_byte(1),
            simple_storage: Address::repeat_byte(2),
            eco_carbon_token: Address::repeat_byte(3),
        };
        let receipt = Receipt {
            transaction_hash: B256::repeat_byte(9),
            block_number: Some(1),
        };
        let mut seq = Sequence::new();
        let mut chain = MockChain::new();
        chain.expect_signer().return_const(Address::repeat_byte(0x5e));
        chain
            .expect_send_transaction()
            .with(
                eq(contracts.handle(ContractKind::SimpleGreeting)),
                eq(Method::UpdateGreeting(GREETING.to_string())),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(receipt));
        chain
            .expect_call()
            .with(
                eq(contracts.handle(ContractKind::SimpleGreeting)),
                eq(Method::GetGreeting),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Value::Text(GREETING.to_string())));
        chain
            .expect_send_transaction()
            .with(
                eq(contracts.handle(ContractKind::SimpleStorage)),
                eq(Method::StoreCarbonData {
                    key: "families_participating".to_string(),
                    value: U256::from(127),
                }),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(anyhow!("transaction reverted")));

        let result = interact(&chain, &record(contracts)).await;
        assert!(matches!(result, Err(Error::Operation(_))));
    }
}

//! [`Chain`] implementation talking JSON-RPC to a LACChain node.

use {
    super::{
        Chain,
        ContractHandle,
        ContractKind,
        Method,
        Receipt,
        Value,
        ensure_callable,
        envelope::Envelope,
    },
    crate::environment::EnvironmentConfig,
    alloy::{
        network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
        primitives::{Address, Bytes, U256},
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::{
            client::{ClientBuilder, RpcClient},
            types::{TransactionReceipt, TransactionRequest},
        },
        signers::local::PrivateKeySigner,
        sol_types::{SolCall, SolValue},
    },
    anyhow::{Context, Result, anyhow, bail, ensure},
    async_trait::async_trait,
    contracts::{EcoCarbonToken, SimpleGreeting, SimpleStorage, artifact::Artifact},
    std::path::PathBuf,
    url::Url,
};

/// Gas parameters attached to every transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gas {
    pub price: u128,
    pub limit: u64,
}

impl Default for Gas {
    /// LACChain does not charge for gas but enforces a block gas limit.
    fn default() -> Self {
        Self {
            price: 0,
            limit: 15_000_000,
        }
    }
}

pub struct RpcChain {
    provider: DynProvider,
    signer: Address,
    artifacts_dir: PathBuf,
    gas: Gas,
    envelope: Option<Envelope>,
}

impl RpcChain {
    /// Connects to the configured node with the configured account. No
    /// request is sent yet.
    pub fn connect(config: &EnvironmentConfig, artifacts_dir: PathBuf, gas: Gas) -> Result<Self> {
        let url: Url = config
            .rpc_url
            .parse()
            .with_context(|| format!("invalid RPC URL {}", config.rpc_url))?;
        Self::with_client(config, ClientBuilder::default().http(url), artifacts_dir, gas)
    }

    fn with_client(
        config: &EnvironmentConfig,
        client: RpcClient,
        artifacts_dir: PathBuf,
        gas: Gas,
    ) -> Result<Self> {
        let signer: PrivateKeySigner = config
            .private_key
            .as_str()
            .parse()
            .context("private key is not a valid secp256k1 key")?;
        let address = signer.address();
        let envelope = config
            .node_address
            .as_deref()
            .map(|node| -> Result<Envelope> {
                Ok(Envelope {
                    node_address: node
                        .parse()
                        .with_context(|| format!("invalid node address {node}"))?,
                    expiration: config.expiration_timestamp,
                })
            })
            .transpose()?;
        if envelope.is_none() {
            tracing::warn!("no node address configured, sending plain transactions");
        }

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(client)
            .erased();

        Ok(Self {
            provider,
            signer: address,
            artifacts_dir,
            gas,
            envelope,
        })
    }

    /// Signs and submits a transaction and waits until it was mined. A
    /// missing recipient creates a contract.
    async fn submit(&self, to: Option<Address>, input: Bytes) -> Result<TransactionReceipt> {
        let input = match &self.envelope {
            Some(envelope) => envelope.wrap(&input),
            None => input,
        };
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_gas_price(self.gas.price)
            .with_gas_limit(self.gas.limit);
        let tx = match to {
            Some(to) => tx.with_to(to).with_input(input),
            None => tx.with_deploy_code(input),
        };

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("failed to submit transaction")?;
        tracing::debug!(tx = ?pending.tx_hash(), "submitted transaction");
        let receipt = pending
            .get_receipt()
            .await
            .context("failed to wait for transaction receipt")?;
        ensure!(
            receipt.status(),
            "transaction {:?} reverted",
            receipt.transaction_hash
        );
        Ok(receipt)
    }
}

#[async_trait]
impl Chain for RpcChain {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn balance(&self, account: Address) -> Result<U256> {
        self.provider
            .get_balance(account)
            .await
            .with_context(|| format!("failed to fetch balance of {account}"))
    }

    async fn deploy(&self, kind: ContractKind, trusted_forwarder: Address) -> Result<Address> {
        let artifact = Artifact::load(&self.artifacts_dir, kind.artifact_name())?;
        let code = artifact.deploy_code(&trusted_forwarder.abi_encode());
        let receipt = self
            .submit(None, code)
            .await
            .with_context(|| format!("failed to deploy {kind}"))?;
        receipt
            .contract_address
            .ok_or_else(|| anyhow!("receipt of {kind} deployment has no contract address"))
    }

    async fn call(&self, contract: ContractHandle, method: Method) -> Result<Value> {
        ensure_callable(&contract, &method, false)?;
        let address = contract.address;
        let provider = self.provider.clone();
        let context = format!("{method} on {contract}");

        let value = match method {
            Method::GetGreeting => Value::Text(
                SimpleGreeting::Instance::new(address, provider)
                    .getGreeting()
                    .call()
                    .await
                    .context(context)?,
            ),
            Method::GetCarbonData { key } => Value::Number(
                SimpleStorage::Instance::new(address, provider)
                    .getCarbonData(key)
                    .call()
                    .await
                    .context(context)?,
            ),
            Method::Name => Value::Text(
                EcoCarbonToken::Instance::new(address, provider)
                    .name()
                    .call()
                    .await
                    .context(context)?,
            ),
            Method::Symbol => Value::Text(
                EcoCarbonToken::Instance::new(address, provider)
                    .symbol()
                    .call()
                    .await
                    .context(context)?,
            ),
            Method::Decimals => Value::Number(U256::from(
                EcoCarbonToken::Instance::new(address, provider)
                    .decimals()
                    .call()
                    .await
                    .context(context)?,
            )),
            Method::TotalSupply => Value::Number(
                EcoCarbonToken::Instance::new(address, provider)
                    .totalSupply()
                    .call()
                    .await
                    .context(context)?,
            ),
            Method::IsTrustedForwarder(forwarder) => {
                let trusted = match contract.kind {
                    ContractKind::SimpleGreeting => {
                        SimpleGreeting::Instance::new(address, provider)
                            .isTrustedForwarder(forwarder)
                            .call()
                            .await
                    }
                    ContractKind::SimpleStorage => {
                        SimpleStorage::Instance::new(address, provider)
                            .isTrustedForwarder(forwarder)
                            .call()
                            .await
                    }
                    ContractKind::EcoCarbonToken => {
                        EcoCarbonToken::Instance::new(address, provider)
                            .isTrustedForwarder(forwarder)
                            .call()
                            .await
                    }
                };
                Value::Flag(trusted.context(context)?)
            }
            Method::UpdateGreeting(_) | Method::StoreCarbonData { .. } => {
                bail!("{context} changes state")
            }
        };
        Ok(value)
    }

    async fn send_transaction(&self, contract: ContractHandle, method: Method) -> Result<Receipt> {
        ensure_callable(&contract, &method, true)?;
        let context = format!("{method} on {contract}");

        let calldata = match method {
            Method::UpdateGreeting(text) => {
                SimpleGreeting::updateGreetingCall { newGreeting: text }.abi_encode()
            }
            Method::StoreCarbonData { key, value } => {
                SimpleStorage::storeCarbonDataCall { key, value }.abi_encode()
            }
            _ => bail!("{context} is read-only"),
        };

        let receipt = self
            .submit(Some(contract.address), calldata.into())
            .await
            .context(context)?;
        Ok(Receipt {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}

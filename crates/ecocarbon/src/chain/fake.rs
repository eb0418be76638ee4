//! Deterministic in-memory [`Chain`] for tests.

use {
    super::{Chain, ContractHandle, ContractKind, Method, Receipt, Value, ensure_callable},
    alloy::primitives::{Address, U256, keccak256},
    anyhow::{Context, Result, bail},
    async_trait::async_trait,
    std::{collections::HashMap, sync::Mutex},
};

pub const INITIAL_GREETING: &str = "Hello from LACNet!";
pub const TOKEN_NAME: &str = "Eco-Carbon San Martin";
pub const TOKEN_SYMBOL: &str = "ECOCO2";
pub const TOKEN_DECIMALS: u8 = 3;

/// Everything the fake was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interaction {
    Deploy(ContractKind),
    Call(ContractHandle, Method),
    Send(ContractHandle, Method),
}

#[derive(Clone, Copy, Debug)]
struct Deployed {
    kind: ContractKind,
    forwarder: Address,
}

#[derive(Default)]
struct State {
    nonce: u64,
    contracts: HashMap<Address, Deployed>,
    greetings: HashMap<Address, String>,
    carbon_data: HashMap<(Address, String), U256>,
    interactions: Vec<Interaction>,
}

pub struct FakeChain {
    signer: Address,
    balance: U256,
    trusts_forwarder: bool,
    failing_deployment: Option<(ContractKind, String)>,
    state: Mutex<State>,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            signer: Address::repeat_byte(0x5e),
            balance: U256::from(10).pow(U256::from(18)),
            trusts_forwarder: true,
            failing_deployment: None,
            state: Default::default(),
        }
    }

    /// Contracts answer `isTrustedForwarder` with `false`.
    pub fn distrusting_forwarder(mut self) -> Self {
        self.trusts_forwarder = false;
        self
    }

    /// Deploying `kind` fails with `message`.
    pub fn failing_deployment(mut self, kind: ContractKind, message: &str) -> Self {
        self.failing_deployment = Some((kind, message.to_string()));
        self
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.state.lock().unwrap().interactions.clone()
    }

    pub fn greeting(&self, contract: Address) -> Option<String> {
        self.state.lock().unwrap().greetings.get(&contract).cloned()
    }

    pub fn carbon_data(&self, contract: Address, key: &str) -> Option<U256> {
        self.state
            .lock()
            .unwrap()
            .carbon_data
            .get(&(contract, key.to_string()))
            .copied()
    }

    fn deployed(state: &State, contract: &ContractHandle) -> Result<Deployed> {
        let deployed = *state
            .contracts
            .get(&contract.address)
            .with_context(|| format!("no contract deployed at {}", contract.address))?;
        if deployed.kind != contract.kind {
            bail!("{} is a {}", contract.address, deployed.kind);
        }
        Ok(deployed)
    }

    fn next_receipt(state: &mut State) -> Receipt {
        state.nonce += 1;
        Receipt {
            transaction_hash: keccak256(state.nonce.to_be_bytes()),
            block_number: Some(state.nonce),
        }
    }
}

#[async_trait]
impl Chain for FakeChain {
    fn signer(&self) -> Address {
        self.signer
    }

    async fn balance(&self, account: Address) -> Result<U256> {
        Ok(if account == self.signer {
            self.balance
        } else {
            U256::ZERO
        })
    }

    async fn deploy(&self, kind: ContractKind, trusted_forwarder: Address) -> Result<Address> {
        let mut state = self.state.lock().unwrap();
        state.interactions.push(Interaction::Deploy(kind));
        if let Some((failing, message)) = &self.failing_deployment {
            if *failing == kind {
                bail!("{message}");
            }
        }

        let address = self.signer.create(state.nonce);
        Self::next_receipt(&mut state);
        state.contracts.insert(
            address,
            Deployed {
                kind,
                forwarder: trusted_forwarder,
            },
        );
        if kind == ContractKind::SimpleGreeting {
            state
                .greetings
                .insert(address, INITIAL_GREETING.to_string());
        }
        Ok(address)
    }

    async fn call(&self, contract: ContractHandle, method: Method) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state
            .interactions
            .push(Interaction::Call(contract, method.clone()));
        ensure_callable(&contract, &method, false)?;
        let deployed = Self::deployed(&state, &contract)?;

        let value = match method {
            Method::GetGreeting => Value::Text(
                state
                    .greetings
                    .get(&contract.address)
                    .cloned()
                    .unwrap_or_default(),
            ),
            Method::GetCarbonData { key } => Value::Number(
                state
                    .carbon_data
                    .get(&(contract.address, key))
                    .copied()
                    .unwrap_or_default(),
            ),
            Method::Name => Value::Text(TOKEN_NAME.to_string()),
            Method::Symbol => Value::Text(TOKEN_SYMBOL.to_string()),
            Method::Decimals => Value::Number(U256::from(TOKEN_DECIMALS)),
            Method::TotalSupply => Value::Number(U256::ZERO),
            Method::IsTrustedForwarder(forwarder) => {
                Value::Flag(self.trusts_forwarder && forwarder == deployed.forwarder)
            }
            Method::UpdateGreeting(_) | Method::StoreCarbonData { .. } => {
                bail!("write method called")
            }
        };
        Ok(value)
    }

    async fn send_transaction(&self, contract: ContractHandle, method: Method) -> Result<Receipt> {
        let mut state = self.state.lock().unwrap();
        state
            .interactions
            .push(Interaction::Send(contract, method.clone()));
        ensure_callable(&contract, &method, true)?;
        Self::deployed(&state, &contract)?;

        match method {
            Method::UpdateGreeting(text) => {
                state.greetings.insert(contract.address, text);
            }
            Method::StoreCarbonData { key, value } => {
                state.carbon_data.insert((contract.address, key), value);
            }
            _ => bail!("read-only method sent"),
        }
        Ok(Self::next_receipt(&mut state))
    }
}


//! Off-chain model of the Eco-Carbon token: role based minting of carbon
//! credits per biochar batch, revenue distribution and retirement.

use {
    chrono::{DateTime, Utc},
    rust_decimal::Decimal,
    std::collections::{HashMap, HashSet},
};

pub const NAME: &str = "Eco-Carbon San Martin";
pub const SYMBOL: &str = "ECOCO2";
pub const DECIMALS: u32 = 3;

/// tCO2eq credited per tonne of biochar.
pub const CONVERSION_RATE: Decimal = Decimal::from_parts(1104, 0, 0, false, 2);

/// Batches scoring below this are not minted.
pub const MIN_QUALITY_SCORE: u32 = 85;

/// Account holding every administrative role after construction.
pub const OWNER: &str = "admin_address";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Minter,
    Verifier,
    Farmer,
    Buyer,
    Retirement,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0} role required")]
    MissingRole(Role),
    #[error("amounts must be positive")]
    InvalidAmount,
    #[error("quality score {0} is below {min}", min = MIN_QUALITY_SCORE)]
    InsufficientQuality(u32),
    #[error("batch {0} already exists")]
    DuplicateBatch(String),
    #[error("unknown batch {0}")]
    UnknownBatch(String),
    #[error("credits of batch {0} are already retired")]
    AlreadyRetired(String),
    #[error("balance {balance} does not cover {amount}")]
    InsufficientBalance { balance: Decimal, amount: Decimal },
    #[error("revenue must be positive")]
    InvalidRevenue,
}

/// Fees in basis points, except for the flat compliance and retirement fees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeStructure {
    pub minting_fee: u32,
    pub transfer_fee: u32,
    pub cross_border_fee: u32,
    pub compliance_fee: Decimal,
    pub retirement_fee: Decimal,
}

impl Default for FeeStructure {
    fn default() -> Self {
        Self {
            minting_fee: 200,
            transfer_fee: 50,
            cross_border_fee: 100,
            compliance_fee: Decimal::from(50),
            retirement_fee: Decimal::from(25),
        }
    }
}

/// Provenance of the credits minted for one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub batch_id: String,
    /// tCO2eq.
    pub carbon_sequestered: Decimal,
    /// kg.
    pub biochar_mass: Decimal,
    pub quality_multiplier: u32,
    pub permanence_score: u32,
    pub origin_gps: String,
    pub methodology: String,
    pub ipfs_hash: String,
    pub timestamp: DateTime<Utc>,
    pub is_retired: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintRequest {
    pub farmer: String,
    /// tCO2eq sequestered by the batch.
    pub amount: Decimal,
    pub batch_id: String,
    pub gps_location: String,
    pub methodology: String,
    pub ipfs_hash: String,
    /// kg.
    pub biochar_mass: Decimal,
    pub quality_score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevenueDistribution {
    pub farmers: Decimal,
    pub technology: Decimal,
    pub verification: Decimal,
    pub insurance: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    TokenMinted {
        batch_id: String,
        farmer: String,
        amount: Decimal,
    },
    RevenueDistributed {
        total: Decimal,
        distribution: RevenueDistribution,
    },
    TokenRetired {
        batch_id: String,
        retirer: String,
        amount: Decimal,
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

/// Tokens credited for `biochar_mass` kg of biochar.
pub fn tokens_for(biochar_mass: Decimal) -> Decimal {
    biochar_mass * CONVERSION_RATE / Decimal::ONE_THOUSAND
}

#[derive(Debug)]
pub struct CarbonLedger {
    batches: HashMap<String, Batch>,
    balances: HashMap<String, Decimal>,
    roles: HashMap<String, HashSet<Role>>,
    fees: FeeStructure,
    total_carbon_sequestered: Decimal,
    total_retired: Decimal,
    total_supply: Decimal,
    events: Vec<Event>,
}

impl Default for CarbonLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CarbonLedger {
    pub fn new() -> Self {
        let mut ledger = Self {
            batches: Default::default(),
            balances: Default::default(),
            roles: Default::default(),
            fees: Default::default(),
            total_carbon_sequestered: Decimal::ZERO,
            total_retired: Decimal::ZERO,
            total_supply: Decimal::ZERO,
            events: Vec::new(),
        };
        for role in [Role::Admin, Role::Minter, Role::Verifier, Role::Retirement] {
            ledger.grant_role(OWNER, role);
        }
        ledger
    }

    pub fn grant_role(&mut self, account: &str, role: Role) {
        self.roles.entry(account.to_string()).or_default().insert(role);
    }

    pub fn has_role(&self, account: &str, role: Role) -> bool {
        self.roles
            .get(account)
            .is_some_and(|roles| roles.contains(&role))
    }

    fn ensure_role(&self, account: &str, role: Role) -> Result<(), Error> {
        if self.has_role(account, role) {
            Ok(())
        } else {
            Err(Error::MissingRole(role))
        }
    }

    /// Records the batch and credits the farmer with tokens proportional to
    /// the biochar mass. Returns the minted amount. Nothing changes on error.
    pub fn mint_carbon_credit(
        &mut self,
        request: MintRequest,
        minter: &str,
    ) -> Result<Decimal, Error> {
        self.ensure_role(minter, Role::Minter)?;
        if request.amount <= Decimal::ZERO || request.biochar_mass <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        if request.quality_score < MIN_QUALITY_SCORE {
            return Err(Error::InsufficientQuality(request.quality_score));
        }
        if self.batches.contains_key(&request.batch_id) {
            return Err(Error::DuplicateBatch(request.batch_id));
        }

        let tokens = tokens_for(request.biochar_mass);
        let batch = Batch {
            batch_id: request.batch_id.clone(),
            carbon_sequestered: request.amount,
            biochar_mass: request.biochar_mass,
            quality_multiplier: if request.quality_score > 90 { 150 } else { 100 },
            permanence_score: 100,
            origin_gps: request.gps_location,
            methodology: request.methodology,
            ipfs_hash: request.ipfs_hash,
            timestamp: Utc::now(),
            is_retired: false,
        };
        self.batches.insert(request.batch_id.clone(), batch);
        *self.balances.entry(request.farmer.clone()).or_default() += tokens;
        self.total_carbon_sequestered += request.amount;
        self.total_supply += tokens;
        tracing::debug!(batch = %request.batch_id, farmer = %request.farmer, %tokens, "minted");
        self.emit(EventKind::TokenMinted {
            batch_id: request.batch_id,
            farmer: request.farmer,
            amount: tokens,
        });
        Ok(tokens)
    }

    /// Splits revenue 60/20/10/10 between farmers, technology, verification
    /// and insurance.
    pub fn distribute_token_revenue(
        &mut self,
        total: Decimal,
    ) -> Result<RevenueDistribution, Error> {
        if total <= Decimal::ZERO {
            return Err(Error::InvalidRevenue);
        }
        let share = |percent: i64| total * Decimal::new(percent, 2);
        let distribution = RevenueDistribution {
            farmers: share(60),
            technology: share(20),
            verification: share(10),
            insurance: share(10),
        };
        self.emit(EventKind::RevenueDistributed {
            total,
            distribution: distribution.clone(),
        });
        Ok(distribution)
    }

    /// Burns `amount` tokens of `retirer` against a batch. A batch can only be
    /// retired once.
    pub fn retire_credits(
        &mut self,
        batch_id: &str,
        amount: Decimal,
        reason: &str,
        retirer: &str,
    ) -> Result<(), Error> {
        self.ensure_role(retirer, Role::Retirement)?;
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        let batch = self
            .batches
            .get(batch_id)
            .ok_or_else(|| Error::UnknownBatch(batch_id.to_string()))?;
        if batch.is_retired {
            return Err(Error::AlreadyRetired(batch_id.to_string()));
        }
        let balance = self.balance(retirer);
        if balance < amount {
            return Err(Error::InsufficientBalance { balance, amount });
        }

        *self.balances.entry(retirer.to_string()).or_default() -= amount;
        self.total_supply -= amount;
        self.total_retired += amount;
        if let Some(batch) = self.batches.get_mut(batch_id) {
            batch.is_retired = true;
        }
        self.emit(EventKind::TokenRetired {
            batch_id: batch_id.to_string(),
            retirer: retirer.to_string(),
            amount,
            reason: reason.to_string(),
        });
        Ok(())
    }

    fn emit(&mut self, kind: EventKind) {
        self.events.push(Event {
            timestamp: Utc::now(),
            kind,
        });
    }

    pub fn balance(&self, account: &str) -> Decimal {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn batch(&self, batch_id: &str) -> Option<&Batch> {
        self.batches.get(batch_id)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn fees(&self) -> &FeeStructure {
        &self.fees
    }

    pub fn total_supply(&self) -> Decimal {
        self.total_supply
    }

    pub fn total_retired(&self) -> Decimal {
        self.total_retired
    }

    pub fn total_carbon_sequestered(&self) -> Decimal {
        self.total_carbon_sequestered
    }
}

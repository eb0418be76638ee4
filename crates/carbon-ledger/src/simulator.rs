//! Simulation of the San Martín pilot program: farmers deliver agricultural
//! waste, a pyrolysis unit turns it into biochar and reports readings through
//! (simulated) IoT sensors, and the ledger mints credits for every batch.

use {
    crate::token::{self, CarbonLedger, MintRequest},
    chrono::{DateTime, Utc},
    rand::{Rng, SeedableRng, rngs::StdRng},
    rust_decimal::{Decimal, prelude::ToPrimitive},
    sha2::{Digest, Sha256},
};

/// Readings are reproducible across runs.
pub const SEED: u64 = 42;

pub const FARMERS: usize = 127;

/// Tonnes of waste processed over the whole pilot.
pub const PILOT_TONNES: i64 = 1000;

/// Share of the waste mass recovered as biochar.
pub const BIOCHAR_YIELD: Decimal = Decimal::from_parts(23, 0, 0, false, 2);

/// tCO2eq per kg of biochar.
pub const CO2_PER_KG_BIOCHAR: Decimal = Decimal::from_parts(1104, 0, 0, false, 5);

pub const METHODOLOGY: &str = "VCS VM0044";

#[derive(Clone, Debug, PartialEq)]
pub struct IotReading {
    pub batch_id: String,
    pub timestamp: DateTime<Utc>,
    /// °C
    pub temperature: f64,
    /// bar
    pub pressure: f64,
    /// %
    pub humidity: f64,
    /// %
    pub carbon_content: f64,
    pub ph: f64,
    pub quality_score: f64,
    pub gps: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessingRecord {
    pub batch_id: String,
    pub farmer: String,
    /// kg
    pub waste_input: Decimal,
    /// kg
    pub biochar_output: Decimal,
    /// tCO2eq
    pub co2_sequestered: Decimal,
    pub tokens_minted: Decimal,
    pub quality: f64,
    pub timestamp: DateTime<Utc>,
}

/// Summary of all processed batches.
#[derive(Clone, Debug, PartialEq)]
pub struct Analytics {
    pub batches: usize,
    pub mean_quality: f64,
    pub min_quality: f64,
    pub max_quality: f64,
    pub total_tokens: Decimal,
    /// Biochar output per waste input, averaged over batches.
    pub mean_efficiency: f64,
    /// Running total of sequestered CO2 after each batch.
    pub cumulative_co2: Vec<Decimal>,
}

pub struct Simulator {
    ledger: CarbonLedger,
    rng: StdRng,
    farmers: Vec<String>,
    iot_data: Vec<IotReading>,
    history: Vec<ProcessingRecord>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SEED)
    }
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Self {
            ledger: CarbonLedger::new(),
            rng: StdRng::seed_from_u64(seed),
            farmers: (1..=FARMERS).map(|i| format!("farmer_{i:03}")).collect(),
            iot_data: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &CarbonLedger {
        &self.ledger
    }

    pub fn farmers(&self) -> &[String] {
        &self.farmers
    }

    pub fn iot_data(&self) -> &[IotReading] {
        &self.iot_data
    }

    pub fn history(&self) -> &[ProcessingRecord] {
        &self.history
    }

    pub fn simulate_iot_reading(&mut self, batch_id: &str) -> IotReading {
        let reading = IotReading {
            batch_id: batch_id.to_string(),
            timestamp: Utc::now(),
            temperature: self.rng.gen_range(450.0..550.0),
            pressure: self.rng.gen_range(0.9..1.1),
            humidity: self.rng.gen_range(5.0..15.0),
            carbon_content: self.rng.gen_range(85.0..92.0),
            ph: self.rng.gen_range(8.5..10.5),
            quality_score: self.rng.gen_range(85.0..95.0),
            gps: format!(
                "-6.{}, -76.{}",
                self.rng.gen_range(1000..=9999),
                self.rng.gen_range(1000..=9999)
            ),
        };
        self.iot_data.push(reading.clone());
        reading
    }

    /// Turns `waste_kg` of waste delivered by `farmer` into biochar and mints
    /// the resulting credits. Without a batch id one is generated.
    pub fn process_agricultural_waste(
        &mut self,
        farmer: &str,
        waste_kg: Decimal,
        batch_id: Option<String>,
    ) -> Result<ProcessingRecord, token::Error> {
        let batch_id = match batch_id {
            Some(batch_id) => batch_id,
            None => format!(
                "batch_{}_{}",
                Utc::now().timestamp(),
                self.rng.gen_range(1000..=9999)
            ),
        };
        let reading = self.simulate_iot_reading(&batch_id);
        let biochar = waste_kg * BIOCHAR_YIELD;
        let co2 = biochar * CO2_PER_KG_BIOCHAR;

        let tokens = self.ledger.mint_carbon_credit(
            MintRequest {
                farmer: farmer.to_string(),
                amount: co2,
                batch_id: batch_id.clone(),
                gps_location: reading.gps,
                methodology: METHODOLOGY.to_string(),
                ipfs_hash: ipfs_hash(&batch_id),
                biochar_mass: biochar,
                // Truncated like the sensor firmware reports it.
                quality_score: reading.quality_score as u32,
            },
            token::OWNER,
        )?;

        let record = ProcessingRecord {
            batch_id,
            farmer: farmer.to_string(),
            waste_input: waste_kg,
            biochar_output: biochar,
            co2_sequestered: co2,
            tokens_minted: tokens,
            quality: reading.quality_score,
            timestamp: Utc::now(),
        };
        self.history.push(record.clone());
        Ok(record)
    }

    /// Splits the pilot volume evenly over `batches` batches, each delivered
    /// by a random farmer. Failed batches are logged and skipped.
    pub fn simulate_pilot_program(&mut self, batches: usize) -> Vec<ProcessingRecord> {
        if batches == 0 {
            return Vec::new();
        }
        let waste_per_batch =
            Decimal::from(PILOT_TONNES) * Decimal::ONE_THOUSAND / Decimal::from(batches);

        let mut processed = Vec::with_capacity(batches);
        for _ in 0..batches {
            let farmer = self.farmers[self.rng.gen_range(0..self.farmers.len())].clone();
            match self.process_agricultural_waste(&farmer, waste_per_batch, None) {
                Ok(record) => processed.push(record),
                Err(err) => tracing::warn!(%farmer, ?err, "batch rejected"),
            }
        }
        processed
    }

    /// `None` until at least one batch was processed.
    pub fn analytics(&self) -> Option<Analytics> {
        if self.history.is_empty() {
            return None;
        }
        let qualities = self.history.iter().map(|record| record.quality);
        let efficiency = self
            .history
            .iter()
            .filter_map(|record| (record.biochar_output / record.waste_input).to_f64())
            .sum::<f64>();
        let cumulative_co2 = self
            .history
            .iter()
            .scan(Decimal::ZERO, |total, record| {
                *total += record.co2_sequestered;
                Some(*total)
            })
            .collect();
        let batches = self.history.len();

        Some(Analytics {
            batches,
            mean_quality: qualities.clone().sum::<f64>() / batches as f64,
            min_quality: qualities.clone().fold(f64::INFINITY, f64::min),
            max_quality: qualities.fold(f64::NEG_INFINITY, f64::max),
            total_tokens: self.history.iter().map(|record| record.tokens_minted).sum(),
            mean_efficiency: efficiency / batches as f64,
            cumulative_co2,
        })
    }
}

/// Content address under which the batch documentation is published.
pub fn ipfs_hash(batch_id: &str) -> String {
    let digest = const_hex::encode(Sha256::digest(batch_id.as_bytes()));
    format!("Qm{}", &digest[..44])
}

use {
    crate::chain::{ContractHandle, ContractKind},
    alloy::primitives::Address,
    chrono::{DateTime, SecondsFormat, Utc},
    serde::{Deserialize, Serialize, Serializer},
};

pub const DEFAULT_NETWORK: &str = "lacchain_testnet";

/// Summary of one deployment run. The JSON representation is read by other
/// tools by literal key paths, so the field names must not change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
    pub network: String,
    pub deployer: Address,
    pub trusted_forwarder: Address,
    pub lacnet_features: LacnetFeatures,
    pub contracts: ContractAddresses,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LacnetFeatures {
    pub base_relay_recipient: bool,
    pub meta_transactions: bool,
    pub gasless_transactions: bool,
}

impl LacnetFeatures {
    /// Every contract inherits from `BaseRelayRecipient`.
    pub const ENABLED: Self = Self {
        base_relay_recipient: true,
        meta_transactions: true,
        gasless_transactions: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContractAddresses {
    pub simple_greeting: Address,
    pub simple_storage: Address,
    pub eco_carbon_token: Address,
}

impl ContractAddresses {
    pub fn address(&self, kind: ContractKind) -> Address {
        match kind {
            ContractKind::SimpleGreeting => self.simple_greeting,
            ContractKind::SimpleStorage => self.simple_storage,
            ContractKind::EcoCarbonToken => self.eco_carbon_token,
        }
    }

    pub fn handle(&self, kind: ContractKind) -> ContractHandle {
        ContractHandle::new(kind, self.address(kind))
    }
}

/// Same shape as JavaScript's `Date.toISOString()`.
fn serialize_millis<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn record() -> DeploymentRecord {
        DeploymentRecord {
            timestamp: DateTime::from_timestamp(1_736_899_200, 0).unwrap(),
            network: DEFAULT_NETWORK.to_string(),
            deployer: Address::repeat_byte(0x11),
            trusted_forwarder: Address::repeat_byte(0x22),
            lacnet_features: LacnetFeatures::ENABLED,
            contracts: ContractAddresses {
                simple_greeting: Address::repeat_byte(0x33),
                simple_storage: Address::repeat_byte(0x44),
                eco_carbon_token: Address::repeat_byte(0x55),
            },
        }
    }

    #[test]
    fn serializes_with_stable_keys() {
        let value = serde_json::to_value(record()).unwrap();

        assert_eq!(value["network"], "lacchain_testnet");
        assert_eq!(value["timestamp"], "2025-01-15T00:00:00.000Z");
        assert_eq!(
            value["lacnetFeatures"],
            json!({
                "baseRelayRecipient": true,
                "metaTransactions": true,
                "gaslessTransactions": true,
            })
        );
        let contracts = value["contracts"].as_object().unwrap();
        let mut keys: Vec<_> = contracts.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, ["EcoCarbonToken", "SimpleGreeting", "SimpleStorage"]);
        for key in ["deployer", "trustedForwarder"] {
            assert!(value[key].as_str().unwrap().starts_with("0x"));
        }
    }

    #[test]
    fn timestamps_have_millisecond_precision() {
        let record = DeploymentRecord {
            timestamp: DateTime::from_timestamp(1_736_899_200, 123_456_789).unwrap(),
            ..record()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2025-01-15T00:00:00.123Z");

        let parsed: DeploymentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.timestamp.timestamp_millis(), 1_736_899_200_123);
    }

    #[test]
    fn reads_records_written_by_hardhat_scripts() {
        let json = r#"{
          "timestamp": "2025-01-15T00:00:00.000Z",
          "network": "lacchain_testnet",
          "deployer": "0x1111111111111111111111111111111111111111",
          "trustedForwarder": "0x2222222222222222222222222222222222222222",
          "lacnetFeatures": {
            "baseRelayRecipient": true,
            "metaTransactions": true,
            "gaslessTransactions": true
          },
          "contracts": {
            "SimpleGreeting": "0x3333333333333333333333333333333333333333",
            "SimpleStorage": "0x4444444444444444444444444444444444444444",
            "EcoCarbonToken": "0x5555555555555555555555555555555555555555"
          }
        }"#;

        let parsed: DeploymentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn handles_follow_contract_kinds() {
        let contracts = record().contracts;
        assert_eq!(
            contracts.handle(ContractKind::SimpleStorage),
            ContractHandle::new(ContractKind::SimpleStorage, Address::repeat_byte(0x44))
        );
        assert_eq!(
            contracts.address(ContractKind::EcoCarbonToken),
            Address::repeat_byte(0x55)
        );
    }
}

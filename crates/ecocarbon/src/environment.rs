//! Validation of the LACChain environment.
//!
//! All values are read exactly once into an [`EnvironmentConfig`] which is
//! then passed to every operation that needs it.

use {
    crate::Error,
    chrono::{DateTime, Utc},
    shared_arguments::{display_option, display_secret_option},
    std::fmt::{self, Display, Formatter},
};

pub const DEFAULT_RPC_URL: &str = "https://writer.lacchain.net";

/// `0x` followed by 64 hex characters.
pub const PRIVATE_KEY_LENGTH: usize = 66;

/// Transactions expire one day after the tools were started unless
/// configured otherwise.
pub const DEFAULT_EXPIRATION_SECS: u64 = 86_400;

#[derive(clap::Parser, Clone, Default)]
#[group(skip)]
pub struct Arguments {
    /// JSON-RPC endpoint of the LACChain writer node.
    #[clap(long, env, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Hex encoded private key of the deploying account.
    #[clap(long, env, hide_env_values = true)]
    pub private_key: Option<String>,

    /// Address of the trusted forwarder relaying meta-transactions.
    #[clap(long, env)]
    pub trusted_forwarder: Option<String>,

    /// Address of the LACChain node the transactions are sent through.
    #[clap(long, env)]
    pub node_address: Option<String>,

    /// Unix timestamp after which submitted transactions expire.
    #[clap(long, env)]
    pub expiration_time: Option<String>,

    /// Identity of the LACChain signer.
    #[clap(long, env)]
    pub lacchain_signer: Option<String>,
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            rpc_url,
            private_key,
            trusted_forwarder,
            node_address,
            expiration_time,
            lacchain_signer,
        } = self;

        writeln!(f, "rpc_url: {rpc_url}")?;
        display_secret_option(f, "private_key", private_key)?;
        display_option(f, "trusted_forwarder", trusted_forwarder)?;
        display_option(f, "node_address", node_address)?;
        display_option(f, "expiration_time", expiration_time)?;
        display_option(f, "lacchain_signer", lacchain_signer)?;
        Ok(())
    }
}

/// A validated private key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(SECRET)")
    }
}

impl std::str::FromStr for PrivateKey {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let well_formed = key.len() == PRIVATE_KEY_LENGTH
            && key
                .strip_prefix("0x")
                .is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(Error::Configuration(
                "invalid private key format, must be 64 hex characters with 0x prefix".into(),
            ));
        }
        Ok(Self(key.to_owned()))
    }
}

#[derive(Clone, Debug)]
pub struct EnvironmentConfig {
    pub rpc_url: String,
    pub node_address: Option<String>,
    /// Unix timestamp in seconds.
    pub expiration_timestamp: u64,
    pub signer_identity: Option<String>,
    pub private_key: PrivateKey,
    pub trusted_forwarder: Option<String>,
}

impl EnvironmentConfig {
    /// Validates the configuration. Only the private key is checked for its
    /// format, every other value is taken as is or replaced by its default.
    /// Blank values count as unset, an unfilled `.env` template leaves them
    /// empty.
    pub fn from_arguments(args: &Arguments, now: DateTime<Utc>) -> Result<Self, Error> {
        let private_key = args
            .private_key
            .as_deref()
            .ok_or_else(|| {
                Error::Configuration(
                    "PRIVATE_KEY is not set, must be 64 hex characters with 0x prefix".into(),
                )
            })?
            .parse::<PrivateKey>()?;

        let default_expiration =
            u64::try_from(now.timestamp()).unwrap_or_default() + DEFAULT_EXPIRATION_SECS;
        let expiration_timestamp = match args.expiration_time.as_deref().and_then(non_blank) {
            None => default_expiration,
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    value,
                    "EXPIRATION_TIME is not a unix timestamp, falling back to default"
                );
                default_expiration
            }),
        };

        let config = Self {
            rpc_url: non_blank(&args.rpc_url)
                .unwrap_or(DEFAULT_RPC_URL)
                .to_string(),
            node_address: optional(&args.node_address),
            expiration_timestamp,
            signer_identity: optional(&args.lacchain_signer),
            private_key,
            trusted_forwarder: optional(&args.trusted_forwarder),
        };
        tracing::info!(
            rpc_url = %config.rpc_url,
            node_address = ?config.node_address,
            expiration = ?config.expiration(),
            "LACChain environment configured"
        );
        Ok(config)
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.expiration_timestamp).ok()?, 0)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|value| !value.is_empty())
}

fn optional(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(non_blank).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn arguments(private_key: Option<&str>) -> Arguments {
        Arguments {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            private_key: private_key.map(str::to_owned),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_private_keys_of_wrong_length() {
        for key in ["", "0x", &KEY[..65], &format!("{KEY}0"), &KEY[2..]] {
            let result = EnvironmentConfig::from_arguments(&arguments(Some(key)), now());
            assert!(
                matches!(result, Err(Error::Configuration(_))),
                "accepted {key:?}"
            );
        }
    }

    #[test]
    fn rejects_missing_private_key() {
        let result = EnvironmentConfig::from_arguments(&arguments(None), now());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn rejects_non_hex_private_key() {
        let key = format!("0x{}", "z".repeat(64));
        let result = EnvironmentConfig::from_arguments(&arguments(Some(&key)), now());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn applies_defaults() {
        let config = EnvironmentConfig::from_arguments(&arguments(Some(KEY)), now()).unwrap();

        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.expiration_timestamp, 1_700_000_000 + 86_400);
        assert_eq!(config.private_key.as_str(), KEY);
        assert_eq!(config.node_address, None);
        assert_eq!(config.signer_identity, None);
        assert_eq!(config.trusted_forwarder, None);
    }

    #[test]
    fn takes_configured_values() {
        let args = Arguments {
            rpc_url: "http://localhost:8545".to_string(),
            private_key: Some(KEY.to_string()),
            trusted_forwarder: Some("0xa4B5eE2438A7a2e6E4d4F7a5C4b6a1A9aD6F3D12".to_string()),
            node_address: Some("0xd00e6624a73f88b39f82ab34e8bf2b4d226fd768".to_string()),
            expiration_time: Some("1736899200".to_string()),
            lacchain_signer: Some("did:lac:main:signer".to_string()),
        };
        let config = EnvironmentConfig::from_arguments(&args, now()).unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.expiration_timestamp, 1_736_899_200);
        assert_eq!(
            config.expiration(),
            DateTime::from_timestamp(1_736_899_200, 0)
        );
        assert_eq!(config.signer_identity.as_deref(), Some("did:lac:main:signer"));
        assert!(config.trusted_forwarder.is_some());
        assert!(config.node_address.is_some());
    }

    #[test]
    fn unparsable_expiration_falls_back_to_default() {
        let args = Arguments {
            expiration_time: Some("tomorrow".to_string()),
            ..arguments(Some(KEY))
        };
        let config = EnvironmentConfig::from_arguments(&args, now()).unwrap();
        assert_eq!(config.expiration_timestamp, 1_700_000_000 + 86_400);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let args = Arguments {
            rpc_url: String::new(),
            private_key: Some(KEY.to_string()),
            trusted_forwarder: Some(String::new()),
            node_address: Some("  ".to_string()),
            expiration_time: Some(String::new()),
            lacchain_signer: Some(String::new()),
        };
        let config = EnvironmentConfig::from_arguments(&args, now()).unwrap();

        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.expiration_timestamp, 1_700_000_000 + 86_400);
        assert_eq!(config.node_address, None);
        assert_eq!(config.signer_identity, None);
        assert_eq!(config.trusted_forwarder, None);
    }

    #[test]
    fn values_are_trimmed() {
        let args = Arguments {
            rpc_url: " http://localhost:8545 ".to_string(),
            expiration_time: Some(" 1736899200\n".to_string()),
            ..arguments(Some(KEY))
        };
        let config = EnvironmentConfig::from_arguments(&args, now()).unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.expiration_timestamp, 1_736_899_200);
    }

    #[test]
    fn never_prints_private_key() {
        let config = EnvironmentConfig::from_arguments(&arguments(Some(KEY)), now()).unwrap();
        assert!(!format!("{config:?}").contains(&KEY[2..]));
        assert!(!arguments(Some(KEY)).to_string().contains(&KEY[2..]));
        assert!(arguments(Some(KEY)).to_string().contains("private_key: SECRET"));
    }
}

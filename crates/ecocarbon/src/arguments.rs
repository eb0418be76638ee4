use {
    crate::{chain::rpc::Gas, record::DEFAULT_NETWORK, store::DEFAULT_PATH},
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
    },
};

shared_arguments::logging_args_with_default_filter!(
    LoggingArguments,
    "warn,ecocarbon=info,contracts=info"
);

/// Command line arguments shared by the `deploy` and `interact` binaries.
#[derive(clap::Parser)]
#[group(skip)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    #[clap(flatten)]
    pub environment: crate::environment::Arguments,

    /// Directory containing the hardhat build artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// File the deployment record is written to and read from.
    #[clap(long, env, default_value = DEFAULT_PATH)]
    pub deployment_file: PathBuf,

    /// Network name stored in the deployment record.
    #[clap(long, env, default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Gas price in wei. LACChain does not charge for gas.
    #[clap(long, env, default_value = "0")]
    pub gas_price: u128,

    #[clap(long, env, default_value = "15000000")]
    pub gas_limit: u64,
}

impl Arguments {
    pub fn gas(&self) -> Gas {
        Gas {
            price: self.gas_price,
            limit: self.gas_limit,
        }
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            environment,
            artifacts_dir,
            deployment_file,
            network,
            gas_price,
            gas_limit,
        } = self;

        write!(f, "{logging}")?;
        write!(f, "{environment}")?;
        writeln!(f, "artifacts_dir: {}", artifacts_dir.display())?;
        writeln!(f, "deployment_file: {}", deployment_file.display())?;
        writeln!(f, "network: {network}")?;
        writeln!(f, "gas_price: {gas_price}")?;
        writeln!(f, "gas_limit: {gas_limit}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        clap::{CommandFactory, Parser},
        shared_arguments::LevelFilter,
    };

    #[test]
    fn command_is_well_formed() {
        Arguments::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Arguments::try_parse_from(["deploy"]).unwrap();

        assert_eq!(args.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(args.deployment_file, PathBuf::from(DEFAULT_PATH));
        assert_eq!(args.network, "lacchain_testnet");
        assert_eq!(args.gas(), Gas::default());
        assert_eq!(args.logging.log_stderr_threshold, LevelFilter::ERROR);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Arguments::try_parse_from([
            "deploy",
            "--rpc-url",
            "http://localhost:8545",
            "--gas-limit",
            "8000000",
            "--network",
            "lacchain_mainnet",
            "--private-key",
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        ])
        .unwrap();

        assert_eq!(args.environment.rpc_url, "http://localhost:8545");
        assert_eq!(args.gas().limit, 8_000_000);
        assert_eq!(args.network, "lacchain_mainnet");

        let printed = args.to_string();
        assert!(printed.contains("private_key: SECRET"));
        assert!(!printed.contains("4c0883a6"));
        assert!(printed.contains("gas_limit: 8000000"));
    }
}

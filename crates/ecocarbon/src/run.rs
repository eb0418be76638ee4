//! Entry points of the binaries.

use {
    crate::{
        Error,
        arguments::Arguments,
        chain::rpc::RpcChain,
        deploy,
        environment::EnvironmentConfig,
        interact,
        store::{DeploymentStore, FileDeploymentStore},
    },
    chrono::Utc,
    clap::Parser,
};

/// Loads `.env`, parses the arguments and installs the tracing subscriber.
fn setup(args: impl Iterator<Item = String>, binary: &str) -> Arguments {
    // A missing .env file is fine, the values may come from the environment.
    dotenv::dotenv().ok();
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::info!("running {binary} with validated arguments:\n{args}");
    args
}

fn connect(args: &Arguments) -> Result<(EnvironmentConfig, RpcChain), Error> {
    let config = EnvironmentConfig::from_arguments(&args.environment, Utc::now())?;
    let chain = RpcChain::connect(&config, args.artifacts_dir.clone(), args.gas())?;
    Ok((config, chain))
}

pub async fn deploy(args: impl Iterator<Item = String>) {
    let args = setup(args, "deploy");
    let store = FileDeploymentStore::new(args.deployment_file.clone());

    let result = match connect(&args) {
        Ok((config, chain)) => deploy::deploy(&chain, &store, &config, &args.network).await,
        Err(err) => Err(err),
    };
    match result {
        Ok(record) => {
            tracing::info!(
                path = %store.path().display(),
                "LACNet deployment completed successfully, run interact next"
            );
            tracing::debug!(?record);
        }
        Err(err) => {
            deploy::report_failure(&err);
            std::process::exit(1);
        }
    }
}

pub async fn interact(args: impl Iterator<Item = String>) {
    let args = setup(args, "interact");
    let store = FileDeploymentStore::new(args.deployment_file.clone());

    let result = async {
        let record = store.load().await?;
        let (_, chain) = connect(&args)?;
        interact::interact(&chain, &record).await
    }
    .await;
    match result {
        Ok(report) => {
            tracing::info!(greeting = %report.greeting, "all interactions completed successfully");
        }
        Err(err) => {
            interact::report_failure(&err);
            std::process::exit(1);
        }
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use ethers::prelude::{Http, LocalWallet, Middleware, Provider, Signer, SignerMiddleware};
use ethers::types::Address;
use ethers::utils::to_checksum;
use log::info;

use fundme_deploy::artifact::{ContractArtifact, VerificationSource};
use fundme_deploy::{
    ActiveNetwork, ConfigManager, DeployConfig, DeploymentOrchestrator, DeploymentRun, EthersDeployer,
    EtherscanClient, FileDeploymentStore, RunReport, RunState, VerificationService,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Deploy FundMe and verify it on Etherscan", long_about = None)]
struct Args {
    /// Network to deploy to
    #[arg(short, long, default_value = "localhost")]
    network: String,

    /// JSON-RPC endpoint, overriding the network's configured one
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Deployer private key. Without one the node's first account is used.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Explorer API key. Verification is skipped without one.
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    etherscan_api_key: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Confirmations to wait for on live networks
    #[arg(long)]
    confirmations: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => DeployConfig::default(),
    };
    let registry = config.registry();

    let network_config = registry.find_by_name(&args.network).cloned();
    let rpc_url = args
        .rpc_url
        .clone()
        .or_else(|| network_config.as_ref().and_then(|c| c.rpc_url.clone()))
        .ok_or_else(|| anyhow!("No RPC URL for {}; pass --rpc-url or set RPC_URL", args.network))?;

    let provider = Provider::<Http>::try_from(rpc_url.as_str())
        .with_context(|| format!("Invalid RPC URL {}", rpc_url))?;
    let chain_id = provider
        .get_chainid()
        .await
        .with_context(|| format!("Failed to reach {}", rpc_url))?
        .as_u64();

    if let Some(expected) = network_config.as_ref().map(|c| c.chain_id) {
        if expected != chain_id {
            bail!("{} is configured as chain {} but the node reports chain {}", args.network, expected, chain_id);
        }
    }

    let mut network = ActiveNetwork::new(chain_id, args.network.clone());
    network.block_confirmations = registry.config_for(chain_id).ok().and_then(|c| c.block_confirmations);

    let artifact = ContractArtifact::load(&config.artifacts_dir, &config.contract_name)?;

    let report = match &args.private_key {
        Some(key) => {
            let wallet = key.parse::<LocalWallet>()?.with_chain_id(chain_id);
            let deployer = wallet.address();
            let client = Arc::new(SignerMiddleware::new(provider, wallet));
            run(client, deployer, artifact, &config, &args, &network).await?
        }
        None => {
            // Local nodes expose unlocked accounts; the first one deploys
            let deployer = *provider
                .get_accounts()
                .await?
                .first()
                .ok_or_else(|| anyhow!("{} has no unlocked accounts; pass --private-key", args.network))?;
            run(Arc::new(provider), deployer, artifact, &config, &args, &network).await?
        }
    };

    info!(
        "{} at {} ({:?})",
        report.deployment.contract_name,
        to_checksum(&report.deployment.address, None),
        report.state
    );
    if let RunState::VerificationFailed(reason) = &report.state {
        info!("Verify manually later; deployment succeeded regardless: {}", reason);
    }

    Ok(())
}

async fn run<M: Middleware + 'static>(
    client: Arc<M>,
    deployer: Address,
    artifact: ContractArtifact,
    config: &DeployConfig,
    args: &Args,
    network: &ActiveNetwork,
) -> Result<RunReport> {
    let development_chains = config.development_chains();
    let has_key = args
        .etherscan_api_key
        .as_deref()
        .map_or(false, |key| !key.trim().is_empty());
    let will_verify = !development_chains.contains(&network.name) && has_key;

    // Resolve verification input before anything is sent so a deployment
    // never lands with a verification that could not have been prepared
    let source = if will_verify {
        artifact
            .verification_source()
            .context("Verification preflight failed")?
    } else {
        VerificationSource::default()
    };

    let mut explorer = EtherscanClient::new(source)?.with_polling(
        config.verification_poll_interval(),
        config.verification_max_status_checks,
    );
    if let Some(url) = config
        .registry()
        .config_for(network.chain_id)
        .ok()
        .and_then(|c| c.explorer_api_url.clone())
    {
        explorer = explorer.with_base_url(url);
    }

    let orchestrator = DeploymentOrchestrator::new(
        config.registry(),
        development_chains.clone(),
        EthersDeployer::new(client, artifact, config.confirmation_timeout()),
        FileDeploymentStore::new(&config.deployments_dir),
    )
    .with_contract_name(config.contract_name.clone())
    .with_mock_name(config.mock_name.clone());

    let verifier = VerificationService::new(explorer, args.etherscan_api_key.clone(), development_chains);

    let report = DeploymentRun::new(orchestrator, verifier)
        .execute(network, deployer, args.confirmations)
        .await?;
    Ok(report)
}

//! accord daemon — spins up an in-process multi-party network and drives
//! issue/transfer scenarios from the command line.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;

use accord_node::{
    init_logging, IdentityDirectory, InProcessNetwork, InProcessNotary, LogFormat, Node,
    NodeConfig,
};
use accord_types::Commodity;

#[derive(Parser)]
#[command(name = "accord-daemon", about = "accord token protocol demo network")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags override them.
    #[arg(long)]
    config: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ACCORD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ACCORD_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the issue → transfer demo across a set of in-process parties.
    Demo {
        /// Party names, comma-separated. The first party issues; the token
        /// is then transferred to the second.
        #[arg(long, value_delimiter = ',', default_value = "PartyA,PartyB,PartyC")]
        parties: Vec<String>,

        /// Quantity to issue, in the commodity's smallest unit.
        #[arg(long, default_value_t = 100)]
        quantity: u128,

        /// Commodity ticker code.
        #[arg(long, default_value = "GOLD")]
        commodity: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => NodeConfig::default(),
    };
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let format_name = cli.log_format.as_deref().unwrap_or(&config.log_format);
    let format = LogFormat::parse(format_name)
        .with_context(|| format!("unknown log format {format_name:?}"))?;
    init_logging(format, level);

    match cli.command {
        Command::Demo {
            parties,
            quantity,
            commodity,
        } => demo(&config, &parties, quantity, &commodity).await,
    }
}

async fn demo(
    config: &NodeConfig,
    parties: &[String],
    quantity: u128,
    commodity_code: &str,
) -> anyhow::Result<()> {
    if parties.len() < 2 {
        bail!("the demo needs at least two parties, got {}", parties.len());
    }

    let network = Arc::new(InProcessNetwork::new());
    let notary = Arc::new(InProcessNotary::new());
    let directory = Arc::new(IdentityDirectory::new());

    let mut nodes = Vec::new();
    for name in parties {
        let node = Node::start(
            name,
            accord_crypto::generate_keypair(),
            Arc::clone(&network),
            notary.clone(),
            Arc::clone(&directory),
            config.flow,
        )
        .with_context(|| format!("starting node {name}"))?;
        nodes.push(node);
    }
    let issuer = &nodes[0];
    let recipient = &nodes[1];
    tracing::info!(parties = nodes.len(), "demo network up");

    println!(
        "network up: {}",
        issuer
            .peers()
            .iter()
            .map(|p| p.name.as_str().to_string())
            .chain([issuer.whoami().name.as_str().to_string()])
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Issue to the first party.
    let commodity = Commodity::new(commodity_code, commodity_code);
    let issued = issuer
        .issue(quantity, commodity)
        .await
        .context("issue failed")?;
    println!(
        "issued: transaction {} committed at {}",
        issued.id, issued.committed_at
    );
    print_records("issuer vault", issuer.as_ref())?;

    // Transfer to the second party.
    let linear_id = issued.tx.proposal.outputs[0].linear_id;
    let transferred = issuer
        .transfer(linear_id, recipient.whoami().name.as_str())
        .await
        .context("transfer failed")?;
    println!(
        "transferred: transaction {} committed at {} ({} signatures)",
        transferred.id,
        transferred.committed_at,
        transferred.tx.signatures.len()
    );

    // Give the recipient's responder a moment to record the distribution.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    print_records("issuer vault", issuer.as_ref())?;
    print_records("recipient vault", recipient.as_ref())?;

    // A second transfer attempt by the old owner must fail loudly.
    match issuer
        .transfer(linear_id, recipient.whoami().name.as_str())
        .await
    {
        Ok(_) => bail!("a non-owner transfer unexpectedly committed"),
        Err(error) => println!("expected failure for non-owner re-transfer: {error}"),
    }

    for node in &nodes {
        node.shutdown();
    }
    Ok(())
}

fn print_records(label: &str, node: &Node) -> anyhow::Result<()> {
    let records: Vec<_> = node
        .live_records()?
        .into_iter()
        .map(|(reference, state)| {
            json!({
                "ref": reference.to_string(),
                "linear_id": state.linear_id.to_string(),
                "amount": state.amount.to_string(),
                "owner": state.owner.name.as_str(),
            })
        })
        .collect();
    println!("{label}: {}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

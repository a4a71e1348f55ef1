//! CLI harness for the Avalanche wallet SDK
//!
//! This tool allows:
//! - Generating and inspecting keys
//! - CB58 encoding and decoding
//! - Decoding signed transactions
//! - Building and signing an export offline from raw UTXOs
//! - Running an export/import round trip against an in-memory node

use avax_client::{ChainWallet, MemoryNode};
use avax_core::{
    cb58, AddressInput, ChainContext, KeyChain, KeyPair, RawUtxo, SpendOptions, Tx, TxBuilder,
    Utxo, UtxoSet,
};
use avax_params::{ChainAlias, Network, ONE_AVAX};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "avax-harness")]
#[command(about = "Avalanche wallet SDK harness", long_about = None)]
struct Cli {
    /// Preset network (mainnet, fuji, local)
    #[arg(short, long, global = true, default_value = "local")]
    network: String,

    /// Custom network JSON, overrides --network
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh key
    Keygen,

    /// Show the addresses of a private key
    Address {
        /// `PrivateKey-...` string
        key: String,
    },

    /// CB58 encode or decode
    Cb58 {
        #[command(subcommand)]
        action: Cb58Action,
    },

    /// Decode a signed transaction (CB58 or 0x hex)
    DecodeTx {
        /// Chain the transaction belongs to
        #[arg(short, long, default_value = "X")]
        chain: ChainAlias,

        /// Encoded transaction
        tx: String,
    },

    /// Build and sign an export from raw UTXOs without touching a node
    BuildExport {
        /// `PrivateKey-...` string that owns the UTXOs
        #[arg(short, long)]
        key: String,

        /// Source chain (X or P)
        #[arg(short, long, default_value = "X")]
        source: ChainAlias,

        /// Destination chain
        #[arg(short, long, default_value = "P")]
        destination: ChainAlias,

        /// Amount in nAVAX
        #[arg(short, long)]
        amount: u64,

        /// Recipient address on the destination chain
        #[arg(short, long)]
        to: String,

        /// Encoded UTXOs to spend
        #[arg(short, long, required = true)]
        utxo: Vec<String>,
    },

    /// Export from X to P and import it back against an in-memory node
    Simulate {
        /// Starting balance in AVAX
        #[arg(short, long, default_value = "10")]
        balance: u64,

        /// Amount to move in AVAX
        #[arg(short, long, default_value = "1")]
        amount: u64,

        /// UTXO page size
        #[arg(short, long, default_value = "1024")]
        page_size: u32,
    },
}

#[derive(Subcommand)]
enum Cb58Action {
    /// Hex bytes to CB58
    Encode { hex: String },
    /// CB58 to hex bytes
    Decode { value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let network = match &cli.config {
        Some(path) => Network::from_file(path)?,
        None => Network::from_name(&cli.network)?,
    };
    info!("Network: {} (ID {})", network.name, network.network_id);

    match cli.command {
        Commands::Keygen => {
            let key = KeyPair::generate()?;
            print_key(&network, &key)?;
        }
        Commands::Address { key } => {
            let key = KeyPair::from_private_key_string(&key)?;
            print_key(&network, &key)?;
        }
        Commands::Cb58 { action } => match action {
            Cb58Action::Encode { hex } => {
                let bytes = hex::decode(hex.trim_start_matches("0x"))?;
                println!("{}", cb58::encode(&bytes));
            }
            Cb58Action::Decode { value } => {
                println!("0x{}", hex::encode(cb58::decode(&value)?));
            }
        },
        Commands::DecodeTx { chain, tx } => {
            run_decode_tx(chain, &tx)?;
        }
        Commands::BuildExport {
            key,
            source,
            destination,
            amount,
            to,
            utxo,
        } => {
            run_build_export(&network, &key, source, destination, amount, to, &utxo)?;
        }
        Commands::Simulate {
            balance,
            amount,
            page_size,
        } => {
            run_simulate(&network, balance, amount, page_size).await?;
        }
    }

    Ok(())
}

fn print_key(network: &Network, key: &KeyPair) -> anyhow::Result<()> {
    let summary = serde_json::json!({
        "privateKey": key.to_private_key_string(),
        "publicKey": format!("0x{}", hex::encode(key.public_key_bytes())),
        "x": key.address_string("X", &network.hrp)?,
        "p": key.address_string("P", &network.hrp)?,
        "c": key.address_string("C", &network.hrp)?,
        "eth": key.eth_address().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_decode_tx(chain: ChainAlias, encoded: &str) -> anyhow::Result<()> {
    let tx = Tx::from_string(avax_core::Codec::for_chain(chain), encoded)?;
    let consumed: serde_json::Map<String, serde_json::Value> = tx
        .unsigned
        .consumed()?
        .into_iter()
        .map(|(asset, amount)| (asset.to_string(), amount.into()))
        .collect();
    let produced: serde_json::Map<String, serde_json::Value> = tx
        .unsigned
        .produced()?
        .into_iter()
        .map(|(asset, amount)| (asset.to_string(), amount.into()))
        .collect();

    let summary = serde_json::json!({
        "txId": tx.tx_id()?.to_string(),
        "kind": format!("{:?}", tx.unsigned.kind()),
        "networkId": tx.unsigned.network_id(),
        "blockchainId": tx.unsigned.blockchain_id().to_string(),
        "credentials": tx.credentials.len(),
        "consumed": consumed,
        "produced": produced,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_build_export(
    network: &Network,
    key: &str,
    source: ChainAlias,
    destination: ChainAlias,
    amount: u64,
    to: String,
    utxos: &[String],
) -> anyhow::Result<()> {
    let ctx = ChainContext::from_network(network, source)?;
    let key = KeyPair::from_private_key_string(key)?;
    let owner = key.address();
    let mut keychain = KeyChain::new(&network.hrp, source.as_str());
    keychain.add_key(key);

    let mut set = UtxoSet::new(ctx.codec());
    let raws: Vec<RawUtxo> = utxos.iter().map(|s| RawUtxo::from(s.as_str())).collect();
    set.add_array(&raws, false)?;
    info!("Loaded {} UTXOs", set.len());

    let unsigned = TxBuilder::new(&ctx).build_export_tx(
        &set,
        amount,
        &ctx.avax_asset_id.into(),
        &ctx.chain_id(destination).into(),
        &[AddressInput::from(to)],
        &SpendOptions::new(vec![owner]),
    )?;
    let tx = Tx::sign(unsigned, &keychain)?;

    info!("Built export {} ({} credentials)", tx.tx_id()?, tx.credentials.len());
    println!("{}", tx.to_string_hex()?);
    Ok(())
}

async fn run_simulate(
    network: &Network,
    balance: u64,
    amount: u64,
    page_size: u32,
) -> anyhow::Result<()> {
    let node = MemoryNode::new(network)?;
    let key = KeyPair::generate()?;
    let owner = key.address();
    let mut keychain = KeyChain::new(&network.hrp, "X");
    keychain.add_key(key);

    let wallet = ChainWallet::new(node, network, keychain)?.with_page_size(page_size);
    let avax = wallet.context(ChainAlias::X).avax_asset_id;
    wallet
        .client()
        .add_utxo(
            ChainAlias::X,
            None,
            Utxo::test_transfer(1, avax, balance.saturating_mul(ONE_AVAX), owner),
        )
        .await;

    let export_id = wallet
        .export(
            ChainAlias::X,
            ChainAlias::P,
            amount.saturating_mul(ONE_AVAX),
            &[owner.into()],
        )
        .await?;
    info!("Export accepted: {}", export_id);

    let import_id = wallet.import(ChainAlias::P, ChainAlias::X).await?;
    info!("Import accepted: {}", import_id);

    for issued in wallet.client().issued().await {
        info!(
            "  {}-chain {:?} {}",
            issued.chain,
            issued.tx.unsigned.kind(),
            issued.tx_id
        );
    }
    Ok(())
}

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand, ValueEnum};
use contracts::utils::load_signer;
use lens_carbon_rust_sdk::config::CONFIG_PATH_ENV;
use lens_carbon_rust_sdk::operation::CallTarget;
use lens_carbon_rust_sdk::{
    CallBuilder, ContractRegistry, GasOverrides, Identity, LensCarbon, LensCarbonConfiguration,
    OperationKind, OperationParams, OperationReport, VerificationOutcome,
};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{Level, warn};

const DEFAULT_NETWORK: &str = "mumbai-sandbox";

#[derive(Parser, Debug)]
#[command(name = "lens-carbon", version, about = "Submit and verify Lens protocol operations")]
struct Cli {
    #[arg(long, global = true, env = CONFIG_PATH_ENV, default_value = "lens-carbon.json")]
    config: PathBuf,
    #[arg(long, global = true, default_value = DEFAULT_NETWORK)]
    network: String,
    #[arg(long = "as", global = true, value_enum, default_value_t = Signer::User, help = "Identity that signs the transaction")]
    signer: Signer,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(long, global = true)]
    gas_limit: Option<u64>,
    #[arg(long, global = true, help = "Gas price in wei")]
    gas_price: Option<u128>,
    #[arg(long, global = true, help = "Confirmation timeout in seconds")]
    timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Print the encoded call instead of sending it")]
    dry_run: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Signer {
    User,
    Collector,
    Governance,
}

impl From<Signer> for Identity {
    fn from(signer: Signer) -> Self {
        match signer {
            Signer::User => Identity::User,
            Signer::Collector => Identity::Collector,
            Signer::Governance => Identity::Governance,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Addresses of the identities whose keys are set.
    Accounts,
    CreateProfile {
        #[arg(long)]
        handle: String,
        /// Defaults to the signing address.
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        image_uri: Option<String>,
        #[arg(long)]
        follow_module: Option<String>,
        #[arg(long)]
        follow_nft_uri: Option<String>,
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    Post {
        #[arg(long)]
        profile_id: String,
        #[arg(long)]
        content_uri: String,
        #[arg(long)]
        collect_module: String,
        #[arg(long)]
        reference_module: Option<String>,
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    WhitelistCollectModule {
        #[arg(long)]
        collect_module: String,
        #[arg(long)]
        revoke: bool,
    },
    Collect {
        #[arg(long)]
        profile_id: String,
        #[arg(long)]
        pub_id: String,
        #[arg(long)]
        data: Option<String>,
    },
    Follow {
        #[arg(long = "profile-id", required = true)]
        profile_ids: Vec<String>,
    },
    Approve {
        #[arg(long)]
        currency: String,
        #[arg(long)]
        spender: String,
        #[arg(long)]
        amount: String,
    },
    ShowProfile {
        #[arg(long)]
        handle: String,
    },
    ShowPublication {
        #[arg(long)]
        profile_id: String,
        #[arg(long)]
        pub_id: String,
        #[arg(long, help = "Also fetch the metadata document")]
        metadata: bool,
    },
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Serialize)]
struct ReportOut {
    operation: String,
    state: String,
    target: String,
    tx_hash: String,
    success: bool,
    block_number: Option<u64>,
    gas_used: Option<u64>,
    verification: Option<VerificationOutcome>,
}

impl From<&OperationReport> for ReportOut {
    fn from(report: &OperationReport) -> Self {
        let receipt = report.submission.receipt();
        ReportOut {
            operation: report.submission.kind().to_string(),
            state: format!("{:?}", report.state),
            target: report.submission.target().to_string(),
            tx_hash: report.submission.tx_hash().to_string(),
            success: report.submission.success(),
            block_number: receipt.map(|receipt| receipt.block_number),
            gas_used: receipt.map(|receipt| receipt.gas_used),
            verification: report.verification.clone(),
        }
    }
}

#[derive(Serialize)]
struct AccountOut {
    identity: String,
    env: String,
    address: Option<String>,
}

#[derive(Serialize)]
struct DryRunOut {
    operation: String,
    target: String,
    calldata: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| Level::from_str(&level).ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = LensCarbonConfiguration::from_file(&cli.config)?;
    if let Some(timeout) = cli.timeout_secs {
        config.submission.confirmation_timeout_secs = timeout;
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let overrides = GasOverrides {
        gas_limit: cli.gas_limit,
        gas_price: cli.gas_price,
    };

    if let Commands::Accounts = cli.command {
        let accounts = [Identity::User, Identity::Collector, Identity::Governance]
            .into_iter()
            .map(|identity| AccountOut {
                identity: identity.to_string(),
                env: config.identities.env_var(identity).to_string(),
                address: config
                    .identities
                    .load_key(identity)
                    .ok()
                    .and_then(|key| load_signer(key.expose()).ok())
                    .map(|signer| signer.address().to_string()),
            })
            .collect::<Vec<_>>();
        return print_out(cli.json, &accounts, |account| {
            format!(
                "{}\t{}\t{}",
                account.identity,
                account.env,
                account.address.as_deref().unwrap_or("not set")
            )
        });
    }

    if cli.dry_run {
        let Some((kind, params)) = operation(&cli.command, None) else {
            anyhow::bail!("--dry-run only applies to write commands");
        };
        let registry = ContractRegistry::new(config.networks.clone());
        let request = CallBuilder::new(&registry, &cli.network).build(kind, &params)?;
        let target = match request.target() {
            CallTarget::Named(name) => registry.resolve(name, &cli.network)?,
            CallTarget::Address(address) => address,
        };
        let out = DryRunOut {
            operation: kind.to_string(),
            target: target.to_string(),
            calldata: format!("0x{}", hex::encode(request.call_data())),
        };
        return print_one(cli.json, out, |out| {
            format!("{}\t{}\t{}", out.operation, out.target, out.calldata)
        });
    }

    let lens = LensCarbon::connect(config, &cli.network, cli.signer.into(), &cancel).await?;

    match &cli.command {
        Commands::ShowProfile { handle } => {
            let Some(profile_id) = lens.profile_id_by_handle(handle, &cancel).await? else {
                anyhow::bail!("no profile registered for `{}`", handle);
            };
            let owner = lens.profile_owner(profile_id, &cancel).await?;

            #[derive(Serialize)]
            struct ProfileOut {
                handle: String,
                profile_id: String,
                owner: String,
            }
            let out = ProfileOut {
                handle: lens.network()?.full_handle(handle),
                profile_id: profile_id.to_string(),
                owner: owner.to_string(),
            };
            print_one(cli.json, out, |out| {
                format!("{}\t{}\t{}", out.handle, out.profile_id, out.owner)
            })
        }
        Commands::ShowPublication {
            profile_id,
            pub_id,
            metadata,
        } => {
            let profile_id = U256::from_str(profile_id)?;
            let pub_id = U256::from_str(pub_id)?;
            let publication = lens.publication(profile_id, pub_id, &cancel).await?;
            let metadata = if *metadata {
                Some(lens.publication_metadata(profile_id, pub_id, &cancel).await?)
            } else {
                None
            };

            #[derive(Serialize)]
            struct PublicationOut {
                content_uri: String,
                collect_module: String,
                collect_nft: String,
                reference_module: String,
                metadata: Option<api::types::publication_metadata::PublicationMetadata>,
            }
            let out = PublicationOut {
                content_uri: publication.contentURI,
                collect_module: publication.collectModule.to_string(),
                collect_nft: publication.collectNFT.to_string(),
                reference_module: publication.referenceModule.to_string(),
                metadata,
            };
            print_one(cli.json, out, |out| {
                let content = out
                    .metadata
                    .as_ref()
                    .and_then(|metadata| metadata.content.clone())
                    .unwrap_or_default();
                format!(
                    "{}\t{}\t{}\t{}",
                    out.content_uri, out.collect_module, out.collect_nft, content
                )
            })
        }
        command => {
            let Some((kind, params)) = operation(command, Some(lens.sender())) else {
                anyhow::bail!("`{:?}` is not a write command", command);
            };
            let report = match kind {
                OperationKind::CreateProfile => lens.create_profile(&params, &overrides, &cancel).await?,
                OperationKind::Post => lens.post(&params, &overrides, &cancel).await?,
                OperationKind::WhitelistCollectModule => {
                    lens.whitelist_collect_module(&params, &overrides, &cancel).await?
                }
                OperationKind::Collect => lens.collect(&params, &overrides, &cancel).await?,
                OperationKind::Follow => lens.follow(&params, &overrides, &cancel).await?,
                OperationKind::ApproveCurrency => {
                    lens.approve_currency(&params, &overrides, &cancel).await?
                }
            };

            print_one(cli.json, ReportOut::from(&report), |out| {
                let verification = match &out.verification {
                    Some(outcome) if outcome.matched => "verified".to_string(),
                    Some(outcome) => format!("mismatch: observed {}", outcome.observed),
                    None => "unverified".to_string(),
                };
                format!(
                    "{}\t{}\tblock {}\t{}",
                    out.operation,
                    out.tx_hash,
                    out.block_number.unwrap_or_default(),
                    verification
                )
            })
        }
    }
}

/// Maps a write command to its operation. `sender` fills in `to` for
/// profile creation when it is omitted.
fn operation(command: &Commands, sender: Option<Address>) -> Option<(OperationKind, OperationParams)> {
    let mut params = OperationParams::new();
    let kind = match command {
        Commands::CreateProfile {
            handle,
            to,
            image_uri,
            follow_module,
            follow_nft_uri,
            params: extra,
        } => {
            params.insert("handle", handle.as_str());
            if let Some(to) = to.clone().or_else(|| sender.map(|sender| sender.to_string())) {
                params.insert("to", to);
            }
            insert_optional(&mut params, "imageURI", image_uri);
            insert_optional(&mut params, "followModule", follow_module);
            insert_optional(&mut params, "followNFTURI", follow_nft_uri);
            for (key, value) in extra {
                params.insert(key.as_str(), value.as_str());
            }
            OperationKind::CreateProfile
        }
        Commands::Post {
            profile_id,
            content_uri,
            collect_module,
            reference_module,
            params: extra,
        } => {
            params.insert("profileId", profile_id.as_str());
            params.insert("contentURI", content_uri.as_str());
            params.insert("collectModule", collect_module.as_str());
            insert_optional(&mut params, "referenceModule", reference_module);
            for (key, value) in extra {
                params.insert(key.as_str(), value.as_str());
            }
            OperationKind::Post
        }
        Commands::WhitelistCollectModule {
            collect_module,
            revoke,
        } => {
            params.insert("collectModule", collect_module.as_str());
            params.insert("whitelist", (!revoke).to_string());
            OperationKind::WhitelistCollectModule
        }
        Commands::Collect {
            profile_id,
            pub_id,
            data,
        } => {
            params.insert("profileId", profile_id.as_str());
            params.insert("pubId", pub_id.as_str());
            insert_optional(&mut params, "data", data);
            OperationKind::Collect
        }
        Commands::Follow { profile_ids } => {
            params.insert("profileIds", profile_ids.join(","));
            OperationKind::Follow
        }
        Commands::Approve {
            currency,
            spender,
            amount,
        } => {
            params.insert("currency", currency.as_str());
            params.insert("spender", spender.as_str());
            params.insert("amount", amount.as_str());
            OperationKind::ApproveCurrency
        }
        Commands::Accounts | Commands::ShowProfile { .. } | Commands::ShowPublication { .. } => {
            return None;
        }
    };

    Some((kind, params))
}

fn insert_optional(params: &mut OperationParams, field: &str, value: &Option<String>) {
    if let Some(value) = value {
        params.insert(field, value.as_str());
    }
}

fn parse_param(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", value))
}

fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

fn print_one<T: Serialize>(json: bool, data: T, row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

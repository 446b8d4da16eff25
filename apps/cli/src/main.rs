use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{builder::RangedU64ValueParser, Parser, Subcommand, ValueEnum};
use prov_core::{secret::DEFAULT_SECRET_LEN, CredentialRotator};
use prov_registry::{Registry, RegistryClient};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use config::CliConfig;
use output::Output;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
	Human,
	Json,
}

#[derive(Parser)]
#[command(name = "prov", about = "Registry side of device provisioning")]
struct Cli {
	/// JSON file with `apiUrl`, `projectId` and `timeoutSecs`
	#[arg(long, env = "PROV_CONFIG")]
	config: Option<PathBuf>,

	/// Registry API root
	#[arg(long, env = "GOLIOTH_API_URL")]
	api_url: Option<String>,

	#[arg(long, env = "GOLIOTH_PROJECT_ID")]
	project_id: Option<String>,

	#[arg(long, env = "GOLIOTH_API_KEY", hide_env_values = true)]
	api_key: String,

	/// Per-request timeout in seconds, 0 turns it off
	#[arg(long)]
	timeout_secs: Option<u64>,

	/// Output format
	#[arg(long, value_enum, default_value = "human")]
	format: OutputFormat,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Registry devices
	#[command(subcommand)]
	Device(DeviceCommands),
	/// Device credentials
	#[command(subcommand)]
	Credential(CredentialCommands),
	/// Logs a device shipped to the registry
	Logs { device_id: String },
}

#[derive(Subcommand, Debug)]
enum DeviceCommands {
	/// List every device of the project
	List,
	/// Look a device up by hardware id
	Find { hardware_id: String },
	/// Look a device up by hardware id, registering it when unknown
	FindOrCreate {
		hardware_id: String,
		#[arg(long)]
		name: String,
	},
}

#[derive(Subcommand, Debug)]
enum CredentialCommands {
	/// List the credentials of a device, secrets are never included
	List { device_id: String },
	/// Revoke all credentials of a device and issue a single new one
	Rotate {
		device_id: String,
		/// Prefix of the generated identity
		#[arg(long)]
		hardware_id: String,
		/// At least 8 characters
		#[arg(
			long,
			default_value_t = DEFAULT_SECRET_LEN,
			value_parser = RangedU64ValueParser::<usize>::new().range(8..)
		)]
		secret_len: usize,
	},
	/// Delete one credential, already deleted ones are not an error
	Delete {
		device_id: String,
		credential_id: String,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	init_tracing();
	let cli = Cli::parse();

	let file_config = match &cli.config {
		Some(path) => CliConfig::load(path)?,
		None => CliConfig::default(),
	};

	let registry_config = file_config
		.merge(CliConfig {
			api_url: cli.api_url,
			project_id: cli.project_id,
			timeout_secs: cli.timeout_secs,
		})
		.into_registry_config(cli.api_key)?;

	let client = RegistryClient::new(registry_config).context("building registry client")?;
	info!(base_url = %client.base_url(), "Using registry");

	let out = Output::new(cli.format);

	match cli.command {
		Commands::Device(cmd) => match cmd {
			DeviceCommands::List => out.devices(&client.list_devices().await?)?,
			DeviceCommands::Find { hardware_id } => {
				match client.find_device_by_hardware_id(&hardware_id).await? {
					Some(device) => out.devices(&[device])?,
					None => warn!(%hardware_id, "No device carries this hardware id"),
				}
			}
			DeviceCommands::FindOrCreate { hardware_id, name } => out.devices(&[client
				.find_or_create_device_by_hardware_id(&name, &hardware_id)
				.await
				.with_context(|| format!("resolving device for hardware id {hardware_id}"))?])?,
		},
		Commands::Credential(cmd) => match cmd {
			CredentialCommands::List { device_id } => {
				out.credentials(&client.list_credentials(&device_id).await?)?;
			}
			CredentialCommands::Rotate {
				device_id,
				hardware_id,
				secret_len,
			} => {
				let rotation = CredentialRotator::new(Arc::new(client))
					.with_secret_len(secret_len)
					.rotate(&device_id, &hardware_id)
					.await
					.with_context(|| format!("rotating credentials of device {device_id}"))?;

				for failed in &rotation.failed_revocations {
					warn!(
						credential_id = %failed.credential_id,
						error = %failed.error,
						"Credential could not be revoked and may still be registered"
					);
				}

				out.rotation(&rotation)?;
			}
			CredentialCommands::Delete {
				device_id,
				credential_id,
			} => {
				client.delete_credential(&device_id, &credential_id).await?;
				info!(%credential_id, "Credential deleted");
			}
		},
		Commands::Logs { device_id } => out.logs(&client.list_device_logs(&device_id).await?)?,
	}

	Ok(())
}

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str())),
		)
		.with_writer(std::io::stderr)
		.try_init();
}

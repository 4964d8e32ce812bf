use std::{fmt::Write as _, path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use vault_service::{Providers, TurnKind, TurnRequest, TurnResponse, VaultService};
use vault_storage::qdrant::QdrantStore;

const SNIPPET_CHARS: usize = 160;

#[derive(Debug, Parser)]
#[command(
	version = vault_cli::VERSION,
	rename_all = "kebab",
	styles = vault_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Visibility profile for every query. Defaults to `search.default_profile`.
	#[arg(long, short = 'p', value_name = "PROFILE")]
	pub profile: Option<String>,
	/// Conversation identifier. A random one is used when omitted.
	#[arg(long, value_name = "ID")]
	pub session: Option<String>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = vault_config::load(&args.config)?;
	init_tracing(&config)?;
	let store = Arc::new(QdrantStore::new(&config.storage.qdrant)?);
	connect_store(&store).await;
	let service = VaultService::with_providers(config, Providers::with_store(store.clone()));
	let sweeper = service.spawn_sweeper();
	let session_id = args.session.unwrap_or_else(|| Uuid::new_v4().to_string());

	tracing::info!(%session_id, "Chat session started.");

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut stdout = tokio::io::stdout();

	prompt(&mut stdout).await?;

	while let Some(line) = lines.next_line().await? {
		let message = line.trim();

		match message {
			"" => {},
			"/quit" | "/exit" => break,
			"/health" => {
				let health = serde_json::to_string_pretty(&service.health())?;

				stdout.write_all(format!("{health}\n").as_bytes()).await?;
			},
			_ => {
				if !store.is_ready() {
					connect_store(&store).await;
				}

				let req = TurnRequest {
					session_id: session_id.clone(),
					message: message.to_string(),
					profile: args.profile.clone(),
				};
				let output = match service.turn(req).await {
					Ok(response) => render(&response),
					Err(err) => {
						tracing::error!(error = %err, "Turn failed.");

						format!("Search failed: {err}\n")
					},
				};

				stdout.write_all(output.as_bytes()).await?;
			},
		}

		prompt(&mut stdout).await?;
	}

	sweeper.abort();

	Ok(())
}

fn init_tracing(config: &vault_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
	Ok(())
}

async fn connect_store(store: &QdrantStore) {
	if let Err(err) = store.ensure_ready().await {
		tracing::warn!(error = %err, "Vector store is not ready.");
	}
}

async fn prompt(stdout: &mut Stdout) -> color_eyre::Result<()> {
	stdout.write_all(b"> ").await?;
	stdout.flush().await?;
	Ok(())
}

/// Plain-text rendering of one turn.
pub fn render(response: &TurnResponse) -> String {
	let mut out = String::new();

	if response.kind == TurnKind::Declined {
		out.push_str("Okay, dropping the remaining results.\n");

		return out;
	}
	if response.items.is_empty() {
		out.push_str("No matching documents.\n");

		return out;
	}

	for (idx, item) in response.items.iter().enumerate() {
		let meta = &item.metadata;
		let _ = write!(out, "{}. {} [{}]", idx + 1, item.document_key, meta.content_type);

		if let Some(date) = meta.date.as_deref() {
			let _ = write!(out, " {date}");
		}
		if let Some(source) = meta.source.as_deref().filter(|source| !source.trim().is_empty()) {
			let _ = write!(out, " <{source}>");
		}

		let _ = writeln!(out, "\n   {}", snippet(&item.text));
	}

	if response.more_available {
		let _ = writeln!(
			out,
			"{} more result(s) available. Reply \"yes\" to see them.",
			response.remaining_count
		);
	}

	out
}

fn snippet(text: &str) -> String {
	let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");

	if flat.chars().count() <= SNIPPET_CHARS {
		return flat;
	}

	let cut: String = flat.chars().take(SNIPPET_CHARS).collect();

	format!("{}...", cut.trim_end())
}

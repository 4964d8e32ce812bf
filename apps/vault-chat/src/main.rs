use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = vault_chat::Args::parse();
	vault_chat::run(args).await
}

use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = recap_api::Args::parse();

	recap_api::run(args).await
}

use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = cine_api::Args::parse();

	cine_api::run(args).await
}

use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = ezra_api::Args::parse();
	ezra_api::run(args).await
}

use anyhow::Result;
use clap::Parser;

use guide_flow::{cli, flow, input, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables already set are never overridden.
    dotenvy::dotenv().ok();

    let args = cli::Args::parse();
    let sources = args.source_inputs();
    let config = args.into_config()?;

    logging::init(&config.logging, config.verbose);
    config.validate()?;

    let inputs = match sources {
        Some(inputs) => inputs,
        None => input::collect_from_terminal()?,
    };

    let outcome = flow::launch(&config, inputs).await?;

    println!("\n{}", flow::BANNER);
    println!("FINAL RESULT");
    println!("{}", flow::BANNER);
    println!("\n{}", outcome.result_text());

    Ok(())
}

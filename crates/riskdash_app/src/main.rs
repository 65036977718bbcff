mod cli;
mod config;
mod render;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use riskdash_core::Company;
use riskdash_engine::{DocumentUpload, ReconciliationController, RemoteGateway, ReqwestGateway};
use riskdash_logging::{rd_info, rd_warn};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (config::AppConfig::default(), Some(err)),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    riskdash_logging::initialize(config.log, level, Path::new("."));
    if let Some(err) = config_error {
        rd_warn!("Using default settings, {:?} ignored: {}", cli.config, err);
    }

    let gateway =
        ReqwestGateway::new(config.gateway_settings()).context("building http client")?;
    let mut controller =
        ReconciliationController::new(Arc::new(gateway), config.controller_settings());
    run(&mut controller, cli.command).await
}

async fn run<G: RemoteGateway>(
    controller: &mut ReconciliationController<G>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Companies => {
            let companies = controller.list_companies().await?;
            print!("{}", render::companies(companies));
        }
        Command::CreateCompany {
            symbol,
            name,
            sector,
        } => {
            let company = Company::new(&symbol, &name, sector.as_deref());
            let created = controller.create_company(company).await?;
            println!("Created {} ({})", created.symbol, created.name);
        }
        Command::Documents { symbol } => {
            controller.select_company(&normalize_symbol(&symbol)).await?;
            print!("{}", render::documents(&controller.view()));
        }
        Command::Upload { symbol, year, file } => {
            let upload = DocumentUpload::from_path(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let document = controller
                .upload_document(&upload, &normalize_symbol(&symbol), year)
                .await?;
            println!(
                "Uploaded {} for {} FY{} ({} pages, {} words)",
                upload.file_name,
                document.company_symbol,
                document.fiscal_year,
                document.page_count,
                document.word_count
            );
        }
        Command::Analyze { symbol, year } => {
            let symbol = normalize_symbol(&symbol);
            controller.select_company(&symbol).await?;
            let job_id = controller.start_job(&symbol, year).await?;
            println!("Submitted job {job_id}");

            tokio::select! {
                view = controller.watch_until_idle(|view| print!("{}", render::jobs(view))) => {
                    print!("\n{}", render::analytics(&view));
                }
                _ = tokio::signal::ctrl_c() => {
                    rd_info!("Interrupted; stopping polling for job {}", job_id);
                }
            }
            controller.tear_down().await;
        }
        Command::History { symbol } => {
            controller.select_company(&normalize_symbol(&symbol)).await?;
            print!("{}", render::analytics(&controller.view()));
        }
    }
    Ok(())
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

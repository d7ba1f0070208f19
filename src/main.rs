use anyhow::Result;
use clap::Parser;

use ticketero_load::cli::{Cli, Mode, Profile};
use ticketero_load::{scenarios, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    match cli.mode {
        Mode::Serve(args) => {
            init_tracing(args.verbose)?;

            // Run stub service (blocks until Ctrl+C)
            server::run(args).await?;
        }

        Mode::Run(run_args) => {
            init_tracing(run_args.verbose)?;

            tracing::info!("Ticketero Load Test Starting...");
            tracing::info!("Base URL: {}", run_args.base_url);
            if let Some(seed) = run_args.seed {
                tracing::info!("Seed: {}", seed);
            }

            // Build the selected profile
            let plan = match run_args.profile.clone() {
                Profile::Ramp(args) => {
                    tracing::info!("Running ramp profile");
                    tracing::info!("  Warm Target: {} VUs", args.warm_target);
                    tracing::info!("  Peak Target: {} VUs", args.peak_target);
                    tracing::info!(
                        "  Stages: {}s up, {}s climb, {}s down",
                        args.ramp_up,
                        args.hold,
                        args.ramp_down
                    );
                    scenarios::ramp::plan(args)
                }
                Profile::Soak(args) => {
                    tracing::info!("Running soak profile");
                    tracing::info!("  Target: {} VUs", args.target);
                    tracing::info!("  Hold: {}s", args.hold);
                    tracing::info!("  Think Time: {}-{}s", args.think_min, args.think_max);
                    tracing::info!("  Priority Ratio: {}", args.priority_ratio);
                    scenarios::soak::plan(args)
                }
                Profile::Spike(args) => {
                    tracing::info!("Running spike profile");
                    tracing::info!("  Target: {} VUs", args.target);
                    tracing::info!(
                        "  Spike: {}s up, {}s hold, {}s down",
                        args.ramp_up,
                        args.hold,
                        args.ramp_down
                    );
                    scenarios::spike::plan(args)
                }
            };

            let outcome = scenarios::runner::run(plan, &run_args).await?;

            if !outcome.passed() {
                anyhow::bail!(
                    "{} threshold(s) failed",
                    outcome.thresholds.failed_count()
                );
            }

            tracing::info!("Load test complete, all thresholds passed");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

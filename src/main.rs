use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::error;

use topdomains::analysis::{print_analysis_results, print_start_notice, NOTICE_TIME};
use topdomains::utils::{setup_logging, validate_args};
use topdomains::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    print_start_notice();
    let result = topdomains::run(&args).inspect_err(|e| {
        error!(action = "abort", component = "analysis", error = %e, "Run aborted");
    })?;
    print_analysis_results(&result, &args);
    println!("{} Completed", Local::now().format(NOTICE_TIME));

    Ok(())
}

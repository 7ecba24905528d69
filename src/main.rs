use std::{env, path::Path};

use anyhow::Context;
use radio_playlist::{
    config::Config,
    jobs::{run_radio_browser_export, run_radio_garden_export, run_validation},
    logging::init_logger,
};
use serde_json::json;

const USAGE: &str = "Usage: radio-playlist-rs <filename.m3u>\n\
Example: radio-playlist-rs \"Radio Browser - Romania.m3u\"\n\
\n\
Other commands:\n  \
radio-browser   export TARGET_COUNTRY stations from Radio Browser\n  \
radio-garden    export TARGET_COUNTRY stations from Radio Garden\n  \
check-config    print the effective configuration";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = init_logger("radio-playlist-rs");

    let Some(command) = env::args().nth(1) else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = Config::load().context("failed to load configuration")?;

    match command.as_str() {
        "check-config" => {
            logger.info(
                "config.check_passed",
                serde_json::to_value(&config).unwrap_or_else(|_| json!({ "status": "ok" })),
            );
        }
        "radio-browser" => {
            if let Some(result) = run_radio_browser_export(&config).await? {
                println!(
                    "Done! Saved {} stations to {}",
                    result.total,
                    result.output_path.display()
                );
            }
        }
        "radio-garden" => {
            if let Some(result) = run_radio_garden_export(&config).await? {
                println!(
                    "Done! Saved {} stations to {}",
                    result.total,
                    result.output_path.display()
                );
            }
        }
        path => match run_validation(Path::new(path), &config.validator).await? {
            Some(run) => println!("{}", run.summary_block()),
            None => println!("No entries found or file error."),
        },
    }

    Ok(())
}

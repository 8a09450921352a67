use clap::{Parser, ValueEnum};
use colored::*;
use elongation::{
    logger::{self, LogLevel},
    Category, HttpImageService, PanelConfig, PanelController, PanelView, RequestStatus,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryArg {
    Kam,
    PhaseMap,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Kam => Category::Kam,
            CategoryArg::PhaseMap => Category::PhaseMap,
        }
    }
}

/// Generate KAM or phase map images for a tensile elongation percentage.
///
/// With --category and --percentage the image is generated and saved once;
/// otherwise an interactive panel reads commands from stdin.
#[derive(Debug, Parser)]
#[command(name = "elongation", version)]
struct Cli {
    #[arg(long, value_enum)]
    category: Option<CategoryArg>,

    /// Elongation percentage, between 5 and 60
    #[arg(long, allow_hyphen_values = true)]
    percentage: Option<String>,

    /// Directory downloaded images are written to
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Base URL of the image generation service
    #[arg(long)]
    service_url: Option<String>,

    /// Request timeout in seconds, at least 1
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Retries for transient failures
    #[arg(long)]
    retries: Option<u32>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> PanelConfig {
        let mut config = PanelConfig::from_env();

        if let Some(url) = &self.service_url {
            config.service.base_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.service.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.retries {
            config.service.retry.max_retries = retries;
        }
        if let Some(dir) = &self.out_dir {
            config.download_dir = dir.clone();
        }
        if self.json_logs {
            config.logger = config.logger.with_json_output(true).with_colors(false);
        }
        if self.verbose {
            config.logger = config.logger.with_level(LogLevel::Debug);
        }

        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();
    let config = cli.to_config();

    if let Err(e) = logger::init_with_config(config.logger.clone()) {
        eprintln!("{}", e);
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }
    logger::log_config_info(&config);

    let service = match HttpImageService::new(&config.service) {
        Ok(service) => service,
        Err(e) => {
            log::error!("❌ Failed to initialize image service client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let controller = PanelController::new(Arc::new(service));

    match (cli.category, cli.percentage.as_deref()) {
        (Some(category), Some(percentage)) => {
            run_once(&controller, category.into(), percentage, &config).await
        }
        _ => match run_interactive(&controller, &config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("❌ {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_once(
    controller: &PanelController,
    category: Category,
    percentage: &str,
    config: &PanelConfig,
) -> ExitCode {
    controller.select_category(category).await;
    controller.set_percentage(percentage).await;

    if let Some(message) = controller.view().await.validation_message {
        eprintln!("{}", message.red());
        return ExitCode::from(2);
    }

    if controller.generate_image().await != RequestStatus::Completed {
        print_view(&controller.view().await);
        return ExitCode::FAILURE;
    }

    let panel = controller.panel().await;
    match panel.image().map(|image| image.save_to(&config.download_dir)) {
        Some(Ok(path)) => {
            println!("{} {}", "Saved".green().bold(), path.display());
            ExitCode::SUCCESS
        }
        Some(Err(e)) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
        None => ExitCode::FAILURE,
    }
}

const HELP: &str = "\
Commands:
  kam | phase        choose the image category
  <number>           set the elongation percentage (5-60)
  generate | g       request the image
  download | d       save the generated image
  view | v           show the panel
  help | h           show this help
  quit | q           exit";

async fn run_interactive(
    controller: &PanelController,
    config: &PanelConfig,
) -> elongation::Result<()> {
    println!("{}", HELP.bright_black());
    print_view(&controller.view().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input.to_lowercase().as_str() {
            "" => continue,
            "quit" | "q" | "exit" => break,
            "help" | "h" => println!("{}", HELP.bright_black()),
            "view" | "v" => print_view(&controller.view().await),
            "generate" | "g" => {
                if !controller.view().await.submit_enabled() {
                    println!("{}", "Generate is disabled right now.".yellow());
                    continue;
                }
                let worker = controller.clone();
                tokio::spawn(async move {
                    worker.generate_image().await;
                    print_view(&worker.view().await);
                });
                print_view(&controller.view().await);
            }
            "download" | "d" => {
                let panel = controller.panel().await;
                match panel.image() {
                    Some(image) => match image.save_to(&config.download_dir) {
                        Ok(path) => println!("{} {}", "Saved".green().bold(), path.display()),
                        Err(e) => println!("{}", e.to_string().red()),
                    },
                    None => println!("{}", "No image to download yet.".yellow()),
                }
            }
            other => {
                if let Ok(category) = other.parse::<Category>() {
                    controller.select_category(category).await;
                } else if controller.view().await.percentage_field.is_none() {
                    println!("{}", "Choose a category first (kam or phase).".yellow());
                    continue;
                } else {
                    controller.set_percentage(input).await;
                }
                print_view(&controller.view().await);
            }
        }
    }

    Ok(())
}

fn print_view(view: &PanelView) {
    println!();
    println!("{}", view.title.bold());

    let triggers: Vec<String> = view
        .category_triggers
        .iter()
        .map(|t| {
            if t.selected {
                format!("[{}]", t.label).bright_blue().bold().to_string()
            } else {
                format!(" {} ", t.label)
            }
        })
        .collect();
    println!("  {}", triggers.join("  "));

    if let Some(field) = &view.percentage_field {
        let value = if field.value.is_empty() {
            field.placeholder.bright_black().to_string()
        } else {
            field.value.clone()
        };
        println!("  Percentage ({}-{}): {}", field.min, field.max, value);
    }

    if let Some(message) = &view.validation_message {
        println!("  {}", message.red());
    }

    if let Some(submit) = &view.submit {
        let label = format!("<{}>", submit.label);
        if submit.enabled {
            println!("  {}", label.yellow().bold());
        } else {
            println!("  {}", label.bright_black());
        }
    }

    if let Some(message) = &view.failure_message {
        println!("  {}", message.red().bold());
    }

    if let Some(preview) = &view.preview {
        println!("  {}", preview.heading.bold());
        println!(
            "    {} ({}, {} bytes)",
            preview.object_url, preview.mime_type, preview.byte_len
        );
        println!(
            "    {} -> {}",
            preview.download_label,
            preview.download_filename.bright_blue()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_arguments() {
        let cli = Cli::try_parse_from([
            "elongation",
            "--category",
            "phase-map",
            "--percentage",
            "25",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        assert!(matches!(cli.category, Some(CategoryArg::PhaseMap)));
        assert_eq!(cli.percentage.as_deref(), Some("25"));
        assert_eq!(cli.to_config().service.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["elongation", "--timeout-secs", "0"]).is_err());
    }
}

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use maxprice::{Config, CountryCode, PricePipeline};

#[derive(Parser)]
#[command(name = "maxprice")]
#[command(about = "Look up Max subscription prices by country", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        global = true,
        help = "Set the logging level (defaults to LOG_LEVEL, then info)"
    )]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and parse the subscription prices for one market
    Get {
        #[arg(help = "Two-letter country code, e.g. SG, US, HK", value_parser = parse_country)]
        country: CountryCode,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(long, help = "Fail instead of fetching directly when no proxy is available")]
        proxy_required: bool,

        #[arg(long, conflicts_with = "proxy_required", help = "Never ask for a proxy")]
        no_proxy: bool,
    },
    /// Show the locale paths tried for each market
    Locales {
        #[arg(help = "Only show this country code", value_parser = parse_country)]
        country: Option<CountryCode>,
    },
}

fn parse_country(s: &str) -> Result<CountryCode, String> {
    s.parse::<CountryCode>().map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or("LOG_LEVEL", "info"));
    if let Some(level) = cli.log_level {
        logger.filter_level(level.into());
    }
    logger.init();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    });

    match cli.command {
        Commands::Get {
            country,
            format,
            proxy_required,
            no_proxy,
        } => {
            if proxy_required {
                config.proxy_required = true;
            }
            if no_proxy {
                config.proxy_api = None;
                config.proxy_required = false;
            }

            let pipeline = PricePipeline::new(&config);
            let result = pipeline.get_max_price(&country).await;

            match format {
                OutputFormat::Json => serialize_json(&result),
                OutputFormat::Text => println!("{}", result.message),
            }

            if !result.success {
                process::exit(1);
            }
        }

        Commands::Locales { country } => match country {
            Some(country) => match config.locales.get(&country.lower()) {
                Some(paths) => println!("{}: {}", country, paths.join(", ")),
                None => println!(
                    "{}: not listed, tries {}/{}/ then {}/{}/es on 404",
                    country,
                    config.base_url,
                    country.lower(),
                    config.base_url,
                    country.lower()
                ),
            },
            None => {
                for (code, paths) in config.locales.entries() {
                    println!("{}: {}", code.to_uppercase(), paths.join(", "));
                }
                println!("\n{} market(s) listed", config.locales.len());
            }
        },
    }
}

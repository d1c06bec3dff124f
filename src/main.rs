//! Race Position Predictor CLI
//!
//! Predicts finishing positions from pre-race attributes using a trained
//! regression artifact.

use clap::{Parser, Subcommand};
use podium::{Config, Result};

#[derive(Parser)]
#[command(name = "podium")]
#[command(about = "Race finishing-position prediction from a trained model", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reference dataset commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Category dictionary commands
    Codec {
        #[command(subcommand)]
        action: CodecCommands,
    },
    /// Predict a finishing position
    Predict {
        /// Starting grid position (1 = pole)
        #[arg(long)]
        grid: u32,
        /// Driver reference, e.g. "hamilton"
        #[arg(long)]
        driver: String,
        /// Driver nationality, e.g. "British"
        #[arg(long)]
        nationality: String,
        /// Constructor name, e.g. "Ferrari"
        #[arg(long)]
        constructor: String,
        /// Championship points before the race
        #[arg(long, default_value = "0")]
        points: f32,
        /// Fastest-lap rank (1 = fastest)
        #[arg(long, default_value = "1")]
        rank: u32,
        /// Laps completed
        #[arg(long)]
        laps: u32,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Model artifact commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Show reference dataset status
    Status,
}

#[derive(Subcommand)]
enum CodecCommands {
    /// List a dictionary's values in code order
    List {
        /// Column: driver, nationality, or constructor
        column: String,
    },
    /// Encode a raw value to its integer code
    Encode {
        /// Column: driver, nationality, or constructor
        column: String,
        /// Raw value, e.g. "Ferrari"
        value: String,
    },
    /// Decode an integer code back to its raw value
    Decode {
        /// Column: driver, nationality, or constructor
        column: String,
        /// Integer code
        code: i64,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model artifact information
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Codec { action } => match action {
            CodecCommands::List { column } => commands::codec_list(&config, &column),
            CodecCommands::Encode { column, value } => {
                commands::codec_encode(&config, &column, &value)
            }
            CodecCommands::Decode { column, code } => {
                commands::codec_decode(&config, &column, code)
            }
        },
        Commands::Predict {
            grid,
            driver,
            nationality,
            constructor,
            points,
            rank,
            laps,
            format,
        } => commands::predict(
            &config,
            podium::RaceInputs {
                grid,
                driver,
                nationality,
                constructor,
                points,
                fastest_lap_rank: rank,
                laps,
            },
            format,
        ),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use podium::data::ReferenceDataset;
    use podium::features::CategoryDictionary;
    use podium::model::ModelArtifact;
    use podium::predict::{constructor_asset, format_prediction, Predictor};
    use podium::{CategoryCode, RaceInputs};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Place the reference CSV at data/sample_data.csv");
        println!("  3. Place the model artifact at model/position_model.json");
        println!("  4. Run 'podium predict --grid 5 --driver hamilton ...'");

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let reference = ReferenceDataset::load(&config.data.reference_path)?;
        let stats = reference.stats();

        println!("Reference Dataset Status");
        println!("───────────────────────────────");
        println!("  Path:          {}", config.data.reference_path);
        println!("  Rows:          {}", stats.row_count);
        println!("  Drivers:       {}", stats.driver_count);
        println!("  Nationalities: {}", stats.nationality_count);
        println!("  Constructors:  {}", stats.constructor_count);

        Ok(())
    }

    /// Resolve a CLI column name to the predictor's dictionary
    fn dictionary<'a>(predictor: &'a Predictor, column: &str) -> Option<&'a CategoryDictionary> {
        match column.to_lowercase().as_str() {
            "driver" | "driverref" => Some(predictor.drivers()),
            "nationality" => Some(predictor.nationalities()),
            "constructor" | "constructorref" => Some(predictor.constructors()),
            _ => None,
        }
    }

    pub fn codec_list(config: &Config, column: &str) -> Result<()> {
        let predictor = Predictor::load(config)?;
        let Some(dict) = dictionary(&predictor, column) else {
            println!(
                "Unknown column: {}. Available: driver, nationality, constructor",
                column
            );
            return Ok(());
        };

        println!("{} ({} values)", dict.column(), dict.len());
        for (code, value) in dict.values().enumerate() {
            println!("  {:>4}  {}", code, value);
        }

        Ok(())
    }

    pub fn codec_encode(config: &Config, column: &str, value: &str) -> Result<()> {
        let predictor = Predictor::load(config)?;
        let Some(dict) = dictionary(&predictor, column) else {
            println!(
                "Unknown column: {}. Available: driver, nationality, constructor",
                column
            );
            return Ok(());
        };

        let code = dict.encode(value)?;
        println!("{}", code);
        Ok(())
    }

    pub fn codec_decode(config: &Config, column: &str, code: i64) -> Result<()> {
        let predictor = Predictor::load(config)?;
        let Some(dict) = dictionary(&predictor, column) else {
            println!(
                "Unknown column: {}. Available: driver, nationality, constructor",
                column
            );
            return Ok(());
        };

        let value = dict.decode(CategoryCode(code))?;
        println!("{}", value);
        Ok(())
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let model = ModelArtifact::load(&config.model.artifact_path)?;
        let schema = model.schema();

        println!("Model Artifact Information");
        println!("───────────────────────────────");
        println!("  Path:        {}", config.model.artifact_path);
        println!("  Version:     {}", model.version().unwrap_or("unversioned"));
        println!("  Input arity: {}", model.arity());
        println!("  Features:    {}", schema.fields().join(", "));
        println!("  Learners:    {}", model.learner_kinds().join(", "));

        Ok(())
    }

    pub fn predict(config: &Config, inputs: RaceInputs, format: OutputFormat) -> Result<()> {
        let predictor = Predictor::load(config)?;
        let prediction = predictor.predict(&inputs)?;

        match format {
            OutputFormat::Table => {
                print!(
                    "{}",
                    format_prediction(&prediction, &inputs.driver, &inputs.constructor)
                );
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "driver": inputs.driver,
                    "constructor": inputs.constructor,
                    "constructor_asset": constructor_asset(&inputs.constructor),
                    "position": prediction.position,
                    "display_position": prediction.display_position(),
                    "grid": prediction.grid,
                    "laps": prediction.laps,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Csv => {
                println!("driver,constructor,position,display_position,grid,laps");
                println!(
                    "{},{},{:.3},{},{},{}",
                    inputs.driver,
                    inputs.constructor,
                    prediction.position,
                    prediction.display_position(),
                    prediction.grid,
                    prediction.laps
                );
            }
        }

        Ok(())
    }
}

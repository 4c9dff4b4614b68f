use clap::{Parser, Subcommand};
use dotenv::dotenv;
use defer_rs::defer::config::ConfigLoader;
use defer_rs::defer::requirement::{parse, tokenize};
use defer_rs::defer::simulation::Scenario;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the tokens of a requirement expression
    Tokens {
        /// The requirement expression
        expression: String,
    },
    /// Print the parsed tree of a requirement expression
    Parse {
        /// The requirement expression
        expression: String,

        /// Print the tree as JSON instead of normalized text
        #[arg(long)]
        json: bool,
    },
    /// Run a page scenario from a file
    Run {
        /// Path to the scenario file
        scenario: String,

        /// Options file replacing the scenario's options
        #[arg(short, long)]
        options: Option<String>,

        /// Print the report as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Tokens { expression } => {
            for token in tokenize(&expression) {
                println!("{:?}", token);
            }
        }
        Commands::Parse { expression, json } => {
            let tree = parse(&expression)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                println!("{}", tree);
            }
        }
        Commands::Run {
            scenario,
            options,
            json,
        } => {
            let mut scenario = Scenario::load(&scenario)?;
            if let Some(path) = options {
                log::info!("Using options from {}", path);
                scenario.options = ConfigLoader::new().load(&path)?;
            }

            let report = scenario.run().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", serde_yaml::to_string(&report)?);
            }
        }
    }

    Ok(())
}

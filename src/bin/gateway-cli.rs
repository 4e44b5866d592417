use clap::{Parser, Subcommand};
use ingress_router::routing::{HostnameDecoder, RouteDecoder};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the ingress gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Show the routing configuration and hostname patterns
    Routes,
    /// Decode a hostname locally, without contacting a gateway
    Decode {
        hostname: String,

        #[arg(long, default_value = "dev")]
        default_env: String,

        /// Allowed namespace (repeatable); none admits all
        #[arg(long = "allow")]
        allowed: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Health => fetch(&format!("{}/health", cli.url)).await?,
        Commands::Routes => fetch(&format!("{}/routes", cli.url)).await?,
        Commands::Decode {
            hostname,
            default_env,
            allowed,
        } => {
            let route = HostnameDecoder::new(default_env, allowed).decode(&hostname);
            println!("{}", serde_json::to_string_pretty(&route)?);
            if !route.is_valid() {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

async fn fetch(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let res = reqwest::get(url).await?;
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    let json: serde_json::Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

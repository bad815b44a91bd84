use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;

use catalog_gateway::auth::password::hash_password;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client and admin helper for the catalog gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token sent with `me` and `burst`.
    #[arg(short, long, env = "CATALOG_GATEWAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Health,
    /// Log in and print the issued token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show the identity the gateway sees for the current token
    Me,
    /// Fire sequential requests and report how many were admitted
    Burst {
        #[arg(short, long, default_value_t = 25)]
        count: u32,
        #[arg(long, default_value = "/health")]
        path: String,
    },
    /// Print an Argon2 hash suitable for `directory.users[].password_hash`
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Login { email, password } => {
            let res = client
                .post(format!("{}/api/user/login", cli.url))
                .json(&serde_json::json!({ "email": email, "password": password }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Me => {
            let res = client
                .get(format!("{}/api/user/me", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Burst { count, path } => {
            let mut admitted = 0u32;
            let mut rejected = 0u32;
            let mut retry_after = None;

            for _ in 0..count {
                let res = client
                    .get(format!("{}{}", cli.url, path))
                    .headers(headers.clone())
                    .send()
                    .await?;
                if res.status() == StatusCode::TOO_MANY_REQUESTS {
                    rejected += 1;
                    retry_after = res
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                } else {
                    admitted += 1;
                }
            }

            println!("admitted: {}", admitted);
            println!("rejected: {}", rejected);
            if let Some(secs) = retry_after {
                println!("last Retry-After: {}s", secs);
            }
        }
        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use postwatch::completion::openai::OpenAiClient;
use postwatch::config::{prompt_with_default, Config};
use postwatch::driver::webdriver::WebDriverSession;
use postwatch::driver::{build_driver, KNOWN_DRIVERS};
use postwatch::judge::{SessionPrompts, TextJudge};
use postwatch::pipeline::EngagementPipeline;
use postwatch::profiles;
use postwatch::scheduler::Scheduler;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

const DEFAULT_PERSONA: &str = "You are a sneaker enthusiast.";
const DEFAULT_CHECK_PROMPT: &str = "Does this post talk about sneakers?";
const DEFAULT_INTERACT_PROMPT: &str = "Write a short, friendly comment about this post.";

#[derive(Parser)]
#[command(
    name = "postwatch",
    about = "Monitor social-media profiles and engage with new posts"
)]
struct Args {
    /// Social media username
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Social media password
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// OpenAI API secret key
    #[arg(short = 's', long = "openai-secret")]
    openai_secret: Option<String>,

    /// Platform driver to use (instagram)
    #[arg(short = 'd', long)]
    driver: Option<String>,

    /// Run the browser in headless mode
    #[arg(short = 'l', long)]
    headless: bool,

    /// CSV file containing profiles (profile_url column)
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Comma-separated list of profiles
    #[arg(short = 'P', long)]
    profiles: Option<String>,

    /// Config file path
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "postwatch=info".to_string()),
        )
        .init();

    let args = Args::parse();

    let driver_name = match args.driver.as_deref() {
        Some(name) if KNOWN_DRIVERS.contains(&name) => name.to_string(),
        Some(name) => {
            eprintln!(
                "Unknown driver '{}'. Known drivers: {}",
                name,
                KNOWN_DRIVERS.join(", ")
            );
            std::process::exit(1);
        }
        None => {
            eprintln!(
                "Missing driver. Use -d to specify one of: {}",
                KNOWN_DRIVERS.join(", ")
            );
            std::process::exit(1);
        }
    };

    let config = Config::load(&args.config)?;

    // Load saved credentials from .env (real env vars take precedence)
    Config::load_env_file();

    println!();
    println!("  postwatch v0.1.0");
    println!("  ================");
    println!();

    let username = Config::credential(args.username, "INSTAGRAM_USERNAME", "Username")?;
    let password = Config::credential(args.password, "INSTAGRAM_PASSWORD", "Password")?;
    let openai_secret = Config::credential(args.openai_secret, "OPENAI_SECRET", "OpenAI API Key")?;

    let profile_list = if let Some(path) = &args.file {
        let list = profiles::from_csv(path)?;
        println!("  Profiles loaded from {}: {:?}", path.display(), list);
        list
    } else if let Some(inline) = &args.profiles {
        let list = profiles::from_inline(inline)?;
        println!("  Profiles loaded from command line: {:?}", list);
        list
    } else {
        eprintln!("No profiles specified. Use -f for a CSV file or -P for an inline list.");
        std::process::exit(1);
    };

    // Session prompts: fixed for the whole run, blank answers take defaults
    let session_prompts = SessionPrompts {
        persona: prompt_with_default("Persona (system prompt)", DEFAULT_PERSONA)?,
        check_prompt: prompt_with_default("Content check prompt", DEFAULT_CHECK_PROMPT)?,
        interact_prompt: prompt_with_default("Interaction prompt", DEFAULT_INTERACT_PROMPT)?,
    };

    println!();
    println!("  Starting browser session...");

    let session = Arc::new(
        WebDriverSession::new(
            &config.driver.webdriver_url,
            args.headless,
            config.driver.element_timeout_ms,
        )
        .await
        .context("failed to open browser session")?,
    );

    let driver = build_driver(&driver_name, session.clone(), &config.driver)
        .expect("driver name validated above");

    driver
        .login(&username, &password)
        .await
        .context("platform login failed")?;
    tracing::info!(driver = %driver_name, "logged in");

    let completion = Arc::new(OpenAiClient::new(
        openai_secret,
        &config.completion.base_url,
        &config.completion.model,
    ));
    let judge = TextJudge::new(completion, session_prompts, config.judge.clone());
    let pipeline = EngagementPipeline::new(driver, judge);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut scheduler = Scheduler::new(profile_list, pipeline, &config.scheduler, shutdown_rx)?;
    scheduler.run().await;

    session.close().await;
    Ok(())
}

pub mod config;
pub mod history;
pub mod logging;
pub mod model;
pub mod model_gateway;
pub mod prompt;
pub mod providers;
pub mod repl;
pub mod session;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use config::Config;
use history::HistoryStore;
use model::ImageAttachment;
use model_gateway::HostModelGateway;
use repl::run_repl;
use session::{Session, SessionOptions};

#[derive(Debug, PartialEq, Eq)]
struct OneShot {
    image: Option<PathBuf>,
    question: String,
}

fn parse_one_shot(args: &[String]) -> Result<OneShot> {
    let mut image = None;
    let mut words = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--image" {
            let Some(path) = iter.next() else {
                bail!("--image requires a path to a jpg or png file");
            };
            image = Some(PathBuf::from(path));
        } else {
            words.push(arg.as_str());
        }
    }
    Ok(OneShot {
        image,
        question: words.join(" "),
    })
}

pub async fn run() -> Result<()> {
    let cfg = Config::from_env();
    info!(
        provider = %cfg.model_provider,
        model = %cfg.model,
        history_path = %cfg.history_path.display(),
        carbon_prompt = cfg.carbon_prompt,
        api_key_set = cfg.api_key.is_some(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;

    let gateway = HostModelGateway::new(&client, &cfg);
    let store = HistoryStore::new(cfg.history_path.clone());
    let options = SessionOptions {
        carbon_prompt: cfg.carbon_prompt,
    };
    let mut session = Session::open(gateway, store, options);

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        run_repl(&mut session, &cfg.model).await
    } else {
        let one_shot = parse_one_shot(&args)?;
        let image = one_shot
            .image
            .as_deref()
            .map(ImageAttachment::from_path)
            .transpose()?;
        let answer = session.ask(&one_shot.question, image).await?;
        println!("{}", answer.trim());
        Ok(())
    }
}

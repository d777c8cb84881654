use anyhow::{anyhow, bail, Context};
use blockform_lib::blocks::render::ContextRenderer;
use blockform_lib::blocks::{banner, customform, questionnaire, BlockKind};
use blockform_lib::dom::dom_tree;
use blockform_lib::fetch::HttpFetcher;
use blockform_lib::parser::block_html::parse_block;
use blockform_lib::submission::DirectoryDownloads;
use blockform_lib::{FormConfig, SubmitMethod};
use clap::Parser;
use std::fs;
use std::time::Instant;

const BLOCKFORM_INTRO: &str = r#"
        ____  __           __   ____
       / __ )/ /___  _____/ /__/ __/___  _________ ___
      / __  / / __ \/ ___/ //_/ /_/ __ \/ ___/ __ `__ \
     / /_/ / / /_/ / /__/ ,< / __/ /_/ / /  / / / / / /
    /_____/_/\____/\___/_/|_/_/  \____/_/  /_/ /_/ /_/

    Blockform - schema-driven forms for authored blocks
"#;

#[derive(Parser)]
#[command(name = "Blockform")]
#[command(about = "Decorate an authored block and optionally submit its form")]
struct Args {
    /// Block markup file.
    input: String,

    /// Where the decorated block is written.
    output: String,

    /// Decorator to use. Detected from the block's class when omitted.
    #[arg(long)]
    block: Option<BlockKind>,

    /// Site origin that relative paths are fetched from.
    #[arg(long, default_value = "http://localhost:3000/")]
    base_url: String,

    /// Endpoint the form submits to.
    #[arg(long)]
    submit_url: Option<String>,

    /// Send the payload as a JSON POST body instead of the query string.
    #[arg(long)]
    post: bool,

    /// Viewport width used to pick questionnaire images.
    #[arg(long, default_value_t = 1024)]
    viewport_width: u32,

    /// Fill a form control before submitting: `id=value`. Repeatable.
    #[arg(long = "fill", value_name = "ID=VALUE")]
    fills: Vec<String>,

    /// Click a form control (checkbox, radio) before submitting. Repeatable.
    #[arg(long = "click", value_name = "ID")]
    clicks: Vec<String>,

    /// Submit the form after building it.
    #[arg(long)]
    submit: bool,

    /// Directory the submission PDF is saved to.
    #[arg(long, default_value = ".")]
    downloads: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    println!("{}", BLOCKFORM_INTRO);

    // parse the args given in terminal
    let args: Args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let html_content = fs::read_to_string(&args.input)
        .with_context(|| format!("reading block markup from {}", args.input))?;
    println!("Successfully read the block markup.");

    let (_document, block) = parse_block(&html_content)?;
    let kind = match args.block {
        Some(kind) => kind,
        None => BlockKind::detect(&block).ok_or_else(|| anyhow!("cannot tell which block this is"))?,
    };
    log::info!("decorating {:?} block", kind);

    let mut config = FormConfig::default();
    if let Some(submit_url) = &args.submit_url {
        config.submit_href = submit_url.clone();
    }
    if args.post {
        config.submit_method = SubmitMethod::Post;
    }

    let renderer = ContextRenderer;
    match kind {
        BlockKind::Banner => {
            banner::decorate(&block, &renderer)?;
        }
        BlockKind::Questionnaire => {
            questionnaire::decorate(&block, &renderer, args.viewport_width)?;
        }
        BlockKind::CustomForm => {
            let fetcher = HttpFetcher::new(&args.base_url)?;
            let downloads = DirectoryDownloads::new(&args.downloads);
            let Some(custom) = customform::decorate(&block, &fetcher, &downloads, &config).await?
            else {
                bail!("the block does not link a form");
            };

            for fill in &args.fills {
                let (id, value) = fill
                    .split_once('=')
                    .ok_or_else(|| anyhow!("--fill expects id=value, got {}", fill))?;
                if !custom.form().change(id, value) {
                    log::warn!("no control with id {}", id);
                }
            }
            for id in &args.clicks {
                if !custom.form().click_id(id) {
                    log::warn!("no control with id {}", id);
                }
            }

            if args.submit {
                let outcome = custom.submit(Instant::now()).await;
                println!("Submit outcome: {:?}", outcome);
            }
        }
    }

    fs::write(&args.output, dom_tree::to_html(&block))
        .with_context(|| format!("writing {}", args.output))?;
    println!("Decorated block written to {}.", args.output);
    Ok(())
}

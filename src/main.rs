use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetchtag::cli::{Cli, Commands};
use fetchtag::config::Config;
use fetchtag::orchestrator::{ConsolePrompter, InteractiveFlow, InteractiveOptions};
use fetchtag::tags::{self, TagField, TagSet};
use fetchtag::Fetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "fetchtag=debug"
    } else {
        "fetchtag=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        None => {
            let options = InteractiveOptions {
                output_dir: config.fetch.output_dir.clone(),
                quality: config.fetch.audio_quality,
                ..InteractiveOptions::default()
            };
            run_interactive(&config, options).await?;
        }
        Some(Commands::Fetch {
            url,
            tags: tag_args,
            output_dir,
            quality,
            yes,
        }) => {
            let options = InteractiveOptions {
                link: Some(url),
                preset: tag_args.into(),
                output_dir: output_dir.unwrap_or_else(|| config.fetch.output_dir.clone()),
                quality: quality.unwrap_or(config.fetch.audio_quality),
                confirm: !yes,
            };
            run_interactive(&config, options).await?;
        }
        Some(Commands::Tag {
            file,
            tags: tag_args,
        }) => {
            let wanted: TagSet = tag_args.into();
            // Fields not given keep whatever the file already has
            let existing = tags::read_tags_blocking(file.clone()).await?;
            let merged = wanted.non_blank().or(&existing);
            tags::write_tags_blocking(file.clone(), merged.clone()).await?;
            println!("Tags written to {}", file.display());
            println!("{}", merged);
        }
        Some(Commands::Show { file, json }) => {
            let tags = tags::read_tags_blocking(file).await?.or_defaults();
            if json {
                println!("{}", serde_json::to_string_pretty(&tags)?);
            } else {
                for field in TagField::ALL {
                    println!(
                        "{:<7} {:<6} {}",
                        field.label(),
                        format!("({})", field.atom_name()),
                        tags.get(field).unwrap_or_default()
                    );
                }
            }
        }
        Some(Commands::Config { show }) => {
            let config_path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            if show {
                config.display();
                println!("  Config File: {}", config_path.display());
            } else {
                config.save_to(&config_path)?;
                println!("Configuration written to {}", config_path.display());
                println!("Edit it to change the defaults.");
            }
        }
    }

    Ok(())
}

async fn run_interactive(config: &Config, options: InteractiveOptions) -> Result<()> {
    let fetcher = Fetcher::new(&config.fetch);
    check_dependencies(&fetcher).await;
    let mut prompter = ConsolePrompter::new();

    InteractiveFlow::new(fetcher, &mut prompter, options)
        .run()
        .await?;

    Ok(())
}

async fn check_dependencies(fetcher: &Fetcher) {
    // Missing tools only warn; the download itself reports the real failure
    if let Err(e) = fetcher.check_available().await {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in e.to_string().lines() {
            eprintln!("   • {}", dep);
        }
    }
}

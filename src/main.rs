use clap::Parser;
use cristal::{BackendRegistry, Config, ConfigError, ConverterContext, CristalError, cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), CristalError> {
    let args = cli::Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let root = args
        .root
        .canonicalize()
        .map_err(|e| ConfigError::CanonicalizeFailed {
            path: args.root.clone(),
            source: e,
        })?;
    let config = Config::read(&root)?;
    let wiki = config.wiki(args.wiki.as_deref())?;

    tracing::info!(
        "Root dir: {}; wiki: {} ({})",
        config.root_dir.display(),
        wiki.name,
        wiki.backend
    );

    let ctx = ConverterContext::from_config(&BackendRegistry::default(), wiki)?;
    let output = cli::run(&ctx, &args.command)
        .inspect_err(|e| tracing::error!("{e}"))?;
    println!("{output}");
    Ok(())
}

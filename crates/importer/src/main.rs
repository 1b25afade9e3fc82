use std::fs::File;

use anyhow::{Context, Result};
use config::Config;
use log::{info, warn};
use masjid_cms_client::Client;
use masjid_seed::{ContentStore, ImportReport, Importer, MemoryStore, SeedLoader};
use simplelog::{
    ColorChoice, CombinedLogger, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

mod config;

fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(&config)?;
    info!("starting import from {}", config.seed_dir);

    let report = if config.dry_run {
        info!("dry run: importing into an in-memory store");
        run(MemoryStore::new(), &config)?
    } else {
        let client = Client::new(&config.cms_url, config.api_token.clone(), config.timeout())
            .context("error creating cms client")?;
        client
            .health()
            .with_context(|| format!("cms at {} is not reachable", client.base_url()))?;
        run(client, &config)?
    };

    if report.is_clean() {
        info!("import finished\n{}", report);
    } else {
        warn!("import finished with errors\n{}", report);
    }
    info!("shutting down");

    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let level = config.level()?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &config.log_file {
        let file = File::create(path).context("error creating log file")?;
        loggers.push(WriteLogger::new(level, simplelog::Config::default(), file));
    }

    CombinedLogger::init(loggers).context("error initialising logger")?;

    Ok(())
}

/// Load every seed file and import it into `store`
fn run<S: ContentStore>(store: S, config: &Config) -> Result<ImportReport> {
    let loader =
        SeedLoader::open(config.seed_dir.clone()).context("error opening seed directory")?;
    let docs = loader.load();
    info!("loaded {} seed files from {}", docs.len(), loader.dir());

    let (report, _store) = Importer::new(store).run(&docs);

    Ok(report)
}

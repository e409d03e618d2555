use anyhow::Context;
use person_enricher::config::Config;
use person_enricher::enricher::Enricher;
use person_enricher::handler::Handler;
use person_enricher::repo::InMemoryPeople;
use person_enricher::{cli, server};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::build_cli();
    let matches = cmd.get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("person-enricher {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = Config::from_env().context("could not read config")?;
    let enricher = Enricher::new(&cfg).context("could not build enricher")?;
    let handler = Handler::new(Arc::new(InMemoryPeople::new()), Arc::new(enricher));

    server::run_stdio_server(handler).await
}

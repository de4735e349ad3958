mod app_config;
mod common;
mod config;
mod error;
mod portal;
mod request_config;
mod resolver;
mod url_params;
mod view;
mod viewpoint;

use tracing::{info, warn};

use crate::{
    app_config::Settings,
    error::BootstrapError,
    resolver::Resolver,
    view::{App, LogRenderer},
};

#[tokio::main]
async fn main() -> Result<(), BootstrapError> {
    tracing_subscriber::fmt().init();

    let settings = Settings::build()?;
    let resolver = Resolver::new(settings)?;
    let resolved = resolver.resolve().await?;

    if !resolved.errors.is_empty() {
        warn!(
            "{} bootstrap branch(es) failed; continuing with partial results",
            resolved.errors.len()
        );
    }

    let mut app = App::new();
    let mut renderer = LogRenderer;
    app.init(Some(&resolved), &mut renderer)?;

    match &app.page.title {
        Some(title) => info!("Application ready: {title}"),
        None => info!("Application ready"),
    }

    Ok(())
}

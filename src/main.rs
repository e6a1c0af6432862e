// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use clap::Parser;
use hackmailer::hackmailer_version;
use hackmailer::modules::{
    context::MailerContext, error::MailerResult, logger, rest::start_http_server,
    settings::cli::Settings,
};
use mimalloc::MiMalloc;
use tracing::{error, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
  _   _            _    __  __       _ _
 | | | | __ _  ___| | _|  \/  | __ _(_) | ___ _ __
 | |_| |/ _` |/ __| |/ / |\/| |/ _` | | |/ _ \ '__|
 |  _  | (_| | (__|   <| |  | | (_| | | |  __/ |
 |_| |_|\__,_|\___|_|\_\_|  |_|\__,_|_|_|\___|_|
"#;

#[tokio::main]
async fn main() -> MailerResult<()> {
    let settings = Settings::parse();
    logger::initialize_logging(&settings);
    info!("{}", LOGO);
    info!("Starting hackmailer");
    info!("Version:  {}", hackmailer_version!());

    // a provider may already be installed by another dependency
    let _ = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::ring::default_provider(),
    );

    let context = match MailerContext::new(settings) {
        Ok(context) => Arc::new(context),
        Err(error) => {
            error!("Failed to initialize mailer: {}", error);
            return Err(error);
        }
    };

    let status = context.status().await;
    info!(
        "Mail transport: installed={} configured={} provider={}",
        status.installed,
        status.configured,
        status
            .provider
            .map(|provider| provider.as_str())
            .unwrap_or("none")
    );

    start_http_server(context).await
}

use clap::Parser;
use gauss::app::Application;
use gauss::cli::Args;
use gauss::commands::create_command_registry;
use gauss::config::Config;
use gauss::display;
use gauss::document::SourceLoader;
use gauss::logging::init_tracing;
use gauss::providers::ProviderRegistry;
use gauss::session::Conversation;
use gauss::GaussError;
use std::sync::Arc;

async fn run(args: Args) -> Result<(), GaussError> {
    let config = Config::load()?;
    let registry = config.apply_base_urls(ProviderRegistry::builtin());
    let loader = SourceLoader::new(config.loader_settings())?;
    let conversation = Conversation::new(Arc::new(loader), Arc::new(registry));

    let app = Application::new(args, config, create_command_registry());
    app.run(conversation).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        display::display_error(&e);
        std::process::exit(1);
    }
}

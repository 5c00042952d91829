//! CLI entry point for tidy.

mod cli;

use clap::Parser;
use std::sync::Arc;
use tidy::api::{ApiClient, RateLimitPolicy, RateLimitedClient};
use tidy::build_info;
use tidy::config::{load_config, Config};
use tidy::error::{ConfigError, StartupError};
use tidy::guard::AllowedRoot;
use tidy::logging;
use tidy::mcp::ToolSession;
use tidy::preflight;
use tidy::review::{self, AbortReason, Completion, Outcome, RunContext};
use tidy::startup::{ask_organization_context, select_target_directory};
use tidy::ui::render::{RenderSink, Renderer};
use tidy::ui::terminal::StdinConsole;

#[tokio::main]
async fn main() {
    // A missing .env is fine; the process environment still applies.
    dotenv::dotenv().ok();
    let args = cli::Args::parse();

    let config = match load_config() {
        Ok(config) => apply_cli_overrides(config, &args),
        Err(e) => {
            let renderer = Renderer::new(!args.no_color);
            renderer.error(&format!("{e}"));
            if let Some(hint) = config_error_hint(&e) {
                renderer.detail(hint);
            }
            std::process::exit(1);
        }
    };
    logging::init(config.display.debug);

    let renderer = Renderer::new(config.display.color);
    if let Err(e) = run(&config, &args, renderer).await {
        renderer.error(&format!("{e}"));
        std::process::exit(1);
    }
}

/// Follow-up advice for a config failure. Only a missing setting has an
/// obvious remedy; an invalid value is explained by the error itself.
fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::Missing(_) => {
            Some("Set it in the environment or in a .env file next to where you run tidy.")
        }
        ConfigError::Invalid(_) => None,
    }
}

fn apply_cli_overrides(mut config: Config, args: &cli::Args) -> Config {
    if let Some(dir) = &args.target_dir {
        config.paths.default_target_dir = Some(dir.clone());
    }
    if let Some(root) = &args.allowed_root {
        config.paths.allowed_root = root.clone();
    }
    if let Some(model) = &args.model {
        config.api.model = model.clone();
    }
    if args.debug {
        config.display.debug = true;
    }
    if args.no_color {
        config.display.color = false;
    }
    config
}

async fn run(config: &Config, args: &cli::Args, renderer: Renderer) -> Result<(), StartupError> {
    preflight::validate_config(config)?;

    renderer.header(&config.api.model);
    renderer.field("build", &build_info::startup_metadata_line());
    if config.display.debug {
        renderer.field("debug", "on");
    }

    let root = AllowedRoot::resolve(&config.paths.allowed_root)?;
    let mut console = StdinConsole::new(renderer);
    let target = select_target_directory(
        config.paths.default_target_dir.as_deref(),
        &root,
        &mut console,
        &renderer,
    )?;
    let user_context = ask_organization_context(args.context.as_deref(), &mut console);

    renderer.activity("Starting the filesystem tool server...");
    let session = ToolSession::start(&config.server, &target).await?;

    let sink: Arc<dyn RenderSink> = Arc::new(renderer);
    let client = RateLimitedClient::new(
        ApiClient::new(&config.api),
        RateLimitPolicy::from(config.retry),
        sink,
    );
    let mut ctx = RunContext::new(target, user_context, config.display.debug);

    let outcome = review::organize(session, &client, &mut console, &renderer, &mut ctx).await?;
    match outcome {
        Outcome::Done(Completion::NothingToOrganize) => {}
        Outcome::Done(Completion::Executed(report)) => {
            tracing::info!(summary = %report.summary(), "plan executed");
        }
        Outcome::Aborted(AbortReason::Rejected | AbortReason::InputClosed) => {
            renderer.detail("No changes were made.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_settings_get_the_env_hint() {
        assert!(config_error_hint(&ConfigError::Missing("GOOGLE_API_KEY"))
            .is_some_and(|hint| hint.contains(".env")));
        assert_eq!(
            config_error_hint(&ConfigError::Invalid(
                "DEBUG must be true or false, got `sometimes`".into()
            )),
            None
        );
    }
}

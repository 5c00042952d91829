//! tidy: organize a directory with an AI-proposed plan you approve first.
//!
//! A Gemini model looks at the listing of one target directory and proposes
//! `create_directory`/`move_file` steps. Nothing happens until the user
//! approves the exact plan, which is then replayed through an MCP filesystem
//! server scoped to that directory.
//!
//! # Quick start
//!
//! ```no_run
//! use tidy::api::{ApiClient, RateLimitPolicy, RateLimitedClient};
//! use tidy::config::load_config;
//! use tidy::guard::{self, AllowedRoot};
//! use tidy::mcp::ToolSession;
//! use tidy::review::{self, RunContext};
//! use tidy::ui::render::Renderer;
//! use tidy::ui::terminal::StdinConsole;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let root = AllowedRoot::resolve(&config.paths.allowed_root)?;
//! let target = guard::validate("~/Downloads", &root)?;
//! let renderer = Renderer::new(true);
//! let client = RateLimitedClient::new(
//!     ApiClient::new(&config.api),
//!     RateLimitPolicy::from(config.retry),
//!     Arc::new(renderer),
//! );
//! let session = ToolSession::start(&config.server, &target).await?;
//! let mut console = StdinConsole::new(renderer);
//! let mut ctx = RunContext::new(target, None, false);
//! // Stops the server before returning, whatever the outcome.
//! let outcome = review::organize(session, &client, &mut console, &renderer, &mut ctx).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod build_info;
pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod mcp;
pub mod plan;
pub mod preflight;
pub mod prompt;
pub mod review;
pub mod startup;
#[cfg(test)]
pub mod testsupport;
pub mod types;
pub mod ui;

//! CLI commands
//!
//! Command implementations for the `store-submit` binary.

mod auth;
mod commit;
mod media;
mod monitor;
mod progress;
mod style;
mod update;

pub use auth::{run_auth, AuthAction};
pub use commit::{run_commit, run_remove_submission, run_status};
pub use media::run_upload_media;
pub use monitor::run_monitor;
pub use update::run_update;

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use store_submit::error::{Error, Result};

/// Ask a yes/no question, defaulting to no
pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| Error::Io(std::io::Error::other(e)))
}

//! Auth command - test and explain store authentication

use crate::cli::style::{check, Stylize};
use anstream::println;
use store_submit::auth::get_store_auth;
use store_submit::config::Config;
use store_submit::error::Result;
use store_submit::transport::create_transport;

/// Auth subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// Acquire a token and make one authenticated call
    Test,
    /// Print setup instructions
    Setup,
}

/// Run the auth test command
pub async fn run_auth_test(config: &Config) -> Result<()> {
    println!("Testing store authentication...");
    let auth = get_store_auth()?;
    println!("Credential source: {:?}", auth.source());

    let transport = create_transport(config)?;
    let count = store_submit::auth::test_store_auth(transport.as_ref()).await?;
    println!(
        "{} Authenticated against {} ({} application{} visible)",
        check(),
        config.service_url.accent(),
        count,
        if count == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup() {
    println!("{}", "Store Authentication Setup".emphasis());
    println!("==========================");
    println!();
    println!("Option 1: Azure AD application (recommended)");
    println!("  Associate an Azure AD application with your Partner Center account,");
    println!("  then set:");
    println!("    STORE_TENANT_ID      directory (tenant) id");
    println!("    STORE_CLIENT_ID      application (client) id");
    println!("    STORE_CLIENT_SECRET  client secret");
    println!("  Optionally STORE_AUTHORITY to use a non-default token authority.");
    println!();
    println!("Option 2: Pre-issued token");
    println!("  Set STORE_ACCESS_TOKEN to a bearer token for the submission API.");
    println!("  Tokens expire after an hour; long uploads may outlive them.");
    println!();
    println!("Mail notifications (monitor --notify) need Option 1: the pre-issued");
    println!("token is not accepted by Microsoft Graph. They also need mail_sender");
    println!("in the config file (or STORE_SUBMIT_MAIL_SENDER) and Mail.Send");
    println!("permission for the application.");
}

/// Wrapper for auth commands
pub async fn run_auth(config: &Config, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Test => run_auth_test(config).await,
        AuthAction::Setup => {
            run_auth_setup();
            Ok(())
        }
    }
}

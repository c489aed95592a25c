//! store-submit - store submissions from the command line
//!
//! CLI binary for cloning, patching, committing and monitoring app, flight
//! and in-app product submissions.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use store_submit::config::Config;
use store_submit::submit::{PackageMode, UpdateOptions};
use store_submit::types::{PublishMode, SubmissionTarget};
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "store-submit")]
#[command(about = "Clone, patch, commit and monitor store submissions")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to <config dir>/store-submit/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which product (or flight) the command acts on
#[derive(Args, Debug, Clone)]
struct TargetArgs {
    /// Application id
    #[arg(long, required_unless_present = "iap")]
    app: Option<String>,

    /// Flight id of the application
    #[arg(long, requires = "app")]
    flight: Option<String>,

    /// In-app product id
    #[arg(long, conflicts_with_all = ["app", "flight"])]
    iap: Option<String>,
}

impl TargetArgs {
    fn into_target(self) -> Result<SubmissionTarget> {
        match (self.app, self.flight, self.iap) {
            (Some(app_id), Some(flight_id), None) => Ok(SubmissionTarget::Flight { app_id, flight_id }),
            (Some(app_id), None, None) => Ok(SubmissionTarget::App { app_id }),
            (None, None, Some(iap_id)) => Ok(SubmissionTarget::InAppProduct { iap_id }),
            _ => anyhow::bail!("specify --app [--flight] or --iap"),
        }
    }
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct UpdateArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// JSON submission data to apply
    #[arg(long)]
    data: PathBuf,

    /// Package archive to upload after the update
    #[arg(long)]
    package: Option<PathBuf>,

    /// Append the packages listed in the submission data
    #[arg(long, conflicts_with = "replace_packages")]
    add_packages: bool,

    /// Flag existing packages for deletion, then add the listed ones
    #[arg(long)]
    replace_packages: bool,

    /// Replace listings
    #[arg(long)]
    listings: bool,

    /// Copy publish mode, date and visibility from the submission data
    #[arg(long)]
    publish_mode_and_visibility: bool,

    /// Copy pricing and availability
    #[arg(long)]
    pricing_and_availability: bool,

    /// Copy app properties (category, hardware preferences, ...)
    #[arg(long)]
    app_properties: bool,

    /// Copy in-app product properties (content type, keywords, ...)
    #[arg(long)]
    iap_properties: bool,

    /// Copy gaming options
    #[arg(long)]
    gaming_options: bool,

    /// Copy trailers
    #[arg(long)]
    trailers: bool,

    /// Copy notes for certification
    #[arg(long)]
    notes: bool,

    /// Publish mode override (Immediate, Manual, SpecificDate, Default)
    #[arg(long)]
    publish_mode: Option<PublishMode>,

    /// Publish date override (RFC 3339), requires SpecificDate
    #[arg(long)]
    publish_date: Option<DateTime<Utc>>,

    /// Resume this pending submission instead of cloning
    #[arg(long)]
    submission_id: Option<String>,

    /// Delete an existing pending submission first
    #[arg(long, conflicts_with = "submission_id")]
    force: bool,

    /// Commit after updating (and uploading)
    #[arg(long)]
    auto_commit: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

impl UpdateArgs {
    fn options(&self) -> Result<UpdateOptions> {
        Ok(UpdateOptions {
            packages: PackageMode::from_flags(self.add_packages, self.replace_packages)?,
            update_listings: self.listings,
            update_publish_mode_and_visibility: self.publish_mode_and_visibility,
            update_pricing_and_availability: self.pricing_and_availability,
            update_app_properties: self.app_properties,
            update_properties: self.iap_properties,
            update_gaming_options: self.gaming_options,
            update_trailers: self.trailers,
            update_notes_for_certification: self.notes,
            target_publish_mode: self.publish_mode,
            target_publish_date: self.publish_date,
            package_path: self.package.clone(),
            submission_id: self.submission_id.clone(),
            auto_commit: self.auto_commit,
            force: self.force,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Clone the published submission, apply changes and optionally commit
    Update(UpdateArgs),

    /// Commit a pending submission
    Commit {
        #[command(flatten)]
        target: TargetArgs,

        /// Submission to commit
        #[arg(long)]
        submission_id: String,
    },

    /// Show the status of a submission
    Status {
        #[command(flatten)]
        target: TargetArgs,

        /// Submission to inspect
        #[arg(long)]
        submission_id: String,
    },

    /// Poll a submission until it fails or reaches its final state
    Monitor {
        #[command(flatten)]
        target: TargetArgs,

        /// Submission to watch
        #[arg(long)]
        submission_id: String,

        /// Seconds between polls (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,

        /// Mail every status change to this address
        #[arg(long = "notify", value_name = "EMAIL")]
        recipients: Vec<String>,
    },

    /// Delete a pending submission
    RemoveSubmission {
        #[command(flatten)]
        target: TargetArgs,

        /// Submission to delete
        #[arg(long)]
        submission_id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Upload pending listing images of a submission
    UploadMedia {
        /// Application id
        #[arg(long)]
        app: String,

        /// Pending submission the images belong to
        #[arg(long)]
        submission_id: String,

        /// Listing language (e.g. en-us)
        #[arg(long)]
        language: String,

        /// Directory holding the image files
        #[arg(long)]
        media_dir: PathBuf,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthCommand,
    },
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("STORE_SUBMIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("warn,store_submit=info"),
        _ => EnvFilter::new("info,store_submit=debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::load()?);
    };
    Ok(Config::load_from(path)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Update(args) => {
            let options = args.options()?;
            let target = args.target.clone().into_target()?;
            cli::run_update(&config, &target, &args.data, &options, args.yes).await?;
        }
        Commands::Commit {
            target,
            submission_id,
        } => {
            cli::run_commit(&config, &target.into_target()?, &submission_id).await?;
        }
        Commands::Status {
            target,
            submission_id,
        } => {
            cli::run_status(&config, &target.into_target()?, &submission_id).await?;
        }
        Commands::Monitor {
            target,
            submission_id,
            interval,
            recipients,
        } => {
            cli::run_monitor(
                &config,
                &target.into_target()?,
                &submission_id,
                interval,
                recipients,
            )
            .await?;
        }
        Commands::RemoveSubmission {
            target,
            submission_id,
            yes,
        } => {
            cli::run_remove_submission(&config, &target.into_target()?, &submission_id, yes).await?;
        }
        Commands::UploadMedia {
            app,
            submission_id,
            language,
            media_dir,
        } => {
            cli::run_upload_media(&config, &app, &submission_id, &language, &media_dir).await?;
        }
        Commands::Auth { action } => {
            let action = match action {
                AuthCommand::Test => cli::AuthAction::Test,
                AuthCommand::Setup => cli::AuthAction::Setup,
            };
            cli::run_auth(&config, action).await?;
        }
    }

    Ok(())
}

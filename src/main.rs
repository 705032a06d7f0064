use anyhow::Result;
use aurbump::commands::{self, Options};
use clap::Parser;

/// aurbump - keep an AUR package in step with upstream GitHub releases
///
/// Checks the latest upstream release and, when it differs from the last
/// processed version, bumps the PKGBUILD, regenerates .SRCINFO and records
/// the new version. Results are reported on the configured notification
/// channels (NOTIFY_DESKTOP, NOTIFICATION_EMAIL + SMTP_*, DISCORD_WEBHOOK_URL,
/// SLACK_WEBHOOK_URL).
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for authentication.
///
/// Examples:
///   aurbump check
///   aurbump --pkgbuild ~/aur/gitbutler/PKGBUILD --build-number 2433 check
#[derive(Parser, Debug)]
#[command(author, version = env!("AURBUMP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: Options,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check upstream and update PKGBUILD and .SRCINFO
    Check,

    /// Send a test "new version available" notification
    NotifyTest(NotifyTestArgs),
}

#[derive(clap::Args, Debug)]
pub struct NotifyTestArgs {
    /// Version shown in the test notification
    #[arg(value_name = "VERSION", default_value = "0.0.0")]
    pub sample_version: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let runtime = aurbump::runtime::RealRuntime;

    match cli.command {
        Commands::Check => commands::check(runtime, &cli.options).await?,
        Commands::NotifyTest(args) => {
            let delivered =
                commands::notify_test(runtime, &cli.options, &args.sample_version).await?;
            if delivered.is_empty() {
                println!("No notification delivered");
            } else {
                println!("Notification sent via: {}", delivered.join(", "));
            }
        }
    }
    Ok(())
}

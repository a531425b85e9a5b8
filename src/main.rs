use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use resend_relay::admin::{self, ToolResult};
use resend_relay::config::DEFAULT_CONFIG_PATH;
use resend_relay::{MailerSettings, ReqwestTransport};

/// Admin actions for the Resend relay
#[derive(Parser, Debug)]
#[command(name = "resend-relay")]
#[command(about = "Check the Resend connection or send a test email", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the relay settings file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify the API key and the sender domain
    Check,
    /// Send a test email through Resend
    Test {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Site name used in the subject line
        #[arg(long, default_value = "Resend Relay")]
        site_name: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let settings = match MailerSettings::load(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            log::error!("[admin] {}", e);
            return report(&ToolResult {
                ok: false,
                message: format!("Could not load settings: {}", e),
                details: None,
            });
        }
    };
    if let Err(e) = settings.validate() {
        log::warn!("[admin] Settings problem: {}", e);
    }

    let transport = ReqwestTransport;
    let result = match cli.command {
        Commands::Check => admin::check_connection(&settings, &transport),
        Commands::Test { to, site_name } => {
            admin::send_test_email(&settings, &to, &site_name, &transport)
        }
    };
    report(&result)
}

fn report(result: &ToolResult) -> ExitCode {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{}", result.message),
    }
    if result.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

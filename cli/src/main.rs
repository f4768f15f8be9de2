use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use grinder_core::{ClientConfig, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "grinder", about = "Post to a chat channel as your own account")]
struct Cli {
    /// Override DISCORD_API_BASE.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print the account behind DISCORD_TOKEN.
    Whoami,
    /// Send a message, optionally showing as typing first.
    Send {
        #[arg(long)]
        channel: String,
        #[arg(long, default_value_t = 0.0)]
        typing_secs: f64,
        content: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("grinder error: {}", render_error(&err));
        std::process::exit(1);
    }
}

/// One line, outermost context first, each cause once.
fn render_error(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env().context("loading configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let session = Session::connect(&config)?;

    match cli.command {
        Command::Whoami => {
            let user = session.user();
            println!("{} ({})", user.tag(), user.id);
        }
        Command::Send {
            channel,
            typing_secs,
            content,
        } => {
            let typing = Duration::try_from_secs_f64(typing_secs)
                .with_context(|| format!("invalid --typing-secs {typing_secs}"))?;
            let message = session.send_message(&content, &channel, typing)?;
            println!("sent {} to {}", message.id, message.channel_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_with_typing() {
        let cli = Cli::try_parse_from(["grinder", "send", "--channel", "42", "--typing-secs", "12.5", "pls beg"]).unwrap();
        match cli.command {
            Command::Send {
                channel,
                typing_secs,
                content,
            } => {
                assert_eq!(channel, "42");
                assert!((typing_secs - 12.5).abs() < f64::EPSILON);
                assert_eq!(content, "pls beg");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn base_url_is_global() {
        let cli = Cli::try_parse_from(["grinder", "whoami", "--base-url", "http://127.0.0.1:3000"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:3000"));
        assert!(matches!(cli.command, Command::Whoami));
    }

    #[test]
    fn user_info_failure_renders_cause_once() {
        use grinder_core::ApiError;

        let err = anyhow::Error::from(ApiError::UserInfo(Box::new(ApiError::Unauthorized)));
        assert_eq!(
            render_error(&err),
            "could not get user information: invalid authorization, try using a new token"
        );

        let err = err.context("connecting");
        assert_eq!(
            render_error(&err),
            "connecting: could not get user information: invalid authorization, try using a new token"
        );
    }

    #[test]
    fn send_requires_channel() {
        assert!(Cli::try_parse_from(["grinder", "send", "pls beg"]).is_err());
    }
}

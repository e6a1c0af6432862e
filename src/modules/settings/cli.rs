// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser, ValueEnum};
use std::{fmt, path::PathBuf, time::Duration};

use crate::{
    modules::error::{code::ErrorCode, MailerResult},
    raise_error,
};

#[derive(Debug, Clone, Parser)]
#[clap(
    name = "hackmailer",
    about = "Outbound mail dispatch for the hackathon platform: SMTP transport resolution,
    send pacing, retry of provider throttling, templated and bulk notifications.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// Explicit SMTP host. Takes precedence over the Gmail shortcut when set.
    #[clap(long, env, help = "Set the SMTP host (e.g. smtp.example.com)")]
    pub smtp_host: Option<String>,

    #[clap(long, env, default_value = "587", help = "Set the SMTP port")]
    pub smtp_port: u16,

    #[clap(long, env, help = "Set the SMTP user name")]
    pub smtp_user: Option<String>,

    #[clap(long, env, help = "Set the SMTP password")]
    pub smtp_pass: Option<String>,

    /// Connection security. Defaults to implicit TLS on port 465 and opportunistic STARTTLS otherwise.
    #[clap(long, env, value_enum, help = "Set the SMTP connection security")]
    pub smtp_encryption: Option<Encryption>,

    #[clap(
        long,
        env,
        help = "Set the sender address used for outgoing mail",
        value_parser = ValueParser::new(|s: &str| {
            crate::modules::utils::validate_email(s)
                .map(|_| s.to_string())
                .map_err(|e| e.to_string())
        })
    )]
    pub smtp_from: Option<String>,

    #[clap(
        long,
        env,
        default_value = "Hackathon Platform",
        help = "Set the default sender display name"
    )]
    pub mail_from_name: String,

    #[clap(long, env, help = "Set the Gmail account used when no SMTP host is configured")]
    pub gmail_user: Option<String>,

    #[clap(long, env, help = "Set the Gmail app password")]
    pub gmail_pass: Option<String>,

    /// When enabled, a missing mail transport is a fatal error instead of a mocked send.
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Fail instead of mocking sends when no transport is configured"
    )]
    pub email_force_send: bool,

    #[clap(
        long,
        env,
        default_value = "30",
        help = "Set the SMTP connect and command timeout in seconds"
    )]
    pub smtp_timeout_secs: u64,

    #[clap(
        long,
        env,
        default_value = "4",
        help = "Set the maximum number of pooled SMTP connections",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub smtp_pool_size: u32,

    #[clap(
        long,
        env,
        default_value = "1000",
        help = "Set the minimum interval between two sends in milliseconds (0 disables)"
    )]
    pub mail_min_send_interval_ms: u64,

    #[clap(
        long,
        env,
        default_value = "3",
        help = "Set the maximum number of send attempts on provider throttling",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub mail_retry_max_attempts: u32,

    #[clap(
        long,
        env,
        default_value = "2000",
        help = "Set the base retry delay in milliseconds (multiplied by the attempt number)"
    )]
    pub mail_retry_base_delay_ms: u64,

    #[clap(
        long,
        env,
        default_value = "5",
        help = "Set the number of messages dispatched concurrently per bulk batch"
    )]
    pub mail_bulk_batch_size: usize,

    #[clap(
        long,
        env,
        default_value = "3000",
        help = "Set the pause between bulk batches in milliseconds"
    )]
    pub mail_bulk_batch_delay_ms: u64,

    #[clap(
        long,
        env,
        default_value = "10",
        help = "Set the timeout for downloading template attachments in seconds"
    )]
    pub mail_attachment_timeout_secs: u64,

    #[clap(
        long,
        env,
        help = "Set the path of the JSON template and tenant catalog",
        value_parser = ValueParser::new(|s: &str| {
            let path = PathBuf::from(s);
            if !path.is_file() {
                return Err(format!("Catalog {:?} does not exist or is not a file", path));
            }
            Ok(path)
        })
    )]
    pub mailer_catalog: Option<PathBuf>,

    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address the HTTP server binds to",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub mailer_http_bind: String,

    #[clap(long, env, default_value = "15640", help = "Set the HTTP port")]
    pub mailer_http_port: u16,

    #[clap(long, default_value = "info", env, help = "Set the log level")]
    pub mailer_log_level: String,

    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub mailer_ansi_logs: bool,

    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub mailer_log_to_file: bool,

    #[clap(long, env, default_value = "./logs", help = "Set the log file directory")]
    pub mailer_log_dir: PathBuf,

    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub mailer_max_log_files: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Encryption {
    #[clap(name = "ssl")]
    Ssl,
    #[clap(name = "starttls")]
    StartTls,
    /// STARTTLS when the server advertises it, clear text otherwise.
    #[clap(name = "auto")]
    Auto,
    #[clap(name = "none")]
    None,
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encryption::Ssl => write!(f, "ssl"),
            Encryption::StartTls => write!(f, "starttls"),
            Encryption::Auto => write!(f, "auto"),
            Encryption::None => write!(f, "none"),
        }
    }
}

impl Encryption {
    pub fn for_port(port: u16) -> Self {
        if port == 465 {
            Encryption::Ssl
        } else {
            Encryption::Auto
        }
    }
}

impl Settings {
    /// Reads settings from the process environment only, ignoring command line arguments.
    pub fn from_env() -> MailerResult<Self> {
        Self::try_parse_from(["hackmailer"])
            .map_err(|e| raise_error!(format!("{}", e), ErrorCode::MissingConfiguration))
    }

    pub fn smtp_timeout(&self) -> Duration {
        Duration::from_secs(self.smtp_timeout_secs)
    }

    pub fn min_send_interval(&self) -> Duration {
        Duration::from_millis(self.mail_min_send_interval_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.mail_retry_base_delay_ms)
    }

    pub fn bulk_batch_delay(&self) -> Duration {
        Duration::from_millis(self.mail_bulk_batch_delay_ms)
    }

    pub fn attachment_timeout(&self) -> Duration {
        Duration::from_secs(self.mail_attachment_timeout_secs)
    }

    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_pass: None,
            smtp_encryption: None,
            smtp_from: None,
            mail_from_name: "Hackathon Platform".into(),
            gmail_user: None,
            gmail_pass: None,
            email_force_send: false,
            smtp_timeout_secs: 30,
            smtp_pool_size: 4,
            mail_min_send_interval_ms: 0,
            mail_retry_max_attempts: 3,
            mail_retry_base_delay_ms: 2000,
            mail_bulk_batch_size: 5,
            mail_bulk_batch_delay_ms: 0,
            mail_attachment_timeout_secs: 10,
            mailer_catalog: None,
            mailer_http_bind: "127.0.0.1".into(),
            mailer_http_port: 15640,
            mailer_log_level: "info".into(),
            mailer_ansi_logs: false,
            mailer_log_to_file: false,
            mailer_log_dir: PathBuf::from("./logs"),
            mailer_max_log_files: 5,
        }
    }
}

//! Authentication commands.
//!
//! The token issued at login is kept in the data directory and sent with
//! every later command.

use clap::{Args, Subcommand};
use std::io::{self, Write};

use larder_core::{Credentials, FileTokenStore, PasswordChange, ProfileUpdate, Session};

use super::{parse_metadata, print_json, CommandError, OutputFormat};
use crate::config::Config;

/// Authentication commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Log in with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(long, short)]
        email: Option<String>,

        /// Password (read from LARDER_PASSWORD or prompted when omitted)
        #[arg(long, env = "LARDER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and discard the stored token
    Logout,
    /// Show the logged-in user's profile
    Whoami {
        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Change the logged-in user's name, surname or metadata
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        surname: Option<String>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Change the password
    Passwd {
        /// Current password (prompted when omitted)
        #[arg(long, env = "LARDER_PASSWORD", hide_env_values = true)]
        current: Option<String>,

        /// New password (prompted when omitted)
        #[arg(long, env = "LARDER_NEW_PASSWORD", hide_env_values = true)]
        new: Option<String>,
    },
    /// Show whether a token is stored
    Status,
}

impl AuthCommand {
    pub async fn run(&self, session: &Session, config: &Config) -> Result<(), CommandError> {
        match &self.command {
            AuthSubcommand::Login { email, password } => {
                let email = match email {
                    Some(e) => e.clone(),
                    None => prompt("Email: ")?,
                };
                let password = match password {
                    Some(p) => p.clone(),
                    None => prompt("Password: ")?,
                };

                let user = session.login(&Credentials { email, password }).await?;
                println!("Logged in as {} <{}>", user.full_name(), user.email);
                Ok(())
            }

            AuthSubcommand::Logout => {
                if !session.is_authenticated() {
                    println!("Not logged in.");
                    return Ok(());
                }
                session.logout().await?;
                println!("Logged out.");
                Ok(())
            }

            AuthSubcommand::Whoami { format } => {
                let user = session.profile().await?;
                match format {
                    OutputFormat::Json => print_json(&user)?,
                    OutputFormat::Table => {
                        println!("{}", user.full_name());
                        println!("  email: {}", user.email);
                        println!("  id:    {}", user.id);
                    }
                }
                Ok(())
            }

            AuthSubcommand::Profile {
                name,
                surname,
                metadata,
            } => {
                if name.is_none() && surname.is_none() && metadata.is_none() {
                    return Err(CommandError::Input(
                        "Nothing to update: pass --name, --surname or --metadata".to_string(),
                    ));
                }
                let mut update = ProfileUpdate::from_user(&session.profile().await?);
                if let Some(name) = name {
                    update.name = name.clone();
                }
                if let Some(surname) = surname {
                    update.surname = surname.clone();
                }
                if let Some(metadata) = parse_metadata(metadata.as_deref())? {
                    update.metadata = Some(metadata);
                }

                let user = session.update_profile(&update).await?;
                println!("Updated profile: {} <{}>", user.full_name(), user.email);
                Ok(())
            }

            AuthSubcommand::Passwd { current, new } => {
                let current_password = match current {
                    Some(p) => p.clone(),
                    None => prompt("Current password: ")?,
                };
                let new_password = match new {
                    Some(p) => p.clone(),
                    None => prompt("New password: ")?,
                };

                session
                    .change_password(&PasswordChange {
                        current_password,
                        new_password,
                    })
                    .await?;
                println!("Password changed.");
                Ok(())
            }

            AuthSubcommand::Status => {
                let token_path = FileTokenStore::new(config.data_dir.value.clone()).path();
                if session.is_authenticated() {
                    println!("Logged in (token: {})", token_path.display());
                } else {
                    println!("Not logged in.");
                    println!("Run 'larder auth login' to authenticate.");
                }
                println!("Server: {}", session.gateway().base_url());
                Ok(())
            }
        }
    }
}

fn prompt(label: &str) -> Result<String, CommandError> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        return Err(CommandError::Input(format!(
            "{} cannot be empty",
            label.trim_end_matches(": ")
        )));
    }
    Ok(value)
}

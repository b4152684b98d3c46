use clap::{Parser, Subcommand};

use crate::commands::{change_password::ChangePasswordCmd, create_user::CreateUserCmd};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for tcms - manages staff accounts of the content management server."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Creates staff account, which can sign in to admin
    CreateUser(CreateUserCmd),
    /// Sets new password for existing account
    ChangePassword(ChangePasswordCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::CreateUser(cmd) => cmd.run().await,
            Command::ChangePassword(cmd) => cmd.run().await,
        }
    }
}

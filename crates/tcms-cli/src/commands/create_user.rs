use clap::Args;
use garde::Validate as _;
use tcms_types::{config::BackendConfig, general::ValidEmail};
use tracing::info;

use crate::commands::{create_user_repository, Executor};

#[derive(Args, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name")]
    name: String,
    #[arg(short, long, help = "User email, used as username")]
    pub email: ValidEmail,
    #[arg(short, long, help = "User password, at least 8 characters")]
    pub password: String,
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = create_user_repository(&self.backend.database_url()).await?;
        let new_user = tcms_dal::user::CreateUser {
            name: self.name,
            email: self.email,
            password: self.password,
        };
        new_user.validate()?;
        let user = repository.create(new_user).await?;
        info!("Created user {} ({})", user.email, user.id);

        Ok(())
    }
}

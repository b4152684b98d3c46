pub mod change_password;
pub mod create_user;

use tcms_dal::user::UserRepository;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

/// Opens (and migrates) database, so CLI can be used before first server start
pub async fn create_user_repository(database_url: &str) -> anyhow::Result<UserRepository> {
    let pool = tcms_dal::new_pool(database_url).await?;
    tcms_dal::migrate(&pool).await?;
    Ok(UserRepository::new(pool))
}

pub mod rest;

use std::path::Path;

use anyhow::{Result, anyhow};
use rand::Rng as _;
use reqwest::Url;
use tcms_dal::user::{CreateUser, UserRepository};
use tcms_server::config::{Parser, ServerConfig};
use tempfile::TempDir;
use tracing::info;

pub const TEST_USER_EMAIL: &str = "editor@example.com";
pub const TEST_USER_PASSWORD: &str = "kathmandu-valley";

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(
    test_name: &str,
    base_dir: &Path,
    extra_args: &[&str],
) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let base_url = format!("http://localhost:{}", port);
    let mut args = vec![
        "tcms-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    args.extend_from_slice(extra_args);
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Fresh data directory with migrated database and one staff user
pub async fn prepare_env_with(
    test_name: &str,
    extra_args: &[&str],
) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    let (config, guard) = test_config(test_name, &base_dir, extra_args)?;
    let pool = tcms_dal::new_pool(&config.database_url()).await?;
    tcms_dal::migrate(&pool).await?;
    let users = UserRepository::new(pool.clone());
    users
        .create(CreateUser {
            name: "Editor".to_string(),
            email: TEST_USER_EMAIL.parse()?,
            password: TEST_USER_PASSWORD.to_string(),
        })
        .await?;
    pool.close().await;
    Ok((config, guard))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    prepare_env_with(test_name, &[]).await
}

/// Starts server in background and waits until it answers health checks
pub async fn spawn_server(config: ServerConfig) -> Result<()> {
    let health_url = config.base_url.join("health")?;
    tokio::spawn(async move {
        if let Err(e) = tcms_server::run::run(config).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(response) = client.get(health_url.clone()).send().await {
            if response.status().is_success() {
                return Ok(());
            }
        }
    }
    Err(anyhow!("Server did not start"))
}

/// Client with cookie store, no redirects followed, so guard redirects can be checked
pub fn client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

pub async fn login(client: &reqwest::Client, base_url: &Url) -> Result<()> {
    let url = base_url.join("auth/login")?;
    let response = client
        .post(url)
        .json(&serde_json::json!({"email": TEST_USER_EMAIL, "password": TEST_USER_PASSWORD}))
        .send()
        .await?;
    info!("Login response: {:#?}", response);
    if !response.status().is_success() {
        return Err(anyhow!("Login failed with status {}", response.status()));
    }
    Ok(())
}

/// Running server and signed in client
pub async fn launch_env(
    test_name: &str,
    extra_args: &[&str],
) -> Result<(ConfigGuard, reqwest::Client, Url)> {
    let (config, guard) = prepare_env_with(test_name, extra_args).await?;
    let base_url = config.base_url.clone();
    spawn_server(config).await?;
    let client = client()?;
    login(&client, &base_url).await?;
    Ok((guard, client, base_url))
}

use anyhow::{Result, anyhow};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tcms_dal::{page::Page, story::Story};
use tracing::info;

pub async fn create_story(client: &reqwest::Client, base_url: &Url, payload: &Value) -> Result<Story> {
    let api_url = base_url.join("api/stories")?;

    let response = client.post(api_url).json(payload).send().await?;
    info!("Create story response: {:#?}", response);
    if response.status() != StatusCode::OK {
        return Err(anyhow!(
            "Create story failed with {}: {}",
            response.status(),
            response.text().await?
        ));
    }

    let story: Story = response.json().await?;
    Ok(story)
}

pub async fn create_page(client: &reqwest::Client, base_url: &Url, payload: &Value) -> Result<Page> {
    let api_url = base_url.join("api/pages")?;

    let response = client.post(api_url).json(payload).send().await?;
    info!("Create page response: {:#?}", response);
    if response.status() != StatusCode::OK {
        return Err(anyhow!(
            "Create page failed with {}: {}",
            response.status(),
            response.text().await?
        ));
    }

    let page: Page = response.json().await?;
    Ok(page)
}

pub async fn debug_rows(client: &reqwest::Client, base_url: &Url) -> Result<Vec<Value>> {
    let url = base_url.join("api/debug/stories-images")?;
    let response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        return Err(anyhow!("Debug route failed with {}", response.status()));
    }
    let body: Value = response.json().await?;
    if body["ok"] != Value::Bool(true) {
        return Err(anyhow!("Debug route not ok: {body}"));
    }
    body["rows"]
        .as_array()
        .cloned()
        .ok_or_else(|| anyhow!("Missing rows in {body}"))
}

use reqwest::StatusCode;
use serde_json::{Value, json};
use tcms_dal::page::Page;
use tcms_e2e_tests::{launch_env, rest::create_page};
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_pages() {
    let (_guard, client, base_url) = launch_env("test_pages", &[]).await.unwrap();

    let page = create_page(
        &client,
        &base_url,
        &json!({"title": "About us", "slug": "about", "body": "Guides to the valley"}),
    )
    .await
    .unwrap();
    assert_eq!(page.slug, "about");
    assert!(page.images.is_empty());

    let response = client
        .post(base_url.join("api/pages").unwrap())
        .json(&json!({"title": "", "slug": "contact us"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["title"].is_array());
    assert!(body["fields"]["slug"].is_array());

    let url = base_url.join(&format!("api/pages/{}", page.id)).unwrap();
    let response = client
        .patch(url.clone())
        .json(&json!({"published": true, "cover_image": "covers/about.jpg"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Page = response.json().await.unwrap();
    assert!(updated.published);
    assert_eq!(updated.body.as_deref(), Some("Guides to the valley"));
    assert_eq!(updated.images, vec!["covers/about.jpg"]);

    let response = client
        .get(base_url.join("api/pages").unwrap())
        .send()
        .await
        .unwrap();
    let listing: Value = response.json().await.unwrap();
    assert_eq!(listing["total"], 1);
}

use reqwest::StatusCode;
use serde_json::json;
use tcms_e2e_tests::{
    client, launch_env,
    rest::{create_page, create_story},
};
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_public_reader() {
    let (_guard, client_with_session, base_url) = launch_env("test_public_reader", &[]).await.unwrap();

    create_story(
        &client_with_session,
        &base_url,
        &json!({
            "title": "Indra Jatra",
            "slug": "indra-jatra",
            "summary": "Festival of rain god",
            "body": "Chariots of Kumari\n\nMasked dances",
            "published": true,
            "images": ["g/indra1.jpg", "g/indra2.jpg", "g/indra3.jpg"]
        }),
    )
    .await
    .unwrap();
    create_story(
        &client_with_session,
        &base_url,
        &json!({"title": "Draft story", "slug": "draft-story"}),
    )
    .await
    .unwrap();
    create_page(
        &client_with_session,
        &base_url,
        &json!({"title": "About", "slug": "about", "published": true, "body": "Who we are"}),
    )
    .await
    .unwrap();

    let reader = client().unwrap();

    let response = reader.get(base_url.join("stories").unwrap()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Indra Jatra"));
    assert!(!html.contains("Draft story"));

    let response = reader
        .get(base_url.join("stories/indra-jatra").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"class="gallery-main" src="g/indra1.jpg""#));
    assert!(html.contains("<p>Masked dances"));

    let response = reader
        .get(base_url.join("stories/indra-jatra?image=2").unwrap())
        .send()
        .await
        .unwrap();
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"class="gallery-main" src="g/indra3.jpg""#));
    assert_eq!(html.matches("<li").count(), 3);

    let response = reader
        .get(base_url.join("stories/indra-jatra?image=7").unwrap())
        .send()
        .await
        .unwrap();
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"class="gallery-main" src="g/indra1.jpg""#));

    let response = reader
        .get(base_url.join("stories/draft-story").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = reader
        .get(base_url.join("stories/no-such-story").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = reader.get(base_url.join("pages/about").unwrap()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Who we are"));
}

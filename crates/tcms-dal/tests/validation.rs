use garde::Validate as _;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use serde_json::json;
use tcms_dal::{
    page::CreatePage,
    story::{CreateStory, UpdateStory},
};

const SLUG_CHARS: &[char] = &[
    'a', 'b', 'k', 't', 'z', 'A', 'K', 'Z', '0', '1', '7', '9', '-',
];

#[derive(Debug, Clone)]
struct ValidSlug(String);

impl Arbitrary for ValidSlug {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 200 + 1;
        let slug = (0..len)
            .map(|_| *g.choose(SLUG_CHARS).unwrap())
            .collect::<String>();
        ValidSlug(slug)
    }
}

#[derive(Debug, Clone)]
struct ValidTitle(String);

impl Arbitrary for ValidTitle {
    fn arbitrary(g: &mut Gen) -> Self {
        let title = String::arbitrary(g)
            .chars()
            .filter(|c| !c.is_control())
            .take(200)
            .collect::<String>();
        if title.is_empty() {
            ValidTitle("Swayambhunath".to_string())
        } else {
            ValidTitle(title)
        }
    }
}

fn parse_story(value: serde_json::Value) -> CreateStory {
    serde_json::from_value(value).unwrap()
}

#[quickcheck]
fn valid_create_payload_accepted(title: ValidTitle, slug: ValidSlug) -> bool {
    let story = parse_story(json!({"title": title.0, "slug": slug.0, "summary": "x".repeat(500)}));
    story.validate().is_ok()
}

#[quickcheck]
fn valid_partial_update_accepted(title: Option<ValidTitle>, slug: Option<ValidSlug>) -> bool {
    let update = UpdateStory {
        title: title.map(|t| t.0),
        slug: slug.map(|s| s.0),
        ..Default::default()
    };
    update.validate().is_ok()
}

#[test]
fn test_minimal_story() {
    let story = parse_story(json!({"title": "Durbar Festival", "slug": "durbar-festival"}));
    assert!(story.validate().is_ok());
    assert!(story.published.is_none());
    assert!(story.created_by.is_none());
}

#[test]
fn test_mixed_case_slug_accepted() {
    let story = parse_story(json!({"title": "Durbar Festival", "slug": "Durbar-Festival-2025"}));
    assert!(story.validate().is_ok());
}

#[test]
fn test_missing_fields_reported_together() {
    let story = parse_story(json!({"summary": "no title, no slug"}));
    let report = story.validate().unwrap_err();
    let fields = report
        .iter()
        .map(|(path, _)| path.to_string())
        .collect::<Vec<_>>();
    assert!(fields.contains(&"title".to_string()));
    assert!(fields.contains(&"slug".to_string()));
}

#[test]
fn test_invalid_slugs_rejected() {
    for slug in ["durbar festival", "durbar_festival", "durbar/festival", "दरबार", ""] {
        let story = parse_story(json!({"title": "Durbar Festival", "slug": slug}));
        assert!(story.validate().is_err(), "slug {slug:?} should be rejected");
    }
    let too_long = "a".repeat(201);
    let story = parse_story(json!({"title": "Durbar Festival", "slug": too_long}));
    assert!(story.validate().is_err());
}

#[test]
fn test_lengths_are_in_characters() {
    // 200 multi byte characters fit into title
    let title = "द".repeat(200);
    let story = parse_story(json!({"title": title, "slug": "devanagari"}));
    assert!(story.validate().is_ok());

    let title = "द".repeat(201);
    let story = parse_story(json!({"title": title, "slug": "devanagari"}));
    assert!(story.validate().is_err());

    let story = parse_story(json!({"title": "Ok", "slug": "ok", "summary": "s".repeat(501)}));
    assert!(story.validate().is_err());
}

#[test]
fn test_update_rejects_invalid_present_field() {
    let update: UpdateStory = serde_json::from_value(json!({"slug": "with space"})).unwrap();
    assert!(update.validate().is_err());

    let update: UpdateStory = serde_json::from_value(json!({"title": ""})).unwrap();
    assert!(update.validate().is_err());

    let update: UpdateStory = serde_json::from_value(json!({})).unwrap();
    assert!(update.validate().is_ok());
    assert!(update.is_empty());
}

#[test]
fn test_wrong_types_rejected() {
    let res = serde_json::from_value::<UpdateStory>(json!({"published": "yes"}));
    assert!(res.is_err());
    let res = serde_json::from_value::<CreateStory>(json!({"title": 42, "slug": "x"}));
    assert!(res.is_err());
}

#[test]
fn test_images_validated() {
    let story = parse_story(json!({"title": "Gallery", "slug": "gallery", "images": ["a.jpg", ""]}));
    assert!(story.validate().is_err());
}

#[test]
fn test_page_schema_matches_story() {
    let page: CreatePage =
        serde_json::from_value(json!({"title": "About", "slug": "about us"})).unwrap();
    assert!(page.validate().is_err());
}

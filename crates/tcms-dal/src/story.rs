//! Stories - articles about places, festivals and culture, shown in public reader with gallery

crate::content_entity! {
    entity: Story,
    create: CreateStory,
    update: UpdateStory,
    repository: StoryRepository,
    repository_impl: StoryRepositoryImpl,
    table: "story",
}

impl StoryRepositoryImpl<sqlx::Pool<crate::ChosenDB>> {
    /// Latest stories for diagnostics, newest first
    pub async fn latest(&self, limit: i64) -> crate::error::Result<Vec<Story>> {
        let params = crate::ListingParams::new(0, limit)
            .with_order(vec![crate::Order::Desc("created_at".into())]);
        Ok(self.list(params).await?.rows)
    }
}

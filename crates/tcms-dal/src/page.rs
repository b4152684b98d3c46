crate::content_entity! {
    entity: Page,
    create: CreatePage,
    update: UpdatePage,
    repository: PageRepository,
    repository_impl: PageRepositoryImpl,
    table: "page",
}

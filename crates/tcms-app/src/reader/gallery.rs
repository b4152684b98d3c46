use leptos::prelude::*;

/// Image gallery of a story, one main image and a strip of thumbnails
#[derive(Debug, Clone)]
pub struct Gallery<'a> {
    images: &'a [String],
    index: usize,
}

impl<'a> Gallery<'a> {
    pub fn new(images: &'a [String]) -> Self {
        Gallery { images, index: 0 }
    }

    /// Gallery with initial selection, invalid index keeps the first image
    pub fn with_selection(images: &'a [String], index: Option<usize>) -> Self {
        let mut gallery = Gallery::new(images);
        if let Some(index) = index {
            gallery.select(index);
        }
        gallery
    }

    /// Returns false (and keeps current selection) for index out of range
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.images.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> usize {
        self.index
    }

    pub fn main_image(&self) -> Option<&'a str> {
        self.images
            .get(self.index)
            .or_else(|| self.images.first())
            .map(String::as_str)
    }

    pub fn thumbnails(&self) -> &'a [String] {
        self.images
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Main image and thumbnails linking to `?image=<index>` of `base_url`,
/// renders nothing for story without images
#[component]
pub fn StoryGallery(
    images: Vec<String>,
    selected: Option<usize>,
    #[prop(into)] alt: String,
    #[prop(into)] base_url: String,
) -> impl IntoView {
    let gallery = Gallery::with_selection(&images, selected);
    let index = gallery.selected();
    let main = gallery.main_image().map(str::to_string);
    let thumbnails = (images.len() > 1).then(|| {
        images
            .iter()
            .enumerate()
            .map(|(idx, image)| {
                let class = if idx == index { "selected" } else { "" };
                view! {
                    <li class=class>
                        <a href=format!("{base_url}?image={idx}")>
                            <img src=image.clone() alt=format!("{alt} {}", idx + 1)/>
                        </a>
                    </li>
                }
            })
            .collect_view()
    });
    main.map(|main| {
        view! {
            <figure class="gallery">
                <img class="gallery-main" src=main alt=alt/>
                {thumbnails.map(|items| view! { <ul class="gallery-thumbnails">{items}</ul> })}
            </figure>
        }
    })
}

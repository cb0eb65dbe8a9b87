use crate::models::ImageRef;

/// Image gallery of a detail page: the images in stored order plus the active one.
#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    images: Vec<ImageRef>,
    active: Option<usize>,
}

impl Gallery {
    /// Starts on the first image, or on nothing when there are no images.
    pub fn new(images: Vec<ImageRef>) -> Self {
        let active = if images.is_empty() { None } else { Some(0) };
        Self { images, active }
    }

    pub fn active(&self) -> Option<&ImageRef> {
        self.active.and_then(|i| self.images.get(i))
    }

    /// Switches to the image whose asset reference equals `reference`.
    /// Returns false and leaves the selection alone when nothing matches.
    pub fn select(&mut self, reference: &str) -> bool {
        match self.images.iter().position(|img| img.reference() == reference) {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn is_active(&self, image: &ImageRef) -> bool {
        self.active()
            .map(|a| a.reference() == image.reference())
            .unwrap_or(false)
    }

    /// The strip is only shown when there is something to switch between.
    pub fn has_thumbnails(&self) -> bool {
        self.images.len() > 1
    }
}

//! Session gallery: the in-memory list of generated images.

use crate::error::{Result, VisionError};
use crate::image::GeneratedImage;
use std::collections::VecDeque;

/// Newest-first collection of generated images, unique by id.
///
/// Lives for the session only; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionGallery {
    images: VecDeque<GeneratedImage>,
}

impl SessionGallery {
    /// Creates an empty gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts an image at the front. Fails if its id is already present.
    pub fn insert(&mut self, image: GeneratedImage) -> Result<()> {
        if self.contains(&image.id) {
            return Err(VisionError::DuplicateImage(image.id));
        }
        self.images.push_front(image);
        Ok(())
    }

    /// Removes the image with this id, returning it. Unknown ids are ignored.
    pub fn delete(&mut self, id: &str) -> Option<GeneratedImage> {
        let index = self.images.iter().position(|img| img.id == id)?;
        self.images.remove(index)
    }

    /// Looks up an image by id.
    pub fn select(&self, id: &str) -> Option<&GeneratedImage> {
        self.images.iter().find(|img| img.id == id)
    }

    /// Returns true if an image with this id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.select(id).is_some()
    }

    /// The most recently inserted image.
    pub fn latest(&self) -> Option<&GeneratedImage> {
        self.images.front()
    }

    /// Iterates newest first.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.images.iter()
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if the gallery holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl<'a> IntoIterator for &'a SessionGallery {
    type Item = &'a GeneratedImage;
    type IntoIter = std::collections::vec_deque::Iter<'a, GeneratedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

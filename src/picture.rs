//! Decoded pictures and the append-only collection the carousel walks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::carousel::QUAD_WIDTH;
use crate::render::lifecycle::LifecycleProducer;
use crate::render::renderable::{Quad, Renderable};

/// Widest texture uploaded for a carousel quad.
pub const TEXTURE_WIDTH: u32 = 512;

#[derive(Debug)]
pub struct Picture {
    name: String,
    image: Arc<RgbaImage>,
    ratio: f32,
    thumbnails: Mutex<HashMap<u32, Arc<RgbaImage>>>,
}

impl Picture {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.into(),
            ratio: width as f32 / height.max(1) as f32,
            image: Arc::new(image),
            thumbnails: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &Arc<RgbaImage> {
        &self.image
    }

    /// Width over height.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Copy scaled to `width` pixels wide, computed once per width. Requests
    /// at or above the source width return the source itself.
    pub fn thumbnail(&self, width: u32) -> Arc<RgbaImage> {
        if width == 0 || width >= self.image.width() {
            return Arc::clone(&self.image);
        }
        let mut cache = self
            .thumbnails
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(width).or_insert_with(|| {
            let height = ((width as f32 / self.ratio).round() as u32).max(1);
            debug!(name = %self.name, width, height, "building thumbnail");
            Arc::new(imageops::resize(
                self.image.as_ref(),
                width,
                height,
                FilterType::Triangle,
            ))
        }))
    }
}

/// Append-only, thread-safe list of pictures.
#[derive(Debug, Default)]
pub struct PictureCatalog {
    pictures: RwLock<Vec<Arc<Picture>>>,
}

impl PictureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the new picture's index.
    pub fn push(&self, picture: Picture) -> usize {
        let mut pictures = self
            .pictures
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        pictures.push(Arc::new(picture));
        pictures.len() - 1
    }

    pub fn len(&self) -> usize {
        self.pictures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Arc<Picture>> {
        self.pictures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    /// Point-in-time copy for iteration without holding the lock.
    pub fn snapshot(&self) -> Vec<Arc<Picture>> {
        self.pictures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A quad built off the render thread, waiting for its GPU upload and a
/// slot. `picture` is the catalog index it shows.
#[derive(Debug)]
pub struct PendingQuad {
    pub picture: usize,
    pub quad: Renderable,
}

pub type QuadProducer = LifecycleProducer<PendingQuad, Renderable>;

/// Reflected carousel quad, `QUAD_WIDTH` wide and as tall as the picture's
/// aspect ratio allows.
pub fn build_quad(picture: &Picture) -> Renderable {
    let height = (QUAD_WIDTH / picture.ratio()).floor();
    Renderable::reflected(Quad::new(
        picture.name(),
        picture.thumbnail(TEXTURE_WIDTH),
        QUAD_WIDTH,
        height,
    ))
}

/// Request a quad for catalog entry `index`. Returns `false` when the index
/// is out of range or the render side is gone.
pub fn request_quad(catalog: &PictureCatalog, producer: &QuadProducer, index: usize) -> bool {
    let Some(picture) = catalog.get(index) else {
        return false;
    };
    producer.request_init(PendingQuad {
        picture: index,
        quad: build_quad(&picture),
    })
}

/// Entry point for the picture source: appends to the catalog and queues a
/// quad for pictures inside the initial window. The render thread asks for
/// the rest as the window moves.
/// Selected, next and right slots with the first picture selected.
pub const INITIAL_WINDOW: usize = 3;

#[derive(Debug, Clone)]
pub struct CarouselFeed {
    catalog: Arc<PictureCatalog>,
    producer: QuadProducer,
}

impl CarouselFeed {
    pub fn new(catalog: Arc<PictureCatalog>, producer: QuadProducer) -> Self {
        Self { catalog, producer }
    }

    pub fn catalog(&self) -> &Arc<PictureCatalog> {
        &self.catalog
    }

    pub fn add_picture(&self, name: &str, image: RgbaImage) -> usize {
        self.push(Picture::new(name, image))
    }

    pub fn push(&self, picture: Picture) -> usize {
        let name = picture.name().to_owned();
        let index = self.catalog.push(picture);
        debug!(picture = index, name = %name, "picture added");
        if index < INITIAL_WINDOW {
            request_quad(&self.catalog, &self.producer, index);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::lifecycle::lifecycle_queue;

    #[test]
    fn ratio_and_thumbnails() {
        let picture = Picture::new("wide", RgbaImage::new(400, 200));
        assert_eq!(picture.ratio(), 2.0);

        let thumb = picture.thumbnail(100);
        assert_eq!(thumb.dimensions(), (100, 50));
        assert!(Arc::ptr_eq(&thumb, &picture.thumbnail(100)));
        assert!(Arc::ptr_eq(&picture.thumbnail(800), picture.image()));
    }

    #[test]
    fn catalog_is_append_only_and_snapshots_are_stable() {
        let catalog = PictureCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.push(Picture::new("a", RgbaImage::new(2, 2))), 0);
        let snapshot = catalog.snapshot();
        assert_eq!(catalog.push(Picture::new("b", RgbaImage::new(2, 2))), 1);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(1).map(|p| p.name().to_owned()), Some("b".into()));
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn feed_queues_a_quad_per_picture() {
        let (producer, mut consumer) = lifecycle_queue();
        let feed = CarouselFeed::new(Arc::new(PictureCatalog::new()), producer);
        feed.add_picture("first", RgbaImage::new(300, 200));
        feed.add_picture("second", RgbaImage::new(200, 200));

        let mut pending = Vec::new();
        consumer.drain(|quad: PendingQuad| pending.push(quad), |_: Renderable| {});
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].picture, 0);
        assert_eq!(pending[0].quad.name(), "first");
        assert_eq!(pending[0].quad.height(), 40.0);
        assert_eq!(pending[1].quad.height(), 60.0);
        assert!(!pending[0].quad.is_initialized());
    }

    #[test]
    fn feed_queues_quads_for_the_initial_window_only() {
        let (producer, mut consumer) = lifecycle_queue();
        let feed = CarouselFeed::new(Arc::new(PictureCatalog::new()), producer);
        for i in 0..5 {
            assert_eq!(feed.add_picture(&format!("p{i}"), RgbaImage::new(4, 4)), i);
        }

        let mut queued = Vec::new();
        consumer.drain(|quad: PendingQuad| queued.push(quad.picture), |_: Renderable| {});
        assert_eq!(queued, vec![0, 1, 2]);
        assert_eq!(feed.catalog().len(), 5);
    }
}

//! Request-driven caption rendering.
//! Text rasterisation and the shadow blur run on a background thread; the
//! render thread only sends requests and uploads finished images.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryIter, unbounded};
use image::RgbaImage;
use tracing::{debug, trace, warn};

use crate::processing::label::CaptionSource;

/// Message sent to the caption thread.
#[derive(Debug)]
enum CaptionMsg {
    /// Render `text` as the caption of catalog entry `picture`.
    Render { picture: usize, text: String },
    Quit,
}

/// A caption rendered off the render thread. `image` is `None` when the
/// text produced nothing drawable.
#[derive(Debug)]
pub struct RenderedCaption {
    pub picture: usize,
    pub image: Option<RgbaImage>,
}

pub struct CaptionWorker {
    font_size: f32,
    requests: Sender<CaptionMsg>,
    results: Receiver<RenderedCaption>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for CaptionWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionWorker")
            .field("font_size", &self.font_size)
            .field("running", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

impl CaptionWorker {
    /// Start the caption thread. Returns `None` if the thread cannot be
    /// spawned.
    pub fn spawn(source: Box<dyn CaptionSource>) -> Option<Self> {
        let font_size = source.font_size();
        let (requests, rx) = unbounded::<CaptionMsg>();
        let (tx, results) = unbounded();
        let spawned = thread::Builder::new()
            .name("caption-render".into())
            .spawn(move || {
                while let Ok(msg) = rx.recv() {
                    match msg {
                        CaptionMsg::Quit => break,
                        CaptionMsg::Render { picture, text } => {
                            let image = source.render(&text);
                            trace!(picture, drawn = image.is_some(), "caption rendered");
                            if tx.send(RenderedCaption { picture, image }).is_err() {
                                break;
                            }
                        }
                    }
                }
                debug!("caption thread stopped");
            });
        match spawned {
            Ok(handle) => Some(Self {
                font_size,
                requests,
                results,
                handle: Some(handle),
            }),
            Err(err) => {
                warn!("caption thread failed to start: {err}");
                None
            }
        }
    }

    /// Pixel size of the caption text.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Queue `text` for rendering. Returns `false` once the thread is gone.
    pub fn request(&self, picture: usize, text: impl Into<String>) -> bool {
        self.requests
            .send(CaptionMsg::Render {
                picture,
                text: text.into(),
            })
            .is_ok()
    }

    /// Captions finished since the last call, without blocking.
    pub fn finished(&self) -> TryIter<'_, RenderedCaption> {
        self.results.try_iter()
    }
}

impl Drop for CaptionWorker {
    fn drop(&mut self) {
        let _ = self.requests.send(CaptionMsg::Quit);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("caption thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use image::Rgba;

    use super::*;

    struct Recorder(Sender<thread::ThreadId>);

    impl CaptionSource for Recorder {
        fn font_size(&self) -> f32 {
            12.0
        }

        fn render(&self, text: &str) -> Option<RgbaImage> {
            let _ = self.0.send(thread::current().id());
            (!text.is_empty()).then(|| RgbaImage::from_pixel(text.len() as u32, 2, Rgba([0; 4])))
        }
    }

    fn wait_for(worker: &CaptionWorker, count: usize) -> Vec<RenderedCaption> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut done = Vec::new();
        while done.len() < count && Instant::now() < deadline {
            done.extend(worker.finished());
            thread::sleep(Duration::from_millis(1));
        }
        done
    }

    #[test]
    fn renders_in_request_order_off_the_calling_thread() {
        let (tx, threads) = unbounded();
        let worker = CaptionWorker::spawn(Box::new(Recorder(tx))).unwrap();
        assert_eq!(worker.font_size(), 12.0);
        assert!(worker.request(3, "abc"));
        assert!(worker.request(4, ""));

        let done = wait_for(&worker, 2);
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].picture, 3);
        assert_eq!(done[0].image.as_ref().map(RgbaImage::width), Some(3));
        assert_eq!(done[1].picture, 4);
        assert!(done[1].image.is_none());

        let caller = thread::current().id();
        assert!(threads.try_iter().all(|id| id != caller));
    }

    #[test]
    fn drop_stops_the_thread() {
        let (tx, threads) = unbounded();
        let worker = CaptionWorker::spawn(Box::new(Recorder(tx))).unwrap();
        drop(worker);
        // The source, and with it the sender, went down with the thread.
        assert!(threads.recv_timeout(Duration::from_secs(1)).is_err());
    }
}

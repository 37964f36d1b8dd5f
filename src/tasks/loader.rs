//! Background picture source: scans the library, decodes off the async
//! runtime, and feeds the carousel in library order.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::RgbaImage;
use tokio::select;
use tokio::sync::mpsc::{self, Sender};
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::error::Error;
use crate::events::{InvalidPicture, LoadPicture};
use crate::picture::{CarouselFeed, Picture, TEXTURE_WIDTH};

/// Buffer size for `InvalidPicture` reports.
pub const INVALID_CHANNEL_CAPACITY: usize = 64;

/// Image files under `root`, sorted by path.
pub fn discover_pictures(root: &Path) -> Result<Vec<PathBuf>, Error> {
    if !root.is_dir() {
        return Err(Error::BadDir(root.display().to_string()));
    }
    let pictures: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_image(p))
        .collect();
    if pictures.is_empty() {
        return Err(Error::EmptyLibrary(root.to_path_buf()));
    }
    info!(root = %root.display(), discovered = pictures.len(), "library scan complete");
    Ok(pictures)
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(OsStr::to_str)
            .map(|s| s.to_ascii_lowercase()),
        Some(ref e) if ["jpg", "jpeg", "png", "gif", "webp"].contains(&e.as_str())
    )
}

/// Caption shown for a picture: its file stem.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_owned()
}

pub fn decode_picture(path: &Path) -> Result<RgbaImage, Error> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    let image = reader.decode().map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Decode and pre-scale the texture copy, both off the async runtime.
fn prepare_picture(path: &Path) -> Result<Picture, Error> {
    let picture = Picture::new(display_name(path), decode_picture(path)?);
    picture.thumbnail(TEXTURE_WIDTH);
    Ok(picture)
}

/// Decode `paths` with at most `max_in_flight` decodes running, handing
/// pictures to `feed` strictly in input order. Files that fail to decode
/// are logged, reported on `invalid_tx`, and skipped.
#[instrument(skip_all, fields(pictures = paths.len()))]
pub async fn run(
    paths: Vec<PathBuf>,
    feed: CarouselFeed,
    invalid_tx: Sender<InvalidPicture>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    run_with(paths, feed, invalid_tx, cancel, max_in_flight, prepare_picture).await
}

async fn run_with(
    paths: Vec<PathBuf>,
    feed: CarouselFeed,
    invalid_tx: Sender<InvalidPicture>,
    cancel: CancellationToken,
    max_in_flight: usize,
    prepare: fn(&Path) -> Result<Picture, Error>,
) -> Result<()> {
    let max_in_flight = max_in_flight.max(1);
    let mut queue = paths
        .into_iter()
        .enumerate()
        .map(|(seq, path)| LoadPicture { seq, path })
        .peekable();
    let mut tasks: JoinSet<Result<Picture, Error>> = JoinSet::new();
    let mut in_flight: HashMap<task::Id, LoadPicture> = HashMap::new();
    let mut ready: BTreeMap<usize, (PathBuf, Option<Picture>)> = BTreeMap::new();
    let mut next_seq = 0usize;
    let mut delivered = 0usize;
    let mut skipped = 0usize;

    loop {
        while tasks.len() < max_in_flight {
            let Some(request) = queue.next() else { break };
            let path = request.path.clone();
            let handle = tasks.spawn_blocking(move || prepare(&path));
            in_flight.insert(handle.id(), request);
        }

        if tasks.is_empty() && queue.peek().is_none() {
            break;
        }

        select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("cancel received; stopping picture loader");
                tasks.abort_all();
                return Ok(());
            }
            Some(joined) = tasks.join_next_with_id() => {
                let (id, result) = match joined {
                    Ok((id, result)) => (id, result),
                    Err(join) => (join.id(), Err(Error::Io(std::io::Error::other(join)))),
                };
                let Some(LoadPicture { seq, path }) = in_flight.remove(&id) else {
                    warn!("decode task finished without a request");
                    continue;
                };
                let picture = match result {
                    Ok(picture) => Some(picture),
                    Err(err) => {
                        warn!(path = %path.display(), "skipping picture: {err}");
                        skipped += 1;
                        let _ = invalid_tx.send(InvalidPicture(path.clone())).await;
                        None
                    }
                };
                ready.insert(seq, (path, picture));
                while let Some((path, picture)) = ready.remove(&next_seq) {
                    next_seq += 1;
                    if let Some(picture) = picture {
                        let index = feed.push(picture);
                        debug!(picture = index, path = %path.display(), "picture delivered");
                        delivered += 1;
                    }
                }
            }
        }
    }

    info!(delivered, skipped, "picture loading complete");
    Ok(())
}

/// Load every picture in `paths` to completion, collecting the skipped
/// paths while the loader runs.
pub async fn load_all(
    paths: Vec<PathBuf>,
    feed: CarouselFeed,
    max_in_flight: usize,
) -> Result<Vec<PathBuf>> {
    let (invalid_tx, mut invalid_rx) = mpsc::channel::<InvalidPicture>(INVALID_CHANNEL_CAPACITY);
    let collect = async move {
        let mut skipped = Vec::new();
        while let Some(InvalidPicture(path)) = invalid_rx.recv().await {
            skipped.push(path);
        }
        skipped
    };
    let (loaded, skipped) = tokio::join!(
        run(paths, feed, invalid_tx, CancellationToken::new(), max_in_flight),
        collect
    );
    loaded?;
    Ok(skipped)
}

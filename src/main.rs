use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use photo_carousel::carousel::runtime::CarouselRuntime;
use photo_carousel::carousel::{Slot, WindowSnapshot};
use photo_carousel::config::Configuration;
use photo_carousel::error::Error;
use photo_carousel::events::{InvalidPicture, NavigationCommand};
use photo_carousel::picture::CarouselFeed;
use photo_carousel::render::recording::RecordingBackend;
use photo_carousel::tasks::{loader, viewer};

#[derive(Debug, Parser)]
#[command(
    name = "photo-carousel",
    version,
    about = "coverflow photo carousel"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Scan this directory instead of the configured photo-library-path
    #[arg(long, value_name = "DIR")]
    library: Option<PathBuf>,
    /// Turn supersampling on (PHOTO_CAROUSEL_AA must still be set)
    #[arg(long)]
    aa: bool,
    /// Step through the library headlessly for this many ticks and print the carousel state
    #[arg(long = "dry-run", value_name = "TICKS")]
    dry_run: Option<usize>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    // RUST_LOG controls the base level (default info); -v raises this crate.
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let level = match verbosity {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    };
    if let Some(directive) = level.and_then(|level| format!("photo_carousel={level}").parse().ok()) {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        library,
        aa,
        dry_run,
        verbose,
    } = Args::parse();
    init_tracing(verbose);

    let mut cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?;
    if let Some(library) = library {
        cfg.photo_library_path = library;
    }
    if aa {
        cfg.antialiasing.enabled = true;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    tracing::info!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let paths = match loader::discover_pictures(&cfg.photo_library_path) {
        Ok(paths) => paths,
        Err(err @ Error::EmptyLibrary(_)) => {
            tracing::warn!("{err}");
            Vec::new()
        }
        Err(err) => return Err(err).context("failed to scan the photo library"),
    };

    let runtime = CarouselRuntime::from_config(&cfg);
    let feed = CarouselFeed::new(runtime.catalog().clone(), runtime.producer());

    if let Some(ticks) = dry_run {
        let skipped = loader::load_all(paths, feed, cfg.loader_max_concurrent_decodes)
            .await
            .context("loader failed")?;
        for path in &skipped {
            tracing::debug!(path = %path.display(), "invalid picture reported");
        }
        if !skipped.is_empty() {
            tracing::info!(skipped = skipped.len(), "pictures left out of the carousel");
        }
        run_dry(runtime, &cfg, ticks)?;
        return Ok(());
    }

    // Loader -> reporter
    let (invalid_tx, invalid_rx) =
        mpsc::channel::<InvalidPicture>(loader::INVALID_CHANNEL_CAPACITY);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut tasks = JoinSet::new();

    // PictureLoader
    tasks.spawn({
        let cancel = cancel.clone();
        let max_in_flight = cfg.loader_max_concurrent_decodes;
        async move {
            loader::run(paths, feed, invalid_tx, cancel, max_in_flight)
                .await
                .context("loader task failed")
        }
    });

    // InvalidPicture reporter
    tasks.spawn(async move {
        report_invalid(invalid_rx).await;
        Ok(())
    });

    // The viewer owns the main thread until the window closes or cancellation occurs
    if let Err(e) = viewer::run_windowed(runtime, cfg.tick_interval(), cancel.clone())
        .context("viewer failed")
    {
        tracing::error!("{e:?}");
    }
    cancel.cancel();

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
    }

    Ok(())
}

async fn report_invalid(mut invalid_rx: mpsc::Receiver<InvalidPicture>) {
    let mut skipped = Vec::new();
    while let Some(InvalidPicture(path)) = invalid_rx.recv().await {
        tracing::debug!(path = %path.display(), "invalid picture reported");
        skipped.push(path);
    }
    if !skipped.is_empty() {
        tracing::info!(skipped = skipped.len(), "pictures left out of the carousel");
    }
}

/// Drive the carousel through the recording backend, stepping forward
/// whenever it is idle, and print the slots after every tick that changed
/// them.
fn run_dry(mut runtime: CarouselRuntime, cfg: &Configuration, ticks: usize) -> Result<()> {
    let mut backend = RecordingBackend::new((1280, 720));
    let commands = runtime.commands();
    let start = Instant::now();
    let mut last: Option<WindowSnapshot> = None;

    println!(
        "# carousel dry run\n# pictures: {}\n# ticks: {}\n# passes per frame: {}\n",
        runtime.catalog().len(),
        ticks,
        runtime.passes(),
    );

    for tick in 0..ticks {
        if !runtime.controller().is_active() && runtime.navigation().can_next {
            let _ = commands.send(NavigationCommand::Next);
        }
        let now = start + cfg.tick_interval() * tick as u32;
        runtime.tick(now, &mut backend).context("render tick failed")?;

        let snapshot = runtime.window().snapshot();
        if last.as_ref() != Some(&snapshot) && !runtime.controller().is_active() {
            println!("{:>5}: {}", tick, describe(&snapshot));
            last = Some(snapshot);
        }
    }

    runtime.shutdown(&mut backend);
    println!(
        "\n# frames: {}\n# textures created: {}\n# textures still live: {}",
        backend.frames(),
        backend.created().len(),
        backend.live_textures(),
    );
    Ok(())
}

fn describe(snapshot: &WindowSnapshot) -> String {
    let slots: Vec<String> = Slot::ALL
        .iter()
        .map(|slot| {
            let name = snapshot
                .slot(*slot)
                .map_or("-", |entry| entry.name.as_str());
            format!("{slot:?}={name}")
        })
        .collect();
    format!("selected={} {}", snapshot.selected, slots.join(" "))
}

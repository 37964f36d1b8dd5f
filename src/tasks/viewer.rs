//! Window, input and the fixed-rate render loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::carousel::runtime::CarouselRuntime;
use crate::events::NavigationCommand;
use crate::render::wgpu_backend::WgpuBackend;

#[derive(Debug)]
enum ViewerEvent {
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Command(NavigationCommand),
    Close,
}

fn action_for_key(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::ArrowRight | NamedKey::ArrowDown) => {
            Some(KeyAction::Command(NavigationCommand::Next))
        }
        Key::Named(NamedKey::ArrowLeft | NamedKey::ArrowUp) => {
            Some(KeyAction::Command(NavigationCommand::Previous))
        }
        Key::Named(NamedKey::Space | NamedKey::Enter) => {
            Some(KeyAction::Command(NavigationCommand::ToggleShow))
        }
        Key::Named(NamedKey::Escape) => Some(KeyAction::Close),
        _ => None,
    }
}

/// Wheel down steps forward, wheel up steps back.
fn command_for_wheel(delta: MouseScrollDelta) -> Option<NavigationCommand> {
    let dy = match delta {
        MouseScrollDelta::LineDelta(_, dy) => f64::from(dy),
        MouseScrollDelta::PixelDelta(position) => position.y,
    };
    if dy < 0.0 {
        Some(NavigationCommand::Next)
    } else if dy > 0.0 {
        Some(NavigationCommand::Previous)
    } else {
        None
    }
}

struct ViewerApp {
    cancel: CancellationToken,
    runtime: CarouselRuntime,
    commands: Sender<NavigationCommand>,
    tick_interval: Duration,
    next_tick: Instant,
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
}

impl ViewerApp {
    fn new(runtime: CarouselRuntime, tick_interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            commands: runtime.commands(),
            runtime,
            tick_interval,
            next_tick: Instant::now(),
            window: None,
            backend: None,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let attrs = WindowAttributes::default().with_title("Photo Carousel");
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(err) => {
                error!(error = %err, "failed to create viewer window");
                None
            }
        }
    }

    fn send(&self, command: NavigationCommand) {
        debug!(?command, "navigation input");
        if self.commands.send(command).is_err() {
            warn!("carousel no longer accepts commands");
        }
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(err) = self.runtime.tick(Instant::now(), backend) {
            error!(error = ?err, "render tick failed; exiting event loop");
            event_loop.exit();
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }

        let Some(window) = self.ensure_window(event_loop) else {
            event_loop.exit();
            return;
        };

        if self.backend.is_none() {
            match WgpuBackend::new(window.clone()) {
                Ok(backend) => self.backend = Some(backend),
                Err(err) => {
                    error!(error = ?err, "failed to initialize GPU state");
                    event_loop.exit();
                    return;
                }
            }
        }

        self.next_tick = Instant::now();
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("viewer window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(backend) = self.backend.as_mut() {
                    backend.resize(new_size);
                }
            }
            WindowEvent::ScaleFactorChanged {
                mut inner_size_writer,
                ..
            } => {
                let size = window.inner_size();
                let _ = inner_size_writer.request_inner_size(size);
                if let Some(backend) = self.backend.as_mut() {
                    backend.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match action_for_key(&event.logical_key) {
                    Some(KeyAction::Command(command)) => self.send(command),
                    Some(KeyAction::Close) => {
                        info!("escape pressed; closing viewer");
                        event_loop.exit();
                    }
                    None => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(command) = command_for_wheel(delta) {
                    self.send(command);
                }
            }
            WindowEvent::RedrawRequested => {
                self.draw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
            self.next_tick += self.tick_interval;
            if self.next_tick <= now {
                // Fell behind; progress is wall-clock based so just resync.
                self.next_tick = now + self.tick_interval;
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                event_loop.exit();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(backend) = self.backend.as_mut() {
            self.runtime.shutdown(backend);
        }
    }
}

/// Run the carousel window on the calling thread until it closes or
/// `cancel` fires. Must be called from within a tokio runtime.
pub fn run_windowed(
    runtime: CarouselRuntime,
    tick_interval: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(runtime, tick_interval, cancel);
    let run_result = event_loop.run_app(&mut app);
    cancel_task.abort();

    run_result.context("viewer event loop failed")
}

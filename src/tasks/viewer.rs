use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wgpu::{self, SurfaceError};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

use crate::{
    config::Configuration,
    events::FrameReady,
    frames::FrameStore,
    gpu::presenter::BackdropPresenter,
    processing::filter::BackdropFilter,
    render::canvas::{Canvas, CpuCanvas},
    render::renderer::RenderOutcome,
    scroll::ScrollTracker,
    tasks::scheduler::UpdateScheduler,
    theme::{Theme, ThemeStore},
};

#[derive(Debug)]
enum ViewerEvent {
    FrameReady(FrameReady),
    Cancelled,
}

struct ViewerApp {
    cfg: Configuration,
    cancel: CancellationToken,
    theme: Theme,
    theme_store: ThemeStore,
    scroll: ScrollTracker,
    scheduler: UpdateScheduler<CpuCanvas>,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    presenter: Option<BackdropPresenter>,
    canvas_dirty: bool,
    pending_redraw: bool,
}

impl ViewerApp {
    fn new(
        cfg: Configuration,
        cancel: CancellationToken,
        store: FrameStore,
        theme: Theme,
        theme_store: ThemeStore,
    ) -> Self {
        let scroll = ScrollTracker::new(cfg.scroll.content_height_px, 0.0);
        let scheduler = UpdateScheduler::new(store, CpuCanvas::new(0, 0), cfg.repaint_on_ready);
        Self {
            cfg,
            cancel,
            theme,
            theme_store,
            scroll,
            scheduler,
            window: None,
            surface: None,
            surface_config: None,
            device: None,
            queue: None,
            presenter: None,
            canvas_dirty: false,
            pending_redraw: false,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let attrs = WindowAttributes::default().with_title("Scroll Backdrop");
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

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to acquire GPU adapter")?;

        let caps = surface.get_capabilities(&adapter);
        // filter math runs on sRGB-encoded values; prefer a target that stores them as-is
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|fmt| !fmt.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported texture formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .context("surface reports no supported alpha modes")?;

        let limits = adapter.limits();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("backdrop-device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to acquire GPU device")?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "viewer surface configured",
        );

        let presenter = BackdropPresenter::new(&device, format);
        presenter.set_filter(&queue, &BackdropFilter::new(&self.cfg.backdrop, self.theme));

        self.surface = Some(surface);
        self.surface_config = Some(config);
        self.device = Some(device);
        self.queue = Some(queue);
        self.presenter = Some(presenter);

        self.scroll.set_viewport_height(f64::from(size.height));
        let outcome = self
            .scheduler
            .mount(size.width, size.height, self.scroll.progress());
        self.note_render(outcome);
        Ok(())
    }

    fn handle_resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if let (Some(surface), Some(device), Some(config)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.surface_config.as_mut(),
        ) {
            config.width = new_size.width.max(1);
            config.height = new_size.height.max(1);
            surface.configure(device, config);
            debug!(
                width = config.width,
                height = config.height,
                "viewer surface resized",
            );
        }

        self.scroll.set_viewport_height(f64::from(new_size.height));
        let outcome = self
            .scheduler
            .on_resize(new_size.width, new_size.height, self.scroll.progress());
        self.note_render(outcome);
        self.request_redraw();
    }

    fn scroll_changed(&mut self, changed: bool) {
        if !changed {
            return;
        }
        let outcome = self.scheduler.on_progress(self.scroll.progress());
        self.note_render(outcome);
        if self.canvas_dirty {
            self.request_redraw();
        }
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let dy = match delta {
            MouseScrollDelta::LineDelta(_, lines) => -f64::from(lines) * self.cfg.scroll.line_height_px,
            MouseScrollDelta::PixelDelta(pos) => -pos.y,
        };
        let changed = self.scroll.scroll_by(dy);
        self.scroll_changed(changed);
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let line = self.cfg.scroll.line_height_px;
        let changed = match event.logical_key.as_ref() {
            Key::Named(NamedKey::ArrowDown) => self.scroll.scroll_by(line),
            Key::Named(NamedKey::ArrowUp) => self.scroll.scroll_by(-line),
            Key::Named(NamedKey::PageDown) | Key::Named(NamedKey::Space) => self.scroll.page(1),
            Key::Named(NamedKey::PageUp) => self.scroll.page(-1),
            Key::Named(NamedKey::Home) => self.scroll.scroll_to_start(),
            Key::Named(NamedKey::End) => self.scroll.scroll_to_end(),
            Key::Named(NamedKey::Escape) => {
                info!("escape pressed; closing viewer");
                event_loop.exit();
                false
            }
            Key::Character(c) if c.eq_ignore_ascii_case("t") => {
                self.toggle_theme();
                false
            }
            _ => false,
        };
        self.scroll_changed(changed);
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        info!(theme = %self.theme, "theme toggled");
        if let Err(err) = self.theme_store.save(self.theme) {
            warn!(error = ?err, "failed to persist theme preference");
        }
        if let (Some(presenter), Some(queue)) = (self.presenter.as_ref(), self.queue.as_ref()) {
            presenter.set_filter(queue, &BackdropFilter::new(&self.cfg.backdrop, self.theme));
        }
        self.request_redraw();
    }

    fn note_render(&mut self, outcome: Option<RenderOutcome>) {
        // a resize wipes the buffer even when nothing new could be painted
        if outcome.is_some() {
            self.canvas_dirty = true;
        }
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(surface), Some(device), Some(queue), Some(window)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.queue.as_ref(),
            self.window.as_ref(),
        ) else {
            return;
        };

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
                info!("viewer surface lost; reconfiguring");
                let size = window.inner_size();
                self.handle_resize(size);
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("viewer surface out of memory; exiting event loop");
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                warn!("viewer surface acquisition timed out");
                return;
            }
            Err(SurfaceError::Other) => {
                warn!("viewer surface reported an unknown error; retrying");
                let size = window.inner_size();
                self.handle_resize(size);
                return;
            }
        };

        let Some(presenter) = self.presenter.as_mut() else {
            return;
        };
        if self.canvas_dirty {
            let canvas = self.scheduler.canvas();
            let (width, height) = canvas.size();
            presenter.upload(device, queue, width, height, canvas.pixels());
            self.canvas_dirty = false;
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("backdrop-encoder"),
        });
        let background = presenter.clear_color(self.theme.background_rgb());
        presenter.draw(&mut encoder, &view, background);

        self.pending_redraw = false;
        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    fn request_redraw(&mut self) {
        self.pending_redraw = true;
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
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

        if self.device.is_none() {
            if let Err(err) = self.init_gpu(window) {
                error!(error = ?err, "failed to initialize GPU state");
                event_loop.exit();
                return;
            }
        }

        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
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
                self.handle_resize(new_size);
            }
            WindowEvent::ScaleFactorChanged {
                mut inner_size_writer,
                ..
            } => {
                let size = window.inner_size();
                let _ = inner_size_writer.request_inner_size(size);
                self.handle_resize(size);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_wheel(delta);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, event);
            }
            WindowEvent::RedrawRequested => {
                self.draw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.pending_redraw {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::FrameReady(ready) => {
                let outcome = self.scheduler.on_frame_ready(ready);
                if outcome.is_some() {
                    self.note_render(outcome);
                    self.request_redraw();
                }
            }
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                event_loop.exit();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scheduler.teardown();
    }
}

/// Open the backdrop window and run its event loop on the calling thread.
///
/// Must be called from within a Tokio runtime: frame-ready notices and
/// cancellation are bridged into the event loop by a spawned task.
pub fn run_windowed(
    cfg: Configuration,
    store: FrameStore,
    mut ready_rx: mpsc::UnboundedReceiver<FrameReady>,
    cancel: CancellationToken,
    theme: Theme,
    theme_store: ThemeStore,
) -> Result<()> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")?;
    let proxy = event_loop.create_proxy();

    let bridge_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        let _ = proxy.send_event(ViewerEvent::Cancelled);
                        break;
                    }
                    Some(ready) = ready_rx.recv() => {
                        if proxy.send_event(ViewerEvent::FrameReady(ready)).is_err() {
                            break;
                        }
                    }
                }
            }
        })
    };

    let mut app = ViewerApp::new(cfg, cancel, store, theme, theme_store);
    let run_result = event_loop.run_app(&mut app);
    app.scheduler.teardown();
    bridge_task.abort();

    run_result.context("viewer event loop failed")
}

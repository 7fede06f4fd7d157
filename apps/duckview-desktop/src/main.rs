use anyhow::{Context, Result};
use clap::Parser;
use duckview_assets::{LoadOutcome, Model, spawn_load};
use duckview_common::Color;
use duckview_input::PointerButton;
use duckview_render::{RenderError, Viewport};
use duckview_render_wgpu::{RenderedFrame, WgpuRenderer};
use duckview_viewer::{FrameLoop, Viewer, ViewerConfig};
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{
    ElementState, KeyEvent, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "duckview-desktop", about = "glTF duck viewer with orbit controls")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Model to load (.glb or .gltf)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Top color of the background gradient, e.g. "#ADD8E6"
    #[arg(long, value_name = "HEX")]
    top_color: Option<Color>,

    /// Bottom color of the background gradient
    #[arg(long, value_name = "HEX")]
    bottom_color: Option<Color>,

    /// JSON viewer configuration; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(top) = self.top_color {
            config.background.top = top;
        }
        if let Some(bottom) = self.bottom_color {
            config.background.bottom = bottom;
        }
        Ok(config)
    }
}

/// Events delivered to the winit loop from other threads.
#[derive(Debug)]
enum AppEvent {
    ModelLoaded(LoadOutcome),
}

#[derive(Debug, Clone, PartialEq)]
enum LoadStatus {
    Loading,
    Loaded { meshes: usize },
    Failed(String),
}

/// Window, viewer and overlay. Exists once the GPU is up.
struct Gpu {
    window: Arc<Window>,
    viewer: Viewer<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    cursor: Vec2,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, config: &ViewerConfig) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Duck Viewer")
            .with_inner_size(LogicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("creating window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("duckview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("creating device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let viewport = viewport_for(window.inner_size(), window.scale_factor());
        let (width, height) = viewport.physical_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            "GPU initialized"
        );

        let renderer = WgpuRenderer::new(surface, device, queue, surface_config, viewport, true);
        let egui_renderer =
            egui_wgpu::Renderer::new(renderer.device(), surface_format, None, 1, false);

        let mut viewer = Viewer::new(config, renderer, viewport);
        viewer
            .controls_mut()
            .set_viewport(width as f32, height as f32);

        let egui_ctx = EguiContext::default();
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        Ok(Self {
            window,
            viewer,
            egui_ctx,
            egui_winit,
            egui_renderer,
            cursor: Vec2::ZERO,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let viewport = viewport_for(size, self.window.scale_factor());
        self.viewer.resize(viewport);
        self.viewer
            .controls_mut()
            .set_viewport(size.width as f32, size.height as f32);
    }

    /// Forward pointer, wheel and touch input to the orbit controller.
    fn handle_input(&mut self, event: &WindowEvent) {
        let controls = self.viewer.controls_mut();
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = to_vec2(*position);
                if controls.is_dragging() {
                    controls.on_pointer_move(self.cursor);
                } else {
                    controls.on_pointer_hover(self.cursor);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = pointer_button(*button) else {
                    return;
                };
                match state {
                    ElementState::Pressed => controls.on_pointer_down(button, self.cursor),
                    ElementState::Released => controls.on_pointer_up(button),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => controls.on_wheel(wheel_delta_y(*delta)),
            WindowEvent::Touch(Touch {
                id,
                phase,
                location,
                ..
            }) => match phase {
                TouchPhase::Started => controls.on_touch_start(*id, to_vec2(*location)),
                TouchPhase::Moved => controls.on_touch_move(*id, to_vec2(*location)),
                TouchPhase::Ended | TouchPhase::Cancelled => controls.on_touch_end(*id),
            },
            _ => {}
        }
    }

    /// Draw the status overlay on top of a rendered frame. Returns `true`
    /// when the retry button was clicked.
    fn draw_overlay(&mut self, frame: &RenderedFrame, model: &str, status: &LoadStatus) -> bool {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let mut retry = false;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Duck Viewer")
                .default_pos([12.0, 12.0])
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Model: {model}"));
                    match status {
                        LoadStatus::Loading => {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label("Loading...");
                            });
                        }
                        LoadStatus::Loaded { meshes } => {
                            ui.label(format!("Loaded, {meshes} meshes"));
                        }
                        LoadStatus::Failed(error) => {
                            ui.colored_label(egui::Color32::from_rgb(200, 40, 40), error);
                            retry = ui.button("Retry (R)").clicked();
                        }
                    }
                    ui.separator();
                    ui.small("LMB: Orbit | RMB: Pan | Wheel: Zoom | Esc: Quit");
                });
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let renderer = self.viewer.renderer();
        let (device, queue) = (renderer.device(), renderer.queue());
        let (width, height) = renderer.surface_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: frame.view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        retry
    }
}

struct App {
    config: ViewerConfig,
    proxy: EventLoopProxy<AppEvent>,
    frame_loop: FrameLoop,
    status: LoadStatus,
    gpu: Option<Gpu>,
    /// Set when start-up fails inside the event loop; returned from `main`.
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig, proxy: EventLoopProxy<AppEvent>) -> Self {
        Self {
            config,
            proxy,
            frame_loop: FrameLoop::new(),
            status: LoadStatus::Loading,
            gpu: None,
            fatal: None,
        }
    }

    /// Start loading the configured model on a worker thread. The outcome
    /// comes back as [`AppEvent::ModelLoaded`].
    fn start_load(&mut self) {
        let proxy = self.proxy.clone();
        let spawned = spawn_load(self.config.model.clone(), move |outcome| {
            if proxy.send_event(AppEvent::ModelLoaded(outcome)).is_err() {
                tracing::debug!("event loop closed before the model arrived");
            }
        });
        self.status = match spawned {
            Ok(_) => LoadStatus::Loading,
            Err(e) => LoadStatus::Failed(format!("could not start loader: {e}")),
        };
    }

    fn retry_load(&mut self) {
        if matches!(self.status, LoadStatus::Failed(_)) {
            tracing::info!(path = %self.config.model.display(), "retrying model load");
            self.start_load();
        }
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.frame_loop.stop();
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let mut retry = false;
        match self.frame_loop.tick(&mut gpu.viewer) {
            None => {
                event_loop.exit();
                return;
            }
            Some(Ok(frame)) => {
                let model = self.config.model.display().to_string();
                retry = gpu.draw_overlay(&frame, &model, &self.status);
                frame.present();
            }
            Some(Err(RenderError::SurfaceLost)) => {
                tracing::debug!("surface lost, reconfigured");
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "frame skipped");
            }
        }
        gpu.window.request_redraw();
        if retry {
            self.retry_load();
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.config) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
                self.start_load();
            }
            Err(e) => {
                tracing::error!(error = %e, "start-up failed");
                self.fatal = Some(e);
                self.quit(event_loop);
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::ModelLoaded(outcome) => {
                let meshes = outcome.as_ref().map(Model::mesh_count).unwrap_or(0);
                let Some(gpu) = &mut self.gpu else {
                    return;
                };
                self.status = match gpu.viewer.on_model_loaded(outcome) {
                    Ok(_) => LoadStatus::Loaded { meshes },
                    Err(e) => LoadStatus::Failed(e.to_string()),
                };
                gpu.window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::Resized(size) => gpu.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = gpu.window.inner_size();
                gpu.resize(size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => self.quit(event_loop),
                KeyCode::KeyR => self.retry_load(),
                _ => {}
            },
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => gpu.handle_input(&other),
        }
    }
}

/// Logical size plus pixel ratio for a window's physical size.
fn viewport_for(size: PhysicalSize<u32>, scale_factor: f64) -> Viewport {
    let logical: LogicalSize<f64> = size.to_logical(scale_factor);
    Viewport::new(logical.width.round() as u32, logical.height.round() as u32)
        .with_pixel_ratio(scale_factor)
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Wheel delta with the browser sign convention (negative = scroll up).
fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(p) => -(p.y as f32),
    }
}

fn to_vec2(position: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(position.x as f32, position.y as f32)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.viewer_config()?;
    tracing::info!(model = %config.model.display(), "duckview-desktop starting");

    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(e) => Err(e),
        None => {
            tracing::info!(frames = app.frame_loop.frames(), "duckview-desktop stopped");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_from_hidpi_window() {
        let v = viewport_for(PhysicalSize::new(2560, 1440), 2.0);
        assert_eq!((v.width, v.height), (1280, 720));
        assert_eq!(v.physical_size(), (2560, 1440));
    }

    #[test]
    fn wheel_up_is_negative() {
        assert!(wheel_delta_y(MouseScrollDelta::LineDelta(0.0, 1.0)) < 0.0);
        assert!(
            wheel_delta_y(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -30.0))) > 0.0
        );
    }

    #[test]
    fn button_mapping() {
        assert_eq!(pointer_button(MouseButton::Left), Some(PointerButton::Primary));
        assert_eq!(pointer_button(MouseButton::Right), Some(PointerButton::Secondary));
        assert_eq!(pointer_button(MouseButton::Back), None);
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "duckview-desktop",
            "--model",
            "Fox.glb",
            "--top-color",
            "#000000",
        ]);
        let config = cli.viewer_config().unwrap();
        assert_eq!(config.model, PathBuf::from("Fox.glb"));
        assert_eq!(config.background.top, Color::BLACK);
        assert_eq!(config.background.bottom, ViewerConfig::default().background.bottom);
    }
}

mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use lightbox_input::{PointerButton, PointerTracker};
use lightbox_render_wgpu::{SurfaceFrame, WgpuRenderer};
use lightbox_runtime::{Clock, DemoConfig, DemoScene, FrameScheduler, LoopState, RenderLoop};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "lightbox-desktop", about = "Six light types, four meshes, one debug panel")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720.0)]
    height: f32,

    /// Disable orbit damping (camera stops as soon as the pointer does)
    #[arg(long)]
    no_damping: bool,
}

/// Asks the window for another redraw, which runs the next frame.
struct WindowScheduler<'a>(&'a Window);

impl FrameScheduler for WindowScheduler<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

/// Everything that exists only once a window is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        demo: &mut DemoScene,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Lightbox")
            .with_inner_size(LogicalSize::new(
                demo.viewport.width(),
                demo.viewport.height(),
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f32>(scale);
        demo.resize(logical.width, logical.height, scale as f32);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lightbox_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let (width, height) = demo.viewport.surface_size();
        let config = wgpu::SurfaceConfiguration {
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
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, width, height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, surface {width}x{height}",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Match the surface to the viewport's physical size.
    fn reconfigure(&mut self, (width, height): (u32, u32)) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }

    /// Draw the debug panel over an already rendered frame.
    fn paint_ui(
        &mut self,
        egui_ctx: &EguiContext,
        demo: &mut DemoScene,
        view: &wgpu::TextureView,
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            ui::draw_panel(ctx, demo);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        // The surface is sized by the capped pixel ratio, not the native one.
        let pixels_per_point = demo.viewport.pixel_ratio();
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
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
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct LightboxApp {
    demo: DemoScene,
    render_loop: RenderLoop,
    tracker: PointerTracker,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
    init_error: Option<anyhow::Error>,
}

impl LightboxApp {
    fn new(demo: DemoScene) -> Self {
        Self {
            demo,
            render_loop: RenderLoop::new(Clock::default()),
            tracker: PointerTracker::new(),
            egui_ctx: EguiContext::default(),
            gpu: None,
            init_error: None,
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale: f64) {
        let logical = size.to_logical::<f32>(scale);
        if !self.demo.resize(logical.width, logical.height, scale as f32) {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.reconfigure(self.demo.viewport.surface_size());
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let mut scheduler = WindowScheduler(&gpu.window);
        let mut frame = SurfaceFrame {
            renderer: &mut gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            surface: &gpu.surface,
        };
        let Some(result) = self
            .render_loop
            .frame(&mut self.demo, &mut frame, &mut scheduler)
        else {
            if self.render_loop.state() == LoopState::Stopped {
                event_loop.exit();
            }
            return;
        };

        match result {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                gpu.paint_ui(&self.egui_ctx, &mut self.demo, &view);
                texture.present();
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure(self.demo.viewport.surface_size());
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
            }
        }
    }
}

impl ApplicationHandler for LightboxApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx, &mut self.demo) {
            Ok(gpu) => {
                let mut scheduler = WindowScheduler(&gpu.window);
                if let Err(e) = self.render_loop.start(&mut scheduler) {
                    tracing::warn!("{e}");
                }
                self.gpu = Some(gpu);
            }
            Err(e) => {
                self.init_error = Some(e);
                event_loop.exit();
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
        let scale = gpu.window.scale_factor();
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        let released = matches!(
            event,
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            }
        );
        // Releases always reach the tracker so a drag cannot stick.
        if response.consumed && !released {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.render_loop.token().cancel();
                tracing::info!("window closed after {} frames", self.render_loop.frames());
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = gpu.window.inner_size();
                self.resize(size, scale_factor);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale);
                let action = self.tracker.move_to(Vec2::new(logical.x, logical.y));
                self.demo.handle_action(action);
            }
            WindowEvent::CursorLeft { .. } => {
                self.tracker.leave();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => self.tracker.press(button),
                    ElementState::Released => self.tracker.release(button),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Scrolling up moves toward the target.
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                let action = self.tracker.wheel(dy);
                self.demo.handle_action(action);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("lightbox-desktop starting");

    let demo = DemoScene::new(DemoConfig {
        width: cli.width,
        height: cli.height,
        device_pixel_ratio: 1.0,
        damping: !cli.no_damping,
    })?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = LightboxApp::new(demo);
    event_loop.run_app(&mut app)?;

    match app.init_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

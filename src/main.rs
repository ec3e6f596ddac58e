mod canvas;
mod cli;
mod config;
mod error;
mod field;
mod framepace;
mod gpu;
mod overlay;
mod particle;
mod render;
mod spatial;

use std::sync::Arc;

use clap::Parser;
use field::ParticleField;
use framepace::Framepacer;
use gpu::GpuContext;
use log::{info, warn};
use overlay::Overlay;
use rand::{rngs::StdRng, SeedableRng};
use render::{RenderModule, ShapeBatch};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // State
    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        gfx: None,
        field: Some(ParticleField::new(args.field_config(), rng)),
        batch: ShapeBatch::default(),
        framepace: Framepacer::new(args.framerate),
        show_overlay: args.overlay,
    };

    event_loop.run_app(&mut app_state)?;
    Ok(())
}

struct GfxState {
    window: Arc<Window>,
    gpu: GpuContext,

    render_module: RenderModule,
    overlay: Overlay,
}

struct AppState {
    tokio_rt: tokio::runtime::Runtime,
    gfx: Option<GfxState>,
    field: Option<ParticleField>,
    batch: ShapeBatch,
    framepace: Framepacer,

    show_overlay: bool,
}

impl AppState {
    fn init_gfx(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<GfxState> {
        let window = Arc::new(
            event_loop.create_window(Window::default_attributes().with_title("Particle Field"))?,
        );
        let window_size = window.inner_size();

        let gpu = self.tokio_rt.block_on(GpuContext::new(window.clone()))?;

        let render_module = RenderModule::new(&gpu.device, gpu.format());
        render_module.update_size(&gpu.queue, window_size.width, window_size.height);

        let pixels_per_particle = self
            .field
            .as_ref()
            .map_or(0, |field| field.config.pixels_per_particle);
        let mut overlay = Overlay::new(
            &gpu.device,
            gpu.format(),
            self.show_overlay,
            pixels_per_particle,
        );
        overlay.input.resize(window_size.width, window_size.height);

        Ok(GfxState {
            window,
            gpu,
            render_module,
            overlay,
        })
    }

    fn redraw(&mut self) {
        let (Some(gfx), Some(field)) = (&mut self.gfx, &mut self.field) else {
            return;
        };

        let frame = match gfx.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gfx.gpu.reconfigure_surface();
                gfx.window.request_redraw();
                return;
            }
            Err(e) => {
                warn!("Dropped frame: {}", e);
                if field.wants_frame() {
                    gfx.window.request_redraw();
                }
                return;
            }
        };

        self.framepace.begin_frame();
        if field.frame(&mut self.batch) {
            gfx.render_module
                .upload(&gfx.gpu.device, &gfx.gpu.queue, &self.batch);
        }

        let mut encoder = gfx
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        gfx.overlay.run(
            field,
            self.framepace.framerate(),
            self.framepace.frametime(),
        );
        let overlay_buffers = gfx
            .overlay
            .pre_render(&gfx.gpu.device, &gfx.gpu.queue, &mut encoder);

        // Render
        {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            let mut rpass = gfx.render_module.begin_pass(&mut encoder, &view);
            gfx.overlay.render(&mut rpass);
        }

        gfx.gpu
            .queue
            .submit(overlay_buffers.into_iter().chain(Some(encoder.finish())));
        frame.present();

        self.framepace.end_frame();
        if field.wants_frame() {
            gfx.window.request_redraw();
        }
    }

    /// Redraw for the overlay while the field isn't asking for frames itself
    fn refresh_overlay(&self) {
        let (Some(gfx), Some(field)) = (&self.gfx, &self.field) else {
            return;
        };

        if gfx.overlay.visible && !field.wants_frame() {
            gfx.window.request_redraw();
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut field) = self.field.take() {
            field.stop();
            info!("Stopped after {} particles", field.particles().len());
            field.dispose();
        }
        self.gfx = None;
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }

        // The effect is decorative, without a surface there is nothing to run
        let gfx = match self.init_gfx(event_loop) {
            Ok(gfx) => gfx,
            Err(e) => {
                warn!("Particle field disabled: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let size = gfx.window.inner_size();
        if let Some(field) = &mut self.field {
            field.start(size.width, size.height);
            info!(
                "Started {}x{} with {} particles ({:?} pair scan)",
                size.width,
                size.height,
                field.particles().len(),
                field.config.pair_scan
            );
        }

        gfx.window.request_redraw();
        self.gfx = Some(gfx);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(gfx), Some(field)) = (&mut self.gfx, &mut self.field) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                gfx.gpu.resize(new_size.width, new_size.height);
                gfx.render_module
                    .update_size(&gfx.gpu.queue, new_size.width, new_size.height);
                gfx.overlay.input.resize(new_size.width, new_size.height);

                field.on_resize(new_size.width, new_size.height);
                gfx.window.request_redraw();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                gfx.overlay.input.modifiers_event(modifiers);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if gfx.overlay.visible {
                    gfx.overlay.input.key_event(&event);
                }

                // A focused text field keeps the shortcuts from firing
                if gfx.overlay.wants_keyboard() {
                    self.refresh_overlay();
                    return;
                }

                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }

                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Space) => {
                        if field.is_running() {
                            field.stop();
                        } else {
                            field.resume();
                        }
                    }
                    PhysicalKey::Code(KeyCode::KeyR) => field.reseed(),
                    PhysicalKey::Code(KeyCode::F1) => {
                        gfx.overlay.visible = !gfx.overlay.visible;
                    }
                    PhysicalKey::Code(KeyCode::F11) => {
                        if gfx.window.fullscreen().is_none() {
                            gfx.window
                                .set_fullscreen(Some(winit::window::Fullscreen::Borderless(None)));
                        } else {
                            gfx.window.set_fullscreen(None);
                        }
                    }
                    _ => return,
                }

                gfx.window.request_redraw();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                gfx.overlay.input.mouse_event(state, button);
                self.refresh_overlay();
            }
            WindowEvent::CursorMoved { position, .. } => {
                field.on_pointer_move(position.x, position.y);
                gfx.overlay
                    .input
                    .pointer_moved(position.x as f32, position.y as f32);
                self.refresh_overlay();
            }
            WindowEvent::RedrawRequested => self.redraw(),

            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

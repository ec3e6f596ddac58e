//! egui panel for watching and tuning the field

use crate::field::ParticleField;

/// Window events translated into egui input for the next frame
#[derive(Default)]
pub struct OverlayInput {
    raw_input: egui::RawInput,
    pointer: egui::Pos2,
    modifiers: egui::Modifiers,
}

impl OverlayInput {
    pub fn resize(&mut self, width: u32, height: u32) {
        self.raw_input.screen_rect = Some(egui::Rect::from_min_size(
            Default::default(),
            egui::Vec2::new(width as f32, height as f32),
        ));
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = egui::Pos2::new(x, y);
        self.raw_input
            .events
            .push(egui::Event::PointerMoved(self.pointer));
    }

    pub fn mouse_event(
        &mut self,
        state: winit::event::ElementState,
        button: winit::event::MouseButton,
    ) {
        let button = match button {
            winit::event::MouseButton::Left => egui::PointerButton::Primary,
            winit::event::MouseButton::Right => egui::PointerButton::Secondary,
            winit::event::MouseButton::Middle => egui::PointerButton::Middle,
            _ => return,
        };

        self.raw_input.events.push(egui::Event::PointerButton {
            pos: self.pointer,
            button,
            pressed: state.is_pressed(),
            modifiers: self.modifiers,
        });
    }

    pub fn modifiers_event(&mut self, event: winit::event::Modifiers) {
        let state = event.state();
        self.modifiers.alt = state.alt_key();
        self.modifiers.ctrl = state.control_key();
        self.modifiers.shift = state.shift_key();
        self.modifiers.mac_cmd = state.super_key();
        self.modifiers.command = state.control_key() | state.super_key();
        self.raw_input.modifiers = self.modifiers;
    }

    pub fn key_event(&mut self, event: &winit::event::KeyEvent) {
        let pressed = event.state.is_pressed();
        if pressed {
            if let Some(text) = &event.text {
                self.text(text);
            }
        }

        if let winit::keyboard::Key::Named(key) = &event.logical_key {
            self.named_key(*key, pressed, event.repeat);
        }
    }

    /// Typed characters, control characters are sent as keys instead
    fn text(&mut self, text: &str) {
        if !text.is_empty() && !text.chars().any(char::is_control) {
            self.raw_input
                .events
                .push(egui::Event::Text(text.to_string()));
        }
    }

    fn named_key(&mut self, key: winit::keyboard::NamedKey, pressed: bool, repeat: bool) {
        let Some(key) = named_key_to_egui_key(key) else {
            return;
        };

        self.raw_input.events.push(egui::Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat,
            modifiers: self.modifiers,
        });
    }

    fn clear_events(&mut self) {
        self.raw_input.events.clear();
    }

    /// Input for the next frame, the screen size carries over
    fn take(&mut self, predicted_dt: f32) -> egui::RawInput {
        let mut raw_input = std::mem::take(&mut self.raw_input);
        if predicted_dt > 0.0 {
            raw_input.predicted_dt = predicted_dt;
        }
        self.raw_input.screen_rect = raw_input.screen_rect;
        self.raw_input.modifiers = self.modifiers;

        raw_input
    }
}

/// Keys needed to edit the numeric fields
fn named_key_to_egui_key(key: winit::keyboard::NamedKey) -> Option<egui::Key> {
    use winit::keyboard::NamedKey;
    Some(match key {
        NamedKey::Backspace => egui::Key::Backspace,
        NamedKey::Delete => egui::Key::Delete,
        NamedKey::Enter => egui::Key::Enter,
        NamedKey::Tab => egui::Key::Tab,
        NamedKey::Escape => egui::Key::Escape,
        NamedKey::Home => egui::Key::Home,
        NamedKey::End => egui::Key::End,
        NamedKey::ArrowLeft => egui::Key::ArrowLeft,
        NamedKey::ArrowRight => egui::Key::ArrowRight,
        NamedKey::ArrowUp => egui::Key::ArrowUp,
        NamedKey::ArrowDown => egui::Key::ArrowDown,
        _ => return None,
    })
}

pub struct Overlay {
    pub visible: bool,
    pub input: OverlayInput,

    ctx: egui::Context,

    renderer: egui_wgpu::Renderer,
    clipped_shapes: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,

    // Applied on request, changing it rebuilds every particle
    edited_pixels_per_particle: u64,
}

impl Overlay {
    pub fn new(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        visible: bool,
        pixels_per_particle: u64,
    ) -> Self {
        let renderer = egui_wgpu::Renderer::new(device, swapchain_format, None, 1);

        Self {
            visible,

            input: OverlayInput::default(),

            ctx: egui::Context::default(),

            renderer,
            clipped_shapes: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),

            edited_pixels_per_particle: pixels_per_particle,
        }
    }

    /// Whether typed keys belong to a focused overlay widget
    pub fn wants_keyboard(&self) -> bool {
        self.visible && self.ctx.wants_keyboard_input()
    }

    /// Lays out the panel, edits are written straight into `field`
    pub fn run(&mut self, field: &mut ParticleField, framerate: f32, frametime: f32) {
        if !self.visible {
            self.input.clear_events();
            self.clipped_shapes.clear();
            return;
        }

        let raw_input = self.input.take(frametime);
        let ctx = self.ctx.clone();
        ctx.begin_frame(raw_input);
        self.panel(&ctx, field, framerate);

        let output = ctx.end_frame();
        self.clipped_shapes = ctx.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta = output.textures_delta;
    }

    fn panel(&mut self, ctx: &egui::Context, field: &mut ParticleField, framerate: f32) {
        egui::Window::new("Particle Field")
            .default_width(180.0)
            .show(ctx, |ui| {
                let stats = field.stats();
                ui.label(format!("FPS {:.1}", framerate));
                ui.label(format!("State {:?}", field.lifecycle()));
                ui.label(format!("Particles {}", stats.particles));
                ui.label(format!(
                    "Links {} pair, {} pointer",
                    stats.pair_links, stats.pointer_links
                ));

                let mut paused = !field.is_running();
                if ui.checkbox(&mut paused, "Paused [Space]").changed() {
                    if paused {
                        field.stop();
                    } else {
                        field.resume();
                    }
                }

                ui.add_space(5.0);
                ui.heading("Pointer");
                ui.separator();
                match field.pointer() {
                    Some(pointer) => {
                        ui.label(format!("x: {:.0}\ny: {:.0}", pointer.x, pointer.y))
                    }
                    None => ui.label("Not seen yet"),
                };
                let config = &mut field.config;
                ui.add(
                    egui::Slider::new(&mut config.repel_radius, 0.0..=400.0).text("Repel radius"),
                );
                ui.add(
                    egui::Slider::new(&mut config.repel_strength, 0.0..=5.0)
                        .text("Repel strength"),
                );
                ui.add(egui::Slider::new(&mut config.size_gain, 0.0..=5.0).text("Size gain"));
                ui.add(
                    egui::Slider::new(&mut config.pointer_link_distance, 0.0..=400.0)
                        .text("Link distance"),
                );

                ui.add_space(5.0);
                ui.heading("Particles");
                ui.separator();
                ui.add(
                    egui::Slider::new(&mut config.pair_link_distance, 0.0..=250.0)
                        .text("Link distance"),
                );
                ui.add(
                    egui::DragValue::new(&mut self.edited_pixels_per_particle)
                        .clamp_range(100..=1_000_000)
                        .suffix(" px² per particle"),
                );

                if ui.button("Apply").clicked()
                    && self.edited_pixels_per_particle != config.pixels_per_particle
                {
                    config.pixels_per_particle = self.edited_pixels_per_particle;
                    field.reseed();
                }
            });
    }

    /// Returns command buffers egui wants submitted before the frame
    pub fn pre_render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let screen_descriptor = self.screen_descriptor();
        let buffers = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &self.clipped_shapes,
            &screen_descriptor,
        );

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
        self.textures_delta = egui::TexturesDelta::default();

        buffers
    }

    pub fn render<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        if self.clipped_shapes.is_empty() {
            return;
        }

        let screen_descriptor = self.screen_descriptor();
        self.renderer
            .render(rpass, &self.clipped_shapes, &screen_descriptor);
    }

    fn screen_descriptor(&self) -> egui_wgpu::ScreenDescriptor {
        let screen_rect = self.ctx.screen_rect();
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_rect.width() as u32, screen_rect.height() as u32],
            pixels_per_point: self.ctx.pixels_per_point(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NamedKey;

    #[test]
    fn typed_digits_reach_egui() {
        let mut input = OverlayInput::default();
        input.text("4");
        input.text("2");
        input.named_key(NamedKey::Backspace, true, false);
        input.named_key(NamedKey::Enter, true, false);

        let raw_input = input.take(0.0);
        assert_eq!(
            raw_input.events,
            vec![
                egui::Event::Text("4".into()),
                egui::Event::Text("2".into()),
                egui::Event::Key {
                    key: egui::Key::Backspace,
                    physical_key: None,
                    pressed: true,
                    repeat: false,
                    modifiers: Default::default(),
                },
                egui::Event::Key {
                    key: egui::Key::Enter,
                    physical_key: None,
                    pressed: true,
                    repeat: false,
                    modifiers: Default::default(),
                },
            ]
        );
    }

    #[test]
    fn control_characters_are_not_text() {
        let mut input = OverlayInput::default();
        input.text("\u{8}");
        input.text("\r");
        input.text("");
        assert!(input.take(0.0).events.is_empty());
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        let mut input = OverlayInput::default();
        input.named_key(NamedKey::F1, true, false);
        input.named_key(NamedKey::Space, true, false);
        assert!(input.take(0.0).events.is_empty());
    }

    #[test]
    fn take_keeps_screen_and_sets_dt() {
        let mut input = OverlayInput::default();
        input.resize(800, 600);
        input.pointer_moved(10.0, 20.0);

        let first = input.take(1.0 / 60.0);
        assert_eq!(first.events.len(), 1);
        assert_eq!(first.predicted_dt, 1.0 / 60.0);

        let second = input.take(0.0);
        assert!(second.events.is_empty());
        assert_eq!(
            second.screen_rect,
            Some(egui::Rect::from_min_size(
                Default::default(),
                egui::Vec2::new(800.0, 600.0)
            ))
        );
    }
}

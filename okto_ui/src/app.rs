use egui::{Color32, Context, Key, Pos2, Rect};

use okto::Chip8;

/// How many interpreter steps to run per rendered frame by default. At 60
/// frames per second this works out to the few hundred instructions per
/// second classic programs were written for.
pub const DEFAULT_STEPS_PER_FRAME: u32 = 10;

/// Lit pixel color.
const FOREGROUND: Color32 = Color32::from_rgb(0x5F, 0xE8, 0x82);

/// Unlit pixel color.
const BACKGROUND: Color32 = Color32::from_rgb(0x10, 0x14, 0x10);

/// Key mapping from a standard english keyboard to the 4x4 hex pad: the
/// 1234/QWER/ASDF/ZXCV block mirrors the pad's layout.
static KEY_MAP: [(Key, u8); 16] = [
    (Key::Num1, 0x1),
    (Key::Num2, 0x2),
    (Key::Num3, 0x3),
    (Key::Num4, 0xC),
    (Key::Q, 0x4),
    (Key::W, 0x5),
    (Key::E, 0x6),
    (Key::R, 0xD),
    (Key::A, 0x7),
    (Key::S, 0x8),
    (Key::D, 0x9),
    (Key::F, 0xE),
    (Key::Z, 0xA),
    (Key::X, 0x0),
    (Key::C, 0xB),
    (Key::V, 0xF),
];

/// The emulator shell: one machine, the controls around it, and the screen.
pub struct App {
    chip8: Chip8,
    steps_per_frame: u32,
    paused: bool,
    /// The fault that stopped the machine, if one has happened. Execution
    /// stays stopped until the user resets.
    halted: Option<okto::Error>,
    /// The last loaded ROM image, kept so reset can reload it.
    last_rom: Vec<u8>,
}

impl App {
    /// Create the app with `rom` loaded and ready to run. With no ROM the
    /// machine starts paused, since empty memory faults on the first fetch.
    #[must_use]
    pub fn new(_cc: &eframe::CreationContext<'_>, rom: Vec<u8>) -> Self {
        let mut chip8 = Chip8::new();
        let paused = rom.is_empty();
        if paused {
            log::warn!("no ROM on the command line; starting paused");
        } else {
            chip8.load_rom(&rom);
        }
        Self {
            chip8,
            steps_per_frame: DEFAULT_STEPS_PER_FRAME,
            paused,
            halted: None,
            last_rom: rom,
        }
    }

    /// Run up to `steps` interpreter steps, stopping early on a fault.
    fn run_steps(&mut self, steps: u32) {
        for _ in 0..steps {
            if let Err(fault) = self.chip8.step() {
                log::error!("machine halted: {fault}");
                self.halted = Some(fault);
                break;
            }
        }
        // No audio backend; surface the one-shot expiry in the log while the
        // BEEP label tracks the running timer.
        if self.chip8.take_sound_expired() {
            log::debug!("sound timer expired");
        }
    }

    /// Put the machine back at power-on and reload the current ROM.
    fn reset(&mut self) {
        self.chip8.reset();
        if !self.last_rom.is_empty() {
            self.chip8.load_rom(&self.last_rom);
        }
        self.halted = None;
    }

    /// Mirror the host keyboard into the hex pad, unless a widget wants the
    /// keyboard for itself.
    fn update_key_state(&mut self, ctx: &Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|input| {
            for (key, code) in KEY_MAP {
                self.chip8.set_key(code, input.keys_down.contains(&key));
            }
        });
    }

    fn draw_top_panel(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let play_pause_label = if self.paused {
                    "\u{23F5} Play"
                } else {
                    "\u{23F8} Pause"
                };
                if ui.button(play_pause_label).clicked() {
                    self.paused = !self.paused;
                }

                if ui.button("\u{27A1} Step").clicked() && self.halted.is_none() {
                    self.run_steps(1);
                }

                if ui.button("\u{21BB} Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.label("Steps per frame");
                ui.add(egui::DragValue::new(&mut self.steps_per_frame).clamp_range(1..=1000));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if self.chip8.sound_active() {
                        ui.colored_label(FOREGROUND, "\u{1F50A} BEEP");
                    }
                });
            });
        });
    }

    /// Paint the framebuffer, one filled rectangle per lit pixel, scaled to
    /// whatever space the panel has.
    fn draw_screen(&self, ctx: &Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default().inner_margin(egui::vec2(0.0, 0.0)))
            .show(ctx, |ui| {
                egui::Frame::canvas(ui.style()).show(ui, |ui| {
                    let (rect, _) = ui.allocate_exact_size(
                        ui.available_size(),
                        egui::Sense::focusable_noninteractive(),
                    );

                    let (width, height) = self.chip8.display_size();
                    let cell_w = rect.width() / width as f32;
                    let cell_h = rect.height() / height as f32;

                    let painter = ui.painter();
                    painter.rect_filled(rect, 0.0, BACKGROUND);
                    painter.extend(self.chip8.pixels().iter().enumerate().filter_map(
                        |(i, &lit)| {
                            if !lit {
                                return None;
                            }
                            let min = Pos2 {
                                x: rect.left() + (i % width) as f32 * cell_w,
                                y: rect.top() + (i / width) as f32 * cell_h,
                            };
                            let cell = Rect::from_min_size(min, egui::vec2(cell_w, cell_h));
                            Some(egui::Shape::rect_filled(cell, 0.0, FOREGROUND))
                        },
                    ));
                });
            });
    }

    /// When the machine has faulted, say so on top of everything else.
    fn draw_halt_window(&mut self, ctx: &Context) {
        let Some(fault) = self.halted else {
            return;
        };
        egui::Window::new("Machine halted")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(fault.to_string());
                ui.label(format!(
                    "PC {:#06X}, I {:#06X}",
                    self.chip8.pc(),
                    self.chip8.index_register()
                ));
                if ui.button("\u{21BB} Reset").clicked() {
                    self.reset();
                }
            });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.update_key_state(ctx);

        if !self.paused && self.halted.is_none() {
            self.run_steps(self.steps_per_frame);
        }

        self.draw_top_panel(ctx);
        self.draw_screen(ctx);
        self.draw_halt_window(ctx);

        // The interpreter runs on frame updates, so keep them coming even
        // when no input arrives.
        ctx.request_repaint();
    }
}

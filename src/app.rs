use std::path::PathBuf;
use std::time::Instant;

use egui::{
    Align2, CentralPanel, Color32, Context, FontId, Id, LayerId, Order, TopBottomPanel, Vec2,
    ViewportCommand,
};

use crate::config::PlayerSettings;
use crate::controller::{PlaybackController, WindowChrome, WindowMode};
use crate::player::FfmpegEngine;
use crate::ui::controls::PlayerControls;
use crate::ui::picker::DialogPicker;
use crate::ui::shortcuts::Shortcut;

/// The player window
pub struct PlayerApp {
    controller: PlaybackController<FfmpegEngine>,
    picker: DialogPicker,
    /// Chrome the window currently has, as far as we applied or observed it
    chrome: WindowChrome,
}

impl PlayerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: &PlayerSettings,
    ) -> anyhow::Result<Self> {
        let engine = FfmpegEngine::new(cc.egui_ctx.clone())?;
        Ok(Self {
            controller: PlaybackController::new(engine, settings),
            picker: DialogPicker,
            chrome: WindowChrome::default(),
        })
    }

    fn open(&mut self, path: PathBuf) {
        // Failures land in the status line
        let _ = self.controller.open_media(path);
    }

    fn toggle_fullscreen(&mut self, ctx: &Context) {
        let target = self.controller.toggle_fullscreen(self.chrome);
        apply_chrome(ctx, &target);
        self.chrome = target;
    }

    fn track_window_mode(&mut self, ctx: &Context) {
        if self.controller.is_fullscreen() {
            return;
        }
        let (minimized, maximized) =
            ctx.input(|i| (i.viewport().minimized, i.viewport().maximized));
        self.chrome.mode = match (minimized, maximized) {
            (Some(true), _) => WindowMode::Minimized,
            (_, Some(true)) => WindowMode::Maximized,
            (_, Some(false)) => WindowMode::Normal,
            _ => self.chrome.mode,
        };
    }

    fn handle_shortcuts(&mut self, ctx: &Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        for shortcut in ctx.input(Shortcut::pressed) {
            match shortcut {
                Shortcut::PlayPause => {
                    let _ = self.controller.toggle_play_pause(&mut self.picker);
                }
                Shortcut::Fullscreen => self.toggle_fullscreen(ctx),
                Shortcut::SeekForward => self.controller.skip_forward(),
                Shortcut::SeekBack => self.controller.skip_back(),
                Shortcut::VolumeUp => self.controller.volume_up(),
                Shortcut::VolumeDown => self.controller.volume_down(),
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.iter().find_map(|file| file.path.clone()));
        if let Some(path) = dropped {
            self.open(path);
        }

        if ctx.input(|i| !i.raw.hovered_files.is_empty()) {
            let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("drop_hint")));
            let screen = ctx.screen_rect();
            painter.rect_filled(screen, 0.0, Color32::from_black_alpha(160));
            painter.text(
                screen.center(),
                Align2::CENTER_CENTER,
                "Drop to play",
                FontId::proportional(28.0),
                Color32::WHITE,
            );
        }
    }

    fn show_video(&self, ui: &mut egui::Ui) -> bool {
        let engine = self.controller.engine();
        let (Some(texture), Some((width, height))) = (engine.texture(), engine.video_size()) else {
            return false;
        };
        let texture_id = texture.id();

        // Scale to fit while keeping the aspect ratio
        let available = ui.available_size();
        let aspect = width as f32 / height.max(1) as f32;
        let display_size = if aspect > available.x / available.y {
            Vec2::new(available.x, available.x / aspect)
        } else {
            Vec2::new(available.y * aspect, available.y)
        };

        let mut double_clicked = false;
        ui.centered_and_justified(|ui| {
            let response = ui.add(
                egui::Image::new((texture_id, display_size)).sense(egui::Sense::click()),
            );
            double_clicked = response.double_clicked();
        });
        double_clicked
    }

    fn show_empty(&mut self, ui: &mut egui::Ui) {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);

                if let Some(ref status) = self.controller.ui().status {
                    ui.colored_label(Color32::RED, status);
                    ui.add_space(20.0);
                }

                ui.heading("No video loaded");
                ui.add_space(10.0);

                if ui.button("Open Video File...").clicked() {
                    let _ = self.controller.open_with(&mut self.picker);
                }

                ui.add_space(10.0);
                ui.label("Or drag and drop a video file");
            });
        });
    }
}

fn apply_chrome(ctx: &Context, chrome: &WindowChrome) {
    ctx.send_viewport_cmd(ViewportCommand::Decorations(chrome.decorated));
    ctx.send_viewport_cmd(ViewportCommand::Resizable(chrome.resizable));
    match chrome.mode {
        WindowMode::Normal => ctx.send_viewport_cmd(ViewportCommand::Maximized(false)),
        WindowMode::Maximized => ctx.send_viewport_cmd(ViewportCommand::Maximized(true)),
        WindowMode::Minimized => ctx.send_viewport_cmd(ViewportCommand::Minimized(true)),
    }
    ctx.request_repaint();
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Engine notifications are only ever handled here, on the UI thread
        self.controller.pump_events();

        self.track_window_mode(ctx);
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);
        self.controller.engine_mut().update_frame();

        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open...").clicked() {
                        ui.close_menu();
                        let _ = self.controller.open_with(&mut self.picker);
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(ViewportCommand::Close);
                    }
                });
                ui.separator();
                ui.label(self.controller.ui().now_playing.as_str());
                if self.controller.media_loaded() {
                    if let Some(ref status) = self.controller.ui().status {
                        ui.colored_label(Color32::RED, status);
                    }
                }
            });
        });

        let controls = TopBottomPanel::bottom("controls")
            .show(ctx, |ui| {
                PlayerControls::show(ui, &mut self.controller, &mut self.picker)
            })
            .inner;
        if controls.toggle_fullscreen {
            self.toggle_fullscreen(ctx);
        }

        let double_clicked = CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                if self.controller.media_loaded() {
                    self.show_video(ui)
                } else {
                    self.show_empty(ui);
                    false
                }
            })
            .inner;
        if double_clicked {
            self.toggle_fullscreen(ctx);
        }

        let now = Instant::now();
        self.controller.tick(now);
        ctx.request_repaint_after(self.controller.clock().until_next(now));
    }
}

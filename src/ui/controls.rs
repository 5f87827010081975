use egui::{Slider, Ui};

use crate::controller::PlaybackController;
use crate::engine::MediaEngine;
use crate::ui::picker::FilePicker;

/// Width kept free for the labels and buttons around the progress slider
const CONTROLS_RESERVED_WIDTH: f32 = 300.0;
const MIN_PROGRESS_WIDTH: f32 = 80.0;

/// What the control bar asks the window to do
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControlsResponse {
    pub toggle_fullscreen: bool,
}

pub struct PlayerControls;

impl PlayerControls {
    pub fn show<E: MediaEngine>(
        ui: &mut Ui,
        controller: &mut PlaybackController<E>,
        picker: &mut dyn FilePicker,
    ) -> ControlsResponse {
        let mut response = ControlsResponse::default();

        ui.horizontal(|ui| {
            if ui.button(controller.ui().glyph.symbol()).clicked() {
                // Failures are already in the status line
                let _ = controller.toggle_play_pause(picker);
            }

            ui.separator();

            ui.label(controller.ui().elapsed.as_str());

            let progress_width =
                (ui.available_width() - CONTROLS_RESERVED_WIDTH).max(MIN_PROGRESS_WIDTH);
            ui.spacing_mut().slider_width = progress_width;
            let mut progress = controller.ui().progress;
            let slider = ui.add_enabled(
                controller.media_loaded(),
                Slider::new(&mut progress, 0.0..=100.0)
                    .show_value(false)
                    .trailing_fill(true),
            );
            if slider.changed() {
                controller.drag_progress(progress);
            }
            controller.sync_scrub(slider.is_pointer_button_down_on());

            ui.label(controller.ui().total.as_str());

            ui.separator();

            ui.label("🔊");
            ui.spacing_mut().slider_width = 100.0;
            let mut volume = controller.volume();
            if ui
                .add(Slider::new(&mut volume, 0..=100).show_value(false))
                .changed()
            {
                controller.set_volume(volume);
            }

            ui.separator();

            let fullscreen_text = if controller.ui().fullscreen { "🗗" } else { "⛶" };
            if ui
                .button(fullscreen_text)
                .on_hover_text("Toggle fullscreen (F, or double-click the video)")
                .clicked()
            {
                response.toggle_fullscreen = true;
            }
        });

        response
    }
}

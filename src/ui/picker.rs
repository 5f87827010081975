use std::path::PathBuf;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm"];

/// Source of a user-chosen media path.
pub trait FilePicker {
    /// Ask for a file. `None` when the user cancels.
    fn pick_media(&mut self) -> Option<PathBuf>;
}

/// Native open-file dialog.
#[derive(Debug, Default)]
pub struct DialogPicker;

impl FilePicker for DialogPicker {
    fn pick_media(&mut self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Open video")
            .add_filter("Videos", VIDEO_EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
    }
}

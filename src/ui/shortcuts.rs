use egui::{Event, InputState, Key};

/// Keyboard actions of the player window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    PlayPause,
    Fullscreen,
    SeekForward,
    SeekBack,
    VolumeUp,
    VolumeDown,
}

impl Shortcut {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Space => Some(Shortcut::PlayPause),
            Key::F => Some(Shortcut::Fullscreen),
            Key::ArrowRight => Some(Shortcut::SeekForward),
            Key::ArrowLeft => Some(Shortcut::SeekBack),
            Key::ArrowUp => Some(Shortcut::VolumeUp),
            Key::ArrowDown => Some(Shortcut::VolumeDown),
            _ => None,
        }
    }

    /// Shortcuts pressed this frame, in order. Auto-repeat counts as a press;
    /// chords with Ctrl/Alt/Cmd are left to the rest of the UI.
    pub fn pressed(input: &InputState) -> Vec<Self> {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } if !(modifiers.ctrl || modifiers.alt || modifiers.command) => {
                    Self::from_key(*key)
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Modifiers;

    fn key(key: Key, pressed: bool, repeat: bool, modifiers: Modifiers) -> Event {
        Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat,
            modifiers,
        }
    }

    fn input(events: Vec<Event>) -> InputState {
        let mut input = InputState::default();
        input.events = events;
        input
    }

    #[test]
    fn maps_player_keys() {
        assert_eq!(Shortcut::from_key(Key::Space), Some(Shortcut::PlayPause));
        assert_eq!(Shortcut::from_key(Key::F), Some(Shortcut::Fullscreen));
        assert_eq!(Shortcut::from_key(Key::ArrowRight), Some(Shortcut::SeekForward));
        assert_eq!(Shortcut::from_key(Key::ArrowLeft), Some(Shortcut::SeekBack));
        assert_eq!(Shortcut::from_key(Key::ArrowUp), Some(Shortcut::VolumeUp));
        assert_eq!(Shortcut::from_key(Key::ArrowDown), Some(Shortcut::VolumeDown));
    }

    #[test]
    fn ignores_other_keys() {
        assert_eq!(Shortcut::from_key(Key::Enter), None);
        assert_eq!(Shortcut::from_key(Key::G), None);
    }

    #[test]
    fn collects_presses_in_order() {
        let input = input(vec![
            key(Key::ArrowRight, true, false, Modifiers::NONE),
            key(Key::Space, true, false, Modifiers::NONE),
            key(Key::G, true, false, Modifiers::NONE),
        ]);
        assert_eq!(
            Shortcut::pressed(&input),
            vec![Shortcut::SeekForward, Shortcut::PlayPause]
        );
    }

    #[test]
    fn releases_are_not_presses() {
        let input = input(vec![key(Key::Space, false, false, Modifiers::NONE)]);
        assert!(Shortcut::pressed(&input).is_empty());
    }

    #[test]
    fn auto_repeat_keeps_seeking() {
        let input = input(vec![
            key(Key::ArrowLeft, true, false, Modifiers::NONE),
            key(Key::ArrowLeft, true, true, Modifiers::NONE),
            key(Key::ArrowLeft, true, true, Modifiers::NONE),
        ]);
        assert_eq!(Shortcut::pressed(&input), vec![Shortcut::SeekBack; 3]);
    }

    #[test]
    fn chords_belong_to_the_rest_of_the_ui() {
        let input = input(vec![
            key(Key::F, true, false, Modifiers::CTRL),
            key(Key::ArrowUp, true, false, Modifiers::ALT),
            key(Key::Space, true, false, Modifiers::COMMAND),
        ]);
        assert!(Shortcut::pressed(&input).is_empty());
    }

    #[test]
    fn shift_does_not_block_a_shortcut() {
        let input = input(vec![key(Key::ArrowDown, true, false, Modifiers::SHIFT)]);
        assert_eq!(Shortcut::pressed(&input), vec![Shortcut::VolumeDown]);
    }
}

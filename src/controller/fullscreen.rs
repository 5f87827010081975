/// How the window sits on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Normal,
    Maximized,
    Minimized,
}

/// The parts of window presentation that fullscreen overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChrome {
    pub mode: WindowMode,
    pub decorated: bool,
    pub resizable: bool,
}

impl WindowChrome {
    /// Borderless, fixed-size and maximized: what "fullscreen" means here.
    pub const FULLSCREEN: Self = Self {
        mode: WindowMode::Maximized,
        decorated: false,
        resizable: false,
    };
}

impl Default for WindowChrome {
    fn default() -> Self {
        Self {
            mode: WindowMode::Normal,
            decorated: true,
            resizable: true,
        }
    }
}

/// Two-state fullscreen switch that remembers the chrome it replaced.
///
/// The snapshot exists exactly while fullscreen is active, so leaving always
/// restores what was there on entry.
#[derive(Debug, Default)]
pub struct FullscreenToggle {
    saved: Option<WindowChrome>,
}

impl FullscreenToggle {
    pub fn is_fullscreen(&self) -> bool {
        self.saved.is_some()
    }

    /// Flip the mode and return the chrome the window should now have.
    pub fn toggle(&mut self, current: WindowChrome) -> WindowChrome {
        match self.saved.take() {
            Some(saved) => saved,
            None => {
                self.saved = Some(current);
                WindowChrome::FULLSCREEN
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_hides_chrome_and_maximizes() {
        let mut toggle = FullscreenToggle::default();
        let target = toggle.toggle(WindowChrome::default());

        assert!(toggle.is_fullscreen());
        assert_eq!(target.mode, WindowMode::Maximized);
        assert!(!target.decorated);
        assert!(!target.resizable);
    }

    #[test]
    fn toggling_twice_restores_original_chrome() {
        let originals = [
            WindowChrome::default(),
            WindowChrome {
                mode: WindowMode::Maximized,
                decorated: true,
                resizable: false,
            },
            WindowChrome {
                mode: WindowMode::Minimized,
                decorated: false,
                resizable: true,
            },
        ];

        for original in originals {
            let mut toggle = FullscreenToggle::default();
            let fullscreen = toggle.toggle(original);
            let restored = toggle.toggle(fullscreen);

            assert_eq!(restored, original);
            assert!(!toggle.is_fullscreen());
        }
    }

    #[test]
    fn snapshot_is_retaken_on_each_entry() {
        let mut toggle = FullscreenToggle::default();
        let first = WindowChrome::default();
        let second = WindowChrome {
            mode: WindowMode::Maximized,
            ..first
        };

        toggle.toggle(first);
        toggle.toggle(WindowChrome::FULLSCREEN);
        toggle.toggle(second);

        assert_eq!(toggle.toggle(WindowChrome::FULLSCREEN), second);
    }
}

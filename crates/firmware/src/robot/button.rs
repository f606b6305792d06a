//! Button press edge detection

/// Turns a level-sampled button into press events.
///
/// The first sample only primes the detector, so a button already held at
/// startup does not count as a press.
#[derive(Debug, Clone, Default)]
pub struct ButtonEdge {
    was_pressed: Option<bool>,
}

impl ButtonEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample; true on a released → pressed edge.
    pub fn update(&mut self, pressed: bool) -> bool {
        let edge = self.was_pressed == Some(false) && pressed;
        self.was_pressed = Some(pressed);
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_edge() {
        let mut edge = ButtonEdge::new();
        assert!(!edge.update(false));
        assert!(edge.update(true));
        assert!(!edge.update(true));
        assert!(!edge.update(false));
        assert!(edge.update(true));
    }

    #[test]
    fn test_held_at_startup_is_not_a_press() {
        let mut edge = ButtonEdge::new();
        assert!(!edge.update(true));
        assert!(!edge.update(true));
    }
}

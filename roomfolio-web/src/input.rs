/// Browser input state: pointer position and the scroll/touch gestures
/// that open the gesture gate.
pub struct InputState {
    pub pointer_x: f32,
    pub pointer_y: f32,
    touch_start_y: Option<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pointer_x: 0.0,
            pointer_y: 0.0,
            touch_start_y: None,
        }
    }

    /// Pointer moved to client coordinates (CSS px).
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer_x = x;
        self.pointer_y = y;
    }

    /// Wheel input. Only scrolling down counts as a gesture.
    pub fn wheel(&self, delta_y: f32) -> bool {
        delta_y > 0.0
    }

    pub fn touch_start(&mut self, y: f32) {
        self.touch_start_y = Some(y);
    }

    /// Touch moved to client `y`. Only an upward swipe (page scrolling down)
    /// counts as a gesture.
    pub fn touch_move(&mut self, y: f32) -> bool {
        match self.touch_start_y {
            Some(start) if y < start => {
                self.touch_start_y = Some(y);
                true
            }
            Some(_) => false,
            None => {
                self.touch_start_y = Some(y);
                false
            }
        }
    }

    /// Horizontal pointer position mapped to `[-1, 1]` across the viewport.
    pub fn normalized_pointer_x(&self, width: u32) -> f32 {
        let width = width.max(1) as f32;
        ((self.pointer_x - width / 2.0) * 2.0 / width).clamp(-1.0, 1.0)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_pointer_x() {
        let mut input = InputState::new();
        input.pointer_move(0.0, 0.0);
        assert_eq!(input.normalized_pointer_x(1000), -1.0);
        input.pointer_move(500.0, 0.0);
        assert_eq!(input.normalized_pointer_x(1000), 0.0);
        input.pointer_move(1000.0, 0.0);
        assert_eq!(input.normalized_pointer_x(1000), 1.0);
        input.pointer_move(5000.0, 0.0);
        assert_eq!(input.normalized_pointer_x(1000), 1.0);
    }

    #[test]
    fn test_only_downward_wheel_is_gesture() {
        let mut input = InputState::new();
        assert!(!input.wheel(-40.0));
        assert!(!input.wheel(0.0));
        assert!(input.wheel(40.0));
    }

    #[test]
    fn test_only_upward_swipe_is_gesture() {
        let mut input = InputState::new();
        input.touch_start(400.0);
        assert!(!input.touch_move(450.0));
        assert!(!input.touch_move(400.0));
        assert!(input.touch_move(380.0));
        // measured from the last counted position
        assert!(!input.touch_move(390.0));
        assert!(input.touch_move(300.0));
    }

    #[test]
    fn test_touch_move_without_start_is_not_gesture() {
        let mut input = InputState::new();
        assert!(!input.touch_move(200.0));
        assert!(input.touch_move(150.0));
    }
}

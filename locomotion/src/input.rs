//! Per-frame input sampling: held buttons, press edges and the jump buffer.

use crate::bitmask_flags::BitmaskFlags;
use crate::utils::Vec2;

crate::define_bitmask_flags!(Button, u8, {
    Jump,
    Dash,
    Slide,
    Sprint,
});

pub type ButtonFlags = BitmaskFlags<u8>;

/// Raw device state for one frame. `move_axis` is x = strafe right, y = forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawInput {
    pub move_axis: Vec2,
    pub look_delta: Vec2,
    pub jump: bool,
    pub dash: bool,
    pub slide: bool,
    pub sprint: bool,
}

impl Default for RawInput {
    fn default() -> Self {
        Self {
            move_axis: Vec2::zeros(),
            look_delta: Vec2::zeros(),
            jump: false,
            dash: false,
            slide: false,
            sprint: false,
        }
    }
}

impl RawInput {
    fn held(&self) -> ButtonFlags {
        let mut flags = ButtonFlags::empty();
        flags.set(Button::Jump, self.jump);
        flags.set(Button::Dash, self.dash);
        flags.set(Button::Slide, self.slide);
        flags.set(Button::Sprint, self.sprint);
        flags
    }
}

/// Input state consumed by the motor.
///
/// Press edges last for the frame they were sampled in unless a state consumes them first.
/// A jump press also starts the jump buffer, which survives across frames until it expires or
/// a jump consumes it.
#[derive(Clone, Debug)]
pub struct InputBuffer {
    jump_buffer_window: f32,
    jump_buffer_timer: f32,
    /// Whether this machine drives the character. Without authority every read is neutral.
    authority: bool,
    held: ButtonFlags,
    previous: ButtonFlags,
    pressed: ButtonFlags,
    move_axis: Vec2,
    look_delta: Vec2,
}

impl InputBuffer {
    pub fn new(jump_buffer_window: f32) -> Self {
        Self {
            jump_buffer_window: jump_buffer_window.max(0.0),
            jump_buffer_timer: 0.0,
            authority: true,
            held: ButtonFlags::empty(),
            previous: ButtonFlags::empty(),
            pressed: ButtonFlags::empty(),
            move_axis: Vec2::zeros(),
            look_delta: Vec2::zeros(),
        }
    }

    /// Take this frame's device state.
    pub fn sample(&mut self, raw: &RawInput, dt: f32) {
        self.jump_buffer_timer = (self.jump_buffer_timer - dt.max(0.0)).max(0.0);

        if !self.authority {
            return;
        }

        self.previous = self.held;
        self.held = raw.held();
        self.pressed = self.held.rising_since(self.previous);

        let len = raw.move_axis.norm();
        self.move_axis = if len > 1.0 { raw.move_axis / len } else { raw.move_axis };
        self.look_delta = raw.look_delta;

        if self.pressed.has(Button::Jump) {
            self.jump_buffer_timer = self.jump_buffer_window;
        }
    }

    /// Drop unconsumed edges once the frame is over.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.look_delta = Vec2::zeros();
    }

    /// Granting or revoking authority resets all state.
    pub fn set_authority(&mut self, authority: bool) {
        if self.authority == authority {
            return;
        }
        self.authority = authority;
        self.held.clear();
        self.previous.clear();
        self.pressed.clear();
        self.move_axis = Vec2::zeros();
        self.look_delta = Vec2::zeros();
        self.jump_buffer_timer = 0.0;
    }

    pub fn has_authority(&self) -> bool {
        self.authority
    }

    pub fn move_axis(&self) -> Vec2 {
        self.move_axis
    }

    pub fn look_delta(&self) -> Vec2 {
        self.look_delta
    }

    pub fn has_move_input(&self) -> bool {
        self.move_axis.norm_squared() > 1.0e-4
    }

    pub fn jump_held(&self) -> bool {
        self.held.has(Button::Jump)
    }

    pub fn slide_held(&self) -> bool {
        self.held.has(Button::Slide)
    }

    pub fn sprint_held(&self) -> bool {
        self.held.has(Button::Sprint)
    }

    pub fn dash_pressed(&self) -> bool {
        self.pressed.has(Button::Dash)
    }

    pub fn consume_dash(&mut self) {
        self.pressed.remove(Button::Dash);
    }

    pub fn slide_pressed(&self) -> bool {
        self.pressed.has(Button::Slide)
    }

    pub fn consume_slide_press(&mut self) {
        self.pressed.remove(Button::Slide);
    }

    /// A jump pressed this frame, or one still inside the buffer window.
    pub fn has_buffered_jump(&self) -> bool {
        self.pressed.has(Button::Jump) || self.jump_buffer_timer > 0.0
    }

    /// Use the buffered jump. Also clears the jump edge.
    pub fn consume_buffered_jump(&mut self) {
        self.jump_buffer_timer = 0.0;
        self.pressed.remove(Button::Jump);
    }

    pub fn jump_buffer_remaining(&self) -> f32 {
        self.jump_buffer_timer
    }
}

//! The 16-key hex keypad.
//!
//! Key state is a pure level signal: the host reports key-down and key-up,
//! the interpreter samples whatever the last report was. No debouncing, no
//! queueing. The one stateful extra is the FX0A wait latch: once armed, the
//! next key-down *transition* is captured so the interpreter can pick it up
//! on a later cycle. A key already held when the latch is armed does not
//! count.

/// Level state for keys 0x0-0xF plus the key-wait latch.
pub struct Keypad {
    state: [bool; 16],
    wait_armed: bool,
    latched: Option<u8>,
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            state: [false; 16],
            wait_armed: false,
            latched: None,
        }
    }

    /// Whether `key` is currently held. Indices are masked to the low four
    /// bits, mirroring the framebuffer's aliasing policy.
    pub fn get(&self, key: u8) -> bool {
        self.state[usize::from(key & 0xF)]
    }

    /// Record a key-down or key-up from the host. Reports that do not
    /// change the level are ignored, so holding a key produces a single
    /// transition.
    pub fn set(&mut self, key: u8, pressed: bool) {
        let key = key & 0xF;
        let index = usize::from(key);
        if self.state[index] == pressed {
            return;
        }
        self.state[index] = pressed;

        if pressed && self.wait_armed {
            self.wait_armed = false;
            self.latched = Some(key);
        }
    }

    /// Arm the wait latch: the next key-down transition will be captured.
    /// Any previously captured key is discarded.
    pub fn arm_wait(&mut self) {
        self.wait_armed = true;
        self.latched = None;
    }

    /// Take the captured key, if a press has arrived since [`Self::arm_wait`].
    pub fn take_latched(&mut self) -> Option<u8> {
        self.latched.take()
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_level_state() {
        let mut keypad = Keypad::new();
        assert!(!keypad.get(0x5));
        keypad.set(0x5, true);
        assert!(keypad.get(0x5));
        keypad.set(0x5, false);
        assert!(!keypad.get(0x5));
    }

    #[test]
    fn masks_indices_to_four_bits() {
        let mut keypad = Keypad::new();
        keypad.set(0x15, true);
        assert!(keypad.get(0x5));
    }

    #[test]
    fn latches_press_transition_when_armed() {
        let mut keypad = Keypad::new();
        keypad.arm_wait();
        keypad.set(0xA, true);
        assert_eq!(keypad.take_latched(), Some(0xA));
        assert_eq!(keypad.take_latched(), None);
    }

    #[test]
    fn held_key_does_not_satisfy_wait() {
        let mut keypad = Keypad::new();
        keypad.set(0x3, true);
        keypad.arm_wait();
        // Re-reporting the held key is not a transition.
        keypad.set(0x3, true);
        assert_eq!(keypad.take_latched(), None);
        // Release and press again is.
        keypad.set(0x3, false);
        keypad.set(0x3, true);
        assert_eq!(keypad.take_latched(), Some(0x3));
    }

    #[test]
    fn key_up_does_not_latch() {
        let mut keypad = Keypad::new();
        keypad.set(0x7, true);
        keypad.arm_wait();
        keypad.set(0x7, false);
        assert_eq!(keypad.take_latched(), None);
    }
}

//! A CHIP-8 virtual machine.
//!
//! The crate models the classic interpreted machine: 4 KiB of memory with the
//! hex font at the bottom, sixteen `Vx` registers, a 64 by 32 monochrome
//! display drawn with XOR sprites, a sixteen key hex pad, and two 60 Hz
//! timers. Programs are plain byte images loaded at `0x200`.
//!
//! [`Chip8`] is the machine; everything else hangs off it. The host drives
//! execution by calling [`Chip8::step`] in a loop, feeds key state in with
//! [`Chip8::set_key`], and reads the display back out through
//! [`Chip8::pixels`]. A step that hits something a program cannot legally do
//! returns an [`Error`] describing the fault and where it happened; the
//! machine stays put, so a host can show the fault or reset.
//!
//! A [`Chip8`] is a plain value with no interior locking. It is `Send`, so a
//! host that wants the interpreter off the UI thread can move it there and
//! own the pacing itself.
//!
//! ```
//! use okto::Chip8;
//!
//! let mut chip8 = Chip8::new();
//! chip8.load_rom(&[0x60, 0x05, 0x70, 0x03]); // V0 = 5, then V0 += 3
//! chip8.step().unwrap();
//! chip8.step().unwrap();
//! assert_eq!(chip8.registers()[0], 8);
//! ```

use crate::clock::Clock;
use crate::cpu::Cpu;
use crate::framebuffer::FrameBuffer;
use crate::keypad::Keypad;
use crate::memory::Memory;

mod clock;
mod cpu;
mod error;
mod framebuffer;
mod keypad;
mod memory;
mod opcode;

pub use error::Error;
pub use opcode::Opcode;

/// Machine parameters. The defaults describe the classic interpreter; hosts
/// that want a quirk or a different layout override individual fields.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Bytes of addressable memory.
    pub memory_size: usize,

    /// Display width in pixels.
    pub display_width: usize,

    /// Display height in pixels.
    pub display_height: usize,

    /// Address execution starts at and ROMs are loaded to.
    pub initial_pc: u16,

    /// Maximum depth of the subroutine call stack.
    pub stack_depth: usize,

    /// Rate at which the delay and sound timers count down.
    pub timer_hz: u32,

    /// When set, `8XY6` and `8XYE` copy VY into VX before shifting, the way
    /// the original COSMAC VIP interpreter did.
    pub load_vy_shift: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_size: 4096,
            display_width: 64,
            display_height: 32,
            initial_pc: 0x200,
            stack_depth: 16,
            timer_hz: 60,
            load_vy_shift: false,
        }
    }
}

/// Everything the processor reaches through: memory, the framebuffer, and
/// the keypad. Keeping these behind one seam keeps [`Cpu`] free of any
/// knowledge of how they are laid out.
pub(crate) struct Bus {
    pub(crate) memory: Memory,
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) keypad: Keypad,
}

impl Bus {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            memory: Memory::new(config.memory_size),
            framebuffer: FrameBuffer::new(config.display_width, config.display_height),
            keypad: Keypad::new(),
        }
    }

    /// Wipe every store back to power-on contents, keeping the allocations.
    pub(crate) fn reset(&mut self) {
        self.memory.clear();
        self.framebuffer.clear();
        self.keypad = Keypad::new();
    }

    pub(crate) fn read_byte(&self, address: u16) -> Result<u8, Error> {
        self.memory.read(address)
    }

    pub(crate) fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Error> {
        self.memory.write(address, value)
    }

    pub(crate) fn read_pixel(&self, x: usize, y: usize) -> bool {
        self.framebuffer.read(x, y)
    }

    pub(crate) fn write_pixel(&mut self, x: usize, y: usize, on: bool) {
        self.framebuffer.write(x, y, on)
    }

    pub(crate) fn clear_display(&mut self) {
        self.framebuffer.clear();
    }

    pub(crate) fn key_pressed(&self, key: u8) -> bool {
        self.keypad.get(key)
    }

    pub(crate) fn begin_key_wait(&mut self) {
        self.keypad.arm_wait();
    }

    pub(crate) fn poll_key_wait(&mut self) -> Option<u8> {
        self.keypad.take_latched()
    }
}

/// A complete CHIP-8 machine.
pub struct Chip8 {
    config: Config,
    cpu: Cpu,
    bus: Bus,
    clock: Clock,
}

impl Chip8 {
    /// Create a machine with the [default](Config::default) parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a machine with explicit parameters.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            cpu: Cpu::new(&config),
            bus: Bus::new(&config),
            clock: Clock::new(config.timer_hz),
            config,
        }
    }

    /// Copy a ROM image into memory at the start address and report how many
    /// bytes fit. An image larger than the remaining memory is truncated.
    pub fn load_rom(&mut self, data: &[u8]) -> usize {
        let loaded = self.bus.memory.load(self.config.initial_pc, data);
        log::debug!(
            "loaded {loaded} byte ROM at {:#06X}",
            self.config.initial_pc
        );
        loaded
    }

    /// Run one processor cycle and bring the timers up to date.
    ///
    /// # Errors
    ///
    /// Returns the fault when the cycle executes an unknown opcode, misuses
    /// the call stack, or touches memory out of bounds. The machine is left
    /// exactly as the faulting instruction left it; stepping again will
    /// usually fault again, so hosts should stop or [reset](Self::reset).
    pub fn step(&mut self) -> Result<(), Error> {
        self.cpu.cycle(&mut self.bus)?;
        self.cpu.update_timers(self.clock.tick());
        Ok(())
    }

    /// Report a key press or release from the host.
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.bus.keypad.set(key, pressed);
    }

    /// Whether the pixel at `(x, y)` is lit. Coordinates wrap around the
    /// display edges.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.bus.framebuffer.read(x, y)
    }

    /// The whole display, row-major, `true` for lit.
    #[must_use]
    pub fn pixels(&self) -> &[bool] {
        self.bus.framebuffer.pixels()
    }

    /// Display dimensions as `(width, height)`.
    #[must_use]
    pub fn display_size(&self) -> (usize, usize) {
        (self.bus.framebuffer.width(), self.bus.framebuffer.height())
    }

    /// The sixteen `Vx` registers.
    #[must_use]
    pub fn registers(&self) -> &[u8; 16] {
        &self.cpu.v
    }

    /// The program counter.
    #[must_use]
    pub fn pc(&self) -> u16 {
        self.cpu.pc
    }

    /// The address register `I`.
    #[must_use]
    pub fn index_register(&self) -> u16 {
        self.cpu.i
    }

    /// Whether the sound timer is running, meaning the host should be
    /// playing its tone.
    #[must_use]
    pub fn sound_active(&self) -> bool {
        self.cpu.sound_timer > 0
    }

    /// True once per display change since the last call. Hosts poll this to
    /// skip repainting frames where nothing was drawn.
    pub fn take_display_updated(&mut self) -> bool {
        std::mem::take(&mut self.cpu.display_updated)
    }

    /// True once per sound timer expiry since the last call.
    pub fn take_sound_expired(&mut self) -> bool {
        std::mem::take(&mut self.cpu.sound_expired)
    }

    /// Return the machine to power-on state: memory reseeded with the font,
    /// display dark, registers and timers zeroed. Loaded ROM data is
    /// discarded; the host reloads it if it wants to run again.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new(&self.config);
        self.bus.reset();
        self.clock.restart();
        log::debug!("machine reset");
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

//! Whole-machine tests driving [`Chip8`] the way a host would: load a ROM,
//! step, feed keys, read the display back.

use std::thread;
use std::time::{Duration, Instant};

use okto::{Chip8, Config, Error};

#[test]
fn arithmetic_program_runs_to_completion() {
    let mut chip8 = Chip8::new();
    // V0 = 5, V0 += 3, clear the screen.
    chip8.load_rom(&[0x60, 0x05, 0x70, 0x03, 0x00, 0xE0]);

    chip8.step().unwrap();
    chip8.step().unwrap();
    assert_eq!(chip8.registers()[0], 8);
    assert!(!chip8.take_display_updated());

    chip8.step().unwrap();
    assert!(chip8.take_display_updated());
    assert!(chip8.pixels().iter().all(|&lit| !lit));
    assert_eq!(chip8.pc(), 0x206);
}

#[test]
fn default_display_is_64_by_32() {
    let chip8 = Chip8::new();
    assert_eq!(chip8.display_size(), (64, 32));
    assert_eq!(chip8.pixels().len(), 64 * 32);
}

#[test]
fn unknown_opcode_halts_with_location() {
    let mut chip8 = Chip8::new();
    chip8.load_rom(&[0xFF, 0xFF]);

    let fault = chip8.step().unwrap_err();
    assert_eq!(
        fault,
        Error::UnknownOpcode {
            opcode: 0xFFFF,
            pc: 0x200
        }
    );
    assert_eq!(fault.to_string(), "unknown opcode 0xFFFF at 0x0200");
}

#[test]
fn runaway_recursion_overflows_the_stack() {
    let mut chip8 = Chip8::new();
    // A subroutine that calls itself.
    chip8.load_rom(&[0x22, 0x00]);

    for _ in 0..16 {
        chip8.step().unwrap();
    }
    assert_eq!(
        chip8.step().unwrap_err(),
        Error::StackOverflow { pc: 0x200 }
    );
}

#[test]
fn oversized_rom_is_truncated() {
    let mut chip8 = Chip8::new();
    let image = vec![0xAB; 8192];
    // 4096 bytes of memory minus the 0x200 byte reserved region.
    assert_eq!(chip8.load_rom(&image), 3584);
}

#[test]
fn drawing_a_font_glyph_lights_pixels_that_wrap() {
    let mut chip8 = Chip8::new();
    // V0 = 0, I = glyph for 0, draw its 5 rows at (V0, V0).
    chip8.load_rom(&[0x60, 0x00, 0xF0, 0x29, 0xD0, 0x05]);
    for _ in 0..3 {
        chip8.step().unwrap();
    }

    assert!(chip8.take_display_updated());
    assert_eq!(chip8.index_register(), 0);
    // The glyph for 0 has a solid top row in its high nibble.
    assert!(chip8.pixel(0, 0));
    assert!(chip8.pixel(3, 0));
    assert!(!chip8.pixel(1, 1));
    // Coordinates wrap, so one full width to the right is the same pixel.
    assert_eq!(chip8.pixel(64, 0), chip8.pixel(0, 0));
}

#[test]
fn key_wait_blocks_until_a_fresh_press() {
    let mut chip8 = Chip8::new();
    // Park on a key press into V1, then clear the screen.
    chip8.load_rom(&[0xF1, 0x0A, 0x00, 0xE0]);

    // The key held before the wait begins must not satisfy it.
    chip8.set_key(0x7, true);
    chip8.step().unwrap();
    let parked = chip8.pc();
    chip8.step().unwrap();
    chip8.step().unwrap();
    assert_eq!(chip8.pc(), parked);

    chip8.set_key(0x7, false);
    chip8.set_key(0x7, true);
    chip8.step().unwrap();
    assert_eq!(chip8.registers()[1], 0x7);
    assert_eq!(chip8.pc(), parked + 2);
}

#[test]
fn key_skip_selects_a_branch() {
    // E09E with key 0 up: fall through to V0 = 1.
    let mut chip8 = Chip8::new();
    chip8.load_rom(&[0xE0, 0x9E, 0x60, 0x01, 0x60, 0x02]);
    chip8.step().unwrap();
    chip8.step().unwrap();
    assert_eq!(chip8.registers()[0], 1);

    // With key 0 held: skip to V0 = 2.
    let mut chip8 = Chip8::new();
    chip8.load_rom(&[0xE0, 0x9E, 0x60, 0x01, 0x60, 0x02]);
    chip8.set_key(0x0, true);
    chip8.step().unwrap();
    chip8.step().unwrap();
    assert_eq!(chip8.registers()[0], 2);
}

#[test]
fn sound_timer_runs_down_and_raises_the_edge() {
    let mut chip8 = Chip8::new();
    // Sound timer = 10, then spin in place.
    chip8.load_rom(&[0x60, 0x0A, 0xF0, 0x18, 0x12, 0x04]);
    chip8.step().unwrap();
    chip8.step().unwrap();
    assert!(chip8.sound_active());

    // Ten 60 Hz periods is shy of 170 ms; give it two seconds before
    // calling the timer stuck.
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut expired = false;
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
        chip8.step().unwrap();
        if chip8.take_sound_expired() {
            expired = true;
            break;
        }
    }
    assert!(expired);
    assert!(!chip8.sound_active());
}

#[test]
fn reset_discards_the_program_and_state() {
    let mut chip8 = Chip8::new();
    chip8.load_rom(&[0x60, 0x00, 0xF0, 0x29, 0xD0, 0x05]);
    for _ in 0..3 {
        chip8.step().unwrap();
    }
    assert!(chip8.pixels().iter().any(|&lit| lit));

    chip8.reset();
    assert_eq!(chip8.pc(), 0x200);
    assert_eq!(chip8.registers(), &[0; 16]);
    assert_eq!(chip8.index_register(), 0);
    assert!(chip8.pixels().iter().all(|&lit| !lit));
    // Memory is back to power-on contents, so the next fetch finds no
    // program and faults.
    assert!(chip8.step().is_err());
}

#[test]
fn config_sizes_the_machine() {
    let mut chip8 = Chip8::with_config(Config {
        display_width: 128,
        display_height: 64,
        memory_size: 2048,
        ..Config::default()
    });
    assert_eq!(chip8.display_size(), (128, 64));
    let image = vec![0; 4096];
    assert_eq!(chip8.load_rom(&image), 2048 - 0x200);
}

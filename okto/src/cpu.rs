//! The interpreter's central processing unit.
//!
//! [`Cpu::cycle`] runs one fetch, decode, execute round against a [`Bus`].
//! The program counter is advanced past the fetched opcode *before* the
//! opcode executes, so control-flow instructions see the address of the next
//! instruction: `2NNN` pushes it as the return address, and skips add another
//! two bytes on top of it.
//!
//! Anything a program can do wrong surfaces as an [`Error`] from `cycle`:
//! unknown opcodes, stack misuse, and reads or writes outside memory. The
//! caller decides whether that halts the machine.
//!
//! Flag convention: instructions that write both a result register and `VF`
//! write `VF` last, so the flag survives when `VF` is itself the destination.

use crate::error::Error;
use crate::opcode::Opcode;
use crate::{Bus, Config};

/// The register file, timers, and control state of the interpreter.
pub struct Cpu {
    /// The sixteen general purpose `Vx` registers. `VF` doubles as the
    /// carry, borrow, and sprite collision flag.
    pub v: [u8; 16],

    /// The address register `I`.
    pub i: u16,

    /// The program counter.
    pub pc: u16,

    /// Return addresses of the active subroutine calls, innermost last.
    pub stack: Vec<u16>,

    /// Counts down to zero at the timer rate.
    pub delay_timer: u8,

    /// Counts down like the delay timer; the host plays a tone while it is
    /// nonzero.
    pub sound_timer: u8,

    /// Set whenever an instruction changes the framebuffer.
    pub display_updated: bool,

    /// Set when the sound timer ticks down to zero.
    pub sound_expired: bool,

    /// Destination register of an `FX0A` currently parked on key input.
    waiting_on_key: Option<usize>,

    stack_depth: usize,
    load_vy_shift: bool,
}

impl Cpu {
    /// Create a processor with the program counter at the configured start
    /// address and everything else zeroed.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            v: [0; 16],
            i: 0,
            pc: config.initial_pc,
            stack: Vec::with_capacity(config.stack_depth),
            delay_timer: 0,
            sound_timer: 0,
            display_updated: false,
            sound_expired: false,
            waiting_on_key: None,
            stack_depth: config.stack_depth,
            load_vy_shift: config.load_vy_shift,
        }
    }

    /// Execute one processor cycle.
    ///
    /// While parked on an `FX0A` this checks the keypad instead of fetching;
    /// if a press has arrived it is delivered to the waiting register and the
    /// same cycle carries on with a normal fetch, otherwise nothing happens.
    pub fn cycle(&mut self, bus: &mut Bus) -> Result<(), Error> {
        if let Some(register) = self.waiting_on_key {
            match bus.poll_key_wait() {
                Some(key) => {
                    self.v[register] = key;
                    self.waiting_on_key = None;
                }
                None => return Ok(()),
            }
        }

        let at = self.pc;
        let hi = bus.read_byte(at)?;
        let lo = bus.read_byte(at.wrapping_add(1))?;
        let opcode = Opcode::from_bytes(hi, lo);
        self.pc = at.wrapping_add(2);

        log::trace!("{at:#06X}: {opcode}");
        self.execute(opcode, at, bus)
    }

    /// Advance the timers by `periods` timer ticks.
    ///
    /// The sound edge flag is raised only when the sound timer reaches zero
    /// by counting down, not when a program writes zero to it.
    pub fn update_timers(&mut self, periods: u32) {
        if periods == 0 {
            return;
        }
        let steps = periods.min(u32::from(u8::MAX)) as u8;
        self.delay_timer = self.delay_timer.saturating_sub(steps);
        if self.sound_timer > 0 {
            self.sound_timer = self.sound_timer.saturating_sub(steps);
            if self.sound_timer == 0 {
                self.sound_expired = true;
            }
        }
    }

    /// Decode `opcode` and apply it. `at` is the address the opcode was
    /// fetched from, used to report where a fault happened.
    fn execute(&mut self, opcode: Opcode, at: u16, bus: &mut Bus) -> Result<(), Error> {
        let x = opcode.x();
        let y = opcode.y();
        let n = opcode.n();
        let nn = opcode.nn();
        let nnn = opcode.nnn();

        let unknown = || Error::UnknownOpcode {
            opcode: opcode.word(),
            pc: at,
        };

        match opcode.family() {
            // 0NNN machine-code calls are not supported, so everything in
            // this family except the two named instructions is a fault.
            0x0 => match opcode.word() {
                // 00E0
                0x00E0 => self.op_00e0(bus),

                // 00EE
                0x00EE => self.op_00ee(at),

                _ => Err(unknown()),
            },

            // 1NNN
            0x1 => self.op_1nnn(nnn),

            // 2NNN
            0x2 => self.op_2nnn(nnn, at),

            // 3XNN
            0x3 => self.op_3xnn(x, nn),

            // 4XNN
            0x4 => self.op_4xnn(x, nn),

            // 5XY0
            0x5 if n == 0 => self.op_5xy0(x, y),

            // 6XNN
            0x6 => self.op_6xnn(x, nn),

            // 7XNN
            0x7 => self.op_7xnn(x, nn),

            0x8 => match n {
                // 8XY0
                0x0 => self.op_8xy0(x, y),

                // 8XY1
                0x1 => self.op_8xy1(x, y),

                // 8XY2
                0x2 => self.op_8xy2(x, y),

                // 8XY3
                0x3 => self.op_8xy3(x, y),

                // 8XY4
                0x4 => self.op_8xy4(x, y),

                // 8XY5
                0x5 => self.op_8xy5(x, y),

                // 8XY6
                0x6 => self.op_8xy6(x, y),

                // 8XY7
                0x7 => self.op_8xy7(x, y),

                // 8XYE
                0xE => self.op_8xye(x, y),

                _ => Err(unknown()),
            },

            // 9XY0
            0x9 if n == 0 => self.op_9xy0(x, y),

            // ANNN
            0xA => self.op_annn(nnn),

            // BNNN
            0xB => self.op_bnnn(nnn),

            // CXNN
            0xC => self.op_cxnn(x, nn),

            // DXYN
            0xD => self.op_dxyn(bus, x, y, n),

            0xE => match nn {
                // EX9E
                0x9E => self.op_ex9e(bus, x),

                // EXA1
                0xA1 => self.op_exa1(bus, x),

                _ => Err(unknown()),
            },

            0xF => match nn {
                // FX07
                0x07 => self.op_fx07(x),

                // FX0A
                0x0A => self.op_fx0a(bus, x),

                // FX15
                0x15 => self.op_fx15(x),

                // FX18
                0x18 => self.op_fx18(x),

                // FX1E
                0x1E => self.op_fx1e(x),

                // FX29
                0x29 => self.op_fx29(x),

                // FX33
                0x33 => self.op_fx33(bus, x),

                // FX55
                0x55 => self.op_fx55(bus, x),

                // FX65
                0x65 => self.op_fx65(bus, x),

                _ => Err(unknown()),
            },

            // Guard fall-throughs (5XYN and 9XYN with a nonzero low nibble)
            // land here along with anything else undecodable.
            _ => Err(unknown()),
        }
    }

    /// Skip the instruction the program counter currently points at.
    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// 00E0: clear the display.
    fn op_00e0(&mut self, bus: &mut Bus) -> Result<(), Error> {
        bus.clear_display();
        self.display_updated = true;
        Ok(())
    }

    /// 00EE: return from a subroutine.
    fn op_00ee(&mut self, at: u16) -> Result<(), Error> {
        self.pc = self.stack.pop().ok_or(Error::StackUnderflow { pc: at })?;
        Ok(())
    }

    /// 1NNN: jump.
    fn op_1nnn(&mut self, nnn: u16) -> Result<(), Error> {
        self.pc = nnn;
        Ok(())
    }

    /// 2NNN: call a subroutine, pushing the address of the next instruction.
    fn op_2nnn(&mut self, nnn: u16, at: u16) -> Result<(), Error> {
        if self.stack.len() == self.stack_depth {
            return Err(Error::StackOverflow { pc: at });
        }
        self.stack.push(self.pc);
        self.pc = nnn;
        Ok(())
    }

    /// 3XNN: skip if VX equals NN.
    fn op_3xnn(&mut self, x: usize, nn: u8) -> Result<(), Error> {
        if self.v[x] == nn {
            self.skip();
        }
        Ok(())
    }

    /// 4XNN: skip if VX differs from NN.
    fn op_4xnn(&mut self, x: usize, nn: u8) -> Result<(), Error> {
        if self.v[x] != nn {
            self.skip();
        }
        Ok(())
    }

    /// 5XY0: skip if VX equals VY.
    fn op_5xy0(&mut self, x: usize, y: usize) -> Result<(), Error> {
        if self.v[x] == self.v[y] {
            self.skip();
        }
        Ok(())
    }

    /// 6XNN: load NN into VX.
    fn op_6xnn(&mut self, x: usize, nn: u8) -> Result<(), Error> {
        self.v[x] = nn;
        Ok(())
    }

    /// 7XNN: add NN to VX, wrapping, without touching VF.
    fn op_7xnn(&mut self, x: usize, nn: u8) -> Result<(), Error> {
        self.v[x] = self.v[x].wrapping_add(nn);
        Ok(())
    }

    /// 8XY0: copy VY into VX.
    fn op_8xy0(&mut self, x: usize, y: usize) -> Result<(), Error> {
        self.v[x] = self.v[y];
        Ok(())
    }

    /// 8XY1: VX |= VY. VF is left alone.
    fn op_8xy1(&mut self, x: usize, y: usize) -> Result<(), Error> {
        self.v[x] |= self.v[y];
        Ok(())
    }

    /// 8XY2: VX &= VY. VF is left alone.
    fn op_8xy2(&mut self, x: usize, y: usize) -> Result<(), Error> {
        self.v[x] &= self.v[y];
        Ok(())
    }

    /// 8XY3: VX ^= VY. VF is left alone.
    fn op_8xy3(&mut self, x: usize, y: usize) -> Result<(), Error> {
        self.v[x] ^= self.v[y];
        Ok(())
    }

    /// 8XY4: VX += VY, VF = carry out.
    fn op_8xy4(&mut self, x: usize, y: usize) -> Result<(), Error> {
        let (result, carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[x] = result;
        self.v[0xF] = u8::from(carry);
        Ok(())
    }

    /// 8XY5: VX -= VY, VF = 1 when no borrow was needed.
    fn op_8xy5(&mut self, x: usize, y: usize) -> Result<(), Error> {
        let (result, borrow) = self.v[x].overflowing_sub(self.v[y]);
        self.v[x] = result;
        self.v[0xF] = u8::from(!borrow);
        Ok(())
    }

    /// 8XY6: shift VX right one bit, VF = the bit shifted out. With the
    /// load quirk enabled, VY is copied into VX first.
    fn op_8xy6(&mut self, x: usize, y: usize) -> Result<(), Error> {
        if self.load_vy_shift {
            self.v[x] = self.v[y];
        }
        let low_bit = self.v[x] & 1;
        self.v[x] >>= 1;
        self.v[0xF] = low_bit;
        Ok(())
    }

    /// 8XY7: VX = VY - VX, VF = 1 when no borrow was needed.
    fn op_8xy7(&mut self, x: usize, y: usize) -> Result<(), Error> {
        let (result, borrow) = self.v[y].overflowing_sub(self.v[x]);
        self.v[x] = result;
        self.v[0xF] = u8::from(!borrow);
        Ok(())
    }

    /// 8XYE: shift VX left one bit, VF = the bit shifted out. With the
    /// load quirk enabled, VY is copied into VX first.
    fn op_8xye(&mut self, x: usize, y: usize) -> Result<(), Error> {
        if self.load_vy_shift {
            self.v[x] = self.v[y];
        }
        let high_bit = self.v[x] >> 7;
        self.v[x] <<= 1;
        self.v[0xF] = high_bit;
        Ok(())
    }

    /// 9XY0: skip if VX differs from VY.
    fn op_9xy0(&mut self, x: usize, y: usize) -> Result<(), Error> {
        if self.v[x] != self.v[y] {
            self.skip();
        }
        Ok(())
    }

    /// ANNN: load NNN into I.
    fn op_annn(&mut self, nnn: u16) -> Result<(), Error> {
        self.i = nnn;
        Ok(())
    }

    /// BNNN: jump to NNN plus V0.
    fn op_bnnn(&mut self, nnn: u16) -> Result<(), Error> {
        self.pc = nnn.wrapping_add(u16::from(self.v[0]));
        Ok(())
    }

    /// CXNN: load a random byte masked by NN into VX.
    fn op_cxnn(&mut self, x: usize, nn: u8) -> Result<(), Error> {
        self.v[x] = rand::random::<u8>() & nn;
        Ok(())
    }

    /// DXYN: XOR the N-byte sprite at I onto the display at (VX, VY),
    /// VF = 1 when any lit pixel was switched off.
    ///
    /// Coordinates wrap around the display edges per pixel. Sprite bytes are
    /// read through the bus, so a sprite reaching past the end of memory
    /// faults.
    fn op_dxyn(&mut self, bus: &mut Bus, x: usize, y: usize, n: u8) -> Result<(), Error> {
        let origin_x = usize::from(self.v[x]);
        let origin_y = usize::from(self.v[y]);

        let mut collision = false;
        for row in 0..usize::from(n) {
            let bits = bus.read_byte(self.i.wrapping_add(row as u16))?;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let lit = bus.read_pixel(origin_x + col, origin_y + row);
                collision |= lit;
                bus.write_pixel(origin_x + col, origin_y + row, !lit);
            }
        }
        self.v[0xF] = u8::from(collision);
        self.display_updated = true;
        Ok(())
    }

    /// EX9E: skip if the key named by VX is held.
    fn op_ex9e(&mut self, bus: &mut Bus, x: usize) -> Result<(), Error> {
        if bus.key_pressed(self.v[x]) {
            self.skip();
        }
        Ok(())
    }

    /// EXA1: skip if the key named by VX is not held.
    fn op_exa1(&mut self, bus: &mut Bus, x: usize) -> Result<(), Error> {
        if !bus.key_pressed(self.v[x]) {
            self.skip();
        }
        Ok(())
    }

    /// FX07: read the delay timer into VX.
    fn op_fx07(&mut self, x: usize) -> Result<(), Error> {
        self.v[x] = self.delay_timer;
        Ok(())
    }

    /// FX0A: park until the next key press, which lands in VX.
    ///
    /// Only a press arriving after this instruction counts; a key already
    /// held does not satisfy the wait.
    fn op_fx0a(&mut self, bus: &mut Bus, x: usize) -> Result<(), Error> {
        self.waiting_on_key = Some(x);
        bus.begin_key_wait();
        Ok(())
    }

    /// FX15: load VX into the delay timer.
    fn op_fx15(&mut self, x: usize) -> Result<(), Error> {
        self.delay_timer = self.v[x];
        Ok(())
    }

    /// FX18: load VX into the sound timer.
    fn op_fx18(&mut self, x: usize) -> Result<(), Error> {
        self.sound_timer = self.v[x];
        Ok(())
    }

    /// FX1E: add VX to I, wrapping, without touching VF.
    fn op_fx1e(&mut self, x: usize) -> Result<(), Error> {
        self.i = self.i.wrapping_add(u16::from(self.v[x]));
        Ok(())
    }

    /// FX29: point I at the built-in glyph for the digit in VX.
    fn op_fx29(&mut self, x: usize) -> Result<(), Error> {
        self.i = u16::from(self.v[x]) * 5;
        Ok(())
    }

    /// FX33: store VX as three decimal digits at I, I+1, I+2.
    fn op_fx33(&mut self, bus: &mut Bus, x: usize) -> Result<(), Error> {
        bus.write_byte(self.i, self.v[x] / 100)?;
        bus.write_byte(self.i.wrapping_add(1), self.v[x] / 10 % 10)?;
        bus.write_byte(self.i.wrapping_add(2), self.v[x] % 10)?;
        Ok(())
    }

    /// FX55: store V0 through VX at I, then advance I past the block.
    fn op_fx55(&mut self, bus: &mut Bus, x: usize) -> Result<(), Error> {
        for offset in 0..=x {
            bus.write_byte(self.i.wrapping_add(offset as u16), self.v[offset])?;
        }
        self.i = self.i.wrapping_add(x as u16 + 1);
        Ok(())
    }

    /// FX65: load V0 through VX from I, then advance I past the block.
    fn op_fx65(&mut self, bus: &mut Bus, x: usize) -> Result<(), Error> {
        for offset in 0..=x {
            self.v[offset] = bus.read_byte(self.i.wrapping_add(offset as u16))?;
        }
        self.i = self.i.wrapping_add(x as u16 + 1);
        Ok(())
    }
}

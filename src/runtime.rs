use log::{debug, trace};

use crate::console::Console;
use crate::error::RunError;
use crate::instruction::{Instruction, Operand};
use crate::memory::Memory;
use crate::registers::{Register, Registers};
use crate::trap::TrapVector;

/// Address of the first instruction of every program.
pub const ORIGIN: u16 = 0x3000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// Constructed, not yet run.
    Ready,
    Running,
    /// Stopped by `HALT` or a fatal error. Terminal.
    Halted,
}

/// Represents complete program state during runtime.
///
/// Memory and console are injected, so tests can substitute in-memory fakes.
pub struct Machine<M, C> {
    mem: M,
    console: C,
    regs: Registers,
    status: Status,
}

impl<M, C> Machine<M, C>
where
    M: Memory,
    C: Console,
{
    /// Memory is expected to already hold the program at [`ORIGIN`].
    pub fn new(memory: M, console: C) -> Self {
        Self {
            mem: memory,
            console,
            regs: Registers::new(),
            status: Status::Ready,
        }
    }

    /// Run from [`ORIGIN`] until `HALT` or a fatal error.
    ///
    /// A fatal error has already been reported to the console's error stream when it is returned.
    pub fn run(&mut self) -> Result<(), RunError> {
        self.regs.set_pc(ORIGIN);
        debug!("Running from 0x{ORIGIN:04x}");
        self.resume()
    }

    /// Run from the current program counter until `HALT` or a fatal error.
    pub fn resume(&mut self) -> Result<(), RunError> {
        if self.status == Status::Ready {
            self.status = Status::Running;
        }
        while self.status == Status::Running {
            self.step()?;
        }
        Ok(())
    }

    /// Execute a single instruction. A halted machine does nothing.
    pub fn step(&mut self) -> Result<(), RunError> {
        if self.status == Status::Halted {
            return Ok(());
        }
        let result = self.cycle();
        if let Err(err) = &result {
            self.abort(err);
        }
        result
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn memory(&self) -> &M {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.mem
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    pub fn into_parts(self) -> (M, C, Registers) {
        (self.mem, self.console, self.regs)
    }

    fn cycle(&mut self) -> Result<(), RunError> {
        let addr = self.regs.pc();
        let instr = self.load(addr)?;
        // PC incremented before instruction is performed
        self.regs.set_pc(addr.wrapping_add(1));

        let instruction =
            Instruction::decode(instr).ok_or(RunError::UnknownOpcode { addr, instr })?;
        trace!("0x{addr:04x}: 0x{instr:04x}  {instruction}");
        let cond = self.regs.cond();
        self.execute(addr, instr, instruction)?;
        debug_assert!(instruction.sets_flags() || self.regs.cond() == cond);
        Ok(())
    }

    /// Report once on the diagnostic stream, then stop.
    fn abort(&mut self, err: &RunError) {
        debug!("Aborting: {err}");
        self.console.error_output_chars(&format!("Error: {err}\n"));
        self.status = Status::Halted;
    }

    fn execute(&mut self, addr: u16, instr: u16, instruction: Instruction) -> Result<(), RunError> {
        match instruction {
            Instruction::Add {
                dest_r,
                src_r,
                operand,
            } => {
                let res = self.regs.get(src_r).wrapping_add(self.operand(operand));
                self.regs.set_with_flags(dest_r, res);
            }
            Instruction::And {
                dest_r,
                src_r,
                operand,
            } => {
                let res = self.regs.get(src_r) & self.operand(operand);
                self.regs.set_with_flags(dest_r, res);
            }
            Instruction::Not { dest_r, src_r } => {
                let res = !self.regs.get(src_r);
                self.regs.set_with_flags(dest_r, res);
            }
            Instruction::Ld { dest_r, pc_offset9 } => {
                let val = self.load(self.pc_relative(pc_offset9))?;
                self.regs.set_with_flags(dest_r, val);
            }
            Instruction::Ldi { dest_r, pc_offset9 } => {
                let ptr = self.load(self.pc_relative(pc_offset9))?;
                let val = self.load(ptr)?;
                self.regs.set_with_flags(dest_r, val);
            }
            Instruction::Ldr {
                dest_r,
                base_r,
                offset6,
            } => {
                let val = self.load(self.regs.get(base_r).wrapping_add(offset6))?;
                self.regs.set_with_flags(dest_r, val);
            }
            Instruction::Lea { dest_r, pc_offset9 } => {
                // Flags reflect the address itself
                let val = self.pc_relative(pc_offset9);
                self.regs.set_with_flags(dest_r, val);
            }
            Instruction::St { src_r, pc_offset9 } => {
                self.store(self.pc_relative(pc_offset9), self.regs.get(src_r))?;
            }
            Instruction::Sti { src_r, pc_offset9 } => {
                let ptr = self.load(self.pc_relative(pc_offset9))?;
                self.store(ptr, self.regs.get(src_r))?;
            }
            Instruction::Str {
                src_r,
                base_r,
                offset6,
            } => {
                let ptr = self.regs.get(base_r).wrapping_add(offset6);
                self.store(ptr, self.regs.get(src_r))?;
            }
            Instruction::Br { mask, pc_offset9 } => {
                if mask & self.regs.cond().bits() != 0 {
                    self.regs.set_pc(self.pc_relative(pc_offset9));
                }
            }
            Instruction::Jmp { base_r } => {
                self.regs.set_pc(self.regs.get(base_r));
            }
            Instruction::Jsr { pc_offset11 } => {
                let target = self.pc_relative(pc_offset11);
                self.regs.set(Register::R7, self.regs.pc());
                self.regs.set_pc(target);
            }
            Instruction::Jsrr { base_r } => {
                // Read before linking, for `JSRR R7`
                let target = self.regs.get(base_r);
                self.regs.set(Register::R7, self.regs.pc());
                self.regs.set_pc(target);
            }
            Instruction::Trap { vector } => self.trap(addr, vector)?,
            Instruction::Reserved { opcode } => {
                return Err(RunError::ReservedOpcode {
                    addr,
                    instr,
                    opcode,
                });
            }
        }
        Ok(())
    }

    fn trap(&mut self, addr: u16, vector: u8) -> Result<(), RunError> {
        let trap = TrapVector::try_from(vector)
            .map_err(|vector| RunError::UnknownTrap { addr, vector })?;
        debug!("Trap {trap} at 0x{addr:04x}");

        match trap {
            TrapVector::Getc => {
                let ch = self.console.input_char();
                self.regs.set(Register::R0, ch as u16);
            }
            TrapVector::Out => {
                let ch = (self.regs.get(Register::R0) & 0xFF) as u8;
                self.console.output_char(ch);
                self.console.flush();
            }
            TrapVector::Puts => {
                for ptr in self.string_addresses() {
                    let word = self.load(ptr)?;
                    if word == 0 {
                        break;
                    }
                    self.console.output_char((word & 0xFF) as u8);
                }
                self.console.flush();
            }
            TrapVector::In => {
                // Prompt must be visible before blocking
                self.console.output_chars("> ");
                self.console.flush();
                let ch = self.console.input_char();
                self.regs.set(Register::R0, ch as u16);
                self.console.output_char(ch);
                self.console.flush();
            }
            TrapVector::Putsp => {
                for ptr in self.string_addresses() {
                    let word = self.load(ptr)?;
                    let first = (word & 0xFF) as u8;
                    if first == 0 {
                        break;
                    }
                    self.console.output_char(first);
                    let second = (word >> 8) as u8;
                    if second != 0 {
                        self.console.output_char(second);
                    }
                }
                self.console.flush();
            }
            TrapVector::Halt => {
                self.console.output_chars("Stopped.\n");
                self.console.flush();
                self.status = Status::Halted;
                debug!("Halted at 0x{addr:04x}");
            }
        }
        Ok(())
    }

    /// Addresses of a string starting at R0, covering memory at most once.
    fn string_addresses(&self) -> impl Iterator<Item = u16> {
        let start = self.regs.get(Register::R0);
        (0..self.mem.size()).map(move |i| start.wrapping_add(i as u16))
    }

    #[inline]
    fn operand(&self, operand: Operand) -> u16 {
        match operand {
            Operand::Reg(reg) => self.regs.get(reg),
            Operand::Imm(val) => val,
        }
    }

    /// Offset from the already incremented program counter.
    #[inline]
    fn pc_relative(&self, offset: u16) -> u16 {
        self.regs.pc().wrapping_add(offset)
    }

    fn check_address(&self, address: u16) -> Result<(), RunError> {
        let size = self.mem.size();
        if address as usize >= size {
            return Err(RunError::AddressOutOfBounds { address, size });
        }
        Ok(())
    }

    #[inline]
    fn load(&self, address: u16) -> Result<u16, RunError> {
        self.check_address(address)?;
        Ok(self.mem.read(address))
    }

    #[inline]
    fn store(&mut self, address: u16, val: u16) -> Result<(), RunError> {
        self.check_address(address)?;
        self.mem.write(address, val);
        Ok(())
    }
}

// Machine
mod runtime;
pub use runtime::{Machine, Status, ORIGIN};
mod registers;
pub use registers::{Flag, Register, Registers};
mod instruction;
pub use instruction::{sign_extend, Instruction, Opcode, Operand};
mod trap;
pub use trap::TrapVector;

// Collaborators
mod memory;
pub use memory::{Memory, Ram, MEMORY_SIZE};
mod console;
pub use console::{BufferConsole, Console, Terminal};
mod image;
pub use image::Image;

mod error;
pub use error::{ImageError, RunError};

pub mod output;

pub mod env;

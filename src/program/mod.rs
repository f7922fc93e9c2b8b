pub mod instruction;
pub mod loader;

pub use instruction::{decode, Instruction, InstructionKind, ParseError};
pub use loader::{load_program, CreationSchedule, LoadError, ProgramImage};

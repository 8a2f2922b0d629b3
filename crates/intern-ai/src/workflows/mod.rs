pub mod allocation;
pub mod roster;

pub mod bitflags;
pub mod errorfmt;
pub mod numcell;

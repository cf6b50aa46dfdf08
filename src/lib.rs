#![allow(
    clippy::len_zero,
    clippy::needless_lifetimes,
    clippy::enum_variant_names
)]

#[macro_use]
mod macros;
pub mod chipset;
pub mod config;
pub mod detect;
pub mod device;
pub mod edid;
#[cfg(test)]
mod fakes;
pub mod i2c;
pub mod logger;
pub mod mode;
pub mod output;
pub mod panel_chip;
pub mod panel_table;
pub mod ports;
pub mod power;
pub mod registry;
pub mod regs;
pub mod strapping;
pub mod utils;

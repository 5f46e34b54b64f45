//! Attest CLI support: built-in controls and report rendering

pub mod controls;
pub mod output;

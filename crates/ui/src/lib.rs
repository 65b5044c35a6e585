#![forbid(unsafe_code)]

pub mod views;
pub mod vm;

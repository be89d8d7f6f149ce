// Purpose - external interfaces, format conversions

pub mod controls;
pub mod converter;
pub mod midi;

pub mod controls;
pub mod picker;
pub mod shortcuts;

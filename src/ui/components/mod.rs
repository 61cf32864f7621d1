pub mod date_input;
pub mod nav_bar;
pub mod toast;

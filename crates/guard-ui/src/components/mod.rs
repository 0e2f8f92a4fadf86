pub mod countdown_bar;
pub mod header;

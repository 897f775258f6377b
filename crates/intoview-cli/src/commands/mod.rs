pub mod ease;
pub mod scroll;

pub mod meters;
pub mod poll;

pub mod policy;
pub mod window;

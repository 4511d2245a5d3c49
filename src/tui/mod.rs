pub mod app;
pub mod input;
pub mod render;
#[cfg(test)]
pub mod test_helpers;
pub mod theme;

pub use app::run;

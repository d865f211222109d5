//! Interactive terminal console: login picker, role-gated screens and the
//! assistant panel.

mod app;
mod form;
mod view;

pub use app::{run, LaunchOptions};

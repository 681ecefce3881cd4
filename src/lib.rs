// jarvis_satellite - LED controller for a Wyoming voice satellite
// Event dispatch table, XVF3800 LED control and the per-client session loop

pub mod dispatch;
pub mod server;
pub mod session;
pub mod xvf;

pub use dispatch::{plan, run_steps, Step};
pub use server::Config;
pub use session::Session;
pub use xvf::{DeviceCommand, LedEffect, SubprocessErrors, Xvf, XvfCommand, XvfError};

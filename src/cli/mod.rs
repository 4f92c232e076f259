pub mod personas;
pub mod run;
pub mod runtime;

pub use personas::cmd_personas;
pub use run::{cmd_run, RunArgs};
pub use runtime::init_logging;

//! Pipeline stages and run triggers.
//!
//! - `run_pipeline`: one fetch → detect → extract → render → publish pass
//! - `trigger` / `run_scheduled`: interval-driven runs, one at a time

pub mod detect;
pub mod guard;
pub mod publish;
pub mod run;
pub mod schedule;

pub use detect::{ChangeDetector, Detection, checksum};
pub use guard::{RunGuard, RunPermit};
pub use publish::Publisher;
pub use run::{PipelineContext, run_and_report, run_pipeline};
pub use schedule::{run_scheduled, trigger};

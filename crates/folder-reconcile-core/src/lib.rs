pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod hasher;
pub mod index;
pub mod model;
pub mod platform;
pub mod progress;
pub mod rename;
pub mod scanner;
pub mod session;
pub mod view;

pub use config::AppConfig;
pub use engine::{EngineOptions, ReconciliationEngine};
pub use error::Error;
pub use executor::{ExecutionOutcome, ExecutionReport};
pub use hasher::HashProvider;
pub use model::{ClassificationRow, Disposition, PlanKind, ReconciliationPlan};
pub use progress::{NullSink, ProgressReporter, ResultSink, SilentReporter};
pub use session::Session;
pub use view::{ResultView, SortColumn, SortDirection};

use crate::config::AppConfig;
use crate::engine::{EngineOptions, ReconciliationEngine};
use crate::error::Error;
use crate::executor::{self, ExecutionOutcome};
use crate::hasher;
use crate::model::{PlanKind, ReconciliationPlan};
use crate::progress::{ProgressReporter, ResultSink};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One reconciliation session: the selected roots and the current plan.
///
/// The plan is only valid for the roots and filesystem state it was built
/// from. Changing a root or executing a batch discards it; call
/// [`Session::prepare`] again to get a fresh one.
pub struct Session {
    engine: ReconciliationEngine,
    preserve_root: Option<PathBuf>,
    cleanup_root: Option<PathBuf>,
    plan: Option<ReconciliationPlan>,
}

impl Session {
    pub fn new(engine: ReconciliationEngine) -> Self {
        Self {
            engine,
            preserve_root: None,
            cleanup_root: None,
            plan: None,
        }
    }

    /// Uses the process-wide hash backend and the configured roots.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let backend = hasher::select_backend(&config.hash)?;
        let engine = ReconciliationEngine::new(backend).with_options(EngineOptions::from(config));
        let mut session = Session::new(engine);
        session.preserve_root = config.preserve_root.clone();
        session.cleanup_root = config.cleanup_root.clone();
        Ok(session)
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn preserve_root(&self) -> Option<&Path> {
        self.preserve_root.as_deref()
    }

    pub fn cleanup_root(&self) -> Option<&Path> {
        self.cleanup_root.as_deref()
    }

    pub fn set_preserve_root(&mut self, root: impl Into<PathBuf>) {
        self.preserve_root = Some(root.into());
        self.invalidate();
    }

    pub fn set_cleanup_root(&mut self, root: impl Into<PathBuf>) {
        self.cleanup_root = Some(root.into());
        self.invalidate();
    }

    pub fn plan(&self) -> Option<&ReconciliationPlan> {
        self.plan.as_ref()
    }

    fn invalidate(&mut self) {
        if self.plan.take().is_some() {
            debug!("Reconciliation plan invalidated");
        }
    }

    /// Discards any previous plan and builds a new one from scratch.
    pub fn prepare(
        &mut self,
        reporter: &dyn ProgressReporter,
        sink: &mut dyn ResultSink,
    ) -> Result<&ReconciliationPlan, Error> {
        self.invalidate();
        let plan = self.engine.prepare(
            self.preserve_root.as_deref(),
            self.cleanup_root.as_deref(),
            reporter,
            sink,
        )?;
        Ok(self.plan.insert(plan))
    }

    /// Runs one plan category. A batch that touched the filesystem
    /// invalidates the plan; an empty category leaves it in place.
    pub fn execute(
        &mut self,
        kind: PlanKind,
        reporter: &dyn ProgressReporter,
    ) -> Result<ExecutionOutcome, Error> {
        let plan = self.plan.as_ref().ok_or(Error::NoPlan)?;
        let outcome = match kind {
            PlanKind::Deletions => executor::execute_deletions(&plan.deletions, reporter),
            PlanKind::RenameMoves => executor::execute_moves(kind, &plan.rename_moves, reporter),
            PlanKind::NewMoves => executor::execute_moves(kind, &plan.new_moves, reporter),
        };
        if let ExecutionOutcome::Completed(_) = outcome {
            self.invalidate();
        }
        Ok(outcome)
    }

    pub fn execute_deletions(
        &mut self,
        reporter: &dyn ProgressReporter,
    ) -> Result<ExecutionOutcome, Error> {
        self.execute(PlanKind::Deletions, reporter)
    }

    pub fn execute_rename_moves(
        &mut self,
        reporter: &dyn ProgressReporter,
    ) -> Result<ExecutionOutcome, Error> {
        self.execute(PlanKind::RenameMoves, reporter)
    }

    pub fn execute_new_moves(
        &mut self,
        reporter: &dyn ProgressReporter,
    ) -> Result<ExecutionOutcome, Error> {
        self.execute(PlanKind::NewMoves, reporter)
    }
}

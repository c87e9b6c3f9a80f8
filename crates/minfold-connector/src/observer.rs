/// Planning decisions worth surfacing for diagnosis (spec §9 "Global
/// logging"). The planner both `tracing::debug!`s these and forwards them to
/// an optional observer, so tests can assert on planning behaviour without
/// parsing log output. The observer's absence must never change planning
/// semantics — it is a pure side channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningEvent {
    PhaseEntered { phase: &'static str },
    PhaseSkipped { phase: &'static str },
    ColumnClassified { table: String, column: String, rebuild: bool },
    ReorderTriggered { table: String },
}

/// Injected observer callback (spec §4.1 PlanningObserver / §9).
pub trait PlanningObserver: Send + Sync {
    fn on_event(&self, event: PlanningEvent);
}

/// The default no-op observer, used whenever a caller doesn't need one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl PlanningObserver for NullObserver {
    fn on_event(&self, _event: PlanningEvent) {}
}

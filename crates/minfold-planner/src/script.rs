use minfold_connector::{PlanningEvent, PlanningObserver};

/// Accumulates the numbered phases of an up or down script (spec §4.5): each
/// phase is a labelled, optional block, and the final script is the
/// concatenation of the non-empty ones. Empty phases are skipped entirely —
/// no banner comment is emitted for a phase with nothing to do.
pub struct ScriptBuilder<'a> {
    phases: Vec<(&'static str, String)>,
    observer: &'a dyn PlanningObserver,
}

impl<'a> ScriptBuilder<'a> {
    pub fn new(observer: &'a dyn PlanningObserver) -> Self {
        ScriptBuilder { phases: Vec::new(), observer }
    }

    pub fn phase(&mut self, label: &'static str, body: String) {
        if !body.trim().is_empty() {
            tracing::debug!(phase = label, "phase emitted");
            self.phases.push((label, body));
        } else {
            tracing::debug!(phase = label, "phase skipped (empty)");
            self.observer.on_event(PlanningEvent::PhaseSkipped { phase: label });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn build(self) -> String {
        let mut out = String::from("-- Generated using Minfold, do not edit manually\nSET XACT_ABORT ON;\n");
        for (label, body) in self.phases {
            out.push_str("\n-- =============================================\n");
            out.push_str("-- Phase ");
            out.push_str(label);
            out.push_str("\n-- =============================================\n");
            out.push_str(&body);
            if !body.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

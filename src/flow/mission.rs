//! Mission submission stage (the aircraft): file a flight plan and request
//! takeoff clearance from the control tower.

use crate::error::FlowError;
use crate::flow::model::FlightPlan;

/// Local state of the Mission stage.
#[derive(Debug)]
pub struct MissionStage {
    /// Set while the control-tower analysis is outstanding. The submit
    /// action is not re-entrant.
    analyzing: bool,
}

impl MissionStage {
    pub fn new() -> Self {
        Self { analyzing: false }
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    /// Validate the flight plan and enter the analyzing sub-state.
    ///
    /// Title and context are required; constraints are optional. Returns
    /// the trimmed plan to hand to the generation gateway.
    pub fn submit(&mut self, plan: FlightPlan) -> Result<FlightPlan, FlowError> {
        if self.analyzing {
            return Err(FlowError::Busy {
                action: "analyze_mission",
            });
        }
        let title = plan.title.trim();
        if title.is_empty() {
            return Err(FlowError::MissingField { field: "title" });
        }
        let context = plan.context.trim();
        if context.is_empty() {
            return Err(FlowError::MissingField { field: "context" });
        }
        self.analyzing = true;
        Ok(FlightPlan {
            title: title.to_string(),
            context: context.to_string(),
            constraints: plan.constraints.trim().to_string(),
        })
    }
}

impl Default for MissionStage {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashMap;

use serde::Deserialize;

// Shape returned by the ExPlat assignments endpoint:
// { "variations": { "<experiment>": "<variation>" | null }, "ttl": 60 }
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExperimentAssignment {
    #[serde(default)]
    pub variations: HashMap<String, Option<String>>,

    /// Seconds the assignment may be reused for.
    #[serde(default)]
    pub ttl: u64,
}

impl ExperimentAssignment {
    /// The assigned variation, `None` for the control group or an unknown experiment.
    pub fn variation(&self, experiment_name: &str) -> Option<&str> {
        self.variations.get(experiment_name)?.as_deref()
    }

    pub fn is_control(&self, experiment_name: &str) -> bool {
        self.variation(experiment_name).is_none()
    }
}

use serde::{Deserialize, Serialize};

/// What to do when the host refuses a transition the gateway status calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefusalPolicy {
    /// Return `ProcessorError::TransitionRefused`.
    #[default]
    Propagate,
    /// Log and report the operation as unsuccessful.
    Suppress,
}

/// Settings for one processor instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Registry name; transactions reference their processor by it.
    pub name: String,
    /// Store reusable credentials for future charges.
    #[serde(default)]
    pub recurring: bool,
    /// Applied on both the charge and polling paths.
    #[serde(default)]
    pub on_transition_refused: RefusalPolicy,
}

impl ProcessorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recurring: false,
            on_transition_refused: RefusalPolicy::default(),
        }
    }

    pub fn recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    pub fn on_transition_refused(mut self, policy: RefusalPolicy) -> Self {
        self.on_transition_refused = policy;
        self
    }
}

//! The four manual provisioning steps.

use serde::{Deserialize, Serialize};

/// One corrective step; serialized as its number 1-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProvisioningStep {
    RegisterAdapter,
    SetDefaultBridge,
    ConfigureProtocol,
    Verify,
}

impl ProvisioningStep {
    pub const ALL: [ProvisioningStep; 4] = [
        Self::RegisterAdapter,
        Self::SetDefaultBridge,
        Self::ConfigureProtocol,
        Self::Verify,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::RegisterAdapter => 1,
            Self::SetDefaultBridge => 2,
            Self::ConfigureProtocol => 3,
            Self::Verify => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::RegisterAdapter),
            2 => Some(Self::SetDefaultBridge),
            3 => Some(Self::ConfigureProtocol),
            4 => Some(Self::Verify),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RegisterAdapter => "register adapter",
            Self::SetDefaultBridge => "set default bridge",
            Self::ConfigureProtocol => "configure protocol",
            Self::Verify => "verify",
        }
    }
}

impl TryFrom<u8> for ProvisioningStep {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| format!("step must be 1-4 (got {number})"))
    }
}

impl From<ProvisioningStep> for u8 {
    fn from(step: ProvisioningStep) -> Self {
        step.number()
    }
}

impl std::fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {} ({})", self.number(), self.label())
    }
}

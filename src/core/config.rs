#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    // Pre-reserved actuator slots; registering more just grows the list.
    pub capacity: usize,

    // Reject mask passes that leave a branch with no permitted value. Off by default.
    pub validate_mask: bool,
}

impl ManagerConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_mask_validation(mut self, enabled: bool) -> Self {
        self.validate_mask = enabled;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            validate_mask: false,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: ManagerConfig = serde_json::from_str(r#"{ "capacity": 8 }"#).unwrap();
        assert_eq!(cfg.capacity, 8);
        assert!(!cfg.validate_mask);

        let cfg: ManagerConfig = serde_json::from_str(r#"{ "validate_mask": true }"#).unwrap();
        assert_eq!(cfg.capacity, 0);
        assert!(cfg.validate_mask);
    }
}

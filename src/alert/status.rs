//! Vehicle status severity classes.
//!
//! The mapping from status digit to severity is data, not code: the default
//! table below can be extended or overridden from the `[status]` section of
//! the config file without touching the roster normalizer.

use std::collections::HashMap;

use crate::model::{StatusClass, StatusCode};

/// Lookup table from status digit (1-9) to severity class.
///
/// Digits missing from the table, and `StatusCode::Unknown`, classify as
/// `StatusClass::Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTable {
    classes: HashMap<u8, StatusClass>,
}

impl StatusTable {
    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Adds or replaces the class for one digit.
    pub fn with_class(mut self, digit: u8, class: StatusClass) -> Self {
        self.classes.insert(digit, class);
        self
    }

    pub fn set_class(&mut self, digit: u8, class: StatusClass) {
        self.classes.insert(digit, class);
    }

    pub fn classify(&self, status: StatusCode) -> StatusClass {
        status
            .digit()
            .and_then(|d| self.classes.get(&d).copied())
            .unwrap_or(StatusClass::Unknown)
    }
}

impl Default for StatusTable {
    /// 1-2 available, 3/4/5/7/8 engaged or restricted, 6 out of service.
    fn default() -> Self {
        let mut table = Self::empty();
        for digit in [1, 2] {
            table.set_class(digit, StatusClass::Ok);
        }
        for digit in [3, 4, 5, 7, 8] {
            table.set_class(digit, StatusClass::Warn);
        }
        table.set_class(6, StatusClass::Critical);
        table
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

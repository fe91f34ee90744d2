//! Validation violations collected while restructuring

use std::fmt;

/// Where in the input a violation was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The document as a whole
    Document,
    /// An entry of the resource catalog (name, or position if unnamed)
    Resource(String),
    System {
        system: String,
    },
    Body {
        system: String,
        body: String,
    },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Document => write!(f, "document"),
            Location::Resource(name) => write!(f, "resource {}", name),
            Location::System { system } => write!(f, "{}", system),
            Location::Body { system, body } => write!(f, "{} > {}", system, body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// A NOT NULL field is absent
    Missing,
    /// Present but unreadable
    Malformed(String),
    /// Outside a closed set
    OutOfSet {
        value: String,
        allowed: &'static [&'static str],
    },
    /// Names a resource that is not in the catalog
    UnknownResource,
    /// Collides with an earlier record's key
    Duplicate(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => write!(f, "required field is missing"),
            Problem::Malformed(why) => write!(f, "{}", why),
            Problem::OutOfSet { value, allowed } => {
                write!(f, "{:?} is not one of {}", value, allowed.join(", "))
            }
            Problem::UnknownResource => write!(f, "not in the resource catalog"),
            Problem::Duplicate(earlier) => write!(f, "duplicate of {}", earlier),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub location: Location,
    pub field: String,
    pub problem: Problem,
}

impl Violation {
    pub fn new(location: Location, field: impl Into<String>, problem: Problem) -> Self {
        Self {
            location,
            field: field.into(),
            problem,
        }
    }

    /// Body name, when the violation belongs to a body
    pub fn body(&self) -> Option<&str> {
        match &self.location {
            Location::Body { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn system(&self) -> Option<&str> {
        match &self.location {
            Location::System { system } | Location::Body { system, .. } => Some(system),
            _ => None,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.field, self.problem)
    }
}

/// Every violation found in one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed with {} violation(s)", self.len())?;
        for v in &self.violations {
            write!(f, "\n  - {}", v)?;
        }
        Ok(())
    }
}

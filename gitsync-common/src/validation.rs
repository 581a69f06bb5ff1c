//! Hierarchical validation accumulator.
//!
//! Instead of failing on the first bad field, configuration loading
//! collects every fault into a named tree and renders one actionable
//! report at the end. Groups are created lazily and looked up by name,
//! so several passes over the same data land their faults in the same
//! place.

use std::fmt::Arguments;

use thiserror::Error;

/// Error carrying the rendered fault report.
#[derive(Debug, Error)]
#[error("validation failed:\n{report}")]
pub struct ValidationError {
    pub report: String,
}

#[derive(Debug)]
struct Fault {
    name: String,
    description: String,
}

/// A named node in the validation tree.
///
/// The root is created with [`Validator::root`]; nested groups come
/// from [`Validator::sub`], which returns the existing child when the
/// name was already used.
#[derive(Debug)]
pub struct Validator {
    name: String,
    faults: Vec<Fault>,
    subs: Vec<Validator>,
}

impl Validator {
    pub fn root() -> Self {
        Validator {
            name: String::new(),
            faults: Vec::new(),
            subs: Vec::new(),
        }
    }

    /// Record a fault on this node.
    pub fn fault(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.faults.push(Fault {
            name: name.into(),
            description: description.into(),
        });
    }

    /// Record a fault only when `condition` holds.
    pub fn fault_when(
        &mut self,
        condition: bool,
        name: impl Into<String>,
        description: impl Into<String>,
    ) {
        if condition {
            self.fault(name, description);
        }
    }

    /// Record a fault with a formatted description.
    pub fn fault_fmt(&mut self, name: impl Into<String>, description: Arguments<'_>) {
        self.fault(name, description.to_string());
    }

    /// Record a fault under a numeric name, for indexed positions.
    pub fn index_fault(&mut self, index: usize, description: impl Into<String>) {
        self.fault(index.to_string(), description);
    }

    pub fn index_fault_when(
        &mut self,
        condition: bool,
        index: usize,
        description: impl Into<String>,
    ) {
        if condition {
            self.index_fault(index, description);
        }
    }

    /// Get or create the child group with the given name.
    pub fn sub(&mut self, name: &str) -> &mut Validator {
        if let Some(pos) = self.subs.iter().position(|s| s.name == name) {
            return &mut self.subs[pos];
        }
        self.subs.push(Validator {
            name: name.to_string(),
            faults: Vec::new(),
            subs: Vec::new(),
        });
        self.subs.last_mut().expect("just pushed")
    }

    /// Get or create a child group named after an index.
    pub fn indexed_sub(&mut self, index: usize) -> &mut Validator {
        self.sub(&index.to_string())
    }

    /// Total number of faults in this node and all descendants.
    pub fn count(&self) -> usize {
        self.faults.len() + self.subs.iter().map(Validator::count).sum::<usize>()
    }

    /// Render the indented fault report. Subtrees without any faults
    /// are omitted; the root node has no header of its own.
    pub fn report(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, 0);
        out
    }

    fn render(&self, out: &mut String, depth: usize) {
        if self.count() == 0 {
            return;
        }
        if depth > 0 {
            indent(out, depth - 1);
            out.push_str(&self.name);
            out.push_str(":\n");
        }
        for fault in &self.faults {
            indent(out, depth);
            out.push_str(&fault.name);
            out.push_str(": ");
            out.push_str(&fault.description);
            out.push('\n');
        }
        for sub in &self.subs {
            sub.render(out, depth + 1);
        }
    }

    /// Convert the accumulated faults to an error, or `None` when the
    /// tree is clean.
    pub fn to_error(&self) -> Option<ValidationError> {
        if self.count() == 0 {
            return None;
        }
        Some(ValidationError {
            report: self.report(),
        })
    }
}

fn indent(out: &mut String, levels: usize) {
    for _ in 0..levels * 2 {
        out.push(' ');
    }
}

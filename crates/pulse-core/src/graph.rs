//! Dependency graph construction.
//!
//! [`GraphBuilder`] turns one discovery pass worth of [`ModuleDescriptor`]s
//! into a [`DependencyGraph`]: the modules that survived validation
//! (*candidates*), the ordering edges between them, and diagnostics for the
//! modules that were rejected.
//!
//! # Rules
//!
//! 1. A module whose required dependency is not among the discovered names is
//!    rejected with [`Rejection::MissingRequiredDependency`].
//! 2. A module whose required dependency is disabled, or was itself rejected,
//!    is rejected with [`Rejection::DisabledDependency`].  This is repeated to
//!    a fixed point so rejection cascades through transitive dependents.
//! 3. Each optional group is resolved against the surviving, enabled
//!    candidates.  Every available member contributes an ordering edge; a
//!    group with no available member is logged and contributes nothing.
//!
//! Disabled modules stay in the candidate set: they are ordered like any other
//! module and skipped at activation time.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::descriptor::{ModuleDescriptor, OptionalDependency};
use crate::error::{PulseError, PulseResult};

// ─── Edges ────────────────────────────────────────────────────────────────────

/// Why an ordering edge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Required,
    /// A resolved optional dependency; orders the pair but never rejects.
    Optional,
}

/// Ordering edge: `dependency` must be activated before `dependent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub dependency: String,
    pub dependent: String,
    pub kind: EdgeKind,
}

// ─── Rejection ────────────────────────────────────────────────────────────────

/// Reason a discovered module was excluded from the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Required dependencies absent from the discovery set.
    MissingRequiredDependency(Vec<String>),
    /// Required dependencies that are disabled or were rejected themselves.
    DisabledDependency(Vec<String>),
}

impl Rejection {
    /// The dependency names that caused the rejection.
    pub fn dependencies(&self) -> &[String] {
        match self {
            Self::MissingRequiredDependency(deps) | Self::DisabledDependency(deps) => deps,
        }
    }

    /// Converts into the matching [`PulseError`] for `module`.
    pub fn into_error(self, module: impl Into<String>) -> PulseError {
        let module = module.into();
        match self {
            Self::MissingRequiredDependency(missing) => {
                PulseError::MissingRequiredDependency { module, missing }
            }
            Self::DisabledDependency(disabled) => PulseError::DisabledDependency { module, disabled },
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequiredDependency(deps) => {
                write!(f, "missing required dependencies: {}", deps.join(", "))
            }
            Self::DisabledDependency(deps) => {
                write!(f, "unavailable dependencies: {}", deps.join(", "))
            }
        }
    }
}

// ─── DependencyGraph ──────────────────────────────────────────────────────────

/// Output of [`GraphBuilder::build`], input of the sorter.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    candidates: Vec<String>,
    edges: Vec<Edge>,
    missing_required: BTreeMap<String, Vec<String>>,
    disabled_dependencies: BTreeMap<String, Vec<String>>,
    unresolved_optional: BTreeMap<String, Vec<OptionalDependency>>,
}

impl DependencyGraph {
    /// Surviving module names, in discovery order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Module name → required dependencies absent from the discovery set.
    pub fn missing_required(&self) -> &BTreeMap<String, Vec<String>> {
        &self.missing_required
    }

    /// Module name → disabled or rejected dependencies that excluded it.
    pub fn disabled_dependencies(&self) -> &BTreeMap<String, Vec<String>> {
        &self.disabled_dependencies
    }

    /// Module name → optional groups that had no available member.
    pub fn unresolved_optional(&self) -> &BTreeMap<String, Vec<OptionalDependency>> {
        &self.unresolved_optional
    }

    pub fn is_candidate(&self, name: &str) -> bool {
        self.candidates.iter().any(|c| c == name)
    }

    /// Every rejected module with its reason, ordered by name.
    pub fn rejections(&self) -> BTreeMap<String, Rejection> {
        let missing = self.missing_required.iter().map(|(name, deps)| {
            (name.clone(), Rejection::MissingRequiredDependency(deps.clone()))
        });
        let disabled = self.disabled_dependencies.iter().map(|(name, deps)| {
            (name.clone(), Rejection::DisabledDependency(deps.clone()))
        });
        missing.chain(disabled).collect()
    }

    /// Dependencies `name` is ordered after.
    pub fn dependencies_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.dependent == name)
    }
}

// ─── GraphBuilder ─────────────────────────────────────────────────────────────

/// Builds a [`DependencyGraph`] from discovered descriptors.
///
/// ```rust
/// use pulse_core::{GraphBuilder, ModuleDescriptor};
///
/// let descriptors = vec![
///     ModuleDescriptor::new("a"),
///     ModuleDescriptor::new("b").requires(["a"]),
/// ];
/// let graph = GraphBuilder::new(&descriptors).build()?;
/// assert_eq!(graph.candidates(), ["a", "b"]);
/// # Ok::<(), pulse_core::PulseError>(())
/// ```
pub struct GraphBuilder<'a> {
    descriptors: Vec<&'a ModuleDescriptor>,
    disabled: HashSet<String>,
}

impl<'a> GraphBuilder<'a> {
    /// Starts a builder over one discovery pass, in discovery order.
    pub fn new<I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = &'a ModuleDescriptor>,
    {
        Self {
            descriptors: descriptors.into_iter().collect(),
            disabled: HashSet::new(),
        }
    }

    /// Marks modules as currently disabled.
    pub fn disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self
    }

    /// Validates the descriptors and computes candidates and edges.
    ///
    /// # Errors
    ///
    /// [`PulseError::DuplicateModule`] when two descriptors share a name.
    /// Per-module problems never fail the build; they are recorded in the
    /// graph's diagnostic maps instead.
    pub fn build(self) -> PulseResult<DependencyGraph> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut descriptors: Vec<&ModuleDescriptor> = Vec::with_capacity(self.descriptors.len());
        for &desc in &self.descriptors {
            if desc.name.trim().is_empty() {
                warn!(
                    version = %desc.version,
                    "Discovered module has no name; ignored"
                );
                continue;
            }
            if !seen.insert(desc.name.as_str()) {
                return Err(PulseError::DuplicateModule {
                    name: desc.name.clone(),
                });
            }
            descriptors.push(desc);
        }

        let mut graph = DependencyGraph::default();
        let mut rejected: HashSet<&str> = HashSet::new();

        // ── 1. Required dependencies must be discoverable ──────────────────
        for desc in &descriptors {
            let missing = unique(
                desc.required_dependencies
                    .iter()
                    .filter(|dep| !seen.contains(dep.as_str())),
            );
            if !missing.is_empty() {
                warn!(
                    module = %desc.name,
                    missing = ?missing,
                    "Module is missing required dependencies; it will not be loaded"
                );
                rejected.insert(desc.name.as_str());
                graph.missing_required.insert(desc.name.clone(), missing);
            }
        }

        // ── 2. Cascade through disabled and rejected dependencies ──────────
        loop {
            let mut changed = false;
            for desc in &descriptors {
                if rejected.contains(desc.name.as_str()) {
                    continue;
                }
                let blocked = unique(desc.required_dependencies.iter().filter(|dep| {
                    self.disabled.contains(dep.as_str()) || rejected.contains(dep.as_str())
                }));
                if !blocked.is_empty() {
                    warn!(
                        module = %desc.name,
                        unavailable = ?blocked,
                        "Module depends on disabled or rejected modules; it will not be loaded"
                    );
                    rejected.insert(desc.name.as_str());
                    graph.disabled_dependencies.insert(desc.name.clone(), blocked);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let survivors: Vec<&ModuleDescriptor> = descriptors
            .iter()
            .copied()
            .filter(|d| !rejected.contains(d.name.as_str()))
            .collect();
        let candidate_set: HashSet<&str> = survivors.iter().map(|d| d.name.as_str()).collect();

        // ── 3. Edges: required first, then resolved optional groups ────────
        let mut edge_keys: HashSet<(String, String)> = HashSet::new();
        for desc in &survivors {
            for dep in unique(desc.required_dependencies.iter()) {
                if edge_keys.insert((dep.clone(), desc.name.clone())) {
                    graph.edges.push(Edge {
                        dependency: dep,
                        dependent: desc.name.clone(),
                        kind: EdgeKind::Required,
                    });
                }
            }

            for group in &desc.optional_dependencies {
                let mut available = Vec::new();
                for member in group.members() {
                    if member == desc.name {
                        warn!(
                            module = %desc.name,
                            "Module lists itself as an optional dependency; ignored"
                        );
                    } else if candidate_set.contains(member) && !self.disabled.contains(member) {
                        available.push(member.to_string());
                    }
                }

                if available.is_empty() {
                    warn!(
                        module = %desc.name,
                        group = %group,
                        "No optional dependency in group is available; loading without it"
                    );
                    graph
                        .unresolved_optional
                        .entry(desc.name.clone())
                        .or_default()
                        .push(group.clone());
                    continue;
                }

                debug!(
                    module = %desc.name,
                    resolved = ?available,
                    "Optional dependencies resolved"
                );
                for member in available {
                    if edge_keys.insert((member.clone(), desc.name.clone())) {
                        graph.edges.push(Edge {
                            dependency: member,
                            dependent: desc.name.clone(),
                            kind: EdgeKind::Optional,
                        });
                    }
                }
            }
        }

        graph.candidates = survivors.into_iter().map(|d| d.name.clone()).collect();
        Ok(graph)
    }
}

/// Clones names, dropping repeats but keeping first-seen order.
fn unique<'s>(names: impl Iterator<Item = &'s String>) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    names
        .filter(|n| seen.insert(*n))
        .cloned()
        .collect()
}

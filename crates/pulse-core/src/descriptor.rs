//! Module descriptors: the passive metadata produced by discovery.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── OptionalDependency ───────────────────────────────────────────────────────

/// One entry in a module's optional dependency list.
///
/// Serialises as either a bare string (`"logger"`) or a list of alternatives
/// (`["sqlite", "postgres"]`).  An alternative group is satisfied as soon as
/// any one member is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionalDependency {
    /// A single optional module name.
    Single(String),
    /// A group of interchangeable module names.
    AnyOf(Vec<String>),
}

impl OptionalDependency {
    /// Iterates the module names in this group.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::AnyOf(names) => names,
        };
        slice.iter().map(String::as_str)
    }
}

impl fmt::Display for OptionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => f.write_str(name),
            Self::AnyOf(names) => write!(f, "[{}]", names.join(" | ")),
        }
    }
}

impl From<&str> for OptionalDependency {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl<S: Into<String>> From<Vec<S>> for OptionalDependency {
    fn from(names: Vec<S>) -> Self {
        Self::AnyOf(names.into_iter().map(Into::into).collect())
    }
}

// ─── ModuleDescriptor ─────────────────────────────────────────────────────────

/// Static metadata describing one discovered module.
///
/// A descriptor is created fresh on every discovery pass and never mutated
/// afterwards; the registry keeps a snapshot of it next to the enabled flag.
///
/// # Example
///
/// ```rust
/// use pulse_core::ModuleDescriptor;
///
/// let desc = ModuleDescriptor::new("chat")
///     .version("1.2.0")
///     .requires(["storage"])
///     .optional(["logger"])
///     .optional_any_of(["sqlite", "postgres"]);
///
/// assert_eq!(desc.required_dependencies, vec!["storage".to_string()]);
/// assert_eq!(desc.optional_dependencies.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Unique module name; also the key in the registry and namespace.
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    /// Modules that must be present and enabled, in declaration order.
    #[serde(default)]
    pub required_dependencies: Vec<String>,
    /// Modules used when available; absence only produces a warning.
    #[serde(default)]
    pub optional_dependencies: Vec<OptionalDependency>,
    /// External package identifiers the module needs installed.
    #[serde(default)]
    pub third_party_dependencies: Vec<String>,
}

impl ModuleDescriptor {
    /// Creates a descriptor with the given name and empty metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            description: String::new(),
            author: String::new(),
            required_dependencies: Vec::new(),
            optional_dependencies: Vec::new(),
            third_party_dependencies: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Appends required dependencies.
    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_dependencies
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Appends one singleton optional dependency per name.
    pub fn optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_dependencies.extend(
            names
                .into_iter()
                .map(|n| OptionalDependency::Single(n.into())),
        );
        self
    }

    /// Appends one alternative group: any single member satisfies it.
    pub fn optional_any_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_dependencies.push(OptionalDependency::AnyOf(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Appends one optional dependency entry as-is.
    pub fn optional_group(mut self, dependency: OptionalDependency) -> Self {
        self.optional_dependencies.push(dependency);
        self
    }

    /// Appends third-party package identifiers.
    pub fn third_party<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.third_party_dependencies
            .extend(packages.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_dependency_serializes_as_name_or_list() {
        let desc = ModuleDescriptor::new("c")
            .optional(["a"])
            .optional_any_of(["x", "y"]);

        let json = serde_json::to_value(&desc.optional_dependencies).unwrap();
        assert_eq!(json, serde_json::json!(["a", ["x", "y"]]));

        let back: Vec<OptionalDependency> = serde_json::from_value(json).unwrap();
        assert_eq!(back, desc.optional_dependencies);
    }

    #[test]
    fn missing_metadata_fields_default_to_empty() {
        let desc: ModuleDescriptor = serde_json::from_str(r#"{"name":"bare"}"#).unwrap();
        assert_eq!(desc, ModuleDescriptor::new("bare"));
    }

    #[test]
    fn group_members_and_display() {
        let group = OptionalDependency::from(vec!["a", "b"]);
        assert_eq!(group.members().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(group.to_string(), "[a | b]");
        assert_eq!(OptionalDependency::from("solo").to_string(), "solo");
    }
}

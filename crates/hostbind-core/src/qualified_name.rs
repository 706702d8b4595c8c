//! Namespaced class names.

use std::fmt;

use crate::TypeHash;

/// Namespace separator used by the host runtime.
pub const NAMESPACE_SEPARATOR: &str = "\\";

/// Qualified class name: a simple name plus its namespace path.
///
/// # Examples
///
/// ```
/// use hostbind_core::QualifiedName;
///
/// let global = QualifiedName::global("Declare");
/// assert_eq!(global.to_string(), "Declare");
///
/// let nested = QualifiedName::new("OoNativeImplements", vec!["Test".into(), "Oo".into()]);
/// assert_eq!(nested.to_string(), "Test\\Oo\\OoNativeImplements");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Simple name (e.g., "Declare")
    pub name: String,
    /// Namespace path (e.g., ["Test", "Oo"]), empty for the global namespace
    pub namespace: Vec<String>,
}

impl QualifiedName {
    /// From a simple name and namespace segments.
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    /// A name outside any namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
        }
    }

    /// Create from a namespace string and a simple name.
    ///
    /// `namespace` uses the host separator (`Test\Oo`); empty means global.
    pub fn in_namespace(namespace: &str, name: impl Into<String>) -> Self {
        let namespace = namespace
            .split(NAMESPACE_SEPARATOR)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            name: name.into(),
            namespace,
        }
    }

    /// Create from a fully qualified string (e.g., `Test\Oo\OoNativeImplements`).
    ///
    /// A leading separator (absolute path) is ignored.
    pub fn from_qualified_string(s: &str) -> Self {
        let mut parts: Vec<&str> = s
            .split(NAMESPACE_SEPARATOR)
            .filter(|p| !p.is_empty())
            .collect();
        match parts.pop() {
            None => Self::global(""),
            Some(name) => Self {
                name: name.to_string(),
                namespace: parts.into_iter().map(str::to_string).collect(),
            },
        }
    }

    /// Whether the name has no namespace.
    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    /// The last segment.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Namespace segments joined with `\`.
    pub fn namespace_string(&self) -> String {
        self.namespace.join(NAMESPACE_SEPARATOR)
    }

    /// Compute the class identity hash for this name.
    pub fn to_type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.to_string())
    }

    /// Lookup key: class names are case-insensitive in the host runtime.
    pub fn lookup_key(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(
                f,
                "{}{}{}",
                self.namespace.join(NAMESPACE_SEPARATOR),
                NAMESPACE_SEPARATOR,
                self.name
            )
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::from_qualified_string(s)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::from_qualified_string(&s)
    }
}

use crate::element::UIElement;
use crate::errors::ConfigError;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A case-insensitive regular expression that must match the whole attribute value.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{source})$"))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/i", self.source)
    }
}

/// Represents ways to locate a UI element on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Select by resource id scoped to an application package
    ResourceId { package: String, id: String },
    /// Select by text, matched case-insensitively against the whole text
    Text(Pattern),
    /// Select by a substring of the text (case-sensitive)
    TextContains(String),
    /// Select by content description, matched case-insensitively
    Description(Pattern),
    /// Select by class name, optionally qualified by a package
    ClassName {
        package: Option<String>,
        name: String,
    },
    /// Filter by whether the element can be scrolled
    Scrollable(bool),
}

impl Selector {
    /// The fully qualified class name this selector expects, if it is a class selector.
    fn qualified_class(package: Option<&str>, name: &str) -> String {
        match package {
            Some(pkg) if name.starts_with('.') => format!("{pkg}{name}"),
            Some(pkg) => format!("{pkg}.{name}"),
            None => name.to_string(),
        }
    }

    /// Whether the element snapshot satisfies this selector.
    pub fn matches(&self, element: &UIElement) -> bool {
        match self {
            Selector::ResourceId { package, id } => {
                let expected = format!("{package}:id/{id}");
                element.resource_id.as_deref() == Some(expected.as_str())
            }
            Selector::Text(pattern) => element
                .text
                .as_deref()
                .is_some_and(|text| pattern.is_match(text)),
            Selector::TextContains(fragment) => element
                .text
                .as_deref()
                .is_some_and(|text| text.contains(fragment.as_str())),
            Selector::Description(pattern) => element
                .description
                .as_deref()
                .is_some_and(|desc| pattern.is_match(desc)),
            Selector::ClassName { package, name } => {
                let expected = Self::qualified_class(package.as_deref(), name);
                element.class_name.as_deref() == Some(expected.as_str())
            }
            Selector::Scrollable(flag) => element.scrollable == *flag,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::ResourceId { package, id } => write!(f, "res={package}:id/{id}"),
            Selector::Text(pattern) => write!(f, "text={pattern:?}"),
            Selector::TextContains(fragment) => write!(f, "textContains={fragment:?}"),
            Selector::Description(pattern) => write!(f, "desc={pattern:?}"),
            Selector::ClassName { package, name } => write!(
                f,
                "clazz={}",
                Self::qualified_class(package.as_deref(), name)
            ),
            Selector::Scrollable(flag) => write!(f, "scrollable={flag}"),
        }
    }
}

/// How a configured UI element is identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectorKind {
    ResourceId,
    Text,
    TextContains,
    Description,
    Class,
}

impl SelectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::ResourceId => "RESOURCE_ID",
            SelectorKind::Text => "TEXT",
            SelectorKind::TextContains => "TEXT_CONTAINS",
            SelectorKind::Description => "DESCRIPTION",
            SelectorKind::Class => "CLASS",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RESOURCE_ID" => Ok(SelectorKind::ResourceId),
            "TEXT" => Ok(SelectorKind::Text),
            "TEXT_CONTAINS" => Ok(SelectorKind::TextContains),
            "DESCRIPTION" => Ok(SelectorKind::Description),
            "CLASS" => Ok(SelectorKind::Class),
            other => Err(ConfigError::InvalidSelector(format!(
                "TYPE {other} is not supported. Supported types: [ RESOURCE_ID, TEXT, \
                 TEXT_CONTAINS, DESCRIPTION, CLASS ]"
            ))),
        }
    }
}

/// A validated, immutable description of a UI element from the config.
///
/// `package` is required for `RESOURCE_ID`, optional for `CLASS` and rejected for every
/// other kind. Text and description values are compiled as patterns up front, so turning
/// a descriptor into a [`Selector`] cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorDescriptor {
    #[serde(rename = "TYPE")]
    kind: SelectorKind,
    #[serde(rename = "VALUE")]
    value: String,
    #[serde(rename = "PACKAGE", skip_serializing_if = "Option::is_none")]
    package: Option<String>,
    #[serde(skip)]
    query: Selector,
}

impl SelectorDescriptor {
    pub fn new(
        kind: SelectorKind,
        value: &str,
        package: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::InvalidSelector(format!(
                "{kind} element requires a non-empty VALUE"
            )));
        }
        let package = package.map(str::trim).filter(|p| !p.is_empty());

        let query = match kind {
            SelectorKind::ResourceId => {
                let package = package.ok_or_else(|| {
                    ConfigError::InvalidSelector(format!(
                        "RESOURCE_ID element {value} requires a PACKAGE"
                    ))
                })?;
                Selector::ResourceId {
                    package: package.to_string(),
                    id: value.to_string(),
                }
            }
            SelectorKind::Class => Selector::ClassName {
                package: package.map(str::to_string),
                name: value.to_string(),
            },
            SelectorKind::Text | SelectorKind::TextContains | SelectorKind::Description => {
                if let Some(package) = package {
                    return Err(ConfigError::InvalidSelector(format!(
                        "{kind} element {value} does not accept a PACKAGE (got {package})"
                    )));
                }
                match kind {
                    SelectorKind::TextContains => Selector::TextContains(value.to_string()),
                    SelectorKind::Text => Selector::Text(Self::pattern(kind, value)?),
                    _ => Selector::Description(Self::pattern(kind, value)?),
                }
            }
        };

        Ok(Self {
            kind,
            value: value.to_string(),
            package: package.map(str::to_string),
            query,
        })
    }

    fn pattern(kind: SelectorKind, value: &str) -> Result<Pattern, ConfigError> {
        Pattern::new(value).map_err(|e| {
            ConfigError::InvalidSelector(format!(
                "{kind} value {value} is not a valid pattern: {e}"
            ))
        })
    }

    pub fn resource_id(package: &str, id: &str) -> Result<Self, ConfigError> {
        Self::new(SelectorKind::ResourceId, id, Some(package))
    }

    pub fn text(value: &str) -> Result<Self, ConfigError> {
        Self::new(SelectorKind::Text, value, None)
    }

    pub fn text_contains(value: &str) -> Result<Self, ConfigError> {
        Self::new(SelectorKind::TextContains, value, None)
    }

    pub fn description(value: &str) -> Result<Self, ConfigError> {
        Self::new(SelectorKind::Description, value, None)
    }

    pub fn class(name: &str, package: Option<&str>) -> Result<Self, ConfigError> {
        Self::new(SelectorKind::Class, name, package)
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// The platform query for this element.
    pub fn to_query(&self) -> Selector {
        self.query.clone()
    }
}

impl From<&SelectorDescriptor> for Selector {
    fn from(descriptor: &SelectorDescriptor) -> Self {
        descriptor.to_query()
    }
}

impl fmt::Display for SelectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

//! Component kind value object
//!
//! OmniStudio component types plus the open-ended set of regular platform
//! metadata subtypes.

use std::fmt;
use std::str::FromStr;

/// Key under which metadata subtypes are nested in kind-keyed mappings
pub const METADATA_KEY: &str = "Metadata";

/// The type of a tracked component
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    FlexCard,
    OmniScript,
    IntegrationProcedure,
    DataRaptor,
    /// Regular platform metadata, keyed by its subtype (e.g. `ApexClass`)
    Metadata(String),
}

impl ComponentKind {
    /// All OmniStudio kinds, in display order
    pub const OMNI: [ComponentKind; 4] = [
        ComponentKind::FlexCard,
        ComponentKind::OmniScript,
        ComponentKind::IntegrationProcedure,
        ComponentKind::DataRaptor,
    ];

    pub fn metadata(subtype: impl Into<String>) -> Self {
        ComponentKind::Metadata(subtype.into())
    }

    /// Label used as a mapping key: the type name, or the subtype for metadata
    pub fn label(&self) -> &str {
        match self {
            ComponentKind::FlexCard => "FlexCard",
            ComponentKind::OmniScript => "OmniScript",
            ComponentKind::IntegrationProcedure => "IntegrationProcedure",
            ComponentKind::DataRaptor => "DataRaptor",
            ComponentKind::Metadata(subtype) => subtype,
        }
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, ComponentKind::Metadata(_))
    }

    /// Parse a top-level OmniStudio label; metadata subtypes are not accepted here
    pub fn parse_omni(label: &str) -> Option<Self> {
        match label {
            "FlexCard" => Some(ComponentKind::FlexCard),
            "OmniScript" => Some(ComponentKind::OmniScript),
            "IntegrationProcedure" => Some(ComponentKind::IntegrationProcedure),
            "DataRaptor" => Some(ComponentKind::DataRaptor),
            _ => None,
        }
    }

    /// Parse a label found inside a component body.
    ///
    /// Vlocity DataPack type names are accepted as aliases and anything
    /// unknown is treated as a metadata subtype.
    pub fn parse_lenient(label: &str) -> Self {
        if let Some(kind) = Self::parse_omni(label) {
            return kind;
        }
        match label {
            "VlocityCard" | "OmniUiCard" => ComponentKind::FlexCard,
            "OmniIntegrationProcedure" => ComponentKind::IntegrationProcedure,
            "OmniDataTransform" => ComponentKind::DataRaptor,
            other => ComponentKind::Metadata(other.to_string()),
        }
    }

    /// Vlocity DataPack type used for export/deploy and the bundle directory name
    pub fn datapack_type(&self) -> Option<&'static str> {
        match self {
            ComponentKind::FlexCard => Some("VlocityCard"),
            ComponentKind::OmniScript => Some("OmniScript"),
            ComponentKind::IntegrationProcedure => Some("IntegrationProcedure"),
            ComponentKind::DataRaptor => Some("DataRaptor"),
            ComponentKind::Metadata(_) => None,
        }
    }

    /// Kind whose DataPack type (bundle directory) is `dir`
    pub fn from_datapack_type(dir: &str) -> Option<Self> {
        Self::OMNI
            .into_iter()
            .find(|kind| kind.datapack_type() == Some(dir))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Metadata(subtype) => write!(f, "{}/{}", METADATA_KEY, subtype),
            other => f.write_str(other.label()),
        }
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    /// Parse `FlexCard` or `Metadata/ApexClass`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(subtype) = s.strip_prefix("Metadata/") {
            if subtype.is_empty() {
                return Err("metadata subtype must not be empty".to_string());
            }
            return Ok(ComponentKind::Metadata(subtype.to_string()));
        }
        Self::parse_omni(s).ok_or_else(|| format!("unknown component type '{}'", s))
    }
}

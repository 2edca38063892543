use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a parameter. Kept as the raw string found in the source data.
pub type ParameterCode = String;

/// Tag used by the first compared system (TiCares).
pub const SYSTEM_A_TAG: &str = "TICARES";
/// Tag used by the second compared system (SFERE).
pub const SYSTEM_B_TAG: &str = "SFERE";

/// The two systems whose parameters are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceSystem {
    /// TiCares.
    SystemA,
    /// SFERE.
    SystemB,
}

impl SourceSystem {
    /// Both systems in export order (A is always the left-hand side).
    pub const ALL: [SourceSystem; 2] = [SourceSystem::SystemA, SourceSystem::SystemB];

    /// Suffix appended to column names of side-by-side tables.
    pub fn column_suffix(self) -> &'static str {
        match self {
            SourceSystem::SystemA => "TICARES",
            SourceSystem::SystemB => "SFERE",
        }
    }

    /// The other system.
    pub fn counterpart(self) -> SourceSystem {
        match self {
            SourceSystem::SystemA => SourceSystem::SystemB,
            SourceSystem::SystemB => SourceSystem::SystemA,
        }
    }
}

/// Maps raw source tags onto [`SourceSystem`] values.
///
/// Tags compare case-insensitively after trimming. Anything else is an
/// unrecognised source and stays out of every partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTags {
    system_a: String,
    system_b: String,
}

impl SourceTags {
    pub fn new(system_a: impl AsRef<str>, system_b: impl AsRef<str>) -> Self {
        Self {
            system_a: normalize_tag(system_a.as_ref()),
            system_b: normalize_tag(system_b.as_ref()),
        }
    }

    /// Resolves a raw tag to the system it names, if any.
    pub fn resolve(&self, raw: &str) -> Option<SourceSystem> {
        let tag = normalize_tag(raw);
        if tag.is_empty() {
            None
        } else if tag == self.system_a {
            Some(SourceSystem::SystemA)
        } else if tag == self.system_b {
            Some(SourceSystem::SystemB)
        } else {
            None
        }
    }
}

impl Default for SourceTags {
    fn default() -> Self {
        Self::new(SYSTEM_A_TAG, SYSTEM_B_TAG)
    }
}

/// Uppercases and trims a source tag.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One row of source data.
///
/// Nullable columns are explicit options: an empty cell in the input is
/// `None`, which keeps absent and present values distinguishable during
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// Normalised source tag as found in the input.
    pub source_tag: String,
    /// System the tag resolved to; `None` for unrecognised tags.
    pub source: Option<SourceSystem>,
    pub parameter_code: ParameterCode,
    pub description: String,
    pub default_value: Option<String>,
    pub per_location_value: Option<String>,
    pub organization: Option<String>,
    pub center: Option<String>,
    pub service: Option<String>,
}

impl ParameterRecord {
    /// Creates a record with the given source and code and no other data.
    pub fn new(source: SourceSystem, code: impl Into<ParameterCode>) -> Self {
        Self {
            source_tag: match source {
                SourceSystem::SystemA => SYSTEM_A_TAG.to_string(),
                SourceSystem::SystemB => SYSTEM_B_TAG.to_string(),
            },
            source: Some(source),
            parameter_code: code.into(),
            description: String::new(),
            default_value: None,
            per_location_value: None,
            organization: None,
            center: None,
            service: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.per_location_value = Some(value.into());
        self
    }

    /// Sets the organization/center/service triple.
    pub fn at(
        mut self,
        organization: Option<&str>,
        center: Option<&str>,
        service: Option<&str>,
    ) -> Self {
        self.organization = organization.map(str::to_string);
        self.center = center.map(str::to_string);
        self.service = service.map(str::to_string);
        self
    }

    /// Whether the record carries a usable parameter code.
    pub fn has_code(&self) -> bool {
        !self.parameter_code.trim().is_empty()
    }

    /// Whether the record belongs to `system` and can take part in classification.
    pub fn is_classified_as(&self, system: SourceSystem) -> bool {
        self.source == Some(system) && self.has_code()
    }

    /// Location triple with nulls normalised to the empty string.
    pub fn location(&self) -> Location {
        Location {
            organization: self.organization.clone().unwrap_or_default(),
            center: self.center.clone().unwrap_or_default(),
            service: self.service.clone().unwrap_or_default(),
        }
    }
}

/// Organization/center/service triple after null normalisation.
///
/// A missing location part and an explicit empty string are identical here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub organization: String,
    pub center: String,
    pub service: String,
}

impl Location {
    /// `organization|center|service`.
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.organization, self.center, self.service)
    }

    /// `code|organization|center|service`, unique across parameter codes.
    pub fn qualified_key(&self, code: &str) -> String {
        format!("{code}|{}", self.key())
    }
}

/// The three disjoint groups parameter codes are classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Group {
    OnlyA,
    Both,
    OnlyB,
}

impl Group {
    /// Fixed display order: TiCares-only first, matching the stacked bar chart.
    pub const DISPLAY_ORDER: [Group; 3] = [Group::OnlyA, Group::Both, Group::OnlyB];

    pub fn label(self) -> &'static str {
        match self {
            Group::OnlyA => "Solo en TiCares",
            Group::Both => "En ambos sistemas",
            Group::OnlyB => "Solo en SFERE",
        }
    }

    /// The single system a one-sided group draws from.
    pub fn source(self) -> Option<SourceSystem> {
        match self {
            Group::OnlyA => Some(SourceSystem::SystemA),
            Group::OnlyB => Some(SourceSystem::SystemB),
            Group::Both => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

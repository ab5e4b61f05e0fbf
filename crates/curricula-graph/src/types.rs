//! Core graph types for the curriculum.
//!
//! Concepts are [`Node`]s, relationships are directed [`Edge`]s tagged with an
//! [`EdgeKind`], and [`Domain`]s describe the coarse subject areas used for
//! grouping. Field names follow the camelCase layout of the JSON data files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Difficulty
// ============================================================================

/// Ordinal difficulty of a concept, 1 (easiest) to 5 (hardest).
///
/// Out-of-range values are rejected when parsing, so every `Difficulty` in a
/// loaded graph is valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Lowest difficulty level.
    pub const MIN: Difficulty = Difficulty(1);
    /// Highest difficulty level.
    pub const MAX: Difficulty = Difficulty(5);

    /// Creates a difficulty, or `None` if `level` is outside 1–5.
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&level)
            .then_some(Self(level))
    }

    /// Creates a difficulty, clamping `level` into 1–5.
    pub fn clamped(level: u8) -> Self {
        Self(level.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// The numeric level.
    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| format!("difficulty must be between 1 and 5, got {level}"))
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Strength
// ============================================================================

/// Confidence/importance of a relationship, in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Strength(f32);

impl Strength {
    /// Creates a strength, or `None` if `value` is NaN or outside `[0, 1]`.
    pub fn new(value: f32) -> Option<Self> {
        (0.0..=1.0).contains(&value).then_some(Self(value))
    }

    /// Creates a strength, clamping into `[0, 1]` (NaN becomes 0).
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// The numeric value.
    pub fn value(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for Strength {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("strength must be within [0, 1], got {value}"))
    }
}

impl From<Strength> for f32 {
    fn from(s: Strength) -> Self {
        s.0
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// ============================================================================
// EdgeKind
// ============================================================================

/// Relationship kinds between concepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// The source must be learned before the target.
    Prerequisite,
    /// The target applies the source.
    Application,
    /// The relationship crosses subject domains.
    CrossDomain,
    /// Loosely related concepts.
    #[default]
    Related,
}

impl EdgeKind {
    /// Every kind, in display order.
    pub const ALL: [EdgeKind; 4] = [
        Self::Prerequisite,
        Self::Application,
        Self::CrossDomain,
        Self::Related,
    ];

    /// Default strength when a generated edge doesn't carry one.
    pub fn default_strength(&self) -> Strength {
        match self {
            Self::Prerequisite => Strength(0.8),
            Self::Application => Strength(0.6),
            Self::CrossDomain => Strength(0.5),
            Self::Related => Strength(0.4),
        }
    }

    /// The kind as it appears in the data files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prerequisite => "prerequisite",
            Self::Application => "application",
            Self::CrossDomain => "cross-domain",
            Self::Related => "related",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown relationship kind: {s}"))
    }
}

// ============================================================================
// Node
// ============================================================================

/// A concept in the curriculum graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier (e.g. "derivative-definition").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Localized (English) display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Ordinal difficulty.
    pub difficulty: Difficulty,
    /// Optional formula (LaTeX or plain text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Search keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Domain tags; the first one is the primary domain.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Legacy chapter tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    /// Ordered prerequisite concept ids, as authored.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Estimated study time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_study_time: Option<u32>,
}

impl Node {
    /// Creates a node with the given ID and name at the lowest difficulty.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            name_en: None,
            description: String::new(),
            difficulty: Difficulty::default(),
            formula: None,
            keywords: Vec::new(),
            domains: Vec::new(),
            chapter: None,
            prerequisites: Vec::new(),
            estimated_study_time: None,
        }
    }

    /// Sets the difficulty, clamped into 1–5.
    pub fn with_difficulty(mut self, level: u8) -> Self {
        self.difficulty = Difficulty::clamped(level);
        self
    }

    /// Adds a domain tag.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.push(domain.into());
        self
    }

    /// Sets the chapter.
    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends an authored prerequisite id.
    pub fn with_prerequisite(mut self, id: impl Into<String>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    /// Sets the estimated study time in minutes.
    pub fn with_study_time(mut self, minutes: u32) -> Self {
        self.estimated_study_time = Some(minutes);
        self
    }

    /// The first domain tag, if any.
    pub fn primary_domain(&self) -> Option<&str> {
        self.domains.first().map(String::as_str)
    }

    /// Whether the node carries the given domain tag.
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    /// Study time, falling back to `default_minutes`.
    pub fn study_minutes(&self, default_minutes: u32) -> u32 {
        self.estimated_study_time.unwrap_or(default_minutes)
    }
}

// ============================================================================
// Edge
// ============================================================================

/// A directed relationship between two concepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier.
    pub id: String,
    /// Source node ID.
    pub source: String,
    /// Target node ID.
    pub target: String,
    /// Relationship kind.
    #[serde(rename = "type", alias = "kind")]
    pub kind: EdgeKind,
    /// Relationship confidence/importance.
    pub strength: Strength,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Edge {
    /// Creates an edge with the kind's default strength.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: EdgeKind,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            strength: kind.default_strength(),
            description: None,
        }
    }

    /// Creates an edge whose id is derived from its endpoints.
    pub fn between(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        let source = source.into();
        let target = target.into();
        let id = Self::derived_id(&source, &target);
        Self::new(id, source, target, kind)
    }

    /// The id used for generated edges: `"{source}->{target}"`.
    pub fn derived_id(source: &str, target: &str) -> String {
        format!("{source}->{target}")
    }

    /// Sets the strength, clamped into `[0, 1]`.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = Strength::clamped(strength);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the edge starts and ends at the same node.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// The endpoint opposite `id`, if the edge touches it.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

// ============================================================================
// Domain
// ============================================================================

/// A coarse subject area, used for grouping and coloring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Unique identifier (e.g. "calculus").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display color (CSS notation).
    #[serde(default)]
    pub color: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Legacy chapter ids belonging to this domain.
    #[serde(default)]
    pub chapters: Vec<String>,
}

impl Domain {
    /// Creates a domain without display metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: String::new(),
            icon: String::new(),
            chapters: Vec::new(),
        }
    }

    /// Adds a legacy chapter id.
    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapters.push(chapter.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

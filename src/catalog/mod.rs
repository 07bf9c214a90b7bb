//! Module catalog.
//!
//! The fixed list of technical modules a mentee can pick from. Records are
//! compiled into the binary and never created or destroyed at runtime, so the
//! rest of the crate hands out `&'static ModuleRecord` references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Cluster a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Core,
    #[serde(rename = "AI")]
    Ai,
    Data,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Ai => "AI",
            Self::Data => "Data",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sidebar filter over the catalog: everything, or a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Filters in sidebar order.
    pub const ALL: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Core),
        CategoryFilter::Only(Category::Ai),
        CategoryFilter::Only(Category::Data),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(category) => category.as_str(),
        }
    }

    /// Whether a record with `category` passes this filter.
    pub fn admits(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a filter name is not one of `All`, `Core`, `AI`, `Data`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown category filter: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "All" | "all" => Ok(Self::All),
            "Core" | "core" => Ok(Self::Only(Category::Core)),
            "AI" | "Ai" | "ai" => Ok(Self::Only(Category::Ai)),
            "Data" | "data" => Ok(Self::Only(Category::Data)),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        filter.as_str().to_string()
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A themed curriculum topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRecord {
    /// Unique slug, used in URLs.
    pub id: &'static str,
    /// Display name; also the subject interpolated into the system prompt.
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// Accent color as `#rrggbb`.
    pub color: &'static str,
    pub category: Category,
    pub version: &'static str,
}

impl ModuleRecord {
    /// Identifier shown on the module card, e.g. `PYTHON_4.2.0`.
    pub fn node_id(&self) -> String {
        format!("{}_{}", self.id.to_uppercase(), self.version)
    }
}

static MODULES: [ModuleRecord; 6] = [
    ModuleRecord {
        id: "python",
        name: "Python Mastery",
        description: "High-performance async workflows, architectural patterns, and production concurrency models.",
        icon: "🐍",
        color: "#10b981",
        category: Category::Core,
        version: "4.2.0",
    },
    ModuleRecord {
        id: "sql",
        name: "Database Architect",
        description: "Advanced relational modeling, query optimization, and distributed database strategy.",
        icon: "🗄️",
        color: "#0ea5e9",
        category: Category::Data,
        version: "3.1.5",
    },
    ModuleRecord {
        id: "ml",
        name: "MLOps Systems",
        description: "Production-grade ML lifecycles, inference pipelines, and scalable model orchestration.",
        icon: "⛓️",
        color: "#f59e0b",
        category: Category::Ai,
        version: "2.8.1",
    },
    ModuleRecord {
        id: "gen-ai",
        name: "Generative AI",
        description: "LLM engineering, sophisticated RAG architectures, and agentic framework design.",
        icon: "🪄",
        color: "#8b5cf6",
        category: Category::Ai,
        version: "1.0.4",
    },
    ModuleRecord {
        id: "deep-learning",
        name: "Neural Systems",
        description: "Neural architectures, Transformers, and distributed training of massive scale models.",
        icon: "🕸️",
        color: "#ef4444",
        category: Category::Ai,
        version: "5.5.0",
    },
    ModuleRecord {
        id: "agentic-ai",
        name: "Autonomous Agents",
        description: "Multi-agent coordination, goal-directed autonomy, and tool-use grounding.",
        icon: "🛰️",
        color: "#facc15",
        category: Category::Ai,
        version: "0.9.2",
    },
];

/// The full catalog in insertion order.
pub fn list_modules() -> &'static [ModuleRecord] {
    &MODULES
}

/// Order-preserving subsequence of the catalog admitted by `filter`.
pub fn filter(filter: CategoryFilter) -> Vec<&'static ModuleRecord> {
    MODULES.iter().filter(|m| filter.admits(m.category)).collect()
}

/// Look up a module by its slug.
pub fn find(id: &str) -> Option<&'static ModuleRecord> {
    MODULES.iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

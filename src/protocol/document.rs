//! The structured analysis returned for each request.
//!
//! Field names serialize to the engine's classic JSON layout
//! (`characterOffsetBegin`, `machineReading`, ...), so results can be handed
//! to consumers that expect that shape.

use serde::{Deserialize, Serialize};

/// Analysis of one request: its sentences, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentences: Vec<Sentence>,
}

impl AnalysisResult {
    /// Total number of tokens across all sentences.
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    /// Serialize to the engine's JSON layout.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// One sentence of the analyzed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: String,
    pub tokens: Vec<Token>,
    /// Constituency parse, bracketed.
    pub parse: String,
    pub dependencies: Vec<DependencyGroup>,
    pub machine_reading: MachineReading,
}

impl Sentence {
    /// Surface words in order.
    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.word.as_str()).collect()
    }

    /// The dependency group of the given type (e.g. `"basic-dependencies"`).
    pub fn dependency_group(&self, kind: &str) -> Option<&DependencyGroup> {
        self.dependencies.iter().find(|g| g.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub word: String,
    pub lemma: String,
    pub character_offset_begin: usize,
    pub character_offset_end: usize,
    pub pos: String,
    pub ner: String,
}

/// One typed set of dependency edges (basic, collapsed, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGroup {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "dependencies")]
    pub edges: Vec<DependencyEdge>,
}

impl DependencyGroup {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    #[serde(rename = "type")]
    pub kind: String,
    pub governor: DepNode,
    pub dependent: DepNode,
}

/// A token reference inside a dependency edge. `idx` is 1-based; 0 is ROOT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepNode {
    pub idx: usize,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MachineReading {
    pub entities: Vec<Entity>,
}

/// An extracted entity mention with its token span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub val: String,
    pub start: usize,
    pub end: usize,
}

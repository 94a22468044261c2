use std::fmt;

use serde::{Deserialize, Serialize};

/// Named steps of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    Retrieve,
    GradeDocuments,
    #[serde(rename = "websearch")]
    WebSearch,
    Generate,
    End,
}

impl GraphNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::GradeDocuments => "grade_documents",
            Self::WebSearch => "websearch",
            Self::Generate => "generate",
            Self::End => "end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge label produced by a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Unconditional edge
    Continue,
    WebSearch,
    Generate,
    Useful,
    NotUseful,
    NotSupported,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::WebSearch => "websearch",
            Self::Generate => "generate",
            Self::Useful => "useful",
            Self::NotUseful => "not useful",
            Self::NotSupported => "not supported",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of grading a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationVerdict {
    /// Grounded and addresses the question
    Useful,
    /// Grounded but off-topic
    NotUseful,
    /// Not grounded in the evidence
    NotSupported,
}

impl GenerationVerdict {
    /// Combine the two generation checks
    ///
    /// `addresses_question` is `None` when the answer check was not run; an
    /// unchecked answer is never accepted.
    pub fn from_grades(grounded: bool, addresses_question: Option<bool>) -> Self {
        match (grounded, addresses_question) {
            (false, _) => Self::NotSupported,
            (true, Some(true)) => Self::Useful,
            (true, _) => Self::NotUseful,
        }
    }

    pub fn as_str(&self) -> &'static str {
        Decision::from(*self).as_str()
    }
}

impl fmt::Display for GenerationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GenerationVerdict> for Decision {
    fn from(verdict: GenerationVerdict) -> Self {
        match verdict {
            GenerationVerdict::Useful => Self::Useful,
            GenerationVerdict::NotUseful => Self::NotUseful,
            GenerationVerdict::NotSupported => Self::NotSupported,
        }
    }
}

/// Post-grading router: web search iff any retrieved document was rejected
pub fn route_after_grading(web_search: bool) -> Decision {
    if web_search {
        Decision::WebSearch
    } else {
        Decision::Generate
    }
}

/// Every legal edge of the graph
pub const TRANSITIONS: &[(GraphNode, Decision, GraphNode)] = &[
    (GraphNode::Retrieve, Decision::Continue, GraphNode::GradeDocuments),
    (GraphNode::GradeDocuments, Decision::WebSearch, GraphNode::WebSearch),
    (GraphNode::GradeDocuments, Decision::Generate, GraphNode::Generate),
    (GraphNode::WebSearch, Decision::Continue, GraphNode::Generate),
    (GraphNode::Generate, Decision::NotSupported, GraphNode::Generate),
    (GraphNode::Generate, Decision::NotUseful, GraphNode::WebSearch),
    (GraphNode::Generate, Decision::Useful, GraphNode::End),
];

/// Look up the next node for a (node, decision) pair
pub fn transition(node: GraphNode, decision: Decision) -> Option<GraphNode> {
    TRANSITIONS
        .iter()
        .find(|(from, label, _)| *from == node && *label == decision)
        .map(|(_, _, to)| *to)
}

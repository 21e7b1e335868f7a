use std::fmt::{Display, Formatter, Result as FmtResult};

/// What a resolution step is in the middle of producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceNode<'a> {
    /// The start of an injection request.
    Request,
    Class(&'a str),
    Provider(&'a str),
}

impl Display for TraceNode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Request => f.write_str("<request>"),
            Self::Class(name) => f.write_str(name),
            Self::Provider(key) => write!(f, "{key}()"),
        }
    }
}

/// The chain of in-progress resolution steps, innermost first.
#[derive(Debug, Clone)]
pub struct InjectionTrace<'a> {
    node: TraceNode<'a>,
    previous: Option<&'a InjectionTrace<'a>>,
}

impl<'a> InjectionTrace<'a> {
    pub fn new() -> Self {
        Self {
            node: TraceNode::Request,
            previous: None,
        }
    }

    pub fn append<'b>(&'b self, node: TraceNode<'b>) -> InjectionTrace<'b> {
        InjectionTrace {
            node,
            previous: Some(self),
        }
    }

    pub fn node(&self) -> TraceNode<'a> {
        self.node
    }

    pub fn previous(&self) -> Option<&InjectionTrace<'a>> {
        self.previous
    }

    /// Returns true if `node` is already being resolved.
    pub fn contains(&self, node: TraceNode<'_>) -> bool {
        let mut this = Some(self);
        while let Some(current) = this {
            if current.node == node {
                return true;
            }
            this = current.previous();
        }
        false
    }

    /// Renders the steps from the outermost one down to `node`, which closes
    /// the cycle.
    pub fn cycle_path(&self, node: TraceNode<'_>) -> String {
        let mut steps = vec![node.to_string()];
        let mut this = Some(self);
        while let Some(current) = this {
            if current.node == TraceNode::Request {
                break;
            }
            steps.push(current.node.to_string());
            if current.node == node {
                break;
            }
            this = current.previous();
        }
        steps.reverse();
        steps.join(" -> ")
    }
}

impl Default for InjectionTrace<'_> {
    fn default() -> Self {
        Self::new()
    }
}

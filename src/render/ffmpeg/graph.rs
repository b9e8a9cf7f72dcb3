//! Typed filter graph.
//!
//! Nodes are collected as structured values and only turned into the textual
//! `-filter_complex` form by [`FilterGraph::render`]. Output labels can only be
//! obtained from [`FilterGraph::add`], which refuses to write a label twice, so
//! two fragments can never silently claim the same stream.

use std::collections::HashSet;
use std::fmt;

use crate::error::EditError;

/// One ffmpeg filter with its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    args: Vec<(Option<String>, String)>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a `key=value` argument. The value is inserted verbatim.
    pub fn arg(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.args.push((Some(key.into()), value.to_string()));
        self
    }

    /// Append a bare positional argument.
    pub fn positional(mut self, value: impl fmt::Display) -> Self {
        self.args.push((None, value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (index, (key, value)) in self.args.iter().enumerate() {
            f.write_str(if index == 0 { "=" } else { ":" })?;
            match key {
                Some(key) => write!(f, "{key}={value}")?,
                None => f.write_str(value)?,
            }
        }
        Ok(())
    }
}

/// Filters applied one after another inside a single node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn then(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn extend(&mut self, other: FilterChain) {
        self.filters.extend(other.filters);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }
}

impl From<Filter> for FilterChain {
    fn from(filter: Filter) -> Self {
        Self {
            filters: vec![filter],
        }
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, filter) in self.filters.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{filter}")?;
        }
        Ok(())
    }
}

/// A label that some node in the graph has written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

/// Something a node can read from: an input file stream or an earlier label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pad {
    Stream { input: usize, kind: StreamKind },
    Label(Label),
}

impl Pad {
    pub fn video(input: usize) -> Self {
        Pad::Stream {
            input,
            kind: StreamKind::Video,
        }
    }

    pub fn audio(input: usize) -> Self {
        Pad::Stream {
            input,
            kind: StreamKind::Audio,
        }
    }
}

impl From<Label> for Pad {
    fn from(label: Label) -> Self {
        Pad::Label(label)
    }
}

impl From<&Label> for Pad {
    fn from(label: &Label) -> Self {
        Pad::Label(label.clone())
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pad::Stream {
                input,
                kind: StreamKind::Video,
            } => write!(f, "[{input}:v]"),
            Pad::Stream {
                input,
                kind: StreamKind::Audio,
            } => write!(f, "[{input}:a]"),
            Pad::Label(label) => write!(f, "{label}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    pub inputs: Vec<Pad>,
    pub chain: FilterChain,
    pub outputs: Vec<Label>,
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{input}")?;
        }
        write!(f, "{}", self.chain)?;
        for output in &self.outputs {
            write!(f, "{output}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
    written: HashSet<String>,
}

impl FilterGraph {
    pub const SEPARATOR: &'static str = ";\n";

    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node writing a single output label.
    pub fn add(
        &mut self,
        inputs: Vec<Pad>,
        chain: impl Into<FilterChain>,
        output: &str,
    ) -> Result<Label, EditError> {
        let mut labels = self.add_multi(inputs, chain, &[output])?;
        Ok(labels.remove(0))
    }

    /// Append a node writing several output labels (e.g. `asplit`).
    pub fn add_multi(
        &mut self,
        inputs: Vec<Pad>,
        chain: impl Into<FilterChain>,
        outputs: &[&str],
    ) -> Result<Vec<Label>, EditError> {
        let mut fresh = HashSet::new();
        for name in outputs {
            if self.written.contains(*name) || !fresh.insert(*name) {
                return Err(EditError::DuplicateLabel((*name).to_string()));
            }
        }

        let labels: Vec<Label> = outputs.iter().map(|name| Label(name.to_string())).collect();
        self.written.extend(outputs.iter().map(|name| name.to_string()));
        self.nodes.push(FilterNode {
            inputs,
            chain: chain.into(),
            outputs: labels.clone(),
        });
        Ok(labels)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.written.contains(name)
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn render(&self) -> String {
        self.nodes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR)
    }
}

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    fn specifier(&self) -> &'static str {
        match self {
            StreamKind::Video => "v",
            StreamKind::Audio => "a",
        }
    }
}

/// A pad feeding a filter: a stream of an input file or a labelled output of
/// another filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRef {
    Input { index: usize, kind: StreamKind },
    Label(String),
}

impl StreamRef {
    pub fn input(index: usize, kind: StreamKind) -> Self {
        StreamRef::Input { index, kind }
    }

    pub fn label(name: impl Into<String>) -> Self {
        StreamRef::Label(name.into())
    }
}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamRef::Input { index, kind } => write!(f, "[{}:{}]", index, kind.specifier()),
            StreamRef::Label(name) => write!(f, "[{}]", name),
        }
    }
}

/// A single filter with its `key=value` options, e.g. `loudnorm=I=-14:TP=-1.5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    name: String,
    options: Vec<(String, String)>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.options.push((key.into(), value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, (key, value)) in self.options.iter().enumerate() {
            let sep = if i == 0 { '=' } else { ':' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Filters applied one after the other to a single stream, joined by `,`.
/// Used for `-vf` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain(Vec<Filter>);

impl FilterChain {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self(filters)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.0
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, filter) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", filter)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNode {
    pub inputs: Vec<StreamRef>,
    pub filter: Filter,
    pub outputs: Vec<String>,
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "{}", input)?;
        }
        write!(f, "{}", self.filter)?;
        for output in &self.outputs {
            write!(f, "[{}]", output)?;
        }
        Ok(())
    }
}

/// A `-filter_complex` graph. Serializes to `node;node;...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
}

/// The labelled streams a graph produces, for `-map`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOutputs {
    pub video: String,
    pub audio: String,
}

impl GraphOutputs {
    pub fn maps(&self) -> Vec<String> {
        vec![format!("[{}]", self.video), format!("[{}]", self.audio)]
    }
}

pub const LOUDNESS_TARGET_LUFS: f32 = -14.0;
pub const TRUE_PEAK_DB: f32 = -1.5;
pub const LOUDNESS_RANGE: f32 = 11.0;

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, inputs: Vec<StreamRef>, filter: Filter, outputs: &[&str]) {
        self.nodes.push(FilterNode {
            inputs,
            filter,
            outputs: outputs.iter().map(|o| o.to_string()).collect(),
        });
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    /// Joins `count` inputs video-and-audio in order. With loudness
    /// normalization only the joined audio goes through `loudnorm`.
    pub fn concat(count: usize, normalize_loudness: bool) -> (Self, GraphOutputs) {
        let inputs = (0..count)
            .flat_map(|i| {
                [
                    StreamRef::input(i, StreamKind::Video),
                    StreamRef::input(i, StreamKind::Audio),
                ]
            })
            .collect();
        let concat = Filter::new("concat")
            .option("n", count)
            .option("v", 1)
            .option("a", 1);

        let mut graph = Self::new();
        if normalize_loudness {
            graph.push(inputs, concat, &["v", "a0"]);
            graph.push(
                vec![StreamRef::label("a0")],
                Filter::new("loudnorm")
                    .option("I", LOUDNESS_TARGET_LUFS)
                    .option("TP", TRUE_PEAK_DB)
                    .option("LRA", LOUDNESS_RANGE),
                &["a"],
            );
        } else {
            graph.push(inputs, concat, &["v", "a"]);
        }

        let outputs = GraphOutputs {
            video: "v".to_string(),
            audio: "a".to_string(),
        };
        (graph, outputs)
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

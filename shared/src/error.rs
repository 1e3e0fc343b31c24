use std::fmt;

/// Failure while decoding a TopoJSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    Json(String),
    UnknownObject(String),
    ArcIndexOutOfRange(i64),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "invalid topology json: {msg}"),
            Self::UnknownObject(name) => write!(f, "topology has no object named {name:?}"),
            Self::ArcIndexOutOfRange(idx) => write!(f, "arc reference {idx} is out of range"),
        }
    }
}

impl std::error::Error for TopologyError {}

/// Failure loading one of the two map datasets. Any variant aborts the draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Transport { url: String, message: String },
    Http { url: String, status: u16 },
    Parse { url: String, message: String },
    Topology { url: String, source: TopologyError },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, message } => write!(f, "fetch error for {url}: {message}"),
            Self::Http { url, status } => write!(f, "HTTP {status} for {url}"),
            Self::Parse { url, message } => write!(f, "parse error for {url}: {message}"),
            Self::Topology { url, source } => write!(f, "bad topology in {url}: {source}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Topology { source, .. } => Some(source),
            _ => None,
        }
    }
}

//! Paths: addressing values from the document root
//!
//! A path is written as `/`-separated segments, e.g. `cards/0/done`.
//! Segments made only of digits are list indices; everything else is a map
//! key. Leading, trailing and repeated separators are ignored.

use crate::types::Prop;
use std::convert::Infallible;
use std::str::FromStr;

/// Sequence of properties leading from the root to a value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Prop>);

impl Path {
    /// The empty path (the root map)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a `/`-separated path
    pub fn parse(s: &str) -> Self {
        Self(
            s.split('/')
                .filter(|segment| !segment.is_empty())
                .map(|segment| match segment.parse::<usize>() {
                    Ok(index) if segment.bytes().all(|b| b.is_ascii_digit()) => Prop::Seq(index),
                    _ => Prop::Map(segment.to_string()),
                })
                .collect(),
        )
    }

    /// Extend the path by one property
    pub fn push<P: Into<Prop>>(mut self, prop: P) -> Self {
        self.0.push(prop.into());
        self
    }

    /// Split into the parent path and the last property
    pub fn split_last(&self) -> Option<(Path, &Prop)> {
        let (last, parent) = self.0.split_last()?;
        Some((Path(parent.to_vec()), last))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prop> {
        self.0.iter()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<Vec<Prop>> for Path {
    fn from(props: Vec<Prop>) -> Self {
        Path(props)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let segments: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        write!(f, "/{}", segments.join("/"))
    }
}

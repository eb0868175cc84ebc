use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::scene::NodeId;

/// Errors raised by scene graph operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),
    #[error("cannot attach {child:?} under its own descendant {parent:?}")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("the scene root cannot be re-parented")]
    RootAttach,
    #[error("scene node {0:?} has no camera projection")]
    NotACamera(NodeId),
}

#[derive(Debug, Clone)]
pub struct ViewError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<ViewCause>,
}

#[derive(Debug, Clone)]
pub enum ViewCause {
    View(Box<ViewError>),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl ViewError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_view(mut self, cause: ViewError) -> Self {
        self.causes.push(ViewCause::View(Box::new(cause)));
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(ViewCause::Std(Arc::new(cause)));
        self
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            ViewCause::View(e) => Some(e.as_ref() as &dyn std::error::Error),
            ViewCause::Std(e) => Some(e.as_ref()),
        })
    }
}

impl From<SceneError> for ViewError {
    fn from(err: SceneError) -> Self {
        ViewError::new("scene-error").push_std(err)
    }
}

impl From<confy::ConfyError> for ViewError {
    fn from(err: confy::ConfyError) -> Self {
        ViewError::new("confy-error").push_std(err)
    }
}

impl From<winit::error::EventLoopError> for ViewError {
    fn from(err: winit::error::EventLoopError) -> Self {
        ViewError::new("winit::error::EventLoopError").push_std(err)
    }
}

impl From<winit::error::OsError> for ViewError {
    fn from(err: winit::error::OsError) -> Self {
        ViewError::new("winit::error::OsError").push_std(err)
    }
}

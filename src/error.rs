// src/error.rs
//! Unified error handling for the focus telemetry pipeline
//!
//! Leaf modules define their own `thiserror` enums (`ConfigError`,
//! `VisionError`, `EnvelopeError`, `SinkError`). Anything that crosses a
//! component boundary is converted to [`FocusError`], which keeps the
//! original error as its source and records where the conversion happened.
//!
//! Only startup problems are expected to reach the caller. Once the run loop
//! is going, failures are logged and the loop keeps publishing.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// Unified error type for the entire pipeline
#[derive(Debug, Clone, Error)]
pub enum FocusError {
    /// Invalid or inconsistent configuration
    #[error("[CONFIG] Configuration error in {component}: {reason}")]
    Configuration {
        component: String,
        reason: String,
        context: ErrorContext,
    },

    /// Failure reported by one of the pipeline collaborators
    #[error("[{kind}] {cause}")]
    Component {
        kind: ComponentKind,
        #[source]
        cause: Arc<dyn Error + Send + Sync>,
        context: ErrorContext,
    },

    /// System-level errors (I/O and friends)
    #[error("[SYSTEM] {subsystem} error: {reason}")]
    System {
        subsystem: String,
        reason: String,
        context: ErrorContext,
    },
}

/// Which collaborator produced a [`FocusError::Component`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    ConfigLoader,
    Camera,
    Detector,
    Envelope,
    Transport,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::ConfigLoader => write!(f, "CONFIG-LOADER"),
            ComponentKind::Camera => write!(f, "CAMERA"),
            ComponentKind::Detector => write!(f, "DETECTOR"),
            ComponentKind::Envelope => write!(f, "ENVELOPE"),
            ComponentKind::Transport => write!(f, "TRANSPORT"),
        }
    }
}

/// Where an error was raised, plus free-form details
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub timestamp: SystemTime,
    pub component: String,
    pub operation: String,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
    pub additional_info: HashMap<String, String>,
}

impl ErrorContext {
    /// Context without a source location
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            component: component.to_string(),
            operation: operation.to_string(),
            file: None,
            line: None,
            additional_info: HashMap::new(),
        }
    }

    /// Context pinned to a source file and line; see [`error_context!`]
    pub fn with_location(component: &str, operation: &str, file: &'static str, line: u32) -> Self {
        let mut context = Self::new(component, operation);
        context.file = Some(file);
        context.line = Some(line);
        context
    }

    /// Attach one key/value detail
    pub fn add_info<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional_info.insert(key.into(), value.into());
        self
    }
}

/// `ErrorContext` at the call site
#[macro_export]
macro_rules! error_context {
    ($component:expr, $operation:expr) => {
        $crate::error::ErrorContext::with_location($component, $operation, file!(), line!())
    };
}

impl FocusError {
    /// Context attached when the error was raised
    pub fn context(&self) -> &ErrorContext {
        match self {
            FocusError::Configuration { context, .. }
            | FocusError::Component { context, .. }
            | FocusError::System { context, .. } => context,
        }
    }

    /// Collaborator kind, if this came from one
    pub fn component_kind(&self) -> Option<ComponentKind> {
        match self {
            FocusError::Component { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    fn component<E>(kind: ComponentKind, err: E, context: ErrorContext) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        FocusError::Component {
            kind,
            cause: Arc::new(err),
            context,
        }
    }
}

impl From<crate::config::ConfigError> for FocusError {
    fn from(err: crate::config::ConfigError) -> Self {
        FocusError::component(ComponentKind::ConfigLoader, err, error_context!("config", "load"))
    }
}

impl From<crate::vision::VisionError> for FocusError {
    fn from(err: crate::vision::VisionError) -> Self {
        let kind = match err {
            crate::vision::VisionError::ModelLoad { .. } => ComponentKind::Detector,
            _ => ComponentKind::Camera,
        };
        FocusError::component(kind, err, error_context!("vision", "acquire"))
    }
}

impl From<crate::telemetry::EnvelopeError> for FocusError {
    fn from(err: crate::telemetry::EnvelopeError) -> Self {
        FocusError::component(ComponentKind::Envelope, err, error_context!("telemetry", "seal"))
    }
}

impl From<crate::telemetry::SinkError> for FocusError {
    fn from(err: crate::telemetry::SinkError) -> Self {
        FocusError::component(ComponentKind::Transport, err, error_context!("telemetry", "publish"))
    }
}

/// Result type alias for pipeline operations
pub type FocusResult<T> = Result<T, FocusError>;

/// Builds configuration and system errors for one component/operation pair
pub struct FocusErrorBuilder {
    component: String,
    operation: String,
}

impl FocusErrorBuilder {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn configuration(self, reason: &str) -> FocusError {
        let context = ErrorContext::new(&self.component, &self.operation);
        FocusError::Configuration {
            component: self.component,
            reason: reason.to_string(),
            context,
        }
    }
}

/// Wrap any std error as [`FocusError::System`]
pub trait IntoFocusError<T> {
    fn focus_err(self, component: &str, operation: &str) -> FocusResult<T>;
}

impl<T, E> IntoFocusError<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn focus_err(self, component: &str, operation: &str) -> FocusResult<T> {
        self.map_err(|err| FocusError::System {
            subsystem: component.to_string(),
            reason: err.to_string(),
            context: ErrorContext::new(component, operation),
        })
    }
}

//! Toast notifications emitted by the controller

pub const SUCCESS_TITLE: &str = "Success";
pub const SUCCESS_MSG: &str = "Record Updates Succeeded!";
pub const ERROR_TITLE: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Error,
}

impl ToastVariant {
    pub fn as_str(&self) -> &str {
        match self {
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
        }
    }
}

/// A transient user-facing notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub variant: ToastVariant,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl Toast {
    pub fn new(title: &str, message: String, variant: ToastVariant) -> Self {
        Self {
            title: title.to_string(),
            message,
            variant,
            timestamp: chrono::Local::now(),
        }
    }

    pub fn update_success() -> Self {
        Self::new(SUCCESS_TITLE, SUCCESS_MSG.to_string(), ToastVariant::Success)
    }

    pub fn update_error(message: String) -> Self {
        Self::new(ERROR_TITLE, message, ToastVariant::Error)
    }

    pub fn is_error(&self) -> bool {
        self.variant == ToastVariant::Error
    }
}

/// Bounded queue of toasts: pending ones are drained by the UI, shown ones stay in history
#[derive(Debug, Default)]
pub struct Toasts {
    pending: Vec<Toast>,
    history: Vec<Toast>,
    max_history: usize,
}

impl Toasts {
    pub fn new(max_history: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: Vec::new(),
            max_history,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.pending.push(toast);
    }

    /// Take pending toasts, moving them into history
    pub fn drain(&mut self) -> Vec<Toast> {
        let drained = std::mem::take(&mut self.pending);
        self.history.extend(drained.iter().cloned());
        if self.history.len() > self.max_history {
            let excess = self.history.len() - self.max_history;
            self.history.drain(..excess);
        }
        drained
    }

    pub fn pending(&self) -> &[Toast] {
        &self.pending
    }

    pub fn history(&self) -> &[Toast] {
        &self.history
    }
}

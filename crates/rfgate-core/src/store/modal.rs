// ── Modal dialog stack ──
//
// Pending user-facing dialogs. Credential prompts live on their own stack
// so an auth challenge can interrupt whatever dialog is already showing
// and be dismissed without disturbing it.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use strum::{Display, EnumString};

/// Handler attached to a modal button or to dismissal.
pub type ModalHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalType {
    Info,
    Warning,
    Error,
    Confirm,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalClass {
    CredentialValidation,
    ServerDisconnected,
    ConfigUpload,
    FirmwareUpgrade,
    ApReboot,
    Help,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Modal {
    pub modal_type: ModalType,
    pub description: String,
    pub button_labels: Vec<String>,
    #[serde(skip)]
    pub button_on_clicks: Vec<ModalHandler>,
    /// Extra rendered content (markup identifier) shown under the text.
    pub node: Option<String>,
    pub modal_class: Option<ModalClass>,
    #[serde(skip)]
    pub callback: Option<ModalHandler>,
}

impl Modal {
    pub fn new(modal_type: ModalType, description: impl Into<String>) -> Self {
        Self {
            modal_type,
            description: description.into(),
            button_labels: Vec::new(),
            button_on_clicks: Vec::new(),
            node: None,
            modal_class: None,
            callback: None,
        }
    }

    pub fn with_buttons(mut self, labels: Vec<String>, on_clicks: Vec<ModalHandler>) -> Self {
        self.button_labels = labels;
        self.button_on_clicks = on_clicks;
        self
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_class(mut self, class: ModalClass) -> Self {
        self.modal_class = Some(class);
        self
    }

    /// Runs when the modal is dismissed.
    pub fn with_callback(mut self, callback: ModalHandler) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Invoke the handler bound to button `index`, if any.
    pub fn click(&self, index: usize) -> bool {
        match self.button_on_clicks.get(index) {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    fn is_credential(&self) -> bool {
        self.modal_class == Some(ModalClass::CredentialValidation)
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("modal_type", &self.modal_type)
            .field("description", &self.description)
            .field("button_labels", &self.button_labels)
            .field("node", &self.node)
            .field("modal_class", &self.modal_class)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalStack {
    stack: Vec<Modal>,
    credential_stack: Vec<Modal>,
}

impl ModalStack {
    pub fn push(&mut self, modal: Modal) {
        if modal.is_credential() {
            self.credential_stack.push(modal);
        } else {
            self.stack.push(modal);
        }
    }

    /// The dialog on screen: credential prompts win.
    pub fn current(&self) -> Option<&Modal> {
        self.credential_stack.last().or_else(|| self.stack.last())
    }

    /// Pop the visible modal. With a class, pop only if the top of the
    /// matching stack has that class. Runs the dismissed modal's callback.
    pub fn dismiss(&mut self, class: Option<ModalClass>) -> Option<Modal> {
        let popped = match class {
            Some(ModalClass::CredentialValidation) => self.credential_stack.pop(),
            Some(class) => {
                if self.stack.last().and_then(|m| m.modal_class) == Some(class) {
                    self.stack.pop()
                } else {
                    None
                }
            }
            None => self.credential_stack.pop().or_else(|| self.stack.pop()),
        };
        if let Some(callback) = popped.as_ref().and_then(|m| m.callback.as_ref()) {
            callback();
        }
        popped
    }

    /// Remove every modal of `class` from both stacks. Returns how many.
    pub fn dismiss_any(&mut self, class: ModalClass) -> usize {
        let before = self.len();
        self.stack.retain(|m| m.modal_class != Some(class));
        self.credential_stack.retain(|m| m.modal_class != Some(class));
        before - self.len()
    }

    pub fn is_any(&self, class: ModalClass) -> bool {
        self.stack
            .iter()
            .chain(&self.credential_stack)
            .any(|m| m.modal_class == Some(class))
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.credential_stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len() + self.credential_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

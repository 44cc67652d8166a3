//! Outgoing chat messages.
use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use crate::keyboard::Keyboard;

pub type MessageId = u64;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("message {0} cannot be edited")]
    UnknownMessage(MessageId),
}

/// Delivers text, captioned images and button rows to a user.
#[async_trait::async_trait]
pub trait MessagingSink: Send + Sync {
    async fn send_text(
        &self,
        user_id: u64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError>;

    /// Send an illustration with `caption`. Sinks fall back to plain text
    /// when the image for `image_key` is unavailable.
    async fn send_image(
        &self,
        user_id: u64,
        image_key: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError>;

    async fn edit_text(
        &self,
        user_id: u64,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Short transient notice, such as the answer to a stale button press.
    async fn notify(&self, user_id: u64, text: &str) -> Result<(), TransportError>;
}

/// Prints the conversation to stdout.
#[derive(Debug)]
pub struct ConsoleSink {
    image_root: Option<PathBuf>,
    next_id: AtomicU64,
    last_keyboard: AtomicU64,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(image_root: Option<PathBuf>) -> Self {
        Self {
            image_root,
            next_id: AtomicU64::new(1),
            last_keyboard: AtomicU64::new(0),
        }
    }

    /// Id of the most recent message that showed buttons.
    pub fn last_keyboard_message(&self) -> MessageId {
        self.last_keyboard.load(Ordering::Relaxed)
    }

    fn allocate(&self, keyboard: Option<&Keyboard>) -> MessageId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if keyboard.is_some() {
            self.last_keyboard.store(id, Ordering::Relaxed);
        }
        id
    }

    fn image_path(&self, image_key: &str) -> Option<PathBuf> {
        let path = self.image_root.as_ref()?.join(format!("{image_key}.jpg"));
        path.is_file().then_some(path)
    }

    fn print_keyboard(keyboard: Option<&Keyboard>) {
        let Some(keyboard) = keyboard else {
            return;
        };
        for row in &keyboard.rows {
            let line: Vec<String> = row
                .iter()
                .map(|button| {
                    format!(
                        "[{}] {}",
                        button.label.bold(),
                        format!("!{}", button.callback).dimmed()
                    )
                })
                .collect();
            println!("    {}", line.join("  "));
        }
    }
}

#[async_trait::async_trait]
impl MessagingSink for ConsoleSink {
    async fn send_text(
        &self,
        _user_id: u64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        let id = self.allocate(keyboard);
        println!("{} {text}", format!("#{id}").cyan());
        Self::print_keyboard(keyboard);
        Ok(id)
    }

    async fn send_image(
        &self,
        user_id: u64,
        image_key: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        match self.image_path(image_key) {
            Some(path) => {
                let id = self.allocate(keyboard);
                let label = format!("[image {}]", path.display());
                println!("{} {}", format!("#{id}").cyan(), label.magenta());
                println!("{caption}");
                Self::print_keyboard(keyboard);
                Ok(id)
            }
            None => {
                log::debug!("image {image_key} unavailable; sending text");
                self.send_text(user_id, caption, keyboard).await
            }
        }
    }

    async fn edit_text(
        &self,
        _user_id: u64,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        if message_id == 0 || message_id >= self.next_id.load(Ordering::Relaxed) {
            return Err(TransportError::UnknownMessage(message_id));
        }
        if keyboard.is_some() {
            self.last_keyboard.store(message_id, Ordering::Relaxed);
        }
        println!("{} {text}", format!("#{message_id} (edited)").cyan());
        Self::print_keyboard(keyboard);
        Ok(())
    }

    async fn notify(&self, _user_id: u64, text: &str) -> Result<(), TransportError> {
        println!("{}", text.yellow());
        Ok(())
    }
}

/// One message captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub user_id: u64,
    pub message_id: MessageId,
    pub text: String,
    pub image_key: Option<String>,
    pub keyboard: Option<Keyboard>,
    pub edited: bool,
    pub notice: bool,
}

/// Captures every outgoing message in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<Recorded>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Recorded> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn messages_for(&self, user_id: u64) -> Vec<Recorded> {
        self.messages()
            .into_iter()
            .filter(|message| message.user_id == user_id)
            .collect()
    }

    /// Latest message for `user_id` that carries buttons.
    #[must_use]
    pub fn last_keyboard(&self, user_id: u64) -> Option<(MessageId, Keyboard)> {
        self.messages_for(user_id)
            .into_iter()
            .rev()
            .find_map(|message| message.keyboard.map(|keyboard| (message.message_id, keyboard)))
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }

    fn record(&self, mut message: Recorded) -> Result<MessageId, TransportError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("recording sink is offline".into()));
        }
        if message.message_id == 0 {
            message.message_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        }
        let id = message.message_id;
        self.messages
            .lock()
            .map_err(|_| TransportError::Unavailable("recording sink poisoned".into()))?
            .push(message);
        Ok(id)
    }
}

#[async_trait::async_trait]
impl MessagingSink for RecordingSink {
    async fn send_text(
        &self,
        user_id: u64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        self.record(Recorded {
            user_id,
            message_id: 0,
            text: text.to_string(),
            image_key: None,
            keyboard: keyboard.cloned(),
            edited: false,
            notice: false,
        })
    }

    async fn send_image(
        &self,
        user_id: u64,
        image_key: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, TransportError> {
        self.record(Recorded {
            user_id,
            message_id: 0,
            text: caption.to_string(),
            image_key: Some(image_key.to_string()),
            keyboard: keyboard.cloned(),
            edited: false,
            notice: false,
        })
    }

    async fn edit_text(
        &self,
        user_id: u64,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.record(Recorded {
            user_id,
            message_id,
            text: text.to_string(),
            image_key: None,
            keyboard: keyboard.cloned(),
            edited: true,
            notice: false,
        })
        .map(|_| ())
    }

    async fn notify(&self, user_id: u64, text: &str) -> Result<(), TransportError> {
        self.record(Recorded {
            user_id,
            message_id: 0,
            text: text.to_string(),
            image_key: None,
            keyboard: None,
            edited: false,
            notice: true,
        })
        .map(|_| ())
    }
}

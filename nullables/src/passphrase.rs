//! Nullable passphrase provider: scripted answers, recorded requests.

use std::collections::VecDeque;
use std::sync::Mutex;

use itc_wallet_core::{PassphraseProvider, WalletError};
use zeroize::Zeroizing;

/// Answers with scripted passphrases in order and records each request's purpose.
///
/// Running out of answers fails with an authentication error, like a user giving up
/// at the prompt.
#[derive(Default)]
pub struct NullPassphrases {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl NullPassphrases {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// The purposes passphrases were requested for, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PassphraseProvider for NullPassphrases {
    fn passphrase(&self, purpose: &str) -> Result<Zeroizing<String>, WalletError> {
        self.asked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(purpose.to_string());
        self.answers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .map(Zeroizing::new)
            .ok_or(WalletError::Authentication)
    }
}

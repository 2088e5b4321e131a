// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Interactive display-name editing.
//!
//! ```text
//! Closed --open--> Editing --save--> Submitting --ok--> Closed
//!                     ^                   |
//!                     +------error--------+
//! ```
//!
//! Failures keep the editor open with the draft and an error message so the
//! user can retry. Users without a bound name must confirm before the editor
//! discards their draft.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::binder::{normalize_name, IdentityBinder};
use super::{now_millis, SigningGate};
use crate::blockchain::MessageSigner;
use crate::error::IdentityError;
use crate::models::WalletAddress;
use crate::storage::{KeyValueStore, SignedBinding};

/// What the rename dialog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    Editing {
        draft: String,
        /// A cancel is waiting for the user to confirm the discard.
        confirming_discard: bool,
        /// Message from the last failed save.
        error: Option<String>,
    },
    /// Signature prompt open for `draft`.
    Submitting { draft: String },
}

impl EditorState {
    fn editing(draft: String, error: Option<String>) -> Self {
        EditorState::Editing {
            draft,
            confirming_discard: false,
            error,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, EditorState::Closed)
    }
}

/// Result of [`NameEditor::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Closed,
    /// No name is bound yet; call [`NameEditor::confirm_discard`] to close.
    ConfirmationRequired,
    /// A save is in flight and cannot be cancelled from the dialog.
    Busy,
}

pub struct NameEditor<S: KeyValueStore> {
    binder: IdentityBinder<S>,
    gate: SigningGate,
    state: watch::Sender<EditorState>,
    has_bound_name: AtomicBool,
}

impl<S: KeyValueStore> NameEditor<S> {
    pub fn new(binder: IdentityBinder<S>, gate: SigningGate) -> Self {
        let (state, _) = watch::channel(EditorState::Closed);
        Self {
            binder,
            gate,
            state,
            has_bound_name: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EditorState> {
        self.state.subscribe()
    }

    /// Open the editor seeded with the currently bound name.
    ///
    /// Refused while another signature prompt (login attestation or a save)
    /// is pending for this session.
    pub fn open(&self, current_name: Option<&str>) -> Result<(), IdentityError> {
        if self.gate.try_lock().is_err() {
            return Err(IdentityError::SigningInProgress);
        }
        if matches!(*self.state.borrow(), EditorState::Submitting { .. }) {
            return Err(IdentityError::SigningInProgress);
        }

        self.has_bound_name
            .store(current_name.is_some(), Ordering::Relaxed);
        self.state.send_replace(EditorState::editing(
            current_name.unwrap_or_default().to_string(),
            None,
        ));
        Ok(())
    }

    /// Replace the draft text. Clears any previous error.
    pub fn set_draft(&self, text: &str) {
        self.state.send_if_modified(|state| match state {
            EditorState::Editing { .. } => {
                *state = EditorState::editing(text.to_string(), None);
                true
            }
            _ => false,
        });
    }

    /// Ask to close without saving.
    pub fn cancel(&self) -> CancelOutcome {
        let has_bound_name = self.has_bound_name.load(Ordering::Relaxed);
        let mut outcome = CancelOutcome::Closed;
        self.state.send_if_modified(|state| match state {
            EditorState::Closed => false,
            EditorState::Submitting { .. } => {
                outcome = CancelOutcome::Busy;
                false
            }
            EditorState::Editing { .. } if has_bound_name => {
                *state = EditorState::Closed;
                true
            }
            EditorState::Editing {
                confirming_discard, ..
            } => {
                outcome = CancelOutcome::ConfirmationRequired;
                let changed = !*confirming_discard;
                *confirming_discard = true;
                changed
            }
        });
        outcome
    }

    /// Close after a cancel asked for confirmation.
    pub fn confirm_discard(&self) -> bool {
        self.state.send_if_modified(|state| {
            let confirming = matches!(
                state,
                EditorState::Editing {
                    confirming_discard: true,
                    ..
                }
            );
            if confirming {
                *state = EditorState::Closed;
            }
            confirming
        })
    }

    /// Dismiss the discard confirmation and keep editing.
    pub fn keep_editing(&self) {
        self.state.send_if_modified(|state| match state {
            EditorState::Editing {
                confirming_discard, ..
            } if *confirming_discard => {
                *confirming_discard = false;
                true
            }
            _ => false,
        });
    }

    /// Sign and store `raw_name` for `address`.
    ///
    /// On success the editor closes. On failure it stays open with the draft
    /// and the error. If `cancel` fires while the prompt is open the editor
    /// returns to editing and [`IdentityError::Abandoned`] is returned.
    pub async fn save<W: MessageSigner>(
        &self,
        raw_name: &str,
        address: &WalletAddress,
        signer: Option<&W>,
        cancel: &CancellationToken,
    ) -> Result<SignedBinding, IdentityError> {
        let mut refusal = None;
        self.state.send_if_modified(|state| match state {
            EditorState::Editing { .. } => {
                *state = EditorState::Submitting {
                    draft: raw_name.to_string(),
                };
                true
            }
            EditorState::Submitting { .. } => {
                refusal = Some(IdentityError::SigningInProgress);
                false
            }
            EditorState::Closed => {
                refusal = Some(IdentityError::EditorClosed);
                false
            }
        });
        if let Some(err) = refusal {
            return Err(err);
        }

        if let Err(err) = normalize_name(raw_name, self.binder.max_name_length()) {
            self.settle(EditorState::editing(raw_name.to_string(), Some(err.to_string())));
            return Err(err);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(IdentityError::Abandoned),
            result = async {
                let _guard = self.gate.lock().await;
                self.binder.bind(raw_name, address, now_millis(), signer).await
            } => result,
        };

        match result {
            Ok(binding) => {
                self.has_bound_name.store(true, Ordering::Relaxed);
                self.settle(EditorState::Closed);
                Ok(binding)
            }
            Err(IdentityError::Abandoned) => {
                info!(address = %address, "Name change abandoned");
                self.settle(EditorState::editing(raw_name.to_string(), None));
                Err(IdentityError::Abandoned)
            }
            Err(err) => {
                debug!(address = %address, error = %err, "Name change failed");
                self.settle(EditorState::editing(raw_name.to_string(), Some(err.to_string())));
                Err(err)
            }
        }
    }

    /// Close unconditionally, e.g. when the wallet disconnects.
    pub fn close(&self) {
        self.has_bound_name.store(false, Ordering::Relaxed);
        self.state.send_replace(EditorState::Closed);
    }

    /// Leave `Submitting`. No-op if the editor was closed meanwhile.
    fn settle(&self, next: EditorState) {
        self.state.send_if_modified(|state| {
            let submitting = matches!(state, EditorState::Submitting { .. });
            if submitting {
                *state = next;
            }
            submitting
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identity::signing_gate;
    use crate::storage::InMemoryStore;
    use crate::testing::ScriptedSigner;
    use tokio::sync::Notify;

    fn editor() -> (IdentityBinder<InMemoryStore>, NameEditor<InMemoryStore>) {
        let binder = IdentityBinder::new(Arc::new(InMemoryStore::new()));
        let editor = NameEditor::new(binder.clone(), signing_gate());
        (binder, editor)
    }

    fn draft_of(state: &EditorState) -> Option<&str> {
        match state {
            EditorState::Editing { draft, .. } | EditorState::Submitting { draft } => Some(draft),
            EditorState::Closed => None,
        }
    }

    #[test]
    fn open_seeds_draft() {
        let (_, editor) = editor();
        editor.open(Some("Alice")).unwrap();
        assert_eq!(draft_of(&editor.state()), Some("Alice"));

        editor.close();
        editor.open(None).unwrap();
        assert_eq!(draft_of(&editor.state()), Some(""));
    }

    #[test]
    fn first_run_cancel_requires_confirmation() {
        let (_, editor) = editor();
        editor.open(None).unwrap();

        assert_eq!(editor.cancel(), CancelOutcome::ConfirmationRequired);
        assert!(editor.state().is_open());

        editor.keep_editing();
        assert!(!editor.confirm_discard());
        assert!(editor.state().is_open());

        assert_eq!(editor.cancel(), CancelOutcome::ConfirmationRequired);
        assert!(editor.confirm_discard());
        assert_eq!(editor.state(), EditorState::Closed);
    }

    #[test]
    fn cancel_with_bound_name_closes_immediately() {
        let (_, editor) = editor();
        editor.open(Some("Alice")).unwrap();
        assert_eq!(editor.cancel(), CancelOutcome::Closed);
        assert_eq!(editor.state(), EditorState::Closed);
    }

    #[tokio::test]
    async fn open_refused_while_gate_held() {
        let gate = signing_gate();
        let editor = NameEditor::new(
            IdentityBinder::new(Arc::new(InMemoryStore::new())),
            Arc::clone(&gate),
        );

        let guard = gate.lock().await;
        assert!(matches!(editor.open(None), Err(IdentityError::SigningInProgress)));
        drop(guard);
        assert!(editor.open(None).is_ok());
    }

    #[tokio::test]
    async fn successful_save_closes_and_persists() {
        let (binder, editor) = editor();
        let signer = ScriptedSigner::new();
        editor.open(None).unwrap();

        let binding = editor
            .save("  Alice ", &signer.address(), Some(&signer), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(binding.name, "Alice");
        assert_eq!(editor.state(), EditorState::Closed);
        assert_eq!(
            binder.display_name(&signer.address()).unwrap().as_deref(),
            Some("Alice")
        );
    }

    #[tokio::test]
    async fn empty_name_keeps_editor_open_without_prompt() {
        let (_, editor) = editor();
        let signer = ScriptedSigner::new();
        editor.open(Some("Alice")).unwrap();

        let err = editor
            .save("   ", &signer.address(), Some(&signer), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, IdentityError::EmptyName));
        assert!(signer.requests().is_empty());
        assert!(matches!(
            editor.state(),
            EditorState::Editing { error: Some(_), .. }
        ));
    }

    #[tokio::test]
    async fn declined_save_keeps_draft_and_error() {
        let (binder, editor) = editor();
        let signer = ScriptedSigner::rejecting();
        editor.open(None).unwrap();

        let err = editor
            .save("Alice", &signer.address(), Some(&signer), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(
            editor.state(),
            EditorState::Editing {
                draft: "Alice".to_string(),
                confirming_discard: false,
                error: Some(err.to_string()),
            }
        );
        assert!(binder.load(&signer.address()).unwrap().is_none());
    }

    #[tokio::test]
    async fn typing_clears_previous_error() {
        let (_, editor) = editor();
        let signer = ScriptedSigner::rejecting();
        editor.open(None).unwrap();
        editor
            .save("Alice", &signer.address(), Some(&signer), &CancellationToken::new())
            .await
            .unwrap_err();

        editor.set_draft("Alicia");
        assert_eq!(
            editor.state(),
            EditorState::Editing {
                draft: "Alicia".to_string(),
                confirming_discard: false,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn save_requires_open_editor() {
        let (_, editor) = editor();
        let signer = ScriptedSigner::new();
        let err = editor
            .save("Alice", &signer.address(), Some(&signer), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EditorClosed));
    }

    #[tokio::test]
    async fn abandoned_save_returns_to_editing() {
        let (binder, editor) = editor();
        let signer = ScriptedSigner::holding(Arc::new(Notify::new()));
        let cancel = CancellationToken::new();
        editor.open(None).unwrap();
        let mut rx = editor.subscribe();

        let cancel_while_submitting = async {
            while rx.changed().await.is_ok() {
                if matches!(*rx.borrow_and_update(), EditorState::Submitting { .. }) {
                    assert_eq!(editor.cancel(), CancelOutcome::Busy);
                    cancel.cancel();
                    break;
                }
            }
        };
        let address = signer.address();
        let (result, ()) = tokio::join!(
            editor.save("Alice", &address, Some(&signer), &cancel),
            cancel_while_submitting
        );

        assert!(matches!(result, Err(IdentityError::Abandoned)));
        assert_eq!(draft_of(&editor.state()), Some("Alice"));
        assert!(binder.load(&signer.address()).unwrap().is_none());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-wallet-profile session.
//!
//! Owns the store handle, the signing gate and the identity flows for one
//! connected wallet at a time. Dropping the session abandons every pending
//! signature prompt.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::blockchain::MessageSigner;
use crate::error::IdentityError;
use crate::identity::{
    signing_gate, CancelOutcome, EditorState, IdentityBinder, LoginAttestor, LoginStatus,
    NameEditor,
};
use crate::models::WalletAddress;
use crate::storage::{KeyValueStore, SignedBinding};

pub struct Session<S: KeyValueStore> {
    binder: IdentityBinder<S>,
    login: LoginAttestor<S>,
    editor: NameEditor<S>,
    shutdown: CancellationToken,
    /// Cancelled when the current wallet disconnects.
    connection: Mutex<CancellationToken>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_binder(IdentityBinder::new(store.clone()), store)
    }

    /// Session with a non-default display name length limit.
    pub fn with_max_name_length(store: Arc<S>, max_name_length: usize) -> Self {
        let binder = IdentityBinder::new(store.clone()).with_max_name_length(max_name_length);
        Self::with_binder(binder, store)
    }

    fn with_binder(binder: IdentityBinder<S>, store: Arc<S>) -> Self {
        let gate = signing_gate();
        let shutdown = CancellationToken::new();
        Self {
            login: LoginAttestor::new(store, binder.clone(), Arc::clone(&gate)),
            editor: NameEditor::new(binder.clone(), gate),
            binder,
            connection: Mutex::new(shutdown.child_token()),
            shutdown,
        }
    }

    pub fn binder(&self) -> &IdentityBinder<S> {
        &self.binder
    }

    pub fn login(&self) -> &LoginAttestor<S> {
        &self.login
    }

    pub fn editor(&self) -> &NameEditor<S> {
        &self.editor
    }

    pub fn status(&self) -> LoginStatus {
        self.login.status()
    }

    /// Verified display name of the connected wallet.
    pub fn display_name(&self) -> Option<String> {
        self.login.status().display_name().map(str::to_string)
    }

    /// Wallet connected (or switched) to `address`.
    pub async fn connect<W: MessageSigner>(
        &self,
        address: WalletAddress,
        signer: Option<&W>,
    ) -> Result<LoginStatus, IdentityError> {
        if let Some(previous) = self.login.status().address() {
            if !previous.same_as(&address) {
                self.disconnect();
            }
        }
        let connection = self.connection_token();
        self.login.on_connected(address, signer, &connection).await
    }

    /// Wallet disconnected: abandon prompts, close the editor, forget the name.
    pub fn disconnect(&self) {
        if let Ok(mut connection) = self.connection.lock() {
            connection.cancel();
            *connection = self.shutdown.child_token();
        }
        self.editor.close();
        self.login.on_disconnected();
    }

    /// Open the rename dialog for the connected wallet, attested or not.
    ///
    /// The draft is seeded from the verified binding in storage.
    pub fn open_name_editor(&self) -> Result<(), IdentityError> {
        let address = self
            .login
            .status()
            .address()
            .cloned()
            .ok_or(crate::error::SigningError::Unavailable)?;
        let current = self.binder.display_name(&address)?;
        self.editor.open(current.as_deref())
    }

    pub fn editor_state(&self) -> EditorState {
        self.editor.state()
    }

    pub fn cancel_name_edit(&self) -> CancelOutcome {
        self.editor.cancel()
    }

    pub fn confirm_discard(&self) -> bool {
        self.editor.confirm_discard()
    }

    /// Sign and store a new display name for the connected wallet.
    pub async fn save_name<W: MessageSigner>(
        &self,
        name: &str,
        signer: Option<&W>,
    ) -> Result<SignedBinding, IdentityError> {
        let address = self
            .login
            .status()
            .address()
            .cloned()
            .ok_or(crate::error::SigningError::Unavailable)?;
        let connection = self.connection_token();

        let binding = self.editor.save(name, &address, signer, &connection).await?;
        self.login.set_display_name(Some(binding.name.clone()));
        Ok(binding)
    }

    /// Token cancelled when the current connection ends.
    pub fn connection_token(&self) -> CancellationToken {
        self.connection
            .lock()
            .map(|token| token.clone())
            .unwrap_or_else(|_| self.shutdown.child_token())
    }

    /// Token whose cancellation abandons every prompt of this session.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Abandon everything in flight; the session is unusable afterwards.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.editor.close();
        self.login.on_disconnected();
    }
}

impl<S: KeyValueStore> Drop for Session<S> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

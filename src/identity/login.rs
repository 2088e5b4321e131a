// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login attestation.
//!
//! The first time an address connects, the wallet is asked to sign a fixed
//! login message and the result is stored under `login_<address>`. Later
//! connections find the record and go straight to `Attested`. A declined
//! prompt leaves the address `Unattested` until the next connection event;
//! it is never retried automatically.
//!
//! Attestations are informational. They are not re-verified on read and
//! grant nothing.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::binder::IdentityBinder;
use super::message::login_message;
use super::signature::{request_signature, verify};
use super::{now_millis, SigningGate};
use crate::blockchain::MessageSigner;
use crate::error::IdentityError;
use crate::models::WalletAddress;
use crate::storage::{AttestationRepository, KeyValueStore, LoginAttestation};

/// Login state of the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    Disconnected,
    /// Connected, no stored attestation. Name bindings still resolve.
    Unattested {
        address: WalletAddress,
        display_name: Option<String>,
    },
    /// Connected, login prompt open in the wallet. Still unattested.
    Attesting { address: WalletAddress },
    /// Connected with a stored attestation.
    Attested {
        address: WalletAddress,
        display_name: Option<String>,
    },
}

impl LoginStatus {
    /// Connected address, if any.
    pub fn address(&self) -> Option<&WalletAddress> {
        match self {
            LoginStatus::Disconnected => None,
            LoginStatus::Unattested { address, .. }
            | LoginStatus::Attesting { address }
            | LoginStatus::Attested { address, .. } => Some(address),
        }
    }

    pub fn is_attested(&self) -> bool {
        matches!(self, LoginStatus::Attested { .. })
    }

    /// Verified display name of the connected wallet.
    ///
    /// Not resolved while the login prompt is open.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            LoginStatus::Unattested { display_name, .. }
            | LoginStatus::Attested { display_name, .. } => display_name.as_deref(),
            LoginStatus::Disconnected | LoginStatus::Attesting { .. } => None,
        }
    }
}

impl LoginAttestation {
    /// Whether `signature` over `message` recovers to `address`.
    pub fn verify(&self) -> bool {
        verify(&self.message, &self.signature, &self.address)
    }
}

/// Reacts to wallet connection events and records login attestations.
pub struct LoginAttestor<S: KeyValueStore> {
    store: Arc<S>,
    binder: IdentityBinder<S>,
    gate: SigningGate,
    status: watch::Sender<LoginStatus>,
    /// Cancelled when the current connection ends.
    connection: Mutex<Option<CancellationToken>>,
}

impl<S: KeyValueStore> LoginAttestor<S> {
    pub fn new(store: Arc<S>, binder: IdentityBinder<S>, gate: SigningGate) -> Self {
        let (status, _) = watch::channel(LoginStatus::Disconnected);
        Self {
            store,
            binder,
            gate,
            status,
            connection: Mutex::new(None),
        }
    }

    pub fn status(&self) -> LoginStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginStatus> {
        self.status.subscribe()
    }

    /// Handle a wallet connecting as `address`.
    ///
    /// Prompts for the login signature only when no attestation is stored.
    /// Abandons the prompt, returning [`IdentityError::Abandoned`], if
    /// `cancel` fires or the wallet disconnects first.
    pub async fn on_connected<W: MessageSigner>(
        &self,
        address: WalletAddress,
        signer: Option<&W>,
        cancel: &CancellationToken,
    ) -> Result<LoginStatus, IdentityError> {
        let connection = self.begin_connection(cancel);
        self.set(LoginStatus::Unattested {
            address: address.clone(),
            display_name: self.resolve_name(&address),
        });

        let repo = AttestationRepository::new(&*self.store);
        if repo.exists(&address)? {
            debug!(address = %address, "Login attestation already stored");
            return Ok(self.attested(address));
        }

        let result = tokio::select! {
            biased;
            _ = connection.cancelled() => Err(IdentityError::Abandoned),
            result = self.attest(&address, signer) => result,
        };

        match result {
            Ok(()) => Ok(self.attested(address)),
            Err(err) => {
                match &err {
                    IdentityError::Abandoned => {
                        info!(address = %address, "Login attestation abandoned")
                    }
                    e if e.is_rejection() => {
                        info!(address = %address, "Login attestation declined")
                    }
                    e => warn!(address = %address, error = %e, "Login attestation failed"),
                }
                // A disconnect during the prompt already moved to Disconnected.
                let display_name = self.resolve_name(&address);
                self.status.send_if_modified(|status| {
                    let attesting = matches!(
                        status,
                        LoginStatus::Attesting { address: current } if current.same_as(&address)
                    );
                    if attesting {
                        *status = LoginStatus::Unattested {
                            address: address.clone(),
                            display_name,
                        };
                    }
                    attesting
                });
                Err(err)
            }
        }
    }

    async fn attest<W: MessageSigner>(
        &self,
        address: &WalletAddress,
        signer: Option<&W>,
    ) -> Result<(), IdentityError> {
        let _guard = self.gate.lock().await;
        self.set(LoginStatus::Attesting {
            address: address.clone(),
        });

        let message = login_message(address);
        let signature = request_signature(&message, signer).await?;

        AttestationRepository::new(&*self.store).put(&LoginAttestation {
            address: address.clone(),
            signature,
            message,
            timestamp: now_millis(),
        })?;
        info!(address = %address, "Login attested");
        Ok(())
    }

    /// Handle the wallet disconnecting. Abandons any open login prompt.
    pub fn on_disconnected(&self) {
        if let Some(token) = self.take_connection() {
            token.cancel();
        }
        self.set(LoginStatus::Disconnected);
        debug!("Wallet disconnected");
    }

    /// Replace the display name shown for the connected wallet.
    pub fn set_display_name(&self, name: Option<String>) {
        self.status.send_if_modified(|status| match status {
            LoginStatus::Unattested { display_name, .. }
            | LoginStatus::Attested { display_name, .. } => {
                *display_name = name;
                true
            }
            _ => false,
        });
    }

    /// Verified bound name; storage failures degrade to no name.
    fn resolve_name(&self, address: &WalletAddress) -> Option<String> {
        match self.binder.display_name(address) {
            Ok(name) => name,
            Err(e) => {
                warn!(address = %address, error = %e, "Failed to resolve display name");
                None
            }
        }
    }

    fn attested(&self, address: WalletAddress) -> LoginStatus {
        let display_name = self.resolve_name(&address);
        let status = LoginStatus::Attested {
            address,
            display_name,
        };
        self.set(status.clone());
        status
    }

    fn begin_connection(&self, cancel: &CancellationToken) -> CancellationToken {
        let token = cancel.child_token();
        let previous = self
            .connection
            .lock()
            .map(|mut slot| slot.replace(token.clone()))
            .unwrap_or_default();
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    fn take_connection(&self) -> Option<CancellationToken> {
        self.connection.lock().ok().and_then(|mut slot| slot.take())
    }

    fn set(&self, status: LoginStatus) {
        self.status.send_replace(status);
    }
}

//! Session state: credential, profile and derived artifacts.
//!
//! `SessionState` mirrors the external authentication collaborator's view
//! (`currentCredential`, `currentProfile`, `isProfileLoading`) and derives
//! the per-session artifacts the gate consults. It never decodes the
//! credential: token lifetime validation belongs to the server, which
//! avoids clock-skew false-logouts on the client.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::crypto::{generate_token, ANTI_FORGERY_TOKEN_LENGTH, SESSION_ID_LENGTH};
use crate::events::{dispatch, GateEvent};
use crate::secret::SecretString;
use crate::store::DurableStore;

/// Well-known store key the credential is mirrored under.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// The authenticated principal, as last fetched from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub is_active: bool,
    pub is_admin: bool,
    /// Arbitrary extra attributes the backend attaches to the principal.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Profile {
    /// Creates an active, non-admin profile with no extra attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_active: true,
            is_admin: false,
            attributes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Computed security posture of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityLevel {
    Low,
    Medium,
    High,
}

/// Derived, non-persisted values regenerated whenever credential and
/// profile are both present. Lost on reload by design.
#[derive(Debug, Clone)]
pub struct SessionArtifacts {
    pub anti_forgery_token: String,
    pub session_id: String,
    pub security_level: SecurityLevel,
}

impl SessionArtifacts {
    fn derive(profile: &Profile) -> Self {
        let security_level = if profile.is_admin {
            SecurityLevel::High
        } else if profile.is_active {
            SecurityLevel::Medium
        } else {
            SecurityLevel::Low
        };

        Self {
            anti_forgery_token: generate_token(ANTI_FORGERY_TOKEN_LENGTH),
            session_id: generate_token(SESSION_ID_LENGTH),
            security_level,
        }
    }
}

#[derive(Default)]
struct SessionInner {
    credential: Option<SecretString>,
    profile: Option<Profile>,
    artifacts: Option<SessionArtifacts>,
    profile_loading: bool,
}

impl SessionInner {
    /// Regenerates artifacts when both halves are present, clears them
    /// when either is absent. Returns true if fresh artifacts were made.
    fn refresh_artifacts(&mut self) -> bool {
        match (&self.credential, &self.profile) {
            (Some(_), Some(profile)) => {
                self.artifacts = Some(SessionArtifacts::derive(profile));
                true
            }
            _ => {
                self.artifacts = None;
                false
            }
        }
    }
}

/// Holds the current credential, profile and derived session artifacts.
///
/// Cloning yields another handle onto the same state. All setters are
/// total: storage writes are best-effort and failures are logged, never
/// propagated.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<RwLock<SessionInner>>,
    store: Arc<dyn DurableStore>,
}

impl SessionState {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner::default())),
            store,
        }
    }

    /// Sets or clears the bearer credential.
    ///
    /// The raw token is mirrored to the durable store under
    /// [`AUTH_TOKEN_KEY`]; clearing the credential erases that key.
    pub async fn set_credential(&self, credential: Option<SecretString>) {
        let (established, principal_id) = {
            let Ok(mut inner) = self.inner.write() else {
                log::warn!(target: "gatehouse::session", "session lock poisoned, dropping credential update");
                return;
            };
            inner.credential = credential.clone();
            let established = inner.refresh_artifacts();
            (established, inner.profile.as_ref().map(|p| p.id.clone()))
        };

        let write = match &credential {
            Some(token) => self.store.put(AUTH_TOKEN_KEY, token.expose_secret()).await,
            None => self.store.remove(AUTH_TOKEN_KEY).await,
        };
        if let Err(e) = write {
            log::warn!(target: "gatehouse::session", "credential mirror write failed: {e}");
        }

        if established {
            dispatch(GateEvent::SessionEstablished {
                principal_id: principal_id.unwrap_or_default(),
                at: Utc::now(),
            })
            .await;
        }
    }

    /// Sets or clears the profile.
    pub async fn set_profile(&self, profile: Option<Profile>) {
        let (established, principal_id) = {
            let Ok(mut inner) = self.inner.write() else {
                log::warn!(target: "gatehouse::session", "session lock poisoned, dropping profile update");
                return;
            };
            inner.profile = profile;
            let established = inner.refresh_artifacts();
            (established, inner.profile.as_ref().map(|p| p.id.clone()))
        };

        if established {
            dispatch(GateEvent::SessionEstablished {
                principal_id: principal_id.unwrap_or_default(),
                at: Utc::now(),
            })
            .await;
        }
    }

    /// Mirrors the external collaborator's profile-loading flag.
    pub fn set_profile_loading(&self, loading: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.profile_loading = loading;
        }
    }

    pub fn is_profile_loading(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.profile_loading)
            .unwrap_or(false)
    }

    /// Returns whether the session is usable.
    ///
    /// False when credential or profile is absent. An inactive profile is
    /// an inconsistent session: it triggers [`clear`](Self::clear) before
    /// returning false, so a held credential cannot outlive a deactivated
    /// principal.
    pub async fn is_valid(&self) -> bool {
        enum Verdict {
            Valid,
            Missing,
            Inactive,
        }

        let verdict = match self.inner.read() {
            Ok(inner) => match (&inner.credential, &inner.profile) {
                (Some(_), Some(profile)) if profile.is_active => Verdict::Valid,
                (Some(_), Some(_)) => Verdict::Inactive,
                _ => Verdict::Missing,
            },
            Err(_) => Verdict::Missing,
        };

        match verdict {
            Verdict::Valid => true,
            Verdict::Missing => false,
            Verdict::Inactive => {
                self.clear().await;
                false
            }
        }
    }

    /// Drops credential, profile and artifacts, and erases the mirrored
    /// credential from the durable store.
    pub async fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.credential = None;
            inner.profile = None;
            inner.artifacts = None;
        }

        if let Err(e) = self.store.remove(AUTH_TOKEN_KEY).await {
            log::warn!(target: "gatehouse::session", "credential erase failed: {e}");
        }

        dispatch(GateEvent::SessionCleared { at: Utc::now() }).await;
    }

    /// True once the interior lock has been poisoned: the session can no
    /// longer attest anything about the visitor, and the gate fails
    /// protected routes toward the least powerful state.
    pub fn is_broken(&self) -> bool {
        self.inner.is_poisoned()
    }

    #[cfg(test)]
    pub(crate) fn poison_for_tests(&self) {
        let inner = Arc::clone(&self.inner);
        let _ = std::thread::spawn(move || {
            #[allow(clippy::unwrap_used)]
            let _guard = inner.write().unwrap();
            panic!("poisoning session lock");
        })
        .join();
    }

    pub fn has_credential(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.credential.is_some())
            .unwrap_or(false)
    }

    pub fn has_profile(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.profile.is_some())
            .unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.profile.as_ref().map(|p| p.is_admin))
            .unwrap_or(false)
    }

    pub fn principal_id(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.profile.as_ref().map(|p| p.id.clone()))
    }

    /// Returns a snapshot of the derived artifacts, if the session is
    /// established.
    pub fn artifacts(&self) -> Option<SessionArtifacts> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.artifacts.clone())
    }

    /// Computed security level; `Low` when no artifacts exist.
    pub fn security_level(&self) -> SecurityLevel {
        self.artifacts()
            .map(|a| a.security_level)
            .unwrap_or(SecurityLevel::Low)
    }
}

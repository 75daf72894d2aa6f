//! Editing a single alert from the detail drawer.
//!
//! An [`AlertEditSession`] holds a working copy of one alert. It starts in
//! read-only display mode; [`edit`](AlertEditSession::edit) opens a form
//! seeded from the working copy, [`save`](AlertEditSession::save) commits the
//! form to the store, and [`cancel`](AlertEditSession::cancel) discards it.
//!
//! There is one writer per session and no conflict detection: the last save
//! wins.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{Alert, AlertPatch, AlertSeverity, AlertStatus, AlertUpdate};
use crate::storage::{AlertStore, StorageError};

/// Edit session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A form operation was attempted while the session was read-only.
    #[error("alert '{0}' is not being edited")]
    NotEditing(String),

    /// The session was closed after its alert disappeared.
    #[error("edit session is closed")]
    Closed,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Whether the drawer shows the alert or the edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Viewing,
    Editing,
    Closed,
}

/// The drawer's form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditForm {
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    /// Empty when the alert has no threshold.
    pub threshold: String,
}

impl EditForm {
    fn from_alert(alert: &Alert) -> Self {
        Self {
            title: alert.title.clone(),
            description: alert.description.clone(),
            severity: alert.severity,
            status: alert.status,
            threshold: alert.threshold.clone().unwrap_or_default(),
        }
    }

    /// The fields that differ from `original`. A blank threshold clears it.
    pub fn changes_since(&self, original: &EditForm) -> AlertUpdate {
        fn changed<T: Clone + PartialEq>(current: &T, original: &T) -> Option<T> {
            (current != original).then(|| current.clone())
        }

        AlertUpdate {
            title: changed(&self.title, &original.title),
            description: changed(&self.description, &original.description),
            severity: changed(&self.severity, &original.severity),
            status: changed(&self.status, &original.status),
            threshold: changed(
                &self.normalized_threshold(),
                &original.normalized_threshold(),
            ),
        }
    }

    fn normalized_threshold(&self) -> Option<String> {
        let threshold = self.threshold.trim();
        (!threshold.is_empty()).then(|| self.threshold.clone())
    }
}

/// A staged edit of one alert.
#[derive(Debug, Clone)]
pub struct AlertEditSession {
    alert: Alert,
    form: EditForm,
    mode: SessionMode,
}

impl AlertEditSession {
    /// Load a working copy of `alert_id` in display mode.
    pub async fn open(store: &AlertStore, alert_id: &str) -> Result<Self, SessionError> {
        let alert = store.get_alert(alert_id).await?;
        debug!(alert_id, "Edit session opened");
        Ok(Self::for_alert(alert))
    }

    /// Start a session on an alert the caller already holds.
    pub fn for_alert(alert: Alert) -> Self {
        let form = EditForm::from_alert(&alert);
        Self {
            alert,
            form,
            mode: SessionMode::Viewing,
        }
    }

    pub fn alert(&self) -> &Alert {
        &self.alert
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Switch to the edit form, seeded from the working copy.
    pub fn edit(&mut self) -> Result<(), SessionError> {
        if self.mode == SessionMode::Closed {
            return Err(SessionError::Closed);
        }
        self.form = EditForm::from_alert(&self.alert);
        self.mode = SessionMode::Editing;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), SessionError> {
        self.form_mut()?.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), SessionError> {
        self.form_mut()?.description = description.into();
        Ok(())
    }

    pub fn set_severity(&mut self, severity: AlertSeverity) -> Result<(), SessionError> {
        self.form_mut()?.severity = severity;
        Ok(())
    }

    pub fn set_status(&mut self, status: AlertStatus) -> Result<(), SessionError> {
        self.form_mut()?.status = status;
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: impl Into<String>) -> Result<(), SessionError> {
        self.form_mut()?.threshold = threshold.into();
        Ok(())
    }

    /// Apply the fields present in `patch` to the form.
    pub fn apply_patch(&mut self, patch: AlertPatch) -> Result<(), SessionError> {
        let form = self.form_mut()?;
        if let Some(title) = patch.title {
            form.title = title;
        }
        if let Some(description) = patch.description {
            form.description = description;
        }
        if let Some(severity) = patch.severity {
            form.severity = severity;
        }
        if let Some(status) = patch.status {
            form.status = status;
        }
        if let Some(threshold) = patch.threshold {
            form.threshold = threshold;
        }
        Ok(())
    }

    /// Commit the changed fields to the store and return to display mode.
    ///
    /// Only fields that differ from the working copy are written, merged into
    /// the stored record under the store's write lock, so a concurrent save of
    /// other fields is kept. If the alert no longer exists the session closes
    /// and the error is returned.
    pub async fn save(&mut self, store: &AlertStore) -> Result<&Alert, SessionError> {
        match self.mode {
            SessionMode::Editing => {}
            SessionMode::Closed => return Err(SessionError::Closed),
            SessionMode::Viewing => return Err(self.not_editing()),
        }

        let update = self.form.changes_since(&EditForm::from_alert(&self.alert));
        if update.is_empty() {
            debug!(alert_id = %self.alert.id, "No changes to save");
        }

        match store.update_alert(&self.alert.id, &update).await {
            Ok(updated) => {
                info!(alert_id = %updated.id, "Alert edits saved");
                self.form = EditForm::from_alert(&updated);
                self.alert = updated;
                self.mode = SessionMode::Viewing;
                Ok(&self.alert)
            }
            Err(e) => {
                warn!(alert_id = %self.alert.id, error = %e, "Closing edit session");
                self.mode = SessionMode::Closed;
                Err(e.into())
            }
        }
    }

    /// Discard the form and return to display mode with the original values.
    pub fn cancel(&mut self) {
        if self.mode == SessionMode::Editing {
            self.form = EditForm::from_alert(&self.alert);
            self.mode = SessionMode::Viewing;
        }
    }

    fn form_mut(&mut self) -> Result<&mut EditForm, SessionError> {
        match self.mode {
            SessionMode::Editing => Ok(&mut self.form),
            SessionMode::Closed => Err(SessionError::Closed),
            SessionMode::Viewing => Err(self.not_editing()),
        }
    }

    fn not_editing(&self) -> SessionError {
        SessionError::NotEditing(self.alert.id.clone())
    }
}

/// A copy of `alerts` with `update` merged into the alert with `id`.
///
/// Only that one record is reallocated; every other `Arc` is shared with the
/// input. Returns `None` if no alert has `id`.
pub fn merge_update(
    alerts: &[Arc<Alert>],
    id: &str,
    update: &AlertUpdate,
) -> Option<Vec<Arc<Alert>>> {
    let index = alerts.iter().position(|alert| alert.id == id)?;

    let mut merged = alerts.to_vec();
    let mut target = Alert::clone(&alerts[index]);
    update.apply_to(&mut target);
    merged[index] = Arc::new(target);

    Some(merged)
}

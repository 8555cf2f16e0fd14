// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability adaptation.
//!
//! [`adapt`] checks a plugin against the host's required capability set
//! and produces an [`AdaptedPlugin`] record. Optional capabilities the
//! plugin omits stay unbound; the registry treats them as no-ops. A
//! missing *required* capability fails adaptation, and the caller must
//! not construct a partial registry from it.

use std::fmt;
use std::sync::Arc;

use tankobon_core::{Capability, TankobonError};

use crate::capability::Plugin;

/// A plugin that passed capability adaptation.
pub struct AdaptedPlugin<S> {
    name: String,
    plugin: Arc<dyn Plugin<S>>,
}

impl<S> Clone for AdaptedPlugin<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            plugin: Arc::clone(&self.plugin),
        }
    }
}

impl<S> fmt::Debug for AdaptedPlugin<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptedPlugin")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<S: 'static> AdaptedPlugin<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the underlying plugin binds the given capability slot.
    pub fn provides(&self, capability: Capability) -> bool {
        match capability {
            Capability::Schema => self.plugin.schema_extender().is_some(),
            Capability::Snapshot => self.plugin.snapshot_validator().is_some(),
            Capability::Committed => self.plugin.commit_observer().is_some(),
            Capability::Worker => self.plugin.worker().is_some(),
        }
    }

    pub(crate) fn plugin(&self) -> &Arc<dyn Plugin<S>> {
        &self.plugin
    }
}

/// Adapt a plugin, verifying every capability in `required` is bound.
///
/// The capability signatures themselves are enforced by the trait
/// contracts at compile time; the only runtime failure mode left is a
/// required slot the plugin does not provide.
pub fn adapt<S: 'static>(
    plugin: Arc<dyn Plugin<S>>,
    required: &[Capability],
) -> Result<AdaptedPlugin<S>, TankobonError> {
    let adapted = AdaptedPlugin {
        name: plugin.name().to_string(),
        plugin,
    };

    for &capability in required {
        if !adapted.provides(capability) {
            return Err(TankobonError::MissingCapability {
                plugin: adapted.name,
                capability,
            });
        }
    }

    Ok(adapted)
}

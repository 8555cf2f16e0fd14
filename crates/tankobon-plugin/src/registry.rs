// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered plugin registry with fan-out broadcasts.
//!
//! Order is caller-supplied and preserved: it fixes the short-circuit
//! order of the validate phase and the commit-notification order, and
//! carries no other semantic weight.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use tankobon_core::{Capability, SchemaRegistry, TankobonError};

use crate::adapter::{adapt, AdaptedPlugin};
use crate::capability::Plugin;
use crate::host::Host;

/// The ordered collection of adapted plugins owned by a host.
pub struct PluginSet<S> {
    plugins: Vec<AdaptedPlugin<S>>,
}

impl<S> fmt::Debug for PluginSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.plugins).finish()
    }
}

impl<S: Send + Sync + 'static> PluginSet<S> {
    /// Adapt every supplied plugin in order.
    ///
    /// Fails on the first plugin missing a required capability; no
    /// partial registry is produced.
    pub fn adapt_all(
        plugins: impl IntoIterator<Item = Arc<dyn Plugin<S>>>,
        required: &[Capability],
    ) -> Result<Self, TankobonError> {
        let plugins = plugins
            .into_iter()
            .map(|p| adapt(p, required))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { plugins })
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdaptedPlugin<S>> {
        self.plugins.iter()
    }

    /// Invoke every schema hook in order, stopping at the first error.
    pub fn broadcast_schema(&self, schema: &mut SchemaRegistry) -> Result<(), TankobonError> {
        for adapted in &self.plugins {
            if let Some(extender) = adapted.plugin().schema_extender() {
                debug!(plugin = adapted.name(), "running schema hook");
                extender.on_schema_ready(schema)?;
            }
        }
        Ok(())
    }

    /// Invoke every snapshot validator in order, stopping at the first
    /// error. Remaining plugins are not consulted; the error names the
    /// plugin that rejected the staged value.
    pub async fn broadcast_snapshot(
        &self,
        host: &Host<S>,
        staged: &Arc<S>,
    ) -> Result<(), TankobonError> {
        for adapted in &self.plugins {
            if let Some(validator) = adapted.plugin().snapshot_validator() {
                debug!(plugin = adapted.name(), "validating staged snapshot");
                validator.on_snapshot(host, staged).await.map_err(|e| {
                    TankobonError::Validation {
                        plugin: adapted.name().to_string(),
                        source: Box::new(e),
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Notify every commit observer, unconditionally and in order.
    ///
    /// Commit notifications have no error path: validation already
    /// succeeded and the swap has happened.
    pub fn broadcast_committed(&self) {
        for adapted in &self.plugins {
            if let Some(observer) = adapted.plugin().commit_observer() {
                debug!(plugin = adapted.name(), "commit notification");
                observer.on_committed();
            }
        }
    }

    pub(crate) fn plugins(&self) -> &[AdaptedPlugin<S>] {
        &self.plugins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CommitObserver, SchemaExtender};
    use std::sync::Mutex;
    use tankobon_core::{FieldSpec, ObjectType};

    /// Records invocation order into a shared log.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail_schema: bool,
    }

    impl SchemaExtender for Recorder {
        fn on_schema_ready(&self, schema: &mut SchemaRegistry) -> Result<(), TankobonError> {
            self.log.lock().unwrap().push(format!("schema:{}", self.name));
            if self.fail_schema {
                return Err(TankobonError::Internal("schema hook failed".into()));
            }
            schema
                .type_mut("Root")
                .ok_or_else(|| TankobonError::Internal("no Root type".into()))?
                .set_field(self.name, FieldSpec::new("String"));
            Ok(())
        }
    }

    impl CommitObserver for Recorder {
        fn on_committed(&self) {
            self.log.lock().unwrap().push(format!("commit:{}", self.name));
        }
    }

    impl Plugin<()> for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn schema_extender(&self) -> Option<&dyn SchemaExtender> {
            Some(self)
        }

        fn commit_observer(&self) -> Option<&dyn CommitObserver> {
            Some(self)
        }
    }

    fn recorder_set(
        log: &Arc<Mutex<Vec<String>>>,
        fail_middle: bool,
    ) -> PluginSet<()> {
        let plugins: Vec<Arc<dyn Plugin<()>>> = vec![
            Arc::new(Recorder {
                name: "a",
                log: Arc::clone(log),
                fail_schema: false,
            }),
            Arc::new(Recorder {
                name: "b",
                log: Arc::clone(log),
                fail_schema: fail_middle,
            }),
            Arc::new(Recorder {
                name: "c",
                log: Arc::clone(log),
                fail_schema: false,
            }),
        ];
        PluginSet::adapt_all(plugins, &[]).unwrap()
    }

    #[test]
    fn broadcast_schema_preserves_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = recorder_set(&log, false);

        let mut schema = SchemaRegistry::new();
        schema.insert_type(ObjectType::new("Root"));
        set.broadcast_schema(&mut schema).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["schema:a", "schema:b", "schema:c"]
        );
        let root = schema.get("Root").unwrap();
        assert!(root.field("a").is_some() && root.field("c").is_some());
    }

    #[test]
    fn broadcast_schema_short_circuits_on_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = recorder_set(&log, true);

        let mut schema = SchemaRegistry::new();
        schema.insert_type(ObjectType::new("Root"));
        assert!(set.broadcast_schema(&mut schema).is_err());

        // Plugin c never ran.
        assert_eq!(*log.lock().unwrap(), vec!["schema:a", "schema:b"]);
    }

    #[test]
    fn broadcast_committed_notifies_everyone_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = recorder_set(&log, false);

        set.broadcast_committed();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["commit:a", "commit:b", "commit:c"]
        );
    }

    #[test]
    fn plugin_set_debug_lists_plugins_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let set = recorder_set(&log, false);
        let rendered = format!("{set:?}");
        assert!(rendered.contains("\"a\"") && rendered.contains("\"c\""));
    }

    #[test]
    fn adapt_all_fails_atomically() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let plugins: Vec<Arc<dyn Plugin<()>>> = vec![Arc::new(Recorder {
            name: "a",
            log,
            fail_schema: false,
        })];
        // Recorder has no worker capability.
        let err = PluginSet::adapt_all(plugins, &[Capability::Worker]).unwrap_err();
        assert!(matches!(err, TankobonError::MissingCapability { .. }));
    }
}

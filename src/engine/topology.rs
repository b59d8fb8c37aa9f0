use crate::config::ServiceConfig;
use crate::plugin::{PluginInstance, PluginKind};
use std::fmt::Write as _;
use tracing::{debug, info};

/// Live plugin instances, kept in creation order.
///
/// Instantiation runs kind by kind, so creation order is also
/// custom, input, filter, output.
#[derive(Debug, Default)]
pub struct Topology {
    instances: Vec<PluginInstance>,
    next_ids: [usize; 4],
    running: bool,
}

fn slot(kind: PluginKind) -> usize {
    match kind {
        PluginKind::Custom => 0,
        PluginKind::Input => 1,
        PluginKind::Filter => 2,
        PluginKind::Output => 3,
    }
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next sequence id for an instance of `kind`.
    pub fn next_id(&mut self, kind: PluginKind) -> usize {
        let id = self.next_ids[slot(kind)];
        self.next_ids[slot(kind)] += 1;
        id
    }

    pub fn push(&mut self, instance: PluginInstance) {
        self.instances.push(instance);
    }

    pub fn instances(&self) -> &[PluginInstance] {
        &self.instances
    }

    pub fn of_kind(&self, kind: PluginKind) -> impl Iterator<Item = &PluginInstance> {
        self.instances.iter().filter(move |i| i.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        for instance in &self.instances {
            debug!(kind = %instance.kind(), "starting {}", instance.name());
        }
        self.running = true;
        info!(
            customs = self.of_kind(PluginKind::Custom).count(),
            inputs = self.of_kind(PluginKind::Input).count(),
            filters = self.of_kind(PluginKind::Filter).count(),
            outputs = self.of_kind(PluginKind::Output).count(),
            "pipeline started"
        );
    }

    /// Releases every instance: outputs first, newest first, down to customs.
    /// Returns how many were released.
    pub fn stop(&mut self) -> usize {
        let mut released = 0;
        while let Some(instance) = self.instances.pop() {
            debug!(kind = %instance.kind(), "releasing {}", instance.name());
            released += 1;
        }
        self.running = false;
        released
    }

    /// Human readable snapshot of the service settings and every instance.
    pub fn dump(&self, service: &ServiceConfig) -> String {
        let mut out = String::from("[engine] configuration dump\n[service]\n");
        if let Ok(serde_json::Value::Object(settings)) = serde_json::to_value(service) {
            for (key, value) in settings {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                let _ = writeln!(out, "    {key:<16} {value}");
            }
        }

        for instance in &self.instances {
            let _ = writeln!(
                out,
                "[{}] {} ({})",
                instance.kind(),
                instance.name(),
                instance.plugin_name()
            );
            for (key, value) in instance.properties() {
                let _ = writeln!(out, "    {key:<16} {value}");
            }
            let failed = instance.failed_assignments().count();
            if failed > 0 {
                let _ = writeln!(out, "    ({failed} rejected properties)");
            }
        }
        out
    }
}

impl Drop for Topology {
    fn drop(&mut self) {
        if !self.instances.is_empty() {
            self.stop();
        }
    }
}

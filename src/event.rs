//! The event surface a parse drives its consumers through.
//!
//! There is one trait, [`EventConsumer`], rather than a coarse and a legacy
//! fine-grained trait each implementing the other: every method defaults to
//! a no-op, a consumer overrides only the granularity it needs, and
//! [`EventFanout::property`] is the single place that derives the legacy
//! fine-grained call sequence and the coarse
//! [`EventConsumer::on_property_created`] call from one assembled
//! [`VCardProperty`]. Neither API is built "on top of" the other inside the
//! trait itself — that composition lives in the fanout.

use itertools::Itertools;

use crate::decoder::PropertyValue;

/// One fully dissected, decoded property: `groups` is the dot-separated
/// prefix (`item1.TEL` has group `item1`), `parameters` preserves
/// declaration order and duplicates, matching the line as written.
#[derive(Debug, Clone, PartialEq)]
pub struct VCardProperty {
    pub groups: Vec<String>,
    pub name: String,
    pub parameters: Vec<(String, String)>,
    pub value: PropertyValue,
}

impl std::fmt::Display for VCardProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if !self.groups.is_empty() {
            write!(f, "{}.", self.groups.iter().join("."))?;
        }
        write!(f, "{}", self.name)?;
        if !self.parameters.is_empty() {
            let params = self.parameters.iter().map(|(k, v)| format!("{k}={v}")).join(";");
            write!(f, ";{params}")?;
        }
        Ok(())
    }
}

/// Receives parse events in source order. All methods default to no-ops;
/// implement only the ones a given consumer cares about.
pub trait EventConsumer {
    fn on_vcard_started(&mut self) {}
    fn on_vcard_ended(&mut self) {}

    fn on_entry_started(&mut self) {}
    fn on_entry_ended(&mut self) {}

    /// Fired once per property with the fully assembled result. Most
    /// consumers only need this.
    fn on_property_created(&mut self, _property: &VCardProperty) {}

    // The legacy fine-grained sequence, fired in this order immediately
    // before `on_property_created`, mirroring how a line is actually
    // dissected: started, one group call per group, the name, one param
    // call per parameter (TYPE values go through `on_property_param_type`,
    // everything else through `on_property_param_value`), the decoded
    // value, then ended.
    fn on_property_started(&mut self) {}
    fn on_property_group(&mut self, _group: &str) {}
    fn on_property_name(&mut self, _name: &str) {}
    fn on_property_param_type(&mut self, _value: &str) {}
    fn on_property_param_value(&mut self, _name: &str, _value: &str) {}
    fn on_property_values(&mut self, _value: &PropertyValue) {}
    fn on_property_ended(&mut self) {}
}

/// Delivers one event to every registered consumer, in registration order.
#[derive(Default)]
pub struct EventFanout<'a> {
    consumers: Vec<&'a mut dyn EventConsumer>,
}

impl<'a> EventFanout<'a> {
    pub fn new() -> Self {
        Self {
            consumers: Vec::new(),
        }
    }

    pub fn add(&mut self, consumer: &'a mut dyn EventConsumer) {
        self.consumers.push(consumer);
    }

    pub fn vcard_started(&mut self) {
        for consumer in self.consumers.iter_mut() {
            consumer.on_vcard_started();
        }
    }

    pub fn vcard_ended(&mut self) {
        for consumer in self.consumers.iter_mut() {
            consumer.on_vcard_ended();
        }
    }

    pub fn entry_started(&mut self) {
        for consumer in self.consumers.iter_mut() {
            consumer.on_entry_started();
        }
    }

    pub fn entry_ended(&mut self) {
        for consumer in self.consumers.iter_mut() {
            consumer.on_entry_ended();
        }
    }

    /// Fires the full legacy fine-grained envelope, then the coarse event,
    /// for one property, to every consumer in turn.
    pub fn property(&mut self, property: &VCardProperty) {
        for consumer in self.consumers.iter_mut() {
            consumer.on_property_started();
            for group in &property.groups {
                consumer.on_property_group(group);
            }
            consumer.on_property_name(&property.name);
            for (name, value) in &property.parameters {
                if name == "TYPE" {
                    consumer.on_property_param_type(value);
                } else {
                    consumer.on_property_param_value(name, value);
                }
            }
            consumer.on_property_values(&property.value);
            consumer.on_property_created(property);
            consumer.on_property_ended();
        }
    }
}

// Devcap Device Model
// Thin device object and ordered property list

/// Ordered key/value list attached to a device.
///
/// Insertion order is preserved for iteration; inserting an existing
/// key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyList {
    entries: Vec<(String, String)>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A kernel-exposed device as seen by the classification engine.
///
/// Carries the device node path, its short name, the property and
/// sysattr lists consumers read, and the synthesized parent record
/// once one has been attached. The device owns its parent exclusively.
#[derive(Debug, Clone)]
pub struct Device {
    syspath: String,
    sysname: String,
    properties: PropertyList,
    sysattrs: PropertyList,
    parent: Option<Box<Device>>,
}

impl Device {
    /// Create a device for a node path. The sysname is the last path
    /// component; synthetic parents are created from a bare sysname.
    pub fn new(syspath: impl Into<String>) -> Self {
        let syspath = syspath.into();
        let sysname = syspath
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            syspath,
            sysname,
            properties: PropertyList::new(),
            sysattrs: PropertyList::new(),
            parent: None,
        }
    }

    pub fn syspath(&self) -> &str {
        &self.syspath
    }

    pub fn sysname(&self) -> &str {
        &self.sysname
    }

    /// The character-special node backing this device. Device nodes
    /// double as syspaths here; there is no separate /sys tree.
    pub fn devnode(&self) -> &str {
        &self.syspath
    }

    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyList {
        &mut self.properties
    }

    pub fn sysattrs(&self) -> &PropertyList {
        &self.sysattrs
    }

    pub fn sysattrs_mut(&mut self) -> &mut PropertyList {
        &mut self.sysattrs
    }

    pub fn parent(&self) -> Option<&Device> {
        self.parent.as_deref()
    }

    pub fn set_parent(&mut self, parent: Device) {
        self.parent = Some(Box::new(parent));
    }
}

//! Parameter storage
//!
//! A RAM key-value store of named tunables. Groups register their defaults
//! once at boot and read back clamped values with `from_store`. Nothing is
//! persisted; every power cycle starts from defaults.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 64;

pub type ParamName = String<PARAM_NAME_LEN>;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Reported for information only, `set` is rejected
        const READ_ONLY = 0b00000001;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Float(f32),
}

impl ParamValue {
    fn same_kind(&self, other: &ParamValue) -> bool {
        matches!(
            (self, other),
            (ParamValue::Int(_), ParamValue::Int(_)) | (ParamValue::Float(_), ParamValue::Float(_))
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: ParamValue,
    flags: ParamFlags,
}

/// Named parameter store
#[derive(Default)]
pub struct ParameterStore {
    entries: FnvIndexMap<ParamName, Entry, MAX_PARAMS>,
}

fn name_key(name: &str) -> Result<ParamName, ParameterError> {
    let mut key = ParamName::new();
    key.push_str(name).map_err(|_| ParameterError::NameTooLong)?;
    Ok(key)
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(&name_key(name).ok()?)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entry(name).map(|entry| &entry.value)
    }

    /// Add `name` with its default. A name that already exists keeps its
    /// current value and flags.
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = name_key(name)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }
        self.entries
            .insert(
                key,
                Entry {
                    value: default_value,
                    flags,
                },
            )
            .map(|_| ())
            .map_err(|_| ParameterError::StoreFull)
    }

    /// Overwrite a registered, writable parameter with a value of the same
    /// kind.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let entry = self
            .entries
            .get_mut(&name_key(name)?)
            .ok_or(ParameterError::Unknown)?;
        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        if !entry.value.same_kind(&value) {
            return Err(ParameterError::TypeMismatch);
        }
        entry.value = value;
        Ok(())
    }

    pub fn flags(&self, name: &str) -> Option<ParamFlags> {
        self.entry(name).map(|entry| entry.flags)
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        self.flags(name)
            .is_some_and(|flags| flags.contains(ParamFlags::READ_ONLY))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&ParamName, &ParamValue)> {
        self.entries.iter().map(|(name, entry)| (name, &entry.value))
    }
}

/// Float tunable: name, default and accepted range
#[derive(Debug, Clone, Copy)]
pub struct FloatParam {
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

impl FloatParam {
    pub const fn new(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            default,
            min,
            max,
        }
    }

    pub fn register(&self, store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(self.name, ParamValue::Float(self.default), ParamFlags::empty())
    }

    /// Write `value` if it lies in range.
    pub fn store(&self, store: &mut ParameterStore, value: f32) -> Result<(), ParameterError> {
        if !self.accepts(value) {
            return Err(ParameterError::OutOfRange);
        }
        store.set(self.name, ParamValue::Float(value))
    }

    /// Stored value clamped to range; default if missing or non-finite.
    pub fn load(&self, store: &ParameterStore) -> f32 {
        match store.get(self.name) {
            Some(ParamValue::Float(v)) if v.is_finite() => v.clamp(self.min, self.max),
            Some(ParamValue::Int(v)) => (*v as f32).clamp(self.min, self.max),
            _ => self.default,
        }
    }

    pub fn accepts(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Integer tunable (speeds, durations in ms, counts)
#[derive(Debug, Clone, Copy)]
pub struct IntParam {
    pub name: &'static str,
    pub default: i32,
    pub min: i32,
    pub max: i32,
}

impl IntParam {
    pub const fn new(name: &'static str, default: i32, min: i32, max: i32) -> Self {
        Self {
            name,
            default,
            min,
            max,
        }
    }

    pub fn register(&self, store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(self.name, ParamValue::Int(self.default), ParamFlags::empty())
    }

    /// Write `value` if it lies in range.
    pub fn store(&self, store: &mut ParameterStore, value: i32) -> Result<(), ParameterError> {
        if !self.accepts(value) {
            return Err(ParameterError::OutOfRange);
        }
        store.set(self.name, ParamValue::Int(value))
    }

    pub fn load(&self, store: &ParameterStore) -> i32 {
        match store.get(self.name) {
            Some(ParamValue::Int(v)) => (*v).clamp(self.min, self.max),
            _ => self.default,
        }
    }

    pub fn accepts(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATE: IntParam = IntParam::new("DRV_ROT_SPD", 140, 0, 400);
    const KP: FloatParam = FloatParam::new("HDG_KP", 4.0, 0.0, 20.0);

    fn registered() -> ParameterStore {
        let mut store = ParameterStore::new();
        ROTATE.register(&mut store).unwrap();
        KP.register(&mut store).unwrap();
        store
    }

    #[test]
    fn test_missing_parameters_load_defaults() {
        let store = ParameterStore::new();
        assert!(store.is_empty());
        assert_eq!(ROTATE.load(&store), 140);
        assert_eq!(KP.load(&store), 4.0);
    }

    #[test]
    fn test_store_within_range() {
        let mut store = registered();
        ROTATE.store(&mut store, 200).unwrap();
        KP.store(&mut store, 2.5).unwrap();
        assert_eq!(ROTATE.load(&store), 200);
        assert_eq!(store.get("HDG_KP"), Some(&ParamValue::Float(2.5)));
    }

    #[test]
    fn test_store_rejects_out_of_range() {
        let mut store = registered();
        assert_eq!(ROTATE.store(&mut store, 401), Err(ParameterError::OutOfRange));
        assert_eq!(KP.store(&mut store, -0.1), Err(ParameterError::OutOfRange));
        assert_eq!(ROTATE.load(&store), 140);
    }

    #[test]
    fn test_raw_set_is_clamped_on_load() {
        let mut store = registered();
        store.set("DRV_ROT_SPD", ParamValue::Int(900)).unwrap();
        store.set("HDG_KP", ParamValue::Float(f32::NAN)).unwrap();
        assert_eq!(ROTATE.load(&store), 400);
        assert_eq!(KP.load(&store), 4.0);
    }

    #[test]
    fn test_set_errors() {
        let mut store = registered();
        assert_eq!(
            store.set("HDG_KI", ParamValue::Float(1.0)),
            Err(ParameterError::Unknown)
        );
        assert_eq!(
            store.set("DRV_ROT_SPD", ParamValue::Float(1.0)),
            Err(ParameterError::TypeMismatch)
        );
        assert_eq!(
            store.set("DRV_ROTATE_SPEED_X", ParamValue::Int(1)),
            Err(ParameterError::NameTooLong)
        );
    }

    #[test]
    fn test_reregister_keeps_value() {
        let mut store = registered();
        ROTATE.store(&mut store, 90).unwrap();
        ROTATE.register(&mut store).unwrap();
        assert_eq!(ROTATE.load(&store), 90);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_read_only_rejects_set() {
        let mut store = ParameterStore::new();
        store
            .register("SYS_FILT_SIZE", ParamValue::Int(5), ParamFlags::READ_ONLY)
            .unwrap();
        assert!(store.is_read_only("SYS_FILT_SIZE"));
        assert!(!store.is_read_only("HDG_KP"));
        assert_eq!(
            store.set("SYS_FILT_SIZE", ParamValue::Int(9)),
            Err(ParameterError::ReadOnly)
        );
    }

    #[test]
    fn test_capacity() {
        let mut store = ParameterStore::new();
        for i in 0..MAX_PARAMS {
            let mut name = ParamName::new();
            core::fmt::write(&mut name, format_args!("P{}", i)).unwrap();
            store
                .register(&name, ParamValue::Int(0), ParamFlags::empty())
                .unwrap();
        }
        assert_eq!(
            store.register("EXTRA", ParamValue::Int(0), ParamFlags::empty()),
            Err(ParameterError::StoreFull)
        );
    }
}

use crate::runtime::{
    data_structures::{
        value::Value,
        word::{CloneMemo, deep_clone_value},
    },
    error::{self, ErrorKind, runtime_error},
};
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};

/// The address-to-value store backing the variable words.  Any value can serve as an address,
/// though integers and symbols are the usual choices.
#[derive(Default)]
pub struct Heap {
    entries: HashMap<Value, Value>,
}

impl Heap {
    pub fn new() -> Heap {
        Heap {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a value at an address, creating or overwriting.
    pub fn store(&mut self, address: Value, value: Value) {
        self.entries.insert(address, value);
    }

    /// Fetch the value at an address.  Reading an address that was never stored is an error.
    pub fn fetch(&self, address: &Value) -> error::Result<Value> {
        match self.entries.get(address) {
            Some(value) => Ok(value.clone()),
            None => runtime_error(
                ErrorKind::HeapMiss,
                format!("Address \"{}\" uninitialized", address),
            ),
        }
    }

    /// Add a delta to the value at an address.  A fresh address is initialized with the delta.
    pub fn add(&mut self, address: Value, delta: &Value) -> error::Result<()> {
        let value = match self.entries.get(&address) {
            Some(existing) => Value::add(existing, delta)?,
            None => delta.clone(),
        };

        self.entries.insert(address, value);
        Ok(())
    }

    /// Subtract a delta from the value at an address.  A fresh address is initialized with the
    /// delta itself, mirroring the additive form.
    pub fn sub(&mut self, address: Value, delta: &Value) -> error::Result<()> {
        let value = match self.entries.get(&address) {
            Some(existing) => Value::sub(existing, delta)?,
            None => delta.clone(),
        };

        self.entries.insert(address, value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }

    /// Deep clone the heap for the backup slot.
    pub fn deep_clone(&self, memo: &mut CloneMemo) -> Heap {
        let entries = self
            .entries
            .iter()
            .map(|(address, value)| {
                (
                    deep_clone_value(address, memo),
                    deep_clone_value(value, memo),
                )
            })
            .collect();

        Heap { entries }
    }
}

/// Render every entry as an `address -> value` line, sorted by the rendered address so the
/// listing is stable.  This is what `.m` prints.
impl Display for Heap {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|(address, value)| format!("{} -> {}", address, value))
            .collect();

        lines.sort_unstable();

        for line in lines {
            writeln!(f, "{}", line)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_fetch_round_trips() {
        let mut heap = Heap::new();
        let address = Value::Symbol("x".to_string());

        heap.store(address.clone(), Value::Int(9));

        assert_eq!(heap.fetch(&address).unwrap(), Value::Int(9));
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn fetch_of_fresh_address_misses() {
        let heap = Heap::new();
        assert!(heap.fetch(&Value::Int(0)).is_err());
    }

    #[test]
    fn add_defaults_to_the_delta() {
        let mut heap = Heap::new();
        let address = Value::Symbol("acc".to_string());

        heap.add(address.clone(), &Value::Int(3)).unwrap();
        heap.add(address.clone(), &Value::Int(4)).unwrap();

        assert_eq!(heap.fetch(&address).unwrap(), Value::Int(7));
    }

    #[test]
    fn numeric_addresses_share_an_equality_class() {
        let mut heap = Heap::new();

        heap.store(Value::Int(1), Value::Symbol("one".to_string()));

        assert!(heap.fetch(&Value::Float(1.0)).is_ok());
        assert!(heap.fetch(&Value::Bool(true)).is_ok());
    }
}

// SPDX-License-Identifier: MIT
//! In-memory working set of employee records
//!
//! The repository owns the header together with the records so that `count`
//! is always re-derived from the record list after a mutation. Records are
//! located by name: an exact byte match against the stored name, after the
//! key is cut the way an add would store it.

use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::format::{
    file_size_for, truncate_text, DbHeader, Employee, TextField, ADDRESS_LEN, EMPLOYEE_SIZE,
    MAX_EMPLOYEES, NAME_LEN,
};
use crate::store::FileStore;

/// How the hours field of a spec is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoursParsing {
    /// Leading decimal digits are used; anything unparsable becomes 0
    #[default]
    Lenient,
    /// The whole field must be a valid `u32`
    Strict,
}

impl HoursParsing {
    pub fn parse(self, field: &str) -> DbResult<u32> {
        match self {
            HoursParsing::Lenient => Ok(parse_leading_digits(field)),
            HoursParsing::Strict => field.trim().parse::<u32>().map_err(|_| {
                DbError::InvalidSpec(format!("hours must be a non-negative integer: {:?}", field))
            }),
        }
    }
}

fn parse_leading_digits(field: &str) -> u32 {
    let trimmed = field.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().unwrap_or(0)
}

/// Parsed `name,address,hours` argument for an add
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeSpec {
    pub name: String,
    pub address: String,
    pub hours: u32,
}

impl EmployeeSpec {
    pub fn parse(spec: &str, hours: HoursParsing) -> DbResult<Self> {
        let fields: Vec<&str> = spec.split(',').collect();

        let name = required_field(&fields, 0, "name")?;
        let address = required_field(&fields, 1, "address")?;
        let hours_field = required_field(&fields, 2, "hours")?;
        if fields.len() > 3 {
            return Err(DbError::InvalidSpec(format!(
                "expected name,address,hours but got {} fields",
                fields.len()
            )));
        }

        Ok(Self {
            name: name.to_string(),
            address: address.to_string(),
            hours: hours.parse(hours_field)?,
        })
    }
}

fn required_field<'a>(fields: &[&'a str], index: usize, what: &str) -> DbResult<&'a str> {
    match fields.get(index) {
        Some(&field) if !field.is_empty() => Ok(field),
        _ => Err(DbError::InvalidSpec(format!("missing {}", what))),
    }
}

/// Parsed `name,address,hours` argument for an update.
///
/// `name` selects the record; an empty address or hours keeps the old value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSpec {
    pub key: String,
    pub address: Option<String>,
    pub hours: Option<u32>,
}

impl UpdateSpec {
    pub fn parse(spec: &str, hours: HoursParsing) -> DbResult<Self> {
        let fields: Vec<&str> = spec.split(',').collect();
        if fields.len() != 3 {
            return Err(DbError::InvalidSpec(format!(
                "expected name,address,hours (empty to keep) but got {} fields",
                fields.len()
            )));
        }

        let key = required_field(&fields, 0, "name")?;
        let address = Some(fields[1]).filter(|a| !a.is_empty());
        let hours = match fields[2] {
            "" => None,
            field => Some(hours.parse(field)?),
        };

        if address.is_none() && hours.is_none() {
            return Err(DbError::InvalidSpec(format!(
                "nothing to update for {:?}",
                key
            )));
        }

        Ok(Self {
            key: key.to_string(),
            address: address.map(str::to_string),
            hours,
        })
    }
}

/// Loaded header and records for one invocation
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    header: DbHeader,
    employees: Vec<Employee>,
}

impl EmployeeRepository {
    /// Empty repository for a freshly created file
    pub fn new(header: DbHeader) -> Self {
        Self {
            header,
            employees: Vec::new(),
        }
    }

    /// Read `header.count` records from the store's current position.
    ///
    /// The store must be positioned just past the header. A short file fails
    /// with `TruncatedRead`; it never yields a partial list.
    pub fn load(store: &mut FileStore, header: DbHeader) -> DbResult<Self> {
        let count = header.count as usize;
        // One spare slot for the add that usually follows a load
        let mut employees = Vec::with_capacity(count + 1);

        for index in 0..count {
            let bytes = store.read_exact(EMPLOYEE_SIZE).map_err(|e| {
                debug!("Failed to read employee {} of {}", index, count);
                e
            })?;
            employees.push(Employee::from_bytes(&bytes)?);
        }

        let expected = file_size_for(count);
        let actual = store.len()?;
        if actual > expected {
            warn!(
                "{:?} has {} trailing bytes after the last record",
                store.path(),
                actual - expected
            );
        }

        debug!("Loaded {} employees", employees.len());
        Ok(Self { header, employees })
    }

    pub fn header(&self) -> &DbHeader {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Records in storage order. Each call starts from the first record.
    pub fn list(&self) -> std::slice::Iter<'_, Employee> {
        self.employees.iter()
    }

    /// Append a record. Text fields are truncated to their slot width.
    pub fn add(&mut self, spec: &EmployeeSpec) -> DbResult<&Employee> {
        if self.employees.len() >= MAX_EMPLOYEES {
            return Err(DbError::CapacityExceeded { max: MAX_EMPLOYEES });
        }

        self.employees
            .push(Employee::new(&spec.name, &spec.address, spec.hours));
        self.sync_count();

        let added = &self.employees[self.employees.len() - 1];
        info!("Added employee {}", added.name);
        Ok(added)
    }

    /// Remove the record whose name is `key`, keeping the rest in order
    pub fn delete(&mut self, key: &str) -> DbResult<Employee> {
        let index = self.find_unique(key)?;
        let removed = self.employees.remove(index);
        self.sync_count();

        info!("Deleted employee {}", removed.name);
        Ok(removed)
    }

    /// Overwrite address and/or hours of the record named `spec.key`
    pub fn update(&mut self, spec: &UpdateSpec) -> DbResult<&Employee> {
        let index = self.find_unique(&spec.key)?;
        let employee = &mut self.employees[index];

        if let Some(address) = &spec.address {
            employee.address = TextField::from_text(address, ADDRESS_LEN);
        }
        if let Some(hours) = spec.hours {
            employee.hours = hours;
        }

        info!("Updated employee {}", employee.name);
        Ok(&*employee)
    }

    fn find_unique(&self, key: &str) -> DbResult<usize> {
        // A full slot carries no terminator, so it holds one byte more
        // than anything add stores
        let stored = truncate_text(key, NAME_LEN).as_bytes();
        let full_slot = &key.as_bytes()[..key.len().min(NAME_LEN)];
        let mut matches = self
            .employees
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                let name = e.name.as_bytes();
                name == stored || name == full_slot
            })
            .map(|(i, _)| i);

        let first = matches
            .next()
            .ok_or_else(|| DbError::KeyNotFound(key.to_string()))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(DbError::DuplicateKey {
                key: key.to_string(),
                matches: extra + 1,
            });
        }

        Ok(first)
    }

    fn sync_count(&mut self) {
        // Bounded by MAX_EMPLOYEES in add; delete only shrinks
        self.header.count = self.employees.len() as u16;
    }

    /// Encode the complete file image: header followed by every record
    pub fn to_bytes(&mut self) -> Vec<u8> {
        let size = file_size_for(self.employees.len());
        self.header.filesize = size as u32;

        let mut buffer = Vec::with_capacity(size as usize);
        self.header.write_to_buffer(&mut buffer);
        for employee in &self.employees {
            employee.write_to_buffer(&mut buffer);
        }

        debug_assert_eq!(buffer.len() as u64, size);
        buffer
    }

    /// Rewrite the whole file from offset 0
    pub fn persist(&mut self, store: &mut FileStore, durable: bool) -> DbResult<()> {
        let image = self.to_bytes();
        store.rewrite(&image, durable)?;
        debug!(
            "Persisted {} employees ({} bytes)",
            self.header.count,
            image.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::make_new_header;

    fn repo_with(names: &[&str]) -> EmployeeRepository {
        let mut repo = EmployeeRepository::new(make_new_header());
        for name in names {
            let spec = EmployeeSpec {
                name: name.to_string(),
                address: format!("{} Street", name),
                hours: 10,
            };
            repo.add(&spec).unwrap();
        }
        repo
    }

    #[test]
    fn test_parse_add_spec() {
        let spec = EmployeeSpec::parse("Alice,123 Main,40", HoursParsing::Lenient).unwrap();
        assert_eq!(spec.name, "Alice");
        assert_eq!(spec.address, "123 Main");
        assert_eq!(spec.hours, 40);
    }

    #[test]
    fn test_parse_add_spec_missing_fields() {
        for spec in ["", "Carl", "Carl,789 Pine", "Carl,789 Pine,", ",789 Pine,3"] {
            let err = EmployeeSpec::parse(spec, HoursParsing::Lenient).unwrap_err();
            assert!(matches!(err, DbError::InvalidSpec(_)), "spec {:?}", spec);
        }
    }

    #[test]
    fn test_parse_add_spec_too_many_fields() {
        let err = EmployeeSpec::parse("a,b,1,2", HoursParsing::Lenient).unwrap_err();
        assert!(matches!(err, DbError::InvalidSpec(_)));
    }

    #[test]
    fn test_lenient_hours() {
        assert_eq!(HoursParsing::Lenient.parse("abc").unwrap(), 0);
        assert_eq!(HoursParsing::Lenient.parse(" 42h").unwrap(), 42);
        assert_eq!(HoursParsing::Lenient.parse("+7").unwrap(), 7);
        // Negative input is not wrapped into a huge u32; it counts as no digits
        assert_eq!(HoursParsing::Lenient.parse("-5").unwrap(), 0);
        assert_eq!(HoursParsing::Lenient.parse("99999999999").unwrap(), 0);
    }

    #[test]
    fn test_strict_hours() {
        assert_eq!(HoursParsing::Strict.parse(" 42 ").unwrap(), 42);
        assert!(matches!(
            HoursParsing::Strict.parse("abc"),
            Err(DbError::InvalidSpec(_))
        ));
        assert!(HoursParsing::Strict.parse("42h").is_err());
    }

    #[test]
    fn test_parse_update_spec() {
        let spec = UpdateSpec::parse("Alice,,45", HoursParsing::Lenient).unwrap();
        assert_eq!(spec.key, "Alice");
        assert_eq!(spec.address, None);
        assert_eq!(spec.hours, Some(45));

        let spec = UpdateSpec::parse("Alice,9 Elm,", HoursParsing::Lenient).unwrap();
        assert_eq!(spec.address.as_deref(), Some("9 Elm"));
        assert_eq!(spec.hours, None);
    }

    #[test]
    fn test_parse_update_spec_rejects_noop_and_malformed() {
        for spec in ["Alice,,", "Alice,9 Elm", ",9 Elm,3", "a,b,c,d"] {
            assert!(
                UpdateSpec::parse(spec, HoursParsing::Lenient).is_err(),
                "spec {:?}",
                spec
            );
        }
    }

    #[test]
    fn test_add_keeps_count_in_sync() {
        let repo = repo_with(&["Alice", "Bob"]);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.header().count, 2);
    }

    #[test]
    fn test_add_truncates_long_fields() {
        let mut repo = repo_with(&[]);
        let spec = EmployeeSpec {
            name: "n".repeat(1000),
            address: "a".repeat(1000),
            hours: 1,
        };
        let added = repo.add(&spec).unwrap();
        assert_eq!(added.name.len(), NAME_LEN - 1);
        assert_eq!(added.address.len(), ADDRESS_LEN - 1);
    }

    #[test]
    fn test_add_capacity_exceeded() {
        let mut repo = repo_with(&[]);
        repo.employees = vec![Employee::default(); MAX_EMPLOYEES];
        repo.sync_count();

        let spec = EmployeeSpec::parse("x,y,1", HoursParsing::Lenient).unwrap();
        let err = repo.add(&spec).unwrap_err();
        assert!(matches!(err, DbError::CapacityExceeded { max: MAX_EMPLOYEES }));
        assert_eq!(repo.header().count as usize, MAX_EMPLOYEES);
    }

    #[test]
    fn test_delete_compacts() {
        let mut repo = repo_with(&["Alice", "Bob", "Carol"]);
        let removed = repo.delete("Bob").unwrap();
        assert_eq!(removed.name, "Bob");

        let names: Vec<String> = repo.list().map(|e| e.name.to_string()).collect();
        assert_eq!(names, ["Alice", "Carol"]);
        assert_eq!(repo.header().count, 2);
    }

    #[test]
    fn test_delete_missing_key() {
        let mut repo = repo_with(&["Alice"]);
        assert!(matches!(repo.delete("alice"), Err(DbError::KeyNotFound(_))));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_full_slot_name_is_found() {
        let mut repo = repo_with(&["Alice"]);
        let slot = bytes::Bytes::from(vec![b'z'; NAME_LEN]);
        repo.employees[0].name = TextField::from_slot(slot);

        let removed = repo.delete(&"z".repeat(NAME_LEN + 10)).unwrap();
        assert_eq!(removed.name.len(), NAME_LEN);
        assert!(repo.is_empty());
    }

    #[test]
    fn test_update_leaves_other_records_untouched() {
        let mut repo = repo_with(&["Alice", "Bob"]);
        let mut raw = repo.employees[0].to_bytes();
        raw[0] = 0xe9;
        repo.employees[0] = Employee::from_bytes(&raw).unwrap();

        let spec = UpdateSpec::parse("Bob,,99", HoursParsing::Lenient).unwrap();
        repo.update(&spec).unwrap();
        assert_eq!(repo.employees[0].to_bytes(), raw);
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut repo = repo_with(&["Alice", "Alice"]);
        let err = repo.delete("Alice").unwrap_err();
        assert!(matches!(err, DbError::DuplicateKey { matches: 2, .. }));
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_update_fields() {
        let mut repo = repo_with(&["Alice", "Bob"]);
        let spec = UpdateSpec::parse("Bob,9 Elm,", HoursParsing::Lenient).unwrap();
        repo.update(&spec).unwrap();

        let bob = repo.list().nth(1).unwrap();
        assert_eq!(bob.address, "9 Elm");
        assert_eq!(bob.hours, 10);
        assert_eq!(repo.header().count, 2);
    }

    #[test]
    fn test_update_missing_key() {
        let mut repo = repo_with(&["Alice"]);
        let spec = UpdateSpec::parse("Zed,,1", HoursParsing::Lenient).unwrap();
        assert!(matches!(repo.update(&spec), Err(DbError::KeyNotFound(_))));
    }

    #[test]
    fn test_list_empty_and_restartable() {
        let repo = repo_with(&[]);
        assert_eq!(repo.list().count(), 0);

        let repo = repo_with(&["Alice", "Bob"]);
        assert_eq!(repo.list().count(), 2);
        assert_eq!(repo.list().next().unwrap().name, "Alice");
    }

    #[test]
    fn test_to_bytes_updates_filesize() {
        let mut repo = repo_with(&["Alice"]);
        let image = repo.to_bytes();
        assert_eq!(image.len() as u64, file_size_for(1));
        assert_eq!(repo.header().filesize as u64, file_size_for(1));
    }
}

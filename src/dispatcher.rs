// SPDX-License-Identifier: MIT
//! Runs one requested action against a database file
//!
//! Every action is a single pass: open (or create) the file, validate the
//! header, load the records, apply at most one mutation in memory, then
//! rewrite the whole file. The `FileStore` is dropped on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::DbResult;
use crate::format::Employee;
use crate::header::{load_and_validate, make_new_header};
use crate::repository::{EmployeeRepository, EmployeeSpec, HoursParsing, UpdateSpec};
use crate::store::FileStore;

/// One action per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NewFile,
    List,
    Add(String),
    Delete(String),
    Update(String),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::NewFile => "new",
            Action::List => "list",
            Action::Add(_) => "add",
            Action::Delete(_) => "delete",
            Action::Update(_) => "update",
        }
    }
}

/// A parsed invocation: which file, and what to do with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: PathBuf,
    pub action: Action,
}

/// Settings the dispatcher needs from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatcher {
    hours: HoursParsing,
    durable_writes: bool,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            hours: config.hours_parsing(),
            durable_writes: config.durable_writes,
        }
    }

    pub fn with_hours_parsing(mut self, hours: HoursParsing) -> Self {
        self.hours = hours;
        self
    }

    /// Execute `request`, writing user-facing output to `out`
    pub fn run<W: Write>(&self, request: &Request, out: &mut W) -> DbResult<()> {
        debug!(
            "Running {} on {:?}",
            request.action.name(),
            request.path
        );

        match &request.action {
            Action::NewFile => self.create(&request.path, out),
            Action::List => {
                let (_store, repo) = open_and_load(&request.path)?;
                write_listing(&repo, out)
            }
            Action::Add(spec) => {
                let spec = EmployeeSpec::parse(spec, self.hours)?;
                self.mutate(&request.path, out, |repo| {
                    let added = repo.add(&spec)?;
                    Ok(format!("Added employee: {}", added.name))
                })
            }
            Action::Delete(key) => self.mutate(&request.path, out, |repo| {
                let removed = repo.delete(key)?;
                Ok(format!("Deleted employee: {}", removed.name))
            }),
            Action::Update(spec) => {
                let spec = UpdateSpec::parse(spec, self.hours)?;
                self.mutate(&request.path, out, |repo| {
                    let updated = repo.update(&spec)?;
                    Ok(format!("Updated employee: {}", updated.name))
                })
            }
        }
    }

    fn create<W: Write>(&self, path: &Path, out: &mut W) -> DbResult<()> {
        let mut store = FileStore::create(path)?;
        let mut repo = EmployeeRepository::new(make_new_header());
        repo.persist(&mut store, self.durable_writes)?;
        store.close();

        info!("Created new database {:?}", path);
        writeln!(out, "Created new database: {}", path.display())?;
        Ok(())
    }

    fn mutate<W, F>(&self, path: &Path, out: &mut W, apply: F) -> DbResult<()>
    where
        W: Write,
        F: FnOnce(&mut EmployeeRepository) -> DbResult<String>,
    {
        let (mut store, mut repo) = open_and_load(path)?;
        let message = apply(&mut repo)?;
        repo.persist(&mut store, self.durable_writes)?;
        store.close();

        writeln!(out, "{}", message)?;
        Ok(())
    }
}

fn open_and_load(path: &Path) -> DbResult<(FileStore, EmployeeRepository)> {
    let mut store = FileStore::open(path)?;
    let header = load_and_validate(&mut store)?;
    let repo = EmployeeRepository::load(&mut store, header)?;
    Ok((store, repo))
}

/// One listing row: name, address and hours in fixed-width columns
pub fn format_row(employee: &Employee) -> String {
    format!(
        "{:<30} {:<40} {}",
        employee.name, employee.address, employee.hours
    )
}

fn write_listing<W: Write>(repo: &EmployeeRepository, out: &mut W) -> DbResult<()> {
    writeln!(out, "Database contains {} employee(s):", repo.len())?;
    writeln!(out, "{:<30} {:<40} {}", "Name", "Address", "Hours")?;
    writeln!(out, "{:<30} {:<40} {}", "----", "-------", "-----")?;
    for employee in repo.list() {
        writeln!(out, "{}", format_row(employee))?;
    }
    Ok(())
}

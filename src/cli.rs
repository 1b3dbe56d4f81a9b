// SPDX-License-Identifier: MIT
//! Command-line surface for `empdb`

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::dispatcher::{Action, Request};
use crate::error::{DbError, DbResult};

#[derive(Parser, Debug)]
#[command(name = "empdb")]
#[command(about = "Flat-file employee database", long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["new_file", "list", "add", "delete", "update"])
))]
pub struct Cli {
    /// Database file
    #[arg(short = 'f', value_name = "FILE")]
    pub file: PathBuf,

    /// Create new database file
    #[arg(short = 'n')]
    pub new_file: bool,

    /// List all employees
    #[arg(short = 'l')]
    pub list: bool,

    /// Add employee, e.g. "John,123 Main,40"
    #[arg(short = 'a', value_name = "SPEC")]
    pub add: Option<String>,

    /// Delete employee by name
    #[arg(short = 'd', value_name = "KEY")]
    pub delete: Option<String>,

    /// Update employee, e.g. "John,,42" (empty fields are kept)
    #[arg(short = 'u', value_name = "SPEC")]
    pub update: Option<String>,
}

impl Cli {
    /// Turn parsed flags into a dispatcher request
    pub fn into_request(self) -> DbResult<Request> {
        let action = match (self.new_file, self.list, self.add, self.delete, self.update) {
            (true, false, None, None, None) => Action::NewFile,
            (false, true, None, None, None) => Action::List,
            (false, false, Some(spec), None, None) => Action::Add(spec),
            (false, false, None, Some(key), None) => Action::Delete(key),
            (false, false, None, None, Some(spec)) => Action::Update(spec),
            (false, false, None, None, None) => {
                return Err(DbError::Argument("no action specified".to_string()))
            }
            _ => {
                return Err(DbError::Argument(
                    "only one action allowed (-n/-l/-a/-d/-u)".to_string(),
                ))
            }
        };

        Ok(Request {
            path: self.file,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("empdb").chain(args.iter().copied()))
    }

    #[test]
    fn test_add_request() {
        let request = parse(&["-f", "db.bin", "-a", "Alice,123 Main,40"])
            .unwrap()
            .into_request()
            .unwrap();
        assert_eq!(request.path, PathBuf::from("db.bin"));
        assert_eq!(request.action, Action::Add("Alice,123 Main,40".to_string()));
    }

    #[test]
    fn test_each_action_flag() {
        let cases = [
            (vec!["-n"], Action::NewFile),
            (vec!["-l"], Action::List),
            (vec!["-d", "Bob"], Action::Delete("Bob".to_string())),
            (vec!["-u", "Bob,,1"], Action::Update("Bob,,1".to_string())),
        ];
        for (flags, expected) in cases {
            let mut args = vec!["-f", "db.bin"];
            args.extend(flags);
            let request = parse(&args).unwrap().into_request().unwrap();
            assert_eq!(request.action, expected);
        }
    }

    #[test]
    fn test_actions_are_exclusive() {
        let err = parse(&["-f", "db.bin", "-n", "-l"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_action_required() {
        let err = parse(&["-f", "db.bin"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_file_required() {
        let err = parse(&["-l"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_unknown_flag_and_stray_argument() {
        assert_eq!(
            parse(&["-f", "db.bin", "-x"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert!(parse(&["-f", "db.bin", "-l", "extra"]).is_err());
    }

    #[test]
    fn test_help() {
        let err = parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}

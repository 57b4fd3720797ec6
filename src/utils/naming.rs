//! Naming policies: table-name generators and identifier checks.
//!
//! A table-name generator maps a resource name to a physical table name. The
//! default is snake-case conversion (`UserAccount` → `user_account`). Named
//! generators can be selected from configuration or declaration files.

use convert_case::{Case, Casing};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::resource::errors::{ResourceError, Result};

/// Function from resource name to table name
pub type TableNameGenerator = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub const DEFAULT_TABLENAME_GENERATOR: &str = "snake_case";

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid");
    static ref GENERATORS: HashMap<&'static str, fn(&str) -> String> = {
        let mut generators: HashMap<&'static str, fn(&str) -> String> = HashMap::new();
        generators.insert("snake_case", snake_case);
        generators.insert("lower_case", lower_case);
        generators.insert("upper_snake_case", upper_snake_case);
        generators.insert("identity", identity);
        generators
    };
}

pub fn snake_case(name: &str) -> String {
    name.to_case(Case::Snake)
}

pub fn lower_case(name: &str) -> String {
    name.to_lowercase()
}

pub fn upper_snake_case(name: &str) -> String {
    name.to_case(Case::UpperSnake)
}

pub fn identity(name: &str) -> String {
    name.to_string()
}

pub fn is_known_generator(name: &str) -> bool {
    GENERATORS.contains_key(name)
}

pub fn generator_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = GENERATORS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Look up a registered generator by name
pub fn named_generator(name: &str) -> Result<TableNameGenerator> {
    let generator = GENERATORS
        .get(name)
        .copied()
        .ok_or_else(|| ResourceError::UnknownTableNameGenerator {
            name: name.to_string(),
        })?;
    let generator: TableNameGenerator = Arc::new(generator);
    Ok(generator)
}

pub fn default_generator() -> TableNameGenerator {
    Arc::new(snake_case)
}

/// Check a resource or property name; `kind` is used in the error message
pub fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(ResourceError::InvalidIdentifier {
            kind: kind.to_string(),
            name: name.to_string(),
        })
    }
}

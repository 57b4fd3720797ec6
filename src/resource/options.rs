use std::fmt;

use crate::utils::naming::TableNameGenerator;

/// Per-resource naming and persistence options.
///
/// `tablename` takes precedence over `tablename_generator`; when neither is
/// set the compiler's configured default generator applies.
#[derive(Clone, Default)]
pub struct ResourceOptions {
    pub tablename: Option<String>,
    pub tablename_generator: Option<TableNameGenerator>,
    pub is_abstract: bool,
}

impl ResourceOptions {
    pub fn table_name_for(&self, resource_name: &str, default: &TableNameGenerator) -> String {
        if let Some(tablename) = &self.tablename {
            return tablename.clone();
        }
        match &self.tablename_generator {
            Some(generator) => generator(resource_name),
            None => default(resource_name),
        }
    }
}

impl fmt::Debug for ResourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ResourceOptions")
            .field("tablename", &self.tablename)
            .field("tablename_generator", &self.tablename_generator.is_some())
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

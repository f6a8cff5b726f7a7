pub mod backup;
pub mod config;
pub mod links;
pub mod matcher;
pub mod names;
pub mod paths;
pub mod renamer;
pub mod scan;
pub mod warn;

//! Filesystem module.
//!
//! Provides:
//! - Link backup snapshots
//! - Filename templates for media and backups

pub mod backup;
pub mod naming;

pub use backup::{write_link_backup, write_link_backup_at};
pub use naming::{backup_file_name, external_file_name, output_template};

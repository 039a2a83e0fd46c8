//! Shared test harness modules for the wikitables CLI.

use super::*;

mod helpers;

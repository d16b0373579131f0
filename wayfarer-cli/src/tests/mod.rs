//! Shared test harness modules for the Wayfarer CLI.

use super::*;

mod check_steps;
mod helpers;
mod plan_unit;

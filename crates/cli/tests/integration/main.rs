mod common;
mod config_tests;
mod platforms_tests;
mod run_tests;

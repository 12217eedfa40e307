//! Integration tests: ledger behaviour against SQLite and the HTTP surface

mod common;
mod ledger_tests;

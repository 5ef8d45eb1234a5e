//! Popup controller and export/import integration tests.

mod manage;
mod transfer;

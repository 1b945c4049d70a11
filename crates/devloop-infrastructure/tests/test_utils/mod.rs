//! Shared helpers for infrastructure integration tests

#![allow(dead_code)]

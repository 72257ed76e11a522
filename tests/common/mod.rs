//! Shared helpers for the integration tests.

#![allow(dead_code)]

use iimport::{Document, Engine, IimportError, Mode, TransformResult};

pub fn document(source: &str) -> Document {
    Document::from_source("test", source)
}

pub fn transform(source: &str) -> Result<TransformResult, IimportError> {
    Engine::default().transform(&document(source))
}

pub fn passthrough(source: &str) -> String {
    Engine::default()
        .run(Mode::Passthrough, &document(source))
        .expect("passthrough never fails")
}

pub fn rendered(source: &str) -> String {
    Engine::default()
        .run(Mode::Transform, &document(source))
        .expect("transform failed")
}

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::document::Document;
use crate::properties::Properties;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("no annotators configured")]
    EmptyPipeline,
    #[error("unknown annotator: {0}")]
    UnknownAnnotator(String),
    #[error("annotator {annotator} requires {requires} to run before it")]
    MissingRequirement { annotator: String, requires: String },
    #[error("document has no {0} annotation")]
    MissingAnnotation(&'static str),
    #[error("annotation engine failure: {0}")]
    Internal(String),
}

/// A single processing step over a document.
pub trait Annotator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Annotators that must have run earlier in the same pipeline.
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError>;
}

/// A ready-to-run processing chain. Pipelines are immutable once built and are
/// shared by every request carrying the same configuration.
pub trait Pipeline: Send + Sync {
    fn annotators(&self) -> Vec<&'static str>;

    fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError>;
}

/// Builds pipelines from a configuration. Building is assumed to be expensive,
/// callers are expected to cache the result.
pub trait AnnotationEngine: Send + Sync {
    fn build(&self, properties: &Properties) -> Result<Arc<dyn Pipeline>, AnnotationError>;
}

pub struct AnnotatorPipeline {
    annotators: Vec<Box<dyn Annotator>>,
}

impl AnnotatorPipeline {
    /// Checks that the chain is non-empty and that every annotator's
    /// requirements are met by annotators placed before it.
    pub fn new(annotators: Vec<Box<dyn Annotator>>) -> Result<Self, AnnotationError> {
        if annotators.is_empty() {
            return Err(AnnotationError::EmptyPipeline);
        }

        let mut satisfied = HashSet::new();
        for annotator in &annotators {
            if let Some(missing) = annotator
                .requires()
                .iter()
                .find(|r| !satisfied.contains(*r))
            {
                return Err(AnnotationError::MissingRequirement {
                    annotator: annotator.name().to_string(),
                    requires: missing.to_string(),
                });
            }
            satisfied.insert(annotator.name());
        }

        Ok(Self { annotators })
    }
}

impl Pipeline for AnnotatorPipeline {
    fn annotators(&self) -> Vec<&'static str> {
        self.annotators.iter().map(|a| a.name()).collect()
    }

    fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError> {
        for annotator in &self.annotators {
            let _span = tracing::debug_span!("annotator", name = annotator.name()).entered();
            annotator.annotate(document)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, &'static [&'static str]);

    impl Annotator for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn requires(&self) -> &'static [&'static str] {
            self.1
        }

        fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError> {
            document.text.push_str(self.0);
            Ok(())
        }
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(matches!(
            AnnotatorPipeline::new(vec![]),
            Err(AnnotationError::EmptyPipeline)
        ));
    }

    #[test]
    fn requirements_must_come_first() {
        let err = AnnotatorPipeline::new(vec![
            Box::new(Named("b", &["a"])),
            Box::new(Named("a", &[])),
        ])
        .err()
        .expect("out of order chain must fail");

        assert_eq!(
            err,
            AnnotationError::MissingRequirement {
                annotator: "b".to_string(),
                requires: "a".to_string()
            }
        );
    }

    #[test]
    fn annotators_run_in_order() {
        let pipeline = AnnotatorPipeline::new(vec![
            Box::new(Named("a", &[])),
            Box::new(Named("b", &["a"])),
        ])
        .unwrap();
        let mut doc = Document::new("");

        pipeline.annotate(&mut doc).unwrap();

        assert_eq!(doc.text, "ab");
        assert_eq!(pipeline.annotators(), vec!["a", "b"]);
    }
}

use std::fmt;
use std::str::FromStr;

use annotation_common::outputters::{
    ConllOutputter, JsonOutputter, OutputOptions, Outputter, SerializedOutputter, TextOutputter,
    XmlOutputter,
};
use annotation_common::properties::{Properties, OUTPUT_FORMAT, OUTPUT_SERIALIZER};
use annotation_common::serialization::binary::BINARY;
use annotation_common::serialization::SerializerRegistry;

use crate::api::AnnotateError;

const DEFAULT_OUTPUT_FORMAT: &str = "json";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Xml,
    Json,
    Conll,
    Serialized,
}

impl FromStr for OutputFormat {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            "conll" => Ok(OutputFormat::Conll),
            "serialized" => Ok(OutputFormat::Serialized),
            _ => Err(AnnotateError::UnknownOutputFormat(s.to_string())),
        }
    }
}

impl OutputFormat {
    /// Content type before any serializer narrows it.
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Text | OutputFormat::Conll => "text/plain",
            OutputFormat::Xml => "text/xml",
            OutputFormat::Json => "text/json",
            OutputFormat::Serialized => "application/octet-stream",
        }
    }
}

/// How a response will be written.
pub struct Negotiated {
    pub format: OutputFormat,
    pub content_type: &'static str,
    pub outputter: Box<dyn Outputter>,
}

impl fmt::Debug for Negotiated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Negotiated")
            .field("format", &self.format)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

pub fn negotiate(
    properties: &Properties,
    serializers: &SerializerRegistry,
) -> Result<Negotiated, AnnotateError> {
    let format: OutputFormat = properties
        .get_or(OUTPUT_FORMAT, DEFAULT_OUTPUT_FORMAT)
        .parse()?;
    let options = OutputOptions::from_properties(properties);

    let mut content_type = format.content_type();
    let outputter: Box<dyn Outputter> = match format {
        OutputFormat::Text => Box::new(TextOutputter),
        OutputFormat::Xml => Box::new(XmlOutputter { options }),
        OutputFormat::Json => Box::new(JsonOutputter { options }),
        OutputFormat::Conll => Box::new(ConllOutputter),
        OutputFormat::Serialized => {
            let name = properties.get_or(OUTPUT_SERIALIZER, BINARY);
            let serializer = serializers
                .get(name)
                .ok_or_else(|| AnnotateError::unknown_serializer(name, serializers))?;
            content_type = serializer.content_type();
            Box::new(SerializedOutputter(serializer))
        }
    };

    Ok(Negotiated {
        format,
        content_type,
        outputter,
    })
}

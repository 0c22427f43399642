// Visualization frame model
//
// A Frame is one snapshot of model inputs pushed by the training process:
// prompt metadata plus the images the model saw at that step. Frames are
// immutable once decoded and owned by the history buffer that stores them.

pub mod codec;

pub use codec::{decode, DecodeError};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{Map, Value};
use std::fmt;

/// Named images, keyed by camera or field name
///
/// Entries keep the order the producer sent them in. Inserting an existing
/// name replaces its image in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    entries: Vec<(String, String)>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, image: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = image,
            None => self.entries.push((name, image)),
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, image)| image.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (name, image) pairs in producer order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, image)| (name.as_str(), image.as_str()))
    }
}

impl FromIterator<(String, String)> for ImageSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut set = ImageSet::new();
        for (name, image) in iter {
            set.insert(name, image);
        }
        set
    }
}

impl<'de> Deserialize<'de> for ImageSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ImageSetVisitor;

        impl<'de> Visitor<'de> for ImageSetVisitor {
            type Value = ImageSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of image strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ImageSet, A::Error> {
                let mut set = ImageSet::new();
                while let Some((name, image)) = access.next_entry::<String, String>()? {
                    set.insert(name, image);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(ImageSetVisitor)
    }
}

/// A single decoded visualization frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Producer timestamp in milliseconds
    pub timestamp: i64,

    /// Open-ended metadata object (prompt, step, episode, ...)
    pub metadata: Map<String, Value>,

    /// Image the model is queried with
    pub query_image: Option<String>,

    /// Current observations keyed by camera name
    pub observation_images: Option<ImageSet>,

    /// In-context example images, one set per example
    pub icl_images: Option<Vec<ImageSet>>,
}

impl Frame {
    /// Task prompt, if the producer sent one
    pub fn prompt(&self) -> Option<&str> {
        self.metadata.get("prompt").and_then(Value::as_str)
    }

    /// Declared number of in-context examples
    pub fn num_icl_examples(&self) -> Option<u64> {
        self.metadata.get("num_icl_examples").and_then(Value::as_u64)
    }

    /// Prompts of the in-context examples; non-string entries are skipped
    pub fn icl_prompts(&self) -> Vec<&str> {
        self.metadata
            .get("icl_prompts")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Non-null metadata entries other than the recognized prompt fields,
    /// in the order the producer sent them
    pub fn extra_metadata(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.metadata.iter().filter(|(key, value)| {
            !value.is_null()
                && !matches!(key.as_str(), "prompt" | "num_icl_examples" | "icl_prompts")
        })
    }

    /// Total number of images carried by this frame
    pub fn image_count(&self) -> usize {
        let query = usize::from(self.query_image.is_some());
        let observations = self.observation_images.as_ref().map_or(0, ImageSet::len);
        let icl = self
            .icl_images
            .as_ref()
            .map_or(0, |sets| sets.iter().map(ImageSet::len).sum());
        query + observations + icl
    }
}

/// Short description of an encoded image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    /// Media type from a data URI, or "external" for plain references
    pub media_type: String,
    /// Approximate decoded payload size in bytes
    pub bytes: usize,
}

/// Describe an image reference without decoding it
///
/// Data URIs (`data:<type>[;base64],<payload>`) report their media type and
/// payload size; base64 payloads are sized as decoded bytes. Anything else is
/// treated as an external reference sized by its length.
pub fn summarize_image(reference: &str) -> ImageSummary {
    let Some(rest) = reference.strip_prefix("data:") else {
        return ImageSummary {
            media_type: "external".to_string(),
            bytes: reference.len(),
        };
    };

    let (header, payload) = rest.split_once(',').unwrap_or((rest, ""));
    let is_base64 = header.ends_with(";base64");
    let media_type = header
        .split(';')
        .next()
        .filter(|t| !t.is_empty())
        .unwrap_or("text/plain")
        .to_string();

    let bytes = if is_base64 {
        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
        (payload.len() / 4 * 3).saturating_sub(padding)
    } else {
        payload.len()
    };

    ImageSummary { media_type, bytes }
}

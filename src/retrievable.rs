//! Retrievables: indexed units of content.
//!
//! A [`Retrievable`] is one addressable media object moving through the
//! pipeline. At ingest time it carries the decoded content elements;
//! extractors attach descriptors to it as it passes through their stage.

use uuid::Uuid;

use crate::content::ContentElement;
use crate::descriptor::StructDescriptor;

/// Identifier of a retrievable.
pub type RetrievableId = Uuid;

/// An indexed unit of content, addressable by a stable identifier.
#[derive(Debug, Clone, Default)]
pub struct Retrievable {
    id: RetrievableId,
    content: Vec<ContentElement>,
    descriptors: Vec<StructDescriptor>,
}

impl Retrievable {
    /// Create a new retrievable with a fresh id.
    pub fn new() -> Self {
        Retrievable {
            id: Uuid::new_v4(),
            content: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    /// Create a retrievable with a known id (e.g. when reading back from storage).
    pub fn with_id(id: RetrievableId) -> Self {
        Retrievable {
            id,
            content: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    /// Attach a content element.
    pub fn add_content(mut self, content: ContentElement) -> Self {
        self.content.push(content);
        self
    }

    /// Attach a descriptor.
    pub fn add_descriptor(&mut self, descriptor: StructDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// The retrievable id.
    pub fn id(&self) -> RetrievableId {
        self.id
    }

    /// The content elements carried by this retrievable.
    pub fn content(&self) -> &[ContentElement] {
        &self.content
    }

    /// The descriptors attached so far.
    pub fn descriptors(&self) -> &[StructDescriptor] {
        &self.descriptors
    }

    /// Iterate over the content elements of one concrete kind.
    pub fn content_of<'a, K: crate::content::ContentKind + 'a>(&'a self) -> impl Iterator<Item = &'a K> {
        self.content.iter().filter_map(K::from_element)
    }
}

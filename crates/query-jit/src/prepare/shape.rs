use std::sync::Arc;

use async_graphql_parser::{types::Field, Positioned};
use indexmap::IndexSet;

use crate::{
    operation::{Location, ResponseKey},
    resolver::BoxResolver,
    schema::{LeafSerializer, TypeRecord, Wrapping},
};

use super::arguments::ArgumentsShape;

/// The compiled plan's node arena. Records are closed tagged variants
/// interpreted at execution time; nothing here refers back to the AST.
#[derive(Default)]
pub(crate) struct Shapes {
    concrete: Vec<ConcreteShapeRecord>,
    polymorphic: Vec<PolymorphicShapeRecord>,
    fields: Vec<FieldShapeRecord>,
    resolvers: Vec<ResolverShapeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConcreteShapeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PolymorphicShapeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldShapeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolverShapeId(u32);

impl Shapes {
    pub fn push_concrete(&mut self, record: ConcreteShapeRecord) -> ConcreteShapeId {
        let id = ConcreteShapeId(self.concrete.len() as u32);
        self.concrete.push(record);
        id
    }

    pub fn push_polymorphic(&mut self, record: PolymorphicShapeRecord) -> PolymorphicShapeId {
        let id = PolymorphicShapeId(self.polymorphic.len() as u32);
        self.polymorphic.push(record);
        id
    }

    pub fn push_field(&mut self, record: FieldShapeRecord) -> FieldShapeId {
        let id = FieldShapeId(self.fields.len() as u32);
        self.fields.push(record);
        id
    }

    pub fn push_resolver(&mut self, record: ResolverShapeRecord) -> ResolverShapeId {
        let id = ResolverShapeId(self.resolvers.len() as u32);
        self.resolvers.push(record);
        id
    }
}

impl std::ops::Index<ConcreteShapeId> for Shapes {
    type Output = ConcreteShapeRecord;
    fn index(&self, id: ConcreteShapeId) -> &Self::Output {
        &self.concrete[id.0 as usize]
    }
}

impl std::ops::Index<PolymorphicShapeId> for Shapes {
    type Output = PolymorphicShapeRecord;
    fn index(&self, id: PolymorphicShapeId) -> &Self::Output {
        &self.polymorphic[id.0 as usize]
    }
}

impl std::ops::Index<FieldShapeId> for Shapes {
    type Output = FieldShapeRecord;
    fn index(&self, id: FieldShapeId) -> &Self::Output {
        &self.fields[id.0 as usize]
    }
}

impl std::ops::Index<ResolverShapeId> for Shapes {
    type Output = ResolverShapeRecord;
    fn index(&self, id: ResolverShapeId) -> &Self::Output {
        &self.resolvers[id.0 as usize]
    }
}

/// One object in the response: the fields to produce, in selection-set order.
pub(crate) struct ConcreteShapeRecord {
    pub type_name: Box<str>,
    pub fields: Vec<FieldShapeId>,
}

pub(crate) struct FieldShapeRecord {
    /// Response key: the alias, or the field name without one.
    pub key: ResponseKey,
    pub field_name: Box<str>,
    pub parent_type_name: Box<str>,
    /// Source positions of every field node merged into this entry.
    pub locations: Vec<Location>,
    pub wrapping: Wrapping,
    pub shape: Shape,
    /// Present when the field is a deferred call site: it has a resolver, or
    /// it sits at the top level where deferral is forced.
    pub resolver: Option<ResolverShapeId>,
}

pub(crate) enum Shape {
    Leaf(LeafShape),
    Concrete(ConcreteShapeId),
    Polymorphic(PolymorphicShapeId),
}

/// Scalar/enum serialization bound at compile time.
pub(crate) enum LeafShape {
    String,
    Int,
    Float,
    Boolean,
    Id,
    /// `__typename`: the concrete type name of the enclosing shape.
    Typename,
    /// Caller guarantees wire form, value goes through structurally.
    Passthrough,
    Enum {
        name: Box<str>,
        values: Arc<IndexSet<String>>,
    },
    Custom {
        name: Box<str>,
        serializer: LeafSerializer,
    },
}

/// Abstract-type dispatch: one precompiled branch per possible object type.
pub(crate) struct PolymorphicShapeRecord {
    pub abstract_type_name: Box<str>,
    pub possibilities: Vec<(Box<str>, ConcreteShapeId)>,
}

impl PolymorphicShapeRecord {
    pub fn branch(&self, type_name: &str) -> Option<ConcreteShapeId> {
        self.possibilities
            .iter()
            .find(|(name, _)| name.as_ref() == type_name)
            .map(|(_, id)| *id)
    }
}

/// A deferred call site. `resolver` is `None` for forced top-level deferral
/// of plain fields: those read the property of the same name off the root
/// value instead of calling out.
pub(crate) struct ResolverShapeRecord {
    pub resolver: Option<BoxResolver>,
    pub field_name: Box<str>,
    pub parent_type_name: Box<str>,
    pub return_type: TypeRecord,
    pub arguments: ArgumentsShape,
    /// Every field node merged into this entry, for resolve-info. Resolvers
    /// inspect these to look ahead into their sub-selections.
    pub field_nodes: Vec<Positioned<Field>>,
}

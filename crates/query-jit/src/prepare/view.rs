use crate::schema::Wrapping;

use super::{ConcreteShapeId, FieldShapeId, Plan, Shape};

/// Read-only view over a compiled object shape, enough structure for an
/// external schema-directed serializer builder: response keys in output
/// order, wrapping, and the sub-shape behind each field.
#[derive(Clone, Copy)]
pub struct ShapeView<'a> {
    pub(crate) plan: &'a Plan,
    pub(crate) id: ConcreteShapeId,
}

impl<'a> ShapeView<'a> {
    pub fn type_name(&self) -> &'a str {
        &self.plan.shapes[self.id].type_name
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldShapeView<'a>> + 'a {
        let plan = self.plan;
        self.plan.shapes[self.id]
            .fields
            .iter()
            .map(move |&id| FieldShapeView { plan, id })
    }
}

#[derive(Clone, Copy)]
pub struct FieldShapeView<'a> {
    plan: &'a Plan,
    id: FieldShapeId,
}

impl<'a> FieldShapeView<'a> {
    /// The key this field serializes under.
    pub fn key(&self) -> &'a str {
        &self.plan.response_keys[self.plan.shapes[self.id].key]
    }

    pub fn field_name(&self) -> &'a str {
        &self.plan.shapes[self.id].field_name
    }

    pub fn wrapping(&self) -> &'a Wrapping {
        &self.plan.shapes[self.id].wrapping
    }

    /// Whether the field is filled in by a deferred resolver call.
    pub fn is_deferred(&self) -> bool {
        self.plan.shapes[self.id].resolver.is_some()
    }

    pub fn kind(&self) -> FieldShapeKind<'a> {
        match &self.plan.shapes[self.id].shape {
            Shape::Leaf(_) => FieldShapeKind::Leaf,
            Shape::Concrete(id) => FieldShapeKind::Object(ShapeView {
                plan: self.plan,
                id: *id,
            }),
            Shape::Polymorphic(id) => FieldShapeKind::Abstract(
                self.plan.shapes[*id]
                    .possibilities
                    .iter()
                    .map(|(name, id)| {
                        (
                            name.as_ref(),
                            ShapeView {
                                plan: self.plan,
                                id: *id,
                            },
                        )
                    })
                    .collect(),
            ),
        }
    }
}

pub enum FieldShapeKind<'a> {
    Leaf,
    Object(ShapeView<'a>),
    /// One branch per possible concrete type.
    Abstract(Vec<(&'a str, ShapeView<'a>)>),
}
